//! Lab report endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::{created, ok_list, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, AuthContext};
use crate::db::repository;
use crate::models::enums::LabReportStatus;
use crate::models::LabReport;

#[derive(Deserialize)]
pub struct CreateLabReportRequest {
    pub patient_id: Option<Uuid>,
    pub test_name: Option<String>,
    pub result: Option<String>,
    pub status: Option<LabReportStatus>,
    pub date: Option<NaiveDate>,
}

/// `POST /api/lab-reports` — the calling doctor is recorded as the
/// ordering doctor.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(body): ApiJson<CreateLabReportRequest>,
) -> Result<(StatusCode, Json<Envelope<LabReport>>), ApiError> {
    let patient_id = body
        .patient_id
        .ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?;
    let test_name = body
        .test_name
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("test_name is required".into()))?;

    let conn = ctx.lock_db()?;
    let doctor = repository::get_doctor_by_user(&conn, &auth.user_id)?
        .ok_or_else(|| ApiError::Unauthorized("Doctor access required".into()))?;
    if repository::get_patient(&conn, &patient_id)?.is_none() {
        return Err(ApiError::NotFound("Patient not found".into()));
    }

    let report = LabReport {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id: doctor.id,
        test_name,
        result: body.result,
        status: body.status.unwrap_or(LabReportStatus::Pending),
        date: body.date,
        created_at: Utc::now(),
    };
    repository::insert_lab_report(&conn, &report)?;
    Ok(created(report))
}

/// `GET /api/lab-reports/patient/:id` — newest first.
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<LabReport>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(repository::list_lab_reports_by_patient(
        &conn,
        &patient_id,
    )?))
}
