//! Appointment scheduling and lifecycle endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::{created, ok, ok_list, ok_message, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::db::repository::AppointmentChanges;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;
use crate::workflow;
use crate::workflow::{AppointmentView, NewAppointment};

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub is_urgent: Option<bool>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}

/// `POST /api/appointments`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Envelope<Appointment>>), ApiError> {
    let input = NewAppointment {
        patient_id: body
            .patient_id
            .ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?,
        doctor_id: body
            .doctor_id
            .ok_or_else(|| ApiError::BadRequest("doctor_id is required".into()))?,
        date: body
            .date
            .ok_or_else(|| ApiError::BadRequest("date is required".into()))?,
        time: body
            .time
            .ok_or_else(|| ApiError::BadRequest("time is required".into()))?,
        is_urgent: body.is_urgent.unwrap_or(false),
        reason: body.reason,
        status: body.status,
    };

    let conn = ctx.lock_db()?;
    let appointment = workflow::create_appointment(&conn, input)?;
    Ok(created(appointment))
}

/// `GET /api/appointments` — all appointments, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Vec<AppointmentView>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(workflow::list_appointments(&conn)?))
}

/// `GET /api/appointments/patient/:id` — newest first.
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<AppointmentView>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(workflow::list_appointments_for_patient(
        &conn,
        &patient_id,
    )?))
}

/// `GET /api/appointments/doctor/:id` — schedule order, oldest first.
pub async fn by_doctor(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<AppointmentView>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(workflow::list_appointments_for_doctor(
        &conn,
        &doctor_id,
    )?))
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub consultation_notes: Option<String>,
    pub diagnosis: Option<String>,
}

/// `PATCH /api/appointments/:id` — partial update with transition checks.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateAppointmentRequest>,
) -> Result<Json<Envelope<Appointment>>, ApiError> {
    let conn = ctx.lock_db()?;
    let appointment = workflow::update_appointment(
        &conn,
        &id,
        AppointmentChanges {
            status: body.status,
            consultation_notes: body.consultation_notes,
            diagnosis: body.diagnosis,
        },
    )?;
    Ok(ok(appointment))
}

/// `DELETE /api/appointments/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let conn = ctx.lock_db()?;
    workflow::delete_appointment(&conn, &id)?;
    Ok(ok_message("Appointment deleted"))
}
