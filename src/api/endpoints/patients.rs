//! Patient roster endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{created, ok, ok_list, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, AuthContext};
use crate::db::repository;
use crate::db::repository::PatientUpdate;
use crate::models::enums::{PatientStatus, Role};
use crate::models::{EmergencyContact, MedicalHistoryEntry, Patient};

#[derive(Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub medical_history: Vec<MedicalHistoryEntry>,
}

/// `GET /api/patients` — full roster, admin only.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Envelope<Vec<Patient>>>, ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Unauthorized("Admin access required".into()));
    }
    let conn = ctx.lock_db()?;
    Ok(ok_list(repository::list_patients(&conn)?))
}

/// `GET /api/patients/:id` — demographics plus medical history.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<PatientDetail>>, ApiError> {
    let conn = ctx.lock_db()?;
    let patient = repository::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    let medical_history = repository::list_medical_history(&conn, &id)?;
    Ok(ok(PatientDetail {
        patient,
        medical_history,
    }))
}

#[derive(Deserialize)]
pub struct UpdatePatientRequest {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: Option<PatientStatus>,
}

/// `PATCH /api/patients/:id` — demographics update; `status` blocks or
/// unblocks the patient (admin only).
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdatePatientRequest>,
) -> Result<Json<Envelope<Patient>>, ApiError> {
    if body.status.is_some() && auth.role != Role::Admin {
        return Err(ApiError::Unauthorized(
            "Only admins can change a patient's status".into(),
        ));
    }

    let conn = ctx.lock_db()?;
    if auth.role != Role::Admin {
        let owned = repository::get_patient_by_user(&conn, &auth.user_id)?;
        if owned.map(|p| p.id) != Some(id) {
            return Err(ApiError::Unauthorized(
                "Not entitled to update this patient".into(),
            ));
        }
    }

    let changed = repository::update_patient(
        &conn,
        &id,
        &PatientUpdate {
            age: body.age,
            gender: body.gender,
            blood_group: body.blood_group,
            phone: body.phone,
            address: body.address,
            emergency_contact: body.emergency_contact,
            status: body.status,
        },
    )?;
    if !changed {
        return Err(ApiError::NotFound("Patient not found".into()));
    }

    let patient = repository::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(ok(patient))
}

#[derive(Deserialize)]
pub struct AddHistoryRequest {
    pub condition: Option<String>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// `POST /api/patients/:id/history` — append a medical history entry.
/// Clinical staff only; patients cannot write their own record.
pub async fn add_history(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<AddHistoryRequest>,
) -> Result<(StatusCode, Json<Envelope<MedicalHistoryEntry>>), ApiError> {
    if !matches!(auth.role, Role::Doctor | Role::Admin) {
        return Err(ApiError::Unauthorized("Doctor access required".into()));
    }
    let condition = body
        .condition
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("condition is required".into()))?;

    let conn = ctx.lock_db()?;
    if repository::get_patient(&conn, &id)?.is_none() {
        return Err(ApiError::NotFound("Patient not found".into()));
    }

    let entry = MedicalHistoryEntry {
        id: Uuid::new_v4(),
        patient_id: id,
        condition,
        date: body.date,
        notes: body.notes,
    };
    repository::add_medical_history(&conn, &entry)?;
    Ok(created(entry))
}
