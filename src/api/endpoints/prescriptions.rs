//! Prescription issuance and pharmacy endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::{created, ok, ok_list, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, AuthContext};
use crate::models::enums::Role;
use crate::models::{Medicine, Prescription};
use crate::workflow;
use crate::workflow::{NewPrescription, PrescriptionChanges};

fn require_pharmacy(auth: &AuthContext) -> Result<(), ApiError> {
    match auth.role {
        Role::Pharmacist | Role::Admin => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Pharmacist access required".into(),
        )),
    }
}

#[derive(Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub diagnosis: Option<String>,
    pub instructions: Option<String>,
    pub medicines: Option<Vec<Medicine>>,
}

/// `POST /api/prescriptions` — doctor issues a prescription; the parent
/// appointment is completed in the same transaction.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(body): ApiJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Envelope<Prescription>>), ApiError> {
    let input = NewPrescription {
        patient_id: body
            .patient_id
            .ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?,
        appointment_id: body
            .appointment_id
            .ok_or_else(|| ApiError::BadRequest("appointment_id is required".into()))?,
        diagnosis: body.diagnosis,
        instructions: body.instructions,
        medicines: body.medicines.unwrap_or_default(),
    };

    let mut conn = ctx.lock_db()?;
    let prescription = workflow::create_prescription(&mut conn, &auth.user_id, input)?;
    Ok(created(prescription))
}

#[derive(Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub diagnosis: Option<String>,
    pub instructions: Option<String>,
    pub medicines: Option<Vec<Medicine>>,
}

/// `PATCH /api/prescriptions/:id` — content edit by the authoring doctor.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdatePrescriptionRequest>,
) -> Result<Json<Envelope<Prescription>>, ApiError> {
    let conn = ctx.lock_db()?;
    let prescription = workflow::update_prescription(
        &conn,
        &auth.user_id,
        &id,
        PrescriptionChanges {
            diagnosis: body.diagnosis,
            instructions: body.instructions,
            medicines: body.medicines,
        },
    )?;
    Ok(ok(prescription))
}

#[derive(Deserialize, Default)]
pub struct NotesBody {
    pub notes: Option<String>,
}

/// `PATCH /api/prescriptions/:id/approve`
pub async fn approve(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<NotesBody>>,
) -> Result<Json<Envelope<Prescription>>, ApiError> {
    require_pharmacy(&auth)?;
    let notes = body.and_then(|Json(b)| b.notes);
    let conn = ctx.lock_db()?;
    Ok(ok(workflow::approve_prescription(&conn, &id, notes)?))
}

/// `PATCH /api/prescriptions/:id/reject` — notes are mandatory.
pub async fn reject(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<NotesBody>>,
) -> Result<Json<Envelope<Prescription>>, ApiError> {
    require_pharmacy(&auth)?;
    let notes = body.and_then(|Json(b)| b.notes);
    let conn = ctx.lock_db()?;
    Ok(ok(workflow::reject_prescription(&conn, &id, notes)?))
}

/// `PATCH /api/prescriptions/:id/dispense`
pub async fn dispense(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Prescription>>, ApiError> {
    require_pharmacy(&auth)?;
    let conn = ctx.lock_db()?;
    Ok(ok(workflow::dispense_prescription(&conn, &id)?))
}

/// `GET /api/prescriptions/pending` — the pharmacy work queue.
pub async fn pending(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Envelope<Vec<Prescription>>>, ApiError> {
    require_pharmacy(&auth)?;
    let conn = ctx.lock_db()?;
    Ok(ok_list(crate::db::repository::list_prescriptions_by_status(
        &conn,
        crate::models::enums::PrescriptionStatus::Pending,
    )?))
}

/// `GET /api/prescriptions/mine` — scoped to the caller's role.
pub async fn mine(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Envelope<Vec<Prescription>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(workflow::list_prescriptions_for_caller(
        &conn,
        &auth.user_id,
        auth.role,
    )?))
}

/// `GET /api/prescriptions/patient/:id` — admin, pharmacist or the owner.
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<Prescription>>>, ApiError> {
    let conn = ctx.lock_db()?;
    workflow::authorize_scope(&conn, &auth.user_id, auth.role, Some(&patient_id), None)?;
    Ok(ok_list(crate::db::repository::list_prescriptions_by_patient(
        &conn,
        &patient_id,
    )?))
}

/// `GET /api/prescriptions/doctor/:id` — admin, pharmacist or the owner.
pub async fn by_doctor(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<Prescription>>>, ApiError> {
    let conn = ctx.lock_db()?;
    workflow::authorize_scope(&conn, &auth.user_id, auth.role, None, Some(&doctor_id))?;
    Ok(ok_list(crate::db::repository::list_prescriptions_by_doctor(
        &conn,
        &doctor_id,
    )?))
}
