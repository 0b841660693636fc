//! Doctor roster endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::{ok, ok_list, ok_message, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, AuthContext};
use crate::db::repository;
use crate::db::repository::DoctorUpdate;
use crate::models::enums::Role;
use crate::models::Doctor;

/// `GET /api/doctors`
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Vec<Doctor>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(repository::list_doctors(&conn)?))
}

/// `GET /api/doctors/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Doctor>>, ApiError> {
    let conn = ctx.lock_db()?;
    let doctor = repository::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(ok(doctor))
}

#[derive(Deserialize)]
pub struct UpdateDoctorRequest {
    pub specialization: Option<String>,
    pub fee: Option<f64>,
    pub available: Option<bool>,
    pub department_id: Option<Uuid>,
}

/// `PATCH /api/doctors/:id` — admin or the doctor's own profile.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateDoctorRequest>,
) -> Result<Json<Envelope<Doctor>>, ApiError> {
    let conn = ctx.lock_db()?;
    if auth.role != Role::Admin {
        let owned = repository::get_doctor_by_user(&conn, &auth.user_id)?;
        if owned.map(|d| d.id) != Some(id) {
            return Err(ApiError::Unauthorized(
                "Not entitled to update this doctor".into(),
            ));
        }
    }

    let changed = repository::update_doctor(
        &conn,
        &id,
        &DoctorUpdate {
            specialization: body.specialization,
            fee: body.fee,
            available: body.available,
            department_id: body.department_id,
        },
    )?;
    if !changed {
        return Err(ApiError::NotFound("Doctor not found".into()));
    }

    let doctor = repository::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(ok(doctor))
}

/// `DELETE /api/doctors/:id` — admin only; cascades to the doctor's
/// appointments and prescriptions.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Unauthorized("Admin access required".into()));
    }
    let conn = ctx.lock_db()?;
    if !repository::delete_doctor(&conn, &id)? {
        return Err(ApiError::NotFound("Doctor not found".into()));
    }
    tracing::info!(doctor_id = %id, "Doctor deleted");
    Ok(ok_message("Doctor deleted"))
}
