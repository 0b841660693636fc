//! Department catalog endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::{ok, ok_list, Envelope};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::Department;
use crate::seed::{seed_departments, SeedOutcome};

#[derive(Serialize)]
pub struct DepartmentView {
    #[serde(flatten)]
    pub department: Department,
    pub head_doctor_name: Option<String>,
}

/// `GET /api/departments` — catalog with resolved head doctor names.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Vec<DepartmentView>>>, ApiError> {
    let conn = ctx.lock_db()?;
    let departments = repository::list_departments(&conn)?;

    let mut views = Vec::with_capacity(departments.len());
    for department in departments {
        let head_doctor_name = match department.head_doctor_id {
            Some(doctor_id) => match repository::get_doctor(&conn, &doctor_id)? {
                Some(doctor) => repository::get_user(&conn, &doctor.user_id)?.map(|u| u.name),
                None => None,
            },
            None => None,
        };
        views.push(DepartmentView {
            department,
            head_doctor_name,
        });
    }
    Ok(ok_list(views))
}

/// `POST /api/departments/seed` — idempotent catalog seeding.
pub async fn seed(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<SeedOutcome>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok(seed_departments(&conn)?))
}
