//! Registration, login and logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{created, ok, ok_message, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{hash_password, verify_password, ApiContext, ApiJson, AuthContext};
use crate::db::repository;
use crate::models::enums::{PatientStatus, Role};
use crate::models::{Doctor, EmergencyContact, Patient, User};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    // Patient profile fields
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    // Doctor profile fields
    pub specialization: Option<String>,
    pub fee: Option<f64>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// `POST /api/auth/register` — create a user plus its role profile row.
pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<User>>), ApiError> {
    let name = required(body.name.filter(|n| !n.trim().is_empty()), "name")?;
    let email = required(body.email.filter(|e| !e.trim().is_empty()), "email")?;
    let password = required(body.password.filter(|p| !p.is_empty()), "password")?;
    let role = required(body.role, "role")?;

    let conn = ctx.lock_db()?;
    if repository::get_user_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::BadRequest("Email is already registered".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash: hash_password(&password),
        role,
        is_online: false,
        last_login: None,
        created_at: Utc::now(),
    };
    repository::insert_user(&conn, &user)?;

    match role {
        Role::Patient => {
            repository::insert_patient(
                &conn,
                &Patient {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    age: body.age,
                    gender: body.gender,
                    blood_group: None,
                    phone: body.phone,
                    address: None,
                    emergency_contact: body.emergency_contact,
                    status: PatientStatus::Active,
                    created_at: Utc::now(),
                },
            )?;
        }
        Role::Doctor => {
            repository::insert_doctor(
                &conn,
                &Doctor {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    specialization: body
                        .specialization
                        .unwrap_or_else(|| "General Medicine".into()),
                    fee: body.fee.unwrap_or(0.0),
                    available: true,
                    department_id: None,
                    created_at: Utc::now(),
                },
            )?;
        }
        Role::Admin | Role::Pharmacist => {}
    }

    tracing::info!(user_id = %user.id, role = role.as_str(), "User registered");
    Ok(created(user))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/auth/login` — verify credentials and issue a bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    let email = required(body.email, "email")?;
    let password = required(body.password, "password")?;

    let conn = ctx.lock_db()?;
    let user = repository::get_user_by_email(&conn, &email)?
        .filter(|u| verify_password(&password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;

    repository::record_login(&conn, &user.id)?;
    drop(conn);

    let token = {
        let mut sessions = ctx.lock_sessions()?;
        sessions.issue(user.id, user.role)
    };

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(ok(LoginResponse { token, user }))
}

/// `POST /api/auth/logout` — revoke the presented token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, ApiError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    {
        let mut sessions = ctx.lock_sessions()?;
        sessions.revoke(token);
    }
    let conn = ctx.lock_db()?;
    repository::record_logout(&conn, &auth.user_id)?;

    tracing::info!(user_id = %auth.user_id, "User logged out");
    Ok(ok_message("Logged out"))
}
