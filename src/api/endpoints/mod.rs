//! Endpoint handlers, one module per resource.
//!
//! Success responses share one envelope: `{"success": true, "data": ...}`
//! plus `"count"` on list endpoints and `"message"` where a human-readable
//! confirmation is part of the contract.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod departments;
pub mod doctors;
pub mod health;
pub mod lab_reports;
pub mod notifications;
pub mod patients;
pub mod payments;
pub mod prescriptions;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data: Some(data),
        count: None,
        message: None,
    })
}

pub fn ok_list<T: Serialize>(items: Vec<T>) -> Json<Envelope<Vec<T>>> {
    let count = items.len();
    Json(Envelope {
        success: true,
        data: Some(items),
        count: Some(count),
        message: None,
    })
}

pub fn ok_message(message: impl Into<String>) -> Json<Envelope<()>> {
    Json(Envelope {
        success: true,
        data: None,
        count: None,
        message: Some(message.into()),
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(data))
}
