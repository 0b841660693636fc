//! Billing endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::{created, ok, ok_list, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::db::repository;
use crate::models::enums::{PaymentMethod, PaymentStatus};
use crate::models::Payment;
use crate::workflow;
use crate::workflow::NewPayment;

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
}

/// `POST /api/payments` — a new payment starts Pending.
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Envelope<Payment>>), ApiError> {
    let input = NewPayment {
        patient_id: body
            .patient_id
            .ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?,
        appointment_id: body.appointment_id,
        amount: body
            .amount
            .ok_or_else(|| ApiError::BadRequest("amount is required".into()))?,
        method: body.method.unwrap_or(PaymentMethod::Cash),
    };

    let conn = ctx.lock_db()?;
    let payment = workflow::create_payment(&conn, input)?;
    Ok(created(payment))
}

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

/// `PATCH /api/payments/:id` — settle or fail a pending payment.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdatePaymentRequest>,
) -> Result<Json<Envelope<Payment>>, ApiError> {
    let status = body
        .status
        .ok_or_else(|| ApiError::BadRequest("status is required".into()))?;
    let conn = ctx.lock_db()?;
    let payment =
        workflow::update_payment_status(&conn, &id, status, body.transaction_id.as_deref())?;
    Ok(ok(payment))
}

/// `GET /api/payments/patient/:id` — newest first.
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<Payment>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(repository::list_payments_by_patient(
        &conn,
        &patient_id,
    )?))
}
