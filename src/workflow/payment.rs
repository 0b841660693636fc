//! Payment lifecycle. Pending is the only non-terminal state.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::models::enums::{PaymentMethod, PaymentStatus};
use crate::models::Payment;
use crate::workflow::WorkflowError;

impl PaymentStatus {
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!((self, next), (Pending, Paid) | (Pending, Failed))
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub amount: f64,
    pub method: PaymentMethod,
}

pub fn create_payment(
    conn: &Connection,
    input: NewPayment,
) -> Result<Payment, WorkflowError> {
    if input.amount <= 0.0 {
        return Err(WorkflowError::InvalidInput(
            "Payment amount must be positive".into(),
        ));
    }
    if repository::get_patient(conn, &input.patient_id)?.is_none() {
        return Err(WorkflowError::NotFound("Patient".into()));
    }
    if let Some(appointment_id) = input.appointment_id {
        if repository::get_appointment(conn, &appointment_id)?.is_none() {
            return Err(WorkflowError::NotFound("Appointment".into()));
        }
    }

    let payment = Payment {
        id: Uuid::new_v4(),
        patient_id: input.patient_id,
        appointment_id: input.appointment_id,
        amount: input.amount,
        status: PaymentStatus::Pending,
        method: input.method,
        transaction_id: None,
        created_at: Utc::now(),
    };
    repository::insert_payment(conn, &payment)?;
    tracing::info!(payment_id = %payment.id, amount = payment.amount, "Payment created");
    Ok(payment)
}

/// Settle or fail a pending payment. Paid and Failed are terminal.
pub fn update_payment_status(
    conn: &Connection,
    id: &Uuid,
    next: PaymentStatus,
    transaction_id: Option<&str>,
) -> Result<Payment, WorkflowError> {
    let payment = repository::get_payment(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Payment".into()))?;

    if !payment.status.can_transition_to(next) {
        return Err(WorkflowError::InvalidInput(format!(
            "Cannot move payment from {} to {}",
            payment.status.as_str(),
            next.as_str()
        )));
    }

    repository::set_payment_status(conn, id, next, transaction_id)?;
    tracing::info!(payment_id = %id, to = next.as_str(), "Payment status changed");
    repository::get_payment(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Payment".into()))
}
