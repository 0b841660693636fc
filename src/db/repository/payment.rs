use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{PaymentMethod, PaymentStatus};
use crate::models::Payment;

const PAYMENT_COLUMNS: &str =
    "id, patient_id, appointment_id, amount, status, method, transaction_id, created_at";

pub fn insert_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payments (id, patient_id, appointment_id, amount, status, method,
                               transaction_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            payment.id.to_string(),
            payment.patient_id.to_string(),
            payment.appointment_id.map(|a| a.to_string()),
            payment.amount,
            payment.status.as_str(),
            payment.method.as_str(),
            payment.transaction_id,
            payment.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub(crate) type PaymentRow = (
    String,
    String,
    Option<String>,
    f64,
    String,
    String,
    Option<String>,
    String,
);

fn payment_from_row(row: &Row<'_>) -> rusqlite::Result<PaymentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn build_payment(row: PaymentRow) -> Result<Payment, DatabaseError> {
    let (id, patient_id, appointment_id, amount, status, method, transaction_id, created_at) =
        row;
    Ok(Payment {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        appointment_id: appointment_id.as_deref().map(parse_uuid).transpose()?,
        amount,
        status: PaymentStatus::from_str(&status)?,
        method: PaymentMethod::from_str(&method)?,
        transaction_id,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn get_payment(conn: &Connection, id: &Uuid) -> Result<Option<Payment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"),
            params![id.to_string()],
            payment_from_row,
        )
        .optional()?;
    row.map(build_payment).transpose()
}

pub fn list_payments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE patient_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], payment_from_row)?;
    let mut payments = Vec::new();
    for row in rows {
        payments.push(build_payment(row?)?);
    }
    Ok(payments)
}

pub fn set_payment_status(
    conn: &Connection,
    id: &Uuid,
    status: PaymentStatus,
    transaction_id: Option<&str>,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE payments SET
             status = ?2,
             transaction_id = COALESCE(?3, transaction_id)
         WHERE id = ?1",
        params![id.to_string(), status.as_str(), transaction_id],
    )?;
    Ok(changed > 0)
}
