//! Appointment lifecycle: Pending → {Confirmed, Cancelled},
//! Confirmed → {Completed, Cancelled}; Completed and Cancelled are
//! terminal. Listing variants populate patient/doctor names and use
//! audience-specific orderings (patient: newest first, doctor: oldest
//! first) — the asymmetry is part of the contract.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository::{
    self, appointment_from_row, build_appointment, AppointmentChanges,
};
use crate::models::enums::AppointmentStatus;
use crate::models::{Appointment, Notification};
use crate::workflow::WorkflowError;

impl AppointmentStatus {
    /// Legal successor states. Re-asserting the current status is
    /// treated as a no-op by the update path, not a transition.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

/// Inputs for appointment creation. `status` overrides the Pending
/// default when supplied (administrative bookings use this).
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub is_urgent: bool,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}

pub fn create_appointment(
    conn: &Connection,
    input: NewAppointment,
) -> Result<Appointment, WorkflowError> {
    if input.time.trim().is_empty() {
        return Err(WorkflowError::InvalidInput(
            "Appointment time is required".into(),
        ));
    }
    if repository::get_patient(conn, &input.patient_id)?.is_none() {
        return Err(WorkflowError::NotFound("Patient".into()));
    }
    if repository::get_doctor(conn, &input.doctor_id)?.is_none() {
        return Err(WorkflowError::NotFound("Doctor".into()));
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: input.patient_id,
        doctor_id: input.doctor_id,
        date: input.date,
        time: input.time,
        status: input.status.unwrap_or(AppointmentStatus::Pending),
        is_urgent: input.is_urgent,
        reason: input.reason,
        consultation_notes: None,
        diagnosis: None,
        created_at: Utc::now(),
    };
    repository::insert_appointment(conn, &appointment)?;

    tracing::info!(
        appointment_id = %appointment.id,
        status = appointment.status.as_str(),
        "Appointment created"
    );
    Ok(appointment)
}

/// Partial update of status, consultation notes and diagnosis. A status
/// change must be a legal transition from the current state; confirmed
/// and cancelled transitions notify the patient.
pub fn update_appointment(
    conn: &Connection,
    id: &Uuid,
    changes: AppointmentChanges,
) -> Result<Appointment, WorkflowError> {
    let current = repository::get_appointment(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Appointment".into()))?;

    if let Some(next) = changes.status {
        if next != current.status && !current.status.can_transition_to(next) {
            return Err(WorkflowError::InvalidInput(format!(
                "Cannot move appointment from {} to {}",
                current.status.as_str(),
                next.as_str()
            )));
        }
    }

    repository::update_appointment(conn, id, &changes)?;

    if let Some(next) = changes.status {
        if next != current.status {
            tracing::info!(
                appointment_id = %id,
                from = current.status.as_str(),
                to = next.as_str(),
                "Appointment status changed"
            );
            if matches!(
                next,
                AppointmentStatus::Confirmed | AppointmentStatus::Cancelled
            ) {
                notify_patient(conn, &current, next)?;
            }
        }
    }

    repository::get_appointment(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Appointment".into()))
}

fn notify_patient(
    conn: &Connection,
    appointment: &Appointment,
    status: AppointmentStatus,
) -> Result<(), WorkflowError> {
    let Some(patient) = repository::get_patient(conn, &appointment.patient_id)? else {
        return Ok(());
    };
    let title = match status {
        AppointmentStatus::Confirmed => "Appointment confirmed",
        AppointmentStatus::Cancelled => "Appointment cancelled",
        _ => return Ok(()),
    };
    repository::insert_notification(
        conn,
        &Notification {
            id: Uuid::new_v4(),
            user_id: patient.user_id,
            title: title.into(),
            message: format!(
                "Your appointment on {} at {} is now {}",
                appointment.date,
                appointment.time,
                status.as_str()
            ),
            read: false,
            created_at: Utc::now(),
        },
    )?;
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), WorkflowError> {
    if !repository::delete_appointment(conn, id)? {
        return Err(WorkflowError::NotFound("Appointment".into()));
    }
    tracing::info!(appointment_id = %id, "Appointment deleted");
    Ok(())
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Appointment with patient/doctor display names populated from the
/// owning user records.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub doctor_name: String,
    pub doctor_specialization: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Ascending,
    Descending,
}

fn list_view(
    conn: &Connection,
    clause: Option<&str>,
    value: Option<&str>,
    order: SortOrder,
) -> Result<Vec<AppointmentView>, WorkflowError> {
    let direction = match order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };
    let where_clause = clause.map(|c| format!("WHERE {c}")).unwrap_or_default();
    let sql = format!(
        "SELECT a.id, a.patient_id, a.doctor_id, a.date, a.time, a.status, a.is_urgent,
                a.reason, a.consultation_notes, a.diagnosis, a.created_at,
                pu.name AS patient_name, du.name AS doctor_name, d.specialization
         FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         JOIN users pu ON p.user_id = pu.id
         JOIN doctors d ON a.doctor_id = d.id
         JOIN users du ON d.user_id = du.id
         {where_clause}
         ORDER BY a.date {direction}, a.time {direction}"
    );

    let mut stmt = conn.prepare(&sql).map_err(crate::db::DatabaseError::from)?;
    let map_row = |row: &rusqlite::Row<'_>| {
        Ok((
            appointment_from_row(row)?,
            row.get::<_, String>(11)?,
            row.get::<_, String>(12)?,
            row.get::<_, String>(13)?,
        ))
    };
    let mut raw = Vec::new();
    match value {
        Some(v) => {
            let rows = stmt
                .query_map(params![v], map_row)
                .map_err(crate::db::DatabaseError::from)?;
            for row in rows {
                raw.push(row.map_err(crate::db::DatabaseError::from)?);
            }
        }
        None => {
            let rows = stmt
                .query_map([], map_row)
                .map_err(crate::db::DatabaseError::from)?;
            for row in rows {
                raw.push(row.map_err(crate::db::DatabaseError::from)?);
            }
        }
    }

    let mut views = Vec::new();
    for (row, patient_name, doctor_name, doctor_specialization) in raw {
        views.push(AppointmentView {
            appointment: build_appointment(row)?,
            patient_name,
            doctor_name,
            doctor_specialization,
        });
    }
    Ok(views)
}

/// All appointments, newest first (admin dashboard view).
pub fn list_appointments(conn: &Connection) -> Result<Vec<AppointmentView>, WorkflowError> {
    list_view(conn, None, None, SortOrder::Descending)
}

/// A patient's appointments, newest first.
pub fn list_appointments_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<AppointmentView>, WorkflowError> {
    list_view(
        conn,
        Some("a.patient_id = ?1"),
        Some(&patient_id.to_string()),
        SortOrder::Descending,
    )
}

/// A doctor's appointments, oldest first (working-queue order).
pub fn list_appointments_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<AppointmentView>, WorkflowError> {
    list_view(
        conn,
        Some("a.doctor_id = ?1"),
        Some(&doctor_id.to_string()),
        SortOrder::Ascending,
    )
}
