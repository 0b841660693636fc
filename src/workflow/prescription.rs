//! Prescription lifecycle: doctor issuance, pharmacy adjudication.
//!
//! PENDING → {APPROVED, REJECTED}, APPROVED → DISPENSED. Creation is the
//! single cross-entity write in the system: the prescription insert and
//! the parent appointment's completion commit in one transaction.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::models::enums::{PrescriptionStatus, Role};
use crate::models::{Medicine, Notification, Prescription};
use crate::workflow::WorkflowError;

/// Default note recorded when a pharmacist approves without comment.
const DEFAULT_APPROVAL_NOTE: &str = "Approved by pharmacist";

impl PrescriptionStatus {
    pub fn can_transition_to(self, next: PrescriptionStatus) -> bool {
        use PrescriptionStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Dispensed)
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: Option<String>,
    pub instructions: Option<String>,
    pub medicines: Vec<Medicine>,
}

/// Doctor-initiated creation. The calling user must own a doctor
/// profile matching the appointment's doctor. On success the parent
/// appointment is marked Completed in the same transaction.
pub fn create_prescription(
    conn: &mut Connection,
    caller_user_id: &Uuid,
    input: NewPrescription,
) -> Result<Prescription, WorkflowError> {
    let doctor = repository::get_doctor_by_user(conn, caller_user_id)?
        .ok_or_else(|| WorkflowError::NotFound("Doctor profile".into()))?;

    let appointment = repository::get_appointment(conn, &input.appointment_id)?
        .ok_or_else(|| WorkflowError::NotFound("Appointment".into()))?;

    if appointment.doctor_id != doctor.id {
        return Err(WorkflowError::Unauthorized(
            "Prescriptions can only be issued for your own appointments".into(),
        ));
    }
    if repository::get_patient(conn, &input.patient_id)?.is_none() {
        return Err(WorkflowError::NotFound("Patient".into()));
    }

    let prescription = Prescription {
        id: Uuid::new_v4(),
        patient_id: input.patient_id,
        doctor_id: doctor.id,
        appointment_id: appointment.id,
        diagnosis: input.diagnosis,
        instructions: input.instructions,
        medicines: input.medicines,
        status: PrescriptionStatus::Pending,
        pharmacy_notes: None,
        created_at: Utc::now(),
    };

    // Prescription insert + appointment completion commit together.
    let tx = conn.transaction().map_err(crate::db::DatabaseError::from)?;
    repository::insert_prescription(&tx, &prescription)?;
    repository::set_appointment_status(
        &tx,
        &appointment.id,
        crate::models::enums::AppointmentStatus::Completed,
    )?;
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        prescription_id = %prescription.id,
        appointment_id = %appointment.id,
        "Prescription created, appointment completed"
    );
    Ok(prescription)
}

#[derive(Debug, Default, Clone)]
pub struct PrescriptionChanges {
    pub diagnosis: Option<String>,
    pub instructions: Option<String>,
    pub medicines: Option<Vec<Medicine>>,
}

/// Only the authoring doctor may edit content.
pub fn update_prescription(
    conn: &Connection,
    caller_user_id: &Uuid,
    id: &Uuid,
    changes: PrescriptionChanges,
) -> Result<Prescription, WorkflowError> {
    let prescription = repository::get_prescription(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Prescription".into()))?;

    let doctor = repository::get_doctor_by_user(conn, caller_user_id)?
        .ok_or_else(|| WorkflowError::Unauthorized("No doctor profile".into()))?;
    if prescription.doctor_id != doctor.id {
        return Err(WorkflowError::Unauthorized(
            "Only the prescribing doctor can update this prescription".into(),
        ));
    }

    repository::update_prescription_content(
        conn,
        id,
        changes.diagnosis.as_deref(),
        changes.instructions.as_deref(),
        changes.medicines.as_deref(),
    )?;

    repository::get_prescription(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Prescription".into()))
}

/// Pharmacist approval. PENDING only; notes default to a canned message.
pub fn approve_prescription(
    conn: &Connection,
    id: &Uuid,
    notes: Option<String>,
) -> Result<Prescription, WorkflowError> {
    adjudicate(
        conn,
        id,
        PrescriptionStatus::Approved,
        Some(notes.unwrap_or_else(|| DEFAULT_APPROVAL_NOTE.into())),
    )
}

/// Pharmacist rejection. A non-empty reason is mandatory and recorded
/// as the pharmacy notes.
pub fn reject_prescription(
    conn: &Connection,
    id: &Uuid,
    notes: Option<String>,
) -> Result<Prescription, WorkflowError> {
    let notes = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            WorkflowError::InvalidInput("Rejection requires a reason in notes".into())
        })?;
    adjudicate(conn, id, PrescriptionStatus::Rejected, Some(notes))
}

/// Hand the medication over. APPROVED only.
pub fn dispense_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Prescription, WorkflowError> {
    adjudicate(conn, id, PrescriptionStatus::Dispensed, None)
}

fn adjudicate(
    conn: &Connection,
    id: &Uuid,
    next: PrescriptionStatus,
    notes: Option<String>,
) -> Result<Prescription, WorkflowError> {
    let prescription = repository::get_prescription(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Prescription".into()))?;

    if !prescription.status.can_transition_to(next) {
        return Err(WorkflowError::InvalidInput(format!(
            "Cannot move prescription from {} to {}",
            prescription.status.as_str(),
            next.as_str()
        )));
    }

    repository::set_prescription_status(conn, id, next, notes.as_deref())?;
    tracing::info!(
        prescription_id = %id,
        from = prescription.status.as_str(),
        to = next.as_str(),
        "Prescription adjudicated"
    );

    if matches!(
        next,
        PrescriptionStatus::Approved | PrescriptionStatus::Rejected
    ) {
        notify_patient(conn, &prescription, next)?;
    }

    repository::get_prescription(conn, id)?
        .ok_or_else(|| WorkflowError::NotFound("Prescription".into()))
}

fn notify_patient(
    conn: &Connection,
    prescription: &Prescription,
    status: PrescriptionStatus,
) -> Result<(), WorkflowError> {
    let Some(patient) = repository::get_patient(conn, &prescription.patient_id)? else {
        return Ok(());
    };
    let title = match status {
        PrescriptionStatus::Approved => "Prescription approved",
        PrescriptionStatus::Rejected => "Prescription rejected",
        _ => return Ok(()),
    };
    repository::insert_notification(
        conn,
        &Notification {
            id: Uuid::new_v4(),
            user_id: patient.user_id,
            title: title.into(),
            message: format!("Your prescription is now {}", status.as_str()),
            read: false,
            created_at: Utc::now(),
        },
    )?;
    Ok(())
}

// ─── Role-scoped queries ─────────────────────────────────────────────────────

/// Prescriptions visible to the calling user: doctors see what they
/// prescribed, patients what they were prescribed, staff roles see all.
pub fn list_prescriptions_for_caller(
    conn: &Connection,
    caller_user_id: &Uuid,
    role: Role,
) -> Result<Vec<Prescription>, WorkflowError> {
    match role {
        Role::Doctor => {
            let doctor = repository::get_doctor_by_user(conn, caller_user_id)?
                .ok_or_else(|| WorkflowError::NotFound("Doctor profile".into()))?;
            Ok(repository::list_prescriptions_by_doctor(conn, &doctor.id)?)
        }
        Role::Patient => {
            let patient = repository::get_patient_by_user(conn, caller_user_id)?
                .ok_or_else(|| WorkflowError::NotFound("Patient profile".into()))?;
            Ok(repository::list_prescriptions_by_patient(conn, &patient.id)?)
        }
        Role::Admin | Role::Pharmacist => Ok(repository::list_prescriptions(conn)?),
    }
}

/// Guard for the by-patient and by-doctor query paths: admins pass,
/// pharmacists pass (they adjudicate), owners pass, everyone else is
/// rejected.
pub fn authorize_scope(
    conn: &Connection,
    caller_user_id: &Uuid,
    role: Role,
    patient_scope: Option<&Uuid>,
    doctor_scope: Option<&Uuid>,
) -> Result<(), WorkflowError> {
    match role {
        Role::Admin | Role::Pharmacist => Ok(()),
        Role::Patient => {
            if let Some(patient_id) = patient_scope {
                let patient = repository::get_patient_by_user(conn, caller_user_id)?;
                if patient.map(|p| p.id) == Some(*patient_id) {
                    return Ok(());
                }
            }
            Err(WorkflowError::Unauthorized(
                "Not entitled to view this patient's records".into(),
            ))
        }
        Role::Doctor => {
            if let Some(doctor_id) = doctor_scope {
                let doctor = repository::get_doctor_by_user(conn, caller_user_id)?;
                if doctor.map(|d| d.id) == Some(*doctor_id) {
                    return Ok(());
                }
            }
            Err(WorkflowError::Unauthorized(
                "Not entitled to view this doctor's records".into(),
            ))
        }
    }
}
