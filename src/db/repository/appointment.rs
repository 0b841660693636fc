use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, date, time, status, is_urgent,
     reason, consultation_notes, diagnosis, created_at";

pub fn insert_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, time, status, is_urgent,
                                   reason, consultation_notes, diagnosis, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appointment.id.to_string(),
            appointment.patient_id.to_string(),
            appointment.doctor_id.to_string(),
            appointment.date.to_string(),
            appointment.time,
            appointment.status.as_str(),
            appointment.is_urgent,
            appointment.reason,
            appointment.consultation_notes,
            appointment.diagnosis,
            appointment.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub(crate) type AppointmentRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    bool,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

pub(crate) fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

pub(crate) fn build_appointment(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (
        id,
        patient_id,
        doctor_id,
        date,
        time,
        status,
        is_urgent,
        reason,
        consultation_notes,
        diagnosis,
        created_at,
    ) = row;
    Ok(Appointment {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        time,
        status: AppointmentStatus::from_str(&status)?,
        is_urgent,
        reason,
        consultation_notes,
        diagnosis,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            appointment_from_row,
        )
        .optional()?;
    row.map(build_appointment).transpose()
}

/// Partial update; only supplied fields are written.
#[derive(Debug, Default, Clone)]
pub struct AppointmentChanges {
    pub status: Option<AppointmentStatus>,
    pub consultation_notes: Option<String>,
    pub diagnosis: Option<String>,
}

pub fn update_appointment(
    conn: &Connection,
    id: &Uuid,
    changes: &AppointmentChanges,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET
             status = COALESCE(?2, status),
             consultation_notes = COALESCE(?3, consultation_notes),
             diagnosis = COALESCE(?4, diagnosis)
         WHERE id = ?1",
        params![
            id.to_string(),
            changes.status.map(|s| s.as_str()),
            changes.consultation_notes,
            changes.diagnosis,
        ],
    )?;
    Ok(changed > 0)
}

pub fn set_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    Ok(changed > 0)
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::testutil::{seed_appointment, seed_doctor, seed_patient};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn insert_and_fetch() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, "Pat");
        let doctor = seed_doctor(&conn, "Doc");
        let appt = seed_appointment(
            &conn,
            &patient,
            &doctor,
            date("2025-03-10"),
            "09:30",
            AppointmentStatus::Pending,
        );

        let found = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(found.status, AppointmentStatus::Pending);
        assert_eq!(found.time, "09:30");
        assert_eq!(found.date, date("2025-03-10"));
    }

    #[test]
    fn partial_update_touches_only_supplied_fields() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, "Pat");
        let doctor = seed_doctor(&conn, "Doc");
        let appt = seed_appointment(
            &conn,
            &patient,
            &doctor,
            date("2025-03-10"),
            "09:30",
            AppointmentStatus::Confirmed,
        );

        update_appointment(
            &conn,
            &appt.id,
            &AppointmentChanges {
                diagnosis: Some("Migraine".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let found = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(found.diagnosis.as_deref(), Some("Migraine"));
        assert_eq!(found.status, AppointmentStatus::Confirmed);
        assert!(found.consultation_notes.is_none());
    }

    #[test]
    fn delete_reports_absence() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, "Pat");
        let doctor = seed_doctor(&conn, "Doc");
        let appt = seed_appointment(
            &conn,
            &patient,
            &doctor,
            date("2025-03-10"),
            "09:30",
            AppointmentStatus::Pending,
        );

        assert!(delete_appointment(&conn, &appt.id).unwrap());
        assert!(!delete_appointment(&conn, &appt.id).unwrap());
    }

    #[test]
    fn foreign_keys_reject_unknown_patient() {
        let conn = open_memory_database().unwrap();
        let doctor = seed_doctor(&conn, "Doc");
        let orphan = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: doctor.id,
            date: date("2025-03-10"),
            time: "10:00".into(),
            status: AppointmentStatus::Pending,
            is_urgent: false,
            reason: None,
            consultation_notes: None,
            diagnosis: None,
            created_at: chrono::Utc::now(),
        };
        assert!(insert_appointment(&conn, &orphan).is_err());
    }
}
