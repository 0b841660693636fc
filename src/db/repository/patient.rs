use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::PatientStatus;
use crate::models::{EmergencyContact, MedicalHistoryEntry, Patient};

const PATIENT_COLUMNS: &str = "id, user_id, age, gender, blood_group, phone, address,
     emergency_name, emergency_relationship, emergency_phone, status, created_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, user_id, age, gender, blood_group, phone, address,
                               emergency_name, emergency_relationship, emergency_phone,
                               status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            patient.id.to_string(),
            patient.user_id.to_string(),
            patient.age,
            patient.gender,
            patient.blood_group,
            patient.phone,
            patient.address,
            patient.emergency_contact.as_ref().map(|c| c.name.clone()),
            patient
                .emergency_contact
                .as_ref()
                .and_then(|c| c.relationship.clone()),
            patient
                .emergency_contact
                .as_ref()
                .and_then(|c| c.phone.clone()),
            patient.status.as_str(),
            patient.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
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
        row.get(11)?,
    ))
}

type PatientRow = (
    String,
    String,
    Option<u32>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    String,
);

fn build_patient(row: PatientRow) -> Result<Patient, DatabaseError> {
    let (
        id,
        user_id,
        age,
        gender,
        blood_group,
        phone,
        address,
        emergency_name,
        emergency_relationship,
        emergency_phone,
        status,
        created_at,
    ) = row;
    Ok(Patient {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        age,
        gender,
        blood_group,
        phone,
        address,
        emergency_contact: emergency_name.map(|name| EmergencyContact {
            name,
            relationship: emergency_relationship,
            phone: emergency_phone,
        }),
        status: PatientStatus::from_str(&status)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            patient_from_row,
        )
        .optional()?;
    row.map(build_patient).transpose()
}

pub fn get_patient_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE user_id = ?1"),
            params![user_id.to_string()],
            patient_from_row,
        )
        .optional()?;
    row.map(build_patient).transpose()
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map([], patient_from_row)?;
    let mut patients = Vec::new();
    for row in rows {
        patients.push(build_patient(row?)?);
    }
    Ok(patients)
}

/// Partial demographic update; only supplied fields change. A supplied
/// emergency contact replaces the stored one as a whole.
#[derive(Debug, Default, Clone)]
pub struct PatientUpdate {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub status: Option<PatientStatus>,
}

pub fn update_patient(
    conn: &Connection,
    id: &Uuid,
    update: &PatientUpdate,
) -> Result<bool, DatabaseError> {
    let contact = update.emergency_contact.as_ref();
    let changed = conn.execute(
        "UPDATE patients SET
             age = COALESCE(?2, age),
             gender = COALESCE(?3, gender),
             blood_group = COALESCE(?4, blood_group),
             phone = COALESCE(?5, phone),
             address = COALESCE(?6, address),
             emergency_name = COALESCE(?7, emergency_name),
             emergency_relationship = CASE WHEN ?7 IS NULL
                 THEN emergency_relationship ELSE ?8 END,
             emergency_phone = CASE WHEN ?7 IS NULL
                 THEN emergency_phone ELSE ?9 END,
             status = COALESCE(?10, status)
         WHERE id = ?1",
        params![
            id.to_string(),
            update.age,
            update.gender,
            update.blood_group,
            update.phone,
            update.address,
            contact.map(|c| c.name.clone()),
            contact.and_then(|c| c.relationship.clone()),
            contact.and_then(|c| c.phone.clone()),
            update.status.map(|s| s.as_str()),
        ],
    )?;
    Ok(changed > 0)
}

pub fn add_medical_history(
    conn: &Connection,
    entry: &MedicalHistoryEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medical_history (id, patient_id, condition, date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id.to_string(),
            entry.patient_id.to_string(),
            entry.condition,
            entry.date.map(|d| d.to_string()),
            entry.notes,
        ],
    )?;
    Ok(())
}

pub fn list_medical_history(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<MedicalHistoryEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, condition, date, notes
         FROM medical_history WHERE patient_id = ?1 ORDER BY date",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, patient_id, condition, date, notes) = row?;
        entries.push(MedicalHistoryEntry {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            condition,
            date: date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            notes,
        });
    }
    Ok(entries)
}
