use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::{Medicine, Prescription};

const PRESCRIPTION_COLUMNS: &str = "id, patient_id, doctor_id, appointment_id, diagnosis,
     instructions, status, pharmacy_notes, created_at";

/// Insert the prescription row plus its medicine child rows. The caller
/// decides whether this runs inside a transaction (prescription creation
/// does, to pair with the appointment side effect).
pub fn insert_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, doctor_id, appointment_id, diagnosis,
                                    instructions, status, pharmacy_notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            prescription.id.to_string(),
            prescription.patient_id.to_string(),
            prescription.doctor_id.to_string(),
            prescription.appointment_id.to_string(),
            prescription.diagnosis,
            prescription.instructions,
            prescription.status.as_str(),
            prescription.pharmacy_notes,
            prescription.created_at.to_rfc3339(),
        ],
    )?;
    insert_medicines(conn, &prescription.id, &prescription.medicines)?;
    Ok(())
}

fn insert_medicines(
    conn: &Connection,
    prescription_id: &Uuid,
    medicines: &[Medicine],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO prescription_medicines (id, prescription_id, name, dosage, duration, instructions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for med in medicines {
        stmt.execute(params![
            Uuid::new_v4().to_string(),
            prescription_id.to_string(),
            med.name,
            med.dosage,
            med.duration,
            med.instructions,
        ])?;
    }
    Ok(())
}

fn fetch_medicines(
    conn: &Connection,
    prescription_id: &str,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name, dosage, duration, instructions
         FROM prescription_medicines WHERE prescription_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![prescription_id], |row| {
        Ok(Medicine {
            name: row.get(0)?,
            dosage: row.get(1)?,
            duration: row.get(2)?,
            instructions: row.get(3)?,
        })
    })?;
    let mut medicines = Vec::new();
    for row in rows {
        medicines.push(row?);
    }
    Ok(medicines)
}

pub(crate) type PrescriptionRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    String,
);

fn prescription_from_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionRow> {
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
    ))
}

fn build_prescription(
    conn: &Connection,
    row: PrescriptionRow,
) -> Result<Prescription, DatabaseError> {
    let (
        id,
        patient_id,
        doctor_id,
        appointment_id,
        diagnosis,
        instructions,
        status,
        pharmacy_notes,
        created_at,
    ) = row;
    let medicines = fetch_medicines(conn, &id)?;
    Ok(Prescription {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        appointment_id: parse_uuid(&appointment_id)?,
        diagnosis,
        instructions,
        medicines,
        status: PrescriptionStatus::from_str(&status)?,
        pharmacy_notes,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn get_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1"),
            params![id.to_string()],
            prescription_from_row,
        )
        .optional()?;
    row.map(|r| build_prescription(conn, r)).transpose()
}

fn list_where(
    conn: &Connection,
    clause: &str,
    value: &str,
) -> Result<Vec<Prescription>, DatabaseError> {
    let sql = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions
         WHERE {clause} ORDER BY created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![value], prescription_from_row)?;
    let mut raw = Vec::new();
    for row in rows {
        raw.push(row?);
    }
    raw.into_iter()
        .map(|r| build_prescription(conn, r))
        .collect()
}

pub fn list_prescriptions(conn: &Connection) -> Result<Vec<Prescription>, DatabaseError> {
    let sql = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions ORDER BY created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], prescription_from_row)?;
    let mut raw = Vec::new();
    for row in rows {
        raw.push(row?);
    }
    raw.into_iter()
        .map(|r| build_prescription(conn, r))
        .collect()
}

pub fn list_prescriptions_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    list_where(conn, "patient_id = ?1", &patient_id.to_string())
}

pub fn list_prescriptions_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    list_where(conn, "doctor_id = ?1", &doctor_id.to_string())
}

pub fn list_prescriptions_by_status(
    conn: &Connection,
    status: PrescriptionStatus,
) -> Result<Vec<Prescription>, DatabaseError> {
    list_where(conn, "status = ?1", status.as_str())
}

/// Replace editable fields set by the authoring doctor. Medicines are
/// replaced wholesale when supplied.
pub fn update_prescription_content(
    conn: &Connection,
    id: &Uuid,
    diagnosis: Option<&str>,
    instructions: Option<&str>,
    medicines: Option<&[Medicine]>,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET
             diagnosis = COALESCE(?2, diagnosis),
             instructions = COALESCE(?3, instructions)
         WHERE id = ?1",
        params![id.to_string(), diagnosis, instructions],
    )?;
    if changed == 0 {
        return Ok(false);
    }
    if let Some(medicines) = medicines {
        conn.execute(
            "DELETE FROM prescription_medicines WHERE prescription_id = ?1",
            params![id.to_string()],
        )?;
        insert_medicines(conn, id, medicines)?;
    }
    Ok(true)
}

pub fn set_prescription_status(
    conn: &Connection,
    id: &Uuid,
    status: PrescriptionStatus,
    pharmacy_notes: Option<&str>,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET
             status = ?2,
             pharmacy_notes = COALESCE(?3, pharmacy_notes)
         WHERE id = ?1",
        params![id.to_string(), status.as_str(), pharmacy_notes],
    )?;
    Ok(changed > 0)
}
