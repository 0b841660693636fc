use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Doctor;

const DOCTOR_COLUMNS: &str =
    "id, user_id, specialization, fee, available, department_id, created_at";

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, user_id, specialization, fee, available, department_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            doctor.id.to_string(),
            doctor.user_id.to_string(),
            doctor.specialization,
            doctor.fee,
            doctor.available,
            doctor.department_id.map(|d| d.to_string()),
            doctor.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

type DoctorRow = (
    String,
    String,
    String,
    f64,
    bool,
    Option<String>,
    String,
);

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn build_doctor(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    let (id, user_id, specialization, fee, available, department_id, created_at) = row;
    Ok(Doctor {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        specialization,
        fee,
        available,
        department_id: department_id.as_deref().map(parse_uuid).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
            params![id.to_string()],
            doctor_from_row,
        )
        .optional()?;
    row.map(build_doctor).transpose()
}

pub fn get_doctor_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE user_id = ?1"),
            params![user_id.to_string()],
            doctor_from_row,
        )
        .optional()?;
    row.map(build_doctor).transpose()
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY created_at"
    ))?;
    let rows = stmt.query_map([], doctor_from_row)?;
    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(build_doctor(row?)?);
    }
    Ok(doctors)
}

/// Partial update; only supplied fields change.
#[derive(Debug, Default, Clone)]
pub struct DoctorUpdate {
    pub specialization: Option<String>,
    pub fee: Option<f64>,
    pub available: Option<bool>,
    pub department_id: Option<Uuid>,
}

pub fn update_doctor(
    conn: &Connection,
    id: &Uuid,
    update: &DoctorUpdate,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET
             specialization = COALESCE(?2, specialization),
             fee = COALESCE(?3, fee),
             available = COALESCE(?4, available),
             department_id = COALESCE(?5, department_id)
         WHERE id = ?1",
        params![
            id.to_string(),
            update.specialization,
            update.fee,
            update.available,
            update.department_id.map(|d| d.to_string()),
        ],
    )?;
    Ok(changed > 0)
}

/// Hard delete. Appointments, prescriptions and lab reports referencing
/// the doctor cascade away with it.
pub fn delete_doctor(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM doctors WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(changed > 0)
}
