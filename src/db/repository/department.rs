use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::DepartmentStatus;
use crate::models::Department;

/// Insert with skip-duplicate semantics. Returns `true` when a new row
/// was inserted, `false` when the unique name index already held the
/// entry. Existing rows are never modified.
pub fn insert_department_if_absent(
    conn: &Connection,
    dept: &Department,
) -> Result<bool, DatabaseError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO departments (id, name, description, head_doctor_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            dept.id.to_string(),
            dept.name,
            dept.description,
            dept.head_doctor_id.map(|d| d.to_string()),
            dept.status.as_str(),
            dept.created_at.to_rfc3339(),
        ],
    )?;
    Ok(inserted > 0)
}

pub fn get_department(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Department>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, description, head_doctor_id, status, created_at
             FROM departments WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, description, head, status, created_at)) = row else {
        return Ok(None);
    };
    Ok(Some(Department {
        id: parse_uuid(&id)?,
        name,
        description,
        head_doctor_id: head.as_deref().map(parse_uuid).transpose()?,
        status: DepartmentStatus::from_str(&status)?,
        created_at: parse_timestamp(&created_at)?,
    }))
}

pub fn list_departments(conn: &Connection) -> Result<Vec<Department>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, head_doctor_id, status, created_at
         FROM departments ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut departments = Vec::new();
    for row in rows {
        let (id, name, description, head, status, created_at) = row?;
        departments.push(Department {
            id: parse_uuid(&id)?,
            name,
            description,
            head_doctor_id: head.as_deref().map(parse_uuid).transpose()?,
            status: DepartmentStatus::from_str(&status)?,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(departments)
}

pub fn count_departments(conn: &Connection) -> Result<u32, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))?;
    Ok(count)
}
