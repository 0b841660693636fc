use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, role, is_online, last_login, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.password_hash,
            user.role.as_str(),
            user.is_online,
            user.last_login.map(|t| t.to_rfc3339()),
            user.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    fetch_user(conn, "id = ?1", &id.to_string())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    fetch_user(conn, "email = ?1", email)
}

fn fetch_user(conn: &Connection, clause: &str, value: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!(
        "SELECT id, name, email, password_hash, role, is_online, last_login, created_at
         FROM users WHERE {clause}"
    );
    let row = conn
        .query_row(&sql, params![value], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, String>(7)?,
            ))
        })
        .optional()?;

    let Some((id, name, email, password_hash, role, is_online, last_login, created_at)) = row
    else {
        return Ok(None);
    };

    Ok(Some(User {
        id: parse_uuid(&id)?,
        name,
        email,
        password_hash,
        role: Role::from_str(&role)?,
        is_online,
        last_login: last_login.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    }))
}

/// Mark a user online and stamp their last login.
pub fn record_login(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE users SET is_online = 1, last_login = ?2 WHERE id = ?1",
        params![id.to_string(), Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

pub fn record_logout(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE users SET is_online = 0 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}
