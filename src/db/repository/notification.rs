use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Notification;

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, title, message, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            notification.id.to_string(),
            notification.user_id.to_string(),
            notification.title,
            notification.message,
            notification.read,
            notification.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_notifications_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, title, message, read, created_at
         FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, bool>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        let (id, user_id, title, message, read, created_at) = row?;
        notifications.push(Notification {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            title,
            message,
            read,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(notifications)
}

/// Mark read only for the owning user; other users' ids do not match.
pub fn mark_notification_read(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1 AND user_id = ?2",
        params![id.to_string(), user_id.to_string()],
    )?;
    Ok(changed > 0)
}
