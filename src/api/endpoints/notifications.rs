//! Per-user notification inbox.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::endpoints::{ok_list, ok_message, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Notification;

/// `GET /api/notifications` — the caller's inbox, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Envelope<Vec<Notification>>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(ok_list(repository::list_notifications_for_user(
        &conn,
        &auth.user_id,
    )?))
}

/// `PATCH /api/notifications/:id/read` — owner only; a foreign id reads
/// as not found.
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let conn = ctx.lock_db()?;
    if !repository::mark_notification_read(&conn, &id, &auth.user_id)? {
        return Err(ApiError::NotFound("Notification not found".into()));
    }
    Ok(ok_message("Notification marked as read"))
}
