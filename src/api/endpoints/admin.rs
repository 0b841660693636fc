//! Admin dashboard endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;

use crate::analytics::{fetch_analytics, AnalyticsResponse};
use crate::api::endpoints::{ok, Envelope};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::models::enums::Role;

/// `GET /api/admin/analytics` — dashboard aggregation, admin only.
pub async fn analytics(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Envelope<AnalyticsResponse>>, ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Unauthorized("Admin access required".into()));
    }
    let conn = ctx.lock_db()?;
    Ok(ok(fetch_analytics(&conn, Utc::now().date_naive())?))
}
