use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    pub fee: f64,
    pub available: bool,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
