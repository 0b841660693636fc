use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DepartmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub head_doctor_id: Option<Uuid>,
    pub status: DepartmentStatus,
    pub created_at: DateTime<Utc>,
}
