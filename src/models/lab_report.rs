use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::LabReportStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabReport {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub test_name: String,
    pub result: Option<String>,
    pub status: LabReportStatus,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
