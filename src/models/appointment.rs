use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Clock time kept as an opaque string ("09:30", "2:15 PM"); the
    /// scheduler never does arithmetic on it, only lexical ordering
    /// within a day.
    pub time: String,
    pub status: AppointmentStatus,
    pub is_urgent: bool,
    pub reason: Option<String>,
    pub consultation_notes: Option<String>,
    pub diagnosis: Option<String>,
    pub created_at: DateTime<Utc>,
}
