use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrescriptionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: Option<String>,
    pub instructions: Option<String>,
    pub medicines: Vec<Medicine>,
    pub status: PrescriptionStatus,
    pub pharmacy_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub dosage: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}
