//! Idempotent department catalog seeding, run on every boot.

use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository::{count_departments, insert_department_if_absent};
use crate::db::DatabaseError;
use crate::models::enums::DepartmentStatus;
use crate::models::Department;

/// The sixteen standard hospital departments.
const DEPARTMENT_CATALOG: [(&str, &str); 16] = [
    ("Cardiology", "Heart and cardiovascular system"),
    ("Neurology", "Brain, spine and nervous system"),
    ("Orthopedics", "Bones, joints and muscles"),
    ("Pediatrics", "Medical care for infants and children"),
    ("Oncology", "Cancer diagnosis and treatment"),
    ("Dermatology", "Skin, hair and nail conditions"),
    ("Gynecology", "Female reproductive health"),
    ("Urology", "Urinary tract and male reproductive system"),
    ("Ophthalmology", "Eye and vision care"),
    ("ENT", "Ear, nose and throat"),
    ("Psychiatry", "Mental health and behavioral disorders"),
    ("Radiology", "Medical imaging and diagnostics"),
    ("Anesthesiology", "Anesthesia and perioperative care"),
    ("Emergency", "Emergency and trauma care"),
    ("General Medicine", "Primary and internal medicine"),
    ("Pathology", "Laboratory analysis of tissue and fluids"),
];

#[derive(Debug, Serialize)]
pub struct SeedOutcome {
    pub inserted: u32,
    pub total: u32,
}

/// Insert any catalog departments that are missing. Existing rows are
/// never modified, so re-running is safe and cheap.
pub fn seed_departments(conn: &Connection) -> Result<SeedOutcome, DatabaseError> {
    let mut inserted = 0;
    for (name, description) in DEPARTMENT_CATALOG {
        let dept = Department {
            id: Uuid::new_v4(),
            name: name.into(),
            description: Some(description.into()),
            head_doctor_id: None,
            status: DepartmentStatus::Active,
            created_at: Utc::now(),
        };
        if insert_department_if_absent(conn, &dept)? {
            inserted += 1;
        }
    }
    let total = count_departments(conn)?;
    if inserted > 0 {
        tracing::info!(inserted, total, "Seeded department catalog");
    }
    Ok(SeedOutcome { inserted, total })
}
