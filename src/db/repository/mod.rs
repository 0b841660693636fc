pub mod appointment;
pub mod department;
pub mod doctor;
pub mod lab_report;
pub mod notification;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod user;

pub use appointment::*;
pub use department::*;
pub use doctor::*;
pub use lab_report::*;
pub use notification::*;
pub use patient::*;
pub use payment::*;
pub use prescription::*;
pub use user::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DatabaseError;

/// Parse a stored TEXT id back into a Uuid.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
