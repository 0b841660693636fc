//! Status workflow engine for appointments, prescriptions and payments.
//!
//! Transitions are validated against explicit tables; illegal moves are
//! rejected instead of silently written. The one cross-entity rule —
//! creating a prescription completes its appointment — runs inside a
//! single SQLite transaction.

pub mod appointment;
pub mod payment;
pub mod prescription;

pub use appointment::*;
pub use payment::*;
pub use prescription::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
