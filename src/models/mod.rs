pub mod appointment;
pub mod department;
pub mod doctor;
pub mod enums;
pub mod lab_report;
pub mod notification;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod user;

pub use appointment::*;
pub use department::*;
pub use doctor::*;
pub use enums::*;
pub use lab_report::*;
pub use notification::*;
pub use patient::*;
pub use payment::*;
pub use prescription::*;
pub use user::*;
