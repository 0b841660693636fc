use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The literal is both the wire string (serde rename) and the stored
/// column value, so JSON and SQLite always agree.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Admin => "Admin",
    Doctor => "Doctor",
    Patient => "Patient",
    Pharmacist => "Pharmacist",
});

str_enum!(PatientStatus {
    Active => "Active",
    Blocked => "Blocked",
});

str_enum!(DepartmentStatus {
    Active => "Active",
    Inactive => "Inactive",
});

str_enum!(AppointmentStatus {
    Pending => "Pending",
    Confirmed => "Confirmed",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

// Pharmacy-managed lifecycle; upper-case strings come from the pharmacy
// route contract and are preserved as-is.
str_enum!(PrescriptionStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Dispensed => "DISPENSED",
});

str_enum!(PaymentStatus {
    Pending => "Pending",
    Paid => "Paid",
    Failed => "Failed",
});

str_enum!(PaymentMethod {
    Cash => "Cash",
    Card => "Card",
    Insurance => "Insurance",
});

str_enum!(LabReportStatus {
    Pending => "Pending",
    Completed => "Completed",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trip() {
        for (variant, s) in [
            (Role::Admin, "Admin"),
            (Role::Doctor, "Doctor"),
            (Role::Patient, "Patient"),
            (Role::Pharmacist, "Pharmacist"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Role::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Pending, "Pending"),
            (AppointmentStatus::Confirmed, "Confirmed"),
            (AppointmentStatus::Completed, "Completed"),
            (AppointmentStatus::Cancelled, "Cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn prescription_status_uses_upper_case_wire_strings() {
        assert_eq!(PrescriptionStatus::Pending.as_str(), "PENDING");
        assert_eq!(
            PrescriptionStatus::from_str("DISPENSED").unwrap(),
            PrescriptionStatus::Dispensed
        );
        // Lower-case is not the pharmacy contract
        assert!(PrescriptionStatus::from_str("pending").is_err());
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&PrescriptionStatus::Approved).unwrap();
        assert_eq!(json, "\"APPROVED\"");
        let status: AppointmentStatus = serde_json::from_str("\"Confirmed\"").unwrap();
        assert_eq!(status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Role::from_str("SuperUser").is_err());
        assert!(AppointmentStatus::from_str("NoShow").is_err());
        assert!(PaymentMethod::from_str("").is_err());
    }
}
