//! Shared fixtures for repository, workflow and analytics tests.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{
    insert_appointment, insert_doctor, insert_patient, insert_user,
};
use crate::models::enums::{AppointmentStatus, PatientStatus, Role};
use crate::models::{Appointment, Doctor, Patient, User};

pub fn seed_user(conn: &Connection, name: &str, role: Role) -> User {
    let user = User {
        id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{}@clinic.test", Uuid::new_v4()),
        password_hash: "test-hash".into(),
        role,
        is_online: false,
        last_login: None,
        created_at: Utc::now(),
    };
    insert_user(conn, &user).unwrap();
    user
}

pub fn seed_patient(conn: &Connection, name: &str) -> Patient {
    let user = seed_user(conn, name, Role::Patient);
    let patient = Patient {
        id: Uuid::new_v4(),
        user_id: user.id,
        age: Some(40),
        gender: None,
        blood_group: None,
        phone: None,
        address: None,
        emergency_contact: None,
        status: PatientStatus::Active,
        created_at: Utc::now(),
    };
    insert_patient(conn, &patient).unwrap();
    patient
}

pub fn seed_doctor(conn: &Connection, name: &str) -> Doctor {
    let user = seed_user(conn, name, Role::Doctor);
    let doctor = Doctor {
        id: Uuid::new_v4(),
        user_id: user.id,
        specialization: "General Medicine".into(),
        fee: 120.0,
        available: true,
        department_id: None,
        created_at: Utc::now(),
    };
    insert_doctor(conn, &doctor).unwrap();
    doctor
}

pub fn seed_appointment(
    conn: &Connection,
    patient: &Patient,
    doctor: &Doctor,
    date: NaiveDate,
    time: &str,
    status: AppointmentStatus,
) -> Appointment {
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        doctor_id: doctor.id,
        date,
        time: time.into(),
        status,
        is_urgent: false,
        reason: None,
        consultation_notes: None,
        diagnosis: None,
        created_at: Utc::now(),
    };
    insert_appointment(conn, &appointment).unwrap();
    appointment
}
