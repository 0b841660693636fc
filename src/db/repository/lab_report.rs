use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use uuid::Uuid;

use crate::db::repository::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::LabReportStatus;
use crate::models::LabReport;

pub fn insert_lab_report(conn: &Connection, report: &LabReport) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lab_reports (id, patient_id, doctor_id, test_name, result, status, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            report.id.to_string(),
            report.patient_id.to_string(),
            report.doctor_id.to_string(),
            report.test_name,
            report.result,
            report.status.as_str(),
            report.date.map(|d| d.to_string()),
            report.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_lab_reports_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<LabReport>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_id, test_name, result, status, date, created_at
         FROM lab_reports WHERE patient_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        let (id, patient_id, doctor_id, test_name, result, status, date, created_at) = row?;
        reports.push(LabReport {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            doctor_id: parse_uuid(&doctor_id)?,
            test_name,
            result,
            status: LabReportStatus::from_str(&status)?,
            date: date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(reports)
}
