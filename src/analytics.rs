//! Read-only dashboard aggregation.
//!
//! Every figure is computed with an independent SQL query against live
//! rows; nothing is cached or pre-aggregated. Patient growth groups by
//! calendar month-of-year across all history, which folds together the
//! same month from different years. That grouping is part of the
//! dashboard's contract and stays as is.

use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::DatabaseError;
use crate::models::enums::{AppointmentStatus, PaymentStatus};

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub total_appointments: i64,
    pub upcoming_appointments: i64,
    pub urgent_pending: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DepartmentStaffing {
    pub department: String,
    pub doctors: i64,
}

#[derive(Debug, Serialize)]
pub struct GrowthPoint {
    pub month: String,
    pub patients: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsCharts {
    pub appointment_trend: Vec<TrendPoint>,
    pub department_staffing: Vec<DepartmentStaffing>,
    pub patient_growth: Vec<GrowthPoint>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub charts: AnalyticsCharts,
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn fetch_analytics(
    conn: &Connection,
    today: NaiveDate,
) -> Result<AnalyticsResponse, DatabaseError> {
    Ok(AnalyticsResponse {
        summary: summary(conn, today)?,
        charts: AnalyticsCharts {
            appointment_trend: appointment_trend(conn, today)?,
            department_staffing: department_staffing(conn)?,
            patient_growth: patient_growth(conn)?,
        },
    })
}

fn count(conn: &Connection, sql: &str) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

fn summary(conn: &Connection, today: NaiveDate) -> Result<AnalyticsSummary, DatabaseError> {
    let upcoming = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE date >= ?1",
        params![today.format("%Y-%m-%d").to_string()],
        |row| row.get(0),
    )?;
    let urgent_pending = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE is_urgent = 1 AND status != ?1",
        params![AppointmentStatus::Completed.as_str()],
        |row| row.get(0),
    )?;
    let revenue = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM payments WHERE status = ?1",
        params![PaymentStatus::Paid.as_str()],
        |row| row.get(0),
    )?;
    Ok(AnalyticsSummary {
        total_patients: count(conn, "SELECT COUNT(*) FROM patients")?,
        total_doctors: count(conn, "SELECT COUNT(*) FROM doctors")?,
        total_appointments: count(conn, "SELECT COUNT(*) FROM appointments")?,
        upcoming_appointments: upcoming,
        urgent_pending,
        revenue,
    })
}

/// Seven points, oldest first, the last one being `today`. Labels are
/// weekday short names, so a given label repeats across weeks.
fn appointment_trend(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM appointments WHERE date = ?1")?;
    let mut trend = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let day = today - Duration::days(offset);
        let count: i64 = stmt.query_row(
            params![day.format("%Y-%m-%d").to_string()],
            |row| row.get(0),
        )?;
        trend.push(TrendPoint {
            label: day.format("%a").to_string(),
            count,
        });
    }
    Ok(trend)
}

/// Doctor headcount per department. LEFT JOIN keeps departments with no
/// doctors on the chart at zero.
fn department_staffing(conn: &Connection) -> Result<Vec<DepartmentStaffing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT dep.name, COUNT(doc.id)
         FROM departments dep
         LEFT JOIN doctors doc ON doc.department_id = dep.id
         GROUP BY dep.id
         ORDER BY dep.name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DepartmentStaffing {
            department: row.get(0)?,
            doctors: row.get(1)?,
        })
    })?;
    let mut staffing = Vec::new();
    for row in rows {
        staffing.push(row?);
    }
    Ok(staffing)
}

/// Registrations grouped by month-of-year, ascending by month number.
/// Months with no registrations are omitted. created_at is RFC 3339, so
/// characters 6-7 are the zero-padded month.
fn patient_growth(conn: &Connection) -> Result<Vec<GrowthPoint>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT CAST(substr(created_at, 6, 2) AS INTEGER) AS month, COUNT(*)
         FROM patients
         GROUP BY month
         ORDER BY month",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;
    let mut growth = Vec::new();
    for row in rows {
        let (month, patients) = row?;
        let label = MONTH_NAMES
            .get((month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("???");
        growth.push(GrowthPoint {
            month: label.to_string(),
            patients,
        });
    }
    Ok(growth)
}
