use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::attendance::{AttendanceReport, GridWindow, build_grid, compose_report, summarize};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    AttendanceRecord, BulkAttendanceRequest, CourseDefinition, CourseSummary, DailyAttendanceItem,
    MarkAttendanceRequest, UpsertOutcome,
};

#[derive(Debug, Clone, Serialize)]
pub struct MarkOutcome {
    pub message: &'static str,
    pub outcome: UpsertOutcome,
    pub record: AttendanceRecord,
}

impl MarkOutcome {
    fn new(record: AttendanceRecord, outcome: UpsertOutcome) -> Self {
        let message = match outcome {
            UpsertOutcome::Inserted => "Attendance Recorded",
            UpsertOutcome::Updated => "Attendance Updated",
        };
        Self { message, outcome, record }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkOutcome {
    pub date: NaiveDate,
    pub inserted: usize,
    pub updated: usize,
    pub records: Vec<AttendanceRecord>,
}

/// One row of the day roster: every student, with their record if marked.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub name: String,
    pub class: Option<String>,
    pub record: Option<AttendanceRecord>,
}

async fn ensure_student(db: &SqlitePool, student_id: &str) -> Result<(), AppError> {
    match repository::find_student_by_id(db, student_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound),
    }
}

fn clean_notes(notes: &Option<String>) -> Option<&str> {
    notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
}

pub async fn mark(db: &SqlitePool, req: MarkAttendanceRequest) -> Result<MarkOutcome, AppError> {
    ensure_student(db, &req.student_id).await?;

    let (record, outcome) = repository::upsert_attendance(
        db,
        &req.student_id,
        req.date,
        req.status,
        clean_notes(&req.notes),
    )
    .await?;

    info!(
        "attendance {:?} for {} on {}: {}",
        outcome, record.student_id, record.date, record.status
    );
    Ok(MarkOutcome::new(record, outcome))
}

/// Upsert every entry for one date inside a single transaction; any failure
/// leaves the day untouched.
pub async fn mark_bulk(db: &SqlitePool, req: BulkAttendanceRequest) -> Result<BulkOutcome, AppError> {
    let mut seen = HashSet::with_capacity(req.entries.len());
    for entry in &req.entries {
        if !seen.insert(entry.student_id.as_str()) {
            return Err(AppError::Validation(format!(
                "Student {} appears more than once",
                entry.student_id
            )));
        }
    }

    for entry in &req.entries {
        ensure_student(db, &entry.student_id).await?;
    }

    let mut tx = db.begin().await?;
    let mut records = Vec::with_capacity(req.entries.len());
    let (mut inserted, mut updated) = (0, 0);

    for entry in &req.entries {
        let (record, outcome) = repository::upsert_attendance_in(
            &mut *tx,
            &entry.student_id,
            req.date,
            entry.status,
            clean_notes(&entry.notes),
        )
        .await?;
        match outcome {
            UpsertOutcome::Inserted => inserted += 1,
            UpsertOutcome::Updated => updated += 1,
        }
        records.push(record);
    }

    tx.commit().await?;

    info!(
        "bulk attendance for {}: {} inserted, {} updated",
        req.date, inserted, updated
    );
    Ok(BulkOutcome {
        date: req.date,
        inserted,
        updated,
        records,
    })
}

pub async fn records_for_student(
    db: &SqlitePool,
    student_id: &str,
    date: Option<NaiveDate>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    ensure_student(db, student_id).await?;
    Ok(repository::fetch_attendance_for_student(db, student_id, date).await?)
}

pub async fn roster(db: &SqlitePool, date: NaiveDate) -> Result<Vec<RosterEntry>, AppError> {
    let students = repository::fetch_students(db).await?;
    let mut records = repository::fetch_attendance_for_date(db, date).await?;

    Ok(students
        .into_iter()
        .map(|student| {
            let record = records
                .iter()
                .position(|r| r.student_id == student.id)
                .map(|i| records.swap_remove(i));
            RosterEntry {
                student_id: student.id,
                name: student.name,
                class: student.class,
                record,
            }
        })
        .collect())
}

pub async fn delete(db: &SqlitePool, id: &str) -> Result<(), AppError> {
    if repository::delete_attendance(db, id).await? {
        info!("attendance record deleted: {}", id);
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn summary(
    db: &SqlitePool,
    student_id: &str,
    catalog: &[CourseDefinition],
) -> Result<Vec<CourseSummary>, AppError> {
    let records = records_for_student(db, student_id, None).await?;
    Ok(summarize(&records, catalog))
}

pub async fn grid(
    db: &SqlitePool,
    student_id: &str,
    window: GridWindow,
    today: NaiveDate,
) -> Result<Vec<DailyAttendanceItem>, AppError> {
    // stored newest first; replay oldest first so the latest write wins
    let mut records = records_for_student(db, student_id, None).await?;
    records.reverse();
    Ok(build_grid(&records, window, today))
}

pub async fn report(
    db: &SqlitePool,
    student_id: &str,
    catalog: &[CourseDefinition],
    window: GridWindow,
    today: NaiveDate,
) -> Result<AttendanceReport, AppError> {
    let mut records = records_for_student(db, student_id, None).await?;
    records.reverse();
    Ok(compose_report(student_id, &records, catalog, window, today))
}
