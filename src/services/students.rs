use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{AcademicRecord, NewStudent, Student, StudentInput};

#[derive(Debug, Default, Deserialize)]
pub struct StudentQuery {
    /// Matches name or class.
    #[serde(default)]
    pub q: Option<String>,
    /// Matches name only.
    #[serde(default)]
    pub search: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn list_students(db: &SqlitePool, query: &StudentQuery) -> Result<Vec<Student>, AppError> {
    let rows = if let Some(name) = non_blank(&query.search) {
        repository::search_students_by_name(db, name).await?
    } else if let Some(q) = non_blank(&query.q) {
        repository::filter_students(db, q).await?
    } else {
        repository::fetch_students(db).await?
    };
    Ok(rows.into_iter().map(Student::from).collect())
}

pub async fn get_student(db: &SqlitePool, id: &str) -> Result<Student, AppError> {
    repository::find_student_by_id(db, id)
        .await?
        .map(Student::from)
        .ok_or(AppError::NotFound)
}

pub async fn create_student(db: &SqlitePool, input: StudentInput) -> Result<Student, AppError> {
    let new = NewStudent::try_from(input)?;
    let row = repository::insert_student(db, &new).await?;
    info!("student added: {} ({})", row.name, row.id);
    Ok(Student::from(row))
}

pub async fn update_student(db: &SqlitePool, id: &str, input: StudentInput) -> Result<Student, AppError> {
    let new = NewStudent::try_from(input)?;
    let row = repository::update_student(db, id, &new)
        .await?
        .ok_or(AppError::NotFound)?;
    info!("student updated: {} ({})", row.name, row.id);
    Ok(Student::from(row))
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<(), AppError> {
    if repository::delete_student(db, id).await? {
        info!("student deleted: {}", id);
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AcademicEntry {
    pub computed_percentage: f64,
    pub record: AcademicRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcademicRecords {
    pub student_id: String,
    pub marksheet_10th: Option<AcademicEntry>,
    pub marksheet_12th: Option<AcademicEntry>,
}

fn entry(record: Option<AcademicRecord>) -> Option<AcademicEntry> {
    record.map(|record| AcademicEntry {
        computed_percentage: record.marksheet().computed_percentage(),
        record,
    })
}

pub async fn academic_records(db: &SqlitePool, id: &str) -> Result<AcademicRecords, AppError> {
    let student = get_student(db, id).await?;
    Ok(AcademicRecords {
        student_id: student.id,
        marksheet_10th: entry(student.marksheet_10th),
        marksheet_12th: entry(student.marksheet_12th),
    })
}
