use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, AttendanceRow, AttendanceStatus, NewStudent, StudentRow, UpsertOutcome,
};

const STUDENT_COLUMNS: &str =
    "id, name, email, class, picture, marksheet_10th, marksheet_12th, created_at, updated_at";
const ATTENDANCE_COLUMNS: &str = "id, student_id, date, status, notes, created_at, updated_at";

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Drop rows whose status is outside the known set.
fn valid_records(rows: Vec<AttendanceRow>) -> Vec<AttendanceRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match AttendanceRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping attendance record {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>(&format!(
        "SELECT {} FROM students ORDER BY name ASC",
        STUDENT_COLUMNS
    ))
    .fetch_all(db)
    .await
}

/// Case-insensitive substring match on name.
pub async fn search_students_by_name(db: &SqlitePool, name: &str) -> Result<Vec<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>(&format!(
        "SELECT {} FROM students WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name ASC",
        STUDENT_COLUMNS
    ))
    .bind(like_pattern(name))
    .fetch_all(db)
    .await
}

/// Case-insensitive substring match on name or class.
pub async fn filter_students(db: &SqlitePool, query: &str) -> Result<Vec<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>(&format!(
        "SELECT {} FROM students
         WHERE name LIKE ?1 ESCAPE '\\' OR class LIKE ?1 ESCAPE '\\'
         ORDER BY name ASC",
        STUDENT_COLUMNS
    ))
    .bind(like_pattern(query))
    .fetch_all(db)
    .await
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>(&format!(
        "SELECT {} FROM students WHERE id = ?",
        STUDENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_student(db: &SqlitePool, student: &NewStudent) -> Result<StudentRow, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO students
            (id, name, email, class, picture, marksheet_10th, marksheet_12th, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
    )
    .bind(&id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.class)
    .bind(&student.picture)
    .bind(&student.marksheet_10th)
    .bind(&student.marksheet_12th)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(StudentRow {
        id,
        name: student.name.clone(),
        email: student.email.clone(),
        class: student.class.clone(),
        picture: student.picture.clone(),
        marksheet_10th: student.marksheet_10th.clone(),
        marksheet_12th: student.marksheet_12th.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Replace every editable column of an existing student.
pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    student: &NewStudent,
) -> Result<Option<StudentRow>, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let affected = sqlx::query(
        r#"
        UPDATE students
        SET name = ?1,
            email = ?2,
            class = ?3,
            picture = ?4,
            marksheet_10th = ?5,
            marksheet_12th = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.class)
    .bind(&student.picture)
    .bind(&student.marksheet_10th)
    .bind(&student.marksheet_12th)
    .bind(&now)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_student_by_id(db, id).await
}

pub async fn set_student_picture(db: &SqlitePool, id: &str, url: &str) -> Result<bool, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE students SET picture = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(url)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// A student's records, newest first, optionally limited to one date.
pub async fn fetch_attendance_for_student(
    db: &SqlitePool,
    student_id: &str,
    date: Option<NaiveDate>,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let rows = match date {
        Some(date) => {
            sqlx::query_as::<_, AttendanceRow>(&format!(
                "SELECT {} FROM attendance_records WHERE student_id = ?1 AND date = ?2 ORDER BY date DESC",
                ATTENDANCE_COLUMNS
            ))
            .bind(student_id)
            .bind(date)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, AttendanceRow>(&format!(
                "SELECT {} FROM attendance_records WHERE student_id = ?1 ORDER BY date DESC",
                ATTENDANCE_COLUMNS
            ))
            .bind(student_id)
            .fetch_all(db)
            .await?
        }
    };

    Ok(valid_records(rows))
}

pub async fn fetch_attendance_for_date(
    db: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
        "SELECT {} FROM attendance_records WHERE date = ?1",
        ATTENDANCE_COLUMNS
    ))
    .bind(date)
    .fetch_all(db)
    .await?;

    Ok(valid_records(rows))
}

/// Insert or update the single record for `(student_id, date)`.
pub async fn upsert_attendance(
    db: &SqlitePool,
    student_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
    notes: Option<&str>,
) -> Result<(AttendanceRecord, UpsertOutcome), sqlx::Error> {
    let mut conn = db.acquire().await?;
    upsert_attendance_in(&mut *conn, student_id, date, status, notes).await
}

/// Same as [`upsert_attendance`] on a caller-owned connection, so several
/// upserts can share one transaction.
///
/// A single statement resolves the `(student_id, date)` conflict, so two
/// writers racing on the same pair both succeed and one of them updates.
pub async fn upsert_attendance_in(
    conn: &mut SqliteConnection,
    student_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
    notes: Option<&str>,
) -> Result<(AttendanceRecord, UpsertOutcome), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let candidate_id = Uuid::new_v4().to_string();

    let row = sqlx::query_as::<_, AttendanceRow>(&format!(
        r#"
        INSERT INTO attendance_records
            (id, student_id, date, status, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        ON CONFLICT(student_id, date) DO UPDATE SET
            status = excluded.status,
            notes = excluded.notes,
            updated_at = excluded.updated_at
        RETURNING {}
        "#,
        ATTENDANCE_COLUMNS
    ))
    .bind(&candidate_id)
    .bind(student_id)
    .bind(date)
    .bind(status.as_str())
    .bind(notes)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await?;

    let outcome = if row.id == candidate_id {
        UpsertOutcome::Inserted
    } else {
        UpsertOutcome::Updated
    };

    Ok((
        AttendanceRecord {
            id: row.id,
            student_id: row.student_id,
            date: row.date,
            status,
            notes: row.notes,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        },
        outcome,
    ))
}

pub async fn delete_attendance(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
