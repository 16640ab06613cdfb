mod attendance;
mod students;

use axum::Json;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Local, Months, NaiveDate};

use crate::documents::{self, DocumentType};
use crate::error::AppError;
use crate::state::AppState;
use crate::storage::MAX_IMAGE_BYTES;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/documents", get(document_types))
        .route("/students", get(students::list).post(students::create))
        .route(
            "/students/{id}",
            get(students::fetch)
                .put(students::update)
                .delete(students::remove),
        )
        .route("/students/{id}/academic-records", get(students::academic_records))
        .route(
            "/students/{id}/photo",
            // leave headroom so oversized images reach our own size check
            post(students::upload_photo).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES * 2)),
        )
        .route("/students/{id}/documents/{kind}", get(students::document))
        .route("/students/{id}/attendance", get(attendance::for_student))
        .route("/students/{id}/attendance/summary", get(attendance::summary))
        .route("/students/{id}/attendance/grid", get(attendance::grid))
        .route("/students/{id}/attendance/report", get(attendance::report))
        .route("/attendance", put(attendance::mark).get(attendance::roster))
        .route("/attendance/bulk", put(attendance::mark_bulk))
        .route("/attendance/{id}", delete(attendance::remove))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn document_types() -> Json<Vec<DocumentType>> {
    Json(documents::document_types())
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

// grids, exam schedules and ID cards look at most this far ahead
const REFERENCE_HEADROOM: Months = Months::new(24);

/// Reference date for date-relative views; rejects dates too close to the
/// end of the calendar to project forward from.
fn reference_date(date: Option<NaiveDate>) -> Result<NaiveDate, AppError> {
    let date = today_or(date);
    match date.checked_add_months(REFERENCE_HEADROOM) {
        Some(_) => Ok(date),
        None => Err(AppError::Validation(format!("today is out of range: {}", date))),
    }
}
