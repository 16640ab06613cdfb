use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{reference_date, today_or};
use crate::attendance::{AttendanceReport, GridWindow};
use crate::error::AppError;
use crate::models::{
    AttendanceRecord, BulkAttendanceRequest, CourseSummary, DailyAttendanceItem,
    MarkAttendanceRequest,
};
use crate::services::{BulkOutcome, MarkOutcome, RosterEntry, attendance};
use crate::state::AppState;

#[derive(Deserialize)]
pub(super) struct DateParams {
    #[serde(default)]
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub(super) struct GridParams {
    #[serde(default)]
    today: Option<NaiveDate>,
    #[serde(default)]
    window: Option<String>,
}

impl GridParams {
    fn window(&self, fallback: GridWindow) -> Result<GridWindow, AppError> {
        match self.window.as_deref() {
            Some(raw) => raw.parse().map_err(AppError::Validation),
            None => Ok(fallback),
        }
    }
}

pub(super) async fn mark(
    State(state): State<AppState>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<MarkOutcome>, AppError> {
    let outcome = attendance::mark(&state.db, req).await?;
    Ok(Json(outcome))
}

pub(super) async fn mark_bulk(
    State(state): State<AppState>,
    Json(req): Json<BulkAttendanceRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    let outcome = attendance::mark_bulk(&state.db, req).await?;
    Ok(Json(outcome))
}

pub(super) async fn roster(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<Vec<RosterEntry>>, AppError> {
    let date = today_or(params.date);
    let entries = attendance::roster(&state.db, date).await?;
    Ok(Json(entries))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    attendance::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn for_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DateParams>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let records = attendance::records_for_student(&state.db, &id, params.date).await?;
    Ok(Json(records))
}

pub(super) async fn summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    let summaries = attendance::summary(&state.db, &id, state.catalog.courses()).await?;
    Ok(Json(summaries))
}

pub(super) async fn grid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GridParams>,
) -> Result<Json<Vec<DailyAttendanceItem>>, AppError> {
    let window = params.window(state.grid_window)?;
    let today = reference_date(params.today)?;
    let cells = attendance::grid(&state.db, &id, window, today).await?;
    Ok(Json(cells))
}

pub(super) async fn report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GridParams>,
) -> Result<Json<AttendanceReport>, AppError> {
    let window = params.window(state.grid_window)?;
    let today = reference_date(params.today)?;
    let report = attendance::report(&state.db, &id, state.catalog.courses(), window, today)
    .await?;
    Ok(Json(report))
}
