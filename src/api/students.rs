use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use chrono::NaiveDate;
use serde::Deserialize;

use super::reference_date;
use crate::db::repository;
use crate::documents::{self, Document, DocumentContext, DocumentKind};
use crate::error::AppError;
use crate::models::{Student, StudentInput};
use crate::services::{AcademicRecords, PhotoUploader, StudentQuery, students};
use crate::state::AppState;
use crate::storage::ImageUpload;

#[derive(Deserialize)]
pub(super) struct PhotoParams {
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct DocumentParams {
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<Vec<Student>>, AppError> {
    let found = students::list_students(&state.db, &query).await?;
    Ok(Json(found))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(input): Json<StudentInput>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = students::create_student(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = students::get_student(&state.db, &id).await?;
    Ok(Json(student))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StudentInput>,
) -> Result<Json<Student>, AppError> {
    let student = students::update_student(&state.db, &id, input).await?;
    Ok(Json(student))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    students::delete_student(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn academic_records(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AcademicRecords>, AppError> {
    let records = students::academic_records(&state.db, &id).await?;
    Ok(Json(records))
}

pub(super) async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PhotoParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Student>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let upload = ImageUpload {
        file_name: params.filename,
        content_type,
        bytes: body.to_vec(),
    };

    let uploader = PhotoUploader::new(state.db.clone(), state.storage.clone());
    let student = uploader.upload(&id, upload).await?;
    Ok(Json(student))
}

pub(super) async fn document(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    Query(params): Query<DocumentParams>,
) -> Result<Json<Document>, AppError> {
    let kind: DocumentKind = kind.parse().map_err(AppError::Validation)?;
    let today = reference_date(params.today)?;
    let student = students::get_student(&state.db, &id).await?;

    let mut records = if kind.needs_attendance() {
        repository::fetch_attendance_for_student(&state.db, &id, None).await?
    } else {
        Vec::new()
    };
    records.reverse();

    let ctx = DocumentContext {
        today,
        catalog: state.catalog.courses(),
        records: &records,
        grid_window: state.grid_window,
    };
    Ok(Json(documents::compose(kind, &student, &ctx)))
}
