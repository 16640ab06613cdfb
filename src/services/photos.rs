use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::Student;
use crate::storage::{ImageUpload, ObjectStore, object_name, validate_image};

pub struct PhotoUploader {
    db: SqlitePool,
    storage: Arc<dyn ObjectStore>,
}

impl PhotoUploader {
    pub fn new(db: SqlitePool, storage: Arc<dyn ObjectStore>) -> Self {
        Self { db, storage }
    }

    /// Validate, upload, then point the student's picture at the public URL.
    /// Nothing is written to the store when validation fails.
    pub async fn upload(&self, student_id: &str, upload: ImageUpload) -> Result<Student, AppError> {
        validate_image(&upload)?;

        if repository::find_student_by_id(&self.db, student_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let name = object_name(&upload, Utc::now());
        let url = self.storage.put_image(&name, &upload).await?;
        info!("photo for {} stored at {}", student_id, url);

        match repository::set_student_picture(&self.db, student_id, &url).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("student {} vanished during upload; object {} is orphaned", student_id, name);
                return Err(AppError::NotFound);
            }
            Err(e) => {
                warn!("failed to save picture for {}; object {} is orphaned", student_id, name);
                return Err(e.into());
            }
        }

        repository::find_student_by_id(&self.db, student_id)
            .await?
            .map(Student::from)
            .ok_or(AppError::NotFound)
    }
}
