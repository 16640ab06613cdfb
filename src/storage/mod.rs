pub mod dto;

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::info;

/// Largest accepted photo, in bytes.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

pub const DEFAULT_BUCKET: &str = "student_pictures";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Image is too large ({size} bytes). Please upload an image smaller than 2MB.")]
    TooLarge { size: usize },

    #[error("Please upload an image file (got {0:?})")]
    NotAnImage(String),

    #[error("object storage is not configured")]
    NotConfigured,

    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Reject uploads before any bytes leave the process.
pub fn validate_image(upload: &ImageUpload) -> Result<(), StorageError> {
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(StorageError::TooLarge { size: upload.bytes.len() });
    }
    if !upload.content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(StorageError::NotAnImage(upload.content_type.clone()));
    }
    Ok(())
}

/// `<unix millis>.<ext>`, taking the extension from the original file name
/// or, failing that, from the MIME subtype.
pub fn object_name(upload: &ImageUpload, now: DateTime<Utc>) -> String {
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let ext = from_name.unwrap_or_else(|| {
        upload
            .content_type
            .split('/')
            .nth(1)
            .and_then(|sub| sub.split(['+', ';']).next())
            .map(|sub| sub.trim().to_ascii_lowercase())
            .filter(|sub| !sub.is_empty())
            .unwrap_or_else(|| "img".to_string())
    });

    format!("{}.{}", now.timestamp_millis(), ext)
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub base_url: String,
    pub api_key: String,
    pub bucket: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the image under `name` and return its public URL.
    async fn put_image(&self, name: &str, upload: &ImageUpload) -> Result<String, StorageError>;
}

pub struct HttpObjectStore {
    client: Client,
    config: StorageConfig,
}

impl HttpObjectStore {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub fn public_url(&self, name: &str) -> String {
        self.endpoint(&format!("object/public/{}/{}", self.config.bucket, name))
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let response = self
            .client
            .get(self.endpoint(&format!("bucket/{}", self.config.bucket)))
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let missing = status == StatusCode::NOT_FOUND
            || serde_json::from_str::<dto::StorageErrorBody>(&body)
                .map(|b| b.is_not_found())
                .unwrap_or(false);
        if !missing {
            return Err(StorageError::Rejected { status: status.as_u16(), body });
        }

        info!("creating storage bucket {}", self.config.bucket);
        let request_body = dto::CreateBucketRequest {
            id: &self.config.bucket,
            name: &self.config.bucket,
            public: true,
            file_size_limit: MAX_IMAGE_BYTES,
        };
        let response = self
            .client
            .post(self.endpoint("bucket"))
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status: status.as_u16(), body });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_image(&self, name: &str, upload: &ImageUpload) -> Result<String, StorageError> {
        self.ensure_bucket().await?;

        let response = self
            .client
            .post(self.endpoint(&format!("object/{}/{}", self.config.bucket, name)))
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .header("content-type", &upload.content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(upload.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StorageError::Rejected { status: status.as_u16(), body });
        }

        let key = serde_json::from_str::<dto::UploadResponse>(&body)
            .ok()
            .and_then(|r| r.key);
        info!("uploaded {} ({:?})", name, key);

        Ok(self.public_url(name))
    }
}

/// Used when no storage endpoint is configured.
pub struct DisabledObjectStore;

#[async_trait]
impl ObjectStore for DisabledObjectStore {
    async fn put_image(&self, _name: &str, _upload: &ImageUpload) -> Result<String, StorageError> {
        Err(StorageError::NotConfigured)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub name: String,
    pub content_type: String,
    pub size: usize,
}

/// Keeps uploads in memory; URLs use the `memory://` scheme.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects
            .lock()
            .map(|objects| objects.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_image(&self, name: &str, upload: &ImageUpload) -> Result<String, StorageError> {
        if let Ok(mut objects) = self.objects.lock() {
            objects.push(StoredObject {
                name: name.to_string(),
                content_type: upload.content_type.clone(),
                size: upload.bytes.len(),
            });
        }
        Ok(format!("memory://{}/{}", DEFAULT_BUCKET, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn upload(name: Option<&str>, content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.map(str::to_string),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn rejects_oversized_and_non_image_uploads() {
        assert!(validate_image(&upload(None, "image/png", MAX_IMAGE_BYTES)).is_ok());
        assert!(matches!(
            validate_image(&upload(None, "image/png", MAX_IMAGE_BYTES + 1)),
            Err(StorageError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_image(&upload(None, "application/pdf", 10)),
            Err(StorageError::NotAnImage(_))
        ));
    }

    #[test]
    fn object_name_prefers_file_extension() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let millis = now.timestamp_millis();
        assert_eq!(
            object_name(&upload(Some("Photo.JPG"), "image/jpeg", 1), now),
            format!("{}.jpg", millis)
        );
        assert_eq!(
            object_name(&upload(None, "image/svg+xml", 1), now),
            format!("{}.svg", millis)
        );
    }

    #[test]
    fn public_url_joins_bucket_and_name() {
        let store = HttpObjectStore::new(StorageConfig {
            base_url: "https://example.supabase.co/".to_string(),
            api_key: "key".to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        })
        .unwrap();
        assert_eq!(
            store.public_url("1.png"),
            "https://example.supabase.co/storage/v1/object/public/student_pictures/1.png"
        );
    }

    #[tokio::test]
    async fn memory_store_records_uploads() {
        let store = MemoryObjectStore::new();
        let url = store.put_image("1.png", &upload(None, "image/png", 4)).await.unwrap();
        assert_eq!(url, "memory://student_pictures/1.png");
        assert_eq!(store.objects()[0].size, 4);
    }
}
