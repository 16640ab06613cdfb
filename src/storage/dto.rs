use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CreateBucketRequest<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub public: bool,
    pub file_size_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StorageErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StorageErrorBody {
    pub fn is_not_found(&self) -> bool {
        [&self.message, &self.error]
            .into_iter()
            .flatten()
            .any(|text| text.to_ascii_lowercase().contains("not found"))
    }
}
