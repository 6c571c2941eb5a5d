use async_trait::async_trait;
use reqwest::Client;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use std::path::Path;
use std::sync::Arc;

use crate::services::gateway::{BlobStore, ImageSource, ImageStore};

/// Client for Cloudflare R2 object storage (S3-compatible).
pub struct R2Client {
    bucket: Box<Bucket>,
}

impl R2Client {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials =
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)
                .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket })
    }

    /// Upload object bytes to R2.
    pub async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| classify_s3_error(key, e))?;

        check_status(key, response.status_code())
    }

    /// Download object bytes from R2.
    pub async fn download_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| classify_s3_error(key, e))?;

        check_status(key, response.status_code())?;
        Ok(response.to_vec())
    }
}

#[async_trait]
impl BlobStore for R2Client {
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let data = tokio::fs::read(local_path).await?;
        self.upload(key, &data, "application/octet-stream").await
    }

    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let data = self.download_bytes(key).await?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local_path, &data).await?;
        Ok(())
    }
}

/// Public image hosting backed by an R2 bucket served under a public base URL.
pub struct R2ImageStore {
    client: Arc<R2Client>,
    http: Client,
    public_base_url: String,
}

impl R2ImageStore {
    pub fn new(client: Arc<R2Client>, http: Client, public_base_url: &str) -> Self {
        Self {
            client,
            http,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for R2ImageStore {
    async fn upload(&self, source: ImageSource<'_>, public_id: &str) -> Result<(), StorageError> {
        let data = match source {
            ImageSource::File(path) => tokio::fs::read(path).await?,
            ImageSource::Remote(url) => self
                .http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec(),
        };

        self.client.upload(public_id, &data, sniff_content_type(&data)).await
    }

    fn url(&self, public_id: &str) -> String {
        public_url(&self.public_base_url, public_id)
    }
}

fn public_url(base: &str, public_id: &str) -> String {
    format!("{}/{}", base, public_id)
}

/// MIME type of image bytes, falling back to an opaque binary type.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn check_status(key: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        _ => Err(StorageError::UnexpectedStatus {
            key: key.to_string(),
            status,
        }),
    }
}

fn classify_s3_error(key: &str, error: S3Error) -> StorageError {
    match error {
        S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(key.to_string()),
        other => StorageError::S3(other),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] S3Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Unexpected status {status} for object {key}")]
    UnexpectedStatus { key: String, status: u16 },

    #[error("Failed to fetch remote image: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Local file operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
