//! Capability interfaces for every remote service the pipeline talks to.
//!
//! Each capability is a single call-and-decode operation with no internal
//! retry. Concrete implementations live in sibling modules; tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::record::Concept;
use crate::services::classifier::ClarifaiClient;
use crate::services::colourizer::DeepAiClient;
use crate::services::notifier::SendGridClient;
use crate::services::storage::{R2Client, R2ImageStore, StorageError};

/// Labels the content of a publicly addressable image.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Ranked concepts with confidences on a 0-1 scale, in service order.
    async fn classify(&self, image_url: &str) -> Result<Vec<Concept>, ServiceError>;
}

/// Produces a colourised version of a publicly addressable image.
#[async_trait]
pub trait Colourizer: Send + Sync {
    /// Returns the URL of the enhanced image.
    async fn colourize(&self, image_url: &str) -> Result<String, ServiceError>;
}

/// Where the bytes of an image to store come from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    File(&'a Path),
    Remote(&'a str),
}

/// Public image hosting.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, source: ImageSource<'_>, public_id: &str) -> Result<(), StorageError>;

    /// Public URL of a previously stored image. Performs no I/O.
    fn url(&self, public_id: &str) -> String;
}

/// Durable key/blob storage for result records.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError>;

    /// Fetch `key` into `local_path`. Missing keys yield [`StorageError::NotFound`].
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound plain-text mail.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Fire-and-forget: only transport failures are reported.
    async fn send(&self, message: &Notification) -> Result<(), ServiceError>;
}

/// Service handles constructed once at startup and shared by every job.
#[derive(Clone)]
pub struct ServiceRegistry {
    pub classifier: Arc<dyn Classifier>,
    pub colourizer: Arc<dyn Colourizer>,
    pub images: Arc<dyn ImageStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl ServiceRegistry {
    pub fn from_config(config: &AppConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.remote_timeout())
            .build()?;

        let r2 = Arc::new(R2Client::new(
            &config.r2_bucket,
            &config.r2_endpoint,
            &config.r2_access_key,
            &config.r2_secret_key,
        )?);

        Ok(Self {
            classifier: Arc::new(ClarifaiClient::new(
                http.clone(),
                &config.clarifai_model_url,
                &config.clarifai_api_key,
            )),
            colourizer: Arc::new(DeepAiClient::new(
                http.clone(),
                &config.deepai_colorizer_url,
                &config.deepai_api_key,
            )),
            images: Arc::new(R2ImageStore::new(r2.clone(), http.clone(), &config.r2_public_url)),
            blobs: r2,
            notifier: Arc::new(SendGridClient::new(
                http,
                &config.sendgrid_url,
                &config.sendgrid_api_key,
            )),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected service response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to initialize storage: {0}")]
    Storage(#[from] StorageError),
}
