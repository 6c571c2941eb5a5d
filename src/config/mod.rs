use garde::Validate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::job::JobId;

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Unused by the worker binary.
    #[serde(default = "default_bind_addr")]
    #[garde(length(min = 1))]
    pub bind_addr: String,

    /// Public host name used in result links and the sender address
    #[serde(default = "default_public_host")]
    #[garde(length(min = 1))]
    pub public_host: String,

    /// Notification sender; defaults to forensics@<public_host>
    #[serde(default)]
    #[garde(skip)]
    pub sender_address: Option<String>,

    /// Directory where uploads are staged as <id>.jpg
    #[serde(default = "default_upload_dir")]
    #[garde(skip)]
    pub upload_dir: PathBuf,

    /// Local result cache directory, one <id>.json per job
    #[serde(default = "default_json_dir")]
    #[garde(skip)]
    pub json_dir: PathBuf,

    /// Maximum number of classifier labels kept per record
    #[serde(default = "default_max_labels")]
    #[garde(range(min = 1))]
    pub max_labels: usize,

    /// Number of jobs allowed to run their pipeline at the same time
    #[serde(default = "default_worker_concurrency")]
    #[garde(range(min = 1))]
    pub worker_concurrency: usize,

    /// Timeout applied to every remote call, in seconds
    #[serde(default = "default_remote_timeout_secs")]
    #[garde(range(min = 1))]
    pub remote_timeout_secs: u64,

    /// Clarifai API key
    #[garde(length(min = 1))]
    pub clarifai_api_key: String,

    /// Clarifai model outputs endpoint
    #[serde(default = "default_clarifai_model_url")]
    #[garde(length(min = 1))]
    pub clarifai_model_url: String,

    /// DeepAI API key
    #[garde(length(min = 1))]
    pub deepai_api_key: String,

    /// DeepAI colorizer endpoint
    #[serde(default = "default_deepai_colorizer_url")]
    #[garde(length(min = 1))]
    pub deepai_colorizer_url: String,

    /// SendGrid API key
    #[garde(length(min = 1))]
    pub sendgrid_api_key: String,

    /// SendGrid v3 mail send endpoint
    #[serde(default = "default_sendgrid_url")]
    #[garde(length(min = 1))]
    pub sendgrid_url: String,

    /// R2 bucket name
    #[garde(length(min = 1))]
    pub r2_bucket: String,

    /// R2 access key ID (S3-compatible)
    #[garde(length(min = 1))]
    pub r2_access_key: String,

    /// R2 secret access key (S3-compatible)
    #[garde(length(min = 1))]
    pub r2_secret_key: String,

    /// R2 endpoint URL
    #[garde(length(min = 1))]
    pub r2_endpoint: String,

    /// Public base URL that serves objects of the R2 bucket
    #[garde(length(min = 1))]
    pub r2_public_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_public_host() -> String {
    "image-forensics.herokuapp.com".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_json_dir() -> PathBuf {
    PathBuf::from("json")
}

fn default_max_labels() -> usize {
    8
}

fn default_worker_concurrency() -> usize {
    4
}

fn default_remote_timeout_secs() -> u64 {
    30
}

fn default_clarifai_model_url() -> String {
    "https://api.clarifai.com/v2/models/aaa03c23b3724a16a56b629203edc62c/versions/aa7f35c01e0642fda5cf400f543e7c40/outputs".to_string()
}

fn default_deepai_colorizer_url() -> String {
    "https://api.deepai.org/api/colorizer".to_string()
}

fn default_sendgrid_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn sender_address(&self) -> String {
        self.sender_address
            .clone()
            .unwrap_or_else(|| format!("forensics@{}", self.public_host))
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    /// Link to the result page for a job.
    pub fn result_link(&self, id: &JobId) -> String {
        result_link(&self.public_host, id)
    }
}

pub fn result_link(public_host: &str, id: &JobId) -> String {
    format!("https://{}/result/{}", public_host, id)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}
