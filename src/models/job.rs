use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier naming one image-processing job and every artifact it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Remote image key for the uploaded original.
    pub fn original_image_key(&self) -> String {
        format!("orig-{}", self)
    }

    /// Remote image key for the colourised derivative.
    pub fn enhanced_image_key(&self) -> String {
        format!("col-{}", self)
    }

    /// Durable store key for the serialized result record.
    pub fn record_key(&self) -> String {
        format!("json/{}", self)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A job handed from ingest to the worker pool.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub email: String,
    pub original_filename: String,
}
