use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::services::gateway::{Colourizer, ServiceError};

/// Client for the DeepAI colorizer API.
pub struct DeepAiClient {
    http: Client,
    colorizer_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ColorizerResponse {
    output_url: String,
}

impl DeepAiClient {
    pub fn new(http: Client, colorizer_url: &str, api_key: &str) -> Self {
        Self {
            http,
            colorizer_url: colorizer_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Colourizer for DeepAiClient {
    async fn colourize(&self, image_url: &str) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(&self.colorizer_url)
            .header("api-key", &self.api_key)
            .form(&[("image", image_url)])
            .send()
            .await?;

        let body = response.bytes().await?;
        let decoded: ColorizerResponse = serde_json::from_slice(&body)?;
        Ok(decoded.output_url)
    }
}
