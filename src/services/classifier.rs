use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::record::Concept;
use crate::services::gateway::{Classifier, ServiceError};

/// Client for the Clarifai general image classification model.
pub struct ClarifaiClient {
    http: Client,
    model_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct OutputsResponse {
    outputs: Vec<Output>,
}

#[derive(Deserialize)]
struct Output {
    data: OutputData,
}

#[derive(Deserialize)]
struct OutputData {
    concepts: Vec<RawConcept>,
}

#[derive(Deserialize)]
struct RawConcept {
    name: String,
    value: f64,
}

impl ClarifaiClient {
    pub fn new(http: Client, model_url: &str, api_key: &str) -> Self {
        Self {
            http,
            model_url: model_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for ClarifaiClient {
    async fn classify(&self, image_url: &str) -> Result<Vec<Concept>, ServiceError> {
        let request_body = serde_json::json!({
            "inputs": [{ "data": { "image": { "url": image_url } } }]
        });

        let response = self
            .http
            .post(&self.model_url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let body = response.bytes().await?;
        let decoded: OutputsResponse = serde_json::from_slice(&body)?;

        let output = decoded
            .outputs
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::UnexpectedResponse("no outputs in response".to_string()))?;

        Ok(output
            .data
            .concepts
            .into_iter()
            .map(|c| Concept::new(c.name, c.value))
            .collect())
    }
}
