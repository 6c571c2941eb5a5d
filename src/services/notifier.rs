use async_trait::async_trait;
use reqwest::Client;

use crate::services::gateway::{Notification, Notifier, ServiceError};

/// Client for the SendGrid v3 mail send API.
pub struct SendGridClient {
    http: Client,
    url: String,
    api_key: String,
}

impl SendGridClient {
    pub fn new(http: Client, url: &str, api_key: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for SendGridClient {
    async fn send(&self, message: &Notification) -> Result<(), ServiceError> {
        let request_body = serde_json::json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": message.from },
            "subject": message.subject,
            "content": [{ "type": "text/plain", "value": message.body }]
        });

        // Delivery status is not inspected.
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        tracing::debug!(status = %response.status(), to = %message.to, "Notification submitted");
        Ok(())
    }
}
