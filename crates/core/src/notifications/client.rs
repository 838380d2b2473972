use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use serde::Serialize;

use super::errors::NotificationError;
use super::model::EmailMessage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Thin client for a transactional email HTTP API.
///
/// Each `send` is one `POST` of `{from, to, subject, html}` to the configured
/// endpoint with a bearer key. Nothing is queued or retried.
pub struct EmailClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl EmailClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, from: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            from: from.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && !self.api_url.is_empty()
    }

    pub fn sender(&self) -> &str {
        &self.from
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let api_key = match &self.api_key {
            Some(key) if !self.api_url.is_empty() => key,
            _ => return Err(NotificationError::NotConfigured),
        };
        if message.to.trim().is_empty() {
            return Err(NotificationError::InvalidMessage("missing recipient".into()));
        }
        if message.subject.trim().is_empty() {
            return Err(NotificationError::InvalidMessage("missing subject".into()));
        }

        debug!("Sending email '{}' to {}", message.subject, message.to);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&SendRequest {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        info!("Email '{}' accepted for {}", message.subject, message.to);
        Ok(())
    }
}
