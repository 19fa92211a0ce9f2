// libs/notification-cell/src/services/sendgrid.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{Channel, ChannelError, ChannelErrorKind, EmailMessage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How many provider sub-error messages are folded into one diagnostic.
const MAX_SUB_ERRORS: usize = 3;

/// Email sending contract. The HTTP client implements it for the SendGrid
/// v3 mail API; tests inject fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailApi: Send + Sync {
    /// Returns the provider message id when the provider exposes one.
    async fn send(&self, message: &EmailMessage) -> Result<Option<String>, ChannelError>;
}

/// SendGrid v3 mail client.
pub struct SendGridClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SendGridClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: config.sendgrid_api_key.clone(),
            base_url: config.sendgrid_api_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EmailApi for SendGridClient {
    async fn send(&self, message: &EmailMessage) -> Result<Option<String>, ChannelError> {
        let url = format!("{}/v3/mail/send", self.base_url);

        let body = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": message.from },
            "subject": message.subject,
            "content": [
                { "type": "text/plain", "value": message.text },
                { "type": "text/html", "value": message.html }
            ]
        });

        debug!("Sending email via {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError {
                channel: Channel::Email,
                kind: ChannelErrorKind::Network,
                detail: e.to_string(),
                provider_status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            error!("Email send failed: {} - {}", status, response_text);
            return Err(ChannelError {
                channel: Channel::Email,
                kind: ChannelErrorKind::Api,
                detail: compose_detail(&format!("HTTP {}", status), &response_text),
                provider_status: Some(status.as_u16()),
            });
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        info!("Email accepted by provider for {}", message.to);
        Ok(message_id)
    }
}

/// Folds the top-level message and up to three provider sub-error messages
/// into one diagnostic string.
pub(crate) fn compose_detail(top_level: &str, response_text: &str) -> String {
    let sub_errors: Vec<String> = serde_json::from_str::<Value>(response_text)
        .ok()
        .and_then(|value| {
            value.get("errors").and_then(|errors| errors.as_array()).map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .take(MAX_SUB_ERRORS)
                    .map(str::to_string)
                    .collect()
            })
        })
        .unwrap_or_default();

    if sub_errors.is_empty() {
        if response_text.is_empty() {
            top_level.to_string()
        } else {
            format!("{}: {}", top_level, response_text)
        }
    } else {
        format!("{}: {}", top_level, sub_errors.join("; "))
    }
}
