// libs/notification-cell/src/services/twilio.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{Channel, ChannelError, ChannelErrorKind};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// SMS and WhatsApp sending contract. The HTTP client implements it for the
/// Twilio Messages API; tests inject fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn send_sms(&self, from: &str, to: &str, body: &str) -> Result<String, ChannelError>;

    async fn send_whatsapp(&self, from: &str, to: &str, body: &str)
        -> Result<String, ChannelError>;
}

/// Twilio Messages API client. WhatsApp shares the SMS endpoint with
/// `whatsapp:`-prefixed addresses.
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            base_url: config.twilio_api_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send_message(
        &self,
        channel: Channel,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<String, ChannelError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        debug!("Sending {} message via {}", channel, url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| ChannelError {
                channel,
                kind: ChannelErrorKind::Network,
                detail: e.to_string(),
                provider_status: None,
            })?;

        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("{} send failed: {} - {}", channel, status, response_text);
            return Err(ChannelError {
                channel,
                kind: ChannelErrorKind::Api,
                detail: provider_detail(&format!("HTTP {}", status), &response_text),
                provider_status: Some(status.as_u16()),
            });
        }

        let sid = serde_json::from_str::<Value>(&response_text)
            .ok()
            .and_then(|value| value.get("sid").and_then(Value::as_str).map(str::to_string))
            .ok_or_else(|| ChannelError {
                channel,
                kind: ChannelErrorKind::Response,
                detail: "Provider response did not contain a message sid".to_string(),
                provider_status: Some(status.as_u16()),
            })?;

        info!("{} message accepted by provider: {}", channel, sid);
        Ok(sid)
    }
}

#[async_trait]
impl MessagingApi for TwilioClient {
    async fn send_sms(&self, from: &str, to: &str, body: &str) -> Result<String, ChannelError> {
        self.send_message(Channel::Sms, from, to, body).await
    }

    async fn send_whatsapp(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<String, ChannelError> {
        let from = whatsapp_address(from);
        let to = whatsapp_address(to);
        self.send_message(Channel::WhatsApp, &from, &to, body).await
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

/// Twilio error bodies carry `code` and `message`; both are folded into the
/// diagnostic when present.
fn provider_detail(top_level: &str, response_text: &str) -> String {
    let parsed = serde_json::from_str::<Value>(response_text).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").and_then(Value::as_str));
    let code = parsed.as_ref().and_then(|v| v.get("code").and_then(Value::as_i64));

    match (message, code) {
        (Some(message), Some(code)) => format!("{}: {} (code {})", top_level, message, code),
        (Some(message), None) => format!("{}: {}", top_level, message),
        _ if response_text.is_empty() => top_level.to_string(),
        _ => format!("{}: {}", top_level, response_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_addresses_are_prefixed_once() {
        assert_eq!(whatsapp_address("+15550001111"), "whatsapp:+15550001111");
        assert_eq!(whatsapp_address("whatsapp:+15550001111"), "whatsapp:+15550001111");
    }

    #[test]
    fn test_provider_detail_includes_code_and_message() {
        let body = r#"{"code": 21211, "message": "Invalid 'To' phone number", "status": 400}"#;
        assert_eq!(
            provider_detail("HTTP 400", body),
            "HTTP 400: Invalid 'To' phone number (code 21211)"
        );
    }

    #[test]
    fn test_provider_detail_falls_back_to_raw_body() {
        assert_eq!(provider_detail("HTTP 502", "bad gateway"), "HTTP 502: bad gateway");
    }
}
