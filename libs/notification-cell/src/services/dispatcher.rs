// libs/notification-cell/src/services/dispatcher.rs
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{
    ChannelError, EmailMessage, NotificationRequest, NotificationResult, WelcomeRequest,
};
use crate::services::sendgrid::{EmailApi, SendGridClient};
use crate::services::template::{BookingConfirmationTemplate, WelcomeTemplate};
use crate::services::twilio::{MessagingApi, TwilioClient};

/// Loose international phone syntax: optional leading `+`, 8 to 16 digits.
/// Common separators are stripped before matching.
fn phone_shape() -> Option<&'static Regex> {
    static PHONE_SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE_SHAPE
        .get_or_init(|| Regex::new(r"^\+?[0-9]{8,16}$").ok())
        .as_ref()
}

fn is_deliverable_phone(raw: &str) -> bool {
    let normalized: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    match phone_shape() {
        Some(shape) => shape.is_match(&normalized),
        None => false,
    }
}

/// Outcome of one channel attempt, folded into the aggregate result.
enum ChannelOutcome {
    NotAttempted,
    Sent(Option<String>),
    Failed(ChannelError),
}

impl ChannelOutcome {
    fn sent(&self) -> bool {
        matches!(self, ChannelOutcome::Sent(_))
    }

    fn message_id(&self) -> Option<String> {
        match self {
            ChannelOutcome::Sent(id) => id.clone(),
            _ => None,
        }
    }

    fn into_error(self) -> Option<ChannelError> {
        match self {
            ChannelOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Fans a notification out to every configured, eligible channel.
///
/// Channels are independent: a failure on one never prevents attempting the
/// others, and the aggregate result always reports every channel's boolean
/// outcome. A channel skipped for missing configuration or a malformed
/// destination is not an error and contributes no error entry.
pub struct NotificationDispatcher {
    email: Option<Arc<dyn EmailApi>>,
    messaging: Option<Arc<dyn MessagingApi>>,
    email_from: String,
    sms_from: String,
    whatsapp_from: String,
}

impl NotificationDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        let email: Option<Arc<dyn EmailApi>> = if config.is_email_configured() {
            Some(Arc::new(SendGridClient::new(config)))
        } else {
            debug!("Email sender not configured");
            None
        };

        let messaging: Option<Arc<dyn MessagingApi>> =
            if config.is_sms_configured() || config.is_whatsapp_configured() {
                Some(Arc::new(TwilioClient::new(config)))
            } else {
                debug!("SMS/WhatsApp sender not configured");
                None
            };

        Self::with_clients(config, email, messaging)
    }

    /// Constructor for tests and callers that inject their own channel
    /// clients.
    pub fn with_clients(
        config: &AppConfig,
        email: Option<Arc<dyn EmailApi>>,
        messaging: Option<Arc<dyn MessagingApi>>,
    ) -> Self {
        Self {
            email,
            messaging,
            email_from: config.email_from.clone(),
            sms_from: config.twilio_sms_from.clone(),
            whatsapp_from: config.twilio_whatsapp_from.clone(),
        }
    }

    /// Whether any channel could possibly deliver. Pure capability check;
    /// destinations are evaluated per request.
    pub fn channels_available(&self) -> bool {
        let email_ready = self.email.is_some() && !self.email_from.is_empty();
        let sms_ready = self.messaging.is_some() && !self.sms_from.is_empty();
        let whatsapp_ready = self.messaging.is_some() && !self.whatsapp_from.is_empty();
        email_ready || sms_ready || whatsapp_ready
    }

    pub async fn send_booking_confirmation(
        &self,
        request: &NotificationRequest,
    ) -> NotificationResult {
        let template = BookingConfirmationTemplate::from_request(request);
        let compact = template.compact_line();

        let (email, sms, whatsapp) = futures::join!(
            self.try_email(
                request.recipient_email.as_deref(),
                template.subject(),
                template.text_body(),
                template.html_body(),
            ),
            self.try_sms(request.recipient_phone.as_deref(), &compact),
            self.try_whatsapp(request.recipient_phone.as_deref(), &compact),
        );

        let result = Self::fold(email, sms, whatsapp);
        info!(
            "Booking confirmation dispatched for {}: email={} sms={} whatsapp={} errors={}",
            request.booking_id,
            result.email_sent,
            result.sms_sent,
            result.whatsapp_sent,
            result.errors.len()
        );
        result
    }

    /// Account-welcome fan-out: email and SMS only.
    pub async fn send_account_welcome(&self, request: &WelcomeRequest) -> NotificationResult {
        let template = WelcomeTemplate::from_request(request);
        let compact = template.compact_line();

        let (email, sms) = futures::join!(
            self.try_email(
                request.email.as_deref(),
                template.subject(),
                template.text_body(),
                template.html_body(),
            ),
            self.try_sms(request.phone.as_deref(), &compact),
        );

        Self::fold(email, sms, ChannelOutcome::NotAttempted)
    }

    async fn try_email(
        &self,
        to: Option<&str>,
        subject: String,
        text: String,
        html: String,
    ) -> ChannelOutcome {
        let client = match &self.email {
            Some(client) if !self.email_from.is_empty() => client,
            _ => return ChannelOutcome::NotAttempted,
        };
        let to = match to.filter(|to| !to.is_empty()) {
            Some(to) => to,
            None => {
                debug!("Skipping email: no recipient address");
                return ChannelOutcome::NotAttempted;
            }
        };

        let message = EmailMessage {
            to: to.to_string(),
            from: self.email_from.clone(),
            subject,
            text,
            html,
        };

        match client.send(&message).await {
            Ok(message_id) => ChannelOutcome::Sent(message_id),
            Err(err) => {
                warn!("Email channel failed: {}", err);
                ChannelOutcome::Failed(err)
            }
        }
    }

    async fn try_sms(&self, to: Option<&str>, body: &str) -> ChannelOutcome {
        let client = match &self.messaging {
            Some(client) if !self.sms_from.is_empty() => client,
            _ => return ChannelOutcome::NotAttempted,
        };
        let to = match eligible_phone(to) {
            Some(to) => to,
            None => {
                debug!("Skipping SMS: no deliverable destination");
                return ChannelOutcome::NotAttempted;
            }
        };

        match client.send_sms(&self.sms_from, to, body).await {
            Ok(sid) => ChannelOutcome::Sent(Some(sid)),
            Err(err) => {
                warn!("SMS channel failed: {}", err);
                ChannelOutcome::Failed(err)
            }
        }
    }

    async fn try_whatsapp(&self, to: Option<&str>, body: &str) -> ChannelOutcome {
        let client = match &self.messaging {
            Some(client) if !self.whatsapp_from.is_empty() => client,
            _ => return ChannelOutcome::NotAttempted,
        };
        let to = match eligible_phone(to) {
            Some(to) => to,
            None => {
                debug!("Skipping WhatsApp: no deliverable destination");
                return ChannelOutcome::NotAttempted;
            }
        };

        match client.send_whatsapp(&self.whatsapp_from, to, body).await {
            Ok(sid) => ChannelOutcome::Sent(Some(sid)),
            Err(err) => {
                warn!("WhatsApp channel failed: {}", err);
                ChannelOutcome::Failed(err)
            }
        }
    }

    fn fold(
        email: ChannelOutcome,
        sms: ChannelOutcome,
        whatsapp: ChannelOutcome,
    ) -> NotificationResult {
        let mut result = NotificationResult {
            email_sent: email.sent(),
            sms_sent: sms.sent(),
            whatsapp_sent: whatsapp.sent(),
            email_message_id: email.message_id(),
            sms_message_sid: sms.message_id(),
            whatsapp_message_sid: whatsapp.message_id(),
            errors: Vec::new(),
        };
        result.errors.extend(email.into_error());
        result.errors.extend(sms.into_error());
        result.errors.extend(whatsapp.into_error());
        result
    }
}

fn eligible_phone(raw: Option<&str>) -> Option<&str> {
    raw.filter(|phone| is_deliverable_phone(phone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, ChannelErrorKind};
    use crate::services::sendgrid::MockEmailApi;
    use crate::services::twilio::MockMessagingApi;
    use chrono::NaiveDate;
    use room_provisioning_cell::SessionType;

    fn test_config() -> AppConfig {
        AppConfig {
            hms_management_token: String::new(),
            hms_template_id: String::new(),
            hms_audio_template_id: None,
            hms_subdomain: None,
            hms_region: None,
            hms_api_base_url: "https://api.100ms.live/v2".to_string(),
            hms_join_domain: "app.100ms.live".to_string(),
            app_base_url: None,
            sendgrid_api_key: "sg-key".to_string(),
            sendgrid_api_base_url: "https://api.sendgrid.com".to_string(),
            email_from: "care@example.com".to_string(),
            twilio_account_sid: "AC123".to_string(),
            twilio_auth_token: "secret".to_string(),
            twilio_api_base_url: "https://api.twilio.com".to_string(),
            twilio_sms_from: "+15550001111".to_string(),
            twilio_whatsapp_from: "+15550002222".to_string(),
        }
    }

    fn confirmation_request() -> NotificationRequest {
        NotificationRequest {
            booking_id: "b1".to_string(),
            recipient_name: Some("Ada".to_string()),
            recipient_email: Some("ada@example.com".to_string()),
            recipient_phone: Some("+4915112345678".to_string()),
            therapist_name: "Dr. Grace".to_string(),
            session_type: SessionType::Video,
            session_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            time_slot: "10:00 - 11:00".to_string(),
            room_code: Some("abc-defg-hij".to_string()),
            meeting_url: Some("https://therapy.app.100ms.live/meeting/abc-defg-hij".to_string()),
        }
    }

    fn email_error() -> ChannelError {
        ChannelError {
            channel: Channel::Email,
            kind: ChannelErrorKind::Api,
            detail: "HTTP 500: upstream unavailable".to_string(),
            provider_status: Some(500),
        }
    }

    #[test]
    fn test_phone_validation_is_loose_international() {
        assert!(is_deliverable_phone("+4915112345678"));
        assert!(is_deliverable_phone("015112345678"));
        assert!(is_deliverable_phone("+1 (555) 000-1111"));
        assert!(!is_deliverable_phone("12345"));
        assert!(!is_deliverable_phone("not-a-number"));
        assert!(!is_deliverable_phone("+1234567890123456789"));
        assert!(!is_deliverable_phone(""));
    }

    #[tokio::test]
    async fn test_email_failure_never_blocks_sms() {
        let mut email = MockEmailApi::new();
        email.expect_send().returning(|_| Err(email_error()));

        let mut messaging = MockMessagingApi::new();
        messaging
            .expect_send_sms()
            .returning(|_, _, _| Ok("SM123".to_string()));
        messaging
            .expect_send_whatsapp()
            .returning(|_, _, _| Ok("WA123".to_string()));

        let dispatcher = NotificationDispatcher::with_clients(
            &test_config(),
            Some(Arc::new(email)),
            Some(Arc::new(messaging)),
        );

        let result = dispatcher
            .send_booking_confirmation(&confirmation_request())
            .await;

        assert!(!result.email_sent);
        assert!(result.sms_sent);
        assert!(result.whatsapp_sent);
        assert_eq!(result.sms_message_sid.as_deref(), Some("SM123"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].channel, Channel::Email);
        assert_eq!(result.errors[0].provider_status, Some(500));
    }

    #[tokio::test]
    async fn test_invalid_phone_is_not_attempted_and_not_an_error() {
        let mut email = MockEmailApi::new();
        email
            .expect_send()
            .returning(|_| Ok(Some("msg-1".to_string())));

        // The messaging client must never be called for an undeliverable
        // destination; no expectations are registered.
        let messaging = MockMessagingApi::new();

        let dispatcher = NotificationDispatcher::with_clients(
            &test_config(),
            Some(Arc::new(email)),
            Some(Arc::new(messaging)),
        );

        let mut request = confirmation_request();
        request.recipient_phone = Some("not-a-number".to_string());

        let result = dispatcher.send_booking_confirmation(&request).await;

        assert!(result.email_sent);
        assert_eq!(result.email_message_id.as_deref(), Some("msg-1"));
        assert!(!result.sms_sent);
        assert!(!result.whatsapp_sent);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_configured_attempts_nothing() {
        let mut config = test_config();
        config.sendgrid_api_key = String::new();
        config.email_from = String::new();
        config.twilio_account_sid = String::new();
        config.twilio_auth_token = String::new();
        config.twilio_sms_from = String::new();
        config.twilio_whatsapp_from = String::new();

        let dispatcher = NotificationDispatcher::new(&config);

        assert!(!dispatcher.channels_available());

        let result = dispatcher
            .send_booking_confirmation(&confirmation_request())
            .await;

        assert!(!result.any_sent());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_welcome_skips_whatsapp() {
        let mut email = MockEmailApi::new();
        email
            .expect_send()
            .returning(|_| Ok(Some("msg-2".to_string())));

        let mut messaging = MockMessagingApi::new();
        messaging
            .expect_send_sms()
            .returning(|_, _, _| Ok("SM456".to_string()));

        let dispatcher = NotificationDispatcher::with_clients(
            &test_config(),
            Some(Arc::new(email)),
            Some(Arc::new(messaging)),
        );

        let result = dispatcher
            .send_account_welcome(&WelcomeRequest {
                name: Some("Ada".to_string()),
                email: Some("ada@example.com".to_string()),
                phone: Some("+4915112345678".to_string()),
            })
            .await;

        assert!(result.email_sent);
        assert!(result.sms_sent);
        assert!(!result.whatsapp_sent);
        assert!(result.whatsapp_message_sid.is_none());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_missing_email_address_is_not_attempted() {
        // No expectations: the email client must not be called.
        let email = MockEmailApi::new();

        let dispatcher =
            NotificationDispatcher::with_clients(&test_config(), Some(Arc::new(email)), None);

        let mut request = confirmation_request();
        request.recipient_email = None;

        let result = dispatcher.send_booking_confirmation(&request).await;

        assert!(!result.email_sent);
        assert!(!result.sms_sent);
        assert!(result.errors.is_empty());
    }
}
