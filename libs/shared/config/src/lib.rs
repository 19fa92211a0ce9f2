use std::env;
use tracing::warn;

/// Application configuration for the session room and notification providers.
///
/// Values are read once from the environment and validated lazily at call
/// time by the consuming cells; a missing credential set disables the
/// corresponding capability instead of failing process startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // 100ms room provider
    pub hms_management_token: String,
    pub hms_template_id: String,
    pub hms_audio_template_id: Option<String>,
    pub hms_subdomain: Option<String>,
    pub hms_region: Option<String>,
    pub hms_api_base_url: String,
    pub hms_join_domain: String,
    pub app_base_url: Option<String>,

    // SendGrid email sender
    pub sendgrid_api_key: String,
    pub sendgrid_api_base_url: String,
    pub email_from: String,

    // Twilio SMS / WhatsApp sender
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_api_base_url: String,
    pub twilio_sms_from: String,
    pub twilio_whatsapp_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            hms_management_token: env::var("HMS_MANAGEMENT_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("HMS_MANAGEMENT_TOKEN not set, room provisioning will use fallback codes");
                    String::new()
                }),
            hms_template_id: env::var("HMS_TEMPLATE_ID")
                .unwrap_or_else(|_| {
                    warn!("HMS_TEMPLATE_ID not set, room provisioning will use fallback codes");
                    String::new()
                }),
            hms_audio_template_id: env::var("HMS_AUDIO_TEMPLATE_ID").ok(),
            hms_subdomain: env::var("HMS_SUBDOMAIN").ok(),
            hms_region: env::var("HMS_REGION").ok(),
            hms_api_base_url: env::var("HMS_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.100ms.live/v2".to_string()),
            hms_join_domain: env::var("HMS_JOIN_DOMAIN")
                .unwrap_or_else(|_| "app.100ms.live".to_string()),
            app_base_url: env::var("APP_BASE_URL").ok(),
            sendgrid_api_key: env::var("SENDGRID_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("SENDGRID_API_KEY not set, email notifications disabled");
                    String::new()
                }),
            sendgrid_api_base_url: env::var("SENDGRID_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_FROM not set, email notifications disabled");
                    String::new()
                }),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_ACCOUNT_SID not set, SMS and WhatsApp notifications disabled");
                    String::new()
                }),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_AUTH_TOKEN not set, SMS and WhatsApp notifications disabled");
                    String::new()
                }),
            twilio_api_base_url: env::var("TWILIO_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            twilio_sms_from: env::var("TWILIO_SMS_FROM").unwrap_or_default(),
            twilio_whatsapp_from: env::var("TWILIO_WHATSAPP_FROM").unwrap_or_default(),
        };

        if !config.is_room_provider_configured() {
            warn!("Room provider not fully configured - provisioning will degrade to fallback codes");
        }

        config
    }

    pub fn is_room_provider_configured(&self) -> bool {
        !self.hms_management_token.is_empty() && !self.hms_template_id.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.sendgrid_api_key.is_empty() && !self.email_from.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_sms_from.is_empty()
    }

    pub fn is_whatsapp_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_whatsapp_from.is_empty()
    }
}
