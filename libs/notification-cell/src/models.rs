// libs/notification-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use room_provisioning_cell::SessionType;

// ==============================================================================
// NOTIFICATION DOMAIN MODELS
// ==============================================================================

/// Input for a booking-confirmation fan-out. Recipient contact fields are
/// individually optional; presence gates which channels are attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub booking_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
    pub therapist_name: String,
    pub session_type: SessionType,
    pub session_date: NaiveDate,
    pub time_slot: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
}

/// Input for an account-welcome fan-out (email and SMS only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    WhatsApp,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Channel::Email => "EMAIL",
            Channel::Sms => "SMS",
            Channel::WhatsApp => "WHATSAPP",
        };
        write!(f, "{}", tag)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelErrorKind {
    /// Request never reached the provider (DNS, connect, timeout).
    Network,
    /// Provider answered with a non-success status.
    Api,
    /// Provider answered but the payload could not be interpreted.
    Response,
}

/// One channel's failure, captured as a structured value so downstream
/// consumers never parse tagged strings. `detail` carries the top-level
/// message plus up to three provider sub-error messages.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{channel}: {detail}")]
pub struct ChannelError {
    pub channel: Channel,
    pub kind: ChannelErrorKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<u16>,
}

/// Aggregated outcome of a notification fan-out.
///
/// Every channel's boolean outcome is always reported. A channel that was
/// not attempted (missing configuration or malformed destination) is
/// `sent = false` with no entry in `errors`; a channel that was attempted
/// and failed is `sent = false` with an entry. Partial failure is a
/// legitimate result, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationResult {
    pub email_sent: bool,
    pub sms_sent: bool,
    pub whatsapp_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_message_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_message_sid: Option<String>,
    pub errors: Vec<ChannelError>,
}

impl NotificationResult {
    pub fn any_sent(&self) -> bool {
        self.email_sent || self.sms_sent || self.whatsapp_sent
    }
}

// ==============================================================================
// CHANNEL PROVIDER MODELS
// ==============================================================================

/// A fully rendered email, ready for the sending provider.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}
