// libs/notification-cell/src/lib.rs
//! # Notification Cell
//!
//! Best-effort, multi-channel delivery of booking confirmations and account
//! welcomes over email, SMS, and WhatsApp.
//!
//! Channels succeed or fail independently: every configured channel with a
//! deliverable destination is attempted, failures are aggregated as
//! structured per-channel errors, and a partially failed result is a
//! legitimate outcome for the caller to render, never an exception. A
//! channel without configuration or with a malformed destination is simply
//! not attempted, which is distinct from a failed attempt.
//!
//! ## Configuration
//!
//! - Email: `SENDGRID_API_KEY`, `EMAIL_FROM`
//! - SMS: `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_SMS_FROM`
//! - WhatsApp: `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`,
//!   `TWILIO_WHATSAPP_FROM`

pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::{
    Channel, ChannelError, ChannelErrorKind, EmailMessage, NotificationRequest,
    NotificationResult, WelcomeRequest,
};

pub use services::{
    EmailApi, MessagingApi, NotificationDispatcher, SendGridClient, TwilioClient,
};
