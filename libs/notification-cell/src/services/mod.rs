// libs/notification-cell/src/services/mod.rs

pub mod dispatcher;
pub mod sendgrid;
pub mod template;
pub mod twilio;

pub use dispatcher::NotificationDispatcher;
pub use sendgrid::{EmailApi, SendGridClient};
pub use template::{BookingConfirmationTemplate, WelcomeTemplate};
pub use twilio::{MessagingApi, TwilioClient};
