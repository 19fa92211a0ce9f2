// libs/notification-cell/src/services/template.rs
use room_provisioning_cell::SessionType;

use crate::models::{NotificationRequest, WelcomeRequest};

/// Shared template model for a booking confirmation. All channels render
/// from this one value: email gets subject, plain text, and HTML; SMS and
/// WhatsApp get a single compact line.
#[derive(Debug, Clone)]
pub struct BookingConfirmationTemplate {
    recipient_name: String,
    therapist_name: String,
    session_label: &'static str,
    date: String,
    time_slot: String,
    join_url: Option<String>,
}

impl BookingConfirmationTemplate {
    pub fn from_request(request: &NotificationRequest) -> Self {
        Self {
            recipient_name: request
                .recipient_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "there".to_string()),
            therapist_name: request.therapist_name.clone(),
            session_label: match request.session_type {
                SessionType::Video => "video",
                SessionType::Audio => "audio",
            },
            date: request.session_date.format("%A, %B %-d, %Y").to_string(),
            time_slot: request.time_slot.clone(),
            join_url: request.meeting_url.clone().filter(|url| !url.is_empty()),
        }
    }

    pub fn subject(&self) -> String {
        format!("Your {} session on {} is confirmed", self.session_label, self.date)
    }

    pub fn text_body(&self) -> String {
        let mut body = format!(
            "Hi {},\n\nYour {} session with {} is confirmed.\n\nDate: {}\nTime: {}\n",
            self.recipient_name, self.session_label, self.therapist_name, self.date, self.time_slot
        );
        match &self.join_url {
            Some(url) => body.push_str(&format!("\nJoin here: {}\n", url)),
            None => body.push_str("\nYour join link will be sent separately before the session.\n"),
        }
        body.push_str("\nWe look forward to seeing you.\n");
        body
    }

    pub fn html_body(&self) -> String {
        let join_block = match &self.join_url {
            Some(url) => format!("<p><a href=\"{}\">Join your session</a></p>", url),
            None => "<p>Your join link will be sent separately before the session.</p>".to_string(),
        };
        format!(
            "<html><body>\
             <p>Hi {},</p>\
             <p>Your {} session with <strong>{}</strong> is confirmed.</p>\
             <p>Date: {}<br/>Time: {}</p>\
             {}\
             <p>We look forward to seeing you.</p>\
             </body></html>",
            self.recipient_name,
            self.session_label,
            self.therapist_name,
            self.date,
            self.time_slot,
            join_block
        )
    }

    /// Single-line rendering for SMS and WhatsApp.
    pub fn compact_line(&self) -> String {
        match &self.join_url {
            Some(url) => format!(
                "Hi {}, your {} session with {} on {} at {} is confirmed. Join: {}",
                self.recipient_name,
                self.session_label,
                self.therapist_name,
                self.date,
                self.time_slot,
                url
            ),
            None => format!(
                "Hi {}, your {} session with {} on {} at {} is confirmed. Your join link will follow.",
                self.recipient_name,
                self.session_label,
                self.therapist_name,
                self.date,
                self.time_slot
            ),
        }
    }
}

/// Template for the account-welcome fan-out.
#[derive(Debug, Clone)]
pub struct WelcomeTemplate {
    name: String,
}

impl WelcomeTemplate {
    pub fn from_request(request: &WelcomeRequest) -> Self {
        Self {
            name: request
                .name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "there".to_string()),
        }
    }

    pub fn subject(&self) -> String {
        "Welcome! Your account is ready".to_string()
    }

    pub fn text_body(&self) -> String {
        format!(
            "Hi {},\n\nWelcome! Your account has been created.\n\nYou can now book sessions and manage your appointments online.\n",
            self.name
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            "<html><body>\
             <p>Hi {},</p>\
             <p>Welcome! Your account has been created.</p>\
             <p>You can now book sessions and manage your appointments online.</p>\
             </body></html>",
            self.name
        )
    }

    pub fn compact_line(&self) -> String {
        format!("Hi {}, welcome! Your account is ready. You can now book sessions online.", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(meeting_url: Option<&str>) -> NotificationRequest {
        NotificationRequest {
            booking_id: "b1".to_string(),
            recipient_name: Some("Ada".to_string()),
            recipient_email: Some("ada@example.com".to_string()),
            recipient_phone: None,
            therapist_name: "Dr. Grace".to_string(),
            session_type: SessionType::Video,
            session_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            time_slot: "10:00 - 11:00".to_string(),
            room_code: Some("abc-defg-hij".to_string()),
            meeting_url: meeting_url.map(str::to_string),
        }
    }

    #[test]
    fn test_confirmation_renders_all_fields() {
        let template = BookingConfirmationTemplate::from_request(&request(Some(
            "https://therapy.app.100ms.live/meeting/abc-defg-hij",
        )));

        let text = template.text_body();
        assert!(text.contains("Ada"));
        assert!(text.contains("Dr. Grace"));
        assert!(text.contains("Wednesday, January 15, 2025"));
        assert!(text.contains("10:00 - 11:00"));
        assert!(text.contains("https://therapy.app.100ms.live/meeting/abc-defg-hij"));

        let html = template.html_body();
        assert!(html.contains("<strong>Dr. Grace</strong>"));
        assert!(html.contains("Join your session"));
    }

    #[test]
    fn test_absent_meeting_url_renders_link_pending_wording() {
        let template = BookingConfirmationTemplate::from_request(&request(None));

        assert!(template.text_body().contains("sent separately"));
        assert!(template.compact_line().contains("join link will follow"));
        assert!(!template.compact_line().contains("Join:"));
    }

    #[test]
    fn test_compact_line_is_single_line() {
        let template = BookingConfirmationTemplate::from_request(&request(Some(
            "https://example.com/sessions/join/abc-defg-hij",
        )));
        assert!(!template.compact_line().contains('\n'));
    }

    #[test]
    fn test_missing_recipient_name_uses_neutral_greeting() {
        let mut req = request(None);
        req.recipient_name = None;

        let template = BookingConfirmationTemplate::from_request(&req);
        assert!(template.compact_line().starts_with("Hi there,"));
    }

    #[test]
    fn test_welcome_renders_name() {
        let template = WelcomeTemplate::from_request(&WelcomeRequest {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: None,
        });

        assert!(template.text_body().contains("Hi Ada"));
        assert!(!template.compact_line().contains('\n'));
    }
}
