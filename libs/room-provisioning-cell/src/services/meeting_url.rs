// libs/room-provisioning-cell/src/services/meeting_url.rs
use shared_config::AppConfig;

/// Builds join URLs for room codes. Pure, no I/O.
///
/// Prefers the provider subdomain; falls back to the application base URL
/// with a fixed join path; with neither configured, returns `None` and the
/// caller renders a "link pending" state.
#[derive(Debug, Clone)]
pub struct MeetingUrlBuilder {
    subdomain: Option<String>,
    join_domain: String,
    app_base_url: Option<String>,
}

impl MeetingUrlBuilder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            subdomain: config.hms_subdomain.clone(),
            join_domain: config.hms_join_domain.clone(),
            app_base_url: config.app_base_url.clone(),
        }
    }

    pub fn build(&self, room_code: &str) -> Option<String> {
        if let Some(subdomain) = self.subdomain.as_deref().filter(|s| !s.is_empty()) {
            return Some(format!(
                "https://{}.{}/meeting/{}",
                subdomain, self.join_domain, room_code
            ));
        }
        if let Some(base) = self.app_base_url.as_deref().filter(|s| !s.is_empty()) {
            return Some(format!("{}/sessions/join/{}", base.trim_end_matches('/'), room_code));
        }
        None
    }

    /// Whether a URL points at the external provider's join domain. Used to
    /// infer the provider of a reused room.
    pub fn is_external_url(&self, url: &str) -> bool {
        url.contains(&self.join_domain)
    }
}
