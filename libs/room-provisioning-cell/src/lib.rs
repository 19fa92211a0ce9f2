// libs/room-provisioning-cell/src/lib.rs
//! # Room Provisioning Cell
//!
//! This cell obtains a joinable real-time communication room for a scheduled
//! booking, tolerating name conflicts, propagation delays, and provider
//! outages.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------+
//! |               Room Provisioning Cell                |
//! +-----------------------------------------------------+
//! |  models.rs      |  Requests, results, provider DTOs |
//! |  services/      |  Business logic layer             |
//! |    hms.rs       |  Room provider HTTP client        |
//! |    provisioner.rs| Top-level orchestration          |
//! |    room_code.rs |  Shareable code resolution        |
//! |    fallback.rs  |  Local fallback code generation   |
//! |    meeting_url.rs| Join URL composition             |
//! |    retry.rs     |  Retry policy + candidate sweep   |
//! +-----------------------------------------------------+
//! ```
//!
//! ## Behavior
//!
//! A provisioning call reuses an existing room code when one is supplied;
//! otherwise it creates a provider room under a per-call-unique name
//! (retrying once on a name conflict) and resolves a human-shareable code,
//! retrying with linear backoff across an ordered list of roles to absorb
//! provider-side propagation delay. A room without a resolvable code is a
//! degraded success: the internal room id stands in as the code and the
//! meeting URL is absent. When the provider is unreachable entirely, a
//! locally generated fallback code in the same shareable shape keeps the
//! booking flow moving.
//!
//! Only missing provider configuration surfaces as an error; every
//! transient provider failure produces a usable `ProvisionResult`.
//!
//! ## Configuration
//!
//! Required environment variables:
//! - `HMS_MANAGEMENT_TOKEN` - management API token
//! - `HMS_TEMPLATE_ID` - default room template
//!
//! Optional: `HMS_AUDIO_TEMPLATE_ID`, `HMS_SUBDOMAIN`, `HMS_REGION`,
//! `HMS_API_BASE_URL`, `HMS_JOIN_DOMAIN`, `APP_BASE_URL`.

pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::{
    ProvisionRequest, ProvisionResult, ProvisioningError, RoomProviderKind, SessionType,
};

pub use services::{
    FallbackRoomGenerator, HmsRoomClient, MeetingUrlBuilder, RetryPolicy, RoomCodeResolver,
    RoomProvisioner, RoomProviderApi,
};
