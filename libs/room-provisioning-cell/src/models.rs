// libs/room-provisioning-cell/src/models.rs
use serde::{Deserialize, Serialize};

// ==============================================================================
// ROOM PROVISIONING DOMAIN MODELS
// ==============================================================================

/// Kind of real-time session the room is provisioned for.
///
/// An audio session may use a dedicated provider template when one is
/// configured; otherwise it shares the default template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Video,
    Audio,
}

impl SessionType {
    /// Short prefix used when composing provider-side room names.
    pub fn room_prefix(&self) -> &'static str {
        match self {
            SessionType::Video => "video",
            SessionType::Audio => "audio",
        }
    }
}

/// Input for a single provisioning call. Created per call and discarded;
/// this subsystem owns no persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub booking_id: String,
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_room_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_meeting_url: Option<String>,
}

/// Which side produced the room code in a `ProvisionResult`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomProviderKind {
    External,
    Fallback,
}

/// Outcome of a provisioning call.
///
/// `room_code` is always non-empty. `meeting_url` may legitimately be absent:
/// a room that was created but yielded no shareable code is a degraded
/// success, not an error, and callers must render a "link pending" state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionResult {
    pub room_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub generated: bool,
    pub provider: RoomProviderKind,
}

// ==============================================================================
// ROOM PROVIDER API MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailsResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCodeResponse {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCodeEntry {
    pub code: String,
    pub role: String,
}

/// Response of the batch room-code endpoint, which mints codes for every
/// role of the room's template in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCodeBatchResponse {
    pub data: Vec<RoomCodeEntry>,
}

// ==============================================================================
// ERROR HANDLING
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// Required provider credentials are missing. Fatal: never retried,
    /// always propagated to the caller.
    #[error("Room provider not configured: {message}")]
    NotConfigured { message: String },

    /// Provider rejected the room name as already taken. Retried exactly
    /// once with a re-uniquified name.
    #[error("Room name conflict: {message}")]
    NameConflict { message: String },

    /// Network failure, non-2xx status, or malformed payload. Transient:
    /// the provisioner degrades to a locally generated fallback code.
    #[error("Room provider error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },
}

impl ProvisioningError {
    /// Only missing configuration surfaces as a hard failure to the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProvisioningError::NotConfigured { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProvisioningError::Provider {
                status: Some(404),
                ..
            }
        )
    }
}

impl From<reqwest::Error> for ProvisioningError {
    fn from(err: reqwest::Error) -> Self {
        ProvisioningError::Provider {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
