// libs/room-provisioning-cell/src/services/provisioner.rs
use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use shared_config::AppConfig;

use crate::models::{
    CreateRoomRequest, ProvisionRequest, ProvisionResult, ProvisioningError, RoomProviderKind,
    SessionType,
};
use crate::services::fallback::FallbackRoomGenerator;
use crate::services::hms::{HmsRoomClient, RoomProviderApi};
use crate::services::meeting_url::MeetingUrlBuilder;
use crate::services::retry::RetryPolicy;
use crate::services::room_code::RoomCodeResolver;

/// Top-level orchestrator for obtaining a joinable room for a booking.
///
/// Every provisioning call is a self-contained unit of work: reuse an
/// existing code, or create a provider room and resolve its shareable code,
/// degrading to a locally generated fallback code when the provider is
/// unavailable. The only error surfaced to callers is missing provider
/// configuration; every transient failure produces a usable result.
///
/// Concurrent calls for the same booking are not deduplicated here. A
/// caller that provisions one booking twice gets two distinct provider
/// rooms; serializing those calls is the booking subsystem's
/// responsibility.
pub struct RoomProvisioner {
    provider: Option<Arc<dyn RoomProviderApi>>,
    resolver: RoomCodeResolver,
    url_builder: MeetingUrlBuilder,
    template_id: String,
    audio_template_id: Option<String>,
    region: Option<String>,
}

impl RoomProvisioner {
    pub fn new(config: &AppConfig) -> Self {
        let provider: Option<Arc<dyn RoomProviderApi>> = match HmsRoomClient::new(config) {
            Ok(client) => {
                info!("Room provider client initialized");
                Some(Arc::new(client))
            }
            Err(_) => {
                warn!("Room provider not configured - provisioning will require existing codes or degrade to fallback");
                None
            }
        };

        Self::with_provider(config, provider, RetryPolicy::default())
    }

    /// Constructor for tests and callers that inject their own provider
    /// client or retry policy.
    pub fn with_provider(
        config: &AppConfig,
        provider: Option<Arc<dyn RoomProviderApi>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            resolver: RoomCodeResolver::new(retry),
            url_builder: MeetingUrlBuilder::new(config),
            template_id: config.hms_template_id.clone(),
            audio_template_id: config.hms_audio_template_id.clone(),
            region: config.hms_region.clone(),
        }
    }

    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionResult, ProvisioningError> {
        if let Some(existing) = request
            .existing_room_code
            .as_deref()
            .filter(|code| !code.is_empty())
        {
            return Ok(self.reuse_existing(request, existing));
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            ProvisioningError::NotConfigured {
                message: format!(
                    "No existing room code for booking {} and room provider credentials are missing",
                    request.booking_id
                ),
            }
        })?;

        let created = match self.create_room(provider.as_ref(), request).await {
            Ok(created) => created,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => return Ok(self.fallback_result(request, &err)),
        };

        match self
            .resolver
            .resolve(provider.as_ref(), &created.id, created.code.as_deref())
            .await
        {
            Some(code) => {
                info!(
                    "Provisioned room {} with shareable code for booking {}",
                    created.id, request.booking_id
                );
                Ok(ProvisionResult {
                    meeting_url: self.url_builder.build(&code),
                    room_code: code,
                    room_id: Some(created.id),
                    generated: true,
                    provider: RoomProviderKind::External,
                })
            }
            None => {
                // Degraded success: the room exists, the join link does not.
                warn!(
                    "Room {} created for booking {} but no shareable code could be obtained",
                    created.id, request.booking_id
                );
                Ok(ProvisionResult {
                    room_code: created.id.clone(),
                    meeting_url: None,
                    room_id: Some(created.id),
                    generated: true,
                    provider: RoomProviderKind::External,
                })
            }
        }
    }

    async fn create_room(
        &self,
        provider: &dyn RoomProviderApi,
        request: &ProvisionRequest,
    ) -> Result<crate::models::CreateRoomResponse, ProvisioningError> {
        match provider.create_room(&self.room_request(request)).await {
            Ok(created) => Ok(created),
            Err(ProvisioningError::NameConflict { message }) => {
                // Retried exactly once: a fresh timestamp and suffix make the
                // name unique again.
                warn!(
                    "Room name conflict for booking {}, retrying with a re-uniquified name: {}",
                    request.booking_id, message
                );
                provider.create_room(&self.room_request(request)).await
            }
            Err(err) => Err(err),
        }
    }

    fn room_request(&self, request: &ProvisionRequest) -> CreateRoomRequest {
        let template_id = match request.session_type {
            SessionType::Audio => self
                .audio_template_id
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.template_id.clone()),
            SessionType::Video => self.template_id.clone(),
        };

        CreateRoomRequest {
            name: unique_room_name(request.session_type, &request.booking_id),
            description: Some(format!("Session room for booking {}", request.booking_id)),
            template_id,
            region: self.region.clone(),
        }
    }

    fn reuse_existing(&self, request: &ProvisionRequest, code: &str) -> ProvisionResult {
        let meeting_url = request
            .existing_meeting_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| self.url_builder.build(code));

        let provider = match meeting_url.as_deref() {
            Some(url) if self.url_builder.is_external_url(url) => RoomProviderKind::External,
            _ => RoomProviderKind::Fallback,
        };

        info!(
            "Reusing existing room code for booking {} ({:?})",
            request.booking_id, provider
        );

        ProvisionResult {
            room_code: code.to_string(),
            meeting_url,
            room_id: None,
            generated: false,
            provider,
        }
    }

    fn fallback_result(&self, request: &ProvisionRequest, cause: &ProvisioningError) -> ProvisionResult {
        warn!(
            "Room provider unavailable for booking {}, generating local fallback code: {}",
            request.booking_id, cause
        );

        let code = FallbackRoomGenerator::generate(&request.booking_id);
        ProvisionResult {
            meeting_url: self.url_builder.build(&code),
            room_code: code,
            room_id: None,
            generated: true,
            provider: RoomProviderKind::Fallback,
        }
    }
}

/// Room names are unique per call: even repeated provisioning of the same
/// booking yields a distinct provider-side room, which sidesteps any need
/// for idempotency keys.
fn unique_room_name(session_type: SessionType, booking_id: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();

    format!(
        "{}_booking_{}_{}_{}",
        session_type.room_prefix(),
        sanitize_booking_id(booking_id),
        Utc::now().timestamp_millis(),
        suffix
    )
}

fn sanitize_booking_id(booking_id: &str) -> String {
    booking_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
