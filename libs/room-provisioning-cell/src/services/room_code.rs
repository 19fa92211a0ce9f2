// libs/room-provisioning-cell/src/services/room_code.rs
use std::sync::OnceLock;

use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::ProvisioningError;
use crate::services::hms::RoomProviderApi;
use crate::services::retry::{resolve_ordered, RetryPolicy};

/// Roles tried in order when minting a shareable code. Providers reject
/// roles missing from the room's template, so the sweep continues until one
/// is accepted.
const ROLE_CANDIDATES: [&str; 3] = ["host", "instructor", "guest"];

/// Shape of a shareable room code: three lowercase alphanumeric groups of
/// lengths 3-4-3. A mismatch is logged, never raised; provider formats may
/// evolve.
fn code_shape() -> Option<&'static Regex> {
    static CODE_SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    CODE_SHAPE
        .get_or_init(|| Regex::new(r"^[a-z0-9]{3}-[a-z0-9]{4}-[a-z0-9]{3}$").ok())
        .as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeEndpoint {
    RoleScoped,
    Batch,
}

/// Obtains a human-shareable code for an already-created room.
///
/// Resolution order: code embedded in the creation response, then a room
/// details lookup, then explicit code creation swept across role
/// candidates. Code-creation attempts retry with linear backoff to absorb
/// provider-side propagation delay, trying the batch endpoint once
/// whenever the role-scoped endpoint answers 404.
pub struct RoomCodeResolver {
    roles: Vec<String>,
    retry: RetryPolicy,
}

impl RoomCodeResolver {
    pub fn new(retry: RetryPolicy) -> Self {
        Self::with_roles(ROLE_CANDIDATES.iter().map(|r| r.to_string()).collect(), retry)
    }

    pub fn with_roles(roles: Vec<String>, retry: RetryPolicy) -> Self {
        Self { roles, retry }
    }

    /// Returns `None` when every attempt is exhausted; the caller degrades
    /// to the internal room identifier rather than failing the booking.
    pub async fn resolve(
        &self,
        provider: &dyn RoomProviderApi,
        room_id: &str,
        embedded_code: Option<&str>,
    ) -> Option<String> {
        if let Some(code) = embedded_code.filter(|c| !c.is_empty()) {
            debug!("Using room code embedded in creation response for room {}", room_id);
            return Some(self.checked(code));
        }

        match provider.get_room(room_id).await {
            Ok(details) => {
                if let Some(code) = details.code.filter(|c| !c.is_empty()) {
                    debug!("Resolved room code from room details for room {}", room_id);
                    return Some(self.checked(&code));
                }
            }
            Err(err) => {
                debug!("Room details lookup failed for room {}: {}", room_id, err);
            }
        }

        let outcome = resolve_ordered(
            "room code role",
            &self.roles,
            |role| self.code_for_role(provider, room_id, role),
            |_| true,
        )
        .await;

        match outcome {
            Ok(code) => {
                info!("Resolved room code for room {}", room_id);
                Some(self.checked(&code))
            }
            Err(err) => {
                warn!("Exhausted all room code attempts for room {}: {}", room_id, err);
                None
            }
        }
    }

    async fn code_for_role(
        &self,
        provider: &dyn RoomProviderApi,
        room_id: &str,
        role: String,
    ) -> Result<String, ProvisioningError> {
        let mut last_error = ProvisioningError::Provider {
            status: None,
            message: format!("No code attempts made for role {}", role),
        };

        for attempt in 1..=self.retry.max_attempts {
            match self.code_via_endpoints(provider, room_id, &role).await {
                Ok(code) => return Ok(code),
                Err(err) => {
                    warn!(
                        "Room code attempt {}/{} for room {} role {} failed: {}",
                        attempt, self.retry.max_attempts, room_id, role, err
                    );
                    last_error = err;
                    if attempt < self.retry.max_attempts {
                        sleep(self.retry.delay_for(attempt)).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    async fn code_via_endpoints(
        &self,
        provider: &dyn RoomProviderApi,
        room_id: &str,
        role: &str,
    ) -> Result<String, ProvisioningError> {
        resolve_ordered(
            "room code endpoint",
            &[CodeEndpoint::RoleScoped, CodeEndpoint::Batch],
            |endpoint| async move {
                match endpoint {
                    CodeEndpoint::RoleScoped => provider
                        .create_room_code(room_id, role)
                        .await
                        .map(|response| response.code),
                    CodeEndpoint::Batch => {
                        let batch = provider.create_room_codes(room_id).await?;
                        batch
                            .data
                            .iter()
                            .find(|entry| entry.role == role)
                            .or_else(|| batch.data.first())
                            .map(|entry| entry.code.clone())
                            .ok_or_else(|| ProvisioningError::Provider {
                                status: None,
                                message: format!("Empty room code batch for room {}", room_id),
                            })
                    }
                }
            },
            ProvisioningError::is_not_found,
        )
        .await
    }

    fn checked(&self, code: &str) -> String {
        if let Some(shape) = code_shape() {
            if !shape.is_match(code) {
                warn!("Room code {} does not match the expected shape", code);
            }
        }
        code.to_string()
    }
}
