// libs/room-provisioning-cell/src/services/hms.rs
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{
    CreateRoomRequest, CreateRoomResponse, ProvisioningError, RoomCodeBatchResponse,
    RoomCodeResponse, RoomDetailsResponse,
};

/// Per-attempt HTTP deadline. The provider contract specifies none, so a
/// hung connection must be bounded here rather than by client defaults.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Abstracted room provider contract. The HTTP client implements it for the
/// 100ms management API; tests inject fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomProviderApi: Send + Sync {
    /// `POST /rooms` - 409 when the name is already taken.
    async fn create_room(
        &self,
        request: &CreateRoomRequest,
    ) -> Result<CreateRoomResponse, ProvisioningError>;

    /// `GET /rooms/{id}`.
    async fn get_room(&self, room_id: &str) -> Result<RoomDetailsResponse, ProvisioningError>;

    /// `POST /room-codes/room/{id}/role/{role}`.
    async fn create_room_code(
        &self,
        room_id: &str,
        role: &str,
    ) -> Result<RoomCodeResponse, ProvisioningError>;

    /// `POST /room-codes/room/{id}` - alternate endpoint minting codes for
    /// every role at once.
    async fn create_room_codes(
        &self,
        room_id: &str,
    ) -> Result<RoomCodeBatchResponse, ProvisioningError>;
}

/// 100ms management API client for room and room-code operations.
#[derive(Debug)]
pub struct HmsRoomClient {
    client: Client,
    management_token: String,
    base_url: String,
}

impl HmsRoomClient {
    pub fn new(config: &AppConfig) -> Result<Self, ProvisioningError> {
        if !config.is_room_provider_configured() {
            return Err(ProvisioningError::NotConfigured {
                message: "HMS_MANAGEMENT_TOKEN and HMS_TEMPLATE_ID must be set".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            client,
            management_token: config.hms_management_token.clone(),
            base_url: config.hms_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, T>(&self, url: &str, body: Option<&B>) -> Result<T, ProvisioningError>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        debug!("Sending room provider request to: {}", url);

        let mut request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.management_token))
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.parse_response(url, response).await
    }

    async fn parse_response<T>(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, ProvisioningError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let response_text = response.text().await?;

        debug!("Room provider response: {} - {}", status, response_text);

        if status == StatusCode::CONFLICT {
            return Err(ProvisioningError::NameConflict {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        if !status.is_success() {
            error!("Room provider call failed: {} {} - {}", url, status, response_text);
            return Err(ProvisioningError::Provider {
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| ProvisioningError::Provider {
            status: None,
            message: format!("Failed to parse provider response: {}", e),
        })
    }
}

#[async_trait]
impl RoomProviderApi for HmsRoomClient {
    async fn create_room(
        &self,
        request: &CreateRoomRequest,
    ) -> Result<CreateRoomResponse, ProvisioningError> {
        info!("Creating provider room: {}", request.name);

        let url = format!("{}/rooms", self.base_url);
        let created: CreateRoomResponse = self.post_json(&url, Some(request)).await?;

        info!("Successfully created provider room: {}", created.id);
        Ok(created)
    }

    async fn get_room(&self, room_id: &str) -> Result<RoomDetailsResponse, ProvisioningError> {
        debug!("Fetching provider room details: {}", room_id);

        let url = format!("{}/rooms/{}", self.base_url, room_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.management_token))
            .send()
            .await?;

        self.parse_response(&url, response).await
    }

    async fn create_room_code(
        &self,
        room_id: &str,
        role: &str,
    ) -> Result<RoomCodeResponse, ProvisioningError> {
        debug!("Creating room code for room {} role {}", room_id, role);

        let url = format!("{}/room-codes/room/{}/role/{}", self.base_url, room_id, role);
        self.post_json::<(), _>(&url, None).await
    }

    async fn create_room_codes(
        &self,
        room_id: &str,
    ) -> Result<RoomCodeBatchResponse, ProvisioningError> {
        debug!("Creating room codes for all roles of room {}", room_id);

        let url = format!("{}/room-codes/room/{}", self.base_url, room_id);
        self.post_json::<(), _>(&url, None).await
    }
}
