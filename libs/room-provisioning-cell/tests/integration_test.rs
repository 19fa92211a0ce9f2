use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use room_provisioning_cell::{
    HmsRoomClient, ProvisionRequest, ProvisionResult, RetryPolicy, RoomProviderKind,
    RoomProvisioner, SessionType,
};
use shared_config::AppConfig;

fn test_config(api_base_url: &str) -> AppConfig {
    AppConfig {
        hms_management_token: "test-token".to_string(),
        hms_template_id: "tmpl-video".to_string(),
        hms_audio_template_id: None,
        hms_subdomain: Some("therapy".to_string()),
        hms_region: None,
        hms_api_base_url: api_base_url.to_string(),
        hms_join_domain: "app.100ms.live".to_string(),
        app_base_url: Some("https://example.com".to_string()),
        sendgrid_api_key: String::new(),
        sendgrid_api_base_url: "https://api.sendgrid.com".to_string(),
        email_from: String::new(),
        twilio_account_sid: String::new(),
        twilio_auth_token: String::new(),
        twilio_api_base_url: "https://api.twilio.com".to_string(),
        twilio_sms_from: String::new(),
        twilio_whatsapp_from: String::new(),
    }
}

fn provisioner_for(config: &AppConfig) -> RoomProvisioner {
    let client = HmsRoomClient::new(config).expect("provider client");
    RoomProvisioner::with_provider(config, Some(Arc::new(client)), RetryPolicy::immediate(2))
}

fn video_request(booking_id: &str) -> ProvisionRequest {
    ProvisionRequest {
        booking_id: booking_id.to_string(),
        session_type: SessionType::Video,
        existing_room_code: None,
        existing_meeting_url: None,
    }
}

fn shape_matches(code: &str) -> bool {
    let parts: Vec<&str> = code.split('-').collect();
    parts.len() == 3
        && parts[0].len() == 3
        && parts[1].len() == 4
        && parts[2].len() == 3
        && parts
            .iter()
            .all(|p| p.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

#[tokio::test]
async fn test_provision_with_code_embedded_in_creation_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rooms"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_string_contains("tmpl-video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "code": "abc-defg-hij"
        })))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let result = provisioner_for(&config)
        .provision(&video_request("b1"))
        .await
        .unwrap();

    assert_eq!(result.room_code, "abc-defg-hij");
    assert_eq!(
        result.meeting_url.as_deref(),
        Some("https://therapy.app.100ms.live/meeting/abc-defg-hij")
    );
    assert_eq!(result.room_id.as_deref(), Some("r1"));
    assert!(result.generated);
    assert_eq!(result.provider, RoomProviderKind::External);
}

#[tokio::test]
async fn test_provision_resolves_code_via_role_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r2" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/r2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r2" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/room-codes/room/r2/role/host"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": "qrs-tuvw-xyz" })))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let result = provisioner_for(&config)
        .provision(&video_request("b2"))
        .await
        .unwrap();

    assert_eq!(result.room_code, "qrs-tuvw-xyz");
    assert_eq!(result.room_id.as_deref(), Some("r2"));
    assert_eq!(result.provider, RoomProviderKind::External);
}

#[tokio::test]
async fn test_name_conflict_retries_once_and_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "room name already exists"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r3",
            "code": "abc-defg-hij"
        })))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let result = provisioner_for(&config)
        .provision(&video_request("b3"))
        .await
        .unwrap();

    assert_eq!(result.room_code, "abc-defg-hij");
    assert_eq!(result.provider, RoomProviderKind::External);
}

#[tokio::test]
async fn test_role_endpoint_404_falls_back_to_batch_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r4" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/r4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r4" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/room-codes/room/r4/role/host"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "role endpoint not found"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/room-codes/room/r4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "code": "aaa-bbbb-ccc", "role": "guest" },
                { "code": "ddd-eeee-fff", "role": "host" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let result = provisioner_for(&config)
        .provision(&video_request("b4"))
        .await
        .unwrap();

    // The batch response prefers the requested role's entry.
    assert_eq!(result.room_code, "ddd-eeee-fff");
}

#[tokio::test]
async fn test_degraded_success_when_every_code_attempt_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r5" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/r5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/room-codes/room/r5/role/host"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/room-codes/room/r5/role/instructor"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/room-codes/room/r5/role/guest"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let result = provisioner_for(&config)
        .provision(&video_request("b5"))
        .await
        .unwrap();

    assert_eq!(result.room_code, "r5");
    assert_eq!(result.room_id.as_deref(), Some("r5"));
    assert!(result.meeting_url.is_none());
    assert!(result.generated);
    assert_eq!(result.provider, RoomProviderKind::External);
}

#[tokio::test]
async fn test_provider_outage_degrades_to_fallback_code() {
    // Nothing listens on this port; room creation fails with a network error.
    let config = test_config("http://127.0.0.1:9");
    let result = provisioner_for(&config)
        .provision(&video_request("b6"))
        .await
        .unwrap();

    assert!(result.generated);
    assert_eq!(result.provider, RoomProviderKind::Fallback);
    assert!(shape_matches(&result.room_code), "unexpected code shape: {}", result.room_code);
    assert!(result.room_id.is_none());
    assert_eq!(
        result.meeting_url.as_deref(),
        Some(format!("https://therapy.app.100ms.live/meeting/{}", result.room_code).as_str())
    );
}

#[tokio::test]
async fn test_provision_result_serialization_omits_absent_fields() {
    let result = ProvisionResult {
        room_code: "r1".to_string(),
        meeting_url: None,
        room_id: Some("r1".to_string()),
        generated: true,
        provider: RoomProviderKind::External,
    };

    let value = serde_json::to_value(&result).unwrap();
    assert!(value.get("meeting_url").is_none());
    assert_eq!(value["provider"], "external");
}
