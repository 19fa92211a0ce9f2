// libs/room-provisioning-cell/src/services/mod.rs

pub mod fallback;
pub mod hms;
pub mod meeting_url;
pub mod provisioner;
pub mod retry;
pub mod room_code;

pub use fallback::FallbackRoomGenerator;
pub use hms::{HmsRoomClient, RoomProviderApi};
pub use meeting_url::MeetingUrlBuilder;
pub use provisioner::RoomProvisioner;
pub use retry::RetryPolicy;
pub use room_code::RoomCodeResolver;
