// libs/room-provisioning-cell/src/services/fallback.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

/// Alphabet used by shareable room codes. Matches the external provider's
/// code charset so fallback and external codes are handled uniformly.
const CODE_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Process-monotonic sequence folded into every seed. Two generations in
/// the same nanosecond still produce distinct seeds.
static FALLBACK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Produces a locally generated room code when the external provider is
/// unavailable.
///
/// The seed is deliberately over-provisioned: booking id, wall-clock
/// nanoseconds, a UUID v4, a second independent random token, and a
/// monotonic sequence. Collisions are practically impossible without
/// requiring a global uniqueness guarantee. Never fails.
pub struct FallbackRoomGenerator;

impl FallbackRoomGenerator {
    pub fn generate(booking_id: &str) -> String {
        let wall_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let token_a = Uuid::new_v4();
        let token_b: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        let sequence = FALLBACK_SEQUENCE.fetch_add(1, Ordering::Relaxed);

        let seed = format!("{booking_id}:{wall_nanos}:{token_a}:{token_b}:{sequence}");
        let digest = Sha256::digest(seed.as_bytes());

        let symbols: String = digest
            .iter()
            .take(10)
            .map(|b| CODE_ALPHABET[*b as usize % CODE_ALPHABET.len()] as char)
            .collect();

        let code = format!("{}-{}-{}", &symbols[0..3], &symbols[3..7], &symbols[7..10]);
        debug!("Generated fallback room code for booking {}", booking_id);
        code
    }
}
