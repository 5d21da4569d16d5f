//! Deterministic numeric ID derivation for sources without a shared ID space.
//!
//! Edmtrain events carry provider-native numeric IDs and pass through
//! unchanged. Ticketmaster events carry opaque string IDs, so a numeric ID
//! is derived by hashing a source-prefixed form of the provider ID and
//! offsetting the result into a high range disjoint from Edmtrain's native
//! IDs. The derivation is a pure function of (source tag, provider ID):
//! re-fetching the same upstream event always yields the same canonical ID,
//! which is what makes upsert-by-id idempotent.

use sha2::{Digest, Sha256};

use super::EventSource;

/// Lower bound of the derived-ID range.
///
/// Every hash-derived event ID is `>= DERIVED_ID_FLOOR`; Edmtrain's native
/// IDs sit far below it, so the two ID spaces never overlap numerically.
pub const DERIVED_ID_FLOOR: i64 = 10_000_000_000;

/// Width of the derived-ID range above the floor.
const DERIVED_ID_SPAN: u64 = (i64::MAX - DERIVED_ID_FLOOR) as u64;

/// Derives the canonical event ID for a provider-native string ID.
///
/// Hashes `"{source}_{provider_id}"` with SHA-256, takes the first eight
/// digest bytes as a big-endian integer, reduces it modulo the derived-ID
/// span, and offsets it above [`DERIVED_ID_FLOOR`].
#[must_use]
pub fn derived_event_id(source: EventSource, provider_id: &str) -> i64 {
    let reduced = digest_prefix(&format!("{}_{}", source.as_str(), provider_id)) % DERIVED_ID_SPAN;
    DERIVED_ID_FLOOR + reduced as i64
}

/// Derives a plain numeric ID for nested objects (venues, artists) that
/// only have string identifiers upstream. No range offset: these IDs live
/// in their own tables-within-JSONB and never collide with event IDs.
#[must_use]
pub fn derived_numeric_id(input: &str) -> i64 {
    (digest_prefix(input) % (i64::MAX as u64)) as i64
}

/// First eight SHA-256 digest bytes as a big-endian u64.
fn digest_prefix(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(digest.get(..8).unwrap_or(&[0u8; 8]));
    u64::from_be_bytes(prefix)
}
