//! State Hashing for Verification
//!
//! Provides deterministic hashing of race state for:
//! - Replay validation (same inputs must give the same hash)
//! - Comparing snapshots between runs

use sha2::{Sha256, Digest};
use super::vec2::GridVec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for race state.
///
/// Wraps SHA-256 with helpers for grid types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for race state.
    pub fn for_race_state() -> Self {
        Self::new(b"VECTOR_RACER_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u16 value (little-endian).
    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a GridVec2.
    #[inline]
    pub fn update_vec2(&mut self, value: GridVec2) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for race verification.
///
/// This function is called by `RaceState::compute_hash()`.
/// The closure adds state-specific data after the round counter.
pub fn compute_state_hash<F>(round: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_race_state();

    // Always hash the round first
    hasher.update_u32(round);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_race_state();
            hasher.update_u32(100);
            hasher.update_u16(0x0200);
            hasher.update_vec2(GridVec2::new(1, 23));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];

        let hash = |domain: &[u8]| {
            let mut h = StateHasher::new(domain);
            h.update_bytes(&data);
            h.finalize()
        };

        let hash1 = hash(b"DOMAIN_A");
        let hash2 = hash(b"DOMAIN_B");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(3, |hasher| {
            hasher.update_vec2(GridVec2::new(5, 5));
        });
        let hash2 = compute_state_hash(3, |hasher| {
            hasher.update_vec2(GridVec2::new(5, 5));
        });
        assert_eq!(hash, hash2);

        // Different round = different hash
        let hash3 = compute_state_hash(4, |hasher| {
            hasher.update_vec2(GridVec2::new(5, 5));
        });
        assert_ne!(hash, hash3);
    }
}
