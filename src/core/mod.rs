//! Core deterministic primitives.
//!
//! Integer grid vectors and state hashing. No floating point anywhere, so a
//! race replays to the same hash on every platform.

pub mod vec2;
pub mod hash;

// Re-export core types
pub use vec2::GridVec2;
pub use hash::{compute_state_hash, StateHash, StateHasher};
