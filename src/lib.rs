//! # Vector Racer
//!
//! Turn-based vector racing on an integer grid: each turn a player nudges
//! its velocity by at most one unit per axis and the car travels the whole
//! vector, crashing into walls, other players' last moves or the grid edge.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       VECTOR RACER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - Integer 2D grid vector                    │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Race logic (deterministic)                │
//! │  ├── cell.rs     - Occupancy bitset per cell                 │
//! │  ├── map.rs      - Grid map, zone stamping, canonical track  │
//! │  ├── path.rs     - Path rasterizer                           │
//! │  ├── movement.rs - Movement validator                        │
//! │  ├── assist.rs   - Collision pre-check (stopping distance)   │
//! │  ├── state.rs    - Race and player state                     │
//! │  ├── input.rs    - Accelerations, keymaps, drivers           │
//! │  ├── turn.rs     - Turn controller and replay                │
//! │  ├── planner.rs  - Autopilot                                 │
//! │  ├── snapshot.rs - Render snapshots                          │
//! │  └── events.rs   - Race events                               │
//! │                                                              │
//! │  config.rs       - Race setup (map, roster, start table)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - Integer arithmetic only; path offsets truncate toward zero
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time, no randomness
//!
//! Given the same setup and the same accelerations, a race ends in the same
//! state hash on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod config;

// Re-export commonly used types
pub use core::vec2::GridVec2;
pub use config::{ConfigError, RaceConfig};
pub use game::input::{Acceleration, Keymap};
pub use game::map::GridMap;
pub use game::movement::MoveOutcome;
pub use game::state::{PlayerId, PlayerState, RaceState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
