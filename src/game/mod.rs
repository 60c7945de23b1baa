//! Game Logic Module
//!
//! All race simulation code. Deterministic and single-threaded.
//!
//! ## Module Structure
//!
//! - `cell`: Per-cell occupancy bitset
//! - `map`: Grid map and zone stamping
//! - `path`: Path rasterizer
//! - `movement`: Movement validator
//! - `assist`: Collision pre-check (stopping distance)
//! - `state`: Race state, player state
//! - `input`: Accelerations, keymaps, drivers
//! - `turn`: Turn controller state machine
//! - `planner`: Breadth-first autopilot
//! - `snapshot`: Read-only views for renderers
//! - `events`: Race events for replay/verification

pub mod cell;
pub mod map;
pub mod path;
pub mod movement;
pub mod assist;
pub mod state;
pub mod input;
pub mod turn;
pub mod planner;
pub mod snapshot;
pub mod events;

// Re-export key types
pub use cell::CellState;
pub use map::{GridMap, ZoneRect};
pub use movement::{path_checking, MoveOutcome};
pub use assist::{is_fatal, MoveOption};
pub use state::{PlayerId, PlayerState, PlayerStatus, RaceOutcome, RacePhase, RaceState};
pub use input::{Acceleration, Driver, Keymap, PlayerInput};
pub use turn::{play_turn, run_race, replay_race, RaceRules, TurnResult};
pub use events::RaceEvent;
