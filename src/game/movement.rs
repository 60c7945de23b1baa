//! Movement Validation
//!
//! Classifies a candidate velocity against the map. Read-only: applying a
//! Clear move to the map is the turn controller's job.

use serde::{Serialize, Deserialize};

use crate::core::vec2::GridVec2;
use crate::game::map::GridMap;
use crate::game::path::walk_cells;
use crate::game::state::{PlayerId, PlayerState, PlayerStatus};

/// Result of checking a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MoveOutcome {
    /// Every traversed cell is free
    Clear = 1,
    /// Wall, another trail, or off the grid
    Crash = 2,
    /// Finish reached along the path
    Win = 3,
}

/// Classify `velocity` for `player` from its current position.
///
/// A player that is already out always crashes.
pub fn path_checking(map: &GridMap, player: &PlayerState, velocity: GridVec2) -> MoveOutcome {
    if player.status(map.finish_anchor()) == PlayerStatus::IsOut {
        return MoveOutcome::Crash;
    }
    check_path(map, player.id, player.position, velocity)
}

/// Classify a move from an arbitrary start cell, ignoring `mover`'s own trail.
///
/// Cells are scanned in travel order; the first cell that is a finish wins,
/// the first other non-empty cell crashes.
pub fn check_path(
    map: &GridMap,
    mover: PlayerId,
    start: GridVec2,
    velocity: GridVec2,
) -> MoveOutcome {
    // Each axis checked on its own
    let dest = start + velocity;
    if dest.x < 0 || dest.x > map.width() - 1 || dest.y < 0 || dest.y > map.height() - 1 {
        return MoveOutcome::Crash;
    }

    for pos in walk_cells(start, velocity) {
        // Start cells of a retired player sit off-grid
        let Some(cell) = map.get(pos) else {
            return MoveOutcome::Crash;
        };
        let cell = cell.seen_by(mover);

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(player = mover.number(), x = pos.x, y = pos.y, bits = cell.bits(), "path cell");

        if cell.is_finish() {
            return MoveOutcome::Win;
        }
        if !cell.is_empty() {
            return MoveOutcome::Crash;
        }
    }

    MoveOutcome::Clear
}
