//! Collision Assist
//!
//! Advisory pre-check run before a player commits an acceleration. Besides
//! the literal resulting velocity it checks the stopping distance of that
//! velocity: decelerating one unit per turn from speed `v` covers the
//! triangular number `v(v+1)/2` cells.
//!
//! Only [`path_checking`] at commit time decides what actually happens.

use serde::{Serialize, Deserialize};

use crate::core::vec2::GridVec2;
use crate::game::input::Acceleration;
use crate::game::map::GridMap;
use crate::game::movement::{path_checking, MoveOutcome};
use crate::game::state::PlayerState;

/// Distance covered braking from `speed` to zero, sign preserved.
#[inline]
pub fn stopping_distance(speed: i32) -> i32 {
    let s = speed.abs();
    speed.signum() * (s * s + s) / 2
}

/// Per-axis stopping distance of a velocity.
#[inline]
pub fn stopping_vector(velocity: GridVec2) -> GridVec2 {
    GridVec2::new(stopping_distance(velocity.x), stopping_distance(velocity.y))
}

/// Would committing `accel` doom the player?
///
/// A Win on the literal velocity is never fatal. Otherwise a stopping
/// position off the negative edge of the grid is not flagged (low speed near
/// the origin), and the move is fatal when either the literal path or the
/// stopping-distance path crashes.
pub fn is_fatal(map: &GridMap, player: &PlayerState, accel: Acceleration) -> bool {
    let velocity = player.velocity + accel.vector();

    let literal = path_checking(map, player, velocity);
    if literal == MoveOutcome::Win {
        return false;
    }

    let braking = stopping_vector(velocity);
    if (player.position + braking).any_negative() {
        return false;
    }

    literal == MoveOutcome::Crash || path_checking(map, player, braking) == MoveOutcome::Crash
}

/// One keymap choice and its assist verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOption {
    /// Candidate acceleration
    pub acceleration: Acceleration,
    /// Flagged by the collision assist
    pub fatal: bool,
}

/// Assess every acceleration the player's keymap offers.
pub fn assess_options(map: &GridMap, player: &PlayerState) -> Vec<MoveOption> {
    player
        .keymap
        .accelerations()
        .into_iter()
        .map(|acceleration| MoveOption {
            acceleration,
            fatal: is_fatal(map, player, acceleration),
        })
        .collect()
}

/// True when every option is flagged: the player cannot avoid crashing.
pub fn is_cornered(options: &[MoveOption]) -> bool {
    options.iter().all(|o| o.fatal)
}
