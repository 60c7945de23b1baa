//! Autopilot
//!
//! Breadth-first search over `(position, velocity)` on the current map,
//! following only moves the collision assist does not flag. Replans every
//! turn, so other players' fresh trails are taken into account.

use std::collections::{BTreeSet, VecDeque};

use crate::core::vec2::GridVec2;
use crate::game::assist::is_fatal;
use crate::game::input::{Acceleration, Driver, PlayerInput, TurnPrompt};
use crate::game::map::GridMap;
use crate::game::movement::{check_path, MoveOutcome};
use crate::game::state::PlayerState;

/// Search gives up after visiting this many states.
pub const MAX_SEARCH_STATES: usize = 250_000;

/// First acceleration of a shortest safe route to the finish.
///
/// `None` when no route exists within the search budget.
pub fn plan_route(map: &GridMap, player: &PlayerState) -> Option<Acceleration> {
    let accelerations = player.keymap.accelerations();
    let mut probe = player.clone();

    let mut visited: BTreeSet<(GridVec2, GridVec2)> = BTreeSet::new();
    let mut queue: VecDeque<(GridVec2, GridVec2, Option<Acceleration>)> = VecDeque::new();
    visited.insert((player.position, player.velocity));
    queue.push_back((player.position, player.velocity, None));

    while let Some((position, velocity, first)) = queue.pop_front() {
        probe.position = position;
        probe.velocity = velocity;

        for &accel in &accelerations {
            let next = velocity + accel.vector();
            let first = first.or(Some(accel));
            match check_path(map, player.id, position, next) {
                MoveOutcome::Win => return first,
                MoveOutcome::Crash => continue,
                MoveOutcome::Clear => {}
            }
            if is_fatal(map, &probe, accel) {
                continue;
            }
            if visited.len() >= MAX_SEARCH_STATES {
                return None;
            }
            if visited.insert((position + next, next)) {
                queue.push_back((position + next, next, first));
            }
        }
    }

    None
}

/// Computer driver following [`plan_route`].
///
/// Without a route it takes the first option the assist allows whose literal
/// move does not crash, and coasts when there is none.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlannerDriver;

impl Driver for PlannerDriver {
    fn next_input(&mut self, prompt: &TurnPrompt<'_>) -> PlayerInput {
        let Some(player) = prompt.player_state() else {
            return PlayerInput::Accelerate(Acceleration::NONE);
        };
        let map = &prompt.state.map;

        let accel = plan_route(map, player)
            .or_else(|| {
                prompt
                    .safe_options()
                    .map(|o| o.acceleration)
                    .find(|a| {
                        let velocity = player.velocity + a.vector();
                        check_path(map, player.id, player.position, velocity) != MoveOutcome::Crash
                    })
            })
            .unwrap_or(Acceleration::NONE);
        PlayerInput::Accelerate(accel)
    }
}
