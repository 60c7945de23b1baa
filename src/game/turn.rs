//! Turn Controller
//!
//! Round-robin state machine over the players, ascending by number.
//! The only writer of trail marks on the map.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::game::assist::{assess_options, is_cornered, MoveOption};
use crate::game::events::RaceEvent;
use crate::game::input::{Acceleration, Driver, PlayerInput, ScriptedDriver, TurnPrompt};
use crate::game::movement::{path_checking, MoveOutcome};
use crate::game::path::walk_cells;
use crate::game::state::{PlayerId, PlayerStatus, RaceOutcome, RacePhase, RaceState};

/// One driver per player, looked up by number.
pub type DriverMap<'a> = BTreeMap<PlayerId, Box<dyn Driver + 'a>>;

/// Rules for running a race.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRules {
    /// End the race after this many rounds (no limit when `None`)
    pub round_limit: Option<u32>,
}

/// Result of a single turn.
#[derive(Debug, Default)]
pub struct TurnResult {
    /// Player whose turn it was
    pub player: Option<PlayerId>,
    /// Acceleration the player committed
    pub input: Option<Acceleration>,
    /// Verdict of the committed move
    pub outcome: Option<MoveOutcome>,
    /// Events generated this turn
    pub events: Vec<RaceEvent>,
    /// This turn closed the round
    pub round_completed: bool,
    /// The race is no longer running
    pub race_over: bool,
}

/// Everything needed to re-run a race.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RaceRecord {
    /// Accelerations committed by each player, in order
    pub inputs: BTreeMap<PlayerId, Vec<Acceleration>>,
    /// Every event generated
    pub events: Vec<RaceEvent>,
    /// Number of turns played
    pub turns: u32,
}

/// Play the turn of the player under the cursor.
///
/// # Arguments
///
/// * `state` - The race state (will be mutated)
/// * `drivers` - Input source per player; a player without one coasts
/// * `rules` - Race rules
///
/// Termination is only evaluated once every player has acted in the round.
pub fn play_turn(
    state: &mut RaceState,
    drivers: &mut DriverMap<'_>,
    rules: &RaceRules,
) -> TurnResult {
    let mut result = TurnResult::default();

    if state.is_over() {
        result.race_over = true;
        return result;
    }

    let Some(id) = state.current_player() else {
        end_race(state, RaceOutcome::AllOut);
        result.race_over = true;
        result.events = state.take_events();
        return result;
    };
    result.player = Some(id);

    // A turn-old trail never blocks its owner
    state.map.clear_trail(id);

    let status = state.status_of(&id).unwrap_or(PlayerStatus::IsOut);
    let options = state
        .get_player(&id)
        .filter(|_| !status.is_terminal())
        .map(|player| assess_options(&state.map, player));

    match options {
        None => state.push_event(RaceEvent::skipped(state.round, id)),
        Some(options) if is_cornered(&options) => retire_cornered(state, id),
        Some(options) => match request_acceleration(state, id, &options, drivers) {
            Some(accel) => {
                result.input = Some(accel);
                result.outcome = Some(apply_move(state, id, accel));
            }
            None => {
                info!("Player {} quit, race aborted in round {}", id, state.round);
                state.phase = RacePhase::Aborted;
                state.push_event(RaceEvent::aborted(state.round, id));
                result.race_over = true;
                result.events = state.take_events();
                return result;
            }
        },
    }

    if let Some(player) = state.get_player_mut(&id) {
        player.has_acted = true;
    }

    result.round_completed = advance_cursor(state, rules);
    result.race_over = state.is_over();
    result.events = state.take_events();
    result
}

/// Ask the player's driver until it answers with an acceleration on its
/// keymap. `None` means the driver quit.
fn request_acceleration(
    state: &RaceState,
    id: PlayerId,
    options: &[MoveOption],
    drivers: &mut DriverMap<'_>,
) -> Option<Acceleration> {
    let Some(driver) = drivers.get_mut(&id) else {
        warn!("No driver for player {}, coasting", id);
        return Some(Acceleration::NONE);
    };

    let prompt = TurnPrompt { state, player: id, options };
    loop {
        match driver.next_input(&prompt) {
            PlayerInput::Accelerate(accel) if options.iter().any(|o| o.acceleration == accel) => {
                if prompt.is_flagged(accel) {
                    debug!("Player {} committed {} despite the collision assist", id, accel);
                }
                return Some(accel);
            }
            PlayerInput::Accelerate(accel) => {
                debug!("Player {} has no key for {}, asking again", id, accel);
            }
            PlayerInput::Unrecognized(raw) => {
                debug!("Unrecognized input {:?} from player {}", raw, id);
            }
            PlayerInput::Quit => return None,
        }
    }
}

/// Commit an acceleration and apply the validator's verdict.
fn apply_move(state: &mut RaceState, id: PlayerId, accel: Acceleration) -> MoveOutcome {
    let round = state.round;
    let anchor = state.map.finish_anchor();
    let Some(player) = state.players.get_mut(&id) else {
        return MoveOutcome::Crash;
    };

    let from = player.position;
    let velocity = player.velocity + accel.vector();
    let outcome = path_checking(&state.map, player, velocity);
    player.set_velocity(velocity);

    let event = match outcome {
        MoveOutcome::Clear => {
            state.map.mark_trail(id, &walk_cells(from, velocity));
            player.advance();
            debug!("Player {} moved {} -> {}", id, from, player.position);
            RaceEvent::moved(round, id, from, velocity)
        }
        MoveOutcome::Win => {
            player.position = anchor.unwrap_or(from + velocity);
            info!("Player {} reached the finish in round {}", id, round);
            RaceEvent::won(round, id, from, velocity)
        }
        MoveOutcome::Crash => {
            player.retire();
            info!("Player {} crashed leaving {} at speed {}", id, from, velocity);
            RaceEvent::crashed(round, id, from, velocity)
        }
    };

    state.push_event(event);
    outcome
}

/// Every option is fatal: the player is out before moving.
fn retire_cornered(state: &mut RaceState, id: PlayerId) {
    let round = state.round;
    let Some(player) = state.get_player_mut(&id) else {
        return;
    };
    let at = player.position;
    player.retire();
    info!("Player {} has no safe move at {}, retired", id, at);
    state.push_event(RaceEvent::retired(round, id, at));
}

/// Move the cursor on. Returns true when the round closed.
fn advance_cursor(state: &mut RaceState, rules: &RaceRules) -> bool {
    state.cursor += 1;
    if state.cursor < state.players.len() {
        return false;
    }

    state.cursor = 0;
    end_round(state, rules);
    true
}

/// Evaluate termination once everyone has acted.
fn end_round(state: &mut RaceState, rules: &RaceRules) {
    let round = state.round;
    state.push_event(RaceEvent::round_completed(round));

    let winners = state.players_with(PlayerStatus::HasWon);
    let out = state.players_with(PlayerStatus::IsOut).len();

    if out == state.players.len() {
        end_race(state, RaceOutcome::AllOut);
    } else if !winners.is_empty() {
        end_race(state, RaceOutcome::Winners(winners));
    } else if rules.round_limit.is_some_and(|limit| round >= limit) {
        end_race(state, RaceOutcome::RoundLimit);
    } else {
        state.round += 1;
        for player in state.players.values_mut() {
            player.has_acted = false;
        }
        debug!("Round {} begins", state.round);
    }
}

/// End the race.
fn end_race(state: &mut RaceState, outcome: RaceOutcome) {
    info!("Race over after round {}: {:?}", state.round, outcome);
    state.phase = RacePhase::Ended(outcome.clone());
    state.push_event(RaceEvent::race_ended(state.round, outcome));
}

/// Play turns until the current round closes or the race stops.
pub fn play_round(
    state: &mut RaceState,
    drivers: &mut DriverMap<'_>,
    rules: &RaceRules,
) -> Vec<RaceEvent> {
    let mut events = Vec::new();
    loop {
        let result = play_turn(state, drivers, rules);
        events.extend(result.events);
        if result.round_completed || result.race_over {
            return events;
        }
    }
}

/// Play turns until the race stops, recording committed inputs.
pub fn run_race(
    state: &mut RaceState,
    drivers: &mut DriverMap<'_>,
    rules: &RaceRules,
) -> RaceRecord {
    let mut record = RaceRecord::default();

    while !state.is_over() {
        let result = play_turn(state, drivers, rules);
        if let (Some(id), Some(accel)) = (result.player, result.input) {
            record.inputs.entry(id).or_default().push(accel);
        }
        record.events.extend(result.events);
        record.turns += 1;
    }

    record
}

/// Replay a race from recorded inputs.
///
/// Every player is driven by its recording; a player that runs out of
/// recorded inputs quits, as it must have in the recorded race.
pub fn replay_race(
    initial_state: RaceState,
    player_inputs: &BTreeMap<PlayerId, Vec<Acceleration>>,
    rules: &RaceRules,
) -> (RaceState, Vec<RaceEvent>) {
    let mut state = initial_state;

    let mut drivers: DriverMap<'_> = state
        .turn_order()
        .into_iter()
        .map(|id| {
            let script = player_inputs.get(&id).cloned().unwrap_or_default();
            let driver: Box<dyn Driver> = Box::new(ScriptedDriver::from_accelerations(script));
            (id, driver)
        })
        .collect();

    let record = run_race(&mut state, &mut drivers, rules);
    (state, record.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::GridVec2;
    use crate::game::cell::CellState;
    use crate::game::events::RaceEventData;
    use crate::game::input::Keymap;
    use crate::game::map::{GridMap, ZoneRect};
    use crate::game::state::PlayerState;

    fn pid(n: u8) -> PlayerId {
        PlayerId::new(n).unwrap()
    }

    fn v(x: i32, y: i32) -> GridVec2 {
        GridVec2::new(x, y)
    }

    /// Race with players `(number, position, velocity)`.
    fn race(map: GridMap, players: &[(u8, GridVec2, GridVec2)]) -> RaceState {
        let mut state = RaceState::new(map);
        for (n, position, velocity) in players {
            let mut player = PlayerState::new(pid(*n), format!("p{n}"), *position);
            player.velocity = *velocity;
            state.add_player(player);
        }
        state
    }

    fn scripted(scripts: Vec<(u8, Vec<Acceleration>)>) -> DriverMap<'static> {
        scripts
            .into_iter()
            .map(|(n, accels)| {
                let driver: Box<dyn Driver> = Box::new(ScriptedDriver::from_accelerations(accels));
                (pid(n), driver)
            })
            .collect()
    }

    fn boxed_in_map() -> GridMap {
        let mut map = GridMap::new(5, 5);
        for (w, h, x, y) in [(5, 2, 0, 0), (5, 2, 0, 3), (2, 1, 0, 2), (2, 1, 3, 2)] {
            map.stamp_kill_zone(ZoneRect::new(w, h, x, y));
        }
        map
    }

    #[test]
    fn test_round_robin_fairness() {
        let mut state = race(
            GridMap::new(20, 20),
            &[(3, v(8, 8), v(0, 0)), (1, v(2, 2), v(0, 0)), (2, v(5, 5), v(0, 0))],
        );
        let coast = vec![Acceleration::NONE; 4];
        let mut drivers = scripted(vec![(1, coast.clone()), (2, coast.clone()), (3, coast)]);
        let rules = RaceRules::default();

        let order: Vec<_> = (0..3)
            .map(|_| play_turn(&mut state, &mut drivers, &rules))
            .map(|r| (r.player, r.round_completed))
            .collect();
        assert_eq!(
            order,
            vec![(Some(pid(1)), false), (Some(pid(2)), false), (Some(pid(3)), true)]
        );

        // Back to the first player, next round, flags reset
        assert_eq!(state.cursor, 0);
        assert_eq!(state.current_player(), Some(pid(1)));
        assert_eq!(state.round, 2);
        assert!(state.players.values().all(|p| !p.has_acted));
    }

    #[test]
    fn test_clear_move_marks_trail_and_advances() {
        let mut state = race(GridMap::canonical(), &[(1, v(1, 3), v(0, 0))]);
        let mut drivers = scripted(vec![(1, vec![Acceleration::SOUTH_EAST])]);

        let result = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(result.outcome, Some(MoveOutcome::Clear));
        assert_eq!(result.input, Some(Acceleration::SOUTH_EAST));

        let player = state.get_player(&pid(1)).unwrap();
        assert_eq!(player.position, v(2, 4));
        assert_eq!(player.velocity, v(1, 1));
        assert!(state.map.get(v(1, 3)).unwrap().owned_by(pid(1)));
        assert!(state.map.get(v(2, 4)).unwrap().owned_by(pid(1)));
    }

    #[test]
    fn test_cornered_players_retire_and_race_ends() {
        let mut state = race(boxed_in_map(), &[(1, v(2, 2), v(2, 0))]);
        // Never asked: an empty script would quit the race
        let mut drivers = scripted(vec![(1, vec![])]);

        let record = run_race(&mut state, &mut drivers, &RaceRules::default());

        assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::AllOut));
        assert_eq!(state.round, 1);
        assert!(record.inputs.is_empty());
        assert!(record
            .events
            .iter()
            .any(|e| e.data == RaceEventData::Retired { at: v(2, 2) }));
    }

    #[test]
    fn test_crash_retires_player() {
        let mut state = race(GridMap::canonical(), &[(1, v(26, 3), v(1, 0))]);
        let mut drivers = scripted(vec![(1, vec![Acceleration::EAST])]);

        let result = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(result.outcome, Some(MoveOutcome::Crash));
        assert!(result.race_over);
        assert_eq!(state.status_of(&pid(1)), Some(PlayerStatus::IsOut));
        assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::AllOut));
    }

    #[test]
    fn test_win_on_hand_placed_finish_counts() {
        let mut map = GridMap::new(10, 10);
        map.insert(v(4, 3), CellState::FINISH);
        let mut state = race(map, &[(1, v(3, 3), v(0, 0))]);
        let mut drivers = scripted(vec![(1, vec![Acceleration::EAST])]);

        let result = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(result.outcome, Some(MoveOutcome::Win));
        assert!(result.race_over);
        assert_eq!(state.status_of(&pid(1)), Some(PlayerStatus::HasWon));
        assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::Winners(vec![pid(1)])));
    }

    #[test]
    fn test_simultaneous_winners() {
        let mut state = race(
            GridMap::canonical(),
            &[(1, v(1, 20), v(0, 1)), (2, v(2, 20), v(0, 1))],
        );
        let mut drivers = scripted(vec![
            (1, vec![Acceleration::SOUTH]),
            (2, vec![Acceleration::SOUTH]),
        ]);

        let first = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(first.outcome, Some(MoveOutcome::Win));
        // Termination waits for the end of the round
        assert!(!first.race_over);

        let second = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(second.outcome, Some(MoveOutcome::Win));
        assert!(second.race_over);
        assert_eq!(
            state.phase,
            RacePhase::Ended(RaceOutcome::Winners(vec![pid(1), pid(2)]))
        );
        assert_eq!(state.get_player(&pid(1)).unwrap().position, v(1, 23));
    }

    #[test]
    fn test_winner_and_crash_in_same_round() {
        let mut state = race(
            GridMap::canonical(),
            &[(1, v(1, 20), v(0, 1)), (2, v(26, 3), v(1, 0))],
        );
        let mut drivers = scripted(vec![
            (1, vec![Acceleration::SOUTH]),
            (2, vec![Acceleration::EAST]),
        ]);

        let record = run_race(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::Winners(vec![pid(1)])));
        assert_eq!(record.turns, 2);
    }

    #[test]
    fn test_quit_aborts_race() {
        let mut state = race(GridMap::canonical(), &[(1, v(1, 3), v(0, 0))]);
        let mut drivers = scripted(vec![(1, vec![])]);

        let result = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert!(result.race_over);
        assert_eq!(result.input, None);
        assert_eq!(state.phase, RacePhase::Aborted);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].data, RaceEventData::Aborted);
    }

    #[test]
    fn test_invalid_inputs_are_reprompted() {
        let mut state = race(GridMap::canonical(), &[(1, v(1, 3), v(0, 0))]);
        state.get_player_mut(&pid(1)).unwrap().keymap =
            Keymap::new([('s', Acceleration::SOUTH), ('5', Acceleration::NONE)]);

        let driver = ScriptedDriver::new([
            PlayerInput::Unrecognized("x".to_string()),
            // Not on this player's keymap
            PlayerInput::Accelerate(Acceleration::EAST),
            PlayerInput::Accelerate(Acceleration::SOUTH),
        ]);
        let mut drivers: DriverMap<'_> = BTreeMap::new();
        drivers.insert(pid(1), Box::new(driver));

        let result = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(result.input, Some(Acceleration::SOUTH));
        assert_eq!(state.get_player(&pid(1)).unwrap().position, v(1, 4));
    }

    #[test]
    fn test_missing_driver_coasts() {
        let mut state = race(GridMap::new(10, 10), &[(1, v(2, 2), v(1, 0))]);
        let mut drivers: DriverMap<'_> = BTreeMap::new();

        let result = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(result.input, Some(Acceleration::NONE));
        assert_eq!(state.get_player(&pid(1)).unwrap().position, v(3, 2));
    }

    #[test]
    fn test_trails_block_others_and_clear_for_owner() {
        let mut state = race(
            GridMap::new(10, 10),
            &[(1, v(0, 2), v(0, 0)), (2, v(1, 0), v(0, 0))],
        );
        let mut drivers = scripted(vec![
            (1, vec![Acceleration::EAST, Acceleration::NONE]),
            (2, vec![Acceleration::SOUTH, Acceleration::SOUTH]),
        ]);
        let rules = RaceRules::default();

        play_round(&mut state, &mut drivers, &rules);
        assert!(state.map.get(v(0, 2)).unwrap().owned_by(pid(1)));
        assert!(state.map.get(v(1, 2)).unwrap().owned_by(pid(1)));
        assert!(state.map.get(v(1, 1)).unwrap().owned_by(pid(2)));

        // P1 moves (1,2) -> (2,2); P2 then runs through (1,2)
        let events = play_round(&mut state, &mut drivers, &rules);
        assert!(state.map.get(v(0, 2)).unwrap().is_empty());
        assert_eq!(state.status_of(&pid(1)), Some(PlayerStatus::CanPlay));
        assert_eq!(state.status_of(&pid(2)), Some(PlayerStatus::IsOut));
        assert!(events.iter().any(|e| e.player_id == Some(pid(2)) && e.is_elimination()));
        assert_eq!(state.phase, RacePhase::Running);
    }

    #[test]
    fn test_retired_player_is_skipped() {
        let mut state = race(
            GridMap::new(10, 10),
            &[(1, v(2, 2), v(0, 0)), (2, v(5, 5), v(0, 0))],
        );
        state.get_player_mut(&pid(1)).unwrap().retire();
        let mut drivers = scripted(vec![(2, vec![Acceleration::NONE])]);

        let first = play_turn(&mut state, &mut drivers, &RaceRules::default());
        assert_eq!(first.player, Some(pid(1)));
        assert_eq!(first.input, None);
        assert_eq!(first.events[0].data, RaceEventData::Skipped);
        assert!(state.get_player(&pid(1)).unwrap().has_acted);
    }

    #[test]
    fn test_round_limit_ends_race() {
        let mut state = race(GridMap::new(10, 10), &[(1, v(5, 5), v(0, 0))]);
        let mut drivers = scripted(vec![(1, vec![Acceleration::NONE; 10])]);
        let rules = RaceRules { round_limit: Some(3) };

        let record = run_race(&mut state, &mut drivers, &rules);
        assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::RoundLimit));
        assert_eq!(state.round, 3);
        assert_eq!(record.turns, 3);
        assert_eq!(record.inputs[&pid(1)].len(), 3);
    }

    #[test]
    fn test_replay_determinism() {
        let initial = race(
            GridMap::new(10, 10),
            &[(1, v(0, 2), v(0, 0)), (2, v(1, 0), v(0, 0))],
        );
        let mut state = initial.clone();
        let mut drivers = scripted(vec![
            (1, vec![Acceleration::EAST, Acceleration::NONE, Acceleration::NONE]),
            (2, vec![Acceleration::SOUTH, Acceleration::SOUTH]),
        ]);
        let rules = RaceRules::default();

        let record = run_race(&mut state, &mut drivers, &rules);
        let (replayed, events) = replay_race(initial, &record.inputs, &rules);

        assert_eq!(replayed.compute_hash(), state.compute_hash());
        assert_eq!(replayed.phase, state.phase);
        assert_eq!(events.len(), record.events.len());
    }
}
