//! End-to-end races on the canonical track.

use std::collections::BTreeMap;

use vector_racer::config::{PlayerSetup, RaceConfig};
use vector_racer::game::events::RaceEventData;
use vector_racer::game::input::{Acceleration, Driver, ScriptedDriver};
use vector_racer::game::planner::PlannerDriver;
use vector_racer::game::state::{PlayerStatus, RaceOutcome, RacePhase};
use vector_racer::game::turn::{replay_race, run_race, DriverMap, RaceRules};
use vector_racer::{GridMap, GridVec2, PlayerId, PlayerState, RaceState};

fn pid(n: u8) -> PlayerId {
    PlayerId::new(n).unwrap()
}

fn solo(start: GridVec2) -> RaceState {
    let mut state = RaceState::new(GridMap::canonical());
    state.add_player(PlayerState::new(pid(1), "Didier", start));
    state
}

fn script(accels: &[Acceleration]) -> DriverMap<'static> {
    let driver: Box<dyn Driver> = Box::new(ScriptedDriver::from_accelerations(accels.to_vec()));
    BTreeMap::from([(pid(1), driver)])
}

fn bots(count: usize) -> (RaceState, DriverMap<'static>) {
    let config = RaceConfig {
        players: (1..=count).map(|i| PlayerSetup::bot(format!("bot{i}"))).collect(),
        ..Default::default()
    };
    let state = config.build().unwrap();
    let drivers = state
        .turn_order()
        .into_iter()
        .map(|id| {
            let driver: Box<dyn Driver> = Box::new(PlannerDriver);
            (id, driver)
        })
        .collect();
    (state, drivers)
}

#[test]
fn accelerating_down_the_last_straight_wins() {
    let mut state = solo(GridVec2::new(1, 19));
    let mut drivers = script(&[Acceleration::SOUTH, Acceleration::SOUTH]);

    let record = run_race(&mut state, &mut drivers, &RaceRules::default());

    assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::Winners(vec![pid(1)])));
    assert_eq!(state.round, 2);
    assert_eq!(state.status_of(&pid(1)), Some(PlayerStatus::HasWon));
    assert!(record
        .events
        .iter()
        .any(|e| matches!(e.data, RaceEventData::Won { .. })));
}

#[test]
fn driving_into_the_corner_kill_zone_crashes() {
    let mut state = solo(GridVec2::new(25, 3));
    let mut drivers = script(&[Acceleration::EAST, Acceleration::EAST]);

    let record = run_race(&mut state, &mut drivers, &RaceRules::default());

    assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::AllOut));
    assert_eq!(state.status_of(&pid(1)), Some(PlayerStatus::IsOut));
    assert!(record.events.iter().any(|e| {
        e.data
            == RaceEventData::Crashed {
                from: GridVec2::new(26, 3),
                velocity: GridVec2::new(2, 0),
            }
    }));
}

#[test]
fn autopilot_finishes_from_the_first_start_slot() {
    let (mut state, mut drivers) = bots(1);
    assert_eq!(state.get_player(&pid(1)).unwrap().position, GridVec2::new(1, 3));

    let rules = RaceRules { round_limit: Some(100) };
    let record = run_race(&mut state, &mut drivers, &rules);

    assert_eq!(state.phase, RacePhase::Ended(RaceOutcome::Winners(vec![pid(1)])));
    assert!(state.round <= 30, "took {} rounds", state.round);
    assert!(!record.events.iter().any(|e| e.is_elimination()));
}

#[test]
fn two_autopilots_race_and_replay_identically() {
    let (mut state, mut drivers) = bots(2);
    let initial = state.clone();
    let rules = RaceRules { round_limit: Some(100) };

    let record = run_race(&mut state, &mut drivers, &rules);

    match &state.phase {
        RacePhase::Ended(RaceOutcome::Winners(winners)) => assert!(!winners.is_empty()),
        other => panic!("expected a winner, got {other:?}"),
    }

    let (replayed, events) = replay_race(initial, &record.inputs, &rules);
    assert_eq!(replayed.compute_hash(), state.compute_hash());
    assert_eq!(replayed.phase, state.phase);
    assert_eq!(events.len(), record.events.len());
}
