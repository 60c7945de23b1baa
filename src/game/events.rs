//! Race Events
//!
//! Events generated while turns are played, for logs, replay and verification.

use serde::{Serialize, Deserialize};
use crate::core::vec2::GridVec2;
use crate::game::state::{PlayerId, RaceOutcome};

/// Priority for event ordering within a round.
///
/// Lower value = reported first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Finishers first
    Finish = 0,
    /// Then players leaving the race
    Elimination = 1,
    /// Then ordinary moves
    Movement = 2,
    /// Lowest priority
    Other = 255,
}

/// Race event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEventData {
    /// Player moved to a free cell
    Moved {
        /// Cell before the move
        from: GridVec2,
        /// Cell after the move
        to: GridVec2,
        /// Velocity applied
        velocity: GridVec2,
    },

    /// Player's move hit a wall, a trail or the grid edge
    Crashed {
        /// Cell the move started from
        from: GridVec2,
        /// Velocity that crashed
        velocity: GridVec2,
    },

    /// Player's move reached the finish
    Won {
        /// Cell the move started from
        from: GridVec2,
        /// Winning velocity
        velocity: GridVec2,
    },

    /// Every acceleration was fatal; player retired before moving
    Retired {
        /// Where the player was stuck
        at: GridVec2,
    },

    /// Player with a terminal status had its turn skipped
    Skipped,

    /// Every player has acted this round
    RoundCompleted,

    /// Race reached a termination condition
    RaceEnded {
        /// How the race ended
        outcome: RaceOutcome,
    },

    /// Race stopped by a player quitting
    Aborted,
}

impl RaceEventData {
    /// Ordering priority for this kind of event.
    pub fn priority(&self) -> EventPriority {
        match self {
            RaceEventData::Won { .. } => EventPriority::Finish,
            RaceEventData::Crashed { .. } | RaceEventData::Retired { .. } => {
                EventPriority::Elimination
            }
            RaceEventData::Moved { .. } | RaceEventData::Skipped => EventPriority::Movement,
            _ => EventPriority::Other,
        }
    }
}

/// A race event with its round and player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceEvent {
    /// Round when event occurred
    pub round: u32,

    /// Ordering priority
    pub priority: EventPriority,

    /// Player involved, if any
    pub player_id: Option<PlayerId>,

    /// Event data
    pub data: RaceEventData,
}

impl RaceEvent {
    /// Create a new event.
    pub fn new(round: u32, player_id: Option<PlayerId>, data: RaceEventData) -> Self {
        Self {
            round,
            priority: data.priority(),
            player_id,
            data,
        }
    }

    /// Create moved event.
    pub fn moved(round: u32, player_id: PlayerId, from: GridVec2, velocity: GridVec2) -> Self {
        Self::new(
            round,
            Some(player_id),
            RaceEventData::Moved { from, to: from + velocity, velocity },
        )
    }

    /// Create crashed event.
    pub fn crashed(round: u32, player_id: PlayerId, from: GridVec2, velocity: GridVec2) -> Self {
        Self::new(round, Some(player_id), RaceEventData::Crashed { from, velocity })
    }

    /// Create won event.
    pub fn won(round: u32, player_id: PlayerId, from: GridVec2, velocity: GridVec2) -> Self {
        Self::new(round, Some(player_id), RaceEventData::Won { from, velocity })
    }

    /// Create retired event.
    pub fn retired(round: u32, player_id: PlayerId, at: GridVec2) -> Self {
        Self::new(round, Some(player_id), RaceEventData::Retired { at })
    }

    /// Create skipped event.
    pub fn skipped(round: u32, player_id: PlayerId) -> Self {
        Self::new(round, Some(player_id), RaceEventData::Skipped)
    }

    /// Create round completed event.
    pub fn round_completed(round: u32) -> Self {
        Self::new(round, None, RaceEventData::RoundCompleted)
    }

    /// Create race ended event.
    pub fn race_ended(round: u32, outcome: RaceOutcome) -> Self {
        Self::new(round, None, RaceEventData::RaceEnded { outcome })
    }

    /// Create aborted event.
    pub fn aborted(round: u32, player_id: PlayerId) -> Self {
        Self::new(round, Some(player_id), RaceEventData::Aborted)
    }

    /// Is this a player leaving the race?
    pub fn is_elimination(&self) -> bool {
        self.priority == EventPriority::Elimination
    }
}

impl PartialEq for RaceEvent {
    fn eq(&self, other: &Self) -> bool {
        self.round == other.round
            && self.priority == other.priority
            && self.player_id == other.player_id
    }
}

impl Eq for RaceEvent {}

impl PartialOrd for RaceEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RaceEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: round, then priority, then player_id
        self.round
            .cmp(&other.round)
            .then(self.priority.cmp(&other.priority))
            .then(self.player_id.cmp(&other.player_id))
    }
}
