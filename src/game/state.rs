//! Race State Definitions
//!
//! Player/vehicle state and the shared race state.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::GridVec2;
use crate::game::events::RaceEvent;
use crate::game::input::Keymap;
use crate::game::map::GridMap;

/// Maximum number of players (one occupancy bit each).
pub const MAX_PLAYERS: u8 = 8;

/// Position of a player that is permanently out.
pub const OUT_POSITION: GridVec2 = GridVec2::new(-1, -1);

// =============================================================================
// PLAYER ID
// =============================================================================

/// Player number, 1..=8.
///
/// Implements Ord so players take turns in ascending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerId(u8);

impl PlayerId {
    /// Create from a player number. `None` outside 1..=8.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= MAX_PLAYERS {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Create from a zero-based slot index.
    pub const fn from_slot(slot: u8) -> Option<Self> {
        if slot < MAX_PLAYERS {
            Some(Self(slot + 1))
        } else {
            None
        }
    }

    /// Player number (1..=8).
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based slot index; also the occupancy bit position.
    #[inline]
    pub const fn slot(self) -> u8 {
        self.0 - 1
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("player number {value} outside 1..={MAX_PLAYERS}"))
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> u8 {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// =============================================================================
// PLAYER STATUS
// =============================================================================

/// Derived player state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Still racing
    CanPlay,
    /// Crashed, left the grid or ran out of safe moves (terminal)
    IsOut,
    /// Reached the finish (terminal)
    HasWon,
}

impl PlayerStatus {
    /// Terminal states never change again.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, PlayerStatus::CanPlay)
    }
}

// =============================================================================
// HEADING
// =============================================================================

/// Visual compass heading of a vehicle. Rendering only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Up the screen
    North,
    /// Up and right
    NorthEast,
    /// Right
    #[default]
    East,
    /// Down and right
    SouthEast,
    /// Down the screen
    South,
    /// Down and left
    SouthWest,
    /// Left
    West,
    /// Up and left
    NorthWest,
}

impl Heading {
    /// Heading of a velocity, `None` when stationary.
    pub fn from_velocity(velocity: GridVec2) -> Option<Self> {
        let heading = match (velocity.x.signum(), velocity.y.signum()) {
            (0, 0) => return None,
            (0, -1) => Heading::North,
            (1, -1) => Heading::NorthEast,
            (1, 0) => Heading::East,
            (1, 1) => Heading::SouthEast,
            (0, 1) => Heading::South,
            (-1, 1) => Heading::SouthWest,
            (-1, 0) => Heading::West,
            _ => Heading::NorthWest,
        };
        Some(heading)
    }

    /// Rotation in degrees, clockwise from north.
    pub fn degrees(self) -> u16 {
        match self {
            Heading::North => 0,
            Heading::NorthEast => 45,
            Heading::East => 90,
            Heading::SouthEast => 135,
            Heading::South => 180,
            Heading::SouthWest => 225,
            Heading::West => 270,
            Heading::NorthWest => 315,
        }
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State of a single vehicle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Player number
    pub id: PlayerId,

    /// Display name
    pub name: String,

    /// Current cell; `OUT_POSITION` once retired
    pub position: GridVec2,

    /// Cells moved per turn
    pub velocity: GridVec2,

    /// Last non-zero direction of travel
    pub heading: Heading,

    /// Has this player taken its turn in the current round?
    pub has_acted: bool,

    /// Symbol → acceleration bindings for this player
    pub keymap: Keymap,
}

impl PlayerState {
    /// Create a stationary player at its start cell.
    pub fn new(id: PlayerId, name: impl Into<String>, position: GridVec2) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            velocity: GridVec2::ZERO,
            heading: Heading::default(),
            has_acted: false,
            keymap: Keymap::default(),
        }
    }

    /// Derived state, given the map's win sentinel cell.
    ///
    /// Any negative coordinate means the player is out.
    pub fn status(&self, finish_anchor: Option<GridVec2>) -> PlayerStatus {
        if self.position == OUT_POSITION || self.position.any_negative() {
            PlayerStatus::IsOut
        } else if Some(self.position) == finish_anchor {
            PlayerStatus::HasWon
        } else {
            PlayerStatus::CanPlay
        }
    }

    /// Set a new velocity, turning the heading when moving.
    pub fn set_velocity(&mut self, velocity: GridVec2) {
        self.velocity = velocity;
        if let Some(heading) = Heading::from_velocity(velocity) {
            self.heading = heading;
        }
    }

    /// Advance position by the current velocity.
    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Retire permanently.
    pub fn retire(&mut self) {
        self.position = OUT_POSITION;
        self.velocity = GridVec2::ZERO;
    }
}

// =============================================================================
// RACE PHASE
// =============================================================================

/// How a finished race ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceOutcome {
    /// One or more players reached the finish in the same round
    Winners(Vec<PlayerId>),
    /// Every player is out
    AllOut,
    /// The configured round limit was reached
    RoundLimit,
}

/// Current phase of the race.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Turns are being played
    #[default]
    Running,
    /// Termination condition met
    Ended(RaceOutcome),
    /// Stopped from outside (player quit)
    Aborted,
}

// =============================================================================
// RACE STATE
// =============================================================================

/// Complete state of a race.
///
/// The map is the only shared mutable resource; the turn controller is its
/// only writer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceState {
    /// The track, including current trail marks
    pub map: GridMap,

    /// All players (BTreeMap for ascending turn order)
    pub players: BTreeMap<PlayerId, PlayerState>,

    /// Index into the turn order of the player to act next
    pub cursor: usize,

    /// Current round, starting at 1
    pub round: u32,

    /// Current race phase
    pub phase: RacePhase,

    /// Events not yet collected
    #[serde(skip)]
    pending_events: Vec<RaceEvent>,
}

impl RaceState {
    /// Create a race on a map with no players yet.
    pub fn new(map: GridMap) -> Self {
        Self {
            map,
            players: BTreeMap::new(),
            cursor: 0,
            round: 1,
            phase: RacePhase::Running,
            pending_events: Vec::new(),
        }
    }

    /// Add a player. Replaces any player with the same number.
    pub fn add_player(&mut self, player: PlayerState) {
        self.players.insert(player.id, player);
    }

    /// Get a player by number.
    pub fn get_player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Get a mutable player by number.
    pub fn get_player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    /// Player numbers in turn order.
    pub fn turn_order(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Player whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.players.keys().nth(self.cursor).copied()
    }

    /// Derived status of a player.
    pub fn status_of(&self, id: &PlayerId) -> Option<PlayerStatus> {
        let anchor = self.map.finish_anchor();
        self.players.get(id).map(|p| p.status(anchor))
    }

    /// Players still able to play.
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players_with(PlayerStatus::CanPlay)
    }

    /// Players with a given status, ascending.
    pub fn players_with(&self, status: PlayerStatus) -> Vec<PlayerId> {
        let anchor = self.map.finish_anchor();
        self.players
            .values()
            .filter(|p| p.status(anchor) == status)
            .map(|p| p.id)
            .collect()
    }

    /// Has the race stopped for any reason?
    pub fn is_over(&self) -> bool {
        !matches!(self.phase, RacePhase::Running)
    }

    /// Queue an event.
    pub fn push_event(&mut self, event: RaceEvent) {
        self.pending_events.push(event);
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Compute deterministic hash of the race state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.round, |hasher| {
            hasher.update_u32(self.cursor as u32);
            self.map.hash_into(hasher);
            for player in self.players.values() {
                hasher.update_u8(player.id.number());
                hasher.update_bytes(player.name.as_bytes());
                hasher.update_vec2(player.position);
                hasher.update_vec2(player.velocity);
                hasher.update_bool(player.has_acted);
            }
        })
    }
}
