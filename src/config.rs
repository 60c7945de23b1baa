//! Race Setup
//!
//! Map selection, player roster and start positions. All of this runs once
//! before the first turn; problems surface as [`ConfigError`] for the
//! operator and never reach an in-progress race.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::core::vec2::GridVec2;
use crate::game::map::{GridMap, CANONICAL_HEIGHT, CANONICAL_WIDTH};
use crate::game::state::{PlayerId, PlayerState, RaceState, MAX_PLAYERS};
use crate::game::turn::RaceRules;

/// Start slots shared by the built-in tables, indexed by player slot.
const DEFAULT_STARTS: [[i32; 2]; MAX_PLAYERS as usize] = [
    [1, 3], [3, 3], [5, 3], [7, 3],
    [1, 6], [3, 6], [5, 6], [7, 6],
];

/// Default open map size: the canonical dimensions.
pub const DEFAULT_OPEN_SIZE: (u16, u16) = (CANONICAL_WIDTH, CANONICAL_HEIGHT);

/// Largest open map, in cells.
pub const MAX_OPEN_CELLS: usize = 1 << 20;

/// Setup errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Roster size outside 1..=8
    #[error("player count must be between 1 and 8, got {0}")]
    InvalidPlayerCount(usize),

    /// Map name not known
    #[error("unknown map {0:?} (expected \"canonical\" or \"open\")")]
    UnknownMap(String),

    /// Open map with a zero dimension or too many cells
    #[error("invalid map size {width}x{height} (at most {MAX_OPEN_CELLS} cells)")]
    InvalidMapSize {
        /// Requested width
        width: u16,
        /// Requested height
        height: u16,
    },

    /// Start table has no entry for a slot
    #[error("no start position for slot {slot} on map {map:?}")]
    MissingStart {
        /// Map name
        map: String,
        /// Zero-based player slot
        slot: usize,
    },

    /// Start position off the grid
    #[error("start {pos} for {player} is outside the {width}x{height} grid")]
    StartOutOfBounds {
        /// Player
        player: PlayerId,
        /// Requested start
        pos: GridVec2,
        /// Grid width
        width: i32,
        /// Grid height
        height: i32,
    },

    /// Start position on a wall or finish cell
    #[error("start {pos} for {player} is on a wall or finish cell")]
    StartBlocked {
        /// Player
        player: PlayerId,
        /// Requested start
        pos: GridVec2,
    },

    /// Two players share a start position
    #[error("{player} and {other} share start {pos}")]
    DuplicateStart {
        /// Player placed second
        player: PlayerId,
        /// Player already there
        other: PlayerId,
        /// Shared cell
        pos: GridVec2,
    },

    /// Reading a file failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File contents are not valid JSON for the expected shape
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// MAP CHOICE
// =============================================================================

/// Which track to race on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MapChoice {
    /// The 40×25 track with its fixed kill zones and finish
    #[default]
    Canonical,
    /// Obstacle-free grid of any size (no finish)
    Open {
        /// Width in cells
        width: u16,
        /// Height in cells
        height: u16,
    },
}

impl MapChoice {
    /// Parse a map name; `width`/`height` only apply to `open`.
    pub fn from_name(name: &str, width: u16, height: u16) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "canonical" => Ok(MapChoice::Canonical),
            "open" => Ok(MapChoice::Open { width, height }),
            _ => Err(ConfigError::UnknownMap(name.to_string())),
        }
    }

    /// Name used as the start table key.
    pub fn name(&self) -> &'static str {
        match self {
            MapChoice::Canonical => "canonical",
            MapChoice::Open { .. } => "open",
        }
    }

    /// Build the grid.
    pub fn build(&self) -> Result<GridMap, ConfigError> {
        match *self {
            MapChoice::Canonical => Ok(GridMap::canonical()),
            MapChoice::Open { width, height }
                if width == 0
                    || height == 0
                    || usize::from(width) * usize::from(height) > MAX_OPEN_CELLS =>
            {
                Err(ConfigError::InvalidMapSize { width, height })
            }
            MapChoice::Open { width, height } => Ok(GridMap::new(width, height)),
        }
    }
}

// =============================================================================
// START TABLE
// =============================================================================

/// Start positions per map name, indexed by player slot.
///
/// On disk: `{ "canonical": [[1, 3], [3, 3], ...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StartTable {
    maps: BTreeMap<String, Vec<[i32; 2]>>,
}

impl Default for StartTable {
    fn default() -> Self {
        let mut maps = BTreeMap::new();
        maps.insert("canonical".to_string(), DEFAULT_STARTS.to_vec());
        maps.insert("open".to_string(), DEFAULT_STARTS.to_vec());
        Self { maps }
    }
}

impl StartTable {
    /// Load a table from a JSON file. Maps it does not name keep the
    /// built-in starts.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded: StartTable = serde_json::from_str(&text)?;

        let mut table = StartTable::default();
        for (map, starts) in loaded.maps {
            info!("Start table {} overrides {} ({} slots)", path.display(), map, starts.len());
            table.maps.insert(map, starts);
        }
        Ok(table)
    }

    /// Start cell of a slot on a map.
    pub fn start_for(&self, map: &str, slot: usize) -> Option<GridVec2> {
        self.maps
            .get(map)
            .and_then(|starts| starts.get(slot))
            .map(|&pos| GridVec2::from(pos))
    }
}

// =============================================================================
// RACE CONFIG
// =============================================================================

/// Who picks a player's accelerations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Keyboard at the terminal
    #[default]
    Human,
    /// Breadth-first autopilot
    Bot,
}

/// One roster entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name
    pub name: String,
    /// Input source
    #[serde(default)]
    pub driver: DriverKind,
}

impl PlayerSetup {
    /// Human player.
    pub fn human(name: impl Into<String>) -> Self {
        Self { name: name.into(), driver: DriverKind::Human }
    }

    /// Autopilot player.
    pub fn bot(name: impl Into<String>) -> Self {
        Self { name: name.into(), driver: DriverKind::Bot }
    }
}

/// Everything needed to set up a race.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Track
    #[serde(default)]
    pub map: MapChoice,
    /// Roster in player-number order
    pub players: Vec<PlayerSetup>,
    /// Race rules
    #[serde(default)]
    pub rules: RaceRules,
    /// Optional start table file
    #[serde(default)]
    pub start_table: Option<PathBuf>,
}

impl RaceConfig {
    /// Load a whole race description from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate the setup and create the initial race state.
    pub fn build(&self) -> Result<RaceState, ConfigError> {
        let count = self.players.len();
        if count == 0 || count > MAX_PLAYERS as usize {
            return Err(ConfigError::InvalidPlayerCount(count));
        }

        let map = self.map.build()?;
        let table = match &self.start_table {
            Some(path) => StartTable::load(path)?,
            None => StartTable::default(),
        };

        let map_name = self.map.name();
        let mut taken: BTreeMap<GridVec2, PlayerId> = BTreeMap::new();
        let mut players = Vec::with_capacity(count);

        for (slot, setup) in self.players.iter().enumerate() {
            let id = PlayerId::from_slot(slot as u8)
                .ok_or(ConfigError::InvalidPlayerCount(count))?;
            let pos = table
                .start_for(map_name, slot)
                .ok_or_else(|| ConfigError::MissingStart { map: map_name.to_string(), slot })?;

            let Some(cell) = map.get(pos) else {
                return Err(ConfigError::StartOutOfBounds {
                    player: id,
                    pos,
                    width: map.width(),
                    height: map.height(),
                });
            };
            if cell.is_wall() || cell.is_finish() {
                return Err(ConfigError::StartBlocked { player: id, pos });
            }
            if let Some(&other) = taken.get(&pos) {
                return Err(ConfigError::DuplicateStart { player: id, other, pos });
            }
            taken.insert(pos, id);

            let name = if setup.name.trim().is_empty() {
                warn!("Player {} has no name, using a default", id.number());
                format!("Player {}", id.number())
            } else {
                setup.name.trim().to_string()
            };
            players.push(PlayerState::new(id, name, pos));
        }

        let mut state = RaceState::new(map);
        for player in players {
            state.add_player(player);
        }

        info!(
            "Race set up on {} map ({}x{}) with {} players",
            map_name,
            state.map.width(),
            state.map.height(),
            count
        );
        Ok(state)
    }
}
