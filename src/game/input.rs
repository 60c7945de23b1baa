//! Player Input
//!
//! The core only consumes "acceleration vector for this turn". Devices are
//! reached through the [`Driver`] trait; symbols are translated through a
//! per-player [`Keymap`].

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::io::{BufRead, Write};
use std::rc::Rc;
use serde::{Serialize, Deserialize};

use crate::core::vec2::GridVec2;
use crate::game::assist::MoveOption;
use crate::game::snapshot::RaceSnapshot;
use crate::game::state::{PlayerId, PlayerState, RaceState};

// =============================================================================
// ACCELERATION
// =============================================================================

/// One-turn change of velocity: each component in -1..=1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridVec2", into = "GridVec2")]
pub struct Acceleration(GridVec2);

impl Acceleration {
    /// Keep current velocity
    pub const NONE: Self = Self(GridVec2::ZERO);
    /// Up the screen
    pub const NORTH: Self = Self(GridVec2::new(0, -1));
    /// Up and right
    pub const NORTH_EAST: Self = Self(GridVec2::new(1, -1));
    /// Right
    pub const EAST: Self = Self(GridVec2::new(1, 0));
    /// Down and right
    pub const SOUTH_EAST: Self = Self(GridVec2::new(1, 1));
    /// Down the screen
    pub const SOUTH: Self = Self(GridVec2::new(0, 1));
    /// Down and left
    pub const SOUTH_WEST: Self = Self(GridVec2::new(-1, 1));
    /// Left
    pub const WEST: Self = Self(GridVec2::new(-1, 0));
    /// Up and left
    pub const NORTH_WEST: Self = Self(GridVec2::new(-1, -1));

    /// All nine accelerations.
    pub const ALL: [Self; 9] = [
        Self::NORTH_WEST, Self::NORTH, Self::NORTH_EAST,
        Self::WEST, Self::NONE, Self::EAST,
        Self::SOUTH_WEST, Self::SOUTH, Self::SOUTH_EAST,
    ];

    /// Create from components. `None` unless both are in -1..=1.
    pub fn new(x: i32, y: i32) -> Option<Self> {
        if (-1..=1).contains(&x) && (-1..=1).contains(&y) {
            Some(Self(GridVec2::new(x, y)))
        } else {
            None
        }
    }

    /// As a vector.
    #[inline]
    pub fn vector(self) -> GridVec2 {
        self.0
    }
}

impl TryFrom<GridVec2> for Acceleration {
    type Error = String;

    fn try_from(v: GridVec2) -> Result<Self, Self::Error> {
        Self::new(v.x, v.y).ok_or_else(|| format!("acceleration {v} outside -1..=1"))
    }
}

impl From<Acceleration> for GridVec2 {
    fn from(a: Acceleration) -> GridVec2 {
        a.0
    }
}

impl fmt::Display for Acceleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// KEYMAP
// =============================================================================

/// Symbol → acceleration bindings.
///
/// Default is the numeric keypad, y growing downward: `8` up, `2` down,
/// `4` left, `6` right, `7 9 1 3` diagonals, `5` coast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    bindings: BTreeMap<char, Acceleration>,
}

impl Keymap {
    /// Build from explicit bindings.
    pub fn new(bindings: impl IntoIterator<Item = (char, Acceleration)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }

    /// Numeric keypad layout.
    pub fn keypad() -> Self {
        Self::new([
            ('7', Acceleration::NORTH_WEST),
            ('8', Acceleration::NORTH),
            ('9', Acceleration::NORTH_EAST),
            ('4', Acceleration::WEST),
            ('5', Acceleration::NONE),
            ('6', Acceleration::EAST),
            ('1', Acceleration::SOUTH_WEST),
            ('2', Acceleration::SOUTH),
            ('3', Acceleration::SOUTH_EAST),
        ])
    }

    /// Acceleration bound to a symbol.
    pub fn get(&self, symbol: char) -> Option<Acceleration> {
        self.bindings.get(&symbol).copied()
    }

    /// First recognized symbol of a typed line.
    pub fn resolve(&self, line: &str) -> Option<Acceleration> {
        line.chars().find_map(|c| self.get(c))
    }

    /// Symbol bound to an acceleration, if any.
    pub fn symbol_for(&self, accel: Acceleration) -> Option<char> {
        self.bindings
            .iter()
            .find(|(_, a)| **a == accel)
            .map(|(c, _)| *c)
    }

    /// Distinct accelerations this keymap can produce, ascending.
    pub fn accelerations(&self) -> Vec<Acceleration> {
        let mut out: Vec<Acceleration> = self.bindings.values().copied().collect();
        out.sort();
        out.dedup();
        out
    }

    /// Check if an acceleration is reachable from this keymap.
    pub fn allows(&self, accel: Acceleration) -> bool {
        self.bindings.values().any(|a| *a == accel)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::keypad()
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// What a driver answered when asked for a move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerInput {
    /// Apply this acceleration
    Accelerate(Acceleration),
    /// Input that maps to nothing; the turn is re-prompted
    Unrecognized(String),
    /// Stop the race
    Quit,
}

/// Everything a driver may look at before choosing.
pub struct TurnPrompt<'a> {
    /// Race state (read-only)
    pub state: &'a RaceState,
    /// Player to move
    pub player: PlayerId,
    /// Keymap options with their collision-assist verdicts
    pub options: &'a [MoveOption],
}

impl TurnPrompt<'_> {
    /// The moving player.
    pub fn player_state(&self) -> Option<&PlayerState> {
        self.state.get_player(&self.player)
    }

    /// Options the collision assist does not flag.
    pub fn safe_options(&self) -> impl Iterator<Item = &MoveOption> {
        self.options.iter().filter(|o| !o.fatal)
    }

    /// Verdict for a given acceleration.
    pub fn is_flagged(&self, accel: Acceleration) -> bool {
        self.options.iter().any(|o| o.acceleration == accel && o.fatal)
    }
}

/// Source of accelerations for one player.
///
/// Called synchronously; the whole race waits for the answer.
pub trait Driver {
    /// Choose the next input for the prompted player.
    fn next_input(&mut self, prompt: &TurnPrompt<'_>) -> PlayerInput;
}

/// One device shared by several players (hot-seat at one terminal).
impl<D: Driver> Driver for Rc<RefCell<D>> {
    fn next_input(&mut self, prompt: &TurnPrompt<'_>) -> PlayerInput {
        self.borrow_mut().next_input(prompt)
    }
}

/// Plays back a fixed list of inputs, then quits.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDriver {
    inputs: VecDeque<PlayerInput>,
}

impl ScriptedDriver {
    /// Script of raw inputs.
    pub fn new(inputs: impl IntoIterator<Item = PlayerInput>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }

    /// Script of accelerations only.
    pub fn from_accelerations(accels: impl IntoIterator<Item = Acceleration>) -> Self {
        Self::new(accels.into_iter().map(PlayerInput::Accelerate))
    }

    /// Inputs not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Driver for ScriptedDriver {
    fn next_input(&mut self, _prompt: &TurnPrompt<'_>) -> PlayerInput {
        self.inputs.pop_front().unwrap_or(PlayerInput::Quit)
    }
}

/// Line-oriented terminal driver: prints the board, reads one line per ask.
///
/// `q` or end of input quits; anything else goes through the player's keymap.
pub struct LineDriver<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineDriver<R, W> {
    /// Wrap a reader/writer pair (usually stdin/stdout).
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn show(&mut self, prompt: &TurnPrompt<'_>) -> std::io::Result<()> {
        let snapshot = RaceSnapshot::capture(prompt.state);
        writeln!(self.writer, "{snapshot}")?;
        if let Some(player) = prompt.player_state() {
            writeln!(
                self.writer,
                "Player {} : {}, you are on coordinates {}, and your speed is {}.",
                player.id.number(),
                player.name,
                player.position,
                player.velocity,
            )?;
            let flagged: Vec<char> = prompt
                .options
                .iter()
                .filter(|o| o.fatal)
                .filter_map(|o| player.keymap.symbol_for(o.acceleration))
                .collect();
            if !flagged.is_empty() {
                let keys: String = flagged.into_iter().collect();
                writeln!(self.writer, "Warning: these inputs lead to a crash: {keys}")?;
            }
        }
        write!(self.writer, "Choose a desired input: ")?;
        self.writer.flush()
    }
}

impl<R: BufRead, W: Write> Driver for LineDriver<R, W> {
    fn next_input(&mut self, prompt: &TurnPrompt<'_>) -> PlayerInput {
        if self.show(prompt).is_err() {
            return PlayerInput::Quit;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => return PlayerInput::Quit,
            Ok(_) => {}
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            return PlayerInput::Quit;
        }

        let resolved = prompt
            .player_state()
            .and_then(|p| p.keymap.resolve(line));
        match resolved {
            Some(accel) => PlayerInput::Accelerate(accel),
            None => PlayerInput::Unrecognized(line.to_string()),
        }
    }
}
