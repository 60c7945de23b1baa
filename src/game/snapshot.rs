//! Render Snapshots
//!
//! Read-only view of the race for renderers: tile classification plus each
//! vehicle's position, velocity and heading. The terminal renderer is the
//! [`fmt::Display`] impl; other front ends consume the serialized form.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec2::GridVec2;
use crate::game::cell::CellState;
use crate::game::state::{Heading, PlayerId, PlayerStatus, RacePhase, RaceState};

/// What a renderer draws for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Drivable, unmarked
    Track,
    /// Kill zone
    Wall,
    /// Finish zone
    Finish,
    /// Last move of a player (lowest number when trails overlap)
    Trail(PlayerId),
}

impl TileKind {
    /// Classify a cell. Finish takes precedence, as it does for movement.
    pub fn of(cell: CellState) -> Self {
        if cell.is_finish() {
            TileKind::Finish
        } else if cell.is_wall() {
            TileKind::Wall
        } else if let Some(owner) = cell.first_owner() {
            TileKind::Trail(owner)
        } else {
            TileKind::Track
        }
    }

    fn glyph(self) -> char {
        match self {
            TileKind::Track => '.',
            TileKind::Wall => '#',
            TileKind::Finish => 'F',
            TileKind::Trail(id) => char::from(b'0' + id.number()),
        }
    }
}

/// One vehicle as seen by a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player number
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current cell
    pub position: GridVec2,
    /// Current velocity
    pub velocity: GridVec2,
    /// Sprite rotation
    pub heading: Heading,
    /// Derived status
    pub status: PlayerStatus,
}

/// Frozen copy of everything a renderer needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    /// Grid width
    pub width: i32,
    /// Grid height
    pub height: i32,
    /// Current round
    pub round: u32,
    /// Race phase
    pub phase: RacePhase,
    /// Player to act next
    pub current: Option<PlayerId>,
    /// Tiles, row by row from the top
    pub tiles: Vec<TileKind>,
    /// Vehicles in turn order
    pub players: Vec<PlayerView>,
}

impl RaceSnapshot {
    /// Capture the current state.
    pub fn capture(state: &RaceState) -> Self {
        let map = &state.map;
        let anchor = map.finish_anchor();

        let mut tiles = Vec::with_capacity(map.width() as usize * map.height() as usize);
        for y in 0..map.height() {
            for x in 0..map.width() {
                let cell = map.get(GridVec2::new(x, y)).unwrap_or(CellState::EMPTY);
                tiles.push(TileKind::of(cell));
            }
        }

        let players = state
            .players
            .values()
            .map(|p| PlayerView {
                id: p.id,
                name: p.name.clone(),
                position: p.position,
                velocity: p.velocity,
                heading: p.heading,
                status: p.status(anchor),
            })
            .collect();

        Self {
            width: map.width(),
            height: map.height(),
            round: state.round,
            phase: state.phase.clone(),
            current: state.current_player(),
            tiles,
            players,
        }
    }

    /// Tile at a cell, `None` when off-grid.
    pub fn tile(&self, pos: GridVec2) -> Option<TileKind> {
        if pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height {
            return None;
        }
        self.tiles
            .get(pos.y as usize * self.width as usize + pos.x as usize)
            .copied()
    }

    /// Vehicle standing on a cell, if any.
    fn car_at(&self, pos: GridVec2) -> Option<&PlayerView> {
        self.players
            .iter()
            .find(|p| p.position == pos && p.status != PlayerStatus::IsOut)
    }
}

/// Car letter: `A` for player 1, `B` for player 2, ...
fn car_glyph(id: PlayerId) -> char {
    char::from(b'A' + id.slot())
}

fn heading_arrow(heading: Heading) -> char {
    match heading {
        Heading::North => '^',
        Heading::NorthEast => '/',
        Heading::East => '>',
        Heading::SouthEast => '\\',
        Heading::South => 'v',
        Heading::SouthWest => '/',
        Heading::West => '<',
        Heading::NorthWest => '\\',
    }
}

impl fmt::Display for RaceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round {}", self.round)?;
        for y in 0..self.height {
            let row: String = (0..self.width)
                .map(|x| {
                    let pos = GridVec2::new(x, y);
                    match self.car_at(pos) {
                        Some(car) => car_glyph(car.id),
                        None => self.tile(pos).map_or(' ', TileKind::glyph),
                    }
                })
                .collect();
            writeln!(f, "{row}")?;
        }
        for p in &self.players {
            let status = match p.status {
                PlayerStatus::CanPlay => "racing",
                PlayerStatus::IsOut => "out",
                PlayerStatus::HasWon => "finished",
            };
            let marker = if self.current == Some(p.id) { '*' } else { ' ' };
            write!(
                f,
                "{marker}{} {} {}: {} speed {} {} ({status})",
                car_glyph(p.id),
                p.id,
                p.name,
                p.position,
                p.velocity,
                heading_arrow(p.heading),
            )?;
            writeln!(f)?;
        }
        Ok(())
    }
}
