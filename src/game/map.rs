//! Grid Map
//!
//! Owns the per-cell state of the track. Map authoring is done by stamping
//! rectangular kill zones and finish zones; the canonical 40×25 track is a
//! fixed sequence of such stamps.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::vec2::GridVec2;
use crate::game::cell::CellState;
use crate::game::state::PlayerId;

/// Canonical track width in cells.
pub const CANONICAL_WIDTH: u16 = 40;

/// Canonical track height in cells.
pub const CANONICAL_HEIGHT: u16 = 25;

/// An authored rectangle: `width × height` cells starting at `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRect {
    /// Width in cells
    pub width: i32,
    /// Height in cells
    pub height: i32,
    /// Left column
    pub x: i32,
    /// Top row
    pub y: i32,
}

impl ZoneRect {
    /// Create from `(width, height, x-offset, y-offset)`.
    pub const fn new(width: i32, height: i32, x: i32, y: i32) -> Self {
        Self { width, height, x, y }
    }

    /// Cell used as the win sentinel for a finish zone stamped with this rect.
    pub const fn anchor(&self) -> GridVec2 {
        GridVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if a cell lies inside the rectangle.
    pub fn contains(&self, pos: GridVec2) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }
}

/// Kill zones of the canonical track, in stamping order.
pub const CANONICAL_KILL_ZONES: [ZoneRect; 8] = [
    ZoneRect::new(12, 6, 28, 0),
    ZoneRect::new(28, 4, 0, 10),
    ZoneRect::new(6, 5, 0, 14),
    ZoneRect::new(2, 5, 14, 14),
    ZoneRect::new(2, 5, 26, 14),
    ZoneRect::new(2, 6, 8, 19),
    ZoneRect::new(2, 6, 20, 19),
    ZoneRect::new(5, 4, 3, 21),
];

/// Finish zone of the canonical track.
pub const CANONICAL_FINISH: ZoneRect = ZoneRect::new(3, 4, 0, 21);

/// The race grid.
///
/// Cells are stored column-major (`x * height + y`). Writes outside
/// `[0, width) × [0, height)` are dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridMap {
    width: i32,
    height: i32,
    cells: Vec<CellState>,
    finish_anchor: Option<GridVec2>,
}

impl GridMap {
    /// Create an empty (fully drivable) map.
    pub fn new(width: u16, height: u16) -> Self {
        let cells = usize::from(width) * usize::from(height);
        Self {
            width: i32::from(width),
            height: i32::from(height),
            cells: vec![CellState::EMPTY; cells],
            finish_anchor: None,
        }
    }

    /// Build the canonical 40×25 track.
    pub fn canonical() -> Self {
        let mut map = Self::new(CANONICAL_WIDTH, CANONICAL_HEIGHT);
        for zone in &CANONICAL_KILL_ZONES {
            map.stamp_kill_zone(*zone);
        }
        map.stamp_finish_zone(CANONICAL_FINISH);
        map
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Win sentinel cell, set by the first finish zone stamped.
    #[inline]
    pub fn finish_anchor(&self) -> Option<GridVec2> {
        self.finish_anchor
    }

    /// Check if a cell is on the grid.
    #[inline]
    pub fn in_bounds(&self, pos: GridVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: GridVec2) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.x as usize * self.height as usize + pos.y as usize)
        } else {
            None
        }
    }

    /// State of a cell, `None` when off-grid.
    #[inline]
    pub fn get(&self, pos: GridVec2) -> Option<CellState> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrite a cell. Returns false (and writes nothing) when off-grid.
    ///
    /// The first FINISH cell written becomes the win sentinel if none is set.
    pub fn set(&mut self, pos: GridVec2, state: CellState) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = state;
                self.claim_anchor(pos, state);
                true
            }
            None => false,
        }
    }

    /// OR bits into a cell. Returns false when off-grid.
    ///
    /// The first FINISH cell written becomes the win sentinel if none is set.
    pub fn insert(&mut self, pos: GridVec2, bits: CellState) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = self.cells[i].with(bits);
                self.claim_anchor(pos, bits);
                true
            }
            None => false,
        }
    }

    fn claim_anchor(&mut self, pos: GridVec2, bits: CellState) {
        if bits.is_finish() && self.finish_anchor.is_none() {
            self.finish_anchor = Some(pos);
        }
    }

    /// OR bits into every on-grid cell of a rectangle.
    fn stamp(&mut self, zone: ZoneRect, bits: CellState) {
        for dx in 0..zone.width {
            for dy in 0..zone.height {
                self.insert(GridVec2::new(zone.x + dx, zone.y + dy), bits);
            }
        }
    }

    /// Stamp a rectangle of WALL cells.
    pub fn stamp_kill_zone(&mut self, zone: ZoneRect) {
        self.stamp(zone, CellState::WALL);
    }

    /// Stamp a rectangle of FINISH cells.
    ///
    /// The first finish zone also fixes the win sentinel cell: its centre,
    /// or its first on-grid cell when the centre is clipped away.
    pub fn stamp_finish_zone(&mut self, zone: ZoneRect) {
        let first = self.finish_anchor.is_none();
        self.stamp(zone, CellState::FINISH);
        if !first {
            return;
        }
        self.finish_anchor = if self.in_bounds(zone.anchor()) {
            Some(zone.anchor())
        } else {
            self.iter()
                .find(|(pos, cell)| zone.contains(*pos) && cell.is_finish())
                .map(|(pos, _)| pos)
        };
    }

    /// Mark a player's trail on every listed cell.
    pub fn mark_trail(&mut self, id: PlayerId, cells: &[GridVec2]) {
        let bit = CellState::player(id);
        for pos in cells {
            self.insert(*pos, bit);
        }
    }

    /// Strip a player's trail bit from the whole grid.
    pub fn clear_trail(&mut self, id: PlayerId) {
        let bit = CellState::player(id);
        for cell in &mut self.cells {
            *cell = cell.without(bit);
        }
    }

    /// Iterate all cells as `(position, state)`, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (GridVec2, CellState)> + '_ {
        let height = self.height as usize;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            (GridVec2::new((i / height) as i32, (i % height) as i32), *cell)
        })
    }

    /// Hash the grid contents for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_i32(self.width);
        hasher.update_i32(self.height);
        for cell in &self.cells {
            hasher.update_u16(cell.bits());
        }
    }
}
