//! Grid Cell State
//!
//! A cell is a small bitset: one occupancy bit per player slot (1..=8),
//! plus WALL and FINISH. Player `n` owns bit `1 << (n - 1)`.

use serde::{Serialize, Deserialize};

use crate::game::state::PlayerId;

/// Bitset describing what currently covers a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellState(u16);

impl CellState {
    /// Drivable, unoccupied cell.
    pub const EMPTY: Self = Self(0);

    /// Authored kill-zone cell.
    pub const WALL: Self = Self(1 << 8);

    /// Authored finish-zone cell.
    pub const FINISH: Self = Self(1 << 9);

    /// Mask covering all eight player occupancy bits.
    const PLAYER_MASK: u16 = 0x00FF;

    /// Create from raw bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Occupancy bit of a single player.
    #[inline]
    pub const fn player(id: PlayerId) -> Self {
        Self(1u16 << id.slot())
    }

    /// No bit set at all.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Cell belongs to a kill zone.
    #[inline]
    pub const fn is_wall(self) -> bool {
        self.0 & Self::WALL.0 != 0
    }

    /// Cell belongs to the finish zone.
    #[inline]
    pub const fn is_finish(self) -> bool {
        self.0 & Self::FINISH.0 != 0
    }

    /// Cell carries this player's trail bit.
    #[inline]
    pub const fn owned_by(self, id: PlayerId) -> bool {
        self.0 & Self::player(id).0 != 0
    }

    /// Any player trail bit is set.
    #[inline]
    pub const fn has_trail(self) -> bool {
        self.0 & Self::PLAYER_MASK != 0
    }

    /// Lowest-numbered player whose trail covers this cell.
    pub fn first_owner(self) -> Option<PlayerId> {
        let trail = self.0 & Self::PLAYER_MASK;
        if trail == 0 {
            return None;
        }
        PlayerId::from_slot(trail.trailing_zeros() as u8)
    }

    /// Union of two cell states.
    #[inline]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// This cell with the bits of `other` removed.
    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// View of the cell as seen by `id`: its own trail bit masked out.
    #[inline]
    pub const fn seen_by(self, id: PlayerId) -> Self {
        self.without(Self::player(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u8) -> PlayerId {
        PlayerId::new(n).unwrap()
    }

    #[test]
    fn test_player_bits_are_distinct() {
        let mut seen = 0u16;
        for n in 1..=8 {
            let bits = CellState::player(pid(n)).bits();
            assert_eq!(bits.count_ones(), 1);
            assert_eq!(seen & bits, 0);
            seen |= bits;
        }
        assert_eq!(seen & CellState::WALL.bits(), 0);
        assert_eq!(seen & CellState::FINISH.bits(), 0);
    }

    #[test]
    fn test_player_one_owns_lowest_bit() {
        assert_eq!(CellState::player(pid(1)).bits(), 1);
        assert_eq!(CellState::player(pid(8)).bits(), 1 << 7);
    }

    #[test]
    fn test_predicates() {
        let cell = CellState::WALL.with(CellState::player(pid(3)));
        assert!(cell.is_wall());
        assert!(!cell.is_finish());
        assert!(cell.owned_by(pid(3)));
        assert!(!cell.owned_by(pid(2)));
        assert!(cell.has_trail());
        assert_eq!(cell.first_owner(), Some(pid(3)));
    }

    #[test]
    fn test_seen_by_masks_only_own_bit() {
        let cell = CellState::player(pid(1)).with(CellState::player(pid(2)));
        assert_eq!(cell.seen_by(pid(1)), CellState::player(pid(2)));
        assert!(CellState::player(pid(4)).seen_by(pid(4)).is_empty());
        assert_eq!(CellState::FINISH.seen_by(pid(1)), CellState::FINISH);
    }
}
