//! # Bug Types and Piece Inventory
//!
//! Each side owns a fixed set of 14 tiles: 1 queen bee, 2 beetles, 3 ants,
//! 3 grasshoppers, 2 spiders, 1 ladybug, 1 mosquito and 1 pillbug. Pieces
//! are never created or destroyed after setup; a dense id in `0..28`
//! identifies every physical tile for the whole lifetime of an engine.

use std::fmt;

/// The two sides. White moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    /// Signed id used by the `GameState` trait (1 for White, -1 for Black).
    pub fn sign(self) -> i32 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }
}

/// Bug types in Hive, each with a distinct movement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BugType {
    Bee,         // 1 per player - moves 1 space, loses the game when surrounded
    Beetle,      // 2 per player - moves 1 space, can climb on top of the hive
    Ant,         // 3 per player - moves any number of spaces around the hive
    Grasshopper, // 3 per player - jumps in a straight line
    Spider,      // 2 per player - moves exactly 3 spaces
    Ladybug,     // 1 per player - two jumps over the hive, then one step down
    Mosquito,    // 1 per player - copies movement of its neighbors
    Pillbug,     // 1 per player - moves 1 space, can relocate neighbors
}

/// Number of bug types.
pub const NUM_BUG_TYPES: usize = 8;
/// Tiles per side.
pub const BUGS_PER_PLAYER: usize = 14;
/// Total tiles in a game.
pub const NUM_PIECES: usize = 28;

// BUG_SERIES[t] is the number of a player's bugs with type < t, so
// piece ids of one type/owner occupy a contiguous range.
pub(crate) const BUG_SERIES: [u8; NUM_BUG_TYPES] = [0, 1, 3, 6, 9, 11, 12, 13];

impl BugType {
    /// Get the count of each bug type per player.
    pub fn count_per_player(self) -> u8 {
        match self {
            BugType::Bee => 1,
            BugType::Beetle => 2,
            BugType::Ant => 3,
            BugType::Grasshopper => 3,
            BugType::Spider => 2,
            BugType::Ladybug => 1,
            BugType::Mosquito => 1,
            BugType::Pillbug => 1,
        }
    }

    /// Get all bug types.
    pub fn all() -> &'static [BugType; NUM_BUG_TYPES] {
        &[
            BugType::Bee,
            BugType::Beetle,
            BugType::Ant,
            BugType::Grasshopper,
            BugType::Spider,
            BugType::Ladybug,
            BugType::Mosquito,
            BugType::Pillbug,
        ]
    }

    /// Get a single-character representation of the bug type.
    pub fn char(self) -> char {
        match self {
            BugType::Bee => 'Q',
            BugType::Beetle => 'B',
            BugType::Ant => 'A',
            BugType::Grasshopper => 'G',
            BugType::Spider => 'S',
            BugType::Ladybug => 'L',
            BugType::Mosquito => 'M',
            BugType::Pillbug => 'P',
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            BugType::Bee => 0,
            BugType::Beetle => 1,
            BugType::Ant => 2,
            BugType::Grasshopper => 3,
            BugType::Spider => 4,
            BugType::Ladybug => 5,
            BugType::Mosquito => 6,
            BugType::Pillbug => 7,
        }
    }
}

/// Dense id of one physical tile, `0..28`. White owns `0..14`.
pub type PieceId = u8;

pub(crate) fn piece_id(player: Player, bug_type: BugType, order: u8) -> PieceId {
    debug_assert!(order < bug_type.count_per_player());
    (player.index() * BUGS_PER_PLAYER) as u8 + BUG_SERIES[bug_type.index()] + order
}

/// One physical tile: owner, type, and the ordinal distinguishing multiple
/// tiles of the same type (e.g. the 2nd ant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bug {
    pub player: Player,
    pub bug_type: BugType,
    pub order: u8,
}

impl Bug {
    pub(crate) fn id(self) -> PieceId {
        piece_id(self.player, self.bug_type, self.order)
    }

    pub(crate) fn from_id(id: PieceId) -> Bug {
        debug_assert!((id as usize) < NUM_PIECES);
        let player = if (id as usize) < BUGS_PER_PLAYER {
            Player::White
        } else {
            Player::Black
        };
        let within = id % BUGS_PER_PLAYER as u8;
        let type_idx = BUG_SERIES.iter().rposition(|&base| base <= within)
            .unwrap_or(0);
        let bug_type = BugType::all()[type_idx];
        Bug {
            player,
            bug_type,
            order: within - BUG_SERIES[type_idx],
        }
    }
}

impl fmt::Display for Bug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.player {
            Player::White => 'w',
            Player::Black => 'b',
        };
        write!(f, "{}{}", side, self.bug_type.char())?;
        if self.bug_type.count_per_player() > 1 {
            write!(f, "{}", self.order + 1)?;
        }
        Ok(())
    }
}

/// Per-player reserve of unplaced tiles.
///
/// Tiles of one type are handed out in ordinal order and taken back strictly
/// LIFO, which is all the undo stack ever needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BugCollection {
    placed: [u8; NUM_BUG_TYPES],
}

impl BugCollection {
    pub(crate) fn new() -> Self {
        BugCollection { placed: [0; NUM_BUG_TYPES] }
    }

    pub(crate) fn reset(&mut self) {
        self.placed = [0; NUM_BUG_TYPES];
    }

    pub(crate) fn has_unplaced(&self, bug_type: BugType) -> bool {
        self.placed[bug_type.index()] < bug_type.count_per_player()
    }

    /// Allocates the next unused ordinal for `bug_type`.
    pub(crate) fn take(&mut self, bug_type: BugType) -> u8 {
        debug_assert!(self.has_unplaced(bug_type), "no {bug_type:?} left in reserve");
        let order = self.placed[bug_type.index()];
        self.placed[bug_type.index()] += 1;
        order
    }

    /// Releases the most recently placed tile of `bug_type` back to reserve.
    pub(crate) fn put_back(&mut self, bug_type: BugType) {
        debug_assert!(self.placed[bug_type.index()] > 0);
        self.placed[bug_type.index()] -= 1;
    }

    pub(crate) fn num_placed(&self, bug_type: BugType) -> u8 {
        self.placed[bug_type.index()]
    }

    pub(crate) fn total_placed(&self) -> u8 {
        self.placed.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_counts_sum_to_fourteen() {
        let total: u8 = BugType::all().iter().map(|t| t.count_per_player()).sum();
        assert_eq!(total as usize, BUGS_PER_PLAYER);
    }

    #[test]
    fn piece_id_roundtrip() {
        for id in 0..NUM_PIECES as PieceId {
            let bug = Bug::from_id(id);
            assert_eq!(bug.id(), id);
            assert!(bug.order < bug.bug_type.count_per_player());
        }
    }

    #[test]
    fn reserve_is_lifo() {
        let mut reserve = BugCollection::new();
        assert_eq!(reserve.take(BugType::Ant), 0);
        assert_eq!(reserve.take(BugType::Ant), 1);
        assert_eq!(reserve.take(BugType::Ant), 2);
        assert!(!reserve.has_unplaced(BugType::Ant));
        reserve.put_back(BugType::Ant);
        assert_eq!(reserve.take(BugType::Ant), 2);
        assert_eq!(reserve.total_placed(), 3);
    }
}
