//! Zobrist hashing of board positions.
//!
//! One key per (player, bug type, cell, stack height) combination plus a
//! side-to-move key. The table is filled once per process from a fixed seed
//! so hashes are comparable across engine instances, and is never mutated
//! after initialization.

use std::sync::OnceLock;

use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::bug::{BugType, Player, NUM_BUG_TYPES};
use crate::hex::{CellIdx, NUM_CELLS};

/// A stack can never grow past 7: the bee under attack plus up to four
/// beetles and two mosquitos-as-beetles.
pub(crate) const MAX_STACK: usize = 7;

const ZOBRIST_SEED: u64 = 2346;
const TABLE_LEN: usize = 2 * NUM_BUG_TYPES * NUM_CELLS * MAX_STACK + 1;

static TABLE: OnceLock<Vec<u64>> = OnceLock::new();

fn table() -> &'static [u64] {
    TABLE.get_or_init(|| {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(ZOBRIST_SEED);
        (0..TABLE_LEN).map(|_| rng.next_u64()).collect()
    })
}

/// Key for one piece sitting at `cell` with `height` pieces below it.
pub(crate) fn piece_key(player: Player, bug_type: BugType, cell: CellIdx, height: u8) -> u64 {
    debug_assert!((height as usize) < MAX_STACK);
    let i = ((player.index() * NUM_BUG_TYPES + bug_type.index()) * NUM_CELLS
        + cell as usize)
        * MAX_STACK
        + height as usize;
    table()[i]
}

/// Key toggled on every change of the side to move.
pub(crate) fn side_key() -> u64 {
    table()[TABLE_LEN - 1]
}
