//! # Hive Engine
//!
//! A complete rules engine for the board game Hive, including the ladybug,
//! mosquito and pillbug expansions. The engine owns the hexagonal board
//! model, per-bug move generation, the one-hive pinning analysis, strict
//! LIFO undo and incremental Zobrist hashing, and exposes it all through
//! [`HiveBoard`] plus the search-facing [`GameState`] trait.
//!
//! ```
//! use hive::{GameState, HiveBoard};
//!
//! let mut board = HiveBoard::new();
//! while !board.is_terminal() && board.moves_played() < 20 {
//!     let mv = board.legal_moves()[0];
//!     board.play_move(mv).unwrap();
//! }
//! ```

use std::fmt::Debug;
use std::hash::Hash;

pub mod board;
pub mod bug;
pub mod hex;
mod movegen;
mod pinned;
mod zobrist;

pub use board::{HiveBoard, Move};
pub use bug::{Bug, BugType, Player};
pub use hex::CellIdx;

/// Errors returned by the mutating [`HiveBoard`] entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HiveError {
    /// The move is not legal in the current position.
    #[error("illegal move for the current position")]
    IllegalMove,
    /// The move passed to undo is not the most recently played one.
    #[error("undo does not match the last played move")]
    UndoMismatch,
    /// Undo was requested on the initial position.
    #[error("no moves to undo")]
    EmptyHistory,
}

/// A trait for games playable by tree-search engines.
///
/// Implementations must be cheap to clone and safe to share across search
/// threads. Players are identified by signed ids, 1 for the first player and
/// -1 for the second.
pub trait GameState: Clone + Send + Sync {
    /// The type representing a move in the game.
    type Move: Clone + Eq + Hash + Debug + Send + Sync;

    /// All legal moves in the current position.
    fn get_possible_moves(&self) -> Vec<Self::Move>;

    /// Applies a move. The move must come from [`get_possible_moves`].
    ///
    /// [`get_possible_moves`]: GameState::get_possible_moves
    fn make_move(&mut self, mv: &Self::Move);

    /// Reverts the most recently applied move.
    fn unmake_move(&mut self, mv: &Self::Move);

    /// Whether the game is over.
    fn is_terminal(&self) -> bool;

    /// The winner of a finished game, or `None` for a draw or an unfinished
    /// game.
    fn get_winner(&self) -> Option<i32>;

    /// The player to move.
    fn get_current_player(&self) -> i32;

    /// A hash of the position suitable for transposition tables.
    fn position_hash(&self) -> u64;
}
