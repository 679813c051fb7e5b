//! # Hive Board Engine
//!
//! Owns the cell grid and the 28 piece records and implements the full
//! per-ply rule cycle: legal-move generation, move application, strict LIFO
//! undo, pinning recomputation and terminal detection.
//!
//! ## Representation
//! Cells and pieces are dense indices into flat arrays. Each cell records
//! only its top occupant; stacks are walked through per-piece `above`/`below`
//! links. Pieces carrying no `above` link are exactly the selectable
//! top-of-stack pieces, tracked as a 28-bit mask for cheap iteration.
//!
//! ## Rules enforced here
//! - First piece on the fixed start cell, second on one of its 6 neighbors.
//! - Later placements only on cells touching the placing player's pieces and
//!   nobody else's (maintained incrementally in a per-player cache).
//! - Queen by each player's 4th placement; no movement until the queen is down.
//! - One-hive rule via the pinning analysis after every ply.
//! - The piece moved on the previous ply may not move again this ply, except
//!   as the target of a pillbug throw.
//! - A surrounded queen ends the game; both surrounded at once is a draw.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::bug::{self, Bug, BugCollection, BugType, PieceId, Player, NUM_PIECES};
use crate::hex::{self, CellIdx, NUM_CELLS};
use crate::pinned;
use crate::zobrist;
use crate::{GameState, HiveError};

/// Represents a move in Hive.
///
/// A move is either placing a new piece, relocating a piece already on the
/// board (its own movement or a pillbug throw), or passing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Move {
    /// Place a new piece of the given type from the reserve.
    Place { bug: BugType, to: CellIdx },
    /// Move the top-of-stack piece at `from` to `to`.
    Relocate { from: CellIdx, to: CellIdx },
    /// Pass; only legal when no other move exists.
    Pass,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place { bug, to } => {
                let (x, y) = hex::cell_coords(*to);
                write!(f, "{}({},{})", bug.char(), x, y)
            }
            Move::Relocate { from, to } => {
                let (fx, fy) = hex::cell_coords(*from);
                let (tx, ty) = hex::cell_coords(*to);
                write!(f, "({},{})->({},{})", fx, fy, tx, ty)
            }
            Move::Pass => write!(f, "Pass"),
        }
    }
}

/// Where one physical tile currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PieceState {
    pub(crate) bug: Bug,
    /// `None` while the piece is in reserve.
    pub(crate) cell: Option<CellIdx>,
    pub(crate) above: Option<PieceId>,
    pub(crate) below: Option<PieceId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Undo {
    mv: Move,
    last_moved: Option<PieceId>,
}

/// Complete state of a Hive game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveBoard {
    /// Top occupant per cell.
    cells: Vec<Option<PieceId>>,
    pieces: [PieceState; NUM_PIECES],
    reserves: [BugCollection; 2],
    /// Placement-legality cache: empty cells touching only this player's
    /// pieces. Ordered so legal-move output is deterministic.
    available: [BTreeSet<CellIdx>; 2],
    /// Mask of pieces currently on top of a stack.
    on_top: u32,
    /// Mask of pieces that may not move without splitting the hive.
    pinned: u32,
    to_play: Player,
    /// The piece moved or placed on the previous ply.
    last_moved: Option<PieceId>,
    zobrist: u64,
    outcome: Option<Player>,
    terminal: bool,
    history: Vec<Undo>,
}

impl HiveBoard {
    /// Create a new game with all 28 pieces in reserve and White to move.
    pub fn new() -> Self {
        let pieces = std::array::from_fn(|id| PieceState {
            bug: Bug::from_id(id as PieceId),
            cell: None,
            above: None,
            below: None,
        });
        HiveBoard {
            cells: vec![None; NUM_CELLS],
            pieces,
            reserves: [BugCollection::new(), BugCollection::new()],
            available: [BTreeSet::new(), BTreeSet::new()],
            on_top: 0,
            pinned: 0,
            to_play: Player::White,
            last_moved: None,
            zobrist: 0,
            outcome: None,
            terminal: false,
            history: Vec::new(),
        }
    }

    /// Reset to the initial position, returning every piece to reserve.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        for piece in &mut self.pieces {
            piece.cell = None;
            piece.above = None;
            piece.below = None;
        }
        self.reserves[0].reset();
        self.reserves[1].reset();
        self.available[0].clear();
        self.available[1].clear();
        self.on_top = 0;
        self.pinned = 0;
        self.to_play = Player::White;
        self.last_moved = None;
        self.zobrist = 0;
        self.outcome = None;
        self.terminal = false;
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Read-only introspection
    // ------------------------------------------------------------------

    /// The player whose turn it is.
    pub fn to_play(&self) -> Player {
        self.to_play
    }

    /// Winner of a finished game, if it did not end in a draw.
    pub fn outcome(&self) -> Option<Player> {
        self.outcome
    }

    /// True once a queen is fully surrounded.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Incremental Zobrist hash of occupancy plus side to move, suitable for
    /// repetition and transposition detection.
    pub fn zobrist_hash(&self) -> u64 {
        self.zobrist
    }

    /// Number of plies played (and undoable).
    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    /// The piece on top of the stack at `cell`, if any.
    pub fn top_bug(&self, cell: CellIdx) -> Option<Bug> {
        self.top(cell).map(|id| self.pieces[id as usize].bug)
    }

    /// The full stack at `cell`, bottom to top.
    pub fn stack_at(&self, cell: CellIdx) -> Vec<Bug> {
        let mut stack = Vec::new();
        let mut cur = self.top(cell);
        while let Some(id) = cur {
            stack.push(self.pieces[id as usize].bug);
            cur = self.pieces[id as usize].below;
        }
        stack.reverse();
        stack
    }

    /// Number of pieces stacked on `cell`.
    pub fn stack_height(&self, cell: CellIdx) -> u8 {
        let mut height = 0;
        let mut cur = self.top(cell);
        while let Some(id) = cur {
            height += 1;
            cur = self.pieces[id as usize].below;
        }
        height
    }

    /// All occupied cells in ascending index order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellIdx> + '_ {
        (0..NUM_CELLS as CellIdx).filter(move |&c| self.occupied(c))
    }

    /// Tiles of `bug_type` the player still has in reserve.
    pub fn in_reserve(&self, player: Player, bug_type: BugType) -> u8 {
        bug_type.count_per_player() - self.reserves[player.index()].num_placed(bug_type)
    }

    // ------------------------------------------------------------------
    // Internal queries shared with the move generators
    // ------------------------------------------------------------------

    pub(crate) fn top(&self, cell: CellIdx) -> Option<PieceId> {
        self.cells[cell as usize]
    }

    pub(crate) fn occupied(&self, cell: CellIdx) -> bool {
        self.cells[cell as usize].is_some()
    }

    /// Occupancy with the mover's origin treated as empty, so a walk may
    /// slide through the gap the mover itself vacates.
    pub(crate) fn occupied_excl(&self, cell: CellIdx, origin: CellIdx) -> bool {
        cell != origin && self.occupied(cell)
    }

    pub(crate) fn is_pinned(&self, id: PieceId) -> bool {
        self.pinned & (1 << id) != 0
    }

    pub(crate) fn piece(&self, id: PieceId) -> &PieceState {
        &self.pieces[id as usize]
    }

    pub(crate) fn last_moved(&self) -> Option<PieceId> {
        self.last_moved
    }

    fn queen_cell(&self, player: Player) -> Option<CellIdx> {
        self.pieces[bug::piece_id(player, BugType::Bee, 0) as usize].cell
    }

    fn is_surrounded(&self, cell: CellIdx) -> bool {
        hex::neighbors(cell).iter().all(|&n| self.occupied(n))
    }

    fn pieces_on_board(&self) -> u8 {
        self.reserves[0].total_placed() + self.reserves[1].total_placed()
    }

    // ------------------------------------------------------------------
    // Legal moves
    // ------------------------------------------------------------------

    /// All legal moves for the player to move. Deterministic for a given
    /// position; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.terminal {
            return Vec::new();
        }
        let mut moves = Vec::new();
        let player = self.to_play;
        let reserve = &self.reserves[player.index()];

        // Placements. With three pieces down and no queen, the 4th placement
        // is forced to be the queen.
        let must_place_queen =
            reserve.total_placed() >= 3 && reserve.num_placed(BugType::Bee) == 0;
        let cells = self.placement_cells();
        for &bug_type in BugType::all() {
            if !reserve.has_unplaced(bug_type) {
                continue;
            }
            if must_place_queen && bug_type != BugType::Bee {
                continue;
            }
            for &to in &cells {
                moves.push(Move::Place { bug: bug_type, to });
            }
        }

        // Movement, once the player's own queen is down.
        if reserve.num_placed(BugType::Bee) > 0 {
            for id in 0..NUM_PIECES as PieceId {
                if self.on_top & (1 << id) == 0 {
                    continue;
                }
                let piece = self.pieces[id as usize];
                if piece.bug.player != player {
                    continue;
                }
                let pos = piece.cell.expect("top-of-stack piece has a cell");
                let movable = !self.is_pinned(id) && self.last_moved != Some(id);
                if movable {
                    self.generate_moves(id, piece.bug.bug_type, &mut moves);
                } else {
                    // An immobile pillbug keeps its throw ability, as does an
                    // immobile mosquito standing next to any pillbug.
                    match piece.bug.bug_type {
                        BugType::Pillbug => self.pillbug_throws(pos, &mut moves),
                        BugType::Mosquito if self.touches_pillbug(pos) => {
                            self.pillbug_throws(pos, &mut moves)
                        }
                        _ => {}
                    }
                }
            }
        }

        // The same destination can be reached by several scan directions or
        // copied movement rules; keep the first occurrence of each move.
        let mut seen = HashSet::with_capacity(moves.len());
        moves.retain(|m| seen.insert(*m));

        if moves.is_empty() {
            moves.push(Move::Pass);
        }
        moves
    }

    pub(crate) fn touches_pillbug(&self, pos: CellIdx) -> bool {
        hex::neighbors(pos).iter().any(|&n| {
            self.top_bug(n)
                .is_some_and(|b| b.bug_type == BugType::Pillbug)
        })
    }

    /// Valid placement cells for the player to move.
    fn placement_cells(&self) -> Vec<CellIdx> {
        match self.pieces_on_board() {
            0 => vec![hex::START_CELL],
            // The second player's first piece must touch the first piece;
            // no ownership rule applies yet.
            1 => {
                let first = self
                    .occupied_cells()
                    .next()
                    .expect("one piece is on the board");
                hex::neighbors(first).to_vec()
            }
            _ => self.available[self.to_play.index()].iter().copied().collect(),
        }
    }

    // ------------------------------------------------------------------
    // Move application and undo
    // ------------------------------------------------------------------

    /// Applies a move after checking it is legal in the current position.
    pub fn play_move(&mut self, mv: Move) -> Result<(), HiveError> {
        if !self.legal_moves().contains(&mv) {
            return Err(HiveError::IllegalMove);
        }
        self.apply_move(mv);
        Ok(())
    }

    /// Reverts the most recently applied move. Strictly LIFO: `mv` must be
    /// the exact move on top of the history stack.
    pub fn undo_move(&mut self, mv: Move) -> Result<(), HiveError> {
        let Some(&undo) = self.history.last() else {
            return Err(HiveError::EmptyHistory);
        };
        if undo.mv != mv {
            return Err(HiveError::UndoMismatch);
        }
        self.history.pop();
        match mv {
            Move::Pass => {}
            Move::Place { to, .. } => {
                let id = self.lift_top(to);
                self.return_to_reserve(id);
            }
            Move::Relocate { from, to } => {
                let id = self.lift_top(to);
                self.drop_on(id, from);
            }
        }
        self.last_moved = undo.last_moved;
        self.to_play = self.to_play.opponent();
        self.zobrist ^= zobrist::side_key();
        self.refresh_derived();
        Ok(())
    }

    pub(crate) fn apply_move(&mut self, mv: Move) {
        let last_before = self.last_moved;
        match mv {
            Move::Pass => self.last_moved = None,
            Move::Place { bug, to } => {
                let player = self.to_play;
                debug_assert!(self.reserves[player.index()].has_unplaced(bug));
                let order = self.reserves[player.index()].take(bug);
                let id = bug::piece_id(player, bug, order);
                self.drop_on(id, to);
                self.last_moved = Some(id);
            }
            Move::Relocate { from, to } => {
                let id = self.lift_top(from);
                self.drop_on(id, to);
                self.last_moved = Some(id);
            }
        }
        self.history.push(Undo { mv, last_moved: last_before });
        self.to_play = self.to_play.opponent();
        self.zobrist ^= zobrist::side_key();
        self.refresh_derived();
    }

    /// Removes the top piece of `cell`, unlinking it from the stack.
    fn lift_top(&mut self, cell: CellIdx) -> PieceId {
        let id = self.top(cell).expect("lift from an occupied cell");
        let bug = self.pieces[id as usize].bug;
        let height = self.stack_height(cell) - 1;
        self.zobrist ^= zobrist::piece_key(bug.player, bug.bug_type, cell, height);

        let below = self.pieces[id as usize].below;
        self.cells[cell as usize] = below;
        if let Some(b) = below {
            self.pieces[b as usize].above = None;
            self.on_top |= 1 << b;
        }
        let piece = &mut self.pieces[id as usize];
        debug_assert!(piece.above.is_none(), "lifted piece must be top of stack");
        piece.cell = None;
        piece.below = None;
        self.on_top &= !(1 << id);

        self.refresh_available_around(cell);
        id
    }

    /// Places `id` on top of whatever occupies `cell`.
    fn drop_on(&mut self, id: PieceId, cell: CellIdx) {
        let below = self.cells[cell as usize];
        if let Some(b) = below {
            self.pieces[b as usize].above = Some(id);
            self.on_top &= !(1 << b);
        }
        let bug = self.pieces[id as usize].bug;
        let piece = &mut self.pieces[id as usize];
        piece.cell = Some(cell);
        piece.below = below;
        piece.above = None;
        self.cells[cell as usize] = Some(id);
        self.on_top |= 1 << id;

        let height = self.stack_height(cell) - 1;
        self.zobrist ^= zobrist::piece_key(bug.player, bug.bug_type, cell, height);

        self.refresh_available_around(cell);
    }

    fn return_to_reserve(&mut self, id: PieceId) {
        let bug = self.pieces[id as usize].bug;
        debug_assert_eq!(
            bug.order + 1,
            self.reserves[bug.player.index()].num_placed(bug.bug_type),
            "reserve returns must be LIFO"
        );
        self.reserves[bug.player.index()].put_back(bug.bug_type);
    }

    // ------------------------------------------------------------------
    // Derived caches
    // ------------------------------------------------------------------

    /// Re-evaluates placement eligibility of `cell` and its six neighbors
    /// after the occupancy of `cell` changed.
    fn refresh_available_around(&mut self, cell: CellIdx) {
        self.eval_available(cell);
        for &n in hex::neighbors(cell) {
            self.eval_available(n);
        }
    }

    /// A cell is a valid placement target for exactly the player owning all
    /// of its occupied neighbors; mixed or absent neighbors disqualify it
    /// for both players.
    fn eval_available(&mut self, cell: CellIdx) {
        let mut owner: Option<Player> = None;
        let mut mixed = self.occupied(cell);
        if !mixed {
            for &n in hex::neighbors(cell) {
                if let Some(bug) = self.top_bug(n) {
                    match owner {
                        None => owner = Some(bug.player),
                        Some(o) if o != bug.player => {
                            mixed = true;
                            break;
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        match owner {
            Some(player) if !mixed => {
                self.available[player.index()].insert(cell);
                self.available[player.opponent().index()].remove(&cell);
            }
            _ => {
                self.available[0].remove(&cell);
                self.available[1].remove(&cell);
            }
        }
    }

    fn refresh_derived(&mut self) {
        self.recompute_pinned();
        self.recompute_outcome();
    }

    fn recompute_pinned(&mut self) {
        self.pinned = 0;
        if self.on_top == 0 {
            return;
        }
        let any = self.on_top.trailing_zeros() as PieceId;
        let root = self.pieces[any as usize]
            .cell
            .expect("on-board piece has a cell");
        let mut articulation = Vec::new();
        pinned::articulation_cells(&self.cells, root, &mut articulation);
        for cell in articulation {
            let id = self.top(cell).expect("articulation cell is occupied");
            // The top of a stack of two or more is never pinned: the stack
            // below keeps the hive connected when it steps away.
            if self.pieces[id as usize].below.is_none() {
                self.pinned |= 1 << id;
            }
        }
    }

    fn recompute_outcome(&mut self) {
        let white_lost = self
            .queen_cell(Player::White)
            .is_some_and(|c| self.is_surrounded(c));
        let black_lost = self
            .queen_cell(Player::Black)
            .is_some_and(|c| self.is_surrounded(c));
        self.terminal = white_lost || black_lost;
        self.outcome = match (white_lost, black_lost) {
            (true, false) => Some(Player::Black),
            (false, true) => Some(Player::White),
            _ => None,
        };
    }

    // ------------------------------------------------------------------
    // Test support
    // ------------------------------------------------------------------

    /// Drops a piece directly, bypassing turn order and placement rules.
    /// Only for constructing positions in tests.
    #[cfg(test)]
    pub(crate) fn put(&mut self, player: Player, bug_type: BugType, cell: CellIdx) -> PieceId {
        let order = self.reserves[player.index()].take(bug_type);
        let id = bug::piece_id(player, bug_type, order);
        self.drop_on(id, cell);
        self.refresh_derived();
        id
    }

    #[cfg(test)]
    pub(crate) fn set_last_moved(&mut self, id: Option<PieceId>) {
        self.last_moved = id;
    }
}

impl Default for HiveBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HiveBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:?} to move, ply {}",
            self.to_play,
            self.history.len()
        )?;
        let occupied: Vec<CellIdx> = self.occupied_cells().collect();
        if occupied.is_empty() {
            return writeln!(f, "(empty board)");
        }
        let coords: Vec<(i32, i32)> = occupied.iter().map(|&c| hex::cell_coords(c)).collect();
        let min_x = coords.iter().map(|c| c.0).min().unwrap_or(0) - 1;
        let max_x = coords.iter().map(|c| c.0).max().unwrap_or(0) + 1;
        let min_y = coords.iter().map(|c| c.1).min().unwrap_or(0) - 1;
        let max_y = coords.iter().map(|c| c.1).max().unwrap_or(0) + 1;
        for y in min_y..=max_y {
            if y.rem_euclid(2) == 1 {
                write!(f, "  ")?;
            }
            for x in min_x..=max_x {
                match self.top_bug(hex::cell_index(x, y)) {
                    Some(bug) => write!(f, "{:>3} ", bug.to_string())?,
                    None => write!(f, "  . ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameState for HiveBoard {
    type Move = Move;

    fn get_possible_moves(&self) -> Vec<Move> {
        self.legal_moves()
    }

    fn make_move(&mut self, mv: &Move) {
        debug_assert!(
            self.legal_moves().contains(mv),
            "illegal move submitted: {mv}"
        );
        self.apply_move(*mv);
    }

    fn unmake_move(&mut self, mv: &Move) {
        debug_assert_eq!(self.history.last().map(|u| u.mv), Some(*mv));
        let _ = self.undo_move(*mv);
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn get_winner(&self) -> Option<i32> {
        self.outcome.map(Player::sign)
    }

    fn get_current_player(&self) -> i32 {
        self.to_play.sign()
    }

    fn position_hash(&self) -> u64 {
        self.zobrist
    }
}
