//! # Per-Bug Move Generation
//!
//! One generator per bug type, all producing `Move::Relocate` entries into a
//! caller-provided buffer. Generators assume the moving piece is allowed to
//! move at all; pinning, the no-backtrack rule and turn order are the
//! caller's concern (`HiveBoard::legal_moves`).
//!
//! ## Sliding
//! Ground-level movement uses the freedom-to-move rule: a step from one cell
//! to an adjacent empty cell is legal when exactly one of the two cells
//! flanking the shared edge is occupied. Zero occupied flanks would break
//! contact with the hive mid-step; two would leave no physical gap to slide
//! through. Every walk treats the mover's own origin cell as empty, since
//! the piece vacates it before the step happens.

use crate::board::{HiveBoard, Move};
use crate::bug::{BugType, PieceId};
use crate::hex::{self, CellIdx, NUM_CELLS};

impl HiveBoard {
    /// Appends every destination the piece could move to under `bug_type`
    /// movement. The type is a parameter rather than read from the piece so
    /// the mosquito can borrow its neighbors' generators.
    pub(crate) fn generate_moves(&self, id: PieceId, bug_type: BugType, moves: &mut Vec<Move>) {
        let origin = self
            .piece(id)
            .cell
            .expect("move generation for an on-board piece");
        match bug_type {
            BugType::Bee => self.gen_queen_steps(origin, moves),
            BugType::Beetle => self.gen_beetle(origin, moves),
            BugType::Ant => self.gen_ant(origin, moves),
            BugType::Grasshopper => self.gen_grasshopper(origin, moves),
            BugType::Spider => self.gen_spider(origin, moves),
            BugType::Ladybug => self.gen_ladybug(origin, moves),
            BugType::Mosquito => self.gen_mosquito(id, origin, moves),
            BugType::Pillbug => {
                self.gen_queen_steps(origin, moves);
                self.pillbug_throws(origin, moves);
            }
        }
    }

    /// One sliding step in `dir` from `pos`, with the mover's `origin`
    /// treated as empty. Legal when the destination is empty and exactly one
    /// of the two flanking cells is occupied.
    fn slide_ok(&self, pos: CellIdx, dir: usize, origin: CellIdx) -> bool {
        let to = hex::neighbor(pos, dir);
        if self.occupied_excl(to, origin) {
            return false;
        }
        let gate_cw = hex::neighbor(pos, (dir + 1) % 6);
        let gate_ccw = hex::neighbor(pos, (dir + 5) % 6);
        self.occupied_excl(gate_cw, origin) != self.occupied_excl(gate_ccw, origin)
    }

    /// Queen movement: a single sliding step. Shared by the pillbug.
    fn gen_queen_steps(&self, origin: CellIdx, moves: &mut Vec<Move>) {
        for dir in 0..6 {
            if self.slide_ok(origin, dir, origin) {
                moves.push(Move::Relocate { from: origin, to: hex::neighbor(origin, dir) });
            }
        }
    }

    /// Beetle movement: a single step that may climb onto or off stacks.
    ///
    /// At ground level to an empty cell this is an ordinary slide. Any step
    /// involving a stack instead checks the gate rule: the step is blocked
    /// only when both flanking stacks are strictly taller than both the
    /// level the beetle leaves from and the level it lands on.
    fn gen_beetle(&self, origin: CellIdx, moves: &mut Vec<Move>) {
        let from_height = self.stack_height(origin) - 1;
        for dir in 0..6 {
            let to = hex::neighbor(origin, dir);
            let to_height = self.stack_height(to);
            if from_height == 0 && to_height == 0 {
                if self.slide_ok(origin, dir, origin) {
                    moves.push(Move::Relocate { from: origin, to });
                }
                continue;
            }
            let gate_cw = self.stack_height(hex::neighbor(origin, (dir + 1) % 6));
            let gate_ccw = self.stack_height(hex::neighbor(origin, (dir + 5) % 6));
            let blocked = gate_cw > from_height
                && gate_cw > to_height
                && gate_ccw > from_height
                && gate_ccw > to_height;
            if !blocked {
                moves.push(Move::Relocate { from: origin, to });
            }
        }
    }

    /// Ant movement: any number of sliding steps. A flood fill over the
    /// empty cells reachable by repeated slides, excluding the origin.
    fn gen_ant(&self, origin: CellIdx, moves: &mut Vec<Move>) {
        let mut visited = vec![false; NUM_CELLS];
        visited[origin as usize] = true;
        let mut queue = vec![origin];
        let mut head = 0;
        while head < queue.len() {
            let pos = queue[head];
            head += 1;
            for dir in 0..6 {
                let to = hex::neighbor(pos, dir);
                if !visited[to as usize] && self.slide_ok(pos, dir, origin) {
                    visited[to as usize] = true;
                    queue.push(to);
                    moves.push(Move::Relocate { from: origin, to });
                }
            }
        }
    }

    /// Grasshopper movement: jump over at least one piece in a straight
    /// line, landing on the first empty cell behind it.
    fn gen_grasshopper(&self, origin: CellIdx, moves: &mut Vec<Move>) {
        for dir in 0..6 {
            let mut pos = hex::neighbor(origin, dir);
            if !self.occupied(pos) {
                continue;
            }
            while self.occupied(pos) {
                pos = hex::neighbor(pos, dir);
            }
            moves.push(Move::Relocate { from: origin, to: pos });
        }
    }

    /// Spider movement: exactly three sliding steps without revisiting any
    /// cell along the way.
    fn gen_spider(&self, origin: CellIdx, moves: &mut Vec<Move>) {
        let mut path = [origin; 4];
        let mut dests = Vec::new();
        self.spider_walk(origin, &mut path, 1, &mut dests);
        dests.sort_unstable();
        dests.dedup();
        moves.extend(dests.into_iter().map(|to| Move::Relocate { from: origin, to }));
    }

    fn spider_walk(&self, origin: CellIdx, path: &mut [CellIdx; 4], depth: usize, dests: &mut Vec<CellIdx>) {
        let pos = path[depth - 1];
        for dir in 0..6 {
            let to = hex::neighbor(pos, dir);
            if path[..depth].contains(&to) || !self.slide_ok(pos, dir, origin) {
                continue;
            }
            if depth == 3 {
                dests.push(to);
            } else {
                path[depth] = to;
                self.spider_walk(origin, path, depth + 1, dests);
            }
        }
    }

    /// Ladybug movement: two steps over the top of the hive, then one step
    /// down onto an empty cell.
    fn gen_ladybug(&self, origin: CellIdx, moves: &mut Vec<Move>) {
        let mut dests = Vec::new();
        for &first in hex::neighbors(origin) {
            if !self.occupied_excl(first, origin) {
                continue;
            }
            for &second in hex::neighbors(first) {
                if second == origin || !self.occupied_excl(second, origin) {
                    continue;
                }
                for &landing in hex::neighbors(second) {
                    if landing != origin && !self.occupied(landing) {
                        dests.push(landing);
                    }
                }
            }
        }
        dests.sort_unstable();
        dests.dedup();
        moves.extend(dests.into_iter().map(|to| Move::Relocate { from: origin, to }));
    }

    /// Mosquito movement: copies the movement rule of each bug type it
    /// touches. On top of a stack it is locked into beetle movement; two
    /// adjacent mosquitos grant each other nothing.
    fn gen_mosquito(&self, id: PieceId, origin: CellIdx, moves: &mut Vec<Move>) {
        if self.piece(id).below.is_some() {
            self.gen_beetle(origin, moves);
            return;
        }
        let mut copied: u8 = 0;
        for &n in hex::neighbors(origin) {
            if let Some(bug) = self.top_bug(n) {
                if bug.bug_type != BugType::Mosquito {
                    copied |= 1 << bug.bug_type.index();
                }
            }
        }
        for &bug_type in BugType::all() {
            if copied & (1 << bug_type.index()) != 0 {
                self.generate_moves(id, bug_type, moves);
            }
        }
    }

    /// Pillbug throws: relocate an adjacent unstacked, unpinned piece onto
    /// an adjacent empty cell. Available even when the pillbug itself just
    /// moved or is pinned, and the thrown piece may be the one the opponent
    /// moved last ply.
    pub(crate) fn pillbug_throws(&self, pos: CellIdx, moves: &mut Vec<Move>) {
        let empties: Vec<CellIdx> = hex::neighbors(pos)
            .iter()
            .copied()
            .filter(|&n| !self.occupied(n))
            .collect();
        if empties.is_empty() {
            return;
        }
        for &from in hex::neighbors(pos) {
            let Some(id) = self.top(from) else { continue };
            if self.piece(id).below.is_some() || self.is_pinned(id) {
                continue;
            }
            for &to in &empties {
                moves.push(Move::Relocate { from, to });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bug::Player;

    fn dests(moves: &[Move]) -> Vec<CellIdx> {
        let mut out: Vec<CellIdx> = moves
            .iter()
            .map(|mv| match mv {
                Move::Relocate { to, .. } => *to,
                other => panic!("generator produced {other}"),
            })
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    #[test]
    fn queen_slides_around_a_single_neighbor() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let queen = board.put(Player::White, BugType::Bee, a);
        board.put(Player::Black, BugType::Bee, b);
        let mut moves = Vec::new();
        board.generate_moves(queen, BugType::Bee, &mut moves);
        // Only the two cells flanking the shared edge keep hive contact.
        assert_eq!(dests(&moves), {
            let mut d = vec![hex::neighbor(a, 1), hex::neighbor(a, 3)];
            d.sort_unstable();
            d
        });
    }

    #[test]
    fn ant_reaches_the_whole_perimeter() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let ant = board.put(Player::White, BugType::Ant, a);
        board.put(Player::White, BugType::Bee, b);
        let mut moves = Vec::new();
        board.generate_moves(ant, BugType::Ant, &mut moves);
        // Every ring cell of the lone remaining piece except the origin.
        let expected: Vec<CellIdx> = {
            let mut d: Vec<CellIdx> = hex::neighbors(b).iter().copied().filter(|&c| c != a).collect();
            d.sort_unstable();
            d
        };
        assert_eq!(dests(&moves), expected);
    }

    #[test]
    fn spider_lands_exactly_three_steps_away() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let spider = board.put(Player::White, BugType::Spider, a);
        board.put(Player::White, BugType::Bee, b);
        let mut moves = Vec::new();
        board.generate_moves(spider, BugType::Spider, &mut moves);
        // Three steps around a single piece end on its far side, whether the
        // spider walks clockwise or counterclockwise.
        assert_eq!(moves, vec![Move::Relocate { from: a, to: hex::neighbor(b, 2) }]);
    }

    #[test]
    fn grasshopper_jumps_the_line() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let c = hex::neighbor(b, 2);
        let hopper = board.put(Player::White, BugType::Grasshopper, a);
        board.put(Player::White, BugType::Bee, b);
        board.put(Player::Black, BugType::Bee, c);
        let mut moves = Vec::new();
        board.generate_moves(hopper, BugType::Grasshopper, &mut moves);
        // Clears both pieces and lands on the first empty cell behind them.
        assert_eq!(moves, vec![Move::Relocate { from: a, to: hex::neighbor(c, 2) }]);
    }

    #[test]
    fn beetle_steps_and_climbs() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let beetle = board.put(Player::White, BugType::Beetle, a);
        board.put(Player::White, BugType::Bee, b);
        let mut moves = Vec::new();
        board.generate_moves(beetle, BugType::Beetle, &mut moves);
        let d = dests(&moves);
        assert_eq!(d.len(), 3);
        assert!(d.contains(&b), "beetle must be able to climb the hive");
        assert!(d.contains(&hex::neighbor(a, 1)));
        assert!(d.contains(&hex::neighbor(a, 3)));
    }

    #[test]
    fn beetle_is_gated_by_taller_flanking_stacks() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let target = hex::neighbor(a, 2);
        let gate_cw = hex::neighbor(a, 3);
        let gate_ccw = hex::neighbor(a, 1);
        let beetle = board.put(Player::White, BugType::Beetle, a);
        board.put(Player::White, BugType::Bee, target);
        board.put(Player::Black, BugType::Ant, gate_cw);
        board.put(Player::Black, BugType::Beetle, gate_cw);
        board.put(Player::Black, BugType::Ant, gate_ccw);
        board.put(Player::Black, BugType::Beetle, gate_ccw);
        let mut moves = Vec::new();
        board.generate_moves(beetle, BugType::Beetle, &mut moves);
        assert!(
            !moves.contains(&Move::Relocate { from: a, to: target }),
            "two-high gates must block a ground-level climb"
        );
        // Climbing onto one of the gate stacks themselves is still fine.
        assert!(moves.contains(&Move::Relocate { from: a, to: gate_ccw }));
    }

    #[test]
    fn ladybug_crosses_the_hive_and_drops_off() {
        let mut board = HiveBoard::new();
        let b0 = hex::START_CELL;
        let b1 = hex::neighbor(b0, 2);
        let b2 = hex::neighbor(b1, 2);
        let l = hex::neighbor(b0, 5);
        board.put(Player::White, BugType::Bee, b0);
        board.put(Player::White, BugType::Ant, b1);
        board.put(Player::Black, BugType::Bee, b2);
        let ladybug = board.put(Player::White, BugType::Ladybug, l);
        let mut moves = Vec::new();
        board.generate_moves(ladybug, BugType::Ladybug, &mut moves);
        // Over b0 then b1, down on any empty neighbor of b1.
        let expected: Vec<CellIdx> = {
            let mut d: Vec<CellIdx> = hex::neighbors(b1)
                .iter()
                .copied()
                .filter(|&c| !board.occupied(c))
                .collect();
            d.sort_unstable();
            d
        };
        assert_eq!(dests(&moves), expected);
        assert_eq!(expected.len(), 4);
    }

    #[test]
    fn mosquito_copies_its_neighbor() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let mosquito = board.put(Player::White, BugType::Mosquito, a);
        board.put(Player::White, BugType::Grasshopper, b);
        let mut moves = Vec::new();
        board.generate_moves(mosquito, BugType::Mosquito, &mut moves);
        assert_eq!(moves, vec![Move::Relocate { from: a, to: hex::neighbor(b, 2) }]);
    }

    #[test]
    fn mosquito_on_a_stack_moves_as_a_beetle() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        board.put(Player::White, BugType::Bee, a);
        board.put(Player::Black, BugType::Grasshopper, b);
        let mosquito = board.put(Player::White, BugType::Mosquito, b);
        let mut moves = Vec::new();
        board.generate_moves(mosquito, BugType::Mosquito, &mut moves);
        // From the top of a stack every neighbor is reachable.
        assert_eq!(dests(&moves).len(), 6);
    }

    #[test]
    fn pillbug_steps_and_throws() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let pillbug = board.put(Player::White, BugType::Pillbug, a);
        board.put(Player::White, BugType::Bee, b);
        let mut moves = Vec::new();
        board.generate_moves(pillbug, BugType::Pillbug, &mut moves);
        let steps: Vec<&Move> = moves
            .iter()
            .filter(|mv| matches!(mv, Move::Relocate { from, .. } if *from == a))
            .collect();
        let throws: Vec<&Move> = moves
            .iter()
            .filter(|mv| matches!(mv, Move::Relocate { from, .. } if *from == b))
            .collect();
        assert_eq!(steps.len(), 2);
        // The neighbor can be dropped on any of the pillbug's 5 empty cells.
        assert_eq!(throws.len(), 5);
        for mv in throws {
            let Move::Relocate { to, .. } = mv else { unreachable!() };
            assert!(hex::neighbors(a).contains(to));
            assert!(!board.occupied(*to));
        }
    }

    #[test]
    fn pillbug_does_not_throw_pinned_or_stacked_pieces() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let c = hex::neighbor(b, 2);
        board.put(Player::White, BugType::Pillbug, a);
        board.put(Player::White, BugType::Bee, b);
        board.put(Player::Black, BugType::Bee, c);
        // b is the middle of a chain: pinned, so it cannot be thrown.
        let mut moves = Vec::new();
        board.pillbug_throws(a, &mut moves);
        assert!(moves.is_empty());
        // Stack a beetle on b: the stack top cannot be thrown either.
        board.put(Player::Black, BugType::Beetle, b);
        moves.clear();
        board.pillbug_throws(a, &mut moves);
        assert!(moves.is_empty());
    }

    #[test]
    fn pillbug_may_throw_the_piece_the_opponent_just_moved() {
        let mut board = HiveBoard::new();
        let p = hex::START_CELL;
        let own = hex::neighbor(p, 5);
        let b = hex::neighbor(p, 2);
        board.put(Player::White, BugType::Pillbug, p);
        board.put(Player::White, BugType::Bee, own);
        let black_bee = board.put(Player::Black, BugType::Bee, b);
        board.set_last_moved(Some(black_bee));
        let throws: Vec<Move> = board
            .legal_moves()
            .into_iter()
            .filter(|mv| matches!(mv, Move::Relocate { from, .. } if *from == b))
            .collect();
        assert!(!throws.is_empty(), "throws ignore the opponent's last move");
    }

    #[test]
    fn pinned_mosquito_beside_a_pillbug_still_grants_throws() {
        let mut board = HiveBoard::new();
        let p = hex::START_CELL;
        let m = hex::neighbor(p, 2);
        let b1 = hex::neighbor(m, 2);
        let b2 = hex::neighbor(b1, 2);
        let pillbug = board.put(Player::White, BugType::Pillbug, p);
        let mosquito = board.put(Player::White, BugType::Mosquito, m);
        board.put(Player::White, BugType::Bee, b1);
        board.put(Player::Black, BugType::Bee, b2);
        assert!(board.is_pinned(mosquito));
        assert!(!board.is_pinned(pillbug));
        // The mosquito cannot move itself, but borrowing the adjacent
        // pillbug's ability it can still throw the pillbug onto one of its
        // own empty neighbors. That destination is not adjacent to the
        // pillbug, so the move can only come from the mosquito's grant.
        let granted = Move::Relocate { from: p, to: hex::neighbor(m, 1) };
        assert!(!hex::neighbors(p).contains(&hex::neighbor(m, 1)));
        let moves = board.legal_moves();
        assert!(moves.contains(&granted), "granted throw missing");
        assert!(moves
            .iter()
            .all(|mv| !matches!(mv, Move::Relocate { from, .. } if *from == m)));
    }

    #[test]
    fn last_moved_piece_cannot_move_on_its_own() {
        let mut board = HiveBoard::new();
        let a = hex::START_CELL;
        let b = hex::neighbor(a, 2);
        let c = hex::neighbor(a, 5);
        board.put(Player::White, BugType::Bee, a);
        board.put(Player::Black, BugType::Bee, b);
        let ant = board.put(Player::White, BugType::Ant, c);
        board.set_last_moved(Some(ant));
        assert!(board
            .legal_moves()
            .iter()
            .all(|mv| !matches!(mv, Move::Relocate { from, .. } if *from == c)));
        // Once a ply passes the restriction lifts.
        board.set_last_moved(None);
        assert!(board
            .legal_moves()
            .iter()
            .any(|mv| matches!(mv, Move::Relocate { from, .. } if *from == c)));
    }
}
