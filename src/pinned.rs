//! One-hive rule enforcement.
//!
//! A piece may not move if lifting it would split the hive in two. Those
//! pieces are exactly the articulation points of the graph whose vertices
//! are occupied cells and whose edges are hex adjacency between occupied
//! cells, with one exception handled by the caller: the top of a stack of
//! two or more is always free to move, because the stack below it keeps the
//! cell occupied.
//!
//! The analysis is a full recomputation after every move. A single move can
//! restructure the graph arbitrarily, so there is nothing sound to update
//! incrementally.

use crate::bug::PieceId;
use crate::hex::{self, CellIdx, NUM_CELLS};

/// Collects into `out` every occupied cell whose removal would disconnect
/// the occupied-cell graph reachable from `root`.
///
/// Classic low-link DFS with an explicit stack: each cell gets a discovery
/// number and a low-link; a non-root cell is an articulation point when some
/// DFS child's subtree cannot reach above it, and the root is one when it
/// has more than one DFS child.
pub(crate) fn articulation_cells(
    tops: &[Option<PieceId>],
    root: CellIdx,
    out: &mut Vec<CellIdx>,
) {
    out.clear();
    debug_assert!(tops[root as usize].is_some());

    let mut num = [0u16; NUM_CELLS]; // 0 = unvisited
    let mut low = [0u16; NUM_CELLS];
    let mut parent = [CellIdx::MAX; NUM_CELLS];
    let mut flagged = [false; NUM_CELLS];

    let mut counter: u16 = 1;
    num[root as usize] = counter;
    low[root as usize] = counter;
    counter += 1;

    // (cell, next direction to explore)
    let mut stack: Vec<(CellIdx, u8)> = vec![(root, 0)];
    let mut root_children = 0u32;

    while let Some(frame) = stack.last_mut() {
        let (cell, dir) = *frame;
        if dir < 6 {
            frame.1 += 1;
            let next = hex::neighbor(cell, dir as usize);
            if tops[next as usize].is_none() {
                continue;
            }
            if num[next as usize] == 0 {
                // Tree edge: descend.
                parent[next as usize] = cell;
                num[next as usize] = counter;
                low[next as usize] = counter;
                counter += 1;
                if cell == root {
                    root_children += 1;
                }
                stack.push((next, 0));
            } else if parent[cell as usize] != next {
                // Back edge: this cell can reach an ancestor directly.
                low[cell as usize] = low[cell as usize].min(num[next as usize]);
            }
        } else {
            stack.pop();
            if let Some(&(p, _)) = stack.last() {
                low[p as usize] = low[p as usize].min(low[cell as usize]);
                if p != root
                    && low[cell as usize] >= num[p as usize]
                    && !flagged[p as usize]
                {
                    flagged[p as usize] = true;
                    out.push(p);
                }
            }
        }
    }

    if root_children > 1 {
        out.push(root);
    }
}
