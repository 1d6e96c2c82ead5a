//! The B3/S23 next-generation rule.
//!
//! Boards have hard edges: coordinates outside the grid are simply skipped
//! when counting neighbors, so corner cells have 3 neighbors and other edge
//! cells have 5.

use rayon::prelude::*;

use crate::board::{Board, Cell};

/// Offsets of the 8 surrounding cells.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
];

/// Computes the next generation of `board`.
///
/// Every cell's next state is derived from the same input snapshot; the
/// result is written into fresh storage, so `board` is never observed half
/// updated. Cells are evaluated in parallel with rayon; the call blocks
/// until every cell is done.
///
/// * Fewer than two or more than three live neighbors: the cell dies
/// * A dead cell with exactly three live neighbors is born
/// * Otherwise the cell keeps its state
pub fn advance(board: &Board) -> Board {
    let (rows, cols) = (board.rows(), board.cols());
    let cells: Vec<Cell> = (0..rows * cols)
        .into_par_iter()
        .map(|index| {
            let (row, col) = (index / cols, index % cols);
            next_state(board.cell(row, col), count_neighbors(board, row, col))
        })
        .collect();
    Board::from_cells(rows, cols, cells)
}

/// Counts the live cells among the in-bounds neighbors of `(row, col)`.
///
/// # Returns
///
/// The number of live neighbors (0-8)
pub fn count_neighbors(board: &Board, row: usize, col: usize) -> u8 {
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < board.rows() && c < board.cols()).then(|| board.cell(r, c))
        })
        .filter(|cell| cell.is_alive())
        .count() as u8
}

/// Applies the life/death decision for one cell.
pub fn next_state(current: Cell, live_neighbors: u8) -> Cell {
    match (current, live_neighbors) {
        (_, n) if n < 2 || n > 3 => Cell::Dead,
        (Cell::Dead, 3) => Cell::Alive,
        (unchanged, _) => unchanged,
    }
}

/// Births and deaths between two generations of the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub births: u64,
    pub deaths: u64,
}

impl Transition {
    pub fn between(before: &Board, after: &Board) -> Transition {
        before
            .cells()
            .iter()
            .zip(after.cells())
            .fold(Transition::default(), |mut acc, (&old, &new)| {
                match (old, new) {
                    (Cell::Dead, Cell::Alive) => acc.births += 1,
                    (Cell::Alive, Cell::Dead) => acc.deaths += 1,
                    _ => {}
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn alive_cells(board: &Board) -> Vec<(usize, usize)> {
        let mut alive = Vec::new();
        for row in 0..board.rows() {
            for col in 0..board.cols() {
                if board.get(row, col).unwrap().is_alive() {
                    alive.push((row, col));
                }
            }
        }
        alive
    }

    /// Straightforward single-threaded version of the rule.
    fn advance_sequential(board: &Board) -> Board {
        let mut next = Board::new(board.rows(), board.cols()).unwrap();
        for row in 0..board.rows() {
            for col in 0..board.cols() {
                let state = next_state(board.cell(row, col), count_neighbors(board, row, col));
                if state.is_alive() {
                    next = next.toggle(row, col).unwrap();
                }
            }
        }
        next
    }

    #[test]
    fn test_next_state_table() {
        for n in 0..=8u8 {
            let from_dead = next_state(Cell::Dead, n);
            let from_alive = next_state(Cell::Alive, n);
            assert_eq!(from_dead.is_alive(), n == 3, "dead with {n}");
            assert_eq!(from_alive.is_alive(), n == 2 || n == 3, "alive with {n}");
        }
    }

    #[test]
    fn test_neighbor_count_respects_edges() {
        let full = Board::random(4, 5, 1.0).unwrap();
        assert_eq!(count_neighbors(&full, 0, 0), 3);
        assert_eq!(count_neighbors(&full, 3, 4), 3);
        assert_eq!(count_neighbors(&full, 0, 2), 5);
        assert_eq!(count_neighbors(&full, 2, 0), 5);
        assert_eq!(count_neighbors(&full, 1, 1), 8);
    }

    #[test]
    fn test_neighbor_count_excludes_self() {
        let board = Board::with_alive(3, 3, &[(1, 1)]).unwrap();
        assert_eq!(count_neighbors(&board, 1, 1), 0);
        assert_eq!(count_neighbors(&board, 0, 0), 1);
    }

    #[test]
    fn test_empty_board_is_stable() {
        for (rows, cols) in [(1, 1), (1, 7), (5, 3), (20, 15)] {
            let empty = Board::new(rows, cols).unwrap();
            assert_eq!(advance(&empty), empty);
        }
    }

    #[test]
    fn test_block_still_life() {
        let block = Board::with_alive(6, 6, &[(2, 2), (2, 3), (3, 2), (3, 3)]).unwrap();
        assert_eq!(advance(&block), block);
    }

    #[test]
    fn test_blinker_oscillates() {
        let horizontal = Board::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let vertical = Board::with_alive(5, 5, &[(1, 2), (2, 2), (3, 2)]).unwrap();

        let first = advance(&horizontal);
        assert_eq!(first, vertical);
        assert_eq!(advance(&first), horizontal);
    }

    #[test]
    fn test_corner_cell_starves() {
        let board = Board::with_alive(4, 4, &[(0, 0)]).unwrap();
        assert_eq!(advance(&board).population(), 0);
    }

    #[test]
    fn test_no_wraparound() {
        // A blinker on the left edge would wrap onto the right edge on a torus
        let board = Board::with_alive(5, 5, &[(1, 0), (2, 0), (3, 0)]).unwrap();
        assert_eq!(alive_cells(&advance(&board)), vec![(2, 0), (2, 1)]);
    }

    #[test]
    fn test_advance_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(99);
        let board = Board::random_with(&mut rng, 30, 25, 0.3).unwrap();
        assert_eq!(advance(&board), advance(&board));
        assert_eq!(advance(&board), advance_sequential(&board));
    }

    #[test]
    fn test_advance_leaves_input_untouched() {
        let board = Board::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let before = board.clone();
        let _ = advance(&board);
        assert_eq!(board, before);
    }

    #[test]
    fn test_locality() {
        let mut rng = StdRng::seed_from_u64(5);
        let board = Board::random_with(&mut rng, 12, 12, 0.35).unwrap();
        let base = advance(&board);

        for (row, col) in [(0, 0), (5, 7), (11, 3), (6, 11)] {
            let changed = advance(&board.toggle(row, col).unwrap());
            for r in 0..12usize {
                for c in 0..12usize {
                    if r.abs_diff(row) > 1 || c.abs_diff(col) > 1 {
                        assert_eq!(
                            changed.get(r, c).unwrap(),
                            base.get(r, c).unwrap(),
                            "cell ({r}, {c}) changed after toggling ({row}, {col})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_transition_counts() {
        let horizontal = Board::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let vertical = advance(&horizontal);
        assert_eq!(
            Transition::between(&horizontal, &vertical),
            Transition {
                births: 2,
                deaths: 2
            }
        );
    }
}
