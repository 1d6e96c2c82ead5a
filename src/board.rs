//! Immutable board snapshots.
//!
//! A [`Board`] is a value: every operation that changes a cell builds a new
//! board and leaves the receiver untouched. Cell storage is shared through an
//! [`Arc`], so handing a snapshot to a renderer is cheap and the renderer can
//! never observe a grid that is still being computed.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::config::{validate_dimensions, validate_probability};
use crate::error::{LifeError, Result};

/// State of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    Alive,
    #[default]
    Dead,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    /// Returns the opposite state.
    pub fn toggled(self) -> Cell {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

/// One generation's grid of cells, stored row-major with zero-based indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Height of the board
    rows: usize,
    /// Width of the board
    cols: usize,
    /// `rows * cols` cells, row by row
    cells: Arc<[Cell]>,
}

impl Board {
    /// Creates a board with every cell dead.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidDimension`] if `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Board> {
        validate_dimensions(rows, cols)?;
        Ok(Board {
            rows,
            cols,
            cells: vec![Cell::Dead; rows * cols].into(),
        })
    }

    /// Returns an all-dead board. Same as [`Board::new`].
    pub fn clear(rows: usize, cols: usize) -> Result<Board> {
        Board::new(rows, cols)
    }

    /// Creates a board where each cell is independently alive with probability
    /// `alive_probability`, drawing from the thread-local generator.
    ///
    /// # Arguments
    ///
    /// * `rows` - The height of the board
    /// * `cols` - The width of the board
    /// * `alive_probability` - Chance of each cell being alive, within `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidDimension`] for a zero dimension and
    /// [`LifeError::InvalidProbability`] for a probability outside `[0, 1]`.
    pub fn random(rows: usize, cols: usize, alive_probability: f64) -> Result<Board> {
        Board::random_with(&mut rand::thread_rng(), rows, cols, alive_probability)
    }

    /// Like [`Board::random`] but draws from the supplied generator.
    pub fn random_with<R: Rng + ?Sized>(
        rng: &mut R,
        rows: usize,
        cols: usize,
        alive_probability: f64,
    ) -> Result<Board> {
        validate_dimensions(rows, cols)?;
        validate_probability(alive_probability)?;

        let cells: Vec<Cell> = (0..rows * cols)
            .map(|_| Cell::from(rng.gen_bool(alive_probability)))
            .collect();
        Ok(Board {
            rows,
            cols,
            cells: cells.into(),
        })
    }

    /// Creates a board where exactly the listed `(row, col)` cells are alive.
    pub fn with_alive(rows: usize, cols: usize, alive: &[(usize, usize)]) -> Result<Board> {
        let board = Board::new(rows, cols)?;
        let mut cells = board.cells.to_vec();
        for &(row, col) in alive {
            let index = board.index(row, col)?;
            cells[index] = Cell::Alive;
        }
        Ok(Board {
            cells: cells.into(),
            ..board
        })
    }

    /// Builds a board from cells computed elsewhere. The caller guarantees
    /// `cells.len() == rows * cols`.
    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Board {
        debug_assert_eq!(cells.len(), rows * cols);
        Board {
            rows,
            cols,
            cells: cells.into(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Looks up the state of cell `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::IndexOutOfBounds`] if the coordinates fall outside
    /// the board.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell> {
        Ok(self.cells[self.index(row, col)?])
    }

    /// Returns a new board with cell `(row, col)` flipped between alive and
    /// dead. `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::IndexOutOfBounds`] if the coordinates fall outside
    /// the board.
    pub fn toggle(&self, row: usize, col: usize) -> Result<Board> {
        let index = self.index(row, col)?;
        let mut cells = self.cells.to_vec();
        cells[index] = cells[index].toggled();
        Ok(Board {
            rows: self.rows,
            cols: self.cols,
            cells: cells.into(),
        })
    }

    /// Counts the living cells on the board.
    pub fn population(&self) -> u64 {
        self.cells.iter().filter(|cell| cell.is_alive()).count() as u64
    }

    /// Iterates over the board one row slice at a time.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.cols)
    }

    /// Cell lookup for coordinates already known to be in bounds.
    pub(crate) fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(LifeError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for &cell in row {
                f.write_str(if cell.is_alive() { "•" } else { " " })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_board_is_all_dead() {
        let board = Board::new(4, 6).unwrap();
        assert_eq!(board.rows(), 4);
        assert_eq!(board.cols(), 6);
        assert_eq!(board.population(), 0);
        for row in 0..4 {
            for col in 0..6 {
                assert_eq!(board.get(row, col).unwrap(), Cell::Dead);
            }
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Board::new(0, 5),
            Err(LifeError::InvalidDimension { rows: 0, cols: 5 })
        );
        assert!(Board::new(5, 0).is_err());
        assert!(Board::clear(0, 0).is_err());
        assert!(Board::random(0, 3, 0.3).is_err());
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let huge = 1usize << (usize::BITS / 2 + 1);
        let expected = LifeError::InvalidDimension {
            rows: huge,
            cols: huge,
        };
        assert_eq!(Board::new(huge, huge), Err(expected.clone()));
        assert_eq!(Board::random(huge, huge, 0.3), Err(expected.clone()));
        assert_eq!(Board::with_alive(huge, huge, &[(0, 0)]), Err(expected));
    }

    #[test]
    fn test_clear_equals_new() {
        assert_eq!(Board::clear(3, 7).unwrap(), Board::new(3, 7).unwrap());
    }

    #[test]
    fn test_toggle_does_not_mutate_input() {
        let original = Board::new(3, 3).unwrap();
        let toggled = original.toggle(1, 2).unwrap();

        assert_eq!(original.get(1, 2).unwrap(), Cell::Dead);
        assert_eq!(toggled.get(1, 2).unwrap(), Cell::Alive);
        assert_eq!(toggled.population(), 1);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::random_with(&mut rng, 5, 4, 0.5).unwrap();
        for row in 0..5 {
            for col in 0..4 {
                let back = board.toggle(row, col).unwrap().toggle(row, col).unwrap();
                assert_eq!(back, board);
            }
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::new(2, 3).unwrap();
        let expected = LifeError::IndexOutOfBounds {
            row: 2,
            col: 0,
            rows: 2,
            cols: 3,
        };
        assert_eq!(board.get(2, 0), Err(expected.clone()));
        assert_eq!(board.toggle(2, 0), Err(expected));
        assert!(board.get(0, 3).is_err());
        assert!(Board::with_alive(2, 3, &[(0, 0), (5, 5)]).is_err());
    }

    #[test]
    fn test_random_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Board::random_with(&mut rng, 6, 6, 0.0).unwrap().population(), 0);
        assert_eq!(Board::random_with(&mut rng, 6, 6, 1.0).unwrap().population(), 36);
    }

    #[test]
    fn test_random_density_is_statistical() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = Board::random_with(&mut rng, 100, 100, 0.3).unwrap();
        let density = board.population() as f64 / 10_000.0;
        assert!((0.25..0.35).contains(&density), "density was {density}");
    }

    #[test]
    fn test_random_rejects_bad_probability() {
        assert_eq!(
            Board::random(3, 3, 1.2),
            Err(LifeError::InvalidProbability(1.2))
        );
    }

    #[test]
    fn test_display_renders_rows() {
        let board = Board::with_alive(2, 3, &[(0, 0), (1, 2)]).unwrap();
        assert_eq!(board.to_string(), "•  \n  •\n");
    }
}
