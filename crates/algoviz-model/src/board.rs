//! N-Queens chessboard.
//!
//! A queen is only committed when no other queen shares its row, column or
//! either diagonal. Interactive boards are limited to [`MIN_SIZE`]..=[`MAX_SIZE`].

use crate::error::{MutationError, Result};
use crate::Coord;

/// Smallest interactive board.
pub const MIN_SIZE: usize = 4;

/// Largest interactive board.
pub const MAX_SIZE: usize = 12;

/// Default board size.
pub const DEFAULT_SIZE: usize = 8;

/// Square board with queens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    size: usize,
    /// Row-major occupancy.
    queens: Vec<bool>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl Board {
    /// Create an empty `size`×`size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            queens: vec![false; size * size],
        }
    }

    /// Create an interactive board, validating the size.
    pub fn interactive(size: usize) -> Result<Self> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(MutationError::InvalidSize {
                value: size,
                min: MIN_SIZE,
                max: MAX_SIZE,
            });
        }
        Ok(Self::new(size))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn check(&self, at: Coord) -> Result<usize> {
        if at.row < self.size && at.col < self.size {
            Ok(at.row * self.size + at.col)
        } else {
            Err(MutationError::OutOfBounds(at, self.size, self.size))
        }
    }

    /// Whether a queen stands on `at`.
    pub fn has_queen(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size && self.queens[at.row * self.size + at.col]
    }

    /// Positions of all queens, row-major.
    pub fn queens(&self) -> Vec<Coord> {
        self.queens
            .iter()
            .enumerate()
            .filter(|(_, &q)| q)
            .map(|(i, _)| Coord::new(i / self.size, i % self.size))
            .collect()
    }

    /// Number of queens on the board.
    pub fn queen_count(&self) -> usize {
        self.queens.iter().filter(|&&q| q).count()
    }

    /// First queen (row-major) attacking `at`, ignoring a queen on `at` itself.
    pub fn attacker(&self, at: Coord) -> Option<Coord> {
        self.queens()
            .into_iter()
            .filter(|&q| q != at)
            .find(|q| attacks(*q, at))
    }

    /// Whether a queen could stand on `at` without being attacked.
    pub fn is_safe(&self, at: Coord) -> bool {
        self.attacker(at).is_none()
    }

    /// Place a queen if the placement is legal.
    pub fn place(&mut self, at: Coord) -> Result<()> {
        let idx = self.check(at)?;
        if let Some(attacker) = self.attacker(at) {
            return Err(MutationError::QueenConflict { at, attacker });
        }
        self.queens[idx] = true;
        Ok(())
    }

    /// Remove the queen on `at`, if any.
    pub fn remove(&mut self, at: Coord) -> Result<()> {
        let idx = self.check(at)?;
        self.queens[idx] = false;
        Ok(())
    }

    /// Click handling: remove an existing queen or place a new one.
    /// Returns whether a queen stands on `at` afterwards.
    pub fn toggle(&mut self, at: Coord) -> Result<bool> {
        if self.has_queen(at) {
            self.remove(at)?;
            Ok(false)
        } else {
            self.place(at)?;
            Ok(true)
        }
    }

    /// Remove every queen.
    pub fn clear(&mut self) {
        self.queens.fill(false);
    }

    /// `size` queens, none attacking another.
    pub fn is_solved(&self) -> bool {
        let queens = self.queens();
        queens.len() == self.size
            && queens
                .iter()
                .enumerate()
                .all(|(i, a)| queens[i + 1..].iter().all(|b| !attacks(*a, *b)))
    }
}

/// Whether queens on `a` and `b` share a row, column or diagonal.
pub fn attacks(a: Coord, b: Coord) -> bool {
    a.row == b.row || a.col == b.col || a.row.abs_diff(b.row) == a.col.abs_diff(b.col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_size_is_bounded() {
        assert!(Board::interactive(8).is_ok());
        assert_eq!(
            Board::interactive(3),
            Err(MutationError::InvalidSize { value: 3, min: 4, max: 12 })
        );
    }

    #[test]
    fn conflicting_queen_is_rejected() {
        let mut board = Board::new(4);
        board.place(Coord::new(0, 1)).unwrap();
        let err = board.place(Coord::new(1, 2)).unwrap_err();
        assert_eq!(
            err,
            MutationError::QueenConflict {
                at: Coord::new(1, 2),
                attacker: Coord::new(0, 1),
            }
        );
        assert_eq!(board.queen_count(), 1);
    }

    #[test]
    fn toggle_removes_existing_queen() {
        let mut board = Board::new(4);
        assert_eq!(board.toggle(Coord::new(2, 2)), Ok(true));
        assert_eq!(board.toggle(Coord::new(2, 2)), Ok(false));
        assert_eq!(board.queen_count(), 0);
    }

    #[test]
    fn known_solution_is_solved() {
        let mut board = Board::new(4);
        for at in [Coord::new(0, 1), Coord::new(1, 3), Coord::new(2, 0), Coord::new(3, 2)] {
            board.place(at).unwrap();
        }
        assert!(board.is_solved());
        board.clear();
        assert!(!board.is_solved());
    }

    #[test]
    fn attack_lines() {
        let c = Coord::new(2, 2);
        assert!(attacks(c, Coord::new(2, 7)));
        assert!(attacks(c, Coord::new(5, 2)));
        assert!(attacks(c, Coord::new(0, 4)));
        assert!(!attacks(c, Coord::new(0, 3)));
    }
}
