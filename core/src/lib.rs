#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use history::*;
pub use rounds::*;
pub use session::*;
pub use square::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod history;
mod rounds;
mod session;
mod square;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub columns: Coord,
    pub level: Level,
}

impl BoardConfig {
    pub const MIN_COLUMNS: Coord = 3;

    pub const fn new_unchecked(columns: Coord, level: Level) -> Self {
        Self { columns, level }
    }

    pub fn new(columns: Coord, level: Level) -> Self {
        let clamped_columns = columns.max(Self::MIN_COLUMNS);
        let clamped_level = level.clamp(1, 3);
        if clamped_columns != columns || clamped_level != level {
            log::warn!(
                "Board config out of range, clamped to {} columns at level {}",
                clamped_columns,
                clamped_level
            );
        }
        Self::new_unchecked(clamped_columns, clamped_level)
    }

    pub fn for_round(round: Round) -> Self {
        Self::new_unchecked(calculate_columns(round), level_adjustment(round))
    }

    pub const fn total_squares(&self) -> SquareCount {
        mult(self.columns, self.columns)
    }

    /// Chance that a freshly drawn square is valid, before the repair passes.
    pub fn valid_probability(&self) -> f64 {
        0.15 + 0.15 * f64::from(self.level)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    squares: Array2<Square>,
    valid_count: SquareCount,
}

impl Board {
    /// Generated boards always keep at least this many valid squares.
    pub const MIN_VALID: SquareCount = 2;
    /// Generated boards always keep at least this many invalid squares.
    pub const MIN_INVALID: SquareCount = 2;

    pub fn from_valid_mask(valid_mask: Array2<bool>) -> Self {
        let dim = valid_mask.dim();
        let squares: Vec<Square> = valid_mask
            .iter()
            .enumerate()
            .map(|(id, &is_valid)| Square::new(id.try_into().unwrap(), is_valid))
            .collect();
        let squares = Array2::from_shape_vec(dim, squares).expect("mask shape is preserved");
        let valid_count = count_valid(&squares);
        Self {
            squares,
            valid_count,
        }
    }

    pub fn from_squares(squares: Array2<Square>) -> Result<Self> {
        let (x_size, y_size) = squares.dim();
        if x_size != y_size {
            return Err(GameError::InvalidBoardShape);
        }
        for (index, square) in squares.iter().enumerate() {
            if usize::from(square.id) != index {
                return Err(GameError::MisnumberedSquares);
            }
        }
        let valid_count = count_valid(&squares);
        Ok(Self {
            squares,
            valid_count,
        })
    }

    pub fn columns(&self) -> Coord {
        self.squares.dim().0.try_into().unwrap()
    }

    pub fn total_squares(&self) -> SquareCount {
        self.squares.len().try_into().unwrap()
    }

    pub fn valid_count(&self) -> SquareCount {
        self.valid_count
    }

    pub fn invalid_count(&self) -> SquareCount {
        self.total_squares() - self.valid_count
    }

    pub fn get(&self, id: SquareId) -> Option<Square> {
        if SquareCount::from(id) >= self.total_squares() {
            return None;
        }
        Some(self[square_coords(id, self.columns())])
    }

    pub(crate) fn get_mut(&mut self, id: SquareId) -> Option<&mut Square> {
        if SquareCount::from(id) >= self.total_squares() {
            return None;
        }
        let coords = square_coords(id, self.columns());
        Some(&mut self.squares[coords.to_nd_index()])
    }

    /// Squares in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Square> {
        self.squares.iter_mut()
    }
}

impl Index<Coord2> for Board {
    type Output = Square;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.squares[coords.to_nd_index()]
    }
}

fn count_valid(squares: &Array2<Square>) -> SquareCount {
    squares
        .iter()
        .filter(|square| square.is_valid)
        .count()
        .try_into()
        .unwrap()
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    NoChange,
    Marked,
    Won,
    Lost,
}

impl ClickOutcome {
    pub const fn has_update(self) -> bool {
        use ClickOutcome::*;
        match self {
            NoChange => false,
            Marked => true,
            Won => true,
            Lost => true,
        }
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}
