use serde::{Deserialize, Serialize};

use crate::{Coord, Level, Round};

/// Whether the grid gains a column when `round` begins. The grid grows every
/// third round (4, 7, 10) and stops growing at round 13.
pub const fn should_add_columns(round: Round) -> bool {
    round % 3 == 1 && round != 1 && round < 13
}

/// Number of columns for `round`, starting at 3 and capped at 6.
pub fn calculate_columns(round: Round) -> Coord {
    let mut columns = 3;
    for i in 1..=round {
        if should_add_columns(i) {
            columns += 1;
        }
    }
    columns
}

/// Difficulty adjustment for `round`, cycling 1, 2, 3 within each column step.
pub const fn level_adjustment(round: Round) -> Level {
    match (round % 3) as Level {
        0 => 3,
        level => level,
    }
}

/// Boards rotate on the last round of each difficulty step.
pub const fn is_rotated(round: Round) -> bool {
    round % 3 == 0
}

/// Everything the view layer needs to lay out one round.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundDescriptor {
    pub round: Round,
    pub columns: Coord,
    pub rotated: bool,
}

impl RoundDescriptor {
    pub fn for_round(round: Round) -> Self {
        let round = round.max(1);
        Self {
            round,
            columns: calculate_columns(round),
            rotated: is_rotated(round),
        }
    }
}
