use serde::{Deserialize, Serialize};

use crate::SquareId;

/// One cell of the round grid as the player sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub id: SquareId,
    pub is_valid: bool,
    pub is_clicked: bool,
}

impl Square {
    pub const fn new(id: SquareId, is_valid: bool) -> Self {
        Self {
            id,
            is_valid,
            is_clicked: false,
        }
    }
}
