use serde::{Deserialize, Serialize};

use crate::Round;

/// Terminal outcome of a finished round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Lose,
}

impl GameResult {
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Win)
    }
}

/// One immutable record of a finished round. Entries are append-only and are
/// never edited after being written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub round: Round,
    /// Seconds spent on this round.
    pub time: u32,
    /// Cumulative seconds across the whole session when the round ended.
    pub total_game_time: u32,
    pub result: GameResult,
    /// Client-side epoch seconds taken when the entry was recorded.
    pub timestamp: i64,
}
