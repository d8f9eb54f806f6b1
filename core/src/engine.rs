use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> Preview
/// - Idle | Preview -> Interactive
/// - Interactive -> Won
/// - Interactive -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardPhase {
    /// Fresh board, nothing shown yet
    Idle,
    /// Every square is revealed so the player can memorize the valid ones
    Preview,
    /// Squares are hidden again and clicks are accepted
    Interactive,
    /// Round ended and the player won
    Won,
    /// Round ended and the player lost
    Lost,
}

impl BoardPhase {
    pub const fn accepts_clicks(self) -> bool {
        matches!(self, Self::Interactive)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for BoardPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Drives one round's board from preview through play to its terminal outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardEngine {
    board: Board,
    phase: BoardPhase,
}

impl BoardEngine {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            phase: Default::default(),
        }
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> Coord {
        self.board.columns()
    }

    pub fn total_squares(&self) -> SquareCount {
        self.board.total_squares()
    }

    pub fn valid_count(&self) -> SquareCount {
        self.board.valid_count()
    }

    /// How many valid squares are currently marked clicked (all of them in preview).
    pub fn clicked_valid_count(&self) -> SquareCount {
        self.board
            .iter()
            .filter(|square| square.is_clicked && square.is_valid)
            .count()
            .try_into()
            .unwrap()
    }

    pub fn square_at(&self, id: SquareId) -> Option<Square> {
        self.board.get(id)
    }

    /// Reveals every square so the player can memorize the valid ones. Not
    /// player input; clicks stay disabled.
    pub fn preview_reveal(&mut self) -> MarkOutcome {
        use MarkOutcome::*;

        if !matches!(self.phase, BoardPhase::Idle | BoardPhase::Preview) {
            return NoChange;
        }

        let mut changed = matches!(self.phase, BoardPhase::Idle);
        for square in self.board.iter_mut() {
            if !square.is_clicked {
                square.is_clicked = true;
                changed = true;
            }
        }
        self.phase = BoardPhase::Preview;

        if changed { Changed } else { NoChange }
    }

    /// Hides the preview and opens the board for play. The caller starts the
    /// round clock when this reports a change.
    pub fn hide_preview(&mut self) -> MarkOutcome {
        use MarkOutcome::*;

        if !matches!(self.phase, BoardPhase::Idle | BoardPhase::Preview) {
            return NoChange;
        }

        for square in self.board.iter_mut() {
            square.is_clicked = false;
        }
        self.phase = BoardPhase::Interactive;
        Changed
    }

    /// Marks a square clicked and evaluates the round. Clicks outside the
    /// interactive phase, on unknown ids, or on already-clicked squares are
    /// stale view events and change nothing.
    pub fn handle_click(&mut self, id: SquareId) -> ClickOutcome {
        use ClickOutcome::*;

        if !self.phase.accepts_clicks() {
            return NoChange;
        }
        let Some(square) = self.board.get_mut(id) else {
            return NoChange;
        };
        if square.is_clicked {
            return NoChange;
        }
        square.is_clicked = true;

        if self.is_lost() {
            self.phase = BoardPhase::Lost;
            Lost
        } else if self.is_won() {
            self.phase = BoardPhase::Won;
            Won
        } else {
            Marked
        }
    }

    fn is_lost(&self) -> bool {
        self.board
            .iter()
            .any(|square| square.is_clicked && !square.is_valid)
    }

    fn is_won(&self) -> bool {
        !self
            .board
            .iter()
            .any(|square| square.is_valid && !square.is_clicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use ndarray::Array2;

    fn board(columns: Coord, valid_ids: &[SquareId]) -> Board {
        let columns = usize::from(columns);
        let mut mask: Array2<bool> = Array2::default((columns, columns));
        for (id, is_valid) in mask.iter_mut().enumerate() {
            *is_valid = valid_ids.contains(&(id as SquareId));
        }
        Board::from_valid_mask(mask)
    }

    fn interactive_engine(columns: Coord, valid_ids: &[SquareId]) -> BoardEngine {
        let mut engine = BoardEngine::new(board(columns, valid_ids));
        engine.preview_reveal();
        engine.hide_preview();
        engine
    }

    #[test]
    fn preview_then_hide_round_trips_clicks_and_enables_play() {
        let mut engine = BoardEngine::new(board(3, &[0, 1]));
        assert!(!engine.phase().accepts_clicks());

        assert_eq!(engine.preview_reveal(), MarkOutcome::Changed);
        assert_eq!(engine.phase(), BoardPhase::Preview);
        assert!(engine.board().iter().all(|square| square.is_clicked));
        assert_eq!(engine.clicked_valid_count(), 2);

        assert_eq!(engine.hide_preview(), MarkOutcome::Changed);
        assert_eq!(engine.phase(), BoardPhase::Interactive);
        assert!(engine.board().iter().all(|square| !square.is_clicked));
        assert!(engine.phase().accepts_clicks());
    }

    #[test]
    fn clicks_are_ignored_before_the_board_is_interactive() {
        let mut engine = BoardEngine::new(board(3, &[0, 1]));
        assert_eq!(engine.handle_click(2), ClickOutcome::NoChange);

        engine.preview_reveal();
        assert_eq!(engine.handle_click(2), ClickOutcome::NoChange);
        assert_eq!(engine.phase(), BoardPhase::Preview);
    }

    #[test]
    fn unknown_square_ids_are_ignored() {
        let mut engine = interactive_engine(3, &[0, 1]);
        assert_eq!(engine.handle_click(9), ClickOutcome::NoChange);
        assert_eq!(engine.handle_click(SquareId::MAX), ClickOutcome::NoChange);
        assert_eq!(engine.phase(), BoardPhase::Interactive);
    }

    #[test]
    fn clicking_an_invalid_square_loses_and_is_terminal() {
        let mut engine = interactive_engine(3, &[0, 1]);

        assert_eq!(engine.handle_click(2), ClickOutcome::Lost);
        assert_eq!(engine.phase(), BoardPhase::Lost);
        assert!(engine.is_finished());

        // nothing moves the board out of its terminal state
        assert_eq!(engine.handle_click(0), ClickOutcome::NoChange);
        assert_eq!(engine.preview_reveal(), MarkOutcome::NoChange);
        assert_eq!(engine.hide_preview(), MarkOutcome::NoChange);
    }

    #[test]
    fn win_fires_on_the_last_valid_square_and_not_before() {
        let mut engine = interactive_engine(3, &[0, 4, 8]);

        assert_eq!(engine.handle_click(0), ClickOutcome::Marked);
        assert_eq!(engine.handle_click(4), ClickOutcome::Marked);
        assert_eq!(engine.handle_click(8), ClickOutcome::Won);
        assert_eq!(engine.phase(), BoardPhase::Won);
    }

    #[test]
    fn clicked_squares_stay_clicked() {
        let mut engine = interactive_engine(3, &[0, 1]);

        assert_eq!(engine.handle_click(0), ClickOutcome::Marked);
        assert_eq!(engine.handle_click(0), ClickOutcome::NoChange);
        assert!(engine.square_at(0).unwrap().is_clicked);

        let clicked: Vec<_> = engine
            .board()
            .iter()
            .filter(|square| square.is_clicked)
            .map(|square| square.id)
            .collect();
        assert_eq!(clicked, [0]);
    }

    #[test]
    fn smallest_grid_scenario_loses_on_an_invalid_click() {
        // squares 0 and 1 valid, 2..=8 invalid
        let mut engine = interactive_engine(3, &[0, 1]);
        assert_eq!(engine.handle_click(2), ClickOutcome::Lost);
    }
}
