use std::cell::RefCell;
use std::rc::Rc;

use lampino_core::{BoardEngine, GameResult, MarkOutcome, SessionState};

use crate::{HistoryStore, IdentityProvider, LocalStore, RemoteHistory, StoreError};

/// Local-storage key holding the serialized session state.
pub const SESSION_KEY: &str = "lampino:session";

/// Durable wrapper around [`SessionState`]. Every mutation is written back to
/// device storage so a reload resumes at the same round.
pub struct GameStatusStore<L: LocalStore> {
    local: Rc<L>,
    state: RefCell<SessionState>,
}

impl<L: LocalStore> GameStatusStore<L> {
    pub fn new(local: Rc<L>) -> Self {
        let state = load_session(&*local);
        Self {
            local,
            state: RefCell::new(state),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn start_game(&self) {
        self.mutate(SessionState::start_game);
    }

    /// Called once per visible second by the round ticker.
    pub fn update_game_time(&self) {
        self.mutate(SessionState::update_game_time);
    }

    pub fn advance_round(&self) {
        self.mutate(SessionState::advance_round);
    }

    pub fn restart(&self) {
        self.mutate(SessionState::restart);
    }

    /// Flips the board out of preview into play and starts the round clock.
    pub fn hide_preview_and_start(&self, engine: &mut BoardEngine) -> MarkOutcome {
        let outcome = engine.hide_preview();
        if outcome.has_update() {
            self.start_game();
        }
        outcome
    }

    /// Finalizes the round, then forwards `(round, time, total, result)` to the
    /// history store and awaits the write. The in-progress flag is not rolled
    /// back when the append fails; finalization and durability are decoupled
    /// so a failed write never blocks the player.
    pub async fn end_game<R, L2, I>(
        &self,
        result: GameResult,
        history: &HistoryStore<R, L2, I>,
    ) -> Result<(), StoreError>
    where
        R: RemoteHistory + 'static,
        L2: LocalStore + 'static,
        I: IdentityProvider + 'static,
    {
        self.mutate(SessionState::end_game);
        let state = self.state();
        history
            .append_game(
                state.round,
                state.current_game_time,
                state.total_game_time,
                result,
            )
            .await
    }

    fn mutate(&self, op: impl FnOnce(&mut SessionState)) {
        op(&mut self.state.borrow_mut());
        self.persist();
    }

    fn persist(&self) {
        match serde_json::to_string(&*self.state.borrow()) {
            Ok(blob) => self.local.set_item(SESSION_KEY, &blob),
            Err(err) => log::error!("Could not save session state to local storage: {:?}", err),
        }
    }
}

fn load_session<L: LocalStore>(local: &L) -> SessionState {
    let Some(blob) = local.get_item(SESSION_KEY) else {
        return SessionState::default();
    };
    match serde_json::from_str(&blob) {
        Ok(state) => state,
        Err(err) => {
            log::warn!("Discarding malformed stored session: {:?}", err);
            local.remove_item(SESSION_KEY);
            SessionState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::FutureExt;
    use lampino_core::{Board, BoardPhase, GameResult};
    use ndarray::Array2;

    use super::*;
    use crate::testing::*;
    use crate::{HISTORY_KEY, UserId};

    fn status() -> (Rc<MemoryLocal>, GameStatusStore<MemoryLocal>) {
        let local = Rc::new(MemoryLocal::default());
        let status = GameStatusStore::new(Rc::clone(&local));
        (local, status)
    }

    fn history(
        local: &Rc<MemoryLocal>,
    ) -> (
        Rc<MemoryRemote>,
        Rc<FakeIdentity>,
        Rc<HistoryStore<MemoryRemote, MemoryLocal, FakeIdentity>>,
    ) {
        let remote = Rc::new(MemoryRemote::default());
        let identity = Rc::new(FakeIdentity::default());
        let store = HistoryStore::new(
            Rc::clone(&remote),
            Rc::clone(local),
            Rc::clone(&identity),
        );
        (remote, identity, store)
    }

    #[test]
    fn state_survives_a_reload() {
        let (local, status) = status();
        status.start_game();
        status.update_game_time();
        status.advance_round();

        let reloaded = GameStatusStore::new(Rc::clone(&local));
        assert_eq!(reloaded.state(), status.state());
        assert_eq!(reloaded.state().round, 2);
        assert_eq!(reloaded.state().total_game_time, 1);
    }

    #[test]
    fn malformed_session_blob_resets_to_defaults() {
        let local = Rc::new(MemoryLocal::default());
        local.set_item(SESSION_KEY, "!!");

        let status = GameStatusStore::new(Rc::clone(&local));

        assert_eq!(status.state(), SessionState::default());
        assert!(local.get_item(SESSION_KEY).is_none());
    }

    #[test]
    fn end_game_forwards_the_session_values_at_call_time() {
        let (local, status) = status();
        let (_, _, history) = history(&local);

        status.start_game();
        for _ in 0..8 {
            status.update_game_time();
        }
        // earlier rounds already on the clock
        for _ in 0..34 {
            status.mutate(|state| state.total_game_time += 1);
        }
        status.mutate(|state| state.round = 5);

        status
            .end_game(GameResult::Lose, &history)
            .now_or_never()
            .unwrap()
            .unwrap();

        assert!(!status.state().game_in_progress);
        let log = history.get_local();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].round, 5);
        assert_eq!(log[0].time, 8);
        assert_eq!(log[0].total_game_time, 42);
        assert_eq!(log[0].result, GameResult::Lose);
    }

    #[test]
    fn end_game_appends_exactly_once() {
        let (local, status) = status();
        let (_, _, history) = history(&local);

        status.start_game();
        status
            .end_game(GameResult::Win, &history)
            .now_or_never()
            .unwrap()
            .unwrap();

        assert_eq!(history.get_local().len(), 1);
        let blob = local.get_item(HISTORY_KEY).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn end_game_stays_finalized_when_the_append_fails() {
        let (local, status) = status();
        let (remote, identity, history) = history(&local);
        identity.sign_in(UserId::from("player-1"));
        remote.fail_ops.set(true);

        status.start_game();
        let result = status
            .end_game(GameResult::Win, &history)
            .now_or_never()
            .unwrap();

        assert!(matches!(result, Err(StoreError::Remote(_))));
        assert!(!status.state().game_in_progress);
    }

    #[test]
    fn hiding_the_preview_starts_the_round_clock() {
        let (_, status) = status();
        let mask: Array2<bool> = Array2::from_shape_fn((3, 3), |(x, y)| x == 0 && y < 2);
        let mut engine = BoardEngine::new(Board::from_valid_mask(mask));
        engine.preview_reveal();

        let outcome = status.hide_preview_and_start(&mut engine);

        assert!(outcome.has_update());
        assert_eq!(engine.phase(), BoardPhase::Interactive);
        assert!(status.state().game_in_progress);
        assert_eq!(status.state().current_game_time, 0);

        // a finished board never restarts the clock
        engine.handle_click(8);
        status.mutate(SessionState::end_game);
        let outcome = status.hide_preview_and_start(&mut engine);
        assert!(!outcome.has_update());
        assert!(!status.state().game_in_progress);
    }
}
