use std::rc::Rc;

use crate::{GameStatusStore, LocalStore};

/// How long a round may run before the ticker stops counting, in seconds.
/// Rounds past the ceiling end through an external timeout action.
pub const DEFAULT_MAX_ROUND_SECS: u32 = 12;

/// Reports whether the page is currently hidden from the player.
pub trait ViewportVisibility {
    fn is_hidden(&self) -> bool;
}

/// Per-tick policy for the round clock. The hosting layer drives `tick` on a
/// repeating 1-second interval and drops that interval to stop the clock, so
/// no repeating callback outlives the round or the hosting view.
pub struct RoundTicker<L: LocalStore, V: ViewportVisibility> {
    status: Rc<GameStatusStore<L>>,
    visibility: V,
    max_round_secs: u32,
}

impl<L: LocalStore, V: ViewportVisibility> RoundTicker<L, V> {
    pub fn new(status: Rc<GameStatusStore<L>>, visibility: V) -> Self {
        Self::with_max_round_secs(status, visibility, DEFAULT_MAX_ROUND_SECS)
    }

    pub fn with_max_round_secs(
        status: Rc<GameStatusStore<L>>,
        visibility: V,
        max_round_secs: u32,
    ) -> Self {
        Self {
            status,
            visibility,
            max_round_secs,
        }
    }

    pub fn tick(&self) {
        // paused while hidden; the lost seconds are never fabricated back
        if self.visibility.is_hidden() {
            return;
        }
        let state = self.status.state();
        if !state.game_in_progress {
            return;
        }
        if state.current_game_time >= self.max_round_secs {
            return;
        }
        self.status.update_game_time();
    }
}
