use std::rc::Rc;

use gloo::timers::callback::Interval;
use lampino_store::{LocalStore, RoundTicker, ViewportVisibility};

/// Visibility probe backed by `document.hidden`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DocumentVisibility;

impl ViewportVisibility for DocumentVisibility {
    fn is_hidden(&self) -> bool {
        gloo::utils::document().hidden()
    }
}

/// Drives the round clock once per second. Dropping the returned interval
/// cancels it, so no tick callback outlives the hosting view.
pub fn start_round_ticker<L, V>(ticker: Rc<RoundTicker<L, V>>) -> Interval
where
    L: LocalStore + 'static,
    V: ViewportVisibility + 'static,
{
    Interval::new(1_000, move || ticker.tick())
}
