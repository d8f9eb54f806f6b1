//! Browser adapters for the session and history stores: localStorage-backed
//! persistence, the `document.hidden` visibility probe, and the 1-second
//! round interval. Auth and the remote collection stay with the host app,
//! which injects its own `IdentityProvider`/`RemoteHistory` implementations.

pub use storage::*;
pub use timer::*;
pub use utils::*;

mod storage;
mod timer;
mod utils;

/// Hooks up the browser console logger; call once from the host app's entry
/// point before anything else logs.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("Error initializing logger");
}
