use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque id of an authenticated player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Callback invoked with the new identity on every sign-in or sign-out.
pub type AuthChangedFn = Box<dyn FnMut(Option<UserId>)>;

/// External auth collaborator: instantaneous identity reads plus a change
/// stream. Identity is read fresh per store operation, never cached.
pub trait IdentityProvider {
    /// Guard for an installed handler; dropping it detaches the handler.
    type WatchGuard;

    fn current_user(&self) -> Option<UserId>;

    /// Installs `handler` and fires it once with the current identity before
    /// any change is delivered, mirroring the browser auth SDKs.
    fn on_auth_state_changed(&self, handler: AuthChangedFn) -> Self::WatchGuard;
}
