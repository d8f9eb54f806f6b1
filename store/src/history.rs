use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures_util::future::try_join_all;
use lampino_core::{GameResult, HistoryEntry, Round};

use crate::{
    AuthChangedFn, IdentityProvider, LocalStore, RemoteHistory, SnapshotFn, StoreError, UserId,
};

/// Local-storage key holding the serialized guest log.
pub const HISTORY_KEY: &str = "lampino:history";

/// Append-only log of round outcomes with two physical homes: a remote
/// collection for signed-in players and a serialized device-local blob for
/// guests. The backend is picked per operation from the current identity, so
/// a sign-in or sign-out mid-session takes effect immediately.
pub struct HistoryStore<R, L, I>
where
    R: RemoteHistory,
    L: LocalStore,
    I: IdentityProvider,
{
    remote: Rc<R>,
    local: Rc<L>,
    identity: Rc<I>,
    local_log: RefCell<Vec<HistoryEntry>>,
    feed: RefCell<Vec<HistoryEntry>>,
    feed_listener: RefCell<Option<Box<dyn Fn(&[HistoryEntry])>>>,
    remote_watch: RefCell<Option<R::WatchGuard>>,
    auth_watch: RefCell<Option<I::WatchGuard>>,
    self_ref: Weak<Self>,
}

impl<R, L, I> HistoryStore<R, L, I>
where
    R: RemoteHistory + 'static,
    L: LocalStore + 'static,
    I: IdentityProvider + 'static,
{
    /// Loads the guest log from device storage. Malformed content is discarded
    /// and the key erased; this never surfaces to the caller.
    pub fn new(remote: Rc<R>, local: Rc<L>, identity: Rc<I>) -> Rc<Self> {
        let local_log = load_local_log(&*local);
        Rc::new_cyclic(|self_ref| Self {
            remote,
            local,
            identity,
            local_log: RefCell::new(local_log),
            feed: RefCell::new(Vec::new()),
            feed_listener: RefCell::new(None),
            remote_watch: RefCell::new(None),
            auth_watch: RefCell::new(None),
            self_ref: self_ref.clone(),
        })
    }

    /// Records one finished round under the backend matching the current
    /// identity. Remote failures propagate without retry.
    pub async fn append_game(
        &self,
        round: Round,
        time: u32,
        total_game_time: u32,
        result: GameResult,
    ) -> Result<(), StoreError> {
        let entry = HistoryEntry {
            round,
            time,
            total_game_time,
            result,
            timestamp: now_epoch_secs(),
        };

        match self.identity.current_user() {
            Some(user) => self.remote.append(&user, &entry).await?,
            None => {
                self.local_log.borrow_mut().push(entry);
                self.persist_local_log()?;
                // while no remote watch is live, the feed mirrors the guest log
                if self.remote_watch.borrow().is_none() {
                    let log = self.local_log.borrow().clone();
                    self.replace_feed(log);
                }
            }
        }
        Ok(())
    }

    /// The guest-mode log, also used to seed the feed when no identity is
    /// present.
    pub fn get_local(&self) -> Vec<HistoryEntry> {
        self.local_log.borrow().clone()
    }

    /// Current contents of the live history view.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.feed.borrow().clone()
    }

    /// Hook for the view layer; called with the new feed after every change.
    pub fn set_feed_listener(&self, listener: impl Fn(&[HistoryEntry]) + 'static) {
        self.feed_listener.borrow_mut().replace(Box::new(listener));
    }

    /// Establishes the live history view and keeps it pointed at the backend
    /// matching the identity, re-subscribing on every sign-in or sign-out.
    pub fn subscribe(&self) {
        if self.feed.borrow().is_empty() {
            let log = self.local_log.borrow().clone();
            self.replace_feed(log);
        }

        let store = self.self_ref.clone();
        let handler: AuthChangedFn = Box::new(move |user| {
            if let Some(store) = store.upgrade() {
                store.switch_backend(user);
            }
        });
        let guard = self.identity.on_auth_state_changed(handler);
        self.auth_watch.borrow_mut().replace(guard);
    }

    /// Deletes every remote record owned by the current identity, then always
    /// clears device storage and the guest log: a later logout must not
    /// resurrect guest history that predates the clear.
    pub async fn clear(&self) -> Result<(), StoreError> {
        if let Some(user) = self.identity.current_user() {
            let entries = self.remote.entries_for(&user).await?;
            try_join_all(
                entries
                    .iter()
                    .map(|record| self.remote.delete(&record.entry_ref)),
            )
            .await?;
        }

        self.local.remove_item(HISTORY_KEY);
        self.local_log.borrow_mut().clear();
        self.replace_feed(Vec::new());
        Ok(())
    }

    fn switch_backend(&self, user: Option<UserId>) {
        // drop the previous live query before installing a replacement, so two
        // listeners never feed the view at once
        self.remote_watch.borrow_mut().take();

        match user {
            Some(user) => {
                let store = self.self_ref.clone();
                let on_snapshot: SnapshotFn = Box::new(move |entries| {
                    if let Some(store) = store.upgrade() {
                        store.replace_feed(entries);
                    }
                });
                let watch = self.remote.watch(&user, on_snapshot);
                self.remote_watch.borrow_mut().replace(watch);
            }
            None => {
                let log = self.local_log.borrow().clone();
                self.replace_feed(log);
            }
        }
    }

    fn replace_feed(&self, entries: Vec<HistoryEntry>) {
        if *self.feed.borrow() == entries {
            return;
        }
        *self.feed.borrow_mut() = entries;
        if let Some(listener) = self.feed_listener.borrow().as_ref() {
            listener(&self.feed.borrow());
        }
    }

    fn persist_local_log(&self) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&*self.local_log.borrow())?;
        self.local.set_item(HISTORY_KEY, &blob);
        Ok(())
    }
}

fn load_local_log<L: LocalStore>(local: &L) -> Vec<HistoryEntry> {
    let Some(blob) = local.get_item(HISTORY_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&blob) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("Discarding malformed stored history: {:?}", err);
            local.remove_item(HISTORY_KEY);
            Vec::new()
        }
    }
}

fn now_epoch_secs() -> i64 {
    use web_time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
