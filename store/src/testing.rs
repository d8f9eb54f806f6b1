//! In-memory stand-ins for the browser collaborators, mirroring how the real
//! backends behave: the remote fake pushes a fresh snapshot to its watchers on
//! every change, and the identity fake fires handlers on registration.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use lampino_core::HistoryEntry;

use crate::{
    AuthChangedFn, EntryRef, IdentityProvider, LocalStore, RemoteEntry, RemoteHistory, SnapshotFn,
    StoreError, UserId, ViewportVisibility,
};

#[derive(Default)]
pub(crate) struct MemoryLocal {
    items: RefCell<HashMap<String, String>>,
}

impl LocalStore for MemoryLocal {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.into(), value.into());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

type WatcherList = Rc<RefCell<Vec<(u64, UserId, SnapshotFn)>>>;

#[derive(Default)]
pub(crate) struct MemoryRemote {
    records: RefCell<Vec<(EntryRef, UserId, HistoryEntry)>>,
    watchers: WatcherList,
    next_id: Cell<u64>,
    pub(crate) fail_ops: Cell<bool>,
}

impl MemoryRemote {
    pub(crate) fn records_owned_by(&self, owner: &UserId) -> Vec<HistoryEntry> {
        self.records
            .borrow()
            .iter()
            .filter(|(_, record_owner, _)| record_owner == owner)
            .map(|(_, _, entry)| *entry)
            .collect()
    }

    pub(crate) fn active_watch_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    fn check_ops(&self, op: &str) -> Result<(), StoreError> {
        if self.fail_ops.get() {
            Err(StoreError::Remote(format!("{} rejected", op)))
        } else {
            Ok(())
        }
    }

    fn notify(&self, owner: &UserId) {
        let snapshot = self.records_owned_by(owner);
        for (_, watched_owner, on_snapshot) in self.watchers.borrow().iter() {
            if watched_owner == owner {
                on_snapshot(snapshot.clone());
            }
        }
    }
}

impl RemoteHistory for MemoryRemote {
    type WatchGuard = MemoryWatchGuard;

    async fn append(&self, owner: &UserId, entry: &HistoryEntry) -> Result<(), StoreError> {
        self.check_ops("append")?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.records
            .borrow_mut()
            .push((EntryRef(id.to_string()), owner.clone(), *entry));
        self.notify(owner);
        Ok(())
    }

    async fn entries_for(&self, owner: &UserId) -> Result<Vec<RemoteEntry>, StoreError> {
        self.check_ops("query")?;
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|(_, record_owner, _)| record_owner == owner)
            .map(|(entry_ref, _, entry)| RemoteEntry {
                entry_ref: entry_ref.clone(),
                entry: *entry,
            })
            .collect())
    }

    async fn delete(&self, entry_ref: &EntryRef) -> Result<(), StoreError> {
        self.check_ops("delete")?;
        let owner = {
            let mut records = self.records.borrow_mut();
            let position = records.iter().position(|(stored, _, _)| stored == entry_ref);
            position.map(|index| records.remove(index).1)
        };
        if let Some(owner) = owner {
            self.notify(&owner);
        }
        Ok(())
    }

    fn watch(&self, owner: &UserId, on_snapshot: SnapshotFn) -> Self::WatchGuard {
        on_snapshot(self.records_owned_by(owner));
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.watchers
            .borrow_mut()
            .push((id, owner.clone(), on_snapshot));
        MemoryWatchGuard {
            watchers: Rc::clone(&self.watchers),
            id,
        }
    }
}

pub(crate) struct MemoryWatchGuard {
    watchers: WatcherList,
    id: u64,
}

impl Drop for MemoryWatchGuard {
    fn drop(&mut self) {
        self.watchers
            .borrow_mut()
            .retain(|(watcher_id, _, _)| *watcher_id != self.id);
    }
}

type HandlerList = Rc<RefCell<Vec<(u64, AuthChangedFn)>>>;

#[derive(Default)]
pub(crate) struct FakeIdentity {
    user: RefCell<Option<UserId>>,
    handlers: HandlerList,
    next_id: Cell<u64>,
}

impl FakeIdentity {
    pub(crate) fn sign_in(&self, user: UserId) {
        *self.user.borrow_mut() = Some(user);
        self.notify();
    }

    pub(crate) fn sign_out(&self) {
        *self.user.borrow_mut() = None;
        self.notify();
    }

    fn notify(&self) {
        let user = self.user.borrow().clone();
        for (_, handler) in self.handlers.borrow_mut().iter_mut() {
            handler(user.clone());
        }
    }
}

impl IdentityProvider for FakeIdentity {
    type WatchGuard = FakeAuthGuard;

    fn current_user(&self) -> Option<UserId> {
        self.user.borrow().clone()
    }

    fn on_auth_state_changed(&self, mut handler: AuthChangedFn) -> Self::WatchGuard {
        handler(self.current_user());
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers.borrow_mut().push((id, handler));
        FakeAuthGuard {
            handlers: Rc::clone(&self.handlers),
            id,
        }
    }
}

pub(crate) struct FakeAuthGuard {
    handlers: HandlerList,
    id: u64,
}

impl Drop for FakeAuthGuard {
    fn drop(&mut self) {
        self.handlers
            .borrow_mut()
            .retain(|(handler_id, _)| *handler_id != self.id);
    }
}

#[derive(Default)]
pub(crate) struct FakeVisibility {
    pub(crate) hidden: Cell<bool>,
}

impl ViewportVisibility for Rc<FakeVisibility> {
    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}
