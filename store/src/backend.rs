use lampino_core::HistoryEntry;

use crate::{StoreError, UserId};

/// Opaque reference to one stored remote record, used for deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRef(pub String);

/// A remote record together with the reference needed to delete it.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteEntry {
    pub entry_ref: EntryRef,
    pub entry: HistoryEntry,
}

/// Callback receiving the watched identity's full record set, in insertion
/// order, on installation and after every change.
pub type SnapshotFn = Box<dyn Fn(Vec<HistoryEntry>)>;

/// External remote persistence collaborator. Records are owned per identity;
/// ordering across identities is irrelevant since every query is
/// owner-scoped.
#[allow(async_fn_in_trait)]
pub trait RemoteHistory {
    /// Guard for a live query; dropping it tears the subscription down.
    type WatchGuard;

    async fn append(&self, owner: &UserId, entry: &HistoryEntry) -> Result<(), StoreError>;

    async fn entries_for(&self, owner: &UserId) -> Result<Vec<RemoteEntry>, StoreError>;

    async fn delete(&self, entry_ref: &EntryRef) -> Result<(), StoreError>;

    fn watch(&self, owner: &UserId, on_snapshot: SnapshotFn) -> Self::WatchGuard;
}

/// External device persistence collaborator: string values under fixed keys.
pub trait LocalStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}
