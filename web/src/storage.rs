use gloo::storage::{LocalStorage, Storage};
use lampino_store::LocalStore;

/// Device-local persistence backed by the browser's localStorage.
#[derive(Copy, Clone, Debug, Default)]
pub struct BrowserStorage;

fn raw() -> web_sys::Storage {
    LocalStorage::raw()
}

impl LocalStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        raw().get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Err(err) = raw().set_item(key, value) {
            log::error!("Could not save to local storage: {:?}", err);
        }
    }

    fn remove_item(&self, key: &str) {
        if let Err(err) = raw().remove_item(key) {
            log::error!("Could not remove from local storage: {:?}", err);
        }
    }
}
