use std::collections::BTreeMap;

use crate::JournalError;

/// String key-value persistence (browser `localStorage` in production).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: BTreeMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::KeyValueStore;
    use crate::JournalError;

    /// `window.localStorage`, resolved on every access so a storage that
    /// disappears mid-session surfaces as an error instead of a panic.
    #[derive(Debug)]
    pub struct LocalStorageStore {
        _private: (),
    }

    impl LocalStorageStore {
        pub fn new() -> Result<Self, JournalError> {
            window_local_storage()?;
            Ok(Self { _private: () })
        }
    }

    impl KeyValueStore for LocalStorageStore {
        fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
            window_local_storage()?
                .get_item(key)
                .map_err(|e| JournalError::Io(format!("get_item({key}) failed: {:?}", e)))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
            window_local_storage()?
                .set_item(key, value)
                .map_err(|e| JournalError::Io(format!("set_item({key}) failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, JournalError> {
        let win = web_sys::window().ok_or(JournalError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| JournalError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(JournalError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageStore {
    pub fn new() -> Result<Self, JournalError> {
        Err(JournalError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, _key: &str) -> Result<Option<String>, JournalError> {
        Err(JournalError::StorageUnavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), JournalError> {
        Err(JournalError::StorageUnavailable)
    }
}
