use journal::{InMemoryStore, JournalError, KeyValueStore, LocalStorageStore};

/// `localStorage` when the browser offers it, otherwise a session-only map.
#[derive(Debug)]
pub(crate) enum ExplorerStore {
    Local(LocalStorageStore),
    Memory(InMemoryStore),
}

impl ExplorerStore {
    pub(crate) fn new() -> Self {
        match LocalStorageStore::new() {
            Ok(s) => ExplorerStore::Local(s),
            Err(err) => {
                tracing::warn!(error = %err, "notes and history will not outlive this page");
                ExplorerStore::Memory(InMemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for ExplorerStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        match self {
            ExplorerStore::Local(s) => s.get(key),
            ExplorerStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        match self {
            ExplorerStore::Local(s) => s.set(key, value),
            ExplorerStore::Memory(s) => s.set(key, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn falls_back_to_memory_off_browser() {
        let mut store = ExplorerStore::new();
        assert!(matches!(store, ExplorerStore::Memory(_)));
        store.set("odyssey-history", "[\"A\"]").unwrap();
        assert_eq!(
            store.get("odyssey-history").unwrap().as_deref(),
            Some("[\"A\"]")
        );
    }
}
