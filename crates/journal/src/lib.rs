//! Browser-persisted user state: highlight notes and click history.
//!
//! Both live as whole JSON blobs under fixed keys of a string key-value
//! store. Every mutation rewrites the full blob; a blob that fails to parse
//! is treated as empty.

pub mod annotations;
pub mod highlight;
pub mod history;
pub mod store;

pub use annotations::{AnnotationSet, Annotations};
pub use highlight::{apply_annotations, highlight_first};
pub use history::History;
pub use store::{InMemoryStore, KeyValueStore, LocalStorageStore};

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("browser storage unavailable")]
    StorageUnavailable,
    #[error("journal storage error: {0}")]
    Io(String),
    #[error("journal value under `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode journal value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage keys for the two persisted blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalKeys {
    pub notes: String,
    pub history: String,
}

impl Default for JournalKeys {
    fn default() -> Self {
        Self {
            notes: "odyssey-notes".to_string(),
            history: "odyssey-history".to_string(),
        }
    }
}

/// Annotations and history bound to the store they persist into.
#[derive(Debug)]
pub struct Journal<S> {
    store: S,
    keys: JournalKeys,
    annotations: Annotations,
    history: History,
}

impl<S: KeyValueStore> Journal<S> {
    /// Restores both blobs. Missing, unreadable or corrupt values start empty.
    pub fn open(store: S, keys: JournalKeys) -> Self {
        let annotations = restore_or_default(&store, &keys.notes);
        let history = restore_or_default(&store, &keys.history);
        Self {
            store,
            keys,
            annotations,
            history,
        }
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Adds (or overwrites) a note and persists the whole annotation blob.
    pub fn add_note(
        &mut self,
        entity: &str,
        highlight: &str,
        note: &str,
    ) -> Result<(), JournalError> {
        self.annotations.add(entity, highlight, note);
        write_json(&mut self.store, &self.keys.notes, &self.annotations)
    }

    /// Appends an opened entity and persists the whole history.
    pub fn record_visit(&mut self, entity: &str) -> Result<(), JournalError> {
        self.history.push(entity);
        write_json(&mut self.store, &self.keys.history, &self.history)
    }
}

/// Reads a JSON blob. An absent, blank or `null` value reads as `None`.
pub fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, JournalError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| JournalError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub fn write_json<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), JournalError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

fn restore_or_default<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> T {
    match read_json(store, key) {
        Ok(v) => v.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(%key, error = %err, "discarding unreadable journal value");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn notes_survive_a_reload() {
        let mut journal = Journal::open(InMemoryStore::new(), JournalKeys::default());
        journal.add_note("Acme", "anvils", "heavy").unwrap();
        journal.add_note("Acme", "rockets", "faulty").unwrap();
        journal.add_note("Globex", "Company X", "merger").unwrap();

        let before = journal.annotations().clone();
        let reloaded = Journal::open(journal.store.clone(), JournalKeys::default());
        assert_eq!(reloaded.annotations(), &before);
        assert_eq!(reloaded.annotations().note("Acme", "rockets"), Some("faulty"));
    }

    #[test]
    fn history_survives_a_reload() {
        let mut journal = Journal::open(InMemoryStore::new(), JournalKeys::default());
        for name in ["A", "B", "A"] {
            journal.record_visit(name).unwrap();
        }
        let reloaded = Journal::open(journal.store.clone(), JournalKeys::default());
        assert_eq!(reloaded.history().names(), ["A", "B", "A"]);
    }

    #[test]
    fn corrupt_blobs_fail_soft() {
        let mut store = InMemoryStore::new();
        store.set("odyssey-notes", "{not json").unwrap();
        store.set("odyssey-history", "null").unwrap();
        let journal = Journal::open(store, JournalKeys::default());
        assert!(journal.annotations().is_empty());
        assert!(journal.history().is_empty());
    }

    #[test]
    fn read_json_reports_corruption() {
        let mut store = InMemoryStore::new();
        store.set("k", "[1,").unwrap();
        let err = read_json::<Vec<u32>>(&store, "k").unwrap_err();
        assert!(matches!(err, JournalError::Corrupt { .. }));
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, JournalError> {
            Err(JournalError::StorageUnavailable)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), JournalError> {
            Err(JournalError::StorageUnavailable)
        }
    }

    #[test]
    fn unavailable_storage_opens_empty_and_reports_writes() {
        let mut journal = Journal::open(BrokenStore, JournalKeys::default());
        assert!(journal.history().is_empty());
        assert!(journal.record_visit("A").is_err());
        // The in-memory view still reflects the mutation.
        assert_eq!(journal.history().names(), ["A"]);
    }
}
