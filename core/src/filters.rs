//! Saved filter catalog
//!
//! CRUD for user-named filter expressions scoped per collection, held in
//! memory and written through to a persistence backend on every mutation.
//! The whole catalog is serialized on each write; there are no partial
//! updates and no transactions.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use keyloom_common::error::{KeyloomError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A user-named filter expression scoped to one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    pub filter: String,
}

/// Persisted form: collection id -> filters. No version field.
type FilterMap = HashMap<String, Vec<SavedFilter>>;

/// Persistence capability for the saved filter catalog.
pub trait FilterBackend: Send + Sync {
    /// Read the persisted payload, `None` when nothing was persisted yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the persisted payload.
    fn store(&self, payload: &str) -> Result<()>;
}

/// Backend persisting to `<data_dir>/saved_filters.json`.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("saved_filters.json"),
        }
    }
}

impl FilterBackend for FileBackend {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeyloomError::Io(format!(
                "Failed to read filter file: {}",
                e
            ))),
        }
    }

    fn store(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| KeyloomError::Storage(format!("Failed to write filter file: {}", e)))?;
        file.write_all(payload.as_bytes())
            .map_err(|e| KeyloomError::Storage(format!("Failed to write filter file: {}", e)))?;
        file.sync_all()
            .map_err(|e| KeyloomError::Storage(format!("Failed to sync filter file: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| KeyloomError::Storage(format!("Failed to rename filter file: {}", e)))?;

        Ok(())
    }
}

/// In-memory catalog of saved filters with write-through persistence.
///
/// Persistence failures are logged and swallowed: the in-memory state stays
/// authoritative for the life of the process and no error reaches callers.
pub struct SavedFilterStore {
    filters: RwLock<FilterMap>,
    backend: Box<dyn FilterBackend>,
}

impl SavedFilterStore {
    /// Build the store, reading whatever the backend has persisted.
    /// Unreadable or malformed payloads degrade to an empty catalog.
    pub fn new(backend: Box<dyn FilterBackend>) -> Self {
        let filters = match backend.load() {
            Ok(Some(payload)) => match serde_json::from_str::<FilterMap>(&payload) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("Discarding malformed saved filters: {}", e);
                    FilterMap::new()
                }
            },
            Ok(None) => FilterMap::new(),
            Err(e) => {
                tracing::warn!("Failed to load saved filters: {}", e);
                FilterMap::new()
            }
        };

        Self {
            filters: RwLock::new(filters),
            backend,
        }
    }

    /// The filters saved for a collection, empty when there are none.
    pub fn saved_filters(&self, collection_id: &str) -> Vec<SavedFilter> {
        self.filters
            .read()
            .get(collection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Create a new saved filter with a generated id. Name and filter are
    /// stored trimmed.
    pub fn add(&self, collection_id: &str, name: &str, filter: &str) -> SavedFilter {
        let entry = SavedFilter {
            id: generate_id(),
            name: name.trim().to_string(),
            filter: filter.trim().to_string(),
        };

        {
            let mut filters = self.filters.write();
            filters
                .entry(collection_id.to_string())
                .or_default()
                .push(entry.clone());
        }

        self.persist();
        entry
    }

    /// Drop the filter with the given id. A collection whose list becomes
    /// empty is removed from the catalog entirely.
    pub fn remove(&self, collection_id: &str, filter_id: &str) {
        {
            let mut filters = self.filters.write();
            if let Some(list) = filters.get_mut(collection_id) {
                list.retain(|f| f.id != filter_id);
                if list.is_empty() {
                    filters.remove(collection_id);
                }
            }
        }

        self.persist();
    }

    /// Replace name and filter of an existing entry, keeping its id. The
    /// catalog is written through even when the id did not match, so the
    /// persisted form always reflects the in-memory state.
    pub fn update(&self, collection_id: &str, filter_id: &str, name: &str, filter: &str) {
        {
            let mut filters = self.filters.write();
            if let Some(entry) = filters
                .get_mut(collection_id)
                .and_then(|list| list.iter_mut().find(|f| f.id == filter_id))
            {
                entry.name = name.trim().to_string();
                entry.filter = filter.trim().to_string();
            }
        }

        self.persist();
    }

    fn persist(&self) {
        let payload = {
            let filters = self.filters.read();
            match serde_json::to_string(&*filters) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Failed to serialize saved filters: {}", e);
                    return;
                }
            }
        };

        if let Err(e) = self.backend.store(&payload) {
            tracing::warn!("Failed to persist saved filters: {}", e);
        }
    }
}

/// Generated ids concatenate a base-36 millisecond timestamp with a base-36
/// random fragment. Collision-resistant within one process, not
/// cryptographic.
fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u128;
    let entropy = u128::from(uuid::Uuid::new_v4().as_u128() as u32);
    format!("{}{}", to_base36(millis), to_base36(entropy))
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }

    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Shared in-memory backend so tests can inspect what was persisted.
    #[derive(Clone, Default)]
    struct MemoryBackend {
        payload: Arc<Mutex<Option<String>>>,
        writes: Arc<AtomicUsize>,
    }

    impl MemoryBackend {
        fn persisted(&self) -> Option<serde_json::Value> {
            self.payload
                .lock()
                .as_deref()
                .map(|p| serde_json::from_str(p).unwrap())
        }
    }

    impl FilterBackend for MemoryBackend {
        fn load(&self) -> Result<Option<String>> {
            Ok(self.payload.lock().clone())
        }

        fn store(&self, payload: &str) -> Result<()> {
            *self.payload.lock() = Some(payload.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingBackend;

    impl FilterBackend for FailingBackend {
        fn load(&self) -> Result<Option<String>> {
            Err(KeyloomError::Io("disk on fire".into()))
        }

        fn store(&self, _payload: &str) -> Result<()> {
            Err(KeyloomError::Storage("disk still on fire".into()))
        }
    }

    #[test]
    fn add_trims_and_assigns_an_id() {
        let store = SavedFilterStore::new(Box::new(MemoryBackend::default()));

        store.add("c1", " Name ", " status=1 ");

        let filters = store.saved_filters("c1");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "Name");
        assert_eq!(filters[0].filter, "status=1");
        assert!(!filters[0].id.is_empty());
    }

    #[test]
    fn removing_the_last_filter_drops_the_collection_key() {
        let backend = MemoryBackend::default();
        let store = SavedFilterStore::new(Box::new(backend.clone()));

        let entry = store.add("c1", "mine", "status=1");
        store.remove("c1", &entry.id);

        assert_eq!(store.saved_filters("c1"), Vec::new());
        let persisted = backend.persisted().unwrap();
        assert!(persisted.as_object().unwrap().get("c1").is_none());
    }

    #[test]
    fn remove_with_unknown_id_keeps_the_other_entries() {
        let store = SavedFilterStore::new(Box::new(MemoryBackend::default()));

        store.add("c1", "mine", "status=1");
        store.remove("c1", "no-such-id");

        assert_eq!(store.saved_filters("c1").len(), 1);
    }

    #[test]
    fn update_preserves_the_id() {
        let store = SavedFilterStore::new(Box::new(MemoryBackend::default()));

        let entry = store.add("c1", "old", "x=1");
        store.update("c1", &entry.id, " New ", " x=2 ");

        let filters = store.saved_filters("c1");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].id, entry.id);
        assert_eq!(filters[0].name, "New");
        assert_eq!(filters[0].filter, "x=2");
    }

    #[test]
    fn update_with_unknown_id_still_writes_through() {
        let backend = MemoryBackend::default();
        let store = SavedFilterStore::new(Box::new(backend.clone()));

        store.add("c1", "mine", "status=1");
        let writes_before = backend.writes.load(Ordering::SeqCst);

        store.update("c1", "no-such-id", "New", "x=2");

        assert_eq!(backend.writes.load(Ordering::SeqCst), writes_before + 1);
        assert_eq!(store.saved_filters("c1")[0].name, "mine");
    }

    #[test]
    fn catalog_round_trips_through_the_file_backend() {
        let dir = tempdir().unwrap();

        let first = SavedFilterStore::new(Box::new(FileBackend::new(dir.path())));
        first.add("c1", "mine", "status=1");
        first.add("c2", "drafts", "published=false");
        let expected_c1 = first.saved_filters("c1");
        let expected_c2 = first.saved_filters("c2");
        drop(first);

        let second = SavedFilterStore::new(Box::new(FileBackend::new(dir.path())));
        assert_eq!(second.saved_filters("c1"), expected_c1);
        assert_eq!(second.saved_filters("c2"), expected_c2);
    }

    #[test]
    fn malformed_persisted_payload_loads_as_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("saved_filters.json"), "{not json").unwrap();

        let store = SavedFilterStore::new(Box::new(FileBackend::new(dir.path())));
        assert!(store.saved_filters("c1").is_empty());
    }

    #[test]
    fn backend_failures_degrade_to_memory_only() {
        let store = SavedFilterStore::new(Box::new(FailingBackend));

        store.add("c1", "mine", "status=1");

        assert_eq!(store.saved_filters("c1").len(), 1);
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(generate_id(), generate_id());
    }
}
