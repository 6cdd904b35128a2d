//! Key-value persistence of the event store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{AgendaError, AgendaResult};
use crate::store::EventStore;
use crate::types::STORAGE_KEY;

/// String store addressed by fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> AgendaResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AgendaResult<()>;
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug)]
pub struct FileStore {
    pub data_dir: PathBuf,
}

impl FileStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> AgendaResult<Self> {
        fs::create_dir_all(data_dir)?;
        info!(data_dir = %data_dir.display(), "opened file store");
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> AgendaResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(file = %path.display(), "no stored value");
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&self, key: &str, value: &str) -> AgendaResult<()> {
        let path = self.path_for(key);
        debug!(file = %path.display(), bytes = value.len(), "writing value atomically");

        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(&path).map_err(|err| AgendaError::Persist {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Ok(())
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AgendaResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AgendaResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load the event store, treating missing or unreadable data as empty.
#[tracing::instrument(skip(storage))]
pub fn load_events(storage: &dyn KeyValueStore) -> EventStore {
    let raw = match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return EventStore::new(),
        Err(err) => {
            warn!(error = %err, "could not read stored events, starting empty");
            return EventStore::new();
        }
    };

    match EventStore::from_json(&raw) {
        Ok(store) => {
            debug!(days = store.day_count(), events = store.event_count(), "loaded events");
            store
        }
        Err(err) => {
            warn!(error = %err, "stored events are unparsable, starting empty");
            EventStore::new()
        }
    }
}

/// Write the whole event store under the fixed storage key.
#[tracing::instrument(skip(storage, store))]
pub fn persist_events(storage: &dyn KeyValueStore, store: &EventStore) -> AgendaResult<()> {
    let payload = store.to_json()?;
    storage.set(STORAGE_KEY, &payload)?;
    debug!(days = store.day_count(), "persisted events");
    Ok(())
}
