use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type Subscriber = Arc<dyn Fn(&str) + Send + Sync>;

/// The persistence contract the cells are written against: a durable
/// string-keyed store with change notification. Nothing in the core
/// depends on what actually sits behind it.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Registers a callback invoked with the new value after every
    /// successful `set` of `key` through this store instance.
    fn subscribe(&self, key: &str, subscriber: Subscriber);
}

#[derive(Default)]
struct SubscriberRegistry {
    by_key: Mutex<HashMap<String, Vec<Subscriber>>>,
}

impl SubscriberRegistry {
    fn add(&self, key: &str, subscriber: Subscriber) {
        if let Ok(mut by_key) = self.by_key.lock() {
            by_key.entry(key.to_string()).or_default().push(subscriber);
        }
    }

    fn notify(&self, key: &str, value: &str) {
        let subscribers = match self.by_key.lock() {
            Ok(by_key) => by_key.get(key).cloned().unwrap_or_default(),
            Err(_) => return,
        };
        for subscriber in subscribers {
            subscriber(value);
        }
    }
}

/// Volatile store, used by tests and as the session-scoped cache.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    subscribers: SubscriberRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
            entries.insert(key.to_string(), value.to_string());
        }
        self.subscribers.notify(key, value);
        Ok(())
    }

    fn subscribe(&self, key: &str, subscriber: Subscriber) {
        self.subscribers.add(key, subscriber);
    }
}

/// Durable store keeping one JSON document per key under a root directory.
pub struct FileStore {
    root: PathBuf,
    subscribers: SubscriberRegistry,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            subscribers: SubscriberRegistry::default(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write-then-rename so a crash mid-write never truncates the
        // previous value.
        let target = self.path_for(key);
        let staging = self.root.join(format!("{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        debug!("Persisted collection {}", key);
        self.subscribers.notify(key, value);
        Ok(())
    }

    fn subscribe(&self, key: &str, subscriber: Subscriber) {
        self.subscribers.add(key, subscriber);
    }
}
