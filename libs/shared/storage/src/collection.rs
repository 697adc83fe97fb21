use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{KeyValueStore, StorageError};

/// Typed get-all/replace-all view over one key of the underlying store.
/// Every mutation in the owning cell goes "load snapshot, derive the next
/// set, replace" so multi-field changes land together or not at all.
pub struct Collection<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _entity: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// A key never written is an empty collection, not an error.
    pub fn load(&self) -> Result<Vec<T>, StorageError> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn replace(&self, items: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(&self.key, &raw)
    }

    /// Runs `callback` after every replace of this collection through the
    /// same store.
    pub fn on_change(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.store.subscribe(&self.key, Arc::new(move |_| callback()));
    }
}
