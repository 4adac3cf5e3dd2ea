//! Persisted collections

use std::{fmt, marker::PhantomData, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

/// What to write when a collection becomes empty. Both forms load as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenEmpty {
    /// Delete the key.
    RemoveKey,

    /// Store an empty sequence.
    StoreEmpty,
}

/// A collection persisted as a JSON sequence under a fixed key.
pub struct Persisted<T> {
    storage: Arc<dyn KeyValueStore>,
    key: &'static str,
    when_empty: WhenEmpty,
    marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("when_empty", &self.when_empty)
            .finish_non_exhaustive()
    }
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    /// Bind a collection to `key` on `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: &'static str, when_empty: WhenEmpty) -> Self {
        Self {
            storage,
            key,
            when_empty,
            marker: PhantomData,
        }
    }

    /// Storage key
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load the stored collection.
    ///
    /// Returns `None` when nothing usable is stored. A value that fails to
    /// parse is discarded from storage and reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn load(&self) -> Result<Option<Vec<T>>, StorageError> {
        let Some(raw) = self.storage.get(self.key)? else {
            debug!(key = self.key, "nothing stored");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(Some(items)),
            Err(error) => {
                warn!(key = self.key, %error, "discarding corrupt stored value");

                if let Err(error) = self.storage.remove(self.key) {
                    warn!(key = self.key, %error, "failed to discard corrupt stored value");
                }

                Ok(None)
            }
        }
    }

    /// Write the full collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value could not be encoded or written.
    pub fn save(&self, items: &[T]) -> Result<(), StorageError> {
        if items.is_empty() && self.when_empty == WhenEmpty::RemoveKey {
            return self.storage.remove(self.key);
        }

        let encoded = serde_json::to_string(items).map_err(|source| StorageError::Encode {
            key: self.key.to_string(),
            source,
        })?;

        self.storage.set(self.key, &encoded)
    }
}
