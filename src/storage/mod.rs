//! Storage
//!
//! An opaque key-value store, one key per persisted collection, values are
//! JSON text. [`Persisted`] owns the encoding and recovery policy so the
//! stores themselves only deal in domain values.

use std::{fmt::Debug, io};

use mockall::automock;
use thiserror::Error;

mod file;
mod memory;
mod persisted;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use persisted::{Persisted, WhenEmpty};

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be read or written.
    #[error("storage I/O failed")]
    Io(#[from] io::Error),

    /// A value could not be encoded for storage.
    #[error("failed to encode value for key {key}")]
    Encode {
        /// Key being written
        key: String,

        /// Encoder error
        #[source]
        source: serde_json::Error,
    },

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// String key-value store, the browser local storage equivalent.
#[automock]
pub trait KeyValueStore: Debug + Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
