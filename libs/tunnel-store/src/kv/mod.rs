//! Durable key-value media the tunnel store can sit on.
//!
//! - `SqliteKv`: embedded SQLite database
//! - `FileKv`: a single JSON document, rewritten atomically
//! - `MemoryKv`: in-process map, not durable
//!
//! Every backend reads through to its medium on each call. None of them
//! cache values, so a failing medium is always reported.

mod file;
mod sqlite;

use std::cell::RefCell;
use std::collections::BTreeMap;

pub use file::FileKv;
pub use sqlite::SqliteKv;

use crate::error::StorageError;

/// Synchronous string key-value storage.
///
/// Implementations are single-owner and are not required to be `Sync`.
pub trait KeyValueStore {
    /// Read a value, or `None` if the key was never set or was deleted.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
