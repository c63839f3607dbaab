//! Document store abstraction

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::StorageError;
use crate::Result;

/// A keyed store of whole JSON documents.
///
/// Callers always read a document in full, mutate it in memory and write it
/// back in full. Implementations only need to make a single `write` atomic
/// with respect to a concurrent `read` in the same process.
pub trait DocumentStore: Send + Sync {
    /// Returns the raw document body, or `None` when it was never written.
    fn read(&self, name: &str) -> Result<Option<String>>;

    /// Replaces the document body.
    fn write(&self, name: &str, body: &str) -> Result<()>;

    /// Deletes the document. Removing an absent document is not an error.
    fn remove(&self, name: &str) -> Result<()>;
}

/// Load and deserialize a document, substituting `T::default()` when absent.
pub fn load_json<T>(store: &dyn DocumentStore, name: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match store.read(name)? {
        Some(body) if !body.trim().is_empty() => Ok(serde_json::from_str(&body)?),
        _ => Ok(T::default()),
    }
}

/// Serialize and replace a document.
pub fn save_json<T>(store: &dyn DocumentStore, name: &str, value: &T) -> Result<()>
where
    T: Serialize,
{
    let body = serde_json::to_string_pretty(value)?;
    store.write(name, &body)
}

/// Document names double as file names, so keep them to a safe alphabet.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

/// Volatile store, used for private windows and tests.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        validate_name(name)?;
        Ok(self.documents.lock().get(name).cloned())
    }

    fn write(&self, name: &str, body: &str) -> Result<()> {
        validate_name(name)?;
        self.documents
            .lock()
            .insert(name.to_string(), body.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.documents.lock().remove(name);
        Ok(())
    }
}
