//! Plain JSON files in the browser data directory

use parking_lot::Mutex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::store::{validate_name, DocumentStore};
use crate::Result;

/// Stores each document as `<root>/<name>.json`.
pub struct JsonFileStore {
    root: PathBuf,
    /// Serializes writers within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates the store. The directory is created lazily on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        validate_name(name)?;
        let _guard = self.lock.lock();

        match fs::read_to_string(self.path_for(name)) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, body: &str) -> Result<()> {
        validate_name(name)?;
        let _guard = self.lock.lock();

        fs::create_dir_all(&self.root)?;

        // Stage beside the target so a crash never leaves half a file
        let target = self.path_for(name);
        let mut staging = NamedTempFile::new_in(&self.root)?;
        staging.write_all(body.as_bytes())?;
        staging.as_file_mut().sync_all()?;
        staging.persist(&target).map_err(|e| e.error)?;

        tracing::debug!(path = %target.display(), bytes = body.len(), "Wrote document");

        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let _guard = self.lock.lock();

        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
