//! JSON file backend for the pattern library.
//!
//! The whole library lives in one pretty-printed JSON document. Writes go to
//! a sibling temporary file first and are then renamed over the target, so a
//! crash mid-write leaves either the old or the new document on disk, never a
//! truncated one.
//!
//! # Configuration Example
//! ```yaml
//! store:
//!   backend: "file"
//!   path: "data/naming-patterns.json"
//! ```

use crate::{StoreBackend, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed store document.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Point the backend at `path`. Nothing is touched on disk until the
    /// first read or write.
    ///
    /// # Example
    /// ```no_run
    /// use store::JsonFileBackend;
    ///
    /// let backend = JsonFileBackend::new("/tmp/naming-patterns.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StoreBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    fn write(&self, document: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let tmp = self.temp_path();
        fs::write(&tmp, document).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
