use crate::StoreError;
use std::sync::RwLock;

/// Whole-document storage backend for the pattern library.
///
/// The store is small (tens to low thousands of patterns) and every mutation
/// rewrites it completely, so backends only deal in opaque byte documents.
pub trait StoreBackend: Send + Sync {
    /// Read the stored document. `Ok(None)` means nothing has been written yet.
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;
    /// Replace the stored document.
    fn write(&self, document: &[u8]) -> Result<(), StoreError>;
    /// Human readable location, used in log lines.
    fn describe(&self) -> String;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // JSON file on disk
/// let config = BackendConfig::file("data/naming-patterns.json");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Pretty-printed JSON document at `path`.
    ///
    /// Requires the `backend-file` feature (enabled by default).
    File { path: String },
    /// Keep the document in memory. Useful for tests.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn file<P: Into<String>>(path: P) -> Self {
        BackendConfig::File { path: path.into() }
    }

    /// Build the backend described by this configuration.
    pub fn build(&self) -> Result<Box<dyn StoreBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::File { path } => {
                #[cfg(feature = "backend-file")]
                {
                    Ok(Box::new(JsonFileBackend::new(path)))
                }
                #[cfg(not(feature = "backend-file"))]
                {
                    let _ = path;
                    Err(StoreError::backend("file backend disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory backend holding the last written document.
pub struct InMemoryBackend {
    document: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            document: RwLock::new(None),
        }
    }

    /// Start from an existing document, e.g. to simulate a corrupt file.
    pub fn with_document(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .document
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.clone())
    }

    fn write(&self, document: &[u8]) -> Result<(), StoreError> {
        *self
            .document
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))? = Some(document.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// The JSON file backend implementation.
#[cfg(feature = "backend-file")]
pub mod file;

#[cfg(feature = "backend-file")]
pub use file::JsonFileBackend;
