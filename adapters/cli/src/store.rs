//! File-backed key-value store holding the saved game between runs.

use std::{collections::BTreeMap, fs, io, path::PathBuf};

use geocoin_world::persistence::{BlobStore, StoreError};
use log::{debug, warn};

/// [`BlobStore`] persisted as a single JSON object on disk.
///
/// Every write rewrites the whole file.
#[derive(Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|error| {
                warn!("ignoring corrupt store {}: {error}", path.display());
                BTreeMap::new()
            }),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("no store at {}; starting empty", path.display());
                BTreeMap::new()
            }
            Err(error) => {
                warn!("failed to read store {}: {error}", path.display());
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.entries.insert(key.to_owned(), value);
        let text = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            key: key.to_owned(),
            source,
        })
    }
}
