use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::RecordStore;
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Load-once store cache
// ---------------------------------------------------------------------------

/// Identity of a dataset file at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceStamp {
    fn of(path: &Path) -> Result<Self, DataLoadError> {
        let io_err = |source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = std::fs::canonicalize(path).map_err(io_err)?;
        let meta = std::fs::metadata(&canonical).map_err(io_err)?;
        Ok(Self {
            path: canonical,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Owns the single loaded [`RecordStore`] and hands out shared handles to it.
///
/// Loading the same, unchanged source again returns the cached instance; the
/// file is only re-read when its path, length or modification time differ.
#[derive(Debug, Default)]
pub struct StoreCache {
    entry: Option<(SourceStamp, Arc<RecordStore>)>,
}

impl StoreCache {
    pub fn load(&mut self, path: &Path) -> Result<Arc<RecordStore>, DataLoadError> {
        let stamp = SourceStamp::of(path)?;
        if let Some((cached, store)) = &self.entry {
            if *cached == stamp {
                log::debug!("Dataset {} unchanged, reusing cached store", stamp.path.display());
                return Ok(Arc::clone(store));
            }
        }

        let store = Arc::new(load_file(&stamp.path)?);
        log::info!(
            "Loaded {} cost records from {}",
            store.len(),
            stamp.path.display()
        );
        self.entry = Some((stamp, Arc::clone(&store)));
        Ok(store)
    }

    /// The most recently loaded store, if any.
    pub fn current(&self) -> Option<Arc<RecordStore>> {
        self.entry.as_ref().map(|(_, store)| Arc::clone(store))
    }
}
