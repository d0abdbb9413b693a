//! Store runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! store, rather than read from process-wide environment variables during
//! request handling, which can lead to inconsistent behaviour in
//! multi-threaded runtimes and test harnesses.

use crate::constants::QUERY_CACHE_COLLECTION;
use crate::error::{CacheError, CacheResult};
use std::path::{Path, PathBuf};

/// Configuration for a file-backed quality report store, resolved at startup.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    data_dir: PathBuf,
}

impl StoreConfig {
    /// Create a new `StoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidInput`] if `data_dir` is empty.
    pub fn new(data_dir: PathBuf) -> CacheResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CacheError::InvalidInput(
                "data_dir cannot be empty".into(),
            ));
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory that holds the `query_cache` collection's documents.
    pub fn collection_dir(&self) -> PathBuf {
        self.data_dir.join(QUERY_CACHE_COLLECTION)
    }
}
