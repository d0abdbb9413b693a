//! In-memory quality report store.
//!
//! Used as a test double for the cache logic and as a lightweight embedded
//! store. Documents live in a vector behind a read-write lock; nothing is
//! persisted.

use crate::error::{StoreError, WireError};
use crate::report::QualityReport;
use crate::stores::{ReportQuery, ReportStore};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// A non-persistent [`ReportStore`] backed by a locked vector.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: RwLock<Vec<QualityReport>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true when no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Fetches a stored document by identifier.
    pub fn get(&self, id: Uuid) -> Option<QualityReport> {
        self.read().iter().find(|r| r.id == Some(id)).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<QualityReport>> {
        // A poisoned lock still holds structurally valid data; writers only
        // ever push complete documents.
        self.reports.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<QualityReport>> {
        self.reports.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReportStore for MemoryStore {
    fn count(&self, query: &ReportQuery) -> Result<usize, StoreError> {
        Ok(self.read().iter().filter(|r| query.matches(r)).count())
    }

    fn find_one(&self, query: &ReportQuery) -> Result<Option<QualityReport>, StoreError> {
        Ok(self.read().iter().find(|r| query.matches(r)).cloned())
    }

    fn insert(&self, report: &QualityReport) -> Result<(), StoreError> {
        if report.id.is_none() {
            return Err(StoreError::Wire(WireError::MissingId));
        }
        self.write().push(report.clone());
        Ok(())
    }
}
