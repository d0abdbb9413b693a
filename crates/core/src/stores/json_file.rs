//! File-backed quality report store.
//!
//! Each document in the `query_cache` collection is one JSON file named after
//! the report's identifier:
//!
//! ```text
//! <data_dir>/
//!   query_cache/
//!     <32hex-uuid>.json
//! ```
//!
//! Queries scan the collection directory. An unreadable or unparsable
//! document is an error, not a skip: a count that silently dropped documents
//! could turn a duplicate-entry fault into a false cache hit.

use crate::config::StoreConfig;
use crate::constants::DOCUMENT_EXT;
use crate::error::{StoreError, WireError};
use crate::report::QualityReport;
use crate::stores::{ReportQuery, ReportStore};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// A [`ReportStore`] persisting one JSON file per document.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    cfg: StoreConfig,
}

impl JsonFileStore {
    /// Creates a store over the configured data directory. The collection
    /// directory is created lazily on first insert.
    pub fn new(cfg: StoreConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    fn document_path(&self, id: Uuid) -> PathBuf {
        self.cfg
            .collection_dir()
            .join(format!("{}.{}", id.simple(), DOCUMENT_EXT))
    }

    /// Reads every document in the collection and returns those matching
    /// `query`. A missing collection directory reads as an empty collection.
    fn scan_matching(&self, query: &ReportQuery) -> Result<Vec<QualityReport>, StoreError> {
        let dir = self.cfg.collection_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut matching = Vec::new();
        for entry in fs::read_dir(&dir).map_err(StoreError::FileRead)? {
            let entry = entry.map_err(StoreError::FileRead)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXT) {
                continue;
            }

            let contents = fs::read_to_string(&path).map_err(StoreError::FileRead)?;
            let report = QualityReport::from_storage_json(&contents)?;
            if query.matches(&report) {
                matching.push(report);
            }
        }

        Ok(matching)
    }
}

impl ReportStore for JsonFileStore {
    fn count(&self, query: &ReportQuery) -> Result<usize, StoreError> {
        Ok(self.scan_matching(query)?.len())
    }

    fn find_one(&self, query: &ReportQuery) -> Result<Option<QualityReport>, StoreError> {
        Ok(self.scan_matching(query)?.into_iter().next())
    }

    fn insert(&self, report: &QualityReport) -> Result<(), StoreError> {
        let id = report.id.ok_or(StoreError::Wire(WireError::MissingId))?;
        let json = report.to_storage_json()?;

        fs::create_dir_all(self.cfg.collection_dir()).map_err(StoreError::DirCreation)?;

        let path = self.document_path(id);
        fs::write(&path, json).map_err(StoreError::FileWrite)?;
        tracing::debug!(path = %path.display(), "wrote quality report document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecqm_types::{EffectiveDate, MeasureId};

    fn store_in(dir: &std::path::Path) -> JsonFileStore {
        let cfg = StoreConfig::new(dir.to_path_buf()).expect("valid config");
        JsonFileStore::new(cfg)
    }

    fn report(measure_id: &str, sub_id: Option<&str>, effective_date: i32) -> QualityReport {
        let mut report = QualityReport::new(
            MeasureId::new(measure_id).expect("valid measure id"),
            sub_id.map(str::to_string),
            EffectiveDate::new(effective_date).expect("valid date"),
        );
        report.id = Some(Uuid::new_v4());
        report
    }

    #[test]
    fn missing_collection_dir_reads_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let query = ReportQuery::for_report(&report("CMS123", None, 20230101));

        assert_eq!(store.count(&query).expect("count"), 0);
        assert_eq!(store.find_one(&query).expect("find"), None);
    }

    #[test]
    fn insert_then_count_and_find_one() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let stored = report("CMS123", None, 20230101);
        store.insert(&stored).expect("insert");

        let query = ReportQuery::for_report(&stored);
        assert_eq!(store.count(&query).expect("count"), 1);
        assert_eq!(store.find_one(&query).expect("find"), Some(stored));
    }

    #[test]
    fn documents_land_in_the_query_cache_collection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let stored = report("CMS123", None, 20230101);
        store.insert(&stored).expect("insert");

        let collection = dir.path().join("query_cache");
        let entries: Vec<_> = fs::read_dir(&collection)
            .expect("collection dir exists")
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn insert_rejects_report_without_identifier() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let mut unsaved = report("CMS123", None, 20230101);
        unsaved.id = None;

        let err = store.insert(&unsaved).expect_err("should reject");
        assert!(matches!(err, StoreError::Wire(WireError::MissingId)));
    }

    #[test]
    fn unparsable_document_propagates_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let stored = report("CMS123", None, 20230101);
        store.insert(&stored).expect("insert");

        let garbage = dir.path().join("query_cache").join("broken.json");
        fs::write(&garbage, "not json").expect("write garbage");

        let query = ReportQuery::for_report(&stored);
        let err = store.count(&query).expect_err("should propagate");
        assert!(matches!(
            err,
            StoreError::Wire(WireError::Deserialize(_))
        ));
    }

    #[test]
    fn non_json_files_are_ignored() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let stored = report("CMS123", None, 20230101);
        store.insert(&stored).expect("insert");

        fs::write(dir.path().join("query_cache").join("README.md"), "notes").expect("write");

        let query = ReportQuery::for_report(&stored);
        assert_eq!(store.count(&query).expect("count"), 1);
    }
}
