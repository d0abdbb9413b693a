//! Composite-key lookup and find-or-create against a quality report store.
//!
//! The `query_cache` collection is treated as a cache keyed by the
//! (measure id, sub id, effective date) triple. A lookup counts matches
//! first: zero is a miss, one is a hit, and two or more is a data-integrity
//! fault that is surfaced rather than resolved.

use crate::error::{CacheError, CacheResult};
use crate::report::QualityReport;
use crate::stores::{ReportQuery, ReportStore};
use uuid::Uuid;

/// Find-or-create cache over a [`ReportStore`].
#[derive(Clone, Debug)]
pub struct QueryCache<S> {
    store: S,
}

impl<S: ReportStore> QueryCache<S> {
    /// Creates a cache over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Attempts to find a cached quality report matching the composite key of
    /// the report passed in.
    ///
    /// The query matches on measure id and effective date, and additionally
    /// on sub id when the report has one; a report without a sub id matches
    /// stored documents regardless of their sub id.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` when exactly one cached document matches, in which
    /// case every field of `report` is overwritten with the stored document's
    /// values, including the identifier. Returns `Ok(false)` on a miss, in
    /// which case `report` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DuplicateEntries`] when two or more documents
    /// match, and propagates any store failure unchanged.
    pub fn find_and_populate(&self, report: &mut QualityReport) -> CacheResult<bool> {
        let query = ReportQuery::for_report(report);
        let count = self.store.count(&query)?;

        match count {
            0 => {
                tracing::debug!(
                    measure_id = %query.measure_id(),
                    effective_date = query.effective_date().value(),
                    "query cache miss"
                );
                Ok(false)
            }
            1 => {
                let found = self
                    .store
                    .find_one(&query)?
                    .ok_or_else(|| CacheError::MissingAfterCount {
                        measure_id: query.measure_id().to_string(),
                    })?;
                *report = found;
                tracing::debug!(
                    measure_id = %query.measure_id(),
                    effective_date = query.effective_date().value(),
                    "query cache hit"
                );
                Ok(true)
            }
            _ => Err(CacheError::DuplicateEntries {
                measure_id: query.measure_id().to_string(),
                sub_id: query.sub_id().map(str::to_string),
                effective_date: query.effective_date().value(),
            }),
        }
    }

    /// Finds the cached quality report for the report's composite key, or
    /// inserts the report as a new cache entry.
    ///
    /// On a hit the report is populated from the store and no write occurs.
    /// On a miss the report is assigned a fresh identifier and inserted.
    ///
    /// Two concurrent calls for the same key that both observe a miss will
    /// each insert, leaving duplicate documents behind; duplicates are then
    /// detected reactively by later lookups. Callers that need stronger
    /// guarantees must serialise calls per key or use a store with a
    /// uniqueness constraint on the composite key.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors, including [`CacheError::DuplicateEntries`]
    /// (in which case no insert is attempted), and any insert failure.
    pub fn find_or_create(&self, report: &mut QualityReport) -> CacheResult<()> {
        if self.find_and_populate(report)? {
            return Ok(());
        }

        report.id = Some(Uuid::new_v4());
        self.store.insert(report)?;
        tracing::debug!(
            measure_id = %report.measure_id,
            effective_date = report.effective_date.value(),
            "inserted new query cache entry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{QualityReportResult, Status};
    use crate::stores::MemoryStore;
    use ecqm_types::{EffectiveDate, MeasureId};

    fn partial(measure_id: &str, sub_id: Option<&str>, effective_date: i32) -> QualityReport {
        QualityReport::new(
            MeasureId::new(measure_id).expect("valid measure id"),
            sub_id.map(str::to_string),
            EffectiveDate::new(effective_date).expect("valid date"),
        )
    }

    fn stored(measure_id: &str, sub_id: Option<&str>, effective_date: i32) -> QualityReport {
        let mut report = partial(measure_id, sub_id, effective_date);
        report.id = Some(Uuid::new_v4());
        report
    }

    #[test]
    fn miss_returns_false_and_leaves_input_unchanged() {
        let cache = QueryCache::new(MemoryStore::new());
        let mut report = partial("CMS123", None, 20230101);
        let before = report.clone();

        let found = cache.find_and_populate(&mut report).expect("lookup");
        assert!(!found);
        assert_eq!(report, before);
        assert!(cache.store().is_empty());
    }

    #[test]
    fn hit_overwrites_every_field_including_identifier() {
        let cache = QueryCache::new(MemoryStore::new());

        let mut existing = stored("CMS123", Some("a"), 20230101);
        existing.npi = Some("1234567893".to_string());
        existing.calculation_time = "2023-04-01T12:30:00Z".parse().ok();
        existing.status = Status {
            state: Some("complete".to_string()),
            log: vec!["queued".to_string(), "calculated".to_string()],
        };
        existing.result = Some(QualityReportResult {
            initial_patient_population: 120,
            denominator: Some(100),
            numerator: Some(80),
            ..QualityReportResult::default()
        });
        cache.store().insert(&existing).expect("seed store");

        let mut report = partial("CMS123", Some("a"), 20230101);
        let found = cache.find_and_populate(&mut report).expect("lookup");

        assert!(found);
        assert_eq!(report, existing);
        assert_eq!(report.id, existing.id);
    }

    #[test]
    fn duplicate_entries_surface_an_error() {
        let cache = QueryCache::new(MemoryStore::new());
        cache
            .store()
            .insert(&stored("CMS123", None, 20230101))
            .expect("seed first");
        cache
            .store()
            .insert(&stored("CMS123", None, 20230101))
            .expect("seed second");

        let mut report = partial("CMS123", None, 20230101);
        let err = cache
            .find_and_populate(&mut report)
            .expect_err("should report duplicates");

        match err {
            CacheError::DuplicateEntries {
                measure_id,
                sub_id,
                effective_date,
            } => {
                assert_eq!(measure_id, "CMS123");
                assert_eq!(sub_id, None);
                assert_eq!(effective_date, 20230101);
            }
            other => panic!("expected DuplicateEntries, got {other:?}"),
        }
    }

    #[test]
    fn find_or_create_inserts_on_miss() {
        let cache = QueryCache::new(MemoryStore::new());
        let mut report = partial("CMS999", None, 20230101);

        cache.find_or_create(&mut report).expect("find or create");

        let id = report.id.expect("identifier should be assigned");
        assert_eq!(cache.store().len(), 1);
        assert!(cache.store().get(id).is_some());
    }

    #[test]
    fn find_or_create_is_idempotent_sequentially() {
        let cache = QueryCache::new(MemoryStore::new());

        let mut first = partial("CMS123", None, 20230101);
        cache.find_or_create(&mut first).expect("first call");
        let first_id = first.id.expect("identifier assigned");

        let mut second = partial("CMS123", None, 20230101);
        cache.find_or_create(&mut second).expect("second call");

        assert_eq!(second.id, Some(first_id));
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn find_or_create_returns_cached_entry_for_same_key() {
        let cache = QueryCache::new(MemoryStore::new());
        let existing = stored("CMS123", None, 20230101);
        cache.store().insert(&existing).expect("seed store");

        let mut report = partial("CMS123", None, 20230101);
        cache.find_or_create(&mut report).expect("find or create");

        assert_eq!(report.id, existing.id);
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn absent_sub_id_matches_any_stored_sub_id() {
        let cache = QueryCache::new(MemoryStore::new());
        let existing = stored("CMS123", Some("b"), 20230101);
        cache.store().insert(&existing).expect("seed store");

        let mut report = partial("CMS123", None, 20230101);
        let found = cache.find_and_populate(&mut report).expect("lookup");

        assert!(found);
        assert_eq!(report.sub_id, Some("b".to_string()));
    }

    #[test]
    fn present_sub_id_disambiguates_sub_measures() {
        let cache = QueryCache::new(MemoryStore::new());
        cache
            .store()
            .insert(&stored("CMS123", Some("a"), 20230101))
            .expect("seed a");
        cache
            .store()
            .insert(&stored("CMS123", Some("b"), 20230101))
            .expect("seed b");

        let mut report = partial("CMS123", Some("b"), 20230101);
        let found = cache.find_and_populate(&mut report).expect("lookup");

        assert!(found);
        assert_eq!(report.sub_id, Some("b".to_string()));
    }

    #[test]
    fn duplicate_error_prevents_a_compounding_insert() {
        let cache = QueryCache::new(MemoryStore::new());
        cache
            .store()
            .insert(&stored("CMS123", None, 20230101))
            .expect("seed first");
        cache
            .store()
            .insert(&stored("CMS123", None, 20230101))
            .expect("seed second");

        let mut report = partial("CMS123", None, 20230101);
        let err = cache
            .find_or_create(&mut report)
            .expect_err("should propagate duplicates");

        assert!(matches!(err, CacheError::DuplicateEntries { .. }));
        assert_eq!(cache.store().len(), 2);
        assert_eq!(report.id, None);
    }

    #[test]
    fn works_end_to_end_over_the_file_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = crate::config::StoreConfig::new(dir.path().to_path_buf()).expect("valid config");
        let cache = QueryCache::new(crate::stores::JsonFileStore::new(cfg));

        let mut first = partial("CMS165v3", Some("a"), 20230101);
        cache.find_or_create(&mut first).expect("first call");

        let mut second = partial("CMS165v3", Some("a"), 20230101);
        cache.find_or_create(&mut second).expect("second call");

        assert_eq!(second.id, first.id);

        let collection = dir.path().join("query_cache");
        let documents: Vec<_> = std::fs::read_dir(&collection)
            .expect("collection dir exists")
            .collect();
        assert_eq!(documents.len(), 1);
    }
}
