//! Store abstraction for quality report documents.
//!
//! The cache logic only needs three operations from a store: count the
//! documents matching a composite-key query, fetch one matching document, and
//! insert a new document. Keeping the trait this narrow means the cache can
//! be exercised against [`MemoryStore`] in tests while production code uses
//! [`JsonFileStore`] or another backing implementation.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::report::QualityReport;
use ecqm_types::{EffectiveDate, MeasureId};

/// An equality query over the composite business key of a quality report.
///
/// The sub id is captured only when the source report has one; an absent sub
/// id means "do not filter on sub id" rather than "sub id must be unset", so
/// callers must supply a sub id whenever disambiguation matters.
#[derive(Clone, Debug)]
pub struct ReportQuery {
    measure_id: MeasureId,
    sub_id: Option<String>,
    effective_date: EffectiveDate,
}

impl ReportQuery {
    /// Builds the query for a report's composite key.
    pub fn for_report(report: &QualityReport) -> Self {
        Self {
            measure_id: report.measure_id.clone(),
            sub_id: report.sub_id.clone(),
            effective_date: report.effective_date,
        }
    }

    pub fn measure_id(&self) -> &MeasureId {
        &self.measure_id
    }

    pub fn sub_id(&self) -> Option<&str> {
        self.sub_id.as_deref()
    }

    pub fn effective_date(&self) -> EffectiveDate {
        self.effective_date
    }

    /// Returns true when the report satisfies this query's equality
    /// conditions.
    pub fn matches(&self, report: &QualityReport) -> bool {
        if report.measure_id != self.measure_id {
            return false;
        }
        if report.effective_date != self.effective_date {
            return false;
        }
        match &self.sub_id {
            Some(sub_id) => report.sub_id.as_deref() == Some(sub_id.as_str()),
            None => true,
        }
    }
}

/// A persistent collection of quality report documents.
///
/// Implementations are expected to be shared resources; no transaction wraps
/// a count followed by a fetch or an insert, and none of the operations
/// retries on failure.
pub trait ReportStore {
    /// Counts the documents matching `query`.
    fn count(&self, query: &ReportQuery) -> Result<usize, StoreError>;

    /// Fetches one document matching `query`, if any exists.
    fn find_one(&self, query: &ReportQuery) -> Result<Option<QualityReport>, StoreError>;

    /// Inserts `report` as a new document. The report must already carry an
    /// identifier.
    fn insert(&self, report: &QualityReport) -> Result<(), StoreError>;
}
