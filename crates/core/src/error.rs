//! Errors returned by the quality report cache and its stores.

/// Errors that can occur translating a quality report to or from a wire
/// representation.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("quality report has no identifier; one must be assigned before rendering")]
    MissingId,

    #[error("failed to serialise quality report: {0}")]
    Serialize(serde_json::Error),

    #[error("failed to deserialise quality report: {0}")]
    Deserialize(serde_json::Error),
}

/// Errors raised by a [`crate::stores::ReportStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create collection directory: {0}")]
    DirCreation(std::io::Error),

    #[error("failed to write quality report document: {0}")]
    FileWrite(std::io::Error),

    #[error("failed to read quality report document: {0}")]
    FileRead(std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Errors returned by cache lookups and find-or-create.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// More than one stored document matched a composite key that is expected
    /// to be unique. This signals a data-integrity fault (bad prior inserts),
    /// not a normal miss, and is never resolved silently.
    #[error(
        "found more than one quality report for measure {measure_id} (sub id {sub_id:?}) at effective date {effective_date}"
    )]
    DuplicateEntries {
        measure_id: String,
        sub_id: Option<String>,
        effective_date: i32,
    },

    /// The store counted exactly one match but the subsequent fetch returned
    /// nothing; another writer removed the document between the two reads.
    #[error("quality report for measure {measure_id} was counted but could not be fetched")]
    MissingAfterCount { measure_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Type alias for Results that can fail with a [`CacheError`].
pub type CacheResult<T> = std::result::Result<T, CacheError>;
