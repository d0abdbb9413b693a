//! Shared constants.

/// Name of the store collection that caches quality report calculations.
pub const QUERY_CACHE_COLLECTION: &str = "query_cache";

/// File extension used for documents in the file-backed store.
pub(crate) const DOCUMENT_EXT: &str = "json";
