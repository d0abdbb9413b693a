//! # eCQM Core
//!
//! Core data model and caching lookup for electronic clinical quality
//! measure (eCQM) quality reports.
//!
//! This crate contains pure data operations and store plumbing:
//! - Quality report domain types with stored-document and external JSON wire
//!   representations
//! - A narrow store abstraction with in-memory and file-backed
//!   implementations
//! - Find-or-create caching keyed by (measure id, sub id, effective date)
//!
//! **No API concerns**: measure calculation, authentication, and HTTP/CLI
//! surfaces belong to the services embedding this crate.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod report;
pub mod stores;

pub use cache::QueryCache;
pub use config::StoreConfig;
pub use error::{CacheError, CacheResult, StoreError, WireError};
pub use report::{PopulationIds, QualityReport, QualityReportResult, Status};
pub use stores::{JsonFileStore, MemoryStore, ReportQuery, ReportStore};

// Re-export the validated key primitives from the types crate.
pub use ecqm_types::{EffectiveDate, EffectiveDateError, MeasureId, MeasureIdError};
