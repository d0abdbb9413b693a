//! Quality report domain and wire models.
//!
//! This module provides both domain-level types and wire models for an eCQM
//! quality report, which represents one calculation of an electronic clinical
//! quality measure for a (measure id, sub id, effective date) key.
//!
//! Responsibilities:
//! - Define public domain-level types for use by the cache and stores
//! - Define strict wire models for the stored document and the external JSON
//!   representation
//! - Provide translation helpers between domain types and the wire models
//!
//! Notes:
//! - The stored document and the external JSON use different field names for
//!   the same logical fields; both are preserved exactly for compatibility
//!   with existing data (including the capitalised `Observation` JSON key)
//! - Unset optional fields are omitted from both representations

use crate::error::WireError;
use chrono::{DateTime, Utc};
use ecqm_types::{EffectiveDate, MeasureId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Public domain-level types
// ============================================================================

/// A representation of a calculation of an electronic clinical quality
/// measure.
///
/// A report is created with only its composite key populated (measure id,
/// optional sub id, effective date); the identifier, status and result fields
/// are filled in by the cache lookup or by the calculation engine.
#[derive(Clone, Debug, PartialEq)]
pub struct QualityReport {
    /// Unique identifier, assigned when the report is first inserted.
    pub id: Option<Uuid>,

    /// National Provider Identifier of the provider the calculation is
    /// scoped to, if any.
    pub npi: Option<String>,

    /// When the calculation was performed.
    pub calculation_time: Option<DateTime<Utc>>,

    /// Calculation status and progress log.
    pub status: Status,

    /// Identifier of the measure being calculated.
    pub measure_id: MeasureId,

    /// Sub-measure identifier, used to disambiguate sub-measures.
    pub sub_id: Option<String>,

    /// Effective date of the calculation (non-zero integer encoding).
    pub effective_date: EffectiveDate,

    /// Population tallies, present once the calculation has produced them.
    pub result: Option<QualityReportResult>,
}

impl QualityReport {
    /// Creates a new report with only its composite key populated.
    pub fn new(measure_id: MeasureId, sub_id: Option<String>, effective_date: EffectiveDate) -> Self {
        Self {
            id: None,
            npi: None,
            calculation_time: None,
            status: Status::default(),
            measure_id,
            sub_id,
            effective_date,
            result: None,
        }
    }

    /// Renders this report as a stored-document JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MissingId`] if the report has not been assigned an
    /// identifier yet, or [`WireError::Serialize`] if serialisation fails.
    pub fn to_storage_json(&self) -> Result<String, WireError> {
        let wire = domain_to_storage(self)?;
        serde_json::to_string(&wire).map_err(WireError::Serialize)
    }

    /// Parses a report from a stored-document JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Deserialize`] if the document does not match the
    /// stored wire schema (unknown keys, wrong types, empty measure id, zero
    /// effective date).
    pub fn from_storage_json(json: &str) -> Result<Self, WireError> {
        let wire: StorageWire = serde_json::from_str(json).map_err(WireError::Deserialize)?;
        Ok(storage_to_domain(wire))
    }

    /// Renders this report in the external JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MissingId`] if the report has not been assigned an
    /// identifier yet, or [`WireError::Serialize`] if serialisation fails.
    pub fn to_api_json(&self) -> Result<String, WireError> {
        let wire = domain_to_api(self)?;
        serde_json::to_string(&wire).map_err(WireError::Serialize)
    }

    /// Parses a report from the external JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Deserialize`] if the JSON does not match the
    /// external wire schema.
    pub fn from_api_json(json: &str) -> Result<Self, WireError> {
        let wire: ApiWire = serde_json::from_str(json).map_err(WireError::Deserialize)?;
        Ok(api_to_domain(wire))
    }
}

/// Calculation status: a state label plus an append-only progress log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    /// Free-form state label (for example "queued" or "complete").
    pub state: Option<String>,

    /// Ordered log lines, oldest first.
    pub log: Vec<String>,
}

impl Status {
    /// Returns true when no state has been set and the log is empty.
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.log.is_empty()
    }

    /// Appends a line to the progress log. The log is append-only; existing
    /// lines are never rewritten.
    pub fn append_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

/// Population tallies for one measure calculation.
///
/// The initial patient population is always recorded, even when zero; the
/// remaining tallies are optional because not every measure defines them.
/// Counts are conceptually non-negative but the type does not enforce it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QualityReportResult {
    /// Initial patient population count.
    pub initial_patient_population: i32,

    /// Denominator count.
    pub denominator: Option<i32>,

    /// Denominator exception count.
    pub exception: Option<i32>,

    /// Denominator exclusion count.
    pub exclusion: Option<i32>,

    /// Numerator count.
    pub numerator: Option<i32>,

    /// Patients in the denominator but not the numerator.
    pub antinumerator: Option<i32>,

    /// Measure population count (continuous-variable measures).
    pub measure_population: Option<i32>,

    /// Observed value (continuous-variable measures).
    pub observation: Option<f32>,

    /// External identifiers of the population criteria that produced these
    /// tallies.
    pub population_ids: Option<PopulationIds>,
}

/// External identifiers (for example population criteria UUIDs from the
/// measure definition) for each population category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationIds {
    pub initial_patient_population: Option<String>,
    pub denominator: Option<String>,
    pub exception: Option<String>,
    pub exclusion: Option<String>,
    pub numerator: Option<String>,
    pub measure_population: Option<String>,
    pub observation: Option<String>,
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a stored quality report document.
///
/// This is the exact structure held in the `query_cache` collection. Result
/// tallies live at the top level of the document under their short category
/// codes, with the criteria identifiers nested under `population_ids`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct StorageWire {
    #[serde(rename = "_id")]
    id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    npi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    calculation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<StatusWire>,

    measure_id: MeasureId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub_id: Option<String>,

    effective_date: EffectiveDate,

    #[serde(rename = "IPP", default, skip_serializing_if = "Option::is_none")]
    initial_patient_population: Option<i32>,

    #[serde(rename = "DENOM", default, skip_serializing_if = "Option::is_none")]
    denominator: Option<i32>,

    #[serde(rename = "DENEXCP", default, skip_serializing_if = "Option::is_none")]
    exception: Option<i32>,

    #[serde(rename = "DENEX", default, skip_serializing_if = "Option::is_none")]
    exclusion: Option<i32>,

    #[serde(rename = "NUMER", default, skip_serializing_if = "Option::is_none")]
    numerator: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    antinumerator: Option<i32>,

    #[serde(rename = "MSRPOPL", default, skip_serializing_if = "Option::is_none")]
    measure_population: Option<i32>,

    #[serde(rename = "OBSERV", default, skip_serializing_if = "Option::is_none")]
    observation: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    population_ids: Option<PopulationIdsStorageWire>,
}

/// Wire representation of the external JSON form of a quality report.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct ApiWire {
    id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    npi: Option<String>,

    #[serde(
        rename = "calculationTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    calculation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<StatusWire>,

    #[serde(rename = "measureId")]
    measure_id: MeasureId,

    #[serde(rename = "subId", default, skip_serializing_if = "Option::is_none")]
    sub_id: Option<String>,

    #[serde(rename = "effectiveDate")]
    effective_date: EffectiveDate,

    #[serde(
        rename = "initialPatientPopulation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    initial_patient_population: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    denominator: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclusion: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    numerator: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    antinumerator: Option<i32>,

    #[serde(
        rename = "measurePopulation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    measure_population: Option<i32>,

    // Capitalised key preserved for compatibility with existing consumers.
    #[serde(rename = "Observation", default, skip_serializing_if = "Option::is_none")]
    observation: Option<f32>,

    #[serde(
        rename = "populationIds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    population_ids: Option<PopulationIdsApiWire>,
}

/// Wire representation of a calculation status (same shape in both formats).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct StatusWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    log: Vec<String>,
}

/// Stored wire representation of population criteria identifiers.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PopulationIdsStorageWire {
    #[serde(rename = "IPP", default, skip_serializing_if = "Option::is_none")]
    initial_patient_population: Option<String>,

    #[serde(rename = "DENOM", default, skip_serializing_if = "Option::is_none")]
    denominator: Option<String>,

    #[serde(rename = "DENEXCP", default, skip_serializing_if = "Option::is_none")]
    exception: Option<String>,

    #[serde(rename = "DENEX", default, skip_serializing_if = "Option::is_none")]
    exclusion: Option<String>,

    #[serde(rename = "NUMER", default, skip_serializing_if = "Option::is_none")]
    numerator: Option<String>,

    #[serde(rename = "MSRPOPL", default, skip_serializing_if = "Option::is_none")]
    measure_population: Option<String>,

    #[serde(rename = "OBSERV", default, skip_serializing_if = "Option::is_none")]
    observation: Option<String>,
}

/// External wire representation of population criteria identifiers.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PopulationIdsApiWire {
    #[serde(
        rename = "initialPatientPopulation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    initial_patient_population: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    denominator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclusion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    numerator: Option<String>,

    #[serde(
        rename = "measurePopulation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    measure_population: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    observation: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Convert domain status to its wire form, omitting an empty status entirely.
fn status_to_wire(status: &Status) -> Option<StatusWire> {
    if status.is_empty() {
        return None;
    }
    Some(StatusWire {
        state: status.state.clone(),
        log: status.log.clone(),
    })
}

/// Convert wire status back to the domain type (absent means empty).
fn status_from_wire(wire: Option<StatusWire>) -> Status {
    match wire {
        Some(w) => Status {
            state: w.state,
            log: w.log,
        },
        None => Status::default(),
    }
}

/// Reassemble a result from its flattened wire fields.
///
/// A result is considered present when any of the tallies or the criteria
/// identifiers were stored. An absent initial patient population on a present
/// result reads back as zero.
#[allow(clippy::too_many_arguments)]
fn result_from_parts(
    initial_patient_population: Option<i32>,
    denominator: Option<i32>,
    exception: Option<i32>,
    exclusion: Option<i32>,
    numerator: Option<i32>,
    antinumerator: Option<i32>,
    measure_population: Option<i32>,
    observation: Option<f32>,
    population_ids: Option<PopulationIds>,
) -> Option<QualityReportResult> {
    let any_present = initial_patient_population.is_some()
        || denominator.is_some()
        || exception.is_some()
        || exclusion.is_some()
        || numerator.is_some()
        || antinumerator.is_some()
        || measure_population.is_some()
        || observation.is_some()
        || population_ids.is_some();

    if !any_present {
        return None;
    }

    Some(QualityReportResult {
        initial_patient_population: initial_patient_population.unwrap_or(0),
        denominator,
        exception,
        exclusion,
        numerator,
        antinumerator,
        measure_population,
        observation,
        population_ids,
    })
}

/// Convert a domain report to the stored wire form.
fn domain_to_storage(report: &QualityReport) -> Result<StorageWire, WireError> {
    let id = report.id.ok_or(WireError::MissingId)?;
    let result = report.result.as_ref();

    Ok(StorageWire {
        id,
        npi: report.npi.clone(),
        calculation_time: report.calculation_time,
        status: status_to_wire(&report.status),
        measure_id: report.measure_id.clone(),
        sub_id: report.sub_id.clone(),
        effective_date: report.effective_date,
        initial_patient_population: result.map(|r| r.initial_patient_population),
        denominator: result.and_then(|r| r.denominator),
        exception: result.and_then(|r| r.exception),
        exclusion: result.and_then(|r| r.exclusion),
        numerator: result.and_then(|r| r.numerator),
        antinumerator: result.and_then(|r| r.antinumerator),
        measure_population: result.and_then(|r| r.measure_population),
        observation: result.and_then(|r| r.observation),
        population_ids: result
            .and_then(|r| r.population_ids.as_ref())
            .map(population_ids_to_storage),
    })
}

/// Convert a stored wire document to the domain type.
fn storage_to_domain(wire: StorageWire) -> QualityReport {
    let population_ids = wire.population_ids.map(population_ids_from_storage);

    QualityReport {
        id: Some(wire.id),
        npi: wire.npi,
        calculation_time: wire.calculation_time,
        status: status_from_wire(wire.status),
        measure_id: wire.measure_id,
        sub_id: wire.sub_id,
        effective_date: wire.effective_date,
        result: result_from_parts(
            wire.initial_patient_population,
            wire.denominator,
            wire.exception,
            wire.exclusion,
            wire.numerator,
            wire.antinumerator,
            wire.measure_population,
            wire.observation,
            population_ids,
        ),
    }
}

/// Convert a domain report to the external wire form.
fn domain_to_api(report: &QualityReport) -> Result<ApiWire, WireError> {
    let id = report.id.ok_or(WireError::MissingId)?;
    let result = report.result.as_ref();

    Ok(ApiWire {
        id,
        npi: report.npi.clone(),
        calculation_time: report.calculation_time,
        status: status_to_wire(&report.status),
        measure_id: report.measure_id.clone(),
        sub_id: report.sub_id.clone(),
        effective_date: report.effective_date,
        initial_patient_population: result.map(|r| r.initial_patient_population),
        denominator: result.and_then(|r| r.denominator),
        exception: result.and_then(|r| r.exception),
        exclusion: result.and_then(|r| r.exclusion),
        numerator: result.and_then(|r| r.numerator),
        antinumerator: result.and_then(|r| r.antinumerator),
        measure_population: result.and_then(|r| r.measure_population),
        observation: result.and_then(|r| r.observation),
        population_ids: result
            .and_then(|r| r.population_ids.as_ref())
            .map(population_ids_to_api),
    })
}

/// Convert an external wire document to the domain type.
fn api_to_domain(wire: ApiWire) -> QualityReport {
    let population_ids = wire.population_ids.map(population_ids_from_api);

    QualityReport {
        id: Some(wire.id),
        npi: wire.npi,
        calculation_time: wire.calculation_time,
        status: status_from_wire(wire.status),
        measure_id: wire.measure_id,
        sub_id: wire.sub_id,
        effective_date: wire.effective_date,
        result: result_from_parts(
            wire.initial_patient_population,
            wire.denominator,
            wire.exception,
            wire.exclusion,
            wire.numerator,
            wire.antinumerator,
            wire.measure_population,
            wire.observation,
            population_ids,
        ),
    }
}

fn population_ids_to_storage(ids: &PopulationIds) -> PopulationIdsStorageWire {
    PopulationIdsStorageWire {
        initial_patient_population: ids.initial_patient_population.clone(),
        denominator: ids.denominator.clone(),
        exception: ids.exception.clone(),
        exclusion: ids.exclusion.clone(),
        numerator: ids.numerator.clone(),
        measure_population: ids.measure_population.clone(),
        observation: ids.observation.clone(),
    }
}

fn population_ids_from_storage(wire: PopulationIdsStorageWire) -> PopulationIds {
    PopulationIds {
        initial_patient_population: wire.initial_patient_population,
        denominator: wire.denominator,
        exception: wire.exception,
        exclusion: wire.exclusion,
        numerator: wire.numerator,
        measure_population: wire.measure_population,
        observation: wire.observation,
    }
}

fn population_ids_to_api(ids: &PopulationIds) -> PopulationIdsApiWire {
    PopulationIdsApiWire {
        initial_patient_population: ids.initial_patient_population.clone(),
        denominator: ids.denominator.clone(),
        exception: ids.exception.clone(),
        exclusion: ids.exclusion.clone(),
        numerator: ids.numerator.clone(),
        measure_population: ids.measure_population.clone(),
        observation: ids.observation.clone(),
    }
}

fn population_ids_from_api(wire: PopulationIdsApiWire) -> PopulationIds {
    PopulationIds {
        initial_patient_population: wire.initial_patient_population,
        denominator: wire.denominator,
        exception: wire.exception,
        exclusion: wire.exclusion,
        numerator: wire.numerator,
        measure_population: wire.measure_population,
        observation: wire.observation,
    }
}
