//! Error types and handling
//!
//! This module contains the error taxonomy of the generator. Entity and cache
//! construction errors are fatal to startup; per-record generation errors are
//! wrapped in [`GenerationError`] and reported inline by the driver.

use crate::types::{ConfigError, ConfigValidationError, TechnologyId};
use std::time::Duration;
use thiserror::Error;

/// Entity validation failures, raised by validating constructors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Identifier must be strictly positive
    #[error("{entity} has invalid id {id} (must be > 0)")]
    InvalidId {
        /// Entity kind ("network element", "service type", ...)
        entity: &'static str,
        /// Offending identifier
        id: i64,
    },

    /// Name must not be blank
    #[error("{entity} {id} has an empty name")]
    EmptyName {
        /// Entity kind
        entity: &'static str,
        /// Identifier of the offending entity
        id: i64,
    },

    /// Technology reference is not part of the registry
    #[error("Unknown network technology: {0}")]
    UnknownTechnology(String),

    /// Range minimum exceeds its maximum or is not finite
    #[error("Invalid range for {field}: min {min} > max {max}")]
    InvalidRange {
        /// Name of the range attribute
        field: String,
        /// Configured minimum
        min: f64,
        /// Configured maximum
        max: f64,
    },

    /// A field required for this entity is absent
    #[error("{entity} is missing required field '{field}'")]
    MissingRequiredField {
        /// Entity kind and identifier
        entity: String,
        /// Missing field name
        field: &'static str,
    },

    /// A field is present that the entity's technology does not allow
    #[error("Field '{field}' is not valid for {technology} elements")]
    UnexpectedField {
        /// Offending field name
        field: &'static str,
        /// Technology of the entity
        technology: TechnologyId,
    },

    /// A field holds a malformed value
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A sampled value fell outside its permitted range
    #[error("{field} value {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Name of the sampled attribute
        field: &'static str,
        /// Sampled value
        value: f64,
        /// Range minimum
        min: f64,
        /// Range maximum
        max: f64,
    },

    /// Entities referenced together belong to different technologies
    #[error("{entity} belongs to {actual}, expected {expected}")]
    TechnologyMismatch {
        /// Entity description
        entity: String,
        /// Technology required by the referencing record
        expected: TechnologyId,
        /// Technology of the referenced entity
        actual: TechnologyId,
    },
}

/// Configuration consistency failures, raised at cache build or first use
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Location name count does not match the grid size
    #[error("{technology}: {actual} location names supplied for a {rows}x{cols} grid (expected {expected})")]
    DimensionMismatch {
        /// Technology whose grid was being partitioned
        technology: TechnologyId,
        /// Grid rows
        rows: usize,
        /// Grid columns
        cols: usize,
        /// Expected number of names (rows * cols)
        expected: usize,
        /// Supplied number of names
        actual: usize,
    },

    /// Bounding box or split factors are unusable
    #[error("{technology}: invalid bounds: {reason}")]
    InvalidBounds {
        /// Technology whose grid was being partitioned
        technology: TechnologyId,
        /// Description of the problem
        reason: String,
    },

    /// Technology has no network elements to draw from
    #[error("No network elements configured for {0}")]
    NoElementsForTechnology(TechnologyId),

    /// Technology has no service types to draw from
    #[error("No service types configured for {0}")]
    NoServiceTypesForTechnology(TechnologyId),

    /// No service type of the technology belongs to a category with positive weight
    #[error("No service type on {0} belongs to a weighted service category")]
    NoServiceTypesForCategories(TechnologyId),

    /// Element refers to a location cell that is not in its technology's grid
    #[error("{technology}: element {element} refers to unknown location cell '{cell}'")]
    UnknownLocationCell {
        /// Technology of the element
        technology: TechnologyId,
        /// Element identifier
        element: u32,
        /// Requested cell name
        cell: String,
    },

    /// Element coordinates are not contained in its technology's grid
    #[error("{technology}: element {element} at ({latitude}, {longitude}) lies outside the service area")]
    ElementOutsideGrid {
        /// Technology of the element
        technology: TechnologyId,
        /// Element identifier
        element: u32,
        /// Element latitude
        latitude: f64,
        /// Element longitude
        longitude: f64,
    },

    /// The same identifier was used twice
    #[error("Duplicate {entity} id {id}")]
    DuplicateId {
        /// Entity kind
        entity: &'static str,
        /// Repeated identifier
        id: u64,
    },

    /// An entity definition failed validation
    #[error("{technology}: {source}")]
    InvalidEntity {
        /// Technology section containing the definition
        technology: TechnologyId,
        /// Underlying validation failure
        #[source]
        source: ValidationError,
    },

    /// Every technology in the mix lacks elements or service types
    #[error("No usable technology in mix {0:?}: every technology lacks elements or service types")]
    NoUsableTechnology(Vec<TechnologyId>),

    /// The customer population is empty
    #[error("Customer population is empty")]
    NoCustomers,
}

/// Sequencing errors around the topology cache lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A lookup was attempted before warm-up completed
    #[error("Topology cache is not initialized")]
    CacheNotInitialized,

    /// Warm-up was requested a second time
    #[error("Topology cache is already initialized")]
    AlreadyInitialized,

    /// An explicit blocking wait for warm-up ran out of time
    #[error("Timed out after {0:?} waiting for topology cache warm-up")]
    WarmUpTimedOut(Duration),
}

/// Errors that can occur while building or running the generator
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Entity validation failed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Topology configuration is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Cache lifecycle misuse
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Configuration file could not be loaded
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] ConfigError),

    /// Generation parameters are invalid
    #[error("Invalid generation settings: {0}")]
    ConfigValidation(#[from] ConfigValidationError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimulationError {
    /// Whether the error can be isolated to a single record
    ///
    /// Missing elements or service types for one technology and a CDR that
    /// fails self-validation only affect the record being built. Everything
    /// else means the run itself is misconfigured.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::Validation(_) => true,
            SimulationError::Configuration(ConfigurationError::NoElementsForTechnology(_))
            | SimulationError::Configuration(ConfigurationError::NoServiceTypesForTechnology(_))
            | SimulationError::Configuration(ConfigurationError::NoServiceTypesForCategories(_)) => {
                true
            }
            SimulationError::Configuration(_) => false,
            SimulationError::State(_) => false,
            SimulationError::ConfigLoad(_) => false,
            SimulationError::ConfigValidation(_) => false,
            SimulationError::Io(_) => false,
            SimulationError::Serialization(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::Validation(_) => "Validation",
            SimulationError::Configuration(_) => "Configuration",
            SimulationError::State(_) => "State",
            SimulationError::ConfigLoad(_) => "Config Load",
            SimulationError::ConfigValidation(_) => "Config Validation",
            SimulationError::Io(_) => "IO",
            SimulationError::Serialization(_) => "Serialization",
        }
    }

    /// Short stable name of the error kind, used to bucket failures in statistics
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::Validation(e) => match e {
                ValidationError::InvalidId { .. } => "InvalidID",
                ValidationError::EmptyName { .. } => "EmptyName",
                ValidationError::UnknownTechnology(_) => "UnknownTechnology",
                ValidationError::InvalidRange { .. } => "InvalidRange",
                ValidationError::MissingRequiredField { .. } => "MissingRequiredField",
                ValidationError::UnexpectedField { .. } => "UnexpectedField",
                ValidationError::InvalidValue { .. } => "InvalidValue",
                ValidationError::OutOfRange { .. } => "OutOfRange",
                ValidationError::TechnologyMismatch { .. } => "TechnologyMismatch",
            },
            SimulationError::Configuration(e) => match e {
                ConfigurationError::DimensionMismatch { .. } => "DimensionMismatch",
                ConfigurationError::InvalidBounds { .. } => "InvalidBounds",
                ConfigurationError::NoElementsForTechnology(_) => "NoElementsForTechnology",
                ConfigurationError::NoServiceTypesForTechnology(_) => {
                    "NoServiceTypesForTechnology"
                }
                ConfigurationError::NoServiceTypesForCategories(_) => {
                    "NoServiceTypesForCategories"
                }
                ConfigurationError::UnknownLocationCell { .. } => "UnknownLocationCell",
                ConfigurationError::ElementOutsideGrid { .. } => "ElementOutsideGrid",
                ConfigurationError::DuplicateId { .. } => "DuplicateId",
                ConfigurationError::InvalidEntity { .. } => "InvalidEntity",
                ConfigurationError::NoUsableTechnology(_) => "NoUsableTechnology",
                ConfigurationError::NoCustomers => "NoCustomers",
            },
            SimulationError::State(e) => match e {
                StateError::CacheNotInitialized => "CacheNotInitialized",
                StateError::AlreadyInitialized => "AlreadyInitialized",
                StateError::WarmUpTimedOut(_) => "WarmUpTimedOut",
            },
            SimulationError::ConfigLoad(_) => "ConfigLoad",
            SimulationError::ConfigValidation(_) => "ConfigValidation",
            SimulationError::Io(_) => "Io",
            SimulationError::Serialization(_) => "Serialization",
        }
    }
}

/// Result type for generator operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// A single record that could not be produced
///
/// The driver yields this inline in place of the missing CDR; it never
/// terminates the sequence.
#[derive(Debug, Error)]
#[error("record {index} ({technology}): {source}")]
pub struct GenerationError {
    /// Position of the record in the generated sequence
    pub index: u64,
    /// Technology chosen for the record
    pub technology: TechnologyId,
    /// Underlying failure
    #[source]
    pub source: SimulationError,
}

impl GenerationError {
    /// Wrap a failure for the record at `index`
    pub fn new(index: u64, technology: TechnologyId, source: impl Into<SimulationError>) -> Self {
        Self { index, technology, source: source.into() }
    }

    /// Short name of the underlying error kind
    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = ConfigurationError::DimensionMismatch {
            technology: TechnologyId::FourG,
            rows: 2,
            cols: 3,
            expected: 6,
            actual: 4,
        };
        let message = err.to_string();
        assert!(message.contains("4G"));
        assert!(message.contains("2x3"));
        assert!(message.contains("expected 6"));
    }

    #[test]
    fn test_error_from_conversions() {
        let err: SimulationError = StateError::CacheNotInitialized.into();
        assert!(matches!(err, SimulationError::State(StateError::CacheNotInitialized)));

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SimulationError = io_error.into();
        assert_eq!(err.category(), "IO");
    }

    #[test]
    fn test_error_recoverability() {
        let per_record: SimulationError =
            ConfigurationError::NoElementsForTechnology(TechnologyId::TwoG).into();
        assert!(per_record.is_recoverable());

        let fatal: SimulationError = ConfigurationError::NoCustomers.into();
        assert!(!fatal.is_recoverable());

        let state: SimulationError = StateError::AlreadyInitialized.into();
        assert!(!state.is_recoverable());
    }

    #[test]
    fn test_error_kinds() {
        let err: SimulationError =
            ConfigurationError::NoServiceTypesForTechnology(TechnologyId::FiveG).into();
        assert_eq!(err.kind(), "NoServiceTypesForTechnology");

        let err: SimulationError =
            ValidationError::InvalidId { entity: "service type", id: 0 }.into();
        assert_eq!(err.kind(), "InvalidID");
        assert_eq!(err.category(), "Validation");
    }

    #[test]
    fn test_generation_error_wraps_source() {
        let err = GenerationError::new(
            7,
            TechnologyId::ThreeG,
            ConfigurationError::NoElementsForTechnology(TechnologyId::ThreeG),
        );
        assert_eq!(err.index, 7);
        assert_eq!(err.kind(), "NoElementsForTechnology");
        assert!(err.to_string().starts_with("record 7 (3G)"));
    }
}
