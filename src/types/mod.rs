//! Core types and identifiers for the CDR generator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the generator.
//!
//! # Overview
//!
//! - **Identifiers**: numeric identifiers for topology entities and UUID-based CDR ids
//! - **Enums**: technologies, element status, bearer types, mix policies and formats
//! - **Configuration**: generation settings with validation and CLI support
//! - **Network document**: the declarative description of the simulated network
//!
//! # Usage Example
//!
//! ```rust
//! use cdr_synth::types::*;
//!
//! let technology: TechnologyId = "4G".parse().unwrap();
//! assert_eq!(technology.radio_identity_kind(), RadioIdentityKind::TrackingArea);
//!
//! let config = SimulationConfig {
//!     record_count: 100,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//!
//! let network = NetworkConfig::sample();
//! assert_eq!(network.networks.len(), 4);
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;
pub mod network_config;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
pub use network_config::*;
