//! Topology cache
//!
//! - **TopologyIndex**: validated, immutable lookup structure over grids,
//!   elements and service types
//! - **TopologyCache**: warm-once holder of the index shared by all generators
//!
//! # Usage Example
//!
//! ```rust
//! use cdr_synth::network::TechnologyRegistry;
//! use cdr_synth::topology::TopologyCache;
//! use cdr_synth::types::{NetworkConfig, TechnologyId};
//!
//! let registry = TechnologyRegistry::standard();
//! let cache = TopologyCache::new();
//! assert!(cache.elements_for(TechnologyId::FourG).is_err());
//!
//! cache.warm(&NetworkConfig::sample(), &registry)?;
//! assert!(!cache.elements_for(TechnologyId::FourG)?.is_empty());
//! # Ok::<(), cdr_synth::simulation::SimulationError>(())
//! ```

pub mod cache;
pub mod index;

pub use cache::*;
pub use index::*;
