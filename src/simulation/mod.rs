//! Generation runs and their supporting machinery
//!
//! # Overview
//!
//! - **GenerationDriver**: produces CDR sequences sequentially, on a worker pool or as a rayon batch
//! - **TechnologyMix**: chooses the technology of each record
//! - **SimulationOrchestrator**: loads inputs, warms the cache and drives a run into a sink
//! - **GenerationStatistics**: success and failure counts of a run
//! - **CdrSink**: JSON-lines and CSV output
//! - **SimulationError**: error taxonomy shared by the whole crate
//!
//! # Usage Example
//!
//! ```rust
//! use cdr_synth::simulation::*;
//! use cdr_synth::types::SimulationConfig;
//!
//! let config = SimulationConfig {
//!     record_count: 10,
//!     seed: Some(7),
//!     workers: 1,
//!     customer_count: 5,
//!     ..Default::default()
//! };
//!
//! let orchestrator = SimulationOrchestrator::new(config)?;
//! let mut sink = JsonLinesSink::new(Vec::new());
//! let stats = orchestrator.run(&mut sink, CancellationToken::new())?;
//! assert_eq!(stats.total_generated, 10);
//! # Ok::<(), SimulationError>(())
//! ```

pub mod driver;
pub mod error;
pub mod logging;
pub mod mix;
pub mod orchestrator;
pub mod output;
pub mod statistics;

pub use driver::*;
pub use error::*;
pub use logging::*;
pub use mix::*;
pub use orchestrator::*;
pub use output::*;
pub use statistics::*;
