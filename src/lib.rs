//! CDR Synth
//!
//! A synthetic Call Detail Record generator for multi-technology mobile
//! networks (2G, 3G, 4G, 5G).
//!
//! # Overview
//!
//! Given a declarative description of a network (a service area, a location
//! grid per technology, the network elements placed on it and the service
//! types each technology offers with their QoS envelopes) the library
//! produces CDRs whose every reference is consistent with that topology.
//!
//! ## Key Features
//!
//! - **Geographic partitioning**: each technology's bounding box is split into a named grid of cells
//! - **Validated topology**: elements, radio identities and QoS ranges are checked once at warm-up
//! - **Warm/cold topology cache**: built exactly once, then shared lock-free by every generator
//! - **Reproducible synthesis**: a seed fixes every record, whatever the execution mode
//! - **Parallel generation**: worker pool with backpressure, or a rayon batch
//! - **Failure isolation**: a record that cannot be built is reported in place and the run goes on
//! - **Two-party records**: weighted caller/called pairing, roaming, service categories with SMS details
//! - **Partial records**: long calls optionally cut at interval boundaries
//!
//! ## Quick Start
//!
//! ```rust
//! use cdr_synth::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let cache = TopologyCache::warmed(&NetworkConfig::sample(), &TechnologyRegistry::standard())?;
//! let customers = CustomerGenerator::new(Some(1)).generate_pool(10)?;
//!
//! let synthesizer = CdrSynthesizer::new(cache);
//! let mut rng = StdRng::seed_from_u64(42);
//! let customer = customers.choose(&mut rng);
//! let cdr = synthesizer.synthesize(customer, TechnologyId::FourG, &mut rng)?;
//!
//! assert_eq!(cdr.technology, TechnologyId::FourG);
//! assert_eq!(cdr.msisdn, customer.msisdn);
//! # Ok::<(), SimulationError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums, run configuration and the network document
//! - [`geo`]: bounding boxes, location cells and the grid partitioner
//! - [`network`]: technologies, network elements, service types and element templates
//! - [`subscriber`]: customers and the customer generator
//! - [`topology`]: the topology index and its warm/cold cache
//! - [`cdr`]: the CDR record and the synthesis engine
//! - [`simulation`]: generation driver, orchestration, output, statistics, logging and errors
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │     Geo     │    │   Network   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Bounding    │◄───┤ Elements    │
//! │ Config      │    │ Box, Cells  │    │ Services    │
//! │ Network doc │    │ Partition   │    │ Templates   │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Subscriber  │    │  Topology   │    │ Simulation  │
//! │             │    │             │    │             │
//! │ Customers   │◄───┤ Index       │◄───┤ Driver      │
//! │ Generator   │    │ Cache       │    │ Orchestrator│
//! └─────────────┘    └─────────────┘    └─────────────┘
//!                            ▲                   ▲
//!                            │                   │
//!                    ┌─────────────┐             │
//!                    │     CDR     │─────────────┘
//!                    │ Synthesizer │
//!                    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod cdr;
pub mod geo;
pub mod network;
pub mod simulation;
pub mod subscriber;
pub mod topology;
pub mod types;

// Core types and identifiers
pub use types::{
    CdrId, ConfigValidationError, CustomerId, ElementId, MixPolicy, NetworkConfig, OutputFormat,
    ServiceCategory, ServiceTypeId, SimulationConfig, TechnologyId,
};

// Geography
pub use geo::{partition, BoundingBox, GeoGrid, LocationCell};

// Topology entities
pub use network::{NetworkElement, QosRange, RadioIdentity, ServiceType, TechnologyRegistry};

// Subscribers
pub use subscriber::{Customer, CustomerGenerator, CustomerPool};

// Topology cache
pub use topology::{TopologyCache, TopologyIndex};

// CDR synthesis
pub use cdr::{Cdr, CdrSynthesizer, DurationPolicy, IntervalSplitter, PartialRecord, ServiceSelection, TimestampPolicy};

// Generation and orchestration
pub use simulation::{
    CancellationToken, GenerationDriver, GenerationError, GenerationStatistics,
    SimulationError, SimulationOrchestrator, SimulationResult, TechnologyMix,
};
