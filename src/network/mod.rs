//! Topology and service model
//!
//! - **TechnologyRegistry**: immutable table of supported technologies
//! - **NetworkElement**: a radio site with a technology-specific radio identity
//! - **ServiceType**: a service with its QoS envelope
//! - **ElementFactory**: expands element templates across a location grid

pub mod element;
pub mod factory;
pub mod service_type;
pub mod technology;

pub use element::*;
pub use factory::*;
pub use service_type::*;
pub use technology::*;
