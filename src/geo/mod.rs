//! Geographic model of the service area
//!
//! - **BoundingBox**: validated latitude/longitude rectangle
//! - **LocationCell**: a named rectangle of one technology's grid
//! - **partition**: splits a bounding box into a row-major grid of cells

pub mod bounds;
pub mod cell;
pub mod partition;

pub use bounds::*;
pub use cell::*;
pub use partition::*;
