//! Subscriber model
//!
//! - **Customer**: a subscriber with MSISDN, IMSI and IMEI
//! - **CustomerPool**: the validated, non-empty population records are drawn for
//! - **CustomerGenerator**: seeded population generator

pub mod customer;
pub mod generator;

pub use customer::*;
pub use generator::*;
