//! Identifier types for the CDR generator
//!
//! Topology entities (network elements, service types, customers) carry the
//! positive numeric identifiers assigned in configuration. CDRs carry a UUID
//! drawn from the generator's random stream so that seeded runs reproduce the
//! same identifiers.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Identifier of a network element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NE_{}", self.0)
    }
}

/// Identifier of a service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTypeId(pub u32);

impl fmt::Display for ServiceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SVC_{}", self.0)
    }
}

/// Identifier of a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CUST_{}", self.0)
    }
}

/// Unique identifier for a generated CDR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CdrId(pub Uuid);

impl CdrId {
    /// Create a new random CDR ID from system entropy
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Draw a version 4 UUID from the given random source
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Id of piece `segment` of a split call; piece 1 keeps the call's id
    pub fn segment(&self, segment: u32) -> Self {
        if segment <= 1 {
            return *self;
        }
        let mask = u128::from(segment).wrapping_mul(0x9E37_79B9_7F4A_7C15_F39C_C060_5CED_C835);
        Self(uuid::Builder::from_random_bytes((self.0.as_u128() ^ mask).to_be_bytes()).into_uuid())
    }
}

impl Default for CdrId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CdrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CDR_{}", self.0.simple())
    }
}

impl Serialize for CdrId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("CDR_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for CdrId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("CDR_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(CdrId(uuid))
    }
}
