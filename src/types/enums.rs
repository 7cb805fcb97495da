//! Enumeration types for the CDR generator
//!
//! This module contains all enumeration types used throughout the generator,
//! including network technologies, element status, bearer types, customer
//! classification, technology mix policies and output formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported radio access technologies
///
/// Ordering follows the technology generation, so maps keyed by this type
/// iterate 2G, 3G, 4G, 5G.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechnologyId {
    /// GSM
    #[serde(rename = "2G")]
    TwoG,
    /// UMTS
    #[serde(rename = "3G")]
    ThreeG,
    /// LTE
    #[serde(rename = "4G")]
    FourG,
    /// NR
    #[serde(rename = "5G")]
    FiveG,
}

/// Radio identity shape carried by network elements of a technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioIdentityKind {
    /// Cell identifier only
    CellOnly,
    /// Location area code plus cell identifier
    LocationArea,
    /// Tracking area code
    TrackingArea,
}

impl TechnologyId {
    /// All supported technologies in generation order
    pub const ALL: [TechnologyId; 4] =
        [TechnologyId::TwoG, TechnologyId::ThreeG, TechnologyId::FourG, TechnologyId::FiveG];

    /// Numeric code of the technology (1 = 2G ... 4 = 5G)
    pub fn code(self) -> u8 {
        match self {
            TechnologyId::TwoG => 1,
            TechnologyId::ThreeG => 2,
            TechnologyId::FourG => 3,
            TechnologyId::FiveG => 4,
        }
    }

    /// Resolve a numeric technology code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Canonical short name ("2G", "3G", ...)
    pub fn as_str(self) -> &'static str {
        match self {
            TechnologyId::TwoG => "2G",
            TechnologyId::ThreeG => "3G",
            TechnologyId::FourG => "4G",
            TechnologyId::FiveG => "5G",
        }
    }

    /// Radio identity shape required for elements of this technology
    pub fn radio_identity_kind(self) -> RadioIdentityKind {
        match self {
            TechnologyId::TwoG => RadioIdentityKind::CellOnly,
            TechnologyId::ThreeG => RadioIdentityKind::LocationArea,
            TechnologyId::FourG | TechnologyId::FiveG => RadioIdentityKind::TrackingArea,
        }
    }
}

impl fmt::Display for TechnologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechnologyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2g" | "gsm" => Ok(TechnologyId::TwoG),
            "3g" | "umts" => Ok(TechnologyId::ThreeG),
            "4g" | "lte" => Ok(TechnologyId::FourG),
            "5g" | "nr" => Ok(TechnologyId::FiveG),
            _ => Err(format!("Unknown network technology: {}", s)),
        }
    }
}

/// Operational status of a network element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElementStatus {
    /// Element is carrying traffic
    #[default]
    Active,
    /// Element is switched off
    Inactive,
    /// Element is under maintenance
    Maintenance,
}

impl fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementStatus::Active => write!(f, "active"),
            ElementStatus::Inactive => write!(f, "inactive"),
            ElementStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// Bearer used by a service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BearerType {
    /// Circuit-switched bearer (classic voice)
    #[serde(alias = "Circuit-Switched", alias = "CS")]
    CircuitSwitched,
    /// Packet-switched bearer (data, VoLTE, VoNR)
    #[serde(alias = "Packet-Switched", alias = "PS")]
    PacketSwitched,
    /// Signalling channel bearer (SMS over signalling)
    Signalling,
}

impl fmt::Display for BearerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BearerType::CircuitSwitched => write!(f, "Circuit Switched"),
            BearerType::PacketSwitched => write!(f, "Packet Switched"),
            BearerType::Signalling => write!(f, "Signalling"),
        }
    }
}

/// Where a subscriber is homed relative to the simulated network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerType {
    /// Subscriber of the simulated operator
    Home,
    /// Subscriber of another operator in the same country
    National,
    /// Subscriber of a foreign operator
    International,
}

impl CustomerType {
    /// Every customer type, in selection order
    pub const ALL: [CustomerType; 3] =
        [CustomerType::Home, CustomerType::National, CustomerType::International];

    /// Relative weight when picking the type of a calling or called party
    pub fn party_weight(self) -> u32 {
        match self {
            CustomerType::Home => 60,
            CustomerType::National => 39,
            CustomerType::International => 1,
        }
    }

    /// Whether a subscriber of this type is away from the home network
    pub fn is_roaming(self) -> bool {
        self != CustomerType::Home
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Home => write!(f, "Home"),
            CustomerType::National => write!(f, "National"),
            CustomerType::International => write!(f, "International"),
        }
    }
}

/// Traffic category of a service type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    /// Circuit or packet switched calls
    Voice,
    /// Short messages
    Sms,
    /// Data sessions
    #[default]
    Data,
    /// Anything else
    Other,
}

impl ServiceCategory {
    /// Every category
    pub const ALL: [ServiceCategory; 4] =
        [ServiceCategory::Voice, ServiceCategory::Sms, ServiceCategory::Data, ServiceCategory::Other];

    /// Guess the category from a service type name
    pub fn infer(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("sms") || name.contains("message") {
            ServiceCategory::Sms
        } else if name.contains("voice") || name.starts_with("vo") || name.contains("call") {
            ServiceCategory::Voice
        } else if ["data", "internet", "embb", "browsing", "streaming"].iter().any(|k| name.contains(k)) {
            ServiceCategory::Data
        } else {
            ServiceCategory::Other
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCategory::Voice => write!(f, "voice"),
            ServiceCategory::Sms => write!(f, "sms"),
            ServiceCategory::Data => write!(f, "data"),
            ServiceCategory::Other => write!(f, "other"),
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "voice" => Ok(ServiceCategory::Voice),
            "sms" => Ok(ServiceCategory::Sms),
            "data" => Ok(ServiceCategory::Data),
            "other" => Ok(ServiceCategory::Other),
            _ => Err(format!("Unknown service category: {}", s)),
        }
    }
}

/// Delivery outcome of a short message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Message reached the called party
    Delivered,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

/// Billing relationship of a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Pay before use
    Prepaid,
    /// Invoiced after use
    Postpaid,
}

/// Lifecycle status of a subscriber account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CustomerStatus {
    /// Account in service
    #[default]
    Active,
    /// Account temporarily barred
    Suspended,
    /// Account closed
    Terminated,
}

/// How the generation driver chooses a technology for each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MixPolicy {
    /// Uniform random choice over the configured technologies
    #[default]
    Uniform,
    /// Random choice proportional to the configured weights
    Weighted,
    /// Strict rotation over the configured technologies
    RoundRobin,
    /// Rotation where each technology occupies `weight` consecutive slots
    WeightedRoundRobin,
}

impl fmt::Display for MixPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixPolicy::Uniform => write!(f, "uniform"),
            MixPolicy::Weighted => write!(f, "weighted"),
            MixPolicy::RoundRobin => write!(f, "round_robin"),
            MixPolicy::WeightedRoundRobin => write!(f, "weighted_round_robin"),
        }
    }
}

impl FromStr for MixPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "uniform" => Ok(MixPolicy::Uniform),
            "weighted" => Ok(MixPolicy::Weighted),
            "round_robin" | "roundrobin" => Ok(MixPolicy::RoundRobin),
            "weighted_round_robin" | "weightedroundrobin" => Ok(MixPolicy::WeightedRoundRobin),
            _ => Err(format!("Unknown technology mix policy: {}", s)),
        }
    }
}

/// Shape of the call duration distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DurationProfile {
    /// Uniform within the configured min/max seconds
    #[default]
    Uniform,
    /// Mostly short calls, some zero-length attempts and a long tail
    CallProfile,
}

impl FromStr for DurationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "uniform" => Ok(DurationProfile::Uniform),
            "call_profile" | "call" => Ok(DurationProfile::CallProfile),
            _ => Err(format!("Unknown duration profile: {}", s)),
        }
    }
}

/// Output format options for generated records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Comma separated values with a header row
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technology_codes_round_trip() {
        for tech in TechnologyId::ALL {
            assert_eq!(TechnologyId::from_code(tech.code()), Some(tech));
        }
        assert_eq!(TechnologyId::from_code(0), None);
        assert_eq!(TechnologyId::from_code(5), None);
    }

    #[test]
    fn test_technology_parsing() {
        assert_eq!("2G".parse::<TechnologyId>().unwrap(), TechnologyId::TwoG);
        assert_eq!("lte".parse::<TechnologyId>().unwrap(), TechnologyId::FourG);
        assert_eq!(" 5g ".parse::<TechnologyId>().unwrap(), TechnologyId::FiveG);
        assert!("6G".parse::<TechnologyId>().is_err());
    }

    #[test]
    fn test_technology_serde_uses_short_names() {
        let json = serde_json::to_string(&TechnologyId::ThreeG).unwrap();
        assert_eq!(json, "\"3G\"");
        let parsed: TechnologyId = serde_json::from_str("\"4G\"").unwrap();
        assert_eq!(parsed, TechnologyId::FourG);
    }

    #[test]
    fn test_radio_identity_kinds() {
        assert_eq!(TechnologyId::TwoG.radio_identity_kind(), RadioIdentityKind::CellOnly);
        assert_eq!(TechnologyId::ThreeG.radio_identity_kind(), RadioIdentityKind::LocationArea);
        assert_eq!(TechnologyId::FourG.radio_identity_kind(), RadioIdentityKind::TrackingArea);
        assert_eq!(TechnologyId::FiveG.radio_identity_kind(), RadioIdentityKind::TrackingArea);
    }

    #[test]
    fn test_mix_policy_parsing() {
        assert_eq!("uniform".parse::<MixPolicy>().unwrap(), MixPolicy::Uniform);
        assert_eq!("round-robin".parse::<MixPolicy>().unwrap(), MixPolicy::RoundRobin);
        assert_eq!(
            "weighted_round_robin".parse::<MixPolicy>().unwrap(),
            MixPolicy::WeightedRoundRobin
        );
        assert!("random".parse::<MixPolicy>().is_err());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(format!("{}", OutputFormat::Csv), "CSV");
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_bearer_type_aliases() {
        let bearer: BearerType = serde_json::from_str("\"Packet-Switched\"").unwrap();
        assert_eq!(bearer, BearerType::PacketSwitched);
    }

    #[test]
    fn test_service_category_inference() {
        assert_eq!(ServiceCategory::infer("Voice"), ServiceCategory::Voice);
        assert_eq!(ServiceCategory::infer("VoLTE"), ServiceCategory::Voice);
        assert_eq!(ServiceCategory::infer("VoNR"), ServiceCategory::Voice);
        assert_eq!(ServiceCategory::infer("SMS"), ServiceCategory::Sms);
        assert_eq!(ServiceCategory::infer("Data"), ServiceCategory::Data);
        assert_eq!(ServiceCategory::infer("eMBB"), ServiceCategory::Data);
        assert_eq!(ServiceCategory::infer("USSD"), ServiceCategory::Other);
        assert_eq!(" SMS ".parse::<ServiceCategory>().unwrap(), ServiceCategory::Sms);
        assert!("fax".parse::<ServiceCategory>().is_err());
    }

    #[test]
    fn test_customer_type_party_weights() {
        let total: u32 = CustomerType::ALL.iter().map(|t| t.party_weight()).sum();
        assert_eq!(total, 100);
        assert!(!CustomerType::Home.is_roaming());
        assert!(CustomerType::National.is_roaming());
        assert!(CustomerType::International.is_roaming());
    }
}
