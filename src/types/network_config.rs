//! Declarative network document
//!
//! This module contains the serde structures of the network description that
//! drives topology construction: technologies, service area, grid split
//! factors, location names, network elements and service types. The document
//! is parsed as-is; all semantic validation happens when the topology cache
//! is warmed.

use super::{BearerType, ConfigError, ElementStatus, ServiceCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Top-level network document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Country or market the network is located in
    #[serde(default)]
    pub country: String,

    /// Technology table; the standard 2G-5G table is used when empty
    #[serde(default)]
    pub technologies: Vec<TechnologyDefinition>,

    /// Service area shared by every technology without its own box
    #[serde(default)]
    pub bounding_box: Option<BoundingBoxConfig>,

    /// Per-technology sections keyed by technology ("2G", "3G", ...)
    pub networks: BTreeMap<String, TechnologyNetworkConfig>,
}

/// Definition of one network technology
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechnologyDefinition {
    /// Technology identifier ("2G", "3G", "4G", "5G")
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Latitude and longitude pairs of a rectangular service area
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBoxConfig {
    /// [min, max] latitude in degrees
    pub latitude: [f64; 2],
    /// [min, max] longitude in degrees
    pub longitude: [f64; 2],
}

/// Network description of a single technology
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TechnologyNetworkConfig {
    /// Service area override for this technology
    #[serde(default)]
    pub bounding_box: Option<BoundingBoxConfig>,

    /// Number of latitude bands
    #[serde(default)]
    pub split_rows: Option<usize>,

    /// Number of longitude bands
    #[serde(default)]
    pub split_columns: Option<usize>,

    /// Cell names consumed row-major, south to north and west to east
    #[serde(default)]
    pub location_names: Vec<String>,

    /// Explicitly defined network elements
    #[serde(default)]
    pub network_elements: Vec<NetworkElementDefinition>,

    /// Templates expanded into elements for every location cell
    #[serde(default)]
    pub element_templates: Vec<ElementTemplate>,

    /// Service types offered on this technology
    #[serde(default)]
    pub service_types: Vec<ServiceTypeDefinition>,
}

/// Raw network element definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NetworkElementDefinition {
    /// Element identifier (> 0)
    pub id: i64,
    /// Element name
    #[serde(default)]
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Management IP address
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Operational status (defaults to active)
    #[serde(default)]
    pub status: Option<ElementStatus>,
    /// Tracking area code (4G/5G)
    #[serde(default)]
    pub tac: Option<u32>,
    /// Location area code (3G)
    #[serde(default)]
    pub lac: Option<u32>,
    /// Cell identifier (2G/3G)
    #[serde(default)]
    pub cell_id: Option<u32>,
    /// Explicit binding to a location cell by name
    #[serde(default)]
    pub location: Option<String>,
    /// Site position [latitude, longitude], bound by containment
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
}

/// Template describing elements generated in every location cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementTemplate {
    /// Element kind, e.g. "BTS", "NodeB", "eNodeB", "gNodeB"
    pub kind: String,
    /// Description applied to generated elements
    #[serde(default)]
    pub description: String,
    /// Number of elements generated per location cell
    #[serde(default = "default_per_cell")]
    pub per_cell: usize,
}

fn default_per_cell() -> usize {
    1
}

/// Inclusive [min, max] range of a QoS attribute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeDefinition {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl RangeDefinition {
    /// Shorthand constructor
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Raw service type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceTypeDefinition {
    /// Service type identifier (> 0)
    pub id: i64,
    /// Service name ("Voice", "SMS", "Data", ...)
    #[serde(default)]
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Network nodes involved in delivering the service
    #[serde(default)]
    pub nodes: Vec<String>,
    /// Bearer used by the service
    #[serde(default)]
    pub bearer_type: Option<BearerType>,
    /// Traffic category; inferred from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategory>,
    /// Jitter in milliseconds
    #[serde(default)]
    pub jitter: Option<RangeDefinition>,
    /// Latency in milliseconds
    #[serde(default)]
    pub latency: Option<RangeDefinition>,
    /// Throughput in Mbit/s
    #[serde(default)]
    pub throughput: Option<RangeDefinition>,
    /// Packet loss in percent
    #[serde(default)]
    pub packet_loss: Option<RangeDefinition>,
    /// Call setup time in milliseconds
    #[serde(default)]
    pub call_setup_time: Option<RangeDefinition>,
    /// Mean opinion score
    #[serde(default)]
    pub mos: Option<RangeDefinition>,
}

impl NetworkConfig {
    /// Load a network document from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                Ok(serde_json::from_str(&content)?)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Serialize the document as pretty JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Service area of a technology section, falling back to the shared box
    pub fn bounding_box_for(&self, section: &TechnologyNetworkConfig) -> Option<BoundingBoxConfig> {
        section.bounding_box.or(self.bounding_box)
    }

    /// A complete four-technology sample network
    ///
    /// Used as the `--print-network` template and as a ready-made topology in
    /// tests and demos.
    pub fn sample() -> Self {
        let names = |prefix: &str, count: usize| -> Vec<String> {
            (1..=count).map(|i| format!("{}-{:02}", prefix, i)).collect()
        };

        let mut networks = BTreeMap::new();

        networks.insert(
            "2G".to_string(),
            TechnologyNetworkConfig {
                split_rows: Some(2),
                split_columns: Some(2),
                location_names: names("TUN-2G", 4),
                element_templates: vec![ElementTemplate {
                    kind: "BTS".to_string(),
                    description: "Base Transceiver Station".to_string(),
                    per_cell: 2,
                }],
                service_types: vec![
                    service(1, "Voice", BearerType::CircuitSwitched, &["BTS", "BSC", "MSC"], [
                        (10.0, 50.0),
                        (100.0, 300.0),
                        (0.0096, 0.0144),
                        (0.5, 3.0),
                        (2000.0, 5000.0),
                        (2.5, 3.8),
                    ]),
                    service(2, "SMS", BearerType::Signalling, &["BTS", "BSC", "SMSC"], [
                        (0.0, 0.0),
                        (500.0, 2000.0),
                        (0.0, 0.0),
                        (0.0, 1.0),
                        (1000.0, 3000.0),
                        (1.0, 1.0),
                    ]),
                ],
                ..Default::default()
            },
        );

        networks.insert(
            "3G".to_string(),
            TechnologyNetworkConfig {
                split_rows: Some(2),
                split_columns: Some(3),
                location_names: names("TUN-3G", 6),
                element_templates: vec![ElementTemplate {
                    kind: "NodeB".to_string(),
                    description: "UMTS base station".to_string(),
                    per_cell: 2,
                }],
                service_types: vec![
                    service(3, "Voice", BearerType::CircuitSwitched, &["NodeB", "RNC", "MSC"], [
                        (5.0, 30.0),
                        (80.0, 200.0),
                        (0.0122, 0.0122),
                        (0.1, 2.0),
                        (1500.0, 4000.0),
                        (3.0, 4.0),
                    ]),
                    service(4, "Data", BearerType::PacketSwitched, &["NodeB", "RNC", "SGSN", "GGSN"], [
                        (5.0, 40.0),
                        (50.0, 150.0),
                        (0.384, 42.0),
                        (0.1, 2.0),
                        (100.0, 500.0),
                        (3.0, 4.0),
                    ]),
                ],
                ..Default::default()
            },
        );

        networks.insert(
            "4G".to_string(),
            TechnologyNetworkConfig {
                split_rows: Some(3),
                split_columns: Some(3),
                location_names: names("TUN-4G", 9),
                element_templates: vec![ElementTemplate {
                    kind: "eNodeB".to_string(),
                    description: "LTE base station".to_string(),
                    per_cell: 3,
                }],
                service_types: vec![
                    service(5, "VoLTE", BearerType::PacketSwitched, &["eNodeB", "MME", "SGW", "PGW", "IMS"], [
                        (1.0, 20.0),
                        (20.0, 80.0),
                        (0.012, 0.064),
                        (0.0, 1.0),
                        (250.0, 1500.0),
                        (3.5, 4.4),
                    ]),
                    service(6, "Data", BearerType::PacketSwitched, &["eNodeB", "SGW", "PGW"], [
                        (1.0, 30.0),
                        (20.0, 100.0),
                        (1.0, 150.0),
                        (0.0, 1.0),
                        (50.0, 300.0),
                        (3.5, 4.5),
                    ]),
                ],
                ..Default::default()
            },
        );

        networks.insert(
            "5G".to_string(),
            TechnologyNetworkConfig {
                split_rows: Some(2),
                split_columns: Some(2),
                location_names: names("TUN-5G", 4),
                element_templates: vec![ElementTemplate {
                    kind: "gNodeB".to_string(),
                    description: "NR base station".to_string(),
                    per_cell: 2,
                }],
                service_types: vec![service(
                    7,
                    "eMBB",
                    BearerType::PacketSwitched,
                    &["gNodeB", "AMF", "UPF"],
                    [
                        (0.5, 10.0),
                        (1.0, 20.0),
                        (50.0, 2000.0),
                        (0.0, 0.5),
                        (10.0, 100.0),
                        (4.0, 4.8),
                    ],
                )],
                ..Default::default()
            },
        );

        Self {
            country: "Tunisia".to_string(),
            technologies: Vec::new(),
            bounding_box: Some(BoundingBoxConfig { latitude: [30.0, 37.5], longitude: [7.5, 11.6] }),
            networks,
        }
    }
}

/// Build a service type definition from six (min, max) pairs in the order
/// jitter, latency, throughput, packet loss, call setup time, MOS
fn service(
    id: i64,
    name: &str,
    bearer_type: BearerType,
    nodes: &[&str],
    ranges: [(f64, f64); 6],
) -> ServiceTypeDefinition {
    let [jitter, latency, throughput, packet_loss, call_setup_time, mos] =
        ranges.map(|(min, max)| Some(RangeDefinition::new(min, max)));
    ServiceTypeDefinition {
        id,
        name: name.to_string(),
        description: format!("{} service", name),
        nodes: nodes.iter().map(|n| n.to_string()).collect(),
        bearer_type: Some(bearer_type),
        category: None,
        jitter,
        latency,
        throughput,
        packet_loss,
        call_setup_time,
        mos,
    }
}
