//! Shared fixtures for integration tests

#![allow(dead_code)]

use cdr_synth::cdr::{CdrSynthesizer, DurationPolicy, TimestampPolicy};
use cdr_synth::network::TechnologyRegistry;
use cdr_synth::simulation::{GenerationDriver, TechnologyMix};
use cdr_synth::subscriber::{CustomerGenerator, CustomerPool};
use cdr_synth::topology::TopologyCache;
use cdr_synth::types::{
    BearerType, BoundingBoxConfig, NetworkConfig, NetworkElementDefinition, RangeDefinition,
    ServiceTypeDefinition, TechnologyNetworkConfig,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// QoS ranges in declaration order: jitter, latency, throughput, packet loss,
/// call setup time, MOS
pub type Ranges = [(f64, f64); 6];

pub const DATA_RANGES: Ranges = [
    (1.0, 10.0),
    (20.0, 60.0),
    (10.0, 150.0),
    (0.0, 1.5),
    (100.0, 800.0),
    (3.5, 4.5),
];

pub const VOICE_RANGES: Ranges = [
    (10.0, 50.0),
    (100.0, 300.0),
    (0.0096, 0.0144),
    (0.5, 3.0),
    (2000.0, 5000.0),
    (2.5, 3.8),
];

pub const CONSTANT_RANGES: Ranges = [
    (5.0, 5.0),
    (42.0, 42.0),
    (12.2, 12.2),
    (0.0, 0.0),
    (300.0, 300.0),
    (4.1, 4.1),
];

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn service(id: i64, name: &str, bearer: BearerType, ranges: Ranges) -> ServiceTypeDefinition {
    let range = |i: usize| Some(RangeDefinition::new(ranges[i].0, ranges[i].1));
    ServiceTypeDefinition {
        id,
        name: name.to_string(),
        description: format!("{} service", name),
        nodes: Vec::new(),
        bearer_type: Some(bearer),
        category: None,
        jitter: range(0),
        latency: range(1),
        throughput: range(2),
        packet_loss: range(3),
        call_setup_time: range(4),
        mos: range(5),
    }
}

pub fn lte_element(id: i64, location: &str) -> NetworkElementDefinition {
    NetworkElementDefinition {
        id,
        name: format!("eNB-{}", id),
        ip_address: Some(format!("10.4.0.{}", id)),
        tac: Some(4_000 + id as u32),
        location: Some(location.to_string()),
        ..Default::default()
    }
}

pub fn gsm_element(id: i64, location: &str) -> NetworkElementDefinition {
    NetworkElementDefinition {
        id,
        name: format!("BTS-{}", id),
        ip_address: Some(format!("10.2.0.{}", id)),
        cell_id: Some(200 + id as u32),
        location: Some(location.to_string()),
        ..Default::default()
    }
}

pub fn section(
    rows: usize,
    cols: usize,
    location_names: Vec<String>,
    network_elements: Vec<NetworkElementDefinition>,
    service_types: Vec<ServiceTypeDefinition>,
) -> TechnologyNetworkConfig {
    TechnologyNetworkConfig {
        split_rows: Some(rows),
        split_columns: Some(cols),
        location_names,
        network_elements,
        service_types,
        ..Default::default()
    }
}

/// Lat [10, 12] x lon [20, 22]; a working 4G grid A/B/C/D with one element
/// per cell, and a 2G grid without any element
pub fn two_by_two_network() -> NetworkConfig {
    let mut networks = BTreeMap::new();
    networks.insert(
        "4G".to_string(),
        section(
            2,
            2,
            names(&["A", "B", "C", "D"]),
            vec![lte_element(1, "A"), lte_element(2, "B"), lte_element(3, "C"), lte_element(4, "D")],
            vec![
                service(1, "Data", BearerType::PacketSwitched, DATA_RANGES),
                service(2, "VoLTE", BearerType::PacketSwitched, VOICE_RANGES),
            ],
        ),
    );
    networks.insert(
        "2G".to_string(),
        section(
            2,
            2,
            names(&["G1", "G2", "G3", "G4"]),
            Vec::new(),
            vec![service(3, "Voice", BearerType::CircuitSwitched, VOICE_RANGES)],
        ),
    );

    NetworkConfig {
        country: "Testland".to_string(),
        technologies: Vec::new(),
        bounding_box: Some(BoundingBoxConfig { latitude: [10.0, 12.0], longitude: [20.0, 22.0] }),
        networks,
    }
}

/// Same as [`two_by_two_network`] with a working 2G grid
pub fn fully_working_network() -> NetworkConfig {
    let mut network = two_by_two_network();
    if let Some(gsm) = network.networks.get_mut("2G") {
        gsm.network_elements = vec![gsm_element(11, "G1"), gsm_element(12, "G4")];
    }
    network
}

pub fn warm_cache(network: &NetworkConfig) -> Arc<TopologyCache> {
    TopologyCache::warmed(network, &TechnologyRegistry::standard()).unwrap()
}

pub fn customers(count: usize) -> Arc<CustomerPool> {
    Arc::new(CustomerGenerator::new(Some(99)).generate_pool(count).unwrap())
}

pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
}

pub fn synthesizer(cache: Arc<TopologyCache>) -> CdrSynthesizer {
    CdrSynthesizer::new(cache)
        .with_duration_policy(DurationPolicy::Uniform { min: 1, max: 3_600 })
        .with_timestamp_policy(TimestampPolicy::Window { start: fixed_start(), span_secs: 3_600 })
}

pub fn driver(network: &NetworkConfig, mix: TechnologyMix, seed: u64) -> GenerationDriver {
    GenerationDriver::new(synthesizer(warm_cache(network)), customers(50), mix, seed)
}
