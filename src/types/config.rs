//! Configuration structures for the CDR generator
//!
//! This module contains the generation configuration structure and validation
//! logic used to control how many records are produced, how technologies are
//! mixed, how durations and timestamps are drawn and where output goes.

use super::{DurationProfile, MixPolicy, OutputFormat, ServiceCategory, TechnologyId};
use crate::cdr::offset_by;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Generation defaults
pub mod defaults {
    use super::ServiceCategory;

    /// Records produced when no count is configured
    pub const RECORD_COUNT: u64 = 1_000;

    /// Bounded channel capacity per worker
    pub const CHANNEL_CAPACITY: usize = 256;

    /// Shortest generated call in seconds
    pub const MIN_DURATION_SECS: u32 = 1;

    /// Longest generated call in seconds
    pub const MAX_DURATION_SECS: u32 = 3_600;

    /// Timestamp window length (30 minutes)
    pub const WINDOW_SECS: u64 = 1_800;

    /// Longest accepted timestamp window (100 years)
    pub const MAX_WINDOW_SECS: u64 = 100 * 366 * 86_400;

    /// Size of the generated customer population
    pub const CUSTOMER_COUNT: usize = 1_000;

    /// Service category weights selected by `--service-mix standard`
    pub const SERVICE_CATEGORY_WEIGHTS: [(ServiceCategory, u32); 4] = [
        (ServiceCategory::Voice, 40),
        (ServiceCategory::Sms, 10),
        (ServiceCategory::Data, 45),
        (ServiceCategory::Other, 5),
    ];
}

/// Technology selection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TechnologyMixConfig {
    /// Selection policy
    #[serde(default)]
    pub policy: MixPolicy,

    /// Technologies to draw from; every configured technology when empty
    #[serde(default)]
    pub technologies: Vec<TechnologyId>,

    /// Relative weights for the weighted policies
    #[serde(default)]
    pub weights: BTreeMap<TechnologyId, u32>,
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser, Default)]
#[command(
    name = "cdr-synth",
    version = "0.1.0",
    about = "CDR Synth - Generates synthetic Call Detail Records for telecom network simulation",
    long_about = "Generates internally consistent synthetic Call Detail Records from a declarative description of a 2G/3G/4G/5G network: service area, location grid, network elements and service types with QoS ranges.

EXAMPLES:
    # Generate 1000 records against the built-in sample network
    cdr-synth

    # Use a network document and a configuration file
    cdr-synth --network network.json --config config.json

    # Reproducible run across 4 workers, written as CSV
    cdr-synth --count 100000 --seed 42 --workers 4 --output-format csv --output cdrs.csv

    # Generate templates
    cdr-synth --print-config > my-config.json
    cdr-synth --print-network > my-network.json

    # Validate configuration and warm the topology without generating
    cdr-synth --network my-network.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Network document path
    #[arg(
        long,
        help = "Network document path (JSON format)",
        long_help = "Path to the JSON network document describing technologies, service area, elements and service types. The built-in sample network is used when omitted."
    )]
    pub network: Option<String>,

    /// Number of records to generate
    #[arg(
        short = 'n',
        long,
        help = "Number of records to generate",
        long_help = "Number of CDRs to generate. Must be greater than 0. Default: 1000"
    )]
    pub count: Option<u64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Number of worker threads
    #[arg(
        short,
        long,
        help = "Number of generation workers",
        long_help = "Number of worker threads. 1 generates sequentially on the calling thread. Default: number of CPUs"
    )]
    pub workers: Option<usize>,

    /// Bounded channel capacity per worker
    #[arg(long, help = "Bounded channel capacity per worker")]
    pub channel_capacity: Option<usize>,

    /// Technology selection policy
    #[arg(
        long,
        help = "Technology mix policy (uniform, weighted, round_robin, weighted_round_robin)"
    )]
    pub mix: Option<String>,

    /// Technologies to generate for
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma separated technologies to generate for (e.g. 2G,4G)"
    )]
    pub technologies: Option<Vec<String>>,

    /// Minimum call duration in seconds
    #[arg(long, help = "Minimum call duration in seconds")]
    pub min_duration: Option<u32>,

    /// Maximum call duration in seconds
    #[arg(long, help = "Maximum call duration in seconds")]
    pub max_duration: Option<u32>,

    /// Call duration distribution
    #[arg(long, help = "Call duration profile (uniform or call_profile)")]
    pub duration_profile: Option<String>,

    /// Start of the timestamp window
    #[arg(
        long,
        help = "Start of the timestamp window (RFC 3339)",
        long_help = "Start of the window CDR start times are drawn from, in RFC 3339 format. Defaults to the time the run starts."
    )]
    pub start_time: Option<String>,

    /// Length of the timestamp window in seconds
    #[arg(long, help = "Length of the timestamp window in seconds")]
    pub window_secs: Option<u64>,

    /// Service category weights
    #[arg(
        long,
        value_delimiter = ',',
        help = "Service category weights (e.g. voice=40,sms=10,data=45,other=5, or standard)",
        long_help = "Weights for picking the service category of each record. Categories a technology does not offer are skipped. 'standard' selects voice=40,sms=10,data=45,other=5. Service types are picked uniformly when omitted."
    )]
    pub service_mix: Option<Vec<String>>,

    /// Interval at which long calls are split into partial records
    #[arg(
        long,
        help = "Split calls crossing interval boundaries into partial records (seconds)",
        long_help = "Cut calls and sessions at every multiple of this many seconds since the Unix epoch and write one partial record per piece. 1800 cuts at :00 and :30. SMS records are never split."
    )]
    pub split_interval: Option<u64>,

    /// Size of the generated customer population
    #[arg(long, help = "Number of customers to generate")]
    pub customer_count: Option<usize>,

    /// Customer population file
    #[arg(long, help = "Customer population file (JSON array)")]
    pub customers: Option<String>,

    /// Output format for generated records
    #[arg(
        long,
        help = "Output format (json or csv)",
        long_help = "Output format for generated records. Supported formats: json (one object per line), csv. Default: json"
    )]
    pub output_format: Option<String>,

    /// Output file path
    #[arg(short, long, help = "Output file path (stdout when omitted)")]
    pub output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    /// Directory for daily rolling log files
    #[arg(long, help = "Also write logs to daily rolling files in this directory")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without generating
    #[arg(long, help = "Validate configuration and network without generating records")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,

    /// Print the sample network document and exit
    #[arg(long, help = "Print the sample network document in JSON format and exit")]
    pub print_network: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Network document path
    pub network_config: Option<String>,

    /// Number of records to generate
    pub record_count: Option<u64>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Number of worker threads
    pub workers: Option<usize>,

    /// Bounded channel capacity per worker
    pub channel_capacity: Option<usize>,

    /// Technology selection settings
    pub technology_mix: Option<TechnologyMixConfig>,

    /// Minimum call duration in seconds
    pub min_duration_secs: Option<u32>,

    /// Maximum call duration in seconds
    pub max_duration_secs: Option<u32>,

    /// Call duration distribution
    pub duration_profile: Option<DurationProfile>,

    /// Start of the timestamp window
    pub start_time: Option<DateTime<Utc>>,

    /// Length of the timestamp window in seconds
    pub window_secs: Option<u64>,

    /// Service category weights
    pub service_categories: Option<BTreeMap<ServiceCategory, u32>>,

    /// Interval at which long calls are split into partial records
    pub split_interval_secs: Option<u64>,

    /// Size of the generated customer population
    pub customer_count: Option<usize>,

    /// Customer population file
    pub customers_file: Option<String>,

    /// Output format for generated records
    pub output_format: Option<String>,

    /// Output file path
    pub output_path: Option<String>,
}

/// Configuration for a CDR generation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Network document path; the sample network is used when unset
    pub network_config: Option<String>,

    /// Number of records to generate
    pub record_count: u64,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Number of worker threads (1 = sequential)
    pub workers: usize,

    /// Bounded channel capacity per worker
    pub channel_capacity: usize,

    /// Technology selection settings
    pub technology_mix: TechnologyMixConfig,

    /// Minimum call duration in seconds
    pub min_duration_secs: u32,

    /// Maximum call duration in seconds
    pub max_duration_secs: u32,

    /// Call duration distribution
    pub duration_profile: DurationProfile,

    /// Start of the timestamp window; the run start time when unset
    pub start_time: Option<DateTime<Utc>>,

    /// Length of the timestamp window in seconds (0 stamps every record with the start)
    pub window_secs: u64,

    /// Service category weights; service types are picked uniformly when empty
    #[serde(default)]
    pub service_categories: BTreeMap<ServiceCategory, u32>,

    /// Split calls at multiples of this many seconds; no splitting when unset
    #[serde(default)]
    pub split_interval_secs: Option<u64>,

    /// Size of the generated customer population
    pub customer_count: usize,

    /// Customer population file; replaces the generated population when set
    pub customers_file: Option<String>,

    /// Output format for generated records
    pub output_format: String,

    /// Output file path; stdout when unset
    pub output_path: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// A command line value could not be parsed
    #[error("Invalid value for --{flag}: {reason}")]
    InvalidArgument {
        /// Flag name without dashes
        flag: &'static str,
        /// Parse failure
        reason: String,
    },
}

/// Validation errors for generation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Record count is invalid
    #[error("Record count must be greater than 0, got {0}")]
    InvalidRecordCount(u64),

    /// Worker count is invalid
    #[error("Worker count must be greater than 0, got {0}")]
    InvalidWorkerCount(usize),

    /// Channel capacity is invalid
    #[error("Channel capacity must be greater than 0, got {0}")]
    InvalidChannelCapacity(usize),

    /// Duration range is invalid
    #[error("Invalid duration range: min ({0}) must be <= max ({1})")]
    InvalidDurationRange(u32, u32),

    /// Timestamp window cannot be represented
    #[error("Timestamp window of {0} s is too long (max {max} s from the window start)", max = defaults::MAX_WINDOW_SECS)]
    InvalidWindow(u64),

    /// Split interval is zero or too long
    #[error("Split interval must be between 1 and {max} s, got {0}", max = defaults::MAX_WINDOW_SECS)]
    InvalidSplitInterval(u64),

    /// Service category weights are all zero
    #[error("Service category weights require at least one positive weight")]
    MissingServiceCategoryWeights,

    /// Customer count is invalid
    #[error("Customer count must be greater than 0, got {0}")]
    InvalidCustomerCount(usize),

    /// Output format is not supported
    #[error("Unknown output format: {0}")]
    InvalidOutputFormat(String),

    /// Weighted mix has no positive weight
    #[error("Mix policy {0} requires at least one positive weight")]
    MissingMixWeights(MixPolicy),

    /// Technology appears twice in the mix
    #[error("Technology {0} listed more than once in the mix")]
    DuplicateMixTechnology(TechnologyId),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            network_config: None,
            record_count: defaults::RECORD_COUNT,
            seed: None,
            workers: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            channel_capacity: defaults::CHANNEL_CAPACITY,
            technology_mix: TechnologyMixConfig::default(),
            min_duration_secs: defaults::MIN_DURATION_SECS,
            max_duration_secs: defaults::MAX_DURATION_SECS,
            duration_profile: DurationProfile::default(),
            start_time: None,
            window_secs: defaults::WINDOW_SECS,
            service_categories: BTreeMap::new(),
            split_interval_secs: None,
            customer_count: defaults::CUSTOMER_COUNT,
            customers_file: None,
            output_format: "json".to_string(),
            output_path: None,
        }
    }
}

impl SimulationConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args)?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            network_config: config_file.network_config.or(defaults.network_config),
            record_count: config_file.record_count.unwrap_or(defaults.record_count),
            seed: config_file.seed.or(defaults.seed),
            workers: config_file.workers.unwrap_or(defaults.workers),
            channel_capacity: config_file.channel_capacity.unwrap_or(defaults.channel_capacity),
            technology_mix: config_file.technology_mix.unwrap_or(defaults.technology_mix),
            min_duration_secs: config_file.min_duration_secs.unwrap_or(defaults.min_duration_secs),
            max_duration_secs: config_file.max_duration_secs.unwrap_or(defaults.max_duration_secs),
            duration_profile: config_file.duration_profile.unwrap_or(defaults.duration_profile),
            start_time: config_file.start_time.or(defaults.start_time),
            window_secs: config_file.window_secs.unwrap_or(defaults.window_secs),
            service_categories: config_file.service_categories.unwrap_or(defaults.service_categories),
            split_interval_secs: config_file.split_interval_secs.or(defaults.split_interval_secs),
            customer_count: config_file.customer_count.unwrap_or(defaults.customer_count),
            customers_file: config_file.customers_file.or(defaults.customers_file),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
            output_path: config_file.output_path.or(defaults.output_path),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) -> Result<(), ConfigError> {
        if let Some(value) = args.network {
            config.network_config = Some(value);
        }
        if let Some(value) = args.count {
            config.record_count = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.workers {
            config.workers = value;
        }
        if let Some(value) = args.channel_capacity {
            config.channel_capacity = value;
        }
        if let Some(value) = args.mix {
            config.technology_mix.policy = value
                .parse()
                .map_err(|reason| ConfigError::InvalidArgument { flag: "mix", reason })?;
        }
        if let Some(values) = args.technologies {
            config.technology_mix.technologies = values
                .iter()
                .map(|v| v.parse::<TechnologyId>())
                .collect::<Result<_, _>>()
                .map_err(|reason| ConfigError::InvalidArgument { flag: "technologies", reason })?;
        }
        if let Some(value) = args.min_duration {
            config.min_duration_secs = value;
        }
        if let Some(value) = args.max_duration {
            config.max_duration_secs = value;
        }
        if let Some(value) = args.duration_profile {
            config.duration_profile = value.parse().map_err(|reason| {
                ConfigError::InvalidArgument { flag: "duration-profile", reason }
            })?;
        }
        if let Some(value) = args.start_time {
            let parsed = DateTime::parse_from_rfc3339(&value).map_err(|e| {
                ConfigError::InvalidArgument { flag: "start-time", reason: e.to_string() }
            })?;
            config.start_time = Some(parsed.with_timezone(&Utc));
        }
        if let Some(value) = args.window_secs {
            config.window_secs = value;
        }
        if let Some(values) = args.service_mix {
            config.service_categories = parse_service_mix(&values)
                .map_err(|reason| ConfigError::InvalidArgument { flag: "service-mix", reason })?;
        }
        if let Some(value) = args.split_interval {
            config.split_interval_secs = Some(value);
        }
        if let Some(value) = args.customer_count {
            config.customer_count = value;
        }
        if let Some(value) = args.customers {
            config.customers_file = Some(value);
        }
        if let Some(value) = args.output_format {
            config.output_format = value;
        }
        if let Some(value) = args.output {
            config.output_path = Some(value);
        }
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.record_count == 0 {
            return Err(ConfigValidationError::InvalidRecordCount(self.record_count));
        }

        if self.workers == 0 {
            return Err(ConfigValidationError::InvalidWorkerCount(self.workers));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigValidationError::InvalidChannelCapacity(self.channel_capacity));
        }

        if self.min_duration_secs > self.max_duration_secs {
            return Err(ConfigValidationError::InvalidDurationRange(
                self.min_duration_secs,
                self.max_duration_secs,
            ));
        }

        if self.window_secs > defaults::MAX_WINDOW_SECS {
            return Err(ConfigValidationError::InvalidWindow(self.window_secs));
        }
        if let Some(start) = self.start_time {
            let latest = u64::from(self.max_duration_secs).saturating_add(self.window_secs);
            if offset_by(start, latest).is_none() {
                return Err(ConfigValidationError::InvalidWindow(self.window_secs));
            }
        }

        if let Some(interval) = self.split_interval_secs {
            if interval == 0 || interval > defaults::MAX_WINDOW_SECS {
                return Err(ConfigValidationError::InvalidSplitInterval(interval));
            }
        }

        if !self.service_categories.is_empty() && !self.service_categories.values().any(|w| *w > 0) {
            return Err(ConfigValidationError::MissingServiceCategoryWeights);
        }

        if self.customers_file.is_none() && self.customer_count == 0 {
            return Err(ConfigValidationError::InvalidCustomerCount(self.customer_count));
        }

        if self.get_output_format().is_err() {
            return Err(ConfigValidationError::InvalidOutputFormat(self.output_format.clone()));
        }

        let mix = &self.technology_mix;
        let mut seen = Vec::with_capacity(mix.technologies.len());
        for technology in &mix.technologies {
            if seen.contains(technology) {
                return Err(ConfigValidationError::DuplicateMixTechnology(*technology));
            }
            seen.push(*technology);
        }

        if matches!(mix.policy, MixPolicy::Weighted | MixPolicy::WeightedRoundRobin)
            && !mix.weights.values().any(|w| *w > 0)
        {
            return Err(ConfigValidationError::MissingMixWeights(mix.policy));
        }

        Ok(())
    }

    /// Get the duration range as a tuple
    pub fn duration_range(&self) -> (u32, u32) {
        (self.min_duration_secs, self.max_duration_secs)
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }
}

/// Parse `category=weight` entries, or the single entry `standard`
fn parse_service_mix(values: &[String]) -> Result<BTreeMap<ServiceCategory, u32>, String> {
    if let [only] = values {
        if only.trim().eq_ignore_ascii_case("standard") {
            return Ok(defaults::SERVICE_CATEGORY_WEIGHTS.into_iter().collect());
        }
    }

    let mut weights = BTreeMap::new();
    for entry in values {
        let (category, weight) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected category=weight, got '{}'", entry))?;
        let category: ServiceCategory = category.parse()?;
        let weight: u32 =
            weight.trim().parse().map_err(|e| format!("invalid weight for {}: {}", category, e))?;
        if weights.insert(category, weight).is_some() {
            return Err(format!("{} listed more than once", category));
        }
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();

        assert!(config.network_config.is_none());
        assert_eq!(config.record_count, 1_000);
        assert!(config.seed.is_none());
        assert!(config.workers >= 1);
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.technology_mix.policy, MixPolicy::Uniform);
        assert_eq!(config.duration_range(), (1, 3_600));
        assert_eq!(config.window_secs, 1_800);
        assert_eq!(config.output_format, "json");
    }

    #[test]
    fn test_count_cli_parsing() {
        let cli_args = CliArgs::try_parse_from(["test", "--count", "5"]).unwrap();
        assert_eq!(cli_args.count, Some(5));

        let cli_args = CliArgs::try_parse_from(["test", "-n", "10"]).unwrap();
        assert_eq!(cli_args.count, Some(10));

        let cli_args = CliArgs::try_parse_from(["test"]).unwrap();
        assert!(cli_args.count.is_none());
    }

    #[test]
    fn test_technologies_cli_parsing() {
        let cli_args = CliArgs::try_parse_from(["test", "--technologies", "2G,lte"]).unwrap();
        let config = SimulationConfig::from_cli_args(cli_args).unwrap();
        assert_eq!(
            config.technology_mix.technologies,
            vec![TechnologyId::TwoG, TechnologyId::FourG]
        );
    }

    #[test]
    fn test_invalid_cli_values_are_rejected() {
        let args = CliArgs { mix: Some("random".to_string()), ..Default::default() };
        assert!(matches!(
            SimulationConfig::from_cli_args(args),
            Err(ConfigError::InvalidArgument { flag: "mix", .. })
        ));

        let args = CliArgs { start_time: Some("yesterday".to_string()), ..Default::default() };
        assert!(matches!(
            SimulationConfig::from_cli_args(args),
            Err(ConfigError::InvalidArgument { flag: "start-time", .. })
        ));
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let config_json = r#"{
            "network_config": "network.json",
            "record_count": 5000,
            "seed": 12345,
            "workers": 2,
            "technology_mix": {
                "policy": "weighted",
                "weights": { "2G": 1, "4G": 3 }
            },
            "min_duration_secs": 10,
            "max_duration_secs": 20,
            "duration_profile": "call_profile",
            "start_time": "2024-01-01T00:00:00Z",
            "output_format": "csv"
        }"#;

        temp_file.write_all(config_json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = SimulationConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.network_config.as_deref(), Some("network.json"));
        assert_eq!(config.record_count, 5000);
        assert_eq!(config.seed, Some(12345));
        assert_eq!(config.workers, 2);
        assert_eq!(config.technology_mix.policy, MixPolicy::Weighted);
        assert_eq!(config.technology_mix.weights[&TechnologyId::FourG], 3);
        assert_eq!(config.duration_range(), (10, 20));
        assert_eq!(config.duration_profile, DurationProfile::CallProfile);
        assert!(config.start_time.is_some());
        assert_eq!(config.get_output_format().unwrap(), OutputFormat::Csv);
        // Defaults remain for fields the file does not set
        assert_eq!(config.window_secs, 1_800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs {
            count: Some(8000),
            seed: Some(54321),
            workers: Some(3),
            output_format: Some("csv".to_string()),
            window_secs: Some(60),
            ..Default::default()
        };

        let config = SimulationConfig::from_cli_args(args).unwrap();

        assert_eq!(config.record_count, 8000);
        assert_eq!(config.seed, Some(54321));
        assert_eq!(config.workers, 3);
        assert_eq!(config.output_format, "csv");
        assert_eq!(config.window_secs, 60);
        assert_eq!(config.duration_range(), (1, 3_600));
    }

    #[test]
    fn test_simulation_config_validation_success() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulation_config_validation_record_count() {
        let config = SimulationConfig { record_count: 0, ..Default::default() };

        match config.validate() {
            Err(ConfigValidationError::InvalidRecordCount(0)) => {}
            _ => panic!("Expected InvalidRecordCount error"),
        }
    }

    #[test]
    fn test_simulation_config_validation_duration_range() {
        let config =
            SimulationConfig { min_duration_secs: 20, max_duration_secs: 10, ..Default::default() };

        match config.validate() {
            Err(ConfigValidationError::InvalidDurationRange(20, 10)) => {}
            _ => panic!("Expected InvalidDurationRange error"),
        }
    }

    #[test]
    fn test_simulation_config_validation_window() {
        let config = SimulationConfig { window_secs: u64::MAX, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidWindow(u64::MAX))));

        let config =
            SimulationConfig { window_secs: defaults::MAX_WINDOW_SECS + 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidWindow(_))));

        let config =
            SimulationConfig { window_secs: defaults::MAX_WINDOW_SECS, ..Default::default() };
        assert!(config.validate().is_ok());

        // Within the cap but past the last representable instant
        let config = SimulationConfig {
            start_time: Some(DateTime::<Utc>::MAX_UTC - chrono::TimeDelta::days(1)),
            window_secs: 7 * 86_400,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidWindow(_))));
    }

    #[test]
    fn test_service_mix_cli_parsing() {
        let args = CliArgs::try_parse_from(["test", "--service-mix", "voice=3,sms=1"]).unwrap();
        let config = SimulationConfig::from_cli_args(args).unwrap();
        assert_eq!(config.service_categories.len(), 2);
        assert_eq!(config.service_categories[&ServiceCategory::Voice], 3);
        assert!(config.validate().is_ok());

        let args = CliArgs::try_parse_from(["test", "--service-mix", "standard"]).unwrap();
        let config = SimulationConfig::from_cli_args(args).unwrap();
        assert_eq!(config.service_categories[&ServiceCategory::Data], 45);
        assert_eq!(config.service_categories.values().sum::<u32>(), 100);

        for bad in ["fax=1", "voice", "voice=-1", "voice=1,voice=2"] {
            let args = CliArgs::try_parse_from(["test", "--service-mix", bad]).unwrap();
            assert!(matches!(
                SimulationConfig::from_cli_args(args),
                Err(ConfigError::InvalidArgument { flag: "service-mix", .. })
            ));
        }

        let mut config = SimulationConfig::default();
        config.service_categories.insert(ServiceCategory::Sms, 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingServiceCategoryWeights)
        ));
    }

    #[test]
    fn test_split_interval_validation() {
        let args = CliArgs::try_parse_from(["test", "--split-interval", "1800"]).unwrap();
        let config = SimulationConfig::from_cli_args(args).unwrap();
        assert_eq!(config.split_interval_secs, Some(1_800));
        assert!(config.validate().is_ok());

        for interval in [0, defaults::MAX_WINDOW_SECS + 1, u64::MAX] {
            let config = SimulationConfig { split_interval_secs: Some(interval), ..Default::default() };
            assert!(matches!(
                config.validate(),
                Err(ConfigValidationError::InvalidSplitInterval(i)) if i == interval
            ));
        }
    }

    #[test]
    fn test_simulation_config_validation_weighted_mix() {
        let mut config = SimulationConfig::default();
        config.technology_mix.policy = MixPolicy::Weighted;

        match config.validate() {
            Err(ConfigValidationError::MissingMixWeights(MixPolicy::Weighted)) => {}
            _ => panic!("Expected MissingMixWeights error"),
        }

        config.technology_mix.weights.insert(TechnologyId::ThreeG, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulation_config_validation_output_format() {
        let config = SimulationConfig { output_format: "xml".to_string(), ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidOutputFormat(_))
        ));
    }

    #[test]
    fn test_simulation_config_serialization() {
        let config = SimulationConfig { seed: Some(9), ..Default::default() };
        let json = config.print_json().unwrap();
        let deserialized: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_file_unsupported_extension() {
        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            SimulationConfig::from_file(temp_file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
