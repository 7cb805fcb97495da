//! Run orchestration
//!
//! The orchestrator turns a validated [`SimulationConfig`] into a ready
//! [`GenerationDriver`]: it loads the network document, warms the topology
//! cache, builds the customer pool and fixes the time origin of the run. It
//! then drains the driver into a [`CdrSink`] and collects statistics.

use crate::cdr::{CdrSynthesizer, DurationPolicy, IntervalSplitter, ServiceSelection, TimestampPolicy};
use crate::network::TechnologyRegistry;
use crate::simulation::{
    CancellationToken, CdrSink, GenerationDriver, GenerationItem, GenerationStatistics,
    SimulationResult, TechnologyMix,
};
use crate::subscriber::{CustomerGenerator, CustomerPool};
use crate::topology::TopologyCache;
use crate::types::{ConfigValidationError, NetworkConfig, SimulationConfig};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Coordinates setup and execution of a generation run
#[derive(Debug)]
pub struct SimulationOrchestrator {
    config: SimulationConfig,
    network: NetworkConfig,
    cache: Arc<TopologyCache>,
    customers: Arc<CustomerPool>,
    driver: GenerationDriver,
    seed: u64,
    started_at: DateTime<Utc>,
}

impl SimulationOrchestrator {
    /// Validate the configuration and prepare every input of the run
    #[instrument(skip(config), fields(records = config.record_count, workers = config.workers))]
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let network = match &config.network_config {
            Some(path) => {
                info!("Loading network document from {}", path);
                NetworkConfig::from_file(path)?
            }
            None => {
                info!("No network document given, using the built-in sample network");
                NetworkConfig::sample()
            }
        };
        Self::with_network(config, network)
    }

    /// Prepare a run against an already loaded network document
    #[instrument(skip(config, network), fields(country = %network.country))]
    pub fn with_network(config: SimulationConfig, network: NetworkConfig) -> SimulationResult<Self> {
        config.validate()?;

        let registry = TechnologyRegistry::from_definitions(&network.technologies)?;
        let cache = TopologyCache::warmed(&network, &registry)?;

        let seed = match config.seed {
            Some(seed) => {
                info!("Using deterministic seed: {}", seed);
                seed
            }
            None => {
                let seed = rand::random();
                debug!("Using entropy-based seed: {}", seed);
                seed
            }
        };

        let customers = match &config.customers_file {
            Some(path) => CustomerPool::from_file(path)?,
            None => CustomerGenerator::new(Some(seed)).generate_pool(config.customer_count)?,
        };
        let customers = Arc::new(customers);

        let mix = TechnologyMix::from_config(&config.technology_mix, &cache.technologies()?)?;

        let started_at = Utc::now();
        let timestamps = TimestampPolicy::Window {
            start: config.start_time.unwrap_or_else(|| started_at.trunc_subsecs(0)),
            span_secs: config.window_secs,
        };
        if !timestamps.is_representable() {
            return Err(ConfigValidationError::InvalidWindow(config.window_secs).into());
        }
        let durations = DurationPolicy::from_profile(
            config.duration_profile,
            config.min_duration_secs,
            config.max_duration_secs,
        );

        let synthesizer = CdrSynthesizer::new(Arc::clone(&cache))
            .with_duration_policy(durations)
            .with_timestamp_policy(timestamps)
            .with_service_selection(ServiceSelection::from_weights(&config.service_categories));
        let mut driver = GenerationDriver::new(synthesizer, Arc::clone(&customers), mix, seed);
        if let Some(interval) = config.split_interval_secs {
            let splitter = IntervalSplitter::new(interval)
                .ok_or(ConfigValidationError::InvalidSplitInterval(interval))?;
            info!("Splitting calls at {} s boundaries", splitter.interval_secs());
            driver = driver.with_splitter(splitter);
        }
        driver.preflight()?;

        info!(
            "Run prepared: {} technologies, {} customers, mix policy {}",
            driver.mix().technologies().len(),
            customers.len(),
            driver.mix().policy()
        );

        Ok(Self { config, network, cache, customers, driver, seed, started_at })
    }

    /// Run configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Loaded network document
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Warm topology cache
    pub fn cache(&self) -> &Arc<TopologyCache> {
        &self.cache
    }

    /// Customer population
    pub fn customers(&self) -> &Arc<CustomerPool> {
        &self.customers
    }

    /// Driver producing the records
    pub fn driver(&self) -> &GenerationDriver {
        &self.driver
    }

    /// Effective run seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Time the run was prepared; start of the timestamp window unless configured
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Human readable overview of the prepared topology
    pub fn describe(&self) -> SimulationResult<String> {
        let index = self.cache.index()?;
        let mut text = format!(
            "Network: {} ({} cells, {} elements, {} service types)\n",
            index.country(),
            index.cell_count(),
            index.element_count(),
            index.service_type_count()
        );
        for technology in index.technologies() {
            text.push_str(&format!(
                "  • {}: {} cells, {} elements, {} service types{}\n",
                technology,
                index.cells_for(technology).len(),
                index.elements_for(technology).len(),
                index.service_types_for(technology).len(),
                if index.is_usable(technology) { "" } else { " (unusable)" }
            ));
        }
        text.push_str(&format!("Customers: {}\n", self.customers.len()));
        text.push_str(&format!(
            "Mix: {} over {}\n",
            self.driver.mix().policy(),
            self.driver
                .mix()
                .technologies()
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        if let Some(splitter) = self.driver.splitter() {
            text.push_str(&format!("Split interval: {} s\n", splitter.interval_secs()));
        }
        text.push_str(&format!("Seed: {}\n", self.seed));
        Ok(text)
    }

    /// Generate the configured number of records into `sink`
    ///
    /// One worker generates on the calling thread; more use the worker pool.
    /// Failed record slots are counted, never written. A failure that is not
    /// isolated to its record stops the run with that error.
    #[instrument(skip(self, sink, cancel), fields(records = self.config.record_count, workers = self.config.workers))]
    pub fn run(&self, sink: &mut dyn CdrSink, cancel: CancellationToken) -> SimulationResult<GenerationStatistics> {
        let started = Instant::now();
        let mut statistics = GenerationStatistics::new();
        let count = Some(self.config.record_count);

        if self.config.workers <= 1 {
            let stream = self.driver.generate(count, cancel)?;
            drain(stream, &self.driver, sink, &mut statistics)?;
        } else {
            let stream = self.driver.spawn_workers(
                count,
                self.config.workers,
                self.config.channel_capacity,
                cancel,
            )?;
            drain(stream, &self.driver, sink, &mut statistics)?;
        }

        sink.finish()?;
        statistics.set_elapsed(started.elapsed());
        info!("{}", statistics.summary());
        Ok(statistics)
    }
}

fn drain<I>(
    items: I,
    driver: &GenerationDriver,
    sink: &mut dyn CdrSink,
    statistics: &mut GenerationStatistics,
) -> SimulationResult<()>
where
    I: Iterator<Item = GenerationItem>,
{
    for item in items {
        statistics.record(&item);
        match item {
            Ok(cdr) => {
                let pieces = driver.expand(cdr);
                statistics.record_pieces(pieces.len());
                for piece in &pieces {
                    sink.write_cdr(piece)?;
                }
            }
            Err(err) if !err.source.is_recoverable() => {
                error!("Stopping run at record {}: {}", err.index, err.source);
                return Err(err.source);
            }
            Err(_) => {}
        }
    }
    Ok(())
}
