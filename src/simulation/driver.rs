//! Generation driver
//!
//! The driver turns a warm topology cache, a customer pool and a technology
//! mix into a sequence of CDRs. Record `i` always draws from its own generator
//! seeded from `(run seed, i)`, which makes the three execution modes
//! interchangeable:
//!
//! - [`GenerationDriver::generate`]: lazy, single-threaded stream
//! - [`GenerationDriver::spawn_workers`]: worker pool with bounded per-worker
//!   channels, yielding records in index order
//! - [`GenerationDriver::generate_batch`]: finite batch built in parallel with rayon
//!
//! A record that cannot be produced is yielded as a [`GenerationError`] in its
//! slot; the sequence always continues. When an interval splitter is set,
//! [`GenerationDriver::expand`] cuts produced records into partial records
//! before they are written.

use crate::cdr::{Cdr, CdrSynthesizer, IntervalSplitter};
use crate::simulation::error::{ConfigurationError, GenerationError, SimulationResult};
use crate::simulation::TechnologyMix;
use crate::subscriber::CustomerPool;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, instrument, warn};

/// Outcome of a single record slot
pub type GenerationItem = Result<Cdr, GenerationError>;

/// Shared stop flag for generation runs
///
/// Clones observe the same flag. Workers finish the record in flight and stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Seed of the generator used for record `index` of a run seeded with `seed`
pub fn record_seed(seed: u64, index: u64) -> u64 {
    splitmix64(seed ^ splitmix64(index))
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Produces CDR sequences from shared, read-only inputs
#[derive(Debug, Clone)]
pub struct GenerationDriver {
    synthesizer: CdrSynthesizer,
    customers: Arc<CustomerPool>,
    mix: TechnologyMix,
    seed: u64,
    splitter: Option<IntervalSplitter>,
}

impl GenerationDriver {
    /// Create a driver
    ///
    /// # Arguments
    /// * `synthesizer` - Synthesizer bound to the topology cache
    /// * `customers` - Customer population records are drawn from
    /// * `mix` - Technology selection policy
    /// * `seed` - Run seed; record `i` uses `record_seed(seed, i)`
    pub fn new(synthesizer: CdrSynthesizer, customers: Arc<CustomerPool>, mix: TechnologyMix, seed: u64) -> Self {
        Self { synthesizer, customers, mix, seed, splitter: None }
    }

    /// Cut produced calls at interval boundaries
    pub fn with_splitter(mut self, splitter: IntervalSplitter) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Run seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Technology mix in use
    pub fn mix(&self) -> &TechnologyMix {
        &self.mix
    }

    /// Interval splitter, if calls are cut into partial records
    pub fn splitter(&self) -> Option<&IntervalSplitter> {
        self.splitter.as_ref()
    }

    /// Produce the record at `index`
    ///
    /// The calling party is drawn by customer type and the called party is
    /// always a different customer.
    pub fn produce(&self, index: u64) -> GenerationItem {
        let mut rng = StdRng::seed_from_u64(record_seed(self.seed, index));
        let technology = self.mix.choose(index, &mut rng);
        let caller = self.customers.choose_caller(&mut rng);
        let called = self.customers.choose_called(caller, &mut rng);

        self.synthesizer
            .synthesize_between(caller, called, technology, &mut rng)
            .map_err(|source| {
                let err = GenerationError::new(index, technology, source);
                if err.source.is_recoverable() {
                    warn!("Skipping {}", err);
                } else {
                    error!("Cannot produce {}", err);
                }
                err
            })
    }

    /// Records to write for a produced `cdr`
    ///
    /// Without a splitter this is the record itself.
    pub fn expand(&self, cdr: Cdr) -> Vec<Cdr> {
        match &self.splitter {
            Some(splitter) => splitter.split(cdr),
            None => vec![cdr],
        }
    }

    /// Fail up front when the cache is cold or no technology in the mix can
    /// produce a record
    pub fn preflight(&self) -> SimulationResult<()> {
        let index = self.synthesizer.cache().index()?;
        let technologies = self.mix.technologies();

        if !technologies.iter().any(|t| index.is_usable(*t)) {
            return Err(ConfigurationError::NoUsableTechnology(technologies.to_vec()).into());
        }

        for technology in technologies.iter().filter(|t| !index.is_usable(**t)) {
            warn!("Technology {} has no elements or no service types; its records will fail", technology);
        }
        Ok(())
    }

    /// Lazily generate records on the calling thread
    ///
    /// The stream is bounded when `count` is set; otherwise it runs until
    /// `cancel` is triggered.
    #[instrument(skip(self, cancel), fields(seed = self.seed, policy = %self.mix.policy()))]
    pub fn generate(&self, count: Option<u64>, cancel: CancellationToken) -> SimulationResult<CdrStream> {
        self.preflight()?;
        info!("Starting sequential generation");
        Ok(CdrStream { driver: self.clone(), next: 0, count, cancel })
    }

    /// Generate records on a pool of `workers` threads
    ///
    /// Record `i` is built by worker `i % workers`. Each worker owns a channel
    /// holding at most `capacity` finished records and blocks when it is
    /// full. The returned stream reads the channels in rotation, so records
    /// come out in index order. Dropping the stream stops and joins the
    /// workers.
    #[instrument(skip(self, cancel), fields(seed = self.seed, policy = %self.mix.policy()))]
    pub fn spawn_workers(
        &self,
        count: Option<u64>,
        workers: usize,
        capacity: usize,
        cancel: CancellationToken,
    ) -> SimulationResult<WorkerStream> {
        self.preflight()?;

        let workers = workers.max(1);
        let stop = CancellationToken::new();
        let mut receivers = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for worker in 0..workers {
            let (tx, rx) = mpsc::sync_channel(capacity.max(1));
            let driver = self.clone();
            let cancel = cancel.clone();
            let stop = stop.clone();

            let handle = thread::Builder::new()
                .name(format!("cdr-worker-{}", worker))
                .spawn(move || driver.run_worker(worker as u64, workers as u64, count, tx, &cancel, &stop))?;

            receivers.push(rx);
            handles.push(handle);
        }

        info!("Started {} generation workers", workers);
        Ok(WorkerStream { receivers, handles, next: 0, count, cancel, stop })
    }

    fn run_worker(
        &self,
        first: u64,
        stride: u64,
        count: Option<u64>,
        tx: SyncSender<GenerationItem>,
        cancel: &CancellationToken,
        stop: &CancellationToken,
    ) {
        let mut index = first;
        let mut produced = 0u64;
        while count.map_or(true, |limit| index < limit) {
            if cancel.is_cancelled() || stop.is_cancelled() {
                break;
            }
            if tx.send(self.produce(index)).is_err() {
                break;
            }
            produced += 1;
            index = match index.checked_add(stride) {
                Some(next) => next,
                None => break,
            };
        }
        debug!("Worker {} stopped after {} records", first, produced);
    }

    /// Generate a finite batch in parallel and return it in index order
    #[instrument(skip(self), fields(seed = self.seed, policy = %self.mix.policy()))]
    pub fn generate_batch(&self, count: u64) -> SimulationResult<Vec<GenerationItem>> {
        self.preflight()?;
        info!("Starting parallel batch generation");
        let len = usize::try_from(count).unwrap_or(usize::MAX);
        Ok((0..len).into_par_iter().map(|index| self.produce(index as u64)).collect())
    }
}

/// Single-threaded lazy CDR sequence
#[derive(Debug)]
pub struct CdrStream {
    driver: GenerationDriver,
    next: u64,
    count: Option<u64>,
    cancel: CancellationToken,
}

impl CdrStream {
    /// Index of the next record
    pub fn position(&self) -> u64 {
        self.next
    }
}

impl Iterator for CdrStream {
    type Item = GenerationItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() || self.count.is_some_and(|limit| self.next >= limit) {
            return None;
        }
        let item = self.driver.produce(self.next);
        self.next = self.next.checked_add(1)?;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.count {
            Some(limit) => {
                let remaining = usize::try_from(limit.saturating_sub(self.next)).unwrap_or(usize::MAX);
                (0, Some(remaining))
            }
            None => (0, None),
        }
    }
}

/// CDR sequence fed by a worker pool
#[derive(Debug)]
pub struct WorkerStream {
    receivers: Vec<Receiver<GenerationItem>>,
    handles: Vec<JoinHandle<()>>,
    next: u64,
    count: Option<u64>,
    cancel: CancellationToken,
    stop: CancellationToken,
}

impl WorkerStream {
    /// Number of workers feeding the stream
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Index of the next record
    pub fn position(&self) -> u64 {
        self.next
    }
}

impl Iterator for WorkerStream {
    type Item = GenerationItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() || self.count.is_some_and(|limit| self.next >= limit) {
            return None;
        }
        let slot = (self.next % self.receivers.len() as u64) as usize;
        let item = self.receivers.get(slot)?.recv().ok()?;
        self.next += 1;
        Some(item)
    }
}

impl Drop for WorkerStream {
    fn drop(&mut self) {
        self.stop.cancel();
        // Blocked senders fail once their receiver is gone
        self.receivers.clear();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Generation worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_seed_spreads_indices() {
        let seeds: std::collections::HashSet<u64> = (0..1_000).map(|i| record_seed(42, i)).collect();
        assert_eq!(seeds.len(), 1_000);
        assert_eq!(record_seed(42, 7), record_seed(42, 7));
        assert_ne!(record_seed(42, 7), record_seed(43, 7));
    }

    #[test]
    fn test_expand_without_splitter_is_identity() {
        use crate::network::TechnologyRegistry;
        use crate::subscriber::CustomerGenerator;
        use crate::topology::TopologyCache;
        use crate::types::{NetworkConfig, TechnologyId};

        let cache = TopologyCache::warmed(&NetworkConfig::sample(), &TechnologyRegistry::standard()).unwrap();
        let customers = Arc::new(CustomerGenerator::new(Some(4)).generate_pool(10).unwrap());
        let mix = TechnologyMix::uniform(&[TechnologyId::FourG]).unwrap();
        let driver = GenerationDriver::new(CdrSynthesizer::new(cache), customers, mix, 4);
        assert!(driver.splitter().is_none());

        let cdr = driver.produce(0).unwrap();
        assert_eq!(driver.expand(cdr.clone()), vec![cdr]);

        let driver = driver.with_splitter(IntervalSplitter::new(1_800).unwrap());
        assert_eq!(driver.splitter().map(|s| s.interval_secs()), Some(1_800));
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
