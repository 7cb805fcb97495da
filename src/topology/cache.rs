//! Warm/cold topology cache
//!
//! The cache starts cold. [`TopologyCache::warm`] builds the index exactly
//! once; a second call fails with [`StateError::AlreadyInitialized`] and a
//! failed build leaves the cache cold so warm-up can be retried. Lookups on a
//! cold cache fail with [`StateError::CacheNotInitialized`] instead of
//! blocking; callers that want to block use [`TopologyCache::wait_until_warm`].
//!
//! Once warm the index is immutable and readers take no locks.

use super::TopologyIndex;
use crate::geo::LocationCell;
use crate::network::{NetworkElement, ServiceType, TechnologyRegistry};
use crate::simulation::error::{SimulationResult, StateError};
use crate::types::{ElementId, NetworkConfig, ServiceTypeId, TechnologyId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Process-wide topology cache, shared through `Arc`
#[derive(Debug, Default)]
pub struct TopologyCache {
    index: OnceLock<TopologyIndex>,
    warming: AtomicBool,
    ready_lock: Mutex<()>,
    ready: Condvar,
}

impl TopologyCache {
    /// Create a cold cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and warm a cache in one step
    pub fn warmed(network: &NetworkConfig, registry: &TechnologyRegistry) -> SimulationResult<Arc<Self>> {
        let cache = Arc::new(Self::new());
        cache.warm(network, registry)?;
        Ok(cache)
    }

    /// Build the topology index from the network document
    ///
    /// Only the first successful call does any work. Concurrent or repeated
    /// calls fail with [`StateError::AlreadyInitialized`].
    #[instrument(skip_all, fields(country = %network.country, sections = network.networks.len()))]
    pub fn warm(&self, network: &NetworkConfig, registry: &TechnologyRegistry) -> SimulationResult<()> {
        if self
            .warming
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejected second topology cache warm-up");
            return Err(StateError::AlreadyInitialized.into());
        }

        let started = Instant::now();
        let index = match TopologyIndex::build(network, registry) {
            Ok(index) => index,
            Err(e) => {
                self.warming.store(false, Ordering::Release);
                warn!("Topology cache warm-up failed: {}", e);
                return Err(e);
            }
        };

        let summary = (
            index.technologies().len(),
            index.cell_count(),
            index.element_count(),
            index.service_type_count(),
        );

        if self.index.set(index).is_err() {
            return Err(StateError::AlreadyInitialized.into());
        }

        {
            let _guard = self.ready_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.ready.notify_all();
        }

        info!(
            technologies = summary.0,
            cells = summary.1,
            elements = summary.2,
            service_types = summary.3,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Topology cache warmed"
        );
        Ok(())
    }

    /// Whether warm-up has completed
    pub fn is_warm(&self) -> bool {
        self.index.get().is_some()
    }

    /// Block until warm-up completes or `timeout` elapses
    pub fn wait_until_warm(&self, timeout: Duration) -> SimulationResult<&TopologyIndex> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.ready_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        loop {
            if let Some(index) = self.index.get() {
                return Ok(index);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(StateError::WarmUpTimedOut(timeout).into());
            }
            guard = match self.ready.wait_timeout(guard, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// The warm index
    pub fn index(&self) -> SimulationResult<&TopologyIndex> {
        self.index.get().ok_or_else(|| StateError::CacheNotInitialized.into())
    }

    /// Configured technologies
    pub fn technologies(&self) -> SimulationResult<Vec<TechnologyId>> {
        Ok(self.index()?.technologies())
    }

    /// Elements of a technology
    pub fn elements_for(&self, technology: TechnologyId) -> SimulationResult<&[NetworkElement]> {
        Ok(self.index()?.elements_for(technology))
    }

    /// Location cells of a technology
    pub fn cells_for(&self, technology: TechnologyId) -> SimulationResult<&[LocationCell]> {
        Ok(self.index()?.cells_for(technology))
    }

    /// Service types of a technology
    pub fn service_types_for(&self, technology: TechnologyId) -> SimulationResult<&[ServiceType]> {
        Ok(self.index()?.service_types_for(technology))
    }

    /// Look up an element by id
    pub fn element(&self, id: ElementId) -> SimulationResult<Option<&NetworkElement>> {
        Ok(self.index()?.element(id))
    }

    /// Look up a service type by id
    pub fn service_type(&self, id: ServiceTypeId) -> SimulationResult<Option<&ServiceType>> {
        Ok(self.index()?.service_type(id))
    }

    /// Cell an element is bound to
    pub fn cell_of(&self, id: ElementId) -> SimulationResult<Option<&LocationCell>> {
        Ok(self.index()?.cell_of(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::error::SimulationError;

    #[test]
    fn test_cold_cache_lookups_fail() {
        let cache = TopologyCache::new();
        assert!(!cache.is_warm());
        assert!(matches!(
            cache.elements_for(TechnologyId::FourG),
            Err(SimulationError::State(StateError::CacheNotInitialized))
        ));
        assert!(matches!(
            cache.service_types_for(TechnologyId::FourG),
            Err(SimulationError::State(StateError::CacheNotInitialized))
        ));
    }

    #[test]
    fn test_second_warm_up_rejected() {
        let cache = TopologyCache::new();
        let registry = TechnologyRegistry::standard();
        cache.warm(&NetworkConfig::sample(), &registry).unwrap();
        assert!(cache.is_warm());

        assert!(matches!(
            cache.warm(&NetworkConfig::sample(), &registry),
            Err(SimulationError::State(StateError::AlreadyInitialized))
        ));
        assert!(!cache.elements_for(TechnologyId::TwoG).unwrap().is_empty());
    }

    #[test]
    fn test_failed_warm_up_leaves_cache_cold() {
        let cache = TopologyCache::new();
        let registry = TechnologyRegistry::standard();

        let mut broken = NetworkConfig::sample();
        if let Some(section) = broken.networks.get_mut("4G") {
            section.location_names.pop();
        }
        assert!(cache.warm(&broken, &registry).is_err());
        assert!(!cache.is_warm());

        cache.warm(&NetworkConfig::sample(), &registry).unwrap();
        assert!(cache.is_warm());
    }

    #[test]
    fn test_wait_until_warm_times_out() {
        let cache = TopologyCache::new();
        assert!(matches!(
            cache.wait_until_warm(Duration::from_millis(20)),
            Err(SimulationError::State(StateError::WarmUpTimedOut(_)))
        ));
    }
}
