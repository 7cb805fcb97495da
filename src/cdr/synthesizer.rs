//! CDR synthesis engine
//!
//! Turns a calling party and a technology into one CDR by drawing from the
//! warm topology cache. All randomness comes from the caller's generator and
//! is consumed in a fixed order (element, service category and type, QoS attributes,
//! timestamp, duration or message length, record id), so a seeded generator
//! over the same topology always yields the same record.

use super::{
    Cdr, DurationPolicy, ServiceSelection, TimestampPolicy, MAX_MESSAGE_LENGTH, SMS_DURATION_SECS,
};
use crate::simulation::error::{ConfigurationError, SimulationResult};
use crate::subscriber::Customer;
use crate::topology::TopologyCache;
use crate::types::{CdrId, DeliveryStatus, ServiceCategory, TechnologyId};
use rand::Rng;
use std::sync::Arc;

/// Builds CDRs against a shared topology cache
#[derive(Debug, Clone)]
pub struct CdrSynthesizer {
    cache: Arc<TopologyCache>,
    durations: DurationPolicy,
    timestamps: TimestampPolicy,
    services: ServiceSelection,
}

impl CdrSynthesizer {
    /// Create a synthesizer with uniform 1-3600 s durations stamped at the wall clock
    pub fn new(cache: Arc<TopologyCache>) -> Self {
        Self {
            cache,
            durations: DurationPolicy::default(),
            timestamps: TimestampPolicy::default(),
            services: ServiceSelection::default(),
        }
    }

    /// Use a different duration policy
    pub fn with_duration_policy(mut self, policy: DurationPolicy) -> Self {
        self.durations = policy;
        self
    }

    /// Use a different timestamp policy
    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamps = policy;
        self
    }

    /// Use a different service selection
    pub fn with_service_selection(mut self, selection: ServiceSelection) -> Self {
        self.services = selection;
        self
    }

    /// Topology cache the synthesizer reads from
    pub fn cache(&self) -> &Arc<TopologyCache> {
        &self.cache
    }

    /// Synthesize one CDR for `customer` on `technology`, without a called party
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        customer: &Customer,
        technology: TechnologyId,
        rng: &mut R,
    ) -> SimulationResult<Cdr> {
        self.synthesize_between(customer, None, technology, rng)
    }

    /// Synthesize one CDR for a call from `caller` to `called` on `technology`
    ///
    /// SMS service types get a fixed 5 s duration, a message length and a
    /// delivery status instead of a duration drawn from the policy.
    pub fn synthesize_between<R: Rng + ?Sized>(
        &self,
        caller: &Customer,
        called: Option<&Customer>,
        technology: TechnologyId,
        rng: &mut R,
    ) -> SimulationResult<Cdr> {
        let index = self.cache.index()?;
        let topology = index
            .topology(technology)
            .ok_or(ConfigurationError::NoElementsForTechnology(technology))?;

        let element_count = topology.elements().len();
        if element_count == 0 {
            return Err(ConfigurationError::NoElementsForTechnology(technology).into());
        }
        let (element, cell) = topology
            .element_with_cell(rng.gen_range(0..element_count))
            .ok_or(ConfigurationError::NoElementsForTechnology(technology))?;

        let service_types = topology.service_types();
        if service_types.is_empty() {
            return Err(ConfigurationError::NoServiceTypesForTechnology(technology).into());
        }
        let service_type = self
            .services
            .pick(service_types, rng)
            .and_then(|position| service_types.get(position))
            .ok_or(ConfigurationError::NoServiceTypesForCategories(technology))?;

        let qos = service_type.qos.sample(rng);
        let timestamp_start = self.timestamps.sample(rng)?;
        let (duration_seconds, message_length, delivery_status) = match service_type.category {
            ServiceCategory::Sms => (
                SMS_DURATION_SECS,
                Some(rng.gen_range(1..=MAX_MESSAGE_LENGTH)),
                Some(DeliveryStatus::Delivered),
            ),
            _ => (self.durations.sample(rng), None, None),
        };
        let id = CdrId::from_rng(rng);

        let cdr = Cdr {
            id,
            timestamp_start,
            duration_seconds,
            customer_id: caller.id,
            msisdn: caller.msisdn.clone(),
            technology,
            network_element_id: element.id,
            service_type_id: service_type.id,
            jitter: qos.jitter,
            latency: qos.latency,
            throughput: qos.throughput,
            packet_loss: qos.packet_loss,
            call_setup_time: qos.call_setup_time,
            mos: qos.mos,
            location_cell: cell.name.clone(),
            called_msisdn: called.map(|c| c.msisdn.clone()),
            roaming: caller.is_roaming(),
            service_category: service_type.category,
            message_length,
            delivery_status,
            partial: None,
        };

        cdr.validate(element, service_type, cell)?;
        Ok(cdr)
    }
}
