//! Service types and their QoS envelopes

use crate::simulation::error::ValidationError;
use crate::types::{
    BearerType, RangeDefinition, ServiceCategory, ServiceTypeDefinition, ServiceTypeId, TechnologyId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range of a QoS attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QosRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl QosRange {
    /// Create a validated range; both ends finite and `min <= max`
    pub fn new(field: &str, min: f64, max: f64) -> Result<Self, ValidationError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ValidationError::InvalidRange { field: field.to_string(), min, max });
        }
        Ok(Self { min, max })
    }

    /// Draw a value uniformly from the range; exactly `min` when the range is a point
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    /// Whether `value` lies within the range
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// QoS envelope of a service type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QosProfile {
    /// Jitter in milliseconds
    pub jitter: QosRange,
    /// Latency in milliseconds
    pub latency: QosRange,
    /// Throughput in Mbit/s
    pub throughput: QosRange,
    /// Packet loss in percent
    pub packet_loss: QosRange,
    /// Call setup time in milliseconds
    pub call_setup_time: QosRange,
    /// Mean opinion score
    pub mos: QosRange,
}

/// One set of QoS values drawn from a [`QosProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QosSample {
    /// Jitter in milliseconds
    pub jitter: f64,
    /// Latency in milliseconds
    pub latency: f64,
    /// Throughput in Mbit/s
    pub throughput: f64,
    /// Packet loss in percent
    pub packet_loss: f64,
    /// Call setup time in milliseconds
    pub call_setup_time: f64,
    /// Mean opinion score
    pub mos: f64,
}

impl QosProfile {
    /// Sample every attribute independently
    ///
    /// Attributes are drawn in declaration order, which keeps seeded output
    /// stable.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QosSample {
        QosSample {
            jitter: self.jitter.sample(rng),
            latency: self.latency.sample(rng),
            throughput: self.throughput.sample(rng),
            packet_loss: self.packet_loss.sample(rng),
            call_setup_time: self.call_setup_time.sample(rng),
            mos: self.mos.sample(rng),
        }
    }

    /// Attribute names paired with their ranges
    pub fn ranges(&self) -> [(&'static str, QosRange); 6] {
        [
            ("jitter", self.jitter),
            ("latency", self.latency),
            ("throughput", self.throughput),
            ("packet_loss", self.packet_loss),
            ("call_setup_time", self.call_setup_time),
            ("mos", self.mos),
        ]
    }

    /// Check every sampled value against its range
    pub fn check(&self, sample: &QosSample) -> Result<(), ValidationError> {
        let values = [
            sample.jitter,
            sample.latency,
            sample.throughput,
            sample.packet_loss,
            sample.call_setup_time,
            sample.mos,
        ];
        for ((field, range), value) in self.ranges().into_iter().zip(values) {
            if !range.contains(value) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}

/// A service offered on one technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceType {
    /// Service type identifier
    pub id: ServiceTypeId,
    /// Service name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Technology the service runs on
    pub technology: TechnologyId,
    /// Network nodes involved in delivering the service
    pub nodes: Vec<String>,
    /// Bearer used by the service
    pub bearer_type: BearerType,
    /// Traffic category
    pub category: ServiceCategory,
    /// QoS envelope
    pub qos: QosProfile,
}

impl ServiceType {
    /// Build a validated service type from its document definition
    pub fn from_definition(
        definition: &ServiceTypeDefinition,
        technology: TechnologyId,
    ) -> Result<Self, ValidationError> {
        let id = u32::try_from(definition.id)
            .ok()
            .filter(|id| *id > 0)
            .ok_or(ValidationError::InvalidId { entity: "service type", id: definition.id })?;

        if definition.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { entity: "service type", id: definition.id });
        }

        let entity = format!("service type {}", id);
        let bearer_type = definition.bearer_type.ok_or_else(|| {
            ValidationError::MissingRequiredField { entity: entity.clone(), field: "bearer_type" }
        })?;

        let range = |value: Option<RangeDefinition>, field: &'static str| {
            let raw = value.ok_or_else(|| ValidationError::MissingRequiredField {
                entity: entity.clone(),
                field,
            })?;
            QosRange::new(field, raw.min, raw.max)
        };

        let qos = QosProfile {
            jitter: range(definition.jitter, "jitter")?,
            latency: range(definition.latency, "latency")?,
            throughput: range(definition.throughput, "throughput")?,
            packet_loss: range(definition.packet_loss, "packet_loss")?,
            call_setup_time: range(definition.call_setup_time, "call_setup_time")?,
            mos: range(definition.mos, "mos")?,
        };

        for (field, range) in qos.ranges() {
            if range.min < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("{} must not be negative, got {}", entity, range.min),
                });
            }
        }
        if qos.packet_loss.max > 100.0 {
            return Err(ValidationError::InvalidValue {
                field: "packet_loss".to_string(),
                reason: format!("{} packet loss above 100%", entity),
            });
        }
        if qos.mos.max > 5.0 {
            return Err(ValidationError::InvalidValue {
                field: "mos".to_string(),
                reason: format!("{} MOS above 5.0", entity),
            });
        }

        Ok(Self {
            id: ServiceTypeId(id),
            name: definition.name.clone(),
            description: definition.description.clone(),
            technology,
            nodes: definition.nodes.clone(),
            bearer_type,
            category: definition.category.unwrap_or_else(|| ServiceCategory::infer(&definition.name)),
            qos,
        })
    }
}
