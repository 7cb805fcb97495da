//! Call Detail Records

use crate::geo::LocationCell;
use crate::network::{NetworkElement, QosSample, ServiceType};
use crate::simulation::error::ValidationError;
use crate::types::{
    CdrId, CustomerId, DeliveryStatus, ElementId, ServiceCategory, ServiceTypeId, TechnologyId,
};
use super::sampling::offset_by;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synthetic call detail record; immutable once emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cdr {
    /// Record identifier
    pub id: CdrId,
    /// Start of the call or session
    pub timestamp_start: DateTime<Utc>,
    /// Duration in seconds
    pub duration_seconds: u32,
    /// Subscriber the record is billed to
    pub customer_id: CustomerId,
    /// Subscriber phone number
    pub msisdn: String,
    /// Technology the record was carried on
    pub technology: TechnologyId,
    /// Serving network element
    pub network_element_id: ElementId,
    /// Service used
    pub service_type_id: ServiceTypeId,
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
    /// Name of the serving element's location cell
    pub location_cell: String,
    /// Phone number of the called party, absent when nobody else can be called
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub called_msisdn: Option<String>,
    /// Whether the calling subscriber is away from the home network
    #[serde(default)]
    pub roaming: bool,
    /// Traffic category of the service used
    #[serde(default)]
    pub service_category: ServiceCategory,
    /// Message length in characters, SMS only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_length: Option<u32>,
    /// Delivery outcome, SMS only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
    /// Set on the pieces of a call split at interval boundaries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<PartialRecord>,
}

/// Position of a record within a split call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRecord {
    /// Id of the first piece, shared by every piece of the call
    pub call_id: CdrId,
    /// 1-based piece number
    pub segment: u32,
    /// Number of pieces the call was split into
    pub segments: u32,
}

impl Cdr {
    /// End of the call or session
    ///
    /// Saturates at the latest representable instant; [`Cdr::validate`]
    /// rejects records whose end would need it.
    pub fn timestamp_end(&self) -> DateTime<Utc> {
        offset_by(self.timestamp_start, u64::from(self.duration_seconds)).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// QoS values carried by the record
    pub fn qos(&self) -> QosSample {
        QosSample {
            jitter: self.jitter,
            latency: self.latency,
            throughput: self.throughput,
            packet_loss: self.packet_loss,
            call_setup_time: self.call_setup_time,
            mos: self.mos,
        }
    }

    /// Check the record against the entities it references
    ///
    /// The element, service type and cell must belong to the record's
    /// technology, the ids and cell name must match, and every QoS value must
    /// lie within the service type's envelope.
    pub fn validate(
        &self,
        element: &NetworkElement,
        service_type: &ServiceType,
        cell: &LocationCell,
    ) -> Result<(), ValidationError> {
        let mismatch = |entity: String, actual: TechnologyId| ValidationError::TechnologyMismatch {
            entity,
            expected: self.technology,
            actual,
        };

        if element.technology != self.technology {
            return Err(mismatch(format!("network element {}", element.id), element.technology));
        }
        if service_type.technology != self.technology {
            return Err(mismatch(
                format!("service type {}", service_type.id),
                service_type.technology,
            ));
        }
        if cell.technology != self.technology {
            return Err(mismatch(format!("location cell {}", cell.name), cell.technology));
        }

        if element.id != self.network_element_id {
            return Err(ValidationError::InvalidValue {
                field: "network_element_id".to_string(),
                reason: format!("record references {}, resolved {}", self.network_element_id, element.id),
            });
        }
        if service_type.id != self.service_type_id {
            return Err(ValidationError::InvalidValue {
                field: "service_type_id".to_string(),
                reason: format!("record references {}, resolved {}", self.service_type_id, service_type.id),
            });
        }
        if element.location != cell.name || self.location_cell != cell.name {
            return Err(ValidationError::InvalidValue {
                field: "location_cell".to_string(),
                reason: format!(
                    "record cell '{}' does not match element {} cell '{}'",
                    self.location_cell, element.id, element.location
                ),
            });
        }
        if offset_by(self.timestamp_start, u64::from(self.duration_seconds)).is_none() {
            return Err(ValidationError::InvalidValue {
                field: "duration_seconds".to_string(),
                reason: format!("call starting {} ends past the last representable time", self.timestamp_start),
            });
        }
        if service_type.category != self.service_category {
            return Err(ValidationError::InvalidValue {
                field: "service_category".to_string(),
                reason: format!(
                    "record category {} does not match service type {} ({})",
                    self.service_category, service_type.id, service_type.category
                ),
            });
        }
        if self.msisdn.is_empty() {
            return Err(ValidationError::MissingRequiredField {
                entity: format!("CDR {}", self.id),
                field: "msisdn",
            });
        }

        service_type.qos.check(&self.qos())
    }
}
