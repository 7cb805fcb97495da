//! Network elements (cell sites)
//!
//! Every element carries the radio identity shape of its technology: 2G
//! elements a cell id, 3G elements a location area code plus cell id, and
//! 4G/5G elements a tracking area code. Elements are bound to exactly one
//! location cell of their technology's grid.

use crate::simulation::error::ValidationError;
use crate::types::{
    ElementId, ElementStatus, NetworkElementDefinition, RadioIdentityKind, TechnologyId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Radio identity of a network element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadioIdentity {
    /// 2G: cell identifier
    CellOnly {
        /// Cell identifier
        cell_id: u32,
    },
    /// 3G: location area code and cell identifier
    LocationArea {
        /// Location area code
        lac: u32,
        /// Cell identifier
        cell_id: u32,
    },
    /// 4G/5G: tracking area code
    TrackingArea {
        /// Tracking area code
        tac: u32,
    },
}

impl RadioIdentity {
    /// Shape of this identity
    pub fn kind(&self) -> RadioIdentityKind {
        match self {
            RadioIdentity::CellOnly { .. } => RadioIdentityKind::CellOnly,
            RadioIdentity::LocationArea { .. } => RadioIdentityKind::LocationArea,
            RadioIdentity::TrackingArea { .. } => RadioIdentityKind::TrackingArea,
        }
    }

    /// Whether this identity is the shape required by `technology`
    pub fn matches(&self, technology: TechnologyId) -> bool {
        self.kind() == technology.radio_identity_kind()
    }

    /// Tracking area code, if any
    pub fn tac(&self) -> Option<u32> {
        match self {
            RadioIdentity::TrackingArea { tac } => Some(*tac),
            _ => None,
        }
    }

    /// Location area code, if any
    pub fn lac(&self) -> Option<u32> {
        match self {
            RadioIdentity::LocationArea { lac, .. } => Some(*lac),
            _ => None,
        }
    }

    /// Cell identifier, if any
    pub fn cell_id(&self) -> Option<u32> {
        match self {
            RadioIdentity::CellOnly { cell_id } | RadioIdentity::LocationArea { cell_id, .. } => {
                Some(*cell_id)
            }
            RadioIdentity::TrackingArea { .. } => None,
        }
    }
}

impl fmt::Display for RadioIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioIdentity::CellOnly { cell_id } => write!(f, "CI={}", cell_id),
            RadioIdentity::LocationArea { lac, cell_id } => write!(f, "LAC={} CI={}", lac, cell_id),
            RadioIdentity::TrackingArea { tac } => write!(f, "TAC={}", tac),
        }
    }
}

/// A radio site of one technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkElement {
    /// Element identifier
    pub id: ElementId,
    /// Element name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Technology of the element
    pub technology: TechnologyId,
    /// Management IP address
    pub ip_address: IpAddr,
    /// Operational status
    pub status: ElementStatus,
    /// Radio identity matching the technology
    pub radio: RadioIdentity,
    /// Name of the location cell the element is bound to
    pub location: String,
    /// Site position as (latitude, longitude), when known
    pub coordinates: Option<(f64, f64)>,
}

impl NetworkElement {
    /// Create a validated network element
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ElementId,
        name: impl Into<String>,
        description: impl Into<String>,
        technology: TechnologyId,
        ip_address: IpAddr,
        status: ElementStatus,
        radio: RadioIdentity,
        location: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if id.0 == 0 {
            return Err(ValidationError::InvalidId { entity: "network element", id: 0 });
        }

        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                entity: "network element",
                id: i64::from(id.0),
            });
        }

        if !radio.matches(technology) {
            return Err(ValidationError::InvalidValue {
                field: "radio_identity".to_string(),
                reason: format!("{} identity is not valid for {} element {}", radio, technology, id),
            });
        }

        let location = location.into();
        if location.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                entity: format!("network element {}", id.0),
                field: "location",
            });
        }

        Ok(Self {
            id,
            name,
            description: description.into(),
            technology,
            ip_address,
            status,
            radio,
            location,
            coordinates: None,
        })
    }

    /// Build an element from its document definition, bound to `location`
    pub fn from_definition(
        definition: &NetworkElementDefinition,
        technology: TechnologyId,
        location: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = u32::try_from(definition.id)
            .ok()
            .filter(|id| *id > 0)
            .ok_or(ValidationError::InvalidId { entity: "network element", id: definition.id })?;

        let entity = || format!("network element {}", id);

        let raw_ip = definition.ip_address.as_deref().ok_or_else(|| {
            ValidationError::MissingRequiredField { entity: entity(), field: "ip_address" }
        })?;
        let ip_address: IpAddr = raw_ip.trim().parse().map_err(|_| ValidationError::InvalidValue {
            field: "ip_address".to_string(),
            reason: format!("'{}' is not an IP address", raw_ip),
        })?;

        let radio = radio_identity(definition, technology, &entity)?;

        let coordinates = match definition.coordinates {
            Some([latitude, longitude]) => {
                if !latitude.is_finite() || !longitude.is_finite() {
                    return Err(ValidationError::InvalidValue {
                        field: "coordinates".to_string(),
                        reason: format!("{} has non-finite coordinates", entity()),
                    });
                }
                Some((latitude, longitude))
            }
            None => None,
        };

        let mut element = Self::new(
            ElementId(id),
            definition.name.clone(),
            definition.description.clone(),
            technology,
            ip_address,
            definition.status.unwrap_or_default(),
            radio,
            location,
        )?;
        element.coordinates = coordinates;
        Ok(element)
    }

    /// Whether the element is carrying traffic
    pub fn is_active(&self) -> bool {
        self.status == ElementStatus::Active
    }
}

/// Derive the radio identity required by `technology` from the raw fields
fn radio_identity(
    definition: &NetworkElementDefinition,
    technology: TechnologyId,
    entity: &dyn Fn() -> String,
) -> Result<RadioIdentity, ValidationError> {
    let required = |value: Option<u32>, field: &'static str| {
        value.ok_or_else(|| ValidationError::MissingRequiredField { entity: entity(), field })
    };
    let forbidden = |value: Option<u32>, field: &'static str| match value {
        Some(_) => Err(ValidationError::UnexpectedField { field, technology }),
        None => Ok(()),
    };

    match technology.radio_identity_kind() {
        RadioIdentityKind::CellOnly => {
            forbidden(definition.lac, "lac")?;
            forbidden(definition.tac, "tac")?;
            Ok(RadioIdentity::CellOnly { cell_id: required(definition.cell_id, "cell_id")? })
        }
        RadioIdentityKind::LocationArea => {
            forbidden(definition.tac, "tac")?;
            Ok(RadioIdentity::LocationArea {
                lac: required(definition.lac, "lac")?,
                cell_id: required(definition.cell_id, "cell_id")?,
            })
        }
        RadioIdentityKind::TrackingArea => {
            forbidden(definition.lac, "lac")?;
            forbidden(definition.cell_id, "cell_id")?;
            Ok(RadioIdentity::TrackingArea { tac: required(definition.tac, "tac")? })
        }
    }
}
