//! Element templating
//!
//! Expands element templates into concrete network elements placed in every
//! cell of a technology's grid. Identifiers, names, addresses and radio
//! identities are derived from the template order and cell position only, so
//! the same document always yields the same topology.

use super::{NetworkElement, RadioIdentity};
use crate::geo::GeoGrid;
use crate::simulation::error::ValidationError;
use crate::types::{ElementId, ElementStatus, ElementTemplate, RadioIdentityKind, TechnologyId};
use std::net::{IpAddr, Ipv4Addr};

/// Hosts per /24 block used for generated management addresses
const HOSTS_PER_BLOCK: u32 = 254;

/// Builds elements from templates for one technology
#[derive(Debug)]
pub struct ElementFactory<'a> {
    technology: TechnologyId,
    grid: &'a GeoGrid,
    next_id: u32,
    sequence: u32,
}

impl<'a> ElementFactory<'a> {
    /// Create a factory whose first element gets `first_id`
    pub fn new(technology: TechnologyId, grid: &'a GeoGrid, first_id: u32) -> Self {
        Self { technology, grid, next_id: first_id.max(1), sequence: 0 }
    }

    /// Expand all templates, returning each element with its cell index
    ///
    /// Elements are produced template by template, then cell by cell in
    /// row-major order. Within a cell, elements are numbered across all
    /// templates, and cell ids are spaced by the number of elements per cell
    /// so they never repeat within the technology.
    pub fn expand(
        &mut self,
        templates: &[ElementTemplate],
    ) -> Result<Vec<(NetworkElement, usize)>, ValidationError> {
        let per_cell_total = templates
            .iter()
            .try_fold(0u32, |total, template| {
                u32::try_from(template.per_cell).ok().and_then(|n| total.checked_add(n))
            })
            .ok_or_else(|| exhausted(self.technology, "too many elements per cell"))?;

        let mut elements = Vec::new();
        let mut offset = 0u32;
        for template in templates {
            if template.kind.trim().is_empty() {
                return Err(ValidationError::MissingRequiredField {
                    entity: format!("{} element template", self.technology),
                    field: "kind",
                });
            }
            for (cell_index, cell) in self.grid.cells().iter().enumerate() {
                for n in 1..=template.per_cell {
                    // n <= per_cell, which fits in u32 per the fold above
                    let ordinal = offset + n as u32;
                    let cell_id = u32::try_from(cell_index)
                        .ok()
                        .and_then(|c| c.checked_mul(per_cell_total))
                        .and_then(|base| base.checked_add(ordinal))
                        .ok_or_else(|| exhausted(self.technology, "cell id space exhausted"))?;
                    let element = self.build(template, cell_index, &cell.name, n, cell_id)?;
                    elements.push((element, cell_index));
                }
            }
            offset += template.per_cell as u32;
        }
        Ok(elements)
    }

    fn build(
        &mut self,
        template: &ElementTemplate,
        cell_index: usize,
        cell_name: &str,
        n: usize,
        cell_id: u32,
    ) -> Result<NetworkElement, ValidationError> {
        let id = ElementId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or_else(|| ValidationError::InvalidValue {
            field: "element_templates".to_string(),
            reason: "element id space exhausted".to_string(),
        })?;

        let ip_address = self.next_address()?;
        let radio = self.radio_identity(cell_index, cell_id);

        let mut element = NetworkElement::new(
            id,
            format!("{}-{}-{}-{}", self.technology, template.kind, cell_name, n),
            template.description.clone(),
            self.technology,
            ip_address,
            ElementStatus::Active,
            radio,
            cell_name,
        )?;
        element.coordinates = self.grid.get(cell_index).map(|cell| cell.center());
        Ok(element)
    }

    /// Private address 10.<technology>.<block>.<host>
    fn next_address(&mut self) -> Result<IpAddr, ValidationError> {
        let block = self.sequence / HOSTS_PER_BLOCK;
        let host = self.sequence % HOSTS_PER_BLOCK + 1;
        let block = u8::try_from(block).map_err(|_| ValidationError::InvalidValue {
            field: "element_templates".to_string(),
            reason: format!("more than {} generated {} elements", 256 * HOSTS_PER_BLOCK, self.technology),
        })?;
        self.sequence += 1;
        Ok(IpAddr::V4(Ipv4Addr::new(10, self.technology.code(), block, host as u8)))
    }

    /// Area code from the technology and cell
    fn radio_identity(&self, cell_index: usize, cell_id: u32) -> RadioIdentity {
        let area = u32::from(self.technology.code()) * 1000 + cell_index as u32 + 1;
        match self.technology.radio_identity_kind() {
            RadioIdentityKind::CellOnly => RadioIdentity::CellOnly { cell_id },
            RadioIdentityKind::LocationArea => RadioIdentity::LocationArea { lac: area, cell_id },
            RadioIdentityKind::TrackingArea => RadioIdentity::TrackingArea { tac: area },
        }
    }

    /// Identifier the next generated element would receive
    pub fn next_id(&self) -> u32 {
        self.next_id
    }
}

fn exhausted(technology: TechnologyId, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: "element_templates".to_string(),
        reason: format!("{}: {}", technology, reason),
    }
}
