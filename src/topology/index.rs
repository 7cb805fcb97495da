//! Immutable topology index
//!
//! Built once from the network document: every technology section is
//! partitioned into its location grid, its elements are validated and bound
//! to cells, templates are expanded, and service types are validated. After
//! construction nothing is mutated, so the index can be shared freely.

use crate::geo::{partition, BoundingBox, GeoGrid, LocationCell};
use crate::network::{ElementFactory, NetworkElement, ServiceType, TechnologyRegistry};
use crate::simulation::error::{ConfigurationError, SimulationResult, ValidationError};
use crate::types::{
    ElementId, NetworkConfig, NetworkElementDefinition, ServiceTypeId, TechnologyId,
    TechnologyNetworkConfig,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Grid, elements and service types of one technology
#[derive(Debug, Clone)]
pub struct TechnologyTopology {
    technology: TechnologyId,
    grid: GeoGrid,
    elements: Vec<NetworkElement>,
    element_cells: Vec<usize>,
    service_types: Vec<ServiceType>,
}

impl TechnologyTopology {
    /// Technology of this topology
    pub fn technology(&self) -> TechnologyId {
        self.technology
    }

    /// Location grid
    pub fn grid(&self) -> &GeoGrid {
        &self.grid
    }

    /// Location cells in row-major order
    pub fn cells(&self) -> &[LocationCell] {
        self.grid.cells()
    }

    /// Network elements in definition order, templated elements last
    pub fn elements(&self) -> &[NetworkElement] {
        &self.elements
    }

    /// Service types in definition order
    pub fn service_types(&self) -> &[ServiceType] {
        &self.service_types
    }

    /// Element at `index` together with the cell it is bound to
    pub fn element_with_cell(&self, index: usize) -> Option<(&NetworkElement, &LocationCell)> {
        let element = self.elements.get(index)?;
        let cell = self.grid.get(*self.element_cells.get(index)?)?;
        Some((element, cell))
    }
}

/// Lookup structure over the whole validated topology
#[derive(Debug, Clone)]
pub struct TopologyIndex {
    country: String,
    topologies: BTreeMap<TechnologyId, TechnologyTopology>,
    element_index: HashMap<ElementId, (TechnologyId, usize)>,
    service_type_index: HashMap<ServiceTypeId, (TechnologyId, usize)>,
}

impl TopologyIndex {
    /// Validate the network document and build the index
    pub fn build(network: &NetworkConfig, registry: &TechnologyRegistry) -> SimulationResult<Self> {
        let mut index = Self {
            country: network.country.clone(),
            topologies: BTreeMap::new(),
            element_index: HashMap::new(),
            service_type_index: HashMap::new(),
        };

        // Resolve every key up front so an unknown technology fails before any work
        let mut sections = Vec::with_capacity(network.networks.len());
        for (key, section) in &network.networks {
            let technology = registry.resolve(key)?;
            if sections.iter().any(|(t, _)| *t == technology) {
                return Err(ValidationError::InvalidValue {
                    field: "networks".to_string(),
                    reason: format!("{} is configured more than once ('{}')", technology, key),
                }
                .into());
            }
            sections.push((technology, section));
        }
        sections.sort_by_key(|(technology, _)| *technology);

        // Templated ids start after the highest explicit id in the whole document
        let highest_explicit = network
            .networks
            .values()
            .flat_map(|section| section.network_elements.iter())
            .map(|definition| definition.id)
            .max()
            .unwrap_or(0);
        let mut next_template_id =
            u32::try_from(highest_explicit.max(0)).unwrap_or(u32::MAX).saturating_add(1);

        for (technology, section) in sections {
            let topology =
                Self::build_technology(network, section, technology, &mut next_template_id)?;
            index.insert(topology)?;
        }

        Ok(index)
    }

    fn build_technology(
        network: &NetworkConfig,
        section: &TechnologyNetworkConfig,
        technology: TechnologyId,
        next_template_id: &mut u32,
    ) -> SimulationResult<TechnologyTopology> {
        let invalid = |source: ValidationError| ConfigurationError::InvalidEntity { technology, source };
        let section_name = format!("{} network", technology);

        let bbox_config = network.bounding_box_for(section).ok_or_else(|| {
            ConfigurationError::InvalidBounds {
                technology,
                reason: "no bounding box configured".to_string(),
            }
        })?;
        let bbox = BoundingBox::try_from(bbox_config).map_err(|e| {
            ConfigurationError::InvalidBounds { technology, reason: e.to_string() }
        })?;

        let rows = section.split_rows.ok_or_else(|| {
            invalid(ValidationError::MissingRequiredField {
                entity: section_name.clone(),
                field: "split_rows",
            })
        })?;
        let cols = section.split_columns.ok_or_else(|| {
            invalid(ValidationError::MissingRequiredField {
                entity: section_name.clone(),
                field: "split_columns",
            })
        })?;

        let grid = partition(&bbox, rows, cols, &section.location_names, technology)?;

        let mut elements = Vec::new();
        let mut element_cells = Vec::new();
        let mut round_robin = 0usize;

        for definition in &section.network_elements {
            let cell_index = place_element(definition, &grid, technology, &mut round_robin)?;
            let cell_name = grid.get(cell_index).map(|c| c.name.clone()).unwrap_or_default();
            let element =
                NetworkElement::from_definition(definition, technology, cell_name).map_err(invalid)?;
            elements.push(element);
            element_cells.push(cell_index);
        }

        if !section.element_templates.is_empty() {
            let mut factory = ElementFactory::new(technology, &grid, *next_template_id);
            for (element, cell_index) in factory.expand(&section.element_templates).map_err(invalid)? {
                elements.push(element);
                element_cells.push(cell_index);
            }
            *next_template_id = factory.next_id();
        }

        let service_types = section
            .service_types
            .iter()
            .map(|definition| ServiceType::from_definition(definition, technology).map_err(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        if elements.is_empty() {
            warn!(%technology, "No network elements configured; records for this technology will fail");
        }
        if service_types.is_empty() {
            warn!(%technology, "No service types configured; records for this technology will fail");
        }

        debug!(
            %technology,
            cells = grid.len(),
            elements = elements.len(),
            service_types = service_types.len(),
            "Built technology topology"
        );

        Ok(TechnologyTopology { technology, grid, elements, element_cells, service_types })
    }

    fn insert(&mut self, topology: TechnologyTopology) -> Result<(), ConfigurationError> {
        let technology = topology.technology;

        for (position, element) in topology.elements.iter().enumerate() {
            if self.element_index.insert(element.id, (technology, position)).is_some() {
                return Err(ConfigurationError::DuplicateId {
                    entity: "network element",
                    id: u64::from(element.id.0),
                });
            }
        }
        for (position, service_type) in topology.service_types.iter().enumerate() {
            if self.service_type_index.insert(service_type.id, (technology, position)).is_some() {
                return Err(ConfigurationError::DuplicateId {
                    entity: "service type",
                    id: u64::from(service_type.id.0),
                });
            }
        }

        self.topologies.insert(technology, topology);
        Ok(())
    }

    /// Country or market of the network
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Configured technologies in generation order
    pub fn technologies(&self) -> Vec<TechnologyId> {
        self.topologies.keys().copied().collect()
    }

    /// Topology of one technology
    pub fn topology(&self, technology: TechnologyId) -> Option<&TechnologyTopology> {
        self.topologies.get(&technology)
    }

    /// Elements of a technology; empty when none are configured
    pub fn elements_for(&self, technology: TechnologyId) -> &[NetworkElement] {
        self.topologies.get(&technology).map(|t| t.elements()).unwrap_or(&[])
    }

    /// Cells of a technology; empty when the technology is not configured
    pub fn cells_for(&self, technology: TechnologyId) -> &[LocationCell] {
        self.topologies.get(&technology).map(|t| t.cells()).unwrap_or(&[])
    }

    /// Service types of a technology; empty when none are configured
    pub fn service_types_for(&self, technology: TechnologyId) -> &[ServiceType] {
        self.topologies.get(&technology).map(|t| t.service_types()).unwrap_or(&[])
    }

    /// Look up an element by id
    pub fn element(&self, id: ElementId) -> Option<&NetworkElement> {
        let (technology, position) = self.element_index.get(&id)?;
        self.topologies.get(technology)?.elements.get(*position)
    }

    /// Look up a service type by id
    pub fn service_type(&self, id: ServiceTypeId) -> Option<&ServiceType> {
        let (technology, position) = self.service_type_index.get(&id)?;
        self.topologies.get(technology)?.service_types.get(*position)
    }

    /// Cell an element is bound to
    pub fn cell_of(&self, id: ElementId) -> Option<&LocationCell> {
        let (technology, position) = self.element_index.get(&id)?;
        self.topologies.get(technology)?.element_with_cell(*position).map(|(_, cell)| cell)
    }

    /// Whether a technology has both elements and service types
    pub fn is_usable(&self, technology: TechnologyId) -> bool {
        !self.elements_for(technology).is_empty() && !self.service_types_for(technology).is_empty()
    }

    /// Total number of elements
    pub fn element_count(&self) -> usize {
        self.element_index.len()
    }

    /// Total number of service types
    pub fn service_type_count(&self) -> usize {
        self.service_type_index.len()
    }

    /// Total number of location cells
    pub fn cell_count(&self) -> usize {
        self.topologies.values().map(|t| t.grid.len()).sum()
    }
}

/// Resolve the cell an element definition is bound to
///
/// An explicit location name wins, then coordinates by containment; elements
/// with neither are spread round-robin over the cells in definition order.
fn place_element(
    definition: &NetworkElementDefinition,
    grid: &GeoGrid,
    technology: TechnologyId,
    round_robin: &mut usize,
) -> Result<usize, ConfigurationError> {
    let element = u32::try_from(definition.id).unwrap_or(0);

    if let Some(name) = &definition.location {
        return grid.position(name).ok_or_else(|| ConfigurationError::UnknownLocationCell {
            technology,
            element,
            cell: name.clone(),
        });
    }

    if let Some([latitude, longitude]) = definition.coordinates {
        return grid.locate(latitude, longitude).ok_or(ConfigurationError::ElementOutsideGrid {
            technology,
            element,
            latitude,
            longitude,
        });
    }

    let index = *round_robin % grid.len().max(1);
    *round_robin += 1;
    Ok(index)
}
