//! Network technologies and the technology registry
//!
//! The registry is built once at startup, never mutated, and passed by
//! reference to everything that needs to resolve a technology.

use crate::simulation::error::ValidationError;
use crate::types::{TechnologyDefinition, TechnologyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A radio access technology offered by the simulated network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTechnology {
    /// Technology identifier
    pub id: TechnologyId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
}

impl NetworkTechnology {
    /// Create a validated technology
    pub fn new(
        id: TechnologyId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                entity: "network technology",
                id: i64::from(id.code()),
            });
        }
        Ok(Self { id, name, description: description.into() })
    }

    /// Build a technology from its document definition
    pub fn from_definition(definition: &TechnologyDefinition) -> Result<Self, ValidationError> {
        let id: TechnologyId = definition
            .id
            .parse()
            .map_err(|_| ValidationError::UnknownTechnology(definition.id.clone()))?;
        Self::new(id, definition.name.clone(), definition.description.clone())
    }
}

/// Immutable table of known technologies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyRegistry {
    technologies: BTreeMap<TechnologyId, NetworkTechnology>,
}

impl TechnologyRegistry {
    /// The standard 2G, 3G, 4G and 5G table
    pub fn standard() -> Self {
        let entries = [
            (TechnologyId::TwoG, "GSM", "Second generation circuit-switched mobile network"),
            (TechnologyId::ThreeG, "UMTS", "Third generation mobile network"),
            (TechnologyId::FourG, "LTE", "Fourth generation all-IP mobile network"),
            (TechnologyId::FiveG, "NR", "Fifth generation New Radio mobile network"),
        ];
        let technologies = entries
            .into_iter()
            .map(|(id, name, description)| {
                (id, NetworkTechnology { id, name: name.to_string(), description: description.to_string() })
            })
            .collect();
        Self { technologies }
    }

    /// Build a registry from document definitions, or the standard table when empty
    pub fn from_definitions(definitions: &[TechnologyDefinition]) -> Result<Self, ValidationError> {
        if definitions.is_empty() {
            return Ok(Self::standard());
        }

        let mut technologies = BTreeMap::new();
        for definition in definitions {
            let technology = NetworkTechnology::from_definition(definition)?;
            if technologies.contains_key(&technology.id) {
                return Err(ValidationError::InvalidValue {
                    field: "technologies".to_string(),
                    reason: format!("{} is defined more than once", technology.id),
                });
            }
            technologies.insert(technology.id, technology);
        }
        Ok(Self { technologies })
    }

    /// Look up a technology
    pub fn get(&self, id: TechnologyId) -> Option<&NetworkTechnology> {
        self.technologies.get(&id)
    }

    /// Whether the technology is registered
    pub fn contains(&self, id: TechnologyId) -> bool {
        self.technologies.contains_key(&id)
    }

    /// Resolve a technology name from a document key
    pub fn resolve(&self, key: &str) -> Result<TechnologyId, ValidationError> {
        key.parse::<TechnologyId>()
            .ok()
            .filter(|id| self.contains(*id))
            .ok_or_else(|| ValidationError::UnknownTechnology(key.to_string()))
    }

    /// Registered technology ids in generation order
    pub fn ids(&self) -> impl Iterator<Item = TechnologyId> + '_ {
        self.technologies.keys().copied()
    }

    /// Number of registered technologies
    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }
}

impl Default for TechnologyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = TechnologyRegistry::standard();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get(TechnologyId::FourG).unwrap().name, "LTE");
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec![
                TechnologyId::TwoG,
                TechnologyId::ThreeG,
                TechnologyId::FourG,
                TechnologyId::FiveG
            ]
        );
    }

    #[test]
    fn test_resolve_rejects_unregistered() {
        let definitions = vec![TechnologyDefinition {
            id: "4G".to_string(),
            name: "LTE".to_string(),
            description: String::new(),
        }];
        let registry = TechnologyRegistry::from_definitions(&definitions).unwrap();
        assert_eq!(registry.resolve("4G").unwrap(), TechnologyId::FourG);
        assert_eq!(
            registry.resolve("2G"),
            Err(ValidationError::UnknownTechnology("2G".to_string()))
        );
        assert_eq!(
            registry.resolve("6G"),
            Err(ValidationError::UnknownTechnology("6G".to_string()))
        );
    }

    #[test]
    fn test_definition_validation() {
        let unknown = TechnologyDefinition {
            id: "WiMAX".to_string(),
            name: "WiMAX".to_string(),
            description: String::new(),
        };
        assert!(matches!(
            NetworkTechnology::from_definition(&unknown),
            Err(ValidationError::UnknownTechnology(_))
        ));

        assert!(matches!(
            NetworkTechnology::new(TechnologyId::TwoG, "  ", ""),
            Err(ValidationError::EmptyName { .. })
        ));
    }
}
