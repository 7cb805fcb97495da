//! Per-record technology selection
//!
//! A [`TechnologyMix`] picks the technology for record `index`. The random
//! policies draw from the record's own generator; the rotating policies only
//! look at the index, so every execution mode sees the same choice.

use crate::simulation::error::{ConfigurationError, SimulationResult};
use crate::types::{ConfigValidationError, MixPolicy, TechnologyId, TechnologyMixConfig};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Technology selection policy over a fixed list of technologies
#[derive(Debug, Clone)]
pub struct TechnologyMix {
    policy: MixPolicy,
    technologies: Vec<TechnologyId>,
    weights: Vec<u32>,
    weighted: Option<WeightedIndex<u64>>,
    total_weight: u64,
}

impl TechnologyMix {
    /// Build a mix from `(technology, weight)` entries
    ///
    /// Weights only matter for the weighted policies, where entries with a
    /// zero weight are dropped.
    pub fn new(policy: MixPolicy, entries: Vec<(TechnologyId, u32)>) -> SimulationResult<Self> {
        let weighted_policy = matches!(policy, MixPolicy::Weighted | MixPolicy::WeightedRoundRobin);
        let entries: Vec<(TechnologyId, u32)> = if weighted_policy {
            entries.into_iter().filter(|(_, weight)| *weight > 0).collect()
        } else {
            entries
        };

        if entries.is_empty() {
            if weighted_policy {
                return Err(ConfigValidationError::MissingMixWeights(policy).into());
            }
            return Err(ConfigurationError::NoUsableTechnology(Vec::new()).into());
        }

        let (technologies, weights): (Vec<_>, Vec<_>) = entries.into_iter().unzip();

        // At most four u32 weights, so the sum cannot overflow a u64
        let total_weight = weights.iter().map(|w| u64::from(*w)).sum();

        let weighted = match policy {
            MixPolicy::Weighted => Some(
                WeightedIndex::new(weights.iter().map(|w| u64::from(*w)))
                    .map_err(|_| ConfigValidationError::MissingMixWeights(policy))?,
            ),
            _ => None,
        };

        Ok(Self { policy, technologies, weights, weighted, total_weight })
    }

    /// Uniform choice over `technologies`
    pub fn uniform(technologies: &[TechnologyId]) -> SimulationResult<Self> {
        Self::new(MixPolicy::Uniform, technologies.iter().map(|t| (*t, 1)).collect())
    }

    /// Strict rotation over `technologies`
    pub fn round_robin(technologies: &[TechnologyId]) -> SimulationResult<Self> {
        Self::new(MixPolicy::RoundRobin, technologies.iter().map(|t| (*t, 1)).collect())
    }

    /// Build the mix described by configuration
    ///
    /// An empty technology list means every technology in `available`.
    /// Weighted policies take weights from the configuration and treat
    /// unlisted technologies as weight zero.
    pub fn from_config(config: &TechnologyMixConfig, available: &[TechnologyId]) -> SimulationResult<Self> {
        let technologies: Vec<TechnologyId> = if config.technologies.is_empty() {
            available.to_vec()
        } else {
            config.technologies.clone()
        };

        let entries = technologies
            .into_iter()
            .map(|technology| {
                let weight = match config.policy {
                    MixPolicy::Weighted | MixPolicy::WeightedRoundRobin => {
                        config.weights.get(&technology).copied().unwrap_or(0)
                    }
                    MixPolicy::Uniform | MixPolicy::RoundRobin => 1,
                };
                (technology, weight)
            })
            .collect();

        Self::new(config.policy, entries)
    }

    /// Selection policy
    pub fn policy(&self) -> MixPolicy {
        self.policy
    }

    /// Technologies the mix can choose
    pub fn technologies(&self) -> &[TechnologyId] {
        &self.technologies
    }

    /// Weight of `technology`, zero when it is not part of the mix
    pub fn weight(&self, technology: TechnologyId) -> u32 {
        self.technologies
            .iter()
            .position(|t| *t == technology)
            .map(|i| self.weights[i])
            .unwrap_or(0)
    }

    /// Choose the technology for record `index`
    pub fn choose<R: Rng + ?Sized>(&self, index: u64, rng: &mut R) -> TechnologyId {
        match self.policy {
            MixPolicy::Uniform => self.technologies[rng.gen_range(0..self.technologies.len())],
            MixPolicy::Weighted => match &self.weighted {
                Some(distribution) => self.technologies[distribution.sample(rng)],
                None => self.technologies[0],
            },
            MixPolicy::RoundRobin => {
                self.technologies[(index % self.technologies.len() as u64) as usize]
            }
            MixPolicy::WeightedRoundRobin => self.rotation_slot(index),
        }
    }

    /// Walk the cumulative weights to the technology owning `index % total`
    fn rotation_slot(&self, index: u64) -> TechnologyId {
        let mut slot = index % self.total_weight.max(1);
        for (technology, weight) in self.technologies.iter().zip(&self.weights) {
            let weight = u64::from(*weight);
            if slot < weight {
                return *technology;
            }
            slot -= weight;
        }
        self.technologies[0]
    }
}
