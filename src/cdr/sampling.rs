//! Duration and timestamp policies

use crate::network::ServiceType;
use crate::simulation::error::ValidationError;
use crate::types::{defaults, DurationProfile, ServiceCategory};
use chrono::{DateTime, TimeDelta, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::BTreeMap;

/// Duration stamped on every SMS record
pub const SMS_DURATION_SECS: u32 = 5;

/// Longest generated SMS body in characters
pub const MAX_MESSAGE_LENGTH: u32 = 2_048;

/// How call durations are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Uniform within `[min, max]` seconds
    Uniform {
        /// Shortest duration
        min: u32,
        /// Longest duration
        max: u32,
    },
    /// Always the same duration
    Fixed(u32),
    /// 80% short calls (1-600 s), 5% unanswered attempts (0 s), 15% long
    /// calls (601-3600 s)
    CallProfile,
}

impl DurationPolicy {
    /// Build the policy selected by configuration
    pub fn from_profile(profile: DurationProfile, min: u32, max: u32) -> Self {
        match profile {
            DurationProfile::Uniform => DurationPolicy::Uniform { min: min.min(max), max: max.max(min) },
            DurationProfile::CallProfile => DurationPolicy::CallProfile,
        }
    }

    /// Draw a duration in seconds
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            DurationPolicy::Uniform { min, max } if min >= max => min,
            DurationPolicy::Uniform { min, max } => rng.gen_range(min..=max),
            DurationPolicy::Fixed(seconds) => seconds,
            DurationPolicy::CallProfile => match rng.gen_range(0..100u32) {
                0..=79 => rng.gen_range(1..=600),
                80..=84 => 0,
                _ => rng.gen_range(601..=3_600),
            },
        }
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        DurationPolicy::Uniform { min: 1, max: 3_600 }
    }
}

/// How record start times are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// The wall clock at synthesis time; not reproducible
    #[default]
    Now,
    /// Always the same instant
    Fixed(DateTime<Utc>),
    /// Uniform within `[start, start + span_secs)`, at whole seconds
    Window {
        /// Start of the window
        start: DateTime<Utc>,
        /// Window length in seconds
        span_secs: u64,
    },
}

impl TimestampPolicy {
    /// Draw a start time
    ///
    /// Only the window policy consumes randomness. Fails when the drawn
    /// offset lands outside the range `DateTime<Utc>` can represent.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DateTime<Utc>, ValidationError> {
        match *self {
            TimestampPolicy::Now => Ok(Utc::now()),
            TimestampPolicy::Fixed(at) => Ok(at),
            TimestampPolicy::Window { start, span_secs: 0 } => Ok(start),
            TimestampPolicy::Window { start, span_secs } => {
                let offset = rng.gen_range(0..span_secs);
                offset_by(start, offset).ok_or_else(|| ValidationError::InvalidValue {
                    field: "timestamp_start".to_string(),
                    reason: format!("{} + {} s is not a representable time", start, offset),
                })
            }
        }
    }

    /// Whether every instant the policy can draw is representable
    pub fn is_representable(&self) -> bool {
        match *self {
            TimestampPolicy::Window { start, span_secs } => offset_by(start, span_secs).is_some(),
            TimestampPolicy::Now | TimestampPolicy::Fixed(_) => true,
        }
    }
}

/// `start + secs`, or `None` when the result is not a representable time
pub fn offset_by(start: DateTime<Utc>, secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(secs).ok()?;
    start.checked_add_signed(TimeDelta::try_seconds(secs)?)
}

/// How a service type is picked among those a technology offers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceSelection {
    /// Every service type equally likely
    #[default]
    Uniform,
    /// Category drawn by weight among the categories the technology offers,
    /// then a service type of that category uniformly
    ByCategory(Vec<(ServiceCategory, u32)>),
}

impl ServiceSelection {
    /// Category selection with voice 40, SMS 10, data 45, other 5
    pub fn standard() -> Self {
        ServiceSelection::ByCategory(defaults::SERVICE_CATEGORY_WEIGHTS.to_vec())
    }

    /// Category selection from configured weights; uniform when there are none
    pub fn from_weights(weights: &BTreeMap<ServiceCategory, u32>) -> Self {
        if weights.is_empty() {
            ServiceSelection::Uniform
        } else {
            ServiceSelection::ByCategory(weights.iter().map(|(c, w)| (*c, *w)).collect())
        }
    }

    /// Pick a position in `service_types`
    ///
    /// `None` when the list is empty or, for category selection, when no
    /// offered category has a positive weight.
    pub fn pick<R: Rng + ?Sized>(&self, service_types: &[ServiceType], rng: &mut R) -> Option<usize> {
        match self {
            ServiceSelection::Uniform if service_types.is_empty() => None,
            ServiceSelection::Uniform => Some(rng.gen_range(0..service_types.len())),
            ServiceSelection::ByCategory(weights) => {
                let offered: Vec<(ServiceCategory, u32)> = weights
                    .iter()
                    .copied()
                    .filter(|(category, weight)| {
                        *weight > 0 && service_types.iter().any(|s| s.category == *category)
                    })
                    .collect();

                let category = match offered.as_slice() {
                    [] => return None,
                    [(only, _)] => *only,
                    _ => {
                        let distribution =
                            WeightedIndex::new(offered.iter().map(|(_, w)| u64::from(*w))).ok()?;
                        offered[distribution.sample(rng)].0
                    }
                };

                let matching: Vec<usize> = service_types
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.category == category)
                    .map(|(position, _)| position)
                    .collect();
                Some(matching[rng.gen_range(0..matching.len())])
            }
        }
    }
}
