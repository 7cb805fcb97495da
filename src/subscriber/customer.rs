//! Subscribers and the customer pool
//!
//! Customers are read-only input to synthesis. The pool is loaded from a JSON
//! array or produced by [`CustomerGenerator`](super::CustomerGenerator), is
//! validated once, and is never empty.

use crate::simulation::error::{ConfigurationError, SimulationError, ValidationError};
use crate::types::{AccountType, ConfigError, CustomerId, CustomerStatus, CustomerType};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// A mobile subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier
    pub id: CustomerId,
    /// Subscriber phone number in international format, digits only
    pub msisdn: String,
    /// International mobile subscriber identity
    pub imsi: String,
    /// International mobile equipment identity
    pub imei: String,
    /// Home, national or international subscriber
    pub customer_type: CustomerType,
    /// Billing relationship
    pub account_type: AccountType,
    /// Account status
    #[serde(default)]
    pub status: CustomerStatus,
}

impl Customer {
    /// Check identifiers and number formats
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.0 == 0 {
            return Err(ValidationError::InvalidId { entity: "customer", id: 0 });
        }
        check_digits("msisdn", &self.msisdn, 6..=15)?;
        check_digits("imsi", &self.imsi, 14..=15)?;
        check_digits("imei", &self.imei, 15..=15)?;
        Ok(())
    }

    /// Whether the subscriber is served away from the home network
    pub fn is_roaming(&self) -> bool {
        self.customer_type.is_roaming()
    }
}

fn check_digits(
    field: &str,
    value: &str,
    lengths: std::ops::RangeInclusive<usize>,
) -> Result<(), ValidationError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) || !lengths.contains(&value.len()) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!(
                "'{}' must be {} to {} digits",
                value,
                lengths.start(),
                lengths.end()
            ),
        });
    }
    Ok(())
}

/// Non-empty, validated set of customers
#[derive(Debug, Clone)]
pub struct CustomerPool {
    customers: Vec<Customer>,
    by_id: HashMap<CustomerId, usize>,
    /// Ascending customer positions per type, only for types with members
    by_type: Vec<(CustomerType, Vec<usize>)>,
    caller_types: Option<WeightedIndex<u32>>,
}

impl CustomerPool {
    /// Build a pool, validating every customer
    pub fn new(customers: Vec<Customer>) -> Result<Self, SimulationError> {
        if customers.is_empty() {
            return Err(ConfigurationError::NoCustomers.into());
        }

        let mut by_id = HashMap::with_capacity(customers.len());
        for (index, customer) in customers.iter().enumerate() {
            customer.validate()?;
            if by_id.insert(customer.id, index).is_some() {
                return Err(ConfigurationError::DuplicateId { entity: "customer", id: customer.id.0 }
                    .into());
            }
        }

        let by_type: Vec<(CustomerType, Vec<usize>)> = CustomerType::ALL
            .into_iter()
            .map(|customer_type| {
                let members = customers
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.customer_type == customer_type)
                    .map(|(index, _)| index)
                    .collect::<Vec<_>>();
                (customer_type, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect();
        let caller_types = WeightedIndex::new(by_type.iter().map(|(t, _)| t.party_weight())).ok();

        Ok(Self { customers, by_id, by_type, caller_types })
    }

    /// Load a pool from a JSON array of customers
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = fs::read_to_string(path)?;
        let customers: Vec<Customer> = serde_json::from_str(&content)?;
        let pool = Self::new(customers)?;
        info!("Loaded {} customers from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Uniformly pick a customer
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Customer {
        &self.customers[rng.gen_range(0..self.customers.len())]
    }

    /// Pick a calling party
    ///
    /// The customer type is drawn with weights home 60, national 39,
    /// international 1 over the types present in the pool, then a customer
    /// of that type is picked uniformly.
    pub fn choose_caller<R: Rng + ?Sized>(&self, rng: &mut R) -> &Customer {
        let slot = match &self.caller_types {
            Some(types) if self.by_type.len() > 1 => types.sample(rng),
            _ => 0,
        };
        match self.by_type.get(slot) {
            Some((_, members)) => &self.customers[members[rng.gen_range(0..members.len())]],
            None => self.choose(rng),
        }
    }

    /// Pick a called party other than `caller`
    ///
    /// Types are weighted like [`CustomerPool::choose_caller`], restricted to
    /// types with at least one member besides the caller. `None` when the
    /// caller is the only customer.
    pub fn choose_called<R: Rng + ?Sized>(&self, caller: &Customer, rng: &mut R) -> Option<&Customer> {
        let caller_index = self.by_id.get(&caller.id).copied();
        let others = |members: &[usize]| match caller_index {
            Some(index) if members.binary_search(&index).is_ok() => members.len() - 1,
            _ => members.len(),
        };

        let candidates: Vec<usize> = (0..self.by_type.len())
            .filter(|slot| others(&self.by_type[*slot].1) > 0)
            .collect();
        let slot = match candidates.as_slice() {
            [] => return None,
            [only] => *only,
            _ => {
                let weights = WeightedIndex::new(candidates.iter().map(|s| self.by_type[*s].0.party_weight())).ok()?;
                candidates[weights.sample(rng)]
            }
        };

        let members = &self.by_type[slot].1;
        let mut pick = rng.gen_range(0..others(members));
        if let Some(position) = caller_index.and_then(|index| members.binary_search(&index).ok()) {
            if pick >= position {
                pick += 1;
            }
        }
        Some(&self.customers[members[pick]])
    }

    /// Look up a customer by id
    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.by_id.get(&id).map(|index| &self.customers[*index])
    }

    /// Number of customers
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Iterate over all customers
    pub fn iter(&self) -> impl Iterator<Item = &Customer> {
        self.customers.iter()
    }

    /// Count customers of each type
    pub fn type_breakdown(&self) -> HashMap<CustomerType, usize> {
        let mut counts = HashMap::new();
        for customer in &self.customers {
            *counts.entry(customer.customer_type).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: u64) -> Customer {
        Customer {
            id: CustomerId(id),
            msisdn: "21620123456".to_string(),
            imsi: "605010000000001".to_string(),
            imei: "356938035643809".to_string(),
            customer_type: CustomerType::Home,
            account_type: AccountType::Prepaid,
            status: CustomerStatus::Active,
        }
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(matches!(
            CustomerPool::new(Vec::new()),
            Err(SimulationError::Configuration(ConfigurationError::NoCustomers))
        ));
    }

    #[test]
    fn test_duplicate_customer_rejected() {
        assert!(matches!(
            CustomerPool::new(vec![customer(1), customer(1)]),
            Err(SimulationError::Configuration(ConfigurationError::DuplicateId { id: 1, .. }))
        ));
    }

    #[test]
    fn test_customer_validation() {
        assert!(customer(1).validate().is_ok());

        let mut bad = customer(1);
        bad.msisdn = "+216-20".to_string();
        assert!(matches!(bad.validate(), Err(ValidationError::InvalidValue { .. })));

        assert!(matches!(
            customer(0).validate(),
            Err(ValidationError::InvalidId { entity: "customer", .. })
        ));
    }

    #[test]
    fn test_pool_lookup_and_choose() {
        use rand::{rngs::StdRng, SeedableRng};

        let pool = CustomerPool::new(vec![customer(1), customer(2), customer(3)]).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(CustomerId(2)).unwrap().id, CustomerId(2));
        assert!(pool.get(CustomerId(9)).is_none());

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let chosen = pool.choose(&mut rng);
            assert!(pool.get(chosen.id).is_some());
        }
    }

    fn typed(id: u64, customer_type: CustomerType) -> Customer {
        Customer { customer_type, ..customer(id) }
    }

    #[test]
    fn test_caller_types_follow_party_weights() {
        use rand::{rngs::StdRng, SeedableRng};

        let mut customers: Vec<Customer> = (1..=10).map(|id| typed(id, CustomerType::Home)).collect();
        customers.extend((11..=20).map(|id| typed(id, CustomerType::National)));
        customers.extend((21..=30).map(|id| typed(id, CustomerType::International)));
        let pool = CustomerPool::new(customers).unwrap();

        let mut rng = StdRng::seed_from_u64(60);
        let mut counts = HashMap::new();
        for _ in 0..10_000 {
            *counts.entry(pool.choose_caller(&mut rng).customer_type).or_insert(0) += 1;
        }
        let home = counts[&CustomerType::Home];
        let national = counts[&CustomerType::National];
        assert!((5_600..=6_400).contains(&home), "home share off: {}", home);
        assert!((3_500..=4_300).contains(&national), "national share off: {}", national);
        assert!(counts.get(&CustomerType::International).copied().unwrap_or(0) < 300);
    }

    #[test]
    fn test_caller_from_single_type_pool() {
        use rand::{rngs::StdRng, SeedableRng};

        let pool = CustomerPool::new(vec![typed(1, CustomerType::International), typed(2, CustomerType::International)])
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let caller = pool.choose_caller(&mut rng);
            assert!(caller.is_roaming());
        }
    }

    #[test]
    fn test_called_party_differs_from_caller() {
        use rand::{rngs::StdRng, SeedableRng};

        let pool = CustomerPool::new(vec![
            typed(1, CustomerType::Home),
            typed(2, CustomerType::Home),
            typed(3, CustomerType::National),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let caller = pool.choose_caller(&mut rng);
            let called = pool.choose_called(caller, &mut rng).unwrap();
            assert_ne!(caller.id, called.id);
        }

        // The only national customer can still be called by a home caller
        let caller = pool.get(CustomerId(1)).unwrap();
        let seen: std::collections::HashSet<_> =
            (0..500).filter_map(|_| pool.choose_called(caller, &mut rng)).map(|c| c.id).collect();
        assert_eq!(seen, [CustomerId(2), CustomerId(3)].into_iter().collect());
    }

    #[test]
    fn test_single_customer_has_nobody_to_call() {
        use rand::{rngs::StdRng, SeedableRng};

        let pool = CustomerPool::new(vec![customer(1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let caller = pool.choose_caller(&mut rng);
        assert_eq!(caller.id, CustomerId(1));
        assert!(pool.choose_called(caller, &mut rng).is_none());
        assert!(!caller.is_roaming());
    }

    #[test]
    fn test_pool_from_file() {
        use std::io::Write;

        let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&vec![customer(7), customer(8)]).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();

        let pool = CustomerPool::from_file(temp_file.path()).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.type_breakdown()[&CustomerType::Home], 2);
    }
}
