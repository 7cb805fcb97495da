//! Customer population generation
//!
//! Home subscribers get numbers from the operator's own NDC ranges, national
//! subscribers from other domestic operators, and international subscribers
//! from a list of foreign dialling prefixes. IMSIs follow the subscriber's
//! network and IMEIs carry a valid Luhn check digit.

use super::{Customer, CustomerPool};
use crate::simulation::error::SimulationResult;
use crate::types::{AccountType, CustomerId, CustomerStatus, CustomerType};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A foreign network subscribers may roam in from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignNetwork {
    /// Country dialling prefix
    pub country_code: String,
    /// Mobile country code
    pub mcc: String,
    /// Mobile network code
    pub mnc: String,
}

/// Numbering plan used to build subscriber identities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingPlan {
    /// Domestic country dialling prefix
    pub country_code: String,
    /// Length of the national significant number
    pub national_digits: usize,
    /// Domestic mobile country code
    pub mcc: String,
    /// Mobile network code of the simulated operator
    pub home_mnc: String,
    /// NDC ranges of the simulated operator, inclusive
    pub home_ndc_ranges: Vec<(u32, u32)>,
    /// Mobile network code used for other domestic operators
    pub national_mnc: String,
    /// NDC ranges of other domestic operators, inclusive
    pub national_ndc_ranges: Vec<(u32, u32)>,
    /// Foreign networks for international subscribers
    pub foreign_networks: Vec<ForeignNetwork>,
    /// Length of foreign subscriber numbers without the country prefix
    pub foreign_digits: usize,
    /// Share of home subscribers (0.0-1.0)
    pub home_share: f64,
    /// Share of national subscribers (0.0-1.0); the rest are international
    pub national_share: f64,
    /// Share of prepaid accounts (0.0-1.0)
    pub prepaid_share: f64,
    /// Type allocation codes used for generated IMEIs
    pub device_tacs: Vec<String>,
}

impl Default for NumberingPlan {
    fn default() -> Self {
        let foreign = |country_code: &str, mcc: &str, mnc: &str| ForeignNetwork {
            country_code: country_code.to_string(),
            mcc: mcc.to_string(),
            mnc: mnc.to_string(),
        };
        Self {
            country_code: "216".to_string(),
            national_digits: 8,
            mcc: "605".to_string(),
            home_mnc: "02".to_string(),
            home_ndc_ranges: vec![(40, 49), (90, 99)],
            national_mnc: "01".to_string(),
            national_ndc_ranges: vec![(20, 29), (50, 59)],
            foreign_networks: vec![
                foreign("33", "208", "01"),
                foreign("39", "222", "10"),
                foreign("49", "262", "01"),
                foreign("44", "234", "15"),
            ],
            foreign_digits: 9,
            home_share: 0.7,
            national_share: 0.2,
            prepaid_share: 0.8,
            device_tacs: vec![
                "35693803".to_string(),
                "35332510".to_string(),
                "86891203".to_string(),
                "01326300".to_string(),
            ],
        }
    }
}

/// Seeded generator of customer populations
#[derive(Debug)]
pub struct CustomerGenerator {
    plan: NumberingPlan,
    rng: StdRng,
}

impl CustomerGenerator {
    /// Create a generator with the default numbering plan
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_plan(NumberingPlan::default(), seed)
    }

    /// Create a generator with a custom numbering plan
    pub fn with_plan(plan: NumberingPlan, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { plan, rng }
    }

    /// Generate `count` customers with ids 1..=count
    ///
    /// Types are allocated by share: home first, then national, with the
    /// remainder international.
    pub fn generate(&mut self, count: usize) -> Vec<Customer> {
        let home = ((count as f64 * self.plan.home_share).round() as usize).min(count);
        let national = ((count as f64 * self.plan.national_share).round() as usize)
            .min(count.saturating_sub(home));

        let mut customers = Vec::with_capacity(count);
        for index in 0..count {
            let customer_type = if index < home {
                CustomerType::Home
            } else if index < home + national {
                CustomerType::National
            } else {
                CustomerType::International
            };
            customers.push(self.customer(CustomerId(index as u64 + 1), customer_type));
        }

        debug!(home, national, international = count - home - national, "Generated customers");
        customers
    }

    /// Generate a validated pool of `count` customers
    pub fn generate_pool(&mut self, count: usize) -> SimulationResult<CustomerPool> {
        let pool = CustomerPool::new(self.generate(count))?;
        info!("Generated customer pool of {} subscribers", pool.len());
        Ok(pool)
    }

    fn customer(&mut self, id: CustomerId, customer_type: CustomerType) -> Customer {
        let (msisdn, imsi) = match customer_type {
            CustomerType::Home => {
                let msisdn = self.domestic_msisdn(&self.plan.home_ndc_ranges.clone());
                let imsi = self.imsi(&self.plan.mcc.clone(), &self.plan.home_mnc.clone());
                (msisdn, imsi)
            }
            CustomerType::National => {
                let msisdn = self.domestic_msisdn(&self.plan.national_ndc_ranges.clone());
                let imsi = self.imsi(&self.plan.mcc.clone(), &self.plan.national_mnc.clone());
                (msisdn, imsi)
            }
            CustomerType::International => self.foreign_identity(),
        };

        let account_type = if self.rng.gen_bool(self.plan.prepaid_share.clamp(0.0, 1.0)) {
            AccountType::Prepaid
        } else {
            AccountType::Postpaid
        };

        Customer {
            id,
            msisdn,
            imsi,
            imei: self.imei(),
            customer_type,
            account_type,
            status: CustomerStatus::Active,
        }
    }

    /// Country code, NDC from one of the ranges, then random subscriber digits
    fn domestic_msisdn(&mut self, ndc_ranges: &[(u32, u32)]) -> String {
        let ndc = match ndc_ranges {
            [] => String::new(),
            ranges => {
                let (low, high) = ranges[self.rng.gen_range(0..ranges.len())];
                self.rng.gen_range(low.min(high)..=high.max(low)).to_string()
            }
        };
        let remaining = self.plan.national_digits.saturating_sub(ndc.len());
        let subscriber = self.digits(remaining);
        format!("{}{}{}", self.plan.country_code, ndc, subscriber)
    }

    fn foreign_identity(&mut self) -> (String, String) {
        if self.plan.foreign_networks.is_empty() {
            let msisdn = self.domestic_msisdn(&self.plan.national_ndc_ranges.clone());
            let imsi = self.imsi(&self.plan.mcc.clone(), &self.plan.national_mnc.clone());
            return (msisdn, imsi);
        }
        let index = self.rng.gen_range(0..self.plan.foreign_networks.len());
        let network = self.plan.foreign_networks[index].clone();
        let msisdn = format!("{}{}", network.country_code, self.digits(self.plan.foreign_digits));
        let imsi = self.imsi(&network.mcc, &network.mnc);
        (msisdn, imsi)
    }

    /// MCC + MNC + MSIN, 15 digits in total
    fn imsi(&mut self, mcc: &str, mnc: &str) -> String {
        let msin = self.digits(15usize.saturating_sub(mcc.len() + mnc.len()));
        format!("{}{}{}", mcc, mnc, msin)
    }

    /// TAC + 6-digit serial + Luhn check digit
    fn imei(&mut self) -> String {
        let tac = if self.plan.device_tacs.is_empty() {
            self.digits(8)
        } else {
            let index = self.rng.gen_range(0..self.plan.device_tacs.len());
            self.plan.device_tacs[index].clone()
        };
        let body = format!("{}{}", tac, self.digits(14usize.saturating_sub(tac.len())));
        let check = luhn_check_digit(&body);
        format!("{}{}", body, check)
    }

    fn digits(&mut self, count: usize) -> String {
        (0..count).map(|_| char::from(b'0' + self.rng.gen_range(0..10u8))).collect()
    }
}

/// Luhn check digit for a string of decimal digits
pub fn luhn_check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    (10 - sum % 10) % 10
}
