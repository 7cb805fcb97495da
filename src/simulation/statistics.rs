//! Statistics collection and reporting
//!
//! Counts successes and failures of a generation run, per technology and per
//! error kind, and renders the end-of-run report.

use crate::cdr::Cdr;
use crate::simulation::error::GenerationError;
use crate::types::TechnologyId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Success and failure counts for one technology
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyCounts {
    /// Records produced
    pub successes: u64,
    /// Record slots that failed
    pub failures: u64,
}

impl TechnologyCounts {
    /// Records attempted
    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStatistics {
    /// Records produced
    pub total_generated: u64,
    /// Record slots that failed
    pub total_failed: u64,
    /// Counts per technology
    pub per_technology: BTreeMap<TechnologyId, TechnologyCounts>,
    /// Failure counts keyed by error kind
    pub failures_by_kind: BTreeMap<String, u64>,
    /// Calls cut into partial records
    pub split_calls: u64,
    /// Partial records written for split calls
    pub partial_records: u64,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl GenerationStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a produced record
    pub fn record_success(&mut self, cdr: &Cdr) {
        self.total_generated += 1;
        self.per_technology.entry(cdr.technology).or_default().successes += 1;
    }

    /// Count a failed record slot
    pub fn record_failure(&mut self, error: &GenerationError) {
        self.total_failed += 1;
        self.per_technology.entry(error.technology).or_default().failures += 1;
        *self.failures_by_kind.entry(error.kind().to_string()).or_insert(0) += 1;
    }

    /// Count either outcome
    pub fn record(&mut self, item: &Result<Cdr, GenerationError>) {
        match item {
            Ok(cdr) => self.record_success(cdr),
            Err(error) => self.record_failure(error),
        }
    }

    /// Count the records written for one produced call
    pub fn record_pieces(&mut self, pieces: usize) {
        if pieces > 1 {
            self.split_calls += 1;
            self.partial_records += pieces as u64;
        }
    }

    /// Records written, counting every partial record
    pub fn records_written(&self) -> u64 {
        self.total_generated.saturating_sub(self.split_calls) + self.partial_records
    }

    /// Set the run duration
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Record slots attempted
    pub fn total(&self) -> u64 {
        self.total_generated + self.total_failed
    }

    /// Percentage of slots that produced a record
    pub fn success_percentage(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.total_generated as f64 / self.total() as f64 * 100.0
        }
    }

    /// Produced records per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.total_generated as f64 / secs
        }
    }

    /// Counts for one technology
    pub fn technology(&self, technology: TechnologyId) -> TechnologyCounts {
        self.per_technology.get(&technology).copied().unwrap_or_default()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Generated {} CDRs, {} failed ({:.1}% success) in {:.2}s ({:.0} records/s)",
            self.total_generated,
            self.total_failed,
            self.success_percentage(),
            self.elapsed.as_secs_f64(),
            self.throughput()
        )
    }

    /// Multi-line report printed at the end of a run
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Generation Summary ===\n\n");
        report.push_str(&format!("Duration: {:.2} seconds\n", self.elapsed.as_secs_f64()));
        report.push_str(&format!("Throughput: {:.0} records/s\n\n", self.throughput()));

        report.push_str("Records:\n");
        report.push_str(&format!("  • Attempted: {}\n", self.total()));
        report.push_str(&format!(
            "  • Generated: {} ({:.1}%)\n",
            self.total_generated,
            self.success_percentage()
        ));
        report.push_str(&format!("  • Failed: {}\n", self.total_failed));
        if self.split_calls > 0 {
            report.push_str(&format!(
                "  • Split calls: {} ({} partial records, {} written)\n",
                self.split_calls,
                self.partial_records,
                self.records_written()
            ));
        }

        if !self.per_technology.is_empty() {
            report.push_str("\nBy Technology:\n");
            for (technology, counts) in &self.per_technology {
                report.push_str(&format!(
                    "  • {}: {} generated, {} failed\n",
                    technology, counts.successes, counts.failures
                ));
            }
        }

        if !self.failures_by_kind.is_empty() {
            report.push_str("\nFailures:\n");
            for (kind, count) in &self.failures_by_kind {
                report.push_str(&format!("  • {}: {}\n", kind, count));
            }
        }

        report
    }
}

impl fmt::Display for GenerationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::error::ConfigurationError;
    use crate::types::{CdrId, CustomerId, ElementId, ServiceCategory, ServiceTypeId};
    use chrono::Utc;

    fn cdr(technology: TechnologyId) -> Cdr {
        Cdr {
            id: CdrId::new(),
            timestamp_start: Utc::now(),
            duration_seconds: 60,
            customer_id: CustomerId(1),
            msisdn: "21640000001".to_string(),
            technology,
            network_element_id: ElementId(1),
            service_type_id: ServiceTypeId(1),
            jitter: 1.0,
            latency: 1.0,
            throughput: 1.0,
            packet_loss: 0.0,
            call_setup_time: 1.0,
            mos: 4.0,
            location_cell: "A".to_string(),
            called_msisdn: None,
            roaming: false,
            service_category: ServiceCategory::Data,
            message_length: None,
            delivery_status: None,
            partial: None,
        }
    }

    #[test]
    fn test_statistics_counting() {
        let mut stats = GenerationStatistics::new();
        stats.record(&Ok(cdr(TechnologyId::FourG)));
        stats.record(&Ok(cdr(TechnologyId::FourG)));
        stats.record(&Err(GenerationError::new(
            2,
            TechnologyId::TwoG,
            ConfigurationError::NoElementsForTechnology(TechnologyId::TwoG),
        )));

        assert_eq!(stats.total(), 3);
        assert_eq!(stats.total_generated, 2);
        assert_eq!(stats.total_failed, 1);
        assert_eq!(stats.technology(TechnologyId::FourG).successes, 2);
        assert_eq!(stats.technology(TechnologyId::TwoG).failures, 1);
        assert_eq!(stats.technology(TechnologyId::FiveG).total(), 0);
        assert_eq!(stats.failures_by_kind["NoElementsForTechnology"], 1);
    }

    #[test]
    fn test_statistics_rates() {
        let mut stats = GenerationStatistics::new();
        assert_eq!(stats.success_percentage(), 0.0);
        assert_eq!(stats.throughput(), 0.0);

        for _ in 0..10 {
            stats.record_success(&cdr(TechnologyId::ThreeG));
        }
        stats.set_elapsed(Duration::from_secs(2));
        assert_eq!(stats.throughput(), 5.0);
        assert_eq!(stats.success_percentage(), 100.0);
    }

    #[test]
    fn test_report_lists_failures() {
        let mut stats = GenerationStatistics::new();
        stats.record_failure(&GenerationError::new(
            0,
            TechnologyId::FiveG,
            ConfigurationError::NoServiceTypesForTechnology(TechnologyId::FiveG),
        ));

        let report = stats.report();
        assert!(report.contains("5G: 0 generated, 1 failed"));
        assert!(report.contains("NoServiceTypesForTechnology: 1"));
        assert!(stats.summary().starts_with("Generated 0 CDRs, 1 failed"));
    }

    #[test]
    fn test_split_calls_counted() {
        let mut stats = GenerationStatistics::new();
        for pieces in [1, 3, 1, 2] {
            stats.record_success(&cdr(TechnologyId::ThreeG));
            stats.record_pieces(pieces);
        }

        assert_eq!(stats.total_generated, 4);
        assert_eq!(stats.split_calls, 2);
        assert_eq!(stats.partial_records, 5);
        assert_eq!(stats.records_written(), 7);
        assert!(stats.report().contains("Split calls: 2 (5 partial records, 7 written)"));

        let plain = GenerationStatistics::new();
        assert!(!plain.report().contains("Split calls"));
    }
}
