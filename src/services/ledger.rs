// src/services/ledger.rs

//! Run accounting.
//!
//! The ledger is the single place outcomes are recorded while a crawl
//! runs. Counters only ever move forward; nothing is decremented or
//! rewritten once recorded.
//!
//! Two bookkeeping planes coexist:
//! - per-level tallies (`provinces`, `cities`) describe every node in the
//!   hierarchy, including municipality province entries whose outcome is
//!   mirrored from the request made on behalf of their first city;
//! - `units` count only nodes that cost a network request of their own,
//!   and they are what the headline success rate is computed over.

use chrono::Utc;

use crate::models::{CrawlSummary, ErrorRecord, LevelStats, NodeKind, SummaryStats};

/// Accumulates outcomes during a crawl and produces the final summary.
#[derive(Debug, Default)]
pub struct CrawlLedger {
    provinces: LevelStats,
    cities: LevelStats,
    units: LevelStats,
    errors: Vec<ErrorRecord>,
}

impl CrawlLedger {
    /// Record a successfully stored node.
    pub fn record_success(&mut self, kind: NodeKind) {
        self.level_mut(kind).add_success();
        self.units.add_success();
    }

    /// Record a node that failed after exhausting its options.
    pub fn record_failure(&mut self, record: ErrorRecord) {
        self.level_mut(record.kind).add_failure();
        self.units.add_failure();
        self.errors.push(record);
    }

    /// Record a province success mirrored from a municipality request.
    ///
    /// The request was already counted as a unit by the city that issued
    /// it, so only the province tally moves.
    pub fn record_mirrored_success(&mut self) {
        self.provinces.add_success();
    }

    /// Record a province failure mirrored from a municipality request.
    pub fn record_mirrored_failure(&mut self, record: ErrorRecord) {
        self.provinces.add_failure();
        self.errors.push(record);
    }

    fn level_mut(&mut self, kind: NodeKind) -> &mut LevelStats {
        match kind {
            NodeKind::Province => &mut self.provinces,
            NodeKind::City => &mut self.cities,
        }
    }

    /// Province-level tallies.
    pub fn provinces(&self) -> LevelStats {
        self.provinces
    }

    /// City-level tallies.
    pub fn cities(&self) -> LevelStats {
        self.cities
    }

    /// All failure records, in the order they occurred.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Whether any node failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Build the persisted summary from the current tallies.
    pub fn summarize(&self) -> CrawlSummary {
        let rate = if self.units.total == 0 {
            0.0
        } else {
            f64::from(self.units.success) * 100.0 / f64::from(self.units.total)
        };

        CrawlSummary {
            total: self.units.total,
            success: self.units.success,
            failed: self.units.failed,
            success_rate: format!("{:.2}%", rate),
            stats: SummaryStats {
                provinces: self.provinces,
                cities: self.cities,
            },
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, Province};

    fn sample_province() -> Province {
        Province {
            code: "110000".to_string(),
            name: "北京市".to_string(),
            cities: vec![City {
                code: "110100000000".to_string(),
                name: "北京城区".to_string(),
            }],
        }
    }

    #[test]
    fn test_levels_conserve_totals() {
        let province = sample_province();
        let mut ledger = CrawlLedger::default();

        ledger.record_success(NodeKind::Province);
        ledger.record_success(NodeKind::City);
        ledger.record_failure(ErrorRecord::city(
            &province,
            &province.cities[0],
            false,
            "HTTP status 500",
        ));

        let provinces = ledger.provinces();
        let cities = ledger.cities();
        assert_eq!(provinces.success + provinces.failed, provinces.total);
        assert_eq!(cities.success + cities.failed, cities.total);
        assert_eq!(cities.total, 2);
    }

    #[test]
    fn test_mirrored_outcomes_do_not_count_as_units() {
        let province = sample_province();
        let mut ledger = CrawlLedger::default();

        // One municipality: the province outcome mirrors the city request.
        ledger.record_mirrored_failure(ErrorRecord::province(&province, true, "HTTP status 500"));
        ledger.record_success(NodeKind::City);

        let summary = ledger.summarize();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.success_rate, "100.00%");

        // The per-level view still shows the mirrored failure.
        assert_eq!(summary.stats.provinces.failed, 1);
        assert_eq!(summary.stats.cities.success, 1);
        assert_eq!(ledger.errors().len(), 1);
    }

    #[test]
    fn test_success_rate_formatting() {
        let mut ledger = CrawlLedger::default();
        let province = sample_province();

        ledger.record_success(NodeKind::City);
        ledger.record_success(NodeKind::City);
        ledger.record_failure(ErrorRecord::city(
            &province,
            &province.cities[0],
            false,
            "timed out",
        ));

        assert_eq!(ledger.summarize().success_rate, "66.67%");
    }

    #[test]
    fn test_empty_ledger_summary() {
        let summary = CrawlLedger::default().summarize();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.success_rate, "0.00%");
        assert!(!CrawlLedger::default().has_errors());
    }

    #[test]
    fn test_errors_preserve_order() {
        let province = sample_province();
        let mut ledger = CrawlLedger::default();

        ledger.record_failure(ErrorRecord::province(&province, false, "first"));
        ledger.record_failure(ErrorRecord::city(
            &province,
            &province.cities[0],
            false,
            "second",
        ));

        let errors = ledger.errors();
        assert_eq!(errors[0].error, "first");
        assert_eq!(errors[1].error, "second");
    }
}
