//! Crawl result reporting structures.
//!
//! These types define the two artifacts written at the end of a run: the
//! summary document and the error log. Field names follow the camelCase
//! convention of downstream consumers of those files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::province::{City, Province};

/// Which level of the hierarchy a record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Province,
    City,
}

impl NodeKind {
    /// Lowercase label for display.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Province => "province",
            NodeKind::City => "city",
        }
    }
}

/// Success and failure counters for one hierarchy level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
}

impl LevelStats {
    /// Record one successful node.
    pub fn add_success(&mut self) {
        self.total += 1;
        self.success += 1;
    }

    /// Record one failed node.
    pub fn add_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}

/// One failed node, with enough context to retry it by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Hierarchy level of the failed node
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Display name of the failed division
    pub name: String,

    /// Code used in the request URL
    pub code: String,

    /// Original 12-digit dataset code, for city records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_code: Option<String>,

    /// Parent province code, for city records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,

    /// Parent province name, for city records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,

    /// Whether the node belongs to a province-level municipality
    pub is_municipality: bool,

    /// Message of the last error observed for this node
    pub error: String,

    /// When the failure was recorded
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    /// Build a record for a failed province-level node.
    pub fn province(province: &Province, is_municipality: bool, error: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Province,
            name: province.name.clone(),
            code: province.code.clone(),
            original_code: None,
            province_code: None,
            province_name: None,
            is_municipality,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build a record for a failed city-level node.
    pub fn city(
        province: &Province,
        city: &City,
        is_municipality: bool,
        error: impl Into<String>,
    ) -> Self {
        Self {
            kind: NodeKind::City,
            name: city.name.clone(),
            code: city.api_code().to_string(),
            original_code: Some(city.code.clone()),
            province_code: Some(province.code.clone()),
            province_name: Some(province.name.clone()),
            is_municipality,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Per-level statistics grouped for the summary document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub provinces: LevelStats,
    pub cities: LevelStats,
}

/// Final run summary, persisted alongside the fetched documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// Units attempted across both levels
    pub total: u32,

    /// Units stored successfully
    pub success: u32,

    /// Units that failed after exhausting retries
    #[serde(rename = "error")]
    pub failed: u32,

    /// Success percentage over attempted units, e.g. "93.55%"
    pub success_rate: String,

    /// Per-level breakdown
    pub stats: SummaryStats,

    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_province() -> Province {
        Province {
            code: "420000".to_string(),
            name: "湖北省".to_string(),
            cities: vec![City {
                code: "420100000000".to_string(),
                name: "武汉市".to_string(),
            }],
        }
    }

    #[test]
    fn test_level_stats_conservation() {
        let mut stats = LevelStats::default();
        stats.add_success();
        stats.add_success();
        stats.add_failure();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.success + stats.failed, stats.total);
    }

    #[test]
    fn test_province_record_omits_city_fields() {
        let province = sample_province();
        let record = ErrorRecord::province(&province, false, "HTTP status 500");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "province");
        assert_eq!(json["code"], "420000");
        assert_eq!(json["isMunicipality"], false);
        assert!(json.get("originalCode").is_none());
        assert!(json.get("provinceCode").is_none());
    }

    #[test]
    fn test_city_record_carries_both_code_forms() {
        let province = sample_province();
        let record = ErrorRecord::city(&province, &province.cities[0], false, "timed out");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "city");
        assert_eq!(json["code"], "420100");
        assert_eq!(json["originalCode"], "420100000000");
        assert_eq!(json["provinceCode"], "420000");
        assert_eq!(json["provinceName"], "湖北省");
        assert_eq!(json["error"], "timed out");
    }

    #[test]
    fn test_summary_serde_keys() {
        let summary = CrawlSummary {
            total: 31,
            success: 29,
            failed: 2,
            success_rate: "93.55%".to_string(),
            stats: SummaryStats::default(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 31);
        assert_eq!(json["error"], 2);
        assert_eq!(json["successRate"], "93.55%");
        assert!(json.get("stats").is_some());
        assert!(json.get("failed").is_none());
    }

    #[test]
    fn test_summary_round_trip() {
        let summary = CrawlSummary {
            total: 2,
            success: 2,
            failed: 0,
            success_rate: "100.00%".to_string(),
            stats: SummaryStats::default(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: CrawlSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total, 2);
        assert_eq!(back.success_rate, "100.00%");
    }
}
