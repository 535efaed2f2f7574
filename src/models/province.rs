//! Province and city hierarchy data structures.
//!
//! The input dataset (`ChinaCitys.json`) is an ordered array of provinces,
//! each carrying its ordered city list. Codes come in two widths: provinces
//! use the 6-digit form the remote API expects, cities use the 12-digit
//! padded form and must be shortened before building a request URL.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A province-level administrative division with its city subdivisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    /// 6-digit administrative division code
    pub code: String,

    /// Display name (e.g., "湖北省", "北京市")
    #[serde(rename = "province")]
    pub name: String,

    /// City-level subdivisions, in dataset order
    #[serde(rename = "citys", default)]
    pub cities: Vec<City>,
}

/// A city-level administrative division.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    /// 12-digit administrative division code as supplied by the dataset
    pub code: String,

    /// Display name (e.g., "武汉市")
    #[serde(rename = "city")]
    pub name: String,
}

impl Province {
    /// Load the province hierarchy from a JSON file.
    ///
    /// This is the run's only fatal failure point: a missing or unparseable
    /// dataset aborts before any fetching starts.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate that a loaded hierarchy is usable.
    ///
    /// Checks the dataset is non-empty and that every code matches the
    /// width the dataset promises (6 digits for provinces, 12 for cities).
    pub fn validate_all(provinces: &[Self]) -> Result<()> {
        if provinces.is_empty() {
            return Err(AppError::validation("No provinces defined in hierarchy"));
        }
        for province in provinces {
            if !province_code_pattern().is_match(&province.code) {
                return Err(AppError::validation(format!(
                    "Province {} has malformed code {:?} (expected 6 digits)",
                    province.name, province.code
                )));
            }
            for city in &province.cities {
                if !city_code_pattern().is_match(&city.code) {
                    return Err(AppError::validation(format!(
                        "City {} in {} has malformed code {:?} (expected 12 digits)",
                        city.name, province.name, city.code
                    )));
                }
            }
        }
        Ok(())
    }
}

impl City {
    /// The code form the remote API expects.
    ///
    /// Dataset city codes are zero-padded to 12 digits; the API uses the
    /// 6-digit prefix. Dropping one trailing `000000` suffix converts
    /// between the two and is a no-op on codes already shortened.
    pub fn api_code(&self) -> &str {
        self.code.strip_suffix("000000").unwrap_or(&self.code)
    }
}

fn province_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{6}$").expect("static pattern"))
}

fn city_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{12}$").expect("static pattern"))
}
