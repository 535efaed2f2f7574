// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::{Config, Province};
use crate::utils::log;

/// Validate configuration and the hierarchy dataset without fetching.
pub fn run_validate(config: &Config, hierarchy_path: &Path) -> Result<()> {
    log::header("Validating configuration and hierarchy");

    config.validate()?;
    log::success("Configuration OK");
    log::sub_item(&format!("API base URL: {}", config.api.base_url));
    log::sub_item(&format!("Timeout: {}s", config.crawler.timeout_secs));
    log::sub_item(&format!("Retry attempts: {}", config.crawler.retry_attempts));
    log::sub_item(&format!(
        "Request delay: {}ms",
        config.crawler.request_delay_ms
    ));

    let loaded = Province::load_all(hierarchy_path).and_then(|provinces| {
        Province::validate_all(&provinces)?;
        Ok(provinces)
    });

    match loaded {
        Ok(provinces) => {
            let cities: usize = provinces.iter().map(|p| p.cities.len()).sum();
            let municipalities = provinces
                .iter()
                .filter(|p| config.is_municipality(&p.name))
                .count();

            log::success("Hierarchy OK");
            log::sub_item(&format!("Provinces: {}", provinces.len()));
            log::sub_item(&format!("Cities: {}", cities));
            log::sub_item(&format!("Municipalities: {}", municipalities));
            Ok(())
        }
        Err(e) => {
            log::error(&format!("Hierarchy validation failed: {}", e));
            Err(e)
        }
    }
}
