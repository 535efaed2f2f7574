// src/pipeline/crawl.rs

//! Boundary crawling pipeline.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, CrawlSummary, NodeKind, Province};
use crate::services::{BoundaryCrawler, BoundaryFetch, CrawlLedger, GeoFetcher};
use crate::storage::{self, BoundaryStore, LocalStore};
use crate::utils::log;

/// Load the hierarchy and crawl every boundary into local storage.
///
/// The dataset load is the run's only fatal failure point; it aborts
/// before any request is issued or artifact written.
pub async fn run(
    config: &Config,
    hierarchy_path: &Path,
    output_dir: &Path,
) -> Result<CrawlSummary> {
    if !hierarchy_path.exists() {
        return Err(AppError::config(format!(
            "Hierarchy dataset not found at {}",
            hierarchy_path.display()
        )));
    }

    let provinces = match Province::load_all(hierarchy_path) {
        Ok(provinces) => provinces,
        Err(e) => {
            log::error(&format!("Failed to load hierarchy dataset: {}", e));
            return Err(e);
        }
    };

    let fetcher = GeoFetcher::new(config)?;
    let store = LocalStore::new(output_dir);
    run_crawler(config, &fetcher, &store, &provinces).await
}

/// Run the boundary crawler over a loaded hierarchy.
///
/// The summary artifact is written no matter how the crawl went; the
/// error log only appears when at least one node failed.
pub async fn run_crawler(
    config: &Config,
    fetcher: &dyn BoundaryFetch,
    store: &dyn BoundaryStore,
    provinces: &[Province],
) -> Result<CrawlSummary> {
    log::header("China administrative boundary crawl");

    let total_cities: usize = provinces.iter().map(|p| p.cities.len()).sum();
    log::info(&format!(
        "Loaded {} provinces with {} cities",
        provinces.len(),
        total_cities
    ));
    log::info(&format!(
        "Fetching boundaries from {} with a {}ms pause between requests",
        config.api.base_url, config.crawler.request_delay_ms
    ));

    let crawler = BoundaryCrawler::new(config, fetcher, store);
    let ledger = crawler.crawl(provinces).await;

    let summary = ledger.summarize();
    store.write_summary(&summary).await?;

    if ledger.has_errors() {
        store.write_error_log(ledger.errors()).await?;
    }

    show_final_statistics(&ledger, &summary, config);

    Ok(summary)
}

/// Print the closing statistics block.
fn show_final_statistics(ledger: &CrawlLedger, summary: &CrawlSummary, config: &Config) {
    let provinces = summary.stats.provinces;
    let cities = summary.stats.cities;

    log::summary(
        "Crawl results",
        &[
            ("Provinces", format!("{}/{} ok", provinces.success, provinces.total)),
            ("Cities", format!("{}/{} ok", cities.success, cities.total)),
            (
                "Attempted",
                format!(
                    "{} total, {} ok, {} failed",
                    summary.total, summary.success, summary.failed
                ),
            ),
            ("Success rate", summary.success_rate.clone()),
        ],
    );

    log::info(&format!(
        "Province documents: {}/{{provinceCode}}/{}",
        config.paths.output_dir,
        storage::GEO_DOCUMENT
    ));
    log::info(&format!(
        "City documents: {}/{{provinceCode}}/{{cityCode}}/{}",
        config.paths.output_dir,
        storage::GEO_DOCUMENT
    ));
    log::info("City directories use 6-digit codes (one trailing 000000 stripped from dataset codes)");

    if !ledger.has_errors() {
        log::success("All boundaries fetched");
        return;
    }

    log::separator();
    log::warn(&format!(
        "{} failures recorded in {}/{}",
        ledger.errors().len(),
        config.paths.output_dir,
        storage::ERROR_LOG_FILE
    ));

    for kind in [NodeKind::Province, NodeKind::City] {
        let failures: Vec<_> = ledger
            .errors()
            .iter()
            .filter(|record| record.kind == kind)
            .collect();
        if failures.is_empty() {
            continue;
        }

        log::info(&format!("Failed {} nodes:", kind.label()));
        for record in failures.iter().take(3) {
            log::sub_item(&format!("{} ({}): {}", record.name, record.code, record.error));
        }
        if failures.len() > 3 {
            log::sub_item(&format!("+{} more", failures.len() - 3));
        }
    }
}
