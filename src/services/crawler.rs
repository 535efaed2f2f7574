// src/services/crawler.rs

//! Boundary crawler service.
//!
//! Walks the province and city hierarchy in dataset order, fetching each
//! node's boundary document and persisting it. The walk is strictly
//! sequential with a fixed pause between cities, keeping request pacing
//! predictable for the remote API.
//!
//! Province-level municipalities get special treatment: the API has no
//! separate city document for them, so their city entries drive
//! province-level requests whose result stands in for both levels. When
//! that request fails, a second try against the city-level code keeps the
//! province directory from coming up empty.

use std::time::Duration;

use crate::models::{City, Config, ErrorRecord, NodeKind, Province};
use crate::services::fetcher::BoundaryFetch;
use crate::services::ledger::CrawlLedger;
use crate::storage::BoundaryStore;
use crate::utils::log;

/// Service walking the division hierarchy and storing boundary documents.
pub struct BoundaryCrawler<'a> {
    config: &'a Config,
    fetcher: &'a dyn BoundaryFetch,
    store: &'a dyn BoundaryStore,
}

impl<'a> BoundaryCrawler<'a> {
    /// Create a new crawler over the given fetch and storage backends.
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn BoundaryFetch,
        store: &'a dyn BoundaryStore,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// Crawl every province and its cities, returning the filled ledger.
    ///
    /// Individual node failures are recorded and the walk continues; the
    /// only way to abort a run is to fail before it starts.
    pub async fn crawl(&self, provinces: &[Province]) -> CrawlLedger {
        let mut ledger = CrawlLedger::default();

        for (index, province) in provinces.iter().enumerate() {
            self.crawl_province(province, &mut ledger).await;
            self.report_progress(index + 1, provinces.len(), &ledger);
        }

        ledger
    }

    fn report_progress(&self, done: usize, total: usize, ledger: &CrawlLedger) {
        log::progress(&progress_line(done, total, ledger));
    }

    async fn crawl_province(&self, province: &Province, ledger: &mut CrawlLedger) {
        let is_municipality = self.config.is_municipality(&province.name);

        if is_municipality {
            log::info(&format!(
                "{} is a municipality; its boundary is fetched with its city entry",
                province.name
            ));
        } else {
            let url = self.config.api.boundary_url(&province.code);
            let description = format!("province {}", province.name);

            match self
                .store_province_doc(&url, &description, &province.code)
                .await
            {
                Ok(()) => ledger.record_success(NodeKind::Province),
                Err(error) => {
                    ledger.record_failure(ErrorRecord::province(province, false, error));
                }
            }
        }

        self.crawl_cities(province, is_municipality, ledger).await;
    }

    async fn crawl_cities(
        &self,
        province: &Province,
        is_municipality: bool,
        ledger: &mut CrawlLedger,
    ) {
        for (index, city) in province.cities.iter().enumerate() {
            if is_municipality {
                self.crawl_municipality_city(province, city, index, ledger)
                    .await;
            } else {
                self.crawl_ordinary_city(province, city, ledger).await;
            }

            if index + 1 < province.cities.len() {
                self.pace().await;
            }
        }
    }

    async fn crawl_ordinary_city(
        &self,
        province: &Province,
        city: &City,
        ledger: &mut CrawlLedger,
    ) {
        let url = self.config.api.boundary_url(city.api_code());
        let description = format!("city {}", city.name);

        match self
            .store_city_doc(&url, &description, province, city)
            .await
        {
            Ok(()) => ledger.record_success(NodeKind::City),
            Err(error) => {
                ledger.record_failure(ErrorRecord::city(province, city, false, error));
            }
        }
    }

    /// Crawl one city entry of a municipality.
    ///
    /// The province-level code is tried first and the document always lands
    /// under the province key. The first city entry also decides the
    /// province tally, since no separate province request is ever made.
    async fn crawl_municipality_city(
        &self,
        province: &Province,
        city: &City,
        index: usize,
        ledger: &mut CrawlLedger,
    ) {
        let primary_url = self.config.api.boundary_url(&province.code);
        let description = format!("municipality {}", province.name);

        match self
            .store_province_doc(&primary_url, &description, &province.code)
            .await
        {
            Ok(()) => {
                if index == 0 {
                    ledger.record_mirrored_success();
                }
                ledger.record_success(NodeKind::City);
            }
            Err(primary_error) => {
                log::warn(&format!(
                    "Province-level fetch failed for {} ({}); trying city-level code {}",
                    province.name,
                    primary_error,
                    city.api_code()
                ));
                if index == 0 {
                    ledger.record_mirrored_failure(ErrorRecord::province(
                        province,
                        true,
                        primary_error,
                    ));
                }

                let fallback_url = self.config.api.boundary_url(city.api_code());
                let fallback_description =
                    format!("municipality {} (city-level fallback)", province.name);

                match self
                    .store_province_doc(&fallback_url, &fallback_description, &province.code)
                    .await
                {
                    Ok(()) => ledger.record_success(NodeKind::City),
                    Err(fallback_error) => {
                        ledger.record_failure(ErrorRecord::city(
                            province,
                            city,
                            true,
                            fallback_error,
                        ));
                    }
                }
            }
        }
    }

    /// Fetch a document and store it under a province key.
    ///
    /// Fetch and storage failures fold into one message: either way the
    /// node ends the run without a document on disk.
    async fn store_province_doc(
        &self,
        url: &str,
        description: &str,
        province_code: &str,
    ) -> Result<(), String> {
        let document = self
            .fetcher
            .fetch_json(url, description)
            .await
            .map_err(|e| e.to_string())?;
        self.store
            .put_province(province_code, &document)
            .await
            .map_err(|e| e.to_string())
    }

    /// Fetch a document and store it under a city key.
    async fn store_city_doc(
        &self,
        url: &str,
        description: &str,
        province: &Province,
        city: &City,
    ) -> Result<(), String> {
        let document = self
            .fetcher
            .fetch_json(url, description)
            .await
            .map_err(|e| e.to_string())?;
        self.store
            .put_city(&province.code, city.api_code(), &document)
            .await
            .map_err(|e| e.to_string())
    }

    async fn pace(&self) {
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Render one per-province progress line from the running tallies.
fn progress_line(done: usize, total: usize, ledger: &CrawlLedger) -> String {
    let mut line = format!(
        "[{}/{} {}%] {} provinces ok, {} cities ok, {} failed",
        done,
        total,
        done * 100 / total,
        ledger.provinces().success,
        ledger.cities().success,
        ledger.errors().len()
    );
    if let Some(last) = ledger.errors().last() {
        line.push_str(&format!(
            " (last error: {} {}: {})",
            last.kind.label(),
            last.name,
            last.error
        ));
    }
    line
}
