// src/services/fetcher.rs

//! Resilient JSON fetching.
//!
//! Every boundary document goes through [`BoundaryFetch::fetch_json`], which
//! wraps a single-attempt fetch in a bounded retry loop with linear backoff.
//! Redirects are resolved manually so a misbehaving chain can be cut off
//! instead of looping, and so a redirect hop never consumes retry budget.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use url::Url;

use crate::error::AppError;
use crate::models::Config;
use crate::utils::http;
use crate::utils::log;

/// Why a fetch attempt (or the whole fetch) failed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status { status: StatusCode, url: String },

    /// Body arrived but was not valid JSON
    #[error("malformed JSON body from {url}: {source}")]
    MalformedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Redirect chain exceeded the configured cap
    #[error("redirect limit of {limit} exceeded fetching {url}")]
    RedirectLimit { limit: u32, url: String },

    /// Redirect response carried no usable Location header
    #[error("redirect from {url} did not include a Location header")]
    MissingLocation { url: String },

    /// Location header could not be resolved into a URL
    #[error("unusable redirect target from {url}: {source}")]
    BadRedirect {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, TLS, or timeout failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// An exceeded redirect cap is structural and repeats identically, so
    /// retrying it only burns time. Everything else is worth another try.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::RedirectLimit { .. })
    }
}

/// A source of JSON documents addressed by URL.
///
/// Implementations own their retry policy; callers see only the final
/// outcome per node.
#[async_trait]
pub trait BoundaryFetch: Send + Sync {
    /// Fetch and parse a JSON document.
    ///
    /// `description` names the node for log output.
    async fn fetch_json(&self, url: &str, description: &str) -> Result<Value, FetchError>;
}

/// HTTP fetcher for the boundary API.
pub struct GeoFetcher {
    client: reqwest::Client,
    retry_attempts: u32,
    backoff_base: Duration,
    max_redirects: u32,
}

impl GeoFetcher {
    /// Build a fetcher from application configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: http::create_async_client(config)?,
            retry_attempts: config.crawler.retry_attempts,
            backoff_base: Duration::from_millis(config.crawler.retry_backoff_ms),
            max_redirects: config.crawler.max_redirects,
        })
    }

    /// Perform one attempt, resolving redirects up to the configured cap.
    async fn fetch_once(&self, url: &str) -> Result<Value, FetchError> {
        let mut current = url.to_string();

        for _ in 0..=self.max_redirects {
            let response = self.client.get(&current).send().await?;
            let status = response.status();

            if matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND) {
                let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                else {
                    return Err(FetchError::MissingLocation { url: current });
                };
                let location = location.to_string();

                let base = Url::parse(&current).map_err(|source| FetchError::BadRedirect {
                    url: current.clone(),
                    source,
                })?;
                let next = base
                    .join(&location)
                    .map_err(|source| FetchError::BadRedirect {
                        url: current.clone(),
                        source,
                    })?;

                log::debug(&format!("Redirect {} -> {}", current, next));
                current = next.into();
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    status,
                    url: current,
                });
            }

            let text = response.text().await?;
            return serde_json::from_str(&text).map_err(|source| FetchError::MalformedBody {
                url: current,
                source,
            });
        }

        Err(FetchError::RedirectLimit {
            limit: self.max_redirects,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl BoundaryFetch for GeoFetcher {
    async fn fetch_json(&self, url: &str, description: &str) -> Result<Value, FetchError> {
        let attempts = self.retry_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    log::warn(&format!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt, attempts, description, err
                    ));
                    if !err.is_retryable() || attempt >= attempts {
                        return Err(err);
                    }
                    // Linear backoff: 1x the base after the first failure,
                    // 2x after the second, and so on.
                    sleep(self.backoff_base * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}
