// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use reqwest::redirect;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Create a configured asynchronous HTTP client.
///
/// Automatic redirect following is disabled: the fetcher resolves
/// redirects itself so it can cap how many it will chase.
pub fn create_async_client(config: &Config) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        REFERER,
        HeaderValue::from_str(&config.api.referer)
            .map_err(|e| AppError::config(format!("invalid api.referer: {}", e)))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

    let client = reqwest::Client::builder()
        .user_agent(&config.crawler.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.crawler.timeout_secs))
        .redirect(redirect::Policy::none())
        .build()?;
    Ok(client)
}
