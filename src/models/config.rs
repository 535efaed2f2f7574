//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Remote boundary API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Province names treated as province-level municipalities
    #[serde(default = "defaults::municipalities")]
    pub municipalities: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if
    /// the file doesn't exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.is_empty() {
            return Err(AppError::config("crawler.user_agent must not be empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be positive"));
        }
        if self.crawler.retry_attempts == 0 {
            return Err(AppError::config("crawler.retry_attempts must be positive"));
        }
        if self.api.base_url.is_empty() {
            return Err(AppError::config("api.base_url must not be empty"));
        }
        Ok(())
    }

    /// Whether a province name denotes a province-level municipality.
    pub fn is_municipality(&self, province_name: &str) -> bool {
        self.municipalities.iter().any(|m| m == province_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            api: ApiConfig::default(),
            paths: PathsConfig::default(),
            municipalities: defaults::municipalities(),
        }
    }
}

/// HTTP and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User agent string for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between consecutive requests in milliseconds
    #[serde(default = "defaults::request_delay_ms")]
    pub request_delay_ms: u64,

    /// Maximum fetch attempts per URL
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff in milliseconds, scaled linearly by attempt number
    #[serde(default = "defaults::retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum redirects followed within a single attempt
    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout_secs(),
            request_delay_ms: defaults::request_delay_ms(),
            retry_attempts: defaults::retry_attempts(),
            retry_backoff_ms: defaults::retry_backoff_ms(),
            max_redirects: defaults::max_redirects(),
        }
    }
}

/// Remote boundary API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for boundary documents
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Referer header sent with every request
    #[serde(default = "defaults::referer")]
    pub referer: String,
}

impl ApiConfig {
    /// Build the boundary document URL for an administrative division code.
    pub fn boundary_url(&self, code: &str) -> String {
        format!("{}/{}_full.json", self.base_url.trim_end_matches('/'), code)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            referer: defaults::referer(),
        }
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Province and city hierarchy dataset
    #[serde(default = "defaults::hierarchy_file")]
    pub hierarchy_file: String,

    /// Root directory for fetched boundary documents
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            hierarchy_file: defaults::hierarchy_file(),
            output_dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
    }

    pub fn timeout_secs() -> u64 {
        30
    }

    pub fn request_delay_ms() -> u64 {
        1000
    }

    pub fn retry_attempts() -> u32 {
        3
    }

    pub fn retry_backoff_ms() -> u64 {
        2000
    }

    pub fn max_redirects() -> u32 {
        5
    }

    pub fn base_url() -> String {
        "https://geo.datav.aliyun.com/areas_v3/bound".to_string()
    }

    pub fn referer() -> String {
        "https://geo.datav.aliyun.com/".to_string()
    }

    pub fn hierarchy_file() -> String {
        "ChinaCitys.json".to_string()
    }

    pub fn output_dir() -> String {
        "data".to_string()
    }

    pub fn municipalities() -> Vec<String> {
        ["北京市", "天津市", "上海市", "重庆市"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}
