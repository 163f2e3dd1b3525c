//! Crawl configuration.
//!
//! Defaults target the four ICS-area domains; a JSON file can override any
//! field. Configuration errors are the only fatal errors in the crawler,
//! and they surface before any worker starts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fallback politeness delay when the configured one is zero or negative.
const DEFAULT_TIME_DELAY: f64 = 0.5;

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Canonical starting URLs.
    pub seed_urls: Vec<String>,
    /// Registered domains admitted by the URL filter.
    pub allowed_domains: Vec<String>,
    /// Root domain for the per-subdomain report section.
    pub root_domain: String,
    /// Worker thread count.
    pub worker_count: usize,
    /// Minimum seconds between requests to one host.
    pub time_delay: f64,
    /// Durable frontier journal.
    pub save_file: PathBuf,
    /// Final report destination.
    pub report_file: PathBuf,
    /// Optional cache/proxy endpoint requests are routed through.
    pub cache_server: Option<String>,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: vec![
                "https://www.ics.uci.edu".to_string(),
                "https://www.cs.uci.edu".to_string(),
                "https://www.informatics.uci.edu".to_string(),
                "https://www.stat.uci.edu".to_string(),
            ],
            allowed_domains: vec![
                "ics.uci.edu".to_string(),
                "cs.uci.edu".to_string(),
                "informatics.uci.edu".to_string(),
                "stat.uci.edu".to_string(),
            ],
            root_domain: "uci.edu".to_string(),
            worker_count: 4,
            time_delay: DEFAULT_TIME_DELAY,
            save_file: PathBuf::from("frontier_save.jsonl"),
            report_file: PathBuf::from("crawl_report.txt"),
            cache_server: None,
            user_agent: concat!(
                "Mozilla/5.0 (compatible; AnteaterCrawler/0.2; ",
                "+https://github.com/ext-sakamoro/anteater-crawler)"
            )
            .to_string(),
        }
    }
}

impl CrawlConfig {
    /// Load a config from a JSON file; missing fields take the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError {
            message: format!("could not read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError {
            message: format!("could not parse {}: {e}", path.display()),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError {
                message: "worker_count must be at least 1".to_string(),
            });
        }
        if self.seed_urls.is_empty() {
            return Err(ConfigError {
                message: "seed_urls must not be empty".to_string(),
            });
        }
        if self.allowed_domains.is_empty() {
            return Err(ConfigError {
                message: "allowed_domains must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Politeness delay as a duration; non-positive values fall back to
    /// half a second.
    pub fn politeness_delay(&self) -> Duration {
        let seconds = if self.time_delay > 0.0 {
            self.time_delay
        } else {
            DEFAULT_TIME_DELAY
        };
        Duration::from_secs_f64(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.allowed_domains.len(), 4);
        assert_eq!(config.politeness_delay(), Duration::from_millis(500));
    }

    #[test]
    fn zero_delay_falls_back() {
        let config = CrawlConfig {
            time_delay: 0.0,
            ..CrawlConfig::default()
        };
        assert_eq!(config.politeness_delay(), Duration::from_millis(500));
    }

    #[test]
    fn zero_workers_rejected() {
        let config = CrawlConfig {
            worker_count: 0,
            ..CrawlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let parsed: CrawlConfig =
            serde_json::from_str(r#"{"worker_count": 8, "time_delay": 1.5}"#).unwrap();
        assert_eq!(parsed.worker_count, 8);
        assert_eq!(parsed.time_delay, 1.5);
        assert_eq!(parsed.root_domain, "uci.edu");
    }
}
