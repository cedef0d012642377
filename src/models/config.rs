//! Configuration for the scrape and retry drivers.
//!
//! All knobs live in one immutable struct handed to the drivers at
//! construction. The TOML file is optional; the compiled-in defaults match
//! the original deployment against the Klemy staging endpoint.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for entn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translation service endpoint
    pub service: ServiceConfig,

    /// Request pacing and retry policy
    pub pacing: PacingConfig,

    /// Input, output, and state file locations
    pub files: FilesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            pacing: PacingConfig::default(),
            files: FilesConfig::default(),
        }
    }
}

/// Translation service endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// URL the translation requests are posted to
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: "https://klemy.qodek.net/staging".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Request pacing and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Minimum seconds between outbound requests
    pub request_delay_secs: f64,

    /// Total attempts per sentence, first try included
    pub max_retries: u32,

    /// Seconds to sleep between attempts after a transient error
    pub retry_delay_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: 5.0,
            max_retries: 3,
            retry_delay_secs: 5.0,
        }
    }
}

/// Input, output, and state file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Input sentence table (TSV: id, text; extra columns ignored)
    pub input: PathBuf,

    /// Language filter for three-column Tatoeba exports (id, lang, text).
    /// When set, only rows whose second column matches are used.
    pub lang_filter: Option<String>,

    /// Primary output: successfully translated pairs
    pub pairs: PathBuf,

    /// Failure output: sentences without a usable translation
    pub failed: PathBuf,

    /// Checkpoint file holding the last fully processed id
    pub checkpoint: PathBuf,

    /// Audit log written by the retry-failed driver
    pub retry_log: PathBuf,

    /// Human-diagnostic append log
    pub debug_log: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("eng_sentences.tsv"),
            lang_filter: None,
            pairs: PathBuf::from("en_tn_couples.csv"),
            failed: PathBuf::from("failed_translations.csv"),
            checkpoint: PathBuf::from(".scraper_checkpoint.txt"),
            retry_log: PathBuf::from("retry_results.csv"),
            debug_log: PathBuf::from("scraper_debug.log"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Load the file if it exists, otherwise fall back to the defaults so
    /// both drivers run with no required arguments.
    pub fn load_or_default(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject configurations the drivers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.url.is_empty() {
            return Err(ConfigError::Invalid("service.url must not be empty".into()));
        }
        if self.pacing.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "pacing.max_retries must be at least 1".into(),
            ));
        }
        if self.pacing.request_delay_secs < 0.0 || self.pacing.retry_delay_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "pacing delays must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Minimum spacing between outbound requests.
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.pacing.request_delay_secs)
    }

    /// Sleep between attempts after a transient error.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.pacing.retry_delay_secs)
    }

    /// HTTP request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
