//! TOML configuration parsing and validation.
//!
//! Every section is optional; a minimal config only needs to point
//! `corpus.dir` at the directory holding the school-information JSON
//! files. See `config/schoolmeal.example.toml` for all options.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use school_meal_core::{Clock, ServiceOptions};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub neis: NeisConfig,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub date: DateConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: default_corpus_dir(),
            include_globs: default_include_globs(),
            recursive: false,
        }
    }
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_include_globs() -> Vec<String> {
    vec!["*.json".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct NeisConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Open API key. `NEIS_API_KEY` in the environment takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for NeisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_endpoint() -> String {
    "https://open.neis.go.kr/hub/mealServiceDietInfo".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_page_size() -> u32 {
    100
}
fn default_max_concurrent_requests() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolveConfig {
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

fn default_suggestion_limit() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DateConfig {
    /// Whole-hour UTC offset used for "today". Unset means host local time.
    #[serde(default)]
    pub utc_offset_hours: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NeisConfig {
    /// The API key to send, preferring the environment over the file.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("NEIS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

impl Config {
    /// The clock used for relative dates.
    pub fn clock(&self) -> Clock {
        self.date
            .utc_offset_hours
            .and_then(Clock::utc_offset_hours)
            .unwrap_or(Clock::Local)
    }

    /// Resolver/aggregator options derived from this config.
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            suggestion_limit: self.resolve.suggestion_limit,
            max_concurrent_fetches: self.neis.max_concurrent_requests,
            clock: self.clock(),
        }
    }
}

/// Parse and validate a config file.
///
/// A missing file is not handled here; `main` falls back to
/// [`Config::default`] so the warning can be logged after the subscriber
/// is installed.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.corpus.include_globs.is_empty() {
        bail!("corpus.include_globs must not be empty");
    }

    if config.neis.endpoint.trim().is_empty() {
        bail!("neis.endpoint must not be empty");
    }
    if config.neis.timeout_secs == 0 {
        bail!("neis.timeout_secs must be > 0");
    }
    if !(1..=1000).contains(&config.neis.page_size) {
        bail!("neis.page_size must be in [1, 1000]");
    }
    if config.neis.max_concurrent_requests == 0 {
        bail!("neis.max_concurrent_requests must be >= 1");
    }

    if config.resolve.suggestion_limit == 0 {
        bail!("resolve.suggestion_limit must be >= 1");
    }

    if let Some(hours) = config.date.utc_offset_hours {
        if !(-23..=23).contains(&hours) {
            bail!("date.utc_offset_hours must be in [-23, 23]");
        }
    }

    match config.logging.level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => bail!(
            "Unknown logging.level: '{}'. Must be trace, debug, info, warn, or error.",
            other
        ),
    }

    Ok(())
}
