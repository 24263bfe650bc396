//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{PageSelectors, UsState};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing site endpoints
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP and pacing behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Race filtering and ranking policy
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Markup selectors for listing and detail pages
    #[serde(default)]
    pub selectors: PageSelectors,

    /// Output destination
    #[serde(default)]
    pub output: OutputConfig,

    /// Log settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// States to collect, in output order
    #[serde(default = "UsState::all")]
    pub states: Vec<UsState>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `path` if the file exists.
    ///
    /// A missing file is `Ok(None)`; a file that cannot be read or parsed is
    /// an error.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.base_url)?;

        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.selection.max_races == 0 {
            return Err(AppError::validation("selection.max_races must be > 0"));
        }
        if self.selection.course_types.is_empty() {
            return Err(AppError::validation("selection.course_types is empty"));
        }
        if self.states.is_empty() {
            return Err(AppError::validation("No states defined"));
        }

        let mut codes = HashSet::new();
        for state in &self.states {
            let code = state.code.as_str();
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(AppError::validation(format!(
                    "State code '{}' for {} must be two uppercase letters",
                    code, state.name
                )));
            }
            if !codes.insert(code) {
                return Err(AppError::validation(format!(
                    "Duplicate state code '{}'",
                    code
                )));
            }
        }

        for selector in self.selectors.all() {
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }

        Ok(())
    }

    /// States matching any of the given codes or names; all states if none given.
    pub fn select_states(&self, keys: &[String]) -> Result<Vec<UsState>> {
        if keys.is_empty() {
            return Ok(self.states.clone());
        }

        keys.iter()
            .map(|key| {
                self.states
                    .iter()
                    .find(|state| state.matches(key))
                    .cloned()
                    .ok_or_else(|| AppError::config(format!("Unknown state '{}'", key)))
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            crawler: CrawlerConfig::default(),
            selection: SelectionConfig::default(),
            selectors: PageSelectors::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            states: UsState::all(),
        }
    }
}

/// Listing site endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the listing site
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the per-state calendar page
    #[serde(default = "defaults::listing_path")]
    pub listing_path: String,

    /// Sort key requesting descending finisher order
    #[serde(default = "defaults::listing_sort")]
    pub listing_sort: String,

    #[serde(default = "defaults::listing_fragment")]
    pub listing_fragment: String,

    /// Path of the race detail page
    #[serde(default = "defaults::detail_path")]
    pub detail_path: String,

    #[serde(default = "defaults::detail_fragment")]
    pub detail_fragment: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            listing_path: defaults::listing_path(),
            listing_sort: defaults::listing_sort(),
            listing_fragment: defaults::listing_fragment(),
            detail_path: defaults::detail_path(),
            detail_fragment: defaults::detail_fragment(),
        }
    }
}

/// HTTP client and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Settle time after loading a state listing
    #[serde(default = "defaults::listing_settle")]
    pub listing_settle_ms: u64,

    /// Settle time after loading a race detail page
    #[serde(default = "defaults::detail_settle")]
    pub detail_settle_ms: u64,

    /// Delay between races of one state
    #[serde(default = "defaults::race_delay")]
    pub race_delay_ms: u64,

    /// Delay between states
    #[serde(default = "defaults::state_delay")]
    pub state_delay_ms: u64,

    /// Maximum detail requests in flight at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            listing_settle_ms: defaults::listing_settle(),
            detail_settle_ms: defaults::detail_settle(),
            race_delay_ms: defaults::race_delay(),
            state_delay_ms: defaults::state_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Politeness delays derived from [`CrawlerConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    pub listing_settle: Duration,
    pub detail_settle: Duration,
    pub race_delay: Duration,
    pub state_delay: Duration,
}

impl Pacing {
    /// No delays at all, for static documents.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sleep for `delay` unless it is zero.
    pub async fn wait(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl From<&CrawlerConfig> for Pacing {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            listing_settle: Duration::from_millis(config.listing_settle_ms),
            detail_settle: Duration::from_millis(config.detail_settle_ms),
            race_delay: Duration::from_millis(config.race_delay_ms),
            state_delay: Duration::from_millis(config.state_delay_ms),
        }
    }
}

/// Filtering and ranking policy for listing rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Races kept per state, taken from the top of the ranking
    #[serde(default = "defaults::max_races")]
    pub max_races: usize,

    /// Rows with fewer finishers are dropped
    #[serde(default = "defaults::min_finishers")]
    pub min_finishers: u32,

    /// Closed vocabulary of course types
    #[serde(default = "defaults::course_types")]
    pub course_types: Vec<String>,

    /// Course types whose rows are dropped
    #[serde(default = "defaults::excluded_course_types")]
    pub excluded_course_types: Vec<String>,

    /// Rewrites applied to the raw course type before anything else
    #[serde(default = "defaults::course_aliases")]
    pub course_aliases: Vec<Replacement>,

    /// Certification cell text that drops a row
    #[serde(default = "defaults::exclusion_marker")]
    pub exclusion_marker: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_races: defaults::max_races(),
            min_finishers: defaults::min_finishers(),
            course_types: defaults::course_types(),
            excluded_course_types: defaults::excluded_course_types(),
            course_aliases: defaults::course_aliases(),
            exclusion_marker: defaults::exclusion_marker(),
        }
    }
}

/// A text replacement rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(AppError::config(format!("Unknown output format '{other}'"))),
        }
    }
}

/// Output destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
            format: OutputFormat::default(),
        }
    }
}

/// Log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::Replacement;

    // Site defaults
    pub fn base_url() -> String {
        "https://findmymarathon.com".into()
    }
    pub fn listing_path() -> String {
        "/calendar-state.php".into()
    }
    pub fn listing_sort() -> String {
        "finishersd".into()
    }
    pub fn listing_fragment() -> String {
        "calendar".into()
    }
    pub fn detail_path() -> String {
        "/race-detail.php".into()
    }
    pub fn detail_fragment() -> String {
        "Elevation".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn listing_settle() -> u64 {
        2000
    }
    pub fn detail_settle() -> u64 {
        1000
    }
    pub fn race_delay() -> u64 {
        500
    }
    pub fn state_delay() -> u64 {
        1000
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Selection defaults
    pub fn max_races() -> usize {
        5
    }
    pub fn min_finishers() -> u32 {
        100
    }
    pub fn course_types() -> Vec<String> {
        vec![
            "Flat".into(),
            "Mostly Flat".into(),
            "Downhill".into(),
            "Hilly".into(),
            "Rolling Hills".into(),
        ]
    }
    pub fn excluded_course_types() -> Vec<String> {
        vec!["Very Hilly".into()]
    }
    pub fn course_aliases() -> Vec<Replacement> {
        vec![Replacement {
            from: "Very Flat".into(),
            to: "Flat".into(),
        }]
    }
    pub fn exclusion_marker() -> String {
        "not certified".into()
    }

    // Output defaults
    pub fn output_path() -> PathBuf {
        PathBuf::from("collected-us-marathon.csv")
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
