//! Configuration management for the weather collector
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates every setting before a run starts. Every field
//! has a default, so a missing file yields a working configuration.

use crate::CollectorError;
use crate::derived::MetricsConfig;
use crate::models::{buoy_key, is_reserved_key, station_key};
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "WXCOLLECTOR_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "wxcollector.toml";

/// Root configuration structure for the collector
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectorConfig {
    /// The monitored site
    #[serde(default)]
    pub site: SiteConfig,
    /// Upstream station identifiers
    #[serde(default)]
    pub stations: StationsConfig,
    /// HTTP client and endpoint settings
    #[serde(default)]
    pub http: HttpConfig,
    /// State and output locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Derived-metric thresholds and the wind exposure table
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Site location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Display name
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// IANA timezone used for local hours and dates
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Upstream station identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// Personal weather station id
    #[serde(default = "default_pws_id")]
    pub pws_id: String,
    #[serde(default = "default_pws_name")]
    pub pws_name: String,
    /// Page scraped for the PWS temperature
    #[serde(default = "default_pws_url")]
    pub pws_url: String,
    /// ASOS stations in pressure-alarm priority order
    #[serde(default = "default_asos")]
    pub asos: Vec<String>,
    /// NDBC buoy id
    #[serde(default = "default_buoy_id")]
    pub buoy_id: String,
    /// NOAA tide prediction station
    #[serde(default = "default_tide_station")]
    pub tide_station: String,
    /// Link attached to every alert
    #[serde(default = "default_alert_link")]
    pub alert_link: String,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// User agent sent to public APIs
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Browser-like user agent for the PWS page
    #[serde(default = "default_scrape_user_agent")]
    pub scrape_user_agent: String,
    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,
    #[serde(default = "default_tides_url")]
    pub tides_url: String,
    #[serde(default = "default_nws_url")]
    pub nws_url: String,
    #[serde(default = "default_ndbc_url")]
    pub ndbc_url: String,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the cache files and the frost log
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Where the output document is written
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_site_name() -> String {
    "Wyman Cove, Marblehead MA".to_string()
}

fn default_latitude() -> f64 {
    42.5014
}

fn default_longitude() -> f64 {
    -70.8750
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_pws_id() -> String {
    "KMAMARBL63".to_string()
}

fn default_pws_name() -> String {
    "Castle Hill".to_string()
}

fn default_pws_url() -> String {
    "https://www.wunderground.com/weather/us/ma/marblehead/KMAMARBL63".to_string()
}

fn default_asos() -> Vec<String> {
    vec!["KBOS".to_string(), "KBVY".to_string()]
}

fn default_buoy_id() -> String {
    "44013".to_string()
}

fn default_tide_station() -> String {
    "8442645".to_string()
}

fn default_alert_link() -> String {
    "https://www.weather.gov/box".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_user_agent() -> String {
    format!("wxcollector/{}", env!("CARGO_PKG_VERSION"))
}

fn default_scrape_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
}

fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_tides_url() -> String {
    "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string()
}

fn default_nws_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_ndbc_url() -> String {
    "https://www.ndbc.noaa.gov/data/realtime2".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("weather_data.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            pws_id: default_pws_id(),
            pws_name: default_pws_name(),
            pws_url: default_pws_url(),
            asos: default_asos(),
            buoy_id: default_buoy_id(),
            tide_station: default_tide_station(),
            alert_link: default_alert_link(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
            scrape_user_agent: default_scrape_user_agent(),
            open_meteo_url: default_open_meteo_url(),
            tides_url: default_tides_url(),
            nws_url: default_nws_url(),
            ndbc_url: default_ndbc_url(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            output: default_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SiteConfig {
    /// Parsed site timezone
    pub fn tz(&self) -> Result<Tz, CollectorError> {
        self.timezone.parse::<Tz>().map_err(|_| {
            CollectorError::config(format!("Unknown timezone '{}'", self.timezone))
        })
    }
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl CollectorConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WXCOLLECTOR__HTTP__TIMEOUT_SECONDS
        builder = builder.add_source(
            Environment::with_prefix("WXCOLLECTOR")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("stations.asos")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CollectorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.site.timezone.is_empty() {
            self.site.timezone = default_timezone();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.paths.output.as_os_str().is_empty() {
            self.paths.output = default_output();
        }
        if self.paths.state_dir.as_os_str().is_empty() {
            self.paths.state_dir = default_state_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_site()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_metrics()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.site.latitude) {
            return Err(CollectorError::config("Site latitude must be within -90..90").into());
        }
        if !(-180.0..=180.0).contains(&self.site.longitude) {
            return Err(CollectorError::config("Site longitude must be within -180..180").into());
        }
        self.site.tz()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(CollectorError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        if self.http.max_retries > 10 {
            return Err(CollectorError::config("HTTP max retries cannot exceed 10").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CollectorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CollectorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let stations = &self.stations;
        let ids = [
            ("pws_id", stations.pws_id.as_str()),
            ("buoy_id", stations.buoy_id.as_str()),
            ("tide_station", stations.tide_station.as_str()),
        ];
        if let Some((field, _)) = ids.iter().find(|(_, id)| id.trim().is_empty()) {
            return Err(
                CollectorError::config(format!("Station setting '{field}' cannot be empty")).into(),
            );
        }
        if stations.asos.iter().any(|id| id.trim().is_empty()) {
            return Err(CollectorError::config("ASOS station ids cannot be empty").into());
        }

        let mut document_keys: Vec<String> =
            stations.asos.iter().map(|id| station_key(id)).collect();
        document_keys.push(buoy_key(&stations.buoy_id));
        if let Some(key) = document_keys.iter().find(|key| is_reserved_key(key)) {
            return Err(CollectorError::config(format!(
                "Station key '{key}' collides with a document section"
            ))
            .into());
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(key) = document_keys.iter().find(|key| !seen.insert(key.as_str())) {
            return Err(
                CollectorError::config(format!("Station key '{key}' is configured twice")).into(),
            );
        }

        let urls = [
            &self.http.open_meteo_url,
            &self.http.tides_url,
            &self.http.nws_url,
            &self.http.ndbc_url,
            &stations.pws_url,
        ];
        if let Some(bad) = urls
            .iter()
            .find(|url| !url.starts_with("http://") && !url.starts_with("https://"))
        {
            return Err(CollectorError::config(format!(
                "Endpoint '{bad}' must be a valid HTTP or HTTPS URL"
            ))
            .into());
        }

        Ok(())
    }

    fn validate_metrics(&self) -> Result<()> {
        self.metrics
            .wind
            .exposure
            .validate()
            .map_err(|e| CollectorError::config(format!("Invalid wind exposure table: {e}")))?;

        let frost = &self.metrics.frost;
        if !(frost.severe <= frost.hard_freeze && frost.hard_freeze <= frost.freeze) {
            return Err(CollectorError::config(
                "Frost thresholds must satisfy severe <= hard_freeze <= freeze",
            )
            .into());
        }

        if self.metrics.fog.window_hours == 0 || self.metrics.wind.window_hours == 0 {
            return Err(CollectorError::config("Scan windows must cover at least one hour").into());
        }

        Ok(())
    }
}
