//! `wxcollector` - run-once weather data fusion for a single coastal site
//!
//! This library fetches forecast models, tide predictions, station and buoy
//! observations and NWS text products, falls back to last-known-good values
//! when a source fails, and assembles one versioned document with derived
//! indicators (pressure alarm, fog, precipitation type, sea breeze, wind risk).

pub mod assemble;
pub mod cache;
pub mod collector;
pub mod config;
pub mod derived;
pub mod error;
pub mod fallback;
pub mod frost;
pub mod history;
pub mod logging;
pub mod models;
pub mod sources;
pub mod status;
pub mod units;

// Re-export core types for public API
pub use cache::{JsonFileStore, MemoryStore, StateStore, StateStoreExt};
pub use collector::{Collector, write_document};
pub use config::CollectorConfig;
pub use derived::{DerivedMetrics, MetricsConfig, WindRisk};
pub use error::{CollectorError, SourceError};
pub use frost::FrostSeasonLog;
pub use models::WeatherDocument;
pub use sources::{HttpSources, WeatherSources};
pub use status::{SourceStatus, SourceStatusTracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
