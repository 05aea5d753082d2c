//! The versioned output document
//!
//! Every section is always present so consumers can rely on a stable shape.
//! Sections whose source failed are emptied or filled with placeholders
//! rather than dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    Alert, AsosObservation, BuoyObservation, CurrentConditions, DailyBlock, ForecastPeriod,
    HourlyBlock, Location, PwsReading, TideCurve, TideEvent,
};
use crate::derived::{DerivedMetrics, WindRisk};
use crate::frost::FrostSeasonLog;
use crate::status::SourceStatus;
use crate::units::round_to;

/// Bumped on breaking shape changes; additive keys keep the version
pub const SCHEMA_VERSION: &str = "1.1";

/// Difference between the personal station and the model at the site
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Hyperlocal {
    /// PWS minus model temperature, °F
    pub bias_temp: f64,
    pub corrected_temp: f64,
}

impl Hyperlocal {
    /// Bias of the station against the model, when both are known
    #[must_use]
    pub fn from_temperatures(pws_temp: Option<f64>, model_temp: Option<f64>) -> Option<Self> {
        let (pws, model) = (pws_temp?, model_temp?);
        let bias = round_to(pws - model, 2);
        Some(Self {
            bias_temp: bias,
            corrected_temp: round_to(model + bias, 2),
        })
    }
}

/// Root output record
#[derive(Debug, Serialize, Clone)]
pub struct WeatherDocument {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub location: Location,
    pub sources: BTreeMap<String, SourceStatus>,
    pub alerts: Vec<Alert>,
    pub current: CurrentConditions,
    pub hourly: HourlyBlock,
    pub daily: DailyBlock,
    pub tides: Vec<TideEvent>,
    pub tide_curve: TideCurve,
    /// ASOS stations keyed by lowercase station id
    #[serde(flatten)]
    pub stations: BTreeMap<String, AsosObservation>,
    /// Buoy keyed as `buoy_<id>`
    #[serde(flatten)]
    pub buoys: BTreeMap<String, BuoyObservation>,
    pub frost_log: FrostSeasonLog,
    pub nws_forecast: Vec<ForecastPeriod>,
    pub pws: PwsReading,
    pub derived: DerivedMetrics,
    pub wind_risk: Option<WindRisk>,
    pub hyperlocal: Option<Hyperlocal>,
}

/// Fixed top-level keys; flattened station and buoy keys must not reuse them
pub const DOCUMENT_FIELDS: &[&str] = &[
    "schema_version",
    "generated_at",
    "location",
    "sources",
    "alerts",
    "current",
    "hourly",
    "daily",
    "tides",
    "tide_curve",
    "frost_log",
    "nws_forecast",
    "pws",
    "derived",
    "wind_risk",
    "hyperlocal",
];

/// Whether `key` would shadow a fixed section of the document
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    DOCUMENT_FIELDS.contains(&key)
}

/// Document key for an ASOS station
#[must_use]
pub fn station_key(station: &str) -> String {
    station.to_ascii_lowercase()
}

/// Document key for a buoy
#[must_use]
pub fn buoy_key(buoy_id: &str) -> String {
    format!("buoy_{buoy_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperlocal_bias() {
        let h = Hyperlocal::from_temperatures(Some(41.2), Some(39.876)).unwrap();
        assert_eq!(h.bias_temp, 1.32);
        assert_eq!(h.corrected_temp, 41.2);
    }

    #[test]
    fn test_hyperlocal_needs_both() {
        assert!(Hyperlocal::from_temperatures(None, Some(40.0)).is_none());
        assert!(Hyperlocal::from_temperatures(Some(40.0), None).is_none());
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key("pws"));
        assert!(is_reserved_key(&station_key("CURRENT")));
        assert!(!is_reserved_key(&station_key("KBOS")));
        assert!(!is_reserved_key(&buoy_key("44013")));
    }

    #[test]
    fn test_keys() {
        assert_eq!(station_key("KBOS"), "kbos");
        assert_eq!(buoy_key("44013"), "buoy_44013");
    }
}
