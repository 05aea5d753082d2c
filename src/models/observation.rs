//! Cached station observations: personal weather station, airport (ASOS)
//! stations and the offshore buoy.
//!
//! Each record carries a `stale` flag. It is `false` for a reading fetched
//! during this run and `true` for a last-known-good copy or a placeholder.

use serde::{Deserialize, Serialize};

use crate::fallback::LastKnownGood;
use crate::history::PressureTendency;

/// Personal weather station reading
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PwsReading {
    pub station: String,
    pub name: String,
    /// Time of the scrape, RFC 3339
    pub updated: Option<String>,
    /// Air temperature in °F
    pub temperature: Option<f64>,
    #[serde(default)]
    pub stale: bool,
}

impl PwsReading {
    /// Well-formed reading with no values, used when nothing is cached
    #[must_use]
    pub fn placeholder(station: &str, name: &str) -> Self {
        Self {
            station: station.to_string(),
            name: name.to_string(),
            updated: None,
            temperature: None,
            stale: true,
        }
    }
}

impl LastKnownGood for PwsReading {
    fn is_usable(&self) -> bool {
        self.temperature.is_some()
    }

    fn mark_stale(&mut self) {
        self.stale = true;
    }
}

/// Latest observation from an ASOS airport station
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AsosObservation {
    pub station: String,
    /// Observation time as reported by the station feed
    pub time: Option<String>,
    pub pressure_hpa: Option<f64>,
    pub temp_f: Option<f64>,
    pub dewpoint_f: Option<f64>,
    pub wind_mph: Option<f64>,
    pub wind_dir: Option<f64>,
    /// Pressure change across the retained history window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tendency_hpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tendency_label: Option<PressureTendency>,
    #[serde(default)]
    pub stale: bool,
}

impl AsosObservation {
    /// Well-formed observation with no values
    #[must_use]
    pub fn placeholder(station: &str) -> Self {
        Self {
            station: station.to_string(),
            time: None,
            pressure_hpa: None,
            temp_f: None,
            dewpoint_f: None,
            wind_mph: None,
            wind_dir: None,
            tendency_hpa: None,
            tendency_label: None,
            stale: true,
        }
    }
}

/// Latest observation from the offshore buoy
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BuoyObservation {
    /// Observation time, `YYYY-MM-DDTHH:MMZ`
    pub time: Option<String>,
    pub wind_dir: Option<f64>,
    pub wind_mph: Option<f64>,
    pub gust_mph: Option<f64>,
    pub wave_ht_ft: Option<f64>,
    pub wave_period_sec: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub air_temp_f: Option<f64>,
    pub water_temp_f: Option<f64>,
    pub dewpoint_f: Option<f64>,
    /// Provider-computed 3 h pressure tendency in hPa
    pub pressure_tend_hpa: Option<f64>,
    #[serde(default)]
    pub stale: bool,
}

impl BuoyObservation {
    /// Well-formed observation with no values
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            stale: true,
            ..Default::default()
        }
    }
}

impl LastKnownGood for BuoyObservation {
    fn is_usable(&self) -> bool {
        self.time.is_some()
    }

    fn mark_stale(&mut self) {
        self.stale = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pws_usable_requires_temperature() {
        let mut reading = PwsReading::placeholder("KMAMARBL63", "Castle Hill");
        assert!(!reading.is_usable());
        reading.temperature = Some(41.2);
        assert!(reading.is_usable());
    }

    #[test]
    fn test_placeholders_are_stale() {
        assert!(PwsReading::placeholder("X", "Y").stale);
        assert!(AsosObservation::placeholder("KBOS").stale);
        assert!(BuoyObservation::placeholder().stale);
    }

    #[test]
    fn test_pws_cache_file_without_stale_flag_parses() {
        let json = r#"{"station":"KMAMARBL63","name":"Castle Hill","updated":null,"temperature":41.2}"#;
        let reading: PwsReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.temperature, Some(41.2));
        assert!(!reading.stale);
    }

    #[test]
    fn test_asos_tendency_omitted_when_absent() {
        let obs = AsosObservation::placeholder("KBVY");
        let value = serde_json::to_value(&obs).unwrap();
        assert!(value.get("tendency_hpa").is_none());
        assert_eq!(value["station"], "KBVY");
    }
}
