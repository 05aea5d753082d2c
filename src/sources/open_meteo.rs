//! Open-Meteo forecast queries and response normalisation
//!
//! Current conditions come from GFS, the 48 h hourly block from HRRR and the
//! 10-day daily block from ECMWF. HRRR and ECMWF each have a GFS seamless
//! fallback query. All requests ask for °F, mph and inches in the site
//! timezone.

use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceError;
use crate::models::{CurrentConditions, DailyBlock, HourlyBlock};

const CURRENT_VARS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

// HRRR exposes neither visibility nor uv_index
const HRRR_HOURLY_VARS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "dew_point_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "weather_code",
    "pressure_msl",
    "cloud_cover",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
    "temperature_850hPa",
    "temperature_700hPa",
    "geopotential_height_850hPa",
];

const GFS_EXTRA_HOURLY_VARS: &[&str] = &["visibility", "uv_index"];

const DAILY_VARS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "uv_index_max",
    "precipitation_sum",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
];

/// Which block of the forecast a query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastSection {
    Current,
    Hourly,
    Daily,
}

impl ForecastSection {
    fn param(self) -> &'static str {
        match self {
            ForecastSection::Current => "current",
            ForecastSection::Hourly => "hourly",
            ForecastSection::Daily => "daily",
        }
    }
}

/// One Open-Meteo request, labelled with the model name reported in the status
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    pub label: &'static str,
    pub section: ForecastSection,
    pub variables: Vec<&'static str>,
    /// `None` lets the provider pick its seamless blend
    pub model: Option<&'static str>,
    pub forecast_days: Option<u32>,
}

impl ForecastQuery {
    #[must_use]
    pub fn current_gfs() -> Self {
        Self {
            label: "GFS current",
            section: ForecastSection::Current,
            variables: CURRENT_VARS.to_vec(),
            model: None,
            forecast_days: None,
        }
    }

    #[must_use]
    pub fn hourly_hrrr() -> Self {
        Self {
            label: "HRRR hourly",
            section: ForecastSection::Hourly,
            variables: HRRR_HOURLY_VARS.to_vec(),
            model: Some("ncep_hrrr_conus"),
            forecast_days: Some(2),
        }
    }

    #[must_use]
    pub fn hourly_gfs_fallback() -> Self {
        let mut variables = HRRR_HOURLY_VARS.to_vec();
        variables.extend_from_slice(GFS_EXTRA_HOURLY_VARS);
        Self {
            label: "GFS seamless (HRRR fallback)",
            section: ForecastSection::Hourly,
            variables,
            model: None,
            forecast_days: Some(2),
        }
    }

    #[must_use]
    pub fn daily_ecmwf() -> Self {
        Self {
            label: "ECMWF daily",
            section: ForecastSection::Daily,
            variables: DAILY_VARS.to_vec(),
            model: Some("ecmwf_ifs025"),
            forecast_days: Some(10),
        }
    }

    #[must_use]
    pub fn daily_gfs_fallback() -> Self {
        Self {
            label: "GFS seamless (ECMWF fallback)",
            model: None,
            ..Self::daily_ecmwf()
        }
    }

    /// Query-string parameters for the site
    #[must_use]
    pub fn params(
        &self,
        latitude: f64,
        longitude: f64,
        timezone: &str,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            (self.section.param(), self.variables.join(",")),
            ("temperature_unit", "fahrenheit".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("precipitation_unit", "inch".to_string()),
            ("timezone", timezone.to_string()),
        ];
        if let Some(model) = self.model {
            params.push(("models", model.to_string()));
        }
        if let Some(days) = self.forecast_days {
            params.push(("forecast_days", days.to_string()));
        }
        params
    }
}

/// Raw forecast body; only the requested section is present
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: Option<RawHourly>,
    #[serde(default)]
    pub daily: Option<RawDaily>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RawCurrent {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i32>,
    pub cloud_cover: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub wind_gusts_10m: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub dew_point_2m: Vec<Option<f64>>,
    pub apparent_temperature: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub pressure_msl: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub wind_direction_10m: Vec<Option<f64>>,
    pub wind_gusts_10m: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
    #[serde(rename = "temperature_850hPa")]
    pub temperature_850hpa: Vec<Option<f64>>,
    #[serde(rename = "temperature_700hPa")]
    pub temperature_700hpa: Vec<Option<f64>>,
    #[serde(rename = "geopotential_height_850hPa")]
    pub geopotential_height_850hpa: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RawDaily {
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub apparent_temperature_max: Vec<Option<f64>>,
    pub apparent_temperature_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
    pub wind_gusts_10m_max: Vec<Option<f64>>,
}

/// Decode a forecast body.
///
/// The provider reports bad requests as `{"error": true, "reason": ...}`,
/// usually with a 400 status, so the body is inspected before the status.
pub fn parse_response(status: u16, body: &str) -> Result<ForecastResponse, SourceError> {
    let success = (200..300).contains(&status);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if success => return Err(e.into()),
        Err(_) => return Err(SourceError::Http(status)),
    };

    if value.get("error").and_then(Value::as_bool) == Some(true) {
        let reason = value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("provider reported an error");
        return Err(SourceError::Upstream(reason.to_string()));
    }
    if !success {
        return Err(SourceError::Http(status));
    }

    Ok(serde_json::from_value(value)?)
}

impl ForecastResponse {
    /// Current-conditions snapshot; a missing weather code reads as clear sky
    #[must_use]
    pub fn into_current(self) -> Option<CurrentConditions> {
        let raw = self.current?;
        Some(CurrentConditions {
            time: raw.time,
            temperature: raw.temperature_2m,
            feels_like: raw.apparent_temperature,
            humidity: raw.relative_humidity_2m,
            pressure: raw.pressure_msl,
            wind_speed: raw.wind_speed_10m,
            wind_direction: raw.wind_direction_10m,
            wind_gusts: raw.wind_gusts_10m,
            cloud_cover: raw.cloud_cover,
            precipitation: raw.precipitation,
            weather_code: Some(raw.weather_code.unwrap_or(0)),
            ..Default::default()
        })
    }

    /// Full hourly block, before slicing to the display window
    #[must_use]
    pub fn into_hourly(self) -> Option<HourlyBlock> {
        let raw = self.hourly?;
        Some(HourlyBlock {
            times: raw.time,
            temperature: raw.temperature_2m,
            feels_like: raw.apparent_temperature,
            humidity: raw.relative_humidity_2m,
            dew_point: raw.dew_point_2m,
            precipitation_probability: raw.precipitation_probability,
            precipitation: raw.precipitation,
            wind_speed: raw.wind_speed_10m,
            wind_gusts: raw.wind_gusts_10m,
            wind_direction: raw.wind_direction_10m,
            pressure: raw.pressure_msl,
            cloud_cover: raw.cloud_cover,
            visibility: raw.visibility,
            uv_index: raw.uv_index,
            weather_code: raw.weather_code,
            temp_850hpa: raw.temperature_850hpa,
            temp_700hpa: raw.temperature_700hpa,
            height_850hpa: raw.geopotential_height_850hpa,
            wet_bulb: Vec::new(),
        })
    }

    #[must_use]
    pub fn into_daily(self) -> Option<DailyBlock> {
        let raw = self.daily?;
        Some(DailyBlock {
            dates: raw.time,
            temperature_max: raw.temperature_2m_max,
            temperature_min: raw.temperature_2m_min,
            feels_like_max: raw.apparent_temperature_max,
            feels_like_min: raw.apparent_temperature_min,
            sunrise: raw.sunrise,
            sunset: raw.sunset,
            precipitation_sum: raw.precipitation_sum,
            precipitation_probability_max: raw.precipitation_probability_max,
            wind_speed_max: raw.wind_speed_10m_max,
            wind_gusts_max: raw.wind_gusts_10m_max,
            uv_index_max: raw.uv_index_max,
            weather_code: raw.weather_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_hrrr_query_params() {
        let params = ForecastQuery::hourly_hrrr().params(42.5014, -70.875, "America/New_York");
        assert_eq!(param(&params, "models"), Some("ncep_hrrr_conus"));
        assert_eq!(param(&params, "forecast_days"), Some("2"));
        assert_eq!(param(&params, "temperature_unit"), Some("fahrenheit"));
        assert_eq!(param(&params, "timezone"), Some("America/New_York"));
        let hourly = param(&params, "hourly").unwrap();
        assert!(hourly.contains("geopotential_height_850hPa"));
        assert!(!hourly.contains("visibility"));
    }

    #[test]
    fn test_fallback_queries_drop_model() {
        let hourly = ForecastQuery::hourly_gfs_fallback();
        assert_eq!(hourly.model, None);
        assert!(hourly.variables.contains(&"uv_index"));

        let daily = ForecastQuery::daily_gfs_fallback();
        let params = daily.params(42.5, -70.9, "UTC");
        assert_eq!(param(&params, "models"), None);
        assert_eq!(param(&params, "forecast_days"), Some("10"));
        assert_eq!(daily.label, "GFS seamless (ECMWF fallback)");
    }

    #[test]
    fn test_current_query_has_no_model() {
        let params = ForecastQuery::current_gfs().params(42.5, -70.9, "UTC");
        assert!(param(&params, "current").unwrap().contains("pressure_msl"));
        assert_eq!(param(&params, "models"), None);
    }

    #[test]
    fn test_error_body_is_upstream_failure() {
        let body = r#"{"error": true, "reason": "Cannot initialize WeatherVariable from invalid String value"}"#;
        let err = parse_response(400, body).unwrap_err();
        assert!(matches!(err, SourceError::Upstream(ref r) if r.contains("WeatherVariable")));
    }

    #[test]
    fn test_error_flag_wins_over_success_status() {
        let err = parse_response(200, r#"{"error": true}"#).unwrap_err();
        assert_eq!(err.kind(), "upstream");
    }

    #[test]
    fn test_non_json_error_status() {
        assert_eq!(parse_response(502, "<html>bad gateway</html>"), Err(SourceError::Http(502)));
    }

    #[test]
    fn test_parse_hourly_with_nulls() {
        let body = r#"{
            "hourly": {
                "time": ["2024-01-10T00:00", "2024-01-10T01:00"],
                "temperature_2m": [31.5, null],
                "weather_code": [3, 71],
                "temperature_850hPa": [20.1, 19.8],
                "geopotential_height_850hPa": [1450.0, null]
            }
        }"#;
        let block = parse_response(200, body).unwrap().into_hourly().unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.temperature, vec![Some(31.5), None]);
        assert_eq!(block.weather_code, vec![Some(3), Some(71)]);
        assert_eq!(block.temp_850hpa, vec![Some(20.1), Some(19.8)]);
        assert_eq!(block.height_850hpa, vec![Some(1450.0), None]);
        assert!(block.visibility.is_empty());
    }

    #[test]
    fn test_parse_current_defaults_weather_code() {
        let body = r#"{"current": {"time": "2024-01-10T09:00", "temperature_2m": 40.2}}"#;
        let current = parse_response(200, body).unwrap().into_current().unwrap();
        assert_eq!(current.temperature, Some(40.2));
        assert_eq!(current.weather_code, Some(0));
        assert_eq!(current.humidity, None);
    }

    #[test]
    fn test_parse_daily() {
        let body = r#"{"daily": {"time": ["2024-01-10"], "temperature_2m_min": [18.0],
                       "sunrise": ["2024-01-10T07:11"]}}"#;
        let daily = parse_response(200, body).unwrap().into_daily().unwrap();
        assert_eq!(daily.dates, vec!["2024-01-10"]);
        assert_eq!(daily.temperature_min, vec![Some(18.0)]);
        assert_eq!(daily.sunrise, vec![Some("2024-01-10T07:11".to_string())]);
    }

    #[test]
    fn test_missing_section_is_none() {
        let response = parse_response(200, "{}").unwrap();
        assert!(response.into_hourly().is_none());
    }
}
