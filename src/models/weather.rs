//! Normalised model-forecast sections of the output document
//!
//! All values are in the units requested from the forecast provider:
//! °F, mph, inch, hPa, percent. Every array slot is optional because the
//! provider sends `null` for hours it has no value for.

use serde::{Deserialize, Serialize};

/// Current-conditions snapshot
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    /// Local provider timestamp, `YYYY-MM-DDTHH:MM`
    pub time: Option<String>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Mean sea level pressure in hPa
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Direction the wind blows from, degrees true
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i32>,
    pub condition: Option<String>,
    pub emoji: Option<String>,
    pub wet_bulb: Option<f64>,
    pub precip_type: Option<String>,
}

/// Hourly forecast arrays, index-aligned with `times`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct HourlyBlock {
    pub times: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub feels_like: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub dew_point: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub wind_gusts: Vec<Option<f64>>,
    pub wind_direction: Vec<Option<f64>>,
    pub pressure: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub temp_850hpa: Vec<Option<f64>>,
    pub temp_700hpa: Vec<Option<f64>>,
    pub height_850hpa: Vec<Option<f64>>,
    pub wet_bulb: Vec<Option<f64>>,
}

impl HourlyBlock {
    /// Number of hourly slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Daily forecast arrays, index-aligned with `dates`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DailyBlock {
    /// Local calendar dates, `YYYY-MM-DD`
    pub dates: Vec<String>,
    pub temperature_max: Vec<Option<f64>>,
    pub temperature_min: Vec<Option<f64>>,
    pub feels_like_max: Vec<Option<f64>>,
    pub feels_like_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub wind_speed_max: Vec<Option<f64>>,
    pub wind_gusts_max: Vec<Option<f64>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

/// Convert a WMO weather code to a short description
#[must_use]
pub fn weather_code_to_description(code: i32) -> String {
    let text = match code {
        0 => "Clear",
        1 => "Mostly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Freezing Fog",
        51 => "Light Drizzle",
        53 => "Drizzle",
        55 => "Heavy Drizzle",
        61 => "Light Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        71 => "Light Snow",
        73 => "Snow",
        75 => "Heavy Snow",
        77 => "Snow Grains",
        80 => "Light Showers",
        81 => "Showers",
        82 => "Heavy Showers",
        85 => "Light Snow Showers",
        86 => "Snow Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with Hail",
        99 => "Severe Thunderstorm",
        other => return format!("Code {other}"),
    };
    text.to_string()
}

/// Convert a WMO weather code to a display emoji
#[must_use]
pub fn weather_code_to_emoji(code: i32) -> &'static str {
    match code {
        0 => "☀️",
        1 => "🌤️",
        2 => "⛅",
        3 => "☁️",
        45 | 48 => "🌫️",
        51 | 80 | 81 => "🌦️",
        53 | 55 | 61 | 63 | 65 | 82 => "🌧️",
        71 | 73 | 75 | 77 | 85 | 86 => "🌨️",
        95 | 96 | 99 => "⛈️",
        _ => "🌡️",
    }
}

/// Convert wind direction in degrees to a 16-point cardinal label
#[must_use]
pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
    match degrees % 360 {
        0..=11 | 349..=359 => "N",
        12..=33 => "NNE",
        34..=56 => "NE",
        57..=78 => "ENE",
        79..=101 => "E",
        102..=123 => "ESE",
        124..=146 => "SE",
        147..=168 => "SSE",
        169..=191 => "S",
        192..=213 => "SSW",
        214..=236 => "SW",
        237..=258 => "WSW",
        259..=281 => "W",
        282..=303 => "WNW",
        304..=326 => "NW",
        _ => "NNW",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_descriptions() {
        assert_eq!(weather_code_to_description(0), "Clear");
        assert_eq!(weather_code_to_description(95), "Thunderstorm");
        assert_eq!(weather_code_to_description(42), "Code 42");
    }

    #[test]
    fn test_weather_emoji_fallback() {
        assert_eq!(weather_code_to_emoji(3), "☁️");
        assert_eq!(weather_code_to_emoji(1234), "🌡️");
    }

    #[test]
    fn test_cardinal_directions() {
        assert_eq!(wind_direction_to_cardinal(0), "N");
        assert_eq!(wind_direction_to_cardinal(360), "N");
        assert_eq!(wind_direction_to_cardinal(90), "E");
        assert_eq!(wind_direction_to_cardinal(225), "SW");
        assert_eq!(wind_direction_to_cardinal(340), "NNW");
    }

    #[test]
    fn test_hourly_len() {
        let block = HourlyBlock {
            times: vec!["2024-01-01T00:00".into(), "2024-01-01T01:00".into()],
            ..Default::default()
        };
        assert_eq!(block.len(), 2);
        assert!(!block.is_empty());
        assert!(HourlyBlock::default().is_empty());
    }
}
