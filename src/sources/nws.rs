//! National Weather Service text forecast and active alerts
//!
//! The text forecast is a two-step lookup: `/points/{lat},{lon}` names the
//! forecast office, the grid cell and the forecast URL, which is then fetched
//! for its periods.

use serde::Deserialize;

use crate::error::SourceError;
use crate::models::{Alert, ForecastPeriod};

/// What `/points` resolves the site to
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub forecast_url: String,
    pub office: String,
    /// `x,y`
    pub grid: String,
}

#[derive(Debug, Deserialize)]
struct Feature<P> {
    #[serde(default)]
    properties: P,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PointProperties {
    forecast: Option<String>,
    cwa: Option<String>,
    grid_x: Option<i64>,
    grid_y: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ForecastProperties {
    periods: Vec<RawPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    #[serde(default)]
    name: String,
    #[serde(default = "default_daytime")]
    is_daytime: bool,
    temperature: Option<f64>,
    temperature_unit: Option<String>,
    #[serde(default)]
    wind_speed: String,
    #[serde(default)]
    wind_direction: String,
    #[serde(default)]
    short_forecast: String,
    #[serde(default)]
    detailed_forecast: String,
    #[serde(default)]
    icon: String,
}

fn default_daytime() -> bool {
    true
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AlertCollection {
    features: Vec<Feature<AlertProperties>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AlertProperties {
    event: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    severity: Option<String>,
    onset: Option<String>,
    expires: Option<String>,
}

fn grid_coordinate(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Decode a `/points` body
pub fn parse_point(body: &str) -> Result<GridPoint, SourceError> {
    let props = serde_json::from_str::<Feature<PointProperties>>(body)?.properties;
    let forecast_url = props
        .forecast
        .filter(|url| !url.is_empty())
        .ok_or_else(|| SourceError::NoData("no forecast URL returned from /points".into()))?;

    Ok(GridPoint {
        forecast_url,
        office: props.cwa.unwrap_or_default(),
        grid: format!("{},{}", grid_coordinate(props.grid_x), grid_coordinate(props.grid_y)),
    })
}

/// Decode the forecast periods
pub fn parse_forecast(body: &str) -> Result<Vec<ForecastPeriod>, SourceError> {
    let props = serde_json::from_str::<Feature<ForecastProperties>>(body)?.properties;
    Ok(props
        .periods
        .into_iter()
        .map(|p| ForecastPeriod {
            name: p.name,
            is_daytime: p.is_daytime,
            temperature: p.temperature,
            temp_unit: p.temperature_unit.unwrap_or_else(|| "F".to_string()),
            wind_speed: p.wind_speed,
            wind_direction: p.wind_direction,
            short_forecast: p.short_forecast,
            detailed: p.detailed_forecast,
            icon: p.icon,
        })
        .collect())
}

/// Decode active alerts, pointing every alert at `link`
pub fn parse_alerts(body: &str, link: &str) -> Result<Vec<Alert>, SourceError> {
    let collection: AlertCollection = serde_json::from_str(body)?;
    Ok(collection
        .features
        .into_iter()
        .map(|feature| {
            let props = feature.properties;
            Alert {
                event: props.event.unwrap_or_else(|| "Unknown".to_string()),
                headline: props.headline.unwrap_or_default(),
                description: props.description.unwrap_or_default(),
                severity: props.severity.unwrap_or_else(|| "Unknown".to_string()),
                onset: props.onset.unwrap_or_default(),
                expires: props.expires.unwrap_or_default(),
                url: link.to_string(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let body = r#"{"properties": {
            "forecast": "https://api.weather.gov/gridpoints/BOX/80,98/forecast",
            "cwa": "BOX", "gridX": 80, "gridY": 98
        }}"#;
        let point = parse_point(body).unwrap();
        assert_eq!(point.office, "BOX");
        assert_eq!(point.grid, "80,98");
        assert!(point.forecast_url.ends_with("/forecast"));
    }

    #[test]
    fn test_point_without_forecast_url() {
        let err = parse_point(r#"{"properties": {"cwa": "BOX"}}"#).unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }

    #[test]
    fn test_parse_forecast_periods() {
        let body = r#"{"properties": {"periods": [
            {"name": "Tonight", "isDaytime": false, "temperature": 28,
             "temperatureUnit": "F", "windSpeed": "5 to 10 mph", "windDirection": "NW",
             "shortForecast": "Mostly Clear", "detailedForecast": "Mostly clear, with a low around 28.",
             "icon": "https://api.weather.gov/icons/land/night/few"},
            {"name": "Friday"}
        ]}}"#;
        let periods = parse_forecast(body).unwrap();
        assert_eq!(periods.len(), 2);
        assert!(!periods[0].is_daytime);
        assert_eq!(periods[0].temperature, Some(28.0));
        assert_eq!(periods[0].detailed, "Mostly clear, with a low around 28.");
        assert!(periods[1].is_daytime);
        assert_eq!(periods[1].temp_unit, "F");
        assert_eq!(periods[1].temperature, None);
    }

    #[test]
    fn test_parse_alerts_with_defaults() {
        let body = r#"{"features": [
            {"properties": {"event": "Winter Storm Warning", "severity": "Severe",
                            "headline": "Winter Storm Warning issued", "onset": "2024-01-10T18:00:00-05:00"}},
            {"properties": {}}
        ]}"#;
        let alerts = parse_alerts(body, "https://www.weather.gov/box").unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].event, "Winter Storm Warning");
        assert_eq!(alerts[0].url, "https://www.weather.gov/box");
        assert_eq!(alerts[1].event, "Unknown");
        assert_eq!(alerts[1].severity, "Unknown");
        assert_eq!(alerts[1].description, "");
    }

    #[test]
    fn test_no_active_alerts() {
        let alerts = parse_alerts(r#"{"type": "FeatureCollection", "features": []}"#, "x").unwrap();
        assert!(alerts.is_empty());
    }
}
