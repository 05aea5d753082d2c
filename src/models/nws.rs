//! National Weather Service text forecast periods and active alerts

use serde::{Deserialize, Serialize};

/// One named period of the forecaster-written text forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastPeriod {
    pub name: String,
    pub is_daytime: bool,
    pub temperature: Option<f64>,
    pub temp_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub short_forecast: String,
    pub detailed: String,
    pub icon: String,
}

/// Text forecast together with the issuing office metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextForecast {
    pub periods: Vec<ForecastPeriod>,
    /// Forecast office identifier, e.g. `BOX`
    pub office: String,
    /// Grid cell, `x,y`
    pub grid: String,
}

/// Active watch, warning or advisory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Alert {
    pub event: String,
    pub headline: String,
    pub description: String,
    pub severity: String,
    pub onset: String,
    pub expires: String,
    pub url: String,
}
