//! Data models for the weather collector
//!
//! This module contains the typed records organized by concern:
//! - Location: the monitored site
//! - Weather: normalised model current/hourly/daily sections
//! - Observation: cached station readings
//! - Tide, NWS: provider payloads copied into the document
//! - Document: the versioned output root

pub mod document;
pub mod location;
pub mod nws;
pub mod observation;
pub mod tide;
pub mod weather;

// Re-export all public types for convenient access
pub use document::{
    DOCUMENT_FIELDS, Hyperlocal, SCHEMA_VERSION, WeatherDocument, buoy_key, is_reserved_key,
    station_key,
};
pub use location::{Coordinates, Location};
pub use nws::{Alert, ForecastPeriod, TextForecast};
pub use observation::{AsosObservation, BuoyObservation, PwsReading};
pub use tide::{TideCurve, TideData, TideEvent, TideKind};
pub use weather::{
    CurrentConditions, DailyBlock, HourlyBlock, weather_code_to_description,
    weather_code_to_emoji, wind_direction_to_cardinal,
};
