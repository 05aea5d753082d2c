//! Latest airport observation from the NWS stations API
//!
//! Values arrive in SI units wrapped as `{"value": ..., "unitCode": ...}`.

use serde::Deserialize;

use crate::error::SourceError;
use crate::models::AsosObservation;
use crate::units::{c_to_f, kmh_to_mph, pa_to_hpa, round_to};

#[derive(Debug, Deserialize)]
struct ObservationResponse {
    #[serde(default)]
    properties: ObservationProperties,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ObservationProperties {
    timestamp: Option<String>,
    sea_level_pressure: Option<Measurement>,
    temperature: Option<Measurement>,
    dewpoint: Option<Measurement>,
    wind_speed: Option<Measurement>,
    wind_direction: Option<Measurement>,
}

#[derive(Debug, Deserialize, Default)]
struct Measurement {
    value: Option<f64>,
}

fn value(measurement: Option<Measurement>) -> Option<f64> {
    measurement.and_then(|m| m.value)
}

/// Decode a `/stations/{id}/observations/latest` body
pub fn parse_observation(station: &str, body: &str) -> Result<AsosObservation, SourceError> {
    let props = serde_json::from_str::<ObservationResponse>(body)?.properties;

    let convert = |raw: Option<f64>, f: fn(f64) -> f64| raw.map(|v| round_to(f(v), 1));

    Ok(AsosObservation {
        station: station.to_string(),
        time: props.timestamp,
        pressure_hpa: convert(value(props.sea_level_pressure), pa_to_hpa),
        temp_f: convert(value(props.temperature), c_to_f),
        dewpoint_f: convert(value(props.dewpoint), c_to_f),
        wind_mph: convert(value(props.wind_speed), kmh_to_mph),
        wind_dir: value(props.wind_direction),
        tendency_hpa: None,
        tendency_label: None,
        stale: false,
    })
}
