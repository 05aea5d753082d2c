//! Model pressure trend and the best-available pressure alarm

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::history::{PressureTendency, TendencyBands};
use crate::units::round_to;

/// Name recorded when the buoy tendency is selected
pub const BUOY_SOURCE: &str = "Buoy";
/// Name recorded when the model trend is selected
pub const MODEL_SOURCE: &str = "model";

/// 3 h pressure change from the first four hourly model samples
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PressureTrend {
    pub pressure_trend: PressureTendency,
    pub pressure_trend_hpa_3h: f64,
}

/// Direction of a fast pressure change
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlarmDirection {
    Falling,
    Rising,
}

impl fmt::Display for AlarmDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Falling => f.write_str("falling"),
            Self::Rising => f.write_str("rising"),
        }
    }
}

/// Selected tendency and the alarm raised on it, if any
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PressureAlarm {
    pub best_pressure_tend: f64,
    pub best_pressure_tend_src: String,
    pub pressure_alarm: Option<AlarmDirection>,
    pub pressure_alarm_label: Option<String>,
}

/// Trend from hourly model pressure; needs the first four samples present
#[must_use]
pub fn model_trend(pressure: &[Option<f64>], bands: &TendencyBands) -> Option<PressureTrend> {
    let window = pressure.get(..4)?;
    let samples: Option<Vec<f64>> = window.iter().copied().collect();
    let samples = samples?;
    let delta = samples[3] - samples[0];

    Some(PressureTrend {
        pressure_trend: PressureTendency::classify(delta, bands),
        pressure_trend_hpa_3h: round_to(delta, 1),
    })
}

/// Pick the first available tendency and raise an alarm beyond `threshold_hpa`.
///
/// `candidates` are `(source name, tendency)` pairs in priority order.
#[must_use]
pub fn best_alarm<'a, I>(candidates: I, threshold_hpa: f64) -> Option<PressureAlarm>
where
    I: IntoIterator<Item = (&'a str, Option<f64>)>,
{
    let (source, tendency) = candidates
        .into_iter()
        .find_map(|(source, tendency)| tendency.map(|t| (source, t)))?;

    let direction = if tendency <= -threshold_hpa {
        Some(AlarmDirection::Falling)
    } else if tendency >= threshold_hpa {
        Some(AlarmDirection::Rising)
    } else {
        None
    };
    let label =
        direction.map(|dir| format!("Pressure {dir} fast ({tendency:+.1} hPa, {source})"));

    Some(PressureAlarm {
        best_pressure_tend: round_to(tendency, 1),
        best_pressure_tend_src: source.to_string(),
        pressure_alarm: direction,
        pressure_alarm_label: label,
    })
}
