//! 850 hPa column classification and height-tendency trough signal

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Confidence;
use crate::units::round_to;

/// 850 hPa temperature bounds in °F
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ColumnThresholds {
    /// At or above: rain
    pub rain_f: f64,
    /// At or above (and below `rain_f`): marginal, decided by wet-bulb
    pub marginal_f: f64,
    /// At or above (and below `marginal_f`): snow, else heavy snow
    pub snow_f: f64,
    /// Surface wet-bulb at or below which a marginal column snows
    pub wet_bulb_snow_f: f64,
}

impl Default for ColumnThresholds {
    fn default() -> Self {
        Self {
            rain_f: 32.0,
            marginal_f: 28.0,
            snow_f: 20.0,
            wet_bulb_snow_f: 32.0,
        }
    }
}

/// Height-tendency window and threshold
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TroughConfig {
    /// Hours between the compared samples
    pub span_hours: usize,
    /// Height change in metres that counts as a signal
    pub threshold_m: f64,
}

impl Default for TroughConfig {
    fn default() -> Self {
        Self {
            span_hours: 6,
            threshold_m: 30.0,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPrecip {
    Rain,
    #[serde(rename = "Snow likely")]
    SnowLikely,
    Mixed,
    Snow,
    #[serde(rename = "Heavy snow")]
    HeavySnow,
}

impl fmt::Display for ColumnPrecip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rain => "Rain",
            Self::SnowLikely => "Snow likely",
            Self::Mixed => "Mixed",
            Self::Snow => "Snow",
            Self::HeavySnow => "Heavy snow",
        })
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ColumnOutlook {
    pub col_precip_type: ColumnPrecip,
    pub col_precip_conf: Confidence,
    pub temp_850hpa_now: f64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TroughSignal {
    Approaching,
    Ridging,
    Steady,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TroughOutlook {
    pub height_850hpa_tend_6h: f64,
    pub trough_signal: TroughSignal,
}

/// Classify the column from the current 850 hPa temperature
#[must_use]
pub fn classify_column(
    temp_850_f: Option<f64>,
    wet_bulb_f: Option<f64>,
    thresholds: &ColumnThresholds,
) -> Option<ColumnOutlook> {
    let t850 = temp_850_f?;

    let (kind, confidence) = if t850 >= thresholds.rain_f {
        (ColumnPrecip::Rain, Confidence::High)
    } else if t850 >= thresholds.marginal_f {
        match wet_bulb_f {
            Some(wb) if wb <= thresholds.wet_bulb_snow_f => {
                (ColumnPrecip::SnowLikely, Confidence::Moderate)
            }
            _ => (ColumnPrecip::Mixed, Confidence::Low),
        }
    } else if t850 >= thresholds.snow_f {
        (ColumnPrecip::Snow, Confidence::High)
    } else {
        (ColumnPrecip::HeavySnow, Confidence::High)
    };

    Some(ColumnOutlook {
        col_precip_type: kind,
        col_precip_conf: confidence,
        temp_850hpa_now: round_to(t850, 1),
    })
}

/// Trough/ridge signal from consecutive 850 hPa heights
#[must_use]
pub fn trough_signal(heights: &[Option<f64>], config: &TroughConfig) -> Option<TroughOutlook> {
    let window = heights.get(..=config.span_hours)?;
    let first = (*window.first()?)?;
    if window.iter().any(Option::is_none) {
        return None;
    }
    let last = (*window.last()?)?;

    let delta = (last - first).round_ties_even();
    let signal = if delta <= -config.threshold_m {
        TroughSignal::Approaching
    } else if delta >= config.threshold_m {
        TroughSignal::Ridging
    } else {
        TroughSignal::Steady
    };

    Some(TroughOutlook {
        height_850hpa_tend_6h: delta,
        trough_signal: signal,
    })
}
