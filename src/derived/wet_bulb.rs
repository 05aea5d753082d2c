//! Wet-bulb temperature and precipitation typing
//!
//! Wet-bulb temperature uses the Stull (2011) closed-form approximation,
//! which is valid for RH 5-99% and -20..50 °C and is close enough at the
//! edges for typing rain against snow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::{c_to_f, f_to_c, round_to};

/// Wet-bulb upper bounds in °F for each precipitation type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PrecipBands {
    pub snow: f64,
    pub snow_likely: f64,
    pub mixed: f64,
    pub freezing_rain: f64,
}

impl Default for PrecipBands {
    fn default() -> Self {
        Self {
            snow: 28.0,
            snow_likely: 32.0,
            mixed: 35.0,
            freezing_rain: 38.0,
        }
    }
}

/// Expected surface precipitation type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PrecipType {
    Snow,
    #[serde(rename = "Snow likely")]
    SnowLikely,
    #[serde(rename = "Mixed/slush")]
    Mixed,
    #[serde(rename = "Freezing rain possible")]
    FreezingRainPossible,
    Rain,
}

impl PrecipType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snow => "Snow",
            Self::SnowLikely => "Snow likely",
            Self::Mixed => "Mixed/slush",
            Self::FreezingRainPossible => "Freezing rain possible",
            Self::Rain => "Rain",
        }
    }
}

impl fmt::Display for PrecipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wet-bulb temperature in °F, one decimal place
#[must_use]
pub fn wet_bulb_f(temp_f: Option<f64>, humidity_pct: Option<f64>) -> Option<f64> {
    let t = f_to_c(temp_f?);
    let rh = humidity_pct?;

    let tw = t * (0.151_977 * (rh + 8.313_659).sqrt()).atan() + (t + rh).atan()
        - (rh - 1.676_331).atan()
        + 0.003_918_38 * rh.powf(1.5) * (0.023_101 * rh).atan()
        - 4.686_035;

    Some(round_to(c_to_f(tw), 1))
}

/// Wet-bulb value for every slot of paired temperature/humidity series
#[must_use]
pub fn wet_bulb_series(temps: &[Option<f64>], humidity: &[Option<f64>]) -> Vec<Option<f64>> {
    temps
        .iter()
        .zip(humidity)
        .map(|(t, rh)| wet_bulb_f(*t, *rh))
        .collect()
}

/// Classify precipitation type from wet-bulb temperature
#[must_use]
pub fn precip_type(wet_bulb: Option<f64>, bands: &PrecipBands) -> Option<PrecipType> {
    let wb = wet_bulb?;
    let kind = if wb <= bands.snow {
        PrecipType::Snow
    } else if wb <= bands.snow_likely {
        PrecipType::SnowLikely
    } else if wb <= bands.mixed {
        PrecipType::Mixed
    } else if wb <= bands.freezing_rain {
        PrecipType::FreezingRainPossible
    } else {
        PrecipType::Rain
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(50.0, 50.0)]
    #[case(90.0, 90.0)]
    #[case(60.0, 30.0)]
    #[case(33.0, 90.0)]
    fn test_wet_bulb_below_dry_bulb(#[case] temp: f64, #[case] rh: f64) {
        let wb = wet_bulb_f(Some(temp), Some(rh)).unwrap();
        assert!(wb < temp, "wet bulb {wb} should be below {temp}");
        assert!(wb > temp - 30.0);
    }

    #[test]
    fn test_wet_bulb_known_values() {
        assert_eq!(wet_bulb_f(Some(50.0), Some(50.0)), Some(41.2));
        assert_eq!(wet_bulb_f(Some(90.0), Some(90.0)), Some(87.5));
    }

    #[test]
    fn test_saturated_air_is_near_dry_bulb() {
        let wb = wet_bulb_f(Some(45.0), Some(100.0)).unwrap();
        assert!((wb - 45.0).abs() < 0.5);
        assert_eq!(precip_type(Some(wb), &PrecipBands::default()), Some(PrecipType::Rain));

        let wb = wet_bulb_f(Some(30.0), Some(100.0)).unwrap();
        assert!((wb - 30.0).abs() < 0.5);
        assert_eq!(
            precip_type(Some(wb), &PrecipBands::default()),
            Some(PrecipType::SnowLikely)
        );
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(wet_bulb_f(None, Some(50.0)), None);
        assert_eq!(wet_bulb_f(Some(50.0), None), None);
        assert_eq!(precip_type(None, &PrecipBands::default()), None);
    }

    #[rstest]
    #[case(28.0, PrecipType::Snow)]
    #[case(28.1, PrecipType::SnowLikely)]
    #[case(32.0, PrecipType::SnowLikely)]
    #[case(35.0, PrecipType::Mixed)]
    #[case(38.0, PrecipType::FreezingRainPossible)]
    #[case(38.1, PrecipType::Rain)]
    fn test_precip_bands(#[case] wb: f64, #[case] expected: PrecipType) {
        assert_eq!(precip_type(Some(wb), &PrecipBands::default()), Some(expected));
    }

    #[test]
    fn test_series_keeps_alignment() {
        let series = wet_bulb_series(
            &[Some(50.0), None, Some(90.0)],
            &[Some(50.0), Some(80.0), Some(90.0)],
        );
        assert_eq!(series, vec![Some(41.2), None, Some(87.5)]);
    }

    #[test]
    fn test_label_text() {
        assert_eq!(
            serde_json::to_string(&PrecipType::Mixed).unwrap(),
            "\"Mixed/slush\""
        );
    }
}
