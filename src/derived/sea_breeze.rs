//! Sea-breeze / land-breeze detection from the land-water temperature contrast

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Confidence;
use crate::units::round_to;

/// Site-specific sea-breeze tuning
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SeaBreezeConfig {
    /// First and last local daytime hour, inclusive
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    /// Night is from `night_start_hour` through `night_end_hour`, wrapping midnight
    pub night_start_hour: u32,
    pub night_end_hour: u32,
    /// Onshore wind sector: at or below `onshore_max_deg` or at or above `onshore_min_deg`
    pub onshore_max_deg: f64,
    pub onshore_min_deg: f64,
    /// Wind strictly below this is calm
    pub calm_mph: f64,
    /// Wind strictly below this is light
    pub light_mph: f64,
    pub likely_diff_f: f64,
    pub possible_diff_f: f64,
    pub developing_diff_f: f64,
    /// Land minus water at or below this (negative) allows a land breeze
    pub land_breeze_diff_f: f64,
}

impl Default for SeaBreezeConfig {
    fn default() -> Self {
        Self {
            day_start_hour: 9,
            day_end_hour: 19,
            night_start_hour: 21,
            night_end_hour: 5,
            onshore_max_deg: 135.0,
            onshore_min_deg: 315.0,
            calm_mph: 6.0,
            light_mph: 12.0,
            likely_diff_f: 8.0,
            possible_diff_f: 5.0,
            developing_diff_f: 3.0,
            land_breeze_diff_f: -5.0,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum BreezeLabel {
    #[serde(rename = "Sea breeze likely")]
    SeaBreezeLikely,
    #[serde(rename = "Sea breeze possible")]
    SeaBreezePossible,
    #[serde(rename = "Sea breeze developing")]
    SeaBreezeDeveloping,
    #[serde(rename = "Land breeze")]
    LandBreeze,
    #[serde(rename = "No sea breeze")]
    None,
}

impl fmt::Display for BreezeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SeaBreezeLikely => "Sea breeze likely",
            Self::SeaBreezePossible => "Sea breeze possible",
            Self::SeaBreezeDeveloping => "Sea breeze developing",
            Self::LandBreeze => "Land breeze",
            Self::None => "No sea breeze",
        })
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SeaBreeze {
    pub sea_breeze_label: BreezeLabel,
    pub sea_breeze_conf: Option<Confidence>,
    pub land_sea_diff_f: f64,
    pub land_temp_f: f64,
    pub water_temp_f: f64,
}

/// Current surface state fed to the detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreezeInputs {
    pub land_temp_f: Option<f64>,
    pub water_temp_f: Option<f64>,
    pub wind_mph: Option<f64>,
    pub wind_dir_deg: Option<f64>,
    /// Local hour of day, 0-23
    pub local_hour: u32,
}

impl SeaBreezeConfig {
    fn is_daytime(&self, hour: u32) -> bool {
        (self.day_start_hour..=self.day_end_hour).contains(&hour)
    }

    fn is_nighttime(&self, hour: u32) -> bool {
        hour >= self.night_start_hour || hour <= self.night_end_hour
    }

    fn is_onshore(&self, deg: f64) -> bool {
        deg <= self.onshore_max_deg || deg >= self.onshore_min_deg
    }
}

/// Classify the breeze regime; first matching rule wins
#[must_use]
pub fn detect(inputs: &BreezeInputs, config: &SeaBreezeConfig) -> Option<SeaBreeze> {
    let land = inputs.land_temp_f?;
    let water = inputs.water_temp_f?;
    let diff = land - water;

    let daytime = config.is_daytime(inputs.local_hour);
    let nighttime = config.is_nighttime(inputs.local_hour);
    let calm = inputs.wind_mph.is_some_and(|w| w < config.calm_mph);
    let light = inputs.wind_mph.is_some_and(|w| w < config.light_mph);
    let onshore = inputs.wind_dir_deg.is_some_and(|d| config.is_onshore(d));

    let (label, confidence) = if diff >= config.likely_diff_f && daytime && calm {
        (BreezeLabel::SeaBreezeLikely, Some(Confidence::High))
    } else if diff >= config.possible_diff_f && daytime && light {
        (BreezeLabel::SeaBreezePossible, Some(Confidence::Moderate))
    } else if diff >= config.developing_diff_f && daytime && light && onshore {
        (BreezeLabel::SeaBreezeDeveloping, Some(Confidence::Low))
    } else if diff <= config.land_breeze_diff_f && nighttime && calm {
        (BreezeLabel::LandBreeze, Some(Confidence::Moderate))
    } else {
        (BreezeLabel::None, None)
    };

    Some(SeaBreeze {
        sea_breeze_label: label,
        sea_breeze_conf: confidence,
        land_sea_diff_f: round_to(diff, 1),
        land_temp_f: land,
        water_temp_f: water,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn inputs(land: f64, water: f64, wind: f64, dir: f64, hour: u32) -> BreezeInputs {
        BreezeInputs {
            land_temp_f: Some(land),
            water_temp_f: Some(water),
            wind_mph: Some(wind),
            wind_dir_deg: Some(dir),
            local_hour: hour,
        }
    }

    #[rstest]
    #[case(inputs(70.0, 60.0, 5.0, 200.0, 14), BreezeLabel::SeaBreezeLikely)]
    #[case(inputs(70.0, 60.0, 8.0, 200.0, 14), BreezeLabel::SeaBreezePossible)]
    #[case(inputs(65.0, 60.0, 11.9, 200.0, 9), BreezeLabel::SeaBreezePossible)]
    #[case(inputs(64.0, 60.0, 10.0, 90.0, 19), BreezeLabel::SeaBreezeDeveloping)]
    #[case(inputs(64.0, 60.0, 10.0, 200.0, 12), BreezeLabel::None)]
    #[case(inputs(64.0, 60.0, 10.0, 315.0, 12), BreezeLabel::SeaBreezeDeveloping)]
    #[case(inputs(50.0, 58.0, 3.0, 270.0, 23), BreezeLabel::LandBreeze)]
    #[case(inputs(50.0, 58.0, 3.0, 270.0, 5), BreezeLabel::LandBreeze)]
    #[case(inputs(50.0, 58.0, 3.0, 270.0, 20), BreezeLabel::None)]
    #[case(inputs(70.0, 60.0, 5.0, 200.0, 20), BreezeLabel::None)]
    #[case(inputs(70.0, 60.0, 12.0, 90.0, 12), BreezeLabel::None)]
    fn test_decision_order(#[case] input: BreezeInputs, #[case] expected: BreezeLabel) {
        let result = detect(&input, &SeaBreezeConfig::default()).unwrap();
        assert_eq!(result.sea_breeze_label, expected);
    }

    #[test]
    fn test_records_inputs() {
        let result =
            detect(&inputs(70.26, 60.0, 5.0, 200.0, 14), &SeaBreezeConfig::default()).unwrap();
        assert_eq!(result.land_sea_diff_f, 10.3);
        assert_eq!(result.land_temp_f, 70.26);
        assert_eq!(result.water_temp_f, 60.0);
        assert_eq!(result.sea_breeze_conf, Some(Confidence::High));
    }

    #[test]
    fn test_missing_wind_is_never_calm() {
        let mut input = inputs(70.0, 60.0, 0.0, 90.0, 14);
        input.wind_mph = None;
        let result = detect(&input, &SeaBreezeConfig::default()).unwrap();
        assert_eq!(result.sea_breeze_label, BreezeLabel::None);
        assert_eq!(result.sea_breeze_conf, None);
    }

    #[test]
    fn test_requires_both_temperatures() {
        let mut input = inputs(70.0, 60.0, 5.0, 90.0, 14);
        input.water_temp_f = None;
        assert!(detect(&input, &SeaBreezeConfig::default()).is_none());
    }
}
