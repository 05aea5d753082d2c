//! Radiation/advection fog outlook from the next hours of model data

use std::fmt;

use serde::{Deserialize, Serialize};

use super::scan::count_in_window;
use crate::models::HourlyBlock;

/// Per-slot fog criteria and the probability bands
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FogCriteria {
    pub window_hours: usize,
    /// Maximum temperature minus dew point, °F
    pub max_depression_f: f64,
    pub min_humidity_pct: f64,
    pub max_wind_mph: f64,
    pub likely_pct: u32,
    pub possible_pct: u32,
    pub low_chance_pct: u32,
}

impl Default for FogCriteria {
    fn default() -> Self {
        Self {
            window_hours: 12,
            max_depression_f: 2.0,
            min_humidity_pct: 93.0,
            max_wind_mph: 10.0,
            likely_pct: 75,
            possible_pct: 40,
            low_chance_pct: 15,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum FogLabel {
    Likely,
    Possible,
    #[serde(rename = "Low chance")]
    LowChance,
    Unlikely,
}

impl fmt::Display for FogLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Likely => "Likely",
            Self::Possible => "Possible",
            Self::LowChance => "Low chance",
            Self::Unlikely => "Unlikely",
        })
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FogOutlook {
    pub fog_probability: u32,
    pub fog_label: FogLabel,
    pub fog_hours_in_12h: usize,
}

/// Share of the next hours meeting the fog criteria.
///
/// Missing values never match: absent temperature or dew point produce a
/// huge depression, absent humidity reads as 0% and absent wind as 999 mph.
#[must_use]
pub fn fog_outlook(hourly: &HourlyBlock, criteria: &FogCriteria) -> Option<FogOutlook> {
    let window = criteria
        .window_hours
        .min(hourly.temperature.len())
        .min(hourly.dew_point.len())
        .min(hourly.humidity.len())
        .min(hourly.wind_speed.len());
    if window == 0 {
        return None;
    }

    let slots = hourly
        .temperature
        .iter()
        .zip(&hourly.dew_point)
        .zip(&hourly.humidity)
        .zip(&hourly.wind_speed)
        .map(|(((t, d), rh), ws)| {
            (
                t.unwrap_or(999.0),
                d.unwrap_or(-999.0),
                rh.unwrap_or(0.0),
                ws.unwrap_or(999.0),
            )
        });

    let (fog_hours, seen) = count_in_window(slots, window, |&(t, d, rh, ws)| {
        t - d <= criteria.max_depression_f
            && rh >= criteria.min_humidity_pct
            && ws <= criteria.max_wind_mph
    });

    let pct = (fog_hours as f64 / seen as f64 * 100.0).round_ties_even() as u32;
    let label = if pct >= criteria.likely_pct {
        FogLabel::Likely
    } else if pct >= criteria.possible_pct {
        FogLabel::Possible
    } else if pct >= criteria.low_chance_pct {
        FogLabel::LowChance
    } else {
        FogLabel::Unlikely
    };

    Some(FogOutlook {
        fog_probability: pct,
        fog_label: label,
        fog_hours_in_12h: fog_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(foggy: usize, total: usize) -> HourlyBlock {
        let mut hourly = HourlyBlock::default();
        for i in 0..total {
            hourly.times.push(format!("2024-05-01T{i:02}:00"));
            if i < foggy {
                hourly.temperature.push(Some(52.0));
                hourly.dew_point.push(Some(51.0));
                hourly.humidity.push(Some(96.0));
                hourly.wind_speed.push(Some(4.0));
            } else {
                hourly.temperature.push(Some(60.0));
                hourly.dew_point.push(Some(45.0));
                hourly.humidity.push(Some(60.0));
                hourly.wind_speed.push(Some(12.0));
            }
        }
        hourly
    }

    #[test]
    fn test_nine_of_twelve_is_likely() {
        let outlook = fog_outlook(&block(9, 24), &FogCriteria::default()).unwrap();
        assert_eq!(outlook.fog_probability, 75);
        assert_eq!(outlook.fog_label, FogLabel::Likely);
        assert_eq!(outlook.fog_hours_in_12h, 9);
    }

    #[test]
    fn test_label_bands() {
        let criteria = FogCriteria::default();
        assert_eq!(fog_outlook(&block(5, 12), &criteria).unwrap().fog_label, FogLabel::Possible);
        assert_eq!(fog_outlook(&block(2, 12), &criteria).unwrap().fog_label, FogLabel::LowChance);
        assert_eq!(fog_outlook(&block(1, 12), &criteria).unwrap().fog_label, FogLabel::Unlikely);
    }

    #[test]
    fn test_short_window() {
        let outlook = fog_outlook(&block(2, 4), &FogCriteria::default()).unwrap();
        assert_eq!(outlook.fog_probability, 50);
    }

    #[test]
    fn test_empty_window_has_no_output() {
        assert!(fog_outlook(&HourlyBlock::default(), &FogCriteria::default()).is_none());
    }

    #[test]
    fn test_missing_values_never_match() {
        let mut hourly = block(3, 3);
        hourly.temperature[0] = None;
        hourly.humidity[1] = None;
        hourly.wind_speed[2] = None;
        let outlook = fog_outlook(&hourly, &FogCriteria::default()).unwrap();
        assert_eq!(outlook.fog_hours_in_12h, 0);
        assert_eq!(outlook.fog_label, FogLabel::Unlikely);
    }

    #[test]
    fn test_boundary_values_match() {
        let mut hourly = block(1, 1);
        hourly.temperature[0] = Some(50.0);
        hourly.dew_point[0] = Some(48.0);
        hourly.humidity[0] = Some(93.0);
        hourly.wind_speed[0] = Some(10.0);
        let outlook = fog_outlook(&hourly, &FogCriteria::default()).unwrap();
        assert_eq!(outlook.fog_probability, 100);
    }
}
