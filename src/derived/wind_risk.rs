//! Direction-weighted wind "worry" model
//!
//! The same wind speed matters very differently depending on where it blows
//! from: open water in one direction, hills and trees in another. Each
//! compass sector carries an exposure factor and the score is
//! `speed × factor^1.5`, so exposed sectors are penalised super-linearly.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::scan::peak_in_window;
use crate::models::{CurrentConditions, HourlyBlock, wind_direction_to_cardinal};
use crate::units::round_to;

/// Factor used when no sector matches a direction
pub const FALLBACK_EXPOSURE: f64 = 0.5;

/// One compass sector, `[min_deg, max_deg)`; wraps through north when `min_deg > max_deg`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ExposureSector {
    pub min_deg: u16,
    pub max_deg: u16,
    pub factor: f64,
}

impl ExposureSector {
    #[must_use]
    pub fn contains(&self, deg: u16) -> bool {
        if self.min_deg <= self.max_deg {
            (self.min_deg..self.max_deg).contains(&deg)
        } else {
            deg >= self.min_deg || deg < self.max_deg
        }
    }
}

/// Site exposure by wind direction
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct ExposureTable {
    sectors: Vec<ExposureSector>,
}

impl Default for ExposureTable {
    fn default() -> Self {
        let sector = |min_deg, max_deg, factor| ExposureSector {
            min_deg,
            max_deg,
            factor,
        };
        Self {
            sectors: vec![
                sector(0, 20, 1.00),
                sector(20, 60, 0.90),
                sector(60, 90, 0.70),
                sector(90, 130, 0.50),
                sector(130, 165, 0.20),
                sector(165, 200, 0.10),
                sector(200, 255, 0.05),
                sector(255, 285, 0.30),
                sector(285, 315, 0.70),
                sector(315, 360, 0.95),
            ],
        }
    }
}

impl ExposureTable {
    #[must_use]
    pub fn new(sectors: Vec<ExposureSector>) -> Self {
        Self { sectors }
    }

    #[must_use]
    pub fn sectors(&self) -> &[ExposureSector] {
        &self.sectors
    }

    /// Exposure factor for wind from `deg` (any value, reduced mod 360)
    #[must_use]
    pub fn factor_for(&self, deg: u16) -> f64 {
        let deg = deg % 360;
        self.sectors
            .iter()
            .find(|s| s.contains(deg))
            .map_or(FALLBACK_EXPOSURE, |s| s.factor)
    }

    /// Check that every whole degree falls in exactly one sector and factors are in [0, 1]
    pub fn validate(&self) -> Result<(), String> {
        if let Some(bad) = self
            .sectors
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.factor) || s.min_deg > 360 || s.max_deg > 360)
        {
            return Err(format!(
                "invalid exposure sector {}-{} (factor {})",
                bad.min_deg, bad.max_deg, bad.factor
            ));
        }
        for deg in 0..360 {
            let matches = self.sectors.iter().filter(|s| s.contains(deg)).count();
            if matches != 1 {
                return Err(format!(
                    "exposure table matches {deg}° {matches} times, expected once"
                ));
            }
        }
        Ok(())
    }
}

/// Worry score lower bounds for each level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WorryThresholds {
    pub severe: f64,
    pub significant: f64,
    pub notable: f64,
    pub noticeable: f64,
}

impl Default for WorryThresholds {
    fn default() -> Self {
        Self {
            severe: 30.0,
            significant: 20.0,
            notable: 12.0,
            noticeable: 5.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindRiskConfig {
    pub window_hours: usize,
    pub exposure: ExposureTable,
    pub thresholds: WorryThresholds,
}

impl Default for WindRiskConfig {
    fn default() -> Self {
        Self {
            window_hours: 12,
            exposure: ExposureTable::default(),
            thresholds: WorryThresholds::default(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorryLevel {
    Low,
    Noticeable,
    Notable,
    Significant,
    Severe,
}

impl WorryLevel {
    #[must_use]
    pub fn from_score(score: f64, thresholds: &WorryThresholds) -> Self {
        if score >= thresholds.severe {
            Self::Severe
        } else if score >= thresholds.significant {
            Self::Significant
        } else if score >= thresholds.notable {
            Self::Notable
        } else if score >= thresholds.noticeable {
            Self::Noticeable
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for WorryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::Noticeable => "NOTICEABLE",
            Self::Notable => "NOTABLE",
            Self::Significant => "SIGNIFICANT",
            Self::Severe => "SEVERE",
        })
    }
}

/// `speed × factor^1.5`, two decimal places
#[must_use]
pub fn worry_score(speed_mph: f64, exposure_factor: f64) -> f64 {
    round_to(speed_mph * exposure_factor.powf(1.5), 2)
}

/// Scored peak of one wind series
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WindComponent {
    pub peak_mph: f64,
    pub direction_deg: u16,
    pub direction_cardinal: String,
    pub exposure_factor: f64,
    pub worry_score: f64,
    pub level: WorryLevel,
    pub peak_time: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WindRisk {
    pub window_hours: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust: Option<WindComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sustained: Option<WindComponent>,
}

/// Normalise a direction in degrees to 0..360, truncating fractions
fn whole_degrees(deg: f64) -> u16 {
    (deg.trunc() as i64).rem_euclid(360) as u16
}

fn score(
    speed: f64,
    direction: f64,
    peak_time: Option<String>,
    config: &WindRiskConfig,
) -> WindComponent {
    let direction_deg = whole_degrees(direction);
    let factor = config.exposure.factor_for(direction_deg);
    let worry = worry_score(speed, factor);
    WindComponent {
        peak_mph: round_to(speed, 1),
        direction_deg,
        direction_cardinal: wind_direction_to_cardinal(direction_deg).to_string(),
        exposure_factor: round_to(factor, 2),
        worry_score: worry,
        level: WorryLevel::from_score(worry, &config.thresholds),
        peak_time,
    }
}

/// Peak of `speeds` over the window, paired with its direction and time.
///
/// Falls back to the current snapshot when no hourly slot has both a speed
/// and a direction.
fn peak_component(
    speeds: &[Option<f64>],
    hourly: &HourlyBlock,
    current_speed: Option<f64>,
    current_dir: Option<f64>,
    config: &WindRiskConfig,
) -> Option<WindComponent> {
    let slots = speeds.iter().zip(&hourly.wind_direction);
    let peak = peak_in_window(slots, config.window_hours, |(speed, dir)| {
        dir.and(**speed)
    });

    match peak {
        Some((i, (Some(speed), Some(dir)))) => {
            Some(score(*speed, *dir, hourly.times.get(i).cloned(), config))
        }
        _ => Some(score(current_speed?, current_dir?, None, config)),
    }
}

/// Score peak gust and peak sustained wind over the next hours
#[must_use]
pub fn assess(
    current: &CurrentConditions,
    hourly: &HourlyBlock,
    config: &WindRiskConfig,
) -> Option<WindRisk> {
    let gust = peak_component(
        &hourly.wind_gusts,
        hourly,
        current.wind_gusts,
        current.wind_direction,
        config,
    );
    let sustained = peak_component(
        &hourly.wind_speed,
        hourly,
        current.wind_speed,
        current.wind_direction,
        config,
    );

    if gust.is_none() && sustained.is_none() {
        return None;
    }
    Some(WindRisk {
        window_hours: config.window_hours,
        gust,
        sustained,
    })
}
