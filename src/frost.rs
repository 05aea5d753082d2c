//! Frost/freeze season log
//!
//! A season runs from October 1 through the following September 30. Each
//! forecast day that has already elapsed is folded into the counters exactly
//! once; days still ahead are only reported as upcoming risk.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::units::round_to;

/// Maximum number of processed dates remembered
pub const LOGGED_DATES_LIMIT: usize = 60;

/// Minimum-temperature thresholds in °F
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FrostThresholds {
    pub freeze: f64,
    pub hard_freeze: f64,
    pub severe: f64,
}

impl Default for FrostThresholds {
    fn default() -> Self {
        Self {
            freeze: 32.0,
            hard_freeze: 28.0,
            severe: 20.0,
        }
    }
}

/// A forecast day at or below freezing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UpcomingFreeze {
    pub date: NaiveDate,
    pub min_f: f64,
}

/// Season-to-date freeze counters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FrostSeasonLog {
    pub season_start: NaiveDate,
    pub freeze_days: u32,
    pub hard_freeze_days: u32,
    pub severe_days: u32,
    pub last_freeze: Option<NaiveDate>,
    pub last_hard: Option<NaiveDate>,
    pub last_severe: Option<NaiveDate>,
    /// Dates already folded in, ascending
    #[serde(default)]
    pub logged_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub upcoming_freeze_days: Vec<UpcomingFreeze>,
}

/// October 1 of the season containing `today`
#[must_use]
pub fn season_start_for(today: NaiveDate) -> NaiveDate {
    let year = if today.month() >= 10 {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, 10, 1).unwrap_or(today)
}

impl FrostSeasonLog {
    /// Empty log for the season beginning at `season_start`
    #[must_use]
    pub fn new(season_start: NaiveDate) -> Self {
        Self {
            season_start,
            freeze_days: 0,
            hard_freeze_days: 0,
            severe_days: 0,
            last_freeze: None,
            last_hard: None,
            last_severe: None,
            logged_dates: Vec::new(),
            upcoming_freeze_days: Vec::new(),
        }
    }

    /// Continue the stored log, or start fresh when the season has changed
    #[must_use]
    pub fn for_season(stored: Option<Self>, today: NaiveDate) -> Self {
        let season_start = season_start_for(today);
        match stored {
            Some(log) if log.season_start == season_start => log,
            Some(log) => {
                tracing::info!(
                    previous = %log.season_start,
                    current = %season_start,
                    "Frost season rolled over"
                );
                Self::new(season_start)
            }
            None => Self::new(season_start),
        }
    }

    /// Fold strictly past, unlogged dates of this season into the counters
    pub fn fold(
        &mut self,
        series: &[(NaiveDate, Option<f64>)],
        today: NaiveDate,
        thresholds: &FrostThresholds,
    ) {
        let mut logged: BTreeSet<NaiveDate> = self.logged_dates.iter().copied().collect();

        for &(date, min_f) in series {
            if date >= today || date < self.season_start || logged.contains(&date) {
                continue;
            }
            let Some(min_f) = min_f else {
                continue;
            };

            if min_f <= thresholds.severe {
                self.severe_days += 1;
                self.last_severe = Some(date);
            }
            if min_f <= thresholds.hard_freeze {
                self.hard_freeze_days += 1;
                self.last_hard = Some(date);
            }
            if min_f <= thresholds.freeze {
                self.freeze_days += 1;
                self.last_freeze = Some(date);
            }
            logged.insert(date);
        }

        let skip = logged.len().saturating_sub(LOGGED_DATES_LIMIT);
        self.logged_dates = logged.into_iter().skip(skip).collect();
    }

    /// Replace the upcoming list with every day from `today` on at or below freezing
    pub fn refresh_upcoming(
        &mut self,
        series: &[(NaiveDate, Option<f64>)],
        today: NaiveDate,
        thresholds: &FrostThresholds,
    ) {
        self.upcoming_freeze_days = series
            .iter()
            .filter(|(date, _)| *date >= today)
            .filter_map(|&(date, min_f)| {
                min_f
                    .filter(|t| *t <= thresholds.freeze)
                    .map(|t| UpcomingFreeze {
                        date,
                        min_f: round_to(t, 1),
                    })
            })
            .collect();
    }

    /// Run one full update: rollover, fold, upcoming
    #[must_use]
    pub fn update(
        stored: Option<Self>,
        series: &[(NaiveDate, Option<f64>)],
        today: NaiveDate,
        thresholds: &FrostThresholds,
    ) -> Self {
        let mut log = Self::for_season(stored, today);
        log.fold(series, today, thresholds);
        log.refresh_upcoming(series, today, thresholds);
        tracing::info!(
            freeze_days = log.freeze_days,
            last_freeze = ?log.last_freeze,
            upcoming = log.upcoming_freeze_days.len(),
            "Frost log updated"
        );
        log
    }
}

/// Pair daily dates with their minimum temperatures, dropping unparseable dates
#[must_use]
pub fn daily_min_series(dates: &[String], mins: &[Option<f64>]) -> Vec<(NaiveDate, Option<f64>)> {
    dates
        .iter()
        .zip(mins.iter())
        .filter_map(|(date, min_f)| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .map(|d| (d, *min_f))
        })
        .collect()
}
