//! Rolling per-station observation window and pressure tendency
//!
//! Each ASOS station keeps its last few observations in the state store. The
//! tendency is the newest pressure minus the earliest pressure still inside
//! the window, so its time span depends on how regularly the collector ran.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::models::AsosObservation;
use crate::units::round_to;

/// Maximum number of observations retained per station
pub const HISTORY_CAPACITY: usize = 6;

/// Pressure change thresholds in hPa
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TendencyBands {
    /// Magnitude at or above which the change is "fast"
    pub fast: f64,
    /// Magnitude at or above which the change is not "steady"
    pub moderate: f64,
}

impl Default for TendencyBands {
    fn default() -> Self {
        Self {
            fast: 3.0,
            moderate: 0.6,
        }
    }
}

/// Qualitative pressure tendency
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PressureTendency {
    #[serde(rename = "Rising fast")]
    RisingFast,
    Rising,
    Steady,
    Falling,
    #[serde(rename = "Falling fast")]
    FallingFast,
}

impl PressureTendency {
    /// Classify a pressure change; the fast bands are checked first
    #[must_use]
    pub fn classify(delta_hpa: f64, bands: &TendencyBands) -> Self {
        if delta_hpa >= bands.fast {
            Self::RisingFast
        } else if delta_hpa >= bands.moderate {
            Self::Rising
        } else if delta_hpa <= -bands.fast {
            Self::FallingFast
        } else if delta_hpa <= -bands.moderate {
            Self::Falling
        } else {
            Self::Steady
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RisingFast => "Rising fast",
            Self::Rising => "Rising",
            Self::Steady => "Steady",
            Self::Falling => "Falling",
            Self::FallingFast => "Falling fast",
        }
    }
}

impl fmt::Display for PressureTendency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append `new_obs`, trim the window and compute the tendency across it.
///
/// The tendency needs at least two entries, a pressure on the newest one and
/// a pressure on some older entry still in the window.
#[must_use]
pub fn append_and_tendency(
    mut history: Vec<AsosObservation>,
    new_obs: AsosObservation,
    bands: &TendencyBands,
) -> (Vec<AsosObservation>, Option<f64>, Option<PressureTendency>) {
    history.push(new_obs);
    if history.len() > HISTORY_CAPACITY {
        let excess = history.len() - HISTORY_CAPACITY;
        history.drain(..excess);
    }

    let Some((newest, older)) = history.split_last() else {
        return (history, None, None);
    };

    let earliest = older.iter().find_map(|obs| obs.pressure_hpa);
    let tendency = match (earliest, newest.pressure_hpa) {
        (Some(first), Some(last)) => Some(round_to(last - first, 1)),
        _ => None,
    };
    let label = tendency.map(|delta| PressureTendency::classify(delta, bands));

    (history, tendency, label)
}

/// Fold one fetch outcome into a station's history.
///
/// Success appends the observation and annotates it with the tendency. On
/// failure the history is returned untouched together with a stale copy of
/// its newest entry, or a placeholder when the station has no history yet.
#[must_use]
pub fn observe_station(
    station: &str,
    history: Vec<AsosObservation>,
    fetched: Result<AsosObservation, &SourceError>,
    bands: &TendencyBands,
) -> (AsosObservation, Vec<AsosObservation>) {
    match fetched {
        Ok(obs) => {
            let (history, tendency_hpa, tendency_label) =
                append_and_tendency(history, obs.clone(), bands);
            tracing::debug!(
                station,
                window = history.len(),
                tendency = ?tendency_hpa,
                "pressure tendency"
            );
            let annotated = AsosObservation {
                tendency_hpa,
                tendency_label,
                stale: false,
                ..obs
            };
            (annotated, history)
        }
        Err(err) => {
            let latest = match history.last() {
                Some(last) => {
                    tracing::info!(station, "Serving last observation after failure: {}", err);
                    AsosObservation {
                        stale: true,
                        ..last.clone()
                    }
                }
                None => AsosObservation::placeholder(station),
            };
            (latest, history)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn obs(pressure: Option<f64>) -> AsosObservation {
        AsosObservation {
            pressure_hpa: pressure,
            time: Some("2024-03-01T12:54:00+00:00".into()),
            temp_f: Some(40.0),
            stale: false,
            ..AsosObservation::placeholder("KBOS")
        }
    }

    #[rstest]
    #[case(3.0, PressureTendency::RisingFast)]
    #[case(2.99, PressureTendency::Rising)]
    #[case(0.6, PressureTendency::Rising)]
    #[case(0.59, PressureTendency::Steady)]
    #[case(0.0, PressureTendency::Steady)]
    #[case(-0.59, PressureTendency::Steady)]
    #[case(-0.6, PressureTendency::Falling)]
    #[case(-2.99, PressureTendency::Falling)]
    #[case(-3.0, PressureTendency::FallingFast)]
    #[case(-7.5, PressureTendency::FallingFast)]
    fn test_classify_boundaries(#[case] delta: f64, #[case] expected: PressureTendency) {
        assert_eq!(
            PressureTendency::classify(delta, &TendencyBands::default()),
            expected
        );
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&PressureTendency::FallingFast).unwrap(),
            "\"Falling fast\""
        );
        assert_eq!(PressureTendency::RisingFast.to_string(), "Rising fast");
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut history = Vec::new();
        for i in 0..10 {
            let (next, _, _) = append_and_tendency(
                history,
                obs(Some(1000.0 + f64::from(i))),
                &TendencyBands::default(),
            );
            assert!(next.len() <= HISTORY_CAPACITY);
            history = next;
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0].pressure_hpa, Some(1004.0));
        assert_eq!(history[5].pressure_hpa, Some(1009.0));
    }

    #[test]
    fn test_tendency_uses_earliest_retained_entry() {
        let history: Vec<_> = [1015.0, 1014.0, 1013.0, 1012.0, 1011.0, 1010.0]
            .into_iter()
            .map(|p| obs(Some(p)))
            .collect();
        // 1015.0 is evicted, so the window starts at 1014.0
        let (history, tendency, label) =
            append_and_tendency(history, obs(Some(1010.6)), &TendencyBands::default());
        assert_eq!(history.len(), 6);
        assert_eq!(tendency, Some(-3.4));
        assert_eq!(label, Some(PressureTendency::FallingFast));
    }

    #[test]
    fn test_single_entry_has_no_tendency() {
        let (history, tendency, label) =
            append_and_tendency(Vec::new(), obs(Some(1012.0)), &TendencyBands::default());
        assert_eq!(history.len(), 1);
        assert_eq!(tendency, None);
        assert_eq!(label, None);
    }

    #[test]
    fn test_null_endpoints_have_no_tendency() {
        let (_, tendency, _) =
            append_and_tendency(vec![obs(None)], obs(Some(1012.0)), &TendencyBands::default());
        assert_eq!(tendency, None);

        let (_, tendency, _) =
            append_and_tendency(vec![obs(Some(1012.0))], obs(None), &TendencyBands::default());
        assert_eq!(tendency, None);
    }

    #[test]
    fn test_skips_leading_null_pressures() {
        let history = vec![obs(None), obs(Some(1010.0)), obs(Some(1011.0))];
        let (_, tendency, label) =
            append_and_tendency(history, obs(Some(1011.0)), &TendencyBands::default());
        assert_eq!(tendency, Some(1.0));
        assert_eq!(label, Some(PressureTendency::Rising));
    }

    #[test]
    fn test_observe_success_annotates() {
        let bands = TendencyBands::default();
        let (latest, history) =
            observe_station("KBOS", vec![obs(Some(1012.0))], Ok(obs(Some(1012.3))), &bands);
        assert_eq!(history.len(), 2);
        assert_eq!(latest.tendency_hpa, Some(0.3));
        assert_eq!(latest.tendency_label, Some(PressureTendency::Steady));
        assert!(!latest.stale);
    }

    #[test]
    fn test_observe_failure_returns_last_entry_stale() {
        let bands = TendencyBands::default();
        let err = SourceError::Http(503);
        let (latest, history) = observe_station(
            "KBOS",
            vec![obs(Some(1012.0)), obs(Some(1013.0))],
            Err(&err),
            &bands,
        );
        assert_eq!(history.len(), 2);
        assert_eq!(latest.pressure_hpa, Some(1013.0));
        assert!(latest.stale);
    }

    #[test]
    fn test_observe_failure_without_history() {
        let err = SourceError::Network("dns".into());
        let (latest, history) =
            observe_station("KBVY", Vec::new(), Err(&err), &TendencyBands::default());
        assert!(history.is_empty());
        assert_eq!(latest.station, "KBVY");
        assert_eq!(latest.pressure_hpa, None);
        assert!(latest.stale);
    }
}
