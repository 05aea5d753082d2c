//! NOAA tide predictions: high/low events and the 6-minute curve

use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::error::SourceError;
use crate::models::{TideCurve, TideEvent, TideKind};
use crate::units::round_to;

/// Maximum number of high/low events kept
pub const MAX_TIDE_EVENTS: usize = 8;

/// Prediction interval requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TideInterval {
    HighLow,
    SixMinute,
}

impl TideInterval {
    fn param(self) -> &'static str {
        match self {
            TideInterval::HighLow => "hilo",
            TideInterval::SixMinute => "6",
        }
    }
}

/// Query-string parameters covering today and the next two days
#[must_use]
pub fn query_params(
    station: &str,
    today: NaiveDate,
    interval: TideInterval,
) -> Vec<(&'static str, String)> {
    let end = today.checked_add_days(Days::new(2)).unwrap_or(today);
    vec![
        ("station", station.to_string()),
        ("product", "predictions".to_string()),
        ("interval", interval.param().to_string()),
        ("datum", "MLLW".to_string()),
        ("time_zone", "lst_ldt".to_string()),
        ("units", "english".to_string()),
        ("format", "json".to_string()),
        ("begin_date", today.format("%Y%m%d").to_string()),
        ("end_date", end.format("%Y%m%d").to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    /// Local time, `YYYY-MM-DD HH:MM`
    t: String,
    /// Height as a decimal string
    v: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn parse_predictions(body: &str) -> Result<Vec<Prediction>, SourceError> {
    let response: PredictionsResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(SourceError::Upstream(
            error
                .message
                .unwrap_or_else(|| "tide provider reported an error".to_string()),
        ));
    }
    Ok(response.predictions)
}

fn height(prediction: &Prediction) -> Option<f64> {
    prediction.v.as_deref()?.trim().parse().ok()
}

/// Decode the high/low product into at most [`MAX_TIDE_EVENTS`] events
pub fn parse_events(body: &str) -> Result<Vec<TideEvent>, SourceError> {
    parse_predictions(body)?
        .iter()
        .take(MAX_TIDE_EVENTS)
        .map(|p| {
            let (date, time) = p
                .t
                .split_once(' ')
                .ok_or_else(|| SourceError::Parse(format!("Unexpected tide timestamp '{}'", p.t)))?;
            Ok(TideEvent {
                date: date.to_string(),
                time: time.trim().to_string(),
                height: round_to(height(p).unwrap_or(0.0), 3),
                kind: TideKind::from_code(p.kind.as_deref().unwrap_or_default()),
            })
        })
        .collect()
}

/// Decode the 6-minute product; points without a height are dropped
pub fn parse_curve(body: &str) -> Result<TideCurve, SourceError> {
    let (times, heights) = parse_predictions(body)?
        .into_iter()
        .filter_map(|p| height(&p).map(|h| (p.t, round_to(h, 2))))
        .unzip();
    Ok(TideCurve { times, heights })
}
