//! Tide predictions relative to MLLW

use serde::{Deserialize, Serialize};

/// High or low water
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TideKind {
    #[serde(rename = "H")]
    High,
    #[serde(rename = "L")]
    Low,
}

impl TideKind {
    /// Parse the provider's type code; anything other than `H` is low water
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("H") {
            TideKind::High
        } else {
            TideKind::Low
        }
    }
}

/// One predicted high or low water
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TideEvent {
    /// Local date, `YYYY-MM-DD`
    pub date: String,
    /// Local time, `HH:MM`
    pub time: String,
    /// Height in feet above MLLW
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: TideKind,
}

/// Fine-grained predicted water level curve
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TideCurve {
    /// Local timestamps, `YYYY-MM-DD HH:MM`
    pub times: Vec<String>,
    /// Heights in feet above MLLW
    pub heights: Vec<f64>,
}

/// Events plus curve, as produced by the tide source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TideData {
    pub events: Vec<TideEvent>,
    pub curve: TideCurve,
}
