//! Site location block of the output document

use std::fmt;

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

/// The single monitored site
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Display name of the site
    pub name: String,
    pub coordinates: Coordinates,
    /// Time the document describing this site was generated
    pub updated: String,
}

impl Location {
    /// Create a new location block
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, updated: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: Coordinates { lat, lon },
            updated: updated.into(),
        }
    }
}

/// `lat,lon` at four decimals, the precision NWS point lookups accept
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_display() {
        let location = Location::new("Wyman Cove", 42.5014, -70.875, "2024-01-01T00:00:00Z");
        assert_eq!(location.coordinates.to_string(), "42.5014,-70.8750");
    }

    #[test]
    fn test_serialized_shape() {
        let location = Location::new("Wyman Cove", 42.5, -70.9, "2024-01-01T00:00:00Z");
        let value = serde_json::to_value(&location).unwrap();
        assert_eq!(value["coordinates"]["lat"], 42.5);
        assert_eq!(value["coordinates"]["lon"], -70.9);
        assert_eq!(value["updated"], "2024-01-01T00:00:00Z");
    }
}
