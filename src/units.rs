//! Unit conversions and rounding shared by the sources and derived metrics

/// Round to a fixed number of decimal places, ties to even
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round_ties_even() / factor
}

#[must_use]
pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[must_use]
pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Pascals to hectopascals
#[must_use]
pub fn pa_to_hpa(pascals: f64) -> f64 {
    pascals / 100.0
}

#[must_use]
pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / 1.60934
}

#[must_use]
pub fn ms_to_mph(ms: f64) -> f64 {
    ms * 2.237
}

#[must_use]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * 3.281
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.2345, 1), 1.2);
        assert_eq!(round_to(1.25, 1), 1.2);
        assert_eq!(round_to(-3.04, 1), -3.0);
        assert_eq!(round_to(1013.456, 0), 1013.0);
    }

    #[test]
    fn test_round_to_ties_to_even() {
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
    }

    #[test]
    fn test_temperature_conversions() {
        assert_eq!(c_to_f(0.0), 32.0);
        assert_eq!(c_to_f(100.0), 212.0);
        assert_eq!(f_to_c(32.0), 0.0);
        assert!((f_to_c(c_to_f(12.3)) - 12.3).abs() < 1e-9);
    }

    #[test]
    fn test_speed_and_length_conversions() {
        assert!((kmh_to_mph(16.0934) - 10.0).abs() < 1e-9);
        assert!((ms_to_mph(10.0) - 22.37).abs() < 1e-9);
        assert!((meters_to_feet(1.0) - 3.281).abs() < 1e-9);
        assert_eq!(pa_to_hpa(101_325.0), 1013.25);
    }
}
