//! NDBC realtime buoy feed
//!
//! The feed is whitespace-separated text: a `#`-prefixed header of column
//! names, a `#`-prefixed units line, then observations newest first. `MM`
//! marks a missing value.

use crate::error::SourceError;
use crate::models::BuoyObservation;
use crate::units::{c_to_f, meters_to_feet, ms_to_mph, round_to};

struct LatestRow<'a> {
    header: Vec<&'a str>,
    values: Vec<&'a str>,
}

impl LatestRow<'_> {
    /// Numeric value of column `name`; `MM`, unknown and unparseable are `None`
    fn get(&self, name: &str) -> Option<f64> {
        let idx = self.header.iter().position(|h| *h == name)?;
        match self.values.get(idx) {
            Some(&"MM") | None => None,
            Some(v) => v.parse().ok(),
        }
    }

    fn timestamp(&self) -> Result<String, SourceError> {
        let [year, month, day, hour, minute] = match self.values.get(..5) {
            Some(&[y, mo, d, h, mi]) => [y, mo, d, h, mi],
            _ => return Err(SourceError::Parse("buoy row is missing its timestamp".into())),
        };
        let year: i32 = year
            .parse()
            .map_err(|_| SourceError::Parse(format!("invalid buoy year '{year}'")))?;
        Ok(format!("{year}-{month}-{day}T{hour}:{minute}Z"))
    }
}

/// Decode the newest observation of a `realtime2/{id}.txt` body
pub fn parse_latest(body: &str) -> Result<BuoyObservation, SourceError> {
    let lines: Vec<&str> = body.trim().lines().collect();
    if lines.len() < 3 {
        return Err(SourceError::NoData("insufficient buoy data lines".into()));
    }

    let row = LatestRow {
        header: lines[0].trim_start_matches('#').split_whitespace().collect(),
        values: lines[2].split_whitespace().collect(),
    };

    let convert = |raw: Option<f64>, f: fn(f64) -> f64| raw.map(|v| round_to(f(v), 1));

    Ok(BuoyObservation {
        time: Some(row.timestamp()?),
        wind_dir: row.get("WDIR"),
        wind_mph: convert(row.get("WSPD"), ms_to_mph),
        gust_mph: convert(row.get("GST"), ms_to_mph),
        wave_ht_ft: convert(row.get("WVHT"), meters_to_feet),
        wave_period_sec: row.get("DPD"),
        pressure_hpa: row.get("PRES"),
        air_temp_f: convert(row.get("ATMP"), c_to_f),
        water_temp_f: convert(row.get("WTMP"), c_to_f),
        dewpoint_f: convert(row.get("DEWP"), c_to_f),
        pressure_tend_hpa: row.get("PTDY"),
        stale: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "\
#YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE
#yr  mo dy hr mn degT m/s  m/s     m   sec   sec degT   hPa  degC  degC  degC  nmi  hPa    ft
2024 03 01 12 50 290  8.0 10.0   1.2     7   5.1 100 1012.4   3.1   4.5  -2.0   MM -1.6    MM
2024 03 01 12 40 280  7.0  9.0    MM    MM    MM  MM 1012.6   3.2   4.5  -2.1   MM   MM    MM
";

    #[test]
    fn test_parse_latest_row() {
        let obs = parse_latest(FEED).unwrap();
        assert_eq!(obs.time.as_deref(), Some("2024-03-01T12:50Z"));
        assert_eq!(obs.wind_dir, Some(290.0));
        assert_eq!(obs.wind_mph, Some(17.9));
        assert_eq!(obs.gust_mph, Some(22.4));
        assert_eq!(obs.wave_ht_ft, Some(3.9));
        assert_eq!(obs.wave_period_sec, Some(7.0));
        assert_eq!(obs.pressure_hpa, Some(1012.4));
        assert_eq!(obs.air_temp_f, Some(37.6));
        assert_eq!(obs.water_temp_f, Some(40.1));
        assert_eq!(obs.dewpoint_f, Some(28.4));
        assert_eq!(obs.pressure_tend_hpa, Some(-1.6));
        assert!(!obs.stale);
    }

    #[test]
    fn test_missing_values() {
        let feed = FEED.replace("290  8.0 10.0", " MM   MM   MM");
        let obs = parse_latest(&feed).unwrap();
        assert_eq!(obs.wind_dir, None);
        assert_eq!(obs.wind_mph, None);
        assert_eq!(obs.gust_mph, None);
    }

    #[test]
    fn test_too_short() {
        let err = parse_latest("#YY MM DD\n#yr mo dy\n").unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }
}
