//! Personal weather station page scrape
//!
//! The station page renders the current temperature in a
//! `<span class="wu-value wu-value-to">`. The markup changes without notice,
//! so a page without a readable temperature counts as a failed fetch.

use scraper::{Html, Selector};

use crate::error::SourceError;
use crate::models::PwsReading;

const TEMPERATURE_SELECTOR: &str = "span.wu-value.wu-value-to";

/// First temperature value on the page
pub fn scrape_temperature(html: &str) -> Result<f64, SourceError> {
    let selector = Selector::parse(TEMPERATURE_SELECTOR)
        .map_err(|e| SourceError::Parse(format!("Invalid selector: {e}")))?;
    let document = Html::parse_document(html);

    let text: String = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect())
        .ok_or_else(|| SourceError::NoData("temperature element not found on PWS page".into()))?;

    text.trim().parse::<f64>().map_err(|_| {
        SourceError::NoData(format!("could not read PWS temperature from '{}'", text.trim()))
    })
}

/// Fresh reading from a scraped page
pub fn parse_reading(
    html: &str,
    station: &str,
    name: &str,
    updated: String,
) -> Result<PwsReading, SourceError> {
    let temperature = scrape_temperature(html)?;
    Ok(PwsReading {
        station: station.to_string(),
        name: name.to_string(),
        updated: Some(updated),
        temperature: Some(temperature),
        stale: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="current-temp">
            <span class="wu-value wu-value-to" style="color:#f79d1d;">41.2</span>
            <span class="wu-label">°F</span>
          </div>
          <span class="wu-value wu-value-to">29.98</span>
        </body></html>
    "#;

    #[test]
    fn test_scrape_first_value() {
        assert_eq!(scrape_temperature(PAGE).unwrap(), 41.2);
    }

    #[test]
    fn test_missing_element_is_no_data() {
        let err = scrape_temperature("<html><body><p>Redesigned</p></body></html>").unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }

    #[test]
    fn test_unreadable_value_is_no_data() {
        let html = r#"<span class="wu-value wu-value-to">--</span>"#;
        assert_eq!(scrape_temperature(html).unwrap_err().kind(), "no_data");
    }

    #[test]
    fn test_parse_reading() {
        let reading =
            parse_reading(PAGE, "KMAMARBL63", "Castle Hill", "2024-05-01T09:00:00-04:00".into())
                .unwrap();
        assert_eq!(reading.temperature, Some(41.2));
        assert!(!reading.stale);
        assert_eq!(reading.name, "Castle Hill");
    }
}
