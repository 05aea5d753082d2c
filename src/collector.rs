//! One collector run
//!
//! Fetches every source in a fixed order, one at a time. Each source's
//! failure is absorbed into its status; fallbacks come from the state store.
//! The only state written back is the last-known-good cache of each station,
//! the ASOS history windows and the frost log.

use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::assemble::{CollectedData, assemble};
use crate::cache::{StateStore, StateStoreExt, write_file_atomically};
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::fallback::get_or_fallback;
use crate::frost::{FrostSeasonLog, daily_min_series};
use crate::history::observe_station;
use crate::models::{
    AsosObservation, BuoyObservation, DailyBlock, PwsReading, TideData, WeatherDocument, buoy_key,
    station_key,
};
use crate::sources::{ForecastQuery, ForecastResponse, WeatherSources};
use crate::status::{SourceStatus, SourceStatusTracker};

pub const PWS_CACHE_KEY: &str = "last_pws";
pub const BUOY_CACHE_KEY: &str = "last_buoy";
pub const FROST_LOG_KEY: &str = "frost_log";

/// State-store key of an ASOS station's history window
#[must_use]
pub fn history_key(station: &str) -> String {
    format!("last_{}", station_key(station))
}

/// Runs the fetch, fallback and assembly sequence
pub struct Collector<'a, S: WeatherSources> {
    sources: S,
    store: &'a dyn StateStore,
    config: &'a CollectorConfig,
    tz: Tz,
    fixed_now: Option<DateTime<Utc>>,
}

impl<'a, S: WeatherSources> Collector<'a, S> {
    pub fn new(
        sources: S,
        store: &'a dyn StateStore,
        config: &'a CollectorConfig,
    ) -> Result<Self, CollectorError> {
        Ok(Self {
            sources,
            store,
            config,
            tz: config.site.tz()?,
            fixed_now: None,
        })
    }

    /// Pin every timestamp of the run to `now`
    #[must_use]
    pub fn with_fixed_time(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Run a primary model query, retrying once with the fallback model
    async fn fetch_model(
        &self,
        primary: ForecastQuery,
        fallback: Option<ForecastQuery>,
    ) -> (Option<ForecastResponse>, SourceStatus) {
        let mut fetched_at = self.now();
        let mut label = primary.label;
        let mut result = self.sources.forecast(&primary).await;

        if let Some(fallback) = fallback {
            if let Err(err) = &result {
                warn!("{} unavailable ({}), falling back to {}", label, err, fallback.label);
                fetched_at = self.now();
                label = fallback.label;
                result = self.sources.forecast(&fallback).await;
            }
        }

        let status = SourceStatus::from_result(fetched_at, &result).with_model(label);
        (result.ok(), status)
    }

    async fn fetch_stations(&self, statuses: &mut SourceStatusTracker) -> Vec<AsosObservation> {
        let mut latest = Vec::with_capacity(self.config.stations.asos.len());

        for station in &self.config.stations.asos {
            let key = history_key(station);
            let history: Vec<AsosObservation> = self.store.load(&key).unwrap_or_default();

            let fetched_at = self.now();
            let result = self.sources.asos(station).await;
            statuses.record(station_key(station), SourceStatus::from_result(fetched_at, &result));

            let (observation, history) = observe_station(
                station,
                history,
                result.as_ref().cloned(),
                &self.config.metrics.tendency,
            );
            if result.is_ok() {
                if let Err(e) = self.store.save(&key, &history) {
                    warn!(station = %station, "Could not persist observation history: {}", e);
                }
            }
            latest.push(observation);
        }

        latest
    }

    fn update_frost_log(&self, daily: Option<&DailyBlock>) -> FrostSeasonLog {
        let today = self.now().with_timezone(&self.tz).date_naive();
        let series = daily
            .map(|d| daily_min_series(&d.dates, &d.temperature_min))
            .unwrap_or_default();

        let stored: Option<FrostSeasonLog> = self.store.load(FROST_LOG_KEY);
        let log = FrostSeasonLog::update(stored, &series, today, &self.config.metrics.frost);
        if let Err(e) = self.store.save(FROST_LOG_KEY, &log) {
            warn!("Could not persist frost log: {}", e);
        }
        log
    }

    /// Collect every source and assemble the document
    #[tracing::instrument(name = "collector_run", skip(self))]
    pub async fn run(&self) -> WeatherDocument {
        info!("Collecting weather for {}", self.config.site.name);
        let mut statuses = SourceStatusTracker::new();
        let stations = &self.config.stations;

        let (current, status) = self.fetch_model(ForecastQuery::current_gfs(), None).await;
        statuses.record("gfs_current", status);

        let (hourly, status) = self
            .fetch_model(ForecastQuery::hourly_hrrr(), Some(ForecastQuery::hourly_gfs_fallback()))
            .await;
        statuses.record("hrrr_hourly", status);

        let (daily, status) = self
            .fetch_model(ForecastQuery::daily_ecmwf(), Some(ForecastQuery::daily_gfs_fallback()))
            .await;
        statuses.record("ecmwf_daily", status);

        let (pws, status) = get_or_fallback(
            self.store,
            PWS_CACHE_KEY,
            self.now(),
            self.sources.pws(),
            || PwsReading::placeholder(&stations.pws_id, &stations.pws_name),
        )
        .await;
        statuses.record("pws", status);

        let fetched_at = self.now();
        let today = fetched_at.with_timezone(&self.tz).date_naive();
        let tides = self.sources.tides(today).await;
        statuses.record("tides", SourceStatus::from_result(fetched_at, &tides));

        let asos = self.fetch_stations(&mut statuses).await;

        let (buoy, status) = get_or_fallback(
            self.store,
            BUOY_CACHE_KEY,
            self.now(),
            self.sources.buoy(),
            BuoyObservation::placeholder,
        )
        .await;
        statuses.record(buoy_key(&stations.buoy_id), status);

        let fetched_at = self.now();
        let forecast = self.sources.nws_forecast().await;
        let mut status = SourceStatus::from_result(fetched_at, &forecast);
        if let Ok(text) = &forecast {
            status = status.with_office(text.office.clone(), text.grid.clone());
        }
        statuses.record("nws_forecast", status);

        let fetched_at = self.now();
        let alerts = self.sources.nws_alerts().await;
        statuses.record("nws_alerts", SourceStatus::from_result(fetched_at, &alerts));

        let daily = daily.and_then(ForecastResponse::into_daily);
        let frost_log = self.update_frost_log(daily.as_ref());

        if statuses.failures() > 0 {
            warn!("{} source(s) failed this run", statuses.failures());
        }

        let data = CollectedData {
            current: current.and_then(ForecastResponse::into_current),
            hourly: hourly.and_then(ForecastResponse::into_hourly),
            daily,
            tides: tides.unwrap_or_default(),
            pws,
            stations: asos,
            buoy,
            nws_forecast: forecast.map(|f| f.periods).unwrap_or_default(),
            alerts: alerts.unwrap_or_default(),
            frost_log,
            statuses,
        };

        assemble(data, self.config, self.tz, self.now())
    }
}

/// Pretty-print the document and replace `path` in one rename
pub fn write_document(document: &WeatherDocument, path: &Path) -> Result<(), CollectorError> {
    let contents = serde_json::to_string_pretty(document)?;
    write_file_atomically(path, &contents)?;
    info!(path = %path.display(), bytes = contents.len(), "Document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keys() {
        assert_eq!(history_key("KBOS"), "last_kbos");
        assert_eq!(history_key("KBVY"), "last_kbvy");
    }

    #[test]
    fn test_write_document_replaces_file() {
        use chrono::{NaiveDate, TimeZone};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather_data.json");
        std::fs::write(&path, "old").unwrap();

        let config = CollectorConfig::default();
        let data = CollectedData {
            current: None,
            hourly: None,
            daily: None,
            tides: TideData::default(),
            pws: PwsReading::placeholder("KMAMARBL63", "Castle Hill"),
            stations: Vec::new(),
            buoy: BuoyObservation::placeholder(),
            nws_forecast: Vec::new(),
            alerts: Vec::new(),
            frost_log: FrostSeasonLog::new(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()),
            statuses: SourceStatusTracker::new(),
        };
        let generated = Utc.with_ymd_and_hms(2024, 11, 2, 12, 0, 0).unwrap();
        let doc = assemble(data, &config, chrono_tz::America::New_York, generated);

        write_document(&doc, &path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["schema_version"], "1.1");
        assert!(!dir.path().join("weather_data.json.tmp").exists());
    }
}
