//! Document assembly
//!
//! Merges the fetched sections, the cached station readings, the frost log
//! and the derived indicators into one [`WeatherDocument`]. Assembly is
//! deterministic given its inputs and the generation time; nothing here
//! touches the network or the state store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::CollectorConfig;
use crate::derived::{self, DerivedInputs, DerivedMetrics, wet_bulb};
use crate::frost::FrostSeasonLog;
use crate::models::{
    Alert, AsosObservation, BuoyObservation, CurrentConditions, DailyBlock, ForecastPeriod,
    HourlyBlock, Hyperlocal, Location, PwsReading, SCHEMA_VERSION, TideData, WeatherDocument,
    buoy_key, station_key, weather_code_to_description, weather_code_to_emoji,
};
use crate::status::SourceStatusTracker;

/// Hourly slots kept in the document
pub const HOURLY_WINDOW: usize = 48;

const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Everything collected during one run
#[derive(Debug, Clone)]
pub struct CollectedData {
    pub current: Option<CurrentConditions>,
    /// Full hourly block as returned by the model, not yet sliced
    pub hourly: Option<HourlyBlock>,
    pub daily: Option<DailyBlock>,
    pub tides: TideData,
    pub pws: PwsReading,
    /// ASOS observations in configured priority order
    pub stations: Vec<AsosObservation>,
    pub buoy: BuoyObservation,
    pub nws_forecast: Vec<ForecastPeriod>,
    pub alerts: Vec<Alert>,
    pub frost_log: FrostSeasonLog,
    pub statuses: SourceStatusTracker,
}

/// Index of the first slot at or after `now_local`.
///
/// Falls back to 0 when no slot is late enough or any timestamp fails to parse.
#[must_use]
pub fn hourly_start_index(times: &[String], now_local: NaiveDateTime) -> usize {
    let parsed: Option<Vec<NaiveDateTime>> = times
        .iter()
        .map(|t| NaiveDateTime::parse_from_str(t, HOURLY_TIME_FORMAT).ok())
        .collect();

    parsed
        .and_then(|times| times.iter().position(|t| *t >= now_local))
        .unwrap_or(0)
}

fn window<T: Clone>(values: &[T], start: usize, len: usize) -> Vec<T> {
    let end = start.saturating_add(len).min(values.len());
    values.get(start..end).map(<[T]>::to_vec).unwrap_or_default()
}

/// Slice every hourly array to `len` slots from `start`
#[must_use]
pub fn slice_hourly(block: &HourlyBlock, start: usize, len: usize) -> HourlyBlock {
    HourlyBlock {
        times: window(&block.times, start, len),
        temperature: window(&block.temperature, start, len),
        feels_like: window(&block.feels_like, start, len),
        humidity: window(&block.humidity, start, len),
        dew_point: window(&block.dew_point, start, len),
        precipitation_probability: window(&block.precipitation_probability, start, len),
        precipitation: window(&block.precipitation, start, len),
        wind_speed: window(&block.wind_speed, start, len),
        wind_gusts: window(&block.wind_gusts, start, len),
        wind_direction: window(&block.wind_direction, start, len),
        pressure: window(&block.pressure, start, len),
        cloud_cover: window(&block.cloud_cover, start, len),
        visibility: window(&block.visibility, start, len),
        uv_index: window(&block.uv_index, start, len),
        weather_code: window(&block.weather_code, start, len),
        temp_850hpa: window(&block.temp_850hpa, start, len),
        temp_700hpa: window(&block.temp_700hpa, start, len),
        height_850hpa: window(&block.height_850hpa, start, len),
        wet_bulb: window(&block.wet_bulb, start, len),
    }
}

/// Attach condition text, emoji, wet-bulb and precipitation type
fn enrich_current(mut current: CurrentConditions, config: &CollectorConfig) -> CurrentConditions {
    if let Some(code) = current.weather_code {
        current.condition = Some(weather_code_to_description(code));
        current.emoji = Some(weather_code_to_emoji(code).to_string());
    }
    current.wet_bulb = wet_bulb::wet_bulb_f(current.temperature, current.humidity);
    current.precip_type =
        wet_bulb::precip_type(current.wet_bulb, &config.metrics.precip).map(|p| p.to_string());
    current
}

/// Build the output document
#[tracing::instrument(name = "assemble", level = "debug", skip_all)]
pub fn assemble(
    data: CollectedData,
    config: &CollectorConfig,
    tz: Tz,
    generated_at: DateTime<Utc>,
) -> WeatherDocument {
    let now_local = generated_at.with_timezone(&tz);

    let current = data
        .current
        .map(|c| enrich_current(c, config))
        .unwrap_or_default();

    let hourly = data
        .hourly
        .map(|full| {
            let start = hourly_start_index(&full.times, now_local.naive_local());
            let mut sliced = slice_hourly(&full, start, HOURLY_WINDOW);
            sliced.wet_bulb = wet_bulb::wet_bulb_series(&sliced.temperature, &sliced.humidity);
            sliced
        })
        .unwrap_or_default();

    let daily = data.daily.unwrap_or_default();

    let station_tendencies: Vec<(String, Option<f64>)> = data
        .stations
        .iter()
        .map(|obs| (obs.station.clone(), obs.tendency_hpa))
        .collect();

    let inputs = DerivedInputs {
        current: &current,
        hourly: &hourly,
        station_tendencies: &station_tendencies,
        buoy_tendency: data.buoy.pressure_tend_hpa,
        land_temp_f: data.pws.temperature,
        water_temp_f: data.buoy.water_temp_f,
        local_hour: now_local.hour(),
    };
    let mut derived = DerivedMetrics::compute(&inputs, &config.metrics);

    let wind_risk = derived::wind_risk::assess(&current, &hourly, &config.metrics.wind);
    derived.wind_peak_time = wind_risk
        .as_ref()
        .and_then(|risk| risk.gust.as_ref())
        .and_then(|gust| gust.peak_time.clone());

    let hyperlocal = Hyperlocal::from_temperatures(data.pws.temperature, current.temperature);

    let stations: BTreeMap<String, AsosObservation> = data
        .stations
        .into_iter()
        .map(|obs| (station_key(&obs.station), obs))
        .collect();
    let buoys = BTreeMap::from([(buoy_key(&config.stations.buoy_id), data.buoy)]);

    let sources = data.statuses.finalize(generated_at);
    let failed = sources.values().filter(|s| !s.is_ok()).count();
    tracing::info!(
        sources = sources.len(),
        failed,
        hourly_slots = hourly.len(),
        "Document assembled"
    );

    WeatherDocument {
        schema_version: SCHEMA_VERSION,
        generated_at,
        location: Location::new(
            config.site.name.clone(),
            config.site.latitude,
            config.site.longitude,
            generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        sources,
        alerts: data.alerts,
        current,
        hourly,
        daily,
        tides: data.tides.events,
        tide_curve: data.tides.curve,
        stations,
        buoys,
        frost_log: data.frost_log,
        nws_forecast: data.nws_forecast,
        pws: data.pws,
        derived,
        wind_risk,
        hyperlocal,
    }
}
