//! Upstream weather providers
//!
//! Each provider module holds pure parse functions over response bodies.
//! [`HttpSources`] wires them to a retrying HTTP client; the collector only
//! sees the [`WeatherSources`] trait, so runs can be driven by fakes.

pub mod asos;
pub mod buoy;
pub mod nws;
pub mod open_meteo;
pub mod pws;
pub mod tides;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::{StatusCode, Url, header};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info};

use crate::config::{CollectorConfig, HttpConfig, SiteConfig, StationsConfig};
use crate::error::{CollectorError, SourceError};
use crate::models::{
    Alert, AsosObservation, BuoyObservation, Coordinates, PwsReading, TextForecast, TideData,
};

pub use open_meteo::{ForecastQuery, ForecastResponse, ForecastSection};
pub use tides::TideInterval;

/// Everything a collector run fetches
#[async_trait]
pub trait WeatherSources: Send + Sync {
    /// One forecast-model request
    async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, SourceError>;

    /// Tide events and curve starting at `today`
    async fn tides(&self, today: NaiveDate) -> Result<TideData, SourceError>;

    /// Personal weather station temperature
    async fn pws(&self) -> Result<PwsReading, SourceError>;

    /// Latest observation of one ASOS station
    async fn asos(&self, station: &str) -> Result<AsosObservation, SourceError>;

    /// Latest buoy observation
    async fn buoy(&self) -> Result<BuoyObservation, SourceError>;

    async fn nws_forecast(&self) -> Result<TextForecast, SourceError>;

    async fn nws_alerts(&self) -> Result<Vec<Alert>, SourceError>;
}

/// Live providers over HTTP
pub struct HttpSources {
    client: ClientWithMiddleware,
    site: SiteConfig,
    stations: StationsConfig,
    http: HttpConfig,
    tz: Tz,
}

impl HttpSources {
    /// Build the shared client with timeout, user agent and transient-error retries
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| CollectorError::client(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.http.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            site: config.site.clone(),
            stations: config.stations.clone(),
            http: config.http.clone(),
            tz: config.site.tz()?,
        })
    }

    /// Status and body of a GET, whatever the status
    async fn fetch_raw(
        &self,
        url: Url,
        user_agent: Option<&str>,
    ) -> Result<(StatusCode, String), SourceError> {
        debug!(%url, "GET");
        let mut request = self.client.get(url);
        if let Some(agent) = user_agent {
            request = request.header(header::USER_AGENT, agent);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok((status, body))
    }

    /// Body of a successful GET; any other status is an HTTP failure
    async fn fetch_body(&self, url: Url) -> Result<String, SourceError> {
        let (status, body) = self.fetch_raw(url, None).await?;
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }
        Ok(body)
    }

    fn point(&self) -> String {
        Coordinates {
            lat: self.site.latitude,
            lon: self.site.longitude,
        }
        .to_string()
    }
}

fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url, SourceError> {
    let url = if params.is_empty() {
        Url::parse(base)
    } else {
        Url::parse_with_params(base, params)
    };
    url.map_err(|e| SourceError::Parse(format!("Invalid URL '{base}': {e}")))
}

#[async_trait]
impl WeatherSources for HttpSources {
    #[tracing::instrument(
        name = "fetch_forecast",
        level = "debug",
        skip(self),
        fields(label = query.label)
    )]
    async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, SourceError> {
        info!("Fetching {}", query.label);
        let params = query.params(self.site.latitude, self.site.longitude, &self.site.timezone);
        let url = build_url(&self.http.open_meteo_url, &params)?;
        let (status, body) = self.fetch_raw(url, None).await?;
        open_meteo::parse_response(status.as_u16(), &body)
    }

    #[tracing::instrument(name = "fetch_tides", level = "debug", skip(self))]
    async fn tides(&self, today: NaiveDate) -> Result<TideData, SourceError> {
        info!("Fetching tides for station {}", self.stations.tide_station);
        let station = &self.stations.tide_station;

        let hilo = tides::query_params(station, today, TideInterval::HighLow);
        let hilo_url = build_url(&self.http.tides_url, &hilo)?;
        let events = tides::parse_events(&self.fetch_body(hilo_url).await?)?;

        let six = tides::query_params(station, today, TideInterval::SixMinute);
        let six_url = build_url(&self.http.tides_url, &six)?;
        let curve = tides::parse_curve(&self.fetch_body(six_url).await?)?;

        info!("Tides: {} events, {} curve points", events.len(), curve.times.len());
        Ok(TideData { events, curve })
    }

    #[tracing::instrument(name = "fetch_pws", level = "debug", skip(self))]
    async fn pws(&self) -> Result<PwsReading, SourceError> {
        info!("Fetching PWS {}", self.stations.pws_id);
        let url = build_url(&self.stations.pws_url, &[])?;
        let (status, html) = self
            .fetch_raw(url, Some(&self.http.scrape_user_agent))
            .await?;
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }

        let updated = Utc::now().with_timezone(&self.tz).to_rfc3339();
        pws::parse_reading(&html, &self.stations.pws_id, &self.stations.pws_name, updated)
    }

    #[tracing::instrument(name = "fetch_asos", level = "debug", skip(self))]
    async fn asos(&self, station: &str) -> Result<AsosObservation, SourceError> {
        info!("Fetching {} observation", station);
        let url = build_url(
            &format!("{}/stations/{station}/observations/latest", self.http.nws_url),
            &[],
        )?;
        asos::parse_observation(station, &self.fetch_body(url).await?)
    }

    #[tracing::instrument(name = "fetch_buoy", level = "debug", skip(self))]
    async fn buoy(&self) -> Result<BuoyObservation, SourceError> {
        info!("Fetching buoy {}", self.stations.buoy_id);
        let url = build_url(
            &format!("{}/{}.txt", self.http.ndbc_url, self.stations.buoy_id),
            &[],
        )?;
        buoy::parse_latest(&self.fetch_body(url).await?)
    }

    #[tracing::instrument(name = "fetch_nws_forecast", level = "debug", skip(self))]
    async fn nws_forecast(&self) -> Result<TextForecast, SourceError> {
        info!("Fetching NWS text forecast");
        let points = build_url(&format!("{}/points/{}", self.http.nws_url, self.point()), &[])?;
        let point = nws::parse_point(&self.fetch_body(points).await?)?;

        let forecast = build_url(&point.forecast_url, &[])?;
        let periods = nws::parse_forecast(&self.fetch_body(forecast).await?)?;
        info!("NWS forecast: {} periods ({})", periods.len(), point.office);

        Ok(TextForecast {
            periods,
            office: point.office,
            grid: point.grid,
        })
    }

    #[tracing::instrument(name = "fetch_nws_alerts", level = "debug", skip(self))]
    async fn nws_alerts(&self) -> Result<Vec<Alert>, SourceError> {
        info!("Fetching NWS alerts");
        let params = [("point", self.point()), ("status", "actual".to_string())];
        let url = build_url(&format!("{}/alerts/active", self.http.nws_url), &params)?;
        nws::parse_alerts(&self.fetch_body(url).await?, &self.stations.alert_link)
    }
}
