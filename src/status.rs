//! Per-source health tracking
//!
//! Every upstream source produces exactly one [`SourceStatus`] per run. The
//! status is stamped with the time the fetch was attempted; its age is only
//! known once the document's `generated_at` is fixed, so the tracker fills
//! `age_minutes` in a final pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::units::round_to;

/// Outcome of a source fetch
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Ok,
    Error,
}

/// Health record for one upstream source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourceStatus {
    pub status: SourceState,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
    /// Machine-readable failure class, see [`SourceError::kind`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Minutes between `updated_at` and document generation
    pub age_minutes: Option<f64>,
    /// Forecast model that answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Issuing forecast office
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    /// Forecast grid cell, `x,y`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
}

impl SourceStatus {
    /// Successful fetch at `updated_at`
    #[must_use]
    pub fn ok(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: SourceState::Ok,
            updated_at,
            error: None,
            error_kind: None,
            age_minutes: None,
            model: None,
            office: None,
            grid: None,
        }
    }

    /// Failed fetch at `updated_at`
    #[must_use]
    pub fn failed(updated_at: DateTime<Utc>, err: &SourceError) -> Self {
        Self {
            status: SourceState::Error,
            error: Some(err.to_string()),
            error_kind: Some(err.kind().to_string()),
            ..Self::ok(updated_at)
        }
    }

    /// Build a status from a typed fetch outcome
    #[must_use]
    pub fn from_result<T>(updated_at: DateTime<Utc>, result: &Result<T, SourceError>) -> Self {
        match result {
            Ok(_) => Self::ok(updated_at),
            Err(err) => Self::failed(updated_at, err),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_office(mut self, office: impl Into<String>, grid: impl Into<String>) -> Self {
        self.office = Some(office.into());
        self.grid = Some(grid.into());
        self
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == SourceState::Ok
    }

    /// Fill `age_minutes` relative to `generated_at`, one decimal place
    pub fn stamp_age(&mut self, generated_at: DateTime<Utc>) {
        let millis = (generated_at - self.updated_at).num_milliseconds();
        self.age_minutes = Some(round_to(millis as f64 / 60_000.0, 1));
    }
}

/// Collects the status of every source during a run
#[derive(Debug, Default, Clone)]
pub struct SourceStatusTracker {
    statuses: BTreeMap<String, SourceStatus>,
}

impl SourceStatusTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the status of `source`
    pub fn record(&mut self, source: impl Into<String>, status: SourceStatus) {
        let source = source.into();
        if status.is_ok() {
            tracing::info!(source = %source, "source ok");
        } else {
            tracing::warn!(
                source = %source,
                error = status.error.as_deref().unwrap_or_default(),
                "source failed"
            );
        }
        self.statuses.insert(source, status);
    }

    #[must_use]
    pub fn get(&self, source: &str) -> Option<&SourceStatus> {
        self.statuses.get(source)
    }

    /// Number of sources that failed this run
    #[must_use]
    pub fn failures(&self) -> usize {
        self.statuses.values().filter(|s| !s.is_ok()).count()
    }

    /// Stamp ages against the document time and hand out the map
    #[must_use]
    pub fn finalize(mut self, generated_at: DateTime<Utc>) -> BTreeMap<String, SourceStatus> {
        for status in self.statuses.values_mut() {
            status.stamp_age(generated_at);
        }
        self.statuses
    }
}
