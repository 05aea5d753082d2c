//! Derived Metrics Engine
//!
//! Pure functions over the fused current/hourly arrays and the cached
//! station readings. Every indicator is computed independently and is left
//! out of the result when its inputs are missing. All thresholds come from
//! an injected [`MetricsConfig`].

pub mod fog;
pub mod pressure;
pub mod scan;
pub mod sea_breeze;
pub mod upper_air;
pub mod wet_bulb;
pub mod wind_risk;

use serde::{Deserialize, Serialize};

use crate::frost::FrostThresholds;
use crate::history::TendencyBands;
use crate::models::{CurrentConditions, HourlyBlock};

pub use fog::{FogCriteria, FogLabel, FogOutlook};
pub use pressure::{AlarmDirection, PressureAlarm, PressureTrend};
pub use sea_breeze::{BreezeInputs, BreezeLabel, SeaBreeze, SeaBreezeConfig};
pub use upper_air::{
    ColumnOutlook, ColumnPrecip, ColumnThresholds, TroughConfig, TroughOutlook, TroughSignal,
};
pub use wet_bulb::{PrecipBands, PrecipType};
pub use wind_risk::{
    ExposureSector, ExposureTable, WindComponent, WindRisk, WindRiskConfig, WorryLevel,
    WorryThresholds,
};

/// Confidence attached to a categorical indicator
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Moderate,
    Low,
}

/// Every tunable threshold of the engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct MetricsConfig {
    pub tendency: TendencyBands,
    /// Tendency magnitude in hPa that raises the pressure alarm
    pub pressure_alarm_hpa: Option<f64>,
    pub precip: PrecipBands,
    pub fog: FogCriteria,
    pub column: ColumnThresholds,
    pub trough: TroughConfig,
    pub sea_breeze: SeaBreezeConfig,
    pub wind: WindRiskConfig,
    pub frost: FrostThresholds,
}

impl MetricsConfig {
    /// Alarm threshold, defaulting to the fast tendency band
    #[must_use]
    pub fn alarm_threshold(&self) -> f64 {
        self.pressure_alarm_hpa.unwrap_or(self.tendency.fast)
    }
}

/// Everything the engine reads
#[derive(Debug, Clone, Copy)]
pub struct DerivedInputs<'a> {
    pub current: &'a CurrentConditions,
    pub hourly: &'a HourlyBlock,
    /// ASOS `(station id, tendency)` pairs in priority order
    pub station_tendencies: &'a [(String, Option<f64>)],
    /// Provider-computed buoy pressure tendency
    pub buoy_tendency: Option<f64>,
    /// Personal station air temperature
    pub land_temp_f: Option<f64>,
    pub water_temp_f: Option<f64>,
    /// Site-local hour of day
    pub local_hour: u32,
}

/// Independently computed indicators; absent groups are omitted when serialized
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct DerivedMetrics {
    #[serde(flatten)]
    pub pressure_trend: Option<PressureTrend>,
    #[serde(flatten)]
    pub fog: Option<FogOutlook>,
    #[serde(flatten)]
    pub column: Option<ColumnOutlook>,
    #[serde(flatten)]
    pub trough: Option<TroughOutlook>,
    #[serde(flatten)]
    pub sea_breeze: Option<SeaBreeze>,
    #[serde(flatten)]
    pub pressure_alarm: Option<PressureAlarm>,
    /// Time of the peak gust in the wind-risk window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_peak_time: Option<String>,
}

impl DerivedMetrics {
    /// Run every indicator over `inputs`
    #[must_use]
    pub fn compute(inputs: &DerivedInputs<'_>, config: &MetricsConfig) -> Self {
        let hourly = inputs.hourly;

        let pressure_trend = pressure::model_trend(&hourly.pressure, &config.tendency);
        let model_tendency = pressure_trend.as_ref().map(|t| t.pressure_trend_hpa_3h);

        let candidates = inputs
            .station_tendencies
            .iter()
            .map(|(station, tendency)| (station.as_str(), *tendency))
            .chain([
                (pressure::BUOY_SOURCE, inputs.buoy_tendency),
                (pressure::MODEL_SOURCE, model_tendency),
            ]);
        let pressure_alarm = pressure::best_alarm(candidates, config.alarm_threshold());

        let column = upper_air::classify_column(
            hourly.temp_850hpa.first().copied().flatten(),
            inputs.current.wet_bulb,
            &config.column,
        );

        let sea_breeze = sea_breeze::detect(
            &BreezeInputs {
                land_temp_f: inputs.land_temp_f,
                water_temp_f: inputs.water_temp_f,
                wind_mph: inputs.current.wind_speed,
                wind_dir_deg: inputs.current.wind_direction,
                local_hour: inputs.local_hour,
            },
            &config.sea_breeze,
        );

        let metrics = Self {
            pressure_trend,
            fog: fog::fog_outlook(hourly, &config.fog),
            column,
            trough: upper_air::trough_signal(&hourly.height_850hpa, &config.trough),
            sea_breeze,
            pressure_alarm,
            wind_peak_time: None,
        };
        tracing::debug!(?metrics, "derived metrics");
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly() -> HourlyBlock {
        let n = 12;
        HourlyBlock {
            times: (0..n).map(|i| format!("2024-01-10T{i:02}:00")).collect(),
            temperature: vec![Some(34.0); n],
            dew_point: vec![Some(33.0); n],
            humidity: vec![Some(96.0); n],
            wind_speed: vec![Some(3.0); n],
            pressure: vec![Some(1012.0), Some(1011.5), Some(1010.9), Some(1010.0)],
            temp_850hpa: vec![Some(30.0)],
            height_850hpa: (0..7).map(|i| Some(1500.0 - 6.0 * f64::from(i))).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_computation() {
        let current = CurrentConditions {
            wet_bulb: Some(31.0),
            wind_speed: Some(3.0),
            wind_direction: Some(90.0),
            ..Default::default()
        };
        let hourly = hourly();
        let stations = vec![("KBOS".to_string(), None), ("KBVY".to_string(), Some(-3.5))];
        let inputs = DerivedInputs {
            current: &current,
            hourly: &hourly,
            station_tendencies: &stations,
            buoy_tendency: Some(-1.0),
            land_temp_f: Some(30.0),
            water_temp_f: Some(40.0),
            local_hour: 2,
        };
        let metrics = DerivedMetrics::compute(&inputs, &MetricsConfig::default());

        let trend = metrics.pressure_trend.as_ref().unwrap();
        assert_eq!(trend.pressure_trend_hpa_3h, -2.0);
        assert_eq!(metrics.fog.as_ref().unwrap().fog_label, FogLabel::Likely);
        assert_eq!(metrics.column.as_ref().unwrap().col_precip_type, ColumnPrecip::SnowLikely);
        assert_eq!(metrics.trough.as_ref().unwrap().trough_signal, TroughSignal::Approaching);
        assert_eq!(metrics.sea_breeze.as_ref().unwrap().sea_breeze_label, BreezeLabel::LandBreeze);

        let alarm = metrics.pressure_alarm.as_ref().unwrap();
        assert_eq!(alarm.best_pressure_tend_src, "KBVY");
        assert_eq!(alarm.pressure_alarm, Some(AlarmDirection::Falling));
    }

    #[test]
    fn test_flattened_keys() {
        let current = CurrentConditions::default();
        let hourly = hourly();
        let inputs = DerivedInputs {
            current: &current,
            hourly: &hourly,
            station_tendencies: &[],
            buoy_tendency: None,
            land_temp_f: None,
            water_temp_f: None,
            local_hour: 12,
        };
        let mut metrics = DerivedMetrics::compute(&inputs, &MetricsConfig::default());
        metrics.wind_peak_time = Some("2024-01-10T03:00".into());
        let value = serde_json::to_value(&metrics).unwrap();

        assert_eq!(value["pressure_trend"], "Falling");
        assert_eq!(value["fog_label"], "Likely");
        assert_eq!(value["col_precip_type"], "Mixed");
        assert_eq!(value["height_850hpa_tend_6h"], -36.0);
        assert_eq!(value["best_pressure_tend_src"], "model");
        assert!(value["pressure_alarm"].is_null());
        assert_eq!(value["wind_peak_time"], "2024-01-10T03:00");
        assert!(value.get("sea_breeze_label").is_none());
    }

    #[test]
    fn test_empty_inputs_produce_nothing() {
        let current = CurrentConditions::default();
        let hourly = HourlyBlock::default();
        let inputs = DerivedInputs {
            current: &current,
            hourly: &hourly,
            station_tendencies: &[],
            buoy_tendency: None,
            land_temp_f: None,
            water_temp_f: None,
            local_hour: 12,
        };
        let metrics = DerivedMetrics::compute(&inputs, &MetricsConfig::default());
        assert_eq!(metrics, DerivedMetrics::default());
        assert_eq!(serde_json::to_value(&metrics).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_config_defaults_and_partial_override() {
        let config: MetricsConfig =
            serde_json::from_str(r#"{"fog": {"window_hours": 6}}"#).unwrap();
        assert_eq!(config.fog.window_hours, 6);
        assert_eq!(config.fog.min_humidity_pct, 93.0);
        assert_eq!(config.alarm_threshold(), 3.0);
        assert_eq!(config.wind.exposure, ExposureTable::default());
    }
}
