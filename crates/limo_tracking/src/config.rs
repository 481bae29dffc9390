//! Tracking thresholds and intervals.
//!
//! Every radius and interval the engine uses lives here so deployments can
//! tune them from a JSON file without a rebuild.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tracking config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tracking config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tracking config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Fixes farther than this from the route polyline are not snapped.
    pub max_snap_distance_m: f64,
    pub emission_min_interval_ms: u64,
    pub emission_min_distance_m: f64,
    pub route_refresh_interval_ms: u64,
    /// Movement since the last route request that forces an early refresh.
    pub route_refresh_distance_m: f64,
    /// Assumed speed for the straight-line ETA when no route is available.
    pub fallback_speed_mps: f64,
    pub pickup_arrival_radius_m: f64,
    pub dropoff_arrival_radius_m: f64,
    /// Emissions stay suppressed this long after resuming from chat.
    pub chat_resume_cooldown_ms: u64,
    pub keep_alive_interval_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_snap_distance_m: 100.0,
            emission_min_interval_ms: 5_000,
            emission_min_distance_m: 10.0,
            route_refresh_interval_ms: 15_000,
            route_refresh_distance_m: 75.0,
            fallback_speed_mps: 11.11,
            pickup_arrival_radius_m: 100.0,
            dropoff_arrival_radius_m: 50.0,
            chat_resume_cooldown_ms: 60_000,
            keep_alive_interval_ms: 5_000,
        }
    }
}

impl TrackingConfig {
    /// Parse and validate. Missing keys take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: TrackingConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            ("max_snap_distance_m", self.max_snap_distance_m),
            ("emission_min_distance_m", self.emission_min_distance_m),
            ("route_refresh_distance_m", self.route_refresh_distance_m),
            ("fallback_speed_mps", self.fallback_speed_mps),
            ("pickup_arrival_radius_m", self.pickup_arrival_radius_m),
            ("dropoff_arrival_radius_m", self.dropoff_arrival_radius_m),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        // tokio intervals panic on a zero period.
        let periods = [
            ("route_refresh_interval_ms", self.route_refresh_interval_ms),
            ("keep_alive_interval_ms", self.keep_alive_interval_ms),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Never zero, even for a config that skipped [`TrackingConfig::validate`].
    pub fn route_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.route_refresh_interval_ms.max(1))
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_millis(self.keep_alive_interval_ms.max(1))
    }

    pub fn chat_resume_cooldown(&self) -> Duration {
        Duration::from_millis(self.chat_resume_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TrackingConfig::from_json_str(r#"{"max_snap_distance_m": 60.0}"#)
            .expect("config");
        assert_eq!(config.max_snap_distance_m, 60.0);
        assert_eq!(config.keep_alive_interval_ms, 5_000);
        assert_eq!(config.chat_resume_cooldown(), Duration::from_secs(60));
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = TrackingConfig::from_json_str(r#"{"keep_alive_interval_ms": 0}"#)
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let config = TrackingConfig {
            dropoff_arrival_radius_m: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"route_refresh_interval_ms": 30000}}"#).expect("write");
        let config = TrackingConfig::from_json_file(file.path()).expect("config");
        assert_eq!(config.route_refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TrackingConfig::from_json_file("/nonexistent/tracking.json").expect_err("io");
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = TrackingConfig::from_json_str("{not json").expect_err("parse");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
