//! Application configuration.
//!
//! Session parameters are named constants; each one can be overridden from
//! the config file or the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PunchError, PunchResult};

/// Length of one sampling session.
pub const SESSION_DURATION_MS: u64 = 3000;

/// Peak acceleration magnitude (m/s²) treated as 100% of the reference punch.
pub const REFERENCE_PUNCH_SPEED: f64 = 15.12;

/// Lower reference for weaker sensors or gentler training.
pub const ALTERNATE_REFERENCE_PUNCH_SPEED: f64 = 5.12;

/// Magnitudes at or below this value are treated as sensor noise.
pub const DEBOUNCE_EPSILON: f64 = 0.1;

/// Sensor interval for responsive progress feedback (~60 Hz).
pub const FAST_SAMPLE_INTERVAL_MS: u64 = 16;

/// Sensor interval for low-power sampling (10 Hz).
pub const STANDARD_SAMPLE_INTERVAL_MS: u64 = 100;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default sampling session parameters.
    pub session: SessionDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default sampling session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    /// Session length in milliseconds.
    pub duration_ms: u64,

    /// Reference speed used as the 100% benchmark.
    pub reference_speed: f64,

    /// Debounce threshold for sensor noise.
    pub debounce_epsilon: f64,

    /// Requested sensor update interval in milliseconds (best effort).
    pub sample_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "punchmeter=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            duration_ms: SESSION_DURATION_MS,
            reference_speed: REFERENCE_PUNCH_SPEED,
            debounce_epsilon: DEBOUNCE_EPSILON,
            sample_interval_ms: FAST_SAMPLE_INTERVAL_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl SessionDefaults {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> PunchResult<()> {
        validate_session_parameters(
            self.reference_speed,
            self.debounce_epsilon,
            self.duration(),
            self.sample_interval(),
        )
    }
}

/// Reject session parameters the session cannot run with.
pub fn validate_session_parameters(
    reference_speed: f64,
    debounce_epsilon: f64,
    duration: Duration,
    sample_interval: Duration,
) -> PunchResult<()> {
    if !reference_speed.is_finite() || reference_speed <= 0.0 {
        return Err(PunchError::config(format!(
            "reference speed must be a positive number, got {reference_speed}"
        )));
    }
    if !debounce_epsilon.is_finite() || debounce_epsilon < 0.0 {
        return Err(PunchError::config(format!(
            "debounce epsilon must be non-negative, got {debounce_epsilon}"
        )));
    }
    if duration.is_zero() {
        return Err(PunchError::config("session duration must be non-zero"));
    }
    if sample_interval.is_zero() {
        return Err(PunchError::config("sample interval must be non-zero"));
    }
    Ok(())
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults when the file is
    /// missing, unreadable or invalid.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                    Ok(config) => match config.session.validate() {
                        Ok(()) => return config,
                        Err(e) => {
                            tracing::warn!("Ignoring invalid config at {:?}: {}", config_path, e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("punchmeter").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_named_constants() {
        let defaults = SessionDefaults::default();
        assert_eq!(defaults.duration(), Duration::from_millis(3000));
        assert_eq!(defaults.reference_speed, REFERENCE_PUNCH_SPEED);
        assert_eq!(defaults.debounce_epsilon, 0.1);
        assert_eq!(defaults.sample_interval(), Duration::from_millis(16));
        assert!(defaults.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let mut defaults = SessionDefaults {
            reference_speed: 0.0,
            ..SessionDefaults::default()
        };
        assert!(matches!(
            defaults.validate(),
            Err(PunchError::Config { .. })
        ));

        defaults.reference_speed = ALTERNATE_REFERENCE_PUNCH_SPEED;
        defaults.debounce_epsilon = f64::NAN;
        assert!(defaults.validate().is_err());

        defaults.debounce_epsilon = 0.0;
        assert!(defaults.validate().is_ok());

        defaults.duration_ms = 0;
        assert!(defaults.validate().is_err());
    }

    #[test]
    fn shared_validation_checks_every_parameter() {
        let ok = |reference, epsilon, duration_ms, interval_ms| {
            validate_session_parameters(
                reference,
                epsilon,
                Duration::from_millis(duration_ms),
                Duration::from_millis(interval_ms),
            )
            .is_ok()
        };
        assert!(ok(15.12, 0.1, 3000, 16));
        assert!(!ok(f64::INFINITY, 0.1, 3000, 16));
        assert!(!ok(15.12, -0.1, 3000, 16));
        assert!(!ok(15.12, 0.1, 0, 16));
        assert!(!ok(15.12, 0.1, 3000, 0));
    }

    #[test]
    fn partial_session_section_fills_in_defaults() {
        let json = r#"{
            "session": { "reference_speed": 5.12 },
            "logging": { "level": "debug" }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.session.reference_speed, 5.12);
        assert_eq!(config.session.duration_ms, SESSION_DURATION_MS);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn load_falls_back_on_invalid_file() {
        let dir = std::env::temp_dir().join("punchmeter_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.session.sample_interval_ms = STANDARD_SAMPLE_INTERVAL_MS;
        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.session.sample_interval_ms, 100);

        std::fs::write(&path, r#"{"session": {"reference_speed": -1.0}, "logging": {"level": "info", "json": false, "file": null}}"#).unwrap();
        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.session, SessionDefaults::default());

        std::fs::remove_dir_all(&dir).ok();
    }
}
