//! Typed simulation configuration and YAML loading.
//!
//! Every knob has a default matching the reference parameters (5-second
//! tick, 500-sample history, ±5 ms jitter), so an empty config file and a
//! missing one behave identically.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::simulator::{DEFAULT_HISTORY_CAP, DEFAULT_JITTER_MS};

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Optional node catalog override; the built-in catalog is used when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Cadence of the simulation tick (e.g. "5s").
    #[serde(with = "humantime_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,
    /// Number of history samples retained per edge.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Per-tick jitter amplitude in milliseconds.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: f64,
    /// One-time jitter amplitude applied when seeding initial edges.
    #[serde(default = "default_jitter_ms")]
    pub seed_jitter_ms: f64,
    /// RNG seed for reproducible simulations; entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Node catalog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a YAML file with `servers:` and `regions:` lists.
    pub path: String,
}

/// Peripheral connectivity sampler settings. Disabled by default; when
/// enabled it only ever produces a side-channel latency map and never
/// touches simulated state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Per-target connect timeout; targets exceeding it are abandoned.
    #[serde(with = "humantime_serde", default = "default_probe_timeout")]
    pub timeout: Duration,
    /// Fixed polling cadence between probe rounds (no backoff).
    #[serde(with = "humantime_serde", default = "default_probe_interval")]
    pub poll_interval: Duration,
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

fn default_jitter_ms() -> f64 {
    DEFAULT_JITTER_MS
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_probe_interval() -> Duration {
    Duration::from_secs(10)
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            history_cap: default_history_cap(),
            jitter_ms: default_jitter_ms(),
            seed_jitter_ms: default_jitter_ms(),
            seed: None,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: default_probe_timeout(),
            poll_interval: default_probe_interval(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid probe configuration: {0}")]
    InvalidProbe(String),
}

impl SimulationConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.tick_interval.is_zero() {
            return Err(ValidationError::InvalidGeneral(
                "tick_interval must be positive".to_string(),
            ));
        }
        if self.general.history_cap == 0 {
            return Err(ValidationError::InvalidGeneral(
                "history_cap must be at least 1".to_string(),
            ));
        }
        if self.general.jitter_ms < 0.0 || self.general.seed_jitter_ms < 0.0 {
            return Err(ValidationError::InvalidGeneral(
                "jitter amplitudes cannot be negative".to_string(),
            ));
        }
        if self.probe.enabled && self.probe.timeout.is_zero() {
            return Err(ValidationError::InvalidProbe(
                "timeout must be positive when the probe is enabled".to_string(),
            ));
        }
        if self.probe.enabled && self.probe.poll_interval.is_zero() {
            return Err(ValidationError::InvalidProbe(
                "poll_interval must be positive when the probe is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate configuration from a YAML file.
pub fn load_config(config_path: &Path) -> Result<SimulationConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)?;
    let config: SimulationConfig = serde_yaml::from_reader(file)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.general.tick_interval, Duration::from_secs(5));
        assert_eq!(config.general.history_cap, 500);
        assert_eq!(config.general.jitter_ms, 5.0);
        assert_eq!(config.general.seed_jitter_ms, 5.0);
        assert!(config.general.seed.is_none());
        assert!(!config.probe.enabled);
        assert_eq!(config.probe.timeout, Duration::from_secs(2));
        assert_eq!(config.probe.poll_interval, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
general:
  tick_interval: "2s"
  history_cap: 100
  jitter_ms: 3.5
  seed: 42
probe:
  enabled: true
  timeout: "1s"
  poll_interval: "30s"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.general.tick_interval, Duration::from_secs(2));
        assert_eq!(config.general.history_cap, 100);
        assert_eq!(config.general.jitter_ms, 3.5);
        assert_eq!(config.general.seed, Some(42));
        assert!(config.probe.enabled);
        assert_eq!(config.probe.timeout, Duration::from_secs(1));
        assert_eq!(config.probe.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "general:\n  seed: 7").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.general.seed, Some(7));
        assert_eq!(config.general.tick_interval, Duration::from_secs(5));
        assert_eq!(config.general.history_cap, 500);
    }

    #[test]
    fn test_validation_rejects_zero_tick_interval() {
        let mut config = SimulationConfig::default();
        config.general.tick_interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));
    }

    #[test]
    fn test_validation_rejects_zero_history_cap() {
        let mut config = SimulationConfig::default();
        config.general.history_cap = 0;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));
    }

    #[test]
    fn test_validation_rejects_zero_probe_timeout_when_enabled() {
        let mut config = SimulationConfig::default();
        config.probe.enabled = true;
        config.probe.timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidProbe(_))));

        // Zero timeout is fine while the probe is disabled
        config.probe.enabled = false;
        assert!(config.validate().is_ok());
    }
}
