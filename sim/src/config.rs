//! Simulation configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SimError};

pub const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

/// Fixed completion surcharge for an assignment over the CPU threshold (ms)
pub const DEFAULT_PENALTY_MS: f64 = 20.0;

/// Response time above which a request may be abandoned (ms)
pub const DEFAULT_RESPONSE_TIME_THRESHOLD_MS: f64 = 500.0;

pub const DEFAULT_CANCELLATION_PROBABILITY: f64 = 0.20;

/// Engine variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Delay, penalty and idle statistics only
    Basic,
    /// Adds the abandonment statistic
    #[default]
    Extended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Concurrent workers (CW)
    pub workers: usize,
    /// Aggregate CPU demand above which assignments are penalized (TMCPU, MIPS)
    pub cpu_threshold_mips: f64,
    /// Simulation end time (TF, hours)
    pub horizon_hours: f64,
    pub variant: Variant,
    pub penalty_ms: f64,
    pub response_time_threshold_ms: f64,
    pub cancellation_probability: f64,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            cpu_threshold_mips: 100.0,
            horizon_hours: 1.0,
            variant: Variant::default(),
            penalty_ms: DEFAULT_PENALTY_MS,
            response_time_threshold_ms: DEFAULT_RESPONSE_TIME_THRESHOLD_MS,
            cancellation_probability: DEFAULT_CANCELLATION_PROBABILITY,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn new(workers: usize, cpu_threshold_mips: f64, horizon_hours: f64) -> Self {
        Self {
            workers,
            cpu_threshold_mips,
            horizon_hours,
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn horizon_ms(&self) -> f64 {
        self.horizon_hours * MS_PER_HOUR
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SimError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        non_negative("cpu threshold", self.cpu_threshold_mips)?;
        non_negative("horizon", self.horizon_hours)?;
        non_negative("penalty", self.penalty_ms)?;
        non_negative("response time threshold", self.response_time_threshold_ms)?;
        if !(0.0..=1.0).contains(&self.cancellation_probability) {
            return Err(SimError::InvalidConfig(format!(
                "cancellation probability must be in [0, 1], got {}",
                self.cancellation_probability
            )));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "{name} must be a finite non-negative number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_conversion() {
        let config = SimConfig::new(4, 200.0, 2.0);
        assert_eq!(config.horizon_ms(), 7_200_000.0);
    }

    #[test]
    fn test_validate() {
        assert!(SimConfig::new(1, 0.0, 0.5).validate().is_ok());
        assert!(matches!(
            SimConfig::new(0, 100.0, 1.0).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(SimConfig::new(1, -1.0, 1.0).validate().is_err());
        assert!(SimConfig::new(1, 100.0, f64::NAN).validate().is_err());

        let mut config = SimConfig::new(2, 100.0, 1.0);
        config.cancellation_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"workers": 8, "cpu_threshold_mips": 350.0, "variant": "basic"}"#)
                .unwrap();

        assert_eq!(config.workers, 8);
        assert_eq!(config.variant, Variant::Basic);
        assert_eq!(config.horizon_hours, 1.0);
        assert_eq!(config.penalty_ms, DEFAULT_PENALTY_MS);
        assert_eq!(config.seed, None);
    }
}
