use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable read by [`StoreConfig::from_env`]
pub const SWEEP_INTERVAL_ENV: &str = "LAPSE_SWEEP_INTERVAL";

/// Default time between two reaper sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the store's background reaper
///
/// # Example
///
/// ```rust
/// use lapse_core::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_sweep_interval(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Interval between reaper sweeps (default: 1 second)
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweep interval
    ///
    /// This determines how often the reaper removes expired entries that no
    /// caller has read. It does not affect correctness: reads always hide
    /// expired entries.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Builds a configuration from the process environment.
    ///
    /// `LAPSE_SWEEP_INTERVAL` accepts humantime durations such as `500ms` or
    /// `2s`. Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(SWEEP_INTERVAL_ENV) {
            let interval = humantime::parse_duration(raw.trim()).map_err(|source| {
                ConfigError::InvalidDuration {
                    var: SWEEP_INTERVAL_ENV,
                    value: raw.clone(),
                    source,
                }
            })?;
            config = config.with_sweep_interval(interval);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration can drive a reaper
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}
