//! Simulation configuration.
//!
//! All timing knobs are expressed in abstract units; `time_unit_ms` fixes how
//! long one unit lasts (one second by default). Tests shrink the unit to run
//! the same timeline in milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Half-open range `[min, max)` of time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRange {
    /// Inclusive lower bound.
    pub min: u64,
    /// Exclusive upper bound.
    pub max: u64,
}

impl UnitRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Validate that the range is non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.min >= self.max {
            return Err(format!(
                "range [{}, {}) is empty; min must be below max",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

const fn default_time_unit_ms() -> u64 {
    1000
}

const fn default_run_duration_units() -> u64 {
    120
}

const fn default_arrival_interval() -> UnitRange {
    UnitRange::new(5, 11)
}

const fn default_service_time() -> UnitRange {
    UnitRange::new(10, 21)
}

const fn default_retry_backoff_units() -> u64 {
    10
}

/// Parameters of one simulation run. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of servers.
    pub server_count: usize,
    /// Queue capacity of every server.
    pub max_queue_size: usize,
    /// Length of one time unit in milliseconds.
    #[serde(default = "default_time_unit_ms")]
    pub time_unit_ms: u64,
    /// Wall-clock length of the arrival loop, in units.
    #[serde(default = "default_run_duration_units")]
    pub run_duration_units: u64,
    /// Inter-arrival gap range, in units.
    #[serde(default = "default_arrival_interval")]
    pub arrival_interval: UnitRange,
    /// Service duration range, in units.
    #[serde(default = "default_service_time")]
    pub service_time: UnitRange,
    /// Wait before the single admission retry, in units.
    #[serde(default = "default_retry_backoff_units")]
    pub retry_backoff_units: u64,
    /// Seed for reproducible arrivals; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Configuration with `server_count` servers of capacity `max_queue_size`
    /// and the default timeline.
    #[must_use]
    pub const fn new(server_count: usize, max_queue_size: usize) -> Self {
        Self {
            server_count,
            max_queue_size,
            time_unit_ms: default_time_unit_ms(),
            run_duration_units: default_run_duration_units(),
            arrival_interval: default_arrival_interval(),
            service_time: default_service_time(),
            retry_backoff_units: default_retry_backoff_units(),
            seed: None,
        }
    }

    /// Set the unit length in milliseconds.
    #[must_use]
    pub const fn with_time_unit_ms(mut self, time_unit_ms: u64) -> Self {
        self.time_unit_ms = time_unit_ms;
        self
    }

    /// Set the run length in units.
    #[must_use]
    pub const fn with_run_duration_units(mut self, units: u64) -> Self {
        self.run_duration_units = units;
        self
    }

    /// Set the inter-arrival range in units.
    #[must_use]
    pub const fn with_arrival_interval(mut self, min: u64, max: u64) -> Self {
        self.arrival_interval = UnitRange::new(min, max);
        self
    }

    /// Set the service-time range in units.
    #[must_use]
    pub const fn with_service_time(mut self, min: u64, max: u64) -> Self {
        self.service_time = UnitRange::new(min, max);
        self
    }

    /// Set the retry backoff in units.
    #[must_use]
    pub const fn with_retry_backoff_units(mut self, units: u64) -> Self {
        self.retry_backoff_units = units;
        self
    }

    /// Fix the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Convert a unit count to wall-clock time.
    #[must_use]
    pub const fn units(&self, count: u64) -> Duration {
        Duration::from_millis(self.time_unit_ms.saturating_mul(count))
    }

    /// Length of the arrival loop.
    #[must_use]
    pub const fn run_duration(&self) -> Duration {
        self.units(self.run_duration_units)
    }

    /// Wait before the admission retry.
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        self.units(self.retry_backoff_units)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.server_count == 0 {
            return Err("server_count must be greater than 0".into());
        }
        if self.max_queue_size == 0 {
            return Err("max_queue_size must be greater than 0".into());
        }
        if self.time_unit_ms == 0 {
            return Err("time_unit_ms must be greater than 0".into());
        }
        if self.run_duration_units == 0 {
            return Err("run_duration_units must be greater than 0".into());
        }
        self.arrival_interval
            .validate()
            .map_err(|e| format!("arrival_interval invalid: {e}"))?;
        self.service_time
            .validate()
            .map_err(|e| format!("service_time invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `SIM_*` environment variables, reading a
    /// `.env` file first when one is present.
    ///
    /// `SIM_SERVERS` and `SIM_MAX_QUEUE` are required; the rest fall back to
    /// the defaults.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup using the `SIM_*`
    /// variable names, then validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, String> {
            lookup(key).ok_or_else(|| format!("{key} is not set"))
        };

        let mut cfg = Self::new(
            parse_var("SIM_SERVERS", &required("SIM_SERVERS")?)?,
            parse_var("SIM_MAX_QUEUE", &required("SIM_MAX_QUEUE")?)?,
        );

        let optional = |key: &str, target: &mut u64| -> Result<(), String> {
            if let Some(raw) = lookup(key) {
                *target = parse_var(key, &raw)?;
            }
            Ok(())
        };
        optional("SIM_TIME_UNIT_MS", &mut cfg.time_unit_ms)?;
        optional("SIM_RUN_UNITS", &mut cfg.run_duration_units)?;
        optional("SIM_ARRIVAL_MIN", &mut cfg.arrival_interval.min)?;
        optional("SIM_ARRIVAL_MAX", &mut cfg.arrival_interval.max)?;
        optional("SIM_SERVICE_MIN", &mut cfg.service_time.min)?;
        optional("SIM_SERVICE_MAX", &mut cfg.service_time.max)?;
        optional("SIM_RETRY_UNITS", &mut cfg.retry_backoff_units)?;
        if let Some(raw) = lookup("SIM_SEED") {
            cfg.seed = Some(parse_var("SIM_SEED", &raw)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("{key}={raw:?} is not a valid number: {e}"))
}
