//! Random arrival and service-time generation.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SimulationConfig, UnitRange};

/// Draws inter-arrival gaps and service durations uniformly from the
/// configured unit ranges, at whole-unit resolution.
#[derive(Debug, Clone)]
pub struct ArrivalSampler {
    rng: StdRng,
    arrival_interval: UnitRange,
    service_time: UnitRange,
    time_unit_ms: u64,
}

impl ArrivalSampler {
    /// Sampler for `config`, seeded from `config.seed` or OS entropy.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng,
            arrival_interval: config.arrival_interval,
            service_time: config.service_time,
            time_unit_ms: config.time_unit_ms,
        }
    }

    /// Gap to wait before the next arrival.
    pub fn next_inter_arrival(&mut self) -> Duration {
        let range = self.arrival_interval;
        self.draw(range)
    }

    /// Service duration for a new item.
    pub fn next_service_duration(&mut self) -> Duration {
        let range = self.service_time;
        self.draw(range)
    }

    fn draw(&mut self, range: UnitRange) -> Duration {
        let units = if range.min < range.max {
            self.rng.random_range(range.min..range.max)
        } else {
            range.min
        };
        Duration::from_millis(units.saturating_mul(self.time_unit_ms))
    }
}
