//! Classification ledger and run-level aggregates.

use std::time::{Duration, Instant};

use crate::core::work_item::{Classification, WorkItem};

/// Items seen by the dispatcher over one run, bucketed by outcome.
///
/// Owned by the dispatcher's thread; reporting reads it through slices or a
/// cloned snapshot.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    generated: Vec<WorkItem>,
    served: Vec<WorkItem>,
    unserved: Vec<WorkItem>,
}

impl Ledger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly generated item.
    pub fn record_arrival(&mut self, item: WorkItem) {
        self.generated.push(item);
    }

    /// Put a generated item in its final bucket.
    pub fn classify(&mut self, item: WorkItem, classification: Classification) {
        match classification {
            Classification::Served => self.served.push(item),
            Classification::Unserved => self.unserved.push(item),
        }
    }

    /// Every generated item, in generation order.
    #[must_use]
    pub fn generated(&self) -> &[WorkItem] {
        &self.generated
    }

    /// Items admitted to some server.
    #[must_use]
    pub fn served(&self) -> &[WorkItem] {
        &self.served
    }

    /// Items rejected on both attempts.
    #[must_use]
    pub fn unserved(&self) -> &[WorkItem] {
        &self.unserved
    }

    /// Generated items not yet placed in either bucket.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.generated
            .len()
            .saturating_sub(self.served.len() + self.unserved.len())
    }
}

/// Aggregates over a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStatistics {
    /// Items generated.
    pub total_generated: usize,
    /// Items admitted.
    pub total_served: usize,
    /// Items rejected twice.
    pub total_unserved: usize,
    /// Mean service duration over served items.
    pub average_service_time: Duration,
    /// Mean gap between consecutive arrivals.
    pub average_inter_arrival_time: Duration,
    /// Mean of `measured_at - arrival_time` over served items.
    pub average_waiting_time: Duration,
}

impl RunStatistics {
    /// Compute aggregates from `ledger`, measuring waits against `measured_at`.
    #[must_use]
    pub fn compute(ledger: &Ledger, measured_at: Instant) -> Self {
        Self {
            total_generated: ledger.generated().len(),
            total_served: ledger.served().len(),
            total_unserved: ledger.unserved().len(),
            average_service_time: average_service_time(ledger.served()),
            average_inter_arrival_time: average_inter_arrival_time(ledger.generated()),
            average_waiting_time: average_waiting_time(ledger.served(), measured_at),
        }
    }
}

/// Mean of `durations`, zero when empty.
#[must_use]
pub fn mean_duration<I>(durations: I) -> Duration
where
    I: IntoIterator<Item = Duration>,
{
    let (total, count) = durations
        .into_iter()
        .fold((Duration::ZERO, 0u32), |(total, count), d| (total + d, count + 1));
    if count == 0 {
        Duration::ZERO
    } else {
        total / count
    }
}

/// Mean service duration, zero when no items.
#[must_use]
pub fn average_service_time(items: &[WorkItem]) -> Duration {
    mean_duration(items.iter().map(|item| item.service_duration))
}

/// `(last_arrival - first_arrival) / (n - 1)`, zero for fewer than two items.
#[must_use]
pub fn average_inter_arrival_time(items: &[WorkItem]) -> Duration {
    match (items.first(), items.last()) {
        (Some(first), Some(last)) if items.len() >= 2 => {
            let span = last.arrival_time.saturating_duration_since(first.arrival_time);
            let gaps = u32::try_from(items.len() - 1).unwrap_or(u32::MAX);
            span / gaps
        }
        _ => Duration::ZERO,
    }
}

/// Mean age of `items` at `measured_at`, zero when no items.
#[must_use]
pub fn average_waiting_time(items: &[WorkItem], measured_at: Instant) -> Duration {
    mean_duration(items.iter().map(|item| item.age_at(measured_at)))
}
