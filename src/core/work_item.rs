//! Work item value type.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Sequence number of a generated work item (1-based, in generation order).
pub type ItemId = u64;

/// A unit of work travelling from the dispatcher to one server.
///
/// Immutable once created; copies are cheap and carry the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Generation sequence number.
    pub id: ItemId,
    /// Moment the item arrived at the dispatcher.
    pub arrival_time: Instant,
    /// Time a server must spend working on the item.
    pub service_duration: Duration,
}

impl WorkItem {
    /// Create an item that arrives now.
    #[must_use]
    pub fn new(id: ItemId, service_duration: Duration) -> Self {
        Self::arrived_at(id, Instant::now(), service_duration)
    }

    /// Create an item with an explicit arrival instant.
    #[must_use]
    pub const fn arrived_at(id: ItemId, arrival_time: Instant, service_duration: Duration) -> Self {
        Self {
            id,
            arrival_time,
            service_duration,
        }
    }

    /// Time elapsed between arrival and `at`, zero if `at` precedes arrival.
    #[must_use]
    pub fn age_at(&self, at: Instant) -> Duration {
        at.saturating_duration_since(self.arrival_time)
    }
}

/// Final bucket of a generated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Admitted to some server's queue (on the first attempt or the retry).
    Served,
    /// Rejected on both the first attempt and the retry.
    Unserved,
}
