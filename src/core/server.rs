//! Server state: one bounded FIFO queue plus service counters.
//!
//! A `Server` is plain shared state. The thread that drains it lives in
//! `runtime::server_runtime`; the dispatcher only ever calls
//! [`Server::queue_depth`] and [`Server::try_admit`].

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::debug;

use crate::core::cancel::StopSignal;
use crate::core::work_item::WorkItem;

/// Position of a server in the pool's enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ServerId(pub usize);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server-{}", self.0)
    }
}

/// Snapshot of a server's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerStats {
    /// Items taken off the queue for service.
    pub served_count: u64,
    /// Sum of service durations of those items.
    pub total_service_time: Duration,
    /// Items currently waiting in the queue.
    pub queue_depth: usize,
}

struct ServerState {
    queue: VecDeque<WorkItem>,
    served_count: u64,
    total_service_time: Duration,
    stopped: bool,
}

/// A server with a private bounded queue.
///
/// Admission and dequeue are serialized by one mutex; an empty-queue wait
/// parks on a Condvar that admission and `stop` notify.
pub struct Server {
    id: ServerId,
    max_queue_size: usize,
    state: Mutex<ServerState>,
    available: Condvar,
    stop: StopSignal,
}

impl Server {
    /// Create an idle server that holds at most `max_queue_size` waiting items.
    #[must_use]
    pub fn new(id: ServerId, max_queue_size: usize) -> Self {
        Self {
            id,
            max_queue_size,
            state: Mutex::new(ServerState {
                queue: VecDeque::with_capacity(max_queue_size.min(1024)),
                served_count: 0,
                total_service_time: Duration::ZERO,
                stopped: false,
            }),
            available: Condvar::new(),
            stop: StopSignal::new(),
        }
    }

    /// Server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId {
        self.id
    }

    /// Queue capacity.
    #[must_use]
    pub const fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    /// Number of queued items not yet started. May be stale by the time the
    /// caller acts on it.
    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Queue depth, or `None` once the server is stopped and no longer a
    /// valid admission target. One lock acquisition.
    #[must_use]
    pub fn depth_if_accepting(&self) -> Option<usize> {
        let state = self.state.lock();
        (!state.stopped).then_some(state.queue.len())
    }

    /// Append `item` if the queue has room. Never blocks on capacity.
    ///
    /// Returns `false` without touching the queue when it is full or the
    /// server has been stopped.
    #[must_use]
    pub fn try_admit(&self, item: WorkItem) -> bool {
        let mut state = self.state.lock();
        if state.stopped || state.queue.len() >= self.max_queue_size {
            return false;
        }
        state.queue.push_back(item);
        let depth = state.queue.len();
        drop(state);
        self.available.notify_one();
        debug!(server = %self.id, item = item.id, depth, "item admitted");
        true
    }

    /// Block until an item is available and take it, updating the counters.
    ///
    /// Returns `None` once the server is stopped; queued items are left in
    /// place for [`Server::drain_abandoned`].
    pub fn next_item(&self) -> Option<WorkItem> {
        let mut state = self.state.lock();
        loop {
            if state.stopped {
                return None;
            }
            if let Some(item) = state.queue.pop_front() {
                state.served_count += 1;
                state.total_service_time += item.service_duration;
                return Some(item);
            }
            self.available.wait(&mut state);
        }
    }

    /// Stop the server: reject further admissions, release an idle wait and
    /// interrupt an in-progress service sleep. Idempotent.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.stopped = true;
        drop(state);
        self.available.notify_all();
        self.stop.raise();
    }

    /// Whether `stop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    /// Signal raised by `stop`; service handlers sleep on it.
    #[must_use]
    pub const fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> ServerStats {
        let state = self.state.lock();
        ServerStats {
            served_count: state.served_count,
            total_service_time: state.total_service_time,
            queue_depth: state.queue.len(),
        }
    }

    /// Remove and return items still queued. Meant for after the server
    /// thread has been joined.
    pub fn drain_abandoned(&self) -> Vec<WorkItem> {
        self.state.lock().queue.drain(..).collect()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("id", &self.id)
            .field("max_queue_size", &self.max_queue_size)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
