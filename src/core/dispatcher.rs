//! Arrival generation and least-loaded dispatch.
//!
//! The dispatcher runs on the caller's thread. Each iteration waits a random
//! inter-arrival gap, creates a [`WorkItem`], offers it to the server with the
//! shortest queue and, when that server is full, waits the retry backoff and
//! offers it once more. Outcomes are recorded in the dispatcher's own
//! [`Ledger`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::core::cancel::{SleepOutcome, StopSignal};
use crate::core::server::{Server, ServerId};
use crate::core::statistics::Ledger;
use crate::core::work_item::{Classification, ItemId, WorkItem};
use crate::util::sampler::ArrivalSampler;

/// Outcome of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The item was queued on this server.
    Admitted(ServerId),
    /// The least-loaded server was full.
    Rejected,
}

/// Pick the server with the smallest queue depth. Ties go to the earliest
/// server in `servers`. Stopped servers are skipped.
#[must_use]
pub fn select_least_loaded(servers: &[Arc<Server>]) -> Option<&Arc<Server>> {
    servers
        .iter()
        .filter_map(|server| server.depth_if_accepting().map(|depth| (depth, server)))
        .min_by_key(|(depth, _)| *depth)
        .map(|(_, server)| server)
}

/// Generates work and balances it across a fixed set of servers.
pub struct Dispatcher {
    servers: Vec<Arc<Server>>,
    sampler: ArrivalSampler,
    retry_backoff: Duration,
    ledger: Ledger,
    stop: StopSignal,
    next_id: ItemId,
}

impl Dispatcher {
    /// Create a dispatcher over `servers`.
    #[must_use]
    pub fn new(servers: Vec<Arc<Server>>, sampler: ArrivalSampler, retry_backoff: Duration) -> Self {
        Self {
            servers,
            sampler,
            retry_backoff,
            ledger: Ledger::new(),
            stop: StopSignal::new(),
            next_id: 1,
        }
    }

    /// Create a dispatcher using the sampler and backoff from `config`.
    #[must_use]
    pub fn from_config(config: &SimulationConfig, servers: Vec<Arc<Server>>) -> Self {
        Self::new(servers, ArrivalSampler::from_config(config), config.retry_backoff())
    }

    /// Share an externally owned abort signal instead of a private one.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that aborts [`Dispatcher::run_for`] early when raised.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Servers this dispatcher balances across.
    #[must_use]
    pub fn servers(&self) -> &[Arc<Server>] {
        &self.servers
    }

    /// Items classified so far.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Owned copy of the ledger for concurrent readers.
    #[must_use]
    pub fn snapshot(&self) -> Ledger {
        self.ledger.clone()
    }

    /// Consume the dispatcher and keep its ledger.
    #[must_use]
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Create the next item, arriving now, with a sampled service duration.
    pub fn generate(&mut self) -> WorkItem {
        let item = WorkItem::new(self.next_id, self.sampler.next_service_duration());
        self.next_id += 1;
        item
    }

    /// Offer `item` once to the currently least-loaded server.
    #[must_use]
    pub fn attempt(&self, item: WorkItem) -> Admission {
        match select_least_loaded(&self.servers) {
            Some(server) if server.try_admit(item) => Admission::Admitted(server.id()),
            _ => Admission::Rejected,
        }
    }

    /// Record `item` as generated and place it: one attempt, then one retry
    /// after the backoff. An abort during the backoff moves the retry forward
    /// rather than skipping it.
    pub fn dispatch(&mut self, item: WorkItem) -> Classification {
        self.ledger.record_arrival(item);

        let classification = match self.attempt(item) {
            Admission::Admitted(server) => {
                debug!(item = item.id, %server, "item admitted on first attempt");
                Classification::Served
            }
            Admission::Rejected => {
                debug!(
                    item = item.id,
                    backoff_ms = self.retry_backoff.as_millis(),
                    "admission rejected, retrying after backoff"
                );
                if self.stop.sleep(self.retry_backoff) == SleepOutcome::Cancelled {
                    debug!(item = item.id, "backoff cut short by abort");
                }
                match self.attempt(item) {
                    Admission::Admitted(server) => {
                        debug!(item = item.id, %server, "item admitted on retry");
                        Classification::Served
                    }
                    Admission::Rejected => {
                        warn!(item = item.id, "item left unserved after retry");
                        Classification::Unserved
                    }
                }
            }
        };

        self.ledger.classify(item, classification);
        classification
    }

    /// Generate and dispatch items until `run_duration` has passed since the
    /// call, or the stop signal is raised. Returns the number generated.
    ///
    /// The bound is wall-clock: an iteration that starts before the deadline
    /// finishes even if its sleeps carry it past.
    pub fn run_for(&mut self, run_duration: Duration) -> usize {
        let started = Instant::now();
        let mut generated = 0;
        info!(
            servers = self.servers.len(),
            run_ms = run_duration.as_millis(),
            "dispatcher started"
        );

        while started.elapsed() < run_duration {
            let gap = self.sampler.next_inter_arrival();
            if self.stop.sleep(gap).is_cancelled() {
                info!("dispatcher aborted");
                break;
            }
            let item = self.generate();
            self.dispatch(item);
            generated += 1;
        }

        info!(
            generated,
            served = self.ledger.served().len(),
            unserved = self.ledger.unserved().len(),
            "dispatcher finished"
        );
        generated
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("servers", &self.servers.len())
            .field("retry_backoff", &self.retry_backoff)
            .field("generated", &self.ledger.generated().len())
            .finish_non_exhaustive()
    }
}
