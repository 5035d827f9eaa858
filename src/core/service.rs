//! Service handler abstraction: the work a server performs on one item.

use std::time::Instant;

use crate::core::cancel::{SleepOutcome, StopSignal};
use crate::core::error::ServiceError;
use crate::core::server::ServerId;
use crate::core::work_item::WorkItem;

/// How a single service attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// The full service duration was spent on the item.
    Completed,
    /// The server was stopped mid-service.
    Cancelled,
}

impl From<SleepOutcome> for ServiceOutcome {
    fn from(outcome: SleepOutcome) -> Self {
        match outcome {
            SleepOutcome::Elapsed => Self::Completed,
            SleepOutcome::Cancelled => Self::Cancelled,
        }
    }
}

/// Performs the work for one item on a server thread.
///
/// Implementations must return promptly once `stop` is raised. Returning an
/// error ends the calling server's loop; other servers keep running.
///
/// # Example
///
/// ```rust
/// use multiqueue_sim::core::{
///     ServerId, ServiceError, ServiceHandler, ServiceOutcome, StopSignal, WorkItem,
/// };
///
/// struct NoWork;
///
/// impl ServiceHandler for NoWork {
///     fn serve(
///         &self,
///         _server: ServerId,
///         _item: &WorkItem,
///         _stop: &StopSignal,
///     ) -> Result<ServiceOutcome, ServiceError> {
///         Ok(ServiceOutcome::Completed)
///     }
/// }
/// ```
pub trait ServiceHandler: Send + Sync + 'static {
    /// Serve `item` on `server`.
    fn serve(
        &self,
        server: ServerId,
        item: &WorkItem,
        stop: &StopSignal,
    ) -> Result<ServiceOutcome, ServiceError>;
}

/// Default handler: occupies the server for the item's service duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedService;

impl ServiceHandler for SimulatedService {
    fn serve(
        &self,
        _server: ServerId,
        item: &WorkItem,
        stop: &StopSignal,
    ) -> Result<ServiceOutcome, ServiceError> {
        Ok(stop.sleep(item.service_duration).into())
    }
}

/// Record emitted by a server thread after each service attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceEvent {
    /// Server that worked on the item.
    pub server: ServerId,
    /// The item.
    pub item: WorkItem,
    /// When the server took the item off its queue.
    pub started_at: Instant,
    /// When the attempt ended.
    pub finished_at: Instant,
    /// How it ended.
    pub outcome: ServiceOutcome,
}

impl ServiceEvent {
    /// Time the item spent queued before a server picked it up.
    #[must_use]
    pub fn queue_delay(&self) -> std::time::Duration {
        self.item.age_at(self.started_at)
    }
}
