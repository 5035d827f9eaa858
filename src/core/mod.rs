//! Core simulation abstractions: work items, servers, dispatch and statistics.

pub mod cancel;
pub mod dispatcher;
pub mod error;
pub mod server;
pub mod service;
pub mod statistics;
pub mod work_item;

pub use cancel::{SleepOutcome, StopSignal};
pub use dispatcher::{select_least_loaded, Admission, Dispatcher};
pub use error::{AppResult, ServiceError, SimulationError};
pub use server::{Server, ServerId, ServerStats};
pub use service::{ServiceEvent, ServiceHandler, ServiceOutcome, SimulatedService};
pub use statistics::{Ledger, RunStatistics};
pub use work_item::{Classification, ItemId, WorkItem};
