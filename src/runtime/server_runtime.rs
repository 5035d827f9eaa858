//! Dedicated OS thread per server.
//!
//! # Design Principles
//!
//! - **No polling**: an idle server parks on its Condvar until admission or stop
//! - **Prompt stop**: service sleeps wait on the server's `StopSignal`
//! - **Contained failure**: a handler error or panic ends only that server's
//!   thread, which stops the server so the dispatcher routes around it

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Sender;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::core::{
    Server, ServerId, ServiceError, ServiceEvent, ServiceHandler, ServiceOutcome, SimulationError,
};

/// How a server thread ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum ServerStatus {
    /// Exited after `stop`.
    Stopped,
    /// Exited early because its handler failed or panicked.
    Failed(String),
}

impl ServerStatus {
    /// True for [`ServerStatus::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A running server thread.
pub struct ServerRuntime {
    server: Arc<Server>,
    handle: JoinHandle<ServerStatus>,
}

impl ServerRuntime {
    /// Server driven by this thread.
    #[must_use]
    pub const fn server(&self) -> &Arc<Server> {
        &self.server
    }

    /// Ask the thread to exit. Interrupts an in-progress service.
    pub fn stop(&self) {
        self.server.stop();
    }

    /// Whether the thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit and report how it ended.
    pub fn join(self) -> ServerStatus {
        let id = self.server.id();
        match self.handle.join() {
            Ok(status) => {
                debug!(server = %id, ?status, "server thread joined");
                status
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(server = %id, %reason, "server thread panicked outside its loop");
                ServerStatus::Failed(reason)
            }
        }
    }
}

impl std::fmt::Debug for ServerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerRuntime")
            .field("server", &self.server.id())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Spawn the processing thread for `server`.
///
/// Each attempt is reported on `events`; a closed receiver is ignored.
///
/// # Errors
///
/// Returns `SimulationError::Spawn` if the OS refuses the thread.
pub fn spawn_server<H>(
    server: Arc<Server>,
    handler: Arc<H>,
    events: Sender<ServiceEvent>,
) -> Result<ServerRuntime, SimulationError>
where
    H: ServiceHandler,
{
    let id = server.id();
    let thread_server = Arc::clone(&server);
    let handle = thread::Builder::new()
        .name(format!("sim-{id}"))
        .spawn(move || {
            debug!(server = %id, "server thread started");
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                serve_loop(&thread_server, handler.as_ref(), &events)
            }));

            let status = match result {
                Ok(Ok(())) => ServerStatus::Stopped,
                Ok(Err(e)) => {
                    error!(server = %id, error = %e, "server failed, leaving the pool");
                    ServerStatus::Failed(e.to_string())
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(server = %id, %reason, "server panicked, leaving the pool");
                    ServerStatus::Failed(reason)
                }
            };
            if status.is_failed() {
                thread_server.stop();
            }
            debug!(server = %id, "server thread exiting");
            status
        })?;

    info!(server = %id, capacity = server.max_queue_size(), "server started");
    Ok(ServerRuntime { server, handle })
}

/// Drain the queue one item at a time until the server is stopped.
fn serve_loop<H>(
    server: &Server,
    handler: &H,
    events: &Sender<ServiceEvent>,
) -> Result<(), ServiceError>
where
    H: ServiceHandler + ?Sized,
{
    let id: ServerId = server.id();
    while let Some(item) = server.next_item() {
        let started_at = Instant::now();
        debug!(
            server = %id,
            item = item.id,
            service_ms = item.service_duration.as_millis(),
            "serving item"
        );

        let outcome = handler.serve(id, &item, server.stop_signal())?;
        let _ = events.send(ServiceEvent {
            server: id,
            item,
            started_at,
            finished_at: Instant::now(),
            outcome,
        });

        if outcome == ServiceOutcome::Cancelled {
            debug!(server = %id, item = item.id, "service interrupted by stop");
            break;
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
