//! End-to-end orchestration of one run.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::builders::build_servers;
use crate::config::SimulationConfig;
use crate::core::{
    Dispatcher, RunStatistics, Server, ServiceEvent, ServiceHandler, SimulatedService,
    SimulationError, StopSignal,
};
use crate::runtime::api::{RunReport, ServerReport};
use crate::runtime::server_runtime::{spawn_server, ServerRuntime, ServerStatus};

/// A configured simulation: servers, their threads and the dispatcher loop.
///
/// ```rust,no_run
/// use multiqueue_sim::config::SimulationConfig;
/// use multiqueue_sim::runtime::Simulation;
///
/// let sim = Simulation::new(SimulationConfig::new(3, 5))?;
/// let report = sim.run()?;
/// println!("{report}");
/// # Ok::<(), multiqueue_sim::core::SimulationError>(())
/// ```
pub struct Simulation<H = SimulatedService> {
    config: SimulationConfig,
    handler: Arc<H>,
    abort: StopSignal,
}

impl Simulation<SimulatedService> {
    /// Simulation whose servers sleep through each item's service time.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` if `config` fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::with_handler(config, SimulatedService)
    }
}

impl<H: ServiceHandler> Simulation<H> {
    /// Simulation with a custom service handler.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` if `config` fails validation.
    pub fn with_handler(config: SimulationConfig, handler: H) -> Result<Self, SimulationError> {
        config.validate().map_err(SimulationError::InvalidConfig)?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
            abort: StopSignal::new(),
        })
    }

    /// Configuration of this simulation.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Handle that ends the arrival loop early when raised. Stays raised, so
    /// later calls to [`Simulation::run`] generate nothing.
    #[must_use]
    pub fn abort_handle(&self) -> StopSignal {
        self.abort.clone()
    }

    /// Run the arrival loop for the configured duration, then stop and join
    /// every server and report.
    ///
    /// Individual server failures are reported, not returned.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::Spawn` if a server thread cannot be started.
    pub fn run(&self) -> Result<RunReport, SimulationError> {
        let servers = build_servers(&self.config)?;
        let (events_tx, events_rx) = crossbeam_channel::unbounded::<ServiceEvent>();

        let mut runtimes: Vec<ServerRuntime> = Vec::with_capacity(servers.len());
        for server in &servers {
            match spawn_server(Arc::clone(server), Arc::clone(&self.handler), events_tx.clone()) {
                Ok(runtime) => runtimes.push(runtime),
                Err(e) => {
                    shutdown(runtimes);
                    return Err(e);
                }
            }
        }
        drop(events_tx);

        info!(
            servers = self.config.server_count,
            max_queue_size = self.config.max_queue_size,
            run_ms = self.config.run_duration().as_millis(),
            "simulation started"
        );

        let mut dispatcher =
            Dispatcher::from_config(&self.config, servers).with_stop_signal(self.abort.clone());
        dispatcher.run_for(self.config.run_duration());

        let outcomes = shutdown(runtimes);
        let measured_at = Instant::now();
        let events: Vec<ServiceEvent> = events_rx.try_iter().collect();

        let server_reports: Vec<ServerReport> = outcomes
            .into_iter()
            .map(|(server, status)| {
                let stats = server.stats();
                let abandoned = server.drain_abandoned();
                if !abandoned.is_empty() {
                    warn!(
                        server = %server.id(),
                        abandoned = abandoned.len(),
                        "items left queued at stop"
                    );
                }
                ServerReport::new(server.id(), stats, &events, status)
            })
            .collect();

        let ledger = dispatcher.into_ledger();
        let stats = RunStatistics::compute(&ledger, measured_at);
        let report = RunReport::assemble(&stats, &events, server_reports);

        info!(
            run_id = %report.run_id,
            generated = report.total_generated,
            served = report.total_served,
            unserved = report.total_unserved,
            completed = report.completed,
            abandoned = report.abandoned,
            failed_servers = report.failed_servers().count(),
            "simulation finished"
        );
        Ok(report)
    }
}

impl<H> std::fmt::Debug for Simulation<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("aborted", &self.abort.is_raised())
            .finish_non_exhaustive()
    }
}

/// Stop every server first, then join each, so no server's exit waits on
/// another's.
fn shutdown(runtimes: Vec<ServerRuntime>) -> Vec<(Arc<Server>, ServerStatus)> {
    for runtime in &runtimes {
        runtime.stop();
    }
    runtimes
        .into_iter()
        .map(|runtime| {
            let server = Arc::clone(runtime.server());
            (server, runtime.join())
        })
        .collect()
}
