//! Report models handed to the reporting collaborator.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::core::{RunStatistics, ServerId, ServerStats, ServiceEvent, ServiceOutcome};
use crate::core::statistics::mean_duration;
use crate::runtime::server_runtime::ServerStatus;

/// Per-server section of a run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerReport {
    /// Server identifier.
    pub id: ServerId,
    /// Items the server took off its queue.
    pub served_count: u64,
    /// Sum of their service durations, seconds.
    pub total_service_time_secs: f64,
    /// Items whose service finished before stop.
    pub completed: usize,
    /// Items still queued when the server stopped.
    pub abandoned: usize,
    /// How the server thread ended.
    pub status: ServerStatus,
}

impl ServerReport {
    /// Build from a post-join counter snapshot and the server's events.
    #[must_use]
    pub fn new(id: ServerId, stats: ServerStats, events: &[ServiceEvent], status: ServerStatus) -> Self {
        Self {
            id,
            served_count: stats.served_count,
            total_service_time_secs: stats.total_service_time.as_secs_f64(),
            completed: events
                .iter()
                .filter(|e| e.server == id && e.outcome == ServiceOutcome::Completed)
                .count(),
            abandoned: stats.queue_depth,
            status,
        }
    }
}

/// Totals and averages of one run. All times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// Items generated.
    pub total_generated: usize,
    /// Items admitted to a server.
    pub total_served: usize,
    /// Items rejected on both attempts.
    pub total_unserved: usize,
    /// Items whose service finished before stop.
    pub completed: usize,
    /// Admitted items still queued at stop.
    pub abandoned: usize,
    /// Mean service duration of served items.
    pub average_service_time_secs: f64,
    /// Mean gap between consecutive arrivals.
    pub average_inter_arrival_time_secs: f64,
    /// Mean time from arrival to report time, over served items.
    pub average_waiting_time_secs: f64,
    /// Mean time from arrival to service start, over started items.
    pub average_queue_delay_secs: f64,
    /// Per-server breakdown.
    pub servers: Vec<ServerReport>,
}

impl RunReport {
    /// Combine ledger statistics, service events and server reports.
    #[must_use]
    pub fn assemble(stats: &RunStatistics, events: &[ServiceEvent], servers: Vec<ServerReport>) -> Self {
        let completed = events
            .iter()
            .filter(|e| e.outcome == ServiceOutcome::Completed)
            .count();
        let queue_delay: Duration = mean_duration(events.iter().map(ServiceEvent::queue_delay));

        Self {
            run_id: Uuid::new_v4(),
            total_generated: stats.total_generated,
            total_served: stats.total_served,
            total_unserved: stats.total_unserved,
            completed,
            abandoned: servers.iter().map(|s| s.abandoned).sum(),
            average_service_time_secs: stats.average_service_time.as_secs_f64(),
            average_inter_arrival_time_secs: stats.average_inter_arrival_time.as_secs_f64(),
            average_waiting_time_secs: stats.average_waiting_time.as_secs_f64(),
            average_queue_delay_secs: queue_delay.as_secs_f64(),
            servers,
        }
    }

    /// Servers whose thread ended in failure.
    pub fn failed_servers(&self) -> impl Iterator<Item = &ServerReport> {
        self.servers.iter().filter(|s| s.status.is_failed())
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures from `serde_json`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}", self.run_id)?;
        writeln!(f, "Total items served: {}", self.total_served)?;
        writeln!(f, "Total items left unserved: {}", self.total_unserved)?;
        writeln!(f, "Average service time: {:.2} seconds", self.average_service_time_secs)?;
        writeln!(
            f,
            "Average inter-arrival time: {:.2} seconds",
            self.average_inter_arrival_time_secs
        )?;
        writeln!(f, "Average waiting time: {:.2} seconds", self.average_waiting_time_secs)?;
        writeln!(f, "Average queue delay: {:.2} seconds", self.average_queue_delay_secs)?;
        write!(
            f,
            "Generated: {}, completed: {}, abandoned at stop: {}",
            self.total_generated, self.completed, self.abandoned
        )?;
        for server in &self.servers {
            write!(
                f,
                "\n  {}: served {}, completed {}, abandoned {}",
                server.id, server.served_count, server.completed, server.abandoned
            )?;
            if let ServerStatus::Failed(reason) = &server.status {
                write!(f, " (failed: {reason})")?;
            }
        }
        Ok(())
    }
}
