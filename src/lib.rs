//! # Multiqueue Sim
//!
//! A bounded-capacity, multi-server work-dispatch simulator.
//!
//! A dispatcher produces work items at random intervals and load-balances them
//! across a fixed pool of servers. Every server owns a private bounded FIFO
//! queue and a dedicated OS thread that drains it, spending each item's service
//! time before taking the next. Items that find the least-loaded queue full are
//! retried once after a backoff and otherwise recorded as unserved.
//!
//! ## Key Features
//!
//! - **Least-loaded balancing**: shortest queue wins, ties go to the first server
//! - **Backpressure**: bounded queues with non-blocking admission and one retry
//! - **Prompt shutdown**: every timed wait is cancellable through a `StopSignal`
//! - **Contained failures**: a failing server leaves the pool; the run completes
//! - **Compressible timeline**: one configurable time unit scales every duration
//!
//! ## Running a Simulation
//!
//! ```rust,no_run
//! use multiqueue_sim::config::SimulationConfig;
//! use multiqueue_sim::runtime::Simulation;
//!
//! // 3 servers, 5 slots each, the reference 2-minute timeline
//! let sim = Simulation::new(SimulationConfig::new(3, 5))?;
//! let report = sim.run()?;
//! println!("{report}");
//! # Ok::<(), multiqueue_sim::core::SimulationError>(())
//! ```
//!
//! ## Driving the Pieces Directly
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use multiqueue_sim::core::{select_least_loaded, Server, ServerId, WorkItem};
//!
//! let servers: Vec<Arc<Server>> = (0..2).map(|i| Arc::new(Server::new(ServerId(i), 1))).collect();
//! assert!(servers[0].try_admit(WorkItem::new(1, Duration::from_secs(10))));
//! assert_eq!(select_least_loaded(&servers).unwrap().id(), ServerId(1));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Work items, servers, dispatch, cancellation and statistics.
pub mod core;
/// Configuration models for simulation runs.
pub mod config;
/// Builders to construct simulation components from configuration.
pub mod builders;
/// Server threads, run orchestration and report surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
