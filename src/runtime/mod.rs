//! Thread runtime for servers, run orchestration and report surface.

pub mod api;
pub mod server_runtime;
pub mod simulation;

pub use api::{RunReport, ServerReport};
pub use server_runtime::{spawn_server, ServerRuntime, ServerStatus};
pub use simulation::Simulation;
