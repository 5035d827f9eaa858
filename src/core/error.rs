//! Error types for simulation components.

use thiserror::Error;

/// Errors produced while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration could not be loaded from its source.
    #[error("config load error: {0}")]
    ConfigLoad(String),
    /// A server thread could not be spawned.
    #[error("failed to spawn server thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure raised by a service handler while working on an item.
///
/// Fatal for the server that raised it, never for the run.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The handler gave up on the item with context.
    #[error("service failed for item {item}: {reason}")]
    Failed {
        /// Item being served when the failure happened.
        item: u64,
        /// Handler-supplied reason.
        reason: String,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
