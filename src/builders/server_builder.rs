//! Builders to construct the server pool from configuration.

use std::sync::Arc;

use crate::config::SimulationConfig;
use crate::core::{Server, ServerId, SimulationError};

/// Build `server_count` idle servers of capacity `max_queue_size`, numbered
/// in enumeration order.
///
/// # Errors
///
/// Returns `SimulationError::InvalidConfig` if `cfg` fails validation.
pub fn build_servers(cfg: &SimulationConfig) -> Result<Vec<Arc<Server>>, SimulationError> {
    cfg.validate().map_err(SimulationError::InvalidConfig)?;

    Ok((0..cfg.server_count)
        .map(|idx| Arc::new(Server::new(ServerId(idx), cfg.max_queue_size)))
        .collect())
}
