//! Tests for server pool builders

use multiqueue_sim::builders::build_servers;
use multiqueue_sim::config::SimulationConfig;
use multiqueue_sim::core::{ServerId, SimulationError};

#[test]
fn test_build_servers_from_config() {
    let servers = build_servers(&SimulationConfig::new(3, 4)).unwrap();
    assert_eq!(servers.len(), 3);
    for (idx, server) in servers.iter().enumerate() {
        assert_eq!(server.id(), ServerId(idx));
        assert_eq!(server.max_queue_size(), 4);
        assert_eq!(server.queue_depth(), 0);
        assert!(!server.is_stopped());
    }
}

#[test]
fn test_build_servers_invalid_config() {
    let result = build_servers(&SimulationConfig::new(0, 4));
    assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
}
