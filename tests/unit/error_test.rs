//! Tests for error types

use multiqueue_sim::core::{ServiceError, SimulationError};

#[test]
fn test_invalid_config_error() {
    let err = SimulationError::InvalidConfig("server_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: server_count must be greater than 0"
    );
}

#[test]
fn test_config_load_error() {
    let err = SimulationError::ConfigLoad("SIM_SERVERS is not set".to_string());
    assert_eq!(format!("{}", err), "config load error: SIM_SERVERS is not set");
}

#[test]
fn test_spawn_error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads left");
    let err: SimulationError = io.into();
    assert_eq!(format!("{}", err), "failed to spawn server thread: no threads left");
}

#[test]
fn test_service_error() {
    let err = ServiceError::Failed {
        item: 7,
        reason: "disk on fire".to_string(),
    };
    assert_eq!(format!("{}", err), "service failed for item 7: disk on fire");
}
