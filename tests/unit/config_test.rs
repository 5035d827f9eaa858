//! Tests for configuration validation and loading

use std::collections::HashMap;
use std::time::Duration;

use multiqueue_sim::config::{SimulationConfig, UnitRange};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_config_validation() {
    assert!(SimulationConfig::new(3, 5).validate().is_ok());
}

#[test]
fn test_config_invalid_server_count() {
    assert!(SimulationConfig::new(0, 5).validate().is_err());
}

#[test]
fn test_config_invalid_queue_size() {
    assert!(SimulationConfig::new(3, 0).validate().is_err());
}

#[test]
fn test_config_invalid_time_unit() {
    let cfg = SimulationConfig::new(3, 5).with_time_unit_ms(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_invalid_arrival_range() {
    let cfg = SimulationConfig::new(3, 5).with_arrival_interval(11, 5);
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("arrival_interval"));
}

#[test]
fn test_config_from_json_applies_defaults() {
    let json = r#"{ "server_count": 4, "max_queue_size": 2 }"#;

    let cfg = SimulationConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.server_count, 4);
    assert_eq!(cfg.max_queue_size, 2);
    assert_eq!(cfg.run_duration(), Duration::from_secs(120));
    assert_eq!(cfg.arrival_interval, UnitRange::new(5, 11));
    assert_eq!(cfg.service_time, UnitRange::new(10, 21));
    assert_eq!(cfg.retry_backoff(), Duration::from_secs(10));
    assert_eq!(cfg.seed, None);
}

#[test]
fn test_config_from_json_full() {
    let json = r#"{
        "server_count": 2,
        "max_queue_size": 3,
        "time_unit_ms": 10,
        "run_duration_units": 60,
        "arrival_interval": { "min": 1, "max": 3 },
        "service_time": { "min": 2, "max": 4 },
        "retry_backoff_units": 5,
        "seed": 99
    }"#;

    let cfg = SimulationConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.run_duration(), Duration::from_millis(600));
    assert_eq!(cfg.retry_backoff(), Duration::from_millis(50));
    assert_eq!(cfg.seed, Some(99));
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SimulationConfig::from_json_str(r#"{ "server_count": 0, "max_queue_size": 2 }"#).is_err());
    assert!(SimulationConfig::from_json_str(r#"{ "max_queue_size": 2 }"#).is_err());
    assert!(SimulationConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup() {
    let cfg = SimulationConfig::from_lookup(lookup_from(&[
        ("SIM_SERVERS", "3"),
        ("SIM_MAX_QUEUE", " 4 "),
        ("SIM_TIME_UNIT_MS", "5"),
        ("SIM_RETRY_UNITS", "2"),
        ("SIM_SEED", "11"),
    ]))
    .unwrap();

    assert_eq!(cfg.server_count, 3);
    assert_eq!(cfg.max_queue_size, 4);
    assert_eq!(cfg.retry_backoff(), Duration::from_millis(10));
    assert_eq!(cfg.seed, Some(11));
    assert_eq!(cfg.service_time, UnitRange::new(10, 21));
}

#[test]
fn test_config_from_lookup_missing_required() {
    let err = SimulationConfig::from_lookup(lookup_from(&[("SIM_SERVERS", "3")])).unwrap_err();
    assert!(err.contains("SIM_MAX_QUEUE"));
}

#[test]
fn test_config_from_lookup_bad_number() {
    let err = SimulationConfig::from_lookup(lookup_from(&[
        ("SIM_SERVERS", "three"),
        ("SIM_MAX_QUEUE", "4"),
    ]))
    .unwrap_err();
    assert!(err.contains("SIM_SERVERS"));
}
