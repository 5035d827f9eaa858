//! Tests for run statistics

use std::time::{Duration, Instant};

use multiqueue_sim::core::{Classification, Ledger, RunStatistics, WorkItem};

fn item(id: u64, base: Instant, arrival_secs: u64, service_secs: u64) -> WorkItem {
    WorkItem::arrived_at(
        id,
        base + Duration::from_secs(arrival_secs),
        Duration::from_secs(service_secs),
    )
}

#[test]
fn test_reference_averages() {
    let base = Instant::now();
    let mut ledger = Ledger::new();
    let items = [
        item(1, base, 0, 10),
        item(2, base, 6, 20),
        item(3, base, 14, 30),
        item(4, base, 20, 12),
    ];
    for it in items {
        ledger.record_arrival(it);
    }
    ledger.classify(items[0], Classification::Served);
    ledger.classify(items[1], Classification::Served);
    ledger.classify(items[2], Classification::Served);
    ledger.classify(items[3], Classification::Unserved);

    let stats = RunStatistics::compute(&ledger, base + Duration::from_secs(30));

    assert_eq!(stats.total_generated, 4);
    assert_eq!(stats.total_served, 3);
    assert_eq!(stats.total_unserved, 1);
    assert_eq!(stats.average_service_time, Duration::from_secs(20));
    // (20 - 0) / 3
    assert_eq!(
        stats.average_inter_arrival_time,
        Duration::from_secs(20) / 3
    );
    // waits of 30, 24 and 16 seconds
    assert_eq!(
        stats.average_waiting_time,
        Duration::from_secs(70) / 3
    );
}

#[test]
fn test_single_item_has_no_inter_arrival() {
    let base = Instant::now();
    let mut ledger = Ledger::new();
    let only = item(1, base, 0, 15);
    ledger.record_arrival(only);
    ledger.classify(only, Classification::Served);

    let stats = RunStatistics::compute(&ledger, base + Duration::from_secs(15));
    assert_eq!(stats.average_inter_arrival_time, Duration::ZERO);
    assert_eq!(stats.average_service_time, Duration::from_secs(15));
    assert_eq!(stats.average_waiting_time, Duration::from_secs(15));
}

#[test]
fn test_empty_ledger() {
    let stats = RunStatistics::compute(&Ledger::new(), Instant::now());
    assert_eq!(stats, RunStatistics::default());
}

#[test]
fn test_classification_partition() {
    let base = Instant::now();
    let mut ledger = Ledger::new();
    for id in 1..=6 {
        let it = item(id, base, id, 10);
        ledger.record_arrival(it);
        assert_eq!(ledger.pending(), 1);
        let bucket = if id % 3 == 0 {
            Classification::Unserved
        } else {
            Classification::Served
        };
        ledger.classify(it, bucket);
    }

    assert_eq!(ledger.pending(), 0);
    assert_eq!(ledger.served().len() + ledger.unserved().len(), ledger.generated().len());
    assert!(ledger
        .served()
        .iter()
        .all(|s| ledger.unserved().iter().all(|u| u.id != s.id)));
}
