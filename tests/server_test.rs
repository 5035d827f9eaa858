//! Integration tests for servers and their threads
//!
//! These tests validate:
//! - Capacity invariant under concurrent admitters and a live consumer
//! - FIFO completion order per server
//! - Prompt, idempotent stop while an item is mid-service

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use multiqueue_sim::core::{Server, ServerId, ServiceOutcome, SimulatedService, WorkItem};
use multiqueue_sim::runtime::{spawn_server, ServerStatus};

// ============================================================================
// CAPACITY
// ============================================================================

#[test]
fn test_concurrent_admitters_never_exceed_capacity() {
    const CAPACITY: usize = 8;
    const ADMITTERS: usize = 8;
    const ATTEMPTS: u64 = 500;

    let server = Arc::new(Server::new(ServerId(0), CAPACITY));
    let barrier = Arc::new(Barrier::new(ADMITTERS + 1));
    let done = Arc::new(AtomicBool::new(false));
    let admitted = Arc::new(AtomicUsize::new(0));

    let observer = {
        let server = Arc::clone(&server);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut max_seen = 0;
            let mut consumed = 0;
            while !done.load(Ordering::SeqCst) {
                max_seen = max_seen.max(server.queue_depth());
                if server.queue_depth() > 0 && server.next_item().is_some() {
                    consumed += 1;
                }
            }
            (max_seen, consumed)
        })
    };

    let admitters: Vec<_> = (0..ADMITTERS)
        .map(|t| {
            let server = Arc::clone(&server);
            let barrier = Arc::clone(&barrier);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                barrier.wait();
                for n in 0..ATTEMPTS {
                    let id = t as u64 * ATTEMPTS + n;
                    if server.try_admit(WorkItem::new(id, Duration::from_millis(1))) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                    assert!(server.queue_depth() <= CAPACITY);
                }
            })
        })
        .collect();

    barrier.wait();
    for handle in admitters {
        handle.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    let (max_seen, consumed) = observer.join().unwrap();

    let remaining = server.queue_depth();
    assert!(max_seen <= CAPACITY);
    assert!(remaining <= CAPACITY);
    assert_eq!(admitted.load(Ordering::SeqCst), consumed + remaining);
    assert_eq!(server.stats().served_count, consumed as u64);
}

#[test]
fn test_full_queue_rejects_without_mutation() {
    let server = Server::new(ServerId(0), 1);
    let first = WorkItem::new(1, Duration::from_secs(10));
    assert!(server.try_admit(first));
    assert!(!server.try_admit(WorkItem::new(2, Duration::from_secs(10))));

    assert_eq!(server.queue_depth(), 1);
    assert_eq!(server.next_item(), Some(first));
}

// ============================================================================
// FIFO
// ============================================================================

#[test]
fn test_items_complete_in_admission_order() {
    let server = Arc::new(Server::new(ServerId(0), 3));
    for id in [10, 20, 30] {
        assert!(server.try_admit(WorkItem::new(id, Duration::from_millis(5))));
    }

    let (tx, rx) = crossbeam_channel::unbounded();
    let runtime = spawn_server(Arc::clone(&server), Arc::new(SimulatedService), tx).unwrap();

    let order: Vec<u64> = (0..3)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .inspect(|event| assert_eq!(event.outcome, ServiceOutcome::Completed))
        .map(|event| event.item.id)
        .collect();
    assert_eq!(order, vec![10, 20, 30]);

    runtime.stop();
    assert_eq!(runtime.join(), ServerStatus::Stopped);
    let stats = server.stats();
    assert_eq!(stats.served_count, 3);
    assert_eq!(stats.total_service_time, Duration::from_millis(15));
}

#[test]
fn test_service_is_one_item_at_a_time() {
    let server = Arc::new(Server::new(ServerId(0), 2));
    assert!(server.try_admit(WorkItem::new(1, Duration::from_millis(30))));
    assert!(server.try_admit(WorkItem::new(2, Duration::from_millis(30))));

    let (tx, rx) = crossbeam_channel::unbounded();
    let runtime = spawn_server(Arc::clone(&server), Arc::new(SimulatedService), tx).unwrap();

    let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(second.started_at >= first.finished_at);

    runtime.stop();
    runtime.join();
}

// ============================================================================
// STOP
// ============================================================================

#[test]
fn test_stop_interrupts_service_promptly() {
    let server = Arc::new(Server::new(ServerId(0), 2));
    assert!(server.try_admit(WorkItem::new(1, Duration::from_secs(60))));
    assert!(server.try_admit(WorkItem::new(2, Duration::from_secs(60))));

    let (tx, rx) = crossbeam_channel::unbounded();
    let runtime = spawn_server(Arc::clone(&server), Arc::new(SimulatedService), tx).unwrap();

    // Wait until the first item is being served.
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.stats().served_count == 0 {
        assert!(Instant::now() < deadline, "server never picked up the item");
        thread::sleep(Duration::from_millis(1));
    }

    let stopped_at = Instant::now();
    runtime.stop();
    runtime.stop();
    let status = runtime.join();
    assert!(stopped_at.elapsed() < Duration::from_secs(5));
    assert_eq!(status, ServerStatus::Stopped);

    let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(event.item.id, 1);
    assert_eq!(event.outcome, ServiceOutcome::Cancelled);

    // The second item was never started and stays queued.
    assert_eq!(server.drain_abandoned().len(), 1);
    server.stop();
}

#[test]
fn test_stop_idle_server() {
    let server = Arc::new(Server::new(ServerId(0), 1));
    let (tx, _rx) = crossbeam_channel::unbounded();
    let runtime = spawn_server(Arc::clone(&server), Arc::new(SimulatedService), tx).unwrap();

    thread::sleep(Duration::from_millis(10));
    runtime.stop();
    assert_eq!(runtime.join(), ServerStatus::Stopped);
    assert_eq!(server.stats().served_count, 0);
}
