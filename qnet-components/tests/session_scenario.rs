//! End-to-end session behavior: admission, drops, service progression, and
//! topology churn driven through the public trigger surface.

use qnet_components::{
    AutoSendPriority, Priority, RequestId, ServerSnapshot, ServiceTimeConfig, Session,
    SessionConfig, SlotPosition, TopologyError,
};
use qnet_core::SimTime;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Capacity-2 queue, service duration of one tick.
fn scenario_config() -> SessionConfig {
    SessionConfig {
        queue_capacity: 2,
        tick: TICK,
        service_time: ServiceTimeConfig::Constant { duration: TICK },
        send_interval: Duration::from_millis(1500),
        auto_priority: AutoSendPriority::NormalOnly,
    }
}

#[test]
fn test_admissions_then_one_tick() {
    let mut session = Session::new(scenario_config());
    session.add_queue().unwrap();

    // Three requests in immediate succession, no ticks elapsing: the first
    // two are admitted, the third is dropped.
    assert!(session.client_click(Priority::Normal).is_admitted());
    assert!(session.client_click(Priority::Normal).is_admitted());
    assert!(session.client_click(Priority::Normal).is_dropped());
    assert_eq!(session.total_dropped(), 1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.slots[0].queue_len(), 2);
    assert_eq!(snapshot.slots[0].server, ServerSnapshot::Idle);

    // One clock tick later the server is busy with request 1 and one
    // request remains queued.
    session.run_until(SimTime::from_duration(TICK));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.slots[0].queue_len(), 1);
    assert_eq!(
        snapshot.slots[0].server,
        ServerSnapshot::Busy {
            request: RequestId(1),
            remaining: TICK,
        }
    );

    // Next tick: request 1 completes and the server turns around into
    // request 2 on the same tick.
    session.run_until(SimTime::from_duration(TICK * 2));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.slots[0].queue_len(), 0);
    assert_eq!(
        snapshot.slots[0].server,
        ServerSnapshot::Busy {
            request: RequestId(2),
            remaining: TICK,
        }
    );

    // And one more: the queue has drained completely.
    session.run_until(SimTime::from_duration(TICK * 3));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.slots[0].server, ServerSnapshot::Idle);
    assert_eq!(session.total_dropped(), 1);
}

#[test]
fn test_conservation_with_zero_admits() {
    // No queue is ever added, so every routed request must be dropped and
    // counted exactly once.
    let mut session = Session::new(scenario_config());

    for _ in 0..25 {
        assert!(session.client_click(Priority::Normal).is_dropped());
    }
    assert_eq!(session.total_dropped(), 25);
}

#[test]
fn test_capacity_never_exceeded_under_burst() {
    let mut session = Session::new(scenario_config());
    session.add_queue().unwrap();

    for _ in 0..20 {
        session.client_click(Priority::Normal);
        let snapshot = session.snapshot();
        assert!(snapshot.slots[0].queue_len() <= 2);
    }
    // 20 attempts against a capacity-2 queue with no ticks: 2 admitted.
    assert_eq!(session.total_dropped(), 18);
}

#[test]
fn test_priority_insertion_and_no_preemption() {
    let mut session = Session::new(SessionConfig {
        queue_capacity: 5,
        ..scenario_config()
    });
    session.add_queue().unwrap();

    // N1 enters service on the first tick; N2, N3 remain queued.
    session.client_click(Priority::Normal);
    session.run_until(SimTime::from_duration(TICK));
    session.client_click(Priority::Normal);
    session.client_click(Priority::Normal);

    // A high priority arrival goes to the head of the queue but does not
    // preempt the normal request in service.
    session.client_click(Priority::High);

    let snapshot = session.snapshot();
    let queued: Vec<(RequestId, Priority)> = snapshot.slots[0]
        .queue
        .iter()
        .map(|request| (request.id, request.priority))
        .collect();
    assert_eq!(
        queued,
        vec![
            (RequestId(4), Priority::High),
            (RequestId(2), Priority::Normal),
            (RequestId(3), Priority::Normal),
        ]
    );
    assert_eq!(
        snapshot.slots[0].server,
        ServerSnapshot::Busy {
            request: RequestId(1),
            remaining: TICK,
        }
    );

    // When the server frees up, the high priority request is served next.
    session.run_until(SimTime::from_duration(TICK * 2));
    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.slots[0].server,
        ServerSnapshot::Busy {
            request: RequestId(4),
            remaining: TICK,
        }
    );
}

#[test]
fn test_topology_add_remove_order() {
    let mut session = Session::new(scenario_config());

    assert_eq!(session.add_queue(), Ok(SlotPosition::Center));
    assert_eq!(session.add_queue(), Ok(SlotPosition::Top));
    assert_eq!(session.add_queue(), Ok(SlotPosition::Bottom));
    assert_eq!(
        session.add_queue(),
        Err(TopologyError::AtCapacity { max: 3 })
    );

    let positions: Vec<SlotPosition> = session
        .snapshot()
        .slots
        .iter()
        .map(|slot| slot.position)
        .collect();
    assert_eq!(
        positions,
        vec![SlotPosition::Center, SlotPosition::Top, SlotPosition::Bottom]
    );

    assert_eq!(session.remove_queue(), Ok(SlotPosition::Bottom));
    let positions: Vec<SlotPosition> = session
        .snapshot()
        .slots
        .iter()
        .map(|slot| slot.position)
        .collect();
    assert_eq!(positions, vec![SlotPosition::Center, SlotPosition::Top]);

    assert_eq!(session.remove_queue(), Ok(SlotPosition::Top));
    assert_eq!(session.remove_queue(), Ok(SlotPosition::Center));
    assert_eq!(session.remove_queue(), Err(TopologyError::Empty));
    assert_eq!(session.snapshot().slots.len(), 0);
}

#[test]
fn test_removing_populated_slot_counts_drops() {
    let mut session = Session::new(SessionConfig {
        queue_capacity: 5,
        ..scenario_config()
    });
    session.add_queue().unwrap();

    // One request in service, two queued.
    session.client_click(Priority::Normal);
    session.run_until(SimTime::from_duration(TICK));
    session.client_click(Priority::Normal);
    session.client_click(Priority::Normal);

    session.remove_queue().unwrap();
    assert_eq!(session.total_dropped(), 3);
}

#[test]
fn test_routing_prefers_least_loaded_queue() {
    let mut session = Session::new(SessionConfig {
        queue_capacity: 5,
        ..scenario_config()
    });
    session.add_queue().unwrap();
    session.add_queue().unwrap();

    // No ticks elapse, so nothing drains; arrivals spread round-robin
    // across the two empty queues via the least-loaded rule.
    for _ in 0..4 {
        session.client_click(Priority::Normal);
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.slots[0].queue_len(), 2);
    assert_eq!(snapshot.slots[1].queue_len(), 2);
}
