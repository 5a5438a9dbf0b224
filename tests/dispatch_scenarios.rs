//! End-to-end runs of dispatcher and elevators on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use liftsim::building::Building;
use liftsim::config::Timing;
use liftsim::elevator_logic::{Boarding, OverloadRejection};
use liftsim::error::ElevatorError;
use liftsim::event_log::{EventKind, MemorySink};
use liftsim::manager::ElevatorManager;
use liftsim::world_view::{Level, OperationState, WorldView};

async fn system(
    lowest: Level,
    highest: Level,
    docking_failure_probability: f64,
    elevators: u32,
    weight_capacity: u32,
    passenger_capacity: usize,
) -> (Arc<Building>, Arc<ElevatorManager>, Arc<MemorySink>) {
    let building = Building::new(lowest, highest, 1, docking_failure_probability).unwrap();
    let sink = Arc::new(MemorySink::new());
    let manager = ElevatorManager::new(building.clone(), Timing::default(), sink.clone());
    manager
        .register_elevators(elevators, weight_capacity, passenger_capacity)
        .await
        .unwrap();
    (building, manager, sink)
}

/// Polls the world view every 100 ms of simulated time until `done` holds.
async fn wait_for(manager: &ElevatorManager, mut done: impl FnMut(&WorldView) -> bool) -> WorldView {
    for _ in 0..12_000 {
        let wv = manager.world_view().await;
        for e in &wv.elevators {
            assert!(e.load <= e.weight_capacity, "elevator #{} overloaded", e.id);
            assert!(e.occupants <= e.passenger_capacity, "elevator #{} overfull", e.id);
        }
        if done(&wv) {
            return wv;
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("simulation did not settle");
}

async fn call(building: &Building, origin: Level, destination: Level, weight: u32) -> u64 {
    let passenger = building.passenger(origin, destination, weight).unwrap();
    let id = passenger.id();
    building.floor(origin).unwrap().call_button(passenger).await.unwrap();
    id
}

#[tokio::test(start_paused = true)]
async fn single_passenger_reaches_destination() {
    let (building, manager, sink) = system(1, 3, 0.0, 1, 200, 2).await;
    let dispatcher = manager.start().await;

    let id = call(&building, 1, 3, 70).await;

    let wv = wait_for(&manager, |wv| {
        let e = &wv.elevators[0];
        e.current_floor == 3 && e.occupants == 0 && e.tasks.is_empty()
    })
    .await;
    assert_eq!(wv.elevators[0].load, 0);
    assert_eq!(wv.waiting(), 0);

    // Round trip: loaded once, unloaded once at the destination, never back in a queue
    let loaded = sink.count(|e| e.kind == EventKind::Loaded { passenger: id, destination: 3 });
    let unloaded: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Unloaded { passenger: id })
        .collect();
    assert_eq!(loaded, 1);
    assert_eq!(unloaded.len(), 1);
    assert_eq!(unloaded[0].level, 3);
    assert_eq!(unloaded[0].elevator, Some(1));

    let states = manager.shutdown().await;
    assert_eq!(states, vec![(1, OperationState::Shutdown)]);
    dispatcher.await.unwrap();

    let wv = manager.world_view().await;
    assert_eq!(wv.elevators[0].current_floor, 1);
    assert_eq!(wv.pending_calls, 0);
    assert_eq!(sink.count(|e| e.kind == EventKind::Unloaded { passenger: id }), 1);
}

#[tokio::test(start_paused = true)]
async fn overloaded_passenger_waits_for_next_trip() {
    let (building, manager, sink) = system(1, 3, 0.0, 1, 500, 2).await;
    let dispatcher = manager.start().await;

    let ids = [
        call(&building, 1, 3, 70).await,
        call(&building, 1, 3, 80).await,
        call(&building, 1, 3, 90).await,
    ];

    wait_for(&manager, |_| {
        sink.count(|e| matches!(e.kind, EventKind::Rejected { .. })) > 0
    })
    .await;
    let rejected = sink
        .events()
        .into_iter()
        .find(|e| matches!(e.kind, EventKind::Rejected { .. }))
        .unwrap();
    assert_eq!(
        rejected.kind,
        EventKind::Rejected { passenger: ids[2], reason: OverloadRejection::Passengers { capacity: 2 } }
    );

    // The refused passenger is still first in line at floor 1
    {
        let floor = building.floor(1).unwrap();
        let queue = floor.queue_for(liftsim::world_view::Dirn::Up).unwrap().lock().await;
        assert_eq!(queue.front().map(|p| p.id()), Some(ids[2]));
    }

    wait_for(&manager, |wv| wv.is_quiescent()).await;
    for id in ids {
        assert_eq!(sink.count(|e| e.kind == EventKind::Unloaded { passenger: id }), 1);
    }

    manager.shutdown().await;
    dispatcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn two_elevators_deliver_everyone_once() {
    let (building, manager, sink) = system(1, 10, 0.0, 2, 1300, 11).await;
    let dispatcher = manager.start().await;

    let trips = [(2, 8), (9, 1), (5, 6), (7, 3), (9, 10), (3, 2)];
    let mut ids = Vec::new();
    for (origin, destination) in trips {
        ids.push(call(&building, origin, destination, 75).await);
        sleep(Duration::from_millis(600)).await;
    }

    wait_for(&manager, |wv| wv.is_quiescent()).await;

    for (id, (_, destination)) in ids.iter().zip(trips) {
        assert_eq!(
            sink.count(|e| e.kind == EventKind::Loaded { passenger: *id, destination }),
            1
        );
        let unloads: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.kind == EventKind::Unloaded { passenger: *id })
            .collect();
        assert_eq!(unloads.len(), 1);
        assert_eq!(unloads[0].level, destination);
    }
    assert!(manager.emergency_reports().await.is_empty());

    let states = manager.shutdown().await;
    assert!(states.iter().all(|(_, s)| *s == OperationState::Shutdown));
    dispatcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn docking_failure_traps_passengers_until_reset() {
    let (building, manager, sink) = system(1, 5, 1.0, 1, 1300, 11).await;
    let elevator = manager.elevator(1).await.unwrap();
    let passenger = building.passenger(1, 4, 80).unwrap();
    let id = passenger.id();
    assert_eq!(elevator.receive_passenger(passenger).await, Boarding::Boarded);

    let dispatcher = manager.start().await;
    wait_for(&manager, |wv| wv.elevators[0].operation == OperationState::Emergency).await;

    // No evacuation after a docking failure
    assert_eq!(elevator.occupants().await.len(), 1);
    assert_eq!(elevator.current_floor().await, 4);
    assert_eq!(sink.count(|e| e.kind == EventKind::DockingFailed), 1);
    assert_eq!(sink.count(|e| matches!(e.kind, EventKind::Evacuated { .. })), 0);

    let reports = manager.emergency_reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].elevator, 1);
    assert_eq!(reports[0].level, 4);
    assert!(reports[0].docking_failure);

    // Start is refused until an external reset
    assert_eq!(elevator.start().await, Err(ElevatorError::Malfunction { elevator: 1 }));
    assert_eq!(elevator.operation().await, OperationState::Emergency);

    assert!(elevator.reset_alert().await);
    assert_eq!(elevator.operation().await, OperationState::Shutdown);
    assert!(elevator.occupants().await.is_empty());
    assert!(elevator.tasks().await.is_empty());
    assert_eq!(sink.count(|e| e.kind == EventKind::Evacuated { passenger: id }), 1);

    elevator.start().await.unwrap();
    assert_eq!(elevator.operation().await, OperationState::Running);

    // Docking still fails, so the way home ends in emergency too
    let states = manager.shutdown().await;
    assert_eq!(states, vec![(1, OperationState::Emergency)]);
    dispatcher.await.unwrap();
    assert_eq!(manager.emergency_reports().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fault_outside_docking_evacuates() {
    let (building, manager, sink) = system(1, 5, 0.0, 1, 1300, 11).await;
    let elevator = manager.elevator(1).await.unwrap();
    elevator.add_task(9).await;
    let passenger = building.passenger(1, 3, 80).unwrap();
    let id = passenger.id();
    elevator.receive_passenger(passenger).await;

    let dispatcher = manager.start().await;
    wait_for(&manager, |wv| wv.elevators[0].operation == OperationState::Emergency).await;

    assert!(elevator.occupants().await.is_empty());
    let evacuated: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Evacuated { passenger: id })
        .collect();
    assert_eq!(evacuated.len(), 1);
    assert_eq!(evacuated[0].level, 5);

    let reports = manager.emergency_reports().await;
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].docking_failure);

    manager.shutdown().await;
    dispatcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_returns_home_and_releases_everyone() {
    let (building, manager, sink) = system(1, 6, 0.0, 1, 1300, 11).await;
    let elevator = manager.elevator(1).await.unwrap();
    let far = building.passenger(1, 6, 70).unwrap();
    let near = building.passenger(1, 4, 70).unwrap();
    let near_id = near.id();
    elevator.receive_passenger(far).await;
    elevator.receive_passenger(near).await;

    let dispatcher = manager.start().await;
    sleep(Duration::from_secs(1)).await;

    let states = manager.shutdown().await;
    assert_eq!(states, vec![(1, OperationState::Shutdown)]);
    dispatcher.await.unwrap();

    let snapshot = elevator.snapshot().await;
    assert_eq!(snapshot.current_floor, 1);
    assert_eq!(snapshot.occupants, 0);
    assert!(snapshot.tasks.is_empty());

    let released: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Unloaded { passenger: near_id })
        .collect();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].level, 1);
    assert_eq!(sink.count(|e| e.kind == EventKind::Shutdown), 1);
}

#[tokio::test(start_paused = true)]
async fn calls_wait_while_no_elevator_runs() {
    let (building, manager, sink) = system(1, 4, 0.0, 1, 1300, 11).await;
    let dispatcher = manager.start().await;
    let elevator = manager.elevator(1).await.unwrap();
    assert_eq!(elevator.request_stop().await, OperationState::Shutdown);

    let id = call(&building, 3, 1, 60).await;
    sleep(Duration::from_secs(2)).await;
    assert!(sink.count(|e| e.kind == EventKind::Requeued) > 0);
    assert_eq!(manager.world_view().await.waiting(), 1);

    elevator.start().await.unwrap();
    wait_for(&manager, |wv| wv.is_quiescent()).await;
    assert_eq!(sink.count(|e| e.kind == EventKind::Unloaded { passenger: id }), 1);

    manager.shutdown().await;
    dispatcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn heavy_passenger_does_not_strand_those_behind() {
    let (building, manager, sink) = system(1, 4, 0.0, 1, 150, 5).await;
    let dispatcher = manager.start().await;

    let heavy = call(&building, 1, 3, 200).await;
    let light = call(&building, 1, 3, 60).await;

    wait_for(&manager, |_| sink.count(|e| e.kind == EventKind::Unloaded { passenger: light }) == 1).await;
    let unloaded = sink
        .events()
        .into_iter()
        .find(|e| e.kind == EventKind::Unloaded { passenger: light })
        .unwrap();
    assert_eq!(unloaded.level, 3);
    assert_eq!(sink.count(|e| e.kind == EventKind::Loaded { passenger: heavy, destination: 3 }), 0);

    // Still first in line at floor 1
    {
        let floor = building.floor(1).unwrap();
        let queue = floor.queue_for(liftsim::world_view::Dirn::Up).unwrap().lock().await;
        assert_eq!(queue.iter().map(|p| p.id()).collect::<Vec<_>>(), vec![heavy]);
    }

    manager.shutdown().await;
    dispatcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn assigned_call_survives_emergency_and_reset() {
    let (building, manager, sink) = system(1, 5, 0.0, 1, 1300, 11).await;
    let elevator = manager.elevator(1).await.unwrap();
    elevator.add_task(9).await;

    let dispatcher = manager.start().await;
    let id = call(&building, 3, 1, 60).await;

    let wv = wait_for(&manager, |wv| wv.elevators[0].operation == OperationState::Emergency).await;
    assert!(wv.elevators[0].tasks.contains(&3));
    assert_eq!(wv.waiting(), 1);

    assert!(elevator.reset_alert().await);
    assert!(elevator.tasks().await.is_empty());
    elevator.start().await.unwrap();

    wait_for(&manager, |wv| wv.is_quiescent()).await;
    let unloads: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Unloaded { passenger: id })
        .collect();
    assert_eq!(unloads.len(), 1);
    assert_eq!(unloads[0].level, 1);

    manager.shutdown().await;
    dispatcher.await.unwrap();
}
