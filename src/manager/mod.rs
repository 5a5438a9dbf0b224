//! # Dispatcher
//!
//! The [ElevatorManager] owns the elevator fleet. Its loop pops floors from the building's
//! [crate::building::CallQueue] and hands each one to the running elevator with the lowest
//! workload score ([task_allocator::select_elevator]). It also owns the fleet lifecycle
//! (registration, start, coordinated shutdown) and the emergency history.

pub mod task_allocator;

pub use crate::elevator_logic::EmergencyReport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::building::Building;
use crate::config::Timing;
use crate::elevator_logic::Elevator;
use crate::error::DispatchError;
use crate::event_log::{ElevatorEvent, EventKind, EventSink};
use crate::print;
use crate::world_view::{Level, OperationState, WorldView};

/// Result of one dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No floor was waiting.
    Idle,
    /// The floor was appended to an elevator's task list.
    Assigned {
        /// Floor level
        level: Level,
        /// Id of the chosen elevator
        elevator: u32,
        /// Its workload score at the time
        score: u32,
    },
    /// No elevator was running. The floor went back to the tail of the queue.
    Requeued {
        /// Floor level
        level: Level,
    },
}

/// The dispatcher.
pub struct ElevatorManager {
    building: Arc<Building>,
    timing: Timing,
    sink: Arc<dyn EventSink>,
    elevators: RwLock<Vec<Arc<Elevator>>>,
    shut_down: AtomicBool,
    emergency_tx: mpsc::UnboundedSender<EmergencyReport>,
    emergency_rx: Mutex<mpsc::UnboundedReceiver<EmergencyReport>>,
    emergencies: Mutex<Vec<EmergencyReport>>,
}

impl ElevatorManager {
    /// Creates a dispatcher for `building` with no elevators.
    pub fn new(building: Arc<Building>, timing: Timing, sink: Arc<dyn EventSink>) -> Arc<Self> {
        let (emergency_tx, emergency_rx) = mpsc::unbounded_channel::<EmergencyReport>();
        Arc::new(Self {
            building,
            timing,
            sink,
            elevators: RwLock::new(Vec::new()),
            shut_down: AtomicBool::new(false),
            emergency_tx,
            emergency_rx: Mutex::new(emergency_rx),
            emergencies: Mutex::new(Vec::new()),
        })
    }

    /// Adds `count` elevators, all in `Shutdown` at the home level.
    ///
    /// Ids continue from the elevators already registered, starting at 1.
    ///
    /// ## Returns
    /// The ids of the new elevators, or [DispatchError::ShutDown] after [ElevatorManager::shutdown].
    pub async fn register_elevators(
        &self,
        count: u32,
        weight_capacity: u32,
        passenger_capacity: usize,
    ) -> Result<Vec<u32>, DispatchError> {
        if self.is_shut_down() {
            return Err(DispatchError::ShutDown);
        }
        let mut elevators = self.elevators.write().await;
        let first = elevators.len() as u32 + 1;
        let ids: Vec<u32> = (first..first + count).collect();
        for id in &ids {
            elevators.push(Arc::new(Elevator::new(
                *id,
                self.building.clone(),
                self.timing,
                weight_capacity,
                passenger_capacity,
                self.sink.clone(),
                self.emergency_tx.clone(),
            )));
        }
        Ok(ids)
    }

    /// Starts every elevator, then spawns the dispatch loop.
    ///
    /// An elevator that refuses to start is reported to the event sink and left out of dispatch.
    ///
    /// ## Returns
    /// Handle of the dispatch loop. It ends after [ElevatorManager::shutdown].
    pub async fn start(self: &Arc<Self>) -> JoinHandle<()> {
        for elevator in self.elevators().await {
            match elevator.start().await {
                Ok(()) => print::ok(format!("Elevator #{} running", elevator.id())),
                Err(e) => {
                    let level = elevator.current_floor().await;
                    self.sink.record(ElevatorEvent::elevator(
                        elevator.id(),
                        level,
                        EventKind::StartRefused { reason: e.to_string() },
                    ));
                }
            }
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run().await;
        })
    }

    async fn run(&self) {
        while !self.is_shut_down() {
            sleep(self.timing.poll()).await;
            self.drain_emergencies().await;
            if self.is_shut_down() {
                break;
            }
            self.dispatch_once().await;
        }
        self.drain_emergencies().await;
    }

    /// Appends `level` to the pending queue. Never blocks.
    pub fn enqueue(&self, level: Level) {
        self.building.calls().push(level);
    }

    /// Runs one assignment: pops the oldest pending floor and gives it to the best elevator.
    pub async fn dispatch_once(&self) -> DispatchOutcome {
        let calls = self.building.calls();
        let Some(level) = calls.pop().await else {
            return DispatchOutcome::Idle;
        };

        let elevators = self.elevators().await;
        let mut snapshots = Vec::with_capacity(elevators.len());
        for elevator in &elevators {
            snapshots.push(elevator.snapshot().await);
        }

        match task_allocator::select_elevator(&snapshots, level) {
            Some((index, score)) => {
                let elevator = &elevators[index];
                elevator.add_task(level).await;
                self.sink.record(ElevatorEvent::elevator(elevator.id(), level, EventKind::Assigned { score }));
                DispatchOutcome::Assigned { level, elevator: elevator.id(), score }
            }
            None => {
                calls.push(level);
                self.sink.record(ElevatorEvent::floor(level, EventKind::Requeued));
                DispatchOutcome::Requeued { level }
            }
        }
    }

    /// Stops dispatching and stops every elevator, one after the other.
    ///
    /// Each elevator finishes its current sequence, returns home and parks. No elevators can be
    /// registered afterwards.
    ///
    /// ## Returns
    /// Id and final state of every elevator.
    pub async fn shutdown(&self) -> Vec<(u32, OperationState)> {
        self.shut_down.store(true, Ordering::SeqCst);
        let mut states = Vec::new();
        for elevator in self.elevators().await {
            let state = elevator.request_stop().await;
            states.push((elevator.id(), state));
        }
        self.drain_emergencies().await;
        states
    }

    /// True after [ElevatorManager::shutdown] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Records an emergency. No corrective action is taken.
    pub async fn notify_emergency(&self, report: EmergencyReport) {
        print::err(format!(
            "Emergency: elevator #{} at floor {}: {}",
            report.elevator, report.level, report.reason
        ));
        self.emergencies.lock().await.push(report);
    }

    async fn drain_emergencies(&self) {
        let mut received = Vec::new();
        {
            let mut rx = self.emergency_rx.lock().await;
            while let Ok(report) = rx.try_recv() {
                received.push(report);
            }
        }
        for report in received {
            self.notify_emergency(report).await;
        }
    }

    /// Every emergency reported so far, oldest first
    pub async fn emergency_reports(&self) -> Vec<EmergencyReport> {
        self.drain_emergencies().await;
        self.emergencies.lock().await.clone()
    }

    /// All registered elevators in id order
    pub async fn elevators(&self) -> Vec<Arc<Elevator>> {
        self.elevators.read().await.clone()
    }

    /// Looks up an elevator by id
    pub async fn elevator(&self, id: u32) -> Option<Arc<Elevator>> {
        self.elevators.read().await.iter().find(|e| e.id() == id).cloned()
    }

    /// The building served
    pub fn building(&self) -> &Arc<Building> {
        &self.building
    }

    /// Snapshot of every elevator and floor plus the pending call count.
    pub async fn world_view(&self) -> WorldView {
        let mut elevators = Vec::new();
        for elevator in self.elevators().await {
            elevators.push(elevator.snapshot().await);
        }
        WorldView {
            elevators,
            floors: self.building.floor_snapshots().await,
            pending_calls: self.building.calls().len(),
        }
    }
}
