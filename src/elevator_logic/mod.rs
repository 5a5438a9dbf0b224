//! # Elevator controller
//!
//! One [Elevator] per cab. Each runs its own tokio task that polls its task list and executes the
//! move, dock and door sequence for the head task (see [fsm]). The dispatcher only ever appends to
//! the task list and reads snapshots; everything else is owned by the controller loop.
//!
//! ## State machine
//! `Shutdown -> Running -> {Running, Emergency} -> Shutdown`
//!
//! - [Elevator::start]: `Shutdown -> Running`, refused with [ElevatorError::Malfunction] while in
//!   `Emergency`.
//! - [Elevator::request_stop]: the loop finishes its current sequence, travels home, releases
//!   everyone and parks in `Shutdown`.
//! - [Elevator::reset_alert]: external repair, `Emergency -> Shutdown`.

mod cabin;
mod fsm;
pub mod request;

pub use cabin::{Boarding, Cabin, OverloadRejection};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::building::{Building, Passenger};
use crate::config::Timing;
use crate::error::ElevatorError;
use crate::event_log::{ElevatorEvent, EventKind, EventSink};
use crate::print;
use crate::world_view::{Dirn, ElevatorSnapshot, Level, OperationState};

/// One-way notification from a controller that went into emergency mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyReport {
    /// Elevator id
    pub elevator: u32,
    /// Level the elevator was at
    pub level: Level,
    /// Human-readable cause
    pub reason: String,
    /// True if the cause was a docking failure, in which case nobody was evacuated
    pub docking_failure: bool,
}

/// Mutable state of a controller, guarded by one lock.
#[derive(Debug)]
struct ElevatorState {
    operation: OperationState,
    dirn: Dirn,
    current_floor: Level,
    tasks: Vec<Level>,
    cabin: Cabin,
}

/// An elevator controller.
pub struct Elevator {
    id: u32,
    building: Arc<Building>,
    timing: Timing,
    sink: Arc<dyn EventSink>,
    emergency_tx: mpsc::UnboundedSender<EmergencyReport>,
    state: Mutex<ElevatorState>,
    stop_requested: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Elevator {
    /// Creates a controller parked at the building's home level in `Shutdown`.
    ///
    /// ## Parameters
    /// - `id`: unique id, used in events and emergency reports
    /// - `weight_capacity`, `passenger_capacity`: cab limits
    /// - `sink`: receiver of every event this controller raises
    /// - `emergency_tx`: where emergency reports are sent
    pub fn new(
        id: u32,
        building: Arc<Building>,
        timing: Timing,
        weight_capacity: u32,
        passenger_capacity: usize,
        sink: Arc<dyn EventSink>,
        emergency_tx: mpsc::UnboundedSender<EmergencyReport>,
    ) -> Self {
        let home = building.home_level();
        Self {
            id,
            building,
            timing,
            sink,
            emergency_tx,
            state: Mutex::new(ElevatorState {
                operation: OperationState::Shutdown,
                dirn: Dirn::Idle,
                current_floor: home,
                tasks: Vec::new(),
                cabin: Cabin::new(weight_capacity, passenger_capacity),
            }),
            stop_requested: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    /// Elevator id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Starts the controller loop.
    ///
    /// ## Returns
    /// - `Ok(())` when the loop is running, including when it already was
    /// - [ElevatorError::Malfunction] while in `Emergency`. Nothing changes.
    pub async fn start(self: &Arc<Self>) -> Result<(), ElevatorError> {
        let mut handle = self.handle.lock().await;
        match self.operation().await {
            OperationState::Emergency => return Err(ElevatorError::Malfunction { elevator: self.id }),
            OperationState::Running => return Ok(()),
            OperationState::Shutdown => {}
        }

        // A loop that ended in an emergency may still be finishing up after a reset.
        if let Some(old) = handle.take() {
            let _ = old.await;
        }

        let level = {
            let mut state = self.state.lock().await;
            if state.operation == OperationState::Emergency {
                return Err(ElevatorError::Malfunction { elevator: self.id });
            }
            state.operation = OperationState::Running;
            state.current_floor
        };
        self.stop_requested.store(false, Ordering::SeqCst);

        let elevator = Arc::clone(self);
        *handle = Some(tokio::spawn(async move {
            elevator.run().await;
        }));
        self.record(level, EventKind::Started);
        Ok(())
    }

    /// Stops the controller.
    ///
    /// The current move-dock-exchange sequence completes, then the elevator travels to the home
    /// level, releases everyone on board there and parks in `Shutdown`. A failure on the way home
    /// leaves it in `Emergency` instead. Does nothing to a controller that is not running.
    ///
    /// ## Returns
    /// The state the controller ended in.
    pub async fn request_stop(&self) -> OperationState {
        let handle = self.handle.lock().await.take();
        let Some(handle) = handle else {
            return self.operation().await;
        };

        self.stop_requested.store(true, Ordering::SeqCst);
        if let Err(e) = handle.await {
            print::cosmic_err(format!("Elevator #{} loop aborted: {}", self.id, e));
            let level = {
                let mut state = self.state.lock().await;
                state.operation = OperationState::Emergency;
                state.current_floor
            };
            self.report_emergency(level, format!("controller loop aborted: {e}"), false);
        }
        self.operation().await
    }

    /// External repair of an elevator in `Emergency`.
    ///
    /// Clears the task list, releases anyone still trapped in the cab at the current level and
    /// moves to `Shutdown`, after which [Elevator::start] succeeds again. Cleared floors where
    /// passengers still wait go back to the dispatcher.
    ///
    /// ## Returns
    /// `false` if the elevator was not in `Emergency`. Nothing changes in that case.
    pub async fn reset_alert(&self) -> bool {
        let (level, trapped, dropped) = {
            let mut state = self.state.lock().await;
            if state.operation != OperationState::Emergency {
                return false;
            }
            state.operation = OperationState::Shutdown;
            state.dirn = Dirn::Idle;
            let dropped = std::mem::take(&mut state.tasks);
            (state.current_floor, state.cabin.evacuate(), dropped)
        };
        for passenger in trapped {
            self.record(level, EventKind::Evacuated { passenger: passenger.id() });
        }
        self.release_tasks(dropped).await;
        self.record(level, EventKind::Reset);
        true
    }

    /// Appends a target level to the task list. Duplicates are kept.
    pub async fn add_task(&self, level: Level) {
        self.state.lock().await.tasks.push(level);
    }

    /// Boards `passenger` directly, bypassing the floor queues.
    ///
    /// On success the destination is appended to the task list. A rejection leaves the elevator
    /// unchanged and hands the passenger back.
    pub async fn receive_passenger(&self, passenger: Passenger) -> Boarding {
        let (id, destination) = (passenger.id(), passenger.destination());
        let (level, outcome) = {
            let mut state = self.state.lock().await;
            let outcome = state.cabin.try_board(passenger);
            if outcome == Boarding::Boarded {
                state.tasks.push(destination);
            }
            (state.current_floor, outcome)
        };
        match &outcome {
            Boarding::Boarded => self.record(level, EventKind::Loaded { passenger: id, destination }),
            Boarding::Rejected(_, reason) => {
                self.record(level, EventKind::Rejected { passenger: id, reason: *reason })
            }
        }
        outcome
    }

    /// Workload score for a call at `target`. See [request::work_load].
    pub async fn work_load(&self, target: Level) -> u32 {
        let state = self.state.lock().await;
        request::work_load(state.dirn, state.current_floor, state.tasks.len(), target)
    }

    /// Current operational state
    pub async fn operation(&self) -> OperationState {
        self.state.lock().await.operation
    }

    /// Level the cab is at
    pub async fn current_floor(&self) -> Level {
        self.state.lock().await.current_floor
    }

    /// Pending target levels in order
    pub async fn tasks(&self) -> Vec<Level> {
        self.state.lock().await.tasks.clone()
    }

    /// Passengers on board
    pub async fn occupants(&self) -> Vec<Passenger> {
        self.state.lock().await.cabin.occupants().to_vec()
    }

    /// Point-in-time copy of the controller state.
    pub async fn snapshot(&self) -> ElevatorSnapshot {
        let state = self.state.lock().await;
        ElevatorSnapshot {
            id: self.id,
            operation: state.operation,
            dirn: state.dirn,
            current_floor: state.current_floor,
            tasks: state.tasks.clone(),
            occupants: state.cabin.occupants().len(),
            load: state.cabin.load(),
            weight_capacity: state.cabin.weight_capacity(),
            passenger_capacity: state.cabin.passenger_capacity(),
        }
    }

    /// Pushes every distinct level in `dropped` with passengers still waiting back onto the
    /// building's call queue.
    async fn release_tasks(&self, dropped: Vec<Level>) {
        let mut seen = Vec::new();
        for level in dropped {
            if seen.contains(&level) {
                continue;
            }
            seen.push(level);
            let Ok(floor) = self.building.floor(level) else {
                continue;
            };
            if floor.waiting_total().await > 0 {
                self.building.calls().push(level);
            }
        }
    }

    fn record(&self, level: Level, kind: EventKind) {
        self.sink.record(ElevatorEvent::elevator(self.id, level, kind));
    }

    fn report_emergency(&self, level: Level, reason: String, docking_failure: bool) {
        self.record(level, EventKind::Emergency { reason: reason.clone() });
        // The dispatcher may already be gone during teardown.
        let _ = self.emergency_tx.send(EmergencyReport {
            elevator: self.id,
            level,
            reason,
            docking_failure,
        });
    }
}
