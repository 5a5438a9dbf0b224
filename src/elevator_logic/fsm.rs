//! Controller loop and the move, dock and door sequence.
//!
//! Every pause here is a fixed [Timing] duration. The state lock is never held across a pause.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::time::sleep;

use super::{request, Boarding, Elevator, OverloadRejection};
use crate::error::ElevatorError;
use crate::event_log::EventKind;
use crate::world_view::{Dirn, Level, OperationState};

impl Elevator {
    /// The controller loop. Ends when the elevator leaves `Running`.
    pub(super) async fn run(self: Arc<Self>) {
        loop {
            sleep(self.timing.poll()).await;

            if self.operation().await != OperationState::Running {
                break;
            }
            if self.stop_requested.load(Ordering::SeqCst) {
                self.go_home().await;
                break;
            }

            let head = {
                let mut state = self.state.lock().await;
                let head = state.tasks.first().copied();
                if head.is_none() {
                    state.dirn = Dirn::Idle;
                }
                head
            };

            if let Some(target) = head {
                if let Err(e) = self.serve(target).await {
                    self.handle_failure(e).await;
                    break;
                }
            }
        }
    }

    /// Move toward `target`, stopping early at a passing task floor with passengers waiting, then
    /// dock and run the door cycle there.
    async fn serve(&self, target: Level) -> Result<(), ElevatorError> {
        let stop_at = self.travel(target, true).await?;
        self.dock(stop_at).await?;
        self.door_cycle(stop_at).await
    }

    /// Steps one level at a time toward `target`, skipping level 0.
    ///
    /// With `opportunistic` set, every level reached on the way is checked with
    /// [request::should_interrupt] and the move ends there if it qualifies.
    ///
    /// ## Returns
    /// The level the move ended at.
    async fn travel(&self, target: Level, opportunistic: bool) -> Result<Level, ElevatorError> {
        let mut moved = false;
        loop {
            let (current, dirn, tasks) = {
                let state = self.state.lock().await;
                let current = state.current_floor;
                (current, Dirn::between(current, target), state.tasks.clone())
            };
            if dirn == Dirn::Idle {
                return Ok(current);
            }
            // The starting floor was just serviced, so only floors reached by moving are checked.
            if opportunistic && moved {
                let waiting = self.building.floor(current)?.waiting(dirn).await;
                if request::should_interrupt(&tasks, current, target, waiting) {
                    return Ok(current);
                }
            }

            let next = self.building.next_level(current, dirn)?;
            self.state.lock().await.dirn = dirn;
            if !moved {
                self.record(current, EventKind::Departed { dirn });
            }
            sleep(self.timing.travel_per_level()).await;
            self.state.lock().await.current_floor = next;
            moved = true;
        }
    }

    /// Aligns the cab with the floor at `level`.
    async fn dock(&self, level: Level) -> Result<(), ElevatorError> {
        self.record(level, EventKind::Arrived);
        sleep(self.timing.docking()).await;
        let floor = self.building.floor(level)?;
        if let Err(e) = floor.confirm_docking(self.id) {
            self.record(level, EventKind::DockingFailed);
            return Err(e);
        }
        Ok(())
    }

    /// Opens the doors, lets out everyone who has arrived, boards waiting passengers and closes
    /// the doors again. The serviced level is then removed from the task list.
    ///
    /// If anyone is left waiting at the floor and no other visit is planned, the floor goes back
    /// in the dispatcher's queue so another elevator can take them.
    async fn door_cycle(&self, level: Level) -> Result<(), ElevatorError> {
        sleep(self.timing.door_open()).await;

        let arrived = self.state.lock().await.cabin.alight_at(level);
        for passenger in arrived {
            self.record(level, EventKind::Unloaded { passenger: passenger.id() });
        }
        self.load(level).await?;

        sleep(self.timing.door_close()).await;

        let still_planned = {
            let mut state = self.state.lock().await;
            request::remove_task(&mut state.tasks, level);
            state.tasks.contains(&level)
        };
        let floor = self.building.floor(level)?;
        if !still_planned && floor.waiting_total().await > 0 {
            self.building.calls().push(level);
        }
        Ok(())
    }

    /// Boards waiting passengers at `level` in FIFO order.
    ///
    /// The queue is picked with [request::boarding_direction] and the elevator adopts that
    /// direction. A passenger too heavy for the remaining load is skipped and the scan goes on.
    /// Loading stops once the cab is full. Everyone refused goes back to the front of the queue
    /// in their original order.
    async fn load(&self, level: Level) -> Result<(), ElevatorError> {
        let floor = self.building.floor(level)?;
        let (waiting_up, waiting_down) = (floor.waiting(Dirn::Up).await, floor.waiting(Dirn::Down).await);

        let dirn = {
            let mut state = self.state.lock().await;
            if state.operation == OperationState::Emergency {
                return Ok(());
            }
            let ahead = request::tasks_ahead(&state.tasks, level, state.dirn);
            let dirn = request::boarding_direction(state.dirn, ahead, waiting_up, waiting_down);
            state.dirn = dirn;
            dirn
        };
        let Some(queue) = floor.queue_for(dirn) else {
            return Ok(());
        };

        let mut events = Vec::new();
        {
            let mut queue = queue.lock().await;
            let mut state = self.state.lock().await;
            let mut refused = Vec::new();
            while let Some(passenger) = queue.pop_front() {
                let (id, destination) = (passenger.id(), passenger.destination());
                match state.cabin.try_board(passenger) {
                    Boarding::Boarded => {
                        state.tasks.push(destination);
                        events.push(EventKind::Loaded { passenger: id, destination });
                    }
                    Boarding::Rejected(passenger, reason @ OverloadRejection::Weight { .. }) => {
                        refused.push(passenger);
                        events.push(EventKind::Rejected { passenger: id, reason });
                    }
                    Boarding::Rejected(passenger, reason @ OverloadRejection::Passengers { .. }) => {
                        refused.push(passenger);
                        events.push(EventKind::Rejected { passenger: id, reason });
                        break;
                    }
                }
            }
            for passenger in refused.into_iter().rev() {
                queue.push_front(passenger);
            }
        }
        for kind in events {
            self.record(level, kind);
        }
        Ok(())
    }

    /// Travels home without stopping, releases everyone and parks in `Shutdown`.
    ///
    /// Unserved floors with passengers waiting go back to the dispatcher.
    async fn go_home(&self) {
        if let Err(e) = self.park().await {
            self.handle_failure(e).await;
        }
    }

    async fn park(&self) -> Result<(), ElevatorError> {
        let home = self.building.home_level();
        let at = self.travel(home, false).await?;
        self.dock(at).await?;
        sleep(self.timing.door_open()).await;

        let released = {
            let mut state = self.state.lock().await;
            state.cabin.evacuate()
        };
        for passenger in released {
            self.record(at, EventKind::Unloaded { passenger: passenger.id() });
        }
        sleep(self.timing.door_close()).await;

        let dropped = {
            let mut state = self.state.lock().await;
            state.operation = OperationState::Shutdown;
            state.dirn = Dirn::Idle;
            std::mem::take(&mut state.tasks)
        };
        self.release_tasks(dropped).await;
        self.record(at, EventKind::Shutdown);
        Ok(())
    }

    /// Moves to `Emergency` and notifies the dispatcher.
    ///
    /// Unless the fault was a docking failure, the doors are forced open and every occupant is
    /// evacuated at the current level, whatever their destination.
    pub(super) async fn handle_failure(&self, error: ElevatorError) {
        let docking_failure = matches!(error, ElevatorError::DockingFailure { .. });
        let level = {
            let mut state = self.state.lock().await;
            state.operation = OperationState::Emergency;
            state.dirn = Dirn::Idle;
            state.current_floor
        };
        self.report_emergency(level, error.to_string(), docking_failure);

        if !docking_failure {
            let evacuated = self.state.lock().await.cabin.evacuate();
            for passenger in evacuated {
                self.record(level, EventKind::Evacuated { passenger: passenger.id() });
            }
        }
    }
}
