//! # World view
//!
//! Value types shared by every part of the simulation, and a point-in-time snapshot of the
//! whole system ([WorldView]) used by the dispatcher for scoring and by [crate::print] for display.

use serde::{Deserialize, Serialize};

use crate::elevator_logic::request;

/// A floor level. Level 0 does not exist in any building.
pub type Level = i32;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Direction an elevator is travelling in, or a passenger wants to go.
pub enum Dirn {
    Down = -1,
    Idle = 0,
    Up = 1,
}

impl Dirn {
    /// Direction of travel from `from` to `to`. [Dirn::Idle] if they are the same level.
    pub fn between(from: Level, to: Level) -> Dirn {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Dirn::Up,
            std::cmp::Ordering::Less => Dirn::Down,
            std::cmp::Ordering::Equal => Dirn::Idle,
        }
    }

    /// The reverse direction. Idle stays idle.
    pub fn opposite(self) -> Dirn {
        match self {
            Dirn::Down => Dirn::Up,
            Dirn::Idle => Dirn::Idle,
            Dirn::Up => Dirn::Down,
        }
    }

    /// -1, 0 or 1
    pub fn sign(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Operational state of an elevator controller.
pub enum OperationState {
    /// Parked, loop not running. Initial state and the state after a graceful stop or a reset.
    Shutdown,
    /// Loop running, eligible for dispatch.
    Running,
    /// A fault occurred. Needs an external reset before it can start again.
    Emergency,
}

/// Snapshot of one elevator controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorSnapshot {
    /// Elevator id, 1-based in registration order
    pub id: u32,
    /// Operational state
    pub operation: OperationState,
    /// Direction of travel
    pub dirn: Dirn,
    /// Level the cab is at
    pub current_floor: Level,
    /// Pending target levels in assignment order
    pub tasks: Vec<Level>,
    /// Number of passengers on board
    pub occupants: usize,
    /// Total weight on board, in kg
    pub load: u32,
    /// Maximum load, in kg
    pub weight_capacity: u32,
    /// Maximum number of passengers
    pub passenger_capacity: usize,
}

impl ElevatorSnapshot {
    /// Workload score of this elevator for a call at `target`. Lower is better.
    pub fn work_load(&self, target: Level) -> u32 {
        request::work_load(self.dirn, self.current_floor, self.tasks.len(), target)
    }

    /// True when the elevator is running with nothing to do and nobody on board.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.occupants == 0
    }
}

/// Waiting passengers on one floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    /// Floor level
    pub level: Level,
    /// Passengers waiting to go up
    pub waiting_up: usize,
    /// Passengers waiting to go down
    pub waiting_down: usize,
}

/// Represents the system's current state.
///
/// `WorldView` contains every elevator, every floor's waiting queues and the number of floor
/// calls the dispatcher has not assigned yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldView {
    /// All elevators, in registration order
    pub elevators: Vec<ElevatorSnapshot>,
    /// All floors, lowest first
    pub floors: Vec<FloorSnapshot>,
    /// Floor calls waiting in the dispatcher queue
    pub pending_calls: usize,
}

impl WorldView {
    /// Total number of passengers waiting on floors.
    pub fn waiting(&self) -> usize {
        self.floors.iter().map(|f| f.waiting_up + f.waiting_down).sum()
    }

    /// True when nobody is waiting, no call is pending, and every elevator is idle or out of service.
    pub fn is_quiescent(&self) -> bool {
        self.pending_calls == 0
            && self.waiting() == 0
            && self
                .elevators
                .iter()
                .all(|e| e.operation != OperationState::Running || e.is_idle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_between_levels() {
        assert_eq!(Dirn::between(1, 3), Dirn::Up);
        assert_eq!(Dirn::between(3, -2), Dirn::Down);
        assert_eq!(Dirn::between(4, 4), Dirn::Idle);
        assert_eq!(Dirn::Up.opposite(), Dirn::Down);
        assert_eq!(Dirn::Down.sign(), -1);
    }

    #[test]
    fn quiescent_ignores_stopped_elevators() {
        let mut wv = WorldView {
            elevators: vec![ElevatorSnapshot {
                id: 1,
                operation: OperationState::Emergency,
                dirn: Dirn::Idle,
                current_floor: 3,
                tasks: vec![5],
                occupants: 0,
                load: 0,
                weight_capacity: 200,
                passenger_capacity: 2,
            }],
            floors: vec![FloorSnapshot { level: 1, waiting_up: 0, waiting_down: 0 }],
            pending_calls: 0,
        };
        assert!(wv.is_quiescent());

        wv.floors[0].waiting_up = 1;
        assert!(!wv.is_quiescent());
    }
}
