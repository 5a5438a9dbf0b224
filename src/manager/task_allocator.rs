//! Picks the elevator that should serve a floor call.

use crate::world_view::{ElevatorSnapshot, Level, OperationState};

/// Chooses an elevator for a call at `target`.
///
/// Only `Running` elevators are scored. The lowest workload score wins, ties go to the elevator
/// earliest in `elevators` (first registered).
///
/// ## Returns
/// Index into `elevators` of the chosen one, `None` if nothing is running.
pub fn select_elevator(elevators: &[ElevatorSnapshot], target: Level) -> Option<(usize, u32)> {
    elevators
        .iter()
        .enumerate()
        .filter(|(_, e)| e.operation == OperationState::Running)
        .map(|(index, e)| (index, e.work_load(target)))
        .min_by_key(|&(index, score)| (score, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_view::Dirn;

    fn elev(id: u32, operation: OperationState, dirn: Dirn, floor: Level, tasks: Vec<Level>) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id,
            operation,
            dirn,
            current_floor: floor,
            tasks,
            occupants: 0,
            load: 0,
            weight_capacity: 1300,
            passenger_capacity: 11,
        }
    }

    #[test]
    fn idle_beats_moving_regardless_of_distance() {
        let elevators = vec![
            elev(1, OperationState::Running, Dirn::Up, 2, vec![10]),
            elev(2, OperationState::Running, Dirn::Idle, 40, vec![]),
        ];
        assert_eq!(select_elevator(&elevators, 3), Some((1, 0)));
    }

    #[test]
    fn ties_go_to_first_registered() {
        let elevators = vec![
            elev(1, OperationState::Running, Dirn::Idle, 1, vec![]),
            elev(2, OperationState::Running, Dirn::Idle, 8, vec![]),
            elev(3, OperationState::Running, Dirn::Up, 5, vec![]),
        ];
        for _ in 0..10 {
            assert_eq!(select_elevator(&elevators, 8), Some((0, 0)));
        }
    }

    #[test]
    fn only_running_elevators_are_eligible() {
        let elevators = vec![
            elev(1, OperationState::Emergency, Dirn::Idle, 1, vec![]),
            elev(2, OperationState::Shutdown, Dirn::Idle, 1, vec![]),
            elev(3, OperationState::Running, Dirn::Down, 9, vec![4, 2]),
        ];
        // d = 6, n = 3, moving away
        assert_eq!(select_elevator(&elevators, 15), Some((2, 36)));
        assert_eq!(select_elevator(&elevators[..2], 15), None);
    }

    #[test]
    fn moving_toward_wins_over_moving_away() {
        let elevators = vec![
            elev(1, OperationState::Running, Dirn::Up, 10, vec![12]),
            elev(2, OperationState::Running, Dirn::Up, 2, vec![3]),
        ];
        assert_eq!(select_elevator(&elevators, 6), Some((1, 8)));
    }
}
