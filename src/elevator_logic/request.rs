//! Task evaluation and direction decision logic.
//!
//! Stateless helpers used by the elevator controller loop and by the dispatcher's cost function.
//! Every function works on plain snapshot data, so the same logic can be applied to a live
//! controller (under its state lock) or to an [crate::world_view::ElevatorSnapshot].
//!
//! # Overview
//! - [work_load]: the dispatcher's workload score for sending an elevator to a floor.
//! - [boarding_direction]: which waiting queue to board from when the doors open.
//! - [should_interrupt]: whether a passing floor is served before the current target.
//! - [tasks_ahead]: whether work remains further along the direction of travel.
//! - [remove_task]: drops one serviced occurrence of a floor from the task list.

use crate::world_view::{Dirn, Level};

/// Workload score of an elevator for a call at `target`. Lower is better.
///
/// ## Parameters
/// - `dirn`: direction the elevator is currently travelling in
/// - `current`: level the elevator is at
/// - `pending_tasks`: length of its task list
/// - `target`: level of the floor call
///
/// ## Returns
/// - `0` if the elevator is idle
/// - `d * n` if `target` lies in the current direction of travel
/// - `2 * d * n` otherwise
///
/// where `d` is the distance to `target` and `n` is `1 + pending_tasks`.
pub fn work_load(dirn: Dirn, current: Level, pending_tasks: usize, target: Level) -> u32 {
    if dirn == Dirn::Idle {
        return 0;
    }
    let distance = current.abs_diff(target);
    let tasks = 1 + pending_tasks as u32;
    let score = distance.saturating_mul(tasks);
    if Dirn::between(current, target) == dirn {
        score
    } else {
        score.saturating_mul(2)
    }
}

/// Chooses the waiting queue to board from at a floor.
///
/// While the elevator has tasks further along its direction of travel (`tasks_ahead`) it keeps
/// its direction. When it has nothing ahead, or is idle, it boards in whichever direction has
/// passengers waiting, preferring the one it is already travelling in.
///
/// ## Returns
/// The direction to board in. [Dirn::Idle] if nobody is waiting and the elevator is idle.
pub fn boarding_direction(
    dirn: Dirn,
    tasks_ahead: bool,
    waiting_up: usize,
    waiting_down: usize,
) -> Dirn {
    let waiting = |d: Dirn| match d {
        Dirn::Up => waiting_up,
        Dirn::Down => waiting_down,
        Dirn::Idle => 0,
    };

    if dirn != Dirn::Idle {
        if tasks_ahead || waiting(dirn) > 0 || waiting(dirn.opposite()) == 0 {
            return dirn;
        }
        return dirn.opposite();
    }
    if waiting_up > 0 {
        Dirn::Up
    } else if waiting_down > 0 {
        Dirn::Down
    } else {
        Dirn::Idle
    }
}

/// True if the elevator should stop at `current` on its way to `target`.
///
/// Only a floor that is itself a pending task, with passengers waiting in the direction of travel,
/// interrupts the move.
pub fn should_interrupt(tasks: &[Level], current: Level, target: Level, waiting_in_dirn: usize) -> bool {
    current != target && waiting_in_dirn > 0 && tasks.contains(&current)
}

/// True if any task lies strictly beyond `level` in direction `dirn`.
pub fn tasks_ahead(tasks: &[Level], level: Level, dirn: Dirn) -> bool {
    dirn != Dirn::Idle && tasks.iter().any(|t| Dirn::between(level, *t) == dirn)
}

/// Removes the first occurrence of `level` from `tasks`.
///
/// ## Returns
/// `true` if an occurrence was removed.
pub fn remove_task(tasks: &mut Vec<Level>, level: Level) -> bool {
    match tasks.iter().position(|t| *t == level) {
        Some(index) => {
            tasks.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_scores_zero() {
        assert_eq!(work_load(Dirn::Idle, -4, 12, 43), 0);
    }

    #[test]
    fn reversing_costs_double() {
        // Moving up from 2 with one pending task, call at 6: d = 4, n = 2
        assert_eq!(work_load(Dirn::Up, 2, 1, 6), 8);
        // Same distance behind the elevator
        assert_eq!(work_load(Dirn::Up, 10, 1, 6), 16);
        assert_eq!(work_load(Dirn::Down, 10, 1, 6), 8);
    }

    #[test]
    fn call_at_current_floor_counts_as_reversal() {
        assert_eq!(work_load(Dirn::Up, 3, 0, 3), 0);
        assert_eq!(work_load(Dirn::Down, 3, 4, 3), 0);
    }

    #[test]
    fn boarding_keeps_direction_while_busy() {
        assert_eq!(boarding_direction(Dirn::Up, true, 0, 3), Dirn::Up);
        assert_eq!(boarding_direction(Dirn::Up, false, 1, 3), Dirn::Up);
        assert_eq!(boarding_direction(Dirn::Up, false, 0, 3), Dirn::Down);
        assert_eq!(boarding_direction(Dirn::Down, false, 2, 0), Dirn::Up);
        assert_eq!(boarding_direction(Dirn::Down, false, 0, 0), Dirn::Down);
        assert_eq!(boarding_direction(Dirn::Idle, false, 0, 2), Dirn::Down);
        assert_eq!(boarding_direction(Dirn::Idle, false, 1, 2), Dirn::Up);
        assert_eq!(boarding_direction(Dirn::Idle, false, 0, 0), Dirn::Idle);
    }

    #[test]
    fn tasks_ahead_ignores_floors_behind() {
        assert!(tasks_ahead(&[7, 2], 5, Dirn::Up));
        assert!(!tasks_ahead(&[5, 2], 5, Dirn::Up));
        assert!(tasks_ahead(&[5, 2], 5, Dirn::Down));
        assert!(!tasks_ahead(&[9], 5, Dirn::Idle));
    }

    #[test]
    fn interrupt_only_on_pending_floor_with_waiting() {
        let tasks = [7, 4];
        assert!(should_interrupt(&tasks, 4, 7, 1));
        assert!(!should_interrupt(&tasks, 4, 7, 0));
        assert!(!should_interrupt(&tasks, 5, 7, 3));
        assert!(!should_interrupt(&tasks, 7, 7, 3));
    }

    #[test]
    fn removes_only_first_occurrence() {
        let mut tasks = vec![3, 5, 3];
        assert!(remove_task(&mut tasks, 3));
        assert_eq!(tasks, vec![5, 3]);
        assert!(!remove_task(&mut tasks, 9));
    }
}
