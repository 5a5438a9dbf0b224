//! A floor level with its two waiting queues and its call button.

use std::collections::VecDeque;

use rand::Rng;
use tokio::sync::Mutex;

use super::{CallQueue, Passenger};
use crate::error::{ElevatorError, RequestError};
use crate::world_view::{Dirn, FloorSnapshot, Level};

/// A floor in the building.
///
/// Holds one FIFO queue of waiting passengers per direction. Queues are pushed by the call button
/// and drained by elevators loading at this floor.
#[derive(Debug)]
pub struct Floor {
    level: Level,
    going_up: Mutex<VecDeque<Passenger>>,
    going_down: Mutex<VecDeque<Passenger>>,
    calls: CallQueue,
    docking_failure_probability: f64,
}

impl Floor {
    pub(crate) fn new(level: Level, calls: CallQueue, docking_failure_probability: f64) -> Self {
        Self {
            level,
            going_up: Mutex::new(VecDeque::new()),
            going_down: Mutex::new(VecDeque::new()),
            calls,
            docking_failure_probability: docking_failure_probability.clamp(0.0, 1.0),
        }
    }

    /// The level of this floor
    pub fn level(&self) -> Level {
        self.level
    }

    /// A passenger presses the call button.
    ///
    /// The passenger joins the queue for their direction and the floor is pushed to the dispatcher's
    /// pending queue. Never blocks on anything but the queue lock.
    ///
    /// ## Errors
    /// [RequestError::WrongFloor] if the passenger does not start at this floor.
    pub async fn call_button(&self, passenger: Passenger) -> Result<(), RequestError> {
        if passenger.origin() != self.level {
            return Err(RequestError::WrongFloor {
                origin: passenger.origin(),
                called_at: self.level,
            });
        }
        if let Some(queue) = self.queue_for(passenger.direction()) {
            queue.lock().await.push_back(passenger);
        }
        self.calls.push(self.level);
        Ok(())
    }

    /// The waiting queue for `dirn`. `None` for [Dirn::Idle].
    pub fn queue_for(&self, dirn: Dirn) -> Option<&Mutex<VecDeque<Passenger>>> {
        match dirn {
            Dirn::Up => Some(&self.going_up),
            Dirn::Down => Some(&self.going_down),
            Dirn::Idle => None,
        }
    }

    /// Number of passengers waiting to go in `dirn`
    pub async fn waiting(&self, dirn: Dirn) -> usize {
        match self.queue_for(dirn) {
            Some(queue) => queue.lock().await.len(),
            None => 0,
        }
    }

    /// Number of passengers waiting in either direction
    pub async fn waiting_total(&self) -> usize {
        self.waiting(Dirn::Up).await + self.waiting(Dirn::Down).await
    }

    /// Confirms that an elevator has aligned with this floor.
    ///
    /// Fails with [ElevatorError::DockingFailure] with the configured probability. The probability
    /// is 0 unless fault injection is switched on.
    pub fn confirm_docking(&self, elevator: u32) -> Result<(), ElevatorError> {
        if self.docking_failure_probability > 0.0
            && rand::rng().random_bool(self.docking_failure_probability)
        {
            return Err(ElevatorError::DockingFailure {
                elevator,
                level: self.level,
            });
        }
        Ok(())
    }

    /// Waiting counts of this floor
    pub async fn snapshot(&self) -> FloorSnapshot {
        FloorSnapshot {
            level: self.level,
            waiting_up: self.waiting(Dirn::Up).await,
            waiting_down: self.waiting(Dirn::Down).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_button_queues_by_direction_and_notifies() {
        let calls = CallQueue::new();
        let floor = Floor::new(3, calls.clone(), 0.0);

        floor.call_button(Passenger::new(3, 5, 70).unwrap()).await.unwrap();
        floor.call_button(Passenger::new(3, 1, 80).unwrap()).await.unwrap();
        floor.call_button(Passenger::new(3, 7, 90).unwrap()).await.unwrap();

        assert_eq!(floor.waiting(Dirn::Up).await, 2);
        assert_eq!(floor.waiting(Dirn::Down).await, 1);
        assert_eq!(floor.waiting(Dirn::Idle).await, 0);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls.pop().await, Some(3));

        let up = floor.queue_for(Dirn::Up).unwrap().lock().await;
        assert_eq!(up[0].destination(), 5);
        assert_eq!(up[1].destination(), 7);
    }

    #[tokio::test]
    async fn call_button_rejects_foreign_passenger() {
        let calls = CallQueue::new();
        let floor = Floor::new(3, calls.clone(), 0.0);
        let result = floor.call_button(Passenger::new(2, 5, 70).unwrap()).await;
        assert_eq!(result, Err(RequestError::WrongFloor { origin: 2, called_at: 3 }));
        assert_eq!(floor.waiting_total().await, 0);
        assert!(calls.is_empty());
    }

    #[test]
    fn docking_fault_injection() {
        let calls = CallQueue::new();
        assert!(Floor::new(2, calls.clone(), 0.0).confirm_docking(1).is_ok());
        assert_eq!(
            Floor::new(2, calls, 1.0).confirm_docking(4),
            Err(ElevatorError::DockingFailure { elevator: 4, level: 2 })
        );
    }
}
