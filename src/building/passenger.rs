//! A passenger: one travel request from an origin floor to a destination floor.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{BuildingError, RequestError};
use crate::world_view::{Dirn, Level};

/// Source of process-unique passenger ids
static NEXT_PASSENGER_ID: AtomicU64 = AtomicU64::new(1);

/// A travel request. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    id: u64,
    origin: Level,
    destination: Level,
    weight: u32,
    direction: Dirn,
}

impl Passenger {
    /// Creates a passenger going from `origin` to `destination`.
    ///
    /// Does not check that the levels exist in a particular building; use
    /// [crate::building::Building::passenger] for that.
    ///
    /// ## Errors
    /// - [RequestError::SameFloor] if origin and destination are equal
    /// - [RequestError::ZeroWeight] if `weight` is 0
    /// - [BuildingError::FloorDoesNotExist] if either level is 0
    pub fn new(origin: Level, destination: Level, weight: u32) -> Result<Self, RequestError> {
        if origin == 0 || destination == 0 {
            return Err(BuildingError::FloorDoesNotExist(0).into());
        }
        if origin == destination {
            return Err(RequestError::SameFloor(origin));
        }
        if weight == 0 {
            return Err(RequestError::ZeroWeight);
        }
        Ok(Self {
            id: NEXT_PASSENGER_ID.fetch_add(1, Ordering::Relaxed),
            origin,
            destination,
            weight,
            direction: Dirn::between(origin, destination),
        })
    }

    /// Process-unique id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Floor the passenger is waiting at
    pub fn origin(&self) -> Level {
        self.origin
    }

    /// Floor the passenger wants to reach
    pub fn destination(&self) -> Level {
        self.destination
    }

    /// Weight in kg
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// [Dirn::Up] or [Dirn::Down], never [Dirn::Idle]
    pub fn direction(&self) -> Dirn {
        self.direction
    }
}
