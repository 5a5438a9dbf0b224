//! Fault and error types.
//!
//! Only true faults are errors. Expected outcomes such as a full cab ([crate::elevator_logic::Boarding])
//! or a dispatch cycle without a running elevator ([crate::manager::DispatchOutcome]) are plain values.

use thiserror::Error;

use crate::world_view::Level;

/// Faults raised inside an elevator controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElevatorError {
    /// The cab failed to align with the floor. Doors cannot be trusted, so no evacuation is attempted.
    #[error("elevator #{elevator} failed to dock at level {level}")]
    DockingFailure {
        /// Elevator id
        elevator: u32,
        /// Level the docking was attempted at
        level: Level,
    },
    /// Start was attempted while the elevator is in emergency mode and not yet reset.
    #[error("elevator #{elevator} is malfunctioning and cannot be started")]
    Malfunction {
        /// Elevator id
        elevator: u32,
    },
    /// A task or step pointed at a level the building does not have.
    #[error(transparent)]
    Building(#[from] BuildingError),
}

/// Errors from looking up or constructing floors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildingError {
    /// Requested level is not part of the building.
    #[error("floor level {0} does not exist")]
    FloorDoesNotExist(Level),
    /// Lowest level is not below the highest level.
    #[error("invalid level range {lowest}..={highest}")]
    InvalidRange {
        /// Lowest level
        lowest: Level,
        /// Highest level
        highest: Level,
    },
}

/// Errors from constructing a passenger request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Origin and destination are the same level.
    #[error("origin and destination are both level {0}")]
    SameFloor(Level),
    /// Weight must be positive.
    #[error("passenger weight must be positive")]
    ZeroWeight,
    /// Origin or destination is not a floor of the building.
    #[error(transparent)]
    Building(#[from] BuildingError),
    /// The passenger called at a floor other than their origin.
    #[error("passenger from level {origin} called at level {called_at}")]
    WrongFloor {
        /// Origin of the passenger
        origin: Level,
        /// Floor the call button was pressed at
        called_at: Level,
    },
}

/// Errors from the dispatcher lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The dispatcher has been shut down; no further elevators can be registered.
    #[error("dispatcher is shut down")]
    ShutDown,
}
