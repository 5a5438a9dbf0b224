//! # Building
//!
//! The floor registry. A [Building] owns every [Floor] and the [CallQueue] that binds the floors'
//! call buttons to the dispatcher.

mod floor;
mod passenger;

pub use floor::Floor;
pub use passenger::Passenger;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::config::SimConfig;
use crate::error::{BuildingError, RequestError};
use crate::world_view::{Dirn, FloorSnapshot, Level};

/// FIFO of floors that need service.
///
/// Pushed by call buttons (and by elevators leaving passengers behind), popped by the dispatcher.
/// A floor can appear several times. Cloning gives another handle to the same queue.
#[derive(Debug, Clone)]
pub struct CallQueue {
    tx: mpsc::UnboundedSender<Level>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Level>>>,
    queued: Arc<AtomicUsize>,
}

impl CallQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Level>();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Appends a floor. Never blocks.
    pub fn push(&self, level: Level) {
        // Counted before sending so a concurrent pop never sees the counter below the queue length.
        self.queued.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(level).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Removes the oldest floor, if any.
    pub async fn pop(&self) -> Option<Level> {
        let level = self.rx.lock().await.try_recv().ok()?;
        self.queued.fetch_sub(1, Ordering::SeqCst);
        Some(level)
    }

    /// Number of floors waiting for assignment
    pub fn len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// True if no floor is waiting for assignment
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The building the elevators serve.
#[derive(Debug)]
pub struct Building {
    lowest: Level,
    highest: Level,
    home: Level,
    floors: Vec<Arc<Floor>>,
    calls: CallQueue,
}

impl Building {
    /// Builds every level from `lowest` to `highest` inclusive, skipping level 0.
    ///
    /// ## Parameters
    /// `home`: level elevators start at and return to on shutdown
    /// `docking_failure_probability`: chance that [Floor::confirm_docking] fails, 0.0 to disable
    ///
    /// ## Errors
    /// [BuildingError::InvalidRange] if `lowest >= highest`, [BuildingError::FloorDoesNotExist] if
    /// `home` is not one of the built levels.
    pub fn new(
        lowest: Level,
        highest: Level,
        home: Level,
        docking_failure_probability: f64,
    ) -> Result<Arc<Self>, BuildingError> {
        if lowest >= highest {
            return Err(BuildingError::InvalidRange { lowest, highest });
        }
        let calls = CallQueue::new();
        let floors: Vec<Arc<Floor>> = (lowest..=highest)
            .filter(|level| *level != 0)
            .map(|level| Arc::new(Floor::new(level, calls.clone(), docking_failure_probability)))
            .collect();

        let building = Self { lowest, highest, home, floors, calls };
        building.floor(home)?;
        Ok(Arc::new(building))
    }

    /// Builds the building described by `config`.
    pub fn from_config(config: &SimConfig) -> Result<Arc<Self>, BuildingError> {
        Self::new(
            config.lowest_level,
            config.highest_level,
            config.home_level,
            config.docking_failure_probability,
        )
    }

    /// Looks up a floor by level.
    pub fn floor(&self, level: Level) -> Result<&Arc<Floor>, BuildingError> {
        self.floors
            .iter()
            .find(|floor| floor.level() == level)
            .ok_or(BuildingError::FloorDoesNotExist(level))
    }

    /// All floors, lowest first
    pub fn floors(&self) -> &[Arc<Floor>] {
        &self.floors
    }

    /// The level one step from `level` in `dirn`, skipping level 0.
    ///
    /// ## Errors
    /// [BuildingError::FloorDoesNotExist] when stepping past the top or bottom of the building.
    pub fn next_level(&self, level: Level, dirn: Dirn) -> Result<Level, BuildingError> {
        let mut next = level + dirn.sign();
        if next == 0 {
            next += dirn.sign();
        }
        self.floor(next)?;
        Ok(next)
    }

    /// Creates a passenger after checking both levels belong to this building.
    pub fn passenger(
        &self,
        origin: Level,
        destination: Level,
        weight: u32,
    ) -> Result<Passenger, RequestError> {
        self.floor(origin)?;
        self.floor(destination)?;
        Passenger::new(origin, destination, weight)
    }

    /// The queue of floors waiting for dispatch
    pub fn calls(&self) -> &CallQueue {
        &self.calls
    }

    /// Lowest level
    pub fn lowest_level(&self) -> Level {
        self.lowest
    }

    /// Highest level
    pub fn highest_level(&self) -> Level {
        self.highest
    }

    /// Level elevators start at and return to on shutdown
    pub fn home_level(&self) -> Level {
        self.home
    }

    /// Number of floors, level 0 excluded
    pub fn total_levels(&self) -> usize {
        self.floors.len()
    }

    /// Waiting counts of every floor, lowest first
    pub async fn floor_snapshots(&self) -> Vec<FloorSnapshot> {
        let mut snapshots = Vec::with_capacity(self.floors.len());
        for floor in &self.floors {
            snapshots.push(floor.snapshot().await);
        }
        snapshots
    }
}
