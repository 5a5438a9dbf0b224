//! Random passenger generator used by the binary to drive a run.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use tokio::time::sleep;

use crate::building::{Building, Passenger};
use crate::config::GeneratorConfig;
use crate::error::RequestError;
use crate::event_log::{ElevatorEvent, EventKind, EventSink};
use crate::print;
use crate::world_view::Level;

/// Draws one random passenger.
///
/// Origin and destination are distinct floors of `building`, the weight is in
/// `min_weight..max_weight`.
///
/// ## Errors
/// [RequestError::SameFloor] if the building has only one floor.
pub fn random_passenger<R: Rng>(
    building: &Building,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Passenger, RequestError> {
    let levels: Vec<Level> = building.floors().iter().map(|f| f.level()).collect();
    let origin = *levels.choose(rng).ok_or(RequestError::SameFloor(building.home_level()))?;
    let others: Vec<Level> = levels.into_iter().filter(|l| *l != origin).collect();
    let destination = *others.choose(rng).ok_or(RequestError::SameFloor(origin))?;
    let weight = rng.random_range(config.min_weight..config.max_weight.max(config.min_weight + 1));
    building.passenger(origin, destination, weight)
}

/// Pushes random passengers into a building at random intervals.
pub struct EventGenerator {
    building: Arc<Building>,
    config: GeneratorConfig,
    sink: Arc<dyn EventSink>,
}

impl EventGenerator {
    /// Creates a generator for `building`
    pub fn new(building: Arc<Building>, config: GeneratorConfig, sink: Arc<dyn EventSink>) -> Self {
        Self { building, config, sink }
    }

    /// Generates `config.events` passengers, pausing a random interval after each.
    ///
    /// ## Returns
    /// Number of passengers that were placed at a floor.
    pub async fn run<R: Rng>(&self, rng: &mut R) -> usize {
        let mut placed = 0;
        for _ in 0..self.config.events {
            match self.place_one(rng).await {
                Ok(()) => placed += 1,
                Err(e) => print::warn(format!("Could not place passenger: {e}")),
            }
            let pause = rng.random_range(self.config.min_interval_ms..=self.config.max_interval_ms);
            sleep(Duration::from_millis(pause)).await;
        }
        placed
    }

    async fn place_one<R: Rng>(&self, rng: &mut R) -> Result<(), RequestError> {
        let passenger = random_passenger(&self.building, &self.config, rng)?;
        let (id, origin, dirn) = (passenger.id(), passenger.origin(), passenger.direction());
        self.building.floor(origin)?.call_button(passenger).await?;
        self.sink.record(ElevatorEvent::floor(origin, EventKind::Called { passenger: id, dirn }));
        Ok(())
    }
}
