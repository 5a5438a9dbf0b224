//! # config.rs – Centralized Parameter Store
//!
//! This module holds the default program parameters used throughout the simulation,
//! plus [SimConfig], the runtime configuration that can be loaded from a JSON file.
//! Keeping configuration in one place makes tuning, experimentation, and testing easier.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::world_view::Level;

//
// ──────────────────────────────────────────────────────────────
//   1. BUILDING & FLEET
// ──────────────────────────────────────────────────────────────
//

/// Lowest level of the default building
pub const DEFAULT_LOWEST_LEVEL: Level = -4;

/// Highest level of the default building
pub const DEFAULT_HIGHEST_LEVEL: Level = 43;

/// Level elevators start at and return to on shutdown
pub const HOME_LEVEL: Level = 1;

/// Default number of elevators in the building
pub const DEFAULT_NUM_ELEVATORS: u32 = 4;

/// Maximum load of one elevator, in kg
pub const DEFAULT_WEIGHT_CAPACITY: u32 = 1300;

/// Maximum number of passengers in one elevator
pub const DEFAULT_PASSENGER_CAPACITY: usize = 11;

//
// ──────────────────────────────────────────────────────────────
//   2. TIMING & INTERVALS
// ──────────────────────────────────────────────────────────────
//

/// Idle poll interval of elevators and dispatcher
pub const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Time to travel one level
pub const TRAVEL_PER_LEVEL: Duration = Duration::from_millis(700);

/// Time for the cab to align with a floor
pub const DOCKING_TIME: Duration = Duration::from_millis(2500);

/// Time to open the doors
pub const DOOR_OPEN_TIME: Duration = Duration::from_millis(2500);

/// Time to close the doors
pub const DOOR_CLOSE_TIME: Duration = Duration::from_millis(2500);

//
// ──────────────────────────────────────────────────────────────
//   3. FAULT INJECTION
// ──────────────────────────────────────────────────────────────
//

/// Probability that a docking attempt fails. Off unless configured.
pub const DOCKING_FAILURE_PROBABILITY: f64 = 0.0;

//
// ──────────────────────────────────────────────────────────────
//   4. EVENT GENERATOR
// ──────────────────────────────────────────────────────────────
//

/// Number of passengers generated in a demo run
pub const NUMBER_OF_EVENTS: usize = 5;

/// Shortest pause between two generated passengers, in ms
pub const MIN_EVENT_INTERVAL_MS: u64 = 500;

/// Longest pause between two generated passengers, in ms
pub const MAX_EVENT_INTERVAL_MS: u64 = 1000;

/// Lightest generated passenger, in kg
pub const MIN_PASSENGER_WEIGHT: u32 = 50;

/// Heaviest generated passenger, in kg (exclusive)
pub const MAX_PASSENGER_WEIGHT: u32 = 130;

//
// ──────────────────────────────────────────────────────────────
//   5. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of the status table
pub static PRINT_WV_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable miscellaneous debug prints
pub static PRINT_ELSE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Reads a print toggle. A poisoned toggle counts as on.
pub fn print_enabled(toggle: &Mutex<bool>) -> bool {
    toggle.lock().map(|on| *on).unwrap_or(true)
}

/// Sets a print toggle.
pub fn set_print(toggle: &Mutex<bool>, on: bool) {
    if let Ok(mut value) = toggle.lock() {
        *value = on;
    }
}

//
// ──────────────────────────────────────────────────────────────
//   6. RUNTIME CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Fixed durations of the elevator cycle, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Idle poll interval of elevators and dispatcher
    pub poll_ms: u64,
    /// Time to travel one level
    pub travel_per_level_ms: u64,
    /// Time for the cab to align with a floor
    pub docking_ms: u64,
    /// Time to open the doors
    pub door_open_ms: u64,
    /// Time to close the doors
    pub door_close_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_ms: POLL_PERIOD.as_millis() as u64,
            travel_per_level_ms: TRAVEL_PER_LEVEL.as_millis() as u64,
            docking_ms: DOCKING_TIME.as_millis() as u64,
            door_open_ms: DOOR_OPEN_TIME.as_millis() as u64,
            door_close_ms: DOOR_CLOSE_TIME.as_millis() as u64,
        }
    }
}

impl Timing {
    /// Short timings for fast runs and tests: 10 ms poll, 50 ms for every physical step.
    pub fn fast() -> Self {
        Self {
            poll_ms: 10,
            travel_per_level_ms: 50,
            docking_ms: 50,
            door_open_ms: 50,
            door_close_ms: 50,
        }
    }

    /// Idle poll interval
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    /// Time to travel one level
    pub fn travel_per_level(&self) -> Duration {
        Duration::from_millis(self.travel_per_level_ms)
    }

    /// Docking time
    pub fn docking(&self) -> Duration {
        Duration::from_millis(self.docking_ms)
    }

    /// Door open time
    pub fn door_open(&self) -> Duration {
        Duration::from_millis(self.door_open_ms)
    }

    /// Door close time
    pub fn door_close(&self) -> Duration {
        Duration::from_millis(self.door_close_ms)
    }
}

/// Number and capacity of the elevators registered at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Number of elevators
    pub count: u32,
    /// Maximum load per elevator, in kg
    pub weight_capacity: u32,
    /// Maximum number of passengers per elevator
    pub passenger_capacity: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_NUM_ELEVATORS,
            weight_capacity: DEFAULT_WEIGHT_CAPACITY,
            passenger_capacity: DEFAULT_PASSENGER_CAPACITY,
        }
    }
}

/// Parameters of the random passenger generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of passengers to generate
    pub events: usize,
    /// Shortest pause between two passengers, in ms
    pub min_interval_ms: u64,
    /// Longest pause between two passengers, in ms
    pub max_interval_ms: u64,
    /// Lightest passenger, in kg
    pub min_weight: u32,
    /// Heaviest passenger, in kg (exclusive)
    pub max_weight: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            events: NUMBER_OF_EVENTS,
            min_interval_ms: MIN_EVENT_INTERVAL_MS,
            max_interval_ms: MAX_EVENT_INTERVAL_MS,
            min_weight: MIN_PASSENGER_WEIGHT,
            max_weight: MAX_PASSENGER_WEIGHT,
        }
    }
}

/// Complete runtime configuration of one simulation run.
///
/// Every field has a default, so a config file only needs to name what it changes:
/// ```json
/// { "lowest_level": 1, "highest_level": 10, "fleet": { "count": 2 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Lowest level of the building
    pub lowest_level: Level,
    /// Highest level of the building
    pub highest_level: Level,
    /// Level elevators start at and return to on shutdown
    pub home_level: Level,
    /// Elevators registered at startup
    pub fleet: FleetConfig,
    /// Durations of the elevator cycle
    pub timing: Timing,
    /// Probability that a docking attempt fails, 0.0 to disable
    pub docking_failure_probability: f64,
    /// Random passenger generator
    pub generator: GeneratorConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            lowest_level: DEFAULT_LOWEST_LEVEL,
            highest_level: DEFAULT_HIGHEST_LEVEL,
            home_level: HOME_LEVEL,
            fleet: FleetConfig::default(),
            timing: Timing::default(),
            docking_failure_probability: DOCKING_FAILURE_PROBABILITY,
            generator: GeneratorConfig::default(),
        }
    }
}

impl SimConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values describe a runnable simulation.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.lowest_level >= self.highest_level {
            bail!(
                "lowest level {} must be below highest level {}",
                self.lowest_level,
                self.highest_level
            );
        }
        if self.home_level == 0
            || self.home_level < self.lowest_level
            || self.home_level > self.highest_level
        {
            bail!("home level {} is not a floor of the building", self.home_level);
        }
        if self.fleet.weight_capacity == 0 || self.fleet.passenger_capacity == 0 {
            bail!("elevator capacities must be positive");
        }
        if !(0.0..=1.0).contains(&self.docking_failure_probability) {
            bail!(
                "docking failure probability {} is not in 0..=1",
                self.docking_failure_probability
            );
        }
        let generator = &self.generator;
        if generator.min_weight == 0 || generator.min_weight >= generator.max_weight {
            bail!(
                "passenger weight range {}..{} is empty",
                generator.min_weight,
                generator.max_weight
            );
        }
        if generator.min_interval_ms > generator.max_interval_ms {
            bail!("generator interval range is inverted");
        }
        Ok(())
    }
}
