//! # Event log
//!
//! Everything observable that the simulation does is reported as an [ElevatorEvent] to an injected
//! [EventSink]. The core never decides how events are formatted or stored.
//!
//! Sinks provided here:
//! - [TerminalSink]: coloured one-liners through [crate::print]
//! - [JsonLinesSink]: one JSON object per line on stdout
//! - [MemorySink]: keeps every event in memory, for tests and end-of-run summaries
//! - [FanOutSink]: forwards to several sinks
//! - [NullSink]: drops everything

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::elevator_logic::OverloadRejection;
use crate::print;
use crate::world_view::{Dirn, Level};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A passenger pressed the call button.
    Called {
        /// Passenger id
        passenger: u64,
        /// Direction they want to go
        dirn: Dirn,
    },
    /// The dispatcher gave a floor to an elevator.
    Assigned {
        /// Workload score of the chosen elevator
        score: u32,
    },
    /// No elevator was running, so the floor went back in the pending queue.
    Requeued,
    /// Elevator loop started.
    Started,
    /// The elevator refused to start.
    StartRefused {
        /// Human-readable cause
        reason: String,
    },
    /// Left a floor.
    Departed {
        /// Direction of travel
        dirn: Dirn,
    },
    /// Reached a floor.
    Arrived,
    /// A passenger boarded.
    Loaded {
        /// Passenger id
        passenger: u64,
        /// Destination of the passenger
        destination: Level,
    },
    /// A boarding attempt was refused.
    Rejected {
        /// Passenger id
        passenger: u64,
        /// Which limit was hit
        reason: OverloadRejection,
    },
    /// A passenger left at their destination.
    Unloaded {
        /// Passenger id
        passenger: u64,
    },
    /// A passenger was forced out regardless of destination.
    Evacuated {
        /// Passenger id
        passenger: u64,
    },
    /// Docking failed.
    DockingFailed,
    /// The elevator went into emergency mode.
    Emergency {
        /// Human-readable cause
        reason: String,
    },
    /// Emergency cleared by an external reset.
    Reset,
    /// The elevator parked and stopped.
    Shutdown,
}

/// One observable occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorEvent {
    /// Elevator involved. `None` for floor and dispatcher events without an elevator.
    pub elevator: Option<u32>,
    /// Level the event happened at
    pub level: Level,
    /// What happened
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ElevatorEvent {
    /// Event raised by an elevator
    pub fn elevator(elevator: u32, level: Level, kind: EventKind) -> Self {
        Self { elevator: Some(elevator), level, kind }
    }

    /// Event raised by a floor or the dispatcher
    pub fn floor(level: Level, kind: EventKind) -> Self {
        Self { elevator: None, level, kind }
    }
}

/// Receiver of simulation events.
///
/// Called from many tasks at once, so implementations must be cheap and must not block for long.
pub trait EventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: ElevatorEvent);
}

/// Prints every event to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl EventSink for TerminalSink {
    fn record(&self, event: ElevatorEvent) {
        let who = match event.elevator {
            Some(id) => format!("Elevator #{id}"),
            None => format!("Floor {}", event.level),
        };
        let at = event.level;
        match &event.kind {
            EventKind::Called { passenger, dirn } => {
                print::info(format!("Passenger {passenger} called at floor {at} going {dirn:?}"))
            }
            EventKind::Assigned { score } => {
                print::info(format!("{who} assigned floor {at} (workload {score})"))
            }
            EventKind::Requeued => print::warn(format!("No running elevator, floor {at} requeued")),
            EventKind::Started => print::ok(format!("{who} started at floor {at}")),
            EventKind::StartRefused { reason } => {
                print::err(format!("{who} refused to start at floor {at}: {reason}"))
            }
            EventKind::Departed { dirn } => print::info(format!("{who} left floor {at} going {dirn:?}")),
            EventKind::Arrived => print::info(format!("{who} arrived at floor {at}")),
            EventKind::Loaded { passenger, destination } => print::ok(format!(
                "{who} loaded passenger {passenger} at floor {at} for floor {destination}"
            )),
            EventKind::Rejected { passenger, reason } => print::warn(format!(
                "{who} refused passenger {passenger} at floor {at}: {reason:?}"
            )),
            EventKind::Unloaded { passenger } => {
                print::ok(format!("{who} unloaded passenger {passenger} at floor {at}"))
            }
            EventKind::Evacuated { passenger } => {
                print::warn(format!("{who} evacuated passenger {passenger} at floor {at}"))
            }
            EventKind::DockingFailed => print::err(format!("{who} failed to dock at floor {at}")),
            EventKind::Emergency { reason } => {
                print::err(format!("{who} in EMERGENCY at floor {at}: {reason}"))
            }
            EventKind::Reset => print::ok(format!("{who} alert reset at floor {at}")),
            EventKind::Shutdown => print::ok(format!("{who} shut down at floor {at}")),
        }
    }
}

/// Writes every event as one JSON line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesSink;

impl EventSink for JsonLinesSink {
    fn record(&self, event: ElevatorEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => print::err(format!("Failed to serialize event: {e}")),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ElevatorEvent>>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in order
    pub fn events(&self) -> Vec<ElevatorEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded events matching `pred`
    pub fn count(&self, pred: impl Fn(&ElevatorEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: ElevatorEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Forwards every event to several sinks, in order.
pub struct FanOutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanOutSink {
    /// Creates a sink forwarding to `sinks`
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanOutSink {
    fn record(&self, event: ElevatorEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: ElevatorEvent) {}
}
