#![warn(missing_docs)]
//! # liftsim
//!
//! This library simulates a building with several elevators: passengers call at floors, a dispatcher
//! assigns every call to the elevator with the lowest workload score, and each elevator runs its own
//! move → dock → unload/load state machine as an independent tokio task.
//!
//! ## Overview
//! - **config**: Default parameters, runtime configuration and print toggles.
//! - **error**: Fault and error types.
//! - **print**: Colour-coded terminal output and the building status table.
//! - **world_view**: Shared value types and snapshots of the whole system.
//! - **building**: Floors, their waiting queues, passengers and the pending call queue.
//! - **elevator_logic**: The elevator controller and its workload score.
//! - **manager**: The dispatcher assigning floor calls to elevators.
//! - **event_log**: The observability sink the core reports into.
//! - **event_generator**: Random passengers for demo runs.
//! - **init**: Argument parsing and system assembly for the binary.

pub mod config;

pub mod error;

pub mod print;

pub mod world_view;

pub mod building;

pub mod elevator_logic;

pub mod manager;

pub mod event_log;

pub mod event_generator;

pub mod init;
