//! # Field Device Simulator
//!
//! Simulates a small lineup of industrial field devices — five variable-speed
//! motors and a switchgear bank of five circuit breakers — as addressable
//! holding-register banks served over Modbus TCP, so master/client software
//! can be tested without real hardware.
//!
//! ## Features
//!
//! - **Register-level device model**: fixed motor and breaker register maps,
//!   concurrency-safe per-unit banks
//! - **Periodic simulation**: cancellable 1 Hz tick tasks deriving telemetry
//!   from control inputs and bounded randomized behavior
//! - **Control-mode semantics**: Hand/Off/Auto overrides, weighted trip
//!   injection, monotonic run-time counters
//! - **Modbus TCP front end**: read/write holding registers with proper
//!   exception responses
//! - **Operator console**: validated command path for motor and breaker
//!   control, with human-readable register snapshots
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fieldsim::{CommandGateway, SimContext};
//!
//! let context = Arc::new(SimContext::new());
//! let gateway = CommandGateway::new(Arc::clone(&context));
//!
//! // Command motor 2 to run at setpoint 60, manual mode
//! gateway.set_motor(2, Some(1), Some(60), Some(0)).unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`registers`] - Holding-register banks with atomic get/set/update
//! - [`context`] - Process-wide register ownership, one bank per unit
//! - [`simulators`] - Periodic motor and breaker update logic
//! - [`gateway`] - Validated operator command path
//! - [`server`] - Modbus TCP request servicing
//! - [`runner`] - Cancellable periodic tick tasks
//! - [`snapshot`] - Decoded, human-readable register views
//! - [`rng`] - Injectable random source for deterministic testing

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod console;
pub mod context;
pub mod gateway;
pub mod registers;
pub mod rng;
pub mod runner;
pub mod server;
pub mod simulators;
pub mod snapshot;

// Re-export main public types for convenience
pub use context::SimContext;
pub use gateway::CommandGateway;
pub use registers::RegisterBank;
pub use simulators::{BreakerSimulator, MotorSimulator};
