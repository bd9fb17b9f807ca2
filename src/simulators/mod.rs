//! Periodic device simulators.
//!
//! Each simulator recomputes its units' telemetry registers once per tick.
//! Ticks are synchronous and brief; the [`crate::runner`] module drives them
//! on a fixed interval.

pub mod breaker;
pub mod motor;

pub use breaker::BreakerSimulator;
pub use motor::MotorSimulator;

/// One periodic update pass over a simulator's units.
pub trait Simulator: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Recompute telemetry for every unit this simulator owns.
    fn tick(&mut self);
}
