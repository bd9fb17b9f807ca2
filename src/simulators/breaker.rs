//! Switchgear (circuit breaker) simulation.

use std::sync::Arc;

use crate::context::SimContext;
use crate::registers::{breaker, breaker_base, BREAKER_COUNT};
use crate::rng::RandomSource;

use super::Simulator;

/// Refreshes every breaker's telemetry registers once per tick.
///
/// Breaker `Status` is operator-owned: the simulation is never authoritative
/// for it. The whole refresh runs inside one critical section on the
/// switchgear bank and leaves the status cells untouched, so a concurrent
/// gateway toggle is either fully before or fully after the tick, never
/// lost inside it.
#[derive(Debug)]
pub struct BreakerSimulator<R> {
    context: Arc<SimContext>,
    rng: R,
}

impl<R: RandomSource> BreakerSimulator<R> {
    pub fn new(context: Arc<SimContext>, rng: R) -> Self {
        Self { context, rng }
    }
}

impl<R: RandomSource + Send> Simulator for BreakerSimulator<R> {
    fn name(&self) -> &'static str {
        "breakers"
    }

    fn tick(&mut self) {
        let Self { context, rng } = self;
        context.breaker_bank().update(|regs| {
            for index in 0..BREAKER_COUNT {
                let base = breaker_base(index);
                regs[base + breaker::TRIP_CNT] = rng.range(0, 5);
                regs[base + breaker::VOLTAGE] = rng.range(220, 240);
                regs[base + breaker::CURRENT] = rng.range(0, 100);
            }
        });
    }
}
