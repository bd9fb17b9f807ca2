//! Motor unit simulation.

use std::sync::Arc;

use crate::context::SimContext;
use crate::registers::{motor, MOTOR_REGISTERS};
use crate::rng::RandomSource;

use super::Simulator;

/// Casing temperature written while a motor is stopped.
const IDLE_TEMP_C: u16 = 25;

/// Trip draw is `(TRIP_WEIGHT_BASE + unit)` out of `TRIP_WEIGHT_TOTAL`, so
/// higher-numbered motors trip more often.
const TRIP_WEIGHT_BASE: u32 = 10;
const TRIP_WEIGHT_TOTAL: u32 = 100;

/// Recomputes every motor's full 12-register state vector once per tick.
///
/// The tick reads the control registers (Cmd, Sp, HOA), applies the HOA
/// override, and writes all twelve fields back inside one critical section
/// per bank. A remote master polling mid-tick therefore sees either the
/// previous or the new snapshot, never a partial one.
#[derive(Debug)]
pub struct MotorSimulator<R> {
    context: Arc<SimContext>,
    rng: R,
}

impl<R: RandomSource> MotorSimulator<R> {
    pub fn new(context: Arc<SimContext>, rng: R) -> Self {
        Self { context, rng }
    }
}

impl<R: RandomSource + Send> Simulator for MotorSimulator<R> {
    fn name(&self) -> &'static str {
        "motors"
    }

    fn tick(&mut self) {
        let Self { context, rng } = self;
        for (unit, bank) in context.motor_units() {
            // The 1-based unit id doubles as a severity factor: later units
            // run hotter, draw more and trip more often.
            let severity = u16::from(unit);
            bank.update(|regs| {
                debug_assert_eq!(regs.len(), MOTOR_REGISTERS);

                let mut cmd = regs[motor::CMD];
                let sp = regs[motor::SP];
                let hoa = regs[motor::HOA];

                // Hand forces the run command on; Auto cycles it with a
                // fresh flip each tick; Off leaves the operator's last word.
                match hoa {
                    1 => cmd = 1,
                    2 => cmd = u16::from(rng.coin_flip()),
                    _ => {}
                }

                let running = cmd != 0;
                // A trip is only possible while running.
                let tripped = running
                    && rng.weighted(TRIP_WEIGHT_BASE + u32::from(unit), TRIP_WEIGHT_TOTAL);
                let healthy_run = running && !tripped;

                regs[motor::CMD] = cmd;
                regs[motor::STATUS] = u16::from(running);
                regs[motor::TRIP] = u16::from(tripped);
                regs[motor::SP] = sp;
                regs[motor::ACT_SP] = if healthy_run { sp } else { 0 };
                regs[motor::LOAD] = if running { rng.range(30, 90) + severity } else { 0 };
                regs[motor::TEMP] = if running {
                    rng.range(40, 90) + severity
                } else {
                    IDLE_TEMP_C
                };
                regs[motor::FAULT] = if tripped { rng.range(1, 10) * severity } else { 0 };
                if healthy_run {
                    // Accumulated run seconds; wraps at the register width.
                    regs[motor::RUN_TIME] = regs[motor::RUN_TIME].wrapping_add(1);
                }
                regs[motor::RESERVED] = 0;
                regs[motor::HOA] = hoa;
                regs[motor::AMPS] = if running { rng.range(5, 20) + severity } else { 0 };
            });
        }
    }
}
