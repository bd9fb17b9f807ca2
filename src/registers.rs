//! Holding-register storage shared between the simulators, the command
//! gateway, and the protocol server.
//!
//! Registers are plain `u16` cells (Modbus holding-register width). Values
//! are stored as given; counters that outgrow the width wrap rather than
//! saturate, which keeps unbounded telemetry like run-time intentional
//! instead of silently capped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Number of holding registers in one motor unit.
pub const MOTOR_REGISTERS: usize = 12;

/// Breakers held by the switchgear unit.
pub const BREAKER_COUNT: usize = 5;

/// Registers per breaker within the switchgear bank.
pub const BREAKER_FIELDS: usize = 4;

/// Motor register offsets.
pub mod motor {
    pub const CMD: usize = 0;
    pub const STATUS: usize = 1;
    pub const TRIP: usize = 2;
    pub const SP: usize = 3;
    pub const ACT_SP: usize = 4;
    pub const LOAD: usize = 5;
    pub const TEMP: usize = 6;
    pub const FAULT: usize = 7;
    pub const RUN_TIME: usize = 8;
    pub const RESERVED: usize = 9;
    pub const HOA: usize = 10;
    pub const AMPS: usize = 11;
}

/// Breaker register offsets, relative to [`breaker_base`].
pub mod breaker {
    pub const STATUS: usize = 0;
    pub const TRIP_CNT: usize = 1;
    pub const VOLTAGE: usize = 2;
    pub const CURRENT: usize = 3;
}

/// Base offset of breaker `index` (0-based) within the switchgear bank.
#[must_use]
pub fn breaker_base(index: usize) -> usize {
    index * BREAKER_FIELDS
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    #[error("register range {offset}+{count} out of bounds for bank of {len} registers")]
    OutOfRange {
        offset: usize,
        count: usize,
        len: usize,
    },
}

/// One unit's holding registers.
///
/// Every access goes through the internal lock, so a reader always observes
/// either the pre-tick or the post-tick snapshot of a simulator update,
/// never a mix. Banks are allocated once at startup, zero-initialized, and
/// live for the process lifetime.
#[derive(Debug)]
pub struct RegisterBank {
    cells: Mutex<Vec<u16>>,
}

impl RegisterBank {
    /// Allocate a zero-initialized bank of `len` registers.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            cells: Mutex::new(vec![0; len]),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u16>> {
        // A panicked writer cannot leave a bank half-written (slice copies
        // happen after validation), so recover the guard and keep serving.
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_range(len: usize, offset: usize, count: usize) -> Result<(), RegisterError> {
        let in_bounds = count > 0
            && offset
                .checked_add(count)
                .is_some_and(|end| end <= len);
        if in_bounds {
            Ok(())
        } else {
            Err(RegisterError::OutOfRange { offset, count, len })
        }
    }

    /// Read `count` registers starting at `offset`.
    pub fn get(&self, offset: usize, count: usize) -> Result<Vec<u16>, RegisterError> {
        let cells = self.lock();
        Self::check_range(cells.len(), offset, count)?;
        Ok(cells[offset..offset + count].to_vec())
    }

    /// Read a single register.
    pub fn get_one(&self, offset: usize) -> Result<u16, RegisterError> {
        Ok(self.get(offset, 1)?[0])
    }

    /// Overwrite `values.len()` registers starting at `offset` in one
    /// critical section.
    pub fn set(&self, offset: usize, values: &[u16]) -> Result<(), RegisterError> {
        let mut cells = self.lock();
        Self::check_range(cells.len(), offset, values.len())?;
        cells[offset..offset + values.len()].copy_from_slice(values);
        Ok(())
    }

    /// Run a read-modify-write transform under the bank lock.
    ///
    /// Simulator ticks use this so their read-before-write values (motor
    /// `RunTime`, breaker `Status`) cannot interleave with gateway or
    /// protocol writes on the same bank.
    pub fn update<T>(&self, f: impl FnOnce(&mut [u16]) -> T) -> T {
        let mut cells = self.lock();
        f(&mut cells)
    }
}
