//! Validated operator command path.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::context::SimContext;
use crate::registers::{breaker, breaker_base, motor, BREAKER_COUNT};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("motor id {0} out of range 1..=5")]
    UnknownMotor(u8),
    #[error("breaker id {0} out of range 1..=5")]
    UnknownBreaker(u8),
    #[error("breaker status {0} must be 0 or 1")]
    InvalidStatus(u16),
    #[error("HOA mode {0} must be 0 (Off), 1 (Hand) or 2 (Auto)")]
    InvalidMode(u16),
}

/// Narrow write path for operator-issued changes.
///
/// The console (or any embedding UI) goes through here; remote masters write
/// via the protocol server instead. Invalid input is rejected before any
/// register is touched.
#[derive(Debug, Clone)]
pub struct CommandGateway {
    context: Arc<SimContext>,
}

impl CommandGateway {
    pub fn new(context: Arc<SimContext>) -> Self {
        Self { context }
    }

    /// Set any of a motor's control registers; `None` fields are left as-is.
    /// All provided fields land in one critical section, so the next tick
    /// sees either none or all of them.
    pub fn set_motor(
        &self,
        unit: u8,
        cmd: Option<u16>,
        sp: Option<u16>,
        hoa: Option<u16>,
    ) -> Result<(), CommandError> {
        let bank = self
            .context
            .motor(unit)
            .ok_or(CommandError::UnknownMotor(unit))?;
        if let Some(mode) = hoa {
            if mode > 2 {
                return Err(CommandError::InvalidMode(mode));
            }
        }
        bank.update(|regs| {
            if let Some(value) = cmd {
                regs[motor::CMD] = value;
            }
            if let Some(value) = sp {
                regs[motor::SP] = value;
            }
            if let Some(value) = hoa {
                regs[motor::HOA] = value;
            }
        });
        debug!(unit, ?cmd, ?sp, ?hoa, "motor control registers written");
        Ok(())
    }

    /// Set a breaker's status flag (1-based id, status 0 or 1).
    pub fn set_breaker(&self, id: u8, status: u16) -> Result<(), CommandError> {
        if !(1..=BREAKER_COUNT as u8).contains(&id) {
            return Err(CommandError::UnknownBreaker(id));
        }
        if status > 1 {
            return Err(CommandError::InvalidStatus(status));
        }
        let offset = breaker_base(usize::from(id) - 1) + breaker::STATUS;
        self.context
            .breaker_bank()
            .update(|regs| regs[offset] = status);
        debug!(id, status, "breaker status written");
        Ok(())
    }
}
