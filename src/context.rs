//! Process-wide register ownership.

use crate::registers::{RegisterBank, BREAKER_COUNT, BREAKER_FIELDS, MOTOR_REGISTERS};

/// Number of simulated motor units, addressed 1..=5 on the wire.
pub const MOTOR_COUNT: usize = 5;

/// Wire unit id of the switchgear bank (0x10, matching the reference
/// device map).
pub const BREAKER_UNIT: u8 = 16;

/// Owns every unit's registers for the process lifetime.
///
/// Shared by the simulators, the command gateway, and the protocol server
/// via `Arc`; there is no global register table. Banks for different units
/// are independent, so operations on distinct units never contend.
#[derive(Debug)]
pub struct SimContext {
    motors: [RegisterBank; MOTOR_COUNT],
    breakers: RegisterBank,
}

impl SimContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            motors: std::array::from_fn(|_| RegisterBank::new(MOTOR_REGISTERS)),
            breakers: RegisterBank::new(BREAKER_COUNT * BREAKER_FIELDS),
        }
    }

    /// Bank for a wire unit id: motors are 1..=5, the breaker bank is 16.
    #[must_use]
    pub fn bank(&self, unit: u8) -> Option<&RegisterBank> {
        match unit {
            BREAKER_UNIT => Some(&self.breakers),
            _ => self.motor(unit),
        }
    }

    /// Bank of motor `unit` (1-based), if in range.
    #[must_use]
    pub fn motor(&self, unit: u8) -> Option<&RegisterBank> {
        let index = usize::from(unit).checked_sub(1)?;
        self.motors.get(index)
    }

    /// The single bank holding all breakers' registers.
    #[must_use]
    pub fn breaker_bank(&self) -> &RegisterBank {
        &self.breakers
    }

    /// All motor banks with their 1-based unit ids.
    pub fn motor_units(&self) -> impl Iterator<Item = (u8, &RegisterBank)> {
        self.motors
            .iter()
            .enumerate()
            .map(|(index, bank)| (index as u8 + 1, bank))
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_addressing() {
        let context = SimContext::new();
        for unit in 1..=5 {
            let bank = context.bank(unit).unwrap();
            assert_eq!(bank.len(), MOTOR_REGISTERS);
        }
        assert_eq!(context.bank(BREAKER_UNIT).unwrap().len(), 20);
        assert!(context.bank(0).is_none());
        assert!(context.bank(6).is_none());
        assert!(context.bank(17).is_none());
    }

    #[test]
    fn test_motor_banks_are_independent() {
        let context = SimContext::new();
        context.motor(1).unwrap().set(0, &[1]).unwrap();
        assert_eq!(context.motor(2).unwrap().get_one(0).unwrap(), 0);
    }
}
