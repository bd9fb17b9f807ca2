//! Decoded, human-readable views of unit registers.
//!
//! The reference control panel renders every register twice: raw and
//! human-readable ("Running"/"Stopped", `{}%`, `{}°C`, ...). These snapshot
//! types carry the same decoding for the operator console and for JSON
//! dumps.

use std::fmt;

use serde::Serialize;

use crate::registers::{breaker, breaker_base, motor, RegisterBank, RegisterError, MOTOR_REGISTERS};

/// Three-position control-mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HoaMode {
    Off,
    Hand,
    Auto,
}

impl HoaMode {
    /// Decode a raw HOA register; out-of-range values are reported verbatim
    /// by the caller instead of being coerced.
    #[must_use]
    pub fn from_register(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Hand),
            2 => Some(Self::Auto),
            _ => None,
        }
    }
}

impl fmt::Display for HoaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "Off"),
            Self::Hand => write!(f, "Hand"),
            Self::Auto => write!(f, "Auto"),
        }
    }
}

/// Point-in-time decode of one motor unit.
#[derive(Debug, Clone, Serialize)]
pub struct MotorSnapshot {
    pub unit: u8,
    pub cmd: u16,
    pub running: bool,
    pub tripped: bool,
    pub sp: u16,
    pub act_sp: u16,
    pub load_percent: u16,
    pub temp_c: u16,
    pub fault_code: u16,
    pub run_time_s: u16,
    pub hoa: u16,
    pub amps: u16,
}

impl MotorSnapshot {
    /// Decode a motor bank in one atomic read.
    pub fn read(unit: u8, bank: &RegisterBank) -> Result<Self, RegisterError> {
        let regs = bank.get(0, MOTOR_REGISTERS)?;
        Ok(Self {
            unit,
            cmd: regs[motor::CMD],
            running: regs[motor::STATUS] != 0,
            tripped: regs[motor::TRIP] != 0,
            sp: regs[motor::SP],
            act_sp: regs[motor::ACT_SP],
            load_percent: regs[motor::LOAD],
            temp_c: regs[motor::TEMP],
            fault_code: regs[motor::FAULT],
            run_time_s: regs[motor::RUN_TIME],
            hoa: regs[motor::HOA],
            amps: regs[motor::AMPS],
        })
    }
}

impl fmt::Display for MotorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.running { "Running" } else { "Stopped" };
        let health = if self.tripped { "Tripped" } else { "OK" };
        writeln!(f, "Motor {}: {state} ({health})", self.unit)?;
        match HoaMode::from_register(self.hoa) {
            Some(mode) => writeln!(f, "  HOA {mode}  Cmd {}  Sp {}  ActSp {}", self.cmd, self.sp, self.act_sp)?,
            None => writeln!(f, "  HOA {}  Cmd {}  Sp {}  ActSp {}", self.hoa, self.cmd, self.sp, self.act_sp)?,
        }
        let fault = if self.fault_code == 0 {
            "None".to_string()
        } else {
            format!("Code {}", self.fault_code)
        };
        write!(
            f,
            "  Load {}%  Temp {}°C  Amps {}A  Fault {fault}  RunTime {}s",
            self.load_percent, self.temp_c, self.amps, self.run_time_s
        )
    }
}

/// Point-in-time decode of one breaker within the switchgear bank.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub id: u8,
    pub on: bool,
    pub trip_count: u16,
    pub voltage_v: u16,
    pub current_a: u16,
}

impl BreakerSnapshot {
    /// Decode breaker `id` (1-based) from the switchgear bank in one atomic
    /// read of its four registers.
    pub fn read(id: u8, bank: &RegisterBank) -> Result<Self, RegisterError> {
        let base = breaker_base(usize::from(id).saturating_sub(1));
        let regs = bank.get(base, 4)?;
        Ok(Self {
            id,
            on: regs[breaker::STATUS] != 0,
            trip_count: regs[breaker::TRIP_CNT],
            voltage_v: regs[breaker::VOLTAGE],
            current_a: regs[breaker::CURRENT],
        })
    }
}

impl fmt::Display for BreakerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.on { "On" } else { "Off" };
        write!(
            f,
            "Breaker {}: {state}  TripCnt {}  {}V  {}A",
            self.id, self.trip_count, self.voltage_v, self.current_a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterBank;

    #[test]
    fn test_motor_snapshot_decode() {
        let bank = RegisterBank::new(MOTOR_REGISTERS);
        bank.set(0, &[1, 1, 0, 50, 50, 62, 71, 0, 9, 0, 2, 12]).unwrap();
        let snap = MotorSnapshot::read(4, &bank).unwrap();
        assert_eq!(snap.unit, 4);
        assert!(snap.running);
        assert!(!snap.tripped);
        assert_eq!(snap.act_sp, 50);
        assert_eq!(snap.run_time_s, 9);
        let text = snap.to_string();
        assert!(text.contains("Running"));
        assert!(text.contains("HOA Auto"));
        assert!(text.contains("Fault None"));
    }

    #[test]
    fn test_breaker_snapshot_decode() {
        let bank = RegisterBank::new(20);
        bank.set(breaker_base(2), &[1, 3, 231, 47]).unwrap();
        let snap = BreakerSnapshot::read(3, &bank).unwrap();
        assert!(snap.on);
        assert_eq!(snap.voltage_v, 231);
        assert_eq!(snap.to_string(), "Breaker 3: On  TripCnt 3  231V  47A");
    }

    #[test]
    fn test_snapshot_serializes() {
        let bank = RegisterBank::new(MOTOR_REGISTERS);
        let snap = MotorSnapshot::read(1, &bank).unwrap();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"running\":false"));
    }
}
