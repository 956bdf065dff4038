// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Fake implementations of the PMU register service and the secure monitor
//! for unit tests.

use super::{Error, PmuRegisters, Result};
use crate::{
    registers::{ControlRegister, Register},
    smccc::{CP_CONTROL, Command, FunctionId, SecureMonitor},
};
use arrayvec::ArrayVec;
use spin::mutex::SpinMutex;

const REGISTER_CAPACITY: usize = 32;
const JOURNAL_CAPACITY: usize = 64;
const FAULT_CAPACITY: usize = 4;

/// An in-memory PMU register file.
///
/// Registers read as zero until written. Individual registers can be marked
/// as failing to exercise error paths; a journal records every successful
/// write in order so tests can assert on sequencing.
pub struct FakePmu {
    state: SpinMutex<FakePmuState>,
}

#[derive(Default)]
struct FakePmuState {
    registers: ArrayVec<(Register, u32), REGISTER_CAPACITY>,
    journal: ArrayVec<(Register, u32), JOURNAL_CAPACITY>,
    failing_reads: ArrayVec<Register, FAULT_CAPACITY>,
    failing_writes: ArrayVec<Register, FAULT_CAPACITY>,
}

impl FakePmuState {
    fn value(&self, register: Register) -> u32 {
        self.registers
            .iter()
            .find(|(r, _)| *r == register)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    fn store(&mut self, register: Register, value: u32) {
        if let Some(entry) = self.registers.iter_mut().find(|(r, _)| *r == register) {
            entry.1 = value;
        } else {
            self.registers.push((register, value));
        }
    }
}

impl FakePmu {
    /// Creates a register file with all registers reading as zero.
    pub fn new() -> Self {
        Self {
            state: SpinMutex::new(FakePmuState::default()),
        }
    }

    /// Presets `register` to `value` without recording a journal entry.
    pub fn set(&self, register: Register, value: u32) {
        self.state.lock().store(register, value);
    }

    /// Returns the current value of `register`.
    pub fn get(&self, register: Register) -> u32 {
        self.state.lock().value(register)
    }

    /// Returns every successful write and update in issue order, as pairs of
    /// register and final value.
    pub fn journal(&self) -> ArrayVec<(Register, u32), JOURNAL_CAPACITY> {
        self.state.lock().journal.clone()
    }

    /// Returns how many writes and updates hit `register`.
    pub fn write_count(&self, register: Register) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|(r, _)| *r == register)
            .count()
    }

    /// Makes subsequent reads (and the read half of updates) of `register`
    /// fail.
    pub fn fail_reads(&self, register: Register) {
        self.state.lock().failing_reads.push(register);
    }

    /// Makes subsequent writes (and updates) of `register` fail.
    pub fn fail_writes(&self, register: Register) {
        self.state.lock().failing_writes.push(register);
    }
}

impl Default for FakePmu {
    fn default() -> Self {
        Self::new()
    }
}

impl PmuRegisters for FakePmu {
    fn read(&self, register: Register) -> Result<u32> {
        let state = self.state.lock();
        if state.failing_reads.contains(&register) {
            return Err(Error::Read(register));
        }
        Ok(state.value(register))
    }

    fn write(&self, register: Register, value: u32) -> Result<()> {
        let mut state = self.state.lock();
        if state.failing_writes.contains(&register) {
            return Err(Error::Write(register));
        }
        state.store(register, value);
        state.journal.push((register, value));
        Ok(())
    }

    fn update(&self, register: Register, mask: u32, value: u32) -> Result<()> {
        let mut state = self.state.lock();
        // An update reads before it writes, so honour both fault settings.
        if state.failing_reads.contains(&register) {
            return Err(Error::Read(register));
        }
        if state.failing_writes.contains(&register) {
            return Err(Error::Write(register));
        }
        let new = (state.value(register) & !mask) | (value & mask);
        state.store(register, new);
        state.journal.push((register, new));
        Ok(())
    }
}

/// A fake trusted firmware implementing the CP control call.
///
/// Holds both views of the CP control state and answers read and write
/// requests with the packed return format of the real firmware. Either
/// direction can be made to fail with a chosen status code.
pub struct FakeMonitor {
    state: SpinMutex<FakeMonitorState>,
}

#[derive(Default)]
struct FakeMonitorState {
    values: [u32; 2],
    journal: ArrayVec<(ControlRegister, u32), JOURNAL_CAPACITY>,
    read_status: u16,
    write_status: u32,
}

impl FakeMonitor {
    /// Creates a monitor with both control registers reading as zero.
    pub fn new() -> Self {
        Self {
            state: SpinMutex::new(FakeMonitorState::default()),
        }
    }

    /// Presets `register` to `value` without recording a journal entry.
    pub fn set(&self, register: ControlRegister, value: u32) {
        self.state.lock().values[register as usize] = value;
    }

    /// Returns the current value of `register`.
    pub fn get(&self, register: ControlRegister) -> u32 {
        self.state.lock().values[register as usize]
    }

    /// Returns every accepted write in issue order.
    pub fn journal(&self) -> ArrayVec<(ControlRegister, u32), JOURNAL_CAPACITY> {
        self.state.lock().journal.clone()
    }

    /// Returns how many accepted writes hit `register`.
    pub fn write_count(&self, register: ControlRegister) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|(r, _)| *r == register)
            .count()
    }

    /// Makes subsequent read requests fail with `status` in the packed low
    /// half.
    pub fn fail_reads(&self, status: u16) {
        self.state.lock().read_status = status;
    }

    /// Makes subsequent write requests return `code`.
    pub fn fail_writes(&self, code: u32) {
        self.state.lock().write_status = code;
    }
}

impl Default for FakeMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureMonitor for FakeMonitor {
    fn call(&self, function: FunctionId, command: u32, value: u32, register: u32) -> u32 {
        assert_eq!(function, CP_CONTROL, "unexpected function {function}");
        let command = Command::try_from(command).expect("unknown sub-command");
        let register = ControlRegister::try_from(register).expect("unknown register identifier");
        let mut state = self.state.lock();

        match command {
            Command::ReadControl => {
                if state.read_status != 0 {
                    u32::from(state.read_status)
                } else {
                    // Value in the high half, zero status in the low half.
                    (state.values[register as usize] & 0xffff) << 16
                }
            }
            Command::WriteControl => {
                if state.write_status as i32 > 0 {
                    state.write_status
                } else {
                    state.values[register as usize] = value;
                    state.journal.push((register, value));
                    0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_pmu_reads_zero_until_written() {
        let pmu = FakePmu::new();
        assert_eq!(pmu.read(Register::CP_CTRL_NS), Ok(0));
        pmu.write(Register::CP_CTRL_NS, 0x55).unwrap();
        assert_eq!(pmu.read(Register::CP_CTRL_NS), Ok(0x55));
    }

    #[test]
    fn fake_pmu_update_is_masked() {
        let pmu = FakePmu::new();
        pmu.set(Register::CP2AP_MEM_CONFIG, 0xffff_0000);
        pmu.update(Register::CP2AP_MEM_CONFIG, 0x00ff, 0x0012).unwrap();
        assert_eq!(pmu.get(Register::CP2AP_MEM_CONFIG), 0xffff_0012);
    }

    #[test]
    fn fake_pmu_fault_injection() {
        let pmu = FakePmu::new();
        pmu.fail_reads(Register::CP_CTRL_NS);
        pmu.fail_writes(Register::CP_CTRL_S);
        assert_eq!(
            pmu.read(Register::CP_CTRL_NS),
            Err(Error::Read(Register::CP_CTRL_NS))
        );
        assert_eq!(
            pmu.write(Register::CP_CTRL_S, 1),
            Err(Error::Write(Register::CP_CTRL_S))
        );
        // Unrelated registers are unaffected.
        assert_eq!(pmu.read(Register::CP_CTRL_S), Ok(0));
    }

    #[test]
    fn fake_monitor_packs_reads() {
        let monitor = FakeMonitor::new();
        monitor.set(ControlRegister::Secure, 0x8);
        let raw = monitor.call(
            CP_CONTROL,
            Command::ReadControl.into(),
            0,
            ControlRegister::Secure.into(),
        );
        assert_eq!(raw, 0x8 << 16);
    }

    #[test]
    fn fake_monitor_journal_records_writes() {
        let monitor = FakeMonitor::new();
        monitor.call(
            CP_CONTROL,
            Command::WriteControl.into(),
            0xa,
            ControlRegister::NonSecure.into(),
        );
        assert_eq!(
            monitor.journal().as_slice(),
            &[(ControlRegister::NonSecure, 0xa)]
        );
        assert_eq!(monitor.get(ControlRegister::NonSecure), 0xa);
    }
}
