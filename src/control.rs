// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Access to the CP control registers.
//!
//! Two backends implement the same capability: [`DirectControl`] issues
//! memory-mapped accesses through the PMU register service, while
//! [`MonitorControl`] asks trusted firmware to perform the access in the
//! secure world. Callers depend only on [`ControlAccess`] and pick a backend
//! at construction time.

use crate::{
    pmu::{PmuRegisters, Result},
    registers::{ControlRegister, CpControl},
    smccc::{self, CP_CONTROL, Command, SecureMonitor},
};
use log::error;

/// Read and modify access to the two CP control registers.
pub trait ControlAccess {
    /// Whether trusted firmware owns the shared-memory window configuration.
    ///
    /// When true, [`CpPower::configure`](crate::power::CpPower::configure)
    /// leaves the window, batcher and access-window setup to the firmware.
    const FIRMWARE_OWNS_MEMORY_CONFIG: bool;

    /// Reads the current value of `register`.
    fn read(&self, register: ControlRegister) -> Result<u32>;

    /// Writes `value` to `register`.
    fn write(&self, register: ControlRegister, value: u32) -> Result<()>;

    /// Replaces the bits of `register` selected by `mask` with the
    /// corresponding bits of `value`.
    ///
    /// Bits outside `mask` keep the value they had when the register was
    /// read; the update is not atomic unless the backend makes it so.
    fn update(&self, register: ControlRegister, mask: CpControl, value: CpControl) -> Result<()> {
        let old = self.read(register)?;
        self.write(
            register,
            (old & !mask.bits()) | (value.bits() & mask.bits()),
        )
    }
}

/// Direct memory-mapped access through the PMU register service.
pub struct DirectControl<'a, P: PmuRegisters> {
    pmu: &'a P,
}

impl<'a, P: PmuRegisters> DirectControl<'a, P> {
    /// Creates a backend issuing accesses through `pmu`.
    pub fn new(pmu: &'a P) -> Self {
        Self { pmu }
    }
}

impl<P: PmuRegisters> ControlAccess for DirectControl<'_, P> {
    const FIRMWARE_OWNS_MEMORY_CONFIG: bool = false;

    fn read(&self, register: ControlRegister) -> Result<u32> {
        self.pmu.read(register.offset())
    }

    fn write(&self, register: ControlRegister, value: u32) -> Result<()> {
        self.pmu.write(register.offset(), value)
    }

    // The register service serialises its own read-modify-write, so delegate
    // instead of using the non-atomic default.
    fn update(&self, register: ControlRegister, mask: CpControl, value: CpControl) -> Result<()> {
        self.pmu.update(register.offset(), mask.bits(), value.bits())
    }
}

/// Control access proxied through trusted firmware.
///
/// The firmware performs the physical register access; this backend only
/// packages requests and decodes the packed return words. There is no masked
/// update command in the firmware interface, so updates are read-then-write.
pub struct MonitorControl<'a, M: SecureMonitor> {
    monitor: &'a M,
}

impl<'a, M: SecureMonitor> MonitorControl<'a, M> {
    /// Creates a backend issuing requests through `monitor`.
    pub fn new(monitor: &'a M) -> Self {
        Self { monitor }
    }
}

impl<M: SecureMonitor> ControlAccess for MonitorControl<'_, M> {
    const FIRMWARE_OWNS_MEMORY_CONFIG: bool = true;

    fn read(&self, register: ControlRegister) -> Result<u32> {
        let raw = self
            .monitor
            .call(CP_CONTROL, Command::ReadControl.into(), 0, register.into());
        smccc::unpack_read(register, raw).inspect_err(|e| error!("{e}"))
    }

    fn write(&self, register: ControlRegister, value: u32) -> Result<()> {
        let raw = self.monitor.call(
            CP_CONTROL,
            Command::WriteControl.into(),
            value,
            register.into(),
        );
        smccc::check_write(register, raw).inspect_err(|e| error!("{e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pmu::{
            Error,
            fake::{FakeMonitor, FakePmu},
        },
        registers::Register,
    };

    #[test]
    fn direct_update_changes_only_masked_bits() {
        let pmu = FakePmu::new();
        pmu.set(Register::CP_CTRL_NS, 0x0000_00f1);
        let control = DirectControl::new(&pmu);

        control
            .update(
                ControlRegister::NonSecure,
                CpControl::RESET_SET,
                CpControl::RESET_SET,
            )
            .unwrap();

        assert_eq!(
            pmu.get(Register::CP_CTRL_NS),
            0x0000_00f1 | CpControl::RESET_SET.bits()
        );
    }

    #[test]
    fn direct_update_clears_only_masked_bits() {
        let pmu = FakePmu::new();
        pmu.set(Register::CP_CTRL_S, CpControl::START.bits() | 0x40);
        let control = DirectControl::new(&pmu);

        control
            .update(ControlRegister::Secure, CpControl::START, CpControl::empty())
            .unwrap();

        assert_eq!(pmu.get(Register::CP_CTRL_S), 0x40);
    }

    #[test]
    fn monitor_update_preserves_unrelated_bits() {
        let monitor = FakeMonitor::new();
        monitor.set(ControlRegister::NonSecure, 0x91);
        let control = MonitorControl::new(&monitor);

        control
            .update(
                ControlRegister::NonSecure,
                CpControl::ACTIVE_REQ_CLR,
                CpControl::ACTIVE_REQ_CLR,
            )
            .unwrap();

        assert_eq!(
            monitor.get(ControlRegister::NonSecure),
            0x91 | CpControl::ACTIVE_REQ_CLR.bits()
        );
    }

    #[test]
    fn monitor_read_failure_stops_update() {
        let monitor = FakeMonitor::new();
        monitor.set(ControlRegister::NonSecure, 0x91);
        monitor.fail_reads(0x21);
        let control = MonitorControl::new(&monitor);

        assert_eq!(
            control.update(
                ControlRegister::NonSecure,
                CpControl::PWRON,
                CpControl::PWRON
            ),
            Err(Error::MonitorRead(ControlRegister::NonSecure, 0x21))
        );
        // The value must be untouched after the failed read.
        assert_eq!(monitor.get(ControlRegister::NonSecure), 0x91);
        assert_eq!(monitor.write_count(ControlRegister::NonSecure), 0);
    }

    #[test]
    fn monitor_write_failure_is_reported() {
        let monitor = FakeMonitor::new();
        monitor.fail_writes(5);
        let control = MonitorControl::new(&monitor);

        assert_eq!(
            control.write(ControlRegister::Secure, CpControl::START.bits()),
            Err(Error::MonitorWrite(ControlRegister::Secure, 5))
        );
    }
}
