// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! CP power-state sequencing.
//!
//! The CP moves through a coarse lifecycle of off, reset asserted, powered,
//! started and active. This driver exposes the transition triggers but does
//! not order them; the modem-interface stack sequences boot and shutdown and
//! must serialise concurrent access to one [`CpPower`] instance, since the
//! underlying read-modify-write sequences are not atomic across their steps.

use crate::{
    control::ControlAccess,
    pmu::{PmuRegisters, Result},
    registers::{
        self, ACCESS_WINDOW_REGISTERS, ControlRegister, CpControl, Register,
        SYS_POWERDOWN_REGISTERS,
    },
};
use log::info;

/// Requested CP power mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CpMode {
    /// Power the CP domain on and start the CP.
    PowerOn,
    /// Power the CP domain off.
    PowerOff,
}

/// A busy-wait timing source supplied by the environment.
pub trait Delay {
    /// Waits for at least `us` microseconds.
    fn delay_us(&self, us: u32);
}

/// How long to let the CP settle after asserting reset.
const RESET_SETTLE_US: u32 = 80;

/// Static description of the CP power domain on a particular SoC.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CpConfig {
    /// Physical base address of the CP-to-AP shared memory window.
    pub shared_memory_base: u32,
    /// Size of the shared memory window in megabytes.
    pub shared_memory_mb: u32,
    /// Whether this chip variant routes CP traffic through the AP
    /// interconnect and needs the peripheral access windows opened.
    pub open_access_windows: bool,
}

impl CpConfig {
    /// The standard configuration: a 136 MB window at `0xf000_0000` with the
    /// access windows left closed.
    pub const fn new() -> Self {
        Self {
            shared_memory_base: 0xf000_0000,
            shared_memory_mb: 136,
            open_access_windows: false,
        }
    }
}

impl Default for CpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The CP power driver.
///
/// Control-register accesses go through the chosen [`ControlAccess`] backend;
/// everything else (system power-down state, shared-memory window, access
/// windows) is always direct PMU access.
pub struct CpPower<'a, P: PmuRegisters, C: ControlAccess> {
    pmu: &'a P,
    control: C,
    delay: &'a dyn Delay,
    config: CpConfig,
}

impl<'a, P: PmuRegisters, C: ControlAccess> CpPower<'a, P, C> {
    /// Creates a driver over the given register service and control backend.
    pub fn new(pmu: &'a P, control: C, delay: &'a dyn Delay, config: CpConfig) -> Self {
        Self {
            pmu,
            control,
            delay,
            config,
        }
    }

    /// Asserts CP reset.
    ///
    /// The system power-down state is configured first so the sequencer drops
    /// the domain cleanly, then the reset is asserted and allowed to settle.
    pub fn reset(&self) -> Result<()> {
        self.configure_system_powerdown()?;
        self.set_bits(ControlRegister::NonSecure, CpControl::RESET_SET)?;
        self.delay.delay_us(RESET_SETTLE_US);
        Ok(())
    }

    /// Releases the CP from reset so it starts executing.
    pub fn release(&self) -> Result<()> {
        self.set_bits(ControlRegister::Secure, CpControl::START)
    }

    /// Acknowledges the CP's active request.
    pub fn active_clear(&self) -> Result<()> {
        self.set_bits(ControlRegister::NonSecure, CpControl::ACTIVE_REQ_CLR)
    }

    /// Acknowledges a reset request raised by the CP.
    pub fn clear_reset_request(&self) -> Result<()> {
        self.set_bits(ControlRegister::NonSecure, CpControl::RESET_REQ_CLR)
    }

    /// Returns the control registers to their initial state: reset
    /// deasserted, domain unpowered, start cleared.
    pub fn init(&self) -> Result<()> {
        self.clear_bits(
            ControlRegister::NonSecure,
            CpControl::RESET_SET | CpControl::PWRON,
        )?;
        self.clear_bits(ControlRegister::Secure, CpControl::START)
    }

    /// Powers the CP domain on or off.
    ///
    /// Powering on sets the power-on bit only if it is currently clear, then
    /// sets the start bit unconditionally. Powering off clears the power-on
    /// bit and leaves the start bit to [`init`](Self::init).
    pub fn set_power(&self, mode: CpMode) -> Result<()> {
        info!("CP power mode request: {mode:?}");
        match mode {
            CpMode::PowerOn => {
                let ctrl = self.control.read(ControlRegister::NonSecure)?;
                if !CpControl::from_bits_retain(ctrl).contains(CpControl::PWRON) {
                    self.set_bits(ControlRegister::NonSecure, CpControl::PWRON)?;
                }
                self.set_bits(ControlRegister::Secure, CpControl::START)
            }
            CpMode::PowerOff => self.clear_bits(ControlRegister::NonSecure, CpControl::PWRON),
        }
    }

    /// Returns whether the CP domain is powered on.
    pub fn power_status(&self) -> Result<bool> {
        let ctrl = self.control.read(ControlRegister::NonSecure)?;
        Ok(CpControl::from_bits_retain(ctrl).contains(CpControl::PWRON))
    }

    /// Configures the CP domain to lose state across a system power-down.
    pub fn configure_system_powerdown(&self) -> Result<()> {
        for register in SYS_POWERDOWN_REGISTERS {
            self.pmu.write(register, 0)?;
        }
        Ok(())
    }

    /// One-time hardware initialisation of the CP interface: the
    /// shared-memory window, the message batcher and, where the chip variant
    /// needs it, the peripheral access windows.
    ///
    /// Does nothing when trusted firmware owns the window configuration.
    pub fn configure(&self) -> Result<()> {
        if C::FIRMWARE_OWNS_MEMORY_CONFIG {
            return Ok(());
        }

        self.set_shared_memory_size()?;
        self.set_shared_memory_base()?;
        self.pmu
            .write(Register::MODAPIF_CONFIG, registers::BATCHER_MODE)?;

        if self.config.open_access_windows {
            for register in ACCESS_WINDOW_REGISTERS {
                self.pmu.write(register, registers::ACCESS_WINDOW_OPEN)?;
            }
        }
        Ok(())
    }

    fn set_shared_memory_size(&self) -> Result<()> {
        info!("CP shared memory size: {} MB", self.config.shared_memory_mb);
        let field = self.config.shared_memory_mb / registers::MEM_SIZE_UNIT_MB;
        self.pmu.update(
            Register::CP2AP_MEM_CONFIG,
            registers::MEM_SIZE_MASK,
            field << registers::MEM_SIZE_SHIFT,
        )
    }

    fn set_shared_memory_base(&self) -> Result<()> {
        info!(
            "CP shared memory base: {:#010x}",
            self.config.shared_memory_base
        );
        let field = self.config.shared_memory_base >> registers::MEM_BASE_ADDR_SHIFT;
        self.pmu.update(
            Register::CP2AP_MEM_CONFIG,
            registers::MEM_BASE_MASK,
            field << registers::MEM_BASE_SHIFT,
        )
    }

    fn set_bits(&self, register: ControlRegister, bits: CpControl) -> Result<()> {
        let old = self.control.read(register)?;
        self.control.update(register, bits, bits)?;
        info!("{register}: {old:#010x} -> {:#010x}", old | bits.bits());
        Ok(())
    }

    fn clear_bits(&self, register: ControlRegister, bits: CpControl) -> Result<()> {
        let old = self.control.read(register)?;
        self.control.update(register, bits, CpControl::empty())?;
        info!("{register}: {old:#010x} -> {:#010x}", old & !bits.bits());
        Ok(())
    }
}
