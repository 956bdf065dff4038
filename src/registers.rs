// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Register definitions for the CP power domain of the PMU.

use bitflags::bitflags;
use core::fmt::{self, Display, Formatter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The byte offset of a register within the PMU block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct Register(pub u32);

impl Register {
    /// CP control register, non-secure view.
    pub const CP_CTRL_NS: Self = Self(0x0030);
    /// CP control register, secure view.
    pub const CP_CTRL_S: Self = Self(0x0034);
    /// CP-to-AP shared-memory window configuration.
    pub const CP2AP_MEM_CONFIG: Self = Self(0x0038);
    /// Modem-interface message batcher configuration.
    pub const MODAPIF_CONFIG: Self = Self(0x0048);
    /// CP access window to the memory interface 0 peripheral range.
    pub const CP2AP_MIF0_ACCESS: Self = Self(0x0050);
    /// CP access window to the memory interface 1 peripheral range.
    pub const CP2AP_MIF1_ACCESS: Self = Self(0x0054);
    /// CP access window to the memory interface 2 peripheral range.
    pub const CP2AP_MIF2_ACCESS: Self = Self(0x0058);
    /// CP access window to the memory interface 3 peripheral range.
    pub const CP2AP_MIF3_ACCESS: Self = Self(0x005c);
    /// CP access window to the core peripheral range.
    pub const CP2AP_CCORE_ACCESS: Self = Self(0x0060);
    /// Central sequencer configuration for the CP domain.
    pub const CENTRAL_SEQ_CP_CONFIG: Self = Self(0x02c0);
    /// System power state: clean-bus handshake for the CP domain.
    pub const CLEANY_BUS_SYS_PWR: Self = Self(0x1264);
    /// System power state: clock gate feeding the CP domain.
    pub const TCXO_GATE_SYS_PWR: Self = Self(0x1278);
    /// System power state: reset-ahead control for the CP domain.
    pub const RESET_AHEAD_CP_SYS_PWR: Self = Self(0x1340);
    /// System power state: ASB reset control for the CP domain.
    pub const RESET_ASB_CP_SYS_PWR: Self = Self(0x1344);
    /// System power state: logic reset control for the CP domain.
    pub const LOGIC_RESET_CP_SYS_PWR: Self = Self(0x1348);
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// The system-power-state registers zeroed when configuring the CP domain for
/// power-down, in write order.
pub const SYS_POWERDOWN_REGISTERS: [Register; 6] = [
    Register::CENTRAL_SEQ_CP_CONFIG,
    Register::RESET_AHEAD_CP_SYS_PWR,
    Register::LOGIC_RESET_CP_SYS_PWR,
    Register::RESET_ASB_CP_SYS_PWR,
    Register::TCXO_GATE_SYS_PWR,
    Register::CLEANY_BUS_SYS_PWR,
];

/// The peripheral access-control registers opened on chip variants that route
/// CP traffic through the AP interconnect.
pub const ACCESS_WINDOW_REGISTERS: [Register; 5] = [
    Register::CP2AP_MIF0_ACCESS,
    Register::CP2AP_MIF1_ACCESS,
    Register::CP2AP_MIF2_ACCESS,
    Register::CP2AP_MIF3_ACCESS,
    Register::CP2AP_CCORE_ACCESS,
];

/// Selects one of the two views of the CP control state.
///
/// The discriminant is the register identifier passed to trusted firmware by
/// the secure-monitor backend.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ControlRegister {
    /// The view accessible to normal-world kernel code.
    NonSecure = 0,
    /// The view requiring elevated privilege.
    Secure = 1,
}

impl ControlRegister {
    /// Returns the PMU offset of this control register.
    pub fn offset(self) -> Register {
        match self {
            Self::NonSecure => Register::CP_CTRL_NS,
            Self::Secure => Register::CP_CTRL_S,
        }
    }
}

impl Display for ControlRegister {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::NonSecure => write!(f, "CP_CTRL_NS"),
            Self::Secure => write!(f, "CP_CTRL_S"),
        }
    }
}

bitflags! {
    /// Bits of the CP control registers. Both views use the same layout.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct CpControl: u32 {
        /// Powers the CP domain on.
        const PWRON = 1 << 1;
        /// Asserts CP reset.
        const RESET_SET = 1 << 2;
        /// Releases the CP to start executing.
        const START = 1 << 3;
        /// Acknowledges the CP's active request.
        const ACTIVE_REQ_CLR = 1 << 5;
        /// Acknowledges a reset request raised by the CP.
        const RESET_REQ_CLR = 1 << 7;
    }
}

/// Position of the shared-memory size field in `CP2AP_MEM_CONFIG`.
pub const MEM_SIZE_SHIFT: u32 = 16;
/// Mask of the 9-bit shared-memory size field.
pub const MEM_SIZE_MASK: u32 = 0x1ff << MEM_SIZE_SHIFT;
/// Granularity of the size field: one unit covers 4 MB.
pub const MEM_SIZE_UNIT_MB: u32 = 4;
/// Position of the shared-memory base-address field in `CP2AP_MEM_CONFIG`.
pub const MEM_BASE_SHIFT: u32 = 0;
/// Mask of the 14-bit shared-memory base-address field.
pub const MEM_BASE_MASK: u32 = 0x3fff << MEM_BASE_SHIFT;
/// The base-address field drops this many low address bits (4 MB alignment).
pub const MEM_BASE_ADDR_SHIFT: u32 = 22;

/// Batching mode written to `MODAPIF_CONFIG`.
pub const BATCHER_MODE: u32 = 0x3;
/// Value granting the CP unrestricted access through an access window.
pub const ACCESS_WINDOW_OPEN: u32 = 0xffff_ffff;
