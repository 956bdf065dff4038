// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Types and helpers related to the SMC Calling Convention, reduced to what a
//! SiP-service client needs.

use crate::{
    pmu::{Error, Result},
    registers::ControlRegister,
};
use core::fmt::{self, Debug, Display, Formatter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

const FAST_CALL: u32 = 0x8000_0000;
const OEN_MASK: u32 = 0x3f00_0000;
const OEN_SHIFT: u8 = 24;

/// Owning Entity Number (OEN)
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct OwningEntityNumber(pub u8);

impl OwningEntityNumber {
    /// SiP (silicon partner) services.
    pub const SIP: Self = Self(2);
}

/// An SMCCC function ID.
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// Creates the ID of an SMC32 fast call from its components.
    pub const fn fast32(oen: OwningEntityNumber, number: u16) -> Self {
        Self(FAST_CALL | (((oen.0 as u32) << OEN_SHIFT) & OEN_MASK) | (number as u32))
    }

    /// Returns the Owning Entity Number of the function ID.
    pub fn oen(self) -> OwningEntityNumber {
        OwningEntityNumber(((self.0 & OEN_MASK) >> OEN_SHIFT) as u8)
    }
}

impl Display for FunctionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Debug for FunctionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x} (OEN {})", self.0, self.oen().0)
    }
}

/// Function ID of the SiP call through which trusted firmware proxies access
/// to the CP control registers.
pub const CP_CONTROL: FunctionId = FunctionId::fast32(OwningEntityNumber::SIP, 0x0700);

/// Sub-commands of the [`CP_CONTROL`] call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Command {
    /// Read a CP control register on behalf of the caller.
    ReadControl = 3,
    /// Write a CP control register on behalf of the caller.
    WriteControl = 4,
}

/// Transport issuing secure monitor calls.
///
/// Mirrors the four-word calling convention of the firmware interface:
/// function ID, sub-command, value and register identifier in the argument
/// registers, with the raw w0 return word passed back. Implementations block
/// until the firmware returns.
pub trait SecureMonitor {
    /// Issues the call and returns the raw return word.
    fn call(&self, function: FunctionId, command: u32, value: u32, register: u32) -> u32;
}

const READ_STATUS_MASK: u32 = 0xffff;
const READ_VALUE_SHIFT: u32 = 16;

/// Unpacks the return word of a [`Command::ReadControl`] call.
///
/// The low half of the word carries the firmware status (0 meaning success)
/// and the high half carries the register value.
pub fn unpack_read(register: ControlRegister, raw: u32) -> Result<u32> {
    let status = (raw & READ_STATUS_MASK) as u16;
    if status == 0 {
        Ok(raw >> READ_VALUE_SHIFT)
    } else {
        Err(Error::MonitorRead(register, status))
    }
}

/// Interprets the return word of a [`Command::WriteControl`] call. A positive
/// value is a firmware error code.
pub fn check_write(register: ControlRegister, raw: u32) -> Result<()> {
    if (raw as i32) > 0 {
        Err(Error::MonitorWrite(register, raw))
    } else {
        Ok(())
    }
}
