// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Power-state control for a cellular modem coprocessor (CP).
//!
//! The CP's power domain is sequenced through a handful of control bits in
//! the SoC's Power Management Unit (PMU). This crate wraps those bits in a
//! small driver: asserting and releasing reset, powering the domain on and
//! off, acknowledging requests raised by the CP, and the one-time setup of
//! the CP-to-AP shared-memory window.
//!
//! Depending on how the platform is provisioned, the control registers are
//! either accessed directly through the PMU register service or proxied
//! through trusted firmware with a SiP service call; both backends implement
//! [`control::ControlAccess`] and the embedder picks one when constructing
//! [`power::CpPower`]. All hardware services are injected, so the driver can
//! be exercised against the fakes in [`pmu::fake`] (enabled with the `fakes`
//! feature).

#![cfg_attr(not(any(test, feature = "fakes")), no_std)]

pub mod control;
pub mod pmu;
pub mod power;
pub mod registers;
pub mod smccc;

pub use control::{ControlAccess, DirectControl, MonitorControl};
pub use pmu::{Error, PmuRegisters, Result};
pub use power::{CpConfig, CpMode, CpPower, Delay};
