// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lowering of vendor configuration structures into the canonical policy language.
//!
//! A device is populated with named [`Structure`]s through a [`DeviceBuilder`], frozen,
//! and compiled: packet filters and object-groups become IP spaces and access lists
//! ([`acl`]), NAT rules become transformations ([`nat`]), route-maps and route-policies
//! become routing policies ([`policy`]) and BGP neighbors get their effective
//! configuration. Problems are collected as diagnostics and per-structure failures;
//! compiling a device never stops on a bad structure.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod acl;
pub mod context;
pub mod device;
pub mod errors;
pub mod nat;
pub mod policy;
pub mod settings;
pub mod structure;

pub use context::LowerCtx;
pub use device::{CompiledDevice, Device, DeviceBuilder, compile_fleet};
pub use errors::{LowerError, LowerResult};
pub use nat::NatTransformations;
pub use settings::{
    ContinuePolicy, Dialect, LoweringSettings, LoweringSettingsBuilder, MatchSemantics,
    SettingsError,
};
pub use structure::{DeviceRegistry, Structure};

use tracectl::trace_target;
trace_target!("lowering", LevelFilter::INFO, &["lowering"]);
