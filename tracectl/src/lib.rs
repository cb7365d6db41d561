// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Logging targets for the lowering crates and control of their levels at runtime

pub mod control;
pub mod targets;

// re-exports
pub use control::{LogControl, LogCtlError, get_log_ctl};
pub use tracing_subscriber::filter::LevelFilter;
