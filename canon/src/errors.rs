// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors when building canonical values

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonError {
    #[error("Invalid port range {0}-{1}")]
    BadPortRange(u16, u16),
    #[error("Invalid AS range {0}-{1}")]
    BadAsRange(u32, u32),
    #[error("Invalid prefix length range {0}-{1} for /{2}")]
    BadLengthRange(u8, u8, u8),
}
