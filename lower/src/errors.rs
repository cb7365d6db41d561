// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors failing the lowering of a single structure

use canon::CanonError;
use ipnet::IpNet;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LowerError {
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Malformed: {0}")]
    Malformed(String),
    #[error("Clause {clause} continues to clause {target}, which does not follow it")]
    InvalidContinue { clause: u32, target: u32 },
    #[error("Circular reference: {}", .0.join(" -> "))]
    CircularReference(Vec<String>),
    #[error("Pool start {0} is after pool end {1}")]
    PoolRange(IpAddr, IpAddr),
    #[error("Local {0} and global {1} have different prefix lengths")]
    MismatchedPrefixLengths(IpNet, IpNet),
    #[error(transparent)]
    Canon(#[from] CanonError),
}

pub type LowerResult<T> = Result<T, LowerError>;
