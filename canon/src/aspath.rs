// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! AS-path matchers

use crate::errors::CanonError;
use crate::packet::LineAction;

/// An inclusive range of AS numbers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsRange {
    lo: u32,
    hi: u32,
}

impl AsRange {
    pub fn new(lo: u32, hi: u32) -> Result<Self, CanonError> {
        if lo > hi {
            return Err(CanonError::BadAsRange(lo, hi));
        }
        Ok(Self { lo, hi })
    }
    #[must_use]
    pub fn single(asn: u32) -> Self {
        Self { lo: asn, hi: asn }
    }
    #[must_use]
    pub fn lo(&self) -> u32 {
        self.lo
    }
    #[must_use]
    pub fn hi(&self) -> u32 {
        self.hi
    }
    #[must_use]
    pub fn contains(&self, asn: u32) -> bool {
        self.lo <= asn && asn <= self.hi
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AsPathMatch {
    /// The origin AS (last in the path) is in one of the ranges.
    /// With `exact`, the path is made of that one AS only.
    OriginatesFrom { ranges: Vec<AsRange>, exact: bool },
    /// Some AS of the path is in one of the ranges.
    /// With `exact`, every AS of the path is.
    PassesThrough { ranges: Vec<AsRange>, exact: bool },
    /// The neighbor AS (first in the path) is in one of the ranges.
    /// With `exact`, the path is made of that one AS only.
    NeighborIs { ranges: Vec<AsRange>, exact: bool },
    /// Named AS-path filter of the same device
    Reference(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AsPathFilterLine {
    pub action: LineAction,
    pub regex: String,
}

/// Ordered list of regex lines over the AS path, rendered as space-separated numbers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsPathFilter {
    pub name: String,
    pub lines: Vec<AsPathFilterLine>,
}
