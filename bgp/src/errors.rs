// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! BGP peer-group hierarchy errors

use crate::groups::{GroupKind, LeafIdentity};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BgpError {
    #[error("A {0} named '{1}' already exists")]
    DuplicateGroup(GroupKind, String),
    #[error("A neighbor {0} already exists")]
    DuplicateLeaf(LeafIdentity),
}
