// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Name registry errors

use crate::kind::StructureId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("{0} is already defined")]
    Duplicate(StructureId),
    #[error("'{0}' is not a canonical structure name")]
    NotCanonical(String),
}
