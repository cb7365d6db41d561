// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-device registry of named vendor structures.
//!
//! Structures are defined during a single population pass through a [`RegistryBuilder`],
//! which is then frozen into a read-only [`Registry`] that the compilers resolve names
//! against. Lookups are total: an undefined name is reported in [`Diagnostics`], never
//! a failure. [`canonical_name`] gives every structure the name its lowered form carries.

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

pub mod canonical;
pub mod diagnostics;
pub mod display;
pub mod errors;
pub mod kind;
pub mod registry;

pub use canonical::{canonical_clause_name, canonical_name, parse_canonical_name};
pub use diagnostics::{Diagnostics, Reference, Warning, WarningKind};
pub use errors::NameError;
pub use kind::{StructureId, StructureKind};
pub use registry::{Definition, Registry, RegistryBuilder};

use tracectl::trace_target;
trace_target!("names", LevelFilter::INFO, &["lowering"]);
