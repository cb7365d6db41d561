// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! BGP peer-group hierarchy.
//!
//! A BGP process has a master group (process-wide settings), named peer-groups and
//! templates (partial overrides that may inherit further templates) and leaf peers
//! identified by an IPv4 or IPv6 address or a dynamic-neighbor prefix. The effective
//! configuration of a leaf is the first explicit value of every field found walking
//! leaf, named chain and master, falling back to the boot-time defaults of the dialect.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod display;
pub mod effective;
pub mod errors;
pub mod groups;
pub mod process;
pub mod settings;

pub use effective::{EffectivePeerConfig, PeerDefaults};
pub use errors::BgpError;
pub use groups::{GroupKind, LeafIdentity, LeafPeerGroup, NamedPeerGroup};
pub use process::BgpProcess;
pub use settings::{PeerGroupSettings, PeerGroupSettingsBuilder};

use tracectl::trace_target;
trace_target!("bgp-peers", LevelFilter::INFO, &["lowering"]);
