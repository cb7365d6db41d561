// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Named groups and leaf peers

use crate::settings::PeerGroupSettings;
use ipnet::IpNet;
use names::StructureKind;
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKind {
    /// `neighbor X peer-group`
    PeerGroup,
    /// `template peer` / `template peer-session`
    Template,
}

impl GroupKind {
    #[must_use]
    pub fn structure_kind(self) -> StructureKind {
        match self {
            GroupKind::PeerGroup => StructureKind::BgpPeerGroup,
            GroupKind::Template => StructureKind::BgpTemplate,
        }
    }
}

/// A peer-group or template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedPeerGroup {
    pub name: String,
    pub kind: GroupKind,
    pub settings: PeerGroupSettings,
    /// Templates this group inherits, most specific first
    pub inherits: Vec<String>,
    pub line: Option<u32>,
}

impl NamedPeerGroup {
    #[must_use]
    pub fn new(kind: GroupKind, name: impl Into<String>, settings: PeerGroupSettings) -> Self {
        Self {
            name: name.into(),
            kind,
            settings,
            inherits: vec![],
            line: None,
        }
    }
    #[must_use]
    pub fn inherit(mut self, template: impl Into<String>) -> Self {
        self.inherits.push(template.into());
        self
    }
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// What a leaf peer is keyed by
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeafIdentity {
    Ip(Ipv4Addr),
    Ipv6(Ipv6Addr),
    /// Dynamic neighbors accepted from a prefix
    Dynamic(IpNet),
}

/// A configured neighbor. Its identity is fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafPeerGroup {
    identity: LeafIdentity,
    pub peer_group: Option<String>,
    /// Templates the neighbor inherits directly, most specific first
    pub inherits: Vec<String>,
    pub settings: PeerGroupSettings,
    pub line: Option<u32>,
}

impl LeafPeerGroup {
    #[must_use]
    pub fn new(identity: LeafIdentity, settings: PeerGroupSettings) -> Self {
        Self {
            identity,
            peer_group: None,
            inherits: vec![],
            settings,
            line: None,
        }
    }
    #[must_use]
    pub fn identity(&self) -> LeafIdentity {
        self.identity
    }
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.peer_group = Some(group.into());
        self
    }
    #[must_use]
    pub fn inherit(mut self, template: impl Into<String>) -> Self {
        self.inherits.push(template.into());
        self
    }
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}
