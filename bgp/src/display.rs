// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Module that implements Display for peer-group objects

use crate::effective::EffectivePeerConfig;
use crate::groups::{GroupKind, LeafIdentity};
use std::fmt::{Display, Formatter, Result};

impl Display for GroupKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            GroupKind::PeerGroup => write!(f, "peer-group"),
            GroupKind::Template => write!(f, "template"),
        }
    }
}

impl Display for LeafIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            LeafIdentity::Ip(ip) => write!(f, "{ip}"),
            LeafIdentity::Ipv6(ip) => write!(f, "{ip}"),
            LeafIdentity::Dynamic(prefix) => write!(f, "{prefix} (dynamic)"),
        }
    }
}

fn opt<T: Display>(f: &mut Formatter<'_>, what: &str, value: Option<&T>) -> Result {
    match value {
        Some(v) => writeln!(f, "  {what:<24} {v}"),
        None => Ok(()),
    }
}

impl Display for EffectivePeerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "neighbor {}", self.identity)?;
        if !self.inherited_from.is_empty() {
            write!(f, " (inherits {})", self.inherited_from.join(", "))?;
        }
        writeln!(f)?;
        opt(f, "remote-as", self.remote_as.as_ref())?;
        opt(f, "local-as", self.local_as.as_ref())?;
        opt(f, "description", self.description.as_ref())?;
        opt(f, "update-source", self.update_source.as_ref())?;
        writeln!(f, "  {:<24} {}", "send-community", self.send_community)?;
        writeln!(f, "  {:<24} {}", "disable-peer-as-check", self.disable_peer_as_check)?;
        writeln!(f, "  {:<24} {}", "route-reflector-client", self.route_reflector_client)?;
        writeln!(f, "  {:<24} {}", "next-hop-self", self.next_hop_self)?;
        opt(f, "route-map in", self.inbound_route_map.as_ref())?;
        opt(f, "route-map out", self.outbound_route_map.as_ref())?;
        opt(f, "prefix-list in", self.inbound_prefix_list.as_ref())?;
        opt(f, "prefix-list out", self.outbound_prefix_list.as_ref())?;
        writeln!(f, "  {:<24} {}", "active", self.active)?;
        writeln!(f, "  {:<24} {}", "shutdown", self.shutdown)
    }
}
