// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address specifiers, network objects and network object-groups

use crate::context::LowerCtx;
use crate::errors::{LowerError, LowerResult};
use canon::{IpSpace, IpWildcard};
use ipnet::IpNet;
use names::{StructureKind, WarningKind, canonical_name};
use std::net::IpAddr;

/// Source or destination of an access-list line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressSpec {
    Any,
    Wildcard(IpWildcard),
    Range { first: IpAddr, last: IpAddr },
    Host(IpAddr),
    Subnet(IpNet),
    /// `object NAME`
    Object(String),
    /// `object-group NAME`
    ObjectGroup(String),
}

/// Body of an `object network`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkObject {
    Host(IpAddr),
    Subnet(IpNet),
    Range { first: IpAddr, last: IpAddr },
    /// Resolving names is out of reach: always the empty space
    Fqdn(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkGroupLine {
    Host(IpAddr),
    Subnet(IpNet),
    Wildcard(IpWildcard),
    Range { first: IpAddr, last: IpAddr },
    /// `network-object object NAME`
    Object(String),
    /// `group-object NAME`
    Group(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkObjectGroup {
    pub description: Option<String>,
    pub lines: Vec<NetworkGroupLine>,
}

impl NetworkObjectGroup {
    #[must_use]
    pub fn with_line(mut self, line: NetworkGroupLine) -> Self {
        self.lines.push(line);
        self
    }
}

fn range(first: IpAddr, last: IpAddr) -> LowerResult<IpSpace> {
    let ordered = match (first, last) {
        (IpAddr::V4(f), IpAddr::V4(l)) => f <= l,
        (IpAddr::V6(f), IpAddr::V6(l)) => f <= l,
        _ => {
            return Err(LowerError::Malformed(format!(
                "range {first}-{last} mixes address families"
            )));
        }
    };
    if !ordered {
        return Err(LowerError::Malformed(format!("empty range {first}-{last}")));
    }
    Ok(IpSpace::Range { first, last })
}

/// Deferred reference to a named network structure
fn reference(ctx: &mut LowerCtx<'_>, kind: StructureKind, name: &str, usage: &str) -> IpSpace {
    ctx.refer(kind, name, usage);
    IpSpace::Reference(canonical_name(kind, name))
}

/// Lower an address specifier. Named objects and groups become references, whether
/// defined or not; an undefined one is reported and matches nothing downstream.
pub fn lower_address(
    ctx: &mut LowerCtx<'_>,
    spec: &AddressSpec,
    usage: &str,
) -> LowerResult<IpSpace> {
    Ok(match spec {
        AddressSpec::Any => IpSpace::Universe,
        AddressSpec::Wildcard(w) => match w.as_prefix() {
            Some(prefix) => IpSpace::Prefix(prefix.into()),
            None => IpSpace::Wildcard(*w),
        },
        AddressSpec::Range { first, last } => range(*first, *last)?,
        AddressSpec::Host(ip) => IpSpace::host(*ip),
        AddressSpec::Subnet(net) => IpSpace::Prefix(net.trunc()),
        AddressSpec::Object(name) => reference(ctx, StructureKind::NetworkObject, name, usage),
        AddressSpec::ObjectGroup(name) => {
            reference(ctx, StructureKind::NetworkObjectGroup, name, usage)
        }
    })
}

pub fn lower_network_object(
    ctx: &mut LowerCtx<'_>,
    object: &NetworkObject,
) -> LowerResult<IpSpace> {
    match object {
        NetworkObject::Host(ip) => Ok(IpSpace::host(*ip)),
        NetworkObject::Subnet(net) => Ok(IpSpace::Prefix(net.trunc())),
        NetworkObject::Range { first, last } => range(*first, *last),
        NetworkObject::Fqdn(fqdn) => {
            ctx.warn(
                WarningKind::Unsupported,
                format!("fqdn {fqdn} is not resolved, the object matches no address"),
            );
            Ok(IpSpace::Empty)
        }
    }
}

/// A group is the union of its lines
pub fn lower_network_group(
    ctx: &mut LowerCtx<'_>,
    group: &NetworkObjectGroup,
) -> LowerResult<IpSpace> {
    let usage = "network object-group line";
    let mut members = Vec::with_capacity(group.lines.len());
    for line in &group.lines {
        members.push(match line {
            NetworkGroupLine::Host(ip) => IpSpace::host(*ip),
            NetworkGroupLine::Subnet(net) => IpSpace::Prefix(net.trunc()),
            NetworkGroupLine::Wildcard(w) => lower_address(ctx, &AddressSpec::Wildcard(*w), usage)?,
            NetworkGroupLine::Range { first, last } => range(*first, *last)?,
            NetworkGroupLine::Object(name) => {
                reference(ctx, StructureKind::NetworkObject, name, usage)
            }
            NetworkGroupLine::Group(name) => {
                reference(ctx, StructureKind::NetworkObjectGroup, name, usage)
            }
        });
    }
    Ok(IpSpace::union(members))
}
