// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Extended and standard access-lists

use super::address::{AddressSpec, lower_address};
use super::service::{PortField, PortSpec, port_group_ref};
use crate::context::LowerCtx;
use crate::errors::LowerResult;
use canon::{
    AclLine, HeaderSpace, IpAccessList, IpProtocol, IpSpace, LineAction, MatchExpr,
    RouteFilterLine, RouteFilterList,
};
use ipnet::IpNet;
use names::{StructureKind, WarningKind};

/// What an extended line says about protocols and services
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AclService {
    /// `None` is `ip`
    Protocol(Option<IpProtocol>),
    ProtocolGroup(String),
    ServiceGroup(String),
    ServiceObject(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortMatch {
    Spec(PortSpec),
    Group(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IcmpMatch {
    Type { icmp_type: u8, code: Option<u8> },
    Group(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedAclLine {
    pub action: LineAction,
    pub service: AclService,
    pub src: AddressSpec,
    pub src_ports: Option<PortMatch>,
    pub dst: AddressSpec,
    pub dst_ports: Option<PortMatch>,
    pub icmp: Option<IcmpMatch>,
    /// Configuration text, kept as the name of the lowered line
    pub text: String,
    pub line: Option<u32>,
}

/* builder-style setters */
impl ExtendedAclLine {
    #[must_use]
    pub fn new(
        action: LineAction,
        service: AclService,
        src: AddressSpec,
        dst: AddressSpec,
    ) -> Self {
        Self {
            action,
            service,
            src,
            src_ports: None,
            dst,
            dst_ports: None,
            icmp: None,
            text: String::new(),
            line: None,
        }
    }
    #[must_use]
    pub fn src_ports(mut self, ports: PortMatch) -> Self {
        self.src_ports = Some(ports);
        self
    }
    #[must_use]
    pub fn dst_ports(mut self, ports: PortMatch) -> Self {
        self.dst_ports = Some(ports);
        self
    }
    #[must_use]
    pub fn icmp(mut self, icmp: IcmpMatch) -> Self {
        self.icmp = Some(icmp);
        self
    }
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtendedAccessList {
    pub lines: Vec<ExtendedAclLine>,
}

impl ExtendedAccessList {
    #[must_use]
    pub fn with_line(mut self, line: ExtendedAclLine) -> Self {
        self.lines.push(line);
        self
    }
}

fn lower_ports(
    ctx: &mut LowerCtx<'_>,
    ports: Option<&PortMatch>,
    field: PortField,
    hs: &mut HeaderSpace,
) -> LowerResult<Option<MatchExpr>> {
    match ports {
        None => Ok(None),
        Some(PortMatch::Spec(spec)) => {
            let ranges = spec.ranges()?;
            match field {
                PortField::Source => hs.src_ports.extend(ranges),
                PortField::Destination => hs.dst_ports.extend(ranges),
            }
            Ok(None)
        }
        Some(PortMatch::Group(name)) => {
            Ok(Some(port_group_ref(ctx, field, name, "access-list line")))
        }
    }
}

/// The packets an extended line applies to
pub fn lower_extended_line(
    ctx: &mut LowerCtx<'_>,
    line: &ExtendedAclLine,
) -> LowerResult<MatchExpr> {
    let usage = "access-list line";
    ctx.at_line(line.line);
    let mut hs = HeaderSpace::new()
        .src_ips(lower_address(ctx, &line.src, usage)?)
        .dst_ips(lower_address(ctx, &line.dst, usage)?);
    let mut conjuncts = vec![];

    match &line.service {
        AclService::Protocol(None) => {}
        AclService::Protocol(Some(proto)) => hs = hs.protocol(*proto),
        AclService::ProtocolGroup(name) => conjuncts.push(MatchExpr::permitted_by(
            ctx.canonical_ref(StructureKind::ProtocolObjectGroup, name, usage),
        )),
        AclService::ServiceGroup(name) => conjuncts.push(MatchExpr::permitted_by(
            ctx.canonical_ref(StructureKind::ServiceObjectGroup, name, usage),
        )),
        AclService::ServiceObject(name) => conjuncts.push(MatchExpr::permitted_by(
            ctx.canonical_ref(StructureKind::ServiceObject, name, usage),
        )),
    }

    conjuncts.extend(lower_ports(ctx, line.src_ports.as_ref(), PortField::Source, &mut hs)?);
    conjuncts.extend(lower_ports(ctx, line.dst_ports.as_ref(), PortField::Destination, &mut hs)?);

    match &line.icmp {
        None => {}
        Some(IcmpMatch::Type { icmp_type, code }) => {
            hs = hs.icmp_type(*icmp_type);
            if let Some(code) = code {
                hs = hs.icmp_code(*code);
            }
        }
        Some(IcmpMatch::Group(name)) => conjuncts.push(MatchExpr::permitted_by(
            ctx.canonical_ref(StructureKind::IcmpTypeObjectGroup, name, usage),
        )),
    }

    // unconstrained addresses
    if hs.src_ips == Some(IpSpace::Universe) {
        hs.src_ips = None;
    }
    if hs.dst_ips == Some(IpSpace::Universe) {
        hs.dst_ips = None;
    }
    Ok(MatchExpr::and(std::iter::once(MatchExpr::from(hs)).chain(conjuncts)))
}

pub fn lower_extended_acl(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    acl: &ExtendedAccessList,
) -> LowerResult<IpAccessList> {
    let mut out = IpAccessList::new(names::canonical_name(StructureKind::ExtendedAccessList, name))
        .with_source(name);
    for line in &acl.lines {
        let expr = lower_extended_line(ctx, line)?;
        out.add_line(AclLine::new(line.action, expr, line.text.clone()));
    }
    Ok(out)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardAclLine {
    pub action: LineAction,
    pub src: AddressSpec,
    pub text: String,
    pub line: Option<u32>,
}

impl StandardAclLine {
    #[must_use]
    pub fn new(action: LineAction, src: AddressSpec) -> Self {
        Self {
            action,
            src,
            text: String::new(),
            line: None,
        }
    }
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardAccessList {
    pub lines: Vec<StandardAclLine>,
}

impl StandardAccessList {
    #[must_use]
    pub fn with_line(mut self, line: StandardAclLine) -> Self {
        self.lines.push(line);
        self
    }
}

pub fn lower_standard_acl(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    acl: &StandardAccessList,
) -> LowerResult<IpAccessList> {
    let mut out = IpAccessList::new(names::canonical_name(StructureKind::StandardAccessList, name))
        .with_source(name);
    for line in &acl.lines {
        ctx.at_line(line.line);
        let expr = match lower_address(ctx, &line.src, "access-list line")? {
            IpSpace::Universe => MatchExpr::True,
            space => HeaderSpace::new().src_ips(space).into(),
        };
        out.add_line(AclLine::new(line.action, expr, line.text.clone()));
    }
    Ok(out)
}

/// Route filter equivalent of a standard access-list, for route-maps matching on
/// `ip address`. A line matches routes whose network address it permits; lines that
/// cannot be expressed over prefixes are skipped with a warning.
pub fn standard_acl_route_filter(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    acl: &StandardAccessList,
) -> RouteFilterList {
    let canonical = names::canonical_name(StructureKind::StandardAccessList, name);
    let mut out = RouteFilterList::new(canonical);
    for line in &acl.lines {
        ctx.at_line(line.line);
        let prefix: Option<IpNet> = match &line.src {
            AddressSpec::Any => Some(IpNet::V4(ipnet::Ipv4Net::default())),
            AddressSpec::Host(ip) => Some(IpNet::from(*ip)),
            AddressSpec::Subnet(net) => Some(net.trunc()),
            AddressSpec::Wildcard(w) => w.as_prefix().map(IpNet::V4),
            AddressSpec::Range { .. } | AddressSpec::Object(_) | AddressSpec::ObjectGroup(_) => {
                None
            }
        };
        let Some(prefix) = prefix else {
            ctx.warn(
                WarningKind::Unsupported,
                format!("line '{}' cannot be used to filter routes", line.text),
            );
            continue;
        };
        let (min, max) = (prefix.prefix_len(), prefix.max_prefix_len());
        match RouteFilterLine::new(line.action, prefix, min, max) {
            Ok(rf) => out.lines.push(rf),
            Err(e) => ctx.warn(WarningKind::Malformed, e.to_string()),
        }
    }
    out
}
