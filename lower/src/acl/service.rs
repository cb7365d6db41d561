// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Port specifiers, service objects and the service-like object-groups

use crate::context::LowerCtx;
use crate::errors::{LowerError, LowerResult};
use canon::{HeaderSpace, IpProtocol, MatchExpr, PortRange};
use names::StructureKind;

/// Port operator of an access-list line or port-object
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortSpec {
    Eq(Vec<u16>),
    Neq(u16),
    Lt(u16),
    Gt(u16),
    Range(u16, u16),
}

impl PortSpec {
    /// The port ranges this specifier matches
    pub fn ranges(&self) -> LowerResult<Vec<PortRange>> {
        Ok(match self {
            PortSpec::Eq(ports) => ports.iter().copied().map(PortRange::single).collect(),
            PortSpec::Neq(port) => {
                let mut ranges = vec![];
                if *port > 0 {
                    ranges.push(PortRange::new(0, port - 1)?);
                }
                if *port < u16::MAX {
                    ranges.push(PortRange::new(port + 1, u16::MAX)?);
                }
                ranges
            }
            PortSpec::Lt(0) => return Err(LowerError::Malformed("lt 0 matches no port".into())),
            PortSpec::Lt(port) => vec![PortRange::new(0, port - 1)?],
            PortSpec::Gt(u16::MAX) => {
                return Err(LowerError::Malformed("gt 65535 matches no port".into()));
            }
            PortSpec::Gt(port) => vec![PortRange::new(port + 1, u16::MAX)?],
            PortSpec::Range(lo, hi) if lo > hi => {
                return Err(LowerError::Malformed(format!("empty port range {lo}-{hi}")));
            }
            PortSpec::Range(lo, hi) => vec![PortRange::new(*lo, *hi)?],
        })
    }
}

/// A single service: the body of `object service`, or a `service-object` line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceLine {
    /// Protocol alone; `None` is `ip`, any protocol
    Protocol(Option<IpProtocol>),
    Ports {
        protocols: Vec<IpProtocol>,
        src: Option<PortSpec>,
        dst: Option<PortSpec>,
    },
    Icmp {
        protocol: IpProtocol,
        icmp_type: Option<u8>,
        code: Option<u8>,
    },
}

impl ServiceLine {
    #[must_use]
    pub fn tcp(dst: PortSpec) -> Self {
        ServiceLine::Ports {
            protocols: vec![IpProtocol::TCP],
            src: None,
            dst: Some(dst),
        }
    }
    #[must_use]
    pub fn udp(dst: PortSpec) -> Self {
        ServiceLine::Ports {
            protocols: vec![IpProtocol::UDP],
            src: None,
            dst: Some(dst),
        }
    }
}

pub fn lower_service(line: &ServiceLine) -> LowerResult<MatchExpr> {
    Ok(match line {
        ServiceLine::Protocol(None) => MatchExpr::True,
        ServiceLine::Protocol(Some(proto)) => HeaderSpace::new().protocol(*proto).into(),
        ServiceLine::Ports {
            protocols,
            src,
            dst,
        } => {
            let mut hs = HeaderSpace::new().protocols(protocols.iter().copied());
            if let Some(src) = src {
                hs = hs.src_ports(src.ranges()?);
            }
            if let Some(dst) = dst {
                hs = hs.dst_ports(dst.ranges()?);
            }
            hs.into()
        }
        ServiceLine::Icmp {
            protocol,
            icmp_type,
            code,
        } => {
            let mut hs = HeaderSpace::new().protocol(*protocol);
            if let Some(t) = icmp_type {
                hs = hs.icmp_type(*t);
            }
            if let Some(c) = code {
                hs = hs.icmp_code(*c);
            }
            hs.into()
        }
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceGroupLine {
    Service(ServiceLine),
    /// `port-object`, for groups declared with a protocol
    PortObject(PortSpec),
    /// `service-object object NAME`
    Object(String),
    /// `group-object NAME`
    Group(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceObjectGroup {
    /// Protocols of a typed group (`object-group service NAME tcp-udp`)
    pub protocols: Vec<IpProtocol>,
    pub lines: Vec<ServiceGroupLine>,
}

impl ServiceObjectGroup {
    #[must_use]
    pub fn typed(protocols: impl IntoIterator<Item = IpProtocol>) -> Self {
        Self {
            protocols: protocols.into_iter().collect(),
            lines: vec![],
        }
    }
    #[must_use]
    pub fn with_line(mut self, line: ServiceGroupLine) -> Self {
        self.lines.push(line);
        self
    }
}

pub fn lower_service_group(
    ctx: &mut LowerCtx<'_>,
    group: &ServiceObjectGroup,
) -> LowerResult<MatchExpr> {
    let usage = "service object-group line";
    let mut members = Vec::with_capacity(group.lines.len());
    for line in &group.lines {
        members.push(match line {
            ServiceGroupLine::Service(service) => lower_service(service)?,
            ServiceGroupLine::PortObject(ports) => {
                if group.protocols.is_empty() {
                    return Err(LowerError::Malformed(
                        "port-object in a service object-group without protocol".into(),
                    ));
                }
                HeaderSpace::new()
                    .protocols(group.protocols.iter().copied())
                    .dst_ports(ports.ranges()?)
                    .into()
            }
            ServiceGroupLine::Object(name) => MatchExpr::permitted_by(ctx.canonical_ref(
                StructureKind::ServiceObject,
                name,
                usage,
            )),
            ServiceGroupLine::Group(name) => MatchExpr::permitted_by(ctx.canonical_ref(
                StructureKind::ServiceObjectGroup,
                name,
                usage,
            )),
        });
    }
    Ok(MatchExpr::or(members))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolGroupLine {
    /// `protocol-object`; `None` is `ip`
    Protocol(Option<IpProtocol>),
    Group(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolObjectGroup {
    pub lines: Vec<ProtocolGroupLine>,
}

#[must_use]
pub fn lower_protocol_group(ctx: &mut LowerCtx<'_>, group: &ProtocolObjectGroup) -> MatchExpr {
    MatchExpr::or(group.lines.iter().map(|line| match line {
        ProtocolGroupLine::Protocol(None) => MatchExpr::True,
        ProtocolGroupLine::Protocol(Some(proto)) => HeaderSpace::new().protocol(*proto).into(),
        ProtocolGroupLine::Group(name) => MatchExpr::permitted_by(ctx.canonical_ref(
            StructureKind::ProtocolObjectGroup,
            name,
            "protocol object-group line",
        )),
    }))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortGroupLine {
    Port(PortSpec),
    Group(String),
}

/// Port object-groups carry no protocol: the line using them does
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortObjectGroup {
    pub lines: Vec<PortGroupLine>,
}

/// Which header field a port object-group is matched against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortField {
    Source,
    Destination,
}

impl PortField {
    /// Kind naming the generated access list of a port group matched on this field
    #[must_use]
    pub fn kind(self) -> StructureKind {
        match self {
            PortField::Source => StructureKind::SourcePortObjectGroup,
            PortField::Destination => StructureKind::PortObjectGroup,
        }
    }
}

/// Reference to the view of a port group matching the given field
pub fn port_group_ref(
    ctx: &mut LowerCtx<'_>,
    field: PortField,
    name: &str,
    usage: &str,
) -> MatchExpr {
    ctx.refer(StructureKind::PortObjectGroup, name, usage);
    MatchExpr::permitted_by(names::canonical_name(field.kind(), name))
}

pub fn lower_port_group(
    ctx: &mut LowerCtx<'_>,
    group: &PortObjectGroup,
    field: PortField,
) -> LowerResult<MatchExpr> {
    let mut members = Vec::with_capacity(group.lines.len());
    for line in &group.lines {
        members.push(match line {
            PortGroupLine::Port(spec) => {
                let ranges = spec.ranges()?;
                match field {
                    PortField::Source => HeaderSpace::new().src_ports(ranges),
                    PortField::Destination => HeaderSpace::new().dst_ports(ranges),
                }
                .into()
            }
            PortGroupLine::Group(name) => {
                port_group_ref(ctx, field, name, "port object-group line")
            }
        });
    }
    Ok(MatchExpr::or(members))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IcmpGroupLine {
    IcmpType(u8),
    Group(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IcmpTypeObjectGroup {
    pub lines: Vec<IcmpGroupLine>,
}

#[must_use]
pub fn lower_icmp_group(ctx: &mut LowerCtx<'_>, group: &IcmpTypeObjectGroup) -> MatchExpr {
    MatchExpr::or(group.lines.iter().map(|line| match line {
        IcmpGroupLine::IcmpType(t) => HeaderSpace::new().icmp_type(*t).into(),
        IcmpGroupLine::Group(name) => MatchExpr::permitted_by(ctx.canonical_ref(
            StructureKind::IcmpTypeObjectGroup,
            name,
            "icmp-type object-group line",
        )),
    }))
}
