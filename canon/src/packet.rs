// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet match expressions and access lists

use crate::errors::CanonError;
use crate::ipspace::IpSpace;

/// IP protocol number
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IpProtocol(pub u8);

impl IpProtocol {
    pub const ICMP: IpProtocol = IpProtocol(1);
    pub const IGMP: IpProtocol = IpProtocol(2);
    pub const TCP: IpProtocol = IpProtocol(6);
    pub const UDP: IpProtocol = IpProtocol(17);
    pub const GRE: IpProtocol = IpProtocol(47);
    pub const ESP: IpProtocol = IpProtocol(50);
    pub const AH: IpProtocol = IpProtocol(51);
    pub const ICMPV6: IpProtocol = IpProtocol(58);
    pub const EIGRP: IpProtocol = IpProtocol(88);
    pub const OSPF: IpProtocol = IpProtocol(89);
    pub const PIM: IpProtocol = IpProtocol(103);
    pub const SCTP: IpProtocol = IpProtocol(132);

    /// Tell if headers of this protocol carry L4 ports
    #[must_use]
    pub fn has_ports(self) -> bool {
        matches!(self, Self::TCP | Self::UDP | Self::SCTP)
    }
    #[must_use]
    pub fn is_icmp(self) -> bool {
        matches!(self, Self::ICMP | Self::ICMPV6)
    }
}

/// An inclusive range of L4 ports
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub const ALL: PortRange = PortRange {
        start: 0,
        end: u16::MAX,
    };

    pub fn new(start: u16, end: u16) -> Result<Self, CanonError> {
        if start > end {
            return Err(CanonError::BadPortRange(start, end));
        }
        Ok(Self { start, end })
    }
    #[must_use]
    pub fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }
    #[must_use]
    pub fn start(&self) -> u16 {
        self.start
    }
    #[must_use]
    pub fn end(&self) -> u16 {
        self.end
    }
    #[must_use]
    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }
}

/// A constraint over packet headers. Absent or empty fields are unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeaderSpace {
    pub src_ips: Option<IpSpace>,
    pub dst_ips: Option<IpSpace>,
    pub protocols: Vec<IpProtocol>,
    pub src_ports: Vec<PortRange>,
    pub dst_ports: Vec<PortRange>,
    pub icmp_types: Vec<u8>,
    pub icmp_codes: Vec<u8>,
}

/* builder-style setters */
impl HeaderSpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn src_ips(mut self, space: IpSpace) -> Self {
        self.src_ips = Some(space);
        self
    }
    #[must_use]
    pub fn dst_ips(mut self, space: IpSpace) -> Self {
        self.dst_ips = Some(space);
        self
    }
    #[must_use]
    pub fn protocol(mut self, protocol: IpProtocol) -> Self {
        self.protocols.push(protocol);
        self
    }
    #[must_use]
    pub fn protocols(mut self, protocols: impl IntoIterator<Item = IpProtocol>) -> Self {
        self.protocols.extend(protocols);
        self
    }
    #[must_use]
    pub fn src_ports(mut self, ports: impl IntoIterator<Item = PortRange>) -> Self {
        self.src_ports.extend(ports);
        self
    }
    #[must_use]
    pub fn dst_ports(mut self, ports: impl IntoIterator<Item = PortRange>) -> Self {
        self.dst_ports.extend(ports);
        self
    }
    #[must_use]
    pub fn icmp_type(mut self, icmp_type: u8) -> Self {
        self.icmp_types.push(icmp_type);
        self
    }
    #[must_use]
    pub fn icmp_code(mut self, icmp_code: u8) -> Self {
        self.icmp_codes.push(icmp_code);
        self
    }
    /// Tell if this header space constrains nothing
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineAction {
    Permit,
    Deny,
}

/// A boolean predicate over packets
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchExpr {
    True,
    False,
    Header(HeaderSpace),
    /// Packet is permitted by the named access list of the same device
    PermittedByAcl(String),
    And(Vec<MatchExpr>),
    Or(Vec<MatchExpr>),
    Not(Box<MatchExpr>),
}

impl MatchExpr {
    #[must_use]
    pub fn permitted_by(acl: impl Into<String>) -> Self {
        MatchExpr::PermittedByAcl(acl.into())
    }
    /// Conjunction, simplified: `True` members are dropped and the empty conjunction is `True`.
    #[must_use]
    pub fn and(exprs: impl IntoIterator<Item = MatchExpr>) -> Self {
        let mut members = vec![];
        for e in exprs {
            match e {
                MatchExpr::True => {}
                MatchExpr::False => return MatchExpr::False,
                MatchExpr::And(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        match members.len() {
            0 => MatchExpr::True,
            1 => members.pop().unwrap_or(MatchExpr::True),
            _ => MatchExpr::And(members),
        }
    }
    /// Disjunction, simplified: `False` members are dropped and the empty disjunction is `False`.
    #[must_use]
    pub fn or(exprs: impl IntoIterator<Item = MatchExpr>) -> Self {
        let mut members = vec![];
        for e in exprs {
            match e {
                MatchExpr::False => {}
                MatchExpr::True => return MatchExpr::True,
                MatchExpr::Or(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        match members.len() {
            0 => MatchExpr::False,
            1 => members.pop().unwrap_or(MatchExpr::False),
            _ => MatchExpr::Or(members),
        }
    }
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: MatchExpr) -> Self {
        match expr {
            MatchExpr::True => MatchExpr::False,
            MatchExpr::False => MatchExpr::True,
            MatchExpr::Not(inner) => *inner,
            other => MatchExpr::Not(Box::new(other)),
        }
    }
}

impl From<HeaderSpace> for MatchExpr {
    fn from(hs: HeaderSpace) -> Self {
        if hs.is_unconstrained() {
            MatchExpr::True
        } else {
            MatchExpr::Header(hs)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AclLine {
    pub action: LineAction,
    pub expr: MatchExpr,
    /// Text of the vendor line this one was lowered from
    pub name: String,
}

impl AclLine {
    #[must_use]
    pub fn new(action: LineAction, expr: MatchExpr, name: impl Into<String>) -> Self {
        Self {
            action,
            expr,
            name: name.into(),
        }
    }
    #[must_use]
    pub fn accepting(expr: MatchExpr, name: impl Into<String>) -> Self {
        Self::new(LineAction::Permit, expr, name)
    }
}

/// An ordered list of lines. The first matching line decides; no match means deny.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpAccessList {
    pub name: String,
    pub lines: Vec<AclLine>,
    /// Vendor name of the structure this list was generated from
    pub source_name: Option<String>,
}

impl IpAccessList {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: vec![],
            source_name: None,
        }
    }
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_name = Some(source.into());
        self
    }
    #[must_use]
    pub fn with_line(mut self, line: AclLine) -> Self {
        self.lines.push(line);
        self
    }
    pub fn add_line(&mut self, line: AclLine) {
        self.lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_or_simplification() {
        let a = MatchExpr::permitted_by("a");
        let b = MatchExpr::permitted_by("b");
        assert_eq!(MatchExpr::and(vec![]), MatchExpr::True);
        assert_eq!(MatchExpr::or(vec![]), MatchExpr::False);
        assert_eq!(MatchExpr::and(vec![MatchExpr::True, a.clone()]), a);
        assert_eq!(
            MatchExpr::and(vec![a.clone(), MatchExpr::False, b.clone()]),
            MatchExpr::False
        );
        assert_eq!(
            MatchExpr::or(vec![MatchExpr::or(vec![a.clone(), b.clone()]), MatchExpr::False]),
            MatchExpr::Or(vec![a.clone(), b])
        );
        assert_eq!(MatchExpr::not(MatchExpr::not(a.clone())), a);
    }

    #[test]
    fn port_range() {
        assert!(PortRange::new(10, 9).is_err());
        let r = PortRange::new(1000, 2000).unwrap();
        assert!(r.contains(1000) && r.contains(2000) && !r.contains(2001));
        assert!(PortRange::ALL.contains(0) && PortRange::ALL.contains(65535));
    }

    #[test]
    fn unconstrained_header_is_true() {
        assert_eq!(MatchExpr::from(HeaderSpace::new()), MatchExpr::True);
        assert_ne!(
            MatchExpr::from(HeaderSpace::new().protocol(IpProtocol::TCP)),
            MatchExpr::True
        );
    }
}
