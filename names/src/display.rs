// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Module that implements Display for registry objects

use crate::diagnostics::{Diagnostics, Warning, WarningKind};
use crate::kind::{StructureId, StructureKind};
use std::fmt::{Display, Formatter, Result};

impl Display for StructureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let what = match self {
            StructureKind::ExtendedAccessList => "extended access-list",
            StructureKind::StandardAccessList => "standard access-list",
            StructureKind::PrefixList => "prefix-list",
            StructureKind::Ipv6PrefixList => "ipv6 prefix-list",
            StructureKind::PrefixSet => "prefix-set",
            StructureKind::CommunityList => "community-list",
            StructureKind::CommunitySet => "community-set",
            StructureKind::AsPathAccessList => "as-path access-list",
            StructureKind::NetworkObject => "network object",
            StructureKind::NetworkObjectGroup => "network object-group",
            StructureKind::ServiceObject => "service object",
            StructureKind::ServiceObjectGroup => "service object-group",
            StructureKind::ProtocolObjectGroup => "protocol object-group",
            StructureKind::PortObjectGroup => "port object-group",
            StructureKind::SourcePortObjectGroup => "port object-group (source ports)",
            StructureKind::IcmpTypeObjectGroup => "icmp-type object-group",
            StructureKind::ClassMap => "class-map",
            StructureKind::RouteMap => "route-map",
            StructureKind::RouteMapClause => "route-map clause",
            StructureKind::RoutePolicy => "route-policy",
            StructureKind::NatPool => "nat pool",
            StructureKind::BgpPeerGroup => "bgp peer-group",
            StructureKind::BgpTemplate => "bgp template",
        };
        write!(f, "{what}")
    }
}

impl Display for StructureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

impl Display for WarningKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s: &'static str = self.into();
        write!(f, "{s}")
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(line) = self.line {
            write!(f, " line {line}:")?;
        }
        if let Some(subject) = &self.subject {
            write!(f, " {subject}:")?;
        }
        write!(f, " {}", self.message)
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for w in self.warnings() {
            writeln!(f, "{w}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_rendering() {
        let w = Warning::new(WarningKind::UndefinedReference, "nothing here")
            .subject(StructureId::new(StructureKind::RouteMap, "rm"))
            .line(Some(3));
        assert_eq!(
            w.to_string(),
            "[undefined-reference] line 3: route-map 'rm': nothing here"
        );
    }
}
