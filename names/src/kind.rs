// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Kinds of named structures

/// The kind of a named structure. Names are unique within a kind, per device.
///
/// The static string of a kind is its tag in canonical names; tags never contain `~`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureKind {
    ExtendedAccessList,
    StandardAccessList,
    PrefixList,
    Ipv6PrefixList,
    PrefixSet,
    CommunityList,
    CommunitySet,
    AsPathAccessList,
    NetworkObject,
    NetworkObjectGroup,
    ServiceObject,
    ServiceObjectGroup,
    ProtocolObjectGroup,
    PortObjectGroup,
    /// Source-port view of a port object-group
    #[strum(serialize = "SRC_PORT_OBJECT_GROUP")]
    SourcePortObjectGroup,
    #[strum(serialize = "ICMP_OBJECT_GROUP")]
    IcmpTypeObjectGroup,
    ClassMap,
    RouteMap,
    #[strum(serialize = "RMCLAUSE")]
    RouteMapClause,
    RoutePolicy,
    NatPool,
    BgpPeerGroup,
    BgpTemplate,
}

impl StructureKind {
    /// Tag of this kind in canonical names
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.into()
    }

    /// Tell if structures of this kind are only ever created by lowering, never by
    /// configuration, and so are never expected to be referenced by name.
    #[must_use]
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            StructureKind::RouteMapClause | StructureKind::SourcePortObjectGroup
        )
    }
}

/// Identity of a named structure: its kind and its vendor name
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructureId {
    pub kind: StructureKind,
    pub name: String,
}

impl StructureId {
    #[must_use]
    pub fn new(kind: StructureKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn tags_are_distinct_and_parse_back() {
        let mut seen = std::collections::BTreeSet::new();
        for kind in StructureKind::iter() {
            let tag = kind.tag();
            assert!(!tag.contains('~'), "{tag}");
            assert!(seen.insert(tag), "duplicate tag {tag}");
            assert_eq!(StructureKind::from_str(tag), Ok(kind));
        }
        assert_eq!(
            StructureKind::ServiceObjectGroup.tag(),
            "SERVICE_OBJECT_GROUP"
        );
        assert_eq!(StructureKind::IcmpTypeObjectGroup.tag(), "ICMP_OBJECT_GROUP");
    }
}
