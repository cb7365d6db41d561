// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Named vendor structures of a device

use crate::acl::{
    ClassMap, ExtendedAccessList, IcmpTypeObjectGroup, NetworkObject, NetworkObjectGroup,
    PortObjectGroup, ProtocolObjectGroup, ServiceLine, ServiceObjectGroup, StandardAccessList,
};
use crate::nat::NatPool;
use crate::policy::{
    AsPathAccessList, CommunityList, CommunitySet, PrefixList, PrefixSet, RouteMap, RoutePolicy,
};
use names::{Registry, StructureKind};

/// A structure that can be defined by name in a device configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Structure {
    ExtendedAccessList(ExtendedAccessList),
    StandardAccessList(StandardAccessList),
    PrefixList(PrefixList),
    Ipv6PrefixList(PrefixList),
    PrefixSet(PrefixSet),
    CommunityList(CommunityList),
    CommunitySet(CommunitySet),
    AsPathAccessList(AsPathAccessList),
    NetworkObject(NetworkObject),
    NetworkObjectGroup(NetworkObjectGroup),
    ServiceObject(ServiceLine),
    ServiceObjectGroup(ServiceObjectGroup),
    ProtocolObjectGroup(ProtocolObjectGroup),
    PortObjectGroup(PortObjectGroup),
    IcmpTypeObjectGroup(IcmpTypeObjectGroup),
    ClassMap(ClassMap),
    RouteMap(RouteMap),
    RoutePolicy(RoutePolicy),
    NatPool(NatPool),
}

impl Structure {
    /// Kind of the structure, under which its name is defined
    #[must_use]
    pub fn kind(&self) -> StructureKind {
        match self {
            Structure::ExtendedAccessList(_) => StructureKind::ExtendedAccessList,
            Structure::StandardAccessList(_) => StructureKind::StandardAccessList,
            Structure::PrefixList(_) => StructureKind::PrefixList,
            Structure::Ipv6PrefixList(_) => StructureKind::Ipv6PrefixList,
            Structure::PrefixSet(_) => StructureKind::PrefixSet,
            Structure::CommunityList(_) => StructureKind::CommunityList,
            Structure::CommunitySet(_) => StructureKind::CommunitySet,
            Structure::AsPathAccessList(_) => StructureKind::AsPathAccessList,
            Structure::NetworkObject(_) => StructureKind::NetworkObject,
            Structure::NetworkObjectGroup(_) => StructureKind::NetworkObjectGroup,
            Structure::ServiceObject(_) => StructureKind::ServiceObject,
            Structure::ServiceObjectGroup(_) => StructureKind::ServiceObjectGroup,
            Structure::ProtocolObjectGroup(_) => StructureKind::ProtocolObjectGroup,
            Structure::PortObjectGroup(_) => StructureKind::PortObjectGroup,
            Structure::IcmpTypeObjectGroup(_) => StructureKind::IcmpTypeObjectGroup,
            Structure::ClassMap(_) => StructureKind::ClassMap,
            Structure::RouteMap(_) => StructureKind::RouteMap,
            Structure::RoutePolicy(_) => StructureKind::RoutePolicy,
            Structure::NatPool(_) => StructureKind::NatPool,
        }
    }
}

pub type DeviceRegistry = Registry<Structure>;
