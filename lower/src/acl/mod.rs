// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Match-expression compiler: address and service specifiers, object-groups,
//! access-lists and class-maps.
//!
//! Named objects and object-groups are never inlined. A use of a network object or
//! network group lowers to an [`canon::IpSpace::Reference`], a use of any other group
//! to a [`canon::MatchExpr::PermittedByAcl`], both to the canonical name of the
//! target. Each group is lowered on its own into the IP space or access list of that
//! name.

mod access_list;
mod address;
mod class_map;
mod service;

#[cfg(test)]
mod test;

pub use access_list::{
    AclService, ExtendedAccessList, ExtendedAclLine, IcmpMatch, PortMatch, StandardAccessList,
    StandardAclLine, lower_extended_acl, lower_extended_line, lower_standard_acl,
    standard_acl_route_filter,
};
pub use address::{
    AddressSpec, NetworkGroupLine, NetworkObject, NetworkObjectGroup, lower_address,
    lower_network_group, lower_network_object,
};
pub use class_map::{ClassMap, ClassMapMatch, lower_class_map};
pub use service::{
    IcmpGroupLine, IcmpTypeObjectGroup, PortField, PortGroupLine, PortObjectGroup, PortSpec,
    ProtocolGroupLine, ProtocolObjectGroup, ServiceGroupLine, ServiceLine, ServiceObjectGroup,
    lower_icmp_group, lower_port_group, lower_protocol_group, lower_service, lower_service_group,
};

use canon::{AclLine, IpAccessList, MatchExpr};
use names::{StructureKind, canonical_name};

/// Access list standing for a group, or a service object: one line permitting what
/// the group matches
#[must_use]
pub fn group_acl(kind: StructureKind, name: &str, expr: MatchExpr) -> IpAccessList {
    IpAccessList::new(canonical_name(kind, name))
        .with_source(name)
        .with_line(AclLine::accepting(expr, format!("{kind} {name}")))
}
