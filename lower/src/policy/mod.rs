// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route-policy compiler: route-maps and route-policies, and the prefix, community
//! and AS-path structures they match on.

mod action;
mod aspath;
mod calls;
mod community;
mod condition;
mod prefix;
mod route_map;
mod route_policy;

#[cfg(test)]
mod test;

pub use action::{SetAction, lower_set};
pub use aspath::{AsPathAccessList, AsPathAccessListLine, lower_as_path_list};
pub use calls::{applied, find_call_cycle};
pub use community::{
    CommunityElement, CommunityList, CommunityRef, CommunitySet, ExpandedCommunityLine,
    HalfExpr, StandardCommunityLine, lower_community_list, lower_community_set,
    match_communities, set_communities,
};
pub use condition::{RouteMapMatch, RoutePolicyBoolean, lower_boolean, lower_route_map_match};
pub use prefix::{
    PrefixList, PrefixListLine, PrefixRange, PrefixSet, lower_prefix_list, lower_prefix_set,
};
pub use route_map::{Continue, RouteMap, RouteMapClause, lower_route_map};
pub use route_policy::{Disposition, PolicyStatement, RoutePolicy, lower_route_policy};
