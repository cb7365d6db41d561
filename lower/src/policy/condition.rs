// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route-map match lines and route-policy boolean conditions

use super::community::{CommunityRef, match_communities};
use crate::context::LowerCtx;
use crate::errors::{LowerError, LowerResult};
use canon::{
    AsPathMatch, AsRange, BooleanExpr, CommunitySetExpr, IntComparison, PrefixField, RouteType,
    RouteTypeExpr, RoutingProtocol, SetSemantics,
};
use names::{StructureKind, WarningKind};
use std::net::IpAddr;

/// A `match` line of a route-map clause
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteMapMatch {
    AsPath(Vec<String>),
    Community(Vec<String>),
    IpAddress(Vec<String>),
    IpPrefixList(Vec<String>),
    Ipv6Address(Vec<String>),
    Ipv6PrefixList(Vec<String>),
    Tag(Vec<u64>),
    Metric(u64),
    LocalPreference(u64),
    RouteType(Vec<RouteType>),
    SourceProtocol(Vec<RoutingProtocol>),
    /// `match ip route-source` / neighbor address
    Neighbor(Vec<IpAddr>),
}

impl RouteMapMatch {
    /// Address lines, which combine with each other by OR whatever the semantics
    #[must_use]
    pub fn is_address(&self) -> bool {
        matches!(
            self,
            RouteMapMatch::IpAddress(_)
                | RouteMapMatch::IpPrefixList(_)
                | RouteMapMatch::Ipv6Address(_)
                | RouteMapMatch::Ipv6PrefixList(_)
        )
    }
}

/// `match ip address NAME`: only standard access-lists filter routes
fn match_address_acl(ctx: &mut LowerCtx<'_>, name: &str, usage: &str) -> BooleanExpr {
    let registry = ctx.registry();
    if registry.contains(StructureKind::ExtendedAccessList, name)
        && !registry.contains(StructureKind::StandardAccessList, name)
    {
        ctx.refer(StructureKind::ExtendedAccessList, name, usage);
        ctx.warn(
            WarningKind::Unsupported,
            format!("extended access-list {name} cannot filter routes, it matches nothing"),
        );
        return BooleanExpr::False;
    }
    BooleanExpr::MatchPrefixSet(
        PrefixField::Destination,
        ctx.canonical_ref(StructureKind::StandardAccessList, name, usage),
    )
}

pub fn lower_route_map_match(
    ctx: &mut LowerCtx<'_>,
    line: &RouteMapMatch,
) -> LowerResult<BooleanExpr> {
    Ok(match line {
        RouteMapMatch::AsPath(lists) => BooleanExpr::or(lists.iter().map(|name| {
            BooleanExpr::MatchAsPath(AsPathMatch::Reference(ctx.canonical_ref(
                StructureKind::AsPathAccessList,
                name,
                "route-map match as-path",
            )))
        })),
        RouteMapMatch::Community(lists) => BooleanExpr::or(lists.iter().map(|name| {
            BooleanExpr::MatchCommunities(
                SetSemantics::Any,
                CommunitySetExpr::Reference(ctx.canonical_ref(
                    StructureKind::CommunityList,
                    name,
                    "route-map match community",
                )),
            )
        })),
        RouteMapMatch::IpAddress(acls) => BooleanExpr::or(
            acls.iter()
                .map(|name| match_address_acl(ctx, name, "route-map match ip address")),
        ),
        RouteMapMatch::Ipv6Address(acls) => BooleanExpr::or(
            acls.iter()
                .map(|name| match_address_acl(ctx, name, "route-map match ipv6 address")),
        ),
        RouteMapMatch::IpPrefixList(lists) => BooleanExpr::or(lists.iter().map(|name| {
            BooleanExpr::MatchPrefixSet(
                PrefixField::Destination,
                ctx.canonical_ref(
                    StructureKind::PrefixList,
                    name,
                    "route-map match ip address prefix-list",
                ),
            )
        })),
        RouteMapMatch::Ipv6PrefixList(lists) => BooleanExpr::or(lists.iter().map(|name| {
            BooleanExpr::MatchPrefixSet(
                PrefixField::Destination,
                ctx.canonical_ref(
                    StructureKind::Ipv6PrefixList,
                    name,
                    "route-map match ipv6 address prefix-list",
                ),
            )
        })),
        RouteMapMatch::Tag(tags) => BooleanExpr::or(
            tags.iter()
                .map(|tag| BooleanExpr::MatchTag(IntComparison::eq(*tag))),
        ),
        RouteMapMatch::Metric(metric) => BooleanExpr::MatchMetric(IntComparison::eq(*metric)),
        RouteMapMatch::LocalPreference(pref) => {
            BooleanExpr::MatchLocalPreference(IntComparison::eq(*pref))
        }
        RouteMapMatch::RouteType(types) => BooleanExpr::or(
            types
                .iter()
                .map(|t| BooleanExpr::MatchRouteType(RouteTypeExpr::Literal(*t))),
        ),
        RouteMapMatch::SourceProtocol(protocols) => BooleanExpr::MatchProtocol(protocols.clone()),
        RouteMapMatch::Neighbor(_) => {
            return Err(LowerError::Unsupported("route-map match on neighbor".into()));
        }
    })
}

/// Boolean condition of a route-policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutePolicyBoolean {
    And(Vec<RoutePolicyBoolean>),
    Or(Vec<RoutePolicyBoolean>),
    Not(Box<RoutePolicyBoolean>),
    AsPathOriginatesFrom { ranges: Vec<AsRange>, exact: bool },
    AsPathPassesThrough { ranges: Vec<AsRange>, exact: bool },
    AsPathNeighborIs { ranges: Vec<AsRange>, exact: bool },
    /// `as-path in NAME`
    AsPathIn(String),
    CommunityMatchesAny(CommunityRef),
    CommunityMatchesEvery(CommunityRef),
    LocalPreference(IntComparison),
    Med(IntComparison),
    Tag(IntComparison),
    RouteType(RouteTypeExpr),
    NeighborIs(IpAddr),
    /// `destination in NAME`
    DestinationIn(String),
    /// `apply NAME` used as a condition
    Apply(String),
}

pub fn lower_boolean(
    ctx: &mut LowerCtx<'_>,
    expr: &RoutePolicyBoolean,
) -> LowerResult<BooleanExpr> {
    Ok(match expr {
        RoutePolicyBoolean::And(v) => {
            let mut out = Vec::with_capacity(v.len());
            for e in v {
                out.push(lower_boolean(ctx, e)?);
            }
            BooleanExpr::and(out)
        }
        RoutePolicyBoolean::Or(v) => {
            let mut out = Vec::with_capacity(v.len());
            for e in v {
                out.push(lower_boolean(ctx, e)?);
            }
            BooleanExpr::or(out)
        }
        RoutePolicyBoolean::Not(e) => BooleanExpr::not(lower_boolean(ctx, e)?),
        RoutePolicyBoolean::AsPathOriginatesFrom { ranges, exact } => {
            BooleanExpr::MatchAsPath(AsPathMatch::OriginatesFrom {
                ranges: ranges.clone(),
                exact: *exact,
            })
        }
        RoutePolicyBoolean::AsPathPassesThrough { ranges, exact } => {
            BooleanExpr::MatchAsPath(AsPathMatch::PassesThrough {
                ranges: ranges.clone(),
                exact: *exact,
            })
        }
        RoutePolicyBoolean::AsPathNeighborIs { ranges, exact } => {
            BooleanExpr::MatchAsPath(AsPathMatch::NeighborIs {
                ranges: ranges.clone(),
                exact: *exact,
            })
        }
        RoutePolicyBoolean::AsPathIn(name) => BooleanExpr::MatchAsPath(AsPathMatch::Reference(
            ctx.canonical_ref(StructureKind::AsPathAccessList, name, "route-policy as-path in"),
        )),
        RoutePolicyBoolean::CommunityMatchesAny(communities) => BooleanExpr::MatchCommunities(
            SetSemantics::Any,
            match_communities(ctx, communities, "route-policy community matches-any")?,
        ),
        RoutePolicyBoolean::CommunityMatchesEvery(communities) => BooleanExpr::MatchCommunities(
            SetSemantics::Every,
            match_communities(ctx, communities, "route-policy community matches-every")?,
        ),
        RoutePolicyBoolean::LocalPreference(c) => BooleanExpr::MatchLocalPreference(c.clone()),
        RoutePolicyBoolean::Med(c) => BooleanExpr::MatchMetric(c.clone()),
        RoutePolicyBoolean::Tag(c) => BooleanExpr::MatchTag(c.clone()),
        RoutePolicyBoolean::RouteType(t) => BooleanExpr::MatchRouteType(t.clone()),
        RoutePolicyBoolean::NeighborIs(ip) => BooleanExpr::MatchNeighborIp(*ip),
        RoutePolicyBoolean::DestinationIn(name) => {
            // prefix-set, or a prefix-list of either family
            let kind = [
                StructureKind::PrefixSet,
                StructureKind::PrefixList,
                StructureKind::Ipv6PrefixList,
            ]
            .into_iter()
            .find(|kind| ctx.registry().contains(*kind, name))
            .unwrap_or(StructureKind::PrefixSet);
            BooleanExpr::MatchPrefixSet(
                PrefixField::Destination,
                ctx.canonical_ref(kind, name, "route-policy destination in"),
            )
        }
        RoutePolicyBoolean::Apply(name) => BooleanExpr::Call(ctx.canonical_ref(
            StructureKind::RoutePolicy,
            name,
            "route-policy apply",
        )),
    })
}
