// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reference evaluator for the canonical language.
//!
//! Only built for tests (`testing` feature). Named references are looked up in the
//! environment; an unresolved reference evaluates to false, as does a reference chain
//! deeper than [`MAX_DEPTH`]. Regex-based community and AS-path lines never match.

use crate::aspath::{AsPathMatch, AsRange};
use crate::community::{
    CommunityDef, CommunityLineMatcher, CommunityMatch, CommunitySetExpr, HalfMatch, SetSemantics,
};
use crate::ipspace::IpSpace;
use crate::packet::{HeaderSpace, IpAccessList, IpProtocol, LineAction, MatchExpr};
use crate::policy::{
    AsExpr, BooleanExpr, Comparator, IntComparison, LongExpr, NextHopExpr, PrefixField,
    RouteType, RouteTypeExpr, RoutingPolicy, RoutingProtocol, Statement,
};
use crate::routefilter::RouteFilterList;
use ipnet::IpNet;
use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};

pub const MAX_DEPTH: usize = 64;

/// A single packet, as seen by match expressions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flow {
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub protocol: IpProtocol,
    pub src_port: u16,
    pub dst_port: u16,
    pub icmp_type: u8,
    pub icmp_code: u8,
}

impl Flow {
    #[must_use]
    pub fn tcp(src: Ipv4Addr, dst: Ipv4Addr, dst_port: u16) -> Self {
        Self {
            src_ip: IpAddr::V4(src),
            dst_ip: IpAddr::V4(dst),
            protocol: IpProtocol::TCP,
            src_port: 49152,
            dst_port,
            icmp_type: 0,
            icmp_code: 0,
        }
    }
    #[must_use]
    pub fn udp(src: Ipv4Addr, dst: Ipv4Addr, dst_port: u16) -> Self {
        Self {
            protocol: IpProtocol::UDP,
            ..Self::tcp(src, dst, dst_port)
        }
    }
    #[must_use]
    pub fn icmp(src: Ipv4Addr, dst: Ipv4Addr, icmp_type: u8, icmp_code: u8) -> Self {
        Self {
            protocol: IpProtocol::ICMP,
            src_port: 0,
            dst_port: 0,
            icmp_type,
            icmp_code,
            ..Self::tcp(src, dst, 0)
        }
    }
}

/// Named IP spaces and access lists of one device
#[derive(Clone, Debug, Default)]
pub struct PacketEnv {
    pub ip_spaces: BTreeMap<String, IpSpace>,
    pub acls: BTreeMap<String, IpAccessList>,
}

impl PacketEnv {
    #[must_use]
    pub fn new(
        ip_spaces: BTreeMap<String, IpSpace>,
        acls: BTreeMap<String, IpAccessList>,
    ) -> Self {
        Self { ip_spaces, acls }
    }
    #[must_use]
    pub fn with_ip_space(mut self, name: impl Into<String>, space: IpSpace) -> Self {
        self.ip_spaces.insert(name.into(), space);
        self
    }
    #[must_use]
    pub fn with_acl(mut self, acl: IpAccessList) -> Self {
        self.acls.insert(acl.name.clone(), acl);
        self
    }

    /// Tell if an address belongs to a space
    #[must_use]
    pub fn contains(&self, space: &IpSpace, ip: IpAddr) -> bool {
        self.contains_at(space, ip, 0)
    }

    fn contains_at(&self, space: &IpSpace, ip: IpAddr, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        match space {
            IpSpace::Empty => false,
            IpSpace::Universe => true,
            IpSpace::Prefix(net) => net.contains(&ip),
            IpSpace::Wildcard(w) => match ip {
                IpAddr::V4(v4) => w.contains(v4),
                IpAddr::V6(_) => false,
            },
            IpSpace::Range { first, last } => match (first, last, ip) {
                (IpAddr::V4(f), IpAddr::V4(l), IpAddr::V4(a)) => *f <= a && a <= *l,
                (IpAddr::V6(f), IpAddr::V6(l), IpAddr::V6(a)) => *f <= a && a <= *l,
                _ => false,
            },
            IpSpace::Reference(name) => self
                .ip_spaces
                .get(name)
                .is_some_and(|s| self.contains_at(s, ip, depth + 1)),
            IpSpace::Union(members) => members.iter().any(|m| self.contains_at(m, ip, depth + 1)),
        }
    }

    fn header_matches(&self, hs: &HeaderSpace, flow: &Flow, depth: usize) -> bool {
        hs.src_ips
            .as_ref()
            .is_none_or(|s| self.contains_at(s, flow.src_ip, depth + 1))
            && hs
                .dst_ips
                .as_ref()
                .is_none_or(|s| self.contains_at(s, flow.dst_ip, depth + 1))
            && (hs.protocols.is_empty() || hs.protocols.contains(&flow.protocol))
            && (hs.src_ports.is_empty() || hs.src_ports.iter().any(|r| r.contains(flow.src_port)))
            && (hs.dst_ports.is_empty() || hs.dst_ports.iter().any(|r| r.contains(flow.dst_port)))
            && (hs.icmp_types.is_empty() || hs.icmp_types.contains(&flow.icmp_type))
            && (hs.icmp_codes.is_empty() || hs.icmp_codes.contains(&flow.icmp_code))
    }

    /// Evaluate a match expression against a packet
    #[must_use]
    pub fn matches(&self, expr: &MatchExpr, flow: &Flow) -> bool {
        self.matches_at(expr, flow, 0)
    }

    fn matches_at(&self, expr: &MatchExpr, flow: &Flow, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        match expr {
            MatchExpr::True => true,
            MatchExpr::False => false,
            MatchExpr::Header(hs) => self.header_matches(hs, flow, depth),
            MatchExpr::PermittedByAcl(name) => self
                .acls
                .get(name)
                .is_some_and(|acl| self.filter_at(acl, flow, depth + 1) == LineAction::Permit),
            MatchExpr::And(v) => v.iter().all(|e| self.matches_at(e, flow, depth + 1)),
            MatchExpr::Or(v) => v.iter().any(|e| self.matches_at(e, flow, depth + 1)),
            MatchExpr::Not(e) => !self.matches_at(e, flow, depth + 1),
        }
    }

    /// Outcome of an access list for a packet: first matching line, else deny
    #[must_use]
    pub fn filter(&self, acl: &IpAccessList, flow: &Flow) -> LineAction {
        self.filter_at(acl, flow, 0)
    }

    fn filter_at(&self, acl: &IpAccessList, flow: &Flow, depth: usize) -> LineAction {
        acl.lines
            .iter()
            .find(|line| self.matches_at(&line.expr, flow, depth + 1))
            .map_or(LineAction::Deny, |line| line.action)
    }

    /// Outcome of the named access list; deny if undefined
    #[must_use]
    pub fn filter_named(&self, name: &str, flow: &Flow) -> LineAction {
        self.acls
            .get(name)
            .map_or(LineAction::Deny, |acl| self.filter(acl, flow))
    }
}

/// A route, as seen and modified by routing policies
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub prefix: IpNet,
    pub next_hop: Option<IpAddr>,
    pub neighbor: Option<IpAddr>,
    pub protocol: RoutingProtocol,
    pub route_type: Option<RouteType>,
    pub communities: BTreeSet<u32>,
    pub local_preference: u64,
    pub metric: u64,
    pub tag: u64,
    pub weight: u64,
    pub as_path: Vec<u32>,
}

impl Route {
    #[must_use]
    pub fn bgp(prefix: IpNet) -> Self {
        Self {
            prefix,
            next_hop: None,
            neighbor: None,
            protocol: RoutingProtocol::Bgp,
            route_type: None,
            communities: BTreeSet::new(),
            local_preference: 100,
            metric: 0,
            tag: 0,
            weight: 0,
            as_path: vec![],
        }
    }
    #[must_use]
    pub fn with_community(mut self, high: u16, low: u16) -> Self {
        self.communities
            .insert((u32::from(high) << 16) | u32::from(low));
        self
    }
    #[must_use]
    pub fn with_as_path(mut self, path: impl IntoIterator<Item = u32>) -> Self {
        self.as_path = path.into_iter().collect();
        self
    }
    #[must_use]
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = tag;
        self
    }
    #[must_use]
    pub fn has_community(&self, high: u16, low: u16) -> bool {
        self.communities
            .contains(&((u32::from(high) << 16) | u32::from(low)))
    }
}

/// Named route-level structures of one device, plus bound policy parameters
#[derive(Clone, Debug, Default)]
pub struct RouteEnv {
    pub policies: BTreeMap<String, RoutingPolicy>,
    pub route_filters: BTreeMap<String, RouteFilterList>,
    pub community_defs: BTreeMap<String, CommunityDef>,
    pub vars: BTreeMap<String, u64>,
}

/// How control leaves a statement list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flowed {
    Next,
    Exit(bool),
    Return(bool),
}

struct RouteState<'r> {
    route: &'r mut Route,
    default_action: bool,
}

impl RouteEnv {
    #[must_use]
    pub fn with_policy(mut self, policy: RoutingPolicy) -> Self {
        self.policies.insert(policy.name.clone(), policy);
        self
    }

    /// Run the named policy over a route. Returns whether the route is accepted, and
    /// leaves the route as the policy transformed it. An undefined policy rejects.
    pub fn process(&self, policy: &str, route: &mut Route) -> bool {
        let Some(policy) = self.policies.get(policy) else {
            return false;
        };
        let mut state = RouteState {
            route,
            default_action: false,
        };
        match self.run(policy, &mut state, 0) {
            Flowed::Exit(accept) | Flowed::Return(accept) => accept,
            Flowed::Next => state.default_action,
        }
    }

    fn run(&self, policy: &RoutingPolicy, state: &mut RouteState<'_>, depth: usize) -> Flowed {
        if depth > MAX_DEPTH {
            return Flowed::Exit(false);
        }
        match self.exec(&policy.statements, state, depth) {
            Flowed::Next => Flowed::Return(state.default_action),
            other => other,
        }
    }

    fn call(&self, name: &str, state: &mut RouteState<'_>, depth: usize) -> Flowed {
        match self.policies.get(name) {
            Some(policy) => self.run(policy, state, depth + 1),
            None => Flowed::Return(false),
        }
    }

    fn exec(&self, stmts: &[Statement], state: &mut RouteState<'_>, depth: usize) -> Flowed {
        for stmt in stmts {
            let flowed = match stmt {
                Statement::If(i) => {
                    if self.test(&i.guard, state, depth) {
                        self.exec(&i.then, state, depth)
                    } else {
                        self.exec(&i.otherwise, state, depth)
                    }
                }
                Statement::Call(name) => match self.call(name, state, depth) {
                    Flowed::Exit(v) => Flowed::Exit(v),
                    Flowed::Return(_) | Flowed::Next => Flowed::Next,
                },
                Statement::SetDefaultActionAccept => {
                    state.default_action = true;
                    Flowed::Next
                }
                Statement::SetDefaultActionReject => {
                    state.default_action = false;
                    Flowed::Next
                }
                Statement::ExitAccept => Flowed::Exit(true),
                Statement::ExitReject => Flowed::Exit(false),
                Statement::ReturnLocalDefaultAction => Flowed::Return(state.default_action),
                other => {
                    self.apply(other, state.route);
                    Flowed::Next
                }
            };
            if flowed != Flowed::Next {
                return flowed;
            }
        }
        Flowed::Next
    }

    fn long(&self, expr: &LongExpr, current: u64) -> u64 {
        match expr {
            LongExpr::Literal(v) => *v,
            LongExpr::Var(name) => self.vars.get(name).copied().unwrap_or_default(),
            LongExpr::Increment(v) => current.saturating_add(*v),
            LongExpr::Decrement(v) => current.saturating_sub(*v),
        }
    }

    fn half(&self, half: &HalfMatch, value: u16) -> bool {
        match half {
            HalfMatch::Literal(v) => *v == value,
            HalfMatch::Range(lo, hi) => *lo <= value && value <= *hi,
            HalfMatch::Var(name) => self.vars.get(name) == Some(&u64::from(value)),
            HalfMatch::Any => true,
        }
    }

    fn community_matches(&self, m: &CommunityMatch, community: u32) -> bool {
        #[allow(clippy::cast_possible_truncation)]
        let (high, low) = ((community >> 16) as u16, (community & 0xffff) as u16);
        self.half(&m.high, high) && self.half(&m.low, low)
    }

    /// Literal communities denoted by a set, for set-context statements
    fn literals(&self, set: &CommunitySetExpr) -> Vec<u32> {
        let matchers: &[CommunityMatch] = match set {
            CommunitySetExpr::Inline(v) => v,
            CommunitySetExpr::Reference(name) => match self.community_defs.get(name) {
                Some(CommunityDef::Set(v)) => v,
                _ => &[],
            },
        };
        let value = |h: &HalfMatch| match h {
            HalfMatch::Literal(v) => Some(u32::from(*v)),
            HalfMatch::Var(name) => self
                .vars
                .get(name)
                .and_then(|v| u16::try_from(*v).ok())
                .map(u32::from),
            HalfMatch::Range(..) | HalfMatch::Any => None,
        };
        matchers
            .iter()
            .filter_map(|m| Some((value(&m.high)? << 16) | value(&m.low)?))
            .collect()
    }

    fn community_set_matches(
        &self,
        sem: SetSemantics,
        set: &CommunitySetExpr,
        route: &Route,
    ) -> bool {
        let inline = |v: &[CommunityMatch]| match sem {
            SetSemantics::Any => v
                .iter()
                .any(|m| route.communities.iter().any(|c| self.community_matches(m, *c))),
            SetSemantics::Every => v
                .iter()
                .all(|m| route.communities.iter().any(|c| self.community_matches(m, *c))),
        };
        match set {
            CommunitySetExpr::Inline(v) => inline(v),
            CommunitySetExpr::Reference(name) => match self.community_defs.get(name) {
                None => false,
                Some(CommunityDef::Set(v)) => inline(v),
                Some(CommunityDef::List(lines)) => lines
                    .iter()
                    .find(|line| match &line.matcher {
                        CommunityLineMatcher::AllOf(v) => v
                            .iter()
                            .all(|m| {
                                route.communities.iter().any(|c| self.community_matches(m, *c))
                            }),
                        CommunityLineMatcher::Regex(_) => false,
                    })
                    .is_some_and(|line| line.action == LineAction::Permit),
            },
        }
    }

    fn compare(&self, c: &IntComparison, actual: u64) -> bool {
        let expected = self.long(&c.value, actual);
        match c.cmp {
            Comparator::Eq => actual == expected,
            Comparator::Ge => actual >= expected,
            Comparator::Le => actual <= expected,
        }
    }

    fn as_path_matches(m: &AsPathMatch, path: &[u32]) -> bool {
        let in_ranges = |ranges: &[AsRange], asn: u32| ranges.iter().any(|r| r.contains(asn));
        match m {
            AsPathMatch::OriginatesFrom { ranges, exact } => {
                path.last().is_some_and(|a| in_ranges(ranges, *a)) && (!exact || path.len() == 1)
            }
            AsPathMatch::NeighborIs { ranges, exact } => {
                path.first().is_some_and(|a| in_ranges(ranges, *a)) && (!exact || path.len() == 1)
            }
            AsPathMatch::PassesThrough { ranges, exact } => {
                if *exact {
                    !path.is_empty() && path.iter().all(|a| in_ranges(ranges, *a))
                } else {
                    path.iter().any(|a| in_ranges(ranges, *a))
                }
            }
            AsPathMatch::Reference(_) => false,
        }
    }

    fn test(&self, expr: &BooleanExpr, state: &mut RouteState<'_>, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        match expr {
            BooleanExpr::True => true,
            BooleanExpr::False => false,
            BooleanExpr::And(v) => v.iter().all(|e| self.test(e, state, depth + 1)),
            BooleanExpr::Or(v) => v.iter().any(|e| self.test(e, state, depth + 1)),
            BooleanExpr::Not(e) => !self.test(e, state, depth + 1),
            BooleanExpr::Call(name) => match self.call(name, state, depth) {
                Flowed::Exit(v) | Flowed::Return(v) => v,
                Flowed::Next => state.default_action,
            },
            BooleanExpr::MatchAsPath(m) => Self::as_path_matches(m, &state.route.as_path),
            BooleanExpr::MatchCommunities(sem, set) => {
                self.community_set_matches(*sem, set, state.route)
            }
            BooleanExpr::MatchLocalPreference(c) => self.compare(c, state.route.local_preference),
            BooleanExpr::MatchMetric(c) => self.compare(c, state.route.metric),
            BooleanExpr::MatchTag(c) => self.compare(c, state.route.tag),
            BooleanExpr::MatchRouteType(RouteTypeExpr::Literal(t)) => {
                state.route.route_type == Some(*t)
            }
            BooleanExpr::MatchRouteType(RouteTypeExpr::Var(_)) => false,
            BooleanExpr::MatchNeighborIp(ip) => state.route.neighbor == Some(*ip),
            BooleanExpr::MatchPrefixSet(field, name) => {
                let prefix = match field {
                    PrefixField::Destination => Some(state.route.prefix),
                    PrefixField::NextHop => state.route.next_hop.map(IpNet::from),
                };
                match (prefix, self.route_filters.get(name)) {
                    (Some(p), Some(filter)) => filter.action_for(&p) == Some(LineAction::Permit),
                    _ => false,
                }
            }
            BooleanExpr::MatchProtocol(protocols) => protocols.contains(&state.route.protocol),
        }
    }

    fn apply(&self, stmt: &Statement, route: &mut Route) {
        match stmt {
            Statement::SetCommunities(set) => {
                route.communities = self.literals(set).into_iter().collect();
            }
            Statement::AddCommunities(set) => route.communities.extend(self.literals(set)),
            Statement::DeleteCommunities(set) => {
                let doomed: Vec<u32> = route
                    .communities
                    .iter()
                    .copied()
                    .filter(|c| match set {
                        CommunitySetExpr::Inline(v) => {
                            v.iter().any(|m| self.community_matches(m, *c))
                        }
                        CommunitySetExpr::Reference(_) => {
                            let single = Route {
                                communities: BTreeSet::from([*c]),
                                ..route.clone()
                            };
                            self.community_set_matches(SetSemantics::Any, set, &single)
                        }
                    })
                    .collect();
                for c in doomed {
                    route.communities.remove(&c);
                }
            }
            Statement::DeleteAllCommunities => route.communities.clear(),
            Statement::SetLocalPreference(e) => {
                route.local_preference = self.long(e, route.local_preference);
            }
            Statement::SetMetric(e) => route.metric = self.long(e, route.metric),
            Statement::SetTag(e) => route.tag = self.long(e, route.tag),
            Statement::SetWeight(e) => route.weight = self.long(e, route.weight),
            Statement::SetNextHop(NextHopExpr::Ips(ips)) => route.next_hop = ips.first().copied(),
            Statement::SetNextHop(NextHopExpr::PeerAddress) => route.next_hop = route.neighbor,
            Statement::SetNextHop(NextHopExpr::Discard | NextHopExpr::SelfAddress) => {
                route.next_hop = None;
            }
            Statement::PrependAsPath(list) => {
                let mut prepended = vec![];
                for e in list {
                    match e {
                        AsExpr::Literal(asn) => prepended.push(*asn),
                        AsExpr::Var(name) => {
                            let asn = self.vars.get(name).and_then(|v| u32::try_from(*v).ok());
                            if let Some(asn) = asn {
                                prepended.push(asn);
                            }
                        }
                        AsExpr::MostRecent => {
                            if let Some(asn) = route.as_path.first() {
                                prepended.push(*asn);
                            }
                        }
                    }
                }
                prepended.append(&mut route.as_path);
                route.as_path = prepended;
            }
            // attributes this route model does not carry
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{AclLine, PortRange};
    use crate::policy::If;

    #[test]
    fn unresolved_references_are_false() {
        let env = PacketEnv::default();
        let flow = Flow::tcp(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 80);
        assert!(!env.matches(&MatchExpr::permitted_by("nowhere"), &flow));
        assert!(!env.contains(&IpSpace::reference("nowhere"), flow.src_ip));
        assert!(env.matches(&MatchExpr::not(MatchExpr::permitted_by("nowhere")), &flow));
    }

    #[test]
    fn acl_first_match() {
        let web = HeaderSpace::new()
            .protocol(IpProtocol::TCP)
            .dst_ports(vec![PortRange::single(80)]);
        let acl = IpAccessList::new("a")
            .with_line(AclLine::new(LineAction::Deny, web.into(), "deny web"))
            .with_line(AclLine::accepting(MatchExpr::True, "permit all"));
        let env = PacketEnv::default().with_acl(acl);
        let src = Ipv4Addr::new(1, 1, 1, 1);
        let dst = Ipv4Addr::new(2, 2, 2, 2);
        assert_eq!(env.filter_named("a", &Flow::tcp(src, dst, 80)), LineAction::Deny);
        assert_eq!(env.filter_named("a", &Flow::tcp(src, dst, 81)), LineAction::Permit);
        assert_eq!(env.filter_named("b", &Flow::tcp(src, dst, 81)), LineAction::Deny);
    }

    #[test]
    fn self_referencing_space_terminates() {
        let env = PacketEnv::default().with_ip_space("loop", IpSpace::reference("loop"));
        assert!(!env.contains(&IpSpace::reference("loop"), IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[test]
    fn calls_share_default_action() {
        let callee = RoutingPolicy::new(
            "callee",
            vec![
                Statement::SetDefaultActionAccept,
                Statement::SetTag(LongExpr::Literal(7)),
            ],
        );
        let caller = RoutingPolicy::new(
            "caller",
            vec![
                Statement::SetDefaultActionReject,
                Statement::Call("callee".into()),
                Statement::ReturnLocalDefaultAction,
            ],
        );
        let env = RouteEnv::default().with_policy(callee).with_policy(caller);
        let mut route = Route::bgp("10.0.0.0/8".parse().unwrap());
        assert!(env.process("caller", &mut route));
        assert_eq!(route.tag, 7);
    }

    #[test]
    fn exit_propagates_through_calls() {
        let callee = RoutingPolicy::new("callee", vec![Statement::ExitReject]);
        let caller = RoutingPolicy::new(
            "caller",
            vec![Statement::Call("callee".into()), Statement::ExitAccept],
        );
        let env = RouteEnv::default().with_policy(callee).with_policy(caller);
        let mut route = Route::bgp("10.0.0.0/8".parse().unwrap());
        assert!(!env.process("caller", &mut route));
    }

    #[test]
    fn guards_select_branches() {
        let policy = RoutingPolicy::new(
            "p",
            vec![Statement::If(If::new(
                BooleanExpr::MatchTag(IntComparison::eq(5)),
                vec![Statement::ExitAccept],
                vec![Statement::ExitReject],
            ))],
        );
        let env = RouteEnv::default().with_policy(policy);
        let prefix: IpNet = "10.0.0.0/8".parse().unwrap();
        assert!(env.process("p", &mut Route::bgp(prefix).with_tag(5)));
        assert!(!env.process("p", &mut Route::bgp(prefix).with_tag(6)));
    }
}
