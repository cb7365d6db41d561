// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Routing policies: boolean guards over route attributes and statements transforming them.
//!
//! A policy runs its statements in order until an exit or return statement. Each policy
//! has a local default action (initially reject) that `SetDefaultAction*` statements update
//! and `ReturnLocalDefaultAction` returns. A [`Statement::Call`] runs another policy of the
//! same device, sharing the route being transformed and the default action.

use crate::aspath::AsPathMatch;
use crate::community::{CommunitySetExpr, SetSemantics};
use std::net::IpAddr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Ge,
    Le,
}

/// Integer-valued expression over route attributes and policy parameters
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LongExpr {
    Literal(u64),
    Var(String),
    /// Current value of the attribute, plus
    Increment(u64),
    /// Current value of the attribute, minus (saturating at zero)
    Decrement(u64),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntComparison {
    pub cmp: Comparator,
    pub value: LongExpr,
}

impl IntComparison {
    #[must_use]
    pub fn new(cmp: Comparator, value: LongExpr) -> Self {
        Self { cmp, value }
    }
    #[must_use]
    pub fn eq(value: u64) -> Self {
        Self::new(Comparator::Eq, LongExpr::Literal(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteType {
    Internal,
    External,
    Local,
    OspfIntraArea,
    OspfInterArea,
    OspfExternalType1,
    OspfExternalType2,
    OspfNssaExternalType1,
    OspfNssaExternalType2,
    IsisLevel1,
    IsisLevel2,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RouteTypeExpr {
    Literal(RouteType),
    Var(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoutingProtocol {
    Aggregate,
    Bgp,
    Ibgp,
    Connected,
    Eigrp,
    Isis,
    Local,
    Ospf,
    Rip,
    Static,
}

/// Which prefix of a route a prefix-set match applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrefixField {
    Destination,
    NextHop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Igp,
    Egp,
    Incomplete,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OriginExpr {
    /// Origin, and for EGP the AS it was learnt from
    Literal(Origin, Option<u32>),
    Var(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NextHopExpr {
    /// First reachable address of the list
    Ips(Vec<IpAddr>),
    PeerAddress,
    SelfAddress,
    Discard,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AsExpr {
    Literal(u32),
    Var(String),
    /// The AS most recently added to the path
    MostRecent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IsisMetricType {
    Internal,
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OspfMetricType {
    E1,
    E2,
}

/// EIGRP composite metric components
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EigrpMetric {
    /// kbit/s
    pub bandwidth: u64,
    /// tens of microseconds
    pub delay: u64,
    pub reliability: u8,
    pub load: u8,
    pub mtu: u32,
}

/// A boolean predicate over routes
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BooleanExpr {
    True,
    False,
    And(Vec<BooleanExpr>),
    Or(Vec<BooleanExpr>),
    Not(Box<BooleanExpr>),
    /// Run the named policy and use its outcome
    Call(String),
    MatchAsPath(AsPathMatch),
    MatchCommunities(SetSemantics, CommunitySetExpr),
    MatchLocalPreference(IntComparison),
    MatchMetric(IntComparison),
    MatchTag(IntComparison),
    MatchRouteType(RouteTypeExpr),
    /// Route was learnt from, or is sent to, this neighbor address
    MatchNeighborIp(IpAddr),
    /// Prefix is permitted by the named route filter
    MatchPrefixSet(PrefixField, String),
    MatchProtocol(Vec<RoutingProtocol>),
}

impl BooleanExpr {
    /// Conjunction, simplified: `True` members are dropped and the empty conjunction is `True`.
    #[must_use]
    pub fn and(exprs: impl IntoIterator<Item = BooleanExpr>) -> Self {
        let mut members = vec![];
        for e in exprs {
            match e {
                BooleanExpr::True => {}
                BooleanExpr::False => return BooleanExpr::False,
                BooleanExpr::And(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        match members.len() {
            0 => BooleanExpr::True,
            1 => members.pop().unwrap_or(BooleanExpr::True),
            _ => BooleanExpr::And(members),
        }
    }
    /// Disjunction, simplified: `False` members are dropped and the empty disjunction is `False`.
    #[must_use]
    pub fn or(exprs: impl IntoIterator<Item = BooleanExpr>) -> Self {
        let mut members = vec![];
        for e in exprs {
            match e {
                BooleanExpr::False => {}
                BooleanExpr::True => return BooleanExpr::True,
                BooleanExpr::Or(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        match members.len() {
            0 => BooleanExpr::False,
            1 => members.pop().unwrap_or(BooleanExpr::False),
            _ => BooleanExpr::Or(members),
        }
    }
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: BooleanExpr) -> Self {
        match expr {
            BooleanExpr::True => BooleanExpr::False,
            BooleanExpr::False => BooleanExpr::True,
            BooleanExpr::Not(inner) => *inner,
            other => BooleanExpr::Not(Box::new(other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct If {
    pub comment: Option<String>,
    pub guard: BooleanExpr,
    pub then: Vec<Statement>,
    pub otherwise: Vec<Statement>,
}

impl If {
    #[must_use]
    pub fn new(guard: BooleanExpr, then: Vec<Statement>, otherwise: Vec<Statement>) -> Self {
        Self {
            comment: None,
            guard,
            then,
            otherwise,
        }
    }
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Statement {
    If(If),
    /// Run the named policy as a sub-routine
    Call(String),

    SetCommunities(CommunitySetExpr),
    AddCommunities(CommunitySetExpr),
    /// Remove the communities matching the set
    DeleteCommunities(CommunitySetExpr),
    DeleteAllCommunities,
    SetLocalPreference(LongExpr),
    SetMetric(LongExpr),
    SetOrigin(OriginExpr),
    SetNextHop(NextHopExpr),
    PrependAsPath(Vec<AsExpr>),
    SetTag(LongExpr),
    SetWeight(LongExpr),
    SetIsisMetricType(IsisMetricType),
    SetOspfMetricType(OspfMetricType),
    SetEigrpMetric(EigrpMetric),
    /// Metric type bound by a policy parameter
    SetMetricTypeVar(String),

    SetDefaultActionAccept,
    SetDefaultActionReject,
    ExitAccept,
    ExitReject,
    ReturnLocalDefaultAction,
}

impl Statement {
    /// Tell if control never flows past this statement
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Statement::ExitAccept | Statement::ExitReject | Statement::ReturnLocalDefaultAction
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingPolicy {
    pub name: String,
    pub statements: Vec<Statement>,
}

impl RoutingPolicy {
    #[must_use]
    pub fn new(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            statements,
        }
    }
    /// Names of the policies this one calls, directly, in order of appearance
    #[must_use]
    pub fn callees(&self) -> Vec<&str> {
        fn walk_expr<'a>(e: &'a BooleanExpr, out: &mut Vec<&'a str>) {
            match e {
                BooleanExpr::Call(name) => out.push(name),
                BooleanExpr::And(v) | BooleanExpr::Or(v) => {
                    v.iter().for_each(|e| walk_expr(e, out));
                }
                BooleanExpr::Not(e) => walk_expr(e, out),
                _ => {}
            }
        }
        fn walk<'a>(stmts: &'a [Statement], out: &mut Vec<&'a str>) {
            for s in stmts {
                match s {
                    Statement::Call(name) => out.push(name),
                    Statement::If(i) => {
                        walk_expr(&i.guard, out);
                        walk(&i.then, out);
                        walk(&i.otherwise, out);
                    }
                    _ => {}
                }
            }
        }
        let mut out = vec![];
        walk(&self.statements, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callees_are_found_in_guards_and_branches() {
        let policy = RoutingPolicy::new(
            "p",
            vec![
                Statement::If(If::new(
                    BooleanExpr::and(vec![BooleanExpr::Call("g".into()), BooleanExpr::True]),
                    vec![Statement::Call("t".into())],
                    vec![Statement::Call("f".into())],
                )),
                Statement::Call("last".into()),
            ],
        );
        assert_eq!(policy.callees(), vec!["g", "t", "f", "last"]);
    }
}
