// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route-maps

use super::action::{SetAction, lower_set};
use super::condition::{RouteMapMatch, lower_route_map_match};
use crate::context::LowerCtx;
use crate::errors::{LowerError, LowerResult};
use crate::settings::{ContinuePolicy, MatchSemantics};
use canon::{BooleanExpr, If, LineAction, RoutingPolicy, Statement};
use names::{StructureId, StructureKind, WarningKind, canonical_clause_name, canonical_name};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continue {
    /// `continue` without a target: the next clause
    Next,
    Clause(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMapClause {
    pub action: LineAction,
    pub matches: Vec<RouteMapMatch>,
    /// Declared semantics of the match lines, if any
    pub semantics: Option<MatchSemantics>,
    pub sets: Vec<SetAction>,
    pub continue_to: Option<Continue>,
    pub line: Option<u32>,
}

/* builder-style setters */
impl RouteMapClause {
    #[must_use]
    pub fn new(action: LineAction) -> Self {
        Self {
            action,
            matches: vec![],
            semantics: None,
            sets: vec![],
            continue_to: None,
            line: None,
        }
    }
    #[must_use]
    pub fn permit() -> Self {
        Self::new(LineAction::Permit)
    }
    #[must_use]
    pub fn deny() -> Self {
        Self::new(LineAction::Deny)
    }
    #[must_use]
    pub fn with_match(mut self, line: RouteMapMatch) -> Self {
        self.matches.push(line);
        self
    }
    #[must_use]
    pub fn with_set(mut self, action: SetAction) -> Self {
        self.sets.push(action);
        self
    }
    #[must_use]
    pub fn semantics(mut self, semantics: MatchSemantics) -> Self {
        self.semantics = Some(semantics);
        self
    }
    #[must_use]
    pub fn continue_to(mut self, target: Continue) -> Self {
        self.continue_to = Some(target);
        self
    }
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// Clauses by sequence number
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMap {
    pub clauses: BTreeMap<u32, RouteMapClause>,
}

impl RouteMap {
    #[must_use]
    pub fn with_clause(mut self, seq: u32, clause: RouteMapClause) -> Self {
        self.clauses.insert(seq, clause);
        self
    }
    fn next_clause(&self, seq: u32) -> Option<u32> {
        self.clauses
            .range((Excluded(seq), Unbounded))
            .next()
            .map(|(next, _)| *next)
    }
}

/// Guard of a clause. Under match-all, address lines are OR-ed together first, so a
/// route of either family can match.
fn guard(ctx: &mut LowerCtx<'_>, clause: &RouteMapClause) -> LowerResult<BooleanExpr> {
    if clause.matches.is_empty() {
        return Ok(BooleanExpr::True);
    }
    let semantics = clause
        .semantics
        .unwrap_or(ctx.settings().route_map_semantics);
    let mut addresses = vec![];
    let mut others = vec![];
    for line in &clause.matches {
        let expr = lower_route_map_match(ctx, line)?;
        if line.is_address() {
            addresses.push(expr);
        } else {
            others.push(expr);
        }
    }
    Ok(match semantics {
        MatchSemantics::MatchAll if addresses.is_empty() => BooleanExpr::and(others),
        MatchSemantics::MatchAll => {
            BooleanExpr::and(std::iter::once(BooleanExpr::or(addresses)).chain(others))
        }
        MatchSemantics::MatchAny => BooleanExpr::or(addresses.into_iter().chain(others)),
    })
}

fn sets(ctx: &mut LowerCtx<'_>, clause: &RouteMapClause) -> LowerResult<Vec<Statement>> {
    let mut out = Vec::with_capacity(clause.sets.len() + 1);
    for set in &clause.sets {
        out.push(lower_set(ctx, set)?);
    }
    Ok(out)
}

/// Clause a continue goes to, if it is followed at all
fn continue_target(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    map: &RouteMap,
    seq: u32,
    clause: &RouteMapClause,
) -> LowerResult<Option<u32>> {
    let Some(cont) = clause.continue_to else {
        return Ok(None);
    };
    let target = match cont {
        Continue::Clause(target) => target,
        Continue::Next => match map.next_clause(seq) {
            Some(next) => next,
            None => {
                ctx.warn(
                    WarningKind::SuspiciousContinue,
                    format!("continue in last clause {seq} is ignored"),
                );
                return Ok(None);
            }
        },
    };
    if target <= seq {
        let message =
            format!("clause {seq} continues to clause {target}, which does not follow it");
        return match ctx.settings().continue_policy {
            ContinuePolicy::Reject => {
                ctx.warn(WarningKind::SuspiciousContinue, message);
                Err(LowerError::InvalidContinue {
                    clause: seq,
                    target,
                })
            }
            ContinuePolicy::BestEffort => {
                ctx.warn(WarningKind::SuspiciousContinue, format!("{message}: ignored"));
                Ok(None)
            }
        };
    }
    if !map.clauses.contains_key(&target) {
        let id = StructureId::new(StructureKind::RouteMapClause, format!("{name}~{target}"));
        let usage = format!("route-map {name} clause {seq} continue");
        let referrer = ctx.subject().cloned();
        ctx.diags().undefined_reference(id, usage, clause.line, referrer);
        return Ok(None);
    }
    Ok(Some(target))
}

/// A clause, lowered
struct Lowered {
    seq: u32,
    action: LineAction,
    guard: BooleanExpr,
    sets: Vec<Statement>,
    continue_to: Option<u32>,
}

/// Lower a route-map into routing policies, the one named after the map first.
///
/// Both forms start by setting the default action to reject. Without any continue the
/// map is a single policy: a chain of `If` statements, one per clause in ascending
/// order. With some continue, every clause is its own policy that
/// falls through to the next by a call, and the map policy calls the first one.
pub fn lower_route_map(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    map: &RouteMap,
) -> LowerResult<Vec<RoutingPolicy>> {
    let with_continues = map.clauses.values().any(|c| c.continue_to.is_some());
    let mut lowered = Vec::with_capacity(map.clauses.len());
    for (seq, clause) in &map.clauses {
        ctx.at_line(clause.line);
        lowered.push(Lowered {
            seq: *seq,
            action: clause.action,
            guard: guard(ctx, clause)?,
            sets: sets(ctx, clause)?,
            continue_to: continue_target(ctx, name, map, *seq, clause)?,
        });
    }
    let policy_name = canonical_name(StructureKind::RouteMap, name);

    if !with_continues {
        let mut tail = vec![Statement::ReturnLocalDefaultAction];
        for clause in lowered.into_iter().rev() {
            let then = match clause.action {
                LineAction::Permit => {
                    let mut then = clause.sets;
                    then.push(Statement::ExitAccept);
                    then
                }
                LineAction::Deny => vec![Statement::ExitReject],
            };
            let branch = If::new(clause.guard, then, tail)
                .with_comment(canonical_clause_name(name, clause.seq));
            tail = vec![Statement::If(branch)];
        }
        let mut statements = vec![Statement::SetDefaultActionReject];
        statements.extend(tail);
        return Ok(vec![RoutingPolicy::new(policy_name, statements)]);
    }

    let mut policies = Vec::with_capacity(lowered.len() + 1);
    let first = lowered.first().map(|c| c.seq);
    let nexts: Vec<Option<u32>> = lowered
        .iter()
        .skip(1)
        .map(|c| Some(c.seq))
        .chain(std::iter::once(None))
        .collect();
    for (clause, next) in lowered.into_iter().zip(nexts) {
        let clause_name = canonical_clause_name(name, clause.seq);
        let then = match (clause.action, clause.continue_to) {
            (LineAction::Permit, Some(target)) => {
                let mut then = clause.sets;
                then.push(Statement::SetDefaultActionAccept);
                then.push(Statement::Call(canonical_clause_name(name, target)));
                then
            }
            (LineAction::Permit, None) => {
                let mut then = clause.sets;
                then.push(Statement::ExitAccept);
                then
            }
            (LineAction::Deny, _) => vec![Statement::ExitReject],
        };
        let otherwise = match next {
            Some(next) => vec![Statement::Call(canonical_clause_name(name, next))],
            None => vec![Statement::ReturnLocalDefaultAction],
        };
        let branch = If::new(clause.guard, then, otherwise).with_comment(clause_name.clone());
        policies.push(RoutingPolicy::new(clause_name, vec![Statement::If(branch)]));
    }
    let mut top = vec![Statement::SetDefaultActionReject];
    match first {
        Some(first) => top.push(Statement::Call(canonical_clause_name(name, first))),
        None => top.push(Statement::ReturnLocalDefaultAction),
    }
    policies.insert(0, RoutingPolicy::new(policy_name, top));
    Ok(policies)
}
