// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route-policies

use super::action::{SetAction, lower_set};
use super::condition::{RoutePolicyBoolean, lower_boolean};
use crate::context::LowerCtx;
use crate::errors::LowerResult;
use canon::{If, RoutingPolicy, Statement};
use names::{StructureKind, canonical_name};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Accept, and stop
    Done,
    /// Reject, and stop
    Drop,
    /// Accept unless a later statement says otherwise
    Pass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyStatement {
    /// `if` / `elseif` branches, then the `else` block
    If {
        branches: Vec<(RoutePolicyBoolean, Vec<PolicyStatement>)>,
        otherwise: Vec<PolicyStatement>,
    },
    Set(SetAction),
    /// `apply NAME`
    Apply(String),
    Disposition(Disposition),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    pub statements: Vec<PolicyStatement>,
}

impl RoutePolicy {
    #[must_use]
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self { statements }
    }
}

fn lower_block(ctx: &mut LowerCtx<'_>, block: &[PolicyStatement]) -> LowerResult<Vec<Statement>> {
    let mut out = Vec::with_capacity(block.len());
    for statement in block {
        out.push(lower_statement(ctx, statement)?);
    }
    Ok(out)
}

fn lower_statement(ctx: &mut LowerCtx<'_>, statement: &PolicyStatement) -> LowerResult<Statement> {
    Ok(match statement {
        PolicyStatement::If {
            branches,
            otherwise,
        } => {
            let mut lowered = Vec::with_capacity(branches.len());
            for (cond, block) in branches {
                lowered.push((lower_boolean(ctx, cond)?, lower_block(ctx, block)?));
            }
            let mut tail = lower_block(ctx, otherwise)?;
            for (guard, then) in lowered.into_iter().rev() {
                tail = vec![Statement::If(If::new(guard, then, tail))];
            }
            // a chain of at least one branch, or the bare else block
            match <[Statement; 1]>::try_from(tail) {
                Ok([single]) => single,
                Err(block) => Statement::If(If::new(canon::BooleanExpr::True, block, vec![])),
            }
        }
        PolicyStatement::Set(action) => lower_set(ctx, action)?,
        PolicyStatement::Apply(name) => Statement::Call(ctx.canonical_ref(
            StructureKind::RoutePolicy,
            name,
            "route-policy apply",
        )),
        PolicyStatement::Disposition(Disposition::Done) => Statement::ExitAccept,
        PolicyStatement::Disposition(Disposition::Drop) => Statement::ExitReject,
        PolicyStatement::Disposition(Disposition::Pass) => Statement::SetDefaultActionAccept,
    })
}

/// Lower a route-policy: routes are rejected unless some statement accepts them
pub fn lower_route_policy(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    policy: &RoutePolicy,
) -> LowerResult<RoutingPolicy> {
    let mut statements = vec![Statement::SetDefaultActionReject];
    statements.extend(lower_block(ctx, &policy.statements)?);
    statements.push(Statement::ReturnLocalDefaultAction);
    Ok(RoutingPolicy::new(
        canonical_name(StructureKind::RoutePolicy, name),
        statements,
    ))
}
