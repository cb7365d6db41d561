// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Call graph of route-policies

use super::condition::RoutePolicyBoolean;
use super::route_policy::{PolicyStatement, RoutePolicy};
use crate::structure::{DeviceRegistry, Structure};
use names::StructureKind;
use std::collections::BTreeSet;

fn applied_in_boolean<'p>(expr: &'p RoutePolicyBoolean, out: &mut Vec<&'p str>) {
    match expr {
        RoutePolicyBoolean::Apply(name) => out.push(name),
        RoutePolicyBoolean::And(v) | RoutePolicyBoolean::Or(v) => {
            v.iter().for_each(|e| applied_in_boolean(e, out));
        }
        RoutePolicyBoolean::Not(e) => applied_in_boolean(e, out),
        _ => {}
    }
}

fn applied_in_block<'p>(block: &'p [PolicyStatement], out: &mut Vec<&'p str>) {
    for statement in block {
        match statement {
            PolicyStatement::Apply(name) => out.push(name),
            PolicyStatement::If {
                branches,
                otherwise,
            } => {
                for (cond, then) in branches {
                    applied_in_boolean(cond, out);
                    applied_in_block(then, out);
                }
                applied_in_block(otherwise, out);
            }
            PolicyStatement::Set(_) | PolicyStatement::Disposition(_) => {}
        }
    }
}

/// Names of the route-policies a policy applies, directly, in order of appearance
#[must_use]
pub fn applied(policy: &RoutePolicy) -> Vec<&str> {
    let mut out = vec![];
    applied_in_block(&policy.statements, &mut out);
    out
}

fn visit<'r>(
    registry: &'r DeviceRegistry,
    name: &'r str,
    path: &mut Vec<&'r str>,
    done: &mut BTreeSet<&'r str>,
) -> Option<Vec<String>> {
    if let Some(pos) = path.iter().position(|p| *p == name) {
        let mut cycle: Vec<String> = path[pos..].iter().map(|p| (*p).to_owned()).collect();
        cycle.push(name.to_owned());
        return Some(cycle);
    }
    if done.contains(name) {
        return None;
    }
    let Some(Structure::RoutePolicy(policy)) = registry.resolve(StructureKind::RoutePolicy, name)
    else {
        return None;
    };
    path.push(name);
    for callee in applied(policy) {
        if let Some(cycle) = visit(registry, callee, path, done) {
            return Some(cycle);
        }
    }
    path.pop();
    done.insert(name);
    None
}

/// A cycle of `apply` reachable from a route-policy, as the names along it with the
/// repeated one last. Undefined policies end a path.
#[must_use]
pub fn find_call_cycle<'r>(registry: &'r DeviceRegistry, name: &'r str) -> Option<Vec<String>> {
    visit(registry, name, &mut vec![], &mut BTreeSet::new())
}
