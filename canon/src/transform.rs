// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet transformations (address translation)

use crate::packet::MatchExpr;
use ipnet::IpNet;
use std::net::IpAddr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IpField {
    Source,
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformationKind {
    StaticNat,
    DynamicNat,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransformationStep {
    /// Rewrite the field to some address of the inclusive pool
    AssignIpFromPool {
        kind: TransformationKind,
        field: IpField,
        first: IpAddr,
        last: IpAddr,
    },
    /// Rewrite the network bits of the field, keeping its host bits
    ShiftIntoSubnet {
        kind: TransformationKind,
        field: IpField,
        subnet: IpNet,
    },
    /// Rewrite the field to the primary address of an interface
    AssignInterfaceIp {
        kind: TransformationKind,
        field: IpField,
        interface: String,
    },
}

/// A guarded list of steps. When the guard does not match, `or_else` is tried.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transformation {
    pub guard: MatchExpr,
    pub steps: Vec<TransformationStep>,
    pub or_else: Option<Box<Transformation>>,
}

impl Transformation {
    #[must_use]
    pub fn when(guard: MatchExpr) -> Self {
        Self {
            guard,
            steps: vec![],
            or_else: None,
        }
    }
    #[must_use]
    pub fn apply(mut self, step: TransformationStep) -> Self {
        self.steps.push(step);
        self
    }
    /// Chain transformations so that the first whose guard matches applies
    #[must_use]
    pub fn chain(transformations: impl IntoIterator<Item = Transformation>) -> Option<Self> {
        let all: Vec<_> = transformations.into_iter().collect();
        all.into_iter().rev().fold(None, |tail, mut t| {
            let mut last = &mut t;
            while let Some(ref mut next) = last.or_else {
                last = next;
            }
            last.or_else = tail.map(Box::new);
            Some(t)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_links_in_order() {
        let a = Transformation::when(MatchExpr::permitted_by("a"));
        let b = Transformation::when(MatchExpr::permitted_by("b"));
        let c = Transformation::when(MatchExpr::permitted_by("c"));
        let chained = Transformation::chain(vec![a, b, c]).unwrap();
        assert_eq!(chained.guard, MatchExpr::permitted_by("a"));
        let second = chained.or_else.unwrap();
        assert_eq!(second.guard, MatchExpr::permitted_by("b"));
        let third = second.or_else.unwrap();
        assert_eq!(third.guard, MatchExpr::permitted_by("c"));
        assert!(third.or_else.is_none());
        assert!(Transformation::chain(vec![]).is_none());
    }
}
