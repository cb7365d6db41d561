// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Dynamic NAT rules

use crate::context::LowerCtx;
use crate::structure::Structure;
use canon::{IpField, MatchExpr, Transformation, TransformationKind, TransformationStep};
use names::StructureKind;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DynamicNatTarget {
    /// `pool NAME`
    Pool(String),
    /// `interface NAME overload`
    Interface(String),
}

/// `ip nat inside source list ACL ...`: the source of outgoing packets permitted by
/// the access list is translated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicNat {
    pub acl: String,
    pub target: DynamicNatTarget,
    pub line: Option<u32>,
}

impl DynamicNat {
    #[must_use]
    pub fn new(acl: impl Into<String>, target: DynamicNatTarget) -> Self {
        Self {
            acl: acl.into(),
            target,
            line: None,
        }
    }
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// Lower a dynamic rule. A rule using an undefined pool is omitted.
pub fn lower_dynamic_nat(ctx: &mut LowerCtx<'_>, nat: &DynamicNat) -> Option<Transformation> {
    let usage = "ip nat inside source list";
    ctx.at_line(nat.line);
    let kind = if ctx
        .registry()
        .contains(StructureKind::StandardAccessList, &nat.acl)
    {
        StructureKind::StandardAccessList
    } else {
        StructureKind::ExtendedAccessList
    };
    let guard = MatchExpr::permitted_by(ctx.canonical_ref(kind, &nat.acl, usage));

    let step = match &nat.target {
        DynamicNatTarget::Pool(name) => match ctx.refer(StructureKind::NatPool, name, usage) {
            Some(Structure::NatPool(pool)) => TransformationStep::AssignIpFromPool {
                kind: TransformationKind::DynamicNat,
                field: IpField::Source,
                first: pool.first(),
                last: pool.last(),
            },
            _ => {
                debug!("Omitting nat rule for list {}: no pool {name}", nat.acl);
                return None;
            }
        },
        DynamicNatTarget::Interface(interface) => TransformationStep::AssignInterfaceIp {
            kind: TransformationKind::DynamicNat,
            field: IpField::Source,
            interface: interface.clone(),
        },
    };
    Some(Transformation::when(guard).apply(step))
}
