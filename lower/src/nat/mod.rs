// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! NAT rule model: static rules, pools and dynamic rules, and their assembly into
//! the transformation chains of a device.

mod dynamic;
mod pool;
mod static_nat;

pub use dynamic::{DynamicNat, DynamicNatTarget, lower_dynamic_nat};
pub use pool::{NatPool, clamp, host_range};
pub use static_nat::{NatAction, StaticNat};

use crate::context::LowerCtx;
use canon::Transformation;
use std::cmp::Reverse;

/// Transformations of a device, one chain per direction. The first rule whose guard
/// matches a packet applies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NatTransformations {
    pub outgoing: Option<Transformation>,
    pub incoming: Option<Transformation>,
}

/// Assemble the chains of a device: static rules first, longest prefix first, then
/// dynamic rules in configuration order.
pub fn assemble(
    ctx: &mut LowerCtx<'_>,
    statics: &[StaticNat],
    dynamics: &[DynamicNat],
) -> NatTransformations {
    let mut ordered: Vec<&StaticNat> = statics.iter().collect();
    ordered.sort_by_key(|nat| Reverse(nat.local().prefix_len()));

    let dynamic: Vec<Transformation> = dynamics
        .iter()
        .filter_map(|nat| lower_dynamic_nat(ctx, nat))
        .collect();

    NatTransformations {
        outgoing: Transformation::chain(
            ordered.iter().map(|nat| nat.outgoing()).chain(dynamic),
        ),
        incoming: Transformation::chain(ordered.iter().map(|nat| nat.incoming())),
    }
}
