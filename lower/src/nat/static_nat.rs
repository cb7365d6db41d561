// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Static NAT rules

use crate::errors::{LowerError, LowerResult};
use canon::{
    HeaderSpace, IpField, IpSpace, MatchExpr, Transformation, TransformationKind,
    TransformationStep,
};
use ipnet::IpNet;
use std::hash::{Hash, Hasher};

/// Side of the device the local addresses live on
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NatAction {
    /// Translate the source of outgoing packets, the destination of incoming ones
    Inside,
    /// Translate the destination of outgoing packets, the source of incoming ones
    Outside,
}

/// One-to-one translation between a local and a global prefix of the same length.
/// Two rules are the same rule if their action and prefixes are, wherever configured.
#[derive(Clone, Debug)]
pub struct StaticNat {
    action: NatAction,
    local: IpNet,
    global: IpNet,
    pub line: Option<u32>,
}

impl PartialEq for StaticNat {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for StaticNat {}

impl Hash for StaticNat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl StaticNat {
    pub fn new(action: NatAction, local: IpNet, global: IpNet) -> LowerResult<Self> {
        let same_family = matches!(
            (local, global),
            (IpNet::V4(_), IpNet::V4(_)) | (IpNet::V6(_), IpNet::V6(_))
        );
        if !same_family || local.prefix_len() != global.prefix_len() {
            return Err(LowerError::MismatchedPrefixLengths(local, global));
        }
        Ok(Self {
            action,
            local: local.trunc(),
            global: global.trunc(),
            line: None,
        })
    }
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
    fn key(&self) -> (NatAction, IpNet, IpNet) {
        (self.action, self.local, self.global)
    }
    #[must_use]
    pub fn action(&self) -> NatAction {
        self.action
    }
    #[must_use]
    pub fn local(&self) -> IpNet {
        self.local
    }
    #[must_use]
    pub fn global(&self) -> IpNet {
        self.global
    }

    fn shift(field: IpField, matched: IpNet, into: IpNet) -> Transformation {
        let hs = match field {
            IpField::Source => HeaderSpace::new().src_ips(IpSpace::Prefix(matched)),
            IpField::Destination => HeaderSpace::new().dst_ips(IpSpace::Prefix(matched)),
        };
        Transformation::when(MatchExpr::from(hs)).apply(TransformationStep::ShiftIntoSubnet {
            kind: TransformationKind::StaticNat,
            field,
            subnet: into,
        })
    }

    /// Translation of packets leaving the inside
    #[must_use]
    pub fn outgoing(&self) -> Transformation {
        match self.action {
            NatAction::Inside => Self::shift(IpField::Source, self.local, self.global),
            NatAction::Outside => Self::shift(IpField::Destination, self.local, self.global),
        }
    }

    /// Translation of packets entering the inside
    #[must_use]
    pub fn incoming(&self) -> Transformation {
        match self.action {
            NatAction::Inside => Self::shift(IpField::Destination, self.global, self.local),
            NatAction::Outside => Self::shift(IpField::Source, self.global, self.local),
        }
    }
}
