// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Canonical, vendor-neutral policy language produced by the lowering crates.
//!
//! Packet filters are expressed as [`IpSpace`]s and [`MatchExpr`] trees grouped into
//! [`IpAccessList`]s; route policies as [`BooleanExpr`] guards and [`Statement`] lists
//! grouped into [`RoutingPolicy`]s; address translation as [`Transformation`]s.
//! Cross-structure references are plain names: this crate never resolves them,
//! except for the reference evaluator built with the `testing` feature.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod aspath;
pub mod community;
pub mod display;
pub mod errors;
pub mod ipspace;
pub mod packet;
pub mod policy;
pub mod routefilter;
pub mod transform;

#[cfg(any(test, feature = "testing"))]
pub mod eval;

pub use aspath::{AsPathFilter, AsPathFilterLine, AsPathMatch, AsRange};
pub use community::{
    CommunityDef, CommunityLineMatcher, CommunityListLine, CommunityMatch, CommunitySetExpr,
    HalfMatch, SetSemantics,
};
pub use errors::CanonError;
pub use ipspace::{IpSpace, IpWildcard};
pub use packet::{AclLine, HeaderSpace, IpAccessList, IpProtocol, LineAction, MatchExpr, PortRange};
pub use policy::{
    AsExpr, BooleanExpr, Comparator, EigrpMetric, If, IntComparison, IsisMetricType, LongExpr,
    NextHopExpr, Origin, OriginExpr, OspfMetricType, PrefixField, RouteType, RouteTypeExpr,
    RoutingPolicy, RoutingProtocol, Statement,
};
pub use routefilter::{RouteFilterLine, RouteFilterList};
pub use transform::{IpField, Transformation, TransformationKind, TransformationStep};
