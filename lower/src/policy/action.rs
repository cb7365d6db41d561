// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Attribute-set actions shared by route-maps and route-policies

use super::community::{CommunityRef, match_communities, set_communities};
use crate::context::LowerCtx;
use crate::errors::LowerResult;
use canon::{
    AsExpr, EigrpMetric, IsisMetricType, LongExpr, NextHopExpr, OriginExpr, OspfMetricType,
    Statement,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetAction {
    /// Replace the communities, or add to them with `additive`
    Community {
        communities: CommunityRef,
        additive: bool,
    },
    /// Remove the communities matched by a set or list (`delete community in`,
    /// `set comm-list NAME delete`)
    DeleteCommunities(CommunityRef),
    /// `set community none`
    DeleteAllCommunities,
    LocalPreference(LongExpr),
    Med(LongExpr),
    Origin(OriginExpr),
    NextHop(NextHopExpr),
    /// Prepend the given AS numbers, in order
    AsPathPrepend(Vec<AsExpr>),
    /// Prepend an AS number some number of times
    AsPathPrependRepeat { asn: AsExpr, count: u8 },
    Tag(LongExpr),
    Weight(LongExpr),
    IsisMetricType(IsisMetricType),
    OspfMetricType(OspfMetricType),
    EigrpMetric(EigrpMetric),
    /// Metric type given by a route-policy parameter
    MetricTypeVar(String),
}

pub fn lower_set(ctx: &mut LowerCtx<'_>, action: &SetAction) -> LowerResult<Statement> {
    Ok(match action {
        SetAction::Community {
            communities,
            additive: false,
        } => Statement::SetCommunities(set_communities(ctx, communities, "set community")?),
        SetAction::Community {
            communities,
            additive: true,
        } => Statement::AddCommunities(set_communities(
            ctx,
            communities,
            "set community additive",
        )?),
        SetAction::DeleteCommunities(communities) => Statement::DeleteCommunities(
            match_communities(ctx, communities, "delete community")?,
        ),
        SetAction::DeleteAllCommunities => Statement::DeleteAllCommunities,
        SetAction::LocalPreference(e) => Statement::SetLocalPreference(e.clone()),
        SetAction::Med(e) => Statement::SetMetric(e.clone()),
        SetAction::Origin(e) => Statement::SetOrigin(e.clone()),
        SetAction::NextHop(e) => Statement::SetNextHop(e.clone()),
        SetAction::AsPathPrepend(asns) => Statement::PrependAsPath(asns.clone()),
        SetAction::AsPathPrependRepeat { asn, count } => {
            Statement::PrependAsPath(vec![asn.clone(); usize::from(*count)])
        }
        SetAction::Tag(e) => Statement::SetTag(e.clone()),
        SetAction::Weight(e) => Statement::SetWeight(e.clone()),
        SetAction::IsisMetricType(t) => Statement::SetIsisMetricType(*t),
        SetAction::OspfMetricType(t) => Statement::SetOspfMetricType(*t),
        SetAction::EigrpMetric(m) => Statement::SetEigrpMetric(*m),
        SetAction::MetricTypeVar(var) => Statement::SetMetricTypeVar(var.clone()),
    })
}
