// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Community-lists and community-sets

use crate::context::LowerCtx;
use crate::errors::{LowerError, LowerResult};
use crate::structure::Structure;
use canon::{
    CommunityDef, CommunityLineMatcher, CommunityListLine, CommunityMatch, CommunitySetExpr,
    HalfMatch, LineAction,
};
use names::{StructureKind, canonical_name};

/// One half of a community element
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HalfExpr {
    Literal(u16),
    Range(u16, u16),
    /// Route-policy parameter, `$name`
    Var(String),
    /// `*`
    Any,
}

impl HalfExpr {
    fn lower(&self) -> LowerResult<HalfMatch> {
        Ok(match self {
            HalfExpr::Literal(v) => HalfMatch::Literal(*v),
            HalfExpr::Range(lo, hi) if lo > hi => {
                return Err(LowerError::Malformed(format!("empty range [{lo}..{hi}]")));
            }
            HalfExpr::Range(lo, hi) => HalfMatch::Range(*lo, *hi),
            HalfExpr::Var(name) => HalfMatch::Var(name.clone()),
            HalfExpr::Any => HalfMatch::Any,
        })
    }
}

/// `high:low`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommunityElement {
    pub high: HalfExpr,
    pub low: HalfExpr,
}

impl CommunityElement {
    #[must_use]
    pub fn new(high: HalfExpr, low: HalfExpr) -> Self {
        Self { high, low }
    }
    #[must_use]
    pub fn literal(high: u16, low: u16) -> Self {
        Self::new(HalfExpr::Literal(high), HalfExpr::Literal(low))
    }
    fn lower(&self) -> LowerResult<CommunityMatch> {
        Ok(CommunityMatch::new(self.high.lower()?, self.low.lower()?))
    }
    /// Tell if this element stands for a single community, as setting one requires
    fn is_value(&self) -> bool {
        let value = |h: &HalfExpr| matches!(h, HalfExpr::Literal(_) | HalfExpr::Var(_));
        value(&self.high) && value(&self.low)
    }
}

pub fn lower_elements(elements: &[CommunityElement]) -> LowerResult<Vec<CommunityMatch>> {
    elements.iter().map(CommunityElement::lower).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardCommunityLine {
    pub action: LineAction,
    /// Communities, as `high << 16 | low`, all of which a route must carry
    pub communities: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedCommunityLine {
    pub action: LineAction,
    pub regex: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommunityList {
    Standard(Vec<StandardCommunityLine>),
    Expanded(Vec<ExpandedCommunityLine>),
}

#[must_use]
pub fn lower_community_list(list: &CommunityList) -> CommunityDef {
    CommunityDef::List(match list {
        CommunityList::Standard(lines) => lines
            .iter()
            .map(|line| CommunityListLine {
                action: line.action,
                matcher: CommunityLineMatcher::AllOf(
                    line.communities.iter().copied().map(CommunityMatch::from_u32).collect(),
                ),
            })
            .collect(),
        CommunityList::Expanded(lines) => lines
            .iter()
            .map(|line| CommunityListLine {
                action: line.action,
                matcher: CommunityLineMatcher::Regex(line.regex.clone()),
            })
            .collect(),
    })
}

/// `community-set`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommunitySet {
    pub elements: Vec<CommunityElement>,
}

pub fn lower_community_set(set: &CommunitySet) -> LowerResult<CommunityDef> {
    Ok(CommunityDef::Set(lower_elements(&set.elements)?))
}

/// Communities used by a statement or condition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommunityRef {
    Inline(Vec<CommunityElement>),
    /// Named `community-set`
    Set(String),
    /// Named `community-list`
    List(String),
}

/// Lower a reference used to match communities
pub fn match_communities(
    ctx: &mut LowerCtx<'_>,
    communities: &CommunityRef,
    usage: &str,
) -> LowerResult<CommunitySetExpr> {
    Ok(match communities {
        CommunityRef::Inline(elements) => CommunitySetExpr::Inline(lower_elements(elements)?),
        CommunityRef::Set(name) => CommunitySetExpr::Reference(ctx.canonical_ref(
            StructureKind::CommunitySet,
            name,
            usage,
        )),
        CommunityRef::List(name) => CommunitySetExpr::Reference(ctx.canonical_ref(
            StructureKind::CommunityList,
            name,
            usage,
        )),
    })
}

/// Lower a reference used to set or add communities: every element must stand for a
/// single community. Lists cannot be set.
pub fn set_communities(
    ctx: &mut LowerCtx<'_>,
    communities: &CommunityRef,
    usage: &str,
) -> LowerResult<CommunitySetExpr> {
    let check = |elements: &[CommunityElement]| match elements.iter().find(|e| !e.is_value()) {
        Some(e) => Err(LowerError::Malformed(format!(
            "cannot set community {:?}:{:?}, not a single value",
            e.high, e.low
        ))),
        None => Ok(()),
    };
    match communities {
        CommunityRef::Inline(elements) => {
            check(elements)?;
            Ok(CommunitySetExpr::Inline(lower_elements(elements)?))
        }
        CommunityRef::Set(name) => {
            if let Some(Structure::CommunitySet(set)) =
                ctx.refer(StructureKind::CommunitySet, name, usage)
            {
                check(&set.elements)?;
            }
            Ok(CommunitySetExpr::Reference(canonical_name(StructureKind::CommunitySet, name)))
        }
        CommunityRef::List(name) => Err(LowerError::Unsupported(format!(
            "setting the communities of community-list {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_list_lines() {
        let list = CommunityList::Standard(vec![StandardCommunityLine {
            action: LineAction::Deny,
            communities: vec![(65000 << 16) | 1],
        }]);
        assert_eq!(
            lower_community_list(&list),
            CommunityDef::List(vec![CommunityListLine {
                action: LineAction::Deny,
                matcher: CommunityLineMatcher::AllOf(vec![CommunityMatch::literal(65000, 1)]),
            }])
        );
    }

    #[test]
    fn set_elements() {
        let set = CommunitySet {
            elements: vec![
                CommunityElement::new(HalfExpr::Literal(65000), HalfExpr::Any),
                CommunityElement::new(HalfExpr::Range(1, 10), HalfExpr::Var("x".into())),
            ],
        };
        assert_eq!(
            lower_community_set(&set).unwrap(),
            CommunityDef::Set(vec![
                CommunityMatch::new(HalfMatch::Literal(65000), HalfMatch::Any),
                CommunityMatch::new(HalfMatch::Range(1, 10), HalfMatch::Var("x".into())),
            ])
        );
        let bad = CommunitySet {
            elements: vec![CommunityElement::new(HalfExpr::Range(10, 1), HalfExpr::Any)],
        };
        assert!(matches!(lower_community_set(&bad), Err(LowerError::Malformed(_))));
    }
}
