// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! BGP standard community matchers

use crate::packet::LineAction;

/// Matcher for one 16-bit half of a community
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HalfMatch {
    Literal(u16),
    /// Inclusive range
    Range(u16, u16),
    /// Value bound by a policy parameter
    Var(String),
    Any,
}

impl HalfMatch {
    /// Tell if this half denotes a single value once variables are bound
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, HalfMatch::Literal(_) | HalfMatch::Var(_))
    }
}

/// Matcher for a community `high:low`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommunityMatch {
    pub high: HalfMatch,
    pub low: HalfMatch,
}

impl CommunityMatch {
    #[must_use]
    pub fn new(high: HalfMatch, low: HalfMatch) -> Self {
        Self { high, low }
    }
    #[must_use]
    pub fn literal(high: u16, low: u16) -> Self {
        Self::new(HalfMatch::Literal(high), HalfMatch::Literal(low))
    }
    /// Build from the 32-bit encoding of a community
    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self::literal((value >> 16) as u16, (value & 0xffff) as u16)
    }
}

/// How a set of community matchers is applied to the communities of a route
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetSemantics {
    /// Some community of the route matches some element
    Any,
    /// Every element is matched by some community of the route
    Every,
}

/// A set of community matchers, inline or defined by name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommunitySetExpr {
    Inline(Vec<CommunityMatch>),
    Reference(String),
}

/// How a community-list line matches a route's communities
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommunityLineMatcher {
    /// Route carries all the given communities
    AllOf(Vec<CommunityMatch>),
    /// Some community of the route, rendered `high:low`, matches the regex
    Regex(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommunityListLine {
    pub action: LineAction,
    pub matcher: CommunityLineMatcher,
}

/// What a [`CommunitySetExpr::Reference`] resolves to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommunityDef {
    /// An unordered set of matchers
    Set(Vec<CommunityMatch>),
    /// An ordered list of permit/deny lines; a route matches if the first matching line permits
    List(Vec<CommunityListLine>),
}
