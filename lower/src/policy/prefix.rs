// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prefix-lists and prefix-sets

use crate::errors::{LowerError, LowerResult};
use canon::{LineAction, RouteFilterLine, RouteFilterList};
use ipnet::IpNet;

/// A prefix with optional `ge` / `le` length bounds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixRange {
    pub prefix: IpNet,
    pub ge: Option<u8>,
    pub le: Option<u8>,
}

impl PrefixRange {
    #[must_use]
    pub fn exact(prefix: IpNet) -> Self {
        Self {
            prefix,
            ge: None,
            le: None,
        }
    }
    #[must_use]
    pub fn ge(mut self, len: u8) -> Self {
        self.ge = Some(len);
        self
    }
    #[must_use]
    pub fn le(mut self, len: u8) -> Self {
        self.le = Some(len);
        self
    }

    /// Route filter line: `ge` alone is `[ge, max]`, `le` alone is `[len, le]`,
    /// neither is the exact prefix
    pub fn lower(&self, action: LineAction) -> LowerResult<RouteFilterLine> {
        let prefix = self.prefix.trunc();
        let len = prefix.prefix_len();
        let (min, max) = match (self.ge, self.le) {
            (None, None) => (len, len),
            (Some(ge), None) => (ge, prefix.max_prefix_len()),
            (None, Some(le)) => (len, le),
            (Some(ge), Some(le)) => (ge, le),
        };
        RouteFilterLine::new(action, prefix, min, max)
            .map_err(|e| LowerError::Malformed(format!("{prefix}: {e}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixListLine {
    pub action: LineAction,
    pub range: PrefixRange,
    pub seq: Option<u32>,
}

impl PrefixListLine {
    #[must_use]
    pub fn new(action: LineAction, range: PrefixRange) -> Self {
        Self {
            action,
            range,
            seq: None,
        }
    }
}

/// `ip prefix-list` or `ipv6 prefix-list`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefixList {
    pub lines: Vec<PrefixListLine>,
}

impl PrefixList {
    #[must_use]
    pub fn with_line(mut self, line: PrefixListLine) -> Self {
        self.lines.push(line);
        self
    }
}

/// Lower a prefix-list, its lines in sequence order
pub fn lower_prefix_list(canonical: String, list: &PrefixList) -> LowerResult<RouteFilterList> {
    let mut lines: Vec<&PrefixListLine> = list.lines.iter().collect();
    lines.sort_by_key(|line| line.seq);
    let mut out = RouteFilterList::new(canonical);
    for line in lines {
        out.lines.push(line.range.lower(line.action)?);
    }
    Ok(out)
}

/// `prefix-set`: every element permits
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefixSet {
    pub elements: Vec<PrefixRange>,
}

pub fn lower_prefix_set(canonical: String, set: &PrefixSet) -> LowerResult<RouteFilterList> {
    let mut out = RouteFilterList::new(canonical);
    for element in &set.elements {
        out.lines.push(element.lower(LineAction::Permit)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    #[test]
    fn length_bounds() {
        let base = PrefixRange::exact(net("10.0.0.0/8"));
        let rf = base.clone().ge(16).lower(LineAction::Permit).unwrap();
        assert_eq!((rf.min_len(), rf.max_len()), (16, 32));
        let rf = base.clone().le(24).lower(LineAction::Permit).unwrap();
        assert_eq!((rf.min_len(), rf.max_len()), (8, 24));
        let rf = base.clone().ge(16).le(24).lower(LineAction::Permit).unwrap();
        assert_eq!((rf.min_len(), rf.max_len()), (16, 24));
        let rf = base.clone().lower(LineAction::Deny).unwrap();
        assert_eq!((rf.min_len(), rf.max_len()), (8, 8));
        assert_eq!(rf.action, LineAction::Deny);

        assert!(matches!(
            base.clone().ge(24).le(16).lower(LineAction::Permit),
            Err(LowerError::Malformed(_))
        ));
        assert!(matches!(base.le(4).lower(LineAction::Permit), Err(LowerError::Malformed(_))));
    }

    #[test]
    fn sequence_order() {
        let mut second =
            PrefixListLine::new(LineAction::Permit, PrefixRange::exact(net("0.0.0.0/0")).le(32));
        second.seq = Some(20);
        let mut first =
            PrefixListLine::new(LineAction::Deny, PrefixRange::exact(net("10.0.0.0/8")).le(32));
        first.seq = Some(10);
        let list = PrefixList::default().with_line(second).with_line(first);
        let rf = lower_prefix_list("pl".into(), &list).unwrap();
        assert_eq!(rf.action_for(&net("10.1.0.0/16")), Some(LineAction::Deny));
        assert_eq!(rf.action_for(&net("11.1.0.0/16")), Some(LineAction::Permit));
    }
}
