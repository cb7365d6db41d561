// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Route filters: ordered prefix matchers with length ranges

use crate::errors::CanonError;
use crate::packet::LineAction;
use ipnet::IpNet;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteFilterLine {
    pub action: LineAction,
    pub prefix: IpNet,
    min_len: u8,
    max_len: u8,
}

impl RouteFilterLine {
    /// A line matching routes whose network is covered by `prefix` and whose length
    /// is within `[min_len, max_len]`.
    pub fn new(
        action: LineAction,
        prefix: IpNet,
        min_len: u8,
        max_len: u8,
    ) -> Result<Self, CanonError> {
        if min_len < prefix.prefix_len() || min_len > max_len || max_len > prefix.max_prefix_len()
        {
            return Err(CanonError::BadLengthRange(min_len, max_len, prefix.prefix_len()));
        }
        Ok(Self {
            action,
            prefix,
            min_len,
            max_len,
        })
    }
    #[must_use]
    pub fn exact(action: LineAction, prefix: IpNet) -> Self {
        let len = prefix.prefix_len();
        Self {
            action,
            prefix,
            min_len: len,
            max_len: len,
        }
    }
    #[must_use]
    pub fn min_len(&self) -> u8 {
        self.min_len
    }
    #[must_use]
    pub fn max_len(&self) -> u8 {
        self.max_len
    }
    #[must_use]
    pub fn matches(&self, route: &IpNet) -> bool {
        let len = route.prefix_len();
        self.prefix.contains(route) && self.min_len <= len && len <= self.max_len
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteFilterList {
    pub name: String,
    pub lines: Vec<RouteFilterLine>,
}

impl RouteFilterList {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: vec![],
        }
    }
    /// Outcome for a route: the action of the first matching line, if any
    #[must_use]
    pub fn action_for(&self, route: &IpNet) -> Option<LineAction> {
        self.lines
            .iter()
            .find(|line| line.matches(route))
            .map(|line| line.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    #[test]
    fn length_ranges() {
        let line = RouteFilterLine::new(LineAction::Permit, net("10.0.0.0/8"), 16, 24).unwrap();
        assert!(line.matches(&net("10.1.0.0/16")));
        assert!(line.matches(&net("10.1.2.0/24")));
        assert!(!line.matches(&net("10.0.0.0/8")));
        assert!(!line.matches(&net("10.1.2.0/25")));
        assert!(!line.matches(&net("11.1.0.0/16")));

        assert!(RouteFilterLine::new(LineAction::Permit, net("10.0.0.0/8"), 4, 24).is_err());
        assert!(RouteFilterLine::new(LineAction::Permit, net("10.0.0.0/8"), 24, 16).is_err());
        assert!(RouteFilterLine::new(LineAction::Permit, net("10.0.0.0/8"), 8, 33).is_err());
    }

    #[test]
    fn first_match_wins() {
        let mut list = RouteFilterList::new("f");
        list.lines.push(RouteFilterLine::exact(LineAction::Deny, net("10.0.0.0/8")));
        list.lines
            .push(RouteFilterLine::new(LineAction::Permit, net("0.0.0.0/0"), 0, 32).unwrap());
        assert_eq!(list.action_for(&net("10.0.0.0/8")), Some(LineAction::Deny));
        assert_eq!(list.action_for(&net("10.0.0.0/9")), Some(LineAction::Permit));
        assert_eq!(list.action_for(&net("::/0")), None);
    }
}
