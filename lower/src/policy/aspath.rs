// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! AS-path access-lists

use canon::{AsPathFilter, AsPathFilterLine, LineAction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsPathAccessListLine {
    pub action: LineAction,
    pub regex: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AsPathAccessList {
    pub lines: Vec<AsPathAccessListLine>,
}

impl AsPathAccessList {
    #[must_use]
    pub fn with_line(mut self, action: LineAction, regex: impl Into<String>) -> Self {
        self.lines.push(AsPathAccessListLine {
            action,
            regex: regex.into(),
        });
        self
    }
}

#[must_use]
pub fn lower_as_path_list(canonical: String, list: &AsPathAccessList) -> AsPathFilter {
    AsPathFilter {
        name: canonical,
        lines: list
            .lines
            .iter()
            .map(|line| AsPathFilterLine {
                action: line.action,
                regex: line.regex.clone(),
            })
            .collect(),
    }
}
