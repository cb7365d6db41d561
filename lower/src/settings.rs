// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lowering settings: dialect and the choices its configuration language leaves open

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration dialect a device was parsed from
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    #[default]
    Ios,
    IosXr,
    Nxos,
    Eos,
    Asa,
}

/// How the match lines of a class-map or route-map clause combine
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MatchSemantics {
    MatchAll,
    MatchAny,
}

/// What to do with a route-map continue whose target does not follow its clause
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ContinuePolicy {
    /// Fail the route-map
    Reject,
    /// Warn and ignore the continue
    BestEffort,
}

#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct LoweringSettings {
    pub dialect: Dialect,
    /// For class-maps that do not declare `match-all` or `match-any`
    pub class_map_semantics: MatchSemantics,
    /// For route-map clauses that do not declare their semantics
    pub route_map_semantics: MatchSemantics,
    pub continue_policy: ContinuePolicy,
}

impl Default for LoweringSettings {
    fn default() -> Self {
        Self::for_dialect(Dialect::default())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid lowering settings: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Settings as written in an override file: anything absent keeps the dialect default
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsOverrides {
    dialect: Option<Dialect>,
    class_map_semantics: Option<MatchSemantics>,
    route_map_semantics: Option<MatchSemantics>,
    continue_policy: Option<ContinuePolicy>,
}

impl LoweringSettings {
    /// Defaults of a dialect. Class-maps and route-map clauses are match-all on every
    /// supported dialect; bad continues are rejected.
    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            class_map_semantics: MatchSemantics::MatchAll,
            route_map_semantics: MatchSemantics::MatchAll,
            continue_policy: ContinuePolicy::Reject,
        }
    }

    /// Parse settings from YAML. Fields not given take the defaults of the given dialect,
    /// or of IOS if none is given.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        let o: SettingsOverrides = serde_yaml_ng::from_str(yaml)?;
        let base = Self::for_dialect(o.dialect.unwrap_or_default());
        Ok(Self {
            dialect: base.dialect,
            class_map_semantics: o.class_map_semantics.unwrap_or(base.class_map_semantics),
            route_map_semantics: o.route_map_semantics.unwrap_or(base.route_map_semantics),
            continue_policy: o.continue_policy.unwrap_or(base.continue_policy),
        })
    }

    /// Boot-time defaults of BGP neighbors on this dialect
    #[must_use]
    pub fn bgp_defaults(&self) -> bgp::PeerDefaults {
        match self.dialect {
            Dialect::Nxos => bgp::PeerDefaults::nxos(),
            _ => bgp::PeerDefaults::default(),
        }
    }
}
