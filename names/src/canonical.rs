// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Canonical names: the names lowered structures carry in the device model.
//!
//! A canonical name has the form `~<TAG>~<name>~`. Since tags never contain `~`,
//! the kind and the vendor name can always be recovered, which makes the mapping
//! injective over (kind, name).

use crate::errors::NameError;
use crate::kind::{StructureId, StructureKind};
use std::str::FromStr;

const SEP: char = '~';

/// Canonical name of the structure `name` of kind `kind`
#[must_use]
pub fn canonical_name(kind: StructureKind, name: &str) -> String {
    let tag = kind.tag();
    let mut out = String::with_capacity(tag.len() + name.len() + 3);
    out.push(SEP);
    out.push_str(tag);
    out.push(SEP);
    out.push_str(name);
    out.push(SEP);
    out
}

/// Canonical name of the policy generated for clause `seq` of route-map `map`
#[must_use]
pub fn canonical_clause_name(map: &str, seq: u32) -> String {
    canonical_name(StructureKind::RouteMapClause, &format!("{map}{SEP}{seq}"))
}

/// Recover kind and name from a canonical name
pub fn parse_canonical_name(canonical: &str) -> Result<StructureId, NameError> {
    let bad = || NameError::NotCanonical(canonical.to_owned());
    let inner = canonical
        .strip_prefix(SEP)
        .and_then(|s| s.strip_suffix(SEP))
        .ok_or_else(bad)?;
    let (tag, name) = inner.split_once(SEP).ok_or_else(bad)?;
    let kind = StructureKind::from_str(tag).map_err(|_| bad())?;
    Ok(StructureId::new(kind, name))
}
