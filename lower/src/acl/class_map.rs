// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Class-maps

use super::service::PortSpec;
use crate::context::LowerCtx;
use crate::errors::LowerResult;
use crate::settings::MatchSemantics;
use canon::{AclLine, HeaderSpace, IpAccessList, IpProtocol, MatchExpr};
use names::{StructureKind, canonical_name};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassMapMatch {
    /// `match access-group name NAME`
    AccessGroup(String),
    /// `match any`
    Any,
    /// `match port tcp eq 80`
    Port { protocol: IpProtocol, ports: PortSpec },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassMap {
    /// `match-all` or `match-any`, if declared
    pub semantics: Option<MatchSemantics>,
    pub lines: Vec<ClassMapMatch>,
}

impl ClassMap {
    #[must_use]
    pub fn new(semantics: Option<MatchSemantics>) -> Self {
        Self {
            semantics,
            lines: vec![],
        }
    }
    #[must_use]
    pub fn with_line(mut self, line: ClassMapMatch) -> Self {
        self.lines.push(line);
        self
    }
}

fn lower_match(ctx: &mut LowerCtx<'_>, line: &ClassMapMatch) -> LowerResult<MatchExpr> {
    let usage = "class-map match access-group";
    Ok(match line {
        ClassMapMatch::Any => MatchExpr::True,
        ClassMapMatch::Port { protocol, ports } => HeaderSpace::new()
            .protocol(*protocol)
            .dst_ports(ports.ranges()?)
            .into(),
        ClassMapMatch::AccessGroup(name) => {
            // either flavour of access-list may be named
            let kind = if ctx
                .registry()
                .contains(StructureKind::StandardAccessList, name)
            {
                StructureKind::StandardAccessList
            } else {
                StructureKind::ExtendedAccessList
            };
            MatchExpr::permitted_by(ctx.canonical_ref(kind, name, usage))
        }
    })
}

/// Lower a class-map to a single-line access list whose guard combines the match
/// lines per the declared semantics, or the dialect default if none is declared.
pub fn lower_class_map(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    class_map: &ClassMap,
) -> LowerResult<IpAccessList> {
    let semantics = class_map
        .semantics
        .unwrap_or(ctx.settings().class_map_semantics);
    let mut exprs = Vec::with_capacity(class_map.lines.len());
    for line in &class_map.lines {
        exprs.push(lower_match(ctx, line)?);
    }
    let guard = match semantics {
        MatchSemantics::MatchAll => MatchExpr::and(exprs),
        MatchSemantics::MatchAny => MatchExpr::or(exprs),
    };
    Ok(IpAccessList::new(canonical_name(StructureKind::ClassMap, name))
        .with_source(name)
        .with_line(AclLine::accepting(guard, format!("class-map {name} {semantics}"))))
}
