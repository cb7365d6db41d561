// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Append-only sink of lowering warnings and structure references

use crate::kind::StructureId;
use crate::registry::Registry;
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum WarningKind {
    /// A name was defined twice within a kind; the first definition was kept
    DuplicateDefinition,
    /// A name was used that no structure of the expected kind defines
    UndefinedReference,
    /// A construct with no lowering
    Unsupported,
    /// A route-map continue that does not move forward
    SuspiciousContinue,
    /// Inconsistent or impossible values
    Malformed,
    /// A structure that reaches itself through references
    CircularReference,
    /// Legal configuration that is likely a mistake
    RedFlag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub subject: Option<StructureId>,
    pub line: Option<u32>,
    pub message: String,
}

impl Warning {
    #[must_use]
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: None,
            line: None,
            message: message.into(),
        }
    }
    #[must_use]
    pub fn subject(mut self, subject: StructureId) -> Self {
        self.subject = Some(subject);
        self
    }
    #[must_use]
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }
}

/// A use of a structure by name
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reference {
    pub target: StructureId,
    /// What the name was used for, e.g. "route-map match ip address"
    pub usage: String,
    pub line: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    references: Vec<Reference>,
    undefined: Vec<Reference>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning
    pub fn warn(&mut self, warning: Warning) {
        match &warning.subject {
            Some(subject) => warn!("{subject}: {}", warning.message),
            None => warn!("{}", warning.message),
        }
        self.warnings.push(warning);
    }

    /// Record a use of a defined structure
    pub fn reference(&mut self, target: StructureId, usage: impl Into<String>, line: Option<u32>) {
        let usage = usage.into();
        debug!("{target} used by {usage}");
        self.references.push(Reference {
            target,
            usage,
            line,
        });
    }

    /// Record a use of an undefined structure, with an [`WarningKind::UndefinedReference`]
    /// warning about the structure making the reference, if any
    pub fn undefined_reference(
        &mut self,
        target: StructureId,
        usage: impl Into<String>,
        line: Option<u32>,
        referrer: Option<StructureId>,
    ) {
        let usage = usage.into();
        let mut warning = Warning::new(
            WarningKind::UndefinedReference,
            format!("undefined {target} used by {usage}"),
        )
        .line(line);
        warning.subject = referrer;
        self.warn(warning);
        self.undefined.push(Reference {
            target,
            usage,
            line,
        });
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    #[must_use]
    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings_of(kind).next().is_some()
    }

    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    #[must_use]
    pub fn undefined_references(&self) -> &[Reference] {
        &self.undefined
    }

    /// Structures of the registry that nothing referenced, synthetic kinds excluded
    #[must_use]
    pub fn unused_structures<S>(&self, registry: &Registry<S>) -> Vec<StructureId> {
        let used: BTreeSet<&StructureId> = self.references.iter().map(|r| &r.target).collect();
        registry
            .ids()
            .filter(|id| !id.kind.is_synthetic() && !used.contains(id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
