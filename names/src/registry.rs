// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Two-phase registry of named structures

use crate::diagnostics::{Diagnostics, Warning, WarningKind};
use crate::errors::NameError;
use crate::kind::{StructureId, StructureKind};
use std::collections::BTreeMap;
use tracing::debug;

/// A defined structure and where it was defined
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition<S> {
    pub structure: S,
    pub line: Option<u32>,
}

/// Population phase of a [`Registry`]
#[derive(Debug)]
pub struct RegistryBuilder<S> {
    defs: BTreeMap<StructureId, Definition<S>>,
    diags: Diagnostics,
}

impl<S> Default for RegistryBuilder<S> {
    fn default() -> Self {
        Self {
            defs: BTreeMap::new(),
            diags: Diagnostics::new(),
        }
    }
}

impl<S> RegistryBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a structure. The first definition of a name wins: a redefinition is
    /// recorded as a warning and reported as an error the caller may ignore.
    pub fn define(
        &mut self,
        kind: StructureKind,
        name: &str,
        structure: S,
        line: Option<u32>,
    ) -> Result<(), NameError> {
        let id = StructureId::new(kind, name);
        if let Some(first) = self.defs.get(&id) {
            let first_line = first.line;
            self.diags.warn(
                Warning::new(
                    WarningKind::DuplicateDefinition,
                    match first_line {
                        Some(l) => format!("duplicate definition, first defined at line {l}"),
                        None => "duplicate definition".to_owned(),
                    },
                )
                .subject(id.clone())
                .line(line),
            );
            return Err(NameError::Duplicate(id));
        }
        debug!("Defining {id}");
        self.defs.insert(id, Definition { structure, line });
        Ok(())
    }

    /// Mutable access to a structure defined earlier in the population pass
    pub fn definition_mut(&mut self, kind: StructureKind, name: &str) -> Option<&mut S> {
        self.defs
            .get_mut(&StructureId::new(kind, name))
            .map(|d| &mut d.structure)
    }

    #[must_use]
    pub fn contains(&self, kind: StructureKind, name: &str) -> bool {
        self.defs.contains_key(&StructureId::new(kind, name))
    }

    /// Record a warning found during population
    pub fn warn(&mut self, warning: Warning) {
        self.diags.warn(warning);
    }

    /// End the population phase
    #[must_use]
    pub fn freeze(self) -> Registry<S> {
        debug!("Freezing registry with {} structures", self.defs.len());
        Registry {
            defs: self.defs,
            diags: self.diags,
        }
    }
}

/// Read-only set of the named structures of a device
#[derive(Debug)]
pub struct Registry<S> {
    defs: BTreeMap<StructureId, Definition<S>>,
    diags: Diagnostics,
}

impl<S> Registry<S> {
    /// The structure `name` of kind `kind`, if defined
    #[must_use]
    pub fn resolve(&self, kind: StructureKind, name: &str) -> Option<&S> {
        self.defs
            .get(&StructureId::new(kind, name))
            .map(|d| &d.structure)
    }

    #[must_use]
    pub fn contains(&self, kind: StructureKind, name: &str) -> bool {
        self.defs.contains_key(&StructureId::new(kind, name))
    }

    #[must_use]
    pub fn definition_line(&self, kind: StructureKind, name: &str) -> Option<u32> {
        self.defs
            .get(&StructureId::new(kind, name))
            .and_then(|d| d.line)
    }

    /// Structures of a kind, by name
    pub fn iter_kind(&self, kind: StructureKind) -> impl Iterator<Item = (&str, &S)> {
        self.defs
            .range(StructureId::new(kind, "")..)
            .take_while(move |(id, _)| id.kind == kind)
            .map(|(id, d)| (id.name.as_str(), &d.structure))
    }

    /// All structures, ordered by kind then name
    pub fn iter(&self) -> impl Iterator<Item = (&StructureId, &S)> {
        self.defs.iter().map(|(id, d)| (id, &d.structure))
    }

    pub fn ids(&self) -> impl Iterator<Item = &StructureId> {
        self.defs.keys()
    }

    /// Warnings recorded while the registry was populated
    #[must_use]
    pub fn population_diagnostics(&self) -> &Diagnostics {
        &self.diags
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
