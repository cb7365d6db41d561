// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! State shared by the lowering of the structures of one device

use crate::settings::LoweringSettings;
use crate::structure::{DeviceRegistry, Structure};
use names::{Diagnostics, StructureId, StructureKind, Warning, WarningKind, canonical_name};
use tracing::debug;

/// Read-only view of a frozen device, plus the diagnostics sink and the structure
/// being lowered. Every warning recorded through the context is attached to that
/// structure.
pub struct LowerCtx<'a> {
    registry: &'a DeviceRegistry,
    settings: &'a LoweringSettings,
    diags: &'a mut Diagnostics,
    subject: Option<StructureId>,
    line: Option<u32>,
}

impl<'a> LowerCtx<'a> {
    pub fn new(
        registry: &'a DeviceRegistry,
        settings: &'a LoweringSettings,
        diags: &'a mut Diagnostics,
    ) -> Self {
        Self {
            registry,
            settings,
            diags,
            subject: None,
            line: None,
        }
    }

    /// Context for lowering one structure
    pub fn scoped(&mut self, subject: StructureId, line: Option<u32>) -> LowerCtx<'_> {
        debug!("Lowering {subject}");
        LowerCtx {
            registry: self.registry,
            settings: self.settings,
            diags: &mut *self.diags,
            subject: Some(subject),
            line,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &'a DeviceRegistry {
        self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &'a LoweringSettings {
        self.settings
    }

    #[must_use]
    pub fn subject(&self) -> Option<&StructureId> {
        self.subject.as_ref()
    }

    /// Set the configuration line warnings refer to
    pub fn at_line(&mut self, line: Option<u32>) {
        self.line = line;
    }

    pub fn diags(&mut self) -> &mut Diagnostics {
        &mut *self.diags
    }

    /// Look a structure up by name, recording the reference, or an undefined
    /// reference if there is no such structure.
    pub fn refer(&mut self, kind: StructureKind, name: &str, usage: &str) -> Option<&'a Structure> {
        let id = StructureId::new(kind, name);
        match self.registry.resolve(kind, name) {
            Some(structure) => {
                self.diags.reference(id, usage, self.line);
                Some(structure)
            }
            None => {
                let referrer = self.subject.clone();
                self.diags.undefined_reference(id, usage, self.line, referrer);
                None
            }
        }
    }

    /// Record a reference and return the canonical name of its target, defined or not
    pub fn canonical_ref(&mut self, kind: StructureKind, name: &str, usage: &str) -> String {
        self.refer(kind, name, usage);
        canonical_name(kind, name)
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let mut warning = Warning::new(kind, message).line(self.line);
        if let Some(subject) = &self.subject {
            warning = warning.subject(subject.clone());
        }
        self.diags.warn(warning);
    }
}
