// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The peer groups of a BGP process and their resolution

use crate::effective::{EffectivePeerConfig, PeerDefaults};
use crate::errors::BgpError;
use crate::groups::{GroupKind, LeafIdentity, LeafPeerGroup, NamedPeerGroup};
use crate::settings::PeerGroupSettings;
use names::{Diagnostics, StructureId, Warning, WarningKind};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BgpProcess {
    /// Process-wide settings, the least specific configured layer
    pub master: PeerGroupSettings,
    peer_groups: BTreeMap<String, NamedPeerGroup>,
    templates: BTreeMap<String, NamedPeerGroup>,
    leaves: BTreeMap<LeafIdentity, LeafPeerGroup>,
}

/// Walk state when collecting the named chain of a leaf
struct Walk<'a> {
    chain: Vec<&'a NamedPeerGroup>,
    path: Vec<(GroupKind, &'a str)>,
    seen: BTreeSet<(GroupKind, &'a str)>,
}

impl BgpProcess {
    #[must_use]
    pub fn new(master: PeerGroupSettings) -> Self {
        Self {
            master,
            ..Self::default()
        }
    }

    pub fn add_group(&mut self, group: NamedPeerGroup) -> Result<(), BgpError> {
        let table = match group.kind {
            GroupKind::PeerGroup => &mut self.peer_groups,
            GroupKind::Template => &mut self.templates,
        };
        if table.contains_key(&group.name) {
            return Err(BgpError::DuplicateGroup(group.kind, group.name));
        }
        table.insert(group.name.clone(), group);
        Ok(())
    }

    pub fn add_leaf(&mut self, leaf: LeafPeerGroup) -> Result<(), BgpError> {
        let identity = leaf.identity();
        if self.leaves.contains_key(&identity) {
            return Err(BgpError::DuplicateLeaf(identity));
        }
        self.leaves.insert(identity, leaf);
        Ok(())
    }

    #[must_use]
    pub fn group(&self, kind: GroupKind, name: &str) -> Option<&NamedPeerGroup> {
        match kind {
            GroupKind::PeerGroup => self.peer_groups.get(name),
            GroupKind::Template => self.templates.get(name),
        }
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LeafPeerGroup> {
        self.leaves.values()
    }

    #[allow(clippy::too_many_arguments)]
    fn walk<'a>(
        &'a self,
        kind: GroupKind,
        name: &'a str,
        usage: &str,
        referrer: Option<&StructureId>,
        line: Option<u32>,
        walk: &mut Walk<'a>,
        diags: &mut Diagnostics,
    ) {
        let id = StructureId::new(kind.structure_kind(), name);
        if walk.path.contains(&(kind, name)) {
            diags.warn(
                Warning::new(
                    WarningKind::CircularReference,
                    format!("inheritance cycle through {id}"),
                )
                .subject(id)
                .line(line),
            );
            return;
        }
        if !walk.seen.insert((kind, name)) {
            return;
        }
        let Some(group) = self.group(kind, name) else {
            diags.undefined_reference(id, usage, line, referrer.cloned());
            return;
        };
        diags.reference(id.clone(), usage, line);
        walk.chain.push(group);
        walk.path.push((kind, name));
        let usage = format!("bgp {} {} inherit", kind, group.name);
        for template in &group.inherits {
            self.walk(GroupKind::Template, template, &usage, Some(&id), group.line, walk, diags);
        }
        walk.path.pop();
    }

    /// Named groups a leaf inherits from, most specific first: its peer-group and the
    /// templates that group inherits, depth first, then the leaf's own templates.
    fn chain<'a>(
        &'a self,
        leaf: &'a LeafPeerGroup,
        diags: &mut Diagnostics,
    ) -> Vec<&'a NamedPeerGroup> {
        let mut walk = Walk {
            chain: vec![],
            path: vec![],
            seen: BTreeSet::new(),
        };
        let usage = format!("bgp neighbor {}", leaf.identity());
        if let Some(group) = &leaf.peer_group {
            self.walk(GroupKind::PeerGroup, group, &usage, None, leaf.line, &mut walk, diags);
        }
        for template in &leaf.inherits {
            self.walk(GroupKind::Template, template, &usage, None, leaf.line, &mut walk, diags);
        }
        walk.chain
    }

    fn resolve_chain<'a>(
        &'a self,
        leaf: &'a LeafPeerGroup,
        defaults: &PeerDefaults,
        diags: &mut Diagnostics,
    ) -> (EffectivePeerConfig, Vec<&'a NamedPeerGroup>) {
        let chain = self.chain(leaf, diags);
        let layers = std::iter::once(&leaf.settings)
            .chain(chain.iter().map(|g| &g.settings))
            .chain(std::iter::once(&self.master));
        let settings = PeerGroupSettings::overlay(layers);
        let names = chain.iter().map(|g| g.name.clone()).collect();
        let effective = EffectivePeerConfig::finalize(leaf.identity(), names, settings, defaults);
        if effective.remote_as.is_none() {
            diags.warn(
                Warning::new(
                    WarningKind::RedFlag,
                    format!("bgp neighbor {} has no remote-as", leaf.identity()),
                )
                .line(leaf.line),
            );
        }
        debug!("Resolved bgp neighbor {}", leaf.identity());
        (effective, chain)
    }

    /// Effective configuration of one leaf
    pub fn resolve_leaf(
        &self,
        leaf: &LeafPeerGroup,
        defaults: &PeerDefaults,
        diags: &mut Diagnostics,
    ) -> EffectivePeerConfig {
        self.resolve_chain(leaf, defaults, diags).0
    }

    /// Effective configuration of every leaf. Named groups no leaf ends up using are
    /// reported.
    pub fn resolve(
        &self,
        defaults: &PeerDefaults,
        diags: &mut Diagnostics,
    ) -> BTreeMap<LeafIdentity, EffectivePeerConfig> {
        let mut used: BTreeSet<(GroupKind, &str)> = BTreeSet::new();
        let mut resolved = BTreeMap::new();
        for leaf in self.leaves.values() {
            let (effective, chain) = self.resolve_chain(leaf, defaults, diags);
            used.extend(chain.iter().map(|g| (g.kind, g.name.as_str())));
            resolved.insert(leaf.identity(), effective);
        }
        for group in self.peer_groups.values().chain(self.templates.values()) {
            if !used.contains(&(group.kind, group.name.as_str())) {
                let id = StructureId::new(group.kind.structure_kind(), group.name.as_str());
                diags.warn(
                    Warning::new(WarningKind::RedFlag, "not used by any neighbor")
                        .subject(id)
                        .line(group.line),
                );
            }
        }
        resolved
    }
}
