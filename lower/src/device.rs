// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Devices: population of the named structures, then compilation into the
//! canonical model.

use crate::acl::{
    PortField, group_acl, lower_class_map, lower_extended_acl, lower_icmp_group,
    lower_network_group, lower_network_object, lower_port_group, lower_protocol_group,
    lower_service, lower_service_group, lower_standard_acl, standard_acl_route_filter,
};
use crate::context::LowerCtx;
use crate::errors::LowerError;
use crate::nat::{self, DynamicNat, NatTransformations, StaticNat};
use crate::policy::{
    find_call_cycle, lower_as_path_list, lower_community_list, lower_community_set,
    lower_prefix_list, lower_prefix_set, lower_route_map, lower_route_policy,
};
use crate::settings::LoweringSettings;
use crate::structure::{DeviceRegistry, Structure};
use bgp::{BgpProcess, EffectivePeerConfig, LeafIdentity};
use canon::{AsPathFilter, CommunityDef, IpAccessList, IpSpace, RouteFilterList, RoutingPolicy};
use ipnet::IpNet;
use names::{
    Diagnostics, NameError, RegistryBuilder, StructureId, StructureKind, Warning, WarningKind,
    canonical_name,
};
use ordermap::OrderSet;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Population phase of a device
#[derive(Debug)]
pub struct DeviceBuilder {
    hostname: String,
    settings: LoweringSettings,
    registry: RegistryBuilder<Structure>,
    static_nat: OrderSet<StaticNat>,
    dynamic_nat: Vec<DynamicNat>,
    bgp: Option<BgpProcess>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn new(hostname: impl Into<String>, settings: LoweringSettings) -> Self {
        Self {
            hostname: hostname.into(),
            settings,
            registry: RegistryBuilder::new(),
            static_nat: OrderSet::new(),
            dynamic_nat: vec![],
            bgp: None,
        }
    }

    /// Define a named structure; the first definition of a name wins
    pub fn define(
        &mut self,
        name: &str,
        structure: Structure,
        line: Option<u32>,
    ) -> Result<(), NameError> {
        self.registry.define(structure.kind(), name, structure, line)
    }

    pub fn definition_mut(&mut self, kind: StructureKind, name: &str) -> Option<&mut Structure> {
        self.registry.definition_mut(kind, name)
    }

    /// Add a static NAT rule. Returns false if the same rule was already added.
    pub fn add_static_nat(&mut self, nat: StaticNat) -> bool {
        let added = self.static_nat.insert(nat);
        if !added {
            debug!("Ignoring repeated static nat rule");
        }
        added
    }

    pub fn add_dynamic_nat(&mut self, nat: DynamicNat) {
        self.dynamic_nat.push(nat);
    }

    pub fn set_bgp(&mut self, bgp: BgpProcess) {
        self.bgp = Some(bgp);
    }

    /// The BGP process, created empty on first use
    pub fn bgp_mut(&mut self) -> &mut BgpProcess {
        self.bgp.get_or_insert_default()
    }

    /// End the population phase
    #[must_use]
    pub fn build(self) -> Device {
        Device {
            hostname: self.hostname,
            settings: self.settings,
            registry: self.registry.freeze(),
            static_nat: self.static_nat.into_iter().collect(),
            dynamic_nat: self.dynamic_nat,
            bgp: self.bgp,
        }
    }
}

/// A fully populated device
#[derive(Debug)]
pub struct Device {
    hostname: String,
    settings: LoweringSettings,
    registry: DeviceRegistry,
    static_nat: Vec<StaticNat>,
    dynamic_nat: Vec<DynamicNat>,
    bgp: Option<BgpProcess>,
}

/// The canonical model of a device, with what could not be lowered
#[derive(Debug, Default)]
pub struct CompiledDevice {
    pub hostname: String,
    pub ip_spaces: BTreeMap<String, IpSpace>,
    pub acls: BTreeMap<String, IpAccessList>,
    pub route_filters: BTreeMap<String, RouteFilterList>,
    pub community_defs: BTreeMap<String, CommunityDef>,
    pub as_path_filters: BTreeMap<String, AsPathFilter>,
    pub routing_policies: BTreeMap<String, RoutingPolicy>,
    pub transformations: NatTransformations,
    pub bgp_peers: BTreeMap<LeafIdentity, EffectivePeerConfig>,
    /// Structures omitted from the model, and why
    pub failures: BTreeMap<StructureId, LowerError>,
    /// Structures nothing refers to
    pub unused: Vec<StructureId>,
    pub diagnostics: Diagnostics,
}

impl CompiledDevice {
    fn add_acl(&mut self, acl: IpAccessList) {
        self.acls.insert(acl.name.clone(), acl);
    }
    fn add_route_filter(&mut self, filter: RouteFilterList) {
        self.route_filters.insert(filter.name.clone(), filter);
    }
}

/// Lower one structure into the model
fn lower_structure(
    ctx: &mut LowerCtx<'_>,
    name: &str,
    structure: &Structure,
    out: &mut CompiledDevice,
) -> Result<(), LowerError> {
    let kind = structure.kind();
    let canonical = canonical_name(kind, name);
    match structure {
        Structure::NetworkObject(object) => {
            out.ip_spaces.insert(canonical, lower_network_object(ctx, object)?);
        }
        Structure::NetworkObjectGroup(group) => {
            out.ip_spaces.insert(canonical, lower_network_group(ctx, group)?);
        }
        Structure::ServiceObject(service) => {
            out.add_acl(group_acl(kind, name, lower_service(service)?));
        }
        Structure::ServiceObjectGroup(group) => {
            out.add_acl(group_acl(kind, name, lower_service_group(ctx, group)?));
        }
        Structure::ProtocolObjectGroup(group) => {
            out.add_acl(group_acl(kind, name, lower_protocol_group(ctx, group)));
        }
        Structure::IcmpTypeObjectGroup(group) => {
            out.add_acl(group_acl(kind, name, lower_icmp_group(ctx, group)));
        }
        Structure::PortObjectGroup(group) => {
            for field in [PortField::Destination, PortField::Source] {
                let expr = lower_port_group(ctx, group, field)?;
                out.add_acl(group_acl(field.kind(), name, expr));
            }
        }
        Structure::ExtendedAccessList(acl) => out.add_acl(lower_extended_acl(ctx, name, acl)?),
        Structure::StandardAccessList(acl) => {
            out.add_acl(lower_standard_acl(ctx, name, acl)?);
            out.add_route_filter(standard_acl_route_filter(ctx, name, acl));
        }
        Structure::ClassMap(class_map) => out.add_acl(lower_class_map(ctx, name, class_map)?),
        Structure::PrefixList(list) | Structure::Ipv6PrefixList(list) => {
            out.add_route_filter(lower_prefix_list(canonical, list)?);
        }
        Structure::PrefixSet(set) => out.add_route_filter(lower_prefix_set(canonical, set)?),
        Structure::CommunityList(list) => {
            out.community_defs.insert(canonical, lower_community_list(list));
        }
        Structure::CommunitySet(set) => {
            out.community_defs.insert(canonical, lower_community_set(set)?);
        }
        Structure::AsPathAccessList(list) => {
            out.as_path_filters.insert(canonical.clone(), lower_as_path_list(canonical, list));
        }
        Structure::RouteMap(map) => {
            for policy in lower_route_map(ctx, name, map)? {
                out.routing_policies.insert(policy.name.clone(), policy);
            }
        }
        Structure::RoutePolicy(policy) => {
            if let Some(cycle) = find_call_cycle(ctx.registry(), name) {
                ctx.warn(
                    WarningKind::CircularReference,
                    format!("apply cycle {}", cycle.join(" -> ")),
                );
                return Err(LowerError::CircularReference(cycle));
            }
            let policy = lower_route_policy(ctx, name, policy)?;
            out.routing_policies.insert(policy.name.clone(), policy);
        }
        // pools are only used through the nat rules naming them
        Structure::NatPool(_) => {}
    }
    Ok(())
}

/// Record the uses of route-maps and prefix-lists by BGP neighbors
fn bgp_references(
    ctx: &mut LowerCtx<'_>,
    peers: &BTreeMap<LeafIdentity, EffectivePeerConfig>,
) {
    for (identity, peer) in peers {
        let prefix_list = match identity {
            LeafIdentity::Ipv6(_) | LeafIdentity::Dynamic(IpNet::V6(_)) => {
                StructureKind::Ipv6PrefixList
            }
            LeafIdentity::Ip(_) | LeafIdentity::Dynamic(IpNet::V4(_)) => StructureKind::PrefixList,
        };
        let uses = [
            (StructureKind::RouteMap, &peer.inbound_route_map, "route-map in"),
            (StructureKind::RouteMap, &peer.outbound_route_map, "route-map out"),
            (StructureKind::RouteMap, &peer.inbound_ipv6_route_map, "ipv6 route-map in"),
            (StructureKind::RouteMap, &peer.outbound_ipv6_route_map, "ipv6 route-map out"),
            (StructureKind::RouteMap, &peer.default_originate_map, "default-originate route-map"),
            (prefix_list, &peer.inbound_prefix_list, "prefix-list in"),
            (prefix_list, &peer.outbound_prefix_list, "prefix-list out"),
        ];
        for (kind, name, what) in uses {
            if let Some(name) = name {
                ctx.refer(kind, name, &format!("bgp neighbor {identity} {what}"));
            }
        }
    }
}

impl Device {
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &LoweringSettings {
        &self.settings
    }

    /// Lower every structure of the device. A structure that fails is recorded in
    /// [`CompiledDevice::failures`] and left out; the others are still lowered.
    #[must_use]
    pub fn compile(&self) -> CompiledDevice {
        info!("Compiling device {}", self.hostname);
        let mut out = CompiledDevice {
            hostname: self.hostname.clone(),
            ..CompiledDevice::default()
        };
        let mut diags = self.registry.population_diagnostics().clone();
        let mut ctx = LowerCtx::new(&self.registry, &self.settings, &mut diags);

        for (id, structure) in self.registry.iter() {
            let line = self.registry.definition_line(id.kind, &id.name);
            let mut scoped = ctx.scoped(id.clone(), line);
            if let Err(e) = lower_structure(&mut scoped, &id.name, structure, &mut out) {
                warn!("Failed to lower {id}: {e}");
                out.failures.insert(id.clone(), e);
            }
        }

        out.transformations = nat::assemble(&mut ctx, &self.static_nat, &self.dynamic_nat);

        if let Some(bgp) = &self.bgp {
            out.bgp_peers = bgp.resolve(&self.settings.bgp_defaults(), ctx.diags());
            bgp_references(&mut ctx, &out.bgp_peers);
        }

        out.unused = diags.unused_structures(&self.registry);
        for id in &out.unused {
            debug!("{id} is not used");
        }
        if !out.failures.is_empty() {
            diags.warn(Warning::new(
                WarningKind::RedFlag,
                format!("{} structures could not be lowered", out.failures.len()),
            ));
        }
        out.diagnostics = diags;
        info!(
            "Compiled device {}: {} warnings, {} failures",
            self.hostname,
            out.diagnostics.warnings().len(),
            out.failures.len()
        );
        out
    }
}

/// Compile independent devices in parallel, one thread per device. Results are in
/// the order of the input.
#[must_use]
pub fn compile_fleet(devices: &[Device]) -> Vec<CompiledDevice> {
    std::thread::scope(|s| {
        let handles: Vec<_> = devices
            .iter()
            .map(|device| (device, s.spawn(move || device.compile())))
            .collect();
        handles
            .into_iter()
            .map(|(device, handle)| {
                handle.join().unwrap_or_else(|_| {
                    warn!("Compilation of {} panicked", device.hostname);
                    CompiledDevice {
                        hostname: device.hostname.clone(),
                        ..CompiledDevice::default()
                    }
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{AddressSpec, StandardAccessList, StandardAclLine};
    use crate::nat::{DynamicNatTarget, NatAction, NatPool};
    use crate::policy::{RouteMap, RouteMapClause};
    use bgp::{LeafPeerGroup, PeerGroupSettingsBuilder};
    use canon::{IpField, LineAction, MatchExpr, Transformation, TransformationStep};
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    fn chain_len(t: Option<&Transformation>) -> usize {
        let mut n = 0;
        let mut cursor = t;
        while let Some(t) = cursor {
            n += 1;
            cursor = t.or_else.as_deref();
        }
        n
    }

    #[test]
    fn first_definition_wins() {
        let mut builder = DeviceBuilder::new("r1", LoweringSettings::default());
        let map = |seq| {
            Structure::RouteMap(RouteMap::default().with_clause(seq, RouteMapClause::permit()))
        };
        builder.define("RM", map(10), Some(1)).unwrap();
        let dup = builder.define("RM", map(20), Some(9));
        assert!(matches!(dup, Err(NameError::Duplicate(_))));

        let device = builder.build();
        let Some(Structure::RouteMap(kept)) =
            device.registry().resolve(StructureKind::RouteMap, "RM")
        else {
            unreachable!("route-map RM is defined");
        };
        assert!(kept.clauses.contains_key(&10));
        let compiled = device.compile();
        assert!(compiled.diagnostics.has(WarningKind::DuplicateDefinition));
        assert_eq!(compiled.routing_policies.len(), 1);
    }

    #[test]
    fn nat_assembly() {
        let mut builder = DeviceBuilder::new("edge", LoweringSettings::default());
        let inside_net =
            StaticNat::new(NatAction::Inside, net("10.0.0.0/24"), net("192.0.2.0/24")).unwrap();
        let inside_host =
            StaticNat::new(NatAction::Inside, net("10.0.0.5/32"), net("198.51.100.5/32")).unwrap();
        assert!(builder.add_static_nat(inside_net.clone().at_line(1)));
        assert!(builder.add_static_nat(inside_host));
        assert!(!builder.add_static_nat(inside_net.at_line(7)));

        let pool = NatPool::new(
            "203.0.113.10".parse().unwrap(),
            "203.0.113.20".parse().unwrap(),
            Some(net("203.0.113.0/24")),
        )
        .unwrap();
        builder
            .define("POOL", Structure::NatPool(pool), None)
            .unwrap();
        let acl = StandardAccessList::default().with_line(StandardAclLine::new(
            LineAction::Permit,
            AddressSpec::Subnet(net("10.1.0.0/16")),
        ));
        builder
            .define("NATLIST", Structure::StandardAccessList(acl), None)
            .unwrap();
        builder.add_dynamic_nat(DynamicNat::new("NATLIST", DynamicNatTarget::Pool("POOL".into())));
        builder.add_dynamic_nat(DynamicNat::new("NATLIST", DynamicNatTarget::Pool("NOPE".into())));

        let device = builder.build().compile();
        let outgoing = device.transformations.outgoing.as_ref();
        assert_eq!(chain_len(outgoing), 3);
        assert_eq!(chain_len(device.transformations.incoming.as_ref()), 2);

        // the host rule is more specific, so it comes first
        let first = outgoing.unwrap();
        assert_eq!(
            first.steps[0],
            TransformationStep::ShiftIntoSubnet {
                kind: canon::TransformationKind::StaticNat,
                field: IpField::Source,
                subnet: net("198.51.100.5/32"),
            }
        );
        let dynamic = first.or_else.as_ref().unwrap().or_else.as_ref().unwrap();
        assert_eq!(
            dynamic.guard,
            MatchExpr::permitted_by(canonical_name(StructureKind::StandardAccessList, "NATLIST"))
        );
        assert!(matches!(
            dynamic.steps[0],
            TransformationStep::AssignIpFromPool { field: IpField::Source, .. }
        ));

        assert_eq!(
            device
                .diagnostics
                .undefined_references()
                .iter()
                .map(|r| r.target.clone())
                .collect::<Vec<_>>(),
            vec![StructureId::new(StructureKind::NatPool, "NOPE")]
        );
        assert!(device.unused.is_empty());
    }

    #[test]
    fn bgp_neighbors_use_route_maps() {
        let mut builder = DeviceBuilder::new("r1", LoweringSettings::default());
        builder
            .define(
                "IMPORT",
                Structure::RouteMap(RouteMap::default().with_clause(10, RouteMapClause::permit())),
                None,
            )
            .unwrap();
        let settings = PeerGroupSettingsBuilder::default()
            .remote_as(65001u32)
            .inbound_route_map("IMPORT")
            .outbound_route_map("EXPORT")
            .build()
            .unwrap();
        builder
            .bgp_mut()
            .add_leaf(LeafPeerGroup::new(
                LeafIdentity::Ip(Ipv4Addr::new(192, 0, 2, 1)),
                settings,
            ))
            .unwrap();
        let device = builder.build().compile();
        assert_eq!(device.bgp_peers.len(), 1);
        assert!(device.unused.is_empty());
        let undefined = device.diagnostics.undefined_references();
        assert_eq!(undefined.len(), 1);
        assert_eq!(
            undefined[0].target,
            StructureId::new(StructureKind::RouteMap, "EXPORT")
        );
    }

    #[test]
    fn fleet_keeps_input_order() {
        let devices: Vec<Device> = (0..8)
            .map(|i| {
                let mut builder = DeviceBuilder::new(format!("r{i}"), LoweringSettings::default());
                builder
                    .define(
                        "RM",
                        Structure::RouteMap(
                            RouteMap::default().with_clause(i, RouteMapClause::permit()),
                        ),
                        None,
                    )
                    .unwrap();
                builder.build()
            })
            .collect();
        let compiled = compile_fleet(&devices);
        assert_eq!(compiled.len(), devices.len());
        for (i, device) in compiled.iter().enumerate() {
            assert_eq!(device.hostname, format!("r{i}"));
            assert_eq!(device.routing_policies.len(), 1);
            assert!(device.failures.is_empty());
        }
    }
}
