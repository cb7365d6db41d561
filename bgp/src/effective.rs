// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fully resolved peer configuration and the boot-time defaults it falls back to

use crate::groups::LeafIdentity;
use crate::settings::PeerGroupSettings;
use std::net::Ipv4Addr;

/// Values a device assumes for the fields nobody configured
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerDefaults {
    pub send_community: bool,
    pub send_extended_community: bool,
    pub disable_peer_as_check: bool,
    pub route_reflector_client: bool,
    pub next_hop_self: bool,
    pub remove_private_as: bool,
    pub default_originate: bool,
    pub ebgp_multihop: bool,
    pub active: bool,
    pub shutdown: bool,
}

impl Default for PeerDefaults {
    fn default() -> Self {
        Self {
            send_community: false,
            send_extended_community: false,
            disable_peer_as_check: true,
            route_reflector_client: false,
            next_hop_self: false,
            remove_private_as: false,
            default_originate: false,
            ebgp_multihop: false,
            active: true,
            shutdown: false,
        }
    }
}

impl PeerDefaults {
    /// NX-OS checks the peer AS of advertised paths unless told otherwise
    #[must_use]
    pub fn nxos() -> Self {
        Self {
            disable_peer_as_check: false,
            ..Self::default()
        }
    }
}

/// Configuration of a leaf peer once the whole hierarchy has been applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectivePeerConfig {
    pub identity: LeafIdentity,
    /// Named groups the values were taken from, most specific first
    pub inherited_from: Vec<String>,
    pub remote_as: Option<u32>,
    pub local_as: Option<u32>,
    pub description: Option<String>,
    pub update_source: Option<String>,
    pub send_community: bool,
    pub send_extended_community: bool,
    pub disable_peer_as_check: bool,
    pub route_reflector_client: bool,
    pub cluster_id: Option<Ipv4Addr>,
    pub next_hop_self: bool,
    pub remove_private_as: bool,
    pub default_originate: bool,
    pub default_originate_map: Option<String>,
    pub inbound_route_map: Option<String>,
    pub outbound_route_map: Option<String>,
    pub inbound_ipv6_route_map: Option<String>,
    pub outbound_ipv6_route_map: Option<String>,
    pub inbound_prefix_list: Option<String>,
    pub outbound_prefix_list: Option<String>,
    pub ebgp_multihop: bool,
    pub allow_as_in: Option<u8>,
    pub advertisement_interval: Option<u32>,
    pub active: bool,
    pub shutdown: bool,
}

impl EffectivePeerConfig {
    /// Complete overlaid settings with the defaults
    #[must_use]
    pub fn finalize(
        identity: LeafIdentity,
        inherited_from: Vec<String>,
        s: PeerGroupSettings,
        d: &PeerDefaults,
    ) -> Self {
        Self {
            identity,
            inherited_from,
            remote_as: s.remote_as,
            local_as: s.local_as,
            description: s.description,
            update_source: s.update_source,
            send_community: s.send_community.unwrap_or(d.send_community),
            send_extended_community: s
                .send_extended_community
                .unwrap_or(d.send_extended_community),
            disable_peer_as_check: s.disable_peer_as_check.unwrap_or(d.disable_peer_as_check),
            route_reflector_client: s
                .route_reflector_client
                .unwrap_or(d.route_reflector_client),
            cluster_id: s.cluster_id,
            next_hop_self: s.next_hop_self.unwrap_or(d.next_hop_self),
            remove_private_as: s.remove_private_as.unwrap_or(d.remove_private_as),
            default_originate: s.default_originate.unwrap_or(d.default_originate),
            default_originate_map: s.default_originate_map,
            inbound_route_map: s.inbound_route_map,
            outbound_route_map: s.outbound_route_map,
            inbound_ipv6_route_map: s.inbound_ipv6_route_map,
            outbound_ipv6_route_map: s.outbound_ipv6_route_map,
            inbound_prefix_list: s.inbound_prefix_list,
            outbound_prefix_list: s.outbound_prefix_list,
            ebgp_multihop: s.ebgp_multihop.unwrap_or(d.ebgp_multihop),
            allow_as_in: s.allow_as_in,
            advertisement_interval: s.advertisement_interval,
            active: s.active.unwrap_or(d.active),
            shutdown: s.shutdown.unwrap_or(d.shutdown),
        }
    }

    /// Tell if the session is external, when both ends are known
    #[must_use]
    pub fn is_ebgp(&self) -> Option<bool> {
        Some(self.remote_as? != self.local_as?)
    }
}
