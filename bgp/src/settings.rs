// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Partial peer settings, as configured at any layer of the hierarchy

use derive_builder::Builder;
use std::net::Ipv4Addr;

/// Peer settings where every field is optional: `None` means "not set at this layer".
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq)]
#[builder(default, setter(into, strip_option))]
pub struct PeerGroupSettings {
    pub remote_as: Option<u32>,
    pub local_as: Option<u32>,
    pub description: Option<String>,
    pub update_source: Option<String>,
    pub send_community: Option<bool>,
    pub send_extended_community: Option<bool>,
    pub disable_peer_as_check: Option<bool>,
    pub route_reflector_client: Option<bool>,
    pub cluster_id: Option<Ipv4Addr>,
    pub next_hop_self: Option<bool>,
    pub remove_private_as: Option<bool>,
    pub default_originate: Option<bool>,
    pub default_originate_map: Option<String>,
    pub inbound_route_map: Option<String>,
    pub outbound_route_map: Option<String>,
    pub inbound_ipv6_route_map: Option<String>,
    pub outbound_ipv6_route_map: Option<String>,
    pub inbound_prefix_list: Option<String>,
    pub outbound_prefix_list: Option<String>,
    pub ebgp_multihop: Option<bool>,
    pub allow_as_in: Option<u8>,
    pub advertisement_interval: Option<u32>,
    pub active: Option<bool>,
    pub shutdown: Option<bool>,
}

macro_rules! inherit_unset {
    ($dst:ident, $src:ident, $($field:ident),+ $(,)?) => {
        $(
            if $dst.$field.is_none() {
                $dst.$field.clone_from(&$src.$field);
            }
        )+
    };
}

impl PeerGroupSettings {
    /// Fill the fields not set here with those of a less specific layer
    #[must_use]
    pub fn inherit(mut self, parent: &PeerGroupSettings) -> Self {
        let dst = &mut self;
        inherit_unset!(
            dst,
            parent,
            remote_as,
            local_as,
            description,
            update_source,
            send_community,
            send_extended_community,
            disable_peer_as_check,
            route_reflector_client,
            cluster_id,
            next_hop_self,
            remove_private_as,
            default_originate,
            default_originate_map,
            inbound_route_map,
            outbound_route_map,
            inbound_ipv6_route_map,
            outbound_ipv6_route_map,
            inbound_prefix_list,
            outbound_prefix_list,
            ebgp_multihop,
            allow_as_in,
            advertisement_interval,
            active,
            shutdown,
        );
        self
    }

    /// Overlay layers, most specific first
    #[must_use]
    pub fn overlay<'a>(layers: impl IntoIterator<Item = &'a PeerGroupSettings>) -> Self {
        layers
            .into_iter()
            .fold(PeerGroupSettings::default(), PeerGroupSettings::inherit)
    }

    /// Names of the route-maps these settings use
    pub fn route_maps(&self) -> impl Iterator<Item = &str> {
        [
            &self.default_originate_map,
            &self.inbound_route_map,
            &self.outbound_route_map,
            &self.inbound_ipv6_route_map,
            &self.outbound_ipv6_route_map,
        ]
        .into_iter()
        .filter_map(|m| m.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inherit_keeps_explicit_values() {
        let leaf = PeerGroupSettingsBuilder::default()
            .send_community(false)
            .description("leaf")
            .build()
            .unwrap();
        let group = PeerGroupSettingsBuilder::default()
            .send_community(true)
            .remote_as(65001u32)
            .build()
            .unwrap();
        let effective = leaf.inherit(&group);
        assert_eq!(effective.send_community, Some(false));
        assert_eq!(effective.remote_as, Some(65001));
        assert_eq!(effective.description.as_deref(), Some("leaf"));
        assert_eq!(effective.local_as, None);
    }
}
