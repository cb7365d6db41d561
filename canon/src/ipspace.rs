// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Sets of IP addresses

use ipnet::{IpNet, Ipv4Net};
use std::net::{IpAddr, Ipv4Addr};

/// An IPv4 address with a wildcard mask. Bits set in the mask are "don't care".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IpWildcard {
    pub ip: Ipv4Addr,
    pub wildcard: Ipv4Addr,
}

impl IpWildcard {
    #[must_use]
    pub fn new(ip: Ipv4Addr, wildcard: Ipv4Addr) -> Self {
        // normalize so that equal sets compare equal
        let ip = Ipv4Addr::from(u32::from(ip) & !u32::from(wildcard));
        Self { ip, wildcard }
    }
    #[must_use]
    pub fn host(ip: Ipv4Addr) -> Self {
        Self::new(ip, Ipv4Addr::UNSPECIFIED)
    }
    #[must_use]
    pub fn any() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST)
    }
    #[must_use]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let care = !u32::from(self.wildcard);
        u32::from(addr) & care == u32::from(self.ip) & care
    }
    /// The prefix this wildcard denotes, if its don't-care bits are contiguous low bits
    #[must_use]
    pub fn as_prefix(&self) -> Option<Ipv4Net> {
        let w = u32::from(self.wildcard);
        if w.wrapping_add(1) & w != 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let len = (32 - w.count_ones()) as u8;
        Ipv4Net::new(self.ip, len).ok()
    }
}

impl From<Ipv4Net> for IpWildcard {
    fn from(net: Ipv4Net) -> Self {
        Self::new(net.network(), net.hostmask())
    }
}

/// A set of IP addresses
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IpSpace {
    Empty,
    Universe,
    Prefix(IpNet),
    Wildcard(IpWildcard),
    Range { first: IpAddr, last: IpAddr },
    /// A named space, defined elsewhere in the same device
    Reference(String),
    Union(Vec<IpSpace>),
}

impl IpSpace {
    #[must_use]
    pub fn host(ip: IpAddr) -> Self {
        IpSpace::Prefix(IpNet::from(ip))
    }
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        IpSpace::Reference(name.into())
    }
    /// Build the union of some spaces, flattening nested unions and dropping empty members.
    /// The union of nothing is [`IpSpace::Empty`].
    #[must_use]
    pub fn union(spaces: impl IntoIterator<Item = IpSpace>) -> Self {
        let mut members = vec![];
        for space in spaces {
            match space {
                IpSpace::Empty => {}
                IpSpace::Universe => return IpSpace::Universe,
                IpSpace::Union(inner) => members.extend(inner),
                other => members.push(other),
            }
        }
        match members.len() {
            0 => IpSpace::Empty,
            1 => members.pop().unwrap_or(IpSpace::Empty),
            _ => IpSpace::Union(members),
        }
    }
    /// Names of the spaces this one refers to, directly
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        match self {
            IpSpace::Reference(name) => vec![name.as_str()],
            IpSpace::Union(members) => members.iter().flat_map(IpSpace::references).collect(),
            _ => vec![],
        }
    }
}
