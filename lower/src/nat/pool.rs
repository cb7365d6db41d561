// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! NAT pools

use crate::errors::{LowerError, LowerResult};
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Addresses as integers, with their family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    V4,
    V6,
}

fn to_bits(ip: IpAddr) -> (Family, u128) {
    match ip {
        IpAddr::V4(v4) => (Family::V4, u128::from(u32::from(v4))),
        IpAddr::V6(v6) => (Family::V6, u128::from(v6)),
    }
}

fn from_bits(family: Family, bits: u128) -> IpAddr {
    match family {
        // only built back from values bounded by v4 addresses
        #[allow(clippy::cast_possible_truncation)]
        Family::V4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        Family::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// First and last host addresses of a subnet: network+1 and broadcast-1, or the
/// whole block for point-to-point and host prefixes (/31, /32, /127, /128).
#[must_use]
pub fn host_range(subnet: IpNet) -> (IpAddr, IpAddr) {
    let (network, broadcast) = (subnet.network(), subnet.broadcast());
    if subnet.prefix_len() + 1 >= subnet.max_prefix_len() {
        return (network, broadcast);
    }
    let (family, n) = to_bits(network);
    let (_, b) = to_bits(broadcast);
    (from_bits(family, n + 1), from_bits(family, b - 1))
}

/// Clamp both ends of a range into the host range of a subnet
pub fn clamp(first: IpAddr, last: IpAddr, subnet: IpNet) -> LowerResult<(IpAddr, IpAddr)> {
    let (lo, hi) = host_range(subnet);
    let (family, lo) = to_bits(lo);
    let (_, hi) = to_bits(hi);
    let (ff, f) = to_bits(first);
    let (lf, l) = to_bits(last);
    if ff != family || lf != family {
        return Err(LowerError::Malformed(format!(
            "pool {first}-{last} and subnet {subnet} are of different families"
        )));
    }
    let c = |x: u128| x.max(lo).min(hi);
    Ok((from_bits(family, c(f)), from_bits(family, c(l))))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NatPool {
    first: IpAddr,
    last: IpAddr,
    subnet: Option<IpNet>,
}

impl NatPool {
    /// Build a pool of `[first, last]`, clamped into the host range of `subnet` if given.
    /// Fails if `first > last`, before any clamping.
    pub fn new(first: IpAddr, last: IpAddr, subnet: Option<IpNet>) -> LowerResult<Self> {
        let (ff, f) = to_bits(first);
        let (lf, l) = to_bits(last);
        if ff != lf {
            return Err(LowerError::Malformed(format!(
                "pool {first}-{last} mixes address families"
            )));
        }
        if f > l {
            return Err(LowerError::PoolRange(first, last));
        }
        let (first, last) = match subnet {
            Some(subnet) => clamp(first, last, subnet)?,
            None => (first, last),
        };
        Ok(Self {
            first,
            last,
            subnet,
        })
    }
    #[must_use]
    pub fn first(&self) -> IpAddr {
        self.first
    }
    #[must_use]
    pub fn last(&self) -> IpAddr {
        self.last
    }
    #[must_use]
    pub fn subnet(&self) -> Option<IpNet> {
        self.subnet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnet::Ipv4Net;
    use pretty_assertions::assert_eq;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }
    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    #[test]
    fn host_ranges() {
        assert_eq!(host_range(net("10.0.0.0/24")), (ip("10.0.0.1"), ip("10.0.0.254")));
        assert_eq!(host_range(net("10.0.0.0/31")), (ip("10.0.0.0"), ip("10.0.0.1")));
        assert_eq!(host_range(net("10.0.0.7/32")), (ip("10.0.0.7"), ip("10.0.0.7")));
        assert_eq!(host_range(net("2001:db8::/64")).0, ip("2001:db8::1"));
        assert_eq!(host_range(net("2001:db8::/127")), (ip("2001:db8::"), ip("2001:db8::1")));
    }

    #[test]
    fn pool_construction() {
        let pool = NatPool::new(ip("10.0.0.0"), ip("10.0.1.10"), Some(net("10.0.0.0/24"))).unwrap();
        assert_eq!(pool.first(), ip("10.0.0.1"));
        assert_eq!(pool.last(), ip("10.0.0.254"));

        assert_eq!(
            NatPool::new(ip("10.0.0.9"), ip("10.0.0.1"), None),
            Err(LowerError::PoolRange(ip("10.0.0.9"), ip("10.0.0.1")))
        );
        // reversed is rejected even when clamping would reorder nothing
        assert!(NatPool::new(ip("10.0.0.9"), ip("10.0.0.1"), Some(net("10.0.0.0/8"))).is_err());
        assert!(NatPool::new(ip("10.0.0.1"), ip("::1"), None).is_err());
        assert!(NatPool::new(ip("10.0.0.1"), ip("10.0.0.2"), Some(net("::/0"))).is_err());
    }

    #[test]
    fn clamp_is_idempotent_and_bounded() {
        bolero::check!()
            .with_type::<(u32, u32, u32, u8)>()
            .for_each(|(a, b, addr, len)| {
                let (f, l) = (IpAddr::V4((*a.min(b)).into()), IpAddr::V4((*a.max(b)).into()));
                let subnet = IpNet::V4(Ipv4Net::new((*addr).into(), len % 33).unwrap().trunc());
                let (cf, cl) = clamp(f, l, subnet).unwrap();
                assert_eq!(clamp(cf, cl, subnet).unwrap(), (cf, cl));
                let (lo, hi) = host_range(subnet);
                assert!(lo <= cf && cf <= hi);
                assert!(lo <= cl && cl <= hi);
                assert!(cf <= cl);
            });
    }
}
