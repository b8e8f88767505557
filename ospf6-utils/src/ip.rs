//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use serde::{Deserialize, Serialize};

// Address Family identifier.
//
// IANA registry:
// http://www.iana.org/assignments/address-family-numbers
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4 = 1,
    #[default]
    Ipv6 = 2,
}

// Extension methods for IpAddr.
pub trait IpAddrExt {
    // Converts this IP address into a host prefix network.
    fn to_host_prefix(&self) -> IpNetwork;

    // Returns an unspecified address of the given address family.
    fn unspecified(af: AddressFamily) -> IpAddr;
}

// Extension methods for IpNetwork.
pub trait IpNetworkExt {
    // Returns a copy of the network with the host bits cleared.
    fn apply_mask(&self) -> IpNetwork;

    // Returns the default route of the given address family.
    fn default(af: AddressFamily) -> IpNetwork;

    // Returns true if this network fully contains the other network.
    fn is_supernet_of(&self, other: &IpNetwork) -> bool;
}

// ===== impl AddressFamily =====

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "ipv4"),
            AddressFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

// ===== impl IpAddr =====

impl IpAddrExt for IpAddr {
    fn to_host_prefix(&self) -> IpNetwork {
        match self {
            IpAddr::V4(addr) => IpNetwork::V4(
                Ipv4Network::new(*addr, 32).unwrap(),
            ),
            IpAddr::V6(addr) => IpNetwork::V6(
                Ipv6Network::new(*addr, 128).unwrap(),
            ),
        }
    }

    fn unspecified(af: AddressFamily) -> IpAddr {
        match af {
            AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }
}

// ===== impl IpNetwork =====

impl IpNetworkExt for IpNetwork {
    fn apply_mask(&self) -> IpNetwork {
        match self {
            IpNetwork::V4(prefix) => IpNetwork::V4(
                Ipv4Network::new(prefix.network(), prefix.prefix()).unwrap(),
            ),
            IpNetwork::V6(prefix) => IpNetwork::V6(
                Ipv6Network::new(prefix.network(), prefix.prefix()).unwrap(),
            ),
        }
    }

    fn default(af: AddressFamily) -> IpNetwork {
        IpNetwork::new(IpAddr::unspecified(af), 0).unwrap()
    }

    fn is_supernet_of(&self, other: &IpNetwork) -> bool {
        match (self, other) {
            (IpNetwork::V4(a), IpNetwork::V4(b)) => {
                a.prefix() <= b.prefix() && a.contains(b.network())
            }
            (IpNetwork::V6(a), IpNetwork::V6(b)) => {
                a.prefix() <= b.prefix() && a.contains(b.network())
            }
            _ => false,
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supernet_of() {
        let a: IpNetwork = "2001:db8::/32".parse().unwrap();
        let b: IpNetwork = "2001:db8:1::/48".parse().unwrap();
        let c: IpNetwork = "2001:db9::/48".parse().unwrap();
        assert!(a.is_supernet_of(&b));
        assert!(a.is_supernet_of(&a));
        assert!(!b.is_supernet_of(&a));
        assert!(!a.is_supernet_of(&c));
    }

    #[test]
    fn test_apply_mask() {
        let a: IpNetwork = "2001:db8::1/64".parse().unwrap();
        let b: IpNetwork = "2001:db8::/64".parse().unwrap();
        assert_eq!(a.apply_mask(), b);
    }
}
