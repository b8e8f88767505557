//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use const_addrs::{ip4, net};
use ospf6::packet::Packet;
use ospf6::packet::lsa::LsaType;

use crate::topologies::{
    area_lsa, area_lsdb, iface_state, topo_broadcast, topo_p2p,
};

fn is_lsupd(packet: &Packet) -> bool {
    matches!(packet, Packet::LsUpdate(_))
}

// Test description:
//
// Once the LSDBs of two adjacent routers are synchronized, no further LS
// Updates are exchanged until an LSA needs to be refreshed.
#[test]
fn test_flooding_terminates() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(100));

    let rt1_count = net.router("rt1").tx_count(is_lsupd);
    let rt2_count = net.router("rt2").tx_count(is_lsupd);
    net.advance(Duration::from_secs(900));
    assert_eq!(net.router("rt1").tx_count(is_lsupd), rt1_count);
    assert_eq!(net.router("rt2").tx_count(is_lsupd), rt2_count);
}

// Test description:
//
// Same as above, over a broadcast segment where LSAs are flooded back to the
// DR and BDR and acknowledged using multicast delayed acks.
#[test]
fn test_flooding_terminates_broadcast() {
    let mut net = topo_broadcast(&[
        ("rt1", ip4!("1.1.1.1"), 1),
        ("rt2", ip4!("2.2.2.2"), 1),
        ("rt3", ip4!("3.3.3.3"), 1),
    ]);
    net.advance(Duration::from_secs(150));

    let counts = ["rt1", "rt2", "rt3"]
        .map(|router| net.router(router).tx_count(is_lsupd));
    net.advance(Duration::from_secs(600));
    for (router, count) in ["rt1", "rt2", "rt3"].into_iter().zip(counts) {
        assert_eq!(net.router(router).tx_count(is_lsupd), count, "{router}");
    }

    // All routers share the same view of the area.
    assert_eq!(area_lsdb(&net, "rt1"), area_lsdb(&net, "rt2"));
    assert_eq!(area_lsdb(&net, "rt1"), area_lsdb(&net, "rt3"));
    for router in ["rt1", "rt2", "rt3"] {
        let iface = iface_state(&net, router, "eth0");
        for nbr in &iface.neighbors {
            assert_eq!(nbr.ls_rxmt_count, 0, "{router}");
        }
    }
}

// Test description:
//
// A self-originated LSA reaching LSRefreshTime is re-originated with the
// next sequence number, and the new instance is flooded to the neighbor.
#[test]
fn test_lsa_refresh() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(100));

    let old = area_lsa(&net, "rt1", LsaType::Router, ip4!("1.1.1.1")).unwrap();
    assert!(old.age < 1800);

    net.advance(Duration::from_secs(1900));
    let new = area_lsa(&net, "rt1", LsaType::Router, ip4!("1.1.1.1")).unwrap();
    assert_eq!(new.seq_no, old.seq_no + 1);
    assert!(new.age < 1800);

    let copy = area_lsa(&net, "rt2", LsaType::Router, ip4!("1.1.1.1")).unwrap();
    assert_eq!(copy.seq_no, new.seq_no);
}

// Test description:
//
// Adding a global address to a stub interface updates the router's
// Intra-Area-Prefix-LSA, which reaches the neighbor as a new route.
#[test]
fn test_address_add() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(60));

    let prefix = net!("2001:db8:2::/64");
    assert!(!net.router("rt1").routes.contains_key(&prefix));

    net.set_address("rt2", "eth0", net!("2001:db8:2::2/64"), true);
    net.advance(Duration::from_secs(5));
    let route = net.router("rt1").routes.get(&prefix).unwrap();
    assert_eq!(route.metric, 20);

    net.set_address("rt2", "eth0", net!("2001:db8:2::2/64"), false);
    net.advance(Duration::from_secs(5));
    assert!(!net.router("rt1").routes.contains_key(&prefix));
}
