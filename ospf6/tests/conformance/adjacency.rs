//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use const_addrs::{ip4, net};
use ospf6::interface::ism;
use ospf6::neighbor::nsm;
use ospf6::packet::Packet;
use ospf6::packet::lsa::LsaType;

use crate::topologies::{
    area_lsa, area_lsdb, iface_state, nbr_state, topo_broadcast, topo_nbma,
    topo_p2p, topo_passive,
};

// Test description:
//
// Two routers attached to a broadcast segment, using the default Hello and
// RouterDead intervals. After the second round of Hellos each router is
// listed in the other's Hello packets, so both sides reach at least the
// 2-Way state.
#[test]
fn test_hello_two_way() {
    let mut net = topo_broadcast(&[
        ("rt1", ip4!("1.1.1.1"), 1),
        ("rt2", ip4!("2.2.2.2"), 1),
    ]);

    // The first Hellos are sent before any neighbor is known.
    net.advance(Duration::from_secs(1));
    let state = nbr_state(&net, "rt1", "eth0", ip4!("2.2.2.2"));
    assert_eq!(state, Some(nsm::State::Init));

    net.advance(Duration::from_secs(10));
    let state = nbr_state(&net, "rt1", "eth0", ip4!("2.2.2.2")).unwrap();
    assert!(state >= nsm::State::TwoWay);
    let state = nbr_state(&net, "rt2", "eth0", ip4!("1.1.1.1")).unwrap();
    assert!(state >= nsm::State::TwoWay);
}

// Test description:
//
// Three routers attached to a broadcast segment: rt1 and rt2 with priority 1
// and rt3 with priority 0. Once the Wait timers expire, every router agrees
// on rt2 as the Designated Router and rt1 as the Backup, and both form full
// adjacencies with all the other routers.
#[test]
fn test_dr_election() {
    let mut net = topo_broadcast(&[
        ("rt1", ip4!("1.1.1.1"), 1),
        ("rt2", ip4!("2.2.2.2"), 1),
        ("rt3", ip4!("3.3.3.3"), 0),
    ]);
    net.advance(Duration::from_secs(120));

    for router in ["rt1", "rt2", "rt3"] {
        let iface = iface_state(&net, router, "eth0");
        assert_eq!(iface.dr, Some(ip4!("2.2.2.2")), "{router}");
        assert_eq!(iface.bdr, Some(ip4!("1.1.1.1")), "{router}");
    }
    assert_eq!(iface_state(&net, "rt1", "eth0").state, ism::State::Backup);
    assert_eq!(iface_state(&net, "rt2", "eth0").state, ism::State::Dr);
    assert_eq!(iface_state(&net, "rt3", "eth0").state, ism::State::DrOther);

    for (router, nbr) in [
        ("rt1", ip4!("2.2.2.2")),
        ("rt1", ip4!("3.3.3.3")),
        ("rt2", ip4!("1.1.1.1")),
        ("rt2", ip4!("3.3.3.3")),
        ("rt3", ip4!("1.1.1.1")),
        ("rt3", ip4!("2.2.2.2")),
    ] {
        let state = nbr_state(&net, router, "eth0", nbr);
        assert_eq!(state, Some(nsm::State::Full), "{router} -> {nbr}");
    }

    // The election result is stable.
    net.advance(Duration::from_secs(60));
    for router in ["rt1", "rt2", "rt3"] {
        let iface = iface_state(&net, router, "eth0");
        assert_eq!(iface.dr, Some(ip4!("2.2.2.2")), "{router}");
        assert_eq!(iface.bdr, Some(ip4!("1.1.1.1")), "{router}");
    }

    // The DR originates the Network-LSA of the segment.
    let lsa = area_lsa(&net, "rt3", LsaType::Network, ip4!("2.2.2.2"));
    assert!(lsa.is_some());
}

// Test description:
//
// Broadcast interface with priority 1 and a single neighbor advertising
// priority 0. The router stays in the Waiting state until the Wait timer
// fires and then declares itself Designated Router, originating the
// Network-LSA once the adjacency is full.
#[test]
fn test_dr_election_single_eligible() {
    let mut net = topo_broadcast(&[
        ("rt1", ip4!("1.1.1.1"), 1),
        ("rt2", ip4!("2.2.2.2"), 0),
    ]);

    net.advance(Duration::from_secs(30));
    let iface = iface_state(&net, "rt1", "eth0");
    assert_eq!(iface.state, ism::State::Waiting);
    assert_eq!(iface.dr, None);

    net.advance(Duration::from_secs(15));
    let iface = iface_state(&net, "rt1", "eth0");
    assert_eq!(iface.state, ism::State::Dr);
    assert_eq!(iface.dr, Some(ip4!("1.1.1.1")));
    assert_eq!(iface.bdr, None);

    net.advance(Duration::from_secs(60));
    let state = nbr_state(&net, "rt1", "eth0", ip4!("2.2.2.2"));
    assert_eq!(state, Some(nsm::State::Full));
    let lsa = area_lsa(&net, "rt1", LsaType::Network, ip4!("1.1.1.1"));
    assert!(lsa.is_some());
    let lsa = area_lsa(&net, "rt2", LsaType::Network, ip4!("1.1.1.1"));
    assert!(lsa.is_some());
}

// Test description:
//
// Two routers connected by a point-to-point link reach the Full state and end
// up with identical area LSDBs.
#[test]
fn test_p2p_full() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(60));

    let state = nbr_state(&net, "rt1", "eth0", ip4!("2.2.2.2"));
    assert_eq!(state, Some(nsm::State::Full));
    let state = nbr_state(&net, "rt2", "eth0", ip4!("1.1.1.1"));
    assert_eq!(state, Some(nsm::State::Full));

    assert_eq!(area_lsdb(&net, "rt1"), area_lsdb(&net, "rt2"));

    // Both Router-LSAs are present.
    for adv_rtr in [ip4!("1.1.1.1"), ip4!("2.2.2.2")] {
        let lsa = area_lsa(&net, "rt1", LsaType::Router, adv_rtr);
        assert!(lsa.is_some());
    }

    // Nothing is left to be retransmitted or requested.
    let iface = iface_state(&net, "rt1", "eth0");
    let nbr = &iface.neighbors[0];
    assert_eq!(nbr.ls_rxmt_count, 0);
    assert_eq!(nbr.ls_request_count, 0);
    assert_eq!(nbr.db_summary_count, 0);
}

// Test description:
//
// rt2 has a smaller interface MTU than rt1, so it rejects every Database
// Description packet sent by rt1. rt2 is the master of the exchange and keeps
// retransmitting its initial packet once per RxmtInterval while the
// adjacency remains in the ExStart state.
#[test]
fn test_dbdesc_rxmt_exstart() {
    let mut net = topo_p2p(1400);
    net.advance(Duration::from_secs(60));

    let state = nbr_state(&net, "rt2", "eth0", ip4!("1.1.1.1"));
    assert_eq!(state, Some(nsm::State::ExStart));

    let is_dbdesc = |packet: &Packet| matches!(packet, Packet::DbDesc(_));
    for _ in 0..2 {
        let count = net.router("rt2").tx_count(is_dbdesc);
        net.advance(Duration::from_secs(5));
        assert_eq!(net.router("rt2").tx_count(is_dbdesc), count + 1);
        let state = nbr_state(&net, "rt2", "eth0", ip4!("1.1.1.1"));
        assert_eq!(state, Some(nsm::State::ExStart));
    }
}

// Test description:
//
// Bringing the link down kills the adjacency on both sides.
#[test]
fn test_link_down() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(60));

    net.set_link_state(0, false);
    let iface = iface_state(&net, "rt1", "eth0");
    assert_eq!(iface.state, ism::State::Down);
    assert!(iface.neighbors.is_empty());
    let iface = iface_state(&net, "rt2", "eth0");
    assert_eq!(iface.state, ism::State::Down);
    assert!(iface.neighbors.is_empty());
}

// Test description:
//
// Two routers on an NBMA network learn about each other only through their
// static neighbor configuration. Every packet is unicast, the Designated
// Router is elected as on a broadcast network, and the adjacency reaches the
// Full state.
#[test]
fn test_nbma_full() {
    let mut net = topo_nbma();

    // Configured neighbors are created as soon as the interface comes up.
    let state = nbr_state(&net, "rt1", "eth0", ip4!("2.2.2.2"));
    assert!(state.is_some());

    net.advance(Duration::from_secs(120));
    for (router, nbr) in [("rt1", ip4!("2.2.2.2")), ("rt2", ip4!("1.1.1.1"))] {
        let iface = iface_state(&net, router, "eth0");
        assert_eq!(iface.dr, Some(ip4!("2.2.2.2")), "{router}");
        assert_eq!(iface.bdr, Some(ip4!("1.1.1.1")), "{router}");
        let state = nbr_state(&net, router, "eth0", nbr);
        assert_eq!(state, Some(nsm::State::Full), "{router}");

        let tx_log = &net.router(router).tx_log;
        assert!(!tx_log.is_empty());
        assert!(tx_log.iter().all(|msg| !msg.dst.is_multicast()));
    }
    assert_eq!(area_lsdb(&net, "rt1"), area_lsdb(&net, "rt2"));
    let lsa = area_lsa(&net, "rt1", LsaType::Network, ip4!("2.2.2.2"));
    assert!(lsa.is_some());
}

// Test description:
//
// A passive interface sends no packets and ignores the Hellos it receives,
// so no adjacency is formed over it. Its prefix is still advertised, and
// reachable from the rest of the area.
#[test]
fn test_passive_interface() {
    let mut net = topo_passive();
    net.advance(Duration::from_secs(60));

    let iface = iface_state(&net, "rt1", "eth1");
    assert_eq!(iface.state, ism::State::Passive);
    assert!(iface.neighbors.is_empty());
    let tx_log = &net.router("rt1").tx_log;
    assert!(tx_log.iter().all(|msg| msg.ifname != "eth1"));
    assert!(iface_state(&net, "rt3", "eth0").neighbors.is_empty());

    // The adjacency over the other interface is unaffected.
    let state = nbr_state(&net, "rt1", "eth0", ip4!("2.2.2.2"));
    assert_eq!(state, Some(nsm::State::Full));

    let route = net.router("rt2").routes.get(&net!("2001:db8:2::/64"));
    assert_eq!(route.unwrap().metric, 20);
    assert!(!net.router("rt3").routes.contains_key(&net!("2001:db8:2::/64")));
}
