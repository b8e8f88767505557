//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};

use const_addrs::{ip4, ip6, net};
use ospf6::config::{
    AreaCfg, AreaRangeCfg, InstanceCfg, InterfaceCfg, StaticNbrCfg,
};
use ospf6::interface::InterfaceType;
use ospf6::neighbor::nsm;
use ospf6::packet::lsa::{LsaHdr, LsaKey, LsaType};
use ospf6::state::InterfaceSnapshot;
use ospf6::testing::Network;

//
// Helper functions.
//

pub(crate) fn iface_cfg(
    name: &str,
    ifindex: u32,
    if_type: InterfaceType,
    linklocal: Ipv6Addr,
) -> InterfaceCfg {
    let mut config = InterfaceCfg::new(name, ifindex, if_type);
    config.link_local = Some(linklocal);
    config
}

pub(crate) fn area_cfg(
    area_id: Ipv4Addr,
    interfaces: Vec<InterfaceCfg>,
) -> AreaCfg {
    let mut config = AreaCfg::new(area_id);
    config.interfaces = interfaces;
    config
}

pub(crate) fn instance_cfg(
    router_id: Ipv4Addr,
    areas: Vec<AreaCfg>,
) -> InstanceCfg {
    InstanceCfg {
        router_id,
        af: Default::default(),
        spf_delay: 0,
        areas,
    }
}

pub(crate) fn iface_state(
    net: &Network,
    router: &str,
    ifname: &str,
) -> InterfaceSnapshot {
    net.router(router)
        .instance
        .snapshot()
        .areas
        .into_iter()
        .flat_map(|area| area.interfaces)
        .find(|iface| iface.name == ifname)
        .unwrap()
}

pub(crate) fn nbr_state(
    net: &Network,
    router: &str,
    ifname: &str,
    nbr_router_id: Ipv4Addr,
) -> Option<nsm::State> {
    iface_state(net, router, ifname)
        .neighbors
        .into_iter()
        .find(|nbr| nbr.router_id == nbr_router_id)
        .map(|nbr| nbr.state)
}

// Returns the header of the given LSA as present in the first area of the
// router.
pub(crate) fn area_lsa(
    net: &Network,
    router: &str,
    lsa_type: LsaType,
    adv_rtr: Ipv4Addr,
) -> Option<LsaHdr> {
    net.router(router)
        .instance
        .snapshot()
        .areas
        .into_iter()
        .next()
        .unwrap()
        .lsdb
        .into_iter()
        .find(|hdr| hdr.lsa_type == lsa_type && hdr.adv_rtr == adv_rtr)
}

// Returns the key and sequence number of all LSAs present in the first area
// of the router.
pub(crate) fn area_lsdb(net: &Network, router: &str) -> Vec<(LsaKey, u32)> {
    net.router(router).instance.snapshot().areas[0]
        .lsdb
        .iter()
        .map(|hdr| (hdr.key(), hdr.seq_no))
        .collect()
}

//
// Topologies.
//

// Two routers connected by a point-to-point link.
//
//  rt1 (1.1.1.1) eth0 ------ eth0 rt2 (2.2.2.2)
pub(crate) fn topo_p2p(rt2_mtu: u16) -> Network {
    let mut net = Network::new();

    let mut rt1_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::1"));
    rt1_eth0.prefixes = vec![net!("2001:db8:1::1/64")];
    let mut rt2_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::2"));
    rt2_eth0.mtu = rt2_mtu;

    net.add_router(
        "rt1",
        instance_cfg(
            ip4!("1.1.1.1"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt1_eth0])],
        ),
    );
    net.add_router(
        "rt2",
        instance_cfg(
            ip4!("2.2.2.2"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt2_eth0])],
        ),
    );
    net.add_link(&[("rt1", "eth0"), ("rt2", "eth0")]);
    net
}

// Routers attached to a single broadcast segment, one per (name, router-id,
// priority) entry.
pub(crate) fn topo_broadcast(routers: &[(&str, Ipv4Addr, u8)]) -> Network {
    let mut net = Network::new();
    let mut ends = vec![];
    for (idx, (name, router_id, priority)) in routers.iter().enumerate() {
        let linklocal = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, idx as u16 + 1);
        let mut eth0 =
            iface_cfg("eth0", 1, InterfaceType::Broadcast, linklocal);
        eth0.priority = *priority;
        net.add_router(
            name,
            instance_cfg(
                *router_id,
                vec![area_cfg(ip4!("0.0.0.0"), vec![eth0])],
            ),
        );
        ends.push((*name, "eth0"));
    }
    net.add_link(&ends);
    net
}

// Three routers in two areas, with rt2 acting as the area border router.
//
//  rt1 (1.1.1.1) eth0 --[area 1]-- eth0 rt2 (2.2.2.2) eth1 --[area 0]-- eth0
//  rt3 (3.3.3.3)
//
// rt1 advertises 2001:db8:1::/64 on its area 1 interface.
pub(crate) fn topo_abr() -> Network {
    topo_abr_ranges(vec![])
}

// Same as `topo_abr`, with the given address ranges configured for area 1
// on the ABR.
pub(crate) fn topo_abr_ranges(ranges: Vec<AreaRangeCfg>) -> Network {
    let mut net = Network::new();

    let mut rt1_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::1"));
    rt1_eth0.prefixes = vec![net!("2001:db8:1::1/64")];
    let rt2_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::2"));
    let rt2_eth1 =
        iface_cfg("eth1", 2, InterfaceType::PointToPoint, ip6!("fe80::3"));
    let rt3_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::4"));
    let mut rt2_area1 = area_cfg(ip4!("0.0.0.1"), vec![rt2_eth0]);
    rt2_area1.ranges = ranges;

    net.add_router(
        "rt1",
        instance_cfg(
            ip4!("1.1.1.1"),
            vec![area_cfg(ip4!("0.0.0.1"), vec![rt1_eth0])],
        ),
    );
    net.add_router(
        "rt2",
        instance_cfg(
            ip4!("2.2.2.2"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt2_eth1]), rt2_area1],
        ),
    );
    net.add_router(
        "rt3",
        instance_cfg(
            ip4!("3.3.3.3"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt3_eth0])],
        ),
    );
    net.add_link(&[("rt1", "eth0"), ("rt2", "eth0")]);
    net.add_link(&[("rt2", "eth1"), ("rt3", "eth0")]);
    net
}

// Two routers connected by an NBMA network, each configured with the other
// as a static neighbor.
//
//  rt1 (1.1.1.1) eth0 ------ eth0 rt2 (2.2.2.2)
pub(crate) fn topo_nbma() -> Network {
    let mut net = Network::new();
    let routers = [
        ("rt1", ip4!("1.1.1.1"), ip6!("fe80::1"), ip4!("2.2.2.2")),
        ("rt2", ip4!("2.2.2.2"), ip6!("fe80::2"), ip4!("1.1.1.1")),
    ];
    for (name, router_id, linklocal, peer) in routers {
        let peer_addr = routers
            .iter()
            .find(|(_, router_id, ..)| *router_id == peer)
            .map(|(_, _, addr, _)| *addr)
            .unwrap();
        let mut eth0 = iface_cfg("eth0", 1, InterfaceType::Nbma, linklocal);
        eth0.static_nbrs = vec![StaticNbrCfg {
            router_id: peer,
            addr: peer_addr,
            priority: 1,
        }];
        net.add_router(
            name,
            instance_cfg(
                router_id,
                vec![area_cfg(ip4!("0.0.0.0"), vec![eth0])],
            ),
        );
    }
    net.add_link(&[("rt1", "eth0"), ("rt2", "eth0")]);
    net
}

// rt1 is connected to rt2 by a point-to-point link, and has a passive
// interface attached to a segment shared with rt3.
//
//  rt2 (2.2.2.2) eth0 ------ eth0 rt1 (1.1.1.1) eth1 ------ eth0
//  rt3 (3.3.3.3)
//
// The passive interface advertises 2001:db8:2::/64.
pub(crate) fn topo_passive() -> Network {
    let mut net = Network::new();

    let rt1_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::1"));
    let mut rt1_eth1 =
        iface_cfg("eth1", 2, InterfaceType::Broadcast, ip6!("fe80::11"));
    rt1_eth1.passive = true;
    rt1_eth1.prefixes = vec![net!("2001:db8:2::1/64")];
    let rt2_eth0 =
        iface_cfg("eth0", 1, InterfaceType::PointToPoint, ip6!("fe80::2"));
    let rt3_eth0 =
        iface_cfg("eth0", 1, InterfaceType::Broadcast, ip6!("fe80::13"));

    net.add_router(
        "rt1",
        instance_cfg(
            ip4!("1.1.1.1"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt1_eth0, rt1_eth1])],
        ),
    );
    net.add_router(
        "rt2",
        instance_cfg(
            ip4!("2.2.2.2"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt2_eth0])],
        ),
    );
    net.add_router(
        "rt3",
        instance_cfg(
            ip4!("3.3.3.3"),
            vec![area_cfg(ip4!("0.0.0.0"), vec![rt3_eth0])],
        ),
    );
    net.add_link(&[("rt1", "eth0"), ("rt2", "eth0")]);
    net.add_link(&[("rt1", "eth1"), ("rt3", "eth0")]);
    net
}
