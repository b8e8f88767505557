//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use const_addrs::{ip4, ip6, net};
use ipnetwork::IpNetwork;
use maplit::btreeset;
use ospf6::config::AreaRangeCfg;
use ospf6::packet::lsa::LsaType;
use ospf6::route::{Nexthop, PathType};
use ospf6::testing::Network;

use crate::topologies::{topo_abr, topo_abr_ranges, topo_p2p};

// Test description:
//
// rt2 learns the prefix advertised by rt1 over the point-to-point link. The
// route cost is the link cost plus the prefix metric, and the nexthop is
// rt1's link-local address taken from its Link-LSA.
#[test]
fn test_intra_area_route() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(60));

    let routes = &net.router("rt2").routes;
    let route = routes.get(&net!("2001:db8:1::/64")).unwrap();
    assert_eq!(route.path_type, PathType::IntraArea);
    assert_eq!(route.area_id, ip4!("0.0.0.0"));
    assert_eq!(route.metric, 20);
    assert_eq!(
        route.nexthops,
        btreeset![Nexthop::new(1, Some(ip6!("fe80::1")), Some(ip4!("1.1.1.1")))]
    );

    // rt1 doesn't install a route for its own prefix.
    assert!(net.router("rt1").routes.is_empty());
}

// Test description:
//
// rt2 is an area border router and summarizes the prefix of area 1 into the
// backbone. rt3 computes the inter-area route adding the advertised metric to
// its own cost to reach rt2, reusing the nexthops of rt2's router entry.
#[test]
fn test_inter_area_route() {
    let mut net = topo_abr();
    net.advance(Duration::from_secs(100));
    let prefix = net!("2001:db8:1::/64");

    // The ABR has an intra-area route to the prefix.
    let route = net.router("rt2").routes.get(&prefix).unwrap();
    assert_eq!(route.path_type, PathType::IntraArea);
    assert_eq!(route.area_id, ip4!("0.0.0.1"));
    assert_eq!(route.metric, 20);

    let rt3 = &net.router("rt3").instance;
    let area = rt3.arenas.areas.iter().next().unwrap();

    // Summary originated by the ABR.
    let summary = area
        .state
        .lsdb
        .iter_by_type(LsaType::InterAreaPrefix)
        .filter_map(|lse| {
            let body = lse.data.body.as_inter_area_prefix()?;
            (lse.data.hdr.adv_rtr == ip4!("2.2.2.2") && body.prefix == prefix)
                .then_some(body.metric)
        })
        .next()
        .unwrap();
    assert_eq!(summary, 20);

    // Router entry of the ABR.
    let abr = area.state.routers.get(&ip4!("2.2.2.2")).unwrap();
    assert_eq!(abr.metric, 10);
    assert!(!abr.nexthops.is_empty());

    let route = net.router("rt3").routes.get(&prefix).unwrap();
    assert_eq!(route.path_type, PathType::InterArea);
    assert_eq!(route.metric, summary + abr.metric);
    assert_eq!(route.nexthops, abr.nexthops);
    assert_eq!(
        route.nexthops,
        btreeset![Nexthop::new(1, Some(ip6!("fe80::3")), Some(ip4!("2.2.2.2")))]
    );
}

// Test description:
//
// When the area 1 link goes down the ABR withdraws its summary and rt3
// removes the inter-area route.
#[test]
fn test_inter_area_route_withdraw() {
    let mut net = topo_abr();
    net.advance(Duration::from_secs(100));
    let prefix = net!("2001:db8:1::/64");
    assert!(net.router("rt3").routes.contains_key(&prefix));

    net.set_link_state(0, false);
    net.advance(Duration::from_secs(10));
    assert!(!net.router("rt2").routes.contains_key(&prefix));
    assert!(!net.router("rt3").routes.contains_key(&prefix));
}

// Test description:
//
// The summary withdrawn by the ABR has the same sequence number and length
// as the copy rt3 holds, so only its MaxAge marks it as more recent. rt3
// must accept the flushed instance instead of treating it as a duplicate,
// and both routers drop it once it has been acknowledged.
#[test]
fn test_inter_area_summary_flush() {
    let mut net = topo_abr();
    net.advance(Duration::from_secs(100));
    let prefix = net!("2001:db8:1::/64");
    let (seq_no, maxage) = summary(&net, "rt3", prefix).unwrap();
    assert!(!maxage);

    // Right after the withdrawal, rt3 holds the flushed instance.
    net.set_link_state(0, false);
    net.deliver();
    let (flushed_seq_no, maxage) = summary(&net, "rt3", prefix).unwrap();
    assert!(maxage);
    assert_eq!(flushed_seq_no, seq_no);

    // The flushed instance is gone everywhere after the next aging pass.
    net.advance(Duration::from_secs(10));
    assert_eq!(summary(&net, "rt2", prefix), None);
    assert_eq!(summary(&net, "rt3", prefix), None);
    assert!(!net.router("rt3").routes.contains_key(&prefix));
}

// Test description:
//
// With an address range configured for area 1, the ABR advertises the range
// into the backbone instead of the individual networks it contains.
#[test]
fn test_area_range_summary() {
    let range = AreaRangeCfg::new(net!("2001:db8::/32"));
    let mut net = topo_abr_ranges(vec![range]);
    net.advance(Duration::from_secs(100));

    // The ABR still has the intra-area route to the summarized network.
    let route = net.router("rt2").routes.get(&net!("2001:db8:1::/64"));
    assert_eq!(route.unwrap().path_type, PathType::IntraArea);

    // rt3 only learns the range. Its cost is the highest cost among the
    // summarized networks.
    let routes = &net.router("rt3").routes;
    assert!(!routes.contains_key(&net!("2001:db8:1::/64")));
    let route = routes.get(&net!("2001:db8::/32")).unwrap();
    assert_eq!(route.path_type, PathType::InterArea);
    assert_eq!(route.metric, 20 + 10);
    assert_eq!(summary(&net, "rt3", net!("2001:db8:1::/64")), None);
    assert!(summary(&net, "rt3", net!("2001:db8::/32")).is_some());

    // The range is withdrawn once it no longer has active networks.
    net.set_link_state(0, false);
    net.advance(Duration::from_secs(10));
    assert!(!net.router("rt3").routes.contains_key(&net!("2001:db8::/32")));
}

// Test description:
//
// A range configured with a fixed cost is advertised with that cost, and a
// range that isn't advertised hides the networks it contains.
#[test]
fn test_area_range_cost_suppress() {
    let mut range = AreaRangeCfg::new(net!("2001:db8::/32"));
    range.cost = Some(100);
    let mut net = topo_abr_ranges(vec![range]);
    net.advance(Duration::from_secs(100));
    let route = net.router("rt3").routes.get(&net!("2001:db8::/32"));
    assert_eq!(route.unwrap().metric, 100 + 10);

    let mut range = AreaRangeCfg::new(net!("2001:db8::/32"));
    range.advertise = false;
    let mut net = topo_abr_ranges(vec![range]);
    net.advance(Duration::from_secs(100));
    let routes = &net.router("rt3").routes;
    assert!(!routes.contains_key(&net!("2001:db8::/32")));
    assert!(!routes.contains_key(&net!("2001:db8:1::/64")));
    assert!(net.router("rt2").routes.contains_key(&net!("2001:db8:1::/64")));
}

// Test description:
//
// The operational state snapshot serializes to JSON using kebab-case field
// names, with the routing table keyed by prefix.
#[test]
fn test_snapshot_json() {
    let mut net = topo_p2p(1500);
    net.advance(Duration::from_secs(60));

    let snapshot = net.router("rt2").instance.snapshot();
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["router-id"], "2.2.2.2");
    assert_eq!(value["active"], true);
    let iface = &value["areas"][0]["interfaces"][0];
    assert_eq!(iface["name"], "eth0");
    assert_eq!(iface["state"], "PointToPoint");
    assert_eq!(iface["neighbors"][0]["router-id"], "1.1.1.1");
    assert_eq!(iface["neighbors"][0]["state"], "Full");
    assert_eq!(value["rib"]["2001:db8:1::/64"]["metric"], 20);
}

//
// Helper functions.
//

// Returns the sequence number and MaxAge status of the backbone summary for
// the given prefix, as originated by rt2.
fn summary(
    net: &Network,
    router: &str,
    prefix: IpNetwork,
) -> Option<(u32, bool)> {
    let instance = &net.router(router).instance;
    let area = instance
        .arenas
        .areas
        .iter()
        .find(|area| area.area_id == ip4!("0.0.0.0"))?;
    area.state
        .lsdb
        .iter_by_type_advrtr(LsaType::InterAreaPrefix, ip4!("2.2.2.2"))
        .find(|lse| {
            lse.data
                .body
                .as_inter_area_prefix()
                .is_some_and(|body| body.prefix == prefix)
        })
        .map(|lse| (lse.data.hdr.seq_no, lse.data.hdr.is_maxage()))
}
