//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::hint::black_box;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use ipnetwork::IpNetwork;
use ospf6::config::{AreaCfg, InstanceCfg, InterfaceCfg};
use ospf6::interface::InterfaceType;
use ospf6::testing::Network;

// Builds a ring of point-to-point links, with one stub prefix per router.
fn ring(size: u8) -> Network {
    let mut net = Network::new();
    for idx in 0..size {
        let mut ifaces = vec![];
        for (ifindex, ifname) in [(1, "eth0"), (2, "eth1")] {
            let mut iface =
                InterfaceCfg::new(ifname, ifindex, InterfaceType::PointToPoint);
            iface.link_local = Some(Ipv6Addr::new(
                0xfe80,
                0,
                0,
                0,
                0,
                0,
                idx.into(),
                ifindex as u16,
            ));
            ifaces.push(iface);
        }
        let prefix = Ipv6Addr::new(0x2001, 0xdb8, idx.into(), 0, 0, 0, 0, 1);
        ifaces[0].prefixes = vec![IpNetwork::new(prefix.into(), 64).unwrap()];

        let mut area = AreaCfg::new(Ipv4Addr::UNSPECIFIED);
        area.interfaces = ifaces;
        let config = InstanceCfg {
            router_id: Ipv4Addr::new(idx + 1, idx + 1, idx + 1, idx + 1),
            af: Default::default(),
            spf_delay: 0,
            areas: vec![area],
        };
        net.add_router(&format!("rt{idx}"), config);
    }
    for idx in 0..size {
        let local = format!("rt{idx}");
        let remote = format!("rt{}", (idx + 1) % size);
        net.add_link(&[(local.as_str(), "eth1"), (remote.as_str(), "eth0")]);
    }
    net
}

fn ring_converge(size: u8) {
    let mut net = ring(size);
    net.advance(Duration::from_secs(60));
    black_box(net.router("rt0").routes.len());
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("Ring convergence (8 routers)", |b| {
        b.iter(|| ring_converge(black_box(8)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
