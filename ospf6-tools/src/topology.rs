//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::time::Duration;

use ospf6::config::InstanceCfg;
use ospf6::state::InstanceSnapshot;
use ospf6::testing::Network;
use serde::Deserialize;
use tracing::info;

// Description of a simulated network.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Topology {
    pub routers: BTreeMap<String, InstanceCfg>,
    // Each link is a list of (router, interface) pairs.
    pub links: Vec<Vec<(String, String)>>,
    #[serde(default)]
    pub events: Vec<LinkEvent>,
}

// Change of the operational status of a link at a given time.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkEvent {
    // Seconds since the start of the simulation.
    pub time: u64,
    // Index of the link in the topology.
    pub link: usize,
    pub up: bool,
}

// ===== impl Topology =====

impl Topology {
    // Runs the simulation for the given number of seconds and returns the
    // final state of every router.
    pub fn run(self, duration: u64) -> BTreeMap<String, InstanceSnapshot> {
        let mut net = Network::new();
        for (name, config) in self.routers {
            net.add_router(&name, config);
        }
        for ends in &self.links {
            let ends = ends
                .iter()
                .map(|(router, ifname)| (router.as_str(), ifname.as_str()))
                .collect::<Vec<_>>();
            net.add_link(&ends);
        }

        let mut events = self.events;
        events.sort_by_key(|event| event.time);
        for event in events.into_iter().filter(|event| event.time <= duration) {
            let time = Duration::from_secs(event.time);
            net.advance(time.saturating_sub(net.now()));
            if event.link >= net.links.len() {
                continue;
            }
            info!(time = %event.time, link = %event.link, up = %event.up,
                "link event");
            net.set_link_state(event.link, event.up);
        }

        let end = Duration::from_secs(duration);
        net.advance(end.saturating_sub(net.now()));

        net.routers
            .iter()
            .map(|(name, router)| (name.clone(), router.instance.snapshot()))
            .collect()
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_broadcast_topology() {
        let data = include_str!("../topologies/broadcast.json");
        let topology: Topology = serde_json::from_str(data).unwrap();
        let snapshots = topology.run(120);
        assert_eq!(snapshots.len(), 3);
        for snapshot in snapshots.values() {
            let iface = &snapshot.areas[0].interfaces[0];
            assert_eq!(iface.dr, Some(Ipv4Addr::new(2, 2, 2, 2)));
            assert_eq!(iface.bdr, Some(Ipv4Addr::new(1, 1, 1, 1)));
        }
    }

    #[test]
    fn test_abr_topology() {
        let data = include_str!("../topologies/abr.json");
        let topology: Topology = serde_json::from_str(data).unwrap();
        assert_eq!(topology.links.len(), 2);
        assert_eq!(topology.events.len(), 2);
        let snapshots = topology.run(300);
        let rib = &snapshots["rt3"].rib;
        assert!(
            rib.keys()
                .any(|prefix| prefix.to_string() == "2001:db8:1::/64")
        );
    }
}
