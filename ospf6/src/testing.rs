//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, VecDeque};
use std::net::Ipv6Addr;
use std::time::Duration;

use ipnetwork::IpNetwork;
use ospf6_utils::southbound::{AddressMsg, InterfaceFlags, InterfaceUpdateMsg};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

use crate::config::InstanceCfg;
use crate::instance::Instance;
use crate::interface::Interface;
use crate::packet::Packet;
use crate::route::RouteNet;
use crate::tasks::messages::input::NetRxPacketMsg;
use crate::tasks::messages::output::NetTxPacketMsg;
use crate::tasks::messages::{ProtocolInputMsg, ProtocolOutputMsg};

// Simulated router.
#[derive(Debug)]
pub struct Router {
    pub instance: Instance,
    // Instance output channel.
    output: UnboundedReceiver<ProtocolOutputMsg>,
    // Last routing table announced by the instance.
    pub routes: BTreeMap<IpNetwork, RouteNet>,
    // Packets sent by the instance, in transmission order.
    pub tx_log: Vec<NetTxPacketMsg>,
}

// Endpoint of a simulated link.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct LinkEnd {
    pub router: String,
    pub ifname: String,
}

// Simulated multi-access link.
#[derive(Clone, Debug)]
pub struct Link {
    pub ends: Vec<LinkEnd>,
    pub up: bool,
}

// Virtual network of OSPFv3 routers sharing a single simulated clock.
//
// Packets are delivered instantly and in transmission order. Timers only fire
// when the clock is moved forward using [`Network::advance`].
#[derive(Debug, Default)]
pub struct Network {
    pub routers: BTreeMap<String, Router>,
    pub links: Vec<Link>,
    now: Duration,
}

// ===== impl Router =====

impl Router {
    pub fn iface(&self, ifname: &str) -> Option<&Interface> {
        let arenas = &self.instance.arenas;
        arenas.areas.iter().find_map(|area| {
            area.interfaces
                .get_by_name(&arenas.interfaces, ifname)
                .map(|(_, iface)| iface)
        })
    }

    // Returns the number of packets of the given type sent by the router.
    pub fn tx_count(&self, filter: impl Fn(&Packet) -> bool) -> usize {
        self.tx_log.iter().filter(|msg| filter(&msg.packet)).count()
    }

    fn drain_output(&mut self) -> Vec<NetTxPacketMsg> {
        let mut packets = vec![];
        while let Ok(msg) = self.output.try_recv() {
            match msg {
                ProtocolOutputMsg::NetTxPacket(msg) => {
                    self.tx_log.push(msg.clone());
                    packets.push(msg);
                }
                ProtocolOutputMsg::RouteTable(msg) => {
                    self.routes = msg.routes;
                }
                ProtocolOutputMsg::JoinGroup(_)
                | ProtocolOutputMsg::LeaveGroup(_) => (),
            }
        }
        packets
    }
}

// ===== impl Network =====

impl Network {
    pub fn new() -> Network {
        Default::default()
    }

    // Returns the current value of the simulated clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    // Creates and starts a new router.
    pub fn add_router(&mut self, name: &str, config: InstanceCfg) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut instance = Instance::new(name, config, tx);
        instance.advance_clock(self.now);
        instance.start();
        let router = Router {
            instance,
            output: rx,
            routes: Default::default(),
            tx_log: vec![],
        };
        self.routers.insert(name.to_owned(), router);
        self.deliver();
    }

    pub fn router(&self, name: &str) -> &Router {
        &self.routers[name]
    }

    pub fn router_mut(&mut self, name: &str) -> &mut Router {
        self.routers.get_mut(name).unwrap()
    }

    // Connects the given router interfaces and reports them as operational.
    //
    // Returns the link index.
    pub fn add_link(&mut self, ends: &[(&str, &str)]) -> usize {
        let ends = ends
            .iter()
            .map(|(router, ifname)| LinkEnd {
                router: (*router).to_owned(),
                ifname: (*ifname).to_owned(),
            })
            .collect::<Vec<_>>();
        self.links.push(Link { ends, up: false });
        let link_idx = self.links.len() - 1;
        self.set_link_state(link_idx, true);
        link_idx
    }

    // Changes the operational status of all interfaces attached to a link.
    pub fn set_link_state(&mut self, link_idx: usize, up: bool) {
        self.links[link_idx].up = up;
        let ends = self.links[link_idx].ends.clone();
        for end in ends {
            let mut flags = InterfaceFlags::BROADCAST;
            if up {
                flags.insert(InterfaceFlags::OPERATIVE);
            }
            let router = self.router_mut(&end.router);
            let Some((ifindex, mtu)) = router
                .iface(&end.ifname)
                .map(|iface| (iface.system.ifindex, iface.system.mtu))
            else {
                continue;
            };
            let msg = ProtocolInputMsg::IfaceUpdate(InterfaceUpdateMsg {
                ifname: end.ifname.clone(),
                ifindex,
                mtu: mtu.unwrap_or(1500),
                flags,
            });
            router.instance.process_msg(msg);
        }
        self.deliver();
    }

    // Adds or removes an address on a router interface.
    pub fn set_address(
        &mut self,
        router: &str,
        ifname: &str,
        addr: IpNetwork,
        add: bool,
    ) {
        let msg = AddressMsg {
            ifname: ifname.to_owned(),
            addr,
        };
        let msg = if add {
            ProtocolInputMsg::AddressAdd(msg)
        } else {
            ProtocolInputMsg::AddressDel(msg)
        };
        self.router_mut(router).instance.process_msg(msg);
        self.deliver();
    }

    // Moves the simulated clock forward, firing all timers that expire in the
    // meantime.
    pub fn advance(&mut self, duration: Duration) {
        let target = self.now + duration;
        loop {
            self.deliver();

            // Find the earliest pending deadline.
            let Some(deadline) = self
                .routers
                .values_mut()
                .filter_map(|router| router.instance.next_deadline())
                .min()
                .filter(|deadline| *deadline <= target)
            else {
                break;
            };

            self.now = deadline.max(self.now);
            for router in self.routers.values_mut() {
                router.instance.advance_clock(self.now);
            }
        }

        self.now = target;
        for router in self.routers.values_mut() {
            router.instance.advance_clock(target);
        }
        self.deliver();
    }

    // Delivers all pending packets, including the ones generated while
    // processing them.
    pub fn deliver(&mut self) {
        let mut queue = VecDeque::new();
        loop {
            for (name, router) in &mut self.routers {
                for msg in router.drain_output() {
                    queue.push_back((name.clone(), msg));
                }
            }
            let Some((name, msg)) = queue.pop_front() else {
                break;
            };
            self.deliver_packet(&name, msg);
        }
    }

    fn deliver_packet(&mut self, src_router: &str, msg: NetTxPacketMsg) {
        let Some(link) = self.links.iter().find(|link| {
            link.up
                && link.ends.iter().any(|end| {
                    end.router == src_router && end.ifname == msg.ifname
                })
        }) else {
            return;
        };

        for end in link.ends.clone() {
            if end.router == src_router {
                continue;
            }
            let Some(router) = self.routers.get_mut(&end.router) else {
                continue;
            };
            let Some(iface) = router.iface(&end.ifname) else {
                continue;
            };

            // Unicast packets are only accepted by their destination.
            if !msg.dst.is_multicast()
                && iface.system.linklocal != Some(msg.dst)
            {
                continue;
            }

            debug!(
                src = %src_router, dst = %end.router, ifname = %end.ifname,
                "delivering packet"
            );
            let rx_msg = ProtocolInputMsg::NetRxPacket(NetRxPacketMsg {
                ifindex: iface.system.ifindex,
                src: msg.src.unwrap_or(Ipv6Addr::UNSPECIFIED),
                dst: msg.dst,
                packet: msg.packet.clone(),
            });
            router.instance.process_msg(rx_msg);
        }
    }
}
