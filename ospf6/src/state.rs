//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::collections::Arena;
use crate::instance::Instance;
use crate::interface::{Interface, ism};
use crate::lsdb::Lsdb;
use crate::neighbor::{Neighbor, nsm};
use crate::packet::lsa::LsaHdr;
use crate::route::{RouteNet, RouteRtr};
use crate::spf::VertexId;

// Operational state of an instance, as exposed to management tools.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceSnapshot {
    pub name: String,
    pub router_id: Ipv4Addr,
    pub active: bool,
    pub areas: Vec<AreaSnapshot>,
    #[serde(default)]
    pub as_lsdb: Vec<LsaHdr>,
    #[serde(default)]
    pub rib: BTreeMap<IpNetwork, RouteNet>,
    pub statistics: InstanceStatistics,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceStatistics {
    pub orig_lsa_count: u32,
    pub rx_lsa_count: u32,
    pub spf_run_count: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AreaSnapshot {
    pub area_id: Ipv4Addr,
    pub interfaces: Vec<InterfaceSnapshot>,
    pub lsdb: Vec<LsaHdr>,
    pub spt: BTreeMap<String, u32>,
    pub routers: BTreeMap<Ipv4Addr, RouteRtr>,
    pub spf_run_count: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceSnapshot {
    pub name: String,
    pub ifindex: u32,
    pub state: ism::State,
    pub dr: Option<Ipv4Addr>,
    pub bdr: Option<Ipv4Addr>,
    pub linklocal: Option<Ipv6Addr>,
    pub neighbors: Vec<NeighborSnapshot>,
    pub lsdb: Vec<LsaHdr>,
    pub event_count: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NeighborSnapshot {
    pub router_id: Ipv4Addr,
    pub addr: Ipv6Addr,
    pub state: nsm::State,
    pub priority: u8,
    pub dr: Option<Ipv4Addr>,
    pub bdr: Option<Ipv4Addr>,
    pub ls_rxmt_count: usize,
    pub ls_request_count: usize,
    pub db_summary_count: usize,
    pub event_count: u32,
}

// ===== impl Instance =====

impl Instance {
    // Returns a snapshot of the instance operational state.
    pub fn snapshot(&self) -> InstanceSnapshot {
        let arenas = &self.arenas;
        let areas = arenas
            .areas
            .iter()
            .map(|area| {
                AreaSnapshot::new(area, &arenas.interfaces, &arenas.neighbors)
            })
            .collect();

        match &self.state {
            Some(state) => InstanceSnapshot {
                name: self.name.clone(),
                router_id: state.router_id,
                active: true,
                areas,
                as_lsdb: lsdb_headers(&state.lsdb),
                rib: state.rib.clone(),
                statistics: InstanceStatistics {
                    orig_lsa_count: state.orig_lsa_count,
                    rx_lsa_count: state.rx_lsa_count,
                    spf_run_count: state.spf_run_count,
                },
            },
            None => InstanceSnapshot {
                name: self.name.clone(),
                router_id: self.config.router_id,
                active: false,
                areas,
                as_lsdb: vec![],
                rib: Default::default(),
                statistics: Default::default(),
            },
        }
    }
}

// ===== impl AreaSnapshot =====

impl AreaSnapshot {
    fn new(
        area: &Area,
        interfaces: &Arena<Interface>,
        neighbors: &Arena<Neighbor>,
    ) -> AreaSnapshot {
        AreaSnapshot {
            area_id: area.area_id,
            interfaces: area
                .interfaces
                .iter(interfaces)
                .map(|iface| InterfaceSnapshot::new(iface, neighbors))
                .collect(),
            lsdb: lsdb_headers(&area.state.lsdb),
            spt: area
                .state
                .spt
                .values()
                .map(|vertex| (vertex_name(&vertex.id), vertex.distance))
                .collect(),
            routers: area.state.routers.clone(),
            spf_run_count: area.state.spf_run_count,
        }
    }
}

// ===== impl InterfaceSnapshot =====

impl InterfaceSnapshot {
    fn new(iface: &Interface, neighbors: &Arena<Neighbor>) -> Self {
        InterfaceSnapshot {
            name: iface.name.clone(),
            ifindex: iface.system.ifindex,
            state: iface.state.ism_state,
            dr: iface.state.dr.map(|dr| dr.router_id),
            bdr: iface.state.bdr.map(|bdr| bdr.router_id),
            linklocal: iface.system.linklocal,
            neighbors: iface
                .state
                .neighbors
                .iter(neighbors)
                .sorted_by_key(|nbr| nbr.router_id)
                .map(NeighborSnapshot::from)
                .collect(),
            lsdb: lsdb_headers(&iface.state.lsdb),
            event_count: iface.state.event_count,
        }
    }
}

// ===== impl NeighborSnapshot =====

impl From<&Neighbor> for NeighborSnapshot {
    fn from(nbr: &Neighbor) -> NeighborSnapshot {
        NeighborSnapshot {
            router_id: nbr.router_id,
            addr: nbr.src,
            state: nbr.state,
            priority: nbr.priority,
            dr: nbr.dr,
            bdr: nbr.bdr,
            ls_rxmt_count: nbr.lists.ls_rxmt.len(),
            ls_request_count: nbr.lists.ls_request.len()
                + nbr.lists.ls_request_pending.len(),
            db_summary_count: nbr.lists.db_summary.len(),
            event_count: nbr.event_count,
        }
    }
}

// ===== helper functions =====

fn lsdb_headers(lsdb: &Lsdb) -> Vec<LsaHdr> {
    lsdb.iter().map(|lse| lse.data.hdr).collect()
}

fn vertex_name(id: &VertexId) -> String {
    match id {
        VertexId::Network {
            router_id,
            iface_id,
        } => format!("network {router_id}/{iface_id}"),
        VertexId::Router { router_id } => format!("router {router_id}"),
    }
}
