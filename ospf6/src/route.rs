//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, btree_map};
use std::net::{Ipv4Addr, Ipv6Addr};

use derive_new::new;
use ipnetwork::IpNetwork;
use ospf6_utils::ip::IpNetworkExt;
use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::debug::Debug;
use crate::instance::{InstanceArenas, InstanceUpView};
use crate::lsdb::{self, LSA_INFINITY};
use crate::packet::Options;
use crate::packet::lsa::{LsaKey, LsaRouterFlags, LsaType, PrefixOptions};
use crate::spf::VertexId;
use crate::tasks::messages::ProtocolOutputMsg;
use crate::tasks::messages::output::RouteTableMsg;

// Network routing table entry.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouteNet {
    pub area_id: Ipv4Addr,
    pub origin: LsaKey,
    pub path_type: PathType,
    pub metric: u32,
    pub nexthops: Nexthops,
}

// Router routing table entry.
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouteRtr {
    pub area_id: Ipv4Addr,
    pub path_type: PathType,
    pub options: Options,
    pub flags: LsaRouterFlags,
    pub metric: u32,
    pub nexthops: Nexthops,
}

// OSPF path types in decreasing order of preference.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathType {
    IntraArea,
    InterArea,
}

// Route nexthop.
#[derive(Clone, Copy, Debug, Eq, new, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Nexthop {
    // Nexthop interface.
    pub ifindex: u32,
    // Nexthop address (`None` for connected routes).
    pub addr: Option<Ipv6Addr>,
    // Router-ID of the remote neighbor (`None` for connected routes).
    pub adv_rtr: Option<Ipv4Addr>,
}

// Ordered set of nexthops.
pub type Nexthops = BTreeSet<Nexthop>;

// ===== impl RouteRtr =====

impl RouteRtr {
    pub(crate) fn is_abr(&self) -> bool {
        self.flags.contains(LsaRouterFlags::B)
    }
}

// ===== global functions =====

// Rebuilds the routing table using the shortest-path trees of all areas and
// the Inter-Area-Prefix-LSAs received from the area border routers.
pub(crate) fn update_rib(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let router_id = instance.state.router_id;

    // Compute intra-area routes.
    let mut rib = BTreeMap::new();
    for area in arenas.areas.iter_mut() {
        let routes = update_rib_intra_area(area, router_id);
        for (prefix, route) in &routes {
            route_update(&mut rib, *prefix, route.clone());
        }
        area.state.routes = routes;
    }

    // Compute inter-area routes.
    //
    // Area border routers only examine the summaries of the backbone.
    let active_areas = arenas.areas.active_count(&arenas.interfaces);
    for area in arenas
        .areas
        .iter()
        .filter(|area| active_areas <= 1 || area.is_backbone())
    {
        update_rib_inter_area(area, router_id, &mut rib);
    }

    Debug::RibUpdate(rib.len()).log();
    instance.state.rib = rib.clone();

    // Notify the external RIB of the new routing table.
    let msg = ProtocolOutputMsg::RouteTable(RouteTableMsg { routes: rib });
    let _ = instance.tx.protocol_output.send(msg);

    // Update the summaries advertised into the attached areas.
    lsdb::lsa_orig_inter_area(instance, arenas);
}

// ===== helper functions =====

// Computes the intra-area routes of the given area, using the prefixes
// advertised in the Intra-Area-Prefix-LSAs that reference the vertices of the
// shortest-path tree.
fn update_rib_intra_area(
    area: &Area,
    router_id: Ipv4Addr,
) -> BTreeMap<IpNetwork, RouteNet> {
    let mut routes = BTreeMap::new();

    for lsa in area
        .state
        .lsdb
        .iter_by_type(LsaType::IntraAreaPrefix)
        .map(|lse| &lse.data)
        .filter(|lsa| !lsa.hdr.is_maxage())
    {
        let Some(lsa_body) = lsa.body.as_intra_area_prefix() else {
            continue;
        };
        if lsa_body.ref_adv_rtr != lsa.hdr.adv_rtr {
            continue;
        }

        // Find the referenced vertex.
        let vertex_id = match lsa_body.ref_lsa_type {
            LsaType::Router if lsa_body.ref_lsa_id.is_unspecified() => {
                VertexId::Router {
                    router_id: lsa_body.ref_adv_rtr,
                }
            }
            LsaType::Network => VertexId::Network {
                router_id: lsa_body.ref_adv_rtr,
                iface_id: lsa_body.ref_lsa_id.into(),
            },
            _ => continue,
        };
        let Some(vertex) = area.state.spt.get(&vertex_id) else {
            continue;
        };

        // The prefixes of the root are only used when this router is an
        // area border router or an AS boundary router.
        if vertex_id == (VertexId::Router { router_id }) {
            let is_border = vertex
                .lsa
                .as_router()
                .and_then(|lsas| lsas.first())
                .and_then(|lsa| lsa.body.as_router())
                .is_some_and(|lsa_body| {
                    lsa_body
                        .flags
                        .intersects(LsaRouterFlags::B | LsaRouterFlags::E)
                });
            if !is_border {
                continue;
            }
        }

        for prefix in lsa_body
            .prefixes
            .iter()
            .filter(|prefix| !prefix.options.contains(PrefixOptions::NU))
        {
            let route = RouteNet {
                area_id: area.area_id,
                origin: lsa.hdr.key(),
                path_type: PathType::IntraArea,
                metric: vertex.distance + u32::from(prefix.metric),
                nexthops: vertex.nexthops.clone(),
            };
            let dest = prefix.value.apply_mask();

            match vertex_id {
                VertexId::Network { .. } => {
                    route_update_network(&mut routes, dest, route);
                }
                VertexId::Router { .. } => {
                    route_update(&mut routes, dest, route);
                }
            }
        }
    }

    routes
}

// Computes the inter-area routes described by the Inter-Area-Prefix-LSAs of
// the given area.
fn update_rib_inter_area(
    area: &Area,
    router_id: Ipv4Addr,
    rib: &mut BTreeMap<IpNetwork, RouteNet>,
) {
    for lsa in area
        .state
        .lsdb
        .iter_by_type(LsaType::InterAreaPrefix)
        .map(|lse| &lse.data)
        // Skip self-originated and MaxAge LSAs.
        .filter(|lsa| !lsa.hdr.is_maxage() && lsa.hdr.adv_rtr != router_id)
    {
        let Some(lsa_body) = lsa.body.as_inter_area_prefix() else {
            continue;
        };
        if lsa_body.metric >= LSA_INFINITY
            || lsa_body.prefix_options.contains(PrefixOptions::NU)
        {
            continue;
        }
        let prefix = lsa_body.prefix.apply_mask();

        // Skip prefixes already covered by an intra-area route.
        if rib.iter().any(|(dest, route)| {
            route.path_type == PathType::IntraArea
                && dest.is_supernet_of(&prefix)
        }) {
            continue;
        }

        // Look up the routing table entry of the advertising border router.
        let Some(route_br) = area
            .state
            .routers
            .get(&lsa.hdr.adv_rtr)
            .filter(|route_br| route_br.is_abr())
        else {
            Debug::SpfUnreachableAbr(&prefix, lsa.hdr.adv_rtr).log();
            continue;
        };

        let route = RouteNet {
            area_id: area.area_id,
            origin: lsa.hdr.key(),
            path_type: PathType::InterArea,
            metric: lsa_body.metric + route_br.metric,
            nexthops: route_br.nexthops.clone(),
        };
        route_update(rib, prefix, route);
    }
}

// Adds the given route to the routing table, keeping the best path:
// equal-cost paths of the same type have their nexthops merged.
fn route_update(
    rib: &mut BTreeMap<IpNetwork, RouteNet>,
    prefix: IpNetwork,
    route: RouteNet,
) {
    match rib.entry(prefix) {
        btree_map::Entry::Vacant(v) => {
            v.insert(route);
        }
        btree_map::Entry::Occupied(mut o) => {
            let curr_route = o.get_mut();
            match route_cmp(&route, curr_route) {
                Ordering::Less => {
                    *curr_route = route;
                }
                Ordering::Equal => {
                    curr_route.nexthops.extend(route.nexthops);
                }
                Ordering::Greater => {}
            }
        }
    }
}

// Adds a route learned from a transit network. On equal cost, the route
// whose origin has the lowest Link State ID wins.
fn route_update_network(
    routes: &mut BTreeMap<IpNetwork, RouteNet>,
    prefix: IpNetwork,
    route: RouteNet,
) {
    match routes.entry(prefix) {
        btree_map::Entry::Vacant(v) => {
            v.insert(route);
        }
        btree_map::Entry::Occupied(mut o) => {
            let curr_route = o.get_mut();
            let replace = match route.metric.cmp(&curr_route.metric) {
                Ordering::Less => true,
                Ordering::Equal => {
                    route.origin.lsa_id < curr_route.origin.lsa_id
                }
                Ordering::Greater => false,
            };
            if replace {
                *curr_route = route;
            }
        }
    }
}

fn route_cmp(a: &RouteNet, b: &RouteNet) -> Ordering {
    a.path_type
        .cmp(&b.path_type)
        .then_with(|| a.metric.cmp(&b.metric))
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn route(metric: u32, lsa_id: &str, nexthop_ifindex: u32) -> RouteNet {
        RouteNet {
            area_id: Ipv4Addr::UNSPECIFIED,
            origin: LsaKey::new(
                LsaType::IntraAreaPrefix,
                Ipv4Addr::from_str("1.1.1.1").unwrap(),
                Ipv4Addr::from_str(lsa_id).unwrap(),
            ),
            path_type: PathType::IntraArea,
            metric,
            nexthops: [Nexthop::new(nexthop_ifindex, None, None)].into(),
        }
    }

    #[test]
    fn test_route_update() {
        let prefix = IpNetwork::from_str("2001:db8::/64").unwrap();
        let mut rib = BTreeMap::new();

        route_update(&mut rib, prefix, route(20, "0.0.0.0", 1));
        // Equal cost: nexthops are merged.
        route_update(&mut rib, prefix, route(20, "0.0.0.0", 2));
        assert_eq!(rib[&prefix].nexthops.len(), 2);
        // Higher cost: ignored.
        route_update(&mut rib, prefix, route(30, "0.0.0.0", 3));
        assert_eq!(rib[&prefix].metric, 20);
        // Lower cost: replaced.
        route_update(&mut rib, prefix, route(10, "0.0.0.0", 4));
        assert_eq!(rib[&prefix].metric, 10);
        assert_eq!(rib[&prefix].nexthops.len(), 1);
    }

    #[test]
    fn test_route_update_network() {
        let prefix = IpNetwork::from_str("2001:db8::/64").unwrap();
        let mut routes = BTreeMap::new();

        route_update_network(&mut routes, prefix, route(10, "0.0.0.5", 1));
        route_update_network(&mut routes, prefix, route(10, "0.0.0.3", 2));
        assert_eq!(
            routes[&prefix].origin.lsa_id,
            Ipv4Addr::from_str("0.0.0.3").unwrap()
        );
        route_update_network(&mut routes, prefix, route(10, "0.0.0.4", 3));
        assert_eq!(
            routes[&prefix].origin.lsa_id,
            Ipv4Addr::from_str("0.0.0.3").unwrap()
        );
        route_update_network(&mut routes, prefix, route(5, "0.0.0.9", 4));
        assert_eq!(routes[&prefix].metric, 5);
    }
}
