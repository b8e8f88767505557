//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use chrono::Utc;
use derive_new::new;
use enum_as_inner::EnumAsInner;
use ospf6_utils::ip::AddressFamily;
use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::collections::Arena;
use crate::debug::Debug;
use crate::error::Error;
use crate::instance::{InstanceArenas, InstanceUpView};
use crate::interface::{Interface, InterfaceType};
use crate::lsdb;
use crate::neighbor::Neighbor;
use crate::packet::Options;
use crate::packet::lsa::{
    Lsa, LsaKey, LsaRouter, LsaRouterLink, LsaRouterLinkType, LsaType,
};
use crate::route::{Nexthop, Nexthops, PathType, RouteRtr};

// Vertex of the shortest-path tree.
//
// Network vertices are ordered before router vertices so that, among
// candidates at the same distance, networks are settled first.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum VertexId {
    Network { router_id: Ipv4Addr, iface_id: u32 },
    Router { router_id: Ipv4Addr },
}

#[derive(Clone, Debug, EnumAsInner, Eq, PartialEq)]
pub enum VertexLsa {
    Network(Arc<Lsa>),
    // All Router-LSAs originated by the same router are processed as an
    // aggregate.
    Router(Vec<Arc<Lsa>>),
}

#[derive(Debug, new)]
pub struct Vertex {
    pub id: VertexId,
    pub lsa: VertexLsa,
    pub distance: u32,
    pub hops: u16,
    pub parent: Option<VertexId>,
    #[new(default)]
    pub nexthops: Nexthops,
}

// Link between two vertices.
#[derive(Debug)]
struct SpfLink {
    // Router-LSA link that originated this edge, if the parent is a router.
    parent_link: Option<LsaRouterLink>,
    id: VertexId,
    lsa: VertexLsa,
    cost: u32,
}

// ===== impl VertexLsa =====

impl VertexLsa {
    // Returns an iterator over all links of a router vertex.
    fn router_links(&self) -> impl Iterator<Item = &LsaRouterLink> {
        self.as_router()
            .into_iter()
            .flatten()
            .filter_map(|lsa| lsa.body.as_router())
            .flat_map(|lsa_body| lsa_body.links.iter())
    }

    fn router_body(&self) -> Option<&LsaRouter> {
        self.as_router()?.first()?.body.as_router()
    }

    pub fn origin(&self) -> Option<LsaKey> {
        match self {
            VertexLsa::Network(lsa) => Some(lsa.hdr.key()),
            VertexLsa::Router(lsas) => lsas.first().map(|lsa| lsa.hdr.key()),
        }
    }

    // Checks whether this vertex's LSA describes a link to the given vertex.
    fn has_link(&self, id: VertexId) -> bool {
        match (self, id) {
            (VertexLsa::Network(lsa), VertexId::Router { router_id }) => lsa
                .body
                .as_network()
                .is_some_and(|lsa_body| {
                    lsa_body.attached_rtrs.contains(&router_id)
                }),
            (VertexLsa::Network(_), VertexId::Network { .. }) => false,
            (VertexLsa::Router(_), VertexId::Router { router_id }) => {
                self.router_links().any(|link| {
                    matches!(
                        link.link_type,
                        LsaRouterLinkType::PointToPoint
                            | LsaRouterLinkType::VirtualLink
                    ) && link.nbr_router_id == router_id
                })
            }
            (
                VertexLsa::Router(_),
                VertexId::Network {
                    router_id,
                    iface_id,
                },
            ) => self.router_links().any(|link| {
                link.link_type == LsaRouterLinkType::TransitNetwork
                    && link.nbr_router_id == router_id
                    && link.nbr_iface_id == iface_id
            }),
        }
    }
}

// ===== global functions =====

// Computes the shortest-path tree of all areas.
pub(crate) fn run(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let af = instance.config.af;
    let router_id = instance.state.router_id;

    // Originate the root Router-LSA of active areas on demand.
    for area_idx in arenas.areas.indexes().collect::<Vec<_>>() {
        let area = &arenas.areas[area_idx];
        let root_id = VertexId::Router { router_id };
        if area.is_active(&arenas.interfaces)
            && vertex_lsa_find(af, root_id, area).is_none()
        {
            lsdb::lsa_orig_router(instance, arenas, area_idx);
        }
    }

    for area in arenas.areas.iter_mut() {
        run_area(area, af, router_id, &arenas.interfaces, &arenas.neighbors);
    }

    // Update statistics.
    instance.state.spf_run_count += 1;
    instance.state.discontinuity_time = Some(Utc::now());
}

// ===== helper functions =====

// Runs Dijkstra's algorithm over the Router-LSAs and Network-LSAs of the
// given area.
fn run_area(
    area: &mut Area,
    af: AddressFamily,
    router_id: Ipv4Addr,
    interfaces: &Arena<Interface>,
    neighbors: &Arena<Neighbor>,
) {
    Debug::SpfStart(area.area_id).log();

    // Get root vertex.
    let root_id = VertexId::Router { router_id };
    let Some(root_lsa) = vertex_lsa_find(af, root_id, area) else {
        Error::SpfRootNotFound(area.area_id).log();
        area.state.spt.clear();
        area.state.routers.clear();
        return;
    };
    let root = Vertex::new(root_id, root_lsa, 0, 0, None);

    // Initialize SPT and candidate list.
    let mut spt = BTreeMap::new();
    let mut cand_list = BTreeMap::new();
    let mut routers = BTreeMap::new();
    cand_list.insert((root.distance, root.id), root);

    // Main SPF loop.
    while let Some(((_, vertex_id), vertex)) = cand_list.pop_first() {
        // Add vertex to SPT.
        spt.insert(vertex_id, vertex);
        let vertex = &spt[&vertex_id];

        // Add "router" routing table entry.
        if let VertexId::Router { router_id } = vertex.id
            && let Some(lsa_body) = vertex.lsa.router_body()
        {
            let route = RouteRtr::new(
                area.area_id,
                PathType::IntraArea,
                lsa_body.options,
                lsa_body.flags,
                vertex.distance,
                vertex.nexthops.clone(),
            );
            routers.insert(router_id, route);
        }

        // Iterate over all links described by the vertex's LSA.
        for link in vertex_links(af, &vertex.lsa, area) {
            // Check if the LSAs are mutually linked.
            if !link.lsa.has_link(vertex.id) {
                continue;
            }

            // Check if the link's vertex is already on the shortest-path tree.
            if spt.contains_key(&link.id) {
                continue;
            }

            // Calculate distance to the link's vertex.
            let distance = vertex.distance.saturating_add(link.cost);

            // Increment number of hops to the root.
            let mut hops = vertex.hops;
            if link.lsa.is_router() {
                hops = hops.saturating_add(1);
            }

            // Check if this vertex is already present on the candidate list.
            if let Some((cand_key, cand_distance)) = cand_list
                .iter()
                .find(|(_, cand_v)| cand_v.id == link.id)
                .map(|(cand_key, cand_v)| (*cand_key, cand_v.distance))
            {
                match distance.cmp(&cand_distance) {
                    Ordering::Less => {
                        // Remove vertex since its key has changed. It will be
                        // re-added with the correct key below.
                        cand_list.remove(&cand_key);
                    }
                    Ordering::Equal => {}
                    Ordering::Greater => {
                        // Ignore higher cost path.
                        continue;
                    }
                }
            }
            let cand_v =
                cand_list.entry((distance, link.id)).or_insert_with(|| {
                    let parent = Some(vertex_id);
                    Vertex::new(link.id, link.lsa, distance, hops, parent)
                });

            // Update vertex's nexthops.
            match calc_nexthops(
                area,
                vertex,
                link.parent_link.as_ref(),
                &cand_v.lsa,
                cand_v.id,
                interfaces,
                neighbors,
            ) {
                Ok(nexthops) => cand_v.nexthops.extend(nexthops),
                Err(error) => error.log(),
            }
        }
    }

    // Update area's SPT.
    area.state.spt = spt;
    area.state.routers = routers;

    // Update statistics.
    area.state.spf_run_count += 1;
    area.state.discontinuity_time = Some(Utc::now());
}

// Looks up the LSA(s) corresponding to the given vertex.
fn vertex_lsa_find(
    af: AddressFamily,
    id: VertexId,
    area: &Area,
) -> Option<VertexLsa> {
    match id {
        VertexId::Network {
            router_id,
            iface_id,
        } => {
            let lsa_key = LsaKey::new(
                LsaType::Network,
                router_id,
                Ipv4Addr::from(iface_id),
            );
            area.state
                .lsdb
                .get(&lsa_key)
                .map(|lse| &lse.data)
                .filter(|lsa| !lsa.hdr.is_maxage())
                .cloned()
                .map(VertexLsa::Network)
        }
        VertexId::Router { router_id } => {
            let lsas = area
                .state
                .lsdb
                .iter_by_type_advrtr(LsaType::Router, router_id)
                .map(|lse| &lse.data)
                .filter(|lsa| !lsa.hdr.is_maxage())
                .filter(|lsa| {
                    // Ensure the R and V6 bits are set (except for AFs other
                    // than IPv6 unicast).
                    lsa.body.as_router().is_some_and(|lsa_body| {
                        lsa_body.options.contains(Options::R)
                            && (af != AddressFamily::Ipv6
                                || lsa_body.options.contains(Options::V6))
                    })
                })
                .cloned()
                .collect::<Vec<_>>();
            (!lsas.is_empty()).then_some(VertexLsa::Router(lsas))
        }
    }
}

// Returns the links described by the given vertex's LSA.
fn vertex_links(
    af: AddressFamily,
    vertex_lsa: &VertexLsa,
    area: &Area,
) -> Vec<SpfLink> {
    match vertex_lsa {
        VertexLsa::Network(lsa) => {
            // Crossing a network adds no cost.
            let Some(lsa_body) = lsa.body.as_network() else {
                return vec![];
            };
            lsa_body
                .attached_rtrs
                .iter()
                .filter_map(|router_id| {
                    let id = VertexId::Router {
                        router_id: *router_id,
                    };
                    vertex_lsa_find(af, id, area).map(|lsa| SpfLink {
                        parent_link: None,
                        id,
                        lsa,
                        cost: 0,
                    })
                })
                .collect()
        }
        VertexLsa::Router(_) => vertex_lsa
            .router_links()
            .filter_map(|link| {
                let id = match link.link_type {
                    LsaRouterLinkType::PointToPoint
                    | LsaRouterLinkType::VirtualLink => VertexId::Router {
                        router_id: link.nbr_router_id,
                    },
                    LsaRouterLinkType::TransitNetwork => VertexId::Network {
                        router_id: link.nbr_router_id,
                        iface_id: link.nbr_iface_id,
                    },
                };
                vertex_lsa_find(af, id, area).map(|lsa| SpfLink {
                    parent_link: Some(link.clone()),
                    id,
                    lsa,
                    cost: link.metric.into(),
                })
            })
            .collect(),
    }
}

// Computes the set of nexthops that should be used to reach the given
// destination.
fn calc_nexthops(
    area: &Area,
    parent: &Vertex,
    parent_link: Option<&LsaRouterLink>,
    dest_lsa: &VertexLsa,
    dest_id: VertexId,
    interfaces: &Arena<Interface>,
    neighbors: &Arena<Neighbor>,
) -> Result<Nexthops, Error> {
    // If there is at least one intervening router in the current shortest
    // path between the destination and the root, the destination simply
    // inherits the set of next hops from the parent.
    if parent.hops > 0 {
        return Ok(parent.nexthops.clone());
    }

    let calc_error = || {
        Error::SpfNexthopCalcError(dest_lsa.origin().unwrap_or_else(|| {
            LsaKey::new(
                LsaType::Router,
                Ipv4Addr::UNSPECIFIED,
                Ipv4Addr::UNSPECIFIED,
            )
        }))
    };
    let mut nexthops = Nexthops::new();

    match &parent.lsa {
        // The parent vertex is the root.
        VertexLsa::Router(_) => {
            // The outgoing interface is simply the interface connecting to the
            // destination network or router.
            let parent_link = parent_link.ok_or_else(calc_error)?;
            let (_, iface) = area
                .interfaces
                .get_by_ifindex(interfaces, parent_link.iface_id)
                .ok_or_else(calc_error)?;
            let ifindex = iface.system.ifindex;

            match dest_id {
                VertexId::Router { router_id } => {
                    let addr = if iface.config.if_type
                        == InterfaceType::VirtualLink
                    {
                        iface
                            .state
                            .neighbors
                            .get_by_router_id(neighbors, router_id)
                            .map(|(_, nbr)| nbr.src)
                    } else {
                        nexthop_lladdr(
                            iface,
                            router_id,
                            parent_link.nbr_iface_id,
                        )
                    }
                    .ok_or_else(calc_error)?;
                    nexthops.insert(Nexthop::new(
                        ifindex,
                        Some(addr),
                        Some(router_id),
                    ));
                }
                VertexId::Network { .. } => {
                    // Directly connected network.
                    nexthops.insert(Nexthop::new(ifindex, None, None));
                }
            }
        }
        // The parent vertex is a network that directly connects the
        // calculating router to the destination router.
        VertexLsa::Network(parent_lsa) => {
            let VertexId::Router { router_id } = dest_id else {
                return Err(calc_error());
            };

            // Find the destination's link back to the parent network.
            let dest_link = dest_lsa
                .router_links()
                .find(|link| {
                    link.link_type == LsaRouterLinkType::TransitNetwork
                        && link.nbr_router_id == parent_lsa.hdr.adv_rtr
                        && Ipv4Addr::from(link.nbr_iface_id)
                            == parent_lsa.hdr.lsa_id
                })
                .ok_or_else(calc_error)?;

            // Inherit outgoing interface from the parent network.
            let ifindex = parent
                .nexthops
                .iter()
                .next()
                .ok_or_else(calc_error)?
                .ifindex;
            let (_, iface) = area
                .interfaces
                .get_by_ifindex(interfaces, ifindex)
                .ok_or_else(calc_error)?;

            let addr = nexthop_lladdr(iface, router_id, dest_link.iface_id)
                .ok_or_else(calc_error)?;
            nexthops.insert(Nexthop::new(ifindex, Some(addr), Some(router_id)));
        }
    }

    Ok(nexthops)
}

// Resolves the link-local address of a neighbor through its Link-LSA.
fn nexthop_lladdr(
    iface: &Interface,
    router_id: Ipv4Addr,
    iface_id: u32,
) -> Option<Ipv6Addr> {
    let lsa_key =
        LsaKey::new(LsaType::Link, router_id, Ipv4Addr::from(iface_id));
    iface
        .state
        .lsdb
        .get(&lsa_key)
        .map(|lse| &lse.data)
        .filter(|lsa| !lsa.hdr.is_maxage())
        .and_then(|lsa| lsa.body.as_link())
        .and_then(|lsa_body| match lsa_body.linklocal {
            IpAddr::V6(addr) => Some(addr),
            IpAddr::V4(_) => None,
        })
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::config::AreaCfg;
    use crate::lsdb::{LSA_INIT_SEQ_NO, LsaEntry, LsaSource};
    use crate::packet::lsa::{LsaBody, LsaNetwork, LsaRouterFlags};

    fn addr(s: &str) -> Ipv4Addr {
        Ipv4Addr::from_str(s).unwrap()
    }

    fn area() -> Area {
        Area::new(1, AreaCfg::new(Ipv4Addr::UNSPECIFIED))
    }

    fn p2p(nbr: &str, metric: u16) -> LsaRouterLink {
        LsaRouterLink::new(
            LsaRouterLinkType::PointToPoint,
            metric,
            1,
            1,
            addr(nbr),
        )
    }

    fn transit(dr: &str, dr_iface_id: u32, metric: u16) -> LsaRouterLink {
        LsaRouterLink::new(
            LsaRouterLinkType::TransitNetwork,
            metric,
            dr_iface_id,
            dr_iface_id,
            addr(dr),
        )
    }

    fn add_router(area: &mut Area, rid: &str, links: Vec<LsaRouterLink>) {
        let options = Options::V6 | Options::R | Options::E;
        let body = LsaBody::Router(LsaRouter::new(
            LsaRouterFlags::empty(),
            options,
            links,
        ));
        let lsa = Lsa::new(
            0,
            Ipv4Addr::UNSPECIFIED,
            addr(rid),
            LSA_INIT_SEQ_NO,
            body,
        );
        area.state
            .lsdb
            .insert(LsaEntry::new(Arc::new(lsa), LsaSource::Flooded));
    }

    fn add_network(area: &mut Area, dr: &str, iface_id: u32, rtrs: &[&str]) {
        let options = Options::V6 | Options::R | Options::E;
        let body = LsaBody::Network(LsaNetwork::new(
            options,
            rtrs.iter().map(|rid| addr(rid)).collect(),
        ));
        let lsa = Lsa::new(
            0,
            Ipv4Addr::from(iface_id),
            addr(dr),
            LSA_INIT_SEQ_NO,
            body,
        );
        area.state
            .lsdb
            .insert(LsaEntry::new(Arc::new(lsa), LsaSource::Flooded));
    }

    fn distance(area: &Area, rid: &str) -> Option<u32> {
        area.state
            .spt
            .get(&VertexId::Router {
                router_id: addr(rid),
            })
            .map(|vertex| vertex.distance)
    }

    fn run(area: &mut Area, rid: &str) {
        run_area(
            area,
            AddressFamily::Ipv6,
            addr(rid),
            &Arena::default(),
            &Arena::default(),
        );
    }

    #[test]
    fn test_spf_triangle() {
        let mut area = area();
        add_router(
            &mut area,
            "1.1.1.1",
            vec![p2p("2.2.2.2", 10), p2p("3.3.3.3", 10)],
        );
        add_router(
            &mut area,
            "2.2.2.2",
            vec![p2p("1.1.1.1", 10), p2p("3.3.3.3", 10)],
        );
        add_router(
            &mut area,
            "3.3.3.3",
            vec![p2p("1.1.1.1", 10), p2p("2.2.2.2", 10)],
        );

        run(&mut area, "1.1.1.1");
        assert_eq!(distance(&area, "1.1.1.1"), Some(0));
        assert_eq!(distance(&area, "2.2.2.2"), Some(10));
        assert_eq!(distance(&area, "3.3.3.3"), Some(10));
        assert_eq!(area.state.routers.len(), 3);
        assert_eq!(area.state.spf_run_count, 1);
    }

    #[test]
    fn test_spf_asymmetric_link() {
        let mut area = area();
        add_router(
            &mut area,
            "1.1.1.1",
            vec![p2p("2.2.2.2", 10), p2p("4.4.4.4", 5)],
        );
        add_router(&mut area, "2.2.2.2", vec![p2p("1.1.1.1", 10)]);
        // 4.4.4.4 doesn't describe a link back to 1.1.1.1.
        add_router(&mut area, "4.4.4.4", vec![]);

        run(&mut area, "1.1.1.1");
        assert_eq!(distance(&area, "2.2.2.2"), Some(10));
        assert_eq!(distance(&area, "4.4.4.4"), None);
        assert!(!area.state.routers.contains_key(&addr("4.4.4.4")));
    }

    #[test]
    fn test_spf_shortest_path() {
        // 1 -- 2 (10), 2 -- 3 (10), 1 -- 3 (50).
        let mut area = area();
        add_router(
            &mut area,
            "1.1.1.1",
            vec![p2p("2.2.2.2", 10), p2p("3.3.3.3", 50)],
        );
        add_router(
            &mut area,
            "2.2.2.2",
            vec![p2p("1.1.1.1", 10), p2p("3.3.3.3", 10)],
        );
        add_router(
            &mut area,
            "3.3.3.3",
            vec![p2p("1.1.1.1", 50), p2p("2.2.2.2", 10)],
        );

        run(&mut area, "1.1.1.1");
        assert_eq!(distance(&area, "3.3.3.3"), Some(20));
        let vertex = &area.state.spt[&VertexId::Router {
            router_id: addr("3.3.3.3"),
        }];
        assert_eq!(
            vertex.parent,
            Some(VertexId::Router {
                router_id: addr("2.2.2.2")
            })
        );
    }

    #[test]
    fn test_spf_large_metrics() {
        // 1 -- 2 (40000), 2 -- 3 (40000), 1 -- 3 (65535), 3 -- 4 (40000).
        let mut area = area();
        add_router(
            &mut area,
            "1.1.1.1",
            vec![p2p("2.2.2.2", 40000), p2p("3.3.3.3", 65535)],
        );
        add_router(
            &mut area,
            "2.2.2.2",
            vec![p2p("1.1.1.1", 40000), p2p("3.3.3.3", 40000)],
        );
        add_router(
            &mut area,
            "3.3.3.3",
            vec![
                p2p("1.1.1.1", 65535),
                p2p("2.2.2.2", 40000),
                p2p("4.4.4.4", 40000),
            ],
        );
        add_router(&mut area, "4.4.4.4", vec![p2p("3.3.3.3", 40000)]);

        run(&mut area, "1.1.1.1");
        assert_eq!(distance(&area, "2.2.2.2"), Some(40000));
        // The direct link is cheaper than the 80000 path through 2.2.2.2.
        assert_eq!(distance(&area, "3.3.3.3"), Some(65535));
        let vertex = &area.state.spt[&VertexId::Router {
            router_id: addr("3.3.3.3"),
        }];
        assert_eq!(
            vertex.parent,
            Some(VertexId::Router {
                router_id: addr("1.1.1.1")
            })
        );
        assert_eq!(distance(&area, "4.4.4.4"), Some(105535));
        assert_eq!(area.state.routers[&addr("4.4.4.4")].metric, 105535);
    }

    #[test]
    fn test_spf_transit_network() {
        // Three routers attached to a broadcast segment whose DR is 2.2.2.2.
        let mut area = area();
        add_router(&mut area, "1.1.1.1", vec![transit("2.2.2.2", 5, 10)]);
        add_router(&mut area, "2.2.2.2", vec![transit("2.2.2.2", 5, 10)]);
        add_router(&mut area, "3.3.3.3", vec![transit("2.2.2.2", 5, 10)]);
        add_network(
            &mut area,
            "2.2.2.2",
            5,
            &["1.1.1.1", "2.2.2.2", "3.3.3.3"],
        );

        run(&mut area, "1.1.1.1");
        let network = VertexId::Network {
            router_id: addr("2.2.2.2"),
            iface_id: 5,
        };
        assert_eq!(area.state.spt[&network].distance, 10);
        // The network-to-router edge adds no cost.
        assert_eq!(distance(&area, "2.2.2.2"), Some(10));
        assert_eq!(distance(&area, "3.3.3.3"), Some(10));
    }

    #[test]
    fn test_spf_root_not_found() {
        let mut area = area();
        add_router(&mut area, "2.2.2.2", vec![p2p("1.1.1.1", 10)]);

        run(&mut area, "1.1.1.1");
        assert!(area.state.spt.is_empty());
        assert!(area.state.routers.is_empty());
    }

    #[test]
    fn test_vertex_ordering() {
        let network = VertexId::Network {
            router_id: addr("9.9.9.9"),
            iface_id: 1,
        };
        let router = VertexId::Router {
            router_id: addr("1.1.1.1"),
        };
        assert!((10u32, network) < (10u32, router));
    }
}
