//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;
use std::sync::Arc;

use smallvec::{SmallVec, smallvec};

use crate::area::Area;
use crate::collections::{Arena, NeighborIndex};
use crate::instance::InstanceUpView;
use crate::interface::{Interface, InterfaceType, ism};
use crate::lsdb;
use crate::neighbor::{Neighbor, nsm};
use crate::network::{self, ALL_DR_RTRS, ALL_SPF_RTRS};
use crate::packet::lsa::{Lsa, LsaHdr};
use crate::packet::{
    DbDesc, DbDescFlags, Hello, LsAck, LsRequest, LsUpdate, Packet, PacketHdr,
    PacketType,
};

// IPv6 header length.
const IPV6_HDR_LENGTH: u16 = 40;
// Fixed part of the Database Description packet.
const DBDESC_BASE_LENGTH: u16 = 12;
// Size of each LS Request entry.
const LSREQ_ENTRY_LENGTH: u16 = 12;
// Fixed part of the LS Update packet.
const LSUPD_BASE_LENGTH: u16 = 4;

type Destinations = SmallVec<[Ipv6Addr; 4]>;

// ===== Hello Packets =====

pub(crate) fn send_hello(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    neighbors: &Arena<Neighbor>,
) {
    let dsts: Destinations = match iface.config.if_type {
        InterfaceType::Broadcast
        | InterfaceType::PointToPoint
        | InterfaceType::PointToMultipoint => smallvec![ALL_SPF_RTRS],
        InterfaceType::Nbma => {
            // RFC 2328 - Section 9.5.1: the set of neighbors Hellos are sent
            // to depends on the router's eligibility and role.
            iface
                .state
                .neighbors
                .iter(neighbors)
                .filter(|nbr| {
                    if iface.is_dr_or_backup() {
                        nbr.state >= nsm::State::Attempt
                    } else if iface.config.priority != 0 {
                        nbr.priority != 0
                    } else {
                        iface.is_dr(nbr.router_id)
                            || iface.is_bdr(nbr.router_id)
                    }
                })
                .map(|nbr| nbr.src)
                .collect()
        }
        InterfaceType::VirtualLink => {
            let dsts: Destinations = iface
                .state
                .neighbors
                .iter(neighbors)
                .map(|nbr| nbr.src)
                .collect();
            if dsts.is_empty() {
                smallvec![ALL_SPF_RTRS]
            } else {
                dsts
            }
        }
    };

    for dst in dsts {
        send_hello_direct(iface, area, instance, neighbors, dst);
    }
}

pub(crate) fn send_hello_direct(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    neighbors: &Arena<Neighbor>,
    dst: Ipv6Addr,
) {
    let packet = Packet::Hello(Hello {
        hdr: packet_hdr(PacketType::Hello, iface, area, instance),
        iface_id: iface.system.ifindex,
        priority: iface.config.priority,
        options: area.options(instance.config.af),
        hello_interval: iface.config.hello_interval,
        dead_interval: iface.config.dead_interval,
        dr: iface.state.dr.map(|dr| dr.router_id),
        bdr: iface.state.bdr.map(|bdr| bdr.router_id),
        neighbors: iface
            .state
            .neighbors
            .iter(neighbors)
            .filter(|nbr| nbr.state >= nsm::State::Init)
            .map(|nbr| nbr.router_id)
            .collect(),
    });

    network::send_packet(iface, instance.tx, dst, packet);
}

// ===== Database Description Packets =====

pub(crate) fn send_dbdesc(
    nbr: &mut Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) {
    let dst = send_dest_nbr(nbr, iface);

    // Calculate maximum packet size.
    let max_size = max_packet_size(iface)
        .saturating_sub(PacketHdr::LENGTH + DBDESC_BASE_LENGTH);

    // Append as many LSA headers as possible while on the Exchange state.
    let mut total = 0;
    let mut lsa_hdrs = vec![];
    if !nbr.dd_flags.contains(DbDescFlags::I) {
        while total + LsaHdr::LENGTH <= max_size {
            match nbr.lists.db_summary.pop_first() {
                Some((_, lsa)) => {
                    total += LsaHdr::LENGTH;
                    lsa_hdrs.push(lsa.hdr);
                }
                None => break,
            }
        }
    }

    // Clear the M-bit if there's no more data to send.
    if !nbr.dd_flags.contains(DbDescFlags::I) && nbr.lists.db_summary.is_empty()
    {
        nbr.dd_flags.remove(DbDescFlags::M);
    }

    // Generate Database Description packet.
    let packet = Packet::DbDesc(DbDesc {
        hdr: packet_hdr(PacketType::DbDesc, iface, area, instance),
        options: area.options(instance.config.af),
        mtu: iface.config.mtu,
        dd_flags: nbr.dd_flags,
        dd_seq_no: nbr.dd_seq_no,
        lsa_hdrs,
    });

    // Keep a copy for retransmissions.
    nbr.last_sent_dbdesc = Some(packet.clone());
    network::send_packet(iface, instance.tx, dst, packet);

    // Start retransmission interval in two cases:
    // * The router is master
    // * When sending the initial database description packet
    if nbr.dd_flags.intersects(DbDescFlags::MS | DbDescFlags::I) {
        let interval = iface.config.retransmit_interval;
        nbr.rxmt_dbdesc_start(iface, area, instance, interval);
    }
}

pub(crate) fn rxmt_dbdesc(
    nbr: &Neighbor,
    iface: &Interface,
    instance: &InstanceUpView<'_>,
) {
    if let Some(packet) = &nbr.last_sent_dbdesc {
        let dst = send_dest_nbr(nbr, iface);
        network::send_packet(iface, instance.tx, dst, packet.clone());
    }
}

// ===== LS Request Packets =====

pub(crate) fn send_lsreq(
    nbr: &mut Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) {
    // Calculate maximum packet size.
    let max_size = max_packet_size(iface).saturating_sub(PacketHdr::LENGTH);

    // Append as many LS Request entries as possible in a single packet.
    let mut total = 0;
    while total + LSREQ_ENTRY_LENGTH <= max_size {
        match nbr.lists.ls_request.pop_first() {
            Some((lsa_key, lsa_hdr)) => {
                nbr.lists.ls_request_pending.insert(lsa_key, lsa_hdr);
                total += LSREQ_ENTRY_LENGTH;
            }
            None => break,
        }
    }

    rxmt_lsreq(nbr, iface, area, instance);

    // Start retransmission interval.
    nbr.rxmt_lsreq_start(iface, area, instance);
}

pub(crate) fn rxmt_lsreq(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) {
    if nbr.lists.ls_request_pending.is_empty() {
        return;
    }

    let dst = send_dest_nbr(nbr, iface);
    let packet = Packet::LsRequest(LsRequest {
        hdr: packet_hdr(PacketType::LsRequest, iface, area, instance),
        entries: nbr.lists.ls_request_pending.keys().copied().collect(),
    });
    network::send_packet(iface, instance.tx, dst, packet);
}

// ===== LS Update Packets =====

// Sends a newly flooded LSA out the given interface.
pub(crate) fn send_lsupd_flood(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    neighbors: &Arena<Neighbor>,
    nbr_idxs: &[NeighborIndex],
    lsa: Arc<Lsa>,
) {
    let lsa = lsa_tx_copy(&lsa, iface);
    for dst in send_dest_iface(iface, neighbors, nbr_idxs) {
        let packet = Packet::LsUpdate(LsUpdate {
            hdr: packet_hdr(PacketType::LsUpdate, iface, area, instance),
            lsas: vec![lsa.clone()],
        });
        network::send_packet(iface, instance.tx, dst, packet);
    }
}

// Sends the given LSAs directly to a neighbor, using as many packets as
// necessary.
pub(crate) fn send_lsupd_direct(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    lsas: Vec<Arc<Lsa>>,
) {
    let dst = send_dest_nbr(nbr, iface);
    for lsas in lsupd_split(iface, lsas.iter()) {
        let packet = Packet::LsUpdate(LsUpdate {
            hdr: packet_hdr(PacketType::LsUpdate, iface, area, instance),
            lsas,
        });
        network::send_packet(iface, instance.tx, dst, packet);
    }
}

pub(crate) fn rxmt_lsupd(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) {
    // Only a single packet is retransmitted per timer expiration.
    let dst = send_dest_nbr(nbr, iface);
    if let Some(lsas) = lsupd_split(iface, nbr.lists.ls_rxmt.values()).next() {
        let packet = Packet::LsUpdate(LsUpdate {
            hdr: packet_hdr(PacketType::LsUpdate, iface, area, instance),
            lsas,
        });
        network::send_packet(iface, instance.tx, dst, packet);
    }
}

// ===== LS Ack Packets =====

pub(crate) fn send_lsack_direct(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    lsa_hdr: &LsaHdr,
) {
    // On broadcast networks, direct acks are multicast the same way LS
    // Updates are flooded.
    let dst = match iface.config.if_type {
        InterfaceType::Broadcast => send_dest_broadcast(iface),
        _ => send_dest_nbr(nbr, iface),
    };
    let packet = Packet::LsAck(LsAck {
        hdr: packet_hdr(PacketType::LsAck, iface, area, instance),
        lsa_hdrs: vec![*lsa_hdr],
    });
    network::send_packet(iface, instance.tx, dst, packet);
}

// Flushes the list of delayed acknowledgments, sending one or more LS Ack
// packets to each destination.
pub(crate) fn send_lsack_delayed(
    iface: &mut Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) {
    let max_size = max_packet_size(iface).saturating_sub(PacketHdr::LENGTH);
    let max_hdrs = std::cmp::max(1, (max_size / LsaHdr::LENGTH) as usize);

    let ls_ack_list = std::mem::take(&mut iface.state.ls_ack_list);
    for (dst, lsa_hdrs) in ls_ack_list {
        for lsa_hdrs in lsa_hdrs.chunks(max_hdrs) {
            let packet = Packet::LsAck(LsAck {
                hdr: packet_hdr(PacketType::LsAck, iface, area, instance),
                lsa_hdrs: lsa_hdrs.to_vec(),
            });
            network::send_packet(iface, instance.tx, dst, packet);
        }
    }
}

// Returns the destination of delayed acknowledgments for LSAs received from
// the given neighbor.
pub(crate) fn delayed_ack_dest(iface: &Interface, nbr: &Neighbor) -> Ipv6Addr {
    match iface.config.if_type {
        InterfaceType::Broadcast => send_dest_broadcast(iface),
        InterfaceType::PointToPoint => ALL_SPF_RTRS,
        _ => nbr.src,
    }
}

// ===== helper functions =====

fn packet_hdr(
    pkt_type: PacketType,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) -> PacketHdr {
    PacketHdr::new(
        pkt_type,
        instance.state.router_id,
        area.area_id,
        iface.config.instance_id,
    )
}

// Returns the maximum size of an OSPF packet sent through the given
// interface, excluding the IPv6 header.
fn max_packet_size(iface: &Interface) -> u16 {
    let mtu = iface
        .system
        .mtu
        .map(|mtu| std::cmp::min(mtu, u16::MAX as u32) as u16)
        .unwrap_or(iface.config.mtu);
    mtu.saturating_sub(IPV6_HDR_LENGTH)
}

// Returns a copy of the LSA with its age incremented by InfTransDelay.
fn lsa_tx_copy(lsa: &Lsa, iface: &Interface) -> Lsa {
    let mut lsa = lsa.clone();
    let age = std::cmp::min(
        lsa.hdr.age.saturating_add(iface.config.transmit_delay),
        lsdb::LSA_MAX_AGE,
    );
    lsa.set_age(age);
    lsa
}

// Splits a list of LSAs into packet-sized groups.
fn lsupd_split<'a>(
    iface: &'a Interface,
    lsas: impl Iterator<Item = &'a Arc<Lsa>> + 'a,
) -> impl Iterator<Item = Vec<Lsa>> + 'a {
    let max_size = max_packet_size(iface)
        .saturating_sub(PacketHdr::LENGTH + LSUPD_BASE_LENGTH);
    let mut lsas = lsas.peekable();
    std::iter::from_fn(move || {
        let mut total = 0;
        let mut group = vec![];
        while let Some(lsa) = lsas.peek() {
            // If a single LSA is bigger than the maximum packet size, there's
            // nothing we can do other than relying on IP-level fragmentation.
            let length = lsa.hdr.length;
            if !group.is_empty() && total + length > max_size {
                break;
            }
            total += length;
            group.push(lsa_tx_copy(lsa, iface));
            lsas.next();
        }
        (!group.is_empty()).then_some(group)
    })
}

// Returns destination used to send a packet directly to the given neighbor.
fn send_dest_nbr(nbr: &Neighbor, iface: &Interface) -> Ipv6Addr {
    if iface.config.if_type == InterfaceType::PointToPoint {
        ALL_SPF_RTRS
    } else {
        nbr.src
    }
}

// Returns the multicast address used to reach the adjacent routers of a
// broadcast network. Only the DR and the BDR talk to all routers, unless no
// DR was elected yet.
fn send_dest_broadcast(iface: &Interface) -> Ipv6Addr {
    if iface.is_dr_or_backup()
        || iface.state.dr.is_none()
        || iface.state.ism_state == ism::State::Waiting
    {
        ALL_SPF_RTRS
    } else {
        ALL_DR_RTRS
    }
}

// Returns the destinations used to flood a packet to the given neighbors
// attached to the interface.
fn send_dest_iface(
    iface: &Interface,
    neighbors: &Arena<Neighbor>,
    nbr_idxs: &[NeighborIndex],
) -> Destinations {
    match iface.config.if_type {
        InterfaceType::Broadcast => smallvec![send_dest_broadcast(iface)],
        InterfaceType::Nbma
        | InterfaceType::PointToMultipoint
        | InterfaceType::VirtualLink => {
            // On non-broadcast networks, separate LS Update packets must be
            // sent, as unicasts, to each adjacent neighbor.
            nbr_idxs
                .iter()
                .map(|nbr_idx| &neighbors[*nbr_idx])
                .filter(|nbr| nbr.state >= nsm::State::Exchange)
                .map(|nbr| nbr.src)
                .collect()
        }
        InterfaceType::PointToPoint => smallvec![ALL_SPF_RTRS],
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::config::InterfaceCfg;
    use crate::interface::DrInfo;

    // Test description:
    //
    // On a broadcast network, acknowledgments go to the same multicast group
    // as flooded updates, and that group depends on the DR election.
    #[test]
    fn test_ack_dest_broadcast() {
        let cfg = InterfaceCfg::new("eth0", 1, InterfaceType::Broadcast);
        let mut iface = Interface::new(1, cfg);
        let nbr = nbr();

        // No DR elected yet.
        iface.state.ism_state = ism::State::DrOther;
        iface.state.dr = None;
        assert_eq!(delayed_ack_dest(&iface, &nbr), ALL_SPF_RTRS);
        assert_eq!(send_dest_broadcast(&iface), ALL_SPF_RTRS);

        // DROther routers only talk to the DR and the BDR.
        iface.state.dr = Some(dr_info());
        assert_eq!(delayed_ack_dest(&iface, &nbr), ALL_DR_RTRS);
        assert_eq!(send_dest_broadcast(&iface), ALL_DR_RTRS);

        // The DR and the BDR talk to everyone.
        for state in [ism::State::Dr, ism::State::Backup] {
            iface.state.ism_state = state;
            assert_eq!(delayed_ack_dest(&iface, &nbr), ALL_SPF_RTRS);
            assert_eq!(send_dest_broadcast(&iface), ALL_SPF_RTRS);
        }
    }

    #[test]
    fn test_ack_dest_other() {
        let nbr = nbr();

        let cfg = InterfaceCfg::new("eth0", 1, InterfaceType::PointToPoint);
        let iface = Interface::new(1, cfg);
        assert_eq!(delayed_ack_dest(&iface, &nbr), ALL_SPF_RTRS);

        // NBMA acknowledgments are unicast to the neighbor.
        let cfg = InterfaceCfg::new("eth1", 2, InterfaceType::Nbma);
        let iface = Interface::new(2, cfg);
        assert_eq!(delayed_ack_dest(&iface, &nbr), nbr.src);
    }

    //
    // Helper functions.
    //

    fn nbr() -> Neighbor {
        let src = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        Neighbor::new(1, Ipv4Addr::new(2, 2, 2, 2), src)
    }

    fn dr_info() -> DrInfo {
        DrInfo {
            router_id: Ipv4Addr::new(3, 3, 3, 3),
            iface_id: 1,
            addr: Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 3),
        }
    }
}
