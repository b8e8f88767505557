//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;

use ospf6_utils::southbound::{AddressMsg, InterfaceUpdateMsg};

use crate::area::Area;
use crate::collections::{
    AreaIndex, AreaKey, Arena, InterfaceIndex, InterfaceKey, LsdbIndex,
    NeighborIndex, NeighborKey, lsdb_get,
};
use crate::config::AreaType;
use crate::debug::{Debug, SeqNoMismatchReason};
use crate::error::{Error, InterfaceCfgError};
use crate::instance::{Instance, InstanceArenas, InstanceUpView};
use crate::interface::{Interface, ism};
use crate::lsdb::{self, LSA_MAX_SEQ_NO, LsaOriginateEvent, LsaSource};
use crate::neighbor::{LastDbDesc, Neighbor, lsa_type_is_valid, nsm};
use crate::network::ALL_DR_RTRS;
use crate::packet::lsa::{Lsa, LsaScope, LsaType};
use crate::packet::{
    DbDesc, DbDescFlags, Hello, LsAck, LsRequest, LsUpdate, Options, Packet,
    PacketHdr, PacketType,
};
use crate::{flood, output};

// ===== Interface FSM event =====

pub(crate) fn process_ism_event(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_key: AreaKey,
    iface_key: InterfaceKey,
    event: ism::Event,
) -> Result<(), Error> {
    // Lookup area and interface.
    let (_, area) = arenas.areas.get_mut_by_key(&area_key)?;
    let (_, iface) = area
        .interfaces
        .get_mut_by_key(&mut arenas.interfaces, &iface_key)?;

    // Invoke FSM event.
    iface.fsm(area, instance, &mut arenas.neighbors, event);

    Ok(())
}

// ===== Neighbor FSM event =====

pub(crate) fn process_nsm_event(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_key: AreaKey,
    iface_key: InterfaceKey,
    nbr_key: NeighborKey,
    event: nsm::Event,
) -> Result<(), Error> {
    // Lookup area, interface and neighbor.
    let (_, area) = arenas.areas.get_mut_by_key(&area_key)?;
    let (_, iface) = area
        .interfaces
        .get_mut_by_key(&mut arenas.interfaces, &iface_key)?;
    let (nbr_idx, nbr) = iface
        .state
        .neighbors
        .get_mut_by_key(&mut arenas.neighbors, &nbr_key)?;

    // Invoke FSM event.
    nbr.fsm(iface, area, instance, event);
    let nbr_state = nbr.state;
    let nbr_is_static = nbr.is_static;
    let nbr_src = nbr.src;

    // NBMA neighbors are polled with Hellos sent directly to them.
    if matches!(event, nsm::Event::Start | nsm::Event::PollTimer) {
        output::send_hello_direct(
            iface,
            area,
            instance,
            &arenas.neighbors,
            nbr_src,
        );
    }

    // Delete neighbor upon transitioning to the Down state. Neighbors from
    // the NBMA configuration are kept so they can still be polled.
    if nbr_state == nsm::State::Down && !nbr_is_static {
        iface.state.neighbors.delete(&mut arenas.neighbors, nbr_idx);
    }

    Ok(())
}

// ===== Network packet receipt =====

pub(crate) fn process_packet(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    ifindex: u32,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    packet: Packet,
) -> Result<(), Error> {
    // Lookup the receiving interface.
    let (area_idx, iface_idx) = arenas
        .areas
        .indexes()
        .find_map(|area_idx| {
            arenas.areas[area_idx]
                .interfaces
                .get_by_ifindex(&arenas.interfaces, ifindex)
                .map(|(iface_idx, _)| (area_idx, iface_idx))
        })
        .ok_or(Error::UnknownInterface(ifindex))?;
    let area = &arenas.areas[area_idx];
    let iface = &arenas.interfaces[iface_idx];

    // Ignore packets received on inactive or passive interfaces.
    if iface.is_down() || iface.is_passive() {
        return Ok(());
    }

    // Packets destined to AllDRouters are only accepted by the DR and BDR.
    if dst == ALL_DR_RTRS && !iface.is_dr_or_backup() {
        return Ok(());
    }

    // Check if the Area ID matches.
    let hdr = packet.hdr().clone();
    if hdr.area_id != area.area_id {
        return Err(Error::InterfaceCfgError(
            iface.name.clone(),
            src,
            hdr.pkt_type,
            InterfaceCfgError::AreaIdMismatch(hdr.area_id, area.area_id),
        ));
    }

    // Packets with a different Instance ID belong to another protocol
    // instance running over the same link, so they're silently ignored.
    if hdr.instance_id != iface.config.instance_id {
        return Ok(());
    }

    // Discard our own packets.
    if hdr.router_id == instance.state.router_id {
        return Ok(());
    }

    Debug::PacketRx(iface, &src, &dst, &packet).log();

    match packet {
        Packet::Hello(hello) => {
            // Hello packets can create new neighbors.
            let iface = &mut arenas.interfaces[iface_idx];
            process_packet_hello(
                iface,
                area,
                instance,
                &mut arenas.neighbors,
                src,
                hello,
            )
        }
        Packet::DbDesc(dbdesc) => {
            let nbr_idx = packet_nbr(iface, &arenas.neighbors, src, &hdr)?;
            let nbr = &mut arenas.neighbors[nbr_idx];
            process_packet_dbdesc(nbr, iface, area, instance, src, dbdesc)
        }
        Packet::LsRequest(ls_req) => {
            let nbr_idx = packet_nbr(iface, &arenas.neighbors, src, &hdr)?;
            let nbr = &mut arenas.neighbors[nbr_idx];
            process_packet_lsreq(nbr, iface, area, instance, ls_req);
            Ok(())
        }
        Packet::LsUpdate(ls_upd) => {
            let nbr_idx = packet_nbr(iface, &arenas.neighbors, src, &hdr)?;
            process_packet_lsupd(
                instance, arenas, area_idx, iface_idx, nbr_idx, ls_upd,
            );
            Ok(())
        }
        Packet::LsAck(ls_ack) => {
            let nbr_idx = packet_nbr(iface, &arenas.neighbors, src, &hdr)?;
            let nbr = &mut arenas.neighbors[nbr_idx];
            process_packet_lsack(nbr, ls_ack);
            Ok(())
        }
    }
}

// Packets other than Hellos must come from an existing neighbor.
fn packet_nbr(
    iface: &Interface,
    neighbors: &Arena<Neighbor>,
    src: Ipv6Addr,
    hdr: &PacketHdr,
) -> Result<NeighborIndex, Error> {
    iface
        .state
        .neighbors
        .get_by_router_id(neighbors, hdr.router_id)
        .map(|(nbr_idx, _)| nbr_idx)
        .ok_or(Error::UnknownNeighbor(src, hdr.router_id))
}

// ===== Hello packets =====

fn process_packet_hello(
    iface: &mut Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    neighbors: &mut Arena<Neighbor>,
    src: Ipv6Addr,
    hello: Hello,
) -> Result<(), Error> {
    // Perform all the required sanity checks.
    if let Err(error) = validate_hello(iface, area, instance, &hello) {
        return Err(Error::InterfaceCfgError(
            iface.name.clone(),
            src,
            PacketType::Hello,
            error,
        ));
    }

    // Find or create the neighbor.
    let router_id = hello.hdr.router_id;
    let nbr_idx = iface
        .state
        .neighbors
        .get_by_router_id(neighbors, router_id)
        .map(|(nbr_idx, _)| nbr_idx);
    let nbr = match nbr_idx {
        Some(nbr_idx) => &mut neighbors[nbr_idx],
        None => {
            let (_, nbr) =
                iface.state.neighbors.insert(neighbors, router_id, src);
            nbr.iface_id = Some(hello.iface_id);
            nbr.priority = hello.priority;
            if iface.is_broadcast_or_nbma() {
                nbr.dr = hello.dr;
                nbr.bdr = hello.bdr;
            }

            // A late-joining neighbor might require the network DR/BDR to be
            // elected again.
            if iface.state.neighbors.count() == 1 && iface.is_dr_or_backup() {
                instance.tx.protocol_input.ism_event(
                    area.id,
                    iface.id,
                    ism::Event::NeighborRevived,
                );
            }

            nbr
        }
    };
    nbr.src = src;

    // Trigger the HelloReceived event.
    nbr.fsm(iface, area, instance, nsm::Event::HelloRcvd);

    // Check whether the neighbor sees us.
    if !hello.neighbors.contains(&instance.state.router_id) {
        nbr.fsm(iface, area, instance, nsm::Event::OneWayRcvd);
        nbr.iface_id = Some(hello.iface_id);
        nbr.priority = hello.priority;
        nbr.dr = hello.dr;
        nbr.bdr = hello.bdr;
        return Ok(());
    }
    nbr.fsm(iface, area, instance, nsm::Event::TwoWayRcvd);

    // A change in the neighbor's Interface ID affects the contents of our
    // Router-LSA.
    if nbr.iface_id != Some(hello.iface_id) {
        nbr.iface_id = Some(hello.iface_id);
        if nbr.state == nsm::State::Full {
            instance.tx.protocol_input.lsa_orig_event(
                LsaOriginateEvent::NeighborToFromFull {
                    area_id: area.id,
                    iface_id: iface.id,
                },
            );
        }
    }

    if iface.is_broadcast_or_nbma() {
        let mut nbr_change = false;

        // Check for a change in the neighbor's Router Priority.
        if nbr.priority != hello.priority {
            nbr.priority = hello.priority;
            nbr_change = true;
        }

        // Check whether the neighbor is declaring itself the DR or BDR while
        // the network DR/BDR is still undetermined.
        if iface.state.ism_state == ism::State::Waiting
            && ((hello.dr == Some(router_id) && hello.bdr.is_none())
                || hello.bdr == Some(router_id))
        {
            instance.tx.protocol_input.ism_event(
                area.id,
                iface.id,
                ism::Event::BackupSeen,
            );
        }

        // Check for a change in the neighbor's DR/BDR declarations.
        let was_dr = nbr.dr == Some(router_id);
        let is_dr = hello.dr == Some(router_id);
        let was_bdr = nbr.bdr == Some(router_id);
        let is_bdr = hello.bdr == Some(router_id);
        if was_dr != is_dr || was_bdr != is_bdr {
            nbr_change = true;
        }
        nbr.dr = hello.dr;
        nbr.bdr = hello.bdr;

        if nbr_change {
            instance.tx.protocol_input.ism_event(
                area.id,
                iface.id,
                ism::Event::NbrChange,
            );
        }
    }

    Ok(())
}

fn validate_hello(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    hello: &Hello,
) -> Result<(), InterfaceCfgError> {
    // Non-IPv6 address families require the AF-bit.
    if instance.config.af == ospf6_utils::ip::AddressFamily::Ipv4
        && !hello.options.contains(Options::AF)
    {
        return Err(InterfaceCfgError::AfBitClear);
    }

    // Check for HelloInterval mismatch.
    if hello.hello_interval != iface.config.hello_interval {
        return Err(InterfaceCfgError::HelloIntervalMismatch(
            hello.hello_interval,
            iface.config.hello_interval,
        ));
    }

    // Check for RouterDeadInterval mismatch.
    if hello.dead_interval != iface.config.dead_interval {
        return Err(InterfaceCfgError::DeadIntervalMismatch(
            hello.dead_interval,
            iface.config.dead_interval,
        ));
    }

    // Check for ExternalRoutingCapability mismatch.
    let e_bit = hello.options.contains(Options::E);
    if e_bit != (area.config.area_type == AreaType::Normal) {
        return Err(InterfaceCfgError::ExternalRoutingCapabilityMismatch(
            e_bit,
        ));
    }

    // Check for duplicate Router ID.
    if hello.hdr.router_id == instance.state.router_id {
        return Err(InterfaceCfgError::DuplicateRouterId(hello.hdr.router_id));
    }

    Ok(())
}

// ===== Database Description packets =====

fn process_packet_dbdesc(
    nbr: &mut Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    src: Ipv6Addr,
    dbdesc: DbDesc,
) -> Result<(), Error> {
    // MTU mismatch check.
    let mtu = iface.system.mtu.unwrap_or(iface.config.mtu.into());
    if u32::from(dbdesc.mtu) > mtu {
        return Err(Error::InterfaceCfgError(
            iface.name.clone(),
            src,
            PacketType::DbDesc,
            InterfaceCfgError::MtuMismatch(dbdesc.mtu),
        ));
    }

    match nbr.state {
        nsm::State::Down | nsm::State::Attempt | nsm::State::TwoWay => {
            return Err(Error::DbDescReject(nbr.router_id, nbr.state));
        }
        nsm::State::Init => {
            nbr.fsm(iface, area, instance, nsm::Event::TwoWayRcvd);
            if nbr.state != nsm::State::ExStart {
                return Ok(());
            }
            if !process_dbdesc_negotiation(nbr, iface, area, instance, &dbdesc)
            {
                return Ok(());
            }
        }
        nsm::State::ExStart => {
            if !process_dbdesc_negotiation(nbr, iface, area, instance, &dbdesc)
            {
                return Ok(());
            }
        }
        nsm::State::Exchange => {
            // Check for duplicate packets.
            if nbr.dbdesc_is_dup(&dbdesc) {
                if !nbr.dd_flags.contains(DbDescFlags::MS) {
                    // The slave must retransmit its last packet.
                    output::rxmt_dbdesc(nbr, iface, instance);
                }
                return Ok(());
            }

            // Check for inconsistent flags.
            if dbdesc.dd_flags.contains(DbDescFlags::I)
                || dbdesc.dd_flags.contains(DbDescFlags::MS)
                    == nbr.dd_flags.contains(DbDescFlags::MS)
            {
                let reason = SeqNoMismatchReason::InconsistentFlags;
                let event = nsm::Event::SeqNoMismatch(reason);
                nbr.fsm(iface, area, instance, event);
                return Ok(());
            }

            // Check for inconsistent options.
            if nbr.options.is_some_and(|options| options != dbdesc.options) {
                let reason = SeqNoMismatchReason::InconsistentOptions;
                let event = nsm::Event::SeqNoMismatch(reason);
                nbr.fsm(iface, area, instance, event);
                return Ok(());
            }

            // Check for inconsistent sequence number.
            let expected_seq_no = if nbr.dd_flags.contains(DbDescFlags::MS) {
                nbr.dd_seq_no
            } else {
                nbr.dd_seq_no.wrapping_add(1)
            };
            if dbdesc.dd_seq_no != expected_seq_no {
                let reason = SeqNoMismatchReason::InconsistentSeqNo;
                let event = nsm::Event::SeqNoMismatch(reason);
                nbr.fsm(iface, area, instance, event);
                return Ok(());
            }
        }
        nsm::State::Loading | nsm::State::Full => {
            // Only duplicates are expected at this point.
            if nbr.dbdesc_is_dup(&dbdesc) {
                if !nbr.dd_flags.contains(DbDescFlags::MS) {
                    output::rxmt_dbdesc(nbr, iface, instance);
                }
            } else {
                let reason = SeqNoMismatchReason::UnexpectedDbDesc;
                let event = nsm::Event::SeqNoMismatch(reason);
                nbr.fsm(iface, area, instance, event);
            }
            return Ok(());
        }
    }

    // The packet was accepted as the next in sequence.
    nbr.rxmt_dbdesc_stop();

    // Process the LSA headers.
    for lsa_hdr in &dbdesc.lsa_hdrs {
        if !lsa_type_is_valid(iface, area, lsa_hdr.lsa_type) {
            let reason = SeqNoMismatchReason::InvalidLsaType;
            nbr.fsm(iface, area, instance, nsm::Event::SeqNoMismatch(reason));
            return Ok(());
        }

        // RFC 5243: there's no need to describe LSAs the neighbor already
        // has in an equal or more recent instance.
        let lsa_key = lsa_hdr.key();
        if let Some(lsa) = nbr.lists.db_summary.get(&lsa_key)
            && lsa.hdr.compare(lsa_hdr) != Ordering::Greater
        {
            nbr.lists.db_summary.remove(&lsa_key);
        }

        // Request the LSA if we don't have it or if our copy is older.
        let lsdb = match lsa_hdr.lsa_type.scope() {
            LsaScope::Link => &iface.state.lsdb,
            LsaScope::Area => &area.state.lsdb,
            LsaScope::As => &instance.state.lsdb,
        };
        if let Some(lse) = lsdb.get(&lsa_key)
            && lse.data.hdr.compare(lsa_hdr) != Ordering::Less
        {
            continue;
        }
        nbr.lists.ls_request.insert(lsa_key, *lsa_hdr);
    }

    // Start sending LS Requests as soon as possible.
    if !nbr.lists.ls_request.is_empty()
        && nbr.lists.ls_request_pending.is_empty()
    {
        output::send_lsreq(nbr, iface, area, instance);
    }

    let mut exchange_done = false;
    if nbr.dd_flags.contains(DbDescFlags::MS) {
        // Master.
        nbr.dd_seq_no = nbr.dd_seq_no.wrapping_add(1);
        if !nbr.dd_flags.contains(DbDescFlags::M)
            && !dbdesc.dd_flags.contains(DbDescFlags::M)
        {
            exchange_done = true;
        } else {
            output::send_dbdesc(nbr, iface, area, instance);
        }
    } else {
        // Slave.
        nbr.dd_seq_no = dbdesc.dd_seq_no;
        output::send_dbdesc(nbr, iface, area, instance);
        if !nbr.dd_flags.contains(DbDescFlags::M)
            && !dbdesc.dd_flags.contains(DbDescFlags::M)
        {
            exchange_done = true;
        }
    }

    // Save the last received Database Description packet.
    nbr.last_rcvd_dbdesc = Some(LastDbDesc {
        options: dbdesc.options,
        dd_flags: dbdesc.dd_flags,
        dd_seq_no: dbdesc.dd_seq_no,
    });

    if exchange_done {
        nbr.fsm(iface, area, instance, nsm::Event::ExchangeDone);
        if nbr.state == nsm::State::Loading {
            nbr.loading_done_check(iface, area, instance);
        }
    }

    Ok(())
}

// Performs the master/slave negotiation.
//
// Returns whether the negotiation has completed.
fn process_dbdesc_negotiation(
    nbr: &mut Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    dbdesc: &DbDesc,
) -> bool {
    let router_id = instance.state.router_id;
    let init_flags = DbDescFlags::I | DbDescFlags::M | DbDescFlags::MS;

    if dbdesc.dd_flags.contains(init_flags)
        && dbdesc.lsa_hdrs.is_empty()
        && dbdesc.hdr.router_id > router_id
    {
        // The neighbor is the master.
        nbr.dd_flags.remove(DbDescFlags::MS);
        nbr.dd_seq_no = dbdesc.dd_seq_no;
    } else if !dbdesc.dd_flags.intersects(DbDescFlags::I | DbDescFlags::MS)
        && dbdesc.dd_seq_no == nbr.dd_seq_no
        && dbdesc.hdr.router_id < router_id
    {
        // We're the master.
    } else {
        return false;
    }

    nbr.options = Some(dbdesc.options);
    nbr.fsm(iface, area, instance, nsm::Event::NegotiationDone);
    true
}

// ===== LS Request packets =====

fn process_packet_lsreq(
    nbr: &mut Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    ls_req: LsRequest,
) {
    // LS Requests are only accepted during or after the database exchange.
    if nbr.state < nsm::State::Exchange {
        Debug::PacketRxIgnore(nbr.router_id, &nbr.state).log();
        return;
    }

    // Collect the requested LSAs.
    let mut lsas = vec![];
    for lsa_key in &ls_req.entries {
        let lsdb = match lsa_key.lsa_type.scope() {
            LsaScope::Link => &iface.state.lsdb,
            LsaScope::Area => &area.state.lsdb,
            LsaScope::As => &instance.state.lsdb,
        };
        match lsdb.get(lsa_key) {
            Some(lse) => lsas.push(lse.data.clone()),
            None => {
                // The neighbor requested an LSA we don't have.
                nbr.fsm(iface, area, instance, nsm::Event::BadLsReq);
                return;
            }
        }
    }

    // Send the requested LSAs.
    output::send_lsupd_direct(nbr, iface, area, instance, lsas);
}

// ===== LS Update packets =====

fn process_packet_lsupd(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
    nbr_idx: NeighborIndex,
    ls_upd: LsUpdate,
) {
    // LS Updates are only accepted during or after the database exchange.
    let nbr = &arenas.neighbors[nbr_idx];
    if nbr.state < nsm::State::Exchange {
        Debug::PacketRxIgnore(nbr.router_id, &nbr.state).log();
        return;
    }

    for lsa in ls_upd.lsas {
        let stop = process_packet_lsupd_lsa(
            instance,
            arenas,
            area_idx,
            iface_idx,
            nbr_idx,
            Arc::new(lsa),
        );
        if stop {
            break;
        }
    }
}

// Processes a single LSA received in an LS Update packet.
//
// Returns whether the processing of the remaining LSAs should be stopped.
fn process_packet_lsupd_lsa(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
    nbr_idx: NeighborIndex,
    lsa: Arc<Lsa>,
) -> bool {
    let area = &arenas.areas[area_idx];
    let iface = &arenas.interfaces[iface_idx];
    let nbr = &arenas.neighbors[nbr_idx];
    let lsa_key = lsa.hdr.key();

    // (1) Discard LSAs whose header doesn't match the body.
    if lsa.body.lsa_type() != lsa.hdr.lsa_type {
        Error::LsaCheckFailed(lsa_key).log();
        return false;
    }

    // (2-3) Discard LSAs whose type can't be exchanged on this interface.
    if !lsa_type_is_valid(iface, area, lsa.hdr.lsa_type) {
        return false;
    }

    let lsdb_idx = match lsa.hdr.lsa_type.scope() {
        LsaScope::Link => LsdbIndex::Link(area_idx, iface_idx),
        LsaScope::Area => LsdbIndex::Area(area_idx),
        LsaScope::As => LsdbIndex::As,
    };
    let (lsdb_id, lsdb) = lsdb_get(
        &instance.state.lsdb,
        &arenas.areas,
        &arenas.interfaces,
        lsdb_idx,
    );
    let lse = lsdb.get(&lsa_key).cloned();

    // (4) MaxAge LSAs not present in the database are acknowledged and
    // discarded, unless some neighbor is still exchanging its database.
    if lsa.hdr.is_maxage()
        && lse.is_none()
        && !arenas.neighbors.iter().any(|(_, nbr)| {
            matches!(nbr.state, nsm::State::Exchange | nsm::State::Loading)
        })
    {
        output::send_lsack_direct(nbr, iface, area, instance, &lsa.hdr);
        return false;
    }

    let cmp = match &lse {
        Some(lse) => lsa.hdr.compare(&lse.data.hdr),
        None => Ordering::Greater,
    };
    match cmp {
        // (5) The received LSA is more recent.
        Ordering::Greater => {
            // (5.a) Enforce MinLSArrival.
            if let Some(lse) = &lse
                && lsdb::lsa_min_arrival_check(lse)
            {
                Debug::LsaMinArrivalDiscard(nbr.router_id, &lsa.hdr).log();
                return false;
            }
            let nbr_router_id = nbr.router_id;
            let nbr_is_dr = iface.is_dr(nbr_router_id);

            // (5.b) Flood the LSA out some subset of the interfaces.
            let flooded_back = flood::flood(
                instance,
                &arenas.areas,
                &mut arenas.interfaces,
                &mut arenas.neighbors,
                lsdb_idx,
                &lsa,
                Some((iface_idx, nbr_idx)),
            );

            // (5.d) Install the LSA in the LSDB.
            lsdb::install(
                instance,
                arenas,
                lsdb_idx,
                lsa.clone(),
                LsaSource::Flooded,
            );
            instance.state.rx_lsa_count += 1;

            // (5.e) Possibly acknowledge the receipt of the LSA.
            let area = &arenas.areas[area_idx];
            let iface = &mut arenas.interfaces[iface_idx];
            let nbr = &arenas.neighbors[nbr_idx];
            let ack = lsa_ack_type(
                iface.state.ism_state,
                cmp,
                flooded_back,
                false,
                nbr_is_dr,
            );
            if ack == Some(LsaAckType::Delayed) {
                let dst = output::delayed_ack_dest(iface, nbr);
                iface.enqueue_delayed_ack(area, instance, dst, &lsa.hdr);
            }

            // A new Link-LSA affects the prefixes advertised for the link.
            if lsa.hdr.lsa_type == LsaType::Link {
                instance.tx.protocol_input.lsa_orig_event(
                    LsaOriginateEvent::LinkLsaRcvd {
                        area_id: area.id,
                        iface_id: iface.id,
                    },
                );
            }

            // (5.f) Self-originated LSAs are either updated or flushed.
            if lsa.hdr.adv_rtr == instance.state.router_id {
                Debug::LsaSelfOriginated(nbr_router_id, &lsa.hdr).log();
                instance.tx.protocol_input.lsa_orig_event(
                    LsaOriginateEvent::SelfOriginatedLsaRcvd {
                        lsdb_id,
                        lsa_key,
                    },
                );
            }
        }
        // (6) The LSA is on the Link state request list.
        _ if nbr.lists.ls_request.contains_key(&lsa_key)
            || nbr.lists.ls_request_pending.contains_key(&lsa_key) =>
        {
            let nbr = &mut arenas.neighbors[nbr_idx];
            nbr.fsm(iface, area, instance, nsm::Event::BadLsReq);
            return true;
        }
        // (7) The received LSA is the same instance as the database copy.
        Ordering::Equal => {
            let iface = &mut arenas.interfaces[iface_idx];
            let nbr = &mut arenas.neighbors[nbr_idx];

            // Implied acknowledgment.
            let implied_ack = nbr.lists.ls_rxmt.remove(&lsa_key).is_some();
            if implied_ack {
                nbr.rxmt_lsupd_stop_check();
            }

            let ism_state = iface.state.ism_state;
            match lsa_ack_type(ism_state, cmp, false, implied_ack, false) {
                Some(LsaAckType::Delayed) => {
                    let dst = output::delayed_ack_dest(iface, nbr);
                    iface.enqueue_delayed_ack(area, instance, dst, &lsa.hdr);
                }
                Some(LsaAckType::Direct) => {
                    let hdr = &lsa.hdr;
                    output::send_lsack_direct(nbr, iface, area, instance, hdr);
                }
                None => (),
            }
        }
        // (8) The database copy is more recent.
        Ordering::Less => {
            let Some(lse) = lse else {
                return false;
            };

            // Wrapping sequence numbers are discarded until the MaxAge copy
            // is flushed.
            if lse.data.hdr.is_maxage() && lse.data.hdr.seq_no == LSA_MAX_SEQ_NO
            {
                return false;
            }

            if lsdb::lsa_min_arrival_check(&lse) {
                Debug::LsaMinArrivalDiscard(nbr.router_id, &lsa.hdr).log();
                return false;
            }

            // Send the database copy back to the neighbor.
            output::send_lsupd_direct(
                nbr,
                iface,
                area,
                instance,
                vec![lse.data.clone()],
            );
        }
    }

    false
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LsaAckType {
    Delayed,
    Direct,
}

// Decides how the receipt of an LSA is acknowledged (RFC 2328 - Section
// 13.5), given how the received instance compares to the database copy.
//
// The sending neighbor being the DR only matters for newer instances.
fn lsa_ack_type(
    ism_state: ism::State,
    cmp: Ordering,
    flooded_back: bool,
    implied_ack: bool,
    from_dr: bool,
) -> Option<LsaAckType> {
    let backup = ism_state == ism::State::Backup;
    match cmp {
        Ordering::Greater if flooded_back => None,
        Ordering::Greater if backup && !from_dr => None,
        Ordering::Greater => Some(LsaAckType::Delayed),
        Ordering::Equal if !implied_ack => Some(LsaAckType::Direct),
        Ordering::Equal if backup => Some(LsaAckType::Delayed),
        Ordering::Equal | Ordering::Less => None,
    }
}

// ===== LS Ack packets =====

fn process_packet_lsack(nbr: &mut Neighbor, ls_ack: LsAck) {
    // LS Acks are only accepted during or after the database exchange.
    if nbr.state < nsm::State::Exchange {
        Debug::PacketRxIgnore(nbr.router_id, &nbr.state).log();
        return;
    }

    for lsa_hdr in &ls_ack.lsa_hdrs {
        let lsa_key = lsa_hdr.key();
        let Some(lsa) = nbr.lists.ls_rxmt.get(&lsa_key) else {
            continue;
        };

        if lsa.hdr.compare(lsa_hdr) == Ordering::Equal {
            nbr.lists.ls_rxmt.remove(&lsa_key);
            nbr.rxmt_lsupd_stop_check();
        } else {
            Debug::QuestionableAck(nbr.router_id, lsa_hdr).log();
        }
    }
}

// ===== Southbound interface updates =====

pub(crate) fn process_iface_update(
    instance: &mut Instance,
    msg: InterfaceUpdateMsg,
) -> Result<(), Error> {
    // Update the system data of all matching interfaces.
    let mut found = false;
    for area_idx in instance.arenas.areas.indexes().collect::<Vec<_>>() {
        let area = &mut instance.arenas.areas[area_idx];
        if let Some((_, iface)) = area
            .interfaces
            .get_mut_by_name(&mut instance.arenas.interfaces, &msg.ifname)
        {
            iface.system.flags = msg.flags;
            iface.system.mtu = Some(msg.mtu);
            found = true;
        }
    }
    if !found {
        return Ok(());
    }

    // Check if the interfaces need to be started or stopped.
    if let Some((instance, arenas)) = instance.as_up() {
        for area in arenas.areas.iter() {
            if let Some((iface_idx, _)) =
                area.interfaces.get_by_name(&arenas.interfaces, &msg.ifname)
            {
                let iface = &mut arenas.interfaces[iface_idx];
                iface.update(area, &instance, &mut arenas.neighbors);
            }
        }
    }

    Ok(())
}

pub(crate) fn process_addr_add(
    instance: &mut Instance,
    msg: AddressMsg,
) -> Result<(), Error> {
    process_addr_change(instance, msg, true)
}

pub(crate) fn process_addr_del(
    instance: &mut Instance,
    msg: AddressMsg,
) -> Result<(), Error> {
    process_addr_change(instance, msg, false)
}

fn process_addr_change(
    instance: &mut Instance,
    msg: AddressMsg,
    add: bool,
) -> Result<(), Error> {
    let is_active = instance.is_active();
    for area_idx in instance.arenas.areas.indexes().collect::<Vec<_>>() {
        let area = &mut instance.arenas.areas[area_idx];
        let Some((_, iface)) = area
            .interfaces
            .get_mut_by_name(&mut instance.arenas.interfaces, &msg.ifname)
        else {
            continue;
        };

        // Link-local addresses are tracked separately.
        match msg.addr.ip() {
            IpAddr::V6(addr) if addr.is_unicast_link_local() => {
                if add {
                    iface.system.linklocal = Some(addr);
                } else if iface.system.linklocal == Some(addr) {
                    iface.system.linklocal = None;
                }
            }
            _ => {
                let changed = if add {
                    iface.system.addr_list.insert(msg.addr)
                } else {
                    iface.system.addr_list.remove(&msg.addr)
                };
                if !changed {
                    continue;
                }
            }
        }

        // (Re)originate the LSAs advertising the interface prefixes.
        if is_active && !iface.is_down() {
            instance.tx.protocol_input.lsa_orig_event(
                LsaOriginateEvent::InterfaceAddrAddDel {
                    area_id: area.id,
                    iface_id: iface.id,
                },
            );
        }
    }

    Ok(())
}

// ===== LSA origination event =====

pub(crate) fn process_lsa_orig_event(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    event: LsaOriginateEvent,
) -> Result<(), Error> {
    lsdb::lsa_orig_event(instance, arenas, event)
}

// ===== LSDB aging =====

pub(crate) fn process_lsdb_age_tick(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) -> Result<(), Error> {
    lsdb::age_tick(instance, arenas);

    // Rearm the aging timer.
    if let Some(age_timer) = &mut instance.state.age_timer {
        age_timer.reset(None);
    }

    Ok(())
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsa_ack_newer() {
        use ism::State::{Backup, DrOther};

        let cmp = Ordering::Greater;
        let delayed = Some(LsaAckType::Delayed);
        assert_eq!(lsa_ack_type(DrOther, cmp, false, false, false), delayed);
        assert_eq!(lsa_ack_type(DrOther, cmp, true, false, false), None);

        // The BDR only acknowledges new instances flooded by the DR.
        assert_eq!(lsa_ack_type(Backup, cmp, false, false, true), delayed);
        assert_eq!(lsa_ack_type(Backup, cmp, false, false, false), None);
        assert_eq!(lsa_ack_type(Backup, cmp, true, false, true), None);
    }

    #[test]
    fn test_lsa_ack_duplicate() {
        use ism::State::{Backup, Dr, DrOther, PointToPoint};

        let cmp = Ordering::Equal;
        let delayed = Some(LsaAckType::Delayed);
        let direct = Some(LsaAckType::Direct);

        // Duplicates that aren't implied acks are acknowledged directly.
        for state in [Backup, Dr, DrOther, PointToPoint] {
            assert_eq!(lsa_ack_type(state, cmp, false, false, false), direct);
        }

        // Implied acks are only answered by the BDR, whoever sent them.
        assert_eq!(lsa_ack_type(Backup, cmp, false, true, false), delayed);
        assert_eq!(lsa_ack_type(Backup, cmp, false, true, true), delayed);
        assert_eq!(lsa_ack_type(Dr, cmp, false, true, false), None);
        assert_eq!(lsa_ack_type(DrOther, cmp, false, true, true), None);
    }

    #[test]
    fn test_lsa_ack_older() {
        let cmp = Ordering::Less;
        let state = ism::State::DrOther;
        assert_eq!(lsa_ack_type(state, cmp, false, false, false), None);
    }
}
