//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::instance::InstanceChannelsTx;
use crate::interface::{Interface, InterfaceType};
use crate::packet::Packet;
use crate::tasks::messages::ProtocolOutputMsg;
use crate::tasks::messages::output::{MulticastMsg, NetTxPacketMsg};

// Hop limit used on virtual links.
pub const VIRTUAL_LINK_TTL: u8 = 64;

// OSPFv3 multicast addresses.
pub const ALL_SPF_RTRS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 5);
pub const ALL_DR_RTRS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 6);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum MulticastAddr {
    AllSpfRtrs,
    AllDrRtrs,
}

// ===== impl MulticastAddr =====

impl MulticastAddr {
    pub fn addr(&self) -> Ipv6Addr {
        match self {
            MulticastAddr::AllSpfRtrs => ALL_SPF_RTRS,
            MulticastAddr::AllDrRtrs => ALL_DR_RTRS,
        }
    }
}

// ===== global functions =====

// Returns the hop limit of packets sent through the given interface.
pub(crate) fn hop_limit(iface: &Interface) -> u8 {
    if iface.config.if_type == InterfaceType::VirtualLink {
        VIRTUAL_LINK_TTL
    } else {
        1
    }
}

pub(crate) fn send_packet(
    iface: &Interface,
    tx: &InstanceChannelsTx,
    dst: Ipv6Addr,
    packet: Packet,
) {
    Debug::PacketTx(&iface.name, &dst, &packet).log();

    let msg = ProtocolOutputMsg::NetTxPacket(NetTxPacketMsg {
        ifname: iface.name.clone(),
        ifindex: iface.system.ifindex,
        src: iface.system.linklocal,
        dst,
        hop_limit: hop_limit(iface),
        packet,
    });
    let _ = tx.protocol_output.send(msg);
}

pub(crate) fn join_multicast(
    iface: &Interface,
    tx: &InstanceChannelsTx,
    addr: MulticastAddr,
) {
    let group = addr.addr();
    Debug::MulticastJoin(&iface.name, &group).log();

    let msg = ProtocolOutputMsg::JoinGroup(MulticastMsg {
        ifname: iface.name.clone(),
        group,
    });
    let _ = tx.protocol_output.send(msg);
}

pub(crate) fn leave_multicast(
    iface: &Interface,
    tx: &InstanceChannelsTx,
    addr: MulticastAddr,
) {
    let group = addr.addr();
    Debug::MulticastLeave(&iface.name, &group).log();

    let msg = ProtocolOutputMsg::LeaveGroup(MulticastMsg {
        ifname: iface.name.clone(),
        group,
    });
    let _ = tx.protocol_output.send(msg);
}
