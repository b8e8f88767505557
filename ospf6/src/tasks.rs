//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use ospf6_utils::task::TimeoutTask;

use crate::area::Area;
use crate::instance::InstanceUpView;
use crate::interface::{Interface, ism};
use crate::lsdb::LSDB_AGE_TICK;
use crate::neighbor::{Neighbor, nsm};

//
// OSPFv3 tasks diagram:
//
//                                    +--------------+
//                   net_rx (Nx)   -> |              | -> (Nx) net_tx
//                                    |              |
//          ism_hello_timer (Nx)   -> |              | -> (Nx) mcast join/leave
//           ism_wait_timer (Nx)   -> |              |
//            ism_ack_timer (Nx)   -> |              |
//                                    |   instance   |
//     nsm_inactivity_timer (Nx)   -> |              |
//           nsm_poll_timer (Nx)   -> |              |
//           nsm_rxmt_timer (Nx)   -> |              |
//                                    |              |
//           lsdb_age_timer (1x)   -> |              | -> (1x) route table
//                                    +--------------+
//
// All timers are deadlines kept in the instance's timer wheel. Expired
// timers are delivered back to the instance as regular input messages, so
// every event is processed to completion before the next one starts.
//

// OSPFv3 inter-task message types.
pub mod messages {
    use std::collections::BTreeMap;
    use std::net::Ipv6Addr;

    use ipnetwork::IpNetwork;
    use serde::{Deserialize, Serialize};

    use crate::collections::{AreaKey, InterfaceKey, NeighborKey};
    use crate::interface::ism;
    use crate::lsdb::LsaOriginateEvent;
    use crate::neighbor::nsm;
    use crate::packet::Packet;
    use crate::route::RouteNet;

    // Type aliases.
    pub type ProtocolInputMsg = input::ProtocolMsg;
    pub type ProtocolOutputMsg = output::ProtocolMsg;

    // Input messages (external world or child task -> instance).
    pub mod input {
        use ospf6_utils::southbound::{AddressMsg, InterfaceUpdateMsg};

        use super::*;

        #[derive(Clone, Debug, Deserialize, Serialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum ProtocolMsg {
            IsmEvent(IsmEventMsg),
            NsmEvent(NsmEventMsg),
            NetRxPacket(NetRxPacketMsg),
            IfaceUpdate(InterfaceUpdateMsg),
            AddressAdd(AddressMsg),
            AddressDel(AddressMsg),
            LsaOrigEvent(LsaOrigEventMsg),
            LsdbAgeTick,
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct IsmEventMsg {
            pub area_key: AreaKey,
            pub iface_key: InterfaceKey,
            pub event: ism::Event,
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct NsmEventMsg {
            pub area_key: AreaKey,
            pub iface_key: InterfaceKey,
            pub nbr_key: NeighborKey,
            pub event: nsm::Event,
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct NetRxPacketMsg {
            pub ifindex: u32,
            pub src: Ipv6Addr,
            pub dst: Ipv6Addr,
            pub packet: Packet,
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct LsaOrigEventMsg {
            pub event: LsaOriginateEvent,
        }
    }

    // Output messages (instance -> external world).
    pub mod output {
        use super::*;

        #[derive(Clone, Debug, Deserialize, Serialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum ProtocolMsg {
            NetTxPacket(NetTxPacketMsg),
            JoinGroup(MulticastMsg),
            LeaveGroup(MulticastMsg),
            RouteTable(RouteTableMsg),
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct NetTxPacketMsg {
            pub ifname: String,
            pub ifindex: u32,
            pub src: Option<Ipv6Addr>,
            pub dst: Ipv6Addr,
            pub hop_limit: u8,
            pub packet: Packet,
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct MulticastMsg {
            pub ifname: String,
            pub group: Ipv6Addr,
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct RouteTableMsg {
            pub routes: BTreeMap<IpNetwork, RouteNet>,
        }
    }
}

use messages::ProtocolInputMsg;
use messages::input::{IsmEventMsg, NsmEventMsg};

// ===== OSPFv3 timers =====

fn ism_timer(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    timeout: Duration,
    event: ism::Event,
) -> TimeoutTask<ProtocolInputMsg> {
    let msg = ProtocolInputMsg::IsmEvent(IsmEventMsg {
        area_key: area.id.into(),
        iface_key: iface.id.into(),
        event,
    });
    TimeoutTask::new(timeout, msg, &instance.tx.protocol_input.timer)
}

fn nsm_timer(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    timeout: Duration,
    event: nsm::Event,
) -> TimeoutTask<ProtocolInputMsg> {
    let msg = ProtocolInputMsg::NsmEvent(NsmEventMsg {
        area_key: area.id.into(),
        iface_key: iface.id.into(),
        nbr_key: nbr.id.into(),
        event,
    });
    TimeoutTask::new(timeout, msg, &instance.tx.protocol_input.timer)
}

// Interface Hello timer.
//
// The timer is re-armed by the HelloTimer event handler.
pub(crate) fn ism_hello_timer(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    timeout: Duration,
) -> TimeoutTask<ProtocolInputMsg> {
    ism_timer(iface, area, instance, timeout, ism::Event::HelloTimer)
}

// Interface wait timer.
pub(crate) fn ism_wait_timer(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) -> TimeoutTask<ProtocolInputMsg> {
    let timeout = Duration::from_secs(iface.config.dead_interval.into());
    ism_timer(iface, area, instance, timeout, ism::Event::WaitTimer)
}

// Interface delayed acknowledgment timer.
pub(crate) fn ism_ack_timer(
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) -> TimeoutTask<ProtocolInputMsg> {
    let timeout = Duration::from_secs(1);
    ism_timer(iface, area, instance, timeout, ism::Event::AckTimer)
}

// Neighbor inactivity timer.
pub(crate) fn nsm_inactivity_timer(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) -> TimeoutTask<ProtocolInputMsg> {
    let timeout = Duration::from_secs(iface.config.dead_interval.into());
    nsm_timer(
        nbr,
        iface,
        area,
        instance,
        timeout,
        nsm::Event::InactivityTimer,
    )
}

// NBMA neighbor poll timer.
pub(crate) fn nsm_poll_timer(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
) -> TimeoutTask<ProtocolInputMsg> {
    let timeout = Duration::from_secs(iface.config.poll_interval.into());
    nsm_timer(nbr, iface, area, instance, timeout, nsm::Event::PollTimer)
}

// Neighbor packet retransmission timer (DD, LS Request or LS Update).
pub(crate) fn nsm_rxmt_timer(
    nbr: &Neighbor,
    iface: &Interface,
    area: &Area,
    instance: &InstanceUpView<'_>,
    interval: u16,
    event: nsm::Event,
) -> TimeoutTask<ProtocolInputMsg> {
    let timeout = Duration::from_secs(interval.into());
    nsm_timer(nbr, iface, area, instance, timeout, event)
}

// LSDB aging timer.
pub(crate) fn lsdb_age_timer(
    instance: &InstanceUpView<'_>,
) -> TimeoutTask<ProtocolInputMsg> {
    TimeoutTask::new(
        LSDB_AGE_TICK,
        ProtocolInputMsg::LsdbAgeTick,
        &instance.tx.protocol_input.timer,
    )
}
