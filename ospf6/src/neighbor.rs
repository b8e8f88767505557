//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nsm::{Event, State};
use ospf6_utils::task::TimeoutTask;
#[cfg(not(feature = "deterministic"))]
use rand::RngCore;

use crate::area::Area;
use crate::collections::NeighborId;
use crate::config::AreaType;
use crate::debug::Debug;
use crate::error::Error;
use crate::instance::InstanceUpView;
use crate::interface::{Interface, InterfaceType, ism};
use crate::lsdb::LsaOriginateEvent;
use crate::packet::lsa::{Lsa, LsaHdr, LsaKey, LsaType};
use crate::packet::{DbDesc, DbDescFlags, Options, Packet};
use crate::tasks::messages::ProtocolInputMsg;
use crate::{output, tasks};

#[derive(Debug)]
pub struct Neighbor {
    pub id: NeighborId,
    pub router_id: Ipv4Addr,
    pub iface_id: Option<u32>,
    pub src: Ipv6Addr,
    pub dr: Option<Ipv4Addr>,
    pub bdr: Option<Ipv4Addr>,
    pub priority: u8,
    pub state: State,
    // Whether this neighbor was created from the NBMA configuration.
    pub is_static: bool,

    pub options: Option<Options>,
    pub dd_flags: DbDescFlags,
    pub dd_seq_no: u32,
    pub last_rcvd_dbdesc: Option<LastDbDesc>,
    pub last_sent_dbdesc: Option<Packet>,

    pub event_count: u32,
    pub discontinuity_time: Option<DateTime<Utc>>,

    pub lists: NeighborLsaLists,
    pub tasks: NeighborTasks,
}

#[derive(Clone, Copy, Debug)]
pub struct LastDbDesc {
    pub options: Options,
    pub dd_flags: DbDescFlags,
    pub dd_seq_no: u32,
}

#[derive(Debug, Default)]
pub struct NeighborLsaLists {
    // LSAs waiting to be acknowledged.
    pub ls_rxmt: BTreeMap<LsaKey, Arc<Lsa>>,
    // LSA headers enqueued for transmission in Database Description packets.
    pub db_summary: BTreeMap<LsaKey, Arc<Lsa>>,
    // LSAs that need to be received from this neighbor.
    pub ls_request: BTreeMap<LsaKey, LsaHdr>,
    // LSAs that were requested but not received yet.
    pub ls_request_pending: BTreeMap<LsaKey, LsaHdr>,
    // LSAs recently flooded to this neighbor, along with the number of ticks
    // since their transmission.
    pub tx_lsas: BTreeMap<LsaKey, (LsaHdr, u32)>,
}

#[derive(Debug, Default)]
pub struct NeighborTasks {
    pub inactivity_timer: Option<TimeoutTask<ProtocolInputMsg>>,
    pub poll_timer: Option<TimeoutTask<ProtocolInputMsg>>,
    pub rxmt_dbdesc: Option<TimeoutTask<ProtocolInputMsg>>,
    pub rxmt_lsreq: Option<TimeoutTask<ProtocolInputMsg>>,
    pub rxmt_lsupd: Option<TimeoutTask<ProtocolInputMsg>>,
}

// Neighbor state machine.
pub mod nsm {
    use serde::{Deserialize, Serialize};

    use crate::debug::SeqNoMismatchReason;

    // States are bit-valued, which keeps their natural ordering.
    #[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
    #[derive(Deserialize, Serialize)]
    pub enum State {
        #[default]
        Down = 0x00,
        Attempt = 0x01,
        Init = 0x02,
        TwoWay = 0x04,
        ExStart = 0x08,
        Exchange = 0x10,
        Loading = 0x20,
        Full = 0x40,
    }

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    pub enum Event {
        HelloRcvd,
        Start,
        TwoWayRcvd,
        NegotiationDone,
        ExchangeDone,
        BadLsReq,
        LoadingDone,
        AdjOk,
        SeqNoMismatch(SeqNoMismatchReason),
        OneWayRcvd,
        Kill,
        InactivityTimer,
        PollTimer,
        LinkDown,
        DdRxmtTimer,
        LsuRxmtTimer,
        LsrRxmtTimer,
    }
}

// ===== impl Neighbor =====

impl Neighbor {
    pub(crate) fn new(
        id: NeighborId,
        router_id: Ipv4Addr,
        src: Ipv6Addr,
    ) -> Neighbor {
        Debug::NeighborCreate(router_id).log();

        // Initialize the DD Sequence Number.
        let dd_seq_no = {
            #[cfg(not(feature = "deterministic"))]
            {
                // Random value.
                rand::rng().next_u32()
            }
            #[cfg(feature = "deterministic")]
            {
                // Fixed value for deterministic test results.
                router_id.into()
            }
        };

        Neighbor {
            id,
            router_id,
            iface_id: None,
            src,
            dr: None,
            bdr: None,
            priority: 0,
            state: State::Down,
            is_static: false,
            options: None,
            dd_flags: DbDescFlags::empty(),
            dd_seq_no,
            last_rcvd_dbdesc: None,
            last_sent_dbdesc: None,
            event_count: 0,
            discontinuity_time: None,
            lists: Default::default(),
            tasks: Default::default(),
        }
    }

    pub(crate) fn fsm(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
        event: Event,
    ) {
        Debug::NsmEvent(self.router_id, &self.state, &event).log();

        let new_state = match (self.state, &event) {
            // NSM (state, event) -> (Action, new state)
            (State::Down, Event::Start) => {
                // The Hello itself is sent by the caller, which has access to
                // the full list of neighbors.
                self.tasks.poll_timer = None;
                self.inactivity_timer_reset(iface, area, instance);
                Some(State::Attempt)
            }
            // NSM (state, event) -> (Action, new state)
            (State::Attempt | State::Down, Event::HelloRcvd) => {
                self.tasks.poll_timer = None;
                self.inactivity_timer_reset(iface, area, instance);
                Some(State::Init)
            }
            // NSM (state, event) -> (Action, new state)
            (
                State::Init
                | State::TwoWay
                | State::ExStart
                | State::Exchange
                | State::Loading
                | State::Full,
                Event::HelloRcvd,
            ) => {
                self.inactivity_timer_reset(iface, area, instance);
                None
            }
            // NSM (state, event) -> (Action, new state)
            (State::Init, Event::TwoWayRcvd) => {
                if iface.need_adjacency(self) {
                    self.adjacency_start(iface, area, instance);
                    Some(State::ExStart)
                } else {
                    Some(State::TwoWay)
                }
            }
            // NSM (state, event) -> (Action, new state)
            (State::TwoWay, Event::AdjOk) => {
                if iface.need_adjacency(self) {
                    self.adjacency_start(iface, area, instance);
                    Some(State::ExStart)
                } else {
                    None
                }
            }
            // NSM (state, event) -> (Action, new state)
            (State::ExStart, Event::NegotiationDone) => {
                // List the contents of the entire LSDB in the summary list.
                let lsas = iface
                    .state
                    .lsdb
                    .iter()
                    .chain(area.state.lsdb.iter())
                    .chain(instance.state.lsdb.iter())
                    .map(|lse| &lse.data)
                    // Filter out unneeded LSAs.
                    .filter(|lsa| {
                        lsa_type_is_valid(iface, area, lsa.hdr.lsa_type)
                    })
                    .cloned()
                    .collect::<Vec<_>>();
                for lsa in lsas {
                    let lsa_key = lsa.hdr.key();
                    if lsa.hdr.is_maxage() {
                        self.lists.ls_rxmt.insert(lsa_key, lsa);
                        self.rxmt_lsupd_start_check(iface, area, instance);
                    } else {
                        self.lists.db_summary.insert(lsa_key, lsa);
                    }
                }

                self.dd_flags.remove(DbDescFlags::I);
                self.rxmt_dbdesc_stop();
                Some(State::Exchange)
            }
            // NSM (state, event) -> (Action, new state)
            (State::Exchange, Event::ExchangeDone) => {
                if !self.lists.ls_request.is_empty() {
                    let interval = iface.config.dead_interval;
                    self.rxmt_dbdesc_start(iface, area, instance, interval);
                    self.rxmt_lsreq_stop();
                    Some(State::Full)
                } else {
                    let interval = iface.config.retransmit_interval;
                    self.rxmt_dbdesc_start(iface, area, instance, interval);
                    Some(State::Loading)
                }
            }
            // NSM (state, event) -> (Action, new state)
            (State::Loading, Event::LoadingDone) => {
                self.rxmt_lsreq_stop();
                Some(State::Full)
            }
            // NSM (state, event) -> (Action, new state)
            (
                State::ExStart | State::Exchange | State::Loading | State::Full,
                Event::AdjOk,
            ) => {
                if iface.need_adjacency(self) {
                    None
                } else {
                    self.reset_adjacency();
                    Some(State::TwoWay)
                }
            }
            // NSM (state, event) -> (Action, new state)
            (
                State::Exchange | State::Loading | State::Full,
                Event::SeqNoMismatch(_) | Event::BadLsReq,
            ) => {
                if let Event::SeqNoMismatch(reason) = event {
                    Debug::SeqNoMismatch(self.router_id, reason).log();
                }
                self.reset_adjacency();
                self.adjacency_start(iface, area, instance);
                Some(State::ExStart)
            }
            // NSM (state, event) -> (Action, new state)
            (State::ExStart | State::Exchange, Event::DdRxmtTimer) => {
                // Retransmit the last Database Description packet.
                output::rxmt_dbdesc(self, iface, instance);
                if let Some(task) = &mut self.tasks.rxmt_dbdesc {
                    task.reset(None);
                }
                None
            }
            // NSM (state, event) -> (Action, new state)
            (State::Loading | State::Full, Event::DdRxmtTimer) => {
                // The hold time of the last Database Description packet has
                // expired.
                self.last_sent_dbdesc = None;
                self.rxmt_dbdesc_stop();
                None
            }
            // NSM (state, event) -> (Action, new state)
            (
                State::Exchange | State::Loading | State::Full,
                Event::LsuRxmtTimer,
            ) => {
                if !self.lists.ls_rxmt.is_empty() {
                    output::rxmt_lsupd(self, iface, area, instance);
                    if let Some(task) = &mut self.tasks.rxmt_lsupd {
                        task.reset(None);
                    }
                } else {
                    self.tasks.rxmt_lsupd = None;
                }
                None
            }
            // NSM (state, event) -> (Action, new state)
            (State::Exchange | State::Loading, Event::LsrRxmtTimer) => {
                output::rxmt_lsreq(self, iface, area, instance);
                if let Some(task) = &mut self.tasks.rxmt_lsreq {
                    task.reset(None);
                }
                None
            }
            // NSM (state, event) -> (Action, new state)
            (State::Down, Event::PollTimer) => {
                // The Hello itself is sent by the caller.
                if let Some(task) = &mut self.tasks.poll_timer {
                    task.reset(None);
                }
                None
            }
            // NSM (state, event) -> (Action, new state)
            (_, Event::Kill | Event::LinkDown | Event::InactivityTimer) => {
                self.reset_adjacency();
                self.tasks.inactivity_timer = None;
                Some(State::Down)
            }
            // NSM (state, event) -> (Action, new state)
            (
                State::TwoWay
                | State::ExStart
                | State::Exchange
                | State::Loading
                | State::Full,
                Event::OneWayRcvd,
            ) => {
                self.reset_adjacency();
                Some(State::Init)
            }
            // NSM (state, event) -> (Action, new state)
            (
                State::TwoWay
                | State::ExStart
                | State::Exchange
                | State::Loading
                | State::Full,
                Event::TwoWayRcvd,
            ) => {
                // No action required.
                None
            }
            // NSM (state, event) -> (Action, new state)
            (State::Init, Event::OneWayRcvd) => {
                // No action required.
                None
            }
            // NSM (state, event) -> (Action, new state)
            (_, Event::LsuRxmtTimer | Event::LsrRxmtTimer) => {
                // Stale retransmission timer.
                None
            }
            // Catch-all wildcard.
            _ => {
                Error::NsmUnexpectedEvent(self.router_id, self.state, event)
                    .log();
                return;
            }
        };

        // Check for FSM state change.
        if let Some(new_state) = new_state
            && new_state != self.state
        {
            self.fsm_state_change(iface, area, instance, event, new_state);
        }
    }

    fn fsm_state_change(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
        event: Event,
        new_state: State,
    ) {
        // Check for bidirectional communication change.
        if (new_state >= State::TwoWay && self.state < State::TwoWay
            || new_state < State::TwoWay && self.state >= State::TwoWay)
            && iface.is_broadcast_or_nbma()
        {
            // Trigger the NeighborChange event on broadcast/NBMA networks.
            instance.tx.protocol_input.ism_event(
                area.id,
                iface.id,
                ism::Event::NbrChange,
            );
        }

        // Check if the neighbor changed to/from the FULL state.
        if new_state == State::Full || self.state == State::Full {
            // (Re)originate LSAs that might have been affected.
            instance.tx.protocol_input.lsa_orig_event(
                LsaOriginateEvent::NeighborToFromFull {
                    area_id: area.id,
                    iface_id: iface.id,
                },
            );
        }

        // If a neighboring router has become inactive, it may still be
        // necessary to send Hello Packets to the dead neighbor. These Hello
        // Packets will be sent at the reduced rate PollInterval.
        if iface.config.if_type == InterfaceType::Nbma
            && self.is_static
            && new_state == State::Down
            && event == Event::InactivityTimer
        {
            let task = tasks::nsm_poll_timer(self, iface, area, instance);
            self.tasks.poll_timer = Some(task);
        }

        // Effectively transition to the new FSM state.
        Debug::NsmTransition(self.router_id, &self.state, &new_state).log();
        self.state = new_state;

        // Update statistics.
        self.event_count += 1;
        self.discontinuity_time = Some(Utc::now());
    }

    // Enters the ExStart state, where the master/slave relationship is
    // negotiated.
    fn adjacency_start(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
    ) {
        self.dd_seq_no = self.dd_seq_no.wrapping_add(1);
        self.dd_flags = DbDescFlags::I | DbDescFlags::M | DbDescFlags::MS;
        output::send_dbdesc(self, iface, area, instance);
    }

    pub(crate) fn loading_done_check(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
    ) {
        // Check if all pending LSA requests were received.
        if self.lists.ls_request_pending.is_empty() {
            // Stop the LS Request rxmt task.
            self.rxmt_lsreq_stop();

            // Check if there are new LSAs to request.
            if !self.lists.ls_request.is_empty() {
                output::send_lsreq(self, iface, area, instance);
            } else if self.state == State::Loading {
                // Database loading has completed.
                instance.tx.protocol_input.nsm_event(
                    area.id,
                    iface.id,
                    self.id,
                    Event::LoadingDone,
                );
            }
        }
    }

    fn reset_adjacency(&mut self) {
        self.options = None;
        self.last_rcvd_dbdesc = None;
        self.last_sent_dbdesc = None;
        self.lists = Default::default();
        self.tasks.rxmt_dbdesc = None;
        self.tasks.rxmt_lsreq = None;
        self.tasks.rxmt_lsupd = None;
    }

    pub(crate) fn dbdesc_is_dup(&self, dbdesc: &DbDesc) -> bool {
        self.last_rcvd_dbdesc.is_some_and(|last| {
            last.options == dbdesc.options
                && last.dd_flags == dbdesc.dd_flags
                && last.dd_seq_no == dbdesc.dd_seq_no
        })
    }

    // Returns whether the given LSA instance was recently flooded to this
    // neighbor.
    pub(crate) fn is_recently_sent(&self, lsa_hdr: &LsaHdr) -> bool {
        self.lists
            .tx_lsas
            .get(&lsa_hdr.key())
            .is_some_and(|(hdr, _)| hdr.compare(lsa_hdr).is_eq())
    }

    fn inactivity_timer_reset(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
    ) {
        if let Some(inactivity_timer) = self.tasks.inactivity_timer.as_mut() {
            inactivity_timer.reset(None);
        } else {
            let task = tasks::nsm_inactivity_timer(self, iface, area, instance);
            self.tasks.inactivity_timer = Some(task);
        }
    }

    pub(crate) fn rxmt_dbdesc_start(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
        interval: u16,
    ) {
        let task = tasks::nsm_rxmt_timer(
            self,
            iface,
            area,
            instance,
            interval,
            Event::DdRxmtTimer,
        );
        self.tasks.rxmt_dbdesc = Some(task);
    }

    pub(crate) fn rxmt_dbdesc_stop(&mut self) {
        self.tasks.rxmt_dbdesc = None;
    }

    pub(crate) fn rxmt_lsreq_start(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
    ) {
        let task = tasks::nsm_rxmt_timer(
            self,
            iface,
            area,
            instance,
            iface.config.retransmit_interval,
            Event::LsrRxmtTimer,
        );
        self.tasks.rxmt_lsreq = Some(task);
    }

    fn rxmt_lsreq_stop(&mut self) {
        self.tasks.rxmt_lsreq = None;
    }

    pub(crate) fn rxmt_lsupd_start_check(
        &mut self,
        iface: &Interface,
        area: &Area,
        instance: &InstanceUpView<'_>,
    ) {
        if !self.lists.ls_rxmt.is_empty() && self.tasks.rxmt_lsupd.is_none() {
            let task = tasks::nsm_rxmt_timer(
                self,
                iface,
                area,
                instance,
                iface.config.retransmit_interval,
                Event::LsuRxmtTimer,
            );
            self.tasks.rxmt_lsupd = Some(task);
        }
    }

    pub(crate) fn rxmt_lsupd_stop_check(&mut self) {
        if self.lists.ls_rxmt.is_empty() && self.tasks.rxmt_lsupd.is_some() {
            self.tasks.rxmt_lsupd = None;
        }
    }

    // Ages the list of recently transmitted LSAs, releasing the entries that
    // can no longer be considered implied acknowledgments.
    pub(crate) fn tx_lsas_age(&mut self, min_arrival: u32) {
        self.lists.tx_lsas.retain(|_, (_, age)| {
            *age += 1;
            *age < min_arrival
        });
    }
}

impl Drop for Neighbor {
    fn drop(&mut self) {
        Debug::NeighborDelete(self.router_id).log();
    }
}

// ===== global functions =====

// Checks whether LSAs of the given type can be exchanged over the interface.
pub(crate) fn lsa_type_is_valid(
    iface: &Interface,
    area: &Area,
    lsa_type: LsaType,
) -> bool {
    match lsa_type {
        LsaType::AsExternal => {
            area.config.area_type == AreaType::Normal
                && iface.config.if_type != InterfaceType::VirtualLink
        }
        LsaType::Nssa => area.config.area_type == AreaType::Nssa,
        _ => true,
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AreaCfg, InstanceCfg, InterfaceCfg};
    use crate::debug::SeqNoMismatchReason;
    use crate::instance::Instance;
    use crate::lsdb::LSA_INIT_SEQ_NO;

    #[test]
    fn test_nsm_state_values() {
        assert_eq!(State::Down as u8, 0);
        assert_eq!(State::Attempt as u8, 1);
        assert_eq!(State::Init as u8, 2);
        assert_eq!(State::TwoWay as u8, 4);
        assert_eq!(State::ExStart as u8, 8);
        assert_eq!(State::Exchange as u8, 16);
        assert_eq!(State::Loading as u8, 32);
        assert_eq!(State::Full as u8, 64);
        assert!(State::Full > State::Loading);
        assert!(State::Exchange >= State::Exchange);
    }

    #[test]
    fn test_tx_lsas_age() {
        let router_id = Ipv4Addr::new(2, 2, 2, 2);
        let mut nbr = Neighbor::new(1, router_id, Ipv6Addr::LOCALHOST);
        let hdr = LsaHdr {
            age: 1,
            lsa_type: LsaType::Router,
            lsa_id: Ipv4Addr::UNSPECIFIED,
            adv_rtr: Ipv4Addr::new(1, 1, 1, 1),
            seq_no: 0x80000001,
            cksum: 0,
            length: 24,
        };
        nbr.lists.tx_lsas.insert(hdr.key(), (hdr, 0));
        assert!(nbr.is_recently_sent(&hdr));
        nbr.tx_lsas_age(1);
        assert!(!nbr.is_recently_sent(&hdr));
    }

    // Test description:
    //
    // A sequence number mismatch or a bad LS Request in the Exchange, Loading
    // or Full states tears the adjacency down to ExStart. The neighbor lists
    // are cleared and a new initial Database Description packet is prepared.
    #[test]
    fn test_adjacency_restart() {
        let mismatch =
            Event::SeqNoMismatch(SeqNoMismatchReason::InconsistentSeqNo);
        for (state, event) in [
            (State::Exchange, mismatch),
            (State::Loading, Event::BadLsReq),
            (State::Full, mismatch),
            (State::Full, Event::BadLsReq),
        ] {
            let mut instance = test_instance();
            let (view, arenas) = instance.as_up().unwrap();
            let area_idx = arenas.areas.indexes().next().unwrap();
            let area = &arenas.areas[area_idx];
            let iface_idx = area.interfaces.indexes().next().unwrap();
            let iface = &mut arenas.interfaces[iface_idx];
            let (_, nbr) = iface.state.neighbors.insert(
                &mut arenas.neighbors,
                Ipv4Addr::new(2, 2, 2, 2),
                Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2),
            );
            let dd_seq_no = nbr.dd_seq_no;
            nbr.state = state;
            nbr.dd_flags = DbDescFlags::empty();
            let hdr = lsa_hdr();
            nbr.lists.ls_request.insert(hdr.key(), hdr);

            nbr.fsm(iface, area, &view, event);
            assert_eq!(nbr.state, State::ExStart, "{state:?} {event:?}");
            assert!(nbr.lists.ls_request.is_empty());
            assert!(nbr.last_rcvd_dbdesc.is_none());
            assert_eq!(
                nbr.dd_flags,
                DbDescFlags::I | DbDescFlags::M | DbDescFlags::MS
            );
            assert_eq!(nbr.dd_seq_no, dd_seq_no.wrapping_add(1));
        }
    }

    // Test description:
    //
    // The same events are ignored while the adjacency is still forming.
    #[test]
    fn test_adjacency_restart_ignored() {
        let mut instance = test_instance();
        let (view, arenas) = instance.as_up().unwrap();
        let area_idx = arenas.areas.indexes().next().unwrap();
        let area = &arenas.areas[area_idx];
        let iface_idx = area.interfaces.indexes().next().unwrap();
        let iface = &mut arenas.interfaces[iface_idx];
        let (_, nbr) = iface.state.neighbors.insert(
            &mut arenas.neighbors,
            Ipv4Addr::new(2, 2, 2, 2),
            Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2),
        );
        nbr.state = State::TwoWay;

        nbr.fsm(iface, area, &view, Event::BadLsReq);
        assert_eq!(nbr.state, State::TwoWay);
    }

    //
    // Helper functions.
    //

    fn test_instance() -> Instance {
        let iface = InterfaceCfg::new("eth0", 1, InterfaceType::PointToPoint);
        let mut area = AreaCfg::new(Ipv4Addr::UNSPECIFIED);
        area.interfaces = vec![iface];
        let config = InstanceCfg {
            router_id: Ipv4Addr::new(1, 1, 1, 1),
            af: Default::default(),
            spf_delay: 0,
            areas: vec![area],
        };
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut instance = Instance::new("test", config, tx);
        instance.start();
        instance
    }

    fn lsa_hdr() -> LsaHdr {
        LsaHdr {
            age: 1,
            lsa_type: LsaType::Router,
            lsa_id: Ipv4Addr::UNSPECIFIED,
            adv_rtr: Ipv4Addr::new(2, 2, 2, 2),
            seq_no: LSA_INIT_SEQ_NO,
            cksum: 0,
            length: 24,
        }
    }
}
