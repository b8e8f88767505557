//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use ospf6_utils::task::{TimeoutTask, TimerRequest, TimerWheel};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug_span;

use crate::collections::{AreaId, Areas, Arena, InterfaceId, NeighborId};
use crate::config::InstanceCfg;
use crate::debug::Debug;
use crate::error::Error;
use crate::interface::{Interface, ism};
use crate::lsdb::{LsaOriginateEvent, Lsdb};
use crate::neighbor::{Neighbor, nsm};
use crate::route::RouteNet;
use crate::tasks::messages::input::{IsmEventMsg, LsaOrigEventMsg, NsmEventMsg};
use crate::tasks::messages::{ProtocolInputMsg, ProtocolOutputMsg};
use crate::{events, route, spf, tasks};

pub struct Instance {
    // Instance name.
    pub name: String,
    // Instance configuration data.
    pub config: InstanceCfg,
    // Instance state data.
    pub state: Option<InstanceState>,
    // Instance arenas.
    pub arenas: InstanceArenas,
    // Instance Tx channels.
    pub tx: InstanceChannelsTx,
    // Instance Rx channels.
    pub rx: ProtocolInputChannelsRx,
    // Pending timers.
    pub timers: TimerWheel<ProtocolInputMsg>,
}

#[derive(Debug)]
pub struct InstanceState {
    // Instance Router ID.
    pub router_id: Ipv4Addr,
    // LSDB of AS-scope LSAs.
    pub lsdb: Lsdb,
    // Whether the routing table needs to be recomputed.
    pub spf_run: bool,
    // Routing table.
    pub rib: BTreeMap<IpNetwork, RouteNet>,
    // Link-state IDs of the self-originated Inter-Area-Prefix-LSAs.
    pub summary_lsa_ids: BTreeMap<IpNetwork, Ipv4Addr>,
    pub summary_next_lsa_id: u32,
    // Statistics.
    pub orig_lsa_count: u32,
    pub rx_lsa_count: u32,
    pub spf_run_count: u32,
    pub discontinuity_time: Option<DateTime<Utc>>,
    // LSDB aging timer.
    pub age_timer: Option<TimeoutTask<ProtocolInputMsg>>,
}

#[derive(Debug, Default)]
pub struct InstanceArenas {
    pub areas: Areas,
    pub interfaces: Arena<Interface>,
    pub neighbors: Arena<Neighbor>,
}

#[derive(Clone, Debug)]
pub struct InstanceChannelsTx {
    pub protocol_input: ProtocolInputChannelsTx,
    pub protocol_output: UnboundedSender<ProtocolOutputMsg>,
}

#[derive(Clone, Debug)]
pub struct ProtocolInputChannelsTx {
    // Timer requests.
    pub timer: UnboundedSender<TimerRequest<ProtocolInputMsg>>,
    // Events generated while processing other events.
    pub internal: UnboundedSender<ProtocolInputMsg>,
}

#[derive(Debug)]
pub struct ProtocolInputChannelsRx {
    // Timer requests.
    pub timer: UnboundedReceiver<TimerRequest<ProtocolInputMsg>>,
    // Events generated while processing other events.
    pub internal: UnboundedReceiver<ProtocolInputMsg>,
}

pub struct InstanceUpView<'a> {
    pub name: &'a str,
    pub config: &'a InstanceCfg,
    pub state: &'a mut InstanceState,
    pub tx: &'a InstanceChannelsTx,
}

// ===== impl Instance =====

impl Instance {
    pub fn new(
        name: &str,
        config: InstanceCfg,
        protocol_output: UnboundedSender<ProtocolOutputMsg>,
    ) -> Instance {
        let _span = debug_span!("ospf6-instance", %name).entered();
        Debug::InstanceCreate.log();

        let (timerp, timerc) = mpsc::unbounded_channel();
        let (internalp, internalc) = mpsc::unbounded_channel();
        let tx = InstanceChannelsTx {
            protocol_input: ProtocolInputChannelsTx {
                timer: timerp,
                internal: internalp,
            },
            protocol_output,
        };
        let rx = ProtocolInputChannelsRx {
            timer: timerc,
            internal: internalc,
        };

        // Create the configured areas and interfaces.
        let mut arenas = InstanceArenas::default();
        for area_cfg in &config.areas {
            let (_, area) = arenas.areas.insert(area_cfg.clone());
            for iface_cfg in &area_cfg.interfaces {
                area.interfaces
                    .insert(&mut arenas.interfaces, iface_cfg.clone());
            }
        }

        Instance {
            name: name.to_owned(),
            config,
            state: None,
            arenas,
            tx,
            rx,
            timers: Default::default(),
        }
    }

    // Starts the instance.
    //
    // Interfaces are brought up as soon as they're reported operational.
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }

        let _span = debug_span!("ospf6-instance", name = %self.name).entered();
        Debug::InstanceStart.log();

        // Store instance initial state.
        self.state = Some(InstanceState::new(self.config.router_id));

        // Start the LSDB aging timer.
        if let Some((instance, arenas)) = self.as_up() {
            let task = tasks::lsdb_age_timer(&instance);
            instance.state.age_timer = Some(task);

            // Try to start interfaces.
            for area in arenas.areas.iter() {
                for iface_idx in area.interfaces.indexes() {
                    let iface = &mut arenas.interfaces[iface_idx];
                    iface.update(area, &instance, &mut arenas.neighbors);
                }
            }
        }

        self.process_pending();
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub(crate) fn as_up(
        &mut self,
    ) -> Option<(InstanceUpView<'_>, &mut InstanceArenas)> {
        if let Some(state) = &mut self.state {
            let instance = InstanceUpView {
                name: &self.name,
                config: &self.config,
                state,
                tx: &self.tx,
            };
            Some((instance, &mut self.arenas))
        } else {
            None
        }
    }

    // Processes an input message, along with all events and route
    // computations it triggers.
    pub fn process_msg(&mut self, msg: ProtocolInputMsg) {
        self.process_protocol_msg(msg);
        self.process_pending();
    }

    // Returns the current value of the instance clock.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    // Returns the deadline of the next timer to expire.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.apply_timer_requests();
        self.timers.next_deadline()
    }

    // Moves the instance clock forward, processing all timers that expire up
    // to the given time.
    pub fn advance_clock(&mut self, now: Duration) {
        loop {
            self.apply_timer_requests();
            let Some(msg) = self.timers.expire(now) else {
                break;
            };
            self.process_msg(msg);
        }
        self.timers.advance(now);
    }

    fn process_protocol_msg(&mut self, msg: ProtocolInputMsg) {
        let span = debug_span!("ospf6-instance", name = %self.name);
        let _span_guard = span.enter();

        // Interface table updates are stored even if the instance isn't
        // active.
        if let Err(error) = match msg {
            ProtocolInputMsg::IfaceUpdate(msg) => {
                events::process_iface_update(self, msg)
            }
            ProtocolInputMsg::AddressAdd(msg) => {
                events::process_addr_add(self, msg)
            }
            ProtocolInputMsg::AddressDel(msg) => {
                events::process_addr_del(self, msg)
            }
            msg => match self.as_up() {
                Some((mut instance, arenas)) => {
                    process_protocol_msg(&mut instance, arenas, msg)
                }
                // Ignore event if the instance isn't active.
                None => Ok(()),
            },
        } {
            error.log();
        }
    }

    // Processes all events generated while handling the last input message.
    //
    // The routing table is recomputed only once the pending events are
    // exhausted.
    fn process_pending(&mut self) {
        loop {
            self.apply_timer_requests();

            if let Ok(msg) = self.rx.internal.try_recv() {
                self.process_protocol_msg(msg);
                continue;
            }

            let span = debug_span!("ospf6-instance", name = %self.name);
            let _span_guard = span.enter();
            match self.as_up() {
                Some((mut instance, arenas)) if instance.state.spf_run => {
                    instance.state.spf_run = false;
                    spf::run(&mut instance, arenas);
                    route::update_rib(&mut instance, arenas);
                }
                _ => break,
            }
        }
    }

    fn apply_timer_requests(&mut self) {
        while let Ok(request) = self.rx.timer.try_recv() {
            self.timers.apply(request);
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

// ===== impl InstanceState =====

impl InstanceState {
    fn new(router_id: Ipv4Addr) -> InstanceState {
        InstanceState {
            router_id,
            lsdb: Default::default(),
            spf_run: false,
            rib: Default::default(),
            summary_lsa_ids: Default::default(),
            summary_next_lsa_id: 0,
            orig_lsa_count: 0,
            rx_lsa_count: 0,
            spf_run_count: 0,
            discontinuity_time: None,
            age_timer: None,
        }
    }
}

// ===== impl ProtocolInputChannelsTx =====

impl ProtocolInputChannelsTx {
    pub(crate) fn ism_event(
        &self,
        area_id: AreaId,
        iface_id: InterfaceId,
        event: ism::Event,
    ) {
        let _ = self.internal.send(ProtocolInputMsg::IsmEvent(IsmEventMsg {
            area_key: area_id.into(),
            iface_key: iface_id.into(),
            event,
        }));
    }

    pub(crate) fn nsm_event(
        &self,
        area_id: AreaId,
        iface_id: InterfaceId,
        nbr_id: NeighborId,
        event: nsm::Event,
    ) {
        let _ = self.internal.send(ProtocolInputMsg::NsmEvent(NsmEventMsg {
            area_key: area_id.into(),
            iface_key: iface_id.into(),
            nbr_key: nbr_id.into(),
            event,
        }));
    }

    pub(crate) fn lsa_orig_event(&self, event: LsaOriginateEvent) {
        let _ = self
            .internal
            .send(ProtocolInputMsg::LsaOrigEvent(LsaOrigEventMsg { event }));
    }
}

// ===== helper functions =====

fn process_protocol_msg(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    msg: ProtocolInputMsg,
) -> Result<(), Error> {
    match msg {
        // Interface FSM event.
        ProtocolInputMsg::IsmEvent(msg) => events::process_ism_event(
            instance,
            arenas,
            msg.area_key,
            msg.iface_key,
            msg.event,
        )?,
        // Neighbor FSM event.
        ProtocolInputMsg::NsmEvent(msg) => events::process_nsm_event(
            instance,
            arenas,
            msg.area_key,
            msg.iface_key,
            msg.nbr_key,
            msg.event,
        )?,
        // Received network packet.
        ProtocolInputMsg::NetRxPacket(msg) => events::process_packet(
            instance,
            arenas,
            msg.ifindex,
            msg.src,
            msg.dst,
            msg.packet,
        )?,
        // LSA origination event.
        ProtocolInputMsg::LsaOrigEvent(msg) => {
            events::process_lsa_orig_event(instance, arenas, msg.event)?
        }
        // LSDB aging timer.
        ProtocolInputMsg::LsdbAgeTick => {
            events::process_lsdb_age_tick(instance, arenas)?
        }
        // Interface table updates are handled by the caller.
        ProtocolInputMsg::IfaceUpdate(_)
        | ProtocolInputMsg::AddressAdd(_)
        | ProtocolInputMsg::AddressDel(_) => unreachable!(),
    }

    Ok(())
}
