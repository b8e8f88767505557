//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use ism::{Event, State};
use ospf6_utils::southbound::InterfaceFlags;
use ospf6_utils::task::TimeoutTask;
use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::collections::{Arena, InterfaceId, Neighbors};
use crate::config::InterfaceCfg;
use crate::debug::{Debug, InterfaceInactiveReason};
use crate::error::Error;
use crate::instance::InstanceUpView;
use crate::lsdb::{LsaOriginateEvent, Lsdb};
use crate::neighbor::{Neighbor, nsm};
use crate::network::{self, MulticastAddr};
use crate::output;
use crate::packet::lsa::LsaHdr;
use crate::tasks;
use crate::tasks::messages::ProtocolInputMsg;

#[derive(Debug)]
pub struct Interface {
    pub id: InterfaceId,
    pub name: String,
    pub system: InterfaceSys,
    pub config: InterfaceCfg,
    pub state: InterfaceState,
}

#[derive(Debug, Default)]
pub struct InterfaceSys {
    // Interface flags.
    pub flags: InterfaceFlags,
    // Interface ifindex (also used as the OSPFv3 Interface ID).
    pub ifindex: u32,
    // Interface MTU.
    pub mtu: Option<u32>,
    // Link-local address.
    pub linklocal: Option<Ipv6Addr>,
    // List of global addresses associated with this interface.
    pub addr_list: BTreeSet<IpNetwork>,
}

#[derive(Debug, Default)]
pub struct InterfaceState {
    // ISM state.
    pub ism_state: State,
    // The network DR/BDR.
    pub dr: Option<DrInfo>,
    pub bdr: Option<DrInfo>,
    // Whether the interface was reported as a transit network.
    pub transit: bool,
    // Joined multicast groups.
    pub mcast_groups: BTreeSet<MulticastAddr>,
    // List of neighbors attached to this interface.
    pub neighbors: Neighbors,
    // LSDB of link-scope LSAs.
    pub lsdb: Lsdb,
    // List of pending delayed Acks, grouped by destination address.
    pub ls_ack_list: BTreeMap<Ipv6Addr, Vec<LsaHdr>>,
    // Statistics.
    pub event_count: u32,
    pub discontinuity_time: Option<DateTime<Utc>>,
    // Tasks.
    pub tasks: InterfaceTasks,
}

#[derive(Debug, Default)]
pub struct InterfaceTasks {
    // Hello Tx timer.
    pub hello_timer: Option<TimeoutTask<ProtocolInputMsg>>,
    // ISM WaitTimer.
    pub wait_timer: Option<TimeoutTask<ProtocolInputMsg>>,
    // Delayed Ack timer.
    pub ack_timer: Option<TimeoutTask<ProtocolInputMsg>>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceType {
    #[default]
    Broadcast,
    Nbma,
    PointToPoint,
    PointToMultipoint,
    VirtualLink,
}

// Identity of the Designated Router (or Backup) of a network.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct DrInfo {
    pub router_id: Ipv4Addr,
    pub iface_id: u32,
    pub addr: Ipv6Addr,
}

#[derive(Clone, Copy, Debug)]
struct DrCandidate {
    router_id: Ipv4Addr,
    dr: Option<Ipv4Addr>,
    bdr: Option<Ipv4Addr>,
    priority: u8,
}

// Interface state machine.
pub mod ism {
    use serde::{Deserialize, Serialize};

    use crate::debug::InterfaceInactiveReason;

    #[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
    #[derive(Deserialize, Serialize)]
    pub enum State {
        #[default]
        Down,
        Loopback,
        Waiting,
        PointToPoint,
        DrOther,
        Backup,
        Dr,
        Passive,
    }

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    pub enum Event {
        InterfaceUp,
        UnloopInd,
        WaitTimer,
        BackupSeen,
        NbrChange,
        InterfaceDown(InterfaceInactiveReason),
        LoopInd,
        HelloTimer,
        AckTimer,
        NeighborRevived,
    }
}

// ===== impl Interface =====

impl Interface {
    pub(crate) fn new(id: InterfaceId, config: InterfaceCfg) -> Interface {
        Debug::InterfaceCreate(&config.name).log();

        let system = InterfaceSys {
            ifindex: config.ifindex,
            mtu: Some(config.mtu.into()),
            linklocal: config.link_local,
            addr_list: config.prefixes.iter().copied().collect(),
            ..Default::default()
        };

        Interface {
            id,
            name: config.name.clone(),
            system,
            config,
            state: InterfaceState::default(),
        }
    }

    // Checks if the interface needs to be started or stopped in response to a
    // southbound event.
    pub(crate) fn update(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        neighbors: &mut Arena<Neighbor>,
    ) {
        // Check next ISM event to invoke, but only if necessary.
        let event = if self.system.flags.contains(InterfaceFlags::OPERATIVE) {
            let ism_state = self.state.ism_state;
            if self.system.flags.contains(InterfaceFlags::LOOPBACK) {
                if ism_state == State::Loopback {
                    return;
                }
                Event::LoopInd
            } else if ism_state == State::Loopback {
                Event::UnloopInd
            } else if ism_state == State::Down {
                Event::InterfaceUp
            } else {
                return;
            }
        } else if !self.is_down() {
            Event::InterfaceDown(InterfaceInactiveReason::OperationalDown)
        } else {
            return;
        };

        // Invoke ISM event.
        self.fsm(area, instance, neighbors, event);
    }

    pub(crate) fn fsm(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        neighbors: &mut Arena<Neighbor>,
        event: Event,
    ) {
        Debug::IsmEvent(&self.state.ism_state, &event).log();

        let new_ism_state = match (self.state.ism_state, &event) {
            // ISM (state, event) -> (Action, new state)
            (State::Down, Event::InterfaceUp) => {
                // Start interface.
                self.start(area, instance, neighbors)
            }
            (State::Waiting, Event::BackupSeen | Event::WaitTimer) => {
                self.state.tasks.wait_timer = None;

                // Run DR election.
                self.dr_election(area, instance, neighbors)
            }
            (State::Waiting, Event::NbrChange) => {
                // Neighbor changes are noted by the election that runs once
                // the interface leaves the Waiting state.
                return;
            }
            (State::DrOther | State::Backup | State::Dr, Event::NbrChange) => {
                // Run DR election.
                self.dr_election(area, instance, neighbors)
            }
            (State::Backup, Event::NeighborRevived) => {
                // Restart the election process from scratch.
                let task = tasks::ism_wait_timer(self, area, instance);
                self.state.tasks.wait_timer = Some(task);
                State::Waiting
            }
            (_, Event::NeighborRevived) => {
                return;
            }
            (
                State::Waiting
                | State::PointToPoint
                | State::DrOther
                | State::Backup
                | State::Dr,
                Event::HelloTimer,
            ) => {
                // Send Hello and re-arm the timer.
                output::send_hello(self, area, instance, neighbors);
                let interval =
                    Duration::from_secs(self.config.hello_interval.into());
                if let Some(task) = &mut self.state.tasks.hello_timer {
                    task.reset(Some(interval));
                }
                return;
            }
            (_, Event::AckTimer) => {
                // Flush pending delayed Acks.
                output::send_lsack_delayed(self, area, instance);
                self.state.tasks.ack_timer = None;
                return;
            }
            (State::Down, Event::InterfaceDown(_)) => {
                return;
            }
            (_, Event::InterfaceDown(reason)) => {
                // Stop interface.
                self.stop(area, instance, neighbors, *reason);
                State::Down
            }
            (State::Loopback, Event::LoopInd) => {
                return;
            }
            (_, Event::LoopInd) => {
                // Stop interface.
                self.stop(
                    area,
                    instance,
                    neighbors,
                    InterfaceInactiveReason::LoopedBack,
                );
                State::Loopback
            }
            (State::Loopback, Event::UnloopInd) => {
                // No actions are necessary.
                State::Down
            }
            _ => {
                Error::IsmUnexpectedEvent(self.state.ism_state, event).log();
                return;
            }
        };

        // Check for FSM state change.
        if new_ism_state != self.state.ism_state {
            self.fsm_state_change(area, instance, new_ism_state);
        }
    }

    fn fsm_state_change(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        new_ism_state: State,
    ) {
        let old_ism_state = self.state.ism_state;

        // Run the LSA maintenance associated to the state transition.
        instance.tx.protocol_input.lsa_orig_event(
            LsaOriginateEvent::InterfaceStateChange {
                area_id: area.id,
                iface_id: self.id,
                old_state: old_ism_state,
                new_state: new_ism_state,
            },
        );

        // Effectively transition to the new FSM state.
        Debug::IsmTransition(&old_ism_state, &new_ism_state).log();
        self.state.ism_state = new_ism_state;

        // Join or leave the AllSPFRouters multicast group as necessary.
        self.update_mcast_groups(instance);

        // Update statistics.
        self.state.event_count += 1;
        self.state.discontinuity_time = Some(Utc::now());
    }

    fn start(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        neighbors: &mut Arena<Neighbor>,
    ) -> State {
        Debug::InterfaceStart(&self.name).log();

        if self.is_passive() {
            return State::Passive;
        }

        // The first Hello is sent right away.
        let task =
            tasks::ism_hello_timer(self, area, instance, Duration::ZERO);
        self.state.tasks.hello_timer = Some(task);
        let task = tasks::ism_ack_timer(self, area, instance);
        self.state.tasks.ack_timer = Some(task);

        // Get new ISM state.
        let new_ism_state = match self.config.if_type {
            InterfaceType::PointToPoint
            | InterfaceType::PointToMultipoint
            | InterfaceType::VirtualLink => State::PointToPoint,
            InterfaceType::Broadcast | InterfaceType::Nbma => {
                if self.config.priority == 0 {
                    State::DrOther
                } else {
                    State::Waiting
                }
            }
        };

        // Create the configured NBMA neighbors.
        if self.config.if_type == InterfaceType::Nbma {
            for snbr in &self.config.static_nbrs {
                if self
                    .state
                    .neighbors
                    .get_by_router_id(neighbors, snbr.router_id)
                    .is_some()
                {
                    continue;
                }
                let (_, nbr) = self.state.neighbors.insert(
                    neighbors,
                    snbr.router_id,
                    snbr.addr,
                );
                nbr.priority = snbr.priority;
                nbr.is_static = true;
            }
        }

        if new_ism_state == State::Waiting {
            // Start wait timer.
            let task = tasks::ism_wait_timer(self, area, instance);
            self.state.tasks.wait_timer = Some(task);

            if self.config.if_type == InterfaceType::Nbma {
                // Examine the configured list of neighbors for this interface
                // and generate the neighbor event Start for each neighbor that
                // is also eligible to become Designated Router.
                for nbr in self
                    .state
                    .neighbors
                    .iter(neighbors)
                    .filter(|nbr| nbr.is_static && nbr.priority != 0)
                {
                    instance.tx.protocol_input.nsm_event(
                        area.id,
                        self.id,
                        nbr.id,
                        nsm::Event::Start,
                    );
                }
            }
        }

        new_ism_state
    }

    // Stop interface if it's active.
    fn stop(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        neighbors: &mut Arena<Neighbor>,
        reason: InterfaceInactiveReason,
    ) {
        if self.is_down() {
            return;
        }

        Debug::InterfaceStop(&self.name, reason).log();

        // Kill all neighbors.
        let event = match reason {
            InterfaceInactiveReason::OperationalDown => nsm::Event::LinkDown,
            InterfaceInactiveReason::LoopedBack => nsm::Event::Kill,
        };
        for nbr_idx in self.state.neighbors.indexes().collect::<Vec<_>>() {
            let nbr = &mut neighbors[nbr_idx];
            nbr.fsm(self, area, instance, event);
            self.state.neighbors.delete(neighbors, nbr_idx);
        }

        // Leave all multicast groups.
        for group in std::mem::take(&mut self.state.mcast_groups) {
            network::leave_multicast(self, instance.tx, group);
        }

        // Reset interface state.
        self.state.dr = None;
        self.state.bdr = None;
        self.state.transit = false;
        self.state.neighbors = Default::default();
        self.state.ls_ack_list = Default::default();
        self.state.lsdb.clear();
        self.state.tasks = Default::default();
    }

    pub(crate) fn is_down(&self) -> bool {
        self.state.ism_state == State::Down
    }

    pub(crate) fn is_passive(&self) -> bool {
        self.system.flags.contains(InterfaceFlags::LOOPBACK)
            || self.config.passive
    }

    pub(crate) fn is_dr_or_backup(&self) -> bool {
        matches!(self.state.ism_state, State::Dr | State::Backup)
    }

    pub(crate) fn is_broadcast_or_nbma(&self) -> bool {
        matches!(
            self.config.if_type,
            InterfaceType::Broadcast | InterfaceType::Nbma
        )
    }

    // Returns whether the given router is the DR of the attached network.
    pub(crate) fn is_dr(&self, router_id: Ipv4Addr) -> bool {
        self.state.dr.is_some_and(|dr| dr.router_id == router_id)
    }

    // Returns whether the given router is the BDR of the attached network.
    pub(crate) fn is_bdr(&self, router_id: Ipv4Addr) -> bool {
        self.state.bdr.is_some_and(|bdr| bdr.router_id == router_id)
    }

    // Keeps the AllSPFRouters group membership in sync with the ISM state.
    //
    // The AllDRouters group is handled as part of the LSA maintenance that
    // follows each state transition.
    fn update_mcast_groups(&mut self, instance: &InstanceUpView<'_>) {
        let active = self.state.ism_state >= State::Waiting
            && self.state.ism_state != State::Passive;
        let group = MulticastAddr::AllSpfRtrs;
        let joined = self.state.mcast_groups.contains(&group);
        if active && !joined {
            network::join_multicast(self, instance.tx, group);
            self.state.mcast_groups.insert(group);
        } else if !active && joined {
            network::leave_multicast(self, instance.tx, group);
            self.state.mcast_groups.remove(&group);
        }
    }

    pub(crate) fn join_all_dr(&mut self, instance: &InstanceUpView<'_>) {
        let group = MulticastAddr::AllDrRtrs;
        if self.state.mcast_groups.insert(group) {
            network::join_multicast(self, instance.tx, group);
        }
    }

    pub(crate) fn leave_all_dr(&mut self, instance: &InstanceUpView<'_>) {
        if self.state.mcast_groups.remove(&MulticastAddr::AllDrRtrs) {
            network::leave_multicast(
                self,
                instance.tx,
                MulticastAddr::AllDrRtrs,
            );
        }
    }

    fn dr_election(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        neighbors: &Arena<Neighbor>,
    ) -> State {
        let router_id = instance.state.router_id;

        // Step 1: note the current values for the network's Designated Router
        // and Backup Designated Router.
        let old_dr = self.state.dr.map(|dr| dr.router_id);
        let old_bdr = self.state.bdr.map(|bdr| bdr.router_id);

        // Step 2: calculate the new Backup Designated Router.
        let calc_bdr = |iface: &Interface, dr: Option<Ipv4Addr>, bdr| {
            iface
                .dr_eligible_routers(router_id, dr, bdr, neighbors)
                .filter(|rtr| rtr.dr != Some(rtr.router_id))
                .filter(|rtr| rtr.bdr == Some(rtr.router_id))
                .max_by_key(|rtr| (rtr.priority, rtr.router_id))
                .or_else(|| {
                    iface
                        .dr_eligible_routers(router_id, dr, bdr, neighbors)
                        .filter(|rtr| rtr.dr != Some(rtr.router_id))
                        .max_by_key(|rtr| (rtr.priority, rtr.router_id))
                })
                .map(|rtr| rtr.router_id)
        };

        // Step 3: calculate the new Designated Router.
        let calc_dr = |iface: &Interface, dr, bdr, new_bdr: Option<Ipv4Addr>| {
            iface
                .dr_eligible_routers(router_id, dr, bdr, neighbors)
                .filter(|rtr| rtr.dr == Some(rtr.router_id))
                .max_by_key(|rtr| (rtr.priority, rtr.router_id))
                .map(|rtr| rtr.router_id)
                .or(new_bdr)
        };
        let mut new_bdr = calc_bdr(self, old_dr, old_bdr);
        let mut new_dr = calc_dr(self, old_dr, old_bdr, new_bdr);

        // Step 4: if the router is the new DR/BDR or no longer the DR/BDR,
        // repeat steps 2 and 3 once, using the updated values for itself.
        if (new_dr == Some(router_id) || old_dr == Some(router_id))
            && new_dr != old_dr
            || (new_bdr == Some(router_id) || old_bdr == Some(router_id))
                && new_bdr != old_bdr
        {
            let (dr, bdr) = (new_dr, new_bdr);
            new_bdr = calc_bdr(self, dr, bdr);
            new_dr = calc_dr(self, dr, bdr, new_bdr);
        }
        self.state.dr =
            new_dr.map(|rid| self.dr_info(rid, router_id, neighbors));
        self.state.bdr =
            new_bdr.map(|rid| self.dr_info(rid, router_id, neighbors));

        // Step 5: set the interface state accordingly.
        Debug::IsmDrElection(old_dr, new_dr, old_bdr, new_bdr).log();
        let next_state = if new_dr == Some(router_id) {
            State::Dr
        } else if new_bdr == Some(router_id) {
            State::Backup
        } else {
            State::DrOther
        };

        // Step 6: if the attached network is an NBMA network, and the router
        // itself has just become either DR or BDR, it must start sending Hello
        // Packets to those neighbors that are not eligible to become DR.
        if self.config.if_type == InterfaceType::Nbma
            && matches!(next_state, State::Dr | State::Backup)
        {
            for nbr in self
                .state
                .neighbors
                .iter(neighbors)
                .filter(|nbr| nbr.priority == 0)
            {
                instance.tx.protocol_input.nsm_event(
                    area.id,
                    self.id,
                    nbr.id,
                    nsm::Event::Start,
                );
            }
        }

        // Step 7: if the DR or BDR changes, invoke the AdjOk? event on all
        // neighbors whose state is at least 2-Way.
        if new_dr != old_dr || new_bdr != old_bdr {
            for nbr in self
                .state
                .neighbors
                .iter(neighbors)
                .filter(|nbr| nbr.state >= nsm::State::TwoWay)
            {
                instance.tx.protocol_input.nsm_event(
                    area.id,
                    self.id,
                    nbr.id,
                    nsm::Event::AdjOk,
                );
            }
        }

        // If the DR changed without an ISM transition, the transit link
        // advertised in the Router-LSA might need to be updated.
        if new_dr != old_dr {
            instance.tx.protocol_input.lsa_orig_event(
                LsaOriginateEvent::InterfaceDrChange {
                    area_id: area.id,
                    iface_id: self.id,
                },
            );
        }

        next_state
    }

    // Returns the list of routers eligible to become DR or BDR. The local
    // router takes part using the given DR/BDR as its declared values.
    fn dr_eligible_routers<'a>(
        &'a self,
        router_id: Ipv4Addr,
        dr: Option<Ipv4Addr>,
        bdr: Option<Ipv4Addr>,
        neighbors: &'a Arena<Neighbor>,
    ) -> impl Iterator<Item = DrCandidate> + 'a {
        let myself = (self.config.priority != 0).then_some(DrCandidate {
            router_id,
            dr,
            bdr,
            priority: self.config.priority,
        });

        let nbrs = self
            .state
            .neighbors
            .iter(neighbors)
            .filter(|nbr| nbr.state >= nsm::State::TwoWay)
            .filter(|nbr| nbr.priority != 0)
            .map(|nbr| DrCandidate {
                router_id: nbr.router_id,
                dr: nbr.dr,
                bdr: nbr.bdr,
                priority: nbr.priority,
            });

        myself.into_iter().chain(nbrs)
    }

    // Resolves the interface ID and link-local address of an elected router.
    fn dr_info(
        &self,
        rid: Ipv4Addr,
        router_id: Ipv4Addr,
        neighbors: &Arena<Neighbor>,
    ) -> DrInfo {
        if rid == router_id {
            return DrInfo {
                router_id: rid,
                iface_id: self.system.ifindex,
                addr: self.system.linklocal.unwrap_or(Ipv6Addr::UNSPECIFIED),
            };
        }

        match self.state.neighbors.get_by_router_id(neighbors, rid) {
            Some((_, nbr)) => DrInfo {
                router_id: rid,
                iface_id: nbr.iface_id.unwrap_or_default(),
                addr: nbr.src,
            },
            None => DrInfo {
                router_id: rid,
                iface_id: 0,
                addr: Ipv6Addr::UNSPECIFIED,
            },
        }
    }

    // Returns whether an adjacency should be established with the given
    // neighbor.
    pub(crate) fn need_adjacency(&self, nbr: &Neighbor) -> bool {
        match self.config.if_type {
            InterfaceType::PointToPoint
            | InterfaceType::PointToMultipoint
            | InterfaceType::VirtualLink => true,
            InterfaceType::Broadcast | InterfaceType::Nbma => {
                self.is_dr_or_backup()
                    || (self.state.dr.is_none() && nbr.dr.is_none())
                    || self.is_dr(nbr.router_id)
                    || self.is_bdr(nbr.router_id)
            }
        }
    }

    pub(crate) fn enqueue_delayed_ack(
        &mut self,
        area: &Area,
        instance: &InstanceUpView<'_>,
        dst: Ipv6Addr,
        lsa_hdr: &LsaHdr,
    ) {
        self.state
            .ls_ack_list
            .entry(dst)
            .or_default()
            .push(*lsa_hdr);

        // Start delayed LS Ack timeout if necessary.
        if self.state.tasks.ack_timer.is_none() {
            let task = tasks::ism_ack_timer(self, area, instance);
            self.state.tasks.ack_timer = Some(task);
        }
    }
}

impl Drop for Interface {
    fn drop(&mut self) {
        Debug::InterfaceDelete(&self.name).log();
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AreaCfg, InstanceCfg};
    use crate::instance::Instance;

    const ROUTER_ID: Ipv4Addr = Ipv4Addr::new(9, 9, 9, 9);

    #[test]
    fn test_ism_state_ordering() {
        assert!(State::Waiting > State::Loopback);
        assert!(State::Dr > State::Backup);
        assert!(State::Passive >= State::Waiting);
    }

    // Test description:
    //
    // Fresh election where nobody has declared itself DR or BDR yet. The
    // local router has the highest priority and becomes DR, and the BDR is
    // chosen by priority and then by Router ID. The outcome doesn't depend on
    // the order in which neighbors were learned.
    #[test]
    fn test_dr_election() {
        let nbrs = [
            nbr(1, 1, None, None),
            nbr(2, 5, None, None),
            nbr(3, 0, None, None),
            nbr(4, 5, None, None),
        ];

        let mut reversed = nbrs;
        reversed.reverse();
        for nbrs in [nbrs, reversed] {
            let (state, dr, bdr) = dr_election(10, &nbrs);
            assert_eq!(state, State::Dr);
            assert_eq!(dr, Some(ROUTER_ID));
            assert_eq!(bdr, Some(rid(4)));
        }
    }

    // Test description:
    //
    // Routers that declared themselves DR and BDR keep their roles, even if a
    // router with a higher priority shows up.
    #[test]
    fn test_dr_election_existing() {
        let nbrs = [
            nbr(1, 1, Some(1), Some(2)),
            nbr(2, 1, Some(1), Some(2)),
            nbr(3, 100, Some(1), Some(2)),
        ];

        let (state, dr, bdr) = dr_election(1, &nbrs);
        assert_eq!(state, State::DrOther);
        assert_eq!(dr, Some(rid(1)));
        assert_eq!(bdr, Some(rid(2)));
    }

    // Test description:
    //
    // Routers with priority 0 are never elected, even when they claim to be
    // the DR. This includes the local router.
    #[test]
    fn test_dr_election_priority_zero() {
        let nbrs = [
            nbr(1, 1, Some(1), None),
            nbr(2, 1, Some(1), Some(2)),
            nbr(3, 0, Some(3), Some(3)),
        ];

        let (state, dr, bdr) = dr_election(0, &nbrs);
        assert_eq!(state, State::DrOther);
        assert_eq!(dr, Some(rid(1)));
        assert_eq!(bdr, Some(rid(2)));

        // With every router ineligible, no DR is elected.
        let nbrs = [nbr(1, 0, None, None), nbr(2, 0, None, None)];
        let (state, dr, bdr) = dr_election(0, &nbrs);
        assert_eq!(state, State::DrOther);
        assert_eq!(dr, None);
        assert_eq!(bdr, None);
    }

    //
    // Helper functions.
    //

    // Neighbor description: router ID, priority, declared DR, declared BDR.
    type NbrDesc = (Ipv4Addr, u8, Option<Ipv4Addr>, Option<Ipv4Addr>);

    fn rid(n: u8) -> Ipv4Addr {
        Ipv4Addr::new(n, n, n, n)
    }

    fn nbr(n: u8, priority: u8, dr: Option<u8>, bdr: Option<u8>) -> NbrDesc {
        (rid(n), priority, dr.map(rid), bdr.map(rid))
    }

    // Runs the DR election on a broadcast interface where all the given
    // neighbors are in the 2-Way state.
    fn dr_election(
        priority: u8,
        nbrs: &[NbrDesc],
    ) -> (State, Option<Ipv4Addr>, Option<Ipv4Addr>) {
        let mut cfg = InterfaceCfg::new("eth0", 1, InterfaceType::Broadcast);
        cfg.priority = priority;
        let mut area = AreaCfg::new(Ipv4Addr::UNSPECIFIED);
        area.interfaces = vec![cfg];
        let config = InstanceCfg {
            router_id: ROUTER_ID,
            af: Default::default(),
            spf_delay: 0,
            areas: vec![area],
        };
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut instance = Instance::new("test", config, tx);
        instance.start();

        let (view, arenas) = instance.as_up().unwrap();
        let area_idx = arenas.areas.indexes().next().unwrap();
        let area = &arenas.areas[area_idx];
        let iface_idx = area.interfaces.indexes().next().unwrap();
        let iface = &mut arenas.interfaces[iface_idx];
        iface.state.dr = None;
        iface.state.bdr = None;
        for (i, (router_id, priority, dr, bdr)) in nbrs.iter().enumerate() {
            let src = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, i as u16 + 1);
            let (_, nbr) = iface.state.neighbors.insert(
                &mut arenas.neighbors,
                *router_id,
                src,
            );
            nbr.state = nsm::State::TwoWay;
            nbr.priority = *priority;
            nbr.dr = *dr;
            nbr.bdr = *bdr;
        }

        let state = iface.dr_election(area, &view, &arenas.neighbors);
        let dr = iface.state.dr.map(|dr| dr.router_id);
        let bdr = iface.state.bdr.map(|bdr| bdr.router_id);
        (state, dr, bdr)
    }
}
