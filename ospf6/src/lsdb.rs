//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use derive_new::new;
use ipnetwork::IpNetwork;
use ospf6_utils::ip::{IpAddrExt, IpNetworkExt};
use serde::{Deserialize, Serialize};

use crate::collections::{
    self, AreaId, AreaIndex, Arena, InterfaceId, InterfaceIndex, LsdbId,
    LsdbIndex, NeighborIndex, lsdb_get, lsdb_get_mut,
};
use crate::config::AreaType;
use crate::debug::{Debug, LsaFlushReason};
use crate::error::Error;
use crate::flood::flood;
use crate::instance::{InstanceArenas, InstanceUpView};
use crate::interface::{DrInfo, Interface, InterfaceType, ism};
use crate::neighbor::{Neighbor, nsm};
use crate::packet::lsa::{
    Lsa, LsaBody, LsaHdr, LsaInterAreaPrefix, LsaIntraAreaPrefix,
    LsaIntraAreaPrefixEntry, LsaKey, LsaLink, LsaLinkPrefix, LsaNetwork,
    LsaRouter, LsaRouterFlags, LsaRouterLink, LsaRouterLinkType, LsaType,
    PrefixOptions,
};
use crate::route::PathType;

// Architectural Constants.
pub const LSA_REFRESH_TIME: u16 = 1800;
pub const LSA_MAX_AGE: u16 = 3600;
pub const LSA_CHECK_AGE: u16 = 300;
pub const LSA_INFINITY: u32 = 0x00ffffff;
pub const LSA_INIT_SEQ_NO: u32 = 0x80000001;
pub const LSA_MAX_SEQ_NO: u32 = 0x7fffffff;
pub const LSA_MIN_ARRIVAL: u32 = 1;

// Interval between two runs of the aging sweep.
pub const LSDB_AGE_TICK: Duration = Duration::from_secs(1);

// Link-state database of a given flooding scope.
#[derive(Debug, Default)]
pub struct Lsdb {
    // LSAs indexed by their database key.
    entries: BTreeMap<LsaKey, LsaEntry>,
    // Next sequence number of self-originated LSAs, per LSA type.
    seq_no: BTreeMap<LsaType, u32>,
    // LSAs that will be originated once the flush of the previous instance
    // (whose sequence number reached MaxSequenceNumber) completes.
    seqno_wrapping: BTreeMap<LsaKey, LsaBody>,
}

#[derive(Clone, Debug, new)]
pub struct LsaEntry {
    // LSA data.
    pub data: Arc<Lsa>,
    // Number of aging ticks since the LSA was installed.
    #[new(default)]
    pub install_time: u32,
    // How the LSA entered the database.
    pub source: LsaSource,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LsaSource {
    Originated,
    Flooded,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum LsaOriginateEvent {
    InterfaceStateChange {
        area_id: AreaId,
        iface_id: InterfaceId,
        old_state: ism::State,
        new_state: ism::State,
    },
    InterfaceDrChange {
        area_id: AreaId,
        iface_id: InterfaceId,
    },
    InterfaceAddrAddDel {
        area_id: AreaId,
        iface_id: InterfaceId,
    },
    NeighborToFromFull {
        area_id: AreaId,
        iface_id: InterfaceId,
    },
    LinkLsaRcvd {
        area_id: AreaId,
        iface_id: InterfaceId,
    },
    SelfOriginatedLsaRcvd {
        lsdb_id: LsdbId,
        lsa_key: LsaKey,
    },
}

// ===== impl Lsdb =====

impl Lsdb {
    pub fn get(&self, lsa_key: &LsaKey) -> Option<&LsaEntry> {
        self.entries.get(lsa_key)
    }

    pub(crate) fn get_mut(
        &mut self,
        lsa_key: &LsaKey,
    ) -> Option<&mut LsaEntry> {
        self.entries.get_mut(lsa_key)
    }

    // Returns an iterator visiting all LSA entries, ordered by their keys.
    pub fn iter(&self) -> impl Iterator<Item = &LsaEntry> {
        self.entries.values()
    }

    // Returns an iterator visiting all LSA entries of the given type.
    pub fn iter_by_type(
        &self,
        lsa_type: LsaType,
    ) -> impl Iterator<Item = &LsaEntry> {
        let start = LsaKey::new(
            lsa_type,
            Ipv4Addr::UNSPECIFIED,
            Ipv4Addr::UNSPECIFIED,
        );
        let end =
            LsaKey::new(lsa_type, Ipv4Addr::BROADCAST, Ipv4Addr::BROADCAST);
        self.entries.range(start..=end).map(|(_, lse)| lse)
    }

    // Returns an iterator visiting all LSA entries of the given type
    // originated by the given router.
    pub fn iter_by_type_advrtr(
        &self,
        lsa_type: LsaType,
        adv_rtr: Ipv4Addr,
    ) -> impl Iterator<Item = &LsaEntry> {
        let start = LsaKey::new(lsa_type, adv_rtr, Ipv4Addr::UNSPECIFIED);
        let end = LsaKey::new(lsa_type, adv_rtr, Ipv4Addr::BROADCAST);
        self.entries.range(start..=end).map(|(_, lse)| lse)
    }

    // Inserts the given LSA entry, returning the replaced instance, if any.
    pub(crate) fn insert(&mut self, lse: LsaEntry) -> Option<LsaEntry> {
        self.entries.insert(lse.data.hdr.key(), lse)
    }

    pub(crate) fn remove(&mut self, lsa_key: &LsaKey) -> Option<LsaEntry> {
        self.entries.remove(lsa_key)
    }

    // Removes all LSAs. Sequence number counters are preserved.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.seqno_wrapping.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Returns the sequence number to use for a new self-originated LSA of the
    // given type.
    pub(crate) fn next_seq_no(&self, lsa_type: LsaType) -> u32 {
        self.seq_no
            .get(&lsa_type)
            .copied()
            .unwrap_or(LSA_INIT_SEQ_NO)
    }

    // Keeps the per-type counter ahead of the given self-originated sequence
    // number.
    pub(crate) fn seq_no_update(&mut self, lsa_type: LsaType, seq_no: u32) {
        let next = self.next_seq_no(lsa_type);
        if (seq_no as i32) >= (next as i32) && seq_no != LSA_MAX_SEQ_NO {
            self.seq_no.insert(lsa_type, seq_no.wrapping_add(1));
        }
    }

    pub(crate) fn seq_no_reset(&mut self, lsa_type: LsaType) {
        self.seq_no.insert(lsa_type, LSA_INIT_SEQ_NO);
    }
}

// ===== global functions =====

// Checks if the given LSA was installed via flooding less than MinLSArrival
// ticks ago.
pub(crate) fn lsa_min_arrival_check(lse: &LsaEntry) -> bool {
    lse.source == LsaSource::Flooded && lse.install_time < LSA_MIN_ARRIVAL
}

// Installs the provided LSA to the specified LSDB.
//
// Returns whether the contents of the LSA changed, in which case the routing
// table needs to be recomputed.
pub(crate) fn install(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsdb_idx: LsdbIndex,
    lsa: Arc<Lsa>,
    source: LsaSource,
) -> bool {
    Debug::LsaInstall(&lsa.hdr).log();

    // Remove old instance (if any) from all neighbors' Link state
    // retransmission lists.
    rxmt_lists_remove(arenas, lsdb_idx, &lsa);

    // Replace the old instance of the LSA, if any.
    let router_id = instance.state.router_id;
    let (_, lsdb) = lsdb_get_mut(
        &mut instance.state.lsdb,
        &mut arenas.areas,
        &mut arenas.interfaces,
        lsdb_idx,
    );
    let old_lse = lsdb.insert(LsaEntry::new(lsa.clone(), source));
    let self_originated = lsa.hdr.adv_rtr == router_id;
    if self_originated {
        lsdb.seq_no_update(lsa.hdr.lsa_type, lsa.hdr.seq_no);
    }

    // RFC 2328 - Section 13.2:
    // "The contents of the new LSA should be compared to the old instance, if
    // present. If there is no difference, there is no need to recalculate the
    // routing table".
    //
    // Self-originated summaries never affect the routing table either.
    let content_change = match &old_lse {
        Some(old_lse) => old_lse.data.differs_from(&lsa),
        None => true,
    };
    let self_orig_summary =
        self_originated && lsa.hdr.lsa_type == LsaType::InterAreaPrefix;
    if content_change && !self_orig_summary {
        instance.state.spf_run = true;
    }

    content_change
}

// Originates a new instance of the given self-originated LSA.
//
// Every call bumps the sequence number, even if the contents are unchanged.
// Callers that want to skip unchanged instances use `originate_check`.
pub(crate) fn originate(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsdb_idx: LsdbIndex,
    lsa_id: Ipv4Addr,
    body: LsaBody,
) {
    let router_id = instance.state.router_id;
    let lsa_key = LsaKey::new(body.lsa_type(), router_id, lsa_id);
    let (_, lsdb) = lsdb_get_mut(
        &mut instance.state.lsdb,
        &mut arenas.areas,
        &mut arenas.interfaces,
        lsdb_idx,
    );

    // A flush due to sequence number wrapping is in progress. Update the LSA
    // that will be originated once the old instance is gone.
    if let Some(pending) = lsdb.seqno_wrapping.get_mut(&lsa_key) {
        *pending = body;
        return;
    }

    // When an attempt is made to increment the sequence number past the
    // maximum value of MaxSequenceNumber, the current instance of the LSA
    // must first be flushed from the routing domain.
    let seq_no = match lsdb.get(&lsa_key).map(|lse| lse.data.hdr.seq_no) {
        Some(LSA_MAX_SEQ_NO) => {
            lsdb.seqno_wrapping.insert(lsa_key, body);
            let reason = LsaFlushReason::SeqNoWrapping;
            flush(instance, arenas, lsdb_idx, lsa_key, reason);
            return;
        }
        Some(seq_no) => seq_no.wrapping_add(1),
        None => lsdb.next_seq_no(lsa_key.lsa_type),
    };

    let lsa = Arc::new(Lsa::new(0, lsa_id, router_id, seq_no, body));
    Debug::LsaOriginate(&lsa.hdr).log();

    install(instance, arenas, lsdb_idx, lsa.clone(), LsaSource::Originated);
    flood(
        instance,
        &arenas.areas,
        &mut arenas.interfaces,
        &mut arenas.neighbors,
        lsdb_idx,
        &lsa,
        None,
    );

    // Update statistics.
    instance.state.orig_lsa_count += 1;
    instance.state.discontinuity_time = Some(Utc::now());
}

// Originates the given LSA unless an identical self-originated instance is
// already present in the LSDB.
//
// A database copy that was received through flooding is always superseded by
// a new instance with a higher sequence number.
pub(crate) fn originate_check(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsdb_idx: LsdbIndex,
    lsa_id: Ipv4Addr,
    body: LsaBody,
) {
    let router_id = instance.state.router_id;
    let lsa_key = LsaKey::new(body.lsa_type(), router_id, lsa_id);
    let (_, lsdb) = lsdb_get(
        &instance.state.lsdb,
        &arenas.areas,
        &arenas.interfaces,
        lsdb_idx,
    );
    if let Some(lse) = lsdb.get(&lsa_key)
        && lse.source == LsaSource::Originated
        && !lse.data.hdr.is_maxage()
        && lse.data.body == body
    {
        return;
    }

    originate(instance, arenas, lsdb_idx, lsa_id, body);
}

// Flushes the LSA identified by the given key by setting its age to MaxAge
// and reflooding it.
pub(crate) fn flush(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsdb_idx: LsdbIndex,
    lsa_key: LsaKey,
    reason: LsaFlushReason,
) {
    let (_, lsdb) = lsdb_get(
        &instance.state.lsdb,
        &arenas.areas,
        &arenas.interfaces,
        lsdb_idx,
    );

    // Do not flush the same LSA more than once.
    let Some(lse) = lsdb.get(&lsa_key) else {
        return;
    };
    if lse.data.hdr.is_maxage() {
        return;
    }
    Debug::LsaFlush(&lse.data.hdr, reason).log();

    // Set the LSA age to MaxAge.
    let source = lse.source;
    let mut lsa = (*lse.data).clone();
    lsa.set_maxage();
    let lsa = Arc::new(lsa);

    // Install updated LSA to clear rxmt lists and rerun route calculations.
    install(instance, arenas, lsdb_idx, lsa.clone(), source);

    // Reflood updated LSA.
    flood(
        instance,
        &arenas.areas,
        &mut arenas.interfaces,
        &mut arenas.neighbors,
        lsdb_idx,
        &lsa,
        None,
    );
}

// Runs one iteration of the LSDB aging sweep over all flooding scopes.
pub(crate) fn age_tick(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let mut lsdb_idxs = vec![LsdbIndex::As];
    for area_idx in arenas.areas.indexes() {
        lsdb_idxs.push(LsdbIndex::Area(area_idx));
        let area = &arenas.areas[area_idx];
        lsdb_idxs.extend(
            area.interfaces
                .indexes()
                .map(|iface_idx| LsdbIndex::Link(area_idx, iface_idx)),
        );
    }
    for lsdb_idx in lsdb_idxs {
        age_lsdb(instance, arenas, lsdb_idx);
    }

    // Age the lists of recently flooded LSAs.
    for (_, nbr) in arenas.neighbors.iter_mut() {
        nbr.tx_lsas_age(LSA_MIN_ARRIVAL);
    }
}

// Handles LSA origination events.
pub(crate) fn lsa_orig_event(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    event: LsaOriginateEvent,
) -> Result<(), Error> {
    match event {
        LsaOriginateEvent::InterfaceStateChange {
            area_id,
            iface_id,
            old_state,
            new_state,
        } => {
            let (area_idx, area) = arenas.areas.get_by_id(area_id)?;
            let (iface_idx, _) =
                area.interfaces.get_by_id(&arenas.interfaces, iface_id)?;
            lsa_orig_iface_state_change(
                instance, arenas, area_idx, iface_idx, old_state, new_state,
            );
        }
        LsaOriginateEvent::InterfaceDrChange { area_id, iface_id }
        | LsaOriginateEvent::NeighborToFromFull { area_id, iface_id } => {
            let (area_idx, area) = arenas.areas.get_by_id(area_id)?;
            let (iface_idx, _) =
                area.interfaces.get_by_id(&arenas.interfaces, iface_id)?;

            // (Re)originate Router-LSA.
            lsa_orig_router(instance, arenas, area_idx);

            // (Re)originate or flush Network-LSA.
            if lsa_orig_network(instance, arenas, area_idx, iface_idx) {
                lsa_orig_intra_area_prefix_network(
                    instance, arenas, area_idx, iface_idx,
                );
            }

            // (Re)originate Intra-area-prefix-LSA.
            lsa_orig_intra_area_prefix_router(instance, arenas, area_idx);
        }
        LsaOriginateEvent::InterfaceAddrAddDel { area_id, iface_id } => {
            let (area_idx, area) = arenas.areas.get_by_id(area_id)?;
            let (iface_idx, iface) =
                area.interfaces.get_by_id(&arenas.interfaces, iface_id)?;
            if iface.is_down() {
                return Ok(());
            }

            // (Re)originate Link-LSA.
            lsa_orig_link(instance, arenas, area_idx, iface_idx);

            // (Re)originate Intra-area-prefix-LSAs.
            lsa_orig_intra_area_prefix_router(instance, arenas, area_idx);
            if arenas.interfaces[iface_idx].state.ism_state == ism::State::Dr {
                lsa_orig_intra_area_prefix_network(
                    instance, arenas, area_idx, iface_idx,
                );
            }
        }
        LsaOriginateEvent::LinkLsaRcvd { area_id, iface_id } => {
            let (area_idx, area) = arenas.areas.get_by_id(area_id)?;
            let (iface_idx, iface) =
                area.interfaces.get_by_id(&arenas.interfaces, iface_id)?;

            // The DR advertises the prefixes of all Full neighbors.
            if iface.state.ism_state == ism::State::Dr {
                lsa_orig_intra_area_prefix_network(
                    instance, arenas, area_idx, iface_idx,
                );
            }
        }
        LsaOriginateEvent::SelfOriginatedLsaRcvd { lsdb_id, lsa_key } => {
            let lsdb_idx = collections::lsdb_index(
                &arenas.areas,
                &arenas.interfaces,
                lsdb_id,
            )?;

            // Refresh whatever this router currently originates in the
            // affected scope.
            match lsdb_idx {
                LsdbIndex::Link(area_idx, iface_idx) => {
                    lsa_orig_link(instance, arenas, area_idx, iface_idx);
                }
                LsdbIndex::Area(area_idx) => {
                    lsa_orig_area(instance, arenas, area_idx);
                    if lsa_key.lsa_type == LsaType::InterAreaPrefix {
                        lsa_orig_inter_area(instance, arenas);
                    }
                }
                LsdbIndex::As => (),
            }

            // If the received LSA wasn't superseded, it's no longer
            // originated by this router and must be flushed.
            let (_, lsdb) = lsdb_get(
                &instance.state.lsdb,
                &arenas.areas,
                &arenas.interfaces,
                lsdb_idx,
            );
            if let Some(lse) = lsdb.get(&lsa_key)
                && lse.source == LsaSource::Flooded
            {
                let reason = LsaFlushReason::PrematureAging;
                flush(instance, arenas, lsdb_idx, lsa_key, reason);
            }
        }
    }

    Ok(())
}

// (Re)originates Inter-Area-Prefix-LSAs summarizing the routes of each area
// into the other areas. Summaries that are no longer valid are flushed.
pub(crate) fn lsa_orig_inter_area(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let router_id = instance.state.router_id;
    let is_abr = arenas.areas.is_abr(&arenas.interfaces);

    // Check which networks are summarized and which area ranges are active.
    let mut summarized = BTreeSet::new();
    let mut ranges = BTreeMap::new();
    if is_abr {
        for area in arenas.areas.iter() {
            for (prefix, route) in instance
                .state
                .rib
                .iter()
                .filter(|(_, route)| route.path_type == PathType::IntraArea)
                .filter(|(_, route)| route.area_id == area.area_id)
                .filter(|(_, route)| route.metric < LSA_INFINITY)
            {
                let Some(range) = area
                    .config
                    .ranges
                    .iter()
                    .find(|range| range.prefix.is_supernet_of(prefix))
                else {
                    continue;
                };
                summarized.insert(*prefix);

                // Unless configured, the range cost is the highest cost
                // among its networks.
                let metric = ranges
                    .entry((area.area_id, range.prefix))
                    .or_insert((range.advertise, range.cost.unwrap_or(0)));
                if range.cost.is_none() {
                    metric.1 = std::cmp::max(metric.1, route.metric);
                }
            }
        }
    }

    for area_idx in arenas.areas.indexes().collect::<Vec<_>>() {
        let area = &arenas.areas[area_idx];

        // Compute the list of summaries to advertise into this area.
        let mut summaries = BTreeMap::new();
        if is_abr && area.is_active(&arenas.interfaces) {
            let stub = area.config.area_type != AreaType::Normal;
            if !stub || area.config.summary {
                for (prefix, route) in &instance.state.rib {
                    let advertise = match route.path_type {
                        PathType::IntraArea => {
                            route.area_id != area.area_id
                                && !summarized.contains(prefix)
                        }
                        // Only backbone routes are summarized into the
                        // non-backbone areas.
                        PathType::InterArea => {
                            route.area_id != area.area_id
                                && route.area_id == Ipv4Addr::UNSPECIFIED
                                && !area.is_backbone()
                        }
                    };
                    if advertise && route.metric < LSA_INFINITY {
                        summaries.insert(*prefix, route.metric);
                    }
                }

                // Ranges of the other areas with at least one active
                // network.
                for ((range_area_id, prefix), (advertise, metric)) in &ranges {
                    if *range_area_id != area.area_id && *advertise {
                        summaries.insert(*prefix, *metric);
                    }
                }
            }
            if stub {
                let default = IpNetwork::default(instance.config.af);
                summaries.insert(default, area.config.default_cost);
            }
        }

        // Originate the summaries.
        let mut lsa_ids = BTreeSet::new();
        for (prefix, metric) in summaries {
            let lsa_id = summary_lsa_id(instance, prefix);
            lsa_ids.insert(lsa_id);
            let body = LsaBody::InterAreaPrefix(LsaInterAreaPrefix::new(
                metric,
                PrefixOptions::empty(),
                prefix,
            ));
            originate_check(
                instance,
                arenas,
                LsdbIndex::Area(area_idx),
                lsa_id,
                body,
            );
        }

        // Flush the summaries that are no longer advertised.
        let stale = arenas.areas[area_idx]
            .state
            .lsdb
            .iter_by_type_advrtr(LsaType::InterAreaPrefix, router_id)
            .map(|lse| lse.data.hdr.key())
            .filter(|lsa_key| !lsa_ids.contains(&lsa_key.lsa_id))
            .collect::<Vec<_>>();
        for lsa_key in stale {
            let reason = LsaFlushReason::PrematureAging;
            flush(instance, arenas, LsdbIndex::Area(area_idx), lsa_key, reason);
        }
    }
}

// Returns the DR of the given broadcast or NBMA interface if the attached
// network can be advertised as a transit network.
pub(crate) fn iface_transit_dr(
    iface: &Interface,
    neighbors: &Arena<Neighbor>,
    router_id: Ipv4Addr,
) -> Option<DrInfo> {
    if !iface.is_broadcast_or_nbma()
        || iface.state.ism_state == ism::State::Waiting
    {
        return None;
    }

    let dr = iface.state.dr?;
    let mut nbrs = iface.state.neighbors.iter(neighbors);
    let transit = if dr.router_id == router_id {
        nbrs.any(|nbr| nbr.state == nsm::State::Full)
    } else {
        nbrs.any(|nbr| {
            nbr.router_id == dr.router_id && nbr.state == nsm::State::Full
        })
    };
    transit.then_some(dr)
}

// ===== helper functions =====

fn age_lsdb(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsdb_idx: LsdbIndex,
) {
    let router_id = instance.state.router_id;
    let mut refresh = vec![];
    let mut expired = vec![];
    let mut maxage = vec![];

    let (_, lsdb) = lsdb_get_mut(
        &mut instance.state.lsdb,
        &mut arenas.areas,
        &mut arenas.interfaces,
        lsdb_idx,
    );
    for lse in lsdb.entries.values_mut() {
        lse.install_time = lse.install_time.saturating_add(1);

        let lsa_key = lse.data.hdr.key();
        if lse.data.hdr.is_maxage() {
            maxage.push(lsa_key);
            continue;
        }

        let self_originated = lse.data.hdr.adv_rtr == router_id;
        let threshold = if self_originated {
            LSA_REFRESH_TIME - 1
        } else {
            LSA_MAX_AGE - 1
        };
        if lse.data.hdr.age < threshold {
            // Neighbors' lists keep referencing the previous instance.
            let lsa = Arc::make_mut(&mut lse.data);
            lsa.set_age(lsa.hdr.age + 1);
            if lsa.hdr.age % LSA_CHECK_AGE == 0 && !lsa_check(lsa) {
                Error::LsaCheckFailed(lsa_key).log();
            }
        } else if self_originated {
            refresh.push(lsa_key);
        } else {
            expired.push(lsa_key);
        }
    }

    // Refresh self-originated LSAs.
    for lsa_key in refresh {
        let (_, lsdb) = lsdb_get(
            &instance.state.lsdb,
            &arenas.areas,
            &arenas.interfaces,
            lsdb_idx,
        );
        let Some(lse) = lsdb.get(&lsa_key) else {
            continue;
        };
        Debug::LsaRefresh(&lse.data.hdr).log();
        let body = lse.data.body.clone();
        originate(instance, arenas, lsdb_idx, lsa_key.lsa_id, body);
    }

    // Flush LSAs that are about to expire.
    for lsa_key in expired {
        let reason = LsaFlushReason::Expiry;
        flush(instance, arenas, lsdb_idx, lsa_key, reason);
    }

    // Evict MaxAge LSAs that are no longer needed for database
    // synchronization.
    if maxage.is_empty() {
        return;
    }
    let nbr_idxs = scope_neighbors(arenas, lsdb_idx);
    if nbr_idxs.iter().any(|nbr_idx| {
        let nbr = &arenas.neighbors[*nbr_idx];
        matches!(nbr.state, nsm::State::Exchange | nsm::State::Loading)
    }) {
        return;
    }
    for lsa_key in maxage {
        if nbr_idxs.iter().any(|nbr_idx| {
            arenas.neighbors[*nbr_idx]
                .lists
                .ls_rxmt
                .contains_key(&lsa_key)
        }) {
            continue;
        }

        let (_, lsdb) = lsdb_get_mut(
            &mut instance.state.lsdb,
            &mut arenas.areas,
            &mut arenas.interfaces,
            lsdb_idx,
        );
        if let Some(lse) = lsdb.remove(&lsa_key) {
            Debug::LsaEvict(&lse.data.hdr).log();
        }

        // Originate the new instance of an LSA whose sequence number wrapped.
        if let Some(body) = lsdb.seqno_wrapping.remove(&lsa_key) {
            lsdb.seq_no_reset(lsa_key.lsa_type);
            originate(instance, arenas, lsdb_idx, lsa_key.lsa_id, body);
        }
    }
}

// Verifies the consistency of an LSA stored in the database.
fn lsa_check(lsa: &Lsa) -> bool {
    lsa.hdr.length == LsaHdr::LENGTH + lsa.body.length()
}

// Returns the neighbors that take part in the flooding of the given LSDB.
fn scope_neighbors(
    arenas: &InstanceArenas,
    lsdb_idx: LsdbIndex,
) -> Vec<NeighborIndex> {
    let mut nbr_idxs = vec![];
    for area_idx in arenas.areas.indexes() {
        // Filter by LSA area.
        if let LsdbIndex::Link(lsdb_area_idx, _)
        | LsdbIndex::Area(lsdb_area_idx) = lsdb_idx
            && area_idx != lsdb_area_idx
        {
            continue;
        }

        let area = &arenas.areas[area_idx];
        for iface_idx in area.interfaces.indexes() {
            // Filter by LSA interface.
            if let LsdbIndex::Link(_, lsdb_iface_idx) = lsdb_idx
                && iface_idx != lsdb_iface_idx
            {
                continue;
            }

            let iface = &arenas.interfaces[iface_idx];
            nbr_idxs.extend(iface.state.neighbors.indexes());
        }
    }
    nbr_idxs
}

// Removes old instance of the given LSA from all neighbors' Link state
// retransmission lists.
fn rxmt_lists_remove(
    arenas: &mut InstanceArenas,
    lsdb_idx: LsdbIndex,
    lsa: &Lsa,
) {
    let lsa_key = lsa.hdr.key();
    for nbr_idx in scope_neighbors(arenas, lsdb_idx) {
        let nbr = &mut arenas.neighbors[nbr_idx];

        // Remove LSA from rxmt list as long as it's an older version.
        if nbr
            .lists
            .ls_rxmt
            .get(&lsa_key)
            .is_some_and(|old_lsa| old_lsa.hdr.compare(&lsa.hdr).is_lt())
        {
            nbr.lists.ls_rxmt.remove(&lsa_key);
            nbr.rxmt_lsupd_stop_check();
        }
    }
}

// Returns the link-state ID of the Inter-Area-Prefix-LSAs that advertise the
// given prefix. The same ID is used in all areas.
fn summary_lsa_id(
    instance: &mut InstanceUpView<'_>,
    prefix: IpNetwork,
) -> Ipv4Addr {
    let state = &mut *instance.state;
    if let Some(lsa_id) = state.summary_lsa_ids.get(&prefix) {
        return *lsa_id;
    }

    state.summary_next_lsa_id += 1;
    let lsa_id = Ipv4Addr::from(state.summary_next_lsa_id);
    state.summary_lsa_ids.insert(prefix, lsa_id);
    lsa_id
}

// LSA maintenance associated to interface state transitions.
fn lsa_orig_iface_state_change(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
    old_state: ism::State,
    new_state: ism::State,
) {
    use ism::State;

    let iface = &arenas.interfaces[iface_idx];
    let if_type = iface.config.if_type;
    let broadcast_or_nbma = iface.is_broadcast_or_nbma();

    // The Link-LSA is originated as soon as the interface comes up.
    if old_state == State::Down && new_state != State::Loopback {
        lsa_orig_link(instance, arenas, area_idx, iface_idx);
    }

    // Router-LSA.
    let mut router_lsa = [old_state, new_state].iter().any(|state| {
        matches!(state, State::Down | State::Loopback | State::Dr)
    });
    router_lsa |= if_type == InterfaceType::PointToMultipoint
        && (old_state == State::PointToPoint
            || new_state == State::PointToPoint);
    router_lsa |= broadcast_or_nbma && new_state == State::Waiting;
    if router_lsa {
        lsa_orig_router(instance, arenas, area_idx);
    }

    // Leaving the Waiting state.
    if old_state == State::Waiting {
        if matches!(new_state, State::DrOther | State::Backup | State::Dr) {
            arenas.interfaces[iface_idx].state.transit = true;
        }
        lsa_orig_router(instance, arenas, area_idx);
    }

    // Entering the DR state.
    if new_state == State::Dr {
        if lsa_orig_network(instance, arenas, area_idx, iface_idx) {
            lsa_orig_intra_area_prefix_network(
                instance, arenas, area_idx, iface_idx,
            );
        }
        arenas.interfaces[iface_idx].join_all_dr(instance);
    }

    // Entering the Backup state.
    if new_state == State::Backup {
        arenas.interfaces[iface_idx].join_all_dr(instance);
    }

    // Leaving the DR state.
    if old_state == State::Dr && new_state != State::Dr {
        lsa_flush_network(instance, arenas, area_idx, iface_idx);
    }

    // Leave the AllDRouters group. The condition is kept as historically
    // implemented, which is true for any transition out of DR or Backup.
    #[allow(clippy::nonminimal_bool)]
    if old_state == State::Dr
        || old_state == State::Backup
            && (new_state != State::Dr || new_state != State::Backup)
    {
        arenas.interfaces[iface_idx].leave_all_dr(instance);
    }

    // The prefixes of stub, passive and looped back interfaces are
    // advertised in the Intra-Area-Prefix-LSA that references the
    // Router-LSA.
    lsa_orig_intra_area_prefix_router(instance, arenas, area_idx);
}

// (Re)originates all area-scope LSAs of this router.
fn lsa_orig_area(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
) {
    lsa_orig_router(instance, arenas, area_idx);
    let iface_idxs = arenas.areas[area_idx]
        .interfaces
        .indexes()
        .collect::<Vec<_>>();
    for iface_idx in iface_idxs {
        if lsa_orig_network(instance, arenas, area_idx, iface_idx) {
            lsa_orig_intra_area_prefix_network(
                instance, arenas, area_idx, iface_idx,
            );
        }
    }
    lsa_orig_intra_area_prefix_router(instance, arenas, area_idx);
}

pub(crate) fn lsa_orig_router(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
) {
    let router_id = instance.state.router_id;
    let area = &arenas.areas[area_idx];

    // Initialize Router-LSA flags.
    let mut flags = LsaRouterFlags::empty();
    if arenas.areas.is_abr(&arenas.interfaces) {
        flags.insert(LsaRouterFlags::B);
    }

    // Add Router-LSA links.
    let mut links = vec![];
    for iface in area.interfaces.iter(&arenas.interfaces) {
        if matches!(
            iface.state.ism_state,
            ism::State::Down | ism::State::Loopback | ism::State::Passive
        ) {
            continue;
        }

        let metric = iface.config.cost;
        let iface_id = iface.system.ifindex;
        match iface.config.if_type {
            InterfaceType::PointToPoint | InterfaceType::PointToMultipoint => {
                links.extend(
                    iface
                        .state
                        .neighbors
                        .iter(&arenas.neighbors)
                        .filter(|nbr| nbr.state == nsm::State::Full)
                        .map(|nbr| {
                            LsaRouterLink::new(
                                LsaRouterLinkType::PointToPoint,
                                metric,
                                iface_id,
                                nbr.iface_id.unwrap_or_default(),
                                nbr.router_id,
                            )
                        }),
                );
            }
            InterfaceType::VirtualLink => {
                for nbr in iface
                    .state
                    .neighbors
                    .iter(&arenas.neighbors)
                    .filter(|nbr| nbr.state == nsm::State::Full)
                {
                    flags.insert(LsaRouterFlags::V);
                    links.push(LsaRouterLink::new(
                        LsaRouterLinkType::VirtualLink,
                        metric,
                        iface_id,
                        nbr.iface_id.unwrap_or_default(),
                        nbr.router_id,
                    ));
                }
            }
            InterfaceType::Broadcast | InterfaceType::Nbma => {
                if let Some(dr) =
                    iface_transit_dr(iface, &arenas.neighbors, router_id)
                {
                    links.push(LsaRouterLink::new(
                        LsaRouterLinkType::TransitNetwork,
                        metric,
                        iface_id,
                        dr.iface_id,
                        dr.router_id,
                    ));
                }
            }
        }
    }

    let options = area.options(instance.config.af);
    let body = LsaBody::Router(LsaRouter::new(flags, options, links));
    originate_check(
        instance,
        arenas,
        LsdbIndex::Area(area_idx),
        Ipv4Addr::UNSPECIFIED,
        body,
    );
}

// (Re)originates the Network-LSA of the given interface, or flushes it if the
// router is no longer the DR of a network with Full adjacencies.
//
// Returns whether a Network-LSA is being advertised.
fn lsa_orig_network(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
) -> bool {
    let router_id = instance.state.router_id;
    let area = &arenas.areas[area_idx];
    let iface = &arenas.interfaces[iface_idx];

    let mut attached_rtrs = iface
        .state
        .neighbors
        .iter(&arenas.neighbors)
        .filter(|nbr| nbr.state == nsm::State::Full)
        .map(|nbr| nbr.router_id)
        .collect::<BTreeSet<_>>();
    if iface.state.ism_state != ism::State::Dr || attached_rtrs.is_empty() {
        lsa_flush_network(instance, arenas, area_idx, iface_idx);
        return false;
    }
    attached_rtrs.insert(router_id);

    let lsa_id = Ipv4Addr::from(iface.system.ifindex);
    let options = area.options(instance.config.af);
    let body = LsaBody::Network(LsaNetwork::new(options, attached_rtrs));
    originate_check(instance, arenas, LsdbIndex::Area(area_idx), lsa_id, body);
    true
}

// Flushes the Network-LSA of the given interface, along with the
// Intra-Area-Prefix-LSA that references it.
fn lsa_flush_network(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
) {
    let router_id = instance.state.router_id;
    let lsa_id = Ipv4Addr::from(arenas.interfaces[iface_idx].system.ifindex);
    let reason = LsaFlushReason::PrematureAging;
    for lsa_type in [LsaType::Network, LsaType::IntraAreaPrefix] {
        let lsa_key = LsaKey::new(lsa_type, router_id, lsa_id);
        flush(instance, arenas, LsdbIndex::Area(area_idx), lsa_key, reason);
    }
}

fn lsa_orig_link(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
) {
    let area = &arenas.areas[area_idx];
    let iface = &arenas.interfaces[iface_idx];

    // Link-LSAs aren't originated for virtual links.
    if iface.config.if_type == InterfaceType::VirtualLink {
        return;
    }
    let Some(linklocal) = iface.system.linklocal else {
        return;
    };

    let prefixes = iface
        .system
        .addr_list
        .iter()
        .filter(|addr| !is_linklocal(addr))
        .map(|addr| {
            LsaLinkPrefix::new(PrefixOptions::empty(), addr.apply_mask())
        })
        .collect();
    let body = LsaBody::Link(LsaLink::new(
        iface.config.priority,
        area.options(instance.config.af),
        IpAddr::V6(linklocal),
        prefixes,
    ));
    let lsa_id = Ipv4Addr::from(iface.system.ifindex);
    originate_check(
        instance,
        arenas,
        LsdbIndex::Link(area_idx, iface_idx),
        lsa_id,
        body,
    );
}

// (Re)originates the Intra-Area-Prefix-LSA that references the Router-LSA.
//
// It carries the prefixes of all interfaces that aren't advertised as transit
// networks.
fn lsa_orig_intra_area_prefix_router(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
) {
    let router_id = instance.state.router_id;
    let area = &arenas.areas[area_idx];

    let mut prefixes = BTreeMap::new();
    for iface in area.interfaces.iter(&arenas.interfaces) {
        if iface.is_down() || iface.config.if_type == InterfaceType::VirtualLink
        {
            continue;
        }

        // Looped back interfaces are advertised as host routes.
        if iface.state.ism_state == ism::State::Loopback {
            for addr in iface.system.addr_list.iter() {
                if !is_linklocal(addr) {
                    prefixes.insert(addr.ip().to_host_prefix(), 0);
                }
            }
            continue;
        }

        if iface_transit_dr(iface, &arenas.neighbors, router_id).is_some() {
            continue;
        }
        for addr in iface.system.addr_list.iter() {
            if !is_linklocal(addr) {
                prefixes.insert(addr.apply_mask(), iface.config.cost);
            }
        }
    }

    let lsdb_idx = LsdbIndex::Area(area_idx);
    let lsa_id = Ipv4Addr::UNSPECIFIED;
    if prefixes.is_empty() {
        let lsa_key = LsaKey::new(LsaType::IntraAreaPrefix, router_id, lsa_id);
        let reason = LsaFlushReason::PrematureAging;
        flush(instance, arenas, lsdb_idx, lsa_key, reason);
        return;
    }

    let prefixes = prefixes
        .into_iter()
        .map(|(value, metric)| {
            LsaIntraAreaPrefixEntry::new(PrefixOptions::empty(), value, metric)
        })
        .collect();
    let body = LsaBody::IntraAreaPrefix(LsaIntraAreaPrefix::new(
        LsaType::Router,
        Ipv4Addr::UNSPECIFIED,
        router_id,
        prefixes,
    ));
    originate_check(instance, arenas, lsdb_idx, lsa_id, body);
}

// (Re)originates the Intra-Area-Prefix-LSA that references the Network-LSA of
// the given interface.
//
// It carries the prefixes advertised in the Link-LSAs of all Full neighbors,
// in addition to the prefixes of the interface itself.
fn lsa_orig_intra_area_prefix_network(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    area_idx: AreaIndex,
    iface_idx: InterfaceIndex,
) {
    let router_id = instance.state.router_id;
    let iface = &arenas.interfaces[iface_idx];

    let mut prefixes = iface
        .system
        .addr_list
        .iter()
        .filter(|addr| !is_linklocal(addr))
        .map(|addr| addr.apply_mask())
        .collect::<BTreeSet<_>>();
    for nbr in iface
        .state
        .neighbors
        .iter(&arenas.neighbors)
        .filter(|nbr| nbr.state == nsm::State::Full)
    {
        let Some(nbr_iface_id) = nbr.iface_id else {
            continue;
        };
        let lsa_key = LsaKey::new(
            LsaType::Link,
            nbr.router_id,
            Ipv4Addr::from(nbr_iface_id),
        );
        if let Some(lse) = iface.state.lsdb.get(&lsa_key)
            && let LsaBody::Link(link_lsa) = &lse.data.body
            && !lse.data.hdr.is_maxage()
        {
            prefixes.extend(
                link_lsa
                    .prefixes
                    .iter()
                    .filter(|prefix| {
                        !prefix.options.contains(PrefixOptions::NU)
                    })
                    .map(|prefix| prefix.value.apply_mask()),
            );
        }
    }

    let lsa_id = Ipv4Addr::from(iface.system.ifindex);
    let prefixes = prefixes
        .into_iter()
        .map(|value| {
            LsaIntraAreaPrefixEntry::new(PrefixOptions::empty(), value, 0)
        })
        .collect();
    let body = LsaBody::IntraAreaPrefix(LsaIntraAreaPrefix::new(
        LsaType::Network,
        lsa_id,
        router_id,
        prefixes,
    ));
    originate_check(instance, arenas, LsdbIndex::Area(area_idx), lsa_id, body);
}

fn is_linklocal(addr: &IpNetwork) -> bool {
    match addr {
        IpNetwork::V4(_) => false,
        IpNetwork::V6(addr) => addr.ip().is_unicast_link_local(),
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;
    use crate::config::{AreaCfg, InstanceCfg, InterfaceCfg};
    use crate::instance::Instance;

    fn lsa(seq_no: u32) -> Arc<Lsa> {
        let body = LsaBody::Router(LsaRouter::new(
            LsaRouterFlags::empty(),
            Default::default(),
            vec![],
        ));
        Arc::new(Lsa::new(
            0,
            Ipv4Addr::UNSPECIFIED,
            Ipv4Addr::new(1, 1, 1, 1),
            seq_no,
            body,
        ))
    }

    #[test]
    fn test_lsdb_seq_no_counter() {
        let mut lsdb = Lsdb::default();
        assert_eq!(lsdb.next_seq_no(LsaType::Router), LSA_INIT_SEQ_NO);

        lsdb.seq_no_update(LsaType::Router, LSA_INIT_SEQ_NO + 4);
        assert_eq!(lsdb.next_seq_no(LsaType::Router), LSA_INIT_SEQ_NO + 5);

        // Older sequence numbers don't move the counter backwards.
        lsdb.seq_no_update(LsaType::Router, LSA_INIT_SEQ_NO);
        assert_eq!(lsdb.next_seq_no(LsaType::Router), LSA_INIT_SEQ_NO + 5);
        assert_eq!(lsdb.next_seq_no(LsaType::Network), LSA_INIT_SEQ_NO);

        lsdb.seq_no_reset(LsaType::Router);
        assert_eq!(lsdb.next_seq_no(LsaType::Router), LSA_INIT_SEQ_NO);
    }

    #[test]
    fn test_lsdb_iter_by_type() {
        let mut lsdb = Lsdb::default();
        lsdb.insert(LsaEntry::new(lsa(LSA_INIT_SEQ_NO), LsaSource::Flooded));
        assert_eq!(lsdb.iter_by_type(LsaType::Router).count(), 1);
        assert_eq!(lsdb.iter_by_type(LsaType::Network).count(), 0);
        assert_eq!(
            lsdb.iter_by_type_advrtr(LsaType::Router, Ipv4Addr::new(2, 2, 2, 2))
                .count(),
            0
        );

        // Replacing an instance keeps a single entry per key.
        let lse = LsaEntry::new(lsa(LSA_INIT_SEQ_NO + 1), LsaSource::Flooded);
        let old = lsdb.insert(lse);
        assert!(old.is_some());
        assert_eq!(lsdb.len(), 1);

        lsdb.clear();
        assert!(lsdb.is_empty());
    }

    #[test]
    fn test_lsa_min_arrival_check() {
        let mut lse = LsaEntry::new(lsa(LSA_INIT_SEQ_NO), LsaSource::Flooded);
        assert!(lsa_min_arrival_check(&lse));
        lse.install_time = LSA_MIN_ARRIVAL;
        assert!(!lsa_min_arrival_check(&lse));

        let lse = LsaEntry::new(lsa(LSA_INIT_SEQ_NO), LsaSource::Originated);
        assert!(!lsa_min_arrival_check(&lse));
    }

    fn test_instance(interfaces: Vec<InterfaceCfg>) -> Instance {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut area = AreaCfg::new(Ipv4Addr::UNSPECIFIED);
        area.interfaces = interfaces;
        let config = InstanceCfg {
            router_id: Ipv4Addr::new(9, 9, 9, 9),
            af: Default::default(),
            spf_delay: 0,
            areas: vec![area],
        };
        let mut instance = Instance::new("test", config, tx);
        instance.start();
        instance
    }

    #[test]
    fn test_install_same_lsa_twice() {
        let mut instance = test_instance(vec![]);
        let (mut view, arenas) = instance.as_up().unwrap();
        let area_idx = arenas.areas.indexes().next().unwrap();
        let lsdb_idx = LsdbIndex::Area(area_idx);

        let lsa = lsa(LSA_INIT_SEQ_NO);
        let source = LsaSource::Flooded;
        assert!(install(&mut view, arenas, lsdb_idx, lsa.clone(), source));
        assert!(view.state.spf_run);

        // The second install doesn't change the routing table.
        view.state.spf_run = false;
        assert!(!install(&mut view, arenas, lsdb_idx, lsa, source));
        assert!(!view.state.spf_run);
        assert_eq!(arenas.areas[area_idx].state.lsdb.len(), 1);
    }

    #[test]
    fn test_seq_no_wrapping() {
        let mut instance = test_instance(vec![]);
        let (mut view, arenas) = instance.as_up().unwrap();
        let area_idx = arenas.areas.indexes().next().unwrap();
        let lsdb_idx = LsdbIndex::Area(area_idx);
        let router_id = view.state.router_id;
        let lsa_id = Ipv4Addr::UNSPECIFIED;
        let lsa_key = LsaKey::new(LsaType::Router, router_id, lsa_id);

        // Self-originated instance using MaxSequenceNumber.
        let body = lsa(LSA_INIT_SEQ_NO).body.clone();
        let lsa = Lsa::new(0, lsa_id, router_id, LSA_MAX_SEQ_NO, body.clone());
        let source = LsaSource::Originated;
        install(&mut view, arenas, lsdb_idx, Arc::new(lsa), source);

        // The next origination flushes the current instance instead.
        originate(&mut view, arenas, lsdb_idx, lsa_id, body.clone());
        let lsdb = &arenas.areas[area_idx].state.lsdb;
        let hdr = lsdb.get(&lsa_key).unwrap().data.hdr;
        assert!(hdr.is_maxage());
        assert_eq!(hdr.seq_no, LSA_MAX_SEQ_NO);
        assert!(lsdb.seqno_wrapping.contains_key(&lsa_key));

        // Once the flushed instance is evicted, the LSA is originated again
        // starting from InitialSequenceNumber.
        age_tick(&mut view, arenas);
        let lsdb = &arenas.areas[area_idx].state.lsdb;
        let hdr = lsdb.get(&lsa_key).unwrap().data.hdr;
        assert!(!hdr.is_maxage());
        assert_eq!(hdr.seq_no, LSA_INIT_SEQ_NO);
        assert!(lsdb.seqno_wrapping.is_empty());
    }

    #[test]
    fn test_originate_check() {
        let mut instance = test_instance(vec![]);
        let (mut view, arenas) = instance.as_up().unwrap();
        let area_idx = arenas.areas.indexes().next().unwrap();
        let lsdb_idx = LsdbIndex::Area(area_idx);
        let lsa_id = Ipv4Addr::new(0, 0, 0, 7);
        let router_id = view.state.router_id;
        let lsa_key = LsaKey::new(LsaType::Router, router_id, lsa_id);
        let body = lsa(LSA_INIT_SEQ_NO).body.clone();
        let seq_no = |arenas: &InstanceArenas| {
            let lsdb = &arenas.areas[area_idx].state.lsdb;
            lsdb.get(&lsa_key).unwrap().data.hdr.seq_no
        };

        originate_check(&mut view, arenas, lsdb_idx, lsa_id, body.clone());
        let first = seq_no(arenas);

        // Unchanged contents don't produce a new instance.
        originate_check(&mut view, arenas, lsdb_idx, lsa_id, body.clone());
        assert_eq!(seq_no(arenas), first);

        // Unconditional origination always does.
        originate(&mut view, arenas, lsdb_idx, lsa_id, body);
        assert_eq!(seq_no(arenas), first + 1);
    }

    #[test]
    fn test_maxage_eviction() {
        let iface = InterfaceCfg::new("eth0", 1, InterfaceType::PointToPoint);
        let mut instance = test_instance(vec![iface]);
        let (mut view, arenas) = instance.as_up().unwrap();
        let area_idx = arenas.areas.indexes().next().unwrap();
        let area = &arenas.areas[area_idx];
        let iface_idx = area.interfaces.indexes().next().unwrap();
        let lsdb_idx = LsdbIndex::Area(area_idx);
        let (nbr_idx, _) = arenas.interfaces[iface_idx].state.neighbors.insert(
            &mut arenas.neighbors,
            Ipv4Addr::new(2, 2, 2, 2),
            Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2),
        );

        let mut lsa = (*lsa(LSA_INIT_SEQ_NO)).clone();
        lsa.set_maxage();
        let lsa = Arc::new(lsa);
        let lsa_key = lsa.hdr.key();
        let source = LsaSource::Flooded;
        install(&mut view, arenas, lsdb_idx, lsa.clone(), source);

        // Kept while a neighbor is still exchanging its database.
        arenas.neighbors[nbr_idx].state = nsm::State::Exchange;
        age_tick(&mut view, arenas);
        assert!(arenas.areas[area_idx].state.lsdb.get(&lsa_key).is_some());

        // Kept while waiting to be acknowledged.
        let nbr = &mut arenas.neighbors[nbr_idx];
        nbr.state = nsm::State::Full;
        nbr.lists.ls_rxmt.insert(lsa_key, lsa);
        age_tick(&mut view, arenas);
        assert!(arenas.areas[area_idx].state.lsdb.get(&lsa_key).is_some());

        arenas.neighbors[nbr_idx].lists.ls_rxmt.clear();
        age_tick(&mut view, arenas);
        assert!(arenas.areas[area_idx].state.lsdb.get(&lsa_key).is_none());
    }

    #[test]
    fn test_lsa_check() {
        let mut lsa = (*lsa(LSA_INIT_SEQ_NO)).clone();
        assert!(lsa_check(&lsa));
        lsa.hdr.length += 4;
        assert!(!lsa_check(&lsa));
    }
}
