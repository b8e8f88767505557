//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use ospf6_utils::ip::AddressFamily;

use crate::collections::{AreaId, Arena, Interfaces};
use crate::config::{AreaCfg, AreaType};
use crate::debug::Debug;
use crate::interface::Interface;
use crate::lsdb::Lsdb;
use crate::packet::Options;
use crate::route::{RouteNet, RouteRtr};
use crate::spf::{Vertex, VertexId};

// OSPFv3 area.
#[derive(Debug)]
pub struct Area {
    // ID.
    pub id: AreaId,
    // Area ID.
    pub area_id: Ipv4Addr,
    // Area configuration data.
    pub config: AreaCfg,
    // Area state data.
    pub state: AreaState,
    // Area interfaces.
    pub interfaces: Interfaces,
}

// OSPFv3 area state.
#[derive(Debug, Default)]
pub struct AreaState {
    // LSDB of area-scope LSAs.
    pub lsdb: Lsdb,
    // Shortest-path tree.
    pub spt: BTreeMap<VertexId, Vertex>,
    // Table of all routers reachable in the area.
    pub routers: BTreeMap<Ipv4Addr, RouteRtr>,
    // Intra-area routes computed by the last SPF run.
    pub routes: BTreeMap<IpNetwork, RouteNet>,
    // Statistics.
    pub spf_run_count: u32,
    pub discontinuity_time: Option<DateTime<Utc>>,
}

// ===== impl Area =====

impl Area {
    pub(crate) fn new(id: AreaId, config: AreaCfg) -> Area {
        Debug::AreaCreate(&config.area_id).log();

        Area {
            id,
            area_id: config.area_id,
            config,
            state: Default::default(),
            interfaces: Default::default(),
        }
    }

    // Returns whether this area is active.
    //
    // An area is active as long as it contains at least one operational
    // interface.
    pub(crate) fn is_active(&self, interfaces: &Arena<Interface>) -> bool {
        self.interfaces
            .iter(interfaces)
            .any(|iface| !iface.is_down())
    }

    // Returns whether this is the backbone area.
    pub(crate) fn is_backbone(&self) -> bool {
        self.area_id == Ipv4Addr::UNSPECIFIED
    }

    // Returns the options advertised in Hello and Database Description packets
    // and in the LSAs originated into this area.
    pub(crate) fn options(&self, af: AddressFamily) -> Options {
        let mut options = Options::V6 | Options::R;
        match self.config.area_type {
            AreaType::Normal => options.insert(Options::E),
            AreaType::Stub => (),
            AreaType::Nssa => options.insert(Options::N),
        }
        if af == AddressFamily::Ipv4 {
            options.insert(Options::AF);
        }
        options
    }
}

impl Drop for Area {
    fn drop(&mut self) {
        Debug::AreaDelete(&self.area_id).log();
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_options() {
        let mut config = AreaCfg::new(Ipv4Addr::UNSPECIFIED);
        let area = Area::new(1, config.clone());
        assert!(area.is_backbone());
        let options = area.options(AddressFamily::Ipv6);
        assert!(options.contains(Options::V6 | Options::R | Options::E));
        assert!(!options.contains(Options::AF));

        config.area_id = Ipv4Addr::new(0, 0, 0, 1);
        config.area_type = AreaType::Stub;
        let area = Area::new(2, config);
        assert!(!area.is_backbone());
        let options = area.options(AddressFamily::Ipv4);
        assert!(!options.contains(Options::E));
        assert!(options.contains(Options::AF));
    }
}
