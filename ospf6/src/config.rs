//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;
use ospf6_utils::ip::AddressFamily;
use serde::{Deserialize, Serialize};

use crate::interface::InterfaceType;

// Instance configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceCfg {
    pub router_id: Ipv4Addr,
    #[serde(default)]
    pub af: AddressFamily,
    // Kept for compatibility with external configuration files. The SPF
    // computation runs synchronously at the end of each event.
    #[serde(default)]
    pub spf_delay: u32,
    #[serde(default)]
    pub areas: Vec<AreaCfg>,
}

// Area configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AreaCfg {
    pub area_id: Ipv4Addr,
    #[serde(default)]
    pub area_type: AreaType,
    // Whether Inter-Area-Prefix-LSAs other than the default route are
    // injected into a stub area.
    #[serde(default = "default_summary")]
    pub summary: bool,
    // Metric of the default route injected into stub areas.
    #[serde(default = "default_stub_cost")]
    pub default_cost: u32,
    // Address ranges used to summarize the area's networks.
    #[serde(default)]
    pub ranges: Vec<AreaRangeCfg>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceCfg>,
}

// Area address range configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AreaRangeCfg {
    pub prefix: IpNetwork,
    // When false, the networks within the range are not advertised to other
    // areas at all.
    #[serde(default = "default_range_advertise")]
    pub advertise: bool,
    // Fixed metric for the range summary. Defaults to the highest cost among
    // the summarized networks.
    #[serde(default)]
    pub cost: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaType {
    #[default]
    Normal,
    Stub,
    Nssa,
}

// Interface configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceCfg {
    pub name: String,
    pub ifindex: u32,
    #[serde(default)]
    pub if_type: InterfaceType,
    #[serde(default)]
    pub instance_id: u8,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default = "default_cost")]
    pub cost: u16,
    #[serde(default = "default_hello_interval")]
    pub hello_interval: u16,
    #[serde(default = "default_dead_interval")]
    pub dead_interval: u16,
    #[serde(default = "default_retransmit_interval")]
    pub retransmit_interval: u16,
    #[serde(default = "default_transmit_delay")]
    pub transmit_delay: u16,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u16,
    #[serde(default)]
    pub passive: bool,
    #[serde(default = "default_mtu")]
    pub mtu: u16,
    #[serde(default)]
    pub link_local: Option<Ipv6Addr>,
    #[serde(default)]
    pub prefixes: Vec<IpNetwork>,
    #[serde(default)]
    pub static_nbrs: Vec<StaticNbrCfg>,
    #[serde(default)]
    pub virtual_link_peer: Option<Ipv4Addr>,
}

// NBMA neighbor configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticNbrCfg {
    pub router_id: Ipv4Addr,
    pub addr: Ipv6Addr,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

// ===== impl InterfaceCfg =====

impl InterfaceCfg {
    pub fn new(name: &str, ifindex: u32, if_type: InterfaceType) -> Self {
        InterfaceCfg {
            name: name.to_owned(),
            ifindex,
            if_type,
            instance_id: 0,
            priority: default_priority(),
            cost: default_cost(),
            hello_interval: default_hello_interval(),
            dead_interval: default_dead_interval(),
            retransmit_interval: default_retransmit_interval(),
            transmit_delay: default_transmit_delay(),
            poll_interval: default_poll_interval(),
            passive: false,
            mtu: default_mtu(),
            link_local: None,
            prefixes: Default::default(),
            static_nbrs: Default::default(),
            virtual_link_peer: None,
        }
    }
}

// ===== impl AreaCfg =====

impl AreaCfg {
    pub fn new(area_id: Ipv4Addr) -> Self {
        AreaCfg {
            area_id,
            area_type: Default::default(),
            summary: default_summary(),
            default_cost: default_stub_cost(),
            ranges: Default::default(),
            interfaces: Default::default(),
        }
    }
}

// ===== impl AreaRangeCfg =====

impl AreaRangeCfg {
    pub fn new(prefix: IpNetwork) -> Self {
        AreaRangeCfg {
            prefix,
            advertise: default_range_advertise(),
            cost: None,
        }
    }
}

// ===== helper functions =====

fn default_summary() -> bool {
    true
}

fn default_stub_cost() -> u32 {
    1
}

fn default_range_advertise() -> bool {
    true
}

fn default_priority() -> u8 {
    1
}

fn default_cost() -> u16 {
    10
}

fn default_hello_interval() -> u16 {
    10
}

fn default_dead_interval() -> u16 {
    40
}

fn default_retransmit_interval() -> u16 {
    5
}

fn default_transmit_delay() -> u16 {
    1
}

fn default_poll_interval() -> u16 {
    120
}

fn default_mtu() -> u16 {
    1500
}
