//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};

use bitflags::bitflags;
use derive_new::new;
use enum_as_inner::EnumAsInner;
use ipnetwork::IpNetwork;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::lsdb::LSA_MAX_AGE;
use crate::packet::Options;

// The PrefixOptions Field.
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-4
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct PrefixOptions: u8 {
        const NU = 0x01;
        const LA = 0x02;
        const P = 0x08;
        const DN = 0x10;
    }
}

// OSPFv3 LSA type (U-bit, scope and function code).
//
// IANA registry:
// https://www.iana.org/assignments/ospfv3-parameters/ospfv3-parameters.xhtml#ospfv3-parameters-3
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum LsaType {
    Router = 0x2001,
    Network = 0x2002,
    InterAreaPrefix = 0x2003,
    InterAreaRouter = 0x2004,
    AsExternal = 0x4005,
    Nssa = 0x2007,
    Link = 0x0008,
    IntraAreaPrefix = 0x2009,
}

// OSPFv3 LSA flooding scope.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LsaScope {
    Link,
    Area,
    As,
}

// Database key of an LSA.
#[derive(Clone, Copy, Debug, Eq, Hash, new, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct LsaKey {
    // LSA type.
    pub lsa_type: LsaType,
    // LSA advertising router.
    pub adv_rtr: Ipv4Addr,
    // LSA ID.
    pub lsa_id: Ipv4Addr,
}

//
// OSPFv3 LSA header.
//
// Encoding format:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |           LS Age              |           LS Type             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Link State ID                           |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    Advertising Router                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    LS Sequence Number                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |        LS Checksum            |             Length            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaHdr {
    pub age: u16,
    pub lsa_type: LsaType,
    pub lsa_id: Ipv4Addr,
    pub adv_rtr: Ipv4Addr,
    pub seq_no: u32,
    #[serde(default)]
    pub cksum: u16,
    pub length: u16,
}

// OSPFv3 LSA.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Lsa {
    // LSA header.
    pub hdr: LsaHdr,
    // LSA body.
    pub body: LsaBody,
}

#[derive(Clone, Debug, EnumAsInner, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum LsaBody {
    Router(LsaRouter),
    Network(LsaNetwork),
    InterAreaPrefix(LsaInterAreaPrefix),
    InterAreaRouter(LsaInterAreaRouter),
    AsExternal(LsaAsExternal),
    Nssa(LsaAsExternal),
    Link(LsaLink),
    IntraAreaPrefix(LsaIntraAreaPrefix),
}

//
// OSPFv3 Router-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  0  |Nt|x|V|E|B|            Options                            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |       0       |          Metric               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                      Interface ID                             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                   Neighbor Interface ID                       |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                    Neighbor Router ID                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                             ...                               |
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaRouter {
    pub flags: LsaRouterFlags,
    pub options: Options,
    pub links: Vec<LsaRouterLink>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LsaRouterFlags: u8 {
        const B = 0x01;
        const E = 0x02;
        const V = 0x04;
        const NT = 0x10;
    }
}

#[derive(Clone, Copy, Debug, Eq, FromPrimitive, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LsaRouterLinkType {
    PointToPoint = 0x01,
    TransitNetwork = 0x02,
    VirtualLink = 0x04,
}

#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaRouterLink {
    pub link_type: LsaRouterLinkType,
    pub metric: u16,
    pub iface_id: u32,
    pub nbr_iface_id: u32,
    pub nbr_router_id: Ipv4Addr,
}

//
// OSPFv3 Network-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |      0        |              Options                          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Attached Router                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                             ...                               |
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaNetwork {
    pub options: Options,
    pub attached_rtrs: BTreeSet<Ipv4Addr>,
}

//
// OSPFv3 Inter-Area-Prefix-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |       0       |                  Metric                       |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | PrefixLength  | PrefixOptions |              0                |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Address Prefix                         |
// |                             ...                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaInterAreaPrefix {
    pub metric: u32,
    pub prefix_options: PrefixOptions,
    pub prefix: IpNetwork,
}

#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaInterAreaRouter {
    pub options: Options,
    pub metric: u32,
    pub router_id: Ipv4Addr,
}

// AS-External-LSA and NSSA-LSA body. Stored and flooded, never used for
// route calculation.
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaAsExternal {
    pub flags: LsaAsExternalFlags,
    pub metric: u32,
    pub prefix_options: PrefixOptions,
    pub prefix: IpNetwork,
    pub fwd_addr: Option<IpAddr>,
    pub tag: Option<u32>,
    pub ref_lsa_type: Option<u16>,
    pub ref_lsa_id: Option<Ipv4Addr>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LsaAsExternalFlags: u8 {
        const T = 0x01;
        const F = 0x02;
        const E = 0x04;
    }
}

//
// OSPFv3 Link-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | Rtr Priority  |                Options                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// +-                                                             -+
// |                                                               |
// +-                Link-local Interface Address                 -+
// |                                                               |
// +-                                                             -+
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                         # prefixes                            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  PrefixLength | PrefixOptions |             0                 |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Address Prefix                         |
// |                             ...                               |
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaLink {
    pub priority: u8,
    pub options: Options,
    pub linklocal: IpAddr,
    pub prefixes: Vec<LsaLinkPrefix>,
}

#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaLinkPrefix {
    pub options: PrefixOptions,
    pub value: IpNetwork,
}

//
// OSPFv3 Intra-Area-Prefix-LSA.
//
// Encoding format (LSA body):
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |         # Prefixes            |     Referenced LS Type        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                  Referenced Link State ID                     |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |               Referenced Advertising Router                   |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  PrefixLength | PrefixOptions |          Metric               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Address Prefix                          |
// |                             ...                               |
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaIntraAreaPrefix {
    pub ref_lsa_type: LsaType,
    pub ref_lsa_id: Ipv4Addr,
    pub ref_adv_rtr: Ipv4Addr,
    pub prefixes: Vec<LsaIntraAreaPrefixEntry>,
}

#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaIntraAreaPrefixEntry {
    pub options: PrefixOptions,
    pub value: IpNetwork,
    pub metric: u16,
}

// ===== impl LsaType =====

impl LsaType {
    pub fn scope(&self) -> LsaScope {
        match self {
            LsaType::Link => LsaScope::Link,
            LsaType::AsExternal => LsaScope::As,
            _ => LsaScope::Area,
        }
    }
}

impl std::fmt::Display for LsaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LsaType::Router => write!(f, "router"),
            LsaType::Network => write!(f, "network"),
            LsaType::InterAreaPrefix => write!(f, "inter-area-prefix"),
            LsaType::InterAreaRouter => write!(f, "inter-area-router"),
            LsaType::AsExternal => write!(f, "as-external"),
            LsaType::Nssa => write!(f, "nssa"),
            LsaType::Link => write!(f, "link"),
            LsaType::IntraAreaPrefix => write!(f, "intra-area-prefix"),
        }
    }
}

// ===== impl LsaHdr =====

impl LsaHdr {
    pub const LENGTH: u16 = 20;

    pub fn key(&self) -> LsaKey {
        LsaKey {
            lsa_type: self.lsa_type,
            adv_rtr: self.adv_rtr,
            lsa_id: self.lsa_id,
        }
    }

    pub fn is_maxage(&self) -> bool {
        self.age == LSA_MAX_AGE
    }

    // Compares two instances of the same LSA (RFC 2328 - Section 13.1).
    //
    // The sequence numbers are compared as signed 32-bit integers, so that
    // InitialSequenceNumber (0x80000001) is older than any other valid
    // sequence number. Instances with the same sequence number are ordered by
    // their length. If those are also equal, a MaxAge instance is more recent
    // than one that isn't.
    pub fn compare(&self, other: &LsaHdr) -> Ordering {
        let a = self.seq_no as i32;
        let b = other.seq_no as i32;
        let cmp = a.cmp(&b);
        if cmp != Ordering::Equal {
            return cmp;
        }

        let cmp = self.length.cmp(&other.length);
        if cmp != Ordering::Equal {
            return cmp;
        }

        self.is_maxage().cmp(&other.is_maxage())
    }

    // Returns true if this instance is newer than the other one.
    pub fn is_newer(&self, other: &LsaHdr) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

// ===== impl Lsa =====

impl Lsa {
    pub fn new(
        age: u16,
        lsa_id: Ipv4Addr,
        adv_rtr: Ipv4Addr,
        seq_no: u32,
        body: LsaBody,
    ) -> Lsa {
        let hdr = LsaHdr {
            age,
            lsa_type: body.lsa_type(),
            lsa_id,
            adv_rtr,
            seq_no,
            cksum: 0,
            length: LsaHdr::LENGTH + body.length(),
        };
        Lsa { hdr, body }
    }

    pub fn set_age(&mut self, age: u16) {
        self.hdr.age = std::cmp::min(age, LSA_MAX_AGE);
    }

    pub fn set_maxage(&mut self) {
        self.hdr.age = LSA_MAX_AGE;
    }

    // Checks whether the contents of two instances of the same LSA differ in
    // a way that can affect the routing table.
    pub fn differs_from(&self, other: &Lsa) -> bool {
        // Header: MaxAge transition or length change.
        if self.hdr.is_maxage() != other.hdr.is_maxage()
            || self.hdr.length != other.hdr.length
        {
            return true;
        }

        match (&self.body, &other.body) {
            (LsaBody::Router(a), LsaBody::Router(b)) => {
                a.flags != b.flags
                    || a.links.len() != b.links.len()
                    || a.links.iter().zip(b.links.iter()).any(|(a, b)| {
                        a.link_type != b.link_type
                            || a.metric != b.metric
                            || a.iface_id != b.iface_id
                            || a.nbr_iface_id != b.nbr_iface_id
                            || a.nbr_router_id != b.nbr_router_id
                    })
            }
            (LsaBody::Network(a), LsaBody::Network(b)) => {
                a.options != b.options || a.attached_rtrs != b.attached_rtrs
            }
            (LsaBody::InterAreaPrefix(a), LsaBody::InterAreaPrefix(b)) => {
                a.prefix != b.prefix || a.metric != b.metric
            }
            (LsaBody::IntraAreaPrefix(a), LsaBody::IntraAreaPrefix(b)) => {
                a.ref_lsa_type != b.ref_lsa_type
                    || a.ref_lsa_id != b.ref_lsa_id
                    || a.ref_adv_rtr != b.ref_adv_rtr
                    || a.prefixes != b.prefixes
            }
            (LsaBody::Link(a), LsaBody::Link(b)) => {
                a.linklocal != b.linklocal || a.prefixes != b.prefixes
            }
            (a, b) => a != b,
        }
    }
}

// ===== impl LsaBody =====

impl LsaBody {
    pub fn lsa_type(&self) -> LsaType {
        match self {
            LsaBody::Router(_) => LsaType::Router,
            LsaBody::Network(_) => LsaType::Network,
            LsaBody::InterAreaPrefix(_) => LsaType::InterAreaPrefix,
            LsaBody::InterAreaRouter(_) => LsaType::InterAreaRouter,
            LsaBody::AsExternal(_) => LsaType::AsExternal,
            LsaBody::Nssa(_) => LsaType::Nssa,
            LsaBody::Link(_) => LsaType::Link,
            LsaBody::IntraAreaPrefix(_) => LsaType::IntraAreaPrefix,
        }
    }

    // Returns the length of the LSA body in its wire representation.
    pub fn length(&self) -> u16 {
        let len = match self {
            LsaBody::Router(body) => 4 + 16 * body.links.len(),
            LsaBody::Network(body) => 4 + 4 * body.attached_rtrs.len(),
            LsaBody::InterAreaPrefix(body) => 8 + prefix_wire_len(&body.prefix),
            LsaBody::InterAreaRouter(_) => 12,
            LsaBody::AsExternal(body) | LsaBody::Nssa(body) => {
                let mut len = 8 + prefix_wire_len(&body.prefix);
                if body.fwd_addr.is_some() {
                    len += 16;
                }
                if body.tag.is_some() {
                    len += 4;
                }
                if body.ref_lsa_id.is_some() {
                    len += 4;
                }
                len
            }
            LsaBody::Link(body) => {
                24 + body
                    .prefixes
                    .iter()
                    .map(|prefix| 4 + prefix_wire_len(&prefix.value))
                    .sum::<usize>()
            }
            LsaBody::IntraAreaPrefix(body) => {
                12 + body
                    .prefixes
                    .iter()
                    .map(|prefix| 4 + prefix_wire_len(&prefix.value))
                    .sum::<usize>()
            }
        };
        len as u16
    }
}

// ===== helper functions =====

// Number of bytes used to encode an address prefix (multiple of 32 bits).
fn prefix_wire_len(prefix: &IpNetwork) -> usize {
    prefix.prefix().div_ceil(32) as usize * 4
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsdb::{LSA_INIT_SEQ_NO, LSA_MAX_SEQ_NO};

    fn router_lsa(seq_no: u32, links: Vec<LsaRouterLink>) -> Lsa {
        Lsa::new(
            0,
            Ipv4Addr::new(1, 1, 1, 1),
            Ipv4Addr::new(1, 1, 1, 1),
            seq_no,
            LsaBody::Router(LsaRouter::new(
                LsaRouterFlags::empty(),
                Options::V6 | Options::E | Options::R,
                links,
            )),
        )
    }

    fn p2p_link(nbr: u8, metric: u16) -> LsaRouterLink {
        LsaRouterLink::new(
            LsaRouterLinkType::PointToPoint,
            metric,
            1,
            1,
            Ipv4Addr::new(nbr, nbr, nbr, nbr),
        )
    }

    #[test]
    fn test_seq_no_ordering() {
        let old = router_lsa(LSA_INIT_SEQ_NO, vec![]);
        let new = router_lsa(LSA_INIT_SEQ_NO + 1, vec![]);
        assert!(new.hdr.is_newer(&old.hdr));
        assert!(!old.hdr.is_newer(&new.hdr));

        // Signed comparison: 0x7fffffff is newer than 0x80000001.
        let max = router_lsa(LSA_MAX_SEQ_NO, vec![]);
        assert!(max.hdr.is_newer(&old.hdr));

        // Same sequence number: the longer instance is newer.
        let longer = router_lsa(LSA_INIT_SEQ_NO, vec![p2p_link(2, 10)]);
        assert!(longer.hdr.is_newer(&old.hdr));
        assert_eq!(old.hdr.compare(&old.hdr), Ordering::Equal);
    }

    #[test]
    fn test_maxage_ordering() {
        let live = router_lsa(LSA_INIT_SEQ_NO + 5, vec![p2p_link(2, 10)]);
        let mut aged = live.clone();
        aged.set_age(100);
        let mut flushed = live.clone();
        flushed.set_maxage();

        // The age only matters once it reaches MaxAge.
        assert_eq!(aged.hdr.compare(&live.hdr), Ordering::Equal);
        assert_eq!(flushed.hdr.compare(&live.hdr), Ordering::Greater);
        assert_eq!(live.hdr.compare(&flushed.hdr), Ordering::Less);
        assert!(flushed.hdr.is_newer(&aged.hdr));

        // A higher sequence number still beats a flushed instance.
        let next = router_lsa(LSA_INIT_SEQ_NO + 6, vec![p2p_link(2, 10)]);
        assert!(next.hdr.is_newer(&flushed.hdr));
    }

    #[test]
    fn test_lsa_length() {
        let lsa = router_lsa(LSA_INIT_SEQ_NO, vec![p2p_link(2, 10)]);
        assert_eq!(lsa.hdr.length, 20 + 4 + 16);

        let lsa = Lsa::new(
            0,
            Ipv4Addr::new(0, 0, 0, 1),
            Ipv4Addr::new(1, 1, 1, 1),
            LSA_INIT_SEQ_NO,
            LsaBody::InterAreaPrefix(LsaInterAreaPrefix::new(
                10,
                PrefixOptions::empty(),
                "2001:db8:1::/64".parse().unwrap(),
            )),
        );
        assert_eq!(lsa.hdr.length, 20 + 8 + 8);
    }

    #[test]
    fn test_differs_from() {
        let a = router_lsa(LSA_INIT_SEQ_NO, vec![p2p_link(2, 10)]);
        let mut b = router_lsa(LSA_INIT_SEQ_NO + 1, vec![p2p_link(2, 10)]);
        assert!(!a.differs_from(&b));

        b.set_maxage();
        assert!(a.differs_from(&b));

        let c = router_lsa(LSA_INIT_SEQ_NO + 1, vec![p2p_link(2, 20)]);
        assert!(a.differs_from(&c));

        let d = router_lsa(LSA_INIT_SEQ_NO + 1, vec![p2p_link(3, 10)]);
        assert!(a.differs_from(&d));
    }
}
