//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![cfg_attr(feature = "testing", allow(dead_code, unused_variables))]

pub mod area;
pub mod collections;
pub mod config;
pub mod debug;
pub mod error;
pub mod events;
pub mod flood;
pub mod instance;
pub mod interface;
pub mod lsdb;
pub mod network;
pub mod neighbor;
pub mod output;
pub mod packet;
pub mod route;
pub mod spf;
pub mod state;
pub mod tasks;
#[cfg(feature = "testing")]
pub mod testing;
