//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

pub mod ip;
pub mod southbound;
pub mod task;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type Sender<T> = UnboundedSender<T>;
pub type Receiver<T> = UnboundedReceiver<T>;
