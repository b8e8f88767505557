//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod adjacency;
mod flooding;
mod routing;
mod topologies;
