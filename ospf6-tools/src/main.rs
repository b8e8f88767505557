//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod topology;

use clap::{App, Arg};
use topology::Topology;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false);
    let layer = if json { layer.json().boxed() } else { layer.boxed() };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

fn main() {
    // Parse command-line parameters.
    let matches = App::new("OSPFv3 simulator")
        .about("Run a set of OSPFv3 routers over a simulated network")
        .arg(
            Arg::with_name("DURATION")
                .long("duration")
                .help("Simulated time in seconds")
                .value_name("SECONDS")
                .default_value("120"),
        )
        .arg(
            Arg::with_name("JSON_LOGS")
                .long("json-logs")
                .help("Emit logs in JSON format"),
        )
        .arg(
            Arg::with_name("FILENAME")
                .help("Topology file path")
                .required(true)
                .index(1),
        )
        .get_matches();
    let duration = matches
        .value_of("DURATION")
        .unwrap()
        .parse::<u64>()
        .expect("Invalid duration");
    let filename = matches.value_of("FILENAME").unwrap();

    init_tracing(matches.is_present("JSON_LOGS"));

    // Load topology.
    let data = std::fs::read_to_string(filename)
        .expect("Unable to read topology file");
    let topology: Topology =
        serde_json::from_str(&data).expect("Failed to parse topology file");

    // Run simulation and print the final state of all routers.
    let snapshots = topology.run(duration);
    let output = serde_json::to_string_pretty(&snapshots)
        .expect("Failed to serialize snapshots");
    println!("{output}");
}
