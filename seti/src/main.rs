// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Offline driver binary: parses the CLI, initializes logging, and hands off to
//! [`pipeline::run`]. The transport, scheduler, and archive storage this would normally
//! talk to are external collaborators; this binary exercises the library
//! crates end to end against a capture file instead.

mod cli;
mod pipeline;
mod traits;

use clap::Parser;

fn main() {
    let args = cli::Cli::parse();
    init_logging(args.verbose);

    if let Err(err) = pipeline::run(&args) {
        log::error!("activity failed: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    if std::env::var_os("RUST_LOG").is_none() {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", format!("seti={level}"));
    }
    pretty_env_logger::init();
}
