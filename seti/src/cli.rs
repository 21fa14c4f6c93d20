// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The standalone/offline CLI.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "seti", version, about = "Offline driver for the SETI channel-detect pipeline")]
pub struct Cli {
    /// Capture file of length-prefixed, wire-format input packets.
    pub capture: PathBuf,

    /// DFB filter-coefficient file. A boxcar
    /// filter is used if omitted, which is sufficient to exercise the pipeline but is not
    /// representative of a tuned passband.
    #[arg(long)]
    pub coeff_file: Option<PathBuf>,

    /// DFB FFT length / subchannel count.
    #[arg(long, default_value_t = 64)]
    pub n_sub: usize,

    /// DFB fractional overlap, in bins.
    #[arg(long, default_value_t = 4)]
    pub overlap: usize,

    /// DFB spectra produced per `iterate` call.
    #[arg(long, default_value_t = 8)]
    pub samples_per_chan: usize,

    /// Bandwidth of one DFB subchannel, in Hz. Also the subchannel's baseband sample rate,
    /// used to derive the spectrometer's bin width (`bandwidth / samples_per_chan`) and the
    /// collection window's observation duration.
    #[arg(long, default_value_t = 1000.0)]
    pub subchannel_bandwidth_hz: f64,

    /// Half-frames of data collection to run before signal detection (rounded down to a
    /// power of two).
    #[arg(long, default_value_t = 64)]
    pub data_collection_frames: u32,

    /// DADD drift-and-add threshold in standard deviations.
    #[arg(long, default_value_t = 7.0)]
    pub dadd_threshold: f32,

    /// Reject signals whose drift magnitude is at or below this rate (Hz/s).
    #[arg(long, default_value_t = 0.01)]
    pub zero_drift_tolerance: f64,

    /// Reject signals whose drift magnitude exceeds this rate (Hz/s).
    #[arg(long, default_value_t = 50.0)]
    pub max_drift_rate_tolerance: f64,

    /// Maximum number of CLASS_CAND signals reported before the candidate cap kicks in.
    #[arg(long, default_value_t = 100)]
    pub max_candidates: u32,

    /// Only parse the capture and print activity parameters; do not run detection.
    #[arg(long)]
    pub probe_only: bool,

    /// Verbosity: repeat for more detail (-v, -vv, ...). Maps to `RUST_LOG` when unset.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
