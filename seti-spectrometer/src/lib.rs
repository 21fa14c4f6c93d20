// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-half-frame signal processing: baselining, confirmation-data emission,
//! multi-resolution spectrum synthesis, CW power packing, and pulse thresholding.
//!
//! [`Spectrometer`] is the orchestrator the worker threads drive one half-frame at a time;
//! the individual stages (`baseline`, `cd`, `spectra`, `cwpack`, `pulse`, `stats`) are also
//! exported for unit testing and for callers that need finer-grained control.

pub mod baseline;
pub mod cd;
pub mod cwpack;
pub mod pulse;
pub mod spectra;
pub mod spectrometer;
pub mod stats;

pub use pulse::PulseCaps;
pub use spectrometer::{ResolutionConfig, Spectrometer};
pub use stats::BaselineStats;
