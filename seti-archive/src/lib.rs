// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Archive-channel synthesis and the two-stage (power, coherent) CW re-detector: widen a
//! candidate's subchannel back into an archive channel, de-drift and
//! heterodyne down to a signal channel, run a coarse power-path search, then refine with a
//! coherent search over a narrow (~2 Hz) channel.

pub mod coherent;
pub mod extract;
pub mod power_search;
pub mod synth;

pub use coherent::{check_coherence, combine_polarizations, CoherentResult};
pub use extract::{de_drift, heterodyne, samples_per_block};
pub use power_search::{search, synthesize_spectra, to_power, PowerPeak};
pub use synth::{subchannel_window, synthesize};
