// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-subchannel baseline tracking and application.

use seti_core::dsp::complex::Complex;
use seti_core::grids::BaselineVector;

/// Compute the instantaneous inverse-RMS baseline estimate for one half-frame of
/// samples: `b_hf = sqrt(N / sum(|x_i|^2))`.
pub fn instantaneous_baseline(samples: &[Complex]) -> f32 {
    let power: f32 = samples.iter().map(|s| s.re * s.re + s.im * s.im).sum();
    if power <= 0.0 {
        return 1.0;
    }
    (samples.len() as f32 / power).sqrt()
}

/// Update the running baseline for `sub` with this half-frame's samples, apply the
/// *pre-update* baseline value in place, and return the pre-update value that was applied.
pub fn update_and_apply(baseline: &mut BaselineVector, sub: usize, samples: &mut [Complex], decay: f32) -> f32 {
    let b_hf = instantaneous_baseline(samples);
    let pre_update = baseline.update(sub, b_hf, decay);
    for s in samples.iter_mut() {
        *s = *s * pre_update;
    }
    pre_update
}
