// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pulse thresholding: above-threshold bins become
//! [`PulseHit`]s, subject to per-subchannel and per-half-frame caps.

use seti_core::dsp::complex::Complex;
use seti_core::packet::PolKind;
use seti_core::signal::PulseHit;

/// Tracks how many pulse hits a half-frame has emitted so far, enforcing the per-subchannel
/// and per-half-frame caps.
#[derive(Default)]
pub struct PulseCaps {
    pub max_per_subchannel: u32,
    pub max_per_half_frame: u32,
    per_subchannel: u32,
    total: u32,
    pub dropped: u64,
}

impl PulseCaps {
    pub fn new(max_per_subchannel: u32, max_per_half_frame: u32) -> Self {
        PulseCaps { max_per_subchannel, max_per_half_frame, per_subchannel: 0, total: 0, dropped: 0 }
    }

    /// Call once per subchannel, before thresholding its bins.
    pub fn begin_subchannel(&mut self) {
        self.per_subchannel = 0;
    }

    fn try_admit(&mut self) -> bool {
        if self.per_subchannel >= self.max_per_subchannel || self.total >= self.max_per_half_frame {
            self.dropped += 1;
            false
        }
        else {
            self.per_subchannel += 1;
            self.total += 1;
            true
        }
    }
}

/// Threshold one subchannel's spectrum at one resolution, appending surviving hits to
/// `hits` and counting drops against `caps`. `global_bin_base` offsets the spectrum's
/// local bin indices into the global usable-band numbering.
pub fn threshold_spectrum(
    spectrum: &[Complex],
    resolution: usize,
    spectrum_idx: u32,
    global_bin_base: u32,
    pol: PolKind,
    pulse_threshold: f32,
    caps: &mut PulseCaps,
    hits: &mut Vec<PulseHit>,
) {
    caps.begin_subchannel();
    for (local_bin, sample) in spectrum.iter().enumerate() {
        let power = sample.re * sample.re + sample.im * sample.im;
        if power > pulse_threshold {
            if caps.try_admit() {
                hits.push(PulseHit {
                    resolution,
                    bin: global_bin_base + local_bin as u32,
                    spectrum: spectrum_idx,
                    pol,
                    power,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_above_threshold_bins_are_emitted() {
        let spectrum = vec![Complex::new(0.1, 0.0), Complex::new(10.0, 0.0), Complex::new(0.2, 0.0)];
        let mut caps = PulseCaps::new(10, 10);
        let mut hits = Vec::new();
        threshold_spectrum(&spectrum, 0, 3, 0, PolKind::Left, 1.0, &mut caps, &mut hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bin, 1);
        assert_eq!(hits[0].spectrum, 3);
    }

    #[test]
    fn per_half_frame_cap_drops_excess_silently() {
        let spectrum = vec![Complex::new(10.0, 0.0); 5];
        let mut caps = PulseCaps::new(10, 2);
        let mut hits = Vec::new();
        threshold_spectrum(&spectrum, 0, 0, 0, PolKind::Left, 1.0, &mut caps, &mut hits);
        assert_eq!(hits.len(), 2);
        assert_eq!(caps.dropped, 3);
    }
}
