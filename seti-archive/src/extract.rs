// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signal-channel extraction: de-drift the archive channel at the
//! candidate's estimated rate, then heterodyne (boxcar-sum) down to a narrower requested
//! bandwidth.

use std::f64::consts::PI;

use seti_core::dsp::complex::Complex;

/// De-drift `archive_channel` in place: multiply sample `t` by `exp(-i*(2*pi*delta_f*t +
/// pi*drift*t^2/w^2))`, where `delta_f` is the candidate's offset from the AC center
/// frequency (Hz), `drift` is its drift rate (Hz/s), `w` is the AC bandwidth (Hz), and `t` is
/// sample time in seconds.
pub fn de_drift(archive_channel: &mut [Complex], sample_period_s: f64, delta_f_hz: f64, drift_hz_per_s: f64, bandwidth_hz: f64) {
    for (n, sample) in archive_channel.iter_mut().enumerate() {
        let t = n as f64 * sample_period_s;
        let phase = 2.0 * PI * delta_f_hz * t + PI * drift_hz_per_s * t * t / (bandwidth_hz * bandwidth_hz);
        let rotation = Complex::new(phase.cos() as f32, -(phase.sin() as f32));
        *sample = *sample * rotation;
    }
}

/// Heterodyne: boxcar-sum `samples_per_blk` adjacent samples to collapse the archive channel
/// down to a narrow signal channel. Trailing samples that don't fill a full block are dropped.
pub fn heterodyne(de_drifted: &[Complex], samples_per_blk: usize) -> Vec<Complex> {
    if samples_per_blk <= 1 {
        return de_drifted.to_vec();
    }
    de_drifted
        .chunks_exact(samples_per_blk)
        .map(|chunk| chunk.iter().fold(Complex::default(), |acc, s| acc + *s))
        .collect()
}

/// `samplesPerBlk = round(AC_BW_Hz / widthHz)`.
pub fn samples_per_block(ac_bandwidth_hz: f64, width_hz: f64) -> usize {
    (ac_bandwidth_hz / width_hz).round().max(1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_drift_and_zero_offset_is_a_no_op() {
        let mut samples = vec![Complex::new(1.0, 2.0), Complex::new(3.0, -1.0)];
        let original = samples.clone();
        de_drift(&mut samples, 1.0, 0.0, 0.0, 1000.0);
        for (a, b) in samples.iter().zip(original.iter()) {
            assert!((a.re - b.re).abs() < 1e-5);
            assert!((a.im - b.im).abs() < 1e-5);
        }
    }

    #[test]
    fn heterodyne_sums_adjacent_blocks() {
        let samples = vec![Complex::new(1.0, 0.0); 8];
        let out = heterodyne(&samples, 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Complex::new(4.0, 0.0));
    }

    #[test]
    fn samples_per_block_rounds_to_nearest() {
        assert_eq!(samples_per_block(1000.0, 300.0), 3);
    }
}
