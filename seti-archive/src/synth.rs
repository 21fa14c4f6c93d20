// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Archive-channel synthesis: widen a candidate's single subchannel back
//! into a multi-subchannel channel by inverse-FFTing across `N_ac` adjacent CD subchannels,
//! one output time slot at a time.

use seti_core::dsp::complex::Complex;
use seti_core::errors::{config_error, Result};
use seti_core::Fft;

/// Choose the `N_ac`-wide subchannel window centered on `center_sub`, clamped so it never
/// runs past `[0, n_sub)`.
pub fn subchannel_window(center_sub: usize, n_ac: usize, n_sub: usize) -> (usize, usize) {
    if n_ac >= n_sub {
        return (0, n_sub);
    }
    let half = n_ac / 2;
    let mut low = center_sub.saturating_sub(half);
    let mut high = low + n_ac;
    if high > n_sub {
        high = n_sub;
        low = high - n_ac;
    }
    (low, high)
}

/// Split-half swap so natural FFT/IFFT order (bin 0 = DC) matches frequency order with DC at
/// the middle, i.e. the same rearrangement `seti-spectrometer::spectra::fftshift` performs.
fn split_half_swap(slot: &mut [Complex]) {
    let n = slot.len();
    debug_assert_eq!(n % 2, 0);
    let half = n / 2;
    for i in 0..half {
        slot.swap(i, i + half);
    }
}

/// Synthesize one archive channel's time series from `n_ac` subchannels' worth of CD
/// samples. `subchannel_samples[i]` holds subchannel `low+i`'s CD time series; all must have
/// equal length. Returns the concatenated, power-normalized archive-channel time series.
pub fn synthesize(subchannel_samples: &[Vec<Complex>], fft: &Fft) -> Result<Vec<Complex>> {
    let n_ac = subchannel_samples.len();
    if n_ac == 0 || !n_ac.is_power_of_two() {
        return config_error("subchannelsPerArchiveChannel must be a positive power of two");
    }
    let n_slots = subchannel_samples[0].len();
    if subchannel_samples.iter().any(|s| s.len() != n_slots) {
        return config_error("archive-channel synthesis requires equal-length subchannel CD series");
    }

    let scale = 1.0 / (n_ac as f32).sqrt();
    let mut out = Vec::with_capacity(n_slots * n_ac);
    let mut slot = vec![Complex::default(); n_ac];
    let mut block = vec![Complex::default(); n_ac];

    for t in 0..n_slots {
        for (i, sub) in subchannel_samples.iter().enumerate() {
            slot[i] = sub[t];
        }
        split_half_swap(&mut slot);
        fft.ifft(&slot, &mut block);
        for s in block.iter_mut() {
            *s = s.scale(scale);
        }
        out.extend_from_slice(&block);
    }

    normalize_power(&mut out);
    Ok(out)
}

/// Rescale `samples` in place by `1/sqrt(mean power)` so downstream statistics assume a
/// unit noise floor.
fn normalize_power(samples: &mut [Complex]) {
    if samples.is_empty() {
        return;
    }
    let mean_power: f32 =
        samples.iter().map(|s| s.re * s.re + s.im * s.im).sum::<f32>() / samples.len() as f32;
    if mean_power <= 0.0 {
        return;
    }
    let scale = 1.0 / mean_power.sqrt();
    for s in samples.iter_mut() {
        *s = s.scale(scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_clamps_to_usable_range_at_the_edges() {
        assert_eq!(subchannel_window(0, 4, 100), (0, 4));
        assert_eq!(subchannel_window(99, 4, 100), (96, 100));
        assert_eq!(subchannel_window(50, 4, 100), (48, 52));
    }

    #[test]
    fn synthesized_channel_has_unit_mean_power() {
        let fft = Fft::new(4);
        let subchannels: Vec<Vec<Complex>> =
            (0..4).map(|i| vec![Complex::new((i + 1) as f32, 0.0); 8]).collect();
        let out = synthesize(&subchannels, &fft).unwrap();
        let mean_power: f32 = out.iter().map(|s| s.re * s.re + s.im * s.im).sum::<f32>() / out.len() as f32;
        assert!((mean_power - 1.0).abs() < 0.1);
    }

    #[test]
    fn rejects_non_power_of_two_ac_width() {
        let fft = Fft::new(3);
        let subchannels: Vec<Vec<Complex>> = (0..3).map(|_| vec![Complex::default(); 4]).collect();
        assert!(synthesize(&subchannels, &fft).is_err());
    }
}
