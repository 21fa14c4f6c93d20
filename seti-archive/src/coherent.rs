// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The coherent search stage: FFT a narrow (~2 Hz) signal channel at
//! every candidate micro-drift, sum adjacent normalized bin powers over a set of trial
//! widths, and score each `(width, bin, drift)` tuple by the probability a noise-only
//! channel would produce power that high.
//!
//! Each trial bin power is a normalized, unit-noise-floor periodogram value, so summing
//! `w` adjacent bins is a sum of `w` roughly-independent unit-mean exponential variates:
//! under the null hypothesis `2 * sum` follows a chi-square distribution with `2w` degrees
//! of freedom. Because the degree count is always even, the survival function has the
//! closed form used by [`chi_square_sf_even`] below, so no numerical incomplete-gamma
//! routine is needed.

use std::f64::consts::PI;

use seti_core::dsp::complex::Complex;
use seti_core::errors::{config_error, Result};
use seti_core::packet::PolKind;
use seti_core::Fft;

/// The winning `(width, bin, drift)` tuple from one polarization's coherent search, with
/// its false-alarm probability and apparent 1 Hz SNR.
#[derive(Copy, Clone, Debug)]
pub struct CoherentResult {
    pub bin: i64,
    pub drift_bins: i64,
    pub width: usize,
    pub pfa: f64,
    pub snr: f32,
    pub pol: PolKind,
}

/// Survival function of a chi-square distribution with `2*k` degrees of freedom at `x`:
/// `exp(-x/2) * sum_{i=0}^{k-1} (x/2)^i / i!`. Substituting `x = 2*power` (we score each
/// tuple by `chi2(2w, 2*power)`) collapses this to `exp(-power) * sum_{i=0}^{w-1} power^i / i!`.
fn chi_square_sf_even(summed_power: f64, k: usize) -> f64 {
    let mut term = 1.0f64;
    let mut sum = term;
    for i in 1..k {
        term *= summed_power / i as f64;
        sum += term;
    }
    (sum * (-summed_power).exp()).clamp(0.0, 1.0)
}

/// Search every trial width in `widths` and every center bin in `[search_low, search_high)`
/// for the `(width, bin)` whose summed normalized power is least consistent with noise.
/// `power` holds one normalized power value per bin
/// of a single dedrifted, FFTed trial spectrum. Returns `(width, bin, pfa)` for the best
/// tuple found in this spectrum.
pub fn check_coherence(power: &[f32], widths: &[usize], search_low: usize, search_high: usize) -> (usize, usize, f64) {
    let mut best = (widths.first().copied().unwrap_or(1), search_low, 1.0f64);
    let high = search_high.min(power.len());
    if search_low >= high {
        return best;
    }

    for &w in widths {
        if w == 0 || search_low + w > high {
            continue;
        }
        let last_bin = high - w;
        let mut window_sum: f64 = power[search_low..search_low + w].iter().map(|&p| p as f64).sum();
        let mut bin = search_low;
        loop {
            let pfa = chi_square_sf_even(window_sum, w);
            if pfa < best.2 {
                best = (w, bin, pfa);
            }
            if bin == last_bin {
                break;
            }
            window_sum += power[bin + w] as f64 - power[bin] as f64;
            bin += 1;
        }
    }
    best
}

/// Phase applied to sample `t` (in samples) when dedrifting by a candidate micro-drift `d`
/// over a coherent channel of power-of-two length `m`.
fn dedrift_phase(d: i64, m: usize, t: usize) -> f64 {
    -PI * d as f64 * (t as f64).powi(2) / (m as f64).powi(2)
}

/// Apparent 1 Hz SNR for the winning power-search path, folding in the fraction of the
/// original bin bandwidth the coherent width actually covers:
/// `(P*/M + (W_bin - w*B_coh)/W_bin - 1/W_bin) / (1/W_bin)`.
pub fn apparent_snr(p_star: f64, m: usize, bin_width_hz: f64, width_bins: usize, coherent_bin_hz: f64) -> f32 {
    let w_bin = bin_width_hz;
    let inv_w = 1.0 / w_bin;
    let value = (p_star / m as f64 + (w_bin - width_bins as f64 * coherent_bin_hz) / w_bin - inv_w) / inv_w;
    value as f32
}

/// Run the full coherent search: for every micro-drift `d` in
/// `[-max_drift, +max_drift]`, dedrift the `m`-sample signal channel, FFT it, and run
/// [`check_coherence`] over the search window. Keeps the globally best-scoring tuple and
/// folds its summed power into [`apparent_snr`] alongside `p_star`, the peak power found by
/// the wide-channel power-path search over the same candidate (see `DESIGN.md`).
#[allow(clippy::too_many_arguments)]
pub fn run(
    signal_channel: &[Complex],
    m: usize,
    max_drift: i64,
    widths: &[usize],
    search_low: usize,
    search_high: usize,
    fft: &Fft,
    pol: PolKind,
    p_star: f64,
    bin_width_hz: f64,
    coherent_bin_hz: f64,
) -> Result<CoherentResult> {
    if !m.is_power_of_two() {
        return config_error("coherent search channel length must be a power of two");
    }
    if signal_channel.len() < m {
        return config_error("insufficient samples for the requested coherent channel length");
    }

    let mut dedrifted = vec![Complex::default(); m];
    let mut spectrum = vec![Complex::default(); m];
    let mut power = vec![0.0f32; m];

    let mut best = CoherentResult { bin: 0, drift_bins: 0, width: 1, pfa: 1.0, snr: 0.0, pol };

    for d in -max_drift..=max_drift {
        for (t, sample) in signal_channel[..m].iter().enumerate() {
            let phase = dedrift_phase(d, m, t);
            let rotation = Complex::new(phase.cos() as f32, phase.sin() as f32);
            dedrifted[t] = *sample * rotation;
        }
        fft.fft(&dedrifted, &mut spectrum);
        let half = m / 2;
        spectrum.rotate_left(half);
        for (p, s) in power.iter_mut().zip(spectrum.iter()) {
            *p = s.re * s.re + s.im * s.im;
        }

        let (w, bin, pfa) = check_coherence(&power, widths, search_low, search_high);
        if pfa < best.pfa {
            let snr = apparent_snr(p_star, m, bin_width_hz, w, coherent_bin_hz);
            best = CoherentResult { bin: bin as i64, drift_bins: d, width: w, pfa, snr, pol };
        }
    }

    Ok(best)
}

/// Compare the two per-polarization coherent results: the lower-PFA result summarizes the signal; if both pass `threshold`, the
/// summary's polarization is reported as [`PolKind::Both`].
pub fn combine_polarizations(left: CoherentResult, right: CoherentResult, threshold: f32) -> CoherentResult {
    let mut winner = if left.pfa <= right.pfa { left } else { right };
    let both_pass = left.pfa <= threshold as f64 && right.pfa <= threshold as f64;
    if both_pass {
        winner.pol = PolKind::Both;
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chi_square_sf_matches_known_exponential_case() {
        // k = 1 (2 degrees of freedom) reduces to a plain exponential survival function.
        let sf = chi_square_sf_even(2.0, 1);
        assert!((sf - (-2.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn chi_square_sf_decreases_with_more_power() {
        let low = chi_square_sf_even(1.0, 4);
        let high = chi_square_sf_even(20.0, 4);
        assert!(high < low);
    }

    #[test]
    fn check_coherence_finds_the_strong_narrow_peak() {
        let mut power = vec![1.0f32; 64];
        power[30] = 200.0;
        let (w, bin, pfa) = check_coherence(&power, &[1, 2, 4], 0, 64);
        assert_eq!(w, 1);
        assert_eq!(bin, 30);
        assert!(pfa < 1e-6);
    }

    #[test]
    fn combine_polarizations_keeps_lower_pfa_and_marks_both_when_both_pass() {
        let left = CoherentResult { bin: 1, drift_bins: 0, width: 1, pfa: 1e-8, snr: 10.0, pol: PolKind::Left };
        let right = CoherentResult { bin: 1, drift_bins: 0, width: 1, pfa: 1e-6, snr: 9.0, pol: PolKind::Right };
        let combined = combine_polarizations(left, right, 1e-4);
        assert_eq!(combined.pol, PolKind::Both);
        assert_eq!(combined.pfa, 1e-8);
    }

    #[test]
    fn combine_polarizations_keeps_single_pol_when_one_fails() {
        let left = CoherentResult { bin: 1, drift_bins: 0, width: 1, pfa: 1e-8, snr: 10.0, pol: PolKind::Left };
        let right = CoherentResult { bin: 1, drift_bins: 0, width: 1, pfa: 0.5, snr: 1.0, pol: PolKind::Right };
        let combined = combine_polarizations(left, right, 1e-4);
        assert_eq!(combined.pol, PolKind::Left);
    }

    #[test]
    fn run_rejects_non_power_of_two_length() {
        let fft = Fft::new(4);
        let samples = vec![Complex::default(); 10];
        assert!(run(&samples, 3, 1, &[1], 0, 3, &fft, PolKind::Left, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn run_reports_nonzero_snr_for_a_strong_narrowband_tone() {
        let m = 16;
        let fft = Fft::new(m);
        let signal: Vec<Complex> = (0..m)
            .map(|t| {
                let phase = 2.0 * PI * 3.0 * t as f64 / m as f64;
                Complex::new(phase.cos() as f32 * 20.0, phase.sin() as f32 * 20.0)
            })
            .collect();
        let result = run(&signal, m, 0, &[1, 2], 0, m, &fft, PolKind::Left, 400.0, 2.0, 2.0 / m as f64).unwrap();
        assert!(result.snr > 0.0, "expected positive SNR for a strong tone, got {}", result.snr);
    }
}
