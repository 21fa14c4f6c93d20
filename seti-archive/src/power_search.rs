// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power search over the signal channel: FFT into overlapped spectra,
//! then for every `(start_bin, drift)` sum the power along the linear drift path and keep
//! the maximum.

use seti_core::dsp::complex::Complex;
use seti_core::errors::{config_error, Result};
use seti_core::Fft;

/// The best drift path found by [`search`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PowerPeak {
    pub bin: i64,
    pub drift_bins: i64,
    pub power: f32,
}

/// FFT `signal_channel` into `n_spectra` overlapped (50%) spectra of `n_bins` bins each,
/// fftshifted so DC is central.
pub fn synthesize_spectra(signal_channel: &[Complex], n_bins: usize, n_spectra: usize, fft: &Fft) -> Result<Vec<Vec<Complex>>> {
    if !n_bins.is_power_of_two() {
        return config_error("power search bin count must be a power of two");
    }
    let hop = n_bins / 2;
    let need = n_bins + hop * n_spectra.saturating_sub(1);
    if signal_channel.len() < need {
        return config_error("insufficient signal-channel samples for requested power-search spectra");
    }

    let mut out = Vec::with_capacity(n_spectra);
    let mut spectrum = vec![Complex::default(); n_bins];
    for s in 0..n_spectra {
        let start = s * hop;
        fft.fft(&signal_channel[start..start + n_bins], &mut spectrum);
        let half = n_bins / 2;
        spectrum.rotate_left(half);
        out.push(spectrum.clone());
    }
    Ok(out)
}

/// Search every `(start_bin, drift)` with `drift in [-n_spectra, n_spectra]` for the maximum
/// summed power along the path `bin + round(drift*(s+0.5)/n_spectra)`.
pub fn search(spectra_power: &[Vec<f32>], n_bins: usize, n_spectra: usize) -> PowerPeak {
    let mut best = PowerPeak { bin: 0, drift_bins: 0, power: f32::NEG_INFINITY };
    let drift_range = n_spectra as i64;

    for bin in 0..n_bins as i64 {
        for drift in -drift_range..=drift_range {
            let mut total = 0.0f32;
            let mut valid = true;
            for s in 0..n_spectra {
                let offset = (drift as f64 * (s as f64 + 0.5) / n_spectra as f64).round() as i64;
                let b = bin + offset;
                if b < 0 || b >= n_bins as i64 {
                    valid = false;
                    break;
                }
                total += spectra_power[s][b as usize];
            }
            if valid && total > best.power {
                best = PowerPeak { bin, drift_bins: drift, power: total };
            }
        }
    }
    best
}

/// Convert a set of complex spectra to per-bin power, the input [`search`] expects.
pub fn to_power(spectra: &[Vec<Complex>]) -> Vec<Vec<f32>> {
    spectra.iter().map(|spectrum| spectrum.iter().map(|s| s.re * s.re + s.im * s.im).collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_constant_bin_zero_drift_peak() {
        let mut power = vec![vec![1.0f32; 16]; 8];
        for row in power.iter_mut() {
            row[10] = 100.0;
        }
        let peak = search(&power, 16, 8);
        assert_eq!(peak.bin, 10);
        assert_eq!(peak.drift_bins, 0);
    }
}
