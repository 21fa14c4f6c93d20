// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-resolution spectrum synthesis: 50%-overlapped FFTs of
//! one subchannel's accumulated time series, per requested resolution, rearranged so bin
//! 0 is the most-negative frequency and bin `N/2` is DC.

use seti_core::dsp::complex::Complex;
use seti_core::errors::{config_error, Result};
use seti_core::Fft;

/// Swap the two halves of an even-length spectrum in place so natural FFT order (bin 0 =
/// DC) becomes centered order (bin 0 = most-negative frequency, bin `N/2` = DC).
pub fn fftshift(spectrum: &mut [Complex]) {
    let n = spectrum.len();
    debug_assert_eq!(n % 2, 0);
    let half = n / 2;
    for i in 0..half {
        spectrum.swap(i, i + half);
    }
}

/// Produce `n_spectra` overlapping (50%) spectra of length `fft_len` from one
/// subchannel's concatenated time series. `samples.len()` must be at least
/// `fft_len + (n_spectra - 1) * fft_len / 2`.
pub fn synthesize(
    samples: &[Complex],
    fft_len: usize,
    n_spectra: usize,
    fft: &Fft,
    out: &mut Vec<Vec<Complex>>,
) -> Result<()> {
    if !fft_len.is_power_of_two() {
        return config_error("spectrum resolution FFT length must be a power of two");
    }
    let hop = fft_len / 2;
    let need = fft_len + hop * n_spectra.saturating_sub(1);
    if samples.len() < need {
        return config_error("insufficient half-frame samples accumulated for requested resolution");
    }

    out.clear();
    out.reserve(n_spectra);
    let mut spectrum = vec![Complex::default(); fft_len];
    for s in 0..n_spectra {
        let start = s * hop;
        fft.fft(&samples[start..start + fft_len], &mut spectrum);
        fftshift(&mut spectrum);
        out.push(spectrum.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fftshift_moves_dc_to_center() {
        let mut spectrum = vec![Complex::default(); 8];
        spectrum[0] = Complex::new(1.0, 0.0); // DC bin in natural order
        fftshift(&mut spectrum);
        assert_eq!(spectrum[4], Complex::new(1.0, 0.0));
    }

    #[test]
    fn produces_requested_overlap_count() {
        let fft = Fft::new(16);
        let samples = vec![Complex::new(1.0, 0.0); 16 + 8 * 3];
        let mut out = Vec::new();
        synthesize(&samples, 16, 4, &fft, &mut out).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].len(), 16);
    }

    #[test]
    fn rejects_insufficient_samples() {
        let fft = Fft::new(16);
        let samples = vec![Complex::default(); 16];
        let mut out = Vec::new();
        assert!(synthesize(&samples, 16, 4, &fft, &mut out).is_err());
    }
}
