// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CW power packing: a Hanning-windowed adjustment across
//! neighboring bins, converted to a clamped 2-bit power value and packed into the
//! [`seti_core::grids::CwPowerGrid`] the DADD kernel unpacks in `seti-cwdetect`.

use seti_core::dsp::complex::Complex;
use seti_core::grids::CwPowerGrid;

/// `sqrt(8/3) / 2`, the Hanning-adjustment scale factor.
pub const HANNING_SCALE: f32 = 0.4714045207910317; // sqrt(8.0/3.0) / 2.0

/// Apply the three-tap Hanning adjustment to one spectrum's bins: `bin <- bin +
/// 0.5*(bin_prev + bin_next)`, scaled by [`HANNING_SCALE`]. Edge bins treat the missing
/// neighbor as zero.
pub fn hanning_adjust(spectrum: &[Complex], out: &mut Vec<Complex>) {
    out.clear();
    out.reserve(spectrum.len());
    let n = spectrum.len();
    for i in 0..n {
        let prev = if i == 0 { Complex::default() } else { spectrum[i - 1] };
        let next = if i + 1 == n { Complex::default() } else { spectrum[i + 1] };
        let adjusted = spectrum[i] + (prev + next).scale(0.5);
        out.push(adjusted.scale(HANNING_SCALE));
    }
}

/// Pack one Hanning-adjusted spectrum's bin powers into `grid` at `spectrum_idx`,
/// clamping each to the 2-bit range.
pub fn pack_spectrum(adjusted: &[Complex], grid: &mut CwPowerGrid, spectrum_idx: usize) {
    for (bin, sample) in adjusted.iter().enumerate() {
        let power = sample.re * sample.re + sample.im * sample.im;
        let quantized = power.round().clamp(0.0, 3.0) as u8;
        grid.set(spectrum_idx, bin, quantized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hanning_adjust_preserves_length() {
        let spectrum = vec![Complex::new(1.0, 0.0); 8];
        let mut out = Vec::new();
        hanning_adjust(&spectrum, &mut out);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn pack_spectrum_clamps_to_two_bits() {
        let mut grid = CwPowerGrid::new(4, 1);
        let adjusted = vec![
            Complex::new(100.0, 0.0),
            Complex::new(0.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(1.3, 0.4),
        ];
        pack_spectrum(&adjusted, &mut grid, 0);
        assert_eq!(grid.get(0, 0), 3);
        assert_eq!(grid.get(0, 1), 0);
    }
}
