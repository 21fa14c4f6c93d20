// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Expand the packed 2-bit CW power grid into the flat integer accumulator the DADD kernel
//! operates on. The negative-slope pass reuses the positive-slope
//! kernel by reversing each spectrum's bins before unpacking.

use seti_core::grids::CwPowerGrid;

/// Which drift direction this DADD pass searches. The kernel itself is slope-agnostic; only
/// the bin ordering fed into it differs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slope {
    Positive,
    Negative,
}

/// Unpack `grid` into a flat `spectra x (bins + spectra - 1)` accumulator, zero-padded on the
/// right so every drift path the kernel can address stays in bounds. `slope == Negative`
/// reverses each spectrum row so the shared kernel searches the mirrored drift direction.
pub fn unpack(grid: &CwPowerGrid, slope: Slope) -> (Vec<Vec<u32>>, usize) {
    let n_bins = grid.bins_per_spectrum();
    let n_spectra = grid.spectra();
    let padded_width = n_bins + n_spectra.saturating_sub(1);

    let mut rows = Vec::with_capacity(n_spectra);
    let mut row_buf = vec![0u32; n_bins];
    for s in 0..n_spectra {
        grid.unpack_spectrum(s, &mut row_buf);
        let mut row = vec![0u32; padded_width];
        if slope == Slope::Positive {
            row[..n_bins].copy_from_slice(&row_buf);
        }
        else {
            for (b, value) in row_buf.iter().enumerate() {
                row[n_bins - 1 - b] = *value;
            }
        }
        rows.push(row);
    }
    (rows, n_bins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_slope_preserves_bin_order() {
        let mut grid = CwPowerGrid::new(3, 1);
        grid.set(0, 0, 1);
        grid.set(0, 1, 2);
        grid.set(0, 2, 3);
        let (rows, n_bins) = unpack(&grid, Slope::Positive);
        assert_eq!(&rows[0][..n_bins], &[1, 2, 3]);
    }

    #[test]
    fn negative_slope_reverses_bin_order() {
        let mut grid = CwPowerGrid::new(3, 1);
        grid.set(0, 0, 1);
        grid.set(0, 1, 2);
        grid.set(0, 2, 3);
        let (rows, n_bins) = unpack(&grid, Slope::Negative);
        assert_eq!(&rows[0][..n_bins], &[3, 2, 1]);
    }
}
