// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ties the unpack, DADD kernel, bad-band accounting, and frequency clusterer together into
//! one per-polarization CW detection pass.

use seti_core::cluster::cluster_sorted;
use seti_core::grids::CwPowerGrid;
use seti_core::packet::PolKind;
use seti_core::signal::{CwHit, SignalDescription, SignalKind};
use seti_core::units::{bin_to_hz, drift_bins_to_rate, Seconds};

use crate::badband::BandAccounting;
use crate::dadd;
use crate::unpack::{unpack, Slope};

/// Run one slope's full DADD pass over `grid` for polarization `pol`, returning every hit
/// that cleared threshold and was not suppressed by bad-band accounting.
pub fn detect_slope(
    grid: &CwPowerGrid,
    pol: PolKind,
    slope: Slope,
    k_sigma: f32,
    band_path_limit: f32,
) -> (Vec<CwHit>, BandAccounting) {
    let n_spectra = grid.spectra();
    let (rows, n_bins) = unpack(grid, slope);
    let result = dadd::run(rows, n_bins, n_spectra);
    let t = dadd::threshold(n_spectra.max(1), k_sigma);

    let mut accounting = BandAccounting::new(n_bins, band_path_limit);
    let mut hits = Vec::new();
    for (row, &drift) in result.rows.iter().zip(result.drift_of_row.iter()) {
        for bin in 0..n_bins {
            let power = row[bin] as f32;
            if power < t {
                continue;
            }
            let signed_drift = if slope == Slope::Negative { -drift } else { drift };
            let start_bin = bin as u32;
            if !accounting.admit(start_bin) {
                continue;
            }
            hits.push(CwHit { start_bin, drift_bins: signed_drift, power, pol });
        }
    }
    (hits, accounting)
}

/// Cluster a set of CW hits already sorted by [`CwHit::mid_bin`] into [`SignalDescription`]s.
/// `cluster_gap_bins` is `clusterRange` expressed in bins;
/// `bin_width_hz`/`duration` convert bin and drift-bin quantities to physical units.
pub fn cluster_hits(
    mut hits: Vec<CwHit>,
    cluster_gap_bins: f64,
    bin_width_hz: f64,
    duration: Seconds,
) -> Vec<SignalDescription> {
    hits.sort_by(|a, b| a.mid_bin().partial_cmp(&b.mid_bin()).unwrap());
    let items: Vec<(f64, f64, CwHit)> = hits.iter().map(|h| (h.mid_bin(), h.power as f64, *h)).collect();
    let clusters = cluster_sorted(cluster_gap_bins, &items);

    clusters
        .into_iter()
        .map(|c| {
            let strongest = c.strongest;
            let freq = bin_to_hz(c.low, bin_width_hz);
            let width = bin_to_hz(c.high - c.low, bin_width_hz);
            let drift = drift_bins_to_rate(strongest.drift_bins as f64, bin_width_hz, duration);
            SignalDescription {
                freq,
                drift,
                width,
                power: strongest.power,
                pol: strongest.pol,
                kind: SignalKind::CwPower { drift, width },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_noise_grid_yields_no_hits_at_high_threshold() {
        // All bins packed to power 1 (the noise-floor quantization level); with k_sigma = 9
        // nothing should cross threshold.
        let mut grid = CwPowerGrid::new(32, 8);
        for s in 0..8 {
            for b in 0..32 {
                grid.set(s, b, 1);
            }
        }
        let (hits, _) = detect_slope(&grid, PolKind::Left, Slope::Positive, 9.0, 1000.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn strong_zero_drift_tone_is_detected() {
        let mut grid = CwPowerGrid::new(16, 4);
        for s in 0..4 {
            grid.set(s, 5, 3);
        }
        let (hits, _) = detect_slope(&grid, PolKind::Left, Slope::Positive, 1.0, 1000.0);
        assert!(hits.iter().any(|h| h.start_bin == 5 && h.drift_bins == 0));
    }

    #[test]
    fn clustering_merges_adjacent_hits_into_one_signal() {
        let hits = vec![
            CwHit { start_bin: 100, drift_bins: 0, power: 50.0, pol: PolKind::Left },
            CwHit { start_bin: 101, drift_bins: 0, power: 80.0, pol: PolKind::Left },
            CwHit { start_bin: 500, drift_bins: 0, power: 10.0, pol: PolKind::Left },
        ];
        let signals = cluster_hits(hits, 2.0, 1.0, Seconds(1.0));
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].power, 80.0);
    }
}
