// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sliced triplet search: the usable band is cut into
//! overlapping windows so one slice's triplet search never has to hold the whole
//! observation's pulse list in memory at once.

use seti_core::signal::PulseHit;

/// A candidate triplet accepted by the drift-cone and diff tests, with its fitted
/// (start-bin, drift) from a three-point linear regression.
#[derive(Clone, Debug)]
pub struct Triplet {
    pub pulses: [PulseHit; 3],
    pub start_bin: f64,
    pub drift_per_spectrum: f64,
    pub combined_power: f32,
}

impl Triplet {
    /// The clustering key, `startBin + drift/2`.
    pub fn cluster_key(&self) -> f64 {
        self.start_bin + self.drift_per_spectrum / 2.0
    }
}

/// Tunables controlling triplet acceptance.
#[derive(Copy, Clone, Debug)]
pub struct TripletParams {
    pub max_drift_bins_per_spectrum: f64,
    pub max_diff_bins: i32,
    pub max_diff_spectra: i32,
    pub triplet_threshold: f32,
    pub min_spectral_gap: u32,
}

/// One slice's window: `[bin_low, bin_high)` plus the drift-cone overlap already folded in
/// by the caller.
#[derive(Copy, Clone, Debug)]
pub struct Slice {
    pub bin_low: u32,
    pub bin_high: u32,
}

/// Split `[0, n_bins)` into overlapping slices of `bins_per_slice` bins, each extended by
/// `overlap_bins` on both sides.
pub fn make_slices(n_bins: u32, bins_per_slice: u32, overlap_bins: u32) -> Vec<Slice> {
    if bins_per_slice == 0 {
        return vec![Slice { bin_low: 0, bin_high: n_bins }];
    }
    let mut slices = Vec::new();
    let mut start = 0u32;
    while start < n_bins {
        let core_end = (start + bins_per_slice).min(n_bins);
        let low = start.saturating_sub(overlap_bins);
        let high = (core_end + overlap_bins).min(n_bins);
        slices.push(Slice { bin_low: low, bin_high: high });
        start = core_end;
    }
    slices
}

/// Search one slice's pulses (already filtered to `[slice.bin_low, slice.bin_high)` and
/// sorted by spectrum index) for accepted triplets. Returns the triplets and whether the
/// slice exceeded its caps.
pub fn search_slice(
    pulses: &[PulseHit],
    params: &TripletParams,
    max_triplets: u32,
    max_pulses: u32,
) -> (Vec<Triplet>, bool) {
    let mut bad = pulses.len() as u32 > max_pulses;
    let mut triplets = Vec::new();
    let n = pulses.len();

    'outer: for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if let Some(t) = try_accept(&pulses[i], &pulses[j], &pulses[k], params) {
                    triplets.push(t);
                    if triplets.len() as u32 > max_triplets {
                        bad = true;
                        break 'outer;
                    }
                }
            }
        }
    }
    (triplets, bad)
}

fn try_accept(a: &PulseHit, b: &PulseHit, c: &PulseHit, params: &TripletParams) -> Option<Triplet> {
    let spec_gap_outer = c.spectrum as i64 - a.spectrum as i64;
    if spec_gap_outer < params.min_spectral_gap as i64 {
        return None;
    }
    let bin_gap_outer = c.bin as i64 - a.bin as i64;
    let outer_drift = bin_gap_outer as f64 / spec_gap_outer as f64;
    if outer_drift.abs() >= params.max_drift_bins_per_spectrum {
        return None;
    }

    let d_bin_0 = b.bin as i64 - a.bin as i64;
    let d_bin_1 = c.bin as i64 - b.bin as i64;
    let d_spec_0 = b.spectrum as i64 - a.spectrum as i64;
    let d_spec_1 = c.spectrum as i64 - b.spectrum as i64;
    if (d_bin_0 - d_bin_1).abs() > params.max_diff_bins as i64 {
        return None;
    }
    if (d_spec_0 - d_spec_1).abs() > params.max_diff_spectra as i64 {
        return None;
    }

    let combined_power = a.power + b.power + c.power;
    if combined_power < params.triplet_threshold {
        return None;
    }

    let (start_bin, drift_per_spectrum) = fit_line(&[
        (a.spectrum as f64, a.bin as f64),
        (b.spectrum as f64, b.bin as f64),
        (c.spectrum as f64, c.bin as f64),
    ]);

    Some(Triplet { pulses: [*a, *b, *c], start_bin, drift_per_spectrum, combined_power })
}

/// Ordinary least-squares fit of `bin = start_bin + drift_per_spectrum * spectrum` over the
/// given `(spectrum, bin)` points.
pub fn fit_line(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return (sum_y / n, 0.0);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    (intercept, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seti_core::packet::PolKind;

    fn hit(bin: u32, spectrum: u32, power: f32) -> PulseHit {
        PulseHit { resolution: 0, bin, spectrum, pol: PolKind::Both, power }
    }

    fn params() -> TripletParams {
        TripletParams {
            max_drift_bins_per_spectrum: 1.0,
            max_diff_bins: 1,
            max_diff_spectra: 1,
            triplet_threshold: 1.0,
            min_spectral_gap: 1,
        }
    }

    #[test]
    fn evenly_spaced_pulses_form_a_triplet() {
        let pulses = vec![hit(100, 0, 5.0), hit(105, 5, 5.0), hit(110, 10, 5.0)];
        let (triplets, bad) = search_slice(&pulses, &params(), 10, 10);
        assert!(!bad);
        assert_eq!(triplets.len(), 1);
        assert!((triplets[0].drift_per_spectrum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unevenly_spaced_pulses_are_rejected() {
        let pulses = vec![hit(100, 0, 5.0), hit(105, 5, 5.0), hit(130, 10, 5.0)];
        let (triplets, _) = search_slice(&pulses, &params(), 10, 10);
        assert!(triplets.is_empty());
    }

    #[test]
    fn exceeding_triplet_cap_flags_bad_band() {
        // Five pulses on a straight-enough line produce more than one candidate triplet.
        let pulses: Vec<PulseHit> = (0..5).map(|i| hit(100 + i, i, 5.0)).collect();
        let (_, bad) = search_slice(&pulses, &params(), 1, 100);
        assert!(bad);
    }

    #[test]
    fn make_slices_covers_full_range_with_overlap() {
        let slices = make_slices(100, 40, 5);
        assert!(slices.iter().any(|s| s.bin_low == 0));
        assert!(slices.last().unwrap().bin_high == 100);
    }
}
