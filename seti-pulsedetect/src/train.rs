// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triplet clustering into pulse trains: walk accepted triplets
//! in cluster-key order, refit the surviving pulse list by linear regression, build a period
//! histogram, and compute the false-alarm probability.

use hashbrown::HashMap;

use seti_core::cluster::cluster_sorted;
use seti_core::packet::PolKind;
use seti_core::signal::PulseHit;

use crate::triplet::{fit_line, Triplet};

/// Largest pulse list a train refit will fold in before capping.
pub const MAX_TRAIN_PULSES: usize = 64;

/// A clustered pulse train, ready for hand-off to the super-clusterer.
#[derive(Clone, Debug)]
pub struct PulseTrain {
    pub start_bin: f64,
    pub drift_per_spectrum: f64,
    pub total_power: f32,
    pub period_spectra: f64,
    pub pulse_count: u32,
    pub pulses: Vec<PulseHit>,
    pub pfa: f64,
}

/// Cluster `triplets` (already sorted by [`Triplet::cluster_key`]) and emit one
/// [`PulseTrain`] per cluster.
pub fn cluster_triplets(
    mut triplets: Vec<Triplet>,
    cluster_range: f64,
    n_bins: u32,
    n_spectra: u32,
    p_pulse: f64,
    pulse_threshold: f32,
) -> Vec<PulseTrain> {
    triplets.sort_by(|a, b| a.cluster_key().partial_cmp(&b.cluster_key()).unwrap());
    let items: Vec<(f64, f64, Triplet)> =
        triplets.iter().map(|t| (t.cluster_key(), t.combined_power as f64, t.clone())).collect();
    let clusters = cluster_sorted(cluster_range, &items);

    clusters
        .into_iter()
        .map(|c| refit(c.members, n_bins, n_spectra, p_pulse, pulse_threshold))
        .collect()
}

fn refit(members: Vec<Triplet>, n_bins: u32, n_spectra: u32, p_pulse: f64, pulse_threshold: f32) -> PulseTrain {
    let mut seen = HashMap::new();
    let mut pulses = Vec::new();
    for t in &members {
        for p in &t.pulses {
            seen.entry((p.bin, p.spectrum)).or_insert_with(|| {
                pulses.push(*p);
            });
        }
    }
    pulses.sort_by_key(|p| p.spectrum);
    pulses.truncate(MAX_TRAIN_PULSES);

    let points: Vec<(f64, f64)> = pulses.iter().map(|p| (p.spectrum as f64, p.bin as f64)).collect();
    let (start_bin, drift_per_spectrum) = fit_line(&points);

    let total_power: f32 = pulses.iter().map(|p| p.power).sum();
    let period_spectra = modal_period(&pulses);
    let n = pulses.len() as u32;
    let pfa = false_alarm_probability(n_bins, n, n_spectra, p_pulse, total_power, pulse_threshold);

    PulseTrain { start_bin, drift_per_spectrum, total_power, period_spectra, pulse_count: n, pulses, pfa }
}

/// Build a histogram of inter-pulse spectral gaps and return the modal (most common) gap as
/// the estimated period (the modal histogram peak).
fn modal_period(pulses: &[PulseHit]) -> f64 {
    if pulses.len() < 2 {
        return 0.0;
    }
    let mut histogram: HashMap<u32, u32> = HashMap::new();
    for w in pulses.windows(2) {
        let gap = w[1].spectrum - w[0].spectrum;
        *histogram.entry(gap).or_insert(0) += 1;
    }
    histogram.into_iter().max_by_key(|(_, count)| *count).map(|(gap, _)| gap as f64).unwrap_or(0.0)
}

/// `PFA = (bins * 4^(n-2) * spectra^3 * p_pulse^n) / 3`, with a chi-square style correction
/// folding in power in excess of `n * pulseThreshold`.
fn false_alarm_probability(
    n_bins: u32,
    n_pulses: u32,
    n_spectra: u32,
    p_pulse: f64,
    total_power: f32,
    pulse_threshold: f32,
) -> f64 {
    if n_pulses < 2 {
        return 1.0;
    }
    let n = n_pulses as f64;
    let base = (n_bins as f64 * 4f64.powf(n - 2.0) * (n_spectra as f64).powi(3) * p_pulse.powf(n)) / 3.0;

    let expected = n_pulses as f32 * pulse_threshold;
    let excess = (total_power - expected).max(0.0) as f64;
    // Chi-square survival correction: excess summed power beyond the expected floor makes a
    // chance coincidence even less likely, so it multiplies the base PFA down.
    let correction = (-excess / 2.0).exp();
    (base * correction).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triplet::TripletParams;

    fn hit(bin: u32, spectrum: u32, power: f32) -> PulseHit {
        PulseHit { resolution: 0, bin, spectrum, pol: PolKind::Both, power }
    }

    #[test]
    fn modal_period_finds_the_common_gap() {
        let pulses = vec![hit(0, 0, 1.0), hit(0, 5, 1.0), hit(0, 10, 1.0), hit(0, 16, 1.0)];
        assert_eq!(modal_period(&pulses), 5.0);
    }

    #[test]
    fn pfa_decreases_as_excess_power_grows() {
        let low = false_alarm_probability(1000, 3, 64, 1e-3, 3.0, 1.0);
        let high = false_alarm_probability(1000, 3, 64, 1e-3, 30.0, 1.0);
        assert!(high < low);
    }

    #[test]
    fn clustering_two_separated_triplets_yields_two_trains() {
        let params = TripletParams {
            max_drift_bins_per_spectrum: 1.0,
            max_diff_bins: 1,
            max_diff_spectra: 1,
            triplet_threshold: 1.0,
            min_spectral_gap: 1,
        };
        let _ = params; // triplets constructed directly below for a focused clustering test
        let t1 = Triplet { pulses: [hit(100, 0, 5.0), hit(105, 5, 5.0), hit(110, 10, 5.0)], start_bin: 100.0, drift_per_spectrum: 1.0, combined_power: 15.0 };
        let t2 = Triplet { pulses: [hit(900, 0, 5.0), hit(905, 5, 5.0), hit(910, 10, 5.0)], start_bin: 900.0, drift_per_spectrum: 1.0, combined_power: 15.0 };
        let trains = cluster_triplets(vec![t1, t2], 2.0, 1000, 10, 1e-3, 1.0);
        assert_eq!(trains.len(), 2);
    }
}
