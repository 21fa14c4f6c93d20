// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Baseline statistics and science output: a periodic BASELINE record
//! computed across non-masked subchannels, plus one complex-amplitudes packet for the
//! subchannel nearest a requested science frequency.

use log::{error, warn};

use seti_core::grids::BaselineVector;
use seti_core::params::BaselineLimits;

/// Mean, standard deviation, and range of the baseline vector across non-masked
/// subchannels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaselineStats {
    pub mean: f32,
    pub stdev: f32,
    pub range: f32,
}

/// Compute [`BaselineStats`] over the non-masked subchannels of `baseline`.
pub fn compute_stats(baseline: &BaselineVector, masked: &[bool]) -> Option<BaselineStats> {
    let values: Vec<f32> =
        (0..baseline.len()).filter(|&i| !masked[i]).map(|i| baseline.value(i)).collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    let stdev = variance.sqrt();
    let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    Some(BaselineStats { mean, stdev, range: max - min })
}

/// Check `stats` against the configured warning/error envelopes and log accordingly.
pub fn check_limits(stats: &BaselineStats, warning: &BaselineLimits, error_limits: &BaselineLimits) {
    let std_dev_pct = if stats.mean != 0.0 { 100.0 * stats.stdev / stats.mean } else { 0.0 };

    if stats.mean > error_limits.mean || stats.range > error_limits.range || std_dev_pct > error_limits.std_dev_pct {
        error!(
            "baseline statistics exceeded error envelope: mean={:.3} range={:.3} stddev%={:.2}",
            stats.mean, stats.range, std_dev_pct
        );
    }
    else if stats.mean > warning.mean || stats.range > warning.range || std_dev_pct > warning.std_dev_pct {
        warn!(
            "baseline statistics exceeded warning envelope: mean={:.3} range={:.3} stddev%={:.2}",
            stats.mean, stats.range, std_dev_pct
        );
    }
}

/// Pick the subchannel nearest a requested science frequency, given each subchannel's
/// center frequency offset in Hz.
pub fn nearest_subchannel(centers_hz: &[f64], target_hz: f64) -> usize {
    centers_hz
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (**a - target_hz).abs().partial_cmp(&(**b - target_hz).abs()).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_subchannels_are_excluded_from_stats() {
        let mut baseline = BaselineVector::new(3, 1.0);
        baseline.update(0, 1.0, 0.0);
        baseline.update(1, 1.0, 0.0);
        baseline.update(2, 100.0, 0.0); // masked outlier should be excluded
        let masked = vec![false, false, true];
        let stats = compute_stats(&baseline, &masked).unwrap();
        assert!((stats.mean - 1.0).abs() < 1e-3);
    }

    #[test]
    fn nearest_subchannel_picks_closest_center() {
        let centers = vec![-1000.0, 0.0, 1000.0, 2000.0];
        assert_eq!(nearest_subchannel(&centers, 900.0), 2);
    }
}
