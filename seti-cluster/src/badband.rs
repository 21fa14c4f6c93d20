// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bad-band records: frequency regions
//! whose DADD-path or pulse-triplet density exceeded the configured limits. Classification
//! flags a candidate whose drift-extended span overlaps any recorded bad band. This
//! overlap check runs last in classification, after mask/drift/candidate-cap decisions.

use seti_core::packet::PolKind;

/// One recorded bad band, already converted from bins to Hz by its producing detector
/// (`seti-cwdetect`'s [`BandAccounting`](seti_core) or `seti-pulsedetect`'s flagged
/// slices).
#[derive(Copy, Clone, Debug)]
pub struct BadBandRecord {
    pub pol: PolKind,
    /// `None` for a CW bad band (spans both DADD slopes); `Some(resolution)` for a pulse
    /// bad band.
    pub resolution: Option<usize>,
    pub low_hz: f64,
    pub high_hz: f64,
}

/// All bad bands accumulated during one activity's detection pass.
#[derive(Clone, Debug, Default)]
pub struct BadBandRegistry {
    records: Vec<BadBandRecord>,
}

impl BadBandRegistry {
    pub fn new() -> Self {
        BadBandRegistry::default()
    }

    pub fn push(&mut self, record: BadBandRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[BadBandRecord] {
        &self.records
    }

    /// Whether `[low_hz, high_hz)` overlaps any recorded bad band whose polarization is
    /// compatible with `pol` (an exact match, or either side being [`PolKind::Both`]).
    pub fn overlaps(&self, low_hz: f64, high_hz: f64, pol: PolKind) -> bool {
        self.records.iter().any(|r| {
            let pol_match = r.pol == pol || r.pol == PolKind::Both || pol == PolKind::Both;
            pol_match && r.low_hz < high_hz && low_hz < r.high_hz
        })
    }
}

/// Extend `[freq_low, freq_high)` by the distance the signal drifts over `duration_s`
/// seconds at `drift_hz_per_s`.
pub fn drift_extended_span(freq_low: f64, freq_high: f64, drift_hz_per_s: f64, duration_s: f64) -> (f64, f64) {
    let shift = drift_hz_per_s * duration_s;
    if shift >= 0.0 {
        (freq_low, freq_high + shift)
    } else {
        (freq_low + shift, freq_high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_requires_pol_compatibility() {
        let mut reg = BadBandRegistry::new();
        reg.push(BadBandRecord { pol: PolKind::Left, resolution: None, low_hz: 100.0, high_hz: 200.0 });
        assert!(reg.overlaps(150.0, 160.0, PolKind::Left));
        assert!(!reg.overlaps(150.0, 160.0, PolKind::Right));
        assert!(reg.overlaps(150.0, 160.0, PolKind::Both));
    }

    #[test]
    fn non_overlapping_span_is_not_flagged() {
        let mut reg = BadBandRegistry::new();
        reg.push(BadBandRecord { pol: PolKind::Both, resolution: None, low_hz: 100.0, high_hz: 200.0 });
        assert!(!reg.overlaps(300.0, 400.0, PolKind::Both));
    }

    #[test]
    fn drift_extended_span_widens_in_drift_direction() {
        assert_eq!(drift_extended_span(100.0, 110.0, 2.0, 5.0), (100.0, 120.0));
        assert_eq!(drift_extended_span(100.0, 110.0, -2.0, 5.0), (90.0, 110.0));
    }
}
