// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frequency-range masks. Classification only
//! consults the recent-RFI and test-signal masks directly; the
//! permanent/birdie masks are applied upstream by the spectrometer's subchannel masking
//! and are not re-checked here.

/// A sorted, non-overlapping set of `[low, high)` frequency ranges (Hz, channel-relative).
#[derive(Clone, Debug, Default)]
pub struct FrequencyMask {
    ranges: Vec<(f64, f64)>,
}

impl FrequencyMask {
    /// Build a mask from an arbitrary set of ranges, sorting and merging overlaps so
    /// `contains` can binary-search.
    pub fn new(mut ranges: Vec<(f64, f64)>) -> Self {
        ranges.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(ranges.len());
        for (low, high) in ranges {
            match merged.last_mut() {
                Some(last) if low <= last.1 => last.1 = last.1.max(high),
                _ => merged.push((low, high)),
            }
        }
        FrequencyMask { ranges: merged }
    }

    pub fn empty() -> Self {
        FrequencyMask { ranges: Vec::new() }
    }

    pub fn contains(&self, freq_hz: f64) -> bool {
        match self.ranges.binary_search_by(|(low, _)| low.partial_cmp(&freq_hz).unwrap()) {
            Ok(_) => true,
            Err(idx) => idx > 0 && self.ranges[idx - 1].1 > freq_hz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_checks_half_open_ranges() {
        let mask = FrequencyMask::new(vec![(100.0, 200.0), (500.0, 600.0)]);
        assert!(mask.contains(150.0));
        assert!(!mask.contains(200.0));
        assert!(mask.contains(599.9));
        assert!(!mask.contains(50.0));
    }

    #[test]
    fn overlapping_ranges_merge() {
        let mask = FrequencyMask::new(vec![(100.0, 200.0), (150.0, 300.0)]);
        assert!(mask.contains(250.0));
    }

    #[test]
    fn empty_mask_contains_nothing() {
        assert!(!FrequencyMask::empty().contains(0.0));
    }
}
