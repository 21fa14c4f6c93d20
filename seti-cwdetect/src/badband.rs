// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bad-band path accounting: the spectrum is divided into fixed-width
//! buckets; once a bucket's DADD-hit count exceeds its path limit, further hits in that
//! bucket are suppressed and the bucket is reported bad.

/// Fixed bucket size, in bins, for bad-band accounting.
pub const DADD_BAND_BINS: u32 = 64;

/// Per-band path counters for one DADD pass (one polarization, one slope).
pub struct BandAccounting {
    band_bins: u32,
    limit_per_band: u32,
    counts: Vec<u32>,
    bad: Vec<bool>,
}

impl BandAccounting {
    /// `path_limit` is `badBandPathLimit * band_width_kHz` (already
    /// multiplied out by the caller, since that conversion needs the bin width in Hz).
    pub fn new(n_bins: usize, path_limit: f32) -> Self {
        let band_bins = DADD_BAND_BINS;
        let n_bands = (n_bins as u32).div_ceil(band_bins).max(1) as usize;
        BandAccounting {
            band_bins,
            limit_per_band: path_limit.max(0.0).round() as u32,
            counts: vec![0; n_bands],
            bad: vec![false; n_bands],
        }
    }

    fn band_of(&self, bin: u32) -> usize {
        (bin / self.band_bins) as usize
    }

    /// Record one above-threshold hit at `bin`. Returns `false` if the hit should be
    /// suppressed because its band already exceeded the path limit.
    pub fn admit(&mut self, bin: u32) -> bool {
        let band = self.band_of(bin).min(self.counts.len() - 1);
        if self.bad[band] {
            return false;
        }
        self.counts[band] += 1;
        if self.counts[band] > self.limit_per_band {
            self.bad[band] = true;
            return false;
        }
        true
    }

    /// The bad bands accumulated so far, as `(band_index, low_bin, high_bin)` triples.
    pub fn bad_bands(&self) -> Vec<(usize, u32, u32)> {
        self.bad
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| (i, i as u32 * self.band_bins, (i as u32 + 1) * self.band_bins - 1))
            .collect()
    }

    pub fn is_bad(&self, bin: u32) -> bool {
        let band = self.band_of(bin).min(self.bad.len().saturating_sub(1));
        self.bad.get(band).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppresses_hits_once_band_exceeds_limit() {
        let mut acc = BandAccounting::new(128, 2.0);
        assert!(acc.admit(10));
        assert!(acc.admit(11));
        assert!(!acc.admit(12)); // third hit in band 0 exceeds limit of 2
        assert!(acc.is_bad(12));
        assert!(!acc.is_bad(100)); // different band, unaffected
    }

    #[test]
    fn bad_bands_reports_flagged_buckets() {
        let mut acc = BandAccounting::new(64, 0.0);
        acc.admit(0);
        assert!(acc.is_bad(0));
        let bands = acc.bad_bands();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].1, 0);
    }
}
