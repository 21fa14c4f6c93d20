// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ActivityParams` collects every recognized activity parameter into
//! one plain struct. It is the parsed form of a `CONFIGURE_DX` / `SEND_DX_ACTIVITY_PARAMETERS`
//! control message body; `seti-proto` owns the wire (de)serialization, this crate owns the
//! validated, typed shape every detector crate consumes.

use crate::errors::{config_error, Result};
use crate::ops::OperationFlags;

/// Maximum number of spectral resolutions a single activity may request (1 Hz .. 1 kHz in
/// the reference configuration).
pub const MAX_RESOLUTIONS: usize = 16;

/// Per-resolution thresholds and per-resolution request flags, indexed by resolution id
/// (0 = finest, e.g. 1 Hz).
#[derive(Clone, Debug, Default)]
pub struct PerResolutionParams {
    pub request_pulse_resolution: [bool; MAX_RESOLUTIONS],
    pub pulse_threshold: [f32; MAX_RESOLUTIONS],
    pub triplet_threshold: [f32; MAX_RESOLUTIONS],
    pub singlet_threshold: [f32; MAX_RESOLUTIONS],
}

/// Baseline statistics envelopes: exceeding these at the reporting cadence raises a warning or error event.
#[derive(Clone, Copy, Debug)]
pub struct BaselineLimits {
    pub mean: f32,
    pub range: f32,
    pub std_dev_pct: f32,
}

impl Default for BaselineLimits {
    fn default() -> Self {
        BaselineLimits { mean: f32::INFINITY, range: f32::INFINITY, std_dev_pct: f32::INFINITY }
    }
}

/// Every recognized activity parameter. Fields not understood by this
/// core (an unrecognized operations bit) are dropped at parse time under an "ignore
/// unknown" policy; everything else must validate or the activity definition fails.
#[derive(Clone, Debug)]
pub struct ActivityParams {
    pub data_collection_length: f64,
    /// `dataCollectionLength` rounded down to the nearest power-of-two frames, clamped to
    /// `max_frames`.
    pub data_collection_frames: u32,
    pub max_frames: u32,

    pub dadd_resolution: usize,
    pub dadd_threshold: f32,

    pub per_resolution: PerResolutionParams,

    pub baseline_init_accum_half_frames: u32,
    pub baseline_decay: f32,
    pub baseline_reporting_rate: u32,
    pub baseline_warning_limits: BaselineLimits,
    pub baseline_error_limits: BaselineLimits,

    pub max_pulses_per_half_frame: u32,
    pub max_pulses_per_subchannel_per_half_frame: u32,
    pub max_number_of_candidates: u32,

    pub cw_clustering_delta_freq_hz: f64,
    pub pulse_clustering_delta_freq_hz: f64,
    pub clustering_freq_tolerance_hz: f64,

    pub bad_band_cw_path_limit: f32,
    pub bad_band_pulse_limit: f32,
    pub bad_band_pulse_triplet_limit: f32,

    pub cw_coherent_threshold: f32,
    pub secondary_cw_coherent_threshold: f32,
    pub secondary_pfa_margin: f32,

    pub zero_drift_tolerance_hz_per_s: f64,
    pub max_drift_rate_tolerance_hz_per_s: f64,

    /// Pulse-triplet tolerances (`MAX_DIFF_BINS`/`MAX_DIFF_SPECTRA`); exposed as tunables
    /// rather than compiled-in constants.
    pub max_diff_bins: i32,
    pub max_diff_spectra: i32,

    pub operations: OperationFlags,
}

impl ActivityParams {
    /// Quantize `data_collection_length` (in frames) down to the nearest power of two,
    /// clamped to `max_frames`.
    pub fn quantize_frames(requested_frames: u32, max_frames: u32) -> u32 {
        let clamped = requested_frames.min(max_frames).max(1);
        1u32 << (31 - clamped.leading_zeros())
    }

    /// Validate cross-field invariants that the wire parser cannot check in isolation.
    pub fn validate(&self) -> Result<()> {
        if self.data_collection_frames == 0 || self.data_collection_frames > self.max_frames {
            return config_error("dataCollectionLength quantizes to zero or exceeds maxFrames");
        }
        if !self.data_collection_frames.is_power_of_two() {
            return config_error("dataCollectionLength did not quantize to a power of two");
        }
        if self.dadd_resolution >= MAX_RESOLUTIONS {
            return config_error("daddResolution out of range");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_down_to_power_of_two() {
        assert_eq!(ActivityParams::quantize_frames(100, 1024), 64);
        assert_eq!(ActivityParams::quantize_frames(64, 1024), 64);
        assert_eq!(ActivityParams::quantize_frames(5000, 1024), 1024);
        assert_eq!(ActivityParams::quantize_frames(0, 1024), 1);
    }
}
