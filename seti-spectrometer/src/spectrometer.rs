// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-subchannel half-frame orchestration: stitches baselining, confirmation-data
//! emission, multi-resolution spectrum synthesis, CW power packing, and pulse
//! thresholding together into the pipeline one subchannel's half-frame of samples
//! passes through.

use seti_core::dsp::complex::Complex;
use seti_core::errors::Result;
use seti_core::grids::{BaselineVector, CdSample, CwPowerGrid};
use seti_core::packet::PolKind;
use seti_core::signal::PulseHit;
use seti_core::Fft;

use crate::baseline::update_and_apply;
use crate::cd::encode_half_frame;
use crate::cwpack::{hanning_adjust, pack_spectrum};
use crate::pulse::{threshold_spectrum, PulseCaps};
use crate::spectra::synthesize;
use crate::stats::{check_limits, compute_stats, BaselineStats};

/// FFT length and overlap count requested for one resolution.
#[derive(Copy, Clone, Debug)]
pub struct ResolutionConfig {
    pub fft_len: usize,
    pub n_spectra: usize,
    pub pulse_threshold: f32,
    pub pack_cw: bool,
    pub detect_pulses: bool,
}

/// Everything the spectrometer needs to process one activity's half-frames: per-resolution
/// FFT plans, the running baseline, and the output grids the downstream detector crates
/// read. One instance is shared by both polarizations' processing loop.
pub struct Spectrometer {
    n_sub: usize,
    resolutions: Vec<ResolutionConfig>,
    ffts: Vec<Fft>,
    baseline_decay: f32,
    masked: Vec<bool>,

    baseline: BaselineVector,
    /// Indexed `[resolution][subchannel]`: every subchannel gets its own CW power grid per
    /// resolution so concurrent subchannels never overwrite each other's packed spectra.
    cw_grids: Vec<Vec<CwPowerGrid>>,
    caps: PulseCaps,
    half_frame_count: u32,
}

impl Spectrometer {
    pub fn new(
        n_sub: usize,
        resolutions: Vec<ResolutionConfig>,
        baseline_decay: f32,
        masked: Vec<bool>,
        max_pulses_per_subchannel: u32,
        max_pulses_per_half_frame: u32,
    ) -> Self {
        debug_assert_eq!(masked.len(), n_sub);
        let ffts = resolutions.iter().map(|r| Fft::new(r.fft_len)).collect();
        let cw_grids = resolutions
            .iter()
            .map(|r| (0..n_sub).map(|_| CwPowerGrid::new(r.fft_len, if r.pack_cw { r.n_spectra } else { 0 })).collect())
            .collect();
        Spectrometer {
            n_sub,
            resolutions,
            ffts,
            baseline_decay,
            masked,
            baseline: BaselineVector::new(n_sub, 1.0),
            cw_grids,
            caps: PulseCaps::new(max_pulses_per_subchannel, max_pulses_per_half_frame),
            half_frame_count: 0,
        }
    }

    /// Process one subchannel's half-frame: baseline, CD-encode, synthesize spectra at
    /// every configured resolution, pack CW power, and threshold for pulses. Masked
    /// subchannels are baselined and CD-encoded as all-zero but otherwise skipped (the
    /// boundary exception documented on each stage).
    pub fn process_subchannel(
        &mut self,
        sub: usize,
        pol: PolKind,
        mut samples: Vec<Complex>,
        cd_out: &mut Vec<CdSample>,
        pulse_hits: &mut Vec<PulseHit>,
    ) -> Result<()> {
        let masked = self.masked[sub];
        if !masked {
            update_and_apply(&mut self.baseline, sub, &mut samples, self.baseline_decay);
        }
        encode_half_frame(&samples, masked, cd_out);
        if masked {
            return Ok(());
        }

        let mut spectrum_buf = Vec::new();
        let mut adjusted = Vec::new();
        for (idx, cfg) in self.resolutions.iter().enumerate() {
            synthesize(&samples, cfg.fft_len, cfg.n_spectra, &self.ffts[idx], &mut spectrum_buf)?;
            for (s, spectrum) in spectrum_buf.iter().enumerate() {
                if cfg.pack_cw {
                    hanning_adjust(spectrum, &mut adjusted);
                    pack_spectrum(&adjusted, &mut self.cw_grids[idx][sub], s);
                }
                if cfg.detect_pulses {
                    threshold_spectrum(
                        spectrum,
                        idx,
                        s as u32,
                        0,
                        pol,
                        cfg.pulse_threshold,
                        &mut self.caps,
                        pulse_hits,
                    );
                }
            }
        }
        Ok(())
    }

    /// Advance the half-frame counter and, if this half-frame lands on the configured
    /// reporting cadence, compute and limit-check baseline statistics.
    pub fn maybe_report_stats(
        &mut self,
        reporting_rate: u32,
        warning: &seti_core::params::BaselineLimits,
        error_limits: &seti_core::params::BaselineLimits,
    ) -> Option<BaselineStats> {
        self.half_frame_count += 1;
        if reporting_rate == 0 || self.half_frame_count % reporting_rate != 0 {
            return None;
        }
        let stats = compute_stats(&self.baseline, &self.masked)?;
        check_limits(&stats, warning, error_limits);
        Some(stats)
    }

    pub fn cw_grid(&self, resolution: usize, sub: usize) -> &CwPowerGrid {
        &self.cw_grids[resolution][sub]
    }

    pub fn baseline(&self) -> &BaselineVector {
        &self.baseline
    }

    pub fn n_subchannels(&self) -> usize {
        self.n_sub
    }

    pub fn pulses_dropped(&self) -> u64 {
        self.caps.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Vec<ResolutionConfig> {
        vec![ResolutionConfig { fft_len: 16, n_spectra: 2, pulse_threshold: 1000.0, pack_cw: true, detect_pulses: true }]
    }

    #[test]
    fn masked_subchannel_skips_spectra_but_still_cd_encodes() {
        let mut spec = Spectrometer::new(2, config(), 0.9, vec![false, true], 10, 10);
        let samples = vec![Complex::new(1.0, 0.0); 24];
        let mut cd = Vec::new();
        let mut pulses = Vec::new();
        spec.process_subchannel(1, PolKind::Left, samples, &mut cd, &mut pulses).unwrap();
        assert!(cd.iter().all(|s| *s == CdSample::zero()));
        assert!(pulses.is_empty());
    }

    #[test]
    fn unmasked_subchannel_produces_cd_and_packs_cw_grid() {
        let mut spec = Spectrometer::new(1, config(), 0.9, vec![false], 10, 10);
        let samples: Vec<Complex> = (0..24).map(|i| Complex::new((i as f32).sin(), 0.0)).collect();
        let mut cd = Vec::new();
        let mut pulses = Vec::new();
        spec.process_subchannel(0, PolKind::Left, samples, &mut cd, &mut pulses).unwrap();
        assert_eq!(cd.len(), 24);
        assert_eq!(spec.cw_grid(0, 0).spectra(), 2);
    }
}
