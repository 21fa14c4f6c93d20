// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Confirmation-data (CD) emission: convert baselined samples
//! to the packed 4-bit signed CD encoding.

use seti_core::dsp::complex::Complex;
use seti_core::grids::CdSample;

/// Encode one half-frame's worth of (already baseline-rescaled) samples as CD samples.
/// Masked subchannels emit all-zero CD.
pub fn encode_half_frame(samples: &[Complex], masked: bool, out: &mut Vec<CdSample>) {
    out.clear();
    out.reserve(samples.len());
    if masked {
        out.resize(samples.len(), CdSample::zero());
        return;
    }
    for s in samples {
        out.push(CdSample::encode(s.re, s.im));
    }
}

/// Expand CD samples back to floats.
pub fn decode_half_frame(samples: &[CdSample], out: &mut Vec<Complex>) {
    out.clear();
    out.reserve(samples.len());
    for s in samples {
        let (re, im) = s.to_f32();
        out.push(Complex::new(re, im));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_subchannel_emits_all_zero_cd() {
        let samples = vec![Complex::new(5.0, -5.0); 4];
        let mut out = Vec::new();
        encode_half_frame(&samples, true, &mut out);
        assert!(out.iter().all(|s| *s == CdSample::zero()));
    }

    #[test]
    fn round_trip_preserves_mean_power_within_quantization() {
        let samples: Vec<Complex> = (0..64).map(|i| Complex::new((i % 7) as f32 - 3.0, (i % 5) as f32 - 2.0)).collect();
        let mut cd = Vec::new();
        encode_half_frame(&samples, false, &mut cd);
        let mut decoded = Vec::new();
        decode_half_frame(&cd, &mut decoded);

        let orig_power: f32 = samples.iter().map(|s| s.re * s.re + s.im * s.im).sum::<f32>() / samples.len() as f32;
        let dec_power: f32 = decoded.iter().map(|s| s.re * s.re + s.im * s.im).sum::<f32>() / decoded.len() as f32;
        assert!((orig_power - dec_power).abs() < 1.0);
    }
}
