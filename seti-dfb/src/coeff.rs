// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coefficient derivation: resize the canonical raw filter table, one
//! fold at a time, to whatever FFT length the activity actually configured, then
//! renormalize the whole table. Down-decimation always uses the arithmetic-mean branch;
//! the source's `INTERPOLATE_SMALLER_FILTER` branch is not implemented.

use seti_core::errors::{config_error, Result};

/// Resize one fold's worth of raw coefficients (`raw_fft_len` samples) to `target_len`
/// samples.
pub fn resize_fold(raw: &[f64], target_len: usize) -> Result<Vec<f64>> {
    let raw_len = raw.len();
    if raw_len == target_len {
        return Ok(raw.to_vec());
    }
    if raw_len > target_len {
        if raw_len % target_len != 0 {
            return config_error("raw coefficient length and target FFT length are not in an integer ratio");
        }
        let ratio = raw_len / target_len;
        let mut out = Vec::with_capacity(target_len);
        for chunk in raw.chunks_exact(ratio) {
            let sum: f64 = chunk.iter().sum();
            out.push(sum / ratio as f64);
        }
        Ok(out)
    }
    else {
        if target_len < 2 {
            return config_error("target FFT length too small to interpolate coefficients");
        }
        let d = (raw_len - 1) as f64 / (target_len - 1) as f64;
        let mut out = Vec::with_capacity(target_len);
        for k in 0..target_len {
            let x = d * k as f64;
            let i0 = x.floor() as usize;
            let i1 = (i0 + 1).min(raw_len - 1);
            let frac = x - i0 as f64;
            out.push(raw[i0] * (1.0 - frac) + raw[i1] * frac);
        }
        Ok(out)
    }
}

/// Derive the full `foldings * n_sub` working coefficient table from the raw table
/// (`raw.len() == foldings * raw_fft_len`), resizing each fold's segment from
/// `raw_fft_len` to `n_sub`, then renormalizing the whole table so unit-power-in yields
/// unit-power-per-bin: scale all coefficients by `sqrt(n_sub) / sum(coeff)`.
pub fn derive_coefficients(raw: &[f64], foldings: usize, n_sub: usize) -> Result<Vec<f64>> {
    if foldings == 0 || raw.is_empty() || raw.len() % foldings != 0 {
        return config_error("raw coefficient table length is not a multiple of the folding count");
    }
    let raw_fft_len = raw.len() / foldings;

    let mut table = Vec::with_capacity(foldings * n_sub);
    for fold in 0..foldings {
        let seg = &raw[fold * raw_fft_len..(fold + 1) * raw_fft_len];
        table.extend(resize_fold(seg, n_sub)?);
    }

    let sum: f64 = table.iter().sum();
    if sum == 0.0 {
        return config_error("raw coefficient table sums to zero; cannot renormalize");
    }
    let scale = (n_sub as f64).sqrt() / sum;
    for c in table.iter_mut() {
        *c *= scale;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_length_is_a_copy() {
        let raw = vec![1.0, 2.0, 3.0, 4.0];
        let out = resize_fold(&raw, 4).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn smaller_target_averages_consecutive_groups() {
        let raw = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = resize_fold(&raw, 3).unwrap();
        assert_eq!(out, vec![1.5, 3.5, 5.5]);
    }

    #[test]
    fn larger_target_interpolates_linearly() {
        let raw = vec![0.0, 10.0];
        let out = resize_fold(&raw, 3).unwrap();
        assert_eq!(out, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn non_integer_ratio_is_a_configuration_error() {
        let raw = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(resize_fold(&raw, 3).is_err());
    }

    #[test]
    fn renormalizes_so_sum_scales_to_sqrt_n() {
        let raw = vec![1.0; 8]; // 2 foldings of a 4-sample raw filter
        let table = derive_coefficients(&raw, 2, 4).unwrap();
        assert_eq!(table.len(), 8);
        let sum: f64 = table.iter().sum();
        assert!((sum - (4.0_f64).sqrt()).abs() < 1e-9);
    }
}
