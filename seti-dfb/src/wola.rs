// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polyphase weighted-overlap-add digital filter bank. Converts
//! `dataLen` contiguous complex time samples into `samplesPerChan` consecutive complex
//! spectra for each of `N_sub` subchannels, with `overlap` bins of oversampling between
//! adjacent subchannels.
//!
//! The per-fold input stride here is `N_sub` samples (not the `N_sub/2` half-step a
//! half-at-a-time SIMD accumulation loop would use): laid out this way the working-set coefficient table is exactly `foldings * N_sub`
//! contiguous entries (matching [`crate::coeff::derive_coefficients`]'s layout) and the
//! input span for one output slot is exactly `foldings * N_sub` samples, which is the
//! first term of [`Dfb::threshold`]. The two layouts are equivalent re-parameterizations
//! of the same WOLA filter; this one keeps the fold/coefficient indexing a single
//! multiplication instead of a half-step one.

use seti_core::dsp::complex::Complex;
use seti_core::errors::{config_error, Result};
use seti_core::Fft;

use crate::coeff::derive_coefficients;

/// The polyphase digital filter bank.
pub struct Dfb {
    n_sub: usize,
    overlap: usize,
    foldings: usize,
    samples_per_chan: usize,
    coeffs: Vec<f64>,
    fft: Fft,
    /// Running phase-rotation offset, persisted
    /// across `iterate` calls and advanced by `overlap` per output slot, modulo `n_sub`.
    start: usize,
}

impl Dfb {
    /// Derive the working coefficient table from a raw filter shape and fix the FFT
    /// length, folding depth, overlap, and output block size.
    pub fn new(raw: &[f64], foldings: usize, n_sub: usize, overlap: usize, samples_per_chan: usize) -> Result<Dfb> {
        if !n_sub.is_power_of_two() {
            return config_error("DFB FFT length must be a power of two");
        }
        if overlap >= n_sub {
            return config_error("DFB overlap must be less than N_sub");
        }
        if samples_per_chan == 0 {
            return config_error("DFB samplesPerChan must be at least one");
        }
        let coeffs = derive_coefficients(raw, foldings, n_sub)?;
        Ok(Dfb {
            n_sub,
            overlap,
            foldings,
            samples_per_chan,
            coeffs,
            fft: Fft::new(n_sub),
            start: 0,
        })
    }

    pub fn n_sub(&self) -> usize {
        self.n_sub
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn samples_per_chan(&self) -> usize {
        self.samples_per_chan
    }

    /// Reset the running phase offset; called when an activity's collection restarts.
    pub fn reset(&mut self) {
        self.start = 0;
    }

    /// Minimum number of input samples `iterate` requires per call.
    pub fn threshold(&self) -> usize {
        self.foldings * self.n_sub + (self.n_sub - self.overlap) * (self.samples_per_chan - 1)
    }

    /// Number of input samples one `iterate` call consumes (advances the caller's input
    /// pointer by this much, even though `threshold()` samples must remain available to
    /// read).
    pub fn hop(&self) -> usize {
        (self.n_sub - self.overlap) * self.samples_per_chan
    }

    /// Run one iteration: `input` must hold at least `threshold()` samples. `out` must
    /// have one `Vec<Complex>` per subchannel (length `n_sub`), each resized by the
    /// caller to at least `samples_per_chan` before the call. Returns the number of input
    /// samples consumed (equal to `hop()`).
    pub fn iterate(&mut self, input: &[Complex], out: &mut [Vec<Complex>]) -> Result<usize> {
        if input.len() < self.threshold() {
            return config_error("insufficient input length supplied to DFB iterate");
        }
        if out.len() != self.n_sub {
            return config_error("DFB iterate output must have one buffer per subchannel");
        }

        let mut working = vec![Complex::default(); self.n_sub];
        let mut spectrum = vec![Complex::default(); self.n_sub];

        for slot in 0..self.samples_per_chan {
            let input_base = slot * (self.n_sub - self.overlap);

            for w in working.iter_mut() {
                *w = Complex::default();
            }
            for f in 0..self.foldings {
                let in_off = input_base + f * self.n_sub;
                let coeff_off = f * self.n_sub;
                // Accumulate in two halves so the natural access pattern stays amenable
                // to four-at-a-time SIMD multiplication.
                let half = self.n_sub / 2;
                for half_idx in 0..2 {
                    let base = half_idx * half;
                    for k in 0..half {
                        let idx = base + k;
                        let sample = input[in_off + idx];
                        let c = self.coeffs[coeff_off + idx] as f32;
                        working[idx] += sample * c;
                    }
                }
            }

            // Phase rotation: cyclic shift by the running offset. ROTATE_DATA is the sole dedrift path.
            if self.start != 0 {
                working.rotate_left(self.start);
            }

            self.fft.fft(&working, &mut spectrum);

            for (chan, slot_buf) in out.iter_mut().enumerate() {
                slot_buf[slot] = spectrum[chan];
            }

            self.start = (self.start + self.overlap) % self.n_sub;
        }

        Ok(self.hop())
    }
}
