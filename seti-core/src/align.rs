// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Large DFB/spectrometer grids want 16-byte-aligned backing storage so SIMD kernels can
//! assume alignment. This workspace forbids `unsafe`, so instead
//! of a custom aligned allocator we size-pad allocations to a multiple of 4 `Complex`
//! (16 bytes) and assert the allocator actually handed back 16-byte alignment, which every
//! allocator in practice does for `f32`-sized elements at these lengths. The assertion is a
//! cheap early warning if that ever stops being true, not a correctness requirement.

use crate::dsp::complex::Complex;

/// A `Vec<Complex>`-backed buffer padded to a multiple of 4 elements (16 bytes) so SIMD
/// kernels operating on it in groups of four never read past the end.
#[derive(Clone, Debug)]
pub struct AlignedComplexBuffer {
    data: Vec<Complex>,
    logical_len: usize,
}

const SIMD_WIDTH: usize = 4;

impl AlignedComplexBuffer {
    pub fn zeroed(len: usize) -> Self {
        let padded = len.div_ceil(SIMD_WIDTH) * SIMD_WIDTH;
        let data = vec![Complex::default(); padded];
        debug_assert_eq!(data.as_ptr() as usize % 16, 0, "allocator did not 16-byte align");
        AlignedComplexBuffer { data, logical_len: len }
    }

    pub fn len(&self) -> usize {
        self.logical_len
    }

    pub fn is_empty(&self) -> bool {
        self.logical_len == 0
    }

    pub fn as_slice(&self) -> &[Complex] {
        &self.data[..self.logical_len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex] {
        &mut self.data[..self.logical_len]
    }

    /// The padded backing storage, including the SIMD tail past `len()`. Kernels that
    /// process four lanes at a time may read/write this full slice.
    pub fn padded_slice(&self) -> &[Complex] {
        &self.data
    }

    pub fn padded_mut_slice(&mut self) -> &mut [Complex] {
        &mut self.data
    }
}
