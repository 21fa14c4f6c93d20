// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The half-frame buffer and its pool. A half-frame buffer is a pair (L, R) of corner-turned,
//! subchannel-major blocks: `{sub 0 sample 0..S-1, sub 1 sample 0..S-1, ...}`. The pool is a
//! semaphore-counted free list: `alloc` blocks until a buffer is free, `free` returns one
//! and wakes a waiter.

use std::sync::{Arc, Condvar, Mutex};

use seti_core::align::AlignedComplexBuffer;

/// One corner-turned half-frame block for a single polarization: `n_sub` subchannels of
/// `samples_per_hf` complex samples each, laid out subchannel-major.
pub struct PolBlock {
    n_sub: usize,
    samples_per_hf: usize,
    data: AlignedComplexBuffer,
}

impl PolBlock {
    pub fn new(n_sub: usize, samples_per_hf: usize) -> Self {
        PolBlock { n_sub, samples_per_hf, data: AlignedComplexBuffer::zeroed(n_sub * samples_per_hf) }
    }

    pub fn subchannel(&self, sub: usize) -> &[seti_core::Complex] {
        let start = sub * self.samples_per_hf;
        &self.data.as_slice()[start..start + self.samples_per_hf]
    }

    pub fn subchannel_mut(&mut self, sub: usize) -> &mut [seti_core::Complex] {
        let start = sub * self.samples_per_hf;
        &mut self.data.as_mut_slice()[start..start + self.samples_per_hf]
    }

    pub fn n_sub(&self) -> usize {
        self.n_sub
    }

    pub fn samples_per_hf(&self) -> usize {
        self.samples_per_hf
    }
}

/// A pair of per-polarization blocks for one half-frame, plus the half-frame index it
/// belongs to (used to enforce strict-order processing).
pub struct HalfFrameBuffer {
    pub hf_index: u64,
    pub left: PolBlock,
    pub right: PolBlock,
}

impl HalfFrameBuffer {
    fn new(n_sub: usize, samples_per_hf: usize) -> Self {
        HalfFrameBuffer { hf_index: 0, left: PolBlock::new(n_sub, samples_per_hf), right: PolBlock::new(n_sub, samples_per_hf) }
    }
}

struct PoolState {
    free: Vec<HalfFrameBuffer>,
}

/// A semaphore-counted free list of [`HalfFrameBuffer`]s. `alloc` blocks
/// the calling thread until a buffer becomes available; `free` returns a buffer to the
/// pool and wakes one waiter.
pub struct HalfFramePool {
    state: Mutex<PoolState>,
    available: Condvar,
}

impl HalfFramePool {
    pub fn new(capacity: usize, n_sub: usize, samples_per_hf: usize) -> Arc<Self> {
        let free = (0..capacity).map(|_| HalfFrameBuffer::new(n_sub, samples_per_hf)).collect();
        Arc::new(HalfFramePool { state: Mutex::new(PoolState { free }), available: Condvar::new() })
    }

    /// Block until a buffer is free, then hand it out tagged with `hf_index`.
    pub fn alloc(&self, hf_index: u64) -> HalfFrameBuffer {
        let mut state = self.state.lock().unwrap();
        while state.free.is_empty() {
            state = self.available.wait(state).unwrap();
        }
        let mut buf = state.free.pop().unwrap();
        buf.hf_index = hf_index;
        buf
    }

    /// Return a buffer to the pool once every resolution that used it has finished.
    pub fn free(&self, buf: HalfFrameBuffer) {
        let mut state = self.state.lock().unwrap();
        state.free.push(buf);
        self.available.notify_one();
    }

    pub fn available_count(&self) -> usize {
        self.state.lock().unwrap().free.len()
    }
}
