// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-polarization circular sample buffer. Tracks
//! `done <= next <= read <= write` cursors as absolute (never-wrapping) sample counts;
//! physical storage indices are those counts modulo capacity. A pending-iteration map
//! records DFB windows that have been handed out but not yet marked complete, so the
//! buffer never overwrites samples an in-flight DFB iteration still needs.

use hashbrown::HashMap;

use seti_core::dsp::complex::Complex;
use seti_core::errors::{overflow_error, Result};

/// A single polarization's ring buffer of baseband samples awaiting the DFB.
pub struct InputBuffer {
    capacity: usize,
    storage: Vec<Complex>,
    /// Total samples ever written.
    write: u64,
    /// Absolute index of the next sample the assembler will hand to a DFB iteration.
    next: u64,
    /// Absolute index up through which some in-flight DFB iteration has already read
    /// (the high-water mark of outstanding reads).
    read: u64,
    /// Absolute index below which no outstanding iteration still needs the data; safe to
    /// overwrite.
    done: u64,
    /// In-flight DFB windows, keyed by their starting absolute sample index, recording how
    /// far past `start` they read. Removed when the iteration completes.
    pending: HashMap<u64, u64>,
}

impl InputBuffer {
    /// `capacity` should be at least `threshold * multiple` so several
    /// DFB windows can be outstanding at once without stalling the assembler.
    pub fn new(capacity: usize) -> Self {
        InputBuffer {
            capacity,
            storage: vec![Complex::default(); capacity],
            write: 0,
            next: 0,
            read: 0,
            done: 0,
        pending: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len_available(&self) -> u64 {
        self.write - self.next
    }

    /// Append `samples` to the buffer, flushing (advancing `done`) as needed to make
    /// room. Returns a fatal [`seti_core::SetiError::BufferOverflow`] if flushing cannot
    /// free enough space — the engine must never silently drop samples mid-activity.
    pub fn append(&mut self, samples: &[Complex]) -> Result<()> {
        if samples.len() > self.capacity {
            return overflow_error("packet longer than the entire ring buffer capacity");
        }
        self.flush();
        let free = self.capacity as u64 - (self.write - self.done);
        if (samples.len() as u64) > free {
            // One more flush attempt in case a pending iteration completed since the
            // last check (lazy flushing).
            self.flush();
            let free = self.capacity as u64 - (self.write - self.done);
            if (samples.len() as u64) > free {
                return overflow_error("ring buffer flush could not free enough space for the incoming packet");
            }
        }
        for &s in samples {
            let idx = (self.write % self.capacity as u64) as usize;
            self.storage[idx] = s;
            self.write += 1;
        }
        Ok(())
    }

    /// Advance `done` past every pending iteration that has completed and whose start is
    /// the current lowest outstanding start (so completion order need not match start
    /// order exactly, but `done` can only advance contiguously).
    fn flush(&mut self) {
        if self.pending.is_empty() {
            self.done = self.read;
            return;
        }
        // done can advance up to the smallest still-pending start index.
        if let Some(&min_start) = self.pending.keys().min() {
            self.done = self.done.max(self.read.min(min_start));
        }
    }

    /// Copy `len` samples starting at absolute index `start` into `out`, handling ring
    /// wraparound. `start + len` must not exceed `write`.
    pub fn copy_window(&self, start: u64, len: usize, out: &mut Vec<Complex>) {
        debug_assert!(start + len as u64 <= self.write);
        out.clear();
        out.reserve(len);
        for i in 0..len as u64 {
            let idx = ((start + i) % self.capacity as u64) as usize;
            out.push(self.storage[idx]);
        }
    }

    /// Register a DFB iteration about to read `[start, start+len)`. Advances the `next`
    /// and `read` high-water marks.
    pub fn begin_iteration(&mut self, start: u64, len: usize) {
        self.pending.insert(start, start + len as u64);
        self.next = start + len as u64;
        self.read = self.read.max(start + len as u64);
    }

    /// Mark the iteration that began at `start` as complete, allowing the buffer to
    /// reclaim its span once it becomes the oldest outstanding one.
    pub fn complete_iteration(&mut self, start: u64) {
        self.pending.remove(&start);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read_round_trips() {
        let mut buf = InputBuffer::new(16);
        let samples: Vec<Complex> = (0..8).map(|i| Complex::new(i as f32, 0.0)).collect();
        buf.append(&samples).unwrap();
        let mut out = Vec::new();
        buf.copy_window(0, 8, &mut out);
        assert_eq!(out, samples);
    }

    #[test]
    fn wraps_around_physical_storage() {
        let mut buf = InputBuffer::new(8);
        let first: Vec<Complex> = (0..8).map(|i| Complex::new(i as f32, 0.0)).collect();
        buf.append(&first).unwrap();
        buf.begin_iteration(0, 4);
        buf.complete_iteration(0);
        let second: Vec<Complex> = (8..12).map(|i| Complex::new(i as f32, 0.0)).collect();
        buf.append(&second).unwrap(); // wraps past physical end
        let mut out = Vec::new();
        buf.copy_window(8, 4, &mut out);
        assert_eq!(out, second);
    }

    #[test]
    fn overflow_when_pending_iteration_blocks_reclaim() {
        let mut buf = InputBuffer::new(8);
        let samples: Vec<Complex> = (0..8).map(|i| Complex::new(i as f32, 0.0)).collect();
        buf.append(&samples).unwrap();
        buf.begin_iteration(0, 8); // still outstanding, nothing reclaimable
        let more = vec![Complex::new(1.0, 0.0); 4];
        assert!(buf.append(&more).is_err());
    }

    #[test]
    fn completing_iteration_frees_space_for_next_append() {
        let mut buf = InputBuffer::new(8);
        let samples: Vec<Complex> = (0..8).map(|i| Complex::new(i as f32, 0.0)).collect();
        buf.append(&samples).unwrap();
        buf.begin_iteration(0, 8);
        buf.complete_iteration(0);
        let more = vec![Complex::new(1.0, 0.0); 4];
        assert!(buf.append(&more).is_ok());
    }
}
