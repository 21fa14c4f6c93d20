// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain-data types that describe a sample packet, shared between the wire codec
//! (`seti-proto`) and the packet assembler (`seti-assembler`). Kept here, rather than in
//! `seti-proto`, because the assembler and DFB need to reason about packets without
//! depending on the wire-framing crate.

use crate::dsp::complex::Complex;

/// Which polarization a packet, subchannel sample, or signal belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PolKind {
    Left,
    Right,
    /// Both polarizations agree (used on merged hits/clusters/super-clusters).
    Both,
    /// Two pulse polarizations differ within one super-cluster.
    Mixed,
}

impl PolKind {
    pub fn is_single(self) -> bool {
        matches!(self, PolKind::Left | PolKind::Right)
    }
}

/// A single complex-int16 sample as it appears on the wire, prior to conversion to the
/// `Complex` (f32) type used throughout the DSP chain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleI16 {
    pub re: i16,
    pub im: i16,
}

impl SampleI16 {
    pub fn to_complex(self) -> Complex {
        Complex::new(self.re as f32, self.im as f32)
    }
}

/// One ordered packet of baseband samples for one polarization, after demarshalling from
/// the wire header. `valid` mirrors the `DATA_VALID` flag bit;
/// an assembler rejects packets for which it is false.
#[derive(Clone, Debug)]
pub struct SamplePacket {
    pub seq: u32,
    pub abs_time: f64,
    pub pol: PolKind,
    pub source_id: u32,
    pub channel_id: u32,
    pub valid: bool,
    pub samples: Vec<SampleI16>,
}

impl SamplePacket {
    /// A zero-filled packet used by the assembler to substitute for a dropped or missing
    /// packet at a given sequence number.
    pub fn zero(seq: u32, pol: PolKind, source_id: u32, channel_id: u32, len: usize) -> Self {
        SamplePacket {
            seq,
            abs_time: 0.0,
            pol,
            source_id,
            channel_id,
            valid: true,
            samples: vec![SampleI16::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
