// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Archive output framing: a TCP stream of
//! `{ArchiveDataHeader, Count, ComplexAmplitudeHeader + N_sub x half-frame-of-CD, ...}`
//! ending with a `DONE_SENDING_ARCHIVE_COMPLEX_AMPLITUDES` sentinel. This module frames
//! the stream; `seti-archive` owns the channel-synthesis math the framed data carries.

use seti_core::grids::CdSample;

pub const ARCHIVE_HEADER_LEN: usize = 4 + 4 + 4 + 4;
pub const CA_HEADER_LEN: usize = 4 + 4;
/// Sentinel message code, distinct from the control-channel `MsgCode` space: the archive
/// stream is framed independently since it is a high-volume bulk transfer, not a
/// request/reply control message.
pub const DONE_SENDING_ARCHIVE_COMPLEX_AMPLITUDES: u32 = 0xFFFF_FFFF;

/// Precedes the `count` complex-amplitude blocks for one archive request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArchiveDataHeader {
    pub activity_id: u32,
    pub signal_id: u32,
    pub half_frames: u32,
    pub count: u32,
}

impl ArchiveDataHeader {
    pub fn encode(&self, out: &mut [u8]) {
        debug_assert!(out.len() >= ARCHIVE_HEADER_LEN);
        out[0..4].copy_from_slice(&self.activity_id.to_be_bytes());
        out[4..8].copy_from_slice(&self.signal_id.to_be_bytes());
        out[8..12].copy_from_slice(&self.half_frames.to_be_bytes());
        out[12..16].copy_from_slice(&self.count.to_be_bytes());
    }

    pub fn decode(buf: &[u8]) -> Option<ArchiveDataHeader> {
        if buf.len() < ARCHIVE_HEADER_LEN {
            return None;
        }
        Some(ArchiveDataHeader {
            activity_id: u32::from_be_bytes(buf[0..4].try_into().unwrap()),
            signal_id: u32::from_be_bytes(buf[4..8].try_into().unwrap()),
            half_frames: u32::from_be_bytes(buf[8..12].try_into().unwrap()),
            count: u32::from_be_bytes(buf[12..16].try_into().unwrap()),
        })
    }
}

/// Precedes one subchannel's worth of CD samples for one half-frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComplexAmplitudeHeader {
    pub subchannel: u32,
    pub half_frame: u32,
}

impl ComplexAmplitudeHeader {
    pub fn encode(&self, out: &mut [u8]) {
        debug_assert!(out.len() >= CA_HEADER_LEN);
        out[0..4].copy_from_slice(&self.subchannel.to_be_bytes());
        out[4..8].copy_from_slice(&self.half_frame.to_be_bytes());
    }

    pub fn decode(buf: &[u8]) -> Option<ComplexAmplitudeHeader> {
        if buf.len() < CA_HEADER_LEN {
            return None;
        }
        Some(ComplexAmplitudeHeader {
            subchannel: u32::from_be_bytes(buf[0..4].try_into().unwrap()),
            half_frame: u32::from_be_bytes(buf[4..8].try_into().unwrap()),
        })
    }
}

/// Serialize one half-frame of CD samples as signed-byte pairs, appended after a
/// [`ComplexAmplitudeHeader`].
pub fn encode_cd_half_frame(samples: &[CdSample], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for s in samples {
        out.push(s.re as u8);
        out.push(s.im as u8);
    }
}

pub fn decode_cd_half_frame(buf: &[u8]) -> Vec<CdSample> {
    buf.chunks_exact(2).map(|c| CdSample { re: c[0] as i8, im: c[1] as i8 }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_header_round_trips() {
        let header = ArchiveDataHeader { activity_id: 3, signal_id: 9, half_frames: 128, count: 16 };
        let mut buf = [0u8; ARCHIVE_HEADER_LEN];
        header.encode(&mut buf);
        assert_eq!(ArchiveDataHeader::decode(&buf), Some(header));
    }

    #[test]
    fn cd_half_frame_round_trips() {
        let samples = vec![CdSample { re: 7, im: -7 }, CdSample { re: -3, im: 2 }];
        let mut buf = Vec::new();
        encode_cd_half_frame(&samples, &mut buf);
        let decoded = decode_cd_half_frame(&buf);
        assert_eq!(decoded, samples);
    }
}
