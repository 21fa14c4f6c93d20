// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input-packet wire header: UDP multicast, `{version, src, chan, seq,
//! absTime, flags, polCode, freq, len}` followed by `len` complex-int16 samples.

use seti_core::packet::{PolKind, SampleI16, SamplePacket};

use thiserror::Error;

pub const HEADER_LEN: usize = 4 + 4 + 4 + 4 + 8 + 4 + 4 + 8 + 4;
const SAMPLE_LEN: usize = 4; // i16 re + i16 im

/// The `DATA_VALID` flag bit within the packet header's `flags` field.
pub const FLAG_DATA_VALID: u32 = 1 << 0;

#[derive(Debug, Error)]
pub enum PacketCodecError {
    #[error("packet header truncated: need {need} bytes, have {have}")]
    HeaderTruncated { need: usize, have: usize },
    #[error("packet payload truncated: need {need} bytes, have {have}")]
    PayloadTruncated { need: usize, have: usize },
    #[error("unrecognized polarization code {0}")]
    BadPolCode(u32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    pub version: u32,
    pub source_id: u32,
    pub channel_id: u32,
    pub seq: u32,
    pub abs_time_secs: u32,
    pub abs_time_nanos: u32,
    pub flags: u32,
    pub pol_code: u32,
    pub freq_bits: u64,
    pub len: u32,
}

impl PacketHeader {
    pub fn decode(buf: &[u8]) -> Result<PacketHeader, PacketCodecError> {
        if buf.len() < HEADER_LEN {
            return Err(PacketCodecError::HeaderTruncated { need: HEADER_LEN, have: buf.len() });
        }
        Ok(PacketHeader {
            version: be_u32(&buf[0..4]),
            source_id: be_u32(&buf[4..8]),
            channel_id: be_u32(&buf[8..12]),
            seq: be_u32(&buf[12..16]),
            abs_time_secs: be_u32(&buf[16..20]),
            abs_time_nanos: be_u32(&buf[20..24]),
            flags: be_u32(&buf[24..28]),
            pol_code: be_u32(&buf[28..32]),
            freq_bits: be_u64(&buf[32..40]),
            len: be_u32(&buf[40..44]),
        })
    }

    pub fn is_data_valid(&self) -> bool {
        self.flags & FLAG_DATA_VALID != 0
    }

    pub fn abs_time(&self) -> f64 {
        self.abs_time_secs as f64 + self.abs_time_nanos as f64 * 1e-9
    }

    pub fn pol(&self) -> Result<PolKind, PacketCodecError> {
        match self.pol_code {
            0 => Ok(PolKind::Left),
            1 => Ok(PolKind::Right),
            other => Err(PacketCodecError::BadPolCode(other)),
        }
    }
}

/// Encode a [`SamplePacket`] to its wire form (header + payload), the inverse of
/// [`decode_packet`]. Used by test fixtures and by a capture-file writer standing in for
/// the transport this core does not implement; `version` and `freq_bits` are not tracked
/// on `SamplePacket` so callers supply them directly.
pub fn encode_packet(pkt: &SamplePacket, version: u32, freq_bits: u64) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_LEN + pkt.samples.len() * SAMPLE_LEN];
    buf[0..4].copy_from_slice(&version.to_be_bytes());
    buf[4..8].copy_from_slice(&pkt.source_id.to_be_bytes());
    buf[8..12].copy_from_slice(&pkt.channel_id.to_be_bytes());
    buf[12..16].copy_from_slice(&pkt.seq.to_be_bytes());
    buf[16..20].copy_from_slice(&(pkt.abs_time as u32).to_be_bytes());
    let nanos = ((pkt.abs_time.fract()) * 1e9).round() as u32;
    buf[20..24].copy_from_slice(&nanos.to_be_bytes());
    let flags = if pkt.valid { FLAG_DATA_VALID } else { 0 };
    buf[24..28].copy_from_slice(&flags.to_be_bytes());
    let pol_code: u32 = match pkt.pol {
        PolKind::Left => 0,
        PolKind::Right => 1,
        PolKind::Both | PolKind::Mixed => 0,
    };
    buf[28..32].copy_from_slice(&pol_code.to_be_bytes());
    buf[32..40].copy_from_slice(&freq_bits.to_be_bytes());
    buf[40..44].copy_from_slice(&(pkt.samples.len() as u32).to_be_bytes());
    for (i, s) in pkt.samples.iter().enumerate() {
        let off = HEADER_LEN + i * SAMPLE_LEN;
        buf[off..off + 2].copy_from_slice(&s.re.to_be_bytes());
        buf[off + 2..off + 4].copy_from_slice(&s.im.to_be_bytes());
    }
    buf
}

/// Decode a full packet (header + payload) into a [`SamplePacket`]. Validation of
/// source/channel/pol/valid-flag against an activity's expectations is the assembler's
/// job; this function only performs wire-level decoding.
pub fn decode_packet(buf: &[u8]) -> Result<SamplePacket, PacketCodecError> {
    let header = PacketHeader::decode(buf)?;
    let payload = &buf[HEADER_LEN..];
    let need = header.len as usize * SAMPLE_LEN;
    if payload.len() < need {
        return Err(PacketCodecError::PayloadTruncated { need, have: payload.len() });
    }
    let mut samples = Vec::with_capacity(header.len as usize);
    for chunk in payload[..need].chunks_exact(SAMPLE_LEN) {
        let re = i16::from_be_bytes([chunk[0], chunk[1]]);
        let im = i16::from_be_bytes([chunk[2], chunk[3]]);
        samples.push(SampleI16 { re, im });
    }
    Ok(SamplePacket {
        seq: header.seq,
        abs_time: header.abs_time(),
        pol: header.pol()?,
        source_id: header.source_id,
        channel_id: header.channel_id,
        valid: header.is_data_valid(),
        samples,
    })
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u64(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet_bytes(seq: u32, len: u32, valid: bool) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN + len as usize * SAMPLE_LEN];
        buf[0..4].copy_from_slice(&1u32.to_be_bytes()); // version
        buf[4..8].copy_from_slice(&1u32.to_be_bytes()); // source
        buf[8..12].copy_from_slice(&1u32.to_be_bytes()); // channel
        buf[12..16].copy_from_slice(&seq.to_be_bytes());
        buf[24..28].copy_from_slice(&(if valid { FLAG_DATA_VALID } else { 0 }).to_be_bytes());
        buf[28..32].copy_from_slice(&0u32.to_be_bytes()); // pol = left
        buf[40..44].copy_from_slice(&len.to_be_bytes());
        for i in 0..len as usize {
            let off = HEADER_LEN + i * SAMPLE_LEN;
            buf[off..off + 2].copy_from_slice(&(i as i16).to_be_bytes());
            buf[off + 2..off + 4].copy_from_slice(&(-(i as i16)).to_be_bytes());
        }
        buf
    }

    #[test]
    fn decodes_header_and_payload() {
        let buf = sample_packet_bytes(42, 4, true);
        let pkt = decode_packet(&buf).unwrap();
        assert_eq!(pkt.seq, 42);
        assert!(pkt.valid);
        assert_eq!(pkt.samples.len(), 4);
        assert_eq!(pkt.samples[2].re, 2);
        assert_eq!(pkt.samples[2].im, -2);
    }

    #[test]
    fn invalid_flag_is_decoded_not_rejected() {
        let buf = sample_packet_bytes(1, 1, false);
        let pkt = decode_packet(&buf).unwrap();
        assert!(!pkt.valid);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut buf = sample_packet_bytes(1, 4, true);
        buf.truncate(HEADER_LEN + 2);
        assert!(matches!(decode_packet(&buf), Err(PacketCodecError::PayloadTruncated { .. })));
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let pkt = SamplePacket {
            seq: 7,
            abs_time: 12.5,
            pol: PolKind::Right,
            source_id: 3,
            channel_id: 1,
            valid: true,
            samples: vec![SampleI16 { re: 100, im: -100 }, SampleI16 { re: -7, im: 7 }],
        };
        let buf = encode_packet(&pkt, 1, 0xABCD);
        let decoded = decode_packet(&buf).unwrap();
        assert_eq!(decoded.seq, pkt.seq);
        assert_eq!(decoded.pol, PolKind::Right);
        assert_eq!(decoded.source_id, pkt.source_id);
        assert_eq!(decoded.channel_id, pkt.channel_id);
        assert!(decoded.valid);
        assert_eq!(decoded.samples, pkt.samples);
    }
}
