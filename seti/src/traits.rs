// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The seams where this repo stops and an external collaborator begins:
//! the transport that delivers packets, the scheduler/GUI that consumes candidates, and
//! the archive storage candidates get written to. The library crates never reference
//! sockets or files directly; everything upstream and downstream of them comes through
//! one of these three traits.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use log::info;

use seti_core::packet::SamplePacket;
use seti_core::signal::CandidateSignal;
use seti_core::Result;

/// Supplies the decoded input packet stream. A real
/// deployment reads this off a UDP multicast socket; this binary reads it from a capture
/// file instead.
pub trait PacketSource {
    /// Returns the next packet, `None` once the source is exhausted, or an error if the
    /// underlying transport failed outright.
    fn next_packet(&mut self) -> Result<Option<SamplePacket>>;
}

/// Receives classified candidates. A real deployment
/// forwards these to the scheduler/GUI over the control channel.
pub trait CandidateSink {
    fn report(&mut self, candidate: &CandidateSignal);
}

/// Receives the raw archive-channel byte stream produced during coherent re-detection.
/// A real deployment writes this to the archive storage system; this is a thin
/// passthrough that doesn't implement that system.
pub trait ArchiveSink {
    fn write_samples(&mut self, bytes: &[u8]);
}

/// Reads [`SamplePacket`]s out of a capture file: back-to-back wire-format packets, each
/// self-delimiting via its header's `len` field, with no additional
/// framing needed.
pub struct FileCaptureSource {
    data: Vec<u8>,
    cursor: usize,
}

impl FileCaptureSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(FileCaptureSource { data, cursor: 0 })
    }
}

impl PacketSource for FileCaptureSource {
    fn next_packet(&mut self) -> Result<Option<SamplePacket>> {
        if self.cursor >= self.data.len() {
            return Ok(None);
        }
        let pkt = seti_proto::packet_header::decode_packet(&self.data[self.cursor..]).map_err(|e| {
            seti_core::errors::SetiError::Other(match e {
                seti_proto::packet_header::PacketCodecError::HeaderTruncated { .. } => "capture file truncated mid-header",
                seti_proto::packet_header::PacketCodecError::PayloadTruncated { .. } => "capture file truncated mid-payload",
                seti_proto::packet_header::PacketCodecError::BadPolCode(_) => "capture file has an invalid polarization code",
            })
        })?;
        self.cursor += seti_proto::packet_header::HEADER_LEN + pkt.samples.len() * 4;
        Ok(Some(pkt))
    }
}

/// Logs every candidate at info level and keeps nothing; used by `--probe-only` and as the
/// default when no richer sink is wired up.
#[derive(Default)]
pub struct StdoutCandidateSink {
    pub reported: u32,
}

impl CandidateSink for StdoutCandidateSink {
    fn report(&mut self, candidate: &CandidateSignal) {
        self.reported += 1;
        info!(
            "candidate #{}: cluster={} class={:?} reason={:?} freq={} drift={} pfa={:?} snr={:?} bad_band={}",
            self.reported,
            candidate.super_cluster_id,
            candidate.class,
            candidate.reason,
            candidate.description.freq,
            candidate.description.drift,
            candidate.pfa,
            candidate.snr,
            candidate.contains_bad_bands,
        );
    }
}

/// Discards archive bytes. The archive storage system itself is an external collaborator;
/// this binary only needs to prove the byte stream is produced, not persist it anywhere
/// durable.
#[derive(Default)]
pub struct NullArchiveSink;

impl ArchiveSink for NullArchiveSink {
    fn write_samples(&mut self, _bytes: &[u8]) {}
}

/// Writes archive-channel samples to a file as back-to-back little-endian `f32` (re, im)
/// pairs, for callers that want to inspect the coherent re-detector's input offline.
pub struct FileArchiveSink {
    writer: BufWriter<File>,
}

impl FileArchiveSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(FileArchiveSink { writer: BufWriter::new(File::create(path)?) })
    }
}

impl ArchiveSink for FileArchiveSink {
    fn write_samples(&mut self, bytes: &[u8]) {
        let _ = self.writer.write_all(bytes);
    }
}
