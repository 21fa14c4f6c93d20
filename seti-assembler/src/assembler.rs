// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The packet assembler: validates incoming packets, pairs them by
//! sequence number across polarizations, substitutes zero-filled packets for gaps, and
//! appends synchronized sample pairs to the two [`InputBuffer`]s.

use std::collections::VecDeque;

use seti_core::errors::{desync_error, SyncErrorKind};
use seti_core::packet::{PolKind, SamplePacket};
use seti_core::Result;

use crate::ring::InputBuffer;

/// L/R packet-queue length imbalance that aborts the activity.
pub const MAX_PACKET_ERROR: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Pending,
    Running,
    Aborted,
    Stopping,
}

/// Packet-handling counters, reported at data-collection end.
#[derive(Clone, Copy, Debug, Default)]
pub struct PacketCounters {
    pub processed: u64,
    pub missed: u64,
    pub late: u64,
    pub wrong: u64,
}

impl PacketCounters {
    pub fn total(&self) -> u64 {
        self.processed + self.missed + self.late + self.wrong
    }
}

/// Assembles an ordered, gap-free dual-polarization sample stream from packets that may
/// arrive out of order, late, or not at all.
pub struct PacketAssembler {
    source_id: u32,
    channel_id: u32,
    start_time: f64,
    packet_len: usize,
    single_pol_clone: bool,

    pub state: ChannelState,
    start_seq: Option<u32>,
    cur_seq: u32,

    l_queue: VecDeque<SamplePacket>,
    r_queue: VecDeque<SamplePacket>,

    pub left: InputBuffer,
    pub right: InputBuffer,

    pub counters: PacketCounters,
}

impl PacketAssembler {
    pub fn new(
        source_id: u32,
        channel_id: u32,
        start_time: f64,
        packet_len: usize,
        single_pol_clone: bool,
        ring_capacity: usize,
    ) -> Self {
        PacketAssembler {
            source_id,
            channel_id,
            start_time,
            packet_len,
            single_pol_clone,
            state: ChannelState::Pending,
            start_seq: None,
            cur_seq: 0,
            l_queue: VecDeque::new(),
            r_queue: VecDeque::new(),
            left: InputBuffer::new(ring_capacity),
            right: InputBuffer::new(ring_capacity),
            counters: PacketCounters::default(),
        }
    }

    /// Handle one incoming packet: validate, route, then drain any complete pairs.
    pub fn on_packet(&mut self, pkt: SamplePacket) -> Result<()> {
        if self.state == ChannelState::Aborted {
            self.counters.wrong += 1;
            return Ok(());
        }

        if pkt.source_id != self.source_id || pkt.channel_id != self.channel_id || !pkt.valid {
            self.counters.wrong += 1;
            return Ok(());
        }

        if self.state == ChannelState::Pending {
            if pkt.abs_time < self.start_time {
                // Packets before the scheduled start are dropped, not counted as
                // errors.
                return Ok(());
            }
            self.start_seq = Some(pkt.seq);
            self.cur_seq = pkt.seq;
            self.state = ChannelState::Running;
        }

        if pkt.seq < self.cur_seq {
            self.counters.late += 1;
            return Ok(());
        }

        match pkt.pol {
            PolKind::Left => self.l_queue.push_back(pkt),
            PolKind::Right => self.r_queue.push_back(pkt),
            _ => {
                self.counters.wrong += 1;
                return Ok(());
            }
        }

        if self.l_queue.len().abs_diff(self.r_queue.len()) >= MAX_PACKET_ERROR {
            self.state = ChannelState::Aborted;
            return desync_error(SyncErrorKind::PacketStreamsUnsynchronized);
        }

        self.drain_pairs()
    }

    /// Pair-assembly loop: runs while both queues are
    /// non-empty, synthesizing zero packets for whichever side lags.
    fn drain_pairs(&mut self) -> Result<()> {
        while !self.l_queue.is_empty() && !self.r_queue.is_empty() {
            let l_seq = self.l_queue.front().unwrap().seq;
            let r_seq = self.r_queue.front().unwrap().seq;

            if l_seq == self.cur_seq && r_seq == self.cur_seq {
                let l = self.l_queue.pop_front().unwrap();
                let r = self.r_queue.pop_front().unwrap();
                self.append_pair(l, r)?;
            }
            else if l_seq == r_seq {
                // Both share a sequence greater than cur_seq: both lag by one missing
                // packet at cur_seq.
                self.l_queue.pop_front();
                self.r_queue.pop_front();
                let l = SamplePacket::zero(self.cur_seq, PolKind::Left, self.source_id, self.channel_id, self.packet_len);
                let r = SamplePacket::zero(self.cur_seq, PolKind::Right, self.source_id, self.channel_id, self.packet_len);
                self.counters.missed += 2;
                self.append_pair(l, r)?;
            }
            else if l_seq == self.cur_seq {
                let l = self.l_queue.pop_front().unwrap();
                let r = SamplePacket::zero(self.cur_seq, PolKind::Right, self.source_id, self.channel_id, self.packet_len);
                self.counters.missed += 1;
                self.append_pair(l, r)?;
            }
            else if r_seq == self.cur_seq {
                let r = self.r_queue.pop_front().unwrap();
                let l = SamplePacket::zero(self.cur_seq, PolKind::Left, self.source_id, self.channel_id, self.packet_len);
                self.counters.missed += 1;
                self.append_pair(l, r)?;
            }
            else {
                // Neither head matches cur_seq (both are ahead, possibly by different
                // amounts): advance cur_seq with zero packets on both sides until one
                // catches up.
                let l = SamplePacket::zero(self.cur_seq, PolKind::Left, self.source_id, self.channel_id, self.packet_len);
                let r = SamplePacket::zero(self.cur_seq, PolKind::Right, self.source_id, self.channel_id, self.packet_len);
                self.counters.missed += 2;
                self.append_pair(l, r)?;
            }
        }
        Ok(())
    }

    fn append_pair(&mut self, l: SamplePacket, r: SamplePacket) -> Result<()> {
        let l_complex: Vec<_> = l.samples.iter().map(|s| s.to_complex()).collect();
        let r_complex: Vec<_> = r.samples.iter().map(|s| s.to_complex()).collect();

        if self.single_pol_clone {
            // Single-polarization activities clone the received polarization into the
            // inactive one.
            self.left.append(&l_complex)?;
            self.right.append(&l_complex)?;
        }
        else {
            self.left.append(&l_complex)?;
            self.right.append(&r_complex)?;
        }

        self.counters.processed += 1;
        self.cur_seq += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seti_core::packet::SampleI16;

    fn packet(seq: u32, pol: PolKind, len: usize) -> SamplePacket {
        SamplePacket {
            seq,
            abs_time: 10.0,
            pol,
            source_id: 1,
            channel_id: 1,
            valid: true,
            samples: vec![SampleI16 { re: 1, im: 1 }; len],
        }
    }

    #[test]
    fn pairs_matching_sequence_numbers() {
        let mut asm = PacketAssembler::new(1, 1, 0.0, 4, false, 64);
        asm.on_packet(packet(0, PolKind::Left, 4)).unwrap();
        asm.on_packet(packet(0, PolKind::Right, 4)).unwrap();
        assert_eq!(asm.counters.processed, 1);
        assert_eq!(asm.counters.missed, 0);
    }

    #[test]
    fn dropped_pair_substitutes_zero_packets() {
        // Drop one packet from each pol for the same seq.
        let mut asm = PacketAssembler::new(1, 1, 0.0, 4, false, 64);
        asm.on_packet(packet(0, PolKind::Left, 4)).unwrap();
        asm.on_packet(packet(0, PolKind::Right, 4)).unwrap();
        asm.on_packet(packet(2, PolKind::Left, 4)).unwrap();
        asm.on_packet(packet(2, PolKind::Right, 4)).unwrap();
        assert_eq!(asm.counters.processed, 2);
        assert_eq!(asm.counters.missed, 2);
    }

    #[test]
    fn packets_before_start_time_are_dropped() {
        let mut asm = PacketAssembler::new(1, 1, 100.0, 4, false, 64);
        let mut pkt = packet(0, PolKind::Left, 4);
        pkt.abs_time = 1.0;
        asm.on_packet(pkt).unwrap();
        assert_eq!(asm.state, ChannelState::Pending);
    }

    #[test]
    fn desync_aborts_the_activity() {
        let mut asm = PacketAssembler::new(1, 1, 0.0, 4, false, 1 << 20);
        for seq in 0..MAX_PACKET_ERROR as u32 {
            let result = asm.on_packet(packet(seq, PolKind::Left, 4));
            if seq as usize + 1 >= MAX_PACKET_ERROR {
                assert!(result.is_err());
            }
        }
        assert_eq!(asm.state, ChannelState::Aborted);
    }

    #[test]
    fn wrong_source_packets_are_counted_and_dropped() {
        let mut asm = PacketAssembler::new(1, 1, 0.0, 4, false, 64);
        let mut pkt = packet(0, PolKind::Left, 4);
        pkt.source_id = 99;
        asm.on_packet(pkt).unwrap();
        assert_eq!(asm.counters.wrong, 1);
        assert_eq!(asm.state, ChannelState::Pending);
    }
}
