// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `seti-assembler` implements packet validation and sequence-number
//! pairing, the per-polarization ring buffers packets flow into, and the pooled half-frame
//! buffers the DFB's corner-turned output lands in.

pub mod assembler;
pub mod halfframe;
pub mod ring;

pub use assembler::{ChannelState, PacketAssembler, PacketCounters, MAX_PACKET_ERROR};
pub use halfframe::{HalfFrameBuffer, HalfFramePool, PolBlock};
pub use ring::InputBuffer;
