// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `seti-proto` owns every bit-exact wire format on the wire: the length-prefixed
//! control-channel message framing, the UDP input-packet header, the archive output
//! framing, and the plain-text filter-coefficient file format. Kept separate from
//! `seti-core` because it is pure wire format with no detection logic.

pub mod archive;
pub mod coeff_file;
pub mod control;
pub mod packet_header;
