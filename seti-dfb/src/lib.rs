// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `seti-dfb` implements the polyphase weighted-overlap-add digital filter bank: the
//! wideband-to-narrowband front end every other detection crate builds on.

pub mod coeff;
pub mod wola;

pub use wola::Dfb;
