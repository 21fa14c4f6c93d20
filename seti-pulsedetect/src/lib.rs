// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pulse triplet/train detector: combines per-polarization pulse hits into one map, searches
//! overlapping frequency slices for equally spaced triplets, and clusters accepted triplets
//! into pulse trains with a refit period and false-alarm probability.

pub mod map;
pub mod train;
pub mod triplet;

pub use map::combine;
pub use train::{cluster_triplets, PulseTrain, MAX_TRAIN_PULSES};
pub use triplet::{make_slices, search_slice, Slice, Triplet, TripletParams};
