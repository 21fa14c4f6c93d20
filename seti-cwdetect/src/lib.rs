// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drift-and-add (DADD) CW power detection: unpacks the spectrometer's packed CW power
//! grid, searches positive and negative drift slopes independently, accounts for bad bands,
//! and clusters surviving hits into signal descriptions for the super-clusterer.

pub mod badband;
pub mod dadd;
pub mod detector;
pub mod unpack;

pub use badband::BandAccounting;
pub use detector::{cluster_hits, detect_slope};
pub use unpack::Slope;
