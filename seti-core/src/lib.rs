// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `seti-core` is the shared data model for the SETI channel-detect engine: the error
//! taxonomy, physical-quantity newtypes, the complex DSP primitives (`Complex`, `Fft`),
//! the operations bitset, wire-adjacent plain-data types, and small utilities (aligned
//! sample buffers, an ordered-map clustering helper) used by every downstream crate.

pub mod align;
pub mod cluster;
pub mod dsp;
pub mod errors;
pub mod grids;
pub mod ops;
pub mod packet;
pub mod params;
pub mod signal;
pub mod units;

pub use dsp::complex::Complex;
pub use dsp::fft::Fft;
pub use errors::{Result, SetiError};
