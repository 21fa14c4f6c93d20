// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signal and hit types shared across the detection crates: a [`PulseHit`] crosses from
//! `seti-spectrometer` into `seti-pulsedetect`; [`SignalKind`]/[`CandidateSignal`] cross
//! from `seti-cwdetect`/`seti-pulsedetect` into `seti-cluster` and `seti-archive`. Recast
//! from the source's virtual-dispatch `CwSignal`/`PulseSignal` hierarchy into a single
//! tagged variant per Design Note "Virtual dispatch over signal kinds" — no inheritance,
//! a small set of pattern-matched operations instead.

use crate::packet::PolKind;
use crate::units::{DriftRate, Hz};

/// A single above-threshold pulse emitted by the spectrometer. `bin` is the global bin index across the usable band for its resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PulseHit {
    pub resolution: usize,
    pub bin: u32,
    pub spectrum: u32,
    pub pol: PolKind,
    pub power: f32,
}

/// One DADD output cell that crossed threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CwHit {
    pub start_bin: u32,
    pub drift_bins: i32,
    pub power: f32,
    pub pol: PolKind,
}

impl CwHit {
    /// The key used for frequency-ordered clustering: the bin at the
    /// path's temporal midpoint.
    pub fn mid_bin(&self) -> f64 {
        self.start_bin as f64 + (self.drift_bins as f64 + 0.5) / 2.0
    }
}

/// Final classification of a candidate signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SignalClass {
    Cand,
    Rfi,
    Unknown,
}

/// The reason a signal received its [`SignalClass`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReasonCode {
    PassedCoherentDetect,
    FailedCoherentDetect,
    ZeroDrift,
    DriftTooHigh,
    RecentRfiMask,
    TestSignalMask,
    TooManyCandidates,
    FollowUpMatch,
    Pending,
}

/// A tagged variant replacing the source's `CwSignal`/`PulseSignal` class hierarchy
/// (Design Note "Virtual dispatch over signal kinds"). Every child clusterer that feeds
/// the super-clusterer produces one of these.
#[derive(Clone, Debug)]
pub enum SignalKind {
    CwPower { drift: DriftRate, width: Hz },
    PulseTrain { period_s: f64, pulse_count: u32 },
    CwFollowup { drift: DriftRate },
    PulseFollowup { period_s: f64 },
}

impl SignalKind {
    pub fn is_cw(&self) -> bool {
        matches!(self, SignalKind::CwPower { .. } | SignalKind::CwFollowup { .. })
    }
}

/// Common description shared by every child-clusterer output: a frequency, drift, width,
/// and summed/representative power, plus the polarization that produced it.
#[derive(Clone, Debug)]
pub struct SignalDescription {
    pub freq: Hz,
    pub drift: DriftRate,
    pub width: Hz,
    pub power: f32,
    pub pol: PolKind,
    pub kind: SignalKind,
}

/// A super-cluster survivor carried through classification and archive decision.
#[derive(Clone, Debug)]
pub struct CandidateSignal {
    pub super_cluster_id: u64,
    pub description: SignalDescription,
    pub class: SignalClass,
    pub reason: ReasonCode,
    pub pfa: Option<f64>,
    pub snr: Option<f32>,
    pub contains_bad_bands: bool,
    pub pulses: Vec<PulseHit>,
}
