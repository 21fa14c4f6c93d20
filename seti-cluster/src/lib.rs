// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Super-clustering and classification: merges every CW and pulse
//! child clusterer's output in frequency order into super-clusters, then classifies each
//! into `CLASS_CAND` / `CLASS_RFI` / `CLASS_UNKNOWN` with a reason code, flagging bad-band
//! overlap last.

pub mod badband;
pub mod classify;
pub mod masks;
pub mod supercluster;

pub use badband::{drift_extended_span, BadBandRecord, BadBandRegistry};
pub use classify::{classify, CoherentOutcome, FollowUpEntry, Masks};
pub use masks::FrequencyMask;
pub use supercluster::{build_super_clusters, SuperCluster};
