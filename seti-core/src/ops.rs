// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `ops` module is a typed replacement for a raw bitset of operations. Parsing
//! rejects unknown bits rather than silently masking them; callers that want an
//! "ignore unknown bits" policy use [`OperationFlags::from_bits_relaxed`] explicitly and
//! log what they dropped.

use bitflags::bitflags;

bitflags! {
    /// The set of detection-engine behaviors an activity has requested. Mirrors the
    /// `operations` bitset of `ActivityParameters`.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct OperationFlags: u32 {
        const BASELINING               = 1 << 0;
        const POWER_CWD                = 1 << 1;
        const COHERENT_CWD             = 1 << 2;
        const PULSE_DETECTION          = 1 << 3;
        const CANDIDATE_SELECTION      = 1 << 4;
        const APPLY_RECENT_RFI_MASK    = 1 << 5;
        const APPLY_TEST_SIGNAL_MASK   = 1 << 6;
        const REJECT_ZERO_DRIFT_SIGNALS = 1 << 7;
        const FOLLOW_UP_CANDIDATES     = 1 << 8;
        const PROCESS_SECONDARY_CANDIDATES = 1 << 9;
    }
}

impl OperationFlags {
    /// Parse a raw wire value, rejecting any bit outside the known set. This is the
    /// strict counterpart used when the caller wants to fail activity configuration on an
    /// operations value from an unknown protocol revision.
    pub fn from_bits_strict(raw: u32) -> Option<OperationFlags> {
        OperationFlags::from_bits(raw)
    }

    /// Parse a raw wire value, masking off unknown bits and returning how many were
    /// dropped. Operations this core does not understand are ignored rather than
    /// rejected; callers should `log::warn!` the returned count.
    pub fn from_bits_relaxed(raw: u32) -> (OperationFlags, u32) {
        let known = OperationFlags::from_bits_truncate(raw);
        let dropped = (raw & !OperationFlags::all().bits()).count_ones();
        (known, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_rejects_unknown_bits() {
        assert!(OperationFlags::from_bits_strict(OperationFlags::BASELINING.bits()).is_some());
        assert!(OperationFlags::from_bits_strict(1 << 31).is_none());
    }

    #[test]
    fn relaxed_parse_masks_and_counts() {
        let raw = OperationFlags::PULSE_DETECTION.bits() | (1 << 30) | (1 << 29);
        let (flags, dropped) = OperationFlags::from_bits_relaxed(raw);
        assert_eq!(flags, OperationFlags::PULSE_DETECTION);
        assert_eq!(dropped, 2);
    }
}
