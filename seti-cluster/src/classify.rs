// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Candidate classification: applied to each super-cluster in order —
//! recent-RFI mask, zero-drift rejection, max-drift rejection, test-signal override
//! (which forces `CLASS_CAND` regardless of earlier steps), follow-up matching, and
//! finally the candidate-count cap. Bad-band overlap is computed last and recorded as a
//! flag rather than affecting the class.

use log::warn;

use seti_core::ops::OperationFlags;
use seti_core::params::ActivityParams;
use seti_core::signal::{CandidateSignal, ReasonCode, SignalClass, SignalDescription};
use seti_core::units::Seconds;

use crate::badband::{drift_extended_span, BadBandRegistry};
use crate::masks::FrequencyMask;
use crate::supercluster::SuperCluster;

/// The recent-RFI and test-signal masks classification consults directly.
#[derive(Clone, Debug, Default)]
pub struct Masks {
    pub recent_rfi: FrequencyMask,
    pub test_signal: FrequencyMask,
}

/// A previously reported signal to match new candidates against.
#[derive(Copy, Clone, Debug)]
pub struct FollowUpEntry {
    pub freq_hz: f64,
    pub tolerance_hz: f64,
}

fn follow_up_match(freq_hz: f64, follow_ups: &[FollowUpEntry]) -> bool {
    follow_ups.iter().any(|f| (f.freq_hz - freq_hz).abs() <= f.tolerance_hz)
}

/// The coherent re-detector's verdict for a CW candidate, threaded
/// into classification so `FailedCoherentDetect`/`PassedCoherentDetect` land in the same
/// reason-code slot the other rejection reasons use. `None` for pulse-train candidates,
/// which never go through the archive/coherent stage.
#[derive(Copy, Clone, Debug)]
pub struct CoherentOutcome {
    pub pfa: f64,
    pub snr: f32,
    pub pfa_threshold: f32,
}

/// Classify one super-cluster into a [`CandidateSignal`]. `candidates_so_far`
/// is incremented in place each time this call accepts a `CLASS_CAND`; once it reaches
/// `params.max_number_of_candidates` further accepts are demoted to `CLASS_UNKNOWN` with
/// reason `TooManyCandidates`. `is_primary` gates the recent-RFI mask check (primary mode
/// only). `coherent` carries the archive re-detector's verdict for CW
/// candidates; it is applied before the mask/drift pipeline so a later
/// mask or test-signal override can still take precedence, matching the reason-code list's
/// ordering ("passed coherent detect, failed coherent detect, zero drift, ...").
pub fn classify(
    sc: &SuperCluster,
    params: &ActivityParams,
    masks: &Masks,
    follow_ups: &[FollowUpEntry],
    candidates_so_far: &mut u32,
    bad_bands: &BadBandRegistry,
    observation_duration: Seconds,
    is_primary: bool,
    coherent: Option<CoherentOutcome>,
) -> CandidateSignal {
    let description: SignalDescription = sc.strongest.clone();
    let freq_hz = description.freq.0;
    let ops = params.operations;

    let mut class = SignalClass::Cand;
    let mut reason = ReasonCode::Pending;
    let mut pfa = None;
    let mut snr = None;

    if let Some(outcome) = coherent {
        pfa = Some(outcome.pfa);
        snr = Some(outcome.snr);
        if outcome.pfa > outcome.pfa_threshold as f64 {
            class = SignalClass::Rfi;
            reason = ReasonCode::FailedCoherentDetect;
        } else {
            reason = ReasonCode::PassedCoherentDetect;
        }
    }

    if is_primary && ops.contains(OperationFlags::APPLY_RECENT_RFI_MASK) && masks.recent_rfi.contains(freq_hz) {
        class = SignalClass::Rfi;
        reason = ReasonCode::RecentRfiMask;
    }

    if ops.contains(OperationFlags::REJECT_ZERO_DRIFT_SIGNALS)
        && description.drift.0.abs() <= params.zero_drift_tolerance_hz_per_s
    {
        class = SignalClass::Rfi;
        reason = ReasonCode::ZeroDrift;
    }

    if description.drift.0.abs() > params.max_drift_rate_tolerance_hz_per_s {
        class = SignalClass::Rfi;
        reason = ReasonCode::DriftTooHigh;
    }

    if ops.contains(OperationFlags::APPLY_TEST_SIGNAL_MASK) && masks.test_signal.contains(freq_hz) {
        // Test-signal override: forces CAND even if an earlier step rejected the signal
        // (test-signal-mask match overrides RFI).
        class = SignalClass::Cand;
        reason = ReasonCode::TestSignalMask;
    }

    if ops.contains(OperationFlags::FOLLOW_UP_CANDIDATES)
        && matches!(class, SignalClass::Cand)
        && follow_up_match(freq_hz, follow_ups)
    {
        reason = ReasonCode::FollowUpMatch;
    }

    if matches!(class, SignalClass::Cand) {
        if *candidates_so_far >= params.max_number_of_candidates {
            class = SignalClass::Unknown;
            reason = ReasonCode::TooManyCandidates;
            warn!("candidate cap ({}) reached; demoting signal at {:.3} Hz", params.max_number_of_candidates, freq_hz);
        } else {
            *candidates_so_far += 1;
        }
    }

    let (low, high) = sc.member_span();
    let (span_low, span_high) =
        drift_extended_span(low, high, description.drift.0, observation_duration.0);
    let contains_bad_bands = bad_bands.overlaps(span_low, span_high, description.pol);

    CandidateSignal {
        super_cluster_id: sc.id,
        description,
        class,
        reason,
        pfa,
        snr,
        contains_bad_bands,
        pulses: Vec::new(),
    }
}
