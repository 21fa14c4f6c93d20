// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Super-clustering: merge every child clusterer's stream (one CW
//! clusterer per polarization, one pulse clusterer per requested resolution) in frequency
//! order, absorbing a child into the running super-cluster while its frequency stays below
//! the cluster's high bound, emitting and starting a new one otherwise.

use seti_core::packet::PolKind;
use seti_core::signal::SignalDescription;

/// One super-cluster: every child [`SignalDescription`] absorbed into it, its strongest
/// member, and the frequency extent used to test the next candidate for absorption.
#[derive(Clone, Debug)]
pub struct SuperCluster {
    pub id: u64,
    pub pol: PolKind,
    pub is_cw: bool,
    pub low_hz: f64,
    pub hi_bound_hz: f64,
    /// The gap (`superClusterGap`) folded into `hi_bound_hz`; subtracting it back out
    /// gives the true high edge of the cluster's own absorbed members.
    pub gap_hz: f64,
    pub strongest: SignalDescription,
    pub children: Vec<SignalDescription>,
}

impl SuperCluster {
    /// The frequency span actually covered by absorbed members, i.e. `hi_bound_hz` with
    /// the trailing `gap_hz` margin removed.
    pub fn member_span(&self) -> (f64, f64) {
        (self.low_hz, self.hi_bound_hz - self.gap_hz)
    }
}

/// Merge `streams` (each already sorted ascending by [`SignalDescription::freq`]) into
/// super-clusters. `gap_hz` is `superClusterGap`: a child is absorbed if its frequency lies
/// below the current cluster's high bound; absorbing extends that bound by `gap_hz`.
///
/// Cluster ids are assigned in emission order starting at 1, so running this twice over
/// the same input streams produces byte-identical output.
pub fn build_super_clusters(streams: Vec<Vec<SignalDescription>>, gap_hz: f64) -> Vec<SuperCluster> {
    let mut cursors = vec![0usize; streams.len()];
    let mut out = Vec::new();
    let mut current: Option<SuperCluster> = None;
    let mut next_id = 0u64;

    loop {
        let mut next: Option<(usize, f64)> = None;
        for (i, stream) in streams.iter().enumerate() {
            if cursors[i] < stream.len() {
                let freq = stream[cursors[i]].freq.0;
                let better = match next {
                    Some((_, best)) => freq < best,
                    None => true,
                };
                if better {
                    next = Some((i, freq));
                }
            }
        }
        let Some((stream_idx, freq)) = next else { break };
        let desc = streams[stream_idx][cursors[stream_idx]].clone();
        cursors[stream_idx] += 1;

        let absorbs = matches!(&current, Some(sc) if freq < sc.hi_bound_hz);
        if absorbs {
            let sc = current.as_mut().unwrap();
            sc.hi_bound_hz += gap_hz;
            sc.is_cw |= desc.kind.is_cw();
            if desc.power > sc.strongest.power {
                sc.strongest = desc.clone();
            }
            sc.children.push(desc);
        } else {
            if let Some(finished) = current.take() {
                out.push(finished);
            }
            next_id += 1;
            current = Some(SuperCluster {
                id: next_id,
                pol: desc.pol,
                is_cw: desc.kind.is_cw(),
                low_hz: freq,
                hi_bound_hz: freq + gap_hz,
                gap_hz,
                strongest: desc.clone(),
                children: vec![desc],
            });
        }
    }
    if let Some(finished) = current.take() {
        out.push(finished);
    }

    for sc in out.iter_mut() {
        sc.pol = combine_pol(&sc.children);
    }
    out
}

/// Derive a super-cluster's overall polarization from its absorbed children: `Both` if
/// any child already reports `Both`, or if the cluster contains both a
/// left- and a right-tagged child where at least one is CW-typed ("any CW absorbs
/// pulses"); `Mixed` if two non-CW (pulse) children differ in polarization; otherwise the
/// single common polarization.
fn combine_pol(children: &[SignalDescription]) -> PolKind {
    let mut has_left = false;
    let mut has_right = false;
    let mut has_both = false;
    let mut has_cw = false;
    for c in children {
        match c.pol {
            PolKind::Left => has_left = true,
            PolKind::Right => has_right = true,
            PolKind::Both => has_both = true,
            PolKind::Mixed => {
                has_left = true;
                has_right = true;
            }
        }
        has_cw |= c.kind.is_cw();
    }

    if has_both {
        PolKind::Both
    } else if has_left && has_right {
        if has_cw {
            PolKind::Both
        } else {
            PolKind::Mixed
        }
    } else if has_left {
        PolKind::Left
    } else if has_right {
        PolKind::Right
    } else {
        PolKind::Both
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seti_core::units::{DriftRate, Hz};
    use seti_core::signal::SignalKind;

    fn desc(freq: f64, power: f32, pol: PolKind, kind: SignalKind) -> SignalDescription {
        SignalDescription { freq: Hz(freq), drift: DriftRate(0.0), width: Hz(1.0), power, pol, kind }
    }

    fn cw(freq: f64, power: f32, pol: PolKind) -> SignalDescription {
        desc(freq, power, pol, SignalKind::CwPower { drift: DriftRate(0.0), width: Hz(1.0) })
    }

    fn pulse(freq: f64, power: f32, pol: PolKind) -> SignalDescription {
        desc(freq, power, pol, SignalKind::PulseTrain { period_s: 1.0, pulse_count: 3 })
    }

    #[test]
    fn merges_streams_in_frequency_order_and_splits_past_the_gap() {
        let left_cw = vec![cw(100.0, 5.0, PolKind::Left), cw(1000.0, 5.0, PolKind::Left)];
        let right_cw = vec![cw(102.0, 8.0, PolKind::Right)];
        let clusters = build_super_clusters(vec![left_cw, right_cw], 5.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].children.len(), 2);
        assert_eq!(clusters[0].strongest.power, 8.0);
        assert!(clusters[0].is_cw);
        assert_eq!(clusters[1].children.len(), 1);
    }

    #[test]
    fn cw_absorbing_pulse_across_pols_is_pol_both() {
        let cw_stream = vec![cw(100.0, 5.0, PolKind::Left)];
        let pulse_stream = vec![pulse(101.0, 3.0, PolKind::Right)];
        let clusters = build_super_clusters(vec![cw_stream, pulse_stream], 5.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].pol, PolKind::Both);
    }

    #[test]
    fn two_pulse_pols_without_cw_is_mixed() {
        let left = vec![pulse(100.0, 5.0, PolKind::Left)];
        let right = vec![pulse(101.0, 3.0, PolKind::Right)];
        let clusters = build_super_clusters(vec![left, right], 5.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].pol, PolKind::Mixed);
    }

    #[test]
    fn idempotent_over_same_input() {
        let streams = vec![
            vec![cw(100.0, 5.0, PolKind::Left), cw(1000.0, 1.0, PolKind::Left)],
            vec![pulse(101.0, 2.0, PolKind::Right)],
        ];
        let a = build_super_clusters(streams.clone(), 5.0);
        let b = build_super_clusters(streams, 5.0);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.low_hz, y.low_hz);
            assert_eq!(x.hi_bound_hz, y.hi_bound_hz);
            assert_eq!(x.children.len(), y.children.len());
        }
    }
}
