// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single-pass, key-ordered clustering helper shared by the CW clusterer, the pulse
//! train clusterer, and the super-clusterer. All three apply
//! the same rule: absorb the next item into the current cluster if its key lies within a
//! configured gap of the cluster's current high edge, otherwise emit the current cluster
//! and start a new one. Callers must feed items in non-decreasing key order.

/// One emitted cluster: its frequency/bin extent, the strongest member (by the caller's
/// notion of "power"), and every absorbed member in arrival order.
#[derive(Clone, Debug)]
pub struct Cluster<T> {
    pub low: f64,
    pub high: f64,
    pub strongest: T,
    strongest_power: f64,
    pub members: Vec<T>,
}

impl<T> Cluster<T> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Streaming single-pass clusterer. Construct with the absorption gap, `push` each
/// `(key, power, item)` triple in non-decreasing key order, and call `finish` once the
/// input is exhausted to flush the final in-progress cluster.
pub struct ClusterBuilder<T: Clone> {
    gap: f64,
    current: Option<Cluster<T>>,
}

impl<T: Clone> ClusterBuilder<T> {
    pub fn new(gap: f64) -> Self {
        ClusterBuilder { gap, current: None }
    }

    /// Feed the next item. Returns `Some(cluster)` if pushing this item closed out a
    /// previously accumulating cluster (the caller should collect these into its output
    /// list); returns `None` while still accumulating into the current cluster.
    pub fn push(&mut self, key: f64, power: f64, item: T) -> Option<Cluster<T>> {
        match &mut self.current {
            Some(cluster) if key - cluster.high <= self.gap => {
                cluster.high = cluster.high.max(key);
                if power > cluster.strongest_power {
                    cluster.strongest_power = power;
                    cluster.strongest = item.clone();
                }
                cluster.members.push(item);
                None
            }
            _ => {
                let emitted = self.current.take();
                self.current = Some(Cluster {
                    low: key,
                    high: key,
                    strongest: item.clone(),
                    strongest_power: power,
                    members: vec![item],
                });
                emitted
            }
        }
    }

    /// Flush any in-progress cluster. Call once after the last `push`.
    pub fn finish(mut self) -> Option<Cluster<T>> {
        self.current.take()
    }
}

/// Cluster a full, pre-sorted slice of `(key, power, item)` triples in one call. A
/// convenience wrapper over [`ClusterBuilder`] for callers (such as the CW detector) that
/// already have every hit loaded before clustering begins.
pub fn cluster_sorted<T: Clone>(gap: f64, items: &[(f64, f64, T)]) -> Vec<Cluster<T>> {
    let mut builder = ClusterBuilder::new(gap);
    let mut out = Vec::new();
    for (key, power, item) in items {
        if let Some(c) = builder.push(*key, *power, item.clone()) {
            out.push(c);
        }
    }
    if let Some(c) = builder.finish() {
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorbs_within_gap_and_splits_outside() {
        let items = [(0.0, 1.0, "a"), (1.0, 5.0, "b"), (2.0, 1.0, "c"), (10.0, 1.0, "d")];
        let clusters = cluster_sorted(2.0, &items);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members.len(), 3);
        assert_eq!(clusters[0].strongest, "b");
        assert_eq!(clusters[1].members.len(), 1);
        assert_eq!(clusters[1].strongest, "d");
    }

    #[test]
    fn idempotent_over_same_input() {
        let items = [(0.0, 1.0, 1u32), (1.5, 2.0, 2u32), (5.0, 1.0, 3u32)];
        let a = cluster_sorted(1.0, &items);
        let b = cluster_sorted(1.0, &items);
        assert_eq!(a.len(), b.len());
        for (ca, cb) in a.iter().zip(b.iter()) {
            assert_eq!(ca.low, cb.low);
            assert_eq!(ca.high, cb.high);
            assert_eq!(ca.strongest, cb.strongest);
        }
    }
}
