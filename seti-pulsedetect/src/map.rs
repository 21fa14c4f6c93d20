// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Combined-polarization pulse map: merges left/right hits that
//! land on the same `(resolution, bin, spectrum)` key into a single POL_BOTH hit with
//! summed power.

use hashbrown::HashMap;
use log::error;

use seti_core::packet::PolKind;
use seti_core::signal::PulseHit;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct Key {
    resolution: usize,
    bin: u32,
    spectrum: u32,
}

/// Merge `hits` from both polarizations into one combined map. A duplicate key seen twice
/// under the *same* polarization is a logic error upstream (the spectrometer should emit at
/// most one hit per `(res, bin, spectrum, pol)`); it is logged and the second occurrence is
/// dropped rather than silently summed into a phantom POL_BOTH.
pub fn combine(hits: &[PulseHit]) -> Vec<PulseHit> {
    let mut map: HashMap<Key, PulseHit> = HashMap::new();
    for hit in hits {
        let key = Key { resolution: hit.resolution, bin: hit.bin, spectrum: hit.spectrum };
        match map.get_mut(&key) {
            None => {
                map.insert(key, *hit);
            }
            Some(existing) => {
                if existing.pol == hit.pol {
                    error!(
                        "duplicate pulse hit at resolution={} bin={} spectrum={} pol={:?}",
                        hit.resolution, hit.bin, hit.spectrum, hit.pol
                    );
                    continue;
                }
                existing.power += hit.power;
                existing.pol = PolKind::Both;
            }
        }
    }
    map.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(bin: u32, spectrum: u32, pol: PolKind, power: f32) -> PulseHit {
        PulseHit { resolution: 0, bin, spectrum, pol, power }
    }

    #[test]
    fn opposite_pol_hits_merge_into_pol_both() {
        let hits = vec![hit(10, 0, PolKind::Left, 3.0), hit(10, 0, PolKind::Right, 4.0)];
        let combined = combine(&hits);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].pol, PolKind::Both);
        assert_eq!(combined[0].power, 7.0);
    }

    #[test]
    fn distinct_keys_stay_separate() {
        let hits = vec![hit(10, 0, PolKind::Left, 3.0), hit(11, 0, PolKind::Left, 4.0)];
        let combined = combine(&hits);
        assert_eq!(combined.len(), 2);
    }

    #[test]
    fn same_pol_duplicate_is_dropped_not_summed() {
        let hits = vec![hit(10, 0, PolKind::Left, 3.0), hit(10, 0, PolKind::Left, 4.0)];
        let combined = combine(&hits);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].power, 3.0);
    }
}
