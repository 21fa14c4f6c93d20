// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `units` module provides small newtype wrappers for the handful of physical quantities
//! that flow across crate boundaries (frequency, drift rate, time), so that a bin index and a
//! frequency-in-Hz can never be silently swapped at a call site.

use std::fmt;
use std::ops::{Add, Sub};

/// A frequency, in Hz, relative to some channel's tuned center (can be negative).
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Hz(pub f64);

impl Hz {
    pub fn mhz(self) -> f64 {
        self.0 / 1.0e6
    }
}

impl Add for Hz {
    type Output = Hz;
    fn add(self, rhs: Hz) -> Hz {
        Hz(self.0 + rhs.0)
    }
}

impl Sub for Hz {
    type Output = Hz;
    fn sub(self, rhs: Hz) -> Hz {
        Hz(self.0 - rhs.0)
    }
}

impl fmt::Display for Hz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} Hz", self.0)
    }
}

/// A drift rate, in Hz/s. Positive is increasing frequency over time.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct DriftRate(pub f64);

impl fmt::Display for DriftRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} Hz/s", self.0)
    }
}

/// A duration in fractional seconds. One tick of [`Seconds`] is always one second; activities
/// use it for spectrum time, observation duration, and half-frame period.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Seconds(pub f64);

impl Add for Seconds {
    type Output = Seconds;
    fn add(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 + rhs.0)
    }
}

/// Convert a (start-bin, drift-in-bins) DADD path into a frequency span, given the bin width and
/// total observation duration. `drift_bins` is the total drift accumulated over `spectra`
/// spectra; the corresponding drift rate is `drift_bins * bin_width_hz / duration_s`.
pub fn drift_bins_to_rate(drift_bins: f64, bin_width_hz: f64, duration: Seconds) -> DriftRate {
    if duration.0 <= 0.0 {
        return DriftRate(0.0);
    }
    DriftRate(drift_bins * bin_width_hz / duration.0)
}

/// Map a bin index (relative to the usable band) to a frequency offset from the band's low edge.
pub fn bin_to_hz(bin: f64, bin_width_hz: f64) -> Hz {
    Hz(bin * bin_width_hz)
}
