// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type shared by every detection-engine crate.
//!
//! Configuration errors and stream desynchronization are
//! always fatal to the activity; data errors and detection anomalies are counted/logged and do
//! not themselves stop the pipeline (callers decide whether to surface them further).

use std::fmt;
use std::result;

/// Reasons a packet/half-frame stream failed to stay synchronized. Kept distinct from
/// [`SetiError`] variants because callers often want to match on the *kind* without boxing.
#[derive(Debug)]
pub enum SyncErrorKind {
    /// The L/R packet queues diverged by more than `MAX_PACKET_ERROR`.
    PacketStreamsUnsynchronized,
    /// Half-frames arrived for a channel out of order.
    HalfFrameOutOfOrder { expected: u64, got: u64 },
}

impl SyncErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            SyncErrorKind::PacketStreamsUnsynchronized => {
                "L/R packet queues diverged past the hard limit"
            }
            SyncErrorKind::HalfFrameOutOfOrder { .. } => {
                "half-frame arrived out of sequence for its channel"
            }
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncErrorKind::HalfFrameOutOfOrder { expected, got } => {
                write!(f, "{} (expected {}, got {})", self.as_str(), expected, got)
            }
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

/// `SetiError` enumerates all errors reported by the detection engine.
#[derive(Debug)]
pub enum SetiError {
    /// A filter, resolution, or activity parameter is invalid. Fails the activity definition
    /// before any data is collected; never log-and-continue.
    Configuration(&'static str),
    /// A control-channel transport error that is not one of the silently-retried kinds
    /// (`EAGAIN`/`EINTR`/`ENOTCONN`/`ECONNRESET`).
    Transport(std::io::Error),
    /// The L/R packet streams could not be kept in sync.
    StreamDesynchronized(SyncErrorKind),
    /// A sample ring buffer could not be flushed in time to accept new data. Fatal: the engine
    /// must never silently drop samples from the middle of an activity.
    BufferOverflow(&'static str),
    /// A non-fatal anomaly (all subchannels masked, too many candidates, a bad band, an
    /// over-threshold pulse count) that is logged as a warning and recorded with a reason code.
    DetectionAnomaly(&'static str),
    /// A control message arrived while the activity was in the wrong state.
    StateViolation(&'static str),
    /// Any other error surfaced by a leaf component.
    Other(&'static str),
}

impl fmt::Display for SetiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetiError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            SetiError::Transport(err) => write!(f, "transport error: {}", err),
            SetiError::StreamDesynchronized(kind) => {
                write!(f, "stream desynchronized: {}", kind)
            }
            SetiError::BufferOverflow(msg) => write!(f, "buffer overflow: {}", msg),
            SetiError::DetectionAnomaly(msg) => write!(f, "detection anomaly: {}", msg),
            SetiError::StateViolation(msg) => write!(f, "state violation: {}", msg),
            SetiError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for SetiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SetiError {
    fn from(err: std::io::Error) -> SetiError {
        SetiError::Transport(err)
    }
}

pub type Result<T> = result::Result<T, SetiError>;

/// Convenience function to create a configuration error.
pub fn config_error<T>(desc: &'static str) -> Result<T> {
    Err(SetiError::Configuration(desc))
}

/// Convenience function to create a stream-desynchronization error.
pub fn desync_error<T>(kind: SyncErrorKind) -> Result<T> {
    Err(SetiError::StreamDesynchronized(kind))
}

/// Convenience function to create a buffer-overflow error.
pub fn overflow_error<T>(desc: &'static str) -> Result<T> {
    Err(SetiError::BufferOverflow(desc))
}

/// Convenience function to create a state-violation error.
pub fn state_error<T>(desc: &'static str) -> Result<T> {
    Err(SetiError::StateViolation(desc))
}
