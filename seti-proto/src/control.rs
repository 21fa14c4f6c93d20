// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control-channel message framing: length-prefixed TCP messages with a
//! fixed header followed by a code-specific body. All multi-byte fields are big-endian on
//! the wire; this module only (de)marshals the header and leaves body interpretation to
//! the binary's control-thread glue.

use std::fmt;

use thiserror::Error;

/// Size in bytes of [`ControlHeader`] on the wire.
pub const HEADER_LEN: usize = 4 + 4 + 4 + 4 + 8;

#[derive(Debug, Error)]
pub enum ControlCodecError {
    #[error("control header truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("unrecognized control message code {0}")]
    UnknownCode(u32),
}

/// Every control-message code the core detection engine understands.
/// Codes outside this set are not a framing error: the header still parses, the caller
/// just cannot interpret the body and should log and drop it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum MsgCode {
    RequestIntrinsics = 1,
    ConfigureDx = 2,
    PermRfiMask = 3,
    BirdieMask = 4,
    RcvrBirdieMask = 5,
    RecentRfiMask = 6,
    TestSignalMask = 7,
    SendDxActivityParameters = 8,
    DxTuned = 9,
    StartTime = 10,
    BaselineInitAccumStarted = 11,
    BaselineInitAccumComplete = 12,
    DataCollectionStarted = 13,
    DataCollectionComplete = 14,
    BeginSendingCandidates = 15,
    DoneSendingCandidates = 16,
    BeginSendingSignals = 17,
    DoneSendingSignals = 18,
    BeginSendingBadBands = 19,
    DoneSendingBadBands = 20,
    BeginSendingCwCoherentSignals = 21,
    DoneSendingCwCoherentSignals = 22,
    SendCwPowerSignal = 23,
    SendCwCoherentSignal = 24,
    SendPulseSignal = 25,
    RequestArchiveData = 26,
    DiscardArchiveData = 27,
    DxActivityComplete = 28,
    ShutdownDx = 29,
    RestartDx = 30,
    StopDxActivity = 31,
}

impl MsgCode {
    pub fn from_u32(code: u32) -> Option<MsgCode> {
        use MsgCode::*;
        const ALL: [MsgCode; 31] = [
            RequestIntrinsics,
            ConfigureDx,
            PermRfiMask,
            BirdieMask,
            RcvrBirdieMask,
            RecentRfiMask,
            TestSignalMask,
            SendDxActivityParameters,
            DxTuned,
            StartTime,
            BaselineInitAccumStarted,
            BaselineInitAccumComplete,
            DataCollectionStarted,
            DataCollectionComplete,
            BeginSendingCandidates,
            DoneSendingCandidates,
            BeginSendingSignals,
            DoneSendingSignals,
            BeginSendingBadBands,
            DoneSendingBadBands,
            BeginSendingCwCoherentSignals,
            DoneSendingCwCoherentSignals,
            SendCwPowerSignal,
            SendCwCoherentSignal,
            SendPulseSignal,
            RequestArchiveData,
            DiscardArchiveData,
            DxActivityComplete,
            ShutdownDx,
            RestartDx,
            StopDxActivity,
        ];
        ALL.into_iter().find(|&c| c as u32 == code)
    }
}

impl fmt::Display for MsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The fixed header preceding every control-channel message body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControlHeader {
    pub version: u32,
    pub code: u32,
    pub data_length: u32,
    pub activity_id: u32,
    /// Seconds and nanoseconds since the Unix epoch (wire `timeval`-equivalent).
    pub timestamp_secs: u32,
    pub timestamp_nanos: u32,
}

impl ControlHeader {
    pub fn decode(buf: &[u8]) -> Result<ControlHeader, ControlCodecError> {
        if buf.len() < HEADER_LEN {
            return Err(ControlCodecError::Truncated { need: HEADER_LEN, have: buf.len() });
        }
        let version = be_u32(&buf[0..4]);
        let code = be_u32(&buf[4..8]);
        let data_length = be_u32(&buf[8..12]);
        let activity_id = be_u32(&buf[12..16]);
        let timestamp_secs = be_u32(&buf[16..20]);
        let timestamp_nanos = be_u32(&buf[20..24]);
        Ok(ControlHeader { version, code, data_length, activity_id, timestamp_secs, timestamp_nanos })
    }

    pub fn encode(&self, out: &mut [u8]) {
        debug_assert!(out.len() >= HEADER_LEN);
        out[0..4].copy_from_slice(&self.version.to_be_bytes());
        out[4..8].copy_from_slice(&self.code.to_be_bytes());
        out[8..12].copy_from_slice(&self.data_length.to_be_bytes());
        out[12..16].copy_from_slice(&self.activity_id.to_be_bytes());
        out[16..20].copy_from_slice(&self.timestamp_secs.to_be_bytes());
        out[20..24].copy_from_slice(&self.timestamp_nanos.to_be_bytes());
    }

    /// The message code as a typed [`MsgCode`], or `None` if it is not one this core
    /// recognizes (caller logs and drops).
    pub fn msg_code(&self) -> Option<MsgCode> {
        MsgCode::from_u32(self.code)
    }
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_header() {
        let header = ControlHeader {
            version: 2,
            code: MsgCode::ConfigureDx as u32,
            data_length: 128,
            activity_id: 7,
            timestamp_secs: 1_700_000_000,
            timestamp_nanos: 500,
        };
        let mut buf = [0u8; HEADER_LEN];
        header.encode(&mut buf);
        let decoded = ControlHeader::decode(&buf).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.msg_code(), Some(MsgCode::ConfigureDx));
    }

    #[test]
    fn truncated_header_is_an_error() {
        let buf = [0u8; HEADER_LEN - 1];
        assert!(matches!(ControlHeader::decode(&buf), Err(ControlCodecError::Truncated { .. })));
    }

    #[test]
    fn unknown_code_still_parses_header() {
        let header = ControlHeader {
            version: 1,
            code: 0xFFFF,
            data_length: 0,
            activity_id: 0,
            timestamp_secs: 0,
            timestamp_nanos: 0,
        };
        let mut buf = [0u8; HEADER_LEN];
        header.encode(&mut buf);
        let decoded = ControlHeader::decode(&buf).unwrap();
        assert_eq!(decoded.msg_code(), None);
    }
}
