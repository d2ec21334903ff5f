// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use fwota_messages::TopicError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OtaError {
    /// The update request has an empty firmware title or version
    MissingFirmwareInfo,
    /// The client could not hand out a request id
    RequestIdUnavailable,
    TelemetryFailed,
    AttributeRequestFailed,
    /// At least one of the firmware attribute keys was not delivered
    MissingAttributeKeys,
    /// A firmware attribute was delivered as null or with the wrong type
    NullAttributeValue,
    /// The assigned firmware title differs from the device firmware title
    FirmwareNotApplicable,
    /// Assigned title and version are already installed, not a failure
    AlreadyUpToDate,
    UnsupportedChecksumAlgorithm,
    /// Growing the client buffer to hold a chunk failed
    ResourceExhaustion,
    SubscribeFailure,
    UnsubscribeFailure,
    PublishFailure,
    /// The one-shot firmware attribute request was never answered
    RequestTimeout,
    TopicTooLong,
}

impl OtaError {
    /// Whether the outcome is reported to the server as a failure.
    pub fn is_failure(self) -> bool {
        !matches!(self, OtaError::AlreadyUpToDate)
    }
}

impl From<TopicError> for OtaError {
    fn from(_: TopicError) -> Self {
        OtaError::TopicTooLong
    }
}

impl core::fmt::Display for OtaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            OtaError::MissingFirmwareInfo => "firmware title or version missing",
            OtaError::RequestIdUnavailable => "request id unavailable",
            OtaError::TelemetryFailed => "sending telemetry failed",
            OtaError::AttributeRequestFailed => "requesting firmware attributes failed",
            OtaError::MissingAttributeKeys => "missing firmware attribute keys",
            OtaError::NullAttributeValue => "firmware attribute keys were null",
            OtaError::FirmwareNotApplicable => "firmware not for this device",
            OtaError::AlreadyUpToDate => "firmware already updated",
            OtaError::UnsupportedChecksumAlgorithm => "unsupported checksum algorithm",
            OtaError::ResourceExhaustion => "insufficient memory",
            OtaError::SubscribeFailure => "subscribing topic failed",
            OtaError::UnsubscribeFailure => "unsubscribing topic failed",
            OtaError::PublishFailure => "publishing message failed",
            OtaError::RequestTimeout => "firmware attribute request timed out",
            OtaError::TopicTooLong => "topic exceeds capacity",
        };
        f.write_str(text)
    }
}

impl core::error::Error for OtaError {}
