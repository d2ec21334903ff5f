#![cfg_attr(not(test), no_std)]
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

use serde::Serialize;

use crate::telemetry::info::FirmwareInfo;
use crate::telemetry::state::FirmwareStateReport;

pub mod custom_data_types;
pub mod firmware;
pub mod telemetry;

/// Payloads the device publishes to the telemetry topic.
///
/// Serialised untagged, so each variant appears on the wire as the flat
/// object of its inner struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Telemetry<'a> {
    FirmwareInfo(FirmwareInfo<'a>),
    FirmwareState(FirmwareStateReport<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// The formatted topic does not fit in the fixed capacity, value is that capacity
    CapacityExceeded(usize),
}
