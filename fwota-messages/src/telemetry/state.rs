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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareState {
    Downloading,
    Downloaded,
    Verified,
    Updating,
    Updated,
    Failed,
}

impl FirmwareState {
    pub fn as_str(self) -> &'static str {
        match self {
            FirmwareState::Downloading => "DOWNLOADING",
            FirmwareState::Downloaded => "DOWNLOADED",
            FirmwareState::Verified => "VERIFIED",
            FirmwareState::Updating => "UPDATING",
            FirmwareState::Updated => "UPDATED",
            FirmwareState::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareStateReport<'a> {
    pub fw_state: FirmwareState,
    /// Human readable reason, empty unless the state is a failure
    pub fw_error: &'a str,
}
