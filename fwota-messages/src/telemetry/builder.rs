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

use crate::Telemetry;
use crate::telemetry::info::FirmwareInfo;
use crate::telemetry::state::{FirmwareState, FirmwareStateReport};

/// A builder for creating `Telemetry` payloads.
pub struct TelemetryBuilder;

impl TelemetryBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn firmware_info<'a>(self) -> FirmwareInfoBuilder<'a> {
        FirmwareInfoBuilder::new()
    }

    pub fn firmware_state<'a>(self) -> FirmwareStateBuilder<'a> {
        FirmwareStateBuilder::new()
    }
}

impl Default for TelemetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FirmwareInfoBuilder<'a> {
    title: Option<&'a str>,
    version: Option<&'a str>,
}

impl<'a> FirmwareInfoBuilder<'a> {
    fn new() -> Self {
        Self {
            title: None,
            version: None,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    /// Builds the `Telemetry::FirmwareInfo` payload.
    ///
    /// # Panics
    ///
    /// Panics if `title` or `version` have not been set.
    pub fn build(self) -> Telemetry<'a> {
        Telemetry::FirmwareInfo(FirmwareInfo {
            current_fw_title: self.title.expect("title must be set"),
            current_fw_version: self.version.expect("version must be set"),
        })
    }
}

pub struct FirmwareStateBuilder<'a> {
    state: Option<FirmwareState>,
    error: &'a str,
}

impl<'a> FirmwareStateBuilder<'a> {
    fn new() -> Self {
        Self {
            state: None,
            error: "",
        }
    }

    pub fn state(mut self, state: FirmwareState) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the error message. Left unset it is sent as an empty string, which
    /// clears any previous error shown for the device.
    pub fn error(mut self, error: &'a str) -> Self {
        self.error = error;
        self
    }

    /// Builds the `Telemetry::FirmwareState` payload.
    ///
    /// # Panics
    ///
    /// Panics if `state` has not been set.
    pub fn build(self) -> Telemetry<'a> {
        Telemetry::FirmwareState(FirmwareStateReport {
            fw_state: self.state.expect("state must be set"),
            fw_error: self.error,
        })
    }
}
