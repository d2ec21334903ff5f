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

use alloc::boxed::Box;
use alloc::string::String;

use embassy_time::Duration;

pub const DEFAULT_CHUNK_SIZE: u16 = 4096;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Notifications for the application about the progress of an update.
pub trait UpdateCallback {
    /// Firmware passed validation and the download is about to begin.
    fn update_starting(&mut self) {}

    fn progress(&mut self, _current_chunk: usize, _total_chunks: usize) {}

    /// The update ended, `success` is `true` once the binary is written and verified.
    fn finished(&mut self, success: bool);
}

/// Describes the firmware currently installed and how an update should be downloaded.
pub struct UpdateRequest {
    title: String,
    version: String,
    chunk_size: u16,
    timeout: Duration,
    request_id: u32,
    callback: Box<dyn UpdateCallback>,
}

impl UpdateRequest {
    pub fn new(title: impl Into<String>, version: impl Into<String>, callback: Box<dyn UpdateCallback>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            request_id: 0,
            callback,
        }
    }

    /// Size of each requested firmware chunk in bytes.
    pub fn with_chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// How long to wait for the firmware attributes after `start_firmware_update`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chunk_size(&self) -> u16 {
        self.chunk_size
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Zero while no attempt is active.
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    pub(crate) fn set_request_id(&mut self, request_id: u32) {
        self.request_id = request_id;
    }

    pub fn callback(&mut self) -> &mut dyn UpdateCallback {
        self.callback.as_mut()
    }
}

impl core::fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("title", &self.title)
            .field("version", &self.version)
            .field("chunk_size", &self.chunk_size)
            .field("timeout", &self.timeout)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}
