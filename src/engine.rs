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

use embassy_time::{Duration, Instant};
use fwota_messages::custom_data_types::ChecksumAlgorithm;
use fwota_messages::telemetry::state::FirmwareState;

use crate::error::OtaError;
use crate::request::UpdateCallback;

/// Everything the transfer engine needs to download one firmware binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferParams<'a> {
    pub request_id: u32,
    pub chunk_size: u16,
    /// Time allowed for a single chunk response before it is requested again
    pub timeout: Duration,
    pub total_size: usize,
    pub checksum: &'a str,
    pub algorithm: ChecksumAlgorithm,
}

/// Calls the transfer engine makes back into the coordinator.
///
/// Passed to every engine method instead of being stored, so the engine never
/// holds a reference to the coordinator.
pub trait TransferHost {
    /// Publishes the request for `chunk_index`. Retrying is up to the engine.
    fn publish_chunk_request(&mut self, request_id: u32, chunk_index: u32) -> Result<(), OtaError>;

    fn send_state(&mut self, state: FirmwareState, error: &str) -> Result<(), OtaError>;

    /// Ends the update attempt. Restores the client buffer, forgets the request
    /// and unsubscribes from the response topic. Calling it again for the same
    /// attempt does nothing.
    fn cleanup(&mut self) -> Result<(), OtaError>;

    /// Callback of the active request, gone once `cleanup` ran.
    fn update_callback(&mut self) -> Option<&mut dyn UpdateCallback>;
}

/// Chunked download, hashing and flashing of the firmware binary.
pub trait TransferEngine {
    fn start(&mut self, host: &mut dyn TransferHost, params: TransferParams<'_>);

    fn process_packet(&mut self, host: &mut dyn TransferHost, chunk_index: u32, payload: &[u8]);

    /// Aborts a running download. Must not request further chunks or report progress.
    fn stop(&mut self, host: &mut dyn TransferHost);

    /// Called periodically, used to detect chunks that never arrived.
    fn tick(&mut self, host: &mut dyn TransferHost, now: Instant);
}
