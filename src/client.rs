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

use embassy_time::Duration;
use fwota_messages::Telemetry;

/// Everything the coordinator needs from the connected MQTT client.
///
/// Covers the raw transport, the buffer sizing of the client, the shared
/// request id counter and the shared attribute request/subscribe entry points.
/// Results of attribute requests are delivered back through
/// [`OtaFirmwareUpdate::firmware_attributes_received`](crate::OtaFirmwareUpdate::firmware_attributes_received)
/// and [`OtaFirmwareUpdate::request_timed_out`](crate::OtaFirmwareUpdate::request_timed_out)
/// by whoever owns both.
pub trait OtaClient {
    type Error: core::fmt::Debug;

    /// Serialises `payload` as JSON and publishes it on `topic`.
    fn send_json(&mut self, topic: &str, payload: &Telemetry<'_>) -> Result<(), Self::Error>;

    /// Publishes an already encoded payload on `topic`.
    fn send_json_string(&mut self, topic: &str, payload: &str) -> Result<(), Self::Error>;

    fn subscribe_topic(&mut self, topic: &str) -> Result<(), Self::Error>;

    fn unsubscribe_topic(&mut self, topic: &str) -> Result<(), Self::Error>;

    fn receive_buffer_size(&self) -> u16;

    fn send_buffer_size(&self) -> u16;

    /// Reallocates the client buffers. Expected to leave the current buffers
    /// untouched if the allocation fails.
    fn set_buffer_size(&mut self, receive_size: u16, send_size: u16) -> Result<(), Self::Error>;

    /// Counter shared by every request the client issues, `None` if the client
    /// cannot provide one.
    fn request_id(&mut self) -> Option<&mut u32>;

    /// Requests the given shared attributes once. The response, or the timeout
    /// if nothing arrives within `timeout`, must be delivered at most once.
    fn request_shared_attributes(&mut self, keys: &'static [&'static str], timeout: Duration) -> Result<(), Self::Error>;

    /// Registers for every future change of the given shared attributes.
    fn subscribe_shared_attributes(&mut self, keys: &'static [&'static str]) -> Result<(), Self::Error>;
}
