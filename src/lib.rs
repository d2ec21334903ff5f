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

//! Over the air firmware updates for devices talking to a ThingsBoard style
//! server over MQTT.
//!
//! [`OtaFirmwareUpdate`] checks which firmware is assigned to the device,
//! validates it against the installed firmware, grows the client receive buffer
//! for the chunk size and drives a [`TransferEngine`] that downloads, verifies
//! and flashes the binary. The MQTT client and the engine are injected through
//! the [`OtaClient`] and [`TransferEngine`] traits.

extern crate alloc;

pub mod attributes;
pub mod client;
pub mod engine;
pub mod error;
pub mod firmware_update;
pub mod request;
mod session;

#[cfg(test)]
mod test_support;

pub use attributes::{AttributeValue, Attributes, FirmwareMetadata};
pub use client::OtaClient;
pub use engine::{TransferEngine, TransferHost, TransferParams};
pub use error::OtaError;
pub use firmware_update::OtaFirmwareUpdate;
pub use request::{UpdateCallback, UpdateRequest};
pub use session::{BUFFER_SAFETY_MARGIN, BufferNegotiation, UpdateState};

pub use fwota_messages;
