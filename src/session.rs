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

use fwota_messages::firmware::chunk::{self, ChunkRequest, ResponseTopic};
use fwota_messages::firmware::{FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC, TELEMETRY_TOPIC};
use fwota_messages::telemetry::builder::TelemetryBuilder;
use fwota_messages::telemetry::state::FirmwareState;

use crate::client::OtaClient;
use crate::engine::TransferHost;
use crate::error::OtaError;
use crate::request::{UpdateCallback, UpdateRequest};

/// Extra receive buffer space on top of the chunk size, holds the topic and packet header.
pub const BUFFER_SAFETY_MARGIN: u16 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateState {
    Idle,
    /// One-shot firmware attribute request outstanding
    Requesting,
    /// Waiting for firmware attribute changes pushed by the server
    Subscribed,
    Validating,
    NegotiatingBuffer,
    Transferring,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferNegotiation {
    pub previous_size: u16,
    /// Only set once the resize succeeded, so a restore is never attempted otherwise
    pub changed: bool,
}

/// Coordinator state the transfer engine is allowed to reach through [`TransferHost`].
pub(crate) struct Session<C> {
    pub(crate) client: C,
    pub(crate) request: Option<UpdateRequest>,
    pub(crate) response_topic: ResponseTopic,
    pub(crate) buffer: BufferNegotiation,
    pub(crate) state: UpdateState,
    /// A push subscription keeps its request installed between attempts
    pub(crate) subscribed: bool,
}

impl<C: OtaClient> Session<C> {
    pub(crate) fn new(client: C) -> Result<Self, OtaError> {
        // Request id 0 is never handed out, so this topic matches nothing while idle
        let response_topic = chunk::response_topic(0)?;
        Ok(Self {
            client,
            request: None,
            response_topic,
            buffer: BufferNegotiation::default(),
            state: UpdateState::Idle,
            subscribed: false,
        })
    }

    pub(crate) fn send_firmware_info(&mut self, title: &str, version: &str) -> Result<(), OtaError> {
        let info = TelemetryBuilder::new()
            .firmware_info()
            .title(title)
            .version(version)
            .build();
        self.client.send_json(TELEMETRY_TOPIC, &info).map_err(|e| {
            log::warn!("Sending firmware info failed: {:?}", e);
            OtaError::TelemetryFailed
        })
    }

    pub(crate) fn send_firmware_state(&mut self, state: FirmwareState, error: &str) -> Result<(), OtaError> {
        let report = TelemetryBuilder::new()
            .firmware_state()
            .state(state)
            .error(error)
            .build();
        self.client.send_json(TELEMETRY_TOPIC, &report).map_err(|e| {
            log::warn!("Sending firmware state {} failed: {:?}", state.as_str(), e);
            OtaError::TelemetryFailed
        })
    }

    /// Draws the next id from the client counter, skipping 0 on wrap around.
    pub(crate) fn next_request_id(&mut self) -> Result<u32, OtaError> {
        let Some(counter) = self.client.request_id() else {
            log::error!("Client did not provide a request id");
            return Err(OtaError::RequestIdUnavailable);
        };
        *counter = counter.wrapping_add(1).max(1);
        Ok(*counter)
    }

    /// Makes `request` the active request and scopes the response topic to its id.
    pub(crate) fn install(&mut self, mut request: UpdateRequest, request_id: u32) -> Result<(), OtaError> {
        self.response_topic = chunk::response_topic(request_id)?;
        request.set_request_id(request_id);
        self.request = Some(request);
        Ok(())
    }

    /// Issues a fresh request id for a request that stayed installed between attempts.
    pub(crate) fn renew_request_id(&mut self) -> Result<u32, OtaError> {
        let request_id = self.next_request_id()?;
        self.response_topic = chunk::response_topic(request_id)?;
        if let Some(request) = self.request.as_mut() {
            request.set_request_id(request_id);
        }
        Ok(request_id)
    }

    /// Drops the active request without touching the client.
    pub(crate) fn release(&mut self) {
        self.request = None;
        self.subscribed = false;
        self.state = UpdateState::Idle;
        self.reset_response_topic();
    }

    fn reset_response_topic(&mut self) {
        if let Ok(topic) = chunk::response_topic(0) {
            self.response_topic = topic;
        }
    }

    /// Only the response topic of an installed request with a non-zero id is owned.
    pub(crate) fn owns_topic(&self, topic: &str) -> bool {
        match self.request.as_ref() {
            Some(request) if request.request_id() != 0 => topic.starts_with(self.response_topic.as_str()),
            _ => false,
        }
    }

    /// Whether an attempt is running that still needs its cleanup.
    fn attempt_active(&self) -> bool {
        match self.state {
            UpdateState::Idle => false,
            UpdateState::Subscribed => !self.subscribed,
            _ => true,
        }
    }

    pub(crate) fn subscribe_response_topic(&mut self) -> Result<(), OtaError> {
        self.client
            .subscribe_topic(FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC)
            .map_err(|e| {
                log::error!("Subscribing the given topic ({}) failed: {:?}", FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC, e);
                OtaError::SubscribeFailure
            })
    }

    /// Grows the receive buffer if a chunk plus [`BUFFER_SAFETY_MARGIN`] does not fit.
    pub(crate) fn negotiate_buffer(&mut self, chunk_size: u16) -> Result<(), OtaError> {
        let previous_size = self.client.receive_buffer_size();
        let required_size = u32::from(chunk_size) + u32::from(BUFFER_SAFETY_MARGIN);
        self.buffer = BufferNegotiation {
            previous_size,
            changed: false,
        };

        if u32::from(previous_size) >= required_size {
            log::debug!("Receive buffer of {} bytes holds {} byte chunks", previous_size, chunk_size);
            return Ok(());
        }

        let Ok(required_size) = u16::try_from(required_size) else {
            log::error!("Chunk size {} exceeds the largest client buffer", chunk_size);
            return Err(OtaError::ResourceExhaustion);
        };

        let send_size = self.client.send_buffer_size();
        self.client.set_buffer_size(required_size, send_size).map_err(|e| {
            log::error!("Growing receive buffer to {} bytes failed: {:?}", required_size, e);
            OtaError::ResourceExhaustion
        })?;

        log::debug!("Receive buffer grown from {} to {} bytes", previous_size, required_size);
        self.buffer.changed = true;
        Ok(())
    }

    fn restore_buffer(&mut self) {
        if !self.buffer.changed {
            return;
        }
        self.buffer.changed = false;
        let send_size = self.client.send_buffer_size();
        if let Err(e) = self.client.set_buffer_size(self.buffer.previous_size, send_size) {
            log::warn!("Restoring receive buffer to {} bytes failed: {:?}", self.buffer.previous_size, e);
        }
    }
}

impl<C: OtaClient> TransferHost for Session<C> {
    fn publish_chunk_request(&mut self, request_id: u32, chunk_index: u32) -> Result<(), OtaError> {
        let Some(request) = self.request.as_ref() else {
            log::warn!("Chunk {} requested without an active update", chunk_index);
            return Err(OtaError::PublishFailure);
        };

        let chunk_request = ChunkRequest::new(request_id, chunk_index, request.chunk_size());
        let topic = chunk_request.topic()?;
        log::trace!("Requesting chunk {} on {}", chunk_index, topic.as_str());
        self.client
            .send_json_string(topic.as_str(), chunk_request.payload().as_str())
            .map_err(|e| {
                log::warn!("Publishing request for chunk {} failed: {:?}", chunk_index, e);
                OtaError::PublishFailure
            })
    }

    fn send_state(&mut self, state: FirmwareState, error: &str) -> Result<(), OtaError> {
        self.send_firmware_state(state, error)
    }

    fn cleanup(&mut self) -> Result<(), OtaError> {
        if !self.attempt_active() {
            return Ok(());
        }
        log::debug!("Cleaning up firmware update");

        self.restore_buffer();
        self.reset_response_topic();

        if self.subscribed {
            if let Some(request) = self.request.as_mut() {
                request.set_request_id(0);
            }
            self.state = UpdateState::Subscribed;
        } else {
            self.request = None;
            self.state = UpdateState::Idle;
        }

        self.client
            .unsubscribe_topic(FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC)
            .map_err(|e| {
                log::warn!("Unsubscribing {} failed: {:?}", FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC, e);
                OtaError::UnsubscribeFailure
            })
    }

    fn update_callback(&mut self) -> Option<&mut dyn UpdateCallback> {
        match self.request.as_mut() {
            Some(request) => Some(request.callback()),
            None => None,
        }
    }
}
