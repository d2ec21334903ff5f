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

use alloc::format;
use alloc::string::String;

use embassy_time::Instant;
use fwota_messages::custom_data_types::ChecksumAlgorithm;
use fwota_messages::firmware::FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC;
use fwota_messages::firmware::attributes::FIRMWARE_ATTRIBUTE_KEYS;
use fwota_messages::firmware::chunk::ChunkResponse;
use fwota_messages::telemetry::state::FirmwareState;

use crate::attributes::{Attributes, FirmwareMetadata};
use crate::client::OtaClient;
use crate::engine::{TransferEngine, TransferHost, TransferParams};
use crate::error::OtaError;
use crate::request::UpdateRequest;
use crate::session::{Session, UpdateState};

const NO_FW_REQUEST_RESPONSE: &str =
    "Did not receive requested shared attribute firmware keys. Ensure keys exist and device is connected";
const NO_FW: &str = "Missing shared attribute firmware keys. Ensure you assigned an OTA update with binary";
const EMPTY_FW: &str = "Received shared attribute firmware keys were NULL";
const NOT_ENOUGH_RAM: &str =
    "Temporary allocating more internal client buffer failed, decrease OTA chunk size or decrease overall heap usage";
const RESETTING_FAILED: &str = "Preparing for OTA firmware updates failed, attributes might be NULL";

/// Why an update attempt ended before the transfer started, with the text reported to the server.
struct Rejection {
    error: OtaError,
    message: String,
}

impl Rejection {
    fn new(error: OtaError, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

impl From<OtaError> for Rejection {
    fn from(error: OtaError) -> Self {
        let message = format!("{}", error);
        Self { error, message }
    }
}

/// Firmware that passed every check and should be downloaded.
struct ApprovedFirmware<'a> {
    metadata: FirmwareMetadata<'a>,
    algorithm: ChecksumAlgorithm,
}

/// Runs the checks in order, the first failing one decides the outcome.
fn check_firmware<'a, A: Attributes + ?Sized>(
    request: &UpdateRequest,
    attributes: &'a A,
) -> Result<ApprovedFirmware<'a>, Rejection> {
    let metadata = FirmwareMetadata::from_attributes(attributes).map_err(|error| match error {
        OtaError::MissingAttributeKeys => Rejection::new(error, NO_FW),
        _ => Rejection::new(error, EMPTY_FW),
    })?;

    if metadata.title != request.title() {
        return Err(Rejection::new(
            OtaError::FirmwareNotApplicable,
            format!(
                "Received firmware title ({}) is different and not meant for this device ({})",
                metadata.title,
                request.title()
            ),
        ));
    }

    if metadata.version == request.version() {
        return Err(Rejection::new(OtaError::AlreadyUpToDate, ""));
    }

    let Some(algorithm) = ChecksumAlgorithm::from_token(metadata.checksum_algorithm) else {
        return Err(Rejection::new(
            OtaError::UnsupportedChecksumAlgorithm,
            format!(
                "Received checksum algorithm ({}) is not supported",
                metadata.checksum_algorithm
            ),
        ));
    };

    Ok(ApprovedFirmware { metadata, algorithm })
}

/// Over the air firmware update coordinator.
///
/// Fetches or subscribes to the firmware assigned to the device, checks that it
/// applies, sizes the client buffer for the chunks and hands the download to the
/// [`TransferEngine`]. Single threaded, every method runs to completion inside
/// the event that triggered it.
pub struct OtaFirmwareUpdate<C, E> {
    session: Session<C>,
    engine: E,
}

impl<C: OtaClient, E: TransferEngine> OtaFirmwareUpdate<C, E> {
    pub fn new(client: C, engine: E) -> Result<Self, OtaError> {
        Ok(Self {
            session: Session::new(client)?,
            engine,
        })
    }

    /// Requests the firmware assigned to the device once and starts the update if
    /// it is new. Use [`Self::subscribe_firmware_update`] to react to later assignments.
    pub fn start_firmware_update(&mut self, request: UpdateRequest) -> Result<(), OtaError> {
        let timeout = request.timeout();
        self.prepare_firmware_settings(request, false)?;
        self.session.state = UpdateState::Requesting;

        if let Err(e) = self
            .session
            .client
            .request_shared_attributes(&FIRMWARE_ATTRIBUTE_KEYS, timeout)
        {
            log::error!("Requesting firmware attributes failed: {:?}", e);
            self.session.release();
            return Err(OtaError::AttributeRequestFailed);
        }
        Ok(())
    }

    /// Registers for changes of the firmware assigned to the device, every change
    /// is validated and may start an update without calling this again.
    ///
    /// Changes made while the device was offline are not delivered, call
    /// [`Self::start_firmware_update`] once after boot to cover them.
    pub fn subscribe_firmware_update(&mut self, request: UpdateRequest) -> Result<(), OtaError> {
        self.prepare_firmware_settings(request, true)?;
        self.session.state = UpdateState::Subscribed;

        if let Err(e) = self
            .session
            .client
            .subscribe_shared_attributes(&FIRMWARE_ATTRIBUTE_KEYS)
        {
            log::error!("Subscribing to firmware attributes failed: {:?}", e);
            self.session.release();
            return Err(OtaError::AttributeRequestFailed);
        }
        Ok(())
    }

    /// Stops any ongoing update and drops the registered request. Does nothing if idle.
    pub fn stop_firmware_update(&mut self) {
        self.session.subscribed = false;
        match self.session.state {
            UpdateState::Idle => {}
            UpdateState::Subscribed => self.session.release(),
            state => {
                log::info!("Stopping firmware update in state {:?}", state);
                if state == UpdateState::Transferring {
                    self.engine.stop(&mut self.session);
                }
                let _ = self.session.cleanup();
            }
        }
    }

    pub fn send_firmware_info(&mut self, title: &str, version: &str) -> Result<(), OtaError> {
        self.session.send_firmware_info(title, version)
    }

    pub fn send_firmware_state(&mut self, state: FirmwareState, error: &str) -> Result<(), OtaError> {
        self.session.send_firmware_state(state, error)
    }

    /// Result handler for both the one-shot request and the subscription.
    pub fn firmware_attributes_received<A: Attributes + ?Sized>(&mut self, attributes: &A) {
        match self.session.state {
            UpdateState::Requesting | UpdateState::Subscribed => {}
            UpdateState::Transferring if self.session.subscribed => {
                log::warn!("Firmware assignment changed during transfer, restarting");
                self.engine.stop(&mut self.session);
                let _ = self.session.cleanup();
            }
            state => {
                log::debug!("Ignoring firmware attributes in state {:?}", state);
                return;
            }
        }
        self.session.state = UpdateState::Validating;

        let approved = match self.validate(attributes) {
            Ok(approved) => approved,
            Err(rejection) => {
                self.reject(rejection);
                return;
            }
        };

        if let Some(callback) = self.session.update_callback() {
            callback.update_starting();
        }

        if let Err(error) = self.session.subscribe_response_topic() {
            let message = format!(
                "Subscribing the given topic ({}) failed",
                FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC
            );
            self.abort(error, &message);
            return;
        }

        self.session.state = UpdateState::NegotiatingBuffer;
        let Some(request) = self.session.request.as_ref() else {
            return;
        };
        let chunk_size = request.chunk_size();
        if let Err(error) = self.session.negotiate_buffer(chunk_size) {
            self.abort(error, NOT_ENOUGH_RAM);
            return;
        }

        self.begin_transfer(approved);
    }

    /// Timeout handler of the one-shot firmware attribute request.
    pub fn request_timed_out(&mut self) {
        if self.session.state != UpdateState::Requesting {
            log::debug!("Ignoring firmware attribute timeout in state {:?}", self.session.state);
            return;
        }
        self.reject(Rejection::new(OtaError::RequestTimeout, NO_FW_REQUEST_RESPONSE));
    }

    /// Routes a raw chunk response to the transfer engine.
    ///
    /// Messages not on the response topic of the active request are ignored.
    pub fn process_response(&mut self, topic: &str, payload: &[u8]) {
        if self.request_id() == 0 {
            log::trace!("Ignoring message on {}, no active request", topic);
            return;
        }
        let Some(response) = ChunkResponse::parse(self.session.response_topic.as_str(), topic, payload) else {
            log::trace!("Ignoring message on {}", topic);
            return;
        };
        self.engine
            .process_packet(&mut self.session, response.chunk_index, response.data);
    }

    /// Whether `topic` belongs to the active update, used by the client to dispatch messages.
    pub fn compare_response_topic(&self, topic: &str) -> bool {
        self.session.owns_topic(topic)
    }

    /// Subscribes the response topic again after the client reconnected.
    pub fn resubscribe_topic(&mut self) -> Result<(), OtaError> {
        if self.session.state != UpdateState::Transferring {
            return Ok(());
        }
        self.session.subscribe_response_topic().inspect_err(|_| {
            let message = format!(
                "Subscribing the given topic ({}) failed",
                FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC
            );
            let _ = self.session.send_firmware_state(FirmwareState::Failed, &message);
        })
    }

    pub fn tick(&mut self, now: Instant) {
        if self.session.state == UpdateState::Transferring {
            self.engine.tick(&mut self.session, now);
        }
    }

    pub fn state(&self) -> UpdateState {
        self.session.state
    }

    /// Id of the active attempt, 0 if there is none.
    pub fn request_id(&self) -> u32 {
        match self.session.request.as_ref() {
            Some(request) => request.request_id(),
            None => 0,
        }
    }

    pub fn client(&self) -> &C {
        &self.session.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.session.client
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn prepare_firmware_settings(&mut self, request: UpdateRequest, subscribe: bool) -> Result<(), OtaError> {
        self.try_prepare_firmware_settings(request, subscribe)
            .inspect_err(|_| log::error!("{}", RESETTING_FAILED))
    }

    fn try_prepare_firmware_settings(&mut self, request: UpdateRequest, subscribe: bool) -> Result<(), OtaError> {
        if request.title().is_empty() || request.version().is_empty() {
            return Err(OtaError::MissingFirmwareInfo);
        }
        self.session.send_firmware_info(request.title(), request.version())?;
        let request_id = self.session.next_request_id()?;

        self.stop_firmware_update();

        self.session.install(request, request_id)?;
        self.session.subscribed = subscribe;
        log::debug!("Firmware update prepared with request id {}", request_id);
        Ok(())
    }

    fn validate<'a, A: Attributes + ?Sized>(&mut self, attributes: &'a A) -> Result<ApprovedFirmware<'a>, Rejection> {
        let needs_id = match self.session.request.as_ref() {
            Some(request) => request.request_id() == 0,
            None => return Err(Rejection::new(OtaError::NullAttributeValue, EMPTY_FW)),
        };
        if needs_id {
            self.session.renew_request_id()?;
        }

        match self.session.request.as_ref() {
            Some(request) => check_firmware(request, attributes),
            None => Err(Rejection::new(OtaError::NullAttributeValue, EMPTY_FW)),
        }
    }

    /// Reports a rejected attempt and cleans it up. "Already updated" is reported as success.
    fn reject(&mut self, rejection: Rejection) {
        if rejection.error.is_failure() {
            log::error!("{}", rejection.message);
            let _ = self
                .session
                .send_firmware_state(FirmwareState::Failed, &rejection.message);
        } else {
            log::info!("Firmware is already up to date");
            let _ = self.session.send_firmware_state(FirmwareState::Updated, "");
        }
        let _ = self.session.cleanup();
    }

    /// Like [`Self::reject`], for failures after the application was told the update is starting.
    fn abort(&mut self, error: OtaError, message: &str) {
        log::error!("{} ({})", message, error);
        let _ = self.session.send_firmware_state(FirmwareState::Failed, message);
        if let Some(callback) = self.session.update_callback() {
            callback.finished(false);
        }
        let _ = self.session.cleanup();
    }

    fn begin_transfer(&mut self, approved: ApprovedFirmware<'_>) {
        let Some(request) = self.session.request.as_ref() else {
            return;
        };

        log::info!(
            "A new firmware is available: ({}) => ({})",
            request.version(),
            approved.metadata.version
        );
        log::info!("Attempting to download over MQTT...");

        let params = TransferParams {
            request_id: request.request_id(),
            chunk_size: request.chunk_size(),
            timeout: request.timeout(),
            total_size: approved.metadata.size,
            checksum: approved.metadata.checksum,
            algorithm: approved.algorithm,
        };
        self.session.state = UpdateState::Transferring;
        self.engine.start(&mut self.session, params);
    }
}
