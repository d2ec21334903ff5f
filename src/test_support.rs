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

//! Recording doubles for the client, the transfer engine and the application callback.

use std::boxed::Box;
use std::cell::RefCell;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embassy_time::{Duration, Instant};
use fwota_messages::Telemetry;
use fwota_messages::custom_data_types::ChecksumAlgorithm;
use fwota_messages::firmware::attributes::{
    FW_CHECKSUM_ALGORITHM_KEY, FW_CHECKSUM_KEY, FW_SIZE_KEY, FW_TITLE_KEY, FW_VERSION_KEY,
};
use fwota_messages::telemetry::state::FirmwareState;

use crate::attributes::AttributeValue;
use crate::client::OtaClient;
use crate::engine::{TransferEngine, TransferHost, TransferParams};
use crate::request::{UpdateCallback, UpdateRequest};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ClientCall {
    SendJson { topic: String, payload: serde_json::Value },
    SendJsonString { topic: String, payload: String },
    Subscribe(String),
    Unsubscribe(String),
    SetBufferSize(u16, u16),
    RequestAttributes(Vec<String>, Duration),
    SubscribeAttributes(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MockError;

pub(crate) struct MockClient {
    pub calls: Vec<ClientCall>,
    pub receive_size: u16,
    pub send_size: u16,
    pub request_id: Option<u32>,
    pub fail_subscribe: bool,
    pub fail_set_buffer: bool,
    pub fail_attribute_request: bool,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            receive_size: 1024,
            send_size: 256,
            request_id: Some(0),
            fail_subscribe: false,
            fail_set_buffer: false,
            fail_attribute_request: false,
        }
    }

    pub fn with_receive_size(mut self, receive_size: u16) -> Self {
        self.receive_size = receive_size;
        self
    }

    /// `(fw_state, fw_error)` of every state report, in order.
    pub fn states(&self) -> Vec<(String, String)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::SendJson { payload, .. } => {
                    let state = payload.get("fw_state")?.as_str()?.to_string();
                    let error = payload.get("fw_error")?.as_str()?.to_string();
                    Some((state, error))
                }
                _ => None,
            })
            .collect()
    }

    pub fn buffer_resizes(&self) -> Vec<(u16, u16)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::SetBufferSize(receive, send) => Some((*receive, *send)),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::SendJsonString { topic, payload } => Some((topic.clone(), payload.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, expected: &ClientCall) -> usize {
        self.calls.iter().filter(|call| *call == expected).count()
    }
}

impl OtaClient for MockClient {
    type Error = MockError;

    fn send_json(&mut self, topic: &str, payload: &Telemetry<'_>) -> Result<(), Self::Error> {
        let payload = serde_json::to_value(payload).map_err(|_| MockError)?;
        self.calls.push(ClientCall::SendJson {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }

    fn send_json_string(&mut self, topic: &str, payload: &str) -> Result<(), Self::Error> {
        self.calls.push(ClientCall::SendJsonString {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }

    fn subscribe_topic(&mut self, topic: &str) -> Result<(), Self::Error> {
        self.calls.push(ClientCall::Subscribe(topic.to_string()));
        if self.fail_subscribe { Err(MockError) } else { Ok(()) }
    }

    fn unsubscribe_topic(&mut self, topic: &str) -> Result<(), Self::Error> {
        self.calls.push(ClientCall::Unsubscribe(topic.to_string()));
        Ok(())
    }

    fn receive_buffer_size(&self) -> u16 {
        self.receive_size
    }

    fn send_buffer_size(&self) -> u16 {
        self.send_size
    }

    fn set_buffer_size(&mut self, receive_size: u16, send_size: u16) -> Result<(), Self::Error> {
        self.calls.push(ClientCall::SetBufferSize(receive_size, send_size));
        if self.fail_set_buffer {
            return Err(MockError);
        }
        self.receive_size = receive_size;
        self.send_size = send_size;
        Ok(())
    }

    fn request_id(&mut self) -> Option<&mut u32> {
        self.request_id.as_mut()
    }

    fn request_shared_attributes(&mut self, keys: &'static [&'static str], timeout: Duration) -> Result<(), Self::Error> {
        self.calls.push(ClientCall::RequestAttributes(
            keys.iter().map(|key| key.to_string()).collect(),
            timeout,
        ));
        if self.fail_attribute_request { Err(MockError) } else { Ok(()) }
    }

    fn subscribe_shared_attributes(&mut self, keys: &'static [&'static str]) -> Result<(), Self::Error> {
        self.calls.push(ClientCall::SubscribeAttributes(
            keys.iter().map(|key| key.to_string()).collect(),
        ));
        if self.fail_attribute_request { Err(MockError) } else { Ok(()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineBehaviour {
    /// Requests the next chunk for every packet
    Download,
    /// Treats the first packet as the whole binary and reports success
    CompleteOnPacket,
    /// Reports a checksum mismatch for the first packet
    FailOnPacket,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StartedTransfer {
    pub request_id: u32,
    pub chunk_size: u16,
    pub total_size: usize,
    pub checksum: String,
    pub algorithm: ChecksumAlgorithm,
}

pub(crate) struct MockEngine {
    pub behaviour: EngineBehaviour,
    pub starts: Vec<StartedTransfer>,
    pub packets: Vec<(u32, Vec<u8>)>,
    pub stops: usize,
    pub ticks: Vec<Instant>,
    active_request: Option<u32>,
}

impl MockEngine {
    pub fn new(behaviour: EngineBehaviour) -> Self {
        Self {
            behaviour,
            starts: Vec::new(),
            packets: Vec::new(),
            stops: 0,
            ticks: Vec::new(),
            active_request: None,
        }
    }

    fn finish(&mut self, host: &mut dyn TransferHost, success: bool) {
        self.active_request = None;
        if success {
            let _ = host.send_state(FirmwareState::Updated, "");
        } else {
            let _ = host.send_state(FirmwareState::Failed, "Checksum verification failed");
        }
        if let Some(callback) = host.update_callback() {
            callback.finished(success);
        }
        let _ = host.cleanup();
    }
}

impl TransferEngine for MockEngine {
    fn start(&mut self, host: &mut dyn TransferHost, params: TransferParams<'_>) {
        self.starts.push(StartedTransfer {
            request_id: params.request_id,
            chunk_size: params.chunk_size,
            total_size: params.total_size,
            checksum: params.checksum.to_string(),
            algorithm: params.algorithm,
        });
        self.active_request = Some(params.request_id);
        let _ = host.send_state(FirmwareState::Downloading, "");
        let _ = host.publish_chunk_request(params.request_id, 0);
    }

    fn process_packet(&mut self, host: &mut dyn TransferHost, chunk_index: u32, payload: &[u8]) {
        self.packets.push((chunk_index, payload.to_vec()));
        let Some(request_id) = self.active_request else {
            return;
        };
        match self.behaviour {
            EngineBehaviour::Download => {
                if let Some(callback) = host.update_callback() {
                    callback.progress(chunk_index as usize + 1, 0);
                }
                let _ = host.publish_chunk_request(request_id, chunk_index + 1);
            }
            EngineBehaviour::CompleteOnPacket => self.finish(host, true),
            EngineBehaviour::FailOnPacket => self.finish(host, false),
        }
    }

    fn stop(&mut self, host: &mut dyn TransferHost) {
        self.stops += 1;
        if self.active_request.take().is_some() {
            if let Some(callback) = host.update_callback() {
                callback.finished(false);
            }
        }
    }

    fn tick(&mut self, _host: &mut dyn TransferHost, now: Instant) {
        self.ticks.push(now);
    }
}

#[derive(Debug, Default)]
pub(crate) struct CallbackLog {
    pub starting: usize,
    pub progress: Vec<usize>,
    pub finished: Vec<bool>,
}

pub(crate) struct RecordingCallback(Rc<RefCell<CallbackLog>>);

impl UpdateCallback for RecordingCallback {
    fn update_starting(&mut self) {
        self.0.borrow_mut().starting += 1;
    }

    fn progress(&mut self, current_chunk: usize, _total_chunks: usize) {
        self.0.borrow_mut().progress.push(current_chunk);
    }

    fn finished(&mut self, success: bool) {
        self.0.borrow_mut().finished.push(success);
    }
}

pub(crate) fn update_request(title: &str, version: &str, chunk_size: u16) -> (UpdateRequest, Rc<RefCell<CallbackLog>>) {
    let log = Rc::new(RefCell::new(CallbackLog::default()));
    let request = UpdateRequest::new(title, version, Box::new(RecordingCallback(log.clone())))
        .with_chunk_size(chunk_size);
    (request, log)
}

pub(crate) fn firmware_attributes<'a>(
    title: &'a str,
    version: &'a str,
    algorithm: &'a str,
) -> [(&'a str, AttributeValue<'a>); 5] {
    [
        (FW_TITLE_KEY, AttributeValue::Str(title)),
        (FW_VERSION_KEY, AttributeValue::Str(version)),
        (FW_CHECKSUM_KEY, AttributeValue::Str("abc")),
        (FW_CHECKSUM_ALGORITHM_KEY, AttributeValue::Str(algorithm)),
        (FW_SIZE_KEY, AttributeValue::Unsigned(1000)),
    ]
}
