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

use core::fmt::Write;

use crate::TopicError;
use crate::firmware::{MAX_FW_REQUEST_TOPIC_SIZE, MAX_FW_TOPIC_SIZE};

pub type ResponseTopic = heapless::String<MAX_FW_TOPIC_SIZE>;
pub type RequestTopic = heapless::String<MAX_FW_REQUEST_TOPIC_SIZE>;

/// Largest decimal rendering of a `u16` chunk size.
const CHUNK_SIZE_PAYLOAD_SIZE: usize = 5;

/// Topic prefix that every chunk response for `request_id` starts with.
pub fn response_topic(request_id: u32) -> Result<ResponseTopic, TopicError> {
    let mut topic = ResponseTopic::new();
    write!(topic, "v2/fw/response/{}/chunk/", request_id)
        .map_err(|_| TopicError::CapacityExceeded(MAX_FW_TOPIC_SIZE))?;
    Ok(topic)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkRequest {
    pub request_id: u32,
    pub chunk_index: u32,
    pub chunk_size: u16,
}

impl ChunkRequest {
    pub fn new(request_id: u32, chunk_index: u32, chunk_size: u16) -> Self {
        Self {
            request_id,
            chunk_index,
            chunk_size,
        }
    }

    pub fn topic(&self) -> Result<RequestTopic, TopicError> {
        let mut topic = RequestTopic::new();
        write!(topic, "v2/fw/request/{}/chunk/{}", self.request_id, self.chunk_index)
            .map_err(|_| TopicError::CapacityExceeded(MAX_FW_REQUEST_TOPIC_SIZE))?;
        Ok(topic)
    }

    /// The server expects the requested chunk size as a plain decimal string.
    pub fn payload(&self) -> heapless::String<CHUNK_SIZE_PAYLOAD_SIZE> {
        let mut payload = heapless::String::new();
        // A u16 never renders to more than five digits
        let _ = write!(payload, "{}", self.chunk_size);
        payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkResponse<'a> {
    pub chunk_index: u32,
    pub data: &'a [u8],
}

impl<'a> ChunkResponse<'a> {
    /// Parses an incoming message against the active response topic prefix.
    ///
    /// Returns `None` if the topic is not prefixed by `response_topic` or the
    /// remainder is not a chunk index made of decimal digits.
    pub fn parse(response_topic: &str, topic: &str, data: &'a [u8]) -> Option<Self> {
        let suffix = topic.strip_prefix(response_topic)?;
        if !suffix.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let chunk_index = suffix.parse::<u32>().ok()?;
        Some(Self { chunk_index, data })
    }
}
