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

pub mod attributes;
pub mod chunk;

/// Wildcard subscription covering every firmware chunk response.
pub const FIRMWARE_RESPONSE_SUBSCRIBE_TOPIC: &str = "v2/fw/response/+";
pub const TELEMETRY_TOPIC: &str = "v1/devices/me/telemetry";

/// Capacity of `v2/fw/response/{request_id}/chunk/` for any `u32` request id.
pub const MAX_FW_TOPIC_SIZE: usize = 33;
/// Capacity of `v2/fw/request/{request_id}/chunk/{chunk_index}` for any `u32` pair.
pub const MAX_FW_REQUEST_TOPIC_SIZE: usize = 48;
