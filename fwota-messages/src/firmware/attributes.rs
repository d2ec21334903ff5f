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

//! Shared attribute keys describing the firmware assigned to a device.

pub const FW_CHECKSUM_KEY: &str = "fw_checksum";
pub const FW_CHECKSUM_ALGORITHM_KEY: &str = "fw_checksum_algorithm";
pub const FW_SIZE_KEY: &str = "fw_size";
pub const FW_TITLE_KEY: &str = "fw_title";
pub const FW_VERSION_KEY: &str = "fw_version";

pub const FIRMWARE_ATTRIBUTE_KEYS_AMOUNT: usize = 5;

/// Keys requested, or subscribed to, as one unit.
pub const FIRMWARE_ATTRIBUTE_KEYS: [&str; FIRMWARE_ATTRIBUTE_KEYS_AMOUNT] = [
    FW_CHECKSUM_KEY,
    FW_CHECKSUM_ALGORITHM_KEY,
    FW_SIZE_KEY,
    FW_TITLE_KEY,
    FW_VERSION_KEY,
];
