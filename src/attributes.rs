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

use fwota_messages::firmware::attributes::{
    FIRMWARE_ATTRIBUTE_KEYS, FW_CHECKSUM_ALGORITHM_KEY, FW_CHECKSUM_KEY, FW_SIZE_KEY, FW_TITLE_KEY,
    FW_VERSION_KEY,
};

use crate::error::OtaError;

/// A single decoded shared attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Str(&'a str),
    /// Arrays and objects, never valid for firmware attributes
    Other,
}

impl<'a> AttributeValue<'a> {
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            AttributeValue::Str(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<usize> {
        match self {
            AttributeValue::Unsigned(value) => usize::try_from(*value).ok(),
            AttributeValue::Integer(value) => usize::try_from(*value).ok(),
            _ => None,
        }
    }
}

/// Key to value lookup over a received set of shared attributes.
pub trait Attributes {
    /// `None` if the key was not part of the response.
    fn get(&self, key: &str) -> Option<AttributeValue<'_>>;

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<'a> Attributes for [(&'a str, AttributeValue<'a>)] {
    fn get(&self, key: &str) -> Option<AttributeValue<'_>> {
        self.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }
}

impl<'a, const N: usize> Attributes for [(&'a str, AttributeValue<'a>); N] {
    fn get(&self, key: &str) -> Option<AttributeValue<'_>> {
        Attributes::get(self.as_slice(), key)
    }
}

#[cfg(feature = "json")]
impl Attributes for serde_json::Map<alloc::string::String, serde_json::Value> {
    fn get(&self, key: &str) -> Option<AttributeValue<'_>> {
        use serde_json::Value;

        let value = match serde_json::Map::get(self, key)? {
            Value::Null => AttributeValue::Null,
            Value::Bool(value) => AttributeValue::Bool(*value),
            Value::Number(number) => {
                if let Some(value) = number.as_u64() {
                    AttributeValue::Unsigned(value)
                } else if let Some(value) = number.as_i64() {
                    AttributeValue::Integer(value)
                } else {
                    AttributeValue::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(value) => AttributeValue::Str(value.as_str()),
            Value::Array(_) | Value::Object(_) => AttributeValue::Other,
        };
        Some(value)
    }
}

/// Firmware assigned to the device by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareMetadata<'a> {
    pub title: &'a str,
    pub version: &'a str,
    pub size: usize,
    pub checksum: &'a str,
    /// Raw token, resolved against the supported algorithms during validation
    pub checksum_algorithm: &'a str,
}

impl<'a> FirmwareMetadata<'a> {
    /// Extracts the metadata, requiring every firmware key to be present before
    /// looking at any of the values.
    pub fn from_attributes<A: Attributes + ?Sized>(attributes: &'a A) -> Result<Self, OtaError> {
        if !FIRMWARE_ATTRIBUTE_KEYS.iter().all(|key| attributes.contains_key(key)) {
            return Err(OtaError::MissingAttributeKeys);
        }

        let string = |key: &str| attributes.get(key).and_then(|value| value.as_str());

        let (Some(title), Some(version), Some(checksum), Some(checksum_algorithm)) = (
            string(FW_TITLE_KEY),
            string(FW_VERSION_KEY),
            string(FW_CHECKSUM_KEY),
            string(FW_CHECKSUM_ALGORITHM_KEY),
        ) else {
            return Err(OtaError::NullAttributeValue);
        };

        let size = attributes
            .get(FW_SIZE_KEY)
            .and_then(|value| value.as_size())
            .ok_or(OtaError::NullAttributeValue)?;

        Ok(Self {
            title,
            version,
            size,
            checksum,
            checksum_algorithm,
        })
    }
}
