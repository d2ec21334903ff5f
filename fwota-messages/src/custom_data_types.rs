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

/// Hash functions the server may declare for a firmware binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumAlgorithm {
    Md5,
    Sha256,
    Sha384,
    Sha512,
}

const CHECKSUM_ALGORITHMS: [(&str, ChecksumAlgorithm); 4] = [
    ("MD5", ChecksumAlgorithm::Md5),
    ("SHA256", ChecksumAlgorithm::Sha256),
    ("SHA384", ChecksumAlgorithm::Sha384),
    ("SHA512", ChecksumAlgorithm::Sha512),
];

impl ChecksumAlgorithm {
    /// Looks up the algorithm for a token received from the server.
    ///
    /// Matching is exact and case-sensitive, so `sha256` or `SHA256 ` are rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        CHECKSUM_ALGORITHMS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, algorithm)| *algorithm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "MD5",
            ChecksumAlgorithm::Sha256 => "SHA256",
            ChecksumAlgorithm::Sha384 => "SHA384",
            ChecksumAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Length of the raw digest in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 16,
            ChecksumAlgorithm::Sha256 => 32,
            ChecksumAlgorithm::Sha384 => 48,
            ChecksumAlgorithm::Sha512 => 64,
        }
    }
}

impl core::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
