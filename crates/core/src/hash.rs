//! BLAKE3 record digests
//!
//! A digest covers the ordered field values of one record. Fields are written
//! to the hasher with [`FIELD_SEPARATOR`] between them (never after the last
//! one). Separator and [`ESCAPE`] bytes occurring inside a field are prefixed
//! with [`ESCAPE`], so `["AB", "BC"]` and `["A", "BBC"]` can never produce the
//! same byte stream.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DeltaError, Result};

/// Byte written between two fields (ASCII unit separator)
pub const FIELD_SEPARATOR: u8 = 0x1f;

/// Byte prefixed to separator or escape bytes found inside a field (ASCII escape)
pub const ESCAPE: u8 = 0x1b;

/// A record digest (32 byte BLAKE3 hash)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, as persisted in fingerprint files
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the 64 character hex form
    pub fn from_hex(text: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(text, &mut bytes).map_err(|e| {
            DeltaError::MalformedSource(format!("invalid digest '{}': {}", text, e))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Digest::from_hex(&text).map_err(de::Error::custom)
    }
}

/// Incremental hasher that frames fields unambiguously
pub struct FieldHasher {
    inner: blake3::Hasher,
    fields: usize,
}

impl FieldHasher {
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
            fields: 0,
        }
    }

    /// Append the next field in record order
    pub fn field(&mut self, value: &[u8]) {
        if self.fields > 0 {
            self.inner.update(&[FIELD_SEPARATOR]);
        }
        self.fields += 1;

        let mut start = 0;
        for (i, &byte) in value.iter().enumerate() {
            if byte == FIELD_SEPARATOR || byte == ESCAPE {
                self.inner.update(&value[start..i]);
                self.inner.update(&[ESCAPE, byte]);
                start = i + 1;
            }
        }
        self.inner.update(&value[start..]);
    }

    pub fn finalize(self) -> Digest {
        Digest::from_bytes(*self.inner.finalize().as_bytes())
    }
}

impl Default for FieldHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest an ordered sequence of field values
pub fn digest_fields<I, F>(fields: I) -> Digest
where
    I: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut hasher = FieldHasher::new();
    for field in fields {
        hasher.field(field.as_ref());
    }
    hasher.finalize()
}
