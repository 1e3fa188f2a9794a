//! Column-based identity for tabular rows

use std::fmt;
use std::str::FromStr;

use csv::ByteRecord;

use super::{IdentityExtractor, IdentityKey};
use crate::error::{DeltaError, Result};

/// Caller-supplied column locator, before header resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Zero-based column position
    Index(usize),
    /// Column name as it appears in the header row
    Name(String),
}

impl FromStr for ColumnRef {
    type Err = DeltaError;

    /// A locator made only of ASCII digits is a position, anything else a name
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(DeltaError::InvalidLocator {
                locator: s.to_string(),
                reason: "empty column locator".to_string(),
            });
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            let index = s.parse().map_err(|e| DeltaError::InvalidLocator {
                locator: s.to_string(),
                reason: format!("{}", e),
            })?;
            Ok(Self::Index(index))
        } else {
            Ok(Self::Name(s.to_string()))
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{}", i),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl ColumnRef {
    /// Resolve against the header row into a positional extractor
    pub fn resolve(&self, header: &ByteRecord) -> Result<ColumnIdentity> {
        let index = match self {
            Self::Index(i) if *i < header.len() => Some(*i),
            Self::Index(_) => None,
            Self::Name(name) => header.iter().position(|col| col == name.as_bytes()),
        };

        index
            .map(|index| ColumnIdentity { index })
            .ok_or_else(|| DeltaError::HeaderColumnNotFound {
                column: self.to_string(),
                header: header
                    .iter()
                    .map(|col| String::from_utf8_lossy(col).into_owned())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Positional identity extractor for rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIdentity {
    index: usize,
}

impl ColumnIdentity {
    pub fn at(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl IdentityExtractor for ColumnIdentity {
    type Record = ByteRecord;

    fn extract(&self, record: &ByteRecord) -> Result<IdentityKey> {
        record
            .get(self.index)
            .map(identity_key)
            .ok_or_else(|| {
                DeltaError::IdentityNotFound(format!(
                    "row has {} fields, identity column is #{}",
                    record.len(),
                    self.index
                ))
            })
    }
}

/// Key for a raw identity field.
///
/// Valid UTF-8 without a backslash is kept verbatim. Anything else is
/// escaped: `\\` for a backslash and `\xNN` for each byte that is not
/// UTF-8, so distinct byte strings always map to distinct keys.
fn identity_key(field: &[u8]) -> IdentityKey {
    match std::str::from_utf8(field) {
        Ok(text) if !text.contains('\\') => text.to_string(),
        _ => escape_bytes(field),
    }
}

fn escape_bytes(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 8);
    loop {
        let (valid, invalid) = match std::str::from_utf8(bytes) {
            Ok(text) => (text, &[][..]),
            Err(e) => {
                let (head, tail) = bytes.split_at(e.valid_up_to());
                let bad = e.error_len().unwrap_or(tail.len());
                // head was just validated
                let head = std::str::from_utf8(head).unwrap_or_default();
                bytes = &tail[bad..];
                (head, &tail[..bad])
            }
        };
        out.push_str(&valid.replace('\\', "\\\\"));
        if invalid.is_empty() {
            return out;
        }
        for b in invalid {
            out.push_str(&format!("\\x{:02x}", b));
        }
    }
}
