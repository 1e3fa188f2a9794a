//! Record shapes the engine can fingerprint

use csv::ByteRecord;
use serde_json::Value;

use crate::hash::{digest_fields, Digest};

/// Content digest of one record.
///
/// Implementations feed field values in their source order; reordering
/// fields changes the digest.
pub trait Digestible {
    fn digest(&self) -> Digest;
}

/// Tabular rows digest their raw field bytes.
impl Digestible for ByteRecord {
    fn digest(&self) -> Digest {
        digest_fields(self.iter())
    }
}

impl<T: AsRef<[u8]>> Digestible for [T] {
    fn digest(&self) -> Digest {
        digest_fields(self.iter())
    }
}

impl<T: AsRef<[u8]>> Digestible for Vec<T> {
    fn digest(&self) -> Digest {
        self.as_slice().digest()
    }
}

/// Nested records digest as a single field: their compact serialization.
///
/// Object members keep their source order (`preserve_order`), so moving a
/// member changes the digest just like editing it.
impl Digestible for Value {
    fn digest(&self) -> Digest {
        digest_fields([self.to_string()])
    }
}
