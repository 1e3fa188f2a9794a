//! Snapshot format adapters
//!
//! Each adapter pairs a record source with the matching delta sink so the
//! delta file keeps the layout of the snapshot it was taken from.

pub mod csv;
pub mod json;

pub use self::csv::{CsvDeltaSink, CsvOptions, CsvSource};
pub use self::json::{for_each_record, EntriesPath, JsonDeltaSink};
