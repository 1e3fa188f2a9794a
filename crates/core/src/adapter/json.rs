//! Streaming JSON record source and delta sink
//!
//! The source walks a dotted prefix path through the document (`item`
//! steps into every element of an array) and hands each element of the
//! target array to a callback as soon as it is parsed. Only one record is
//! held in memory at a time.
//!
//! ```text
//! "products"                   {"products": [ <record>, ... ]}
//! "catalog.products"           {"catalog": {"products": [ ... ]}}
//! "messages.item.markets"      {"messages": [{"markets": [ ... ]}, ...]}
//! ""                           [ <record>, ... ]
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::engine::DeltaSink;
use crate::error::{DeltaError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Item,
}

/// Location of the record array inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntriesPath {
    source: String,
    /// Full path to each record; always ends with `Item`
    segments: Vec<Segment>,
}

impl EntriesPath {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim();
        let mut segments = Vec::new();
        if !trimmed.is_empty() && trimmed != "$" {
            for part in trimmed.split('.') {
                match part {
                    "" => {
                        return Err(DeltaError::InvalidLocator {
                            locator: path.to_string(),
                            reason: "empty path segment".to_string(),
                        })
                    }
                    "item" => segments.push(Segment::Item),
                    key => segments.push(Segment::Key(key.to_string())),
                }
            }
        }
        segments.push(Segment::Item);

        Ok(Self {
            source: trimmed.to_string(),
            segments,
        })
    }

    /// Path as given, used as the wrapping key of the delta document
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for EntriesPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Stream every record found at `path` into `on_record`.
///
/// Returns the number of records handed over. An error from the callback
/// stops parsing and is returned unchanged; a path that does not exist in
/// the document yields zero records.
pub fn for_each_record<R, F>(reader: R, path: &EntriesPath, on_record: F) -> Result<u64>
where
    R: Read,
    F: FnMut(Value) -> Result<()>,
{
    let mut walker = Walker {
        on_record,
        failure: None,
        count: 0,
    };

    let mut de = serde_json::Deserializer::from_reader(BufReader::new(reader));
    let parsed = PathSeed {
        segments: &path.segments,
        walker: &mut walker,
    }
    .deserialize(&mut de)
    .and_then(|()| de.end());

    if let Some(failure) = walker.failure.take() {
        return Err(failure);
    }
    parsed.map_err(|e| DeltaError::MalformedSource(e.to_string()))?;
    Ok(walker.count)
}

struct Walker<F> {
    on_record: F,
    failure: Option<DeltaError>,
    count: u64,
}

struct PathSeed<'a, F> {
    segments: &'a [Segment],
    walker: &'a mut Walker<F>,
}

impl<'de, 'a, F> DeserializeSeed<'de> for PathSeed<'a, F>
where
    F: FnMut(Value) -> Result<()>,
{
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<(), D::Error> {
        match self.segments.split_first() {
            None => {
                let record = Value::deserialize(deserializer)?;
                self.walker.count += 1;
                if let Err(e) = (self.walker.on_record)(record) {
                    self.walker.failure = Some(e);
                    return Err(de::Error::custom("record processing aborted"));
                }
                Ok(())
            }
            Some((Segment::Item, rest)) => deserializer.deserialize_any(PathVisitor {
                expect: Expect::Items,
                rest,
                walker: self.walker,
            }),
            Some((Segment::Key(key), rest)) => deserializer.deserialize_any(PathVisitor {
                expect: Expect::Member(key.as_str()),
                rest,
                walker: self.walker,
            }),
        }
    }
}

enum Expect<'a> {
    Items,
    Member(&'a str),
}

/// Descends one level; values of the wrong shape are skipped
struct PathVisitor<'a, F> {
    expect: Expect<'a>,
    rest: &'a [Segment],
    walker: &'a mut Walker<F>,
}

macro_rules! skip_scalar {
    ($($method:ident: $ty:ty),*) => {
        $(
            fn $method<E: de::Error>(self, _: $ty) -> std::result::Result<(), E> {
                Ok(())
            }
        )*
    };
}

impl<'de, 'a, F> Visitor<'de> for PathVisitor<'a, F>
where
    F: FnMut(Value) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.expect {
            Expect::Items => f.write_str("an array of records"),
            Expect::Member(key) => write!(f, "an object with member '{}'", key),
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<(), A::Error> {
        match self.expect {
            Expect::Items => {
                while seq
                    .next_element_seed(PathSeed {
                        segments: self.rest,
                        walker: &mut *self.walker,
                    })?
                    .is_some()
                {}
            }
            Expect::Member(_) => while seq.next_element::<IgnoredAny>()?.is_some() {},
        }
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<(), A::Error> {
        while let Some(key) = map.next_key::<String>()? {
            match self.expect {
                Expect::Member(wanted) if key == wanted => {
                    map.next_value_seed(PathSeed {
                        segments: self.rest,
                        walker: &mut *self.walker,
                    })?;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<(), E> {
        Ok(())
    }

    skip_scalar!(visit_bool: bool, visit_i64: i64, visit_u64: u64, visit_f64: f64, visit_str: &str);
}

/// Writes `{"<entries>":[` then records separated by `\n,` and closes with `\n]}`
pub struct JsonDeltaSink<W: Write> {
    writer: W,
    written: u64,
}

impl JsonDeltaSink<BufWriter<File>> {
    pub fn create(path: &Path, entries: &EntriesPath) -> Result<Self> {
        Self::new(BufWriter::new(File::create(path)?), entries)
    }
}

impl<W: Write> JsonDeltaSink<W> {
    pub fn new(mut writer: W, entries: &EntriesPath) -> Result<Self> {
        writer.write_all(b"{")?;
        serde_json::to_writer(&mut writer, entries.as_str())?;
        writer.write_all(b":[\n")?;
        Ok(Self { writer, written: 0 })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DeltaSink<Value> for JsonDeltaSink<W> {
    fn emit(&mut self, record: &Value) -> Result<()> {
        if self.written > 0 {
            self.writer.write_all(b"\n,")?;
        }
        serde_json::to_writer(&mut self.writer, record)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.write_all(b"\n]}\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
