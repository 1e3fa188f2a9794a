//! CSV record source and delta sink

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};

use crate::engine::DeltaSink;
use crate::error::{DeltaError, Result};

/// Dialect options shared by source and sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Tabular snapshot: a header row followed by data rows
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
    header: ByteRecord,
}

impl CsvSource<File> {
    pub fn open(path: &Path, options: CsvOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, options, path)
    }
}

impl<R: Read> CsvSource<R> {
    /// Read the header row; `origin` names the source in errors
    pub fn from_reader(reader: R, options: CsvOptions, origin: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(reader);

        let mut header = ByteRecord::new();
        let found = reader.read_byte_record(&mut header).map_err(malformed)?;
        if !found {
            return Err(DeltaError::MissingHeader(PathBuf::from(origin)));
        }

        Ok(Self { reader, header })
    }

    pub fn header(&self) -> &ByteRecord {
        &self.header
    }

    /// Lazy stream of data rows
    pub fn records(self) -> impl Iterator<Item = Result<ByteRecord>> {
        self.reader
            .into_byte_records()
            .map(|record| record.map_err(malformed))
    }
}

fn malformed(e: csv::Error) -> DeltaError {
    DeltaError::MalformedSource(e.to_string())
}

/// Writes the header on creation, then each delta row as it arrives
pub struct CsvDeltaSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvDeltaSink<File> {
    pub fn create(path: &Path, header: &ByteRecord, options: CsvOptions) -> Result<Self> {
        Self::new(File::create(path)?, header, options)
    }
}

impl<W: Write> CsvDeltaSink<W> {
    pub fn new(writer: W, header: &ByteRecord, options: CsvOptions) -> Result<Self> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .delimiter(options.delimiter)
            .from_writer(writer);
        writer.write_byte_record(header).map_err(sink_failure)?;
        Ok(Self { writer })
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| DeltaError::Io(e.into_error()))
    }
}

impl<W: Write> DeltaSink<ByteRecord> for CsvDeltaSink<W> {
    fn emit(&mut self, record: &ByteRecord) -> Result<()> {
        self.writer.write_byte_record(record).map_err(sink_failure)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn sink_failure(e: csv::Error) -> DeltaError {
    DeltaError::Sink(e.to_string())
}
