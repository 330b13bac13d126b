use csv::{Reader, ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};
use thiserror::Error;
use tracing::debug;

use super::{normalize_header, AttendeeRecord};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("reading roster CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster I/O: {0}")]
    Io(#[from] io::Error),

    /// A previous rewind failed part way and the underlying reader is gone.
    #[error("roster reader is no longer available after a failed rewind")]
    Detached,
}

/// An ordered roster that can be traversed more than once.
///
/// The analysis walks the roster once per dimension, so every implementation
/// must be able to go back to its first record.
pub trait RecordSource {
    /// Reset iteration to the first data row.
    fn rewind(&mut self) -> Result<(), SourceError>;

    /// Next row in file order, or `None` once the roster is exhausted.
    fn next_record(&mut self) -> Option<Result<AttendeeRecord, SourceError>>;

    /// Iterate the remaining rows from the current position.
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records { source: self }
    }
}

pub struct Records<'a, S> {
    source: &'a mut S,
}

impl<S: RecordSource> Iterator for Records<'_, S> {
    type Item = Result<AttendeeRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_record()
    }
}

fn csv_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

fn read_headers<R: Read>(reader: &mut Reader<R>) -> Result<Arc<Vec<String>>, SourceError> {
    let headers = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect::<Vec<_>>();
    Ok(Arc::new(headers))
}

/// Streams rows straight from a seekable CSV reader. `rewind` seeks back to
/// byte 0 and re-reads the header row.
pub struct CsvSource<R> {
    reader: Option<Reader<R>>,
    headers: Arc<Vec<String>>,
    row: u64,
}

impl CsvSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening roster");
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> CsvSource<R> {
    pub fn new(inner: R) -> Result<Self, SourceError> {
        let mut reader = csv_builder().from_reader(inner);
        let headers = read_headers(&mut reader)?;
        Ok(Self {
            reader: Some(reader),
            headers,
            row: 0,
        })
    }

    /// Normalized header names, in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read + Seek> RecordSource for CsvSource<R> {
    fn rewind(&mut self) -> Result<(), SourceError> {
        let reader = self.reader.take().ok_or(SourceError::Detached)?;
        let mut inner = reader.into_inner();
        inner.seek(SeekFrom::Start(0))?;

        let mut reader = csv_builder().from_reader(inner);
        self.headers = read_headers(&mut reader)?;
        self.reader = Some(reader);
        self.row = 0;
        Ok(())
    }

    fn next_record(&mut self) -> Option<Result<AttendeeRecord, SourceError>> {
        let reader = match self.reader.as_mut() {
            Some(r) => r,
            None => return Some(Err(SourceError::Detached)),
        };

        let mut record = StringRecord::new();
        match reader.read_record(&mut record) {
            Ok(true) => {
                self.row += 1;
                let values = record.iter().map(str::to_string).collect();
                Some(Ok(AttendeeRecord::new(
                    self.row,
                    Arc::clone(&self.headers),
                    values,
                )))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// A roster materialized in memory; rewinding just resets the cursor.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<AttendeeRecord>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(records: Vec<AttendeeRecord>) -> Self {
        Self { records, cursor: 0 }
    }

    /// Drain `source` from its first row into memory.
    pub fn collect_from<S: RecordSource>(source: &mut S) -> Result<Self, SourceError> {
        source.rewind()?;
        let records = source.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn rewind(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }

    fn next_record(&mut self) -> Option<Result<AttendeeRecord, SourceError>> {
        let record = self.records.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Ok(record))
    }
}
