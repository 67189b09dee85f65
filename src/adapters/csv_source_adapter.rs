//! Delimited tick file adapter.
//!
//! Each file starts with `skip_rows` metadata lines, then one headerless
//! record per line. Records may have any number of fields; width checks are
//! left to the record parser.

use crate::domain::error::TickemaError;
use crate::ports::record_source::{RawRow, RecordSourcePort, RowStream};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub const DEFAULT_SKIP_ROWS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvSourceOptions {
    pub skip_rows: usize,
    pub delimiter: u8,
}

impl Default for CsvSourceOptions {
    fn default() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS,
            delimiter: b',',
        }
    }
}

pub struct CsvSourceAdapter {
    files: Vec<PathBuf>,
    options: CsvSourceOptions,
}

impl CsvSourceAdapter {
    pub fn new(files: Vec<PathBuf>, options: CsvSourceOptions) -> Self {
        Self { files, options }
    }
}

fn source_io(source: &str, e: impl std::fmt::Display) -> TickemaError {
    TickemaError::SourceIo {
        file: source.to_string(),
        reason: e.to_string(),
    }
}

impl RecordSourcePort for CsvSourceAdapter {
    fn source_names(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    fn open(&self, source: &str) -> Result<RowStream<'_>, TickemaError> {
        let file = File::open(source).map_err(|e| source_io(source, e))?;
        let mut reader = BufReader::new(file);

        let mut discard = Vec::new();
        for _ in 0..self.options.skip_rows {
            discard.clear();
            let n = reader
                .read_until(b'\n', &mut discard)
                .map_err(|e| source_io(source, e))?;
            if n == 0 {
                break;
            }
        }

        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter)
            .from_reader(reader)
            .into_records();

        let name = source.to_string();
        Ok(Box::new(records.map(move |result| match result {
            Ok(record) => Ok(RawRow::Fields(record.iter().map(str::to_string).collect())),
            Err(e) if e.is_io_error() => Err(source_io(&name, e)),
            Err(e) => Ok(RawRow::Malformed {
                reason: e.to_string(),
            }),
        })))
    }
}
