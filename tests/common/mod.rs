#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tickema::domain::error::TickemaError;
pub use tickema::domain::pipeline::SignalRow;
use tickema::domain::record_parser::DEFAULT_COLUMNS;
use tickema::ports::output_port::OutputPort;
use tickema::ports::record_source::{RawRow, RecordSourcePort, RowStream};

/// In-memory sources, listed in insertion order.
pub struct MockRecordSource {
    pub order: Vec<String>,
    pub rows: HashMap<String, Vec<RawRow>>,
    pub open_errors: HashMap<String, String>,
    pub read_errors: HashMap<String, String>,
}

impl MockRecordSource {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
            open_errors: HashMap::new(),
            read_errors: HashMap::new(),
        }
    }

    pub fn with_rows(mut self, name: &str, rows: Vec<RawRow>) -> Self {
        self.order.push(name.to_string());
        self.rows.insert(name.to_string(), rows);
        self
    }

    pub fn with_open_error(mut self, name: &str, reason: &str) -> Self {
        self.order.push(name.to_string());
        self.open_errors.insert(name.to_string(), reason.to_string());
        self
    }

    /// Rows are yielded, then the source fails with `reason`.
    pub fn with_read_error(mut self, name: &str, rows: Vec<RawRow>, reason: &str) -> Self {
        self.order.push(name.to_string());
        self.rows.insert(name.to_string(), rows);
        self.read_errors.insert(name.to_string(), reason.to_string());
        self
    }
}

impl RecordSourcePort for MockRecordSource {
    fn source_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn open(&self, source: &str) -> Result<RowStream<'_>, TickemaError> {
        if let Some(reason) = self.open_errors.get(source) {
            return Err(TickemaError::SourceIo {
                file: source.to_string(),
                reason: reason.clone(),
            });
        }
        let rows: Vec<Result<RawRow, TickemaError>> = self
            .rows
            .get(source)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(Ok)
            .chain(self.read_errors.get(source).map(|reason| {
                Err(TickemaError::SourceIo {
                    file: source.to_string(),
                    reason: reason.clone(),
                })
            }))
            .collect();
        Ok(Box::new(rows.into_iter()))
    }
}

/// Captures written rows instead of touching the filesystem.
pub struct RecordingOutput {
    pub written: RefCell<Vec<(PathBuf, Vec<SignalRow>)>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self {
            written: RefCell::new(Vec::new()),
        }
    }
}

impl OutputPort for RecordingOutput {
    fn write(&self, rows: &[SignalRow], output_path: &Path) -> Result<(), TickemaError> {
        self.written
            .borrow_mut()
            .push((output_path.to_path_buf(), rows.to_vec()));
        Ok(())
    }
}

/// A full-width DEBS row with only the consumed fields populated.
pub fn debs_fields(id: &str, date: &str, time: &str, last: &str) -> Vec<String> {
    let mut fields = vec![String::new(); DEFAULT_COLUMNS.len()];
    fields[0] = id.to_string();
    fields[1] = "E".to_string();
    fields[2] = date.to_string();
    fields[3] = time.to_string();
    fields[21] = last.to_string();
    fields
}

pub fn debs_row(id: &str, date: &str, time: &str, last: &str) -> RawRow {
    RawRow::Fields(debs_fields(id, date, time, last))
}

pub fn debs_line(id: &str, date: &str, time: &str, last: &str) -> String {
    debs_fields(id, date, time, last).join(",")
}

/// Write a trading-day file: 12 metadata lines, then `lines`.
pub fn write_debs_file(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let mut content = String::new();
    for i in 0..12 {
        content.push_str(&format!("# metadata line {i}\n"));
    }
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn write_ini(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("tickema.ini");
    fs::write(&path, content).unwrap();
    path
}
