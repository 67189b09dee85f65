//! Raw record input port.

use crate::domain::error::TickemaError;

/// One physical data line from a source, split into fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    Fields(Vec<String>),
    /// A line the reader could not split into fields. Skipped, never fatal.
    Malformed { reason: String },
}

/// Rows of one source in file order. An `Err` item is an I/O failure and
/// ends the source.
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<RawRow, TickemaError>> + 'a>;

pub trait RecordSourcePort {
    /// Source names in processing order.
    fn source_names(&self) -> Vec<String>;

    fn open(&self, source: &str) -> Result<RowStream<'_>, TickemaError>;
}
