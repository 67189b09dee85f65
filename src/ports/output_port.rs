//! Result output port.

use crate::domain::error::TickemaError;
use crate::domain::pipeline::SignalRow;
use std::path::Path;

pub trait OutputPort {
    /// Write every row, in the order given, to `output_path`. An empty slice
    /// still produces a valid (header-only) output.
    fn write(&self, rows: &[SignalRow], output_path: &Path) -> Result<(), TickemaError>;
}
