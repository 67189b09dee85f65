//! CSV result file adapter.

use crate::domain::error::TickemaError;
use crate::domain::pipeline::SignalRow;
use crate::ports::output_port::OutputPort;
use std::path::Path;
use tracing::info;

pub const DEFAULT_OUTPUT_PATH: &str = "processed_data_with_ema.csv";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOutputOptions {
    pub short_window: usize,
    pub long_window: usize,
    /// Add `bullish_breakout` and `bearish_breakout` boolean columns.
    pub breakout_flags: bool,
}

pub struct CsvOutputAdapter {
    options: CsvOutputOptions,
}

impl CsvOutputAdapter {
    pub fn new(options: CsvOutputOptions) -> Self {
        Self { options }
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec![
            "ID".to_string(),
            "datetime".to_string(),
            "Last".to_string(),
            format!("EMA{}", self.options.short_window),
            format!("EMA{}", self.options.long_window),
        ];
        if self.options.breakout_flags {
            header.push("bullish_breakout".to_string());
            header.push("bearish_breakout".to_string());
        }
        header.push("advisory".to_string());
        header
    }

    fn record(&self, row: &SignalRow) -> Vec<String> {
        let mut record = vec![
            row.instrument_id.clone(),
            row.interval_start.format(DATETIME_FORMAT).to_string(),
            row.price.to_string(),
            row.ema_short.to_string(),
            row.ema_long.to_string(),
        ];
        if self.options.breakout_flags {
            record.push(row.advisory.is_bullish_breakout().to_string());
            record.push(row.advisory.is_bearish_breakout().to_string());
        }
        record.push(row.advisory.to_string());
        record
    }
}

impl OutputPort for CsvOutputAdapter {
    fn write(&self, rows: &[SignalRow], output_path: &Path) -> Result<(), TickemaError> {
        let output_err = |reason: String| TickemaError::Output {
            path: output_path.display().to_string(),
            reason,
        };

        let mut writer = csv::Writer::from_path(output_path).map_err(|e| output_err(e.to_string()))?;
        writer
            .write_record(self.header())
            .map_err(|e| output_err(e.to_string()))?;
        for row in rows {
            writer
                .write_record(self.record(row))
                .map_err(|e| output_err(e.to_string()))?;
        }
        writer.flush().map_err(|e| output_err(e.to_string()))?;

        info!(path = %output_path.display(), rows = rows.len(), "output written");
        Ok(())
    }
}
