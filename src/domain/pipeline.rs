//! Ingestion-to-signal driver.
//!
//! # Stages
//!
//! 1. Every source is read in configured order; rows are parsed into ticks in
//!    chunks of `chunk_size`. Rejected rows are counted by kind and dropped.
//! 2. Accepted ticks of each source are merged into one [`SeriesBuilder`], so
//!    grouping behaves as if every file had been concatenated.
//! 3. Each instrument is resampled, annotated with both EMAs and scanned for
//!    crossovers independently of every other instrument.
//!
//! Output rows are ordered by instrument id, then by interval start.

use crate::domain::ema::{
    annotate_bars, EmaParams, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, DEFAULT_SMOOTHING,
};
use crate::domain::error::TickemaError;
use crate::domain::interval::ResampleInterval;
use crate::domain::record_parser::{parse_record, RecordError, RecordLayout};
use crate::domain::resample::resample;
use crate::domain::series::SeriesBuilder;
use crate::domain::signal::{detect_signals, Advisory};
use crate::domain::tick::{InstrumentSeries, Tick};
use crate::ports::record_source::{RawRow, RecordSourcePort};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// What to do when a source cannot be opened or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceErrorPolicy {
    /// Stop the run with the I/O error.
    #[default]
    Abort,
    /// Discard everything read from that source and continue with the next.
    Skip,
}

impl FromStr for SourceErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(SourceErrorPolicy::Abort),
            "skip" => Ok(SourceErrorPolicy::Skip),
            other => Err(format!("expected abort or skip, found {other:?}")),
        }
    }
}

impl fmt::Display for SourceErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorPolicy::Abort => f.write_str("abort"),
            SourceErrorPolicy::Skip => f.write_str("skip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub layout: RecordLayout,
    pub interval: ResampleInterval,
    pub short: EmaParams,
    pub long: EmaParams,
    pub chunk_size: usize,
    pub on_source_error: SourceErrorPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: RecordLayout::default(),
            interval: ResampleInterval::default(),
            short: EmaParams::new(DEFAULT_SHORT_WINDOW, DEFAULT_SMOOTHING),
            long: EmaParams::new(DEFAULT_LONG_WINDOW, DEFAULT_SMOOTHING),
            chunk_size: DEFAULT_CHUNK_SIZE,
            on_source_error: SourceErrorPolicy::Abort,
        }
    }
}

/// One output row per `(instrument, interval)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub instrument_id: String,
    pub interval_start: NaiveDateTime,
    pub price: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub advisory: Advisory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub sources_read: usize,
    pub sources_skipped: usize,
    pub rows_read: usize,
    pub ticks_accepted: usize,
    pub missing_field: usize,
    pub invalid_timestamp: usize,
    pub invalid_price: usize,
    pub malformed_row: usize,
    pub instruments: usize,
}

impl IngestStats {
    pub fn rows_rejected(&self) -> usize {
        self.missing_field + self.invalid_timestamp + self.invalid_price + self.malformed_row
    }

    fn record_rejection(&mut self, err: &RecordError) {
        match err {
            RecordError::MissingField { .. } => self.missing_field += 1,
            RecordError::InvalidTimestamp { .. } => self.invalid_timestamp += 1,
            RecordError::InvalidPrice { .. } => self.invalid_price += 1,
            RecordError::MalformedRow { .. } => self.malformed_row += 1,
        }
    }

    fn merge(&mut self, other: &IngestStats) {
        self.rows_read += other.rows_read;
        self.ticks_accepted += other.ticks_accepted;
        self.missing_field += other.missing_field;
        self.invalid_timestamp += other.invalid_timestamp;
        self.invalid_price += other.invalid_price;
        self.malformed_row += other.malformed_row;
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<SignalRow>,
    pub stats: IngestStats,
}

impl PipelineOutput {
    /// True when no source yielded a single valid tick.
    pub fn no_valid_data(&self) -> bool {
        self.stats.ticks_accepted == 0
    }
}

/// Resample one instrument and annotate every bar with EMAs and an advisory.
pub fn process_series(series: &InstrumentSeries, config: &PipelineConfig) -> Vec<SignalRow> {
    let bars = resample(series, config.interval);
    let points = annotate_bars(&bars, config.short, config.long);
    let signals = detect_signals(&points);

    points
        .into_iter()
        .zip(signals)
        .map(|(point, signal)| SignalRow {
            instrument_id: point.instrument_id,
            interval_start: point.interval_start,
            price: point.price,
            ema_short: point.ema_short,
            ema_long: point.ema_long,
            advisory: signal.advisory,
        })
        .collect()
}

/// Read and parse one source. Returns its ticks and counts, or the I/O
/// error that ended it.
fn ingest_source(
    source: &dyn RecordSourcePort,
    name: &str,
    config: &PipelineConfig,
) -> Result<(Vec<Tick>, IngestStats), TickemaError> {
    let rows = source.open(name)?;
    let chunk_size = config.chunk_size.max(1);

    let mut ticks = Vec::new();
    let mut stats = IngestStats::default();
    let mut chunk_rows = 0usize;
    let mut chunk_accepted = 0usize;
    let mut chunk_index = 0usize;

    for row in rows {
        let parsed = match row? {
            RawRow::Fields(fields) => parse_record(&fields, &config.layout),
            RawRow::Malformed { reason } => Err(RecordError::MalformedRow { reason }),
        };
        stats.rows_read += 1;
        chunk_rows += 1;

        match parsed {
            Ok(tick) => {
                ticks.push(tick);
                stats.ticks_accepted += 1;
                chunk_accepted += 1;
            }
            Err(e) => {
                debug!(source = name, row = stats.rows_read, error = %e, "row rejected");
                stats.record_rejection(&e);
            }
        }

        if chunk_rows == chunk_size {
            info!(source = name, chunk = chunk_index, rows = chunk_rows, accepted = chunk_accepted, "chunk processed");
            chunk_index += 1;
            chunk_rows = 0;
            chunk_accepted = 0;
        }
    }

    if chunk_rows > 0 {
        info!(source = name, chunk = chunk_index, rows = chunk_rows, accepted = chunk_accepted, "chunk processed");
    }

    Ok((ticks, stats))
}

/// Ingest every source into one builder, applying the source error policy.
pub fn ingest(
    source: &dyn RecordSourcePort,
    config: &PipelineConfig,
) -> Result<(SeriesBuilder, IngestStats), TickemaError> {
    let mut builder = SeriesBuilder::new();
    let mut stats = IngestStats::default();

    for name in source.source_names() {
        info!(source = %name, "processing file");
        match ingest_source(source, &name, config) {
            Ok((ticks, file_stats)) => {
                info!(
                    source = %name,
                    rows = file_stats.rows_read,
                    accepted = file_stats.ticks_accepted,
                    missing_field = file_stats.missing_field,
                    invalid_timestamp = file_stats.invalid_timestamp,
                    invalid_price = file_stats.invalid_price,
                    malformed = file_stats.malformed_row,
                    "file processed"
                );
                builder.extend(ticks);
                stats.merge(&file_stats);
                stats.sources_read += 1;
            }
            Err(e) => match config.on_source_error {
                SourceErrorPolicy::Abort => return Err(e),
                SourceErrorPolicy::Skip => {
                    warn!(source = %name, error = %e, "skipping source");
                    stats.sources_skipped += 1;
                }
            },
        }
    }

    stats.instruments = builder.instrument_count();
    Ok((builder, stats))
}

pub fn run_pipeline(
    source: &dyn RecordSourcePort,
    config: &PipelineConfig,
) -> Result<PipelineOutput, TickemaError> {
    let (builder, stats) = ingest(source, config)?;

    if builder.tick_count() == 0 {
        warn!("no valid data found");
        return Ok(PipelineOutput {
            rows: Vec::new(),
            stats,
        });
    }

    let mut rows = Vec::new();
    for series in builder.finish() {
        let before = rows.len();
        rows.extend(process_series(&series, config));
        debug!(
            instrument = series.instrument_id(),
            ticks = series.len(),
            bars = rows.len() - before,
            "instrument processed"
        );
    }

    info!(
        instruments = stats.instruments,
        ticks = stats.ticks_accepted,
        rejected = stats.rows_rejected(),
        rows = rows.len(),
        "pipeline complete"
    );

    Ok(PipelineOutput { rows, stats })
}
