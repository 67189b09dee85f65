//! Validated tick and per-instrument series.

use chrono::NaiveDateTime;

/// One observed trade price for one instrument at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub instrument_id: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// All valid ticks for one instrument, ascending by timestamp.
///
/// Only [`SeriesBuilder`](crate::domain::series::SeriesBuilder) constructs
/// these, so the ordering holds for every value in circulation.
#[derive(Debug, Clone)]
pub struct InstrumentSeries {
    instrument_id: String,
    ticks: Vec<Tick>,
}

impl InstrumentSeries {
    pub(crate) fn from_sorted(instrument_id: String, ticks: Vec<Tick>) -> Self {
        debug_assert!(ticks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Self {
            instrument_id,
            ticks,
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.ticks.first().map(|t| t.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.ticks.last().map(|t| t.timestamp)
    }
}
