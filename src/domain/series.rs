//! Grouping of ticks into per-instrument series.
//!
//! Ticks may arrive in any order across any number of files or chunks. The
//! builder groups them by instrument id and sorts each group only when the
//! series are handed out, so the result is the same as if every tick had
//! been pushed in one batch.
//!
//! Ties on timestamp keep arrival order (the sort is stable), so of two ticks
//! with an equal timestamp the one pushed later sorts later.

use crate::domain::tick::{InstrumentSeries, Tick};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct SeriesBuilder {
    groups: BTreeMap<String, Vec<Tick>>,
    tick_count: usize,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick) {
        self.tick_count += 1;
        match self.groups.get_mut(&tick.instrument_id) {
            Some(group) => group.push(tick),
            None => {
                self.groups.insert(tick.instrument_id.clone(), vec![tick]);
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = Tick>>(&mut self, ticks: I) {
        for tick in ticks {
            self.push(tick);
        }
    }

    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    pub fn instrument_count(&self) -> usize {
        self.groups.len()
    }

    /// Sort every group and return one series per instrument, ascending by
    /// instrument id.
    pub fn finish(self) -> Vec<InstrumentSeries> {
        self.groups
            .into_iter()
            .map(|(id, mut ticks)| {
                ticks.sort_by_key(|t| t.timestamp);
                InstrumentSeries::from_sorted(id, ticks)
            })
            .collect()
    }
}
