//! Crossover-based trade advisories.
//!
//! At index `i >= 1`:
//! - `Buy` when short > long now and short <= long at `i - 1`
//! - `Sell` when short < long now and short >= long at `i - 1`
//! - `Hold` otherwise, and always at index 0

use crate::domain::ema::EmaPoint;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advisory {
    Buy,
    Sell,
    Hold,
}

impl Advisory {
    pub fn as_str(self) -> &'static str {
        match self {
            Advisory::Buy => "Buy",
            Advisory::Sell => "Sell",
            Advisory::Hold => "Hold",
        }
    }

    pub fn is_bullish_breakout(self) -> bool {
        self == Advisory::Buy
    }

    pub fn is_bearish_breakout(self) -> bool {
        self == Advisory::Sell
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub instrument_id: String,
    pub interval_start: NaiveDateTime,
    pub advisory: Advisory,
}

fn crossover(short_prev: f64, long_prev: f64, short_curr: f64, long_curr: f64) -> Advisory {
    if short_curr > long_curr && short_prev <= long_prev {
        Advisory::Buy
    } else if short_curr < long_curr && short_prev >= long_prev {
        Advisory::Sell
    } else {
        Advisory::Hold
    }
}

/// One advisory per index of the aligned EMA sequences.
pub fn detect_crossovers(short: &[f64], long: &[f64]) -> Vec<Advisory> {
    debug_assert_eq!(short.len(), long.len());
    let len = short.len().min(long.len());
    if len == 0 {
        return Vec::new();
    }

    let mut advisories = Vec::with_capacity(len);
    advisories.push(Advisory::Hold);
    for i in 1..len {
        advisories.push(crossover(short[i - 1], long[i - 1], short[i], long[i]));
    }
    advisories
}

pub fn detect_signals(points: &[EmaPoint]) -> Vec<Signal> {
    let short: Vec<f64> = points.iter().map(|p| p.ema_short).collect();
    let long: Vec<f64> = points.iter().map(|p| p.ema_long).collect();

    points
        .iter()
        .zip(detect_crossovers(&short, &long))
        .map(|(point, advisory)| Signal {
            instrument_id: point.instrument_id.clone(),
            interval_start: point.interval_start,
            advisory,
        })
        .collect()
}
