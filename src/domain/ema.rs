//! Exponential moving average over resampled bars.
//!
//! alpha = s/(n+1), seeded with the first price, then
//! EMA[i] = P[i]*alpha + EMA[i-1]*(1-alpha). No warmup: every bar has a value.

use crate::domain::resample::Bar;
use chrono::NaiveDateTime;

pub const DEFAULT_SHORT_WINDOW: usize = 38;
pub const DEFAULT_LONG_WINDOW: usize = 100;
pub const DEFAULT_SMOOTHING: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaParams {
    pub window_size: usize,
    pub smoothing: f64,
}

impl EmaParams {
    pub fn new(window_size: usize, smoothing: f64) -> Self {
        Self {
            window_size,
            smoothing,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.smoothing / (1.0 + self.window_size as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmaPoint {
    pub instrument_id: String,
    pub interval_start: NaiveDateTime,
    pub price: f64,
    pub ema_short: f64,
    pub ema_long: f64,
}

pub fn calculate_ema(prices: &[f64], params: EmaParams) -> Vec<f64> {
    let Some((&seed, rest)) = prices.split_first() else {
        return Vec::new();
    };

    let alpha = params.alpha();
    let mut values = Vec::with_capacity(prices.len());
    let mut ema = seed;
    values.push(ema);

    for &price in rest {
        ema = price * alpha + ema * (1.0 - alpha);
        values.push(ema);
    }

    values
}

/// Both EMAs for one instrument, computed over the same bars so they stay
/// index-aligned.
pub fn annotate_bars(bars: &[Bar], short: EmaParams, long: EmaParams) -> Vec<EmaPoint> {
    let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();
    let short_ema = calculate_ema(&prices, short);
    let long_ema = calculate_ema(&prices, long);

    bars.iter()
        .zip(short_ema)
        .zip(long_ema)
        .map(|((bar, ema_short), ema_long)| EmaPoint {
            instrument_id: bar.instrument_id.clone(),
            interval_start: bar.interval_start,
            price: bar.price,
            ema_short,
            ema_long,
        })
        .collect()
}
