//! Fixed-grid resampling with forward fill.
//!
//! The grid origin is midnight of the series' first tick date and
//! boundaries sit at `origin + k * width`. Every boundary from the one holding
//! the first tick to the one holding the last tick yields a bar. A bar's price
//! is the last tick in `[boundary, boundary + width)`, or the previous bar's
//! price when the bucket is empty. A boundary with no resolvable price yields
//! no bar.

use crate::domain::interval::ResampleInterval;
use crate::domain::tick::InstrumentSeries;
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub instrument_id: String,
    pub interval_start: NaiveDateTime,
    pub price: f64,
}

pub fn resample(series: &InstrumentSeries, interval: ResampleInterval) -> Vec<Bar> {
    let (Some(first), Some(last)) = (series.first_timestamp(), series.last_timestamp()) else {
        return Vec::new();
    };

    let origin = first.date().and_time(NaiveTime::MIN);
    let width = total_nanos(interval.width());
    let bucket =
        |ts: NaiveDateTime| total_nanos(ts.signed_duration_since(origin)).div_euclid(width);

    let first_bucket = bucket(first);
    let last_bucket = bucket(last);
    let capacity = usize::try_from(last_bucket - first_bucket + 1).unwrap_or(0);
    let mut bars = Vec::with_capacity(capacity);

    let mut ticks = series.ticks().iter().peekable();
    let mut last_known: Option<f64> = None;

    for k in first_bucket..=last_bucket {
        while let Some(tick) = ticks.next_if(|t| bucket(t.timestamp) == k) {
            last_known = Some(tick.price);
        }
        let Some(price) = last_known else {
            continue;
        };
        // k * width never exceeds the span between two valid timestamps
        let Some(interval_start) = boundary(origin, k * width) else {
            break;
        };
        bars.push(Bar {
            instrument_id: series.instrument_id().to_string(),
            interval_start,
            price,
        });
    }

    bars
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Exact length in nanoseconds; i128 holds any span between two timestamps.
fn total_nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * NANOS_PER_SEC + i128::from(delta.subsec_nanos())
}

fn boundary(origin: NaiveDateTime, offset_nanos: i128) -> Option<NaiveDateTime> {
    let secs = i64::try_from(offset_nanos.div_euclid(NANOS_PER_SEC)).ok()?;
    let nanos = u32::try_from(offset_nanos.rem_euclid(NANOS_PER_SEC)).ok()?;
    origin.checked_add_signed(TimeDelta::new(secs, nanos)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::SeriesBuilder;
    use crate::domain::tick::Tick;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 11, 8)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn series(ticks: &[(NaiveDateTime, f64)]) -> InstrumentSeries {
        let mut builder = SeriesBuilder::new();
        for &(timestamp, price) in ticks {
            builder.push(Tick {
                instrument_id: "X".into(),
                timestamp,
                price,
            });
        }
        builder
            .finish()
            .pop()
            .unwrap_or_else(|| InstrumentSeries::from_sorted("X".into(), Vec::new()))
    }

    fn starts_and_prices(bars: &[Bar]) -> Vec<(NaiveDateTime, f64)> {
        bars.iter().map(|b| (b.interval_start, b.price)).collect()
    }

    #[test]
    fn second_tick_lands_in_its_own_bucket() {
        let bars = resample(
            &series(&[(at(9, 0, 0), 100.0), (at(9, 6, 0), 110.0)]),
            ResampleInterval::default(),
        );
        assert_eq!(
            starts_and_prices(&bars),
            vec![(at(9, 0, 0), 100.0), (at(9, 5, 0), 110.0)]
        );
    }

    #[test]
    fn gaps_are_forward_filled() {
        let bars = resample(
            &series(&[(at(9, 1, 0), 100.0), (at(9, 17, 0), 120.0)]),
            ResampleInterval::default(),
        );
        assert_eq!(
            starts_and_prices(&bars),
            vec![
                (at(9, 0, 0), 100.0),
                (at(9, 5, 0), 100.0),
                (at(9, 10, 0), 100.0),
                (at(9, 15, 0), 120.0),
            ]
        );
    }

    #[test]
    fn last_tick_in_bucket_wins() {
        let bars = resample(
            &series(&[
                (at(9, 0, 10), 1.0),
                (at(9, 4, 59), 3.0),
                (at(9, 2, 0), 2.0),
                (at(9, 5, 0), 4.0),
            ]),
            ResampleInterval::default(),
        );
        assert_eq!(
            starts_and_prices(&bars),
            vec![(at(9, 0, 0), 3.0), (at(9, 5, 0), 4.0)]
        );
    }

    #[test]
    fn equal_timestamps_resolve_to_last_arrival() {
        let bars = resample(
            &series(&[(at(9, 1, 0), 1.0), (at(9, 1, 0), 2.0)]),
            ResampleInterval::default(),
        );
        assert_eq!(starts_and_prices(&bars), vec![(at(9, 0, 0), 2.0)]);
    }

    #[test]
    fn boundary_tick_belongs_to_next_bucket() {
        let bars = resample(
            &series(&[(at(9, 4, 0), 1.0), (at(9, 10, 0), 2.0)]),
            ResampleInterval::default(),
        );
        assert_eq!(
            starts_and_prices(&bars),
            vec![(at(9, 0, 0), 1.0), (at(9, 5, 0), 1.0), (at(9, 10, 0), 2.0)]
        );
    }

    #[test]
    fn grid_spans_midnight() {
        let next_day = NaiveDate::from_ymd_opt(2021, 11, 9)
            .unwrap()
            .and_hms_opt(0, 3, 0)
            .unwrap();
        let bars = resample(
            &series(&[(at(23, 52, 0), 1.0), (next_day, 2.0)]),
            ResampleInterval::default(),
        );
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].interval_start, at(23, 50, 0));
        assert_eq!(bars[2].interval_start, next_day - TimeDelta::minutes(3));
        assert_eq!(bars[2].price, 2.0);
    }

    #[test]
    fn single_tick_yields_single_bar() {
        let bars = resample(&series(&[(at(9, 3, 0), 7.0)]), ResampleInterval::default());
        assert_eq!(starts_and_prices(&bars), vec![(at(9, 0, 0), 7.0)]);
        assert_eq!(bars[0].instrument_id, "X");
    }

    #[test]
    fn empty_series_yields_no_bars() {
        assert!(resample(&series(&[]), ResampleInterval::default()).is_empty());
    }

    #[test]
    fn sub_second_interval() {
        let base = at(9, 0, 0);
        let bars = resample(
            &series(&[
                (base + TimeDelta::milliseconds(120), 1.0),
                (base + TimeDelta::milliseconds(760), 2.0),
            ]),
            "250ms".parse().unwrap(),
        );
        assert_eq!(
            starts_and_prices(&bars),
            vec![
                (base, 1.0),
                (base + TimeDelta::milliseconds(250), 1.0),
                (base + TimeDelta::milliseconds(500), 1.0),
                (base + TimeDelta::milliseconds(750), 2.0),
            ]
        );
    }

    #[test]
    fn span_of_centuries_keeps_last_tick_in_its_bucket() {
        let late = NaiveDate::from_ymd_opt(2500, 11, 8)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let interval: ResampleInterval = "1000h".parse().unwrap();
        let bars = resample(&series(&[(at(9, 0, 0), 1.0), (late, 2.0)]), interval);

        let last = bars.last().unwrap();
        assert!(last.interval_start <= late && late < last.interval_start + interval.width());
        assert_eq!(last.price, 2.0);
        assert_eq!(bars[0].interval_start, at(0, 0, 0));
        assert_eq!(bars[bars.len() - 2].price, 1.0);
        for pair in bars.windows(2) {
            assert_eq!(pair[1].interval_start - pair[0].interval_start, interval.width());
        }
    }

    proptest! {
        #[test]
        fn grid_is_contiguous_and_forward_filled(
            offsets in prop::collection::vec((0i64..86_400, 1.0f64..1000.0), 1..60),
            minutes in 1i64..30,
        ) {
            let ticks: Vec<(NaiveDateTime, f64)> = offsets
                .iter()
                .map(|&(secs, price)| (at(0, 0, 0) + TimeDelta::seconds(secs), price))
                .collect();
            let series = series(&ticks);
            let interval = ResampleInterval::new(TimeDelta::minutes(minutes)).unwrap();

            let bars = resample(&series, interval);
            let again = resample(&series, interval);
            prop_assert_eq!(&bars, &again);

            let first = series.first_timestamp().unwrap();
            let last = series.last_timestamp().unwrap();
            prop_assert!(bars[0].interval_start <= first);
            prop_assert!(first < bars[0].interval_start + interval.width());
            let end = bars[bars.len() - 1].interval_start;
            prop_assert!(end <= last && last < end + interval.width());

            for pair in bars.windows(2) {
                prop_assert_eq!(pair[1].interval_start - pair[0].interval_start, interval.width());
            }

            for bar in &bars {
                let in_bucket = series
                    .ticks()
                    .iter()
                    .filter(|t| t.timestamp >= bar.interval_start
                        && t.timestamp < bar.interval_start + interval.width())
                    .last();
                let expected = match in_bucket {
                    Some(t) => t.price,
                    None => series
                        .ticks()
                        .iter()
                        .filter(|t| t.timestamp < bar.interval_start)
                        .last()
                        .unwrap()
                        .price,
                };
                prop_assert_eq!(bar.price, expected);
            }
        }
    }
}
