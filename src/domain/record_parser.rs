//! Raw row to [`Tick`] conversion.
//!
//! Fields are taken by fixed position from a [`RecordLayout`]. Date and time
//! are trimmed, joined with a single space, and parsed under
//! `day-month-year hour:minute:second.fraction`. The fractional part is
//! mandatory and carries 1 to 9 digits.

use crate::domain::tick::Tick;
use chrono::NaiveDateTime;

/// Field names of the DEBS 2022 Grand Challenge trading-day files.
pub const DEFAULT_COLUMNS: [&str; 39] = [
    "ID",
    "SecType",
    "Date",
    "Time",
    "Ask",
    "Ask volume",
    "Bid",
    "Bid volume",
    "Ask time",
    "Day's high ask",
    "Close",
    "Currency",
    "Day's high ask time",
    "Day's high",
    "ISIN",
    "Auction price",
    "Day's low ask",
    "Day's low",
    "Day's low ask time",
    "Open",
    "Nominal value",
    "Last",
    "Last volume",
    "Trading time",
    "Total volume",
    "Mid price",
    "Trading date",
    "Profit",
    "Current price",
    "Related indices",
    "Day high bid time",
    "Day low bid time",
    "Open Time",
    "Last trade time",
    "Close Time",
    "Day high Time",
    "Day low Time",
    "Bid time",
    "Auction Time",
];

pub const DEFAULT_ID_COLUMN: &str = "ID";
pub const DEFAULT_DATE_COLUMN: &str = "Date";
pub const DEFAULT_TIME_COLUMN: &str = "Time";
pub const DEFAULT_PRICE_COLUMN: &str = "Last";

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S%.f";

/// Why a raw row did not become a tick. Every variant is row-level and
/// non-fatal: the row is dropped and ingestion continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing field {field}")]
    MissingField { field: &'static str },

    #[error("invalid timestamp {value:?}")]
    InvalidTimestamp { value: String },

    #[error("invalid price {value:?}")]
    InvalidPrice { value: String },

    #[error("malformed row: {reason}")]
    MalformedRow { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("column {0:?} is not in the column list")]
    UnknownColumn(String),

    #[error("column {0:?} is mapped to more than one field")]
    DuplicateColumn(String),
}

/// Positions of the four consumed fields within a row, plus the declared
/// row width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub id: usize,
    pub date: usize,
    pub time: usize,
    pub price: usize,
    pub width: usize,
}

impl RecordLayout {
    /// Locate the named fields in `columns`.
    pub fn resolve<S: AsRef<str>>(
        columns: &[S],
        id: &str,
        date: &str,
        time: &str,
        price: &str,
    ) -> Result<Self, LayoutError> {
        let names = [id, date, time, price];
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(LayoutError::DuplicateColumn(name.to_string()));
            }
        }

        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c.as_ref().trim() == name)
                .ok_or_else(|| LayoutError::UnknownColumn(name.to_string()))
        };

        Ok(Self {
            id: position(id)?,
            date: position(date)?,
            time: position(time)?,
            price: position(price)?,
            width: columns.len(),
        })
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            id: 0,
            date: 2,
            time: 3,
            price: 21,
            width: DEFAULT_COLUMNS.len(),
        }
    }
}

/// Parse one row of text fields into a [`Tick`].
///
/// Rows shorter than the layout behave as if the absent fields were blank.
/// Rows longer than the layout are [`RecordError::MalformedRow`].
pub fn parse_record<S: AsRef<str>>(fields: &[S], layout: &RecordLayout) -> Result<Tick, RecordError> {
    if fields.len() > layout.width {
        return Err(RecordError::MalformedRow {
            reason: format!("expected at most {} fields, found {}", layout.width, fields.len()),
        });
    }

    let instrument_id = required(fields, layout.id, "instrument_id")?;
    let date = required(fields, layout.date, "date")?;
    let time = required(fields, layout.time, "time")?;
    let price = required(fields, layout.price, "price")?;

    let timestamp = parse_timestamp(date, time)?;
    let price = parse_price(price)?;

    Ok(Tick {
        instrument_id: instrument_id.to_string(),
        timestamp,
        price,
    })
}

fn required<'a, S: AsRef<str>>(
    fields: &'a [S],
    index: usize,
    field: &'static str,
) -> Result<&'a str, RecordError> {
    fields
        .get(index)
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .ok_or(RecordError::MissingField { field })
}

/// Parse trimmed date and time fields under the fixed timestamp pattern.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, RecordError> {
    let joined = format!("{} {}", date.trim(), time.trim());
    let invalid = || RecordError::InvalidTimestamp {
        value: joined.clone(),
    };

    let fraction_ok = time
        .trim()
        .rsplit_once('.')
        .is_some_and(|(_, frac)| (1..=9).contains(&frac.len()) && frac.bytes().all(|b| b.is_ascii_digit()));
    if !fraction_ok {
        return Err(invalid());
    }

    NaiveDateTime::parse_from_str(&joined, TIMESTAMP_FORMAT).map_err(|_| invalid())
}

fn parse_price(value: &str) -> Result<f64, RecordError> {
    match value.parse::<f64>() {
        Ok(p) if p.is_finite() => Ok(p),
        _ => Err(RecordError::InvalidPrice {
            value: value.to_string(),
        }),
    }
}
