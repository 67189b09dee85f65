//! Resample interval width.

use chrono::TimeDelta;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("invalid interval {value:?}, expected <n>s, <n>min or <n>h")]
    Invalid { value: String },

    #[error("interval must be positive")]
    NotPositive,
}

/// Width of one resampling bucket. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResampleInterval(TimeDelta);

impl ResampleInterval {
    pub const DEFAULT_MINUTES: i64 = 5;

    pub fn new(width: TimeDelta) -> Result<Self, IntervalError> {
        if width <= TimeDelta::zero() {
            return Err(IntervalError::NotPositive);
        }
        Ok(Self(width))
    }

    pub fn width(self) -> TimeDelta {
        self.0
    }
}

impl Default for ResampleInterval {
    fn default() -> Self {
        Self(TimeDelta::minutes(Self::DEFAULT_MINUTES))
    }
}

impl Display for ResampleInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let secs = self.0.num_seconds();
        if self.0.subsec_nanos() != 0 {
            write!(f, "{}ms", self.0.num_milliseconds())
        } else if secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs % 60 == 0 {
            write!(f, "{}min", secs / 60)
        } else {
            write!(f, "{secs}s")
        }
    }
}

impl FromStr for ResampleInterval {
    type Err = IntervalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || IntervalError::Invalid {
            value: trimmed.to_string(),
        };

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let n: i64 = digits.parse().map_err(|_| invalid())?;

        let width = match unit.trim().to_ascii_lowercase().as_str() {
            "ms" => TimeDelta::try_milliseconds(n),
            "s" | "sec" => TimeDelta::try_seconds(n),
            "m" | "min" | "t" => TimeDelta::try_minutes(n),
            "h" => TimeDelta::try_hours(n),
            _ => return Err(invalid()),
        }
        .ok_or_else(invalid)?;

        Self::new(width)
    }
}
