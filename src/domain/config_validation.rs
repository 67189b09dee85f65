//! Configuration validation.
//!
//! Every key is optional; a present key must parse and be in range. The
//! typed readers here carry every check and are what [`crate::cli`] builds
//! its run settings from, so a run validates exactly the values it uses.

use crate::domain::ema::{EmaParams, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, DEFAULT_SMOOTHING};
use crate::domain::error::TickemaError;
use crate::domain::interval::ResampleInterval;
use crate::domain::pipeline::{SourceErrorPolicy, DEFAULT_CHUNK_SIZE};
use crate::domain::record_parser::{
    RecordLayout, DEFAULT_COLUMNS, DEFAULT_DATE_COLUMN, DEFAULT_ID_COLUMN, DEFAULT_PRICE_COLUMN,
    DEFAULT_TIME_COLUMN,
};
use crate::ports::config_port::ConfigPort;
use std::fmt::Display;
use std::str::FromStr;

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), TickemaError> {
    validate_input(config)?;
    read_interval(config)?;
    read_ema_params(config)?;
    read_bool(config, "output", "breakout_flags", false)?;
    Ok(())
}

fn validate_input(config: &dyn ConfigPort) -> Result<(), TickemaError> {
    read_parsed::<usize>(config, "input", "skip_rows")?;
    read_chunk_size(config)?;
    read_delimiter(config)?;
    read_layout(config)?;
    read_source_error_policy(config)?;
    Ok(())
}

/// Window and smoothing constraints, applied after any overrides. Both
/// alphas must stay in `(0, 1]`.
fn validate_windows(short: usize, long: usize, smoothing: f64) -> Result<(), TickemaError> {
    if short == 0 {
        return Err(TickemaError::invalid(
            "ema",
            "short_window",
            "short_window must be at least 1",
        ));
    }
    if long == 0 {
        return Err(TickemaError::invalid(
            "ema",
            "long_window",
            "long_window must be at least 1",
        ));
    }
    let narrowest = short.min(long) as f64;
    if !smoothing.is_finite() || smoothing <= 0.0 || smoothing > narrowest + 1.0 {
        return Err(TickemaError::invalid(
            "ema",
            "smoothing",
            "smoothing must be in (0, window + 1] for both windows",
        ));
    }
    Ok(())
}

/// Parse a present key with `FromStr`; `None` when absent or blank.
pub fn read_parsed<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TickemaError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| TickemaError::invalid(section, key, format!("{raw:?}: {e}"))),
    }
}

pub fn read_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, TickemaError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(TickemaError::invalid(
                section,
                key,
                format!("{raw:?} is not a boolean"),
            )),
        },
    }
}

pub fn read_interval(config: &dyn ConfigPort) -> Result<ResampleInterval, TickemaError> {
    Ok(read_parsed::<ResampleInterval>(config, "resample", "interval")?.unwrap_or_default())
}

fn read_ema(config: &dyn ConfigPort) -> Result<(usize, usize, f64), TickemaError> {
    let short = read_parsed::<usize>(config, "ema", "short_window")?.unwrap_or(DEFAULT_SHORT_WINDOW);
    let long = read_parsed::<usize>(config, "ema", "long_window")?.unwrap_or(DEFAULT_LONG_WINDOW);
    let smoothing = read_parsed::<f64>(config, "ema", "smoothing")?.unwrap_or(DEFAULT_SMOOTHING);
    Ok((short, long, smoothing))
}

/// Short and long EMA parameters, validated.
pub fn read_ema_params(config: &dyn ConfigPort) -> Result<(EmaParams, EmaParams), TickemaError> {
    let (short, long, smoothing) = read_ema(config)?;
    validate_windows(short, long, smoothing)?;
    Ok((EmaParams::new(short, smoothing), EmaParams::new(long, smoothing)))
}

pub fn read_chunk_size(config: &dyn ConfigPort) -> Result<usize, TickemaError> {
    match read_parsed::<usize>(config, "input", "chunk_size")? {
        Some(0) => Err(TickemaError::invalid(
            "input",
            "chunk_size",
            "chunk_size must be at least 1",
        )),
        Some(n) => Ok(n),
        None => Ok(DEFAULT_CHUNK_SIZE),
    }
}

pub fn read_delimiter(config: &dyn ConfigPort) -> Result<u8, TickemaError> {
    match config.get_string("input", "delimiter") {
        None => Ok(b','),
        Some(raw) => {
            let value = if raw == "\\t" || raw.eq_ignore_ascii_case("tab") {
                "\t"
            } else if raw.is_empty() {
                ","
            } else {
                raw.as_str()
            };
            match value.as_bytes() {
                [b] if b.is_ascii() => Ok(*b),
                _ => Err(TickemaError::invalid(
                    "input",
                    "delimiter",
                    "delimiter must be a single ASCII character",
                )),
            }
        }
    }
}

/// Column names as configured, defaulting to the DEBS 2022 layout.
pub fn read_columns(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_list("input", "columns")
        .filter(|cols| !cols.is_empty())
        .unwrap_or_else(|| DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect())
}

pub fn read_layout(config: &dyn ConfigPort) -> Result<RecordLayout, TickemaError> {
    let columns = read_columns(config);
    let name = |key: &str, default: &str| {
        config
            .get_string("input", key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let id = name("id_column", DEFAULT_ID_COLUMN);
    let date = name("date_column", DEFAULT_DATE_COLUMN);
    let time = name("time_column", DEFAULT_TIME_COLUMN);
    let price = name("price_column", DEFAULT_PRICE_COLUMN);

    RecordLayout::resolve(&columns, &id, &date, &time, &price)
        .map_err(|e| TickemaError::invalid("input", "columns", e.to_string()))
}

pub fn read_source_error_policy(config: &dyn ConfigPort) -> Result<SourceErrorPolicy, TickemaError> {
    Ok(read_parsed::<SourceErrorPolicy>(config, "input", "on_error")?.unwrap_or_default())
}
