//! Core domain types and logic.

pub mod tick;
pub mod record_parser;
pub mod series;
pub mod interval;
pub mod resample;
pub mod ema;
pub mod signal;
pub mod pipeline;
pub mod config_validation;
pub mod error;
