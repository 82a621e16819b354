//! Error types for tapedeck-core.
//!
//! Only construction and configuration can fail. The block-processing paths
//! never return errors; they report through transport state and the overrun
//! counter instead.

use thiserror::Error;

/// Error type for tapedeck-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be between 20.0 and 999.0 BPM")]
    InvalidTempo(f64),

    #[error("Invalid time signature: {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u32, denominator: u32 },

    #[error("Invalid section: start={start} is after end={end}")]
    InvalidSection { start: usize, end: usize },
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
