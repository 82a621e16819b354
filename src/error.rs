//! Centralized error type for the tapedeck umbrella crate.
//!
//! Wraps the core error so `?` propagates across the crate boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] tapedeck_core::Error),

    #[error("Transport processor has been moved to the audio thread")]
    ProcessorTaken,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
