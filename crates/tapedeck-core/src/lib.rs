//! Real-time tape transport: a virtual 4-track recorder.
//!
//! # Primary API
//!
//! - [`TapeTransport`]: audio-thread side. Call [`TapeTransport::process`]
//!   once per block.
//! - [`TransportHandle`]: control-thread side. Queues play/stop/spool/record,
//!   loop marks and bar navigation for the next block.
//! - [`TransportStatus`]: lock-free view of the transport for UIs.
//! - [`ChunkFeeder`]: allocates tape storage off the audio thread.
//! - [`BarClock`] / [`TempoMap`]: bar-to-frame mapping for navigation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tapedeck_core::{TapeConfig, TapeTransport, TempoMap, TimeSignature};
//!
//! let clock = Arc::new(TempoMap::new(120.0, TimeSignature::default(), 48000.0)?);
//! let parts = TapeTransport::new(TapeConfig::default(), clock)?;
//! let mut transport = parts.transport;
//!
//! parts.handle.play(1.0);
//! let block = transport.process(&[0.0; 256], 256);
//! assert_eq!(block.frames(), 256);
//! # Ok::<(), tapedeck_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{TapeConfig, MAX_BLOCK_FRAMES_LIMIT};

pub(crate) mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat, AtomicSection};

pub(crate) mod medium;
pub use medium::{Frame, TapeMedium, CHUNK_FRAMES, TRACKS};

pub(crate) mod stock;
pub use stock::{chunk_stock, ChunkFeeder, FeederThread};

pub(crate) mod metering;
pub use metering::{DeadlineMeter, DeadlineMetrics};

pub mod parameter;
pub use parameter::{ParameterRange, BASE_SPEED_RANGE, GAIN_RANGE};

pub(crate) mod smooth;
pub use smooth::{SmoothedValue, SpeedRamp};

pub(crate) mod transport;
pub use transport::{
    time_until, BarClock, PlayMode, Section, SharedTempo, StatusSnapshot, TapeTransport,
    TempoMap, TimeSignature, TrackBlock, TransitionResult, TransportCommand, TransportEvent,
    TransportFSM, TransportHandle, TransportParts, TransportStatus, DEFAULT_SPOOL_SPEED,
    MAX_SPEED,
};
