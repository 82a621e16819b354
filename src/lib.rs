//! # Tapedeck - virtual 4-track tape recorder
//!
//! Umbrella crate over [`tapedeck_core`]. It wires a tape transport, its
//! chunk feeder and a tempo map into a single [`TapeEngine`].
//!
//! ## Quick Start
//!
//! ```
//! use tapedeck::prelude::*;
//!
//! let mut engine = TapeEngine::builder()
//!     .sample_rate(48000.0)
//!     .bpm(120.0)
//!     .build()?;
//!
//! let transport = engine.transport();
//! transport.select_track(1).play(1.0).start_record();
//!
//! let input = vec![0.25; 512];
//! engine.process(&input, 512)?;
//! # Ok::<(), tapedeck::Error>(())
//! ```

/// Re-export of tapedeck-core for direct access
pub use tapedeck_core as core;

pub use tapedeck_core::{
    time_until, BarClock, ChunkFeeder, DeadlineMeter, DeadlineMetrics, FeederThread,
    ParameterRange, PlayMode, Section, SharedTempo, StatusSnapshot, TapeConfig, TapeTransport,
    TempoMap, TimeSignature, TrackBlock, TransportCommand, TransportHandle, TransportParts,
    TransportStatus, BASE_SPEED_RANGE, CHUNK_FRAMES, DEFAULT_SPOOL_SPEED, GAIN_RANGE, MAX_SPEED,
    TRACKS,
};

mod builder;
pub use builder::{TapeEngineBuilder, DEFAULT_FEEDER_INTERVAL};

mod engine;
pub use engine::TapeEngine;

mod error;
pub use error::{Error, Result};

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        BarClock, PlayMode, Section, StatusSnapshot, TapeConfig, TapeEngine, TapeEngineBuilder,
        TempoMap, TimeSignature, TrackBlock, TransportHandle,
    };
    pub use crate::{Error, Result};
}
