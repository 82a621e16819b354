//! Builder for configuring and constructing a `TapeEngine`.

use crate::engine::{Feeder, TapeEngine};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tapedeck_core::{
    BarClock, SharedTempo, TapeConfig, TapeTransport, TempoMap, TimeSignature,
};

/// Poll interval of the chunk feeder thread when none is given.
pub const DEFAULT_FEEDER_INTERVAL: Duration = Duration::from_millis(5);

/// Every sizing decision is made here so the audio thread never allocates.
///
/// Navigation by bar uses a [`TempoMap`] built from [`bpm`](Self::bpm) and
/// [`time_signature`](Self::time_signature), unless a custom clock is given
/// with [`clock`](Self::clock).
///
/// # Example
///
/// ```
/// use tapedeck::prelude::*;
///
/// let engine = TapeEngine::builder()
///     .sample_rate(44100.0)
///     .capacity_secs(120.0)
///     .bpm(96.0)
///     .build()?;
///
/// assert_eq!(engine.sample_rate(), 44100.0);
/// # Ok::<(), tapedeck::Error>(())
/// ```
pub struct TapeEngineBuilder {
    config: TapeConfig,
    capacity_secs: Option<f64>,
    bpm: f64,
    time_signature: TimeSignature,
    clock: Option<Arc<dyn BarClock>>,
    feeder_interval: Option<Duration>,
}

impl Default for TapeEngineBuilder {
    fn default() -> Self {
        Self {
            config: TapeConfig::default(),
            capacity_secs: None,
            bpm: 120.0,
            time_signature: TimeSignature::default(),
            clock: None,
            feeder_interval: Some(DEFAULT_FEEDER_INTERVAL),
        }
    }
}

impl TapeEngineBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: TapeConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 48000
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 512
    pub fn max_block_frames(mut self, frames: usize) -> Self {
        self.config.max_block_frames = frames;
        self
    }

    pub fn capacity_frames(mut self, frames: usize) -> Self {
        self.config.capacity_frames = frames;
        self.capacity_secs = None;
        self
    }

    /// Tape length in seconds at the configured sample rate.
    pub fn capacity_secs(mut self, secs: f64) -> Self {
        self.capacity_secs = Some(secs);
        self
    }

    pub fn preallocated_chunks(mut self, chunks: usize) -> Self {
        self.config.preallocated_chunks = chunks;
        self
    }

    pub fn chunk_stock(mut self, chunks: usize) -> Self {
        self.config.chunk_stock = chunks;
        self
    }

    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.config.command_capacity = capacity;
        self
    }

    /// Blocks for a speed change to complete. 0 = immediate.
    pub fn speed_ramp_blocks(mut self, blocks: u32) -> Self {
        self.config.speed_ramp_blocks = blocks;
        self
    }

    pub fn crossfade_samples(mut self, samples: usize) -> Self {
        self.config.crossfade_samples = samples;
        self
    }

    pub fn deadline_metering(mut self, enabled: bool) -> Self {
        self.config.deadline_metering = enabled;
        self
    }

    /// Default: 120
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Default: 4/4
    pub fn time_signature(mut self, numerator: u32, denominator: u32) -> Self {
        self.time_signature = TimeSignature::new(numerator, denominator);
        self
    }

    /// Use an external bar clock instead of the built-in tempo map.
    pub fn clock(mut self, clock: Arc<dyn BarClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Default: 5 ms
    pub fn feeder_interval(mut self, interval: Duration) -> Self {
        self.feeder_interval = Some(interval);
        self
    }

    /// Do not spawn a feeder thread; storage is only replenished by
    /// [`TapeEngine::top_up_chunks`].
    pub fn manual_feeder(mut self) -> Self {
        self.feeder_interval = None;
        self
    }

    pub fn build(self) -> Result<TapeEngine> {
        let mut config = self.config;
        if let Some(secs) = self.capacity_secs {
            config.capacity_frames = (secs.max(0.0) * config.sample_rate).round() as usize;
        }
        config.validate()?;

        let (clock, tempo): (Arc<dyn BarClock>, Option<SharedTempo>) = match self.clock {
            Some(clock) => (clock, None),
            None => {
                let map = TempoMap::new(self.bpm, self.time_signature, config.sample_rate)?;
                let tempo = SharedTempo::new(map);
                (Arc::new(tempo.clone()), Some(tempo))
            }
        };

        let parts = TapeTransport::new(config.clone(), clock)?;

        let feeder = match self.feeder_interval {
            Some(interval) => Feeder::Thread(parts.feeder.spawn(interval)?),
            None => Feeder::Manual(parts.feeder),
        };

        tracing::info!(
            sample_rate = config.sample_rate,
            capacity_frames = config.capacity_frames,
            max_block_frames = config.max_block_frames,
            feeder_thread = matches!(feeder, Feeder::Thread(_)),
            "Tape engine built"
        );

        Ok(TapeEngine::from_parts(
            config,
            parts.transport,
            parts.handle,
            tempo,
            feeder,
        ))
    }
}
