//! TapeEngine: owns a tape transport, its chunk feeder and its tempo map.

use crate::{Error, Result, TapeEngineBuilder};
use std::sync::Arc;
use tapedeck_core::{
    ChunkFeeder, DeadlineMeter, DeadlineMetrics, FeederThread, SharedTempo, StatusSnapshot,
    TapeConfig, TapeTransport, TrackBlock, TransportHandle,
};

/// How tape storage is replenished.
pub(crate) enum Feeder {
    Thread(FeederThread),
    Manual(ChunkFeeder),
}

/// A ready-to-run tape machine.
///
/// The engine keeps the audio-thread [`TapeTransport`] until an audio
/// callback claims it with [`take_processor`](Self::take_processor). Until
/// then [`process`](Self::process) drives it directly, which is how offline
/// rendering and tests use the engine.
///
/// # Example
///
/// ```
/// use tapedeck::prelude::*;
///
/// let mut engine = TapeEngine::builder()
///     .manual_feeder()
///     .speed_ramp_blocks(0)
///     .build()?;
///
/// engine.transport().play(1.0);
/// engine.process(&[0.0; 256], 256)?;
/// assert_eq!(engine.status().position, 256);
/// # Ok::<(), tapedeck::Error>(())
/// ```
pub struct TapeEngine {
    config: TapeConfig,
    transport: Option<TapeTransport>,
    handle: TransportHandle,
    tempo: Option<SharedTempo>,
    feeder: Feeder,
    meter: Arc<DeadlineMeter>,
}

impl TapeEngine {
    pub fn builder() -> TapeEngineBuilder {
        TapeEngineBuilder::default()
    }

    pub(crate) fn from_parts(
        config: TapeConfig,
        transport: TapeTransport,
        handle: TransportHandle,
        tempo: Option<SharedTempo>,
        feeder: Feeder,
    ) -> Self {
        let meter = Arc::clone(transport.meter());
        Self {
            config,
            transport: Some(transport),
            handle,
            tempo,
            feeder,
            meter,
        }
    }

    /// Control handle. Cheap to clone and safe to hand to other threads.
    pub fn transport(&self) -> TransportHandle {
        self.handle.clone()
    }

    /// State published after the most recent block.
    pub fn status(&self) -> StatusSnapshot {
        self.handle.status()
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    pub fn config(&self) -> &TapeConfig {
        &self.config
    }

    /// The built-in tempo map, or `None` when an external clock was given.
    pub fn tempo(&self) -> Option<&SharedTempo> {
        self.tempo.as_ref()
    }

    /// Replace the tempo from bar 0, keeping the current time signature and
    /// any later changes.
    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        let tempo = self.tempo.as_ref().ok_or_else(|| {
            Error::Core(tapedeck_core::Error::InvalidConfig(
                "engine uses an external bar clock".into(),
            ))
        })?;
        tempo.update(|map| {
            let time_signature = map.time_signature_at(0);
            map.set_change(0, bpm, time_signature)
        })?;
        tracing::info!(bpm, "Tempo changed");
        Ok(())
    }

    pub fn deadline_metrics(&self) -> DeadlineMetrics {
        self.meter.metrics()
    }

    pub fn meter(&self) -> &Arc<DeadlineMeter> {
        &self.meter
    }

    /// Hand the audio-thread side to a callback. Returns `None` if it has
    /// already been taken.
    pub fn take_processor(&mut self) -> Option<TapeTransport> {
        let transport = self.transport.take();
        if transport.is_some() {
            tracing::debug!("Transport processor taken");
        }
        transport
    }

    /// Run one block on the engine-owned transport.
    pub fn process(&mut self, input: &[f32], frames: usize) -> Result<&TrackBlock> {
        let transport = self.transport.as_mut().ok_or(Error::ProcessorTaken)?;
        Ok(transport.process(input, frames))
    }

    /// Allocate spare tape chunks now. Returns how many were added; always 0
    /// while the feeder runs on its own thread.
    pub fn top_up_chunks(&mut self) -> usize {
        match &mut self.feeder {
            Feeder::Manual(feeder) => feeder.top_up(),
            Feeder::Thread(_) => 0,
        }
    }

    pub fn has_feeder_thread(&self) -> bool {
        match &self.feeder {
            Feeder::Thread(thread) => thread.is_running(),
            Feeder::Manual(_) => false,
        }
    }
}
