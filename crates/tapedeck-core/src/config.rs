//! Tape transport configuration.

use crate::medium::CHUNK_FRAMES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest block the transport will preallocate for.
pub const MAX_BLOCK_FRAMES_LIMIT: usize = 8192;

/// Configuration for a [`TapeTransport`](crate::TapeTransport).
///
/// Everything that needs memory is sized here, up front, so the audio thread
/// never has to allocate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapeConfig {
    pub sample_rate: f64,
    /// Largest block `process`/`render` will be asked for.
    pub max_block_frames: usize,
    /// Hard tape length in frames. Writes at or past this are dropped.
    pub capacity_frames: usize,
    /// Chunks handed to the medium before the first block.
    pub preallocated_chunks: usize,
    /// Capacity of the spare-chunk ring the feeder keeps topped up.
    pub chunk_stock: usize,
    /// Capacity of the control -> audio command queue.
    pub command_capacity: usize,
    /// Blocks the speed ramp takes to reach a new target. 0 = immediate.
    pub speed_ramp_blocks: u32,
    /// Length of loop-wrap crossfades and of gain smoothing.
    pub crossfade_samples: usize,
    /// Count blocks that overrun their time budget.
    pub deadline_metering: bool,
}

impl Default for TapeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_frames: 512,
            capacity_frames: 48000 * 60 * 10,
            preallocated_chunks: 16,
            chunk_stock: 32,
            command_capacity: 256,
            speed_ramp_blocks: 24,
            crossfade_samples: 64,
            deadline_metering: true,
        }
    }
}

impl TapeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.max_block_frames == 0 || self.max_block_frames > MAX_BLOCK_FRAMES_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "max_block_frames {} out of range (1-{})",
                self.max_block_frames, MAX_BLOCK_FRAMES_LIMIT
            )));
        }
        if self.capacity_frames < CHUNK_FRAMES || self.capacity_frames > u32::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "capacity_frames {} out of range ({}-{})",
                self.capacity_frames,
                CHUNK_FRAMES,
                u32::MAX
            )));
        }
        if self.chunk_stock == 0 {
            return Err(Error::InvalidConfig("chunk_stock must be at least 1".into()));
        }
        if self.command_capacity == 0 {
            return Err(Error::InvalidConfig(
                "command_capacity must be at least 1".into(),
            ));
        }
        if self.crossfade_samples > self.max_block_frames {
            return Err(Error::InvalidConfig(format!(
                "crossfade_samples {} exceeds max_block_frames {}",
                self.crossfade_samples, self.max_block_frames
            )));
        }
        Ok(())
    }

    /// Number of chunk slots needed to cover the whole tape.
    pub fn chunk_slots(&self) -> usize {
        self.capacity_frames.div_ceil(CHUNK_FRAMES)
    }

    /// Wall-clock budget for a block of `frames`, in seconds.
    pub fn block_budget_secs(&self, frames: usize) -> f64 {
        frames as f64 / self.sample_rate
    }
}
