//! Block deadline tracking for the audio callback.

use crate::lockfree::{AtomicFlag, AtomicFloat};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Deadline metrics snapshot. Loads are percentages of the block budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeadlineMetrics {
    pub average: f32,
    pub peak: f32,
    pub current: f32,
    pub misses: u64,
}

/// Times each block against its real-time budget (`frames / sample_rate`).
#[derive(Debug)]
pub struct DeadlineMeter {
    current: AtomicFloat,
    peak: AtomicFloat,
    average: AtomicFloat,
    misses: AtomicU64,
    blocks: AtomicU32,
    sample_rate: f64,
    enabled: AtomicFlag,
}

impl DeadlineMeter {
    pub fn new(sample_rate: f64, enabled: bool) -> Self {
        Self {
            current: AtomicFloat::new(0.0),
            peak: AtomicFloat::new(0.0),
            average: AtomicFloat::new(0.0),
            misses: AtomicU64::new(0),
            blocks: AtomicU32::new(0),
            sample_rate,
            enabled: AtomicFlag::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Record one block. Returns true if it missed its deadline.
    pub fn record(&self, frames: usize, elapsed: Duration) -> bool {
        if !self.is_enabled() || frames == 0 {
            return false;
        }

        let budget = frames as f64 / self.sample_rate;
        let load = (elapsed.as_secs_f64() / budget) as f32;

        self.current.set(load);
        if load > self.peak.get() {
            self.peak.set(load);
        }

        // Moving average, settling over the first 100 blocks
        let count = self.blocks.fetch_add(1, Ordering::Relaxed);
        let alpha = 1.0 / (count.min(100) + 1) as f32;
        let avg = self.average.get();
        self.average.set(avg * (1.0 - alpha) + load * alpha);

        let missed = elapsed.as_secs_f64() > budget;
        if missed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        missed
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn metrics(&self) -> DeadlineMetrics {
        DeadlineMetrics {
            average: self.average.get() * 100.0,
            peak: self.peak.get() * 100.0,
            current: self.current.get() * 100.0,
            misses: self.misses(),
        }
    }

    pub fn reset(&self) {
        self.current.set(0.0);
        self.peak.set(0.0);
        self.average.set(0.0);
        self.misses.store(0, Ordering::Relaxed);
        self.blocks.store(0, Ordering::Relaxed);
    }
}
