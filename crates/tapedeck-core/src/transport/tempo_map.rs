//! Bar clock: the mapping from musical bars to tape frames.
//!
//! Navigation only needs one question answered, "how many frames long is
//! bar `n`?". [`BarClock`] is that question. [`TempoMap`] answers it for a
//! tempo and time signature that may change at bar boundaries, and
//! [`SharedTempo`] lets a control thread swap in a new map while the audio
//! thread keeps reading without locks.

use crate::{Error, Result};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Source of bar lengths in frames.
pub trait BarClock: Send + Sync {
    fn samples_per_bar(&self, bar: usize) -> usize;

    /// First frame of `bar`. Saturates at `usize::MAX`.
    fn bar_start(&self, bar: usize) -> usize {
        self.bar_start_within(bar, usize::MAX)
    }

    /// First frame of `bar`, or some frame at or past `limit` if the bar
    /// starts there. Walks at most one bar per `samples_per_bar` frames
    /// below `limit`.
    fn bar_start_within(&self, bar: usize, limit: usize) -> usize {
        let mut start = 0usize;
        for b in 0..bar {
            if start >= limit {
                break;
            }
            let len = self.samples_per_bar(b);
            if len == 0 {
                break;
            }
            start = start.saturating_add(len);
        }
        start
    }

    /// Bar containing `position`. Walks at most one bar per
    /// `samples_per_bar` frames up to `position`.
    fn bar_at(&self, position: usize) -> usize {
        let mut bar = 0;
        let mut start = 0usize;
        loop {
            let len = self.samples_per_bar(bar);
            if len == 0 {
                return bar;
            }
            start = start.saturating_add(len);
            if start > position || start == usize::MAX {
                return bar;
            }
            bar += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Quarter-note beats per bar.
    #[inline]
    pub fn beats_per_bar(&self) -> f64 {
        self.numerator as f64 * 4.0 / self.denominator as f64
    }

    pub fn validate(&self) -> Result<()> {
        let ok = (1..=64).contains(&self.numerator)
            && (1..=64).contains(&self.denominator)
            && self.denominator.is_power_of_two();
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidTimeSignature {
                numerator: self.numerator,
                denominator: self.denominator,
            })
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

fn validate_bpm(bpm: f64) -> Result<()> {
    if (20.0..=999.0).contains(&bpm) {
        Ok(())
    } else {
        Err(Error::InvalidTempo(bpm))
    }
}

/// Tempo and metre from a given bar onwards.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    bar: usize,
    bpm: f64,
    time_signature: TimeSignature,
    /// Frames per bar, cached.
    bar_frames: usize,
}

impl TempoSegment {
    fn new(bar: usize, bpm: f64, time_signature: TimeSignature, sample_rate: f64) -> Self {
        let seconds = 60.0 / bpm * time_signature.beats_per_bar();
        Self {
            bar,
            bpm,
            time_signature,
            bar_frames: (seconds * sample_rate).round().max(1.0) as usize,
        }
    }
}

/// Piecewise-constant tempo map. Changes take effect at bar boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    /// Sorted by bar; the first segment always starts at bar 0.
    segments: Vec<TempoSegment>,
    sample_rate: f64,
}

impl TempoMap {
    pub fn new(bpm: f64, time_signature: TimeSignature, sample_rate: f64) -> Result<Self> {
        validate_bpm(bpm)?;
        time_signature.validate()?;
        if !(sample_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate must be positive, got {sample_rate}"
            )));
        }
        Ok(Self {
            segments: vec![TempoSegment::new(0, bpm, time_signature, sample_rate)],
            sample_rate,
        })
    }

    /// Change tempo and metre from `bar` onwards. A change at an existing
    /// change point replaces it.
    pub fn set_change(&mut self, bar: usize, bpm: f64, time_signature: TimeSignature) -> Result<()> {
        validate_bpm(bpm)?;
        time_signature.validate()?;

        let segment = TempoSegment::new(bar, bpm, time_signature, self.sample_rate);
        match self.segments.binary_search_by_key(&bar, |s| s.bar) {
            Ok(index) => self.segments[index] = segment,
            Err(index) => self.segments.insert(index, segment),
        }
        Ok(())
    }

    /// Builder form of [`set_change`](Self::set_change).
    pub fn with_change(mut self, bar: usize, bpm: f64, time_signature: TimeSignature) -> Result<Self> {
        self.set_change(bar, bpm, time_signature)?;
        Ok(self)
    }

    /// Drop every change after bar 0.
    pub fn clear_changes(&mut self) {
        self.segments.truncate(1);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn tempo_at(&self, bar: usize) -> f64 {
        self.segment(bar).bpm
    }

    pub fn time_signature_at(&self, bar: usize) -> TimeSignature {
        self.segment(bar).time_signature
    }

    fn segment_index(&self, bar: usize) -> usize {
        match self.segments.binary_search_by_key(&bar, |s| s.bar) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        }
    }

    fn segment(&self, bar: usize) -> &TempoSegment {
        &self.segments[self.segment_index(bar)]
    }
}

impl BarClock for TempoMap {
    #[inline]
    fn samples_per_bar(&self, bar: usize) -> usize {
        self.segment(bar).bar_frames
    }

    fn bar_start(&self, bar: usize) -> usize {
        let mut start = 0usize;
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.bar >= bar {
                break;
            }
            let segment_end = self.segments.get(i + 1).map_or(bar, |next| next.bar.min(bar));
            let bars = segment_end - segment.bar;
            start = start.saturating_add(bars.saturating_mul(segment.bar_frames));
        }
        start
    }

    fn bar_start_within(&self, bar: usize, _limit: usize) -> usize {
        self.bar_start(bar)
    }

    fn bar_at(&self, position: usize) -> usize {
        let mut start = 0usize;
        for (i, segment) in self.segments.iter().enumerate() {
            let next = self.segments.get(i + 1);
            let length = next.map(|n| (n.bar - segment.bar).saturating_mul(segment.bar_frames));
            match length {
                Some(length) if position >= start.saturating_add(length) => {
                    start = start.saturating_add(length);
                }
                _ => return segment.bar + (position - start) / segment.bar_frames,
            }
        }
        0
    }
}

/// A [`TempoMap`] that can be replaced from one thread while another reads it.
#[derive(Clone)]
pub struct SharedTempo {
    map: Arc<ArcSwap<TempoMap>>,
}

impl SharedTempo {
    pub fn new(map: TempoMap) -> Self {
        Self {
            map: Arc::new(ArcSwap::from_pointee(map)),
        }
    }

    /// Current map.
    pub fn load(&self) -> Arc<TempoMap> {
        self.map.load_full()
    }

    /// Publish a replacement map. Readers see either the old or the new map.
    pub fn publish(&self, map: TempoMap) {
        tracing::debug!(
            bpm = map.tempo_at(0),
            changes = map.segments.len() - 1,
            "Publishing tempo map"
        );
        self.map.store(Arc::new(map));
    }

    /// Edit a copy of the current map and publish it.
    pub fn update<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut TempoMap) -> Result<()>,
    {
        let mut map = TempoMap::clone(&self.map.load());
        edit(&mut map)?;
        self.publish(map);
        Ok(())
    }
}

impl BarClock for SharedTempo {
    #[inline]
    fn samples_per_bar(&self, bar: usize) -> usize {
        self.map.load().samples_per_bar(bar)
    }

    fn bar_start(&self, bar: usize) -> usize {
        self.map.load().bar_start(bar)
    }

    fn bar_start_within(&self, bar: usize, limit: usize) -> usize {
        self.map.load().bar_start_within(bar, limit)
    }

    fn bar_at(&self, position: usize) -> usize {
        self.map.load().bar_at(position)
    }
}

impl std::fmt::Debug for SharedTempo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTempo")
            .field("map", &*self.map.load())
            .finish()
    }
}
