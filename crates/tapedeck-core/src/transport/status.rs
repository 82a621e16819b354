//! Read-only transport state published by the audio thread.
//!
//! The audio thread writes every field once per block. Observers on other
//! threads (UI, control surfaces, tests) read them without locking. Single
//! field getters may mix blocks; [`TransportStatus::snapshot`] never does.

use super::fsm::PlayMode;
use super::section::Section;
use crate::lockfree::{AtomicFlag, AtomicFloat, AtomicSection};
use std::sync::atomic::{fence, AtomicU64, AtomicU8, AtomicUsize, Ordering};

#[derive(Debug)]
pub struct TransportStatus {
    /// Odd while a block is being published.
    sequence: AtomicU64,
    position: AtomicU64,
    mode: AtomicU8,
    current_speed: AtomicFloat,
    target_speed: AtomicFloat,
    gain: AtomicFloat,
    base_speed: AtomicFloat,
    active_track: AtomicUsize,
    recording: AtomicFlag,
    looping: AtomicFlag,
    enabled: AtomicFlag,
    loop_section: AtomicSection,
    record_section: AtomicSection,
    written_extent: AtomicU64,
    overruns: AtomicU64,
    dropped_commands: AtomicU64,
    blocks_processed: AtomicU64,
}

/// Plain copy of [`TransportStatus`] at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub position: usize,
    pub mode: PlayMode,
    pub current_speed: f32,
    pub target_speed: f32,
    pub gain: f32,
    pub base_speed: f32,
    pub active_track: usize,
    pub recording: bool,
    pub looping: bool,
    pub enabled: bool,
    pub loop_section: Section,
    pub record_section: Section,
    pub written_extent: usize,
    pub overruns: u64,
    pub dropped_commands: u64,
    pub blocks_processed: u64,
}

/// Everything the audio thread publishes after a block.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Publish {
    pub position: usize,
    pub mode: PlayMode,
    pub current_speed: f32,
    pub target_speed: f32,
    pub gain: f32,
    pub base_speed: f32,
    pub active_track: usize,
    pub recording: bool,
    pub looping: bool,
    pub enabled: bool,
    pub loop_section: Section,
    pub record_section: Section,
    pub written_extent: usize,
    pub overruns: u64,
}

impl TransportStatus {
    pub fn new(gain: f32, base_speed: f32) -> Self {
        Self {
            sequence: AtomicU64::new(0),
            position: AtomicU64::new(0),
            mode: AtomicU8::new(PlayMode::Stopped.to_u8()),
            current_speed: AtomicFloat::new(0.0),
            target_speed: AtomicFloat::new(0.0),
            gain: AtomicFloat::new(gain),
            base_speed: AtomicFloat::new(base_speed),
            active_track: AtomicUsize::new(0),
            recording: AtomicFlag::new(false),
            looping: AtomicFlag::new(false),
            enabled: AtomicFlag::new(true),
            loop_section: AtomicSection::default(),
            record_section: AtomicSection::default(),
            written_extent: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            dropped_commands: AtomicU64::new(0),
            blocks_processed: AtomicU64::new(0),
        }
    }

    pub(crate) fn publish(&self, state: &Publish) {
        let sequence = self.sequence.load(Ordering::Relaxed);
        self.sequence.store(sequence.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.position.store(state.position as u64, Ordering::Release);
        self.mode.store(state.mode.to_u8(), Ordering::Release);
        self.current_speed.set(state.current_speed);
        self.target_speed.set(state.target_speed);
        self.gain.set(state.gain);
        self.base_speed.set(state.base_speed);
        self.active_track.store(state.active_track, Ordering::Release);
        self.recording.set(state.recording);
        self.looping.set(state.looping);
        self.enabled.set(state.enabled);
        self.loop_section.set(state.loop_section);
        self.record_section.set(state.record_section);
        self.written_extent
            .store(state.written_extent as u64, Ordering::Release);
        self.overruns.store(state.overruns, Ordering::Release);
        self.blocks_processed.fetch_add(1, Ordering::AcqRel);

        self.sequence.store(sequence.wrapping_add(2), Ordering::Release);
    }

    pub(crate) fn count_dropped_command(&self) -> u64 {
        self.dropped_commands.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn position(&self) -> usize {
        self.position.load(Ordering::Acquire) as usize
    }

    pub fn mode(&self) -> PlayMode {
        PlayMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed.get()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.get()
    }

    pub fn is_looping(&self) -> bool {
        self.looping.get()
    }

    pub fn loop_section(&self) -> Section {
        self.loop_section.get()
    }

    pub fn record_section(&self) -> Section {
        self.record_section.get()
    }

    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Acquire)
    }

    pub fn dropped_commands(&self) -> u64 {
        self.dropped_commands.load(Ordering::Relaxed)
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed.load(Ordering::Acquire)
    }

    /// Every field as published by one and the same block. Retries while
    /// the audio thread is mid-publish.
    pub fn snapshot(&self) -> StatusSnapshot {
        let mut attempts = 0u32;
        loop {
            let before = self.sequence.load(Ordering::Acquire);
            if before % 2 == 0 {
                let snapshot = self.read_fields();
                fence(Ordering::Acquire);
                if self.sequence.load(Ordering::Relaxed) == before {
                    return snapshot;
                }
            }
            attempts += 1;
            if attempts % 64 == 0 {
                std::thread::yield_now();
            } else {
                std::hint::spin_loop();
            }
        }
    }

    fn read_fields(&self) -> StatusSnapshot {
        StatusSnapshot {
            position: self.position(),
            mode: self.mode(),
            current_speed: self.current_speed.get(),
            target_speed: self.target_speed.get(),
            gain: self.gain.get(),
            base_speed: self.base_speed.get(),
            active_track: self.active_track.load(Ordering::Acquire),
            recording: self.recording.get(),
            looping: self.looping.get(),
            enabled: self.enabled.get(),
            loop_section: self.loop_section.get(),
            record_section: self.record_section.get(),
            written_extent: self.written_extent.load(Ordering::Acquire) as usize,
            overruns: self.overruns(),
            dropped_commands: self.dropped_commands(),
            blocks_processed: self.blocks_processed(),
        }
    }
}

/// Samples until the playhead reaches `target` at `speed`.
///
/// `0` if already there, `i64::MAX` if the tape is not moving, negative if
/// the target lies behind the direction of travel.
pub fn time_until(position: usize, target: usize, speed: f32) -> i64 {
    if target == position {
        return 0;
    }
    if speed == 0.0 || speed.is_nan() {
        return i64::MAX;
    }
    let distance = target as f64 - position as f64;
    (distance / speed as f64).round() as i64
}

impl StatusSnapshot {
    pub fn stopped(&self) -> bool {
        self.mode == PlayMode::Stopped
    }

    pub fn playing(&self) -> bool {
        self.mode == PlayMode::Playing
    }

    pub fn spooling(&self) -> bool {
        self.mode == PlayMode::Spooling
    }

    pub fn time_until(&self, target: usize) -> i64 {
        time_until(self.position, target, self.current_speed)
    }
}
