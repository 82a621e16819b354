//! Transport state machine.
//!
//! Owns the play mode, the speed ramp, the active track and the record and
//! loop flags. It knows nothing about tape position or storage; the
//! [`TapeTransport`](super::TapeTransport) combines it with the medium.
//!
//! Every transition is gated by one of the `do_*` predicates. A transition
//! whose gate is closed leaves the state untouched and returns
//! [`TransitionResult::None`].

use crate::medium::TRACKS;
use crate::smooth::SpeedRamp;

/// Largest speed magnitude the tape will ever run at.
pub const MAX_SPEED: f32 = 5.0;

/// Default shuttle speed for [`TransportEvent::Spool`].
pub const DEFAULT_SPOOL_SPEED: f32 = MAX_SPEED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Stopped,
    Playing,
    Spooling,
}

impl PlayMode {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            PlayMode::Stopped => 0,
            PlayMode::Playing => 1,
            PlayMode::Spooling => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => PlayMode::Playing,
            2 => PlayMode::Spooling,
            _ => PlayMode::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    Play(f32),
    Spool(f32),
    Stop,
    StartRecord,
    StopRecord,
    SelectTrack(usize),
    SetLooping(bool),
    ToggleLooping,
    SetBaseSpeed(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionResult {
    None,
    ModeChanged(PlayMode),
    /// Mode unchanged, new speed target.
    Retargeted(f32),
    RecordChanged(bool),
    TrackChanged(usize),
    LoopModeChanged(bool),
}

impl TransitionResult {
    pub fn is_none(&self) -> bool {
        matches!(self, TransitionResult::None)
    }
}

pub struct TransportFSM {
    mode: PlayMode,
    ramp: SpeedRamp,
    previous_speed: f32,
    /// Speed last passed to `play`, before `base_speed` is applied.
    requested_speed: f32,
    base_speed: f32,
    active_track: usize,
    record_armed: bool,
    was_recording: bool,
    looping: bool,
}

fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(-MAX_SPEED, MAX_SPEED)
}

impl TransportFSM {
    pub fn new(ramp_blocks: u32) -> Self {
        Self {
            mode: PlayMode::Stopped,
            ramp: SpeedRamp::new(ramp_blocks),
            previous_speed: 0.0,
            requested_speed: 1.0,
            base_speed: 1.0,
            active_track: 0,
            record_armed: false,
            was_recording: false,
            looping: false,
        }
    }

    pub fn transition(&mut self, event: TransportEvent) -> TransitionResult {
        use TransportEvent::*;

        match event {
            Play(speed) => {
                if speed.is_nan() {
                    return TransitionResult::None;
                }
                self.requested_speed = speed;
                self.previous_speed = self.ramp.current();
                self.ramp.set_target(clamp_speed(speed * self.base_speed));
                if self.mode == PlayMode::Playing {
                    TransitionResult::Retargeted(self.ramp.target())
                } else {
                    self.mode = PlayMode::Playing;
                    TransitionResult::ModeChanged(PlayMode::Playing)
                }
            }

            Spool(speed) => {
                if !self.do_start_spool() || speed.is_nan() {
                    return TransitionResult::None;
                }
                self.previous_speed = self.ramp.current();
                self.ramp.set_target(clamp_speed(speed));
                if self.mode == PlayMode::Spooling {
                    TransitionResult::Retargeted(self.ramp.target())
                } else {
                    self.mode = PlayMode::Spooling;
                    TransitionResult::ModeChanged(PlayMode::Spooling)
                }
            }

            Stop => {
                let was_moving = self.mode != PlayMode::Stopped || self.ramp.current() != 0.0;
                let was_armed = self.record_armed;
                self.previous_speed = self.ramp.current();
                self.ramp.set_immediate(0.0);
                self.mode = PlayMode::Stopped;
                if was_armed {
                    self.record_armed = false;
                    self.was_recording = true;
                }
                if was_moving || was_armed {
                    TransitionResult::ModeChanged(PlayMode::Stopped)
                } else {
                    TransitionResult::None
                }
            }

            StartRecord => {
                if !self.do_start_rec() {
                    return TransitionResult::None;
                }
                self.record_armed = true;
                self.was_recording = false;
                TransitionResult::RecordChanged(true)
            }

            StopRecord => {
                if !self.record_armed {
                    return TransitionResult::None;
                }
                self.record_armed = false;
                self.was_recording = true;
                TransitionResult::RecordChanged(false)
            }

            SelectTrack(track) => {
                if !self.do_switch_tracks() || track >= TRACKS || track == self.active_track {
                    return TransitionResult::None;
                }
                self.active_track = track;
                TransitionResult::TrackChanged(track)
            }

            SetLooping(looping) => {
                if self.looping == looping {
                    return TransitionResult::None;
                }
                self.looping = looping;
                TransitionResult::LoopModeChanged(looping)
            }

            ToggleLooping => {
                self.looping = !self.looping;
                TransitionResult::LoopModeChanged(self.looping)
            }

            SetBaseSpeed(base) => {
                if base.is_nan() {
                    return TransitionResult::None;
                }
                self.base_speed = base;
                if self.mode != PlayMode::Playing {
                    return TransitionResult::None;
                }
                let target = clamp_speed(self.requested_speed * base);
                if target == self.ramp.target() {
                    return TransitionResult::None;
                }
                self.previous_speed = self.ramp.current();
                self.ramp.set_target(target);
                TransitionResult::Retargeted(target)
            }
        }
    }

    /// Per-block speed update. Returns `(speed at block start, speed at
    /// block end)`.
    #[inline]
    pub fn advance_speed(&mut self) -> (f32, f32) {
        let from = self.ramp.current();
        let to = self.ramp.next_block();
        (from, to)
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Tracks may only change while nothing reads or writes the medium.
    #[inline]
    pub fn do_switch_tracks(&self) -> bool {
        self.mode == PlayMode::Stopped
    }

    /// The playhead is moving.
    #[inline]
    pub fn do_tape_ops(&self) -> bool {
        self.mode != PlayMode::Stopped
    }

    #[inline]
    pub fn do_play_audio(&self) -> bool {
        self.mode == PlayMode::Playing
    }

    #[inline]
    pub fn do_ease_in(&self) -> bool {
        self.mode == PlayMode::Playing && self.ramp.current() != self.ramp.target()
    }

    #[inline]
    pub fn do_start_rec(&self) -> bool {
        self.mode == PlayMode::Playing && !self.record_armed
    }

    #[inline]
    pub fn do_start_spool(&self) -> bool {
        !self.record_armed
    }

    #[inline]
    pub fn do_loop(&self) -> bool {
        self.looping && self.do_play_audio()
    }

    /// Locates are only allowed while the tape is not rolling.
    #[inline]
    pub fn do_jumps(&self) -> bool {
        self.mode == PlayMode::Stopped
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    #[inline]
    pub fn playing(&self) -> bool {
        self.mode == PlayMode::Playing
    }

    #[inline]
    pub fn spooling(&self) -> bool {
        self.mode == PlayMode::Spooling
    }

    #[inline]
    pub fn stopped(&self) -> bool {
        self.mode == PlayMode::Stopped
    }

    #[inline]
    pub fn fwd(&self) -> bool {
        self.ramp.current() > 0.0
    }

    #[inline]
    pub fn bwd(&self) -> bool {
        self.ramp.current() < 0.0
    }

    #[inline]
    pub fn recording(&self) -> bool {
        self.record_armed
    }

    /// True once a recording pass has been closed and no new one opened.
    #[inline]
    pub fn was_recording(&self) -> bool {
        self.was_recording
    }

    #[inline]
    pub fn looping(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn active_track(&self) -> usize {
        self.active_track
    }

    #[inline]
    pub fn current_speed(&self) -> f32 {
        self.ramp.current()
    }

    #[inline]
    pub fn target_speed(&self) -> f32 {
        self.ramp.target()
    }

    #[inline]
    pub fn previous_speed(&self) -> f32 {
        self.previous_speed
    }

    #[inline]
    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }
}

impl Default for TransportFSM {
    fn default() -> Self {
        Self::new(0)
    }
}
