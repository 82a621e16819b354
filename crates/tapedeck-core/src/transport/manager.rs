//! Tape transport: state machine plus medium, driven one block at a time.
//!
//! A block runs in four steps, all on the audio thread:
//!
//! 1. [`begin_block`](TapeTransport::begin_block) drains queued commands,
//!    advances the speed ramp and latches the block's per-sample trajectory.
//! 2. [`render`](TapeTransport::render) reads the four tracks along it.
//! 3. [`capture`](TapeTransport::capture) writes input along the same path.
//! 4. [`finish_block`](TapeTransport::finish_block) moves the playhead to the
//!    trajectory end and publishes [`TransportStatus`].
//!
//! [`process`](TapeTransport::process) runs all four. Nothing here allocates,
//! blocks or logs once the transport is built.

use super::block::{BlockPlan, Step, TrackBlock};
use super::command::TransportCommand;
use super::crossfade::WrapCrossfade;
use super::fsm::{PlayMode, TransitionResult, TransportEvent, TransportFSM};
use super::handle::TransportHandle;
use super::section::Section;
use super::status::{time_until, Publish, TransportStatus};
use super::tempo_map::BarClock;
use crate::medium::TapeMedium;
use crate::metering::DeadlineMeter;
use crate::parameter::{BASE_SPEED_RANGE, GAIN_RANGE};
use crate::smooth::SmoothedValue;
use crate::stock::{chunk_stock, ChunkFeeder};
use crate::{Result, TapeConfig};
use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;
use std::time::Instant;

/// Everything [`TapeTransport::new`] hands back: the audio-thread side, the
/// control-thread handle and the feeder that keeps tape storage stocked.
pub struct TransportParts {
    pub transport: TapeTransport,
    pub handle: TransportHandle,
    pub feeder: ChunkFeeder,
}

pub struct TapeTransport {
    pub(super) fsm: TransportFSM,
    pub(super) medium: TapeMedium,
    pub(super) loop_section: Section,
    pub(super) record_section: Section,
    pub(super) plan: BlockPlan,
    pub(super) output: TrackBlock,
    gain: SmoothedValue,
    enabled: bool,
    crossfade: WrapCrossfade,
    in_block: bool,
    commands: Receiver<TransportCommand>,
    status: Arc<TransportStatus>,
    clock: Arc<dyn BarClock>,
    meter: Arc<DeadlineMeter>,
    max_block_frames: usize,
    /// Overruns not caused by the medium: oversized or late blocks.
    block_overruns: u64,
}

impl TapeTransport {
    pub fn new(config: TapeConfig, clock: Arc<dyn BarClock>) -> Result<TransportParts> {
        config.validate()?;

        let (feeder, stock) = chunk_stock(&config);
        let (command_tx, command_rx) = bounded(config.command_capacity);
        let status = Arc::new(TransportStatus::new(
            GAIN_RANGE.default,
            BASE_SPEED_RANGE.default,
        ));

        tracing::debug!(
            sample_rate = config.sample_rate,
            capacity_frames = config.capacity_frames,
            max_block_frames = config.max_block_frames,
            preallocated_chunks = config.preallocated_chunks,
            "Creating tape transport"
        );

        let transport = Self {
            fsm: TransportFSM::new(config.speed_ramp_blocks),
            medium: TapeMedium::new(config.capacity_frames, stock),
            loop_section: Section::at(0),
            record_section: Section::at(0),
            plan: BlockPlan::new(config.max_block_frames),
            output: TrackBlock::new(config.max_block_frames),
            gain: SmoothedValue::new(GAIN_RANGE.default, config.crossfade_samples),
            enabled: true,
            crossfade: WrapCrossfade::new(config.crossfade_samples),
            in_block: false,
            commands: command_rx,
            status: Arc::clone(&status),
            clock,
            meter: Arc::new(DeadlineMeter::new(
                config.sample_rate,
                config.deadline_metering,
            )),
            max_block_frames: config.max_block_frames,
            block_overruns: 0,
        };

        Ok(TransportParts {
            transport,
            handle: TransportHandle::new(command_tx, status),
            feeder,
        })
    }

    // =========================================================================
    // Block lifecycle
    // =========================================================================

    /// Render one block of tape output and record `input` into it.
    pub fn process(&mut self, input: &[f32], frames: usize) -> &TrackBlock {
        let started = self.meter.is_enabled().then(Instant::now);

        self.begin_block(frames);
        self.render();
        self.capture(input);

        if let Some(started) = started {
            if self.meter.record(self.plan.frames, started.elapsed()) {
                self.block_overruns += 1;
            }
        }

        self.finish_block();
        &self.output
    }

    /// Start a block of `frames` samples. Blocks longer than the configured
    /// maximum are cut short and counted as an overrun.
    pub fn begin_block(&mut self, frames: usize) {
        if self.in_block {
            self.finish_block();
        }
        self.drain_commands();

        let frames = if frames > self.max_block_frames {
            self.block_overruns += 1;
            self.max_block_frames
        } else {
            frames
        };

        let (from, to) = self.fsm.advance_speed();
        let moving = self.fsm.do_tape_ops();
        let wrap_section = (self.fsm.do_loop() && !self.loop_section.is_empty())
            .then_some(self.loop_section);
        let capacity = self.medium.capacity() as f64;

        let mut position = self.medium.playhead();
        let mut wrapped = false;

        for i in 0..frames {
            let (fade_in, fade_offset) = self.crossfade.next();
            self.plan.steps[i] = Step {
                position,
                gain: self.gain.next_sample(),
                fade_in,
                fade_offset,
            };

            if !moving {
                continue;
            }

            // Speed moves linearly across the block, ending on the ramped value.
            let speed = from + (to - from) * (i + 1) as f32 / frames as f32;
            let next = (position + speed as f64).clamp(0.0, capacity);

            position = match wrap_section {
                Some(section) => {
                    let landed = wrap(section, position, next);
                    if landed != next {
                        self.crossfade.start(next - landed);
                        wrapped = true;
                    }
                    landed
                }
                None => next,
            };
        }

        self.plan.frames = frames;
        self.plan.end = position;
        self.plan.play_audio = self.enabled && self.fsm.do_play_audio();
        self.plan.recording = self.enabled && self.fsm.recording();
        self.plan.track = self.fsm.active_track();
        self.plan.wrapped = wrapped;

        self.output.prepare(frames);
        self.in_block = true;
    }

    /// Commit the block: move the playhead and publish status.
    pub fn finish_block(&mut self) {
        if !self.in_block {
            return;
        }
        self.in_block = false;
        self.medium.set_playhead(self.plan.end);
        self.publish();
    }

    /// Apply every queued command. Called from [`begin_block`](Self::begin_block).
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    /// Apply one command now. Returns false if its gate was closed.
    pub fn apply(&mut self, command: TransportCommand) -> bool {
        use TransportCommand::*;

        match command {
            Play(speed) => self.play(speed),
            Spool(speed) => self.spool(speed),
            Stop => self.stop(),
            StartRecord => self.start_record(),
            StopRecord => self.stop_record(),
            SelectTrack(track) => self.select_track(track),
            SetLooping(looping) => self.set_looping(looping),
            ToggleLooping => self.toggle_looping(),
            MarkLoopIn => self.mark_loop_in(),
            MarkLoopOut => self.mark_loop_out(),
            GoToLoopIn => self.go_to_loop_in(),
            GoToLoopOut => self.go_to_loop_out(),
            GoToBar(bar) => self.go_to_bar(bar),
            GoToBarRel(delta) => self.go_to_bar_rel(delta),
            Seek(position) => self.seek(position),
            SetGain(gain) => self.set_gain(gain),
            SetBaseSpeed(base) => self.set_base_speed(base),
            SetEnabled(enabled) => self.set_enabled(enabled),
        }
    }

    fn publish(&self) {
        self.status.publish(&Publish {
            position: self.medium.position(),
            mode: self.fsm.mode(),
            current_speed: self.fsm.current_speed(),
            target_speed: self.fsm.target_speed(),
            gain: self.gain.target(),
            base_speed: self.fsm.base_speed(),
            active_track: self.fsm.active_track(),
            recording: self.fsm.recording(),
            looping: self.fsm.looping(),
            enabled: self.enabled,
            loop_section: self.loop_section,
            record_section: self.record_section,
            written_extent: self.medium.written_extent(),
            overruns: self.overrun_count(),
        });
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn transition(&mut self, event: TransportEvent) -> TransitionResult {
        self.fsm.transition(event)
    }

    pub fn play(&mut self, speed: f32) -> bool {
        !self.transition(TransportEvent::Play(speed)).is_none()
    }

    pub fn spool(&mut self, speed: f32) -> bool {
        !self.transition(TransportEvent::Spool(speed)).is_none()
    }

    /// Hard stop. An open recording pass is closed at the playhead.
    pub fn stop(&mut self) -> bool {
        let was_recording = self.fsm.recording();
        let result = self.transition(TransportEvent::Stop);
        if was_recording {
            self.record_section = self.record_section.reaching(self.position());
        }
        self.crossfade.reset();
        !result.is_none()
    }

    /// Punch in at the playhead.
    pub fn start_record(&mut self) -> bool {
        match self.transition(TransportEvent::StartRecord) {
            TransitionResult::RecordChanged(true) => {
                self.record_section = Section::at(self.position());
                true
            }
            _ => false,
        }
    }

    /// Punch out at the playhead.
    pub fn stop_record(&mut self) -> bool {
        if self.transition(TransportEvent::StopRecord).is_none() {
            return false;
        }
        self.record_section = self.record_section.reaching(self.position());
        true
    }

    pub fn select_track(&mut self, track: usize) -> bool {
        !self.transition(TransportEvent::SelectTrack(track)).is_none()
    }

    pub fn set_looping(&mut self, looping: bool) -> bool {
        !self.transition(TransportEvent::SetLooping(looping)).is_none()
    }

    pub fn toggle_looping(&mut self) -> bool {
        !self.transition(TransportEvent::ToggleLooping).is_none()
    }

    pub fn set_base_speed(&mut self, base: f32) -> bool {
        if base.is_nan() {
            return false;
        }
        self.transition(TransportEvent::SetBaseSpeed(BASE_SPEED_RANGE.clamp(base)));
        true
    }

    pub fn set_gain(&mut self, gain: f32) -> bool {
        if gain.is_nan() {
            return false;
        }
        self.gain.set_target(GAIN_RANGE.clamp(gain));
        true
    }

    /// A disabled transport keeps moving tape but renders silence and
    /// records nothing.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        self.enabled = enabled;
        true
    }

    // =========================================================================
    // Loop & navigation
    // =========================================================================

    /// Loop in point at the playhead. An out point behind it moves along.
    pub fn mark_loop_in(&mut self) -> bool {
        self.loop_section = self.loop_section.with_start(self.position());
        true
    }

    /// Loop out point at the playhead. An in point ahead of it moves along.
    pub fn mark_loop_out(&mut self) -> bool {
        self.loop_section = self.loop_section.with_end(self.position());
        true
    }

    pub fn go_to_loop_in(&mut self) -> bool {
        self.locate(self.loop_section.start())
    }

    pub fn go_to_loop_out(&mut self) -> bool {
        self.locate(self.loop_section.end())
    }

    pub fn go_to_bar(&mut self, bar: usize) -> bool {
        if !self.fsm.do_jumps() {
            return false;
        }
        let position = self.bar_position(bar);
        self.locate(position)
    }

    /// Move `delta` bars from the bar under the playhead; never before bar 0.
    pub fn go_to_bar_rel(&mut self, delta: i64) -> bool {
        if !self.fsm.do_jumps() {
            return false;
        }
        let current = i64::try_from(self.clock.bar_at(self.position())).unwrap_or(i64::MAX);
        let target = current.saturating_add(delta).max(0);
        let bar = usize::try_from(target).unwrap_or(usize::MAX);
        let position = self.bar_position(bar);
        self.locate(position)
    }

    /// Start of `bar`, looked up no further than the end of the tape.
    fn bar_position(&self, bar: usize) -> usize {
        self.clock
            .bar_start_within(bar, self.medium.capacity())
            .min(self.medium.capacity())
    }

    pub fn seek(&mut self, position: usize) -> bool {
        self.locate(position)
    }

    fn locate(&mut self, position: usize) -> bool {
        if !self.fsm.do_jumps() {
            return false;
        }
        self.medium.seek(position);
        self.crossfade.reset();
        if self.in_block {
            self.plan.end = self.medium.playhead();
        }
        true
    }

    /// Samples until the playhead reaches `target` at the current speed.
    /// `i64::MAX` when stationary and not already there.
    pub fn time_until(&self, target: usize) -> i64 {
        time_until(self.position(), target, self.fsm.current_speed())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn position(&self) -> usize {
        self.medium.position()
    }

    pub fn mode(&self) -> PlayMode {
        self.fsm.mode()
    }

    pub fn state(&self) -> &TransportFSM {
        &self.fsm
    }

    pub fn medium(&self) -> &TapeMedium {
        &self.medium
    }

    pub fn loop_section(&self) -> Section {
        self.loop_section
    }

    pub fn record_section(&self) -> Section {
        self.record_section
    }

    pub fn gain(&self) -> f32 {
        self.gain.target()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Dropped writes plus late or oversized blocks.
    pub fn overrun_count(&self) -> u64 {
        self.medium.overruns() + self.block_overruns
    }

    /// Output of the last rendered block.
    pub fn output(&self) -> &TrackBlock {
        &self.output
    }

    /// True if the last block's trajectory wrapped at the loop bounds.
    pub fn wrapped_last_block(&self) -> bool {
        self.plan.wrapped
    }

    pub fn status(&self) -> &Arc<TransportStatus> {
        &self.status
    }

    pub fn meter(&self) -> &Arc<DeadlineMeter> {
        &self.meter
    }

    pub fn clock(&self) -> &Arc<dyn BarClock> {
        &self.clock
    }
}

/// Fold a step that crossed the loop bounds back into `[start, end)`.
fn wrap(section: Section, previous: f64, next: f64) -> f64 {
    let start = section.start() as f64;
    let end = section.end() as f64;

    let crossed_end = previous < end && next >= end;
    let crossed_start = previous >= start && next < start;
    if !(crossed_end || crossed_start) {
        return next;
    }

    let landed = start + (next - start).rem_euclid(end - start);
    if landed >= end {
        start
    } else {
        landed
    }
}
