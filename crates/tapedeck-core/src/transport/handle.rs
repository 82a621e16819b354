//! Control-thread handle for the tape transport.

use super::command::TransportCommand;
use super::fsm::{PlayMode, DEFAULT_SPOOL_SPEED};
use super::section::Section;
use super::status::{StatusSnapshot, TransportStatus};
use crate::parameter::{BASE_SPEED_RANGE, GAIN_RANGE};
use crossbeam_channel::{Sender, TrySendError};
use std::sync::Arc;

/// Fluent handle for transport control.
///
/// Commands are queued and applied by the audio thread at the start of its
/// next block, so every command sees a consistent transport state. Whether a
/// command took effect shows up in [`status`](Self::status) after that block.
///
/// # Example
/// ```ignore
/// engine.transport()
///     .select_track(2)
///     .go_to_bar(4)
///     .play(1.0)
///     .start_record();
/// ```
#[derive(Clone)]
pub struct TransportHandle {
    commands: Sender<TransportCommand>,
    status: Arc<TransportStatus>,
}

impl TransportHandle {
    pub(crate) fn new(commands: Sender<TransportCommand>, status: Arc<TransportStatus>) -> Self {
        Self { commands, status }
    }

    /// Queue a command. Returns false if the queue was full or the transport
    /// has been dropped; the command is discarded and counted.
    pub fn send(&self, command: TransportCommand) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => {
                tracing::trace!(?command, "Queued transport command");
                true
            }
            Err(TrySendError::Full(command)) => {
                let dropped = self.status.count_dropped_command();
                tracing::warn!(?command, dropped, "Transport command queue full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(command)) => {
                self.status.count_dropped_command();
                tracing::warn!(?command, "Transport is gone, dropping command");
                false
            }
        }
    }

    /// Play at `speed` times the base speed.
    pub fn play(self, speed: f32) -> Self {
        self.send(TransportCommand::Play(speed));
        self
    }

    /// Shuttle at `speed`, silently. Rejected while recording.
    pub fn spool(self, speed: f32) -> Self {
        self.send(TransportCommand::Spool(speed));
        self
    }

    /// Fast forward at full shuttle speed.
    pub fn fast_forward(self) -> Self {
        self.spool(DEFAULT_SPOOL_SPEED)
    }

    /// Rewind at full shuttle speed.
    pub fn rewind(self) -> Self {
        self.spool(-DEFAULT_SPOOL_SPEED)
    }

    pub fn stop(self) -> Self {
        self.send(TransportCommand::Stop);
        self
    }

    pub fn start_record(self) -> Self {
        self.send(TransportCommand::StartRecord);
        self
    }

    pub fn stop_record(self) -> Self {
        self.send(TransportCommand::StopRecord);
        self
    }

    pub fn select_track(self, track: usize) -> Self {
        self.send(TransportCommand::SelectTrack(track));
        self
    }

    pub fn enable_loop(self) -> Self {
        self.send(TransportCommand::SetLooping(true));
        self
    }

    pub fn disable_loop(self) -> Self {
        self.send(TransportCommand::SetLooping(false));
        self
    }

    pub fn toggle_loop(self) -> Self {
        self.send(TransportCommand::ToggleLooping);
        self
    }

    pub fn mark_loop_in(self) -> Self {
        self.send(TransportCommand::MarkLoopIn);
        self
    }

    pub fn mark_loop_out(self) -> Self {
        self.send(TransportCommand::MarkLoopOut);
        self
    }

    pub fn go_to_loop_in(self) -> Self {
        self.send(TransportCommand::GoToLoopIn);
        self
    }

    pub fn go_to_loop_out(self) -> Self {
        self.send(TransportCommand::GoToLoopOut);
        self
    }

    pub fn go_to_bar(self, bar: usize) -> Self {
        self.send(TransportCommand::GoToBar(bar));
        self
    }

    pub fn go_to_bar_rel(self, delta: i64) -> Self {
        self.send(TransportCommand::GoToBarRel(delta));
        self
    }

    pub fn seek(self, position: usize) -> Self {
        self.send(TransportCommand::Seek(position));
        self
    }

    /// Output and record gain, snapped to the 0.01 grid of `0..1`.
    pub fn set_gain(self, gain: f32) -> Self {
        self.send(TransportCommand::SetGain(GAIN_RANGE.snap(gain)));
        self
    }

    /// Nominal speed multiplier, snapped to the 0.01 grid of `-2..2`.
    pub fn set_base_speed(self, base: f32) -> Self {
        self.send(TransportCommand::SetBaseSpeed(BASE_SPEED_RANGE.snap(base)));
        self
    }

    pub fn set_enabled(self, enabled: bool) -> Self {
        self.send(TransportCommand::SetEnabled(enabled));
        self
    }

    // =========================================================================
    // Published state
    // =========================================================================

    /// State as of the last completed block.
    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    pub fn position(&self) -> usize {
        self.status.position()
    }

    pub fn mode(&self) -> PlayMode {
        self.status.mode()
    }

    pub fn is_recording(&self) -> bool {
        self.status.is_recording()
    }

    pub fn loop_section(&self) -> Section {
        self.status.loop_section()
    }

    pub fn record_section(&self) -> Section {
        self.status.record_section()
    }

    pub fn overruns(&self) -> u64 {
        self.status.overruns()
    }

    pub fn time_until(&self, target: usize) -> i64 {
        self.status.snapshot().time_until(target)
    }

    pub fn shared_status(&self) -> &Arc<TransportStatus> {
        &self.status
    }
}
