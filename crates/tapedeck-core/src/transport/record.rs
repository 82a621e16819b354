//! Record path: one input channel written to the active track.

use super::manager::TapeTransport;

impl TapeTransport {
    /// Write `input` to the active track along the current block trajectory.
    ///
    /// Only the first `frames` samples are used. Dropped writes (tape full,
    /// no storage ready) count as overruns and leave the record section alone.
    pub fn capture(&mut self, input: &[f32]) {
        if !self.plan.recording {
            return;
        }

        let track = self.plan.track;
        for (step, &sample) in self.plan.steps().iter().zip(input) {
            let position = step.position.round() as usize;
            if self.medium.write(track, position, sample * step.gain) {
                self.record_section = self.record_section.including(position);
            }
        }
    }
}
