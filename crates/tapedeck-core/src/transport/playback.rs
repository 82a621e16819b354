//! Playback path: four tracks read along the block trajectory.

use super::block::TrackBlock;
use super::manager::TapeTransport;
use crate::medium::TRACKS;

impl TapeTransport {
    /// Render the current block. Silent unless the transport is playing and
    /// enabled; spooling moves tape without sound.
    pub fn render(&mut self) -> &TrackBlock {
        if !self.plan.play_audio {
            self.output.silence();
            return &self.output;
        }

        for (i, step) in self.plan.steps().iter().enumerate() {
            for track in 0..TRACKS {
                let mut value = self.medium.read(track, step.position);
                if step.fade_in < 1.0 {
                    let outgoing = self.medium.read(track, step.position + step.fade_offset);
                    value = value * step.fade_in + outgoing * (1.0 - step.fade_in);
                }
                self.output.set(track, i, value * step.gain);
            }
        }

        &self.output
    }
}
