//! Per-block buffers: the rendered track output and the latched block plan.

use crate::medium::TRACKS;

/// Four channels of rendered tape output, track 0 first.
///
/// Buffers are sized once for the largest block; only the first
/// [`frames`](Self::frames) samples of each channel belong to the last block.
#[derive(Debug, Clone)]
pub struct TrackBlock {
    channels: [Vec<f32>; TRACKS],
    frames: usize,
}

impl TrackBlock {
    pub fn new(max_frames: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| vec![0.0; max_frames]),
            frames: 0,
        }
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// One track of the last block. Out-of-range tracks yield an empty slice.
    #[inline]
    pub fn channel(&self, track: usize) -> &[f32] {
        match self.channels.get(track) {
            Some(channel) => &channel[..self.frames],
            None => &[],
        }
    }

    /// Samples of every track at one frame of the block.
    pub fn frame(&self, index: usize) -> Option<[f32; TRACKS]> {
        (index < self.frames).then(|| std::array::from_fn(|ch| self.channels[ch][index]))
    }

    pub fn is_silent(&self) -> bool {
        (0..TRACKS).all(|ch| self.channel(ch).iter().all(|&s| s == 0.0))
    }

    pub(crate) fn prepare(&mut self, frames: usize) {
        self.frames = frames;
    }

    pub(crate) fn silence(&mut self) {
        let frames = self.frames;
        for channel in &mut self.channels {
            channel[..frames].fill(0.0);
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, track: usize, index: usize, value: f32) {
        self.channels[track][index] = value;
    }
}

/// Where and how loud one sample of the block is taken from tape.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Step {
    /// Read/write position after any loop wrap.
    pub position: f64,
    pub gain: f32,
    /// Weight of the signal at `position`; the rest comes from
    /// `position + fade_offset`.
    pub fade_in: f32,
    pub fade_offset: f64,
}

/// The trajectory and flags latched at the start of a block. Playback and
/// record both work from this, so they always agree.
#[derive(Debug, Clone)]
pub(crate) struct BlockPlan {
    pub steps: Vec<Step>,
    pub frames: usize,
    /// Playhead after the last step.
    pub end: f64,
    pub play_audio: bool,
    pub recording: bool,
    pub track: usize,
    pub wrapped: bool,
}

impl BlockPlan {
    pub fn new(max_frames: usize) -> Self {
        Self {
            steps: vec![Step::default(); max_frames],
            frames: 0,
            end: 0.0,
            play_audio: false,
            recording: false,
            track: 0,
            wrapped: false,
        }
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps[..self.frames]
    }
}
