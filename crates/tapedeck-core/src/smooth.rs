//! Linear ramps for tape speed and gain.
//!
//! Both ramps move from their current value to a target in a fixed number of
//! steps and snap to the target on the last one, so they always land exactly
//! and never overshoot.

/// Tape speed ease-in, advanced once per block.
#[derive(Debug, Clone)]
pub struct SpeedRamp {
    current: f32,
    target: f32,
    step: f32,
    blocks_remaining: u32,
    ramp_blocks: u32,
}

impl SpeedRamp {
    pub fn new(ramp_blocks: u32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            step: 0.0,
            blocks_remaining: 0,
            ramp_blocks,
        }
    }

    /// Aim for a new speed. The ramp restarts from wherever it is now.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        if self.ramp_blocks == 0 {
            self.set_immediate(target);
            return;
        }
        self.blocks_remaining = self.ramp_blocks;
        self.step = (self.target - self.current) / self.ramp_blocks as f32;
    }

    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.blocks_remaining = 0;
    }

    /// Advance one block and return the new speed.
    #[inline]
    pub fn next_block(&mut self) -> f32 {
        if self.blocks_remaining > 0 {
            self.current += self.step;
            self.blocks_remaining -= 1;

            if self.blocks_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.blocks_remaining > 0
    }
}

/// Per-sample smoothed value, used for gain.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    smooth_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32, smooth_samples: usize) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            smooth_samples: smooth_samples.max(1) as u32,
        }
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() < f32::EPSILON {
            return;
        }
        self.target = target;
        self.samples_remaining = self.smooth_samples;
        self.step = (self.target - self.current) / self.samples_remaining as f32;
    }

    /// Call once per sample in the audio callback.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;

            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }
}
