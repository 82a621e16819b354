//! Loop-wrap crossfade.
//!
//! When the playhead wraps from the loop end back to the loop start, the
//! read head jumps. For a short window after the jump the output blends the
//! new (post-wrap) signal in while the tape that would have followed without
//! the wrap fades out.

/// Linear crossfade over a fixed number of samples.
#[derive(Debug, Clone)]
pub(crate) struct WrapCrossfade {
    length: usize,
    /// Samples already faded. Equal to `length` when idle.
    position: usize,
    /// Distance from the post-wrap read position to the pre-wrap one.
    offset: f64,
}

impl WrapCrossfade {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            position: length,
            offset: 0.0,
        }
    }

    /// Begin a fade. `offset` is added to the post-wrap position to find the
    /// pre-wrap continuation.
    pub fn start(&mut self, offset: f64) {
        if self.length == 0 {
            return;
        }
        self.position = 0;
        self.offset = offset;
    }

    pub fn reset(&mut self) {
        self.position = self.length;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.position < self.length
    }

    /// Advance one sample. Returns `(fade_in, offset)`; `fade_in` is the
    /// weight of the post-wrap signal, `1.0` when idle.
    #[inline]
    pub fn next(&mut self) -> (f32, f64) {
        if !self.is_active() {
            return (1.0, 0.0);
        }
        let fade_in = self.position as f32 / self.length as f32;
        self.position += 1;
        (fade_in, self.offset)
    }
}
