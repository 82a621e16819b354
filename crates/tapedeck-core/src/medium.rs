//! Tape medium: four interleaved tracks of sample storage with a playhead.
//!
//! Storage is a fixed table of chunk slots covering the whole tape. A slot
//! stays empty (and reads as silence) until something is written into its
//! range, at which point a chunk is taken from the [stock](crate::stock).
//! Nothing here allocates after construction.

use crate::stock::ChunkConsumer;
use ringbuf::traits::{Consumer, Observer};

/// Number of tape tracks.
pub const TRACKS: usize = 4;

/// Frames per storage chunk.
pub const CHUNK_FRAMES: usize = 4096;

/// One sample per track at a single tape position.
pub type Frame = [f32; TRACKS];

/// A run of [`CHUNK_FRAMES`] frames.
pub type Chunk = Box<[Frame]>;

/// Allocate a silent chunk. Never call from the audio thread.
pub fn new_chunk() -> Chunk {
    vec![[0.0; TRACKS]; CHUNK_FRAMES].into_boxed_slice()
}

pub struct TapeMedium {
    slots: Vec<Option<Chunk>>,
    stock: ChunkConsumer,
    capacity: usize,
    playhead: f64,
    extent: usize,
    overruns: u64,
}

impl TapeMedium {
    pub fn new(capacity: usize, stock: ChunkConsumer) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(capacity.div_ceil(CHUNK_FRAMES), || None);

        Self {
            slots,
            stock,
            capacity,
            playhead: 0.0,
            extent: 0,
            overruns: 0,
        }
    }

    /// Hard tape length in frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current playhead, truncated to a whole frame.
    #[inline]
    pub fn position(&self) -> usize {
        self.playhead as usize
    }

    /// Current playhead including its fractional part.
    #[inline]
    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Locate the playhead. Callers gate this; the medium only clamps to tape.
    pub fn seek(&mut self, position: usize) {
        self.playhead = position.min(self.capacity) as f64;
    }

    pub(crate) fn set_playhead(&mut self, playhead: f64) {
        self.playhead = playhead.clamp(0.0, self.capacity as f64);
    }

    /// One past the highest frame ever written.
    pub fn written_extent(&self) -> usize {
        self.extent
    }

    /// Writes dropped because the tape was full or no chunk was ready.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Slots currently backed by storage.
    pub fn allocated_chunks(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Chunks waiting in the stock ring.
    pub fn stocked_chunks(&self) -> usize {
        self.stock.occupied_len()
    }

    /// Stored sample at a whole frame; silence if never written or off tape.
    #[inline]
    pub fn sample(&self, channel: usize, position: usize) -> f32 {
        if channel >= TRACKS || position >= self.capacity {
            return 0.0;
        }
        match &self.slots[position / CHUNK_FRAMES] {
            Some(chunk) => chunk[position % CHUNK_FRAMES][channel],
            None => 0.0,
        }
    }

    /// Read a track at a fractional position, linearly interpolating between
    /// the two neighbouring frames. Off-tape positions read as silence.
    #[inline]
    pub fn read(&self, channel: usize, position: f64) -> f32 {
        if !(position >= 0.0) || position >= self.capacity as f64 {
            return 0.0;
        }
        let index = position as usize;
        let frac = (position - index as f64) as f32;
        let a = self.sample(channel, index);
        if frac == 0.0 {
            return a;
        }
        let b = self.sample(channel, index + 1);
        a + (b - a) * frac
    }

    /// Store `value` on one track. Returns false (and counts an overrun) when
    /// the position is off tape or no storage chunk was available.
    #[inline]
    pub fn write(&mut self, channel: usize, position: usize, value: f32) -> bool {
        if channel >= TRACKS {
            return false;
        }
        if position >= self.capacity {
            self.overruns += 1;
            return false;
        }

        let slot = &mut self.slots[position / CHUNK_FRAMES];
        if slot.is_none() {
            match self.stock.try_pop() {
                Some(chunk) => *slot = Some(chunk),
                None => {
                    self.overruns += 1;
                    return false;
                }
            }
        }

        if let Some(chunk) = slot {
            chunk[position % CHUNK_FRAMES][channel] = value;
            self.extent = self.extent.max(position + 1);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::chunk_stock;
    use crate::TapeConfig;

    fn medium(slots: usize, prealloc: usize) -> TapeMedium {
        let config = TapeConfig {
            capacity_frames: CHUNK_FRAMES * slots,
            preallocated_chunks: prealloc,
            chunk_stock: prealloc.max(1),
            ..Default::default()
        };
        let (_feeder, consumer) = chunk_stock(&config);
        TapeMedium::new(config.capacity_frames, consumer)
    }

    #[test]
    fn test_new_medium_is_silent() {
        let tape = medium(4, 2);
        assert_eq!(tape.position(), 0);
        assert_eq!(tape.written_extent(), 0);
        assert_eq!(tape.allocated_chunks(), 0);
        assert_eq!(tape.read(0, 100.0), 0.0);
        assert_eq!(tape.read(3, 100.5), 0.0);
    }

    #[test]
    fn test_write_then_read_is_exact() {
        let mut tape = medium(4, 2);
        assert!(tape.write(2, 1000, 0.123_456_7));
        assert_eq!(tape.read(2, 1000.0), 0.123_456_7);
        assert_eq!(tape.read(1, 1000.0), 0.0);
        assert_eq!(tape.written_extent(), 1001);
    }

    #[test]
    fn test_fractional_read_interpolates() {
        let mut tape = medium(4, 2);
        tape.write(0, 10, 0.0);
        tape.write(0, 11, 1.0);
        assert!((tape.read(0, 10.25) - 0.25).abs() < 1e-6);
        assert!((tape.read(0, 10.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_interpolates_across_chunk_boundary() {
        let mut tape = medium(4, 2);
        let last = CHUNK_FRAMES - 1;
        tape.write(1, last, 1.0);
        tape.write(1, last + 1, 3.0);
        assert_eq!(tape.allocated_chunks(), 2);
        assert!((tape.read(1, last as f64 + 0.5) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_reads_are_silent() {
        let mut tape = medium(1, 1);
        tape.write(0, 0, 1.0);
        assert_eq!(tape.read(0, -0.5), 0.0);
        assert_eq!(tape.read(0, f64::NAN), 0.0);
        assert_eq!(tape.read(0, CHUNK_FRAMES as f64), 0.0);
        assert_eq!(tape.read(7, 0.0), 0.0);
    }

    #[test]
    fn test_write_past_capacity_counts_overrun() {
        let mut tape = medium(1, 1);
        assert!(!tape.write(0, CHUNK_FRAMES, 1.0));
        assert_eq!(tape.overruns(), 1);
        assert_eq!(tape.written_extent(), 0);
    }

    #[test]
    fn test_write_without_stock_counts_overrun() {
        let mut tape = medium(4, 1);
        assert!(tape.write(0, 0, 1.0));
        assert!(!tape.write(0, CHUNK_FRAMES, 1.0));
        assert_eq!(tape.overruns(), 1);
        assert_eq!(tape.read(0, CHUNK_FRAMES as f64), 0.0);
    }

    #[test]
    fn test_seek_clamps_to_capacity() {
        let mut tape = medium(1, 0);
        tape.seek(CHUNK_FRAMES * 10);
        assert_eq!(tape.position(), CHUNK_FRAMES);
        tape.set_playhead(-12.0);
        assert_eq!(tape.position(), 0);
    }
}
