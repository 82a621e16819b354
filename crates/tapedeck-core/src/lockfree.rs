//! Lock-free primitives shared between the audio thread and its observers.

use crate::transport::Section;
use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Cache-line aligned atomic f32.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFloat {
    value: AtomicF32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Cache-line aligned atomic bool.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFlag {
    value: AtomicBool,
}

impl AtomicFlag {
    pub fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for AtomicFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// A [`Section`] published as one 64-bit word.
///
/// Start and end are packed as two `u32` halves so a reader can never observe
/// a start from one update and an end from another. Bounds above `u32::MAX`
/// saturate; `TapeConfig` caps tape capacity so this never happens in practice.
#[derive(Debug)]
pub struct AtomicSection {
    packed: AtomicU64,
}

impl AtomicSection {
    pub fn new(section: Section) -> Self {
        Self {
            packed: AtomicU64::new(Self::pack(section)),
        }
    }

    #[inline]
    pub fn get(&self) -> Section {
        Self::unpack(self.packed.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, section: Section) {
        self.packed.store(Self::pack(section), Ordering::Release);
    }

    #[inline]
    fn pack(section: Section) -> u64 {
        let start = section.start().min(u32::MAX as usize) as u64;
        let end = section.end().min(u32::MAX as usize) as u64;
        (start << 32) | end
    }

    #[inline]
    fn unpack(word: u64) -> Section {
        Section::spanning((word >> 32) as usize, (word & 0xFFFF_FFFF) as usize)
    }
}

impl Default for AtomicSection {
    fn default() -> Self {
        Self::new(Section::default())
    }
}
