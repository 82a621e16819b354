//! Half-open tape ranges used for loop and record bounds.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A half-open range of tape frames, `start..end`, with `start <= end`.
///
/// Bounds are only ever replaced together, through constructors that keep
/// the ordering intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SectionBounds")]
pub struct Section {
    start: usize,
    end: usize,
}

/// Unchecked wire form of a [`Section`].
#[derive(Deserialize)]
struct SectionBounds {
    start: usize,
    end: usize,
}

impl TryFrom<SectionBounds> for Section {
    type Error = Error;

    fn try_from(bounds: SectionBounds) -> Result<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl Section {
    /// Ordered constructor; rejects inverted bounds.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidSection { start, end });
        }
        Ok(Self { start, end })
    }

    /// Section spanning two positions in either order.
    #[inline]
    pub fn spanning(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Empty section sitting at `position`.
    #[inline]
    pub const fn at(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    /// Move the in point. If it passes the out point, the out point follows.
    #[must_use]
    pub fn with_start(self, start: usize) -> Self {
        Self {
            start,
            end: self.end.max(start),
        }
    }

    /// Move the out point. If it passes the in point, the in point follows.
    #[must_use]
    pub fn with_end(self, end: usize) -> Self {
        Self {
            start: self.start.min(end),
            end,
        }
    }

    /// Smallest section covering both `self` and the frame at `position`.
    #[must_use]
    pub fn including(self, position: usize) -> Self {
        Self {
            start: self.start.min(position),
            end: self.end.max(position + 1),
        }
    }

    /// Smallest section covering `self` and the bare point `position`.
    #[must_use]
    pub fn reaching(self, position: usize) -> Self {
        Self {
            start: self.start.min(position),
            end: self.end.max(position),
        }
    }
}
