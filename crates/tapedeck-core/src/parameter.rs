//! Range and step metadata for the transport's continuous controls.
//!
//! The transport publishes two controls to whatever parameter framework sits
//! above it:
//!
//! ```
//! use tapedeck_core::{BASE_SPEED_RANGE, GAIN_RANGE};
//!
//! assert_eq!(GAIN_RANGE.snap(0.333), 0.33);
//! assert_eq!(BASE_SPEED_RANGE.snap(-7.0), -2.0);
//! assert_eq!(BASE_SPEED_RANGE.normalize(0.0), 0.5);
//! ```

/// Output/record gain: `0..1`, step `0.01`.
pub const GAIN_RANGE: ParameterRange = ParameterRange::new(0.0, 1.0, 0.5, 0.01);

/// Nominal speed multiplier: `-2..2`, step `0.01`. Negative plays backwards.
pub const BASE_SPEED_RANGE: ParameterRange = ParameterRange::new(-2.0, 2.0, 1.0, 0.01);

/// Linear parameter range with a step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Quantisation step; `0.0` means continuous.
    pub step: f32,
}

impl ParameterRange {
    pub const fn new(min: f32, max: f32, default: f32, step: f32) -> Self {
        Self {
            min,
            max,
            default,
            step,
        }
    }

    /// Clamp into range. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    /// Clamp and quantise to the nearest step, counted from `min`.
    #[inline]
    pub fn snap(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        if self.step <= 0.0 {
            return value;
        }
        let steps = ((value - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        // Round away the float noise of `steps * step` at two decimal places.
        let scale = (1.0 / self.step).round().max(1.0);
        ((snapped * scale).round() / scale).clamp(self.min, self.max)
    }

    /// Real value to `0..1`.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// `0..1` to real value.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}
