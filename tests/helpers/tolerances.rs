//! Tolerance constants for tape tests.

/// Floating point rounding errors (unity gain, exact binary fractions).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Silence threshold (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;
