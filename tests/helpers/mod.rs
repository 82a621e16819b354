//! Test helpers and fixtures for tapedeck integration tests.
//!
//! Engines built here never spawn a feeder thread, never ramp and never
//! crossfade, so every block moves the tape by a predictable amount.

pub mod tolerances;

use tapedeck::prelude::*;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard block size for deterministic testing
pub const TEST_BLOCK_SIZE: usize = 64;

/// Frames per bar at 120 BPM in 4/4 and [`TEST_SAMPLE_RATE`].
pub const TEST_BAR_FRAMES: usize = 96000;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Builder preset for deterministic engines.
pub fn test_builder() -> TapeEngineBuilder {
    TapeEngine::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .max_block_frames(512)
        .speed_ramp_blocks(0)
        .crossfade_samples(0)
        .deadline_metering(false)
        .bpm(120.0)
        .manual_feeder()
}

pub fn test_engine() -> TapeEngine {
    init_tracing();
    test_builder().build().expect("Failed to create test engine")
}

/// Run `blocks` blocks of silence, returning the position after each.
pub fn run_blocks(engine: &mut TapeEngine, blocks: usize, frames: usize) -> Vec<usize> {
    let input = vec![0.0; frames];
    (0..blocks)
        .map(|_| {
            engine.process(&input, frames).expect("processor available");
            engine.status().position
        })
        .collect()
}

/// Apply queued commands without moving the tape.
pub fn settle(engine: &mut TapeEngine) {
    engine.process(&[], 0).expect("processor available");
}

/// Peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Assert that a signal is approximately silent.
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Check if two signals are approximately equal within tolerance.
pub fn signals_approx_equal(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance)
}
