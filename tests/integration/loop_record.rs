//! Loop and record integration tests
//!
//! Loop marks and wrap-around, punch in/out, and the record interlocks.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use tapedeck::prelude::*;

/// Mark a loop while stopped and play through it.
fn looping_engine(start: usize, end: usize) -> TapeEngine {
    let mut engine = test_engine();
    engine
        .transport()
        .seek(start)
        .mark_loop_in()
        .seek(end)
        .mark_loop_out()
        .enable_loop()
        .seek(start);
    settle(&mut engine);
    engine
}

#[test]
fn test_loop_wraps_back_to_in_point() {
    let mut engine = looping_engine(100, 500);
    assert_eq!(engine.status().loop_section, Section::spanning(100, 500));
    assert!(engine.status().looping);

    engine.transport().play(1.0);
    let positions = run_blocks(&mut engine, 10, TEST_BLOCK_SIZE);

    assert!(positions.iter().all(|&p| (100..500).contains(&p)));
    // 640 frames of travel through a 400 frame loop.
    assert_eq!(engine.status().position, 340);
}

#[test]
fn test_disabling_loop_releases_playhead() {
    let mut engine = looping_engine(0, 128);
    engine.transport().play(1.0);
    run_blocks(&mut engine, 3, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().position, 64);

    engine.transport().disable_loop();
    run_blocks(&mut engine, 2, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().position, 192);
}

#[test]
fn test_loop_marks_collapse_instead_of_inverting() {
    let mut engine = test_engine();
    engine
        .transport()
        .seek(500)
        .mark_loop_in()
        .seek(100)
        .mark_loop_out();
    settle(&mut engine);
    assert_eq!(engine.status().loop_section, Section::at(100));
}

#[test]
fn test_go_to_loop_points() {
    let mut engine = looping_engine(2000, 6000);

    engine.transport().go_to_loop_out();
    settle(&mut engine);
    assert_eq!(engine.status().position, 6000);

    engine.transport().go_to_loop_in();
    settle(&mut engine);
    assert_eq!(engine.status().position, 2000);
}

#[test]
fn test_record_punch_in_and_out() {
    let mut engine = test_engine();
    engine
        .transport()
        .seek(1000)
        .select_track(2)
        .play(1.0)
        .start_record();

    engine.process(&[0.5; 64], 64).unwrap();
    assert!(engine.status().recording);

    engine.transport().stop_record();
    settle(&mut engine);
    let status = engine.status();
    assert!(!status.recording);
    assert_eq!(status.record_section, Section::spanning(1000, 1064));
    assert_eq!(status.written_extent, 1064);

    // Recorded at 0.5 * gain, played back at gain again.
    engine.transport().stop().seek(1000).play(1.0);
    let block = engine.process(&[0.0; 64], 64).unwrap();
    let expected = vec![0.125; 64];
    assert!(signals_approx_equal(block.channel(2), &expected, FLOAT_EPSILON));
    assert_silence(block.channel(1), SILENCE_THRESHOLD);
}

#[test]
fn test_spool_then_record_rejected() {
    let mut engine = test_engine();
    engine.transport().spool(5.0).start_record();
    settle(&mut engine);

    let status = engine.status();
    assert!(status.spooling());
    assert!(!status.recording);
}

#[test]
fn test_record_blocks_spool() {
    let mut engine = test_engine();
    engine.transport().play(1.0).start_record().fast_forward();
    run_blocks(&mut engine, 1, TEST_BLOCK_SIZE);

    let status = engine.status();
    assert!(status.playing());
    assert!(status.recording);
}

#[test]
fn test_stop_finalizes_record_section() {
    let mut engine = test_engine();
    engine.transport().play(1.0).start_record();
    engine.process(&[0.1; 32], 32).unwrap();

    engine.transport().stop();
    settle(&mut engine);
    let status = engine.status();
    assert!(status.stopped());
    assert!(!status.recording);
    assert_eq!(status.record_section, Section::spanning(0, 32));
}

#[test]
fn test_overdub_stays_inside_loop() {
    let mut engine = looping_engine(0, 128);
    engine.transport().play(1.0).start_record();

    let input = vec![0.5; TEST_BLOCK_SIZE];
    for _ in 0..4 {
        engine.process(&input, TEST_BLOCK_SIZE).unwrap();
    }

    let status = engine.status();
    assert_eq!(status.record_section, Section::spanning(0, 128));
    assert_eq!(status.written_extent, 128);
}

#[test]
fn test_disabled_transport_moves_silently() {
    let mut engine = test_engine();
    engine.transport().set_enabled(false).play(1.0).start_record();

    let block = engine.process(&[0.5; 64], 64).unwrap();
    assert!(block.is_silent());

    let status = engine.status();
    assert!(!status.enabled);
    assert_eq!(status.position, 64);
    assert_eq!(status.written_extent, 0);
}

#[test]
fn test_recording_past_tape_end_counts_overruns() {
    init_tracing();
    let capacity = tapedeck::CHUNK_FRAMES;
    let mut engine = test_builder().capacity_frames(capacity).build().unwrap();
    engine
        .transport()
        .seek(capacity - 32)
        .play(1.0)
        .start_record();

    engine.process(&[0.5; 64], 64).unwrap();
    let status = engine.status();
    assert_eq!(status.position, capacity);
    assert!(status.overruns > 0);
    assert_eq!(status.written_extent, capacity);
}
