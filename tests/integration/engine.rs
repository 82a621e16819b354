//! Engine integration tests
//!
//! Building, processor ownership, tempo changes and chunk feeding.

use crate::helpers::*;
use std::time::Duration;
use tapedeck::prelude::*;
use tapedeck::CHUNK_FRAMES;

#[test]
fn test_engine_builds_with_defaults() {
    init_tracing();
    let engine = TapeEngine::builder().build().expect("default engine");
    assert_eq!(engine.sample_rate(), 48000.0);
    assert_eq!(engine.config(), &TapeConfig::default());
    assert!(engine.tempo().is_some());

    let status = engine.status();
    assert!(status.stopped());
    assert_eq!(status.position, 0);
    assert_eq!(status.loop_section, Section::at(0));
}

#[test]
fn test_invalid_config_rejected() {
    let result = test_builder().max_block_frames(0).build();
    assert!(matches!(result, Err(Error::Core(_))));

    let result = test_builder().bpm(0.0).build();
    assert!(matches!(result, Err(Error::Core(_))));

    let result = test_builder().time_signature(4, 3).build();
    assert!(matches!(result, Err(Error::Core(_))));
}

#[test]
fn test_config_from_json() {
    let config: TapeConfig = serde_json::from_str(
        r#"{ "sample_rate": 44100.0, "max_block_frames": 256, "speed_ramp_blocks": 0 }"#,
    )
    .unwrap();
    assert_eq!(config.capacity_frames, TapeConfig::default().capacity_frames);

    let engine = test_builder().config(config.clone()).build().unwrap();
    assert_eq!(engine.config(), &config);
    assert_eq!(engine.sample_rate(), 44100.0);
}

#[test]
fn test_capacity_secs_uses_sample_rate() {
    let engine = test_builder()
        .sample_rate(44100.0)
        .capacity_secs(2.0)
        .build()
        .unwrap();
    assert_eq!(engine.config().capacity_frames, 88200);
}

#[test]
fn test_take_processor_moves_audio_side() {
    let mut engine = test_engine();
    let mut processor = engine.take_processor().expect("first take");
    assert!(engine.take_processor().is_none());
    assert!(matches!(
        engine.process(&[], 64),
        Err(Error::ProcessorTaken)
    ));

    // The handle still drives the moved processor.
    engine.transport().play(1.0);
    processor.process(&[0.0; 64], 64);
    assert_eq!(engine.status().position, 64);
    assert!(engine.status().playing());
}

#[test]
fn test_set_tempo_moves_bar_positions() {
    let mut engine = test_engine();

    engine.transport().go_to_bar(1);
    settle(&mut engine);
    assert_eq!(engine.status().position, TEST_BAR_FRAMES);

    engine.set_tempo(60.0).unwrap();
    engine.transport().go_to_bar(1);
    settle(&mut engine);
    assert_eq!(engine.status().position, TEST_BAR_FRAMES * 2);

    assert!(engine.set_tempo(5.0).is_err());
    let tempo = engine.tempo().unwrap().load();
    assert_eq!(tempo.tempo_at(0), 60.0);
}

#[test]
fn test_external_clock_has_no_tempo() {
    struct FixedBars;
    impl BarClock for FixedBars {
        fn samples_per_bar(&self, _bar: usize) -> usize {
            1000
        }
    }

    let mut engine = test_builder()
        .clock(std::sync::Arc::new(FixedBars))
        .build()
        .unwrap();
    assert!(engine.tempo().is_none());
    assert!(engine.set_tempo(120.0).is_err());

    engine.transport().go_to_bar(3);
    settle(&mut engine);
    assert_eq!(engine.status().position, 3000);
}

#[test]
fn test_manual_feeder_tops_up() {
    let mut engine = test_builder()
        .capacity_frames(CHUNK_FRAMES * 8)
        .preallocated_chunks(2)
        .chunk_stock(4)
        .build()
        .unwrap();
    assert!(!engine.has_feeder_thread());

    // Two chunks already in the ring, room for two more.
    assert_eq!(engine.top_up_chunks(), 2);
    assert_eq!(engine.top_up_chunks(), 0);
}

#[test]
fn test_feeder_thread_runs_until_stock_complete() {
    init_tracing();
    let engine = TapeEngine::builder()
        .capacity_frames(CHUNK_FRAMES * 2)
        .feeder_interval(Duration::from_millis(1))
        .build()
        .unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while engine.has_feeder_thread() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(!engine.has_feeder_thread());
}

#[test]
fn test_deadline_metrics_track_blocks() {
    init_tracing();
    let mut engine = test_builder().deadline_metering(true).build().unwrap();
    engine.transport().play(1.0);
    run_blocks(&mut engine, 8, TEST_BLOCK_SIZE);

    let metrics = engine.deadline_metrics();
    assert!(metrics.peak >= metrics.current);
    assert!(engine.meter().is_enabled());
}
