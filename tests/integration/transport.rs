//! Transport integration tests
//!
//! Ease-in, speed, navigation gating and the command queue, all driven
//! through the control handle.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use approx::assert_relative_eq;
use proptest::prelude::*;
use tapedeck::prelude::*;
use tapedeck::TransportCommand;

/// Position tracks N blocks of B frames once the ease-in has settled.
#[test]
fn test_ease_in_reaches_nominal_travel() {
    init_tracing();
    const RAMP_BLOCKS: usize = 4;
    const BLOCK: usize = 128;
    const BLOCKS: usize = 32;

    let mut engine = test_builder()
        .speed_ramp_blocks(RAMP_BLOCKS as u32)
        .build()
        .unwrap();
    engine.transport().play(1.0);

    let positions = run_blocks(&mut engine, BLOCKS, BLOCK);
    let end = *positions.last().unwrap();

    assert!(end < BLOCKS * BLOCK, "ease-in travels less than full speed");
    assert!(
        BLOCKS * BLOCK - end <= RAMP_BLOCKS * BLOCK,
        "ease-in shortfall {} exceeds the ramp",
        BLOCKS * BLOCK - end
    );

    // Once settled, every block moves exactly one block length.
    for pair in positions[RAMP_BLOCKS..].windows(2) {
        assert_eq!(pair[1] - pair[0], BLOCK);
    }
    assert_eq!(engine.status().current_speed, 1.0);
}

#[test]
fn test_play_then_stop_halts_immediately() {
    let mut engine = test_engine();
    engine.transport().play(1.0);
    run_blocks(&mut engine, 4, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().position, 4 * TEST_BLOCK_SIZE);

    engine.transport().stop();
    let positions = run_blocks(&mut engine, 3, TEST_BLOCK_SIZE);
    assert!(positions.iter().all(|&p| p == 4 * TEST_BLOCK_SIZE));

    let status = engine.status();
    assert!(status.stopped());
    assert_eq!(status.current_speed, 0.0);
}

#[test]
fn test_base_speed_scales_play_speed() {
    let mut engine = test_engine();
    engine.transport().set_base_speed(2.0).play(1.0);
    run_blocks(&mut engine, 2, TEST_BLOCK_SIZE);

    let status = engine.status();
    assert_eq!(status.base_speed, 2.0);
    assert_eq!(status.position, 4 * TEST_BLOCK_SIZE);
}

#[test]
fn test_reverse_play_clamps_at_tape_start() {
    let mut engine = test_engine();
    engine.transport().seek(100).play(-1.0);
    run_blocks(&mut engine, 4, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().position, 0);
}

#[test]
fn test_spool_is_silent_and_fast() {
    let mut engine = test_engine();
    engine.transport().seek(10_000).rewind();
    let input = vec![0.0; TEST_BLOCK_SIZE];
    let block = engine.process(&input, TEST_BLOCK_SIZE).unwrap();
    for track in 0..tapedeck::TRACKS {
        assert_silence(block.channel(track), SILENCE_THRESHOLD);
    }

    let status = engine.status();
    assert!(status.spooling());
    assert_eq!(status.position, 10_000 - 5 * TEST_BLOCK_SIZE);
}

#[test]
fn test_go_to_bar_only_while_stopped() {
    let mut engine = test_engine();

    engine.transport().play(1.0).go_to_bar(2);
    run_blocks(&mut engine, 1, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().position, TEST_BLOCK_SIZE);

    engine.transport().stop().go_to_bar(2);
    settle(&mut engine);
    assert_eq!(engine.status().position, 2 * TEST_BAR_FRAMES);

    engine.transport().go_to_bar_rel(-1);
    settle(&mut engine);
    assert_eq!(engine.status().position, TEST_BAR_FRAMES);

    engine.transport().go_to_bar_rel(-5);
    settle(&mut engine);
    assert_eq!(engine.status().position, 0);
}

#[test]
fn test_seek_ignored_while_rolling() {
    let mut engine = test_engine();
    engine.transport().play(1.0);
    run_blocks(&mut engine, 1, TEST_BLOCK_SIZE);

    engine.transport().seek(50_000);
    run_blocks(&mut engine, 1, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().position, 2 * TEST_BLOCK_SIZE);
}

#[test]
fn test_time_until() {
    let mut engine = test_engine();
    let handle = engine.transport();

    let here = handle.position();
    assert_eq!(handle.time_until(here), 0);
    assert_eq!(handle.time_until(here + 1), i64::MAX);

    handle.play(2.0);
    run_blocks(&mut engine, 1, TEST_BLOCK_SIZE);
    let handle = engine.transport();
    let here = handle.position();
    assert_eq!(handle.time_until(here), 0);
    assert_eq!(handle.time_until(here + 4800), 2400);
}

#[test]
fn test_track_selection_gated_while_rolling() {
    let mut engine = test_engine();
    engine.transport().select_track(3);
    settle(&mut engine);
    assert_eq!(engine.status().active_track, 3);

    engine.transport().play(1.0).select_track(1);
    run_blocks(&mut engine, 1, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().active_track, 3);

    // Out of range is rejected even while stopped.
    engine.transport().stop().select_track(tapedeck::TRACKS);
    settle(&mut engine);
    assert_eq!(engine.status().active_track, 3);
}

#[test]
fn test_gain_snaps_to_grid() {
    let mut engine = test_engine();
    engine.transport().set_gain(0.257);
    settle(&mut engine);
    assert_relative_eq!(engine.status().gain, 0.26, epsilon = FLOAT_EPSILON);

    engine.transport().set_gain(7.0);
    settle(&mut engine);
    assert_eq!(engine.status().gain, 1.0);
}

#[test]
fn test_full_queue_drops_and_counts() {
    init_tracing();
    let mut engine = test_builder().command_capacity(4).build().unwrap();
    let handle = engine.transport();

    let accepted = (0..6)
        .filter(|_| handle.send(TransportCommand::ToggleLooping))
        .count();
    assert_eq!(accepted, 4);
    assert_eq!(handle.status().dropped_commands, 2);

    // Four toggles cancel out.
    settle(&mut engine);
    assert!(!engine.status().looping);
    assert!(handle.send(TransportCommand::Stop));
}

#[test]
fn test_status_counts_blocks() {
    let mut engine = test_engine();
    run_blocks(&mut engine, 5, TEST_BLOCK_SIZE);
    assert_eq!(engine.status().blocks_processed, 5);
}

fn command_strategy() -> impl Strategy<Value = TransportCommand> {
    prop_oneof![
        (-6.0f32..6.0).prop_map(TransportCommand::Play),
        (-6.0f32..6.0).prop_map(TransportCommand::Spool),
        Just(TransportCommand::Stop),
        Just(TransportCommand::StartRecord),
        Just(TransportCommand::StopRecord),
        (0usize..5).prop_map(TransportCommand::SelectTrack),
        Just(TransportCommand::ToggleLooping),
        Just(TransportCommand::MarkLoopIn),
        Just(TransportCommand::MarkLoopOut),
        (0usize..20_000).prop_map(TransportCommand::Seek),
        (-2i64..3).prop_map(TransportCommand::GoToBarRel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever came before, a stop leaves the tape halted.
    #[test]
    fn prop_stop_always_halts(commands in prop::collection::vec(command_strategy(), 0..24)) {
        let mut engine = test_builder().speed_ramp_blocks(3).build().unwrap();
        let handle = engine.transport();
        for command in commands {
            handle.send(command);
            engine.process(&[0.25; TEST_BLOCK_SIZE], TEST_BLOCK_SIZE).unwrap();
        }

        handle.send(TransportCommand::Stop);
        let positions = run_blocks(&mut engine, 2, TEST_BLOCK_SIZE);
        let status = engine.status();
        prop_assert!(status.stopped());
        prop_assert_eq!(status.current_speed, 0.0);
        prop_assert_eq!(status.target_speed, 0.0);
        prop_assert!(!status.recording);
        prop_assert_eq!(positions[0], positions[1]);
    }
}
