//! Control commands carried from the control thread to the audio thread.

/// One control action, applied by the audio thread at the next block start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    Play(f32),
    Spool(f32),
    Stop,
    StartRecord,
    StopRecord,
    SelectTrack(usize),
    SetLooping(bool),
    ToggleLooping,
    MarkLoopIn,
    MarkLoopOut,
    GoToLoopIn,
    GoToLoopOut,
    GoToBar(usize),
    GoToBarRel(i64),
    Seek(usize),
    SetGain(f32),
    SetBaseSpeed(f32),
    SetEnabled(bool),
}
