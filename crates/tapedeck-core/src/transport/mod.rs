pub(crate) mod block;
pub(crate) mod command;
pub(crate) mod crossfade;
pub(crate) mod fsm;
pub(crate) mod handle;
pub(crate) mod manager;
pub(crate) mod section;
pub(crate) mod status;
pub(crate) mod tempo_map;
mod playback;
mod record;

pub use block::TrackBlock;
pub use command::TransportCommand;
pub use fsm::{
    PlayMode, TransitionResult, TransportEvent, TransportFSM, DEFAULT_SPOOL_SPEED, MAX_SPEED,
};
pub use handle::TransportHandle;
pub use manager::{TapeTransport, TransportParts};
pub use section::Section;
pub use status::{time_until, StatusSnapshot, TransportStatus};
pub use tempo_map::{BarClock, SharedTempo, TempoMap, TimeSignature};
