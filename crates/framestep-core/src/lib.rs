// crates/framestep-core/src/lib.rs
//
// No FFmpeg dependency — plain data, the error taxonomy, and the pure
// playback-clock state machine. framestep-media depends on this crate;
// UI frontends depend on it for the command/event types only.

pub mod clock;
pub mod commands;
pub mod error;
pub mod helpers;
pub mod media_types;
pub mod state;

pub use clock::{ClockState, PlaybackClock};
pub use commands::NavCommand;
pub use error::{ErrorKind, MediaError};
pub use media_types::{DecodedFrame, NavEvent, RawFrame, ScanEntry, StreamInfo};
pub use state::PlaybackState;
