// crates/framestep-media/src/lib.rs
//
// No UI dependency — communicates with frontends via channels only.
//
// Pipeline, leaves first:
//   adapter  — FFmpeg demux/decode, packet-scan cursor for the index
//   index    — logical frame number ↔ timestamp authority
//   cursor   — exact-frame materialization (seek + forward discard walk)
//   worker   — Navigator: command channel in, event channel out, one
//              decode thread owning all of the above

pub mod adapter;
pub mod cursor;
pub mod index;
pub mod snapshot;
pub mod source;
pub mod worker;

#[cfg(test)]
mod testsrc;

// Re-export the main public API so frontend imports are simple.
pub use worker::Navigator;
pub use framestep_core::{
    ClockState, DecodedFrame, ErrorKind, MediaError, NavCommand, NavEvent, StreamInfo,
};
