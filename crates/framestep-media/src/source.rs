// crates/framestep-media/src/source.rs
//
// FrameSource: the seam between navigation logic and the container/codec
// layer. The production implementation is adapter::Demuxer; tests drive the
// cursor/index/worker with a scripted in-memory source instead.

use framestep_core::{MediaError, RawFrame, ScanEntry, StreamInfo};

/// Packet stream in, decoded frames out, plus keyframe seek and a packet
/// scan cursor. Frames come out in presentation order — implementations
/// reorder internally (B-frame decode order never leaks past this trait).
///
/// Not safe for concurrent use; driven only from the navigation worker
/// thread. Corrupt frames are surfaced, never silently skipped — skipping
/// would desynchronize the frame index.
pub trait FrameSource: Send {
    fn info(&self) -> &StreamInfo;

    /// Position the read cursor at the nearest keyframe at or before
    /// `ts_secs` and discard any buffered partially-decoded state.
    fn seek_to_or_before(&mut self, ts_secs: f64) -> Result<(), MediaError>;

    /// Decode the next frame in presentation order. `Ok(None)` at end of
    /// stream. Callable repeatedly after a seek to walk forward.
    fn decode_next(&mut self) -> Result<Option<RawFrame>, MediaError>;

    /// Next packet observation for the frame index, decode order, on a read
    /// cursor independent of the decode position. `Ok(None)` once the whole
    /// file has been scanned.
    fn scan_next(&mut self) -> Result<Option<ScanEntry>, MediaError>;
}
