// crates/framestep-core/src/media_types.rs
//
// Types that flow across the channel between framestep-media and a frontend.
// No FFmpeg — just plain data.

use std::path::PathBuf;
use uuid::Uuid;

use crate::error::ErrorKind;

/// Immutable per-file descriptor, built once on open.
///
/// `declared_frames` is the container's own count when it carries one
/// (mp4/mov usually do, mkv usually doesn't). When absent, the worker
/// estimates from `duration_secs * fps` and the frame index confirms the
/// real count at end of stream.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub width:           u32,
    pub height:          u32,
    /// Declared average frame rate.
    pub fps:             f64,
    pub duration_secs:   f64,
    /// Presentation timestamp of the first frame, seconds.
    pub start_secs:      f64,
    pub declared_frames: Option<u64>,
    pub codec:           String,
    /// False when avg and real frame rate disagree — timestamps are then the
    /// only authority on frame numbering and the index scans lazily.
    pub constant_rate:   bool,
}

/// One decoded frame straight out of the source, presentation order.
/// Tightly packed RGBA8 — stride padding already removed.
pub struct RawFrame {
    pub data:     Vec<u8>,
    pub width:    u32,
    pub height:   u32,
    pub pts_secs: f64,
}

/// One packet observation from the index scan cursor (decode order).
#[derive(Debug, Clone, Copy)]
pub struct ScanEntry {
    pub pts_secs: f64,
    pub is_key:   bool,
}

/// A frame as delivered to the frontend: pixels plus the logical position
/// they correspond to. `landed_exactly` is false when the source could not
/// produce the exact requested frame (EOF clamp, missing timestamp) and a
/// nearest frame was substituted instead.
pub struct DecodedFrame {
    pub session:        Uuid,
    pub data:           Vec<u8>, // RGBA8, tightly packed
    pub width:          u32,
    pub height:         u32,
    pub frame:          u64,
    pub pts_secs:       f64,
    pub landed_exactly: bool,
}

impl DecodedFrame {
    /// Duplicate without the pixel payload copy being implicit — the worker
    /// keeps one copy for snapshots while handing one to the frontend.
    pub fn clone_frame(&self) -> DecodedFrame {
        DecodedFrame {
            session:        self.session,
            data:           self.data.clone(),
            width:          self.width,
            height:         self.height,
            frame:          self.frame,
            pts_secs:       self.pts_secs,
            landed_exactly: self.landed_exactly,
        }
    }
}

/// Events sent from the navigation worker thread to the frontend.
///
/// After any command that changes the displayed frame the worker emits
/// exactly one FrameReady followed by exactly one PositionChanged, in that
/// order. Superseded commands emit nothing.
pub enum NavEvent {
    /// File opened; descriptor attached. Followed by frame 0's
    /// FrameReady/PositionChanged pair.
    Opened { session: Uuid, info: StreamInfo },
    FrameReady(DecodedFrame),
    PositionChanged {
        session:     Uuid,
        frame:       u64,
        /// Best-known total. A lower bound until `count_final` is true.
        known_frames: u64,
        count_final: bool,
    },
    /// Play/pause transitions, including auto-pause at end of stream.
    PlaybackState { session: Uuid, playing: bool },
    FrameSaved { path: PathBuf },
    Error { kind: ErrorKind, message: String },
    Closed { session: Uuid },
}
