// crates/framestep-core/src/error.rs
//
// Error taxonomy for the navigation core. Every failure the decode pipeline
// can surface to a frontend is one of these variants; the worker maps them
// to NavEvent::Error { kind, message } on the event channel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// File missing, no video stream, or unsupported container. Fatal to open().
    #[error("unreadable source: {0}")]
    UnreadableSource(String),

    /// The container could not position at or before the requested timestamp.
    /// Recoverable: the caller clamps to the nearest valid bound and reports.
    #[error("seek to {ts_secs:.3}s failed: {reason}")]
    SeekFailure { ts_secs: f64, reason: String },

    /// Decode failure mid-stream. Never skipped silently — skipping would
    /// desynchronize the frame index. Playback auto-pauses, position is kept.
    #[error("corrupt frame near {ts_secs:.3}s: {reason}")]
    CorruptFrame { ts_secs: f64, reason: String },

    /// Frame number beyond the confirmed stream length.
    #[error("frame {frame} out of range (stream has {known} frames)")]
    OutOfRange { frame: u64, known: u64 },

    /// A newer navigation command superseded this one mid-walk. Internal:
    /// the worker discards the command without emitting anything.
    #[error("superseded by a newer request")]
    Superseded,
}

/// Channel-friendly discriminant for NavEvent::Error. `Superseded` has no
/// kind on purpose — it never crosses the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnreadableSource,
    SeekFailure,
    CorruptFrame,
    OutOfRange,
}

impl MediaError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            MediaError::UnreadableSource(_) => Some(ErrorKind::UnreadableSource),
            MediaError::SeekFailure { .. }  => Some(ErrorKind::SeekFailure),
            MediaError::CorruptFrame { .. } => Some(ErrorKind::CorruptFrame),
            MediaError::OutOfRange { .. }   => Some(ErrorKind::OutOfRange),
            MediaError::Superseded          => None,
        }
    }
}
