// crates/framestep-media/src/cursor.rs
//
// DecodeCursor: materialize the exact requested logical frame, regardless
// of its distance from the nearest keyframe. Seek to the preceding
// keyframe, then decode forward discarding frames before the target.
//
// The walk-vs-reseek policy is the cheap path for single-step navigation
// and continuous play: when the target is just ahead of the last
// materialized frame we keep decoding from the open cursor instead of
// seeking. It is an optimization only — absence changes cost, never the
// result. Reseek on:
//   a) any backward movement — the walk can only go forward
//   b) forward jumps past WALK_AHEAD_SECS — walking a long GOP span blocks
//      the worker for hundreds of milliseconds; a keyframe seek is instant

use framestep_core::{MediaError, RawFrame};

use crate::index::FrameIndex;
use crate::source::FrameSource;

const WALK_AHEAD_SECS: f64 = 2.0;

/// A materialized frame plus the position bookkeeping the worker needs.
/// `landed_exactly` is false when end of stream forced a nearest-frame
/// substitute for the requested one.
pub struct Materialized {
    pub raw:            RawFrame,
    pub frame:          u64,
    pub landed_exactly: bool,
}

pub struct DecodeCursor {
    /// (logical frame, pts) of the last frame decoded with the current demux
    /// cursor; None when the position is unknown (fresh session, failed seek,
    /// abandoned walk) and the next materialization must start with a seek.
    last: Option<(u64, f64)>,
}

impl DecodeCursor {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Decode `target` and return it. `superseded` is polled between decoded
    /// frames; once it reports true the walk is abandoned cleanly — nothing
    /// delivered, cursor position invalidated so the next command starts
    /// from a known-valid seek point.
    pub fn materialize<S: FrameSource + ?Sized>(
        &mut self,
        src:        &mut S,
        index:      &mut FrameIndex,
        target:     u64,
        superseded: &dyn Fn() -> bool,
    ) -> Result<Materialized, MediaError> {
        let loc = index.locate(src, target)?;
        let half_frame = 0.5 / src.info().fps.max(1.0);

        let walk = match self.last {
            Some((_, last_pts)) => {
                loc.target_ts > last_pts + 1e-9
                    && loc.target_ts - last_pts <= WALK_AHEAD_SECS
            }
            None => false,
        };
        if !walk {
            if let Err(e) = src.seek_to_or_before(loc.seek_ts) {
                self.last = None;
                return Err(e);
            }
            self.last = None;
        }

        // Forward discard walk. `last_good` covers the EOF case:
        // a duration estimate that overshoots the real stream ends here, and
        // the final decoded frame stands in for the missing target.
        let mut last_good: Option<RawFrame> = None;
        loop {
            if superseded() {
                self.last = None;
                return Err(MediaError::Superseded);
            }
            match src.decode_next() {
                Err(e) => {
                    self.last = None;
                    return Err(e);
                }
                Ok(Some(raw)) => {
                    if raw.pts_secs + half_frame < loc.target_ts {
                        last_good = Some(raw);
                        continue;
                    }
                    let landed = (raw.pts_secs - loc.target_ts).abs() <= half_frame;
                    self.last = Some((target, raw.pts_secs));
                    return Ok(Materialized { raw, frame: target, landed_exactly: landed });
                }
                Ok(None) => {
                    let Some(raw) = last_good else {
                        self.last = None;
                        return Err(MediaError::OutOfRange {
                            frame: target,
                            known: index.frame_count_known_so_far(),
                        });
                    };
                    let frame = index.frame_at_or_before(src, raw.pts_secs)?;
                    index.confirm_count(frame + 1);
                    self.last = Some((frame, raw.pts_secs));
                    return Ok(Materialized { raw, frame, landed_exactly: false });
                }
            }
        }
    }
}

impl Default for DecodeCursor {
    fn default() -> Self {
        Self::new()
    }
}
