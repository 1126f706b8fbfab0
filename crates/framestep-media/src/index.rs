// crates/framestep-media/src/index.rs
//
// FrameIndex: the single authority answering "given logical frame N, what
// timestamp do I need, and what keyframe timestamp must I seek to first".
//
// Constant-rate streams are analytic — timestamp = start + N / fps, no
// storage. Variable-rate streams build the mapping lazily from the packet
// scan cursor: logical frame number is *defined* by position in the scanned
// presentation-order sequence. The index never shrinks and never renumbers
// a frame it has already assigned.

use framestep_core::{MediaError, ScanEntry, StreamInfo};

use crate::source::FrameSource;

/// Packets arrive in decode order; B-frames put presentation timestamps out
/// of order within a bounded window. Entries are confirmed (numbered) only
/// once this many later packets have been seen, so numbering is stable.
const REORDER_DEPTH: usize = 16;

/// Two packets closer than this are the same timestamp bucket — a rare
/// encoder artifact. The earlier decode-order packet wins; the later one is
/// dropped so the frame count cannot drift.
const DUP_EPS: f64 = 1e-4;

/// Answer from `locate`: where to seek, and which timestamp to walk to.
#[derive(Debug, Clone, Copy)]
pub struct Locate {
    pub seek_ts:   f64,
    pub target_ts: f64,
}

pub struct FrameIndex {
    constant_rate: bool,
    fps:           f64,
    start_secs:    f64,
    duration_secs: f64,
    /// Container-declared frame count (mp4/mov carry one, mkv usually not).
    declared:      Option<u64>,
    /// Set once end of stream pins the real count. Authoritative.
    confirmed:     Option<u64>,

    // ── Variable-rate state ──────────────────────────────────────────────────
    /// Confirmed presentation timestamps; index = logical frame number.
    entries:   Vec<f64>,
    /// Sorted reorder buffer; tail of the scan not yet confirmed.
    pending:   Vec<f64>,
    /// Keyframe timestamps, sorted.
    keyframes: Vec<f64>,
    scan_eof:  bool,
}

impl FrameIndex {
    pub fn new(info: &StreamInfo) -> Self {
        Self {
            constant_rate: info.constant_rate,
            fps:           info.fps.max(1.0),
            start_secs:    info.start_secs,
            duration_secs: info.duration_secs,
            declared:      info.declared_frames,
            confirmed:     None,
            entries:       Vec::new(),
            pending:       Vec::new(),
            keyframes:     Vec::new(),
            scan_eof:      false,
        }
    }

    fn frame_secs(&self) -> f64 {
        1.0 / self.fps
    }

    fn estimate(&self) -> u64 {
        (self.duration_secs * self.fps).round() as u64
    }

    /// Best-known total frame count. A lower bound until `count_final`;
    /// monotonically non-decreasing while scanning (the duration-based
    /// estimate is fixed at open).
    pub fn frame_count_known_so_far(&self) -> u64 {
        if let Some(c) = self.confirmed {
            return c.max(1);
        }
        let est = self.declared.unwrap_or_else(|| self.estimate());
        if self.constant_rate {
            est.max(1)
        } else {
            est.max((self.entries.len() + self.pending.len()) as u64).max(1)
        }
    }

    /// True once the count can no longer change: end of stream confirmed it,
    /// or the container declared it for a constant-rate stream.
    pub fn count_final(&self) -> bool {
        self.confirmed.is_some() || (self.constant_rate && self.declared.is_some())
    }

    fn final_total(&self) -> Option<u64> {
        self.confirmed
            .or(if self.constant_rate { self.declared } else { None })
    }

    /// The decode cursor hit end of stream at `count` frames (a duration
    /// estimate overshot). Counts only ever tighten downward.
    pub fn confirm_count(&mut self, count: u64) {
        let c = self.confirmed.map_or(count, |x| x.min(count));
        self.confirmed = Some(c);
        eprintln!("[media] frame count confirmed: {c}");
    }

    /// Analytic timestamp for a constant-rate frame.
    fn cfr_ts(&self, frame: u64) -> f64 {
        self.start_secs + frame as f64 * self.frame_secs()
    }

    /// Where must I seek, and what timestamp must I walk to, for `frame`.
    /// Extends the variable-rate index on demand. `OutOfRange` only once the
    /// count is closed and `frame` is beyond it.
    pub fn locate<S: FrameSource + ?Sized>(
        &mut self,
        src:   &mut S,
        frame: u64,
    ) -> Result<Locate, MediaError> {
        if let Some(total) = self.final_total() {
            if frame >= total {
                return Err(MediaError::OutOfRange { frame, known: total });
            }
        }

        if self.constant_rate {
            // Backward container seek lands on the preceding keyframe; the
            // target timestamp itself is all the cursor needs.
            let target = self.cfr_ts(frame);
            return Ok(Locate { seek_ts: target, target_ts: target });
        }

        self.extend_to(src, frame + REORDER_DEPTH as u64)?;
        match self.entries.get(frame as usize) {
            Some(&target) => Ok(Locate { seek_ts: self.seek_ts_for(target), target_ts: target }),
            None => Err(MediaError::OutOfRange {
                frame,
                known: self.entries.len() as u64,
            }),
        }
    }

    /// Greatest keyframe timestamp ≤ `target`, falling back to stream start.
    fn seek_ts_for(&self, target: f64) -> f64 {
        let i = self.keyframes.partition_point(|k| *k <= target + DUP_EPS);
        if i == 0 {
            self.start_secs.min(target)
        } else {
            self.keyframes[i - 1]
        }
    }

    /// Logical frame whose presentation timestamp is the greatest ≤ `ts`.
    /// This is the playback clock's query; clamped into the known range.
    pub fn frame_at_or_before<S: FrameSource + ?Sized>(
        &mut self,
        src: &mut S,
        ts:  f64,
    ) -> Result<u64, MediaError> {
        if self.constant_rate {
            let f = ((ts - self.start_secs) * self.fps + 1e-6).floor().max(0.0) as u64;
            return Ok(f.min(self.frame_count_known_so_far().saturating_sub(1)));
        }

        // Scan until the confirmed entries cover `ts` (or the file ends).
        while !self.scan_eof && self.entries.last().map_or(true, |&p| p < ts) {
            self.scan_step(src)?;
        }
        let i = self.entries.partition_point(|&p| p <= ts + DUP_EPS);
        Ok((i.saturating_sub(1)) as u64)
    }

    /// Extend the variable-rate index until frame `upto` is confirmed or the
    /// scan hits end of stream. Never called for constant-rate streams.
    fn extend_to<S: FrameSource + ?Sized>(
        &mut self,
        src:  &mut S,
        upto: u64,
    ) -> Result<(), MediaError> {
        while !self.scan_eof && (self.entries.len() as u64) <= upto {
            self.scan_step(src)?;
        }
        Ok(())
    }

    fn scan_step<S: FrameSource + ?Sized>(&mut self, src: &mut S) -> Result<(), MediaError> {
        match src.scan_next()? {
            Some(e) => self.observe(e),
            None => {
                self.scan_eof = true;
                self.entries.append(&mut self.pending);
                self.confirmed = Some(self.entries.len() as u64);
                eprintln!("[media] index closed at {} frames", self.entries.len());
            }
        }
        Ok(())
    }

    fn observe(&mut self, e: ScanEntry) {
        let pts = e.pts_secs;

        if e.is_key {
            let i = self.keyframes.partition_point(|k| *k <= pts);
            if i == 0 || (self.keyframes[i - 1] - pts).abs() > DUP_EPS {
                self.keyframes.insert(i, pts);
            }
        }

        // A timestamp at or below the confirmed boundary would renumber
        // already-assigned frames — drop it (reorder deeper than the window
        // is pathological; losing the packet beats losing numbering).
        if let Some(&last) = self.entries.last() {
            if pts <= last + DUP_EPS {
                eprintln!("[media] index: pts {pts:.4}s behind confirmed window, dropped");
                return;
            }
        }
        if self.pending.iter().any(|p| (p - pts).abs() < DUP_EPS) {
            eprintln!("[media] index: duplicate pts {pts:.4}s dropped");
            return;
        }

        let i = self.pending.partition_point(|p| *p <= pts);
        self.pending.insert(i, pts);
        while self.pending.len() > REORDER_DEPTH {
            self.entries.push(self.pending.remove(0));
        }
    }
}
