// crates/framestep-media/src/testsrc.rs
//
// ScriptedSource: an in-memory FrameSource with a known GOP structure.
// Stands in for FFmpeg so navigation semantics are testable without media
// files — the same role the software decoder plays for hardware decode
// elsewhere. Test-only.

use std::time::Duration;

use framestep_core::{MediaError, RawFrame, ScanEntry, StreamInfo};

use crate::source::FrameSource;

const KEY_EVERY_CFR: usize = 10;

pub struct ScriptedSource {
    info:         StreamInfo,
    /// Presentation timestamps, presentation order.
    pts:          Vec<f64>,
    /// Keyframe flags, same order.
    keys:         Vec<bool>,
    /// Decode cursor: next frame to come out of decode_next.
    pos:          usize,
    /// Independent packet-scan cursor.
    scan_pos:     usize,
    seeks:        usize,
    corrupt_at:   Option<usize>,
    decode_delay: Duration,
}

impl ScriptedSource {
    /// Constant-rate stream: `frames` frames at `fps`, keyframe every 10th.
    pub fn cfr(frames: usize, fps: f64) -> Self {
        let pts: Vec<f64> = (0..frames).map(|i| i as f64 / fps).collect();
        let keys = (0..frames).map(|i| i % KEY_EVERY_CFR == 0).collect();
        let duration = frames as f64 / fps;
        Self {
            info: StreamInfo {
                width:           4,
                height:          2,
                fps,
                duration_secs:   duration,
                start_secs:      0.0,
                declared_frames: Some(frames as u64),
                codec:           "h264".into(),
                constant_rate:   true,
            },
            pts,
            keys,
            pos: 0,
            scan_pos: 0,
            seeks: 0,
            corrupt_at: None,
            decode_delay: Duration::ZERO,
        }
    }

    /// Variable-rate stream from explicit timestamps (presentation order,
    /// duplicates allowed — the index is expected to drop them). Keyframe on
    /// every `key_every`-th frame.
    pub fn vfr(pts: &[f64], key_every: usize) -> Self {
        let n = pts.len();
        let duration = pts.last().copied().unwrap_or(0.0) + 0.04;
        let fps = if duration > 0.0 { n as f64 / duration } else { 25.0 };
        Self {
            info: StreamInfo {
                width:           4,
                height:          2,
                fps,
                duration_secs:   duration,
                start_secs:      pts.first().copied().unwrap_or(0.0),
                declared_frames: None,
                codec:           "vp9".into(),
                constant_rate:   false,
            },
            pts: pts.to_vec(),
            keys: (0..n).map(|i| i % key_every.max(1) == 0).collect(),
            pos: 0,
            scan_pos: 0,
            seeks: 0,
            corrupt_at: None,
            decode_delay: Duration::ZERO,
        }
    }

    /// Override the container-declared count (to model a lying container).
    pub fn with_declared(mut self, declared: u64) -> Self {
        self.info.declared_frames = Some(declared);
        self.info.duration_secs = declared as f64 / self.info.fps;
        self
    }

    /// Decoding presentation index `at` fails with CorruptFrame.
    pub fn with_corrupt_at(mut self, at: usize) -> Self {
        self.corrupt_at = Some(at);
        self
    }

    /// Sleep per decoded frame — models decode cost so supersede races are
    /// exercisable.
    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = delay;
        self
    }

    pub fn seeks(&self) -> usize {
        self.seeks
    }
}

impl FrameSource for ScriptedSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn seek_to_or_before(&mut self, ts_secs: f64) -> Result<(), MediaError> {
        self.seeks += 1;
        // Land on the greatest keyframe at or before ts, like a container.
        let mut landing = 0;
        for (i, &p) in self.pts.iter().enumerate() {
            if self.keys[i] && p <= ts_secs + 1e-9 {
                landing = i;
            }
        }
        self.pos = landing;
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<RawFrame>, MediaError> {
        if self.pos >= self.pts.len() {
            return Ok(None);
        }
        if self.corrupt_at == Some(self.pos) {
            return Err(MediaError::CorruptFrame {
                ts_secs: self.pts[self.pos],
                reason:  "scripted corruption".into(),
            });
        }
        if !self.decode_delay.is_zero() {
            std::thread::sleep(self.decode_delay);
        }
        let i = self.pos;
        self.pos += 1;
        let mut data = vec![0u8; (self.info.width * self.info.height * 4) as usize];
        data[0] = (i % 256) as u8;
        Ok(Some(RawFrame {
            data,
            width:    self.info.width,
            height:   self.info.height,
            pts_secs: self.pts[i],
        }))
    }

    fn scan_next(&mut self) -> Result<Option<ScanEntry>, MediaError> {
        if self.scan_pos >= self.pts.len() {
            return Ok(None);
        }
        let i = self.scan_pos;
        self.scan_pos += 1;
        Ok(Some(ScanEntry { pts_secs: self.pts[i], is_key: self.keys[i] }))
    }
}
