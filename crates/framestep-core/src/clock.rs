// crates/framestep-core/src/clock.rs
//
// Playback clock: decides which logical timestamp should be on screen at
// wall-clock time `now`. Pure state machine — all time comes in as explicit
// `Instant` arguments so the worker drives it with real time and tests drive
// it with synthetic time.
//
// The pacing rule is the same one the scheduling tick enforces: a frame is
// due when its presentation timestamp has been reached. Late ticks skip
// (never decode backward while playing); a stalled system jumps straight to
// the due frame, dropping intermediates to preserve real-time pacing.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// No file open.
    Stopped,
    /// File open, not advancing.
    Paused,
    /// Advancing against the wall-clock reference pair.
    Playing,
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state:  ClockState,
    /// Target rate, frames per second. Set on open from the stream descriptor.
    fps:    f64,
    /// Wall-clock moment paired with `ref_ts`. Valid only while Playing.
    ref_at: Option<Instant>,
    /// Presentation timestamp (seconds) that was current at `ref_at`.
    ref_ts: f64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self { state: ClockState::Stopped, fps: 0.0, ref_at: None, ref_ts: 0.0 }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    /// Stopped → Paused, on open. Also records the stream's target rate.
    pub fn open(&mut self, fps: f64) {
        self.state  = ClockState::Paused;
        self.fps    = fps.max(1.0);
        self.ref_at = None;
        self.ref_ts = 0.0;
    }

    /// Any state → Stopped, on close.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    /// Paused → Playing: pair `now` with the displayed frame's timestamp.
    pub fn play(&mut self, now: Instant, current_ts: f64) {
        if self.state == ClockState::Paused {
            self.state  = ClockState::Playing;
            self.ref_at = Some(now);
            self.ref_ts = current_ts;
        }
    }

    /// Playing → Paused (explicit pause, end of stream, seek while playing,
    /// or a fatal decode error). The reference pair is invalidated.
    pub fn pause(&mut self) {
        if self.state == ClockState::Playing {
            self.state  = ClockState::Paused;
            self.ref_at = None;
        }
    }

    /// Re-anchor the reference pair after a frame is displayed. Using the
    /// frame's actual timestamp and the actual display moment keeps the pair
    /// truthful across dropped frames — residual error stays under one frame
    /// instead of accumulating.
    pub fn rebase(&mut self, now: Instant, displayed_ts: f64) {
        if self.state == ClockState::Playing {
            self.ref_at = Some(now);
            self.ref_ts = displayed_ts;
        }
    }

    /// The timestamp that should be on screen at `now`: reference timestamp
    /// plus wall-clock elapsed. None unless Playing.
    pub fn target_ts(&self, now: Instant) -> Option<f64> {
        let at = self.ref_at?;
        if self.state != ClockState::Playing {
            return None;
        }
        Some(self.ref_ts + now.saturating_duration_since(at).as_secs_f64())
    }

    /// Scheduling tick period, aligned to the target frame rate. The timer
    /// paces the tick, not the decoder — slow decodes drop frames rather
    /// than slowing playback down.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1.0))
    }

    /// Deadline for the next scheduling tick.
    pub fn next_deadline(&self, now: Instant) -> Instant {
        now + self.tick_interval()
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn opens_paused_and_plays_from_reference() {
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        assert_eq!(c.state(), ClockState::Stopped);

        c.open(30.0);
        assert_eq!(c.state(), ClockState::Paused);
        assert_eq!(c.target_ts(t0), None);

        c.play(t0, 5.0);
        assert!(c.is_playing());
        let t = c.target_ts(t0 + secs(1.0)).unwrap();
        assert!((t - 6.0).abs() < 1e-9);
    }

    #[test]
    fn pause_invalidates_reference() {
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        c.open(30.0);
        c.play(t0, 0.0);
        c.pause();
        assert_eq!(c.state(), ClockState::Paused);
        assert_eq!(c.target_ts(t0 + secs(1.0)), None);
    }

    #[test]
    fn rebase_tracks_displayed_frame() {
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        c.open(30.0);
        c.play(t0, 0.0);

        // One tick late by half a frame: target advances past frame 1.
        let tick = t0 + secs(1.5 / 30.0);
        let t = c.target_ts(tick).unwrap();
        assert!(t >= 1.0 / 30.0 && t < 2.0 / 30.0);

        // Displayed frame 1 at `tick`; subsequent elapsed counts from there.
        c.rebase(tick, 1.0 / 30.0);
        let t = c.target_ts(tick + secs(1.0 / 30.0)).unwrap();
        assert!((t - 2.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn stall_targets_jump_not_crawl() {
        // A 0.5 s stall at 30 fps must target ~15 frames ahead in one tick.
        let t0 = Instant::now();
        let mut c = PlaybackClock::new();
        c.open(30.0);
        c.play(t0, 0.0);
        let t = c.target_ts(t0 + secs(0.5)).unwrap();
        assert!((t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn tick_interval_follows_rate() {
        let mut c = PlaybackClock::new();
        c.open(25.0);
        assert_eq!(c.tick_interval(), Duration::from_secs_f64(0.04));
    }

    #[test]
    fn simulated_playback_stays_within_one_frame() {
        // Drive D = 2.0 s of ticks at R = 30 fps with jittered tick arrival;
        // the final displayed frame must land within ±1 of round(D * R).
        let t0 = Instant::now();
        let fps = 30.0;
        let mut c = PlaybackClock::new();
        c.open(fps);
        c.play(t0, 0.0);

        let mut displayed: i64 = 0;
        let jitter = [0.0, 0.004, -0.002, 0.009, 0.001, -0.003];
        let mut now = t0;
        let mut i = 0usize;
        while now < t0 + secs(2.0) {
            let step = (1.0 / fps + jitter[i % jitter.len()]).max(0.001);
            now += secs(step);
            i += 1;
            let target = (c.target_ts(now).unwrap() * fps).floor() as i64;
            if target > displayed {
                displayed = target; // late ticks (target <= displayed) skip
                c.rebase(now, displayed as f64 / fps);
            }
        }
        let expected = (2.0 * fps).round() as i64;
        assert!((displayed - expected).abs() <= 1, "displayed {displayed} vs {expected}");
    }
}
