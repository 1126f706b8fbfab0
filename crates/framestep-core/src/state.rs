// crates/framestep-core/src/state.rs
//
// PlaybackState: the single mutable record of "where playback is". One
// instance lives on the navigation worker thread and is mutated only while
// handling commands — timer ticks and frontends never touch it directly.

use crate::clock::{ClockState, PlaybackClock};

#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Logical frame of the last DecodedFrame delivered. Invariant: at any
    /// quiescent moment this equals the frame number stamped on the pixels
    /// the frontend is showing.
    pub current_frame: u64,
    pub clock:         PlaybackClock,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self { current_frame: 0, clock: PlaybackClock::new() }
    }

    /// Reset for a newly opened file.
    pub fn reset(&mut self, fps: f64) {
        self.current_frame = 0;
        self.clock.open(fps);
    }

    pub fn close(&mut self) {
        self.current_frame = 0;
        self.clock.close();
    }

    pub fn is_open(&self) -> bool {
        self.clock.state() != ClockState::Stopped
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}
