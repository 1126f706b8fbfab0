// crates/framestep-media/src/worker.rs
//
// Navigator: owns the single decode thread and the command/event channels.
// All public API that a frontend calls lives here.
//
// Concurrency model: one decode path. The adapter, index, and cursor are
// driven only from the worker thread; frontends submit commands and drain
// events on their own loop, never touching decode state. The scheduling
// tick while Playing comes from `recv_deadline` on the command channel,
// aligned to the target frame rate — slow decodes cause frame drops, not
// playback slowdown.
//
// Supersede policy: newest wins. Every navigation command (step/seek)
// bumps a shared generation; the cursor polls it between decoded frames
// and abandons stale walks, so rapid seek-bar scrubbing never queues up
// stale decode work and a superseded request delivers nothing.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use uuid::Uuid;

use framestep_core::helpers::time::format_duration;
use framestep_core::{DecodedFrame, MediaError, NavCommand, NavEvent, PlaybackState};

use crate::adapter::Demuxer;
use crate::cursor::{DecodeCursor, Materialized};
use crate::index::FrameIndex;
use crate::snapshot;
use crate::source::FrameSource;

// ── Internal types ────────────────────────────────────────────────────────────

struct Submitted {
    generation: u64,
    cmd:        NavCommand,
}

enum WorkerMsg {
    Cmd(Submitted),
    Shutdown,
}

type SourceFactory =
    Box<dyn FnMut(&Path) -> Result<Box<dyn FrameSource>, MediaError> + Send>;

// ── Navigator ─────────────────────────────────────────────────────────────────

pub struct Navigator {
    tx:         Sender<WorkerMsg>,
    /// Event stream: FrameReady/PositionChanged pairs, state changes, errors.
    pub rx:     Receiver<NavEvent>,
    /// Generation of the newest navigation command. The worker compares
    /// against it mid-walk to abandon superseded decode work.
    latest_nav: Arc<AtomicU64>,
    next_gen:   AtomicU64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::with_factory(Box::new(|path| {
            Ok(Box::new(Demuxer::open(path)?) as Box<dyn FrameSource>)
        }))
    }

    fn with_factory(factory: SourceFactory) -> Self {
        let (tx, cmd_rx) = bounded::<WorkerMsg>(64);
        let (ev_tx, rx)  = bounded::<NavEvent>(256);
        let latest_nav   = Arc::new(AtomicU64::new(0));

        let flag = Arc::clone(&latest_nav);
        thread::spawn(move || run(factory, cmd_rx, ev_tx, flag));

        Self { tx, rx, latest_nav, next_gen: AtomicU64::new(1) }
    }

    fn submit(&self, cmd: NavCommand) {
        let generation = self.next_gen.fetch_add(1, Ordering::Relaxed);
        if cmd.supersedable() {
            self.latest_nav.store(generation, Ordering::Relaxed);
        }
        let _ = self.tx.send(WorkerMsg::Cmd(Submitted { generation, cmd }));
    }

    pub fn open(&self, path: impl Into<std::path::PathBuf>) {
        self.submit(NavCommand::Open(path.into()));
    }

    pub fn play(&self) {
        self.submit(NavCommand::Play);
    }

    pub fn pause(&self) {
        self.submit(NavCommand::Pause);
    }

    /// Relative step: ±1 from the frame buttons, ±10 from the jump buttons.
    pub fn step(&self, delta: i64) {
        self.submit(NavCommand::Step(delta));
    }

    pub fn seek_to_frame(&self, frame: u64) {
        self.submit(NavCommand::SeekToFrame(frame));
    }

    pub fn seek_to_fraction(&self, fraction: f64) {
        self.submit(NavCommand::SeekToFraction(fraction));
    }

    /// Write the currently displayed frame to `dest` as PNG.
    pub fn save_frame(&self, dest: impl Into<std::path::PathBuf>) {
        self.submit(NavCommand::SaveFrame(dest.into()));
    }

    pub fn close(&self) {
        self.submit(NavCommand::Close);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

// ── Worker thread ─────────────────────────────────────────────────────────────

struct Session {
    id:             Uuid,
    src:            Box<dyn FrameSource>,
    index:          FrameIndex,
    cursor:         DecodeCursor,
    state:          PlaybackState,
    /// Retained copy of the last frame delivered — snapshot source, and the
    /// pixels that stay on screen through any fatal error.
    last_delivered: Option<DecodedFrame>,
    next_tick:      Instant,
}

fn run(
    mut factory: SourceFactory,
    cmd_rx:      Receiver<WorkerMsg>,
    ev_tx:       Sender<NavEvent>,
    latest_nav:  Arc<AtomicU64>,
) {
    let mut session: Option<Session> = None;
    loop {
        let playing = session
            .as_ref()
            .map_or(false, |s| s.state.clock.is_playing());

        let msg = if playing {
            let deadline = session.as_ref().map(|s| s.next_tick).unwrap_or_else(Instant::now);
            match cmd_rx.recv_deadline(deadline) {
                Ok(m) => Some(m),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        } else {
            match cmd_rx.recv() {
                Ok(m) => Some(m),
                Err(_) => return,
            }
        };

        match msg {
            Some(WorkerMsg::Shutdown) => return,
            Some(WorkerMsg::Cmd(sub)) => {
                // A navigation command that is already stale never runs at all.
                if sub.cmd.supersedable()
                    && latest_nav.load(Ordering::Relaxed) != sub.generation
                {
                    continue;
                }
                handle(&mut factory, &mut session, sub, &latest_nav, &ev_tx);
            }
            None => {
                if let Some(s) = session.as_mut() {
                    s.tick(&latest_nav, &ev_tx);
                }
            }
        }
    }
}

fn handle(
    factory:    &mut SourceFactory,
    session:    &mut Option<Session>,
    sub:        Submitted,
    latest_nav: &Arc<AtomicU64>,
    ev:         &Sender<NavEvent>,
) {
    // Session/playback commands use the current newest generation so their
    // decode work is cancelled only by a *later* navigation command.
    let gen = if sub.cmd.supersedable() {
        sub.generation
    } else {
        latest_nav.load(Ordering::Relaxed)
    };

    match sub.cmd {
        NavCommand::Open(path) => {
            if let Some(old) = session.take() {
                let _ = ev.send(NavEvent::Closed { session: old.id });
            }
            match factory(&path) {
                Err(e) => emit_error(ev, &e),
                Ok(src) => {
                    let info = src.info().clone();
                    let id   = Uuid::new_v4();
                    eprintln!(
                        "[media] opened {} — {}x{} @ {:.3} fps, {} ({})",
                        path.display(),
                        info.width,
                        info.height,
                        info.fps,
                        format_duration(info.duration_secs),
                        info.codec,
                    );
                    let index = FrameIndex::new(&info);
                    let mut state = PlaybackState::new();
                    state.reset(info.fps);
                    let _ = ev.send(NavEvent::Opened { session: id, info });

                    let mut s = Session {
                        id,
                        src,
                        index,
                        cursor: DecodeCursor::new(),
                        state,
                        last_delivered: None,
                        next_tick: Instant::now(),
                    };
                    // Show the first frame right away, like the original UI
                    // expects on load.
                    s.nav_to(0, gen, latest_nav, ev);
                    *session = Some(s);
                }
            }
        }

        NavCommand::Close => {
            if let Some(mut old) = session.take() {
                old.state.close();
                let _ = ev.send(NavEvent::Closed { session: old.id });
                eprintln!("[media] closed");
            }
        }

        NavCommand::Play => {
            if let Some(s) = session.as_mut() {
                s.play(ev);
            } else {
                eprintln!("[pb] play with no file open");
            }
        }

        NavCommand::Pause => {
            if let Some(s) = session.as_mut() {
                s.pause(ev);
            }
        }

        NavCommand::Step(delta) => {
            if let Some(s) = session.as_mut() {
                let target = s.state.current_frame.saturating_add_signed(delta);
                s.nav_to(target, gen, latest_nav, ev);
            }
        }

        NavCommand::SeekToFrame(frame) => {
            if let Some(s) = session.as_mut() {
                s.nav_to(frame, gen, latest_nav, ev);
            }
        }

        NavCommand::SeekToFraction(f) => {
            if let Some(s) = session.as_mut() {
                let known  = s.index.frame_count_known_so_far();
                let target =
                    (f.clamp(0.0, 1.0) * known.saturating_sub(1) as f64).round() as u64;
                s.nav_to(target, gen, latest_nav, ev);
            }
        }

        NavCommand::SaveFrame(dest) => {
            if let Some(s) = session.as_ref() {
                match s.last_delivered.as_ref() {
                    Some(frame) => match snapshot::save_png(frame, &dest) {
                        Ok(()) => {
                            let _ = ev.send(NavEvent::FrameSaved { path: dest });
                        }
                        Err(e) => eprintln!("[media] save_frame: {e}"),
                    },
                    None => eprintln!("[media] save_frame: no frame displayed"),
                }
            }
        }
    }
}

impl Session {
    /// Materialize `requested` (clamped into the known range) and deliver it.
    /// Any navigation while Playing drops to Paused first; the caller
    /// re-issues play() to resume.
    fn nav_to(
        &mut self,
        requested:  u64,
        gen:        u64,
        latest_nav: &Arc<AtomicU64>,
        ev:         &Sender<NavEvent>,
    ) {
        self.pause(ev);

        let known  = self.index.frame_count_known_so_far();
        let target = requested.min(known.saturating_sub(1));
        if target == self.state.current_frame && self.last_delivered.is_some() {
            return; // clamped to where we already are — nothing to emit
        }

        let flag   = Arc::clone(latest_nav);
        let cancel = move || flag.load(Ordering::Relaxed) != gen;

        match self
            .cursor
            .materialize(&mut *self.src, &mut self.index, target, &cancel)
        {
            Ok(m) => self.deliver(m, target == requested, ev),
            Err(MediaError::Superseded) => {}
            Err(MediaError::OutOfRange { known, .. }) => {
                // The index closed under us mid-command: clamp to the last
                // real frame instead of failing the whole seek.
                let last = known.saturating_sub(1);
                if last == self.state.current_frame && self.last_delivered.is_some() {
                    return;
                }
                match self
                    .cursor
                    .materialize(&mut *self.src, &mut self.index, last, &cancel)
                {
                    Ok(m) => self.deliver(m, false, ev),
                    Err(MediaError::Superseded) => {}
                    Err(e) => emit_error(ev, &e),
                }
            }
            // SeekFailure / CorruptFrame: report, keep the current position
            // and the last displayed frame.
            Err(e) => emit_error(ev, &e),
        }
    }

    /// One scheduling tick while Playing.
    fn tick(&mut self, latest_nav: &Arc<AtomicU64>, ev: &Sender<NavEvent>) {
        let now = Instant::now();
        self.next_tick = self.state.clock.next_deadline(now);
        let Some(target_ts) = self.state.clock.target_ts(now) else {
            return;
        };

        let known  = self.index.frame_count_known_so_far();
        let target = match self.index.frame_at_or_before(&mut *self.src, target_ts) {
            Ok(f) => f.min(known.saturating_sub(1)),
            Err(e) => {
                emit_error(ev, &e);
                self.pause(ev);
                return;
            }
        };

        if target <= self.state.current_frame {
            // Late tick — skip it, never decode backward during playback.
            // Once the final frame is on screen, playback ends.
            if self.at_final_frame() {
                self.pause(ev);
            }
            return;
        }

        // A stalled system yields target far ahead of current; materializing
        // the target directly drops the intermediates, preserving real-time
        // pacing over completeness.
        let gen    = latest_nav.load(Ordering::Relaxed);
        let flag   = Arc::clone(latest_nav);
        let cancel = move || flag.load(Ordering::Relaxed) != gen;

        match self
            .cursor
            .materialize(&mut *self.src, &mut self.index, target, &cancel)
        {
            Ok(m) => {
                let displayed_ts = m.raw.pts_secs;
                self.deliver(m, true, ev);
                self.state.clock.rebase(Instant::now(), displayed_ts);
                if self.at_final_frame() {
                    self.pause(ev);
                }
            }
            Err(MediaError::Superseded) => {} // the queued command takes over
            Err(e) => {
                emit_error(ev, &e);
                self.pause(ev);
            }
        }
    }

    /// Deliver pixels + position: FrameReady first, PositionChanged second,
    /// exactly once per displayed-frame change.
    fn deliver(&mut self, m: Materialized, exact_request: bool, ev: &Sender<NavEvent>) {
        let frame = DecodedFrame {
            session:        self.id,
            data:           m.raw.data,
            width:          m.raw.width,
            height:         m.raw.height,
            frame:          m.frame,
            pts_secs:       m.raw.pts_secs,
            landed_exactly: m.landed_exactly && exact_request,
        };
        self.state.current_frame = m.frame;
        self.last_delivered = Some(frame.clone_frame());
        let _ = ev.send(NavEvent::FrameReady(frame));
        let _ = ev.send(NavEvent::PositionChanged {
            session:      self.id,
            frame:        m.frame,
            known_frames: self.index.frame_count_known_so_far(),
            count_final:  self.index.count_final(),
        });
    }

    fn play(&mut self, ev: &Sender<NavEvent>) {
        if self.state.clock.is_playing() {
            return;
        }
        let now = Instant::now();
        let ts  = self
            .last_delivered
            .as_ref()
            .map_or(self.src.info().start_secs, |f| f.pts_secs);
        self.state.clock.play(now, ts);
        self.next_tick = self.state.clock.next_deadline(now);
        eprintln!("[pb] playing from frame {}", self.state.current_frame);
        let _ = ev.send(NavEvent::PlaybackState { session: self.id, playing: true });
    }

    fn pause(&mut self, ev: &Sender<NavEvent>) {
        if self.state.clock.is_playing() {
            self.state.clock.pause();
            eprintln!("[pb] paused at frame {}", self.state.current_frame);
            let _ = ev.send(NavEvent::PlaybackState { session: self.id, playing: false });
        }
    }

    fn at_final_frame(&self) -> bool {
        self.index.count_final()
            && self.state.current_frame + 1 >= self.index.frame_count_known_so_far()
    }
}

fn emit_error(ev: &Sender<NavEvent>, e: &MediaError) {
    eprintln!("[media] {e}");
    if let Some(kind) = e.kind() {
        let _ = ev.send(NavEvent::Error { kind, message: e.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsrc::ScriptedSource;
    use framestep_core::ErrorKind;
    use std::time::Duration;

    fn scripted(build: impl Fn() -> ScriptedSource + Send + 'static) -> Navigator {
        Navigator::with_factory(Box::new(move |_path| {
            Ok(Box::new(build()) as Box<dyn FrameSource>)
        }))
    }

    fn recv(nav: &Navigator) -> NavEvent {
        nav.rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker event within timeout")
    }

    /// Skip to the next FrameReady and assert its PositionChanged follows
    /// immediately — the event order contract. Panics on Error events.
    fn wait_pair(nav: &Navigator) -> (u64, bool, u64, bool) {
        loop {
            match recv(nav) {
                NavEvent::FrameReady(f) => match recv(nav) {
                    NavEvent::PositionChanged { frame, known_frames, count_final, .. } => {
                        assert_eq!(frame, f.frame, "position must match delivered frame");
                        return (f.frame, f.landed_exactly, known_frames, count_final);
                    }
                    _ => panic!("expected PositionChanged right after FrameReady"),
                },
                NavEvent::Error { message, .. } => panic!("unexpected error: {message}"),
                _ => {}
            }
        }
    }

    fn wait_error(nav: &Navigator) -> ErrorKind {
        loop {
            match recv(nav) {
                NavEvent::Error { kind, .. } => return kind,
                NavEvent::FrameReady(f) => panic!("unexpected frame {}", f.frame),
                _ => {}
            }
        }
    }

    /// Drain until the worker has been quiet for a while.
    fn drain_quiet(nav: &Navigator) -> Vec<NavEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = nav.rx.recv_timeout(Duration::from_millis(400)) {
            out.push(ev);
        }
        out
    }

    #[test]
    fn open_reports_descriptor_then_first_frame() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0));
        nav.open("clip.mp4");
        match recv(&nav) {
            NavEvent::Opened { info, .. } => {
                assert_eq!(info.fps, 30.0);
                assert_eq!(info.declared_frames, Some(300));
                assert!(info.constant_rate);
            }
            _ => panic!("expected Opened first"),
        }
        let (frame, exact, known, fin) = wait_pair(&nav);
        assert_eq!((frame, exact, known, fin), (0, true, 300, true));
    }

    #[test]
    fn frame_accurate_scenario_300_frames_30fps() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.seek_to_frame(150);
        let (frame, exact, _, _) = wait_pair(&nav);
        assert_eq!((frame, exact), (150, true));

        nav.step(1);
        let (frame, exact, _, _) = wait_pair(&nav);
        assert_eq!((frame, exact), (151, true));

        nav.seek_to_fraction(1.0);
        let (frame, _, known, fin) = wait_pair(&nav);
        assert_eq!(frame, 299);
        assert_eq!((known, fin), (300, true));
    }

    #[test]
    fn step_round_trips() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.seek_to_frame(100);
        assert_eq!(wait_pair(&nav).0, 100);
        nav.step(1);
        assert_eq!(wait_pair(&nav).0, 101);
        nav.step(-1);
        let (frame, exact, _, _) = wait_pair(&nav);
        assert_eq!((frame, exact), (100, true));
    }

    #[test]
    fn multi_frame_jump_steps() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.seek_to_frame(50);
        assert_eq!(wait_pair(&nav).0, 50);
        nav.step(10);
        assert_eq!(wait_pair(&nav).0, 60);
        nav.step(-10);
        assert_eq!(wait_pair(&nav).0, 50);
    }

    #[test]
    fn backward_step_at_zero_emits_nothing() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.step(-1); // clamps to 0 — no frame change, no events
        nav.seek_to_frame(5);
        assert_eq!(wait_pair(&nav).0, 5, "next delivery must be the seek, not the no-op");
    }

    #[test]
    fn seek_past_end_clamps_with_landed_flag_cleared() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.seek_to_frame(1000);
        let (frame, exact, known, fin) = wait_pair(&nav);
        assert_eq!(frame, 299);
        assert!(!exact, "substituted frame must not claim exact landing");
        assert_eq!((known, fin), (300, true));
    }

    #[test]
    fn scrubbing_supersedes_stale_seeks() {
        let nav = scripted(|| {
            ScriptedSource::cfr(300, 30.0).with_decode_delay(Duration::from_millis(2))
        });
        nav.open("clip.mp4");
        wait_pair(&nav);

        // Rapid scrub: mid-GOP targets so each walk costs several decodes.
        for f in [25, 45, 65, 85, 105, 125, 145, 165, 185] {
            nav.seek_to_frame(f);
        }
        nav.seek_to_frame(123);

        let events = drain_quiet(&nav);
        let frames: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                NavEvent::FrameReady(f) => Some(f.frame),
                _ => None,
            })
            .collect();
        assert_eq!(
            frames.last().copied(),
            Some(123),
            "final delivery must match the last issued seek, got {frames:?}"
        );
    }

    #[test]
    fn playing_advances_to_eof_and_pauses_on_last_frame() {
        let nav = scripted(|| ScriptedSource::cfr(24, 120.0));
        nav.open("clip.mp4");
        wait_pair(&nav);
        nav.play();

        let mut frames = Vec::new();
        loop {
            match recv(&nav) {
                NavEvent::FrameReady(f) => frames.push(f.frame),
                NavEvent::PlaybackState { playing: false, .. } => break,
                NavEvent::Error { message, .. } => panic!("{message}"),
                _ => {}
            }
        }
        assert_eq!(frames.last().copied(), Some(23), "playback must end on the final frame");
        assert!(
            frames.windows(2).all(|w| w[0] < w[1]),
            "playback never decodes backward: {frames:?}"
        );
    }

    #[test]
    fn seek_while_playing_drops_to_paused() {
        let nav = scripted(|| ScriptedSource::cfr(3000, 60.0));
        nav.open("clip.mp4");
        wait_pair(&nav);
        nav.play();
        wait_pair(&nav); // at least one played frame

        nav.seek_to_frame(500);
        loop {
            match recv(&nav) {
                NavEvent::PlaybackState { playing: false, .. } => break,
                NavEvent::FrameReady(_) | NavEvent::PositionChanged { .. } => {} // in-flight ticks
                NavEvent::Error { message, .. } => panic!("{message}"),
                _ => {}
            }
        }
        assert_eq!(wait_pair(&nav).0, 500);

        // Paused means paused: no further frames without play().
        let quiet = drain_quiet(&nav);
        assert!(
            quiet.iter().all(|e| !matches!(e, NavEvent::FrameReady(_))),
            "no playback frames after the implicit pause"
        );
    }

    #[test]
    fn corrupt_frame_reports_and_keeps_position() {
        let nav = scripted(|| ScriptedSource::cfr(300, 30.0).with_corrupt_at(105));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.seek_to_frame(100);
        assert_eq!(wait_pair(&nav).0, 100);

        nav.seek_to_frame(110); // walk crosses the corrupt frame
        assert_eq!(wait_error(&nav), ErrorKind::CorruptFrame);

        // Position unchanged; navigation before the bad region still works.
        nav.seek_to_frame(101);
        let (frame, exact, _, _) = wait_pair(&nav);
        assert_eq!((frame, exact), (101, true));
    }

    #[test]
    fn lying_container_count_is_corrected_after_the_fact() {
        // Container declares 40 frames; the stream really has 32.
        let nav = scripted(|| ScriptedSource::cfr(32, 30.0).with_declared(40));
        nav.open("clip.mp4");
        let (_, _, known, _) = wait_pair(&nav);
        assert_eq!(known, 40); // best-known estimate at open

        nav.seek_to_frame(38);
        let (frame, exact, known, fin) = wait_pair(&nav);
        assert_eq!(frame, 31, "EOF clamps to the last real frame");
        assert!(!exact);
        assert_eq!((known, fin), (32, true), "count corrected once EOF proves it");
    }

    #[test]
    fn vfr_stream_numbers_frames_by_timestamp() {
        let pts: Vec<f64> = vec![0.0, 0.05, 0.09, 0.16, 0.20, 0.31, 0.33, 0.40, 0.52, 0.60];
        let nav = scripted(move || ScriptedSource::vfr(&pts, 4));
        nav.open("clip.mkv");
        assert_eq!(wait_pair(&nav).0, 0);

        nav.seek_to_frame(5);
        let (frame, exact, known, fin) = wait_pair(&nav);
        assert_eq!((frame, exact), (5, true));
        assert_eq!((known, fin), (10, true));
    }

    #[test]
    fn close_emits_closed_and_ignores_navigation() {
        let nav = scripted(|| ScriptedSource::cfr(30, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        nav.close();
        loop {
            match recv(&nav) {
                NavEvent::Closed { .. } => break,
                NavEvent::Error { message, .. } => panic!("{message}"),
                _ => {}
            }
        }

        nav.step(1);
        let quiet = drain_quiet(&nav);
        assert!(quiet.iter().all(|e| !matches!(e, NavEvent::FrameReady(_))));
    }

    #[test]
    fn save_frame_writes_png_and_reports() {
        let nav = scripted(|| ScriptedSource::cfr(30, 30.0));
        nav.open("clip.mp4");
        wait_pair(&nav);

        let dest = std::env::temp_dir().join("framestep-worker-save.png");
        nav.save_frame(dest.clone());
        loop {
            match recv(&nav) {
                NavEvent::FrameSaved { path } => {
                    assert_eq!(path, dest);
                    break;
                }
                NavEvent::Error { message, .. } => panic!("{message}"),
                _ => {}
            }
        }
        assert!(dest.exists());
        let _ = std::fs::remove_file(&dest);
    }
}
