// crates/framestep-core/src/commands.rs
//
// Every frontend action is expressed as a NavCommand. Frontends submit
// these; the navigation worker processes them one at a time on its decode
// thread. Adding a capability = add a variant here + one match arm in
// framestep-media/src/worker.rs.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum NavCommand {
    // ── Session ──────────────────────────────────────────────────────────────
    Open(PathBuf),
    Close,

    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,

    // ── Navigation (supersedable: newest wins while scrubbing) ───────────────
    /// Relative step. ±1 from the frame buttons, ±10 from the jump buttons.
    /// Backward steps re-seek from the preceding keyframe; forward steps of
    /// any size reuse the open decode cursor when cheap.
    Step(i64),
    SeekToFrame(u64),
    /// Position as a fraction of the best-known frame count, clamped to
    /// [0, 1]. Mapped through the index; the reported position is corrected
    /// later if a variable-rate estimate proves wrong.
    SeekToFraction(f64),

    // ── Extras ───────────────────────────────────────────────────────────────
    /// Write the currently displayed frame to disk as PNG.
    SaveFrame(PathBuf),
}

impl NavCommand {
    /// Navigation commands participate in newest-wins superseding; session
    /// and playback commands are always executed.
    pub fn supersedable(&self) -> bool {
        matches!(
            self,
            NavCommand::Step(_) | NavCommand::SeekToFrame(_) | NavCommand::SeekToFraction(_)
        )
    }
}
