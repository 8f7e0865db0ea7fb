use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Prepare a source for playback, paused at zero. Replaces any
    /// current source.
    Load { path: PathBuf },
    Pause,
    Resume,
    Stop,
    /// Target position in seconds, passed through from the widget
    /// unclamped.
    Seek(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Loading,
    Playing,
    Paused,
}
