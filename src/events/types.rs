use crate::player::commands::PlayerState;
use crossterm::event::{KeyEvent, MouseEvent};

#[derive(Debug, Clone)]
pub enum AppEvent {
    // From input thread
    Input(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // From playback thread
    PlayerStateChanged(PlayerState),
    DurationChanged(f64),
    TrackEnded,
    PlayerError(String),
}
