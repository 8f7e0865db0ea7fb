use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};

use crate::player::commands::PlayerState;
use crate::ui::format_duration;
use crate::ui::notifications::NotificationManager;
use crate::widget::PlayerWidget;

pub struct App {
    pub widget: PlayerWidget,

    /// Files given on the command line; `n`/`p` cycle through them.
    sources: Vec<PathBuf>,
    current_source: usize,

    /// Transport state as last reported by the playback thread; shown as
    /// status text, not part of the widget's own state machine.
    pub player_state: PlayerState,

    pub notifications: NotificationManager,

    /// Animation epoch for the metadata spinner.
    pub started_at: Instant,

    pub should_quit: bool,
}

impl App {
    /// `sources` must be non-empty; the widget arrives already bound to
    /// the first entry.
    pub fn new(widget: PlayerWidget, sources: Vec<PathBuf>) -> Self {
        Self {
            widget,
            sources,
            current_source: 0,
            player_state: PlayerState::Stopped,
            notifications: NotificationManager::new(),
            started_at: Instant::now(),
            should_quit: false,
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                // Best effort: quitting an already-detached widget is fine.
                let _ = self.widget.delete_instance();
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                if let Err(e) = self.widget.play() {
                    self.notifications.warning(e.to_string());
                }
            }
            KeyCode::Char('s') => {
                if let Err(e) = self.widget.stop() {
                    self.notifications.warning(e.to_string());
                }
            }
            KeyCode::Char('n') => {
                self.switch_source(1);
            }
            KeyCode::Char('p') => {
                self.switch_source(-1);
            }
            KeyCode::Left => {
                let _ = self.widget.seek_by(-5.0);
            }
            KeyCode::Right => {
                let _ = self.widget.seek_by(5.0);
            }
            KeyCode::Up => {
                self.widget.nudge_volume(0.05);
            }
            KeyCode::Down => {
                self.widget.nudge_volume(-0.05);
            }
            _ => {}
        }
    }

    /// Rebind the widget to the adjacent source file, wrapping at the ends.
    fn switch_source(&mut self, direction: i32) {
        if self.sources.len() < 2 {
            return;
        }
        let count = self.sources.len() as i32;
        let next = (self.current_source as i32 + direction).rem_euclid(count) as usize;
        let path = self.sources[next].clone();

        match self.widget.set_audio_source(path.clone()) {
            Ok(()) => {
                self.current_source = next;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.notifications.info(format!("Source: {}", name));
            }
            Err(e) => self.notifications.warning(e.to_string()),
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        self.widget.handle_mouse(event);
    }

    pub fn on_player_state_changed(&mut self, state: PlayerState) {
        self.player_state = state;
    }

    pub fn on_duration_changed(&mut self, duration_secs: f64) {
        self.widget.on_duration_changed(duration_secs);
        self.notifications
            .info(format!("Ready: {}", format_duration(duration_secs)));
    }

    pub fn on_track_ended(&mut self) {
        self.widget.on_track_ended();
        self.notifications.info("Playback finished");
    }

    pub fn on_player_error(&mut self, error: String) {
        self.notifications.error(error);
    }

    /// Fired on the 500 ms repaint interval.
    pub fn on_tick(&mut self) {
        self.widget.on_tick();
        self.notifications.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::commands::PlayerCommand;
    use crate::player::handle::{MediaHandle, SharedPlayback};
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::mpsc::{self, Receiver};

    fn app() -> (App, Receiver<PlayerCommand>) {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(SharedPlayback::new());
        shared.set_duration(90.0);
        let media = MediaHandle::new(tx, shared);
        let mut widget = PlayerWidget::new(media, PathBuf::from("song.flac"));
        widget.on_duration_changed(90.0);
        rx.try_recv().expect("load command");
        let sources = vec![PathBuf::from("song.flac"), PathBuf::from("other.flac")];
        (App::new(widget, sources), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn space_toggles_playback() {
        let (mut app, rx) = app();
        app.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Resume);
        app.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Pause);
    }

    #[test]
    fn stop_rewinds() {
        let (mut app, rx) = app();
        app.handle_input(key(KeyCode::Char(' ')));
        rx.try_recv().unwrap();

        app.handle_input(key(KeyCode::Char('s')));
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Pause);
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(0.0));
    }

    #[test]
    fn quit_tears_the_widget_down() {
        let (mut app, _rx) = app();
        app.handle_input(key(KeyCode::Char('q')));
        assert!(app.should_quit);
        assert!(app.widget.is_detached());
    }

    #[test]
    fn arrows_adjust_volume_in_steps() {
        let (mut app, _rx) = app();
        app.handle_input(key(KeyCode::Down));
        assert_eq!(app.widget.media().volume(), 0.95);
        app.handle_input(key(KeyCode::Up));
        app.handle_input(key(KeyCode::Up));
        assert_eq!(app.widget.media().volume(), 1.0);
    }

    #[test]
    fn track_keys_cycle_with_wraparound() {
        let (mut app, rx) = app();

        app.handle_input(key(KeyCode::Char('n')));
        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerCommand::Load {
                path: PathBuf::from("other.flac")
            }
        );

        // Wraps back around to the first file.
        app.handle_input(key(KeyCode::Char('n')));
        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerCommand::Load {
                path: PathBuf::from("song.flac")
            }
        );

        app.handle_input(key(KeyCode::Char('p')));
        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerCommand::Load {
                path: PathBuf::from("other.flac")
            }
        );
    }
}
