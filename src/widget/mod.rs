pub mod button;
pub mod progress;
pub mod volume;

use std::path::PathBuf;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use thiserror::Error;

use crate::player::handle::MediaHandle;
use crate::widget::button::PlayButton;
use crate::widget::progress::ProgressBar;
use crate::widget::volume::VolumeControl;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    /// A control operation arrived before the duration event built the
    /// control panel.
    #[error("player controls are not built yet")]
    PreconditionViolation,
    /// Teardown was requested a second time.
    #[error("player widget is already detached")]
    AlreadyDetached,
}

/// The view tree: built in one piece once the duration is known, dropped
/// in one piece on teardown.
pub struct ControlPanel {
    pub play: PlayButton,
    pub progress: ProgressBar,
    pub volume: VolumeControl,
}

enum Hit {
    Play,
    Progress,
    Volume,
}

/// The player widget: owns the media handle, the control panel, and the
/// two drag-mode flags. Flags are instance fields so two widgets never
/// share gesture state.
pub struct PlayerWidget {
    media: MediaHandle,
    panel: Option<ControlPanel>,
    is_seeking: bool,
    is_changing_volume: bool,
    detached: bool,
}

impl PlayerWidget {
    /// Bind the handle to `source` and request a load. Controls appear
    /// once the media reports its duration.
    pub fn new(mut media: MediaHandle, source: PathBuf) -> Self {
        media.set_source(source);
        Self {
            media,
            panel: None,
            is_seeking: false,
            is_changing_volume: false,
            detached: false,
        }
    }

    pub fn media(&self) -> &MediaHandle {
        &self.media
    }

    pub fn panel(&self) -> Option<&ControlPanel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut ControlPanel> {
        self.panel.as_mut()
    }

    pub fn is_built(&self) -> bool {
        self.panel.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Rebind the existing handle to a new resource. The panel, if built,
    /// stays in place; its labels reset and refill when the new duration
    /// arrives.
    pub fn set_audio_source(&mut self, path: PathBuf) -> Result<(), WidgetError> {
        if self.detached {
            return Err(WidgetError::AlreadyDetached);
        }
        self.media.set_source(path);
        if let Some(panel) = self.panel.as_mut() {
            panel.play.set_playing(false);
            panel.progress.reset();
        }
        Ok(())
    }

    /// Duration metadata arrived: build the panel on first notice, refill
    /// the full-length label either way, and force a repaint.
    pub fn on_duration_changed(&mut self, duration_secs: f64) {
        if self.detached {
            return;
        }
        let panel = self.panel.get_or_insert_with(|| ControlPanel {
            play: PlayButton::new(),
            progress: ProgressBar::new(),
            volume: VolumeControl::new(self.media.volume()),
        });
        panel.play.set_playing(!self.media.is_paused());
        panel.progress.display.set_full(duration_secs);
        panel
            .progress
            .refresh(self.media.position(), Some(duration_secs), true);
    }

    /// The single play/pause entry point: toggles the handle, repaints the
    /// button, returns the resulting "is playing".
    pub fn play(&mut self) -> Result<bool, WidgetError> {
        if self.detached {
            return Err(WidgetError::AlreadyDetached);
        }
        let panel = self
            .panel
            .as_mut()
            .ok_or(WidgetError::PreconditionViolation)?;

        if self.media.is_paused() {
            self.media.resume();
        } else {
            self.media.pause();
        }

        let playing = !self.media.is_paused();
        panel.play.set_playing(playing);
        Ok(playing)
    }

    /// Pause, rewind to zero, repaint.
    pub fn stop(&mut self) -> Result<(), WidgetError> {
        if self.detached {
            return Err(WidgetError::AlreadyDetached);
        }
        if self.panel.is_none() {
            return Err(WidgetError::PreconditionViolation);
        }
        self.media.pause();
        self.media.seek_to(0.0);
        if let Some(panel) = self.panel.as_mut() {
            panel.play.set_playing(false);
        }
        self.render_progress(true);
        Ok(())
    }

    /// Write the current time straight through, unclamped. Works with or
    /// without the panel: it touches only the media resource.
    pub fn seek_to(&self, secs: f64) {
        self.media.seek_to(secs);
    }

    /// Relative seek used by keys and the scroll wheel; the target is kept
    /// inside the known media range.
    pub fn seek_by(&mut self, delta_secs: f64) -> Result<(), WidgetError> {
        if self.detached {
            return Err(WidgetError::AlreadyDetached);
        }
        if self.panel.is_none() {
            return Err(WidgetError::PreconditionViolation);
        }
        let mut target = (self.media.position() + delta_secs).max(0.0);
        if let Some(duration) = self.media.duration() {
            target = target.min(duration);
        }
        self.media.seek_to(target);
        self.render_progress(true);
        Ok(())
    }

    /// Volume is a plain media attribute, so nudging works even before the
    /// panel exists.
    pub fn nudge_volume(&mut self, delta: f32) {
        let target = ((self.media.volume() + delta) * 100.0).round() / 100.0;
        self.media.set_volume(target);
        let level = self.media.volume();
        if let Some(panel) = self.panel.as_mut() {
            panel.volume.level = level;
        }
    }

    /// Playback ran off the end: back to zero, paused, forced repaint.
    /// Only wired up once the panel exists.
    pub fn on_track_ended(&mut self) {
        if self.detached || self.panel.is_none() {
            return;
        }
        self.media.pause();
        self.media.seek_to(0.0);
        if let Some(panel) = self.panel.as_mut() {
            panel.play.set_playing(false);
        }
        self.render_progress(true);
    }

    /// The 500 ms repaint driver. Silent after teardown.
    pub fn on_tick(&mut self) {
        if self.detached {
            return;
        }
        self.render_progress(false);
    }

    /// Refresh the progress ratio and time label from the handle. Returns
    /// whether the label was rewritten.
    pub fn render_progress(&mut self, force: bool) -> bool {
        let position = self.media.position();
        let duration = self.media.duration();
        match self.panel.as_mut() {
            Some(panel) => panel.progress.refresh(position, duration, force),
            None => false,
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            // Releasing anywhere ends both drags, even off-track.
            MouseEventKind::Up(_) => {
                self.is_seeking = false;
                self.is_changing_volume = false;
            }

            MouseEventKind::Down(MouseButton::Left) => match self.hit(event.column, event.row) {
                Some(Hit::Play) => {
                    let _ = self.play();
                }
                Some(Hit::Progress) => {
                    self.is_seeking = true;
                    self.apply_seek(event.column);
                }
                Some(Hit::Volume) => {
                    self.is_changing_volume = true;
                    self.apply_volume(event.row);
                }
                None => {}
            },

            MouseEventKind::Drag(MouseButton::Left) => match self.hit(event.column, event.row) {
                Some(Hit::Progress) if self.is_seeking => self.apply_seek(event.column),
                Some(Hit::Volume) if self.is_changing_volume => self.apply_volume(event.row),
                _ => {}
            },

            MouseEventKind::ScrollUp => match self.hit(event.column, event.row) {
                Some(Hit::Progress) => {
                    let _ = self.seek_by(5.0);
                }
                Some(Hit::Volume) => self.nudge_volume(0.05),
                _ => {}
            },

            MouseEventKind::ScrollDown => match self.hit(event.column, event.row) {
                Some(Hit::Progress) => {
                    let _ = self.seek_by(-5.0);
                }
                Some(Hit::Volume) => self.nudge_volume(-0.05),
                _ => {}
            },

            _ => {}
        }
    }

    /// Teardown: silence the tick first, then halt playback, clear the
    /// source, and drop the view tree. A second call is an error, as is a
    /// call before the panel ever existed.
    pub fn delete_instance(&mut self) -> Result<(), WidgetError> {
        if self.detached {
            return Err(WidgetError::AlreadyDetached);
        }
        if self.panel.is_none() {
            return Err(WidgetError::PreconditionViolation);
        }
        self.detached = true;
        self.is_seeking = false;
        self.is_changing_volume = false;
        self.media.pause();
        self.media.clear_source();
        self.panel = None;
        Ok(())
    }

    fn hit(&self, x: u16, y: u16) -> Option<Hit> {
        let panel = self.panel.as_ref()?;
        if point_in_rect(x, y, &panel.play.area) {
            Some(Hit::Play)
        } else if point_in_rect(x, y, &panel.progress.area) {
            Some(Hit::Progress)
        } else if point_in_rect(x, y, &panel.volume.area) {
            Some(Hit::Volume)
        } else {
            None
        }
    }

    fn apply_seek(&mut self, column: u16) {
        let Some(target) = self
            .panel
            .as_ref()
            .and_then(|p| p.progress.seek_time_at(column))
        else {
            return;
        };
        self.seek_to(target);
        self.render_progress(true);
    }

    fn apply_volume(&mut self, row: u16) {
        let Some(level) = self.panel.as_ref().and_then(|p| p.volume.level_at(row)) else {
            return;
        };
        self.media.set_volume(level);
        let level = self.media.volume();
        if let Some(panel) = self.panel.as_mut() {
            panel.volume.level = level;
        }
    }
}

fn point_in_rect(x: u16, y: u16, rect: &Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::commands::PlayerCommand;
    use crate::player::handle::SharedPlayback;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;
    use std::sync::mpsc::{self, Receiver};

    fn widget() -> (PlayerWidget, Receiver<PlayerCommand>, Arc<SharedPlayback>) {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(SharedPlayback::new());
        let media = MediaHandle::new(tx, shared.clone());
        let widget = PlayerWidget::new(media, PathBuf::from("track.mp3"));
        rx.try_recv().expect("load command");
        (widget, rx, shared)
    }

    fn built_widget() -> (PlayerWidget, Receiver<PlayerCommand>) {
        let (mut widget, rx, shared) = widget();
        // What the playback thread does right before the duration event.
        shared.set_duration(125.0);
        widget.on_duration_changed(125.0);
        let panel = widget.panel_mut().unwrap();
        panel.play.area = Rect::new(0, 5, 5, 3);
        panel.progress.area = Rect::new(10, 5, 20, 1);
        panel.volume.area = Rect::new(40, 2, 1, 5);
        (widget, rx)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn controls_wait_for_duration() {
        let (mut widget, _rx, _shared) = widget();
        assert!(!widget.is_built());
        assert_eq!(widget.play(), Err(WidgetError::PreconditionViolation));
        assert_eq!(widget.stop(), Err(WidgetError::PreconditionViolation));

        widget.on_duration_changed(125.0);
        assert!(widget.is_built());
        let panel = widget.panel().unwrap();
        assert_eq!(panel.progress.display.label(), "00:00/02:05");
    }

    #[test]
    fn play_toggles_and_reports() {
        let (mut widget, _rx) = built_widget();
        assert_eq!(widget.play(), Ok(true));
        assert_eq!(widget.panel().unwrap().play.glyph(), "⏸");
        assert_eq!(widget.play(), Ok(false));
        assert_eq!(widget.panel().unwrap().play.glyph(), "⏵");
        assert_eq!(widget.play(), Ok(true));
    }

    #[test]
    fn seek_passes_any_value_through() {
        let (widget, rx) = built_widget();
        widget.seek_to(9999.0);
        assert_eq!(widget.media().position(), 9999.0);
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(9999.0));
    }

    #[test]
    fn end_of_media_rewinds_and_pauses() {
        let (mut widget, _rx) = built_widget();
        widget.play().unwrap();
        widget.render_progress(true);

        widget.on_track_ended();

        assert!(widget.media().is_paused());
        assert_eq!(widget.media().position(), 0.0);
        assert!(!widget.panel().unwrap().play.is_playing());
        assert_eq!(widget.panel().unwrap().progress.display.label(), "00:00/02:05");
    }

    #[test]
    fn click_on_track_seeks_and_arms_the_drag() {
        let (mut widget, rx) = built_widget();

        widget.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 20, 5));
        // Offset 10 of 20 across 125 s, floored.
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(62.0));
        assert!(widget.is_seeking);

        widget.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 15, 5));
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(31.0));

        // Release anywhere, even far from the track, ends the drag.
        widget.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 70, 20));
        assert!(!widget.is_seeking);
        widget.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 12, 5));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn drag_without_armed_flag_is_ignored() {
        let (mut widget, rx) = built_widget();
        widget.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 15, 5));
        assert!(rx.try_recv().is_err());
        assert_eq!(widget.media().volume(), 1.0);
    }

    #[test]
    fn volume_drag_follows_the_formula() {
        let (mut widget, _rx) = built_widget();

        widget.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40, 2));
        assert!(widget.is_changing_volume);
        assert_eq!(widget.media().volume(), 1.0);

        widget.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 40, 6));
        assert_eq!(widget.media().volume(), 0.2);
        assert_eq!(widget.panel().unwrap().volume.level, 0.2);

        widget.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 40, 6));
        assert!(!widget.is_changing_volume);
    }

    #[test]
    fn seek_and_volume_flags_are_independent() {
        let (mut widget, rx) = built_widget();

        widget.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 20, 5));
        assert!(widget.is_seeking && !widget.is_changing_volume);
        rx.try_recv().unwrap();

        // Dragging across the volume track while only seek is armed does
        // not touch the volume.
        widget.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 40, 3));
        assert_eq!(widget.media().volume(), 1.0);
    }

    #[test]
    fn non_primary_buttons_do_not_gesture() {
        let (mut widget, rx) = built_widget();
        widget.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 20, 5));
        assert!(!widget.is_seeking);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn click_on_button_toggles_playback() {
        let (mut widget, _rx) = built_widget();
        widget.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 2, 6));
        assert!(widget.panel().unwrap().play.is_playing());
        assert!(!widget.media().is_paused());
    }

    #[test]
    fn rebinding_the_source_keeps_the_panel() {
        let (mut widget, rx) = built_widget();
        widget.play().unwrap();
        while rx.try_recv().is_ok() {}

        widget.set_audio_source(PathBuf::from("other.mp3")).unwrap();

        assert!(widget.is_built());
        let panel = widget.panel().unwrap();
        assert!(!panel.play.is_playing());
        assert_eq!(panel.progress.display.label(), "00:00/00:00");
        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerCommand::Load {
                path: PathBuf::from("other.mp3")
            }
        );
    }

    #[test]
    fn teardown_is_guarded_both_ways() {
        let (mut widget, _rx, _shared) = widget();
        assert_eq!(
            widget.delete_instance(),
            Err(WidgetError::PreconditionViolation)
        );

        widget.on_duration_changed(60.0);
        assert_eq!(widget.delete_instance(), Ok(()));
        assert!(widget.is_detached());
        assert!(!widget.is_built());
        assert!(widget.media().is_paused());

        assert_eq!(widget.delete_instance(), Err(WidgetError::AlreadyDetached));
        assert_eq!(widget.play(), Err(WidgetError::AlreadyDetached));

        // The repaint driver is silent after teardown.
        widget.on_tick();
        widget.on_duration_changed(60.0);
        assert!(!widget.is_built());
    }

    #[test]
    fn relative_seek_stays_in_range() {
        let (mut widget, rx) = built_widget();
        widget.seek_by(-5.0).unwrap();
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(0.0));

        widget.media().seek_to(123.0);
        rx.try_recv().unwrap();
        widget.seek_by(5.0).unwrap();
        assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(125.0));
    }
}
