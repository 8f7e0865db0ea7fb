use ratatui::layout::Rect;

/// Play/pause toggle glyph. Holds no playback logic of its own; it renders
/// whatever `PlayerWidget::play()` last returned.
pub struct PlayButton {
    pub area: Rect,
    playing: bool,
}

impl PlayButton {
    pub fn new() -> Self {
        Self {
            area: Rect::default(),
            playing: false,
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn glyph(&self) -> &'static str {
        if self.playing { "⏸" } else { "⏵" }
    }

    pub fn title(&self) -> &'static str {
        if self.playing { "Pause" } else { "Play audio" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_and_title_follow_state() {
        let mut button = PlayButton::new();
        assert_eq!(button.glyph(), "⏵");
        assert_eq!(button.title(), "Play audio");

        button.set_playing(true);
        assert_eq!(button.glyph(), "⏸");
        assert_eq!(button.title(), "Pause");
    }
}
