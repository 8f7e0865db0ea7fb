use ratatui::layout::Rect;

/// Vertical volume track: level 1.0 at the top edge, falling linearly
/// towards the bottom.
pub struct VolumeControl {
    pub area: Rect,
    pub level: f32,
}

impl VolumeControl {
    pub fn new(level: f32) -> Self {
        Self {
            area: Rect::default(),
            level,
        }
    }

    /// Map an absolute terminal row over the track to a volume level:
    /// `|offset - height| / height`, rounded to two decimals. Off-track
    /// rows would push the formula outside the unit range, so the result
    /// is clamped.
    pub fn level_at(&self, row: u16) -> Option<f32> {
        let height = self.area.height;
        if height == 0 {
            return None;
        }
        let offset = row.saturating_sub(self.area.y);
        let raw = (offset as f32 - height as f32).abs() / height as f32;
        let rounded = (raw * 100.0).round() / 100.0;
        Some(rounded.clamp(0.0, 1.0))
    }

    /// Seeker height in rows for the current level.
    pub fn filled_rows(&self) -> u16 {
        (self.level * self.area.height as f32).round() as u16
    }
}
