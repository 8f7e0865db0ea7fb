use ratatui::layout::Rect;

fn pad2(value: u64) -> String {
    format!("{:02}", value)
}

/// Current/full playback time broken into zero-padded minute and second
/// fields. All fields read "00" until a duration is known. Every actual
/// label rewrite bumps `revision`, which is what makes the dirty-check
/// observable.
pub struct TimeDisplay {
    pub current_minutes: String,
    pub current_seconds: String,
    pub full_minutes: String,
    pub full_seconds: String,
    full_total_secs: u64,
    revision: u64,
}

impl TimeDisplay {
    pub fn new() -> Self {
        Self {
            current_minutes: "00".into(),
            current_seconds: "00".into(),
            full_minutes: "00".into(),
            full_seconds: "00".into(),
            full_total_secs: 0,
            revision: 0,
        }
    }

    /// Record a newly known full length; the current fields reset to zero
    /// alongside it.
    pub fn set_full(&mut self, duration_secs: f64) {
        let duration = duration_secs.max(0.0);
        let minutes = (duration / 60.0).floor() as u64;
        let seconds = (duration % 60.0).floor() as u64;
        self.full_minutes = pad2(minutes);
        self.full_seconds = pad2(seconds);
        self.full_total_secs = minutes * 60 + seconds;
        self.current_minutes = "00".into();
        self.current_seconds = "00".into();
    }

    pub fn reset(&mut self) {
        self.current_minutes = "00".into();
        self.current_seconds = "00".into();
        self.full_minutes = "00".into();
        self.full_seconds = "00".into();
        self.full_total_secs = 0;
    }

    /// Refresh the current-time fields. Returns whether anything was
    /// rewritten: unless forced, an unchanged minute:second pair is left
    /// alone entirely.
    pub fn update(&mut self, position_secs: f64, force: bool) -> bool {
        let position = position_secs.max(0.0);
        let minutes = pad2((position / 60.0).floor() as u64);
        let seconds = pad2((position % 60.0).floor() as u64);

        if !force && self.current_minutes == minutes && self.current_seconds == seconds {
            return false;
        }

        self.current_minutes = minutes;
        self.current_seconds = seconds;
        self.revision += 1;
        true
    }

    pub fn label(&self) -> String {
        format!(
            "{}:{}/{}:{}",
            self.current_minutes, self.current_seconds, self.full_minutes, self.full_seconds
        )
    }

    /// Full length reconstructed from the floored minute/second fields.
    pub fn full_total_secs(&self) -> u64 {
        self.full_total_secs
    }

    #[allow(dead_code)]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Seek track state: the rect it was last drawn into, the time label, and
/// the filled fraction of the slider.
pub struct ProgressBar {
    pub area: Rect,
    pub display: TimeDisplay,
    pub ratio: f64,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self {
            area: Rect::default(),
            display: TimeDisplay::new(),
            ratio: 0.0,
        }
    }

    /// Recompute ratio and label from the given playback attributes.
    /// Returns whether the label was rewritten.
    pub fn refresh(&mut self, position_secs: f64, duration_secs: Option<f64>, force: bool) -> bool {
        self.ratio = match duration_secs {
            Some(d) if d > 0.0 => position_secs / d,
            _ => 0.0,
        };
        self.display.update(position_secs, force)
    }

    /// Map an absolute terminal column over the track to a whole-second
    /// seek target. Columns are interpolated linearly across the track
    /// width against the displayed full length.
    pub fn seek_time_at(&self, column: u16) -> Option<f64> {
        if self.area.width == 0 {
            return None;
        }
        let offset = column.saturating_sub(self.area.x);
        let fraction = offset as f64 / self.area.width as f64;
        Some((fraction * self.display.full_total_secs() as f64).floor())
    }

    pub fn reset(&mut self) {
        self.display.reset();
        self.ratio = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_zero_padded_two_digits() {
        let mut display = TimeDisplay::new();
        display.set_full(125.0);
        assert_eq!(display.label(), "00:00/02:05");

        display.update(65.0, false);
        assert_eq!(display.current_minutes, "01");
        assert_eq!(display.current_seconds, "05");
        assert_eq!(display.label(), "01:05/02:05");

        display.update(9.2, true);
        assert_eq!(display.label(), "00:09/02:05");
    }

    #[test]
    fn full_length_is_floored_per_field() {
        let mut display = TimeDisplay::new();
        display.set_full(119.9);
        assert_eq!(display.full_minutes, "01");
        assert_eq!(display.full_seconds, "59");
        assert_eq!(display.full_total_secs(), 119);
    }

    #[test]
    fn unchanged_second_is_not_rewritten() {
        let mut display = TimeDisplay::new();
        display.set_full(60.0);

        assert!(display.update(10.1, false));
        let after_first = display.revision();

        // Same displayed second: no rewrite, no revision bump.
        assert!(!display.update(10.9, false));
        assert_eq!(display.revision(), after_first);

        // Forcing always rewrites.
        assert!(display.update(10.9, true));
        assert_eq!(display.revision(), after_first + 1);
    }

    #[test]
    fn seek_interpolates_and_floors() {
        let mut bar = ProgressBar::new();
        bar.display.set_full(125.0);
        bar.area = Rect::new(10, 5, 20, 1);

        assert_eq!(bar.seek_time_at(10), Some(0.0));
        // Offset 10 of 20 across 125 seconds = 62.5, floored.
        assert_eq!(bar.seek_time_at(20), Some(62.0));
        assert_eq!(bar.seek_time_at(30), Some(125.0));
        // Columns left of the track saturate to offset zero.
        assert_eq!(bar.seek_time_at(3), Some(0.0));
    }

    #[test]
    fn zero_width_track_never_seeks() {
        let bar = ProgressBar::new();
        assert_eq!(bar.seek_time_at(5), None);
    }

    #[test]
    fn ratio_follows_position() {
        let mut bar = ProgressBar::new();
        bar.refresh(30.0, Some(120.0), false);
        assert!((bar.ratio - 0.25).abs() < 1e-9);

        // No duration yet: the bar stays empty.
        bar.refresh(30.0, None, false);
        assert_eq!(bar.ratio, 0.0);
    }
}
