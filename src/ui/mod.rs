pub mod loading;
pub mod notifications;
pub mod render;
pub mod theme;

/// Whole seconds as a zero-padded "MM:SS" pair.
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
