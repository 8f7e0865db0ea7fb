use std::time::Instant;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MILLIS: u128 = 80;

/// Spinner frame for the given animation epoch. Stateless: the frame index
/// is derived from elapsed wall time, so every caller sees the same phase.
pub fn frame(since: Instant) -> &'static str {
    let index = (since.elapsed().as_millis() / FRAME_MILLIS) as usize % FRAMES.len();
    FRAMES[index]
}
