use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::Sender;

use crate::player::commands::PlayerCommand;

/// Playback attributes mirrored between the playback thread and the UI
/// thread. Position and duration are f64 seconds stored as bit patterns so
/// arbitrary values survive the round trip unchanged.
pub struct SharedPlayback {
    position_bits: AtomicU64,
    duration_bits: AtomicU64,
    duration_known: AtomicBool,
    paused: AtomicBool,
    volume_bits: AtomicU32,
}

impl SharedPlayback {
    pub fn new() -> Self {
        Self {
            position_bits: AtomicU64::new(0f64.to_bits()),
            duration_bits: AtomicU64::new(0f64.to_bits()),
            duration_known: AtomicBool::new(false),
            paused: AtomicBool::new(true),
            volume_bits: AtomicU32::new(1.0f32.to_bits()),
        }
    }

    pub fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Relaxed))
    }

    pub fn set_position(&self, secs: f64) {
        self.position_bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    pub fn duration(&self) -> Option<f64> {
        if self.duration_known.load(Ordering::Relaxed) {
            Some(f64::from_bits(self.duration_bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    pub fn set_duration(&self, secs: f64) {
        self.duration_bits.store(secs.to_bits(), Ordering::Relaxed);
        self.duration_known.store(true, Ordering::Relaxed);
    }

    pub fn clear_duration(&self) {
        self.duration_known.store(false, Ordering::Relaxed);
        self.duration_bits.store(0f64.to_bits(), Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume_bits.store(volume.to_bits(), Ordering::Relaxed);
    }
}

/// Handle to the playable media resource: transport changes go over the
/// command channel to the playback thread, attribute reads come straight
/// from the shared snapshot. One handle per widget instance; a new source
/// rebinds the handle instead of replacing it.
pub struct MediaHandle {
    cmd_tx: Sender<PlayerCommand>,
    shared: Arc<SharedPlayback>,
    source: Option<PathBuf>,
}

impl MediaHandle {
    pub fn new(cmd_tx: Sender<PlayerCommand>, shared: Arc<SharedPlayback>) -> Self {
        Self {
            cmd_tx,
            shared,
            source: None,
        }
    }

    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    pub fn set_source(&mut self, path: PathBuf) {
        self.shared.set_position(0.0);
        self.shared.clear_duration();
        self.shared.set_paused(true);
        self.source = Some(path.clone());
        let _ = self.cmd_tx.send(PlayerCommand::Load { path });
    }

    pub fn clear_source(&mut self) {
        self.source = None;
        self.shared.set_paused(true);
        self.shared.set_position(0.0);
        self.shared.clear_duration();
        let _ = self.cmd_tx.send(PlayerCommand::Stop);
    }

    pub fn position(&self) -> f64 {
        self.shared.position()
    }

    pub fn duration(&self) -> Option<f64> {
        self.shared.duration()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.is_paused()
    }

    /// Writes the target position as given, without bounds clamping. The
    /// playback thread copes with values the media cannot satisfy.
    pub fn seek_to(&self, secs: f64) {
        self.shared.set_position(secs);
        let _ = self.cmd_tx.send(PlayerCommand::Seek(secs));
    }

    /// The paused flag flips at send time so back-to-back toggles observe
    /// each other; the playback thread confirms asynchronously.
    pub fn pause(&self) {
        self.shared.set_paused(true);
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    pub fn resume(&self) {
        self.shared.set_paused(false);
        let _ = self.cmd_tx.send(PlayerCommand::Resume);
    }

    pub fn volume(&self) -> f32 {
        self.shared.volume()
    }

    /// Applied by the output callback on the next buffer; no command
    /// round-trip involved.
    pub fn set_volume(&self, volume: f32) {
        self.shared.set_volume(volume.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn handle() -> (MediaHandle, mpsc::Receiver<PlayerCommand>, Arc<SharedPlayback>) {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(SharedPlayback::new());
        (MediaHandle::new(tx, shared.clone()), rx, shared)
    }

    #[test]
    fn seek_round_trips_unclamped() {
        let (media, rx, _) = handle();
        for secs in [0.0, 65.0, 1e6, -3.0] {
            media.seek_to(secs);
            assert_eq!(media.position(), secs);
            assert_eq!(rx.try_recv().unwrap(), PlayerCommand::Seek(secs));
        }
    }

    #[test]
    fn set_source_resets_playback_attributes() {
        let (mut media, rx, shared) = handle();
        shared.set_duration(120.0);
        shared.set_position(42.0);
        shared.set_paused(false);

        media.set_source(PathBuf::from("b.mp3"));

        assert_eq!(media.position(), 0.0);
        assert_eq!(media.duration(), None);
        assert!(media.is_paused());
        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerCommand::Load {
                path: PathBuf::from("b.mp3")
            }
        );
    }

    #[test]
    fn volume_is_clamped_to_unit_range() {
        let (media, _rx, _) = handle();
        media.set_volume(1.7);
        assert_eq!(media.volume(), 1.0);
        media.set_volume(-0.2);
        assert_eq!(media.volume(), 0.0);
        media.set_volume(0.45);
        assert_eq!(media.volume(), 0.45);
    }

    #[test]
    fn pause_and_resume_flip_the_flag_at_send_time() {
        let (media, _rx, _) = handle();
        assert!(media.is_paused());
        media.resume();
        assert!(!media.is_paused());
        media.pause();
        assert!(media.is_paused());
    }
}
