use std::{
    env, io,
    path::PathBuf,
    process,
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

use crate::{
    app::state::App,
    events::types::AppEvent,
    player::commands::PlayerCommand,
    player::handle::{MediaHandle, SharedPlayback},
    widget::PlayerWidget,
};

mod app;
mod config;
mod events;
mod input;
mod player;
mod ui;
mod widget;

/// How often the progress display is re-polled for natural playback
/// advance.
const REPAINT_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> io::Result<()> {
    let sources: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if sources.is_empty() {
        eprintln!("Usage: millibel <audio-file>...");
        process::exit(2);
    }

    let config = match config::load_or_create_config() {
        Ok(config) => config,
        Err(err) => {
            panic!("Failed to load config: {}", err);
        }
    };

    ui::theme::init_theme(config.theme);

    let mut terminal = ratatui::init();
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let (player_cmd_tx, player_cmd_rx) = mpsc::channel::<PlayerCommand>();
    let shared = Arc::new(SharedPlayback::new());

    let _input_handle = input::thread::spawn(event_tx.clone());
    let _player_handle = player::thread::spawn(player_cmd_rx, event_tx.clone(), shared.clone());

    let media = MediaHandle::new(player_cmd_tx, shared);
    media.set_volume(config.volume);
    let widget = PlayerWidget::new(media, sources[0].clone());
    let mut app = App::new(widget, sources);

    let mut last_repaint = Instant::now();

    loop {
        terminal.draw(|f| ui::render::render(f, &mut app))?;

        match event_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => match event {
                AppEvent::Input(key_event) => app.handle_input(key_event),
                AppEvent::Mouse(mouse_event) => app.handle_mouse(mouse_event),
                AppEvent::Resize(_width, _height) => {}
                AppEvent::PlayerStateChanged(state) => app.on_player_state_changed(state),
                AppEvent::DurationChanged(dur) => app.on_duration_changed(dur),
                AppEvent::TrackEnded => app.on_track_ended(),
                AppEvent::PlayerError(e) => app.on_player_error(e),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                panic!("Event channel disconnected");
            }
        }

        if last_repaint.elapsed() >= REPAINT_INTERVAL {
            last_repaint = Instant::now();
            app.on_tick();
        }

        if app.should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}
