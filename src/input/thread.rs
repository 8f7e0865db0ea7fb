use crate::events::types::AppEvent;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind,
};
use crossterm::execute;
use std::io::stdout;
use std::{sync::mpsc, thread::JoinHandle};

pub fn spawn(event_tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let _ = execute!(stdout(), EnableMouseCapture);

        loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                    event_tx.send(AppEvent::Input(key_event))
                }
                // Pure pointer motion carries no gesture; everything else
                // (press, drag, release, scroll) reaches the widget.
                Ok(Event::Mouse(mouse_event)) if mouse_event.kind != MouseEventKind::Moved => {
                    event_tx.send(AppEvent::Mouse(mouse_event))
                }
                Ok(Event::Resize(width, height)) => event_tx.send(AppEvent::Resize(width, height)),
                Ok(_) => Ok(()),
                Err(_) => break,
            };

            if forwarded.is_err() {
                break;
            }
        }

        let _ = execute!(stdout(), DisableMouseCapture);
    })
}
