use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    app::state::App,
    player::commands::PlayerState,
    ui::{format_duration, loading, notifications::NotificationLevel, theme::get_theme},
};

const ROUNDED_BORDER: border::Set = border::ROUNDED;

fn block_with_title(title: &'_ str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(ROUNDED_BORDER)
        .title(title)
}

pub fn render(f: &mut Frame, app: &mut App) {
    let theme = get_theme();
    let area = f.area();

    let background = Block::default().style(Style::default().bg(theme.bg));
    f.render_widget(background, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(9),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(f, chunks[0]);
    draw_now_playing(f, chunks[1], app);
    draw_controls(f, chunks[2], app);
    draw_footer(f, chunks[3]);

    draw_notifications(f, chunks[1], app);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let theme = get_theme();
    let header = Paragraph::new("Millibel")
        .style(theme.header_style())
        .block(block_with_title(" ♫ ").border_style(theme.border_style()))
        .centered();
    f.render_widget(header, area);
}

fn draw_now_playing(f: &mut Frame, area: Rect, app: &App) {
    let theme = get_theme();
    let block = block_with_title(" ● Now Playing ").border_style(theme.border_style());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let media = app.widget.media();
    let label = theme.label_style();
    let value = theme.value_style();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let source = media
        .source()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "-".to_string());
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Source:    ", label),
            Span::styled(source, theme.title_style()),
        ])),
        chunks[0],
    );

    let (state_text, state_color) = match app.player_state {
        PlayerState::Stopped => ("Stopped", theme.fg_dim),
        PlayerState::Loading => ("Loading", theme.info),
        PlayerState::Playing => ("Playing", theme.playing),
        PlayerState::Paused => ("Paused", theme.paused),
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("State:     ", label),
            Span::styled(state_text, Style::new().fg(state_color)),
        ])),
        chunks[1],
    );

    let duration = media
        .duration()
        .map(format_duration)
        .unwrap_or_else(|| "--:--".to_string());
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Duration:  ", label),
            Span::styled(duration, value),
        ])),
        chunks[2],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Position:  ", label),
            Span::styled(format_duration(media.position()), value),
        ])),
        chunks[3],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Volume:    ", label),
            Span::styled(format!("{:.0}%", media.volume() * 100.0), value),
        ])),
        chunks[4],
    );
}

fn draw_controls(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = get_theme();
    let title = match app.widget.media().source().and_then(|p| p.file_name()) {
        Some(name) => format!(" ● {} ", name.to_string_lossy()),
        None => " ● Player ".to_string(),
    };
    let block = block_with_title(&title).border_style(theme.border_style());
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !app.widget.is_built() {
        let text = if app.widget.is_detached() {
            "Player detached".to_string()
        } else {
            format!("{} Waiting for duration metadata", loading::frame(app.started_at))
        };
        let middle = Rect {
            x: inner.x,
            y: inner.y + inner.height / 2,
            width: inner.width,
            height: 1,
        };
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(theme.label_style()),
            middle,
        );
        return;
    }

    let zones = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(13),
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(2),
            Constraint::Length(9),
        ])
        .split(inner);

    let play_zone = zones[0];
    let progress_zone = zones[2];
    let volume_zone = zones[4];

    let progress_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(progress_zone);
    let slider_rect = progress_rows[2];

    let bar_width = 2u16.min(volume_zone.width);
    let bar_rect = Rect {
        x: volume_zone.x + (volume_zone.width.saturating_sub(bar_width)) / 2,
        y: volume_zone.y,
        width: bar_width,
        height: volume_zone.height.saturating_sub(1),
    };

    // Record the regions the mouse handlers hit-test against
    let (glyph, button_title, playing, time_label, ratio, level, filled_rows) = {
        let panel = app.widget.panel_mut().expect("panel checked above");
        panel.play.area = play_zone;
        panel.progress.area = slider_rect;
        panel.volume.area = bar_rect;
        (
            panel.play.glyph(),
            panel.play.title(),
            panel.play.is_playing(),
            panel.progress.display.label(),
            panel.progress.ratio,
            panel.volume.level,
            panel.volume.filled_rows(),
        )
    };

    // Play/pause button
    let button_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(play_zone);
    f.render_widget(
        Paragraph::new(glyph)
            .alignment(Alignment::Center)
            .style(Style::new().fg(theme.slider_color(playing))),
        button_rows[1],
    );
    f.render_widget(
        Paragraph::new(button_title)
            .alignment(Alignment::Center)
            .style(theme.label_style()),
        button_rows[2],
    );

    // Seek track: time label row above the slider row
    f.render_widget(
        Paragraph::new(time_label)
            .alignment(Alignment::Center)
            .style(theme.value_style()),
        progress_rows[1],
    );
    draw_slider(f, slider_rect, ratio, playing);

    // Volume track: vertical bar filled from the bottom, percent below
    for row in 0..bar_rect.height {
        let from_bottom = bar_rect.height - row;
        let (cell, style) = if from_bottom <= filled_rows {
            ("█".repeat(bar_width as usize), Style::new().fg(theme.accent_alt))
        } else {
            ("░".repeat(bar_width as usize), Style::new().fg(theme.fg_dim))
        };
        let row_rect = Rect {
            x: bar_rect.x,
            y: bar_rect.y + row,
            width: bar_width,
            height: 1,
        };
        f.render_widget(Paragraph::new(cell).style(style), row_rect);
    }
    let percent_rect = Rect {
        x: volume_zone.x,
        y: volume_zone.y + volume_zone.height.saturating_sub(1),
        width: volume_zone.width,
        height: 1,
    };
    f.render_widget(
        Paragraph::new(format!("{:.0}%", level * 100.0))
            .alignment(Alignment::Center)
            .style(theme.label_style()),
        percent_rect,
    );
}

fn draw_slider(f: &mut Frame, area: Rect, ratio: f64, playing: bool) {
    let theme = get_theme();
    let slider_width = area.width as usize;
    let filled = ((ratio.clamp(0.0, 1.0) * slider_width as f64) as usize).min(slider_width);
    let slider_color = theme.slider_color(playing);

    let mut slider = String::new();
    for i in 0..slider_width {
        if i < filled.saturating_sub(1) {
            slider.push_str("━");
        } else if i == filled.saturating_sub(1) || (filled == 0 && i == 0) {
            slider.push_str("●");
        } else {
            slider.push_str("─");
        }
    }

    let slider_spans = vec![
        Span::styled(
            slider.chars().take(filled).collect::<String>(),
            Style::new().fg(slider_color),
        ),
        Span::styled(
            slider.chars().skip(filled).collect::<String>(),
            Style::new().fg(theme.fg_dim),
        ),
    ];
    f.render_widget(Paragraph::new(Line::from(slider_spans)), area);
}

fn draw_notifications(f: &mut Frame, area: Rect, app: &App) {
    let theme = get_theme();

    for (i, notification) in app.notifications.active_notifications().iter().enumerate() {
        let y = area.y + 1 + i as u16;
        if y >= area.y + area.height.saturating_sub(1) {
            break;
        }
        let text = format!(" {} {} ", notification.level.prefix(), notification.text);
        let width = (text.chars().count() as u16).min(area.width.saturating_sub(2));
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height: 1,
        };
        let color = match notification.level {
            NotificationLevel::Info => theme.info,
            NotificationLevel::Warning => theme.accent_alt,
            NotificationLevel::Error => theme.error,
        };
        f.render_widget(
            Paragraph::new(text).style(Style::new().fg(theme.bg).bg(color)),
            rect,
        );
    }
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let theme = get_theme();
    let keybinds =
        "Space: Play/Pause | s: Stop | n/p: Track | ←→: Seek ±5s | ↑↓: Volume | Click/drag the bars | q: Quit";

    f.render_widget(
        Paragraph::new(keybinds)
            .style(theme.label_style())
            .block(block_with_title("").border_style(theme.border_style())),
        area,
    );
}
