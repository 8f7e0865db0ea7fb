use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    TokyoNight,
    #[default]
    CatppuccinMocha,
}

#[derive(Clone, Copy)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,

    // Accents
    pub accent: Color,
    pub accent_alt: Color,

    // Semantic colors
    pub playing: Color,
    pub paused: Color,
    pub info: Color,
    pub error: Color,
    pub title: Color,
}

impl Theme {
    pub const fn tokyo_night() -> Self {
        Self {
            bg: Color::Rgb(26, 27, 38),      // #1a1b26
            fg: Color::Rgb(192, 202, 245),   // #c0caf5
            fg_dim: Color::Rgb(86, 95, 137), // #565f89

            accent: Color::Rgb(125, 207, 255),     // #7dcfff
            accent_alt: Color::Rgb(255, 158, 100), // #ff9e64

            playing: Color::Rgb(158, 206, 106), // #9ece6a
            paused: Color::Rgb(224, 175, 104),  // #e0af68
            info: Color::Rgb(187, 154, 247),    // #bb9af7
            error: Color::Rgb(247, 118, 142),   // #f7768e
            title: Color::Rgb(122, 162, 247),   // #7aa2f7
        }
    }

    pub const fn catppuccin_mocha() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),        // #1e1e2e
            fg: Color::Rgb(205, 214, 244),     // #cdd6f4
            fg_dim: Color::Rgb(108, 112, 134), // #6c7086

            accent: Color::Rgb(148, 226, 213),     // #94e2d5
            accent_alt: Color::Rgb(250, 179, 135), // #fab387

            playing: Color::Rgb(166, 227, 161), // #a6e3a1
            paused: Color::Rgb(249, 226, 175),  // #f9e2af
            info: Color::Rgb(203, 166, 247),    // #cba6f7
            error: Color::Rgb(243, 139, 168),   // #f38ba8
            title: Color::Rgb(137, 180, 250),   // #89b4fa
        }
    }

    // Computed styles
    pub fn border_style(&self) -> Style {
        Style::new().fg(self.fg_dim)
    }

    pub fn title_style(&self) -> Style {
        Style::new().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::new().fg(self.fg_dim)
    }

    pub fn value_style(&self) -> Style {
        Style::new().fg(self.fg)
    }

    pub fn header_style(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn slider_color(&self, playing: bool) -> Color {
        if playing { self.playing } else { self.paused }
    }
}

static ACTIVE_THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(name: ThemeName) {
    let theme = match name {
        ThemeName::TokyoNight => Theme::tokyo_night(),
        ThemeName::CatppuccinMocha => Theme::catppuccin_mocha(),
    };
    let _ = ACTIVE_THEME.set(theme);
}

pub fn get_theme() -> Theme {
    *ACTIVE_THEME.get_or_init(Theme::catppuccin_mocha)
}
