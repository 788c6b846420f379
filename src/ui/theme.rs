//! Theme color definitions for the UI
//!
//! Dark and light palettes selected from the config.

use crate::config::Theme;
use crate::keyboard::KeyVisualState;
use crate::tests::ResultStatus;
use ratatui::style::{Color, Modifier, Style};

/// Complete color palette for the UI
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Main background
    pub bg: Color,
    /// Primary foreground text
    pub fg: Color,
    /// Dimmed/secondary text and borders
    pub dim: Color,
    /// Accent color (headings, active tab)
    pub cyan: Color,
    /// Success / OK status
    pub green: Color,
    /// Warning status
    pub yellow: Color,
    /// Error status
    pub red: Color,
    /// Bar backgrounds (tab bar, status bar)
    pub bar: Color,
    /// Key never released since reset
    pub key_off: Color,
    /// Key held down
    pub key_on: Color,
    /// Key released at least once
    pub key_tested: Color,
    /// Key label text on dark key backgrounds
    pub key_text: Color,
    /// Key label text on bright key backgrounds
    pub key_text_on: Color,
}

impl ThemeColors {
    /// Create a color palette for the given theme variant
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(22, 22, 30),
            fg: Color::Rgb(200, 200, 210),
            dim: Color::Rgb(90, 90, 110),
            cyan: Color::Rgb(80, 200, 220),
            green: Color::Rgb(80, 200, 120),
            yellow: Color::Rgb(240, 180, 80),
            red: Color::Rgb(240, 90, 100),
            bar: Color::Rgb(48, 48, 62),
            key_off: Color::Rgb(40, 40, 50),
            key_on: Color::Rgb(80, 200, 120),
            key_tested: Color::Rgb(189, 183, 107),
            key_text: Color::Rgb(180, 180, 190),
            key_text_on: Color::Rgb(20, 20, 25),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(245, 245, 248),
            fg: Color::Rgb(30, 30, 40),
            dim: Color::Rgb(130, 130, 150),
            cyan: Color::Rgb(0, 130, 160),
            green: Color::Rgb(30, 150, 70),
            yellow: Color::Rgb(180, 120, 0),
            red: Color::Rgb(200, 50, 60),
            bar: Color::Rgb(215, 215, 225),
            key_off: Color::Rgb(204, 204, 204),
            key_on: Color::Rgb(30, 150, 70),
            key_tested: Color::Rgb(240, 230, 140),
            key_text: Color::Rgb(50, 50, 60),
            key_text_on: Color::Rgb(20, 20, 25),
        }
    }

    /// Style of a key cap in the given state
    pub fn key_style(&self, state: KeyVisualState) -> Style {
        match state {
            KeyVisualState::Default => Style::default().fg(self.key_text).bg(self.key_off),
            KeyVisualState::Active => Style::default()
                .fg(self.key_text_on)
                .bg(self.key_on)
                .add_modifier(Modifier::BOLD),
            KeyVisualState::Tested => Style::default().fg(self.key_text_on).bg(self.key_tested),
        }
    }

    pub fn status_color(&self, status: ResultStatus) -> Color {
        match status {
            ResultStatus::Ok => self.green,
            ResultStatus::Warning => self.yellow,
            ResultStatus::Error => self.red,
            ResultStatus::Info => self.cyan,
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::dark()
    }
}
