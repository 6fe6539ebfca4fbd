//! Kiosk colors
//!
//! Modelled on a cash machine display: a dark navy screen, light text, a
//! single accent for titles and entered PIN digits, and amber key caps.

use ratatui::style::{Color, Modifier, Style};

const NAVY: Color = Color::Rgb(12, 27, 51);
const SKY: Color = Color::Rgb(79, 163, 224);
const PAPER: Color = Color::Rgb(236, 240, 245);
const FOG: Color = Color::Rgb(168, 180, 196);
const SLATE: Color = Color::Rgb(96, 110, 130);
const STEEL: Color = Color::Rgb(52, 66, 88);
const AMBER: Color = Color::Rgb(240, 180, 41);
const MINT: Color = Color::Rgb(72, 199, 142);
const CORAL: Color = Color::Rgb(235, 87, 87);

/// Style roles used by the screens
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub backdrop: Color,
    pub foreground: Color,
    pub secondary: Color,
    pub muted: Color,
    pub frame: Color,
    pub key_cap: Color,
    pub ok: Color,
    pub caution: Color,
    pub alert: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: SKY,
            backdrop: NAVY,
            foreground: PAPER,
            secondary: FOG,
            muted: SLATE,
            frame: STEEL,
            key_cap: AMBER,
            ok: MINT,
            caution: AMBER,
            alert: CORAL,
        }
    }
}

impl Theme {
    fn fg(color: Color) -> Style {
        Style::default().fg(color)
    }

    fn bold(color: Color) -> Style {
        Self::fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn text(&self) -> Style {
        Self::fg(self.foreground)
    }

    pub fn text_secondary(&self) -> Style {
        Self::fg(self.secondary)
    }

    pub fn text_muted(&self) -> Style {
        Self::fg(self.muted)
    }

    pub fn title(&self) -> Style {
        Self::bold(self.accent)
    }

    /// Money on screen
    pub fn amount(&self) -> Style {
        Self::bold(self.foreground)
    }

    pub fn border(&self) -> Style {
        Self::fg(self.frame)
    }

    pub fn border_focused(&self) -> Style {
        Self::fg(self.accent)
    }

    pub fn success(&self) -> Style {
        Self::bold(self.ok)
    }

    pub fn warning(&self) -> Style {
        Self::fg(self.caution)
    }

    pub fn danger(&self) -> Style {
        Self::bold(self.alert)
    }

    /// `[Fn]` cap beside a side button label
    pub fn button_key(&self) -> Style {
        Self::bold(self.key_cap)
    }

    pub fn header(&self) -> Style {
        Style::default().bg(self.backdrop)
    }

    pub fn pin_dot(&self) -> Style {
        Self::bold(self.accent)
    }

    pub fn pin_placeholder(&self) -> Style {
        Self::fg(self.muted)
    }
}
