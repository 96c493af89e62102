use ratatui::style::Color;

use crate::config::Theme;

/// Colors for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,
    pub cursor_bg: Color,
    pub particle: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: Color::Rgb(17, 24, 39),
            text: Color::Rgb(203, 213, 225),
            muted: Color::Rgb(100, 116, 139),
            accent: Color::Rgb(20, 184, 166),
            error: Color::Rgb(248, 113, 113),
            cursor_bg: Color::Rgb(15, 118, 110),
            particle: Color::Rgb(107, 237, 215),
        },
        Theme::Light => Palette {
            background: Color::Rgb(248, 250, 252),
            text: Color::Rgb(51, 65, 85),
            muted: Color::Rgb(148, 163, 184),
            accent: Color::Rgb(20, 184, 166),
            error: Color::Rgb(239, 68, 68),
            cursor_bg: Color::Rgb(153, 246, 228),
            particle: Color::Rgb(20, 184, 166),
        },
    }
}
