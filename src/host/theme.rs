use std::sync::OnceLock;

use ratatui::style::Color;

pub type Rgb = (u8, u8, u8);

/// Colours for one theme. Card colours are blended against the desktop by
/// each widget's opacity before they reach the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub desktop: Rgb,
    pub card_bg: Rgb,
    pub card_fg: Rgb,
    pub border: Rgb,
    pub focus: Rgb,
    pub indicator: Rgb,
    pub status_bg: Rgb,
    pub status_fg: Rgb,
}

pub const LIGHT: Palette = Palette {
    desktop: (200, 205, 215),
    card_bg: (250, 250, 252),
    card_fg: (30, 30, 35),
    border: (150, 150, 160),
    focus: (0, 120, 215),
    indicator: (0, 150, 255),
    status_bg: (230, 230, 235),
    status_fg: (30, 30, 35),
};

pub const DARK: Palette = Palette {
    desktop: (20, 22, 28),
    card_bg: (45, 45, 50),
    card_fg: (235, 235, 240),
    border: (90, 90, 100),
    focus: (255, 165, 0),
    indicator: (0, 150, 255),
    status_bg: (35, 35, 40),
    status_fg: (210, 210, 215),
};

pub fn palette(light_mode: bool) -> Palette {
    if light_mode { LIGHT } else { DARK }
}

/// Linear mix of `fg` over `bg` at `alpha`.
pub fn blend(fg: Rgb, bg: Rgb, alpha: f32) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f32::from(f) * a + f32::from(b) * (1.0 - a)).round() as u8;
    (mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}

/// Truecolor when the terminal advertises it, otherwise the nearest xterm
/// 256-colour cube entry.
pub fn to_color(rgb: Rgb) -> Color {
    if truecolor() {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    } else {
        Color::Indexed(xterm_index(rgb))
    }
}

/// `COLORTERM` is read once per process.
fn truecolor() -> bool {
    static TRUECOLOR: OnceLock<bool> = OnceLock::new();
    *TRUECOLOR.get_or_init(|| supports_truecolor(std::env::var("COLORTERM").ok().as_deref()))
}

fn supports_truecolor(colorterm: Option<&str>) -> bool {
    colorterm.is_some_and(|v| {
        let v = v.to_ascii_lowercase();
        v.contains("truecolor") || v.contains("24bit")
    })
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn nearest_level(v: u8) -> usize {
    CUBE_LEVELS
        .iter()
        .enumerate()
        .min_by_key(|(_, level)| (i16::from(**level) - i16::from(v)).abs())
        .map_or(0, |(i, _)| i)
}

fn xterm_index(rgb: Rgb) -> u8 {
    let (r, g, b) = (nearest_level(rgb.0), nearest_level(rgb.1), nearest_level(rgb.2));
    (16 + 36 * r + 6 * g + b) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend((255, 255, 255), (0, 0, 0), 1.0), (255, 255, 255));
        assert_eq!(blend((255, 255, 255), (0, 0, 0), 0.0), (0, 0, 0));
        assert_eq!(blend((200, 100, 0), (0, 100, 200), 0.5), (100, 100, 100));
    }

    #[test]
    fn cube_index_for_primaries() {
        assert_eq!(xterm_index((0, 0, 0)), 16);
        assert_eq!(xterm_index((255, 255, 255)), 231);
        assert_eq!(xterm_index((255, 0, 0)), 196);
    }

    #[test]
    fn truecolor_needs_an_advertised_colorterm() {
        assert!(supports_truecolor(Some("truecolor")));
        assert!(supports_truecolor(Some("24BIT")));
        assert!(!supports_truecolor(Some("256color")));
        assert!(!supports_truecolor(None));
    }

    #[test]
    fn themes_differ() {
        assert_ne!(palette(true), palette(false));
    }
}
