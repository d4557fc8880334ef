use std::fmt;

use eframe::egui::Color32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Light,
    Dark,
}

impl Mode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

const TITLE_SIZE: f32 = 96.0;
const BODY_SIZE: f32 = 44.0;
const NOTES_SIZE: f32 = 18.0;

/// Colors and type sizes shared by slides, widgets and the presenter panes.
/// Sizes are in 1920×1080 design pixels.
#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: Mode,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    /// Popovers, overlay and toast backgrounds.
    pub panel_background: Color32,
    /// Roadmap connector lines and tips.
    pub connector: Color32,
    pub title_size: f32,
    pub body_size: f32,
    pub notes_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: Mode::Dark,
            background: Color32::from_rgb(0x14, 0x17, 0x1F),
            foreground: Color32::from_rgb(0xD7, 0xDC, 0xE4),
            heading_color: Color32::from_rgb(0xF5, 0xF7, 0xFA),
            accent: Color32::from_rgb(0x3F, 0xB6, 0xA8),
            panel_background: Color32::from_rgb(0x22, 0x28, 0x35),
            connector: Color32::from_rgb(0x7F, 0xD1, 0xC7),
            title_size: TITLE_SIZE,
            body_size: BODY_SIZE,
            notes_size: NOTES_SIZE,
        }
    }

    pub fn light() -> Self {
        Self {
            mode: Mode::Light,
            background: Color32::from_rgb(0xFA, 0xFA, 0xF7),
            foreground: Color32::from_rgb(0x23, 0x26, 0x2E),
            heading_color: Color32::from_rgb(0x10, 0x13, 0x1A),
            accent: Color32::from_rgb(0x1F, 0x7A, 0x70),
            panel_background: Color32::from_rgb(0xEC, 0xEE, 0xF0),
            connector: Color32::from_rgb(0x2F, 0x8F, 0x84),
            title_size: TITLE_SIZE,
            body_size: BODY_SIZE,
            notes_size: NOTES_SIZE,
        }
    }

    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Light => Self::light(),
            Mode::Dark => Self::dark(),
        }
    }

    /// Unknown names get the light theme.
    pub fn from_name(name: &str) -> Self {
        Self::for_mode(Mode::from_name(name).unwrap_or(Mode::Light))
    }

    pub fn toggled(&self) -> Self {
        Self::for_mode(self.mode.other())
    }

    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
    }

    /// Headings step down from the title size toward body text.
    pub fn heading_size(&self, level: u8) -> f32 {
        let level = f32::from(level.max(1));
        self.body_size + (self.title_size - self.body_size) / level
    }
}
