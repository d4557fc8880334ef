use eframe::egui::{self, Color32, FontId, Pos2, Rect};

use crate::theme::Theme;

/// One line of slide body markdown, classified for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    Text(&'a str),
    Blank,
}

pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(text) = trimmed[hashes..].strip_prefix(' ') {
            return Line::Heading {
                level: hashes as u8,
                text: text.trim(),
            };
        }
    }
    match trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        Some(item) => Line::Bullet(item.trim()),
        None => Line::Text(trimmed),
    }
}

/// Scale factor relative to a 1920x1080 reference display.
pub fn compute_scale(rect: Rect) -> f32 {
    (rect.width() / 1920.0).min(rect.height() / 1080.0)
}

/// Paint a slide body top-down. Returns the y coordinate below the last line.
pub fn draw_body(ui: &egui::Ui, body: &str, rect: Rect, theme: &Theme, scale: f32) -> f32 {
    let painter = ui.painter_at(rect);
    let gap = 12.0 * scale;
    let mut y = rect.top();

    for line in body.lines() {
        let (text, size, color, indent): (String, f32, Color32, f32) = match classify(line) {
            Line::Blank => {
                y += theme.body_size * scale * 0.5;
                continue;
            }
            Line::Heading { level, text } => (
                text.to_string(),
                theme.heading_size(level),
                theme.heading_color,
                0.0,
            ),
            Line::Bullet(item) => (format!("• {item}"), theme.body_size, theme.foreground, 24.0),
            Line::Text(text) => (text.to_string(), theme.body_size, theme.foreground, 0.0),
        };
        let indent = indent * scale;
        let galley = painter.layout(
            text,
            FontId::proportional(size * scale),
            color,
            (rect.width() - indent).max(1.0),
        );
        let height = galley.rect.height();
        painter.galley(Pos2::new(rect.left() + indent, y), galley, color);
        y += height + gap;
        if y > rect.bottom() {
            break;
        }
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_headings() {
        assert_eq!(classify("# Title"), Line::Heading { level: 1, text: "Title" });
        assert_eq!(classify("  ### Deep  "), Line::Heading { level: 3, text: "Deep" });
        assert_eq!(classify("#hashtag"), Line::Text("#hashtag"));
        assert_eq!(classify("####### seven"), Line::Text("####### seven"));
    }

    #[test]
    fn classifies_bullets_and_text() {
        assert_eq!(classify("- item"), Line::Bullet("item"));
        assert_eq!(classify("* item"), Line::Bullet("item"));
        assert_eq!(classify("-not a bullet"), Line::Text("-not a bullet"));
        assert_eq!(classify("   "), Line::Blank);
    }

    #[test]
    fn scale_follows_the_tighter_axis() {
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(960.0, 1080.0));
        assert_eq!(compute_scale(rect), 0.5);
    }
}
