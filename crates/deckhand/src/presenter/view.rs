use std::sync::LazyLock;

use eframe::egui::{self, Pos2, RichText};
use regex::Regex;

use crate::deck::SlideSummary;
use crate::theme::Theme;

use super::payload::ControlAction;
use super::surface::{Overlay, OverlayAction};
use super::window::PresenterWindow;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Notes markup reduced to readable text.
pub fn plain_text(markup: &str) -> String {
    let text = TAG.replace_all(markup, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of the presenter window: controls, current/next panes, slide list.
pub fn presenter_window(ui: &mut egui::Ui, window: &PresenterWindow, theme: &Theme) {
    ui.horizontal(|ui| {
        if ui.button("Prev").clicked() {
            window.control(ControlAction::Prev);
        }
        if ui.button("Next").clicked() {
            window.control(ControlAction::Next);
        }
        if ui.button("Close").clicked() {
            window.close();
        }
        if !window.slides.is_empty() {
            ui.label(position_label(window.index, window.slides.len()));
        }
    });
    ui.separator();

    let blank = SlideSummary::default();
    ui.columns(2, |columns| {
        summary_pane(&mut columns[0], "Current", window.current().unwrap_or(&blank), theme);
        summary_pane(&mut columns[1], "Next", window.upcoming().unwrap_or(&blank), theme);
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("presenter_slide_list")
        .show(ui, |ui| {
            for slide in &window.slides {
                let label = format!("{:>3}. {}", slide.index.saturating_add(1), slide.title);
                if ui
                    .selectable_label(slide.index == window.index, label)
                    .clicked()
                {
                    window.navigate(slide.index);
                }
            }
        });
}

/// "3 / 10". Indices come off the message port, so they may be anything.
fn position_label(index: usize, len: usize) -> String {
    format!("{} / {len}", index.saturating_add(1))
}

fn summary_pane(ui: &mut egui::Ui, caption: &str, slide: &SlideSummary, theme: &Theme) {
    ui.label(RichText::new(caption).color(Theme::with_opacity(theme.foreground, 0.6)));
    ui.label(
        RichText::new(&slide.title)
            .size(theme.notes_size * 1.4)
            .strong()
            .color(theme.heading_color),
    );
    ui.label(
        RichText::new(plain_text(&slide.notes))
            .size(theme.notes_size)
            .color(theme.foreground),
    );
}

/// Draw the in-window overlay along the bottom of `rect`.
pub fn draw_overlay(
    ui: &mut egui::Ui,
    overlay: &Overlay,
    theme: &Theme,
    rect: egui::Rect,
    scale: f32,
) -> Option<OverlayAction> {
    let height = (rect.height() * 0.32).max(180.0 * scale);
    let pane_rect = egui::Rect::from_min_max(
        Pos2::new(rect.left(), rect.bottom() - height),
        rect.right_bottom(),
    );
    ui.painter().rect_filled(
        pane_rect,
        0.0,
        Theme::with_opacity(theme.panel_background, 0.95),
    );

    let padding = 16.0 * scale;
    let inner = pane_rect.shrink(padding);
    let half = inner.width() / 2.0;
    let left = egui::Rect::from_min_size(inner.min, egui::vec2(half - padding, inner.height()));
    let right = egui::Rect::from_min_size(
        Pos2::new(inner.left() + half, inner.top()),
        egui::vec2(half, inner.height()),
    );

    let controls_height = 28.0 * scale.max(0.75);
    draw_summary(ui, &overlay.current, theme, left, controls_height + padding, scale);
    draw_summary(ui, &overlay.next, theme, right, 0.0, scale);

    let mut action = None;
    let button_size = egui::vec2(72.0 * scale.max(0.75), controls_height);
    let labels = [
        ("Prev", OverlayAction::Prev),
        ("Next", OverlayAction::Next),
        ("Close", OverlayAction::Close),
    ];
    for (i, (label, value)) in labels.into_iter().enumerate() {
        let min = Pos2::new(
            left.left() + i as f32 * (button_size.x + 8.0 * scale),
            left.top(),
        );
        let response = ui.put(
            egui::Rect::from_min_size(min, button_size),
            egui::Button::new(label),
        );
        if response.clicked() {
            action = Some(value);
        }
    }
    action
}

fn draw_summary(
    ui: &egui::Ui,
    slide: &SlideSummary,
    theme: &Theme,
    rect: egui::Rect,
    top_offset: f32,
    scale: f32,
) {
    let painter = ui.painter_at(rect);
    let mut y = rect.top() + top_offset;

    let title = painter.layout(
        slide.title.clone(),
        egui::FontId::proportional(theme.notes_size * 1.4 * scale.max(0.75)),
        theme.heading_color,
        rect.width(),
    );
    let title_height = title.rect.height();
    painter.galley(Pos2::new(rect.left(), y), title, theme.heading_color);
    y += title_height + 8.0 * scale;

    let notes = painter.layout(
        plain_text(&slide.notes),
        egui::FontId::proportional(theme.notes_size * scale.max(0.75)),
        theme.foreground,
        rect.width(),
    );
    painter.galley(Pos2::new(rect.left(), y), notes, theme.foreground);
}
