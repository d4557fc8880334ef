use eframe::egui::{self, Pos2, Rect, RichText, Stroke};

use crate::theme::Theme;

use super::content::{CHART_FAILED, ChartData, ChartMode, LoadState};
use super::{PapersController, SectionFocus};

/// Tab strip plus the active page.
pub fn draw(ui: &mut egui::Ui, papers: &mut PapersController, theme: &Theme) {
    let mut clicked_tab = None;
    ui.horizontal_wrapped(|ui| {
        for (i, (page, tab)) in papers.pages().iter().zip(papers.tabs()).enumerate() {
            let label = RichText::new(&page.title).size(theme.notes_size * 1.1);
            if ui.selectable_label(tab.selected, label).clicked() {
                clicked_tab = Some(i);
            }
        }
    });
    if let Some(i) = clicked_tab {
        papers.show(i as isize, true);
    }
    if let Some(announcement) = papers.announcement() {
        ui.label(
            RichText::new(announcement)
                .small()
                .color(Theme::with_opacity(theme.foreground, 0.7)),
        );
    }
    ui.separator();

    let current = papers.current();
    let focus = papers.take_section_focus();
    let mut toggled = None;
    egui::ScrollArea::vertical()
        .id_salt(("paper-page", current))
        .show(ui, |ui| {
            let page = papers.active_page();
            ui.label(
                RichText::new(&page.title)
                    .size(theme.notes_size * 1.6)
                    .strong()
                    .color(theme.heading_color),
            );

            for (s, section) in page.sections.iter().enumerate() {
                let marker = if section.hidden { "▸" } else { "▾" };
                let toggle = ui.button(format!("{marker} {}", section.title));
                if focus == Some(SectionFocus::Toggle(s)) {
                    toggle.request_focus();
                }
                if toggle.clicked() {
                    toggled = Some(s);
                }
                if !section.hidden {
                    let body = ui.add(
                        egui::Label::new(RichText::new(&section.body).color(theme.foreground))
                            .sense(egui::Sense::focusable_noninteractive()),
                    );
                    if focus == Some(SectionFocus::Body(s)) {
                        body.request_focus();
                        body.scroll_to_me(None);
                    }
                }
            }

            if let Some(chart) = &page.chart {
                ui.add_space(12.0);
                match chart.data.state() {
                    LoadState::Ready(data) => draw_chart(ui, data, theme),
                    LoadState::Failed(_) => {
                        ui.label(RichText::new(CHART_FAILED).color(theme.foreground));
                    }
                    LoadState::Pending => {
                        ui.allocate_space(egui::vec2(ui.available_width(), 220.0));
                    }
                }
            }

            if let Some(viewer) = &page.viewer {
                ui.add_space(12.0);
                ui.label(RichText::new(viewer.title).small().color(theme.foreground))
                    .on_hover_text(viewer.src.as_str());
                egui::Frame::new()
                    .fill(theme.panel_background)
                    .inner_margin(12.0)
                    .show(ui, |ui| match viewer.text.state() {
                        LoadState::Ready(text) => {
                            ui.label(RichText::new(text).monospace());
                        }
                        LoadState::Failed(e) => {
                            ui.label(e.to_string());
                        }
                        LoadState::Pending => {
                            ui.spinner();
                        }
                    });
            }
        });

    if let Some(s) = toggled {
        papers.toggle_section(current, s);
    }
}

fn draw_chart(ui: &mut egui::Ui, data: &ChartData, theme: &Theme) {
    let size = egui::vec2(ui.available_width().min(520.0), 220.0);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, theme.panel_background);

    let Some((min, max)) = data.bounds() else {
        return;
    };
    let plot = rect.shrink2(egui::vec2(36.0, 20.0));
    let axis = Stroke::new(1.0, Theme::with_opacity(theme.foreground, 0.5));
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], axis);
    painter.line_segment([plot.left_bottom(), plot.left_top()], axis);

    let points: Vec<Pos2> = data
        .x
        .iter()
        .zip(&data.y)
        .map(|(&x, &y)| to_plot(plot, min, max, x, y))
        .collect();

    if matches!(data.mode, ChartMode::Lines | ChartMode::LinesMarkers) {
        painter.add(egui::Shape::line(
            points.clone(),
            Stroke::new(2.0, theme.accent),
        ));
    }
    if matches!(data.mode, ChartMode::Markers | ChartMode::LinesMarkers) {
        for p in &points {
            painter.circle_filled(*p, 4.0, theme.accent);
        }
    }
}

fn to_plot(plot: Rect, min: [f64; 2], max: [f64; 2], x: f64, y: f64) -> Pos2 {
    let span = |lo: f64, hi: f64| if hi > lo { hi - lo } else { 1.0 };
    let fx = ((x - min[0]) / span(min[0], max[0])) as f32;
    let fy = ((y - min[1]) / span(min[1], max[1])) as f32;
    egui::pos2(
        plot.left() + fx * plot.width(),
        plot.bottom() - fy * plot.height(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_corners() {
        let plot = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 50.0));
        assert_eq!(to_plot(plot, [1.0, 2.0], [4.0, 8.0], 1.0, 2.0), egui::pos2(0.0, 50.0));
        assert_eq!(to_plot(plot, [1.0, 2.0], [4.0, 8.0], 4.0, 8.0), egui::pos2(100.0, 0.0));
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let plot = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(10.0, 10.0));
        let p = to_plot(plot, [1.0, 3.0], [1.0, 3.0], 1.0, 3.0);
        assert_eq!(p, egui::pos2(0.0, 10.0));
    }
}
