use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui::emath::TSTransform;
use eframe::egui::{self, Color32, Pos2, Rect, Stroke, TextureHandle, Vec2};

use crate::theme::Theme;

use super::{CONNECTOR_TIP_RADIUS, Focus, Layout, Preview, PreviewImage, RoadmapController, zoom};

const DEFAULT_LABEL_WIDTH: f32 = 160.0;

/// What the roadmap view keeps between frames: GPU textures for the
/// reference image and the open preview, and the focus last handed to egui.
#[derive(Default)]
pub struct RoadmapView {
    image: Option<(PathBuf, Option<TextureHandle>)>,
    preview: Option<(PathBuf, TextureHandle)>,
    focus: Option<Focus>,
}

impl RoadmapView {
    fn image(&mut self, ctx: &egui::Context, path: &Path) -> Option<TextureHandle> {
        match &self.image {
            Some((cached, texture)) if cached == path => texture.clone(),
            _ => {
                let texture = load_texture(ctx, path);
                self.image = Some((path.to_path_buf(), texture.clone()));
                texture
            }
        }
    }

    fn preview(&mut self, ctx: &egui::Context, img: &PreviewImage) -> TextureHandle {
        match &self.preview {
            Some((cached, texture)) if cached == &img.path => texture.clone(),
            _ => {
                let color = egui::ColorImage::from_rgba_unmultiplied(img.size, &img.rgba);
                let texture = ctx.load_texture(
                    img.path.display().to_string(),
                    color,
                    egui::TextureOptions::LINEAR,
                );
                self.preview = Some((img.path.clone(), texture.clone()));
                texture
            }
        }
    }
}

fn load_texture(ctx: &egui::Context, path: &Path) -> Option<TextureHandle> {
    let img = match image::open(path) {
        Ok(img) => img.into_rgba8(),
        Err(e) => {
            tracing::warn!("roadmap image {} not loaded: {e}", path.display());
            return None;
        }
    };
    let (w, h) = img.dimensions();
    let color = egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &img.into_raw());
    Some(ctx.load_texture(
        path.display().to_string(),
        color,
        egui::TextureOptions::LINEAR,
    ))
}

/// Which control should take keyboard focus this frame. Only a change in
/// the controller's focus is handed on, so egui's own Tab moves stick.
fn focus_request(applied: &mut Option<Focus>, current: Focus) -> Option<Focus> {
    if *applied == Some(current) {
        return None;
    }
    *applied = Some(current);
    (current != Focus::Elsewhere).then_some(current)
}

/// Draw the roadmap into `rect`. Returns a location fragment when the
/// popover's section link was followed.
pub fn draw(
    ui: &mut egui::Ui,
    roadmap: &mut RoadmapController,
    view: &mut RoadmapView,
    theme: &Theme,
    rect: Rect,
    now: Instant,
) -> Option<String> {
    let stage = Rect::from_min_size(rect.min, egui::vec2(rect.width(), rect.height() * 0.78));
    let details_rect = Rect::from_min_max(egui::pos2(rect.left(), stage.bottom()), rect.max);
    let painter = ui.painter_at(rect);
    let stage_painter = ui.painter_at(stage);
    let origin = stage.min.to_vec2();

    let visible = stage.intersect(ui.clip_rect());
    let fraction = if visible.is_positive() {
        visible.area() / stage.area().max(1.0)
    } else {
        0.0
    };
    roadmap.observe_visibility(fraction);
    let dt = Duration::from_secs_f32(ui.input(|i| i.stable_dt).clamp(0.0, 0.1));
    if roadmap.tick(dt) {
        ui.ctx().request_repaint();
    }

    let mut layout = Layout::new(stage);
    let texture = roadmap
        .image_path()
        .and_then(|path| view.image(ui.ctx(), path));
    let image_rect = texture.as_ref().map(|t| fit(t.size_vec2(), stage));
    layout.image = image_rect;
    roadmap.position_all(layout);

    // Clicks land in stage coordinates, before the camera moves.
    let camera = camera(roadmap, stage);
    let click = ui.input(|i| {
        i.pointer
            .primary_clicked()
            .then(|| i.pointer.interact_pos())
            .flatten()
    });
    if let Some(pos) = click {
        roadmap.handle_click(camera.inverse() * pos - origin, now);
    }
    let wanted = focus_request(&mut view.focus, roadmap.focus());

    if let (Some(texture), Some(image_rect)) = (texture, image_rect) {
        stage_painter.image(
            texture.id(),
            camera * image_rect,
            Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    // Reference path, drawn up to the reveal fraction.
    let prefix = roadmap
        .path()
        .and_then(|path| path.prefix(roadmap.reveal().drawn_fraction()).ok());
    if let Some(prefix) = prefix {
        let view_box = roadmap.view_box();
        let points: Vec<Pos2> = prefix
            .into_iter()
            .filter_map(|p| view_box.to_screen(p, layout.path_area()).ok())
            .map(|p| camera * p)
            .collect();
        stage_painter.add(egui::Shape::line(points, Stroke::new(3.0, theme.accent)));
    }

    for connector in roadmap.connectors() {
        let from = camera * (connector.from + origin);
        let to = camera * (connector.to + origin);
        stage_painter.line_segment(
            [from, to],
            Stroke::new(1.5, Theme::with_opacity(theme.connector, 0.8)),
        );
        stage_painter.circle_filled(to, CONNECTOR_TIP_RADIUS, theme.connector);
    }

    if let Some(dot) = roadmap.highlight() {
        stage_painter.circle_filled(camera * (dot + origin), 7.0 * camera.scaling, theme.accent);
    }

    let label_width = roadmap.label_width().unwrap_or(DEFAULT_LABEL_WIDTH);
    for (i, milestone) in roadmap.milestones().iter().enumerate() {
        let Some(control) = milestone.control_rect() else {
            continue;
        };
        let control = camera * control.translate(origin);
        // Pointer clicks go through `handle_click`; the click sense makes
        // the control focusable and announces it as a button.
        let response = ui
            .interact(
                control.intersect(stage),
                egui::Id::new(("roadmap-milestone", i)),
                egui::Sense::click(),
            )
            .on_hover_cursor(egui::CursorIcon::PointingHand);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, &milestone.label)
        });
        if wanted == Some(Focus::Milestone(i)) {
            response.request_focus();
        }

        let fill = if i == roadmap.active() {
            theme.accent
        } else {
            theme.panel_background
        };
        let inset = if response.hovered() || response.has_focus() {
            2.0
        } else {
            6.0
        };
        let radius = control.width() / 2.0 - inset;
        stage_painter.circle(control.center(), radius, fill, Stroke::new(2.0, theme.accent));

        let galley = stage_painter.layout(
            milestone.label.clone(),
            egui::FontId::proportional(theme.notes_size),
            theme.foreground,
            label_width,
        );
        let pos = egui::pos2(
            control.center().x - galley.rect.width() / 2.0,
            control.bottom() + 4.0,
        );
        stage_painter.galley(pos, galley, theme.foreground);
    }

    let mut followed = None;
    let open = roadmap.popover().map(|p| {
        let texture = match &p.preview {
            Preview::Loaded(img) => Some(view.preview(ui.ctx(), img)),
            Preview::Unavailable => None,
        };
        (p.rect(), p.title.clone(), p.section_link.clone(), texture)
    });
    if let Some((pop_rect, title, section_link, texture)) = open {
        // The popover follows its control under the camera but keeps its size.
        let anchor = camera * (pop_rect.min + origin);
        let pop_rect = Rect::from_min_size(anchor, pop_rect.size());
        painter.rect_filled(pop_rect, 8.0, theme.panel_background);
        painter.rect_stroke(
            pop_rect,
            8.0,
            Stroke::new(1.0, theme.accent),
            egui::StrokeKind::Inside,
        );
        let inner = pop_rect.shrink(10.0);
        let preview_rect = Rect::from_min_size(inner.min, egui::vec2(inner.width(), 150.0));
        match texture {
            Some(texture) => {
                painter.image(
                    texture.id(),
                    fit(texture.size_vec2(), preview_rect),
                    Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                painter.text(
                    preview_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    &title,
                    egui::FontId::proportional(theme.notes_size),
                    theme.foreground,
                );
            }
        }

        let row = Rect::from_min_size(
            egui::pos2(inner.left(), preview_rect.bottom() + 12.0),
            egui::vec2(inner.width(), 28.0),
        );
        let (link_rect, close_rect) = row.split_left_right_at_fraction(0.6);
        let link = ui.put(link_rect, egui::Link::new("Go to section"));
        if wanted == Some(Focus::Popover) {
            link.request_focus();
        }
        if link.clicked() {
            followed = Some(section_link);
        }
        if ui.put(close_rect, egui::Button::new("Close")).clicked() {
            roadmap.close_popover();
        }
    }

    draw_details(&painter, roadmap, theme, details_rect, now);
    followed
}

/// Stage camera for this frame. The identity when nothing can be zoomed.
fn camera(roadmap: &RoadmapController, stage: Rect) -> TSTransform {
    roadmap
        .zoom_focus()
        .map(|focus| zoom::transform(stage, focus, roadmap.zoom().amount()))
        .unwrap_or(TSTransform::IDENTITY)
}

fn draw_details(
    painter: &egui::Painter,
    roadmap: &RoadmapController,
    theme: &Theme,
    rect: Rect,
    now: Instant,
) {
    let detail = roadmap.details();
    let mut y = rect.top() + 12.0;
    let title = painter.layout(
        detail.title.clone(),
        egui::FontId::proportional(theme.notes_size * 1.3),
        theme.heading_color,
        rect.width(),
    );
    let height = title.rect.height();
    painter.galley(egui::pos2(rect.left(), y), title, theme.heading_color);
    y += height + 6.0;

    for line in detail.bullet_lines() {
        let galley = painter.layout(
            line,
            egui::FontId::proportional(theme.notes_size),
            theme.foreground,
            rect.width(),
        );
        let height = galley.rect.height();
        painter.galley(egui::pos2(rect.left(), y), galley, theme.foreground);
        y += height + 2.0;
    }

    if let Some(status) = roadmap.status_text(now) {
        painter.text(
            egui::pos2(rect.right(), rect.top() + 12.0),
            egui::Align2::RIGHT_TOP,
            status,
            egui::FontId::proportional(theme.notes_size * 0.9),
            Theme::with_opacity(theme.foreground, 0.7),
        );
        painter.ctx().request_repaint_after(Duration::from_millis(250));
    }
}

/// Largest rect of `size`'s aspect ratio centered in `bounds`.
fn fit(size: Vec2, bounds: Rect) -> Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width() / size.x).min(bounds.height() / size.y);
    Rect::from_center_size(bounds.center(), size * scale)
}
