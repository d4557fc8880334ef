use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::Config;
use crate::context::{DeckContext, InputKey};
use crate::deck::{Deck, MarkdownDeck, Widget};
use crate::presenter::PresenterChannel;
use crate::presenter::view::draw_overlay;
use crate::presenter::viewport::ViewportHost;
use crate::render;
use crate::roadmap::view::RoadmapView;
use crate::theme::Theme;
use crate::watch::DeckWatcher;
use crate::{papers, roadmap};

/// How the presentation window starts.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub file: PathBuf,
    pub windowed: bool,
    /// 1-based; falls back to the configured start slide.
    pub start_slide: Option<usize>,
    pub fragment: Option<String>,
    pub reduced_motion: bool,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

struct DeckhandApp {
    file: PathBuf,
    title: String,
    context: DeckContext,
    theme: Theme,
    host: ViewportHost,
    roadmap_view: RoadmapView,
    watcher: Option<DeckWatcher>,
    toast: Option<Toast>,
    shown_fragment: Option<String>,
}

impl DeckhandApp {
    fn reload(&mut self) {
        let content = match std::fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("could not re-read {}: {e}", self.file.display());
                return;
            }
        };
        match self.context.reload(&content) {
            Ok(()) => {
                tracing::info!("reloaded {}", self.file.display());
                self.toast = Some(Toast::new(format!(
                    "Reloaded ({} slides)",
                    self.context.deck.len()
                )));
            }
            Err(e) => {
                tracing::warn!("reload failed: {e}");
                self.toast = Some(Toast::new(format!("Reload failed: {e}")));
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.mode)));
    }

    fn window_title(&self) -> String {
        match self.context.fragment() {
            Some(fragment) if fragment.starts_with('#') => format!("{} {fragment}", self.title),
            Some(fragment) => format!("{} #{fragment}", self.title),
            None => self.title.clone(),
        }
    }

    fn draw_slide(&mut self, ui: &mut egui::Ui, rect: egui::Rect, scale: f32, now: Instant) {
        let content = rect.shrink(80.0 * scale);
        let body = match self.context.deck.current_slide() {
            Some(slide) => slide.body(),
            None => {
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No slides",
                    egui::FontId::proportional(self.theme.body_size * scale),
                    self.theme.foreground,
                );
                return;
            }
        };

        let Some(widget) = self.context.active_widget() else {
            render::draw_body(ui, &body, content, &self.theme, scale);
            return;
        };

        // Widget slides keep a header band for the slide's own text.
        let split = content.top() + content.height() * 0.2;
        let header = egui::Rect::from_min_max(content.min, egui::pos2(content.right(), split));
        let area = egui::Rect::from_min_max(egui::pos2(content.left(), split), content.max);
        render::draw_body(ui, &body, header, &self.theme, scale);

        match widget {
            Widget::Roadmap => {
                let Some(controller) = self.context.roadmap.as_mut() else {
                    return;
                };
                let followed = roadmap::view::draw(
                    ui,
                    controller,
                    &mut self.roadmap_view,
                    &self.theme,
                    area,
                    now,
                );
                if let Some(link) = followed {
                    self.context.set_fragment(link);
                }
            }
            Widget::Papers => {
                let Some(controller) = self.context.papers.as_mut() else {
                    return;
                };
                let theme = &self.theme;
                ui.scope_builder(egui::UiBuilder::new().max_rect(area), |ui| {
                    papers::view::draw(ui, controller, theme);
                });
                self.context.sync_fragment();
            }
        }
    }
}

fn input_keys(input: &egui::InputState) -> Vec<InputKey> {
    const BINDINGS: [(egui::Key, InputKey); 17] = [
        (egui::Key::P, InputKey::TogglePresenter),
        (egui::Key::ArrowLeft, InputKey::Left),
        (egui::Key::ArrowRight, InputKey::Right),
        (egui::Key::Space, InputKey::Space),
        (egui::Key::Enter, InputKey::Enter),
        (egui::Key::Escape, InputKey::Escape),
        (egui::Key::PageUp, InputKey::PageUp),
        (egui::Key::PageDown, InputKey::PageDown),
        (egui::Key::Num1, InputKey::Digit(1)),
        (egui::Key::Num2, InputKey::Digit(2)),
        (egui::Key::Num3, InputKey::Digit(3)),
        (egui::Key::Num4, InputKey::Digit(4)),
        (egui::Key::Num5, InputKey::Digit(5)),
        (egui::Key::Num6, InputKey::Digit(6)),
        (egui::Key::Num7, InputKey::Digit(7)),
        (egui::Key::Num8, InputKey::Digit(8)),
        (egui::Key::Num9, InputKey::Digit(9)),
    ];
    BINDINGS
        .iter()
        .filter(|(key, _)| input.key_pressed(*key))
        .map(|(_, mapped)| *mapped)
        .collect()
}

fn draw_toast(ui: &egui::Ui, toast: &Toast, theme: &Theme, rect: egui::Rect, scale: f32) {
    let opacity = toast.opacity();
    if opacity <= 0.0 {
        return;
    }
    let color = Theme::with_opacity(theme.foreground, opacity * 0.9);
    let background = Theme::with_opacity(theme.panel_background, opacity * 0.9);
    let galley = ui.painter().layout_no_wrap(
        toast.message.clone(),
        egui::FontId::proportional(20.0 * scale.max(0.5)),
        color,
    );
    let padding = 16.0 * scale;
    let toast_rect = egui::Rect::from_min_size(
        egui::pos2(
            rect.center().x - galley.rect.width() / 2.0 - padding,
            rect.bottom() - 80.0 * scale - galley.rect.height(),
        ),
        egui::vec2(
            galley.rect.width() + padding * 2.0,
            galley.rect.height() + padding * 2.0,
        ),
    );
    ui.painter().rect_filled(toast_rect, 8.0 * scale, background);
    ui.painter().galley(
        egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding),
        galley,
        color,
    );
}

impl eframe::App for DeckhandApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if self.watcher.as_ref().is_some_and(DeckWatcher::changed) {
            self.reload();
        }
        self.host.refresh(ctx);

        // Viewport commands go out after the input closure; sending inside it
        // deadlocks on the input lock.
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut keys = Vec::new();
        let mut toggle_theme = false;
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }
            if i.key_pressed(egui::Key::D) {
                toggle_theme = true;
                return;
            }
            keys = input_keys(i);
        });
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        if toggle_theme {
            self.toggle_theme();
        }
        for key in keys {
            self.context.handle_key(key, &mut self.host, now);
        }

        if self.context.poll(now) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(self.theme.background))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let scale = render::compute_scale(rect);
                self.draw_slide(ui, rect, scale, now);

                let action = self
                    .context
                    .presenter
                    .overlay()
                    .and_then(|overlay| draw_overlay(ui, overlay, &self.theme, rect, scale));
                if let Some(action) = action {
                    self.context
                        .presenter
                        .overlay_action(action, &mut self.context.deck);
                }

                if let Some(toast) = &self.toast {
                    draw_toast(ui, toast, &self.theme, rect, scale);
                }
            });

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        } else if self.toast.is_some() {
            ctx.request_repaint();
        }

        self.host.show(ctx, &self.theme);

        let fragment = self.context.fragment().map(str::to_string);
        if fragment != self.shown_fragment {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
            self.shown_fragment = fragment;
        }
    }
}

/// The deck's own title, or one built from the file name.
fn window_base_title(meta_title: Option<&str>, file: &Path) -> String {
    match meta_title {
        Some(title) => title.to_string(),
        None => format!(
            "deckhand - {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        ),
    }
}

pub fn run(options: LaunchOptions) -> anyhow::Result<()> {
    let LaunchOptions {
        file,
        windowed,
        start_slide,
        fragment,
        reduced_motion,
    } = options;

    let mut deck = MarkdownDeck::load(&file)?;
    if deck.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }

    let title = window_base_title(deck.meta.title.as_deref(), &file);

    // CLI flags override config
    let config = Config::load_or_default();
    let theme = Theme::from_name(
        deck.meta
            .theme
            .as_deref()
            .or(config.theme())
            .unwrap_or("light"),
    );
    let initial_slide = start_slide
        .or(config.start_slide())
        .map(|s| s.saturating_sub(1))
        .unwrap_or(0);
    deck.go_to(initial_slide);
    let reduced_motion = reduced_motion || config.reduced_motion();

    let base_dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let presenter = PresenterChannel::new(config.window_spec(), config.push_delay());
    let context = DeckContext::new(deck, base_dir, presenter, fragment, reduced_motion);

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    // The app closure takes ownership of `title`.
    let app_name = title.clone();
    eframe::run_native(
        &app_name,
        options,
        Box::new(move |cc| {
            let repaint = cc.egui_ctx.clone();
            let watcher = DeckWatcher::start(&file, move || repaint.request_repaint())
                .inspect_err(|e| tracing::warn!("live reload disabled: {e}"))
                .ok();
            // `shown_fragment` starts empty so a launch fragment reaches the
            // title on the first frame.
            let app = DeckhandApp {
                file,
                title,
                context,
                theme,
                host: ViewportHost::default(),
                roadmap_view: RoadmapView::default(),
                watcher,
                toast: None,
                shown_fragment: None,
            };
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
