use eframe::egui;

use crate::theme::Theme;

use super::surface::{SurfaceError, SurfaceHost, WindowSpec, WindowSurface};
use super::view;
use super::window::PresenterWindow;

/// Opens the presenter as a second native viewport.
///
/// Backends that embed every viewport inside the main window cannot host a
/// separate presenter display; opening fails there and the channel falls back
/// to its overlay.
#[derive(Debug, Default)]
pub struct ViewportHost {
    embedded: bool,
    window: Option<(PresenterWindow, WindowSpec)>,
}

impl ViewportHost {
    /// Refresh backend capabilities. Call once per frame before handling input.
    pub fn refresh(&mut self, ctx: &egui::Context) {
        self.embedded = ctx.embed_viewports();
        if self.window.as_ref().is_some_and(|(w, _)| w.is_closed()) {
            self.window = None;
        }
    }

    /// Render the presenter viewport, if one is open.
    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) {
        let Some((window, spec)) = self.window.as_mut() else {
            return;
        };
        window.receive();

        let builder = egui::ViewportBuilder::default()
            .with_title(&spec.title)
            .with_inner_size([spec.width, spec.height]);

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("deckhand-presenter"),
            builder,
            |ctx, _class| {
                if ctx.input(|i| i.viewport().close_requested()) {
                    window.close();
                    return;
                }
                egui::CentralPanel::default()
                    .frame(egui::Frame::new().fill(theme.background).inner_margin(16.0))
                    .show(ctx, |ui| view::presenter_window(ui, window, theme));
            },
        );

        if window.is_closed() {
            self.window = None;
        }
    }
}

impl SurfaceHost for ViewportHost {
    fn open_window(&mut self, spec: &WindowSpec) -> Result<WindowSurface, SurfaceError> {
        if self.embedded {
            return Err(SurfaceError::Unsupported);
        }
        if self.window.as_ref().is_some_and(|(w, _)| !w.is_closed()) {
            return Err(SurfaceError::Blocked(
                "a presenter window is still open".to_string(),
            ));
        }
        let (surface, window) = WindowSurface::connect();
        self.window = Some((window, spec.clone()));
        Ok(surface)
    }
}
