pub mod payload;
pub mod surface;
pub mod view;
pub mod viewport;
pub mod window;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use crate::deck::{self, Deck, DeckEvent};

use payload::{ControlAction, SyncPayload};
use surface::{Overlay, OverlayAction, SurfaceHost, WindowSpec, WindowSurface};

pub const DEFAULT_PUSH_DELAY: Duration = Duration::from_millis(300);

/// The live auxiliary surface. Never both at once.
#[derive(Debug)]
enum Surface {
    Window(WindowSurface),
    Overlay(Overlay),
}

/// Keeps the presenter surface in sync with the main display.
#[derive(Debug)]
pub struct PresenterChannel {
    surface: Option<Surface>,
    window_spec: WindowSpec,
    push_delay: Duration,
    pending_push: Option<Instant>,
    observed_index: Option<usize>,
}

impl Default for PresenterChannel {
    fn default() -> Self {
        Self::new(WindowSpec::default(), DEFAULT_PUSH_DELAY)
    }
}

impl PresenterChannel {
    pub fn new(window_spec: WindowSpec, push_delay: Duration) -> Self {
        Self {
            surface: None,
            window_spec,
            push_delay,
            pending_push: None,
            observed_index: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    pub fn has_window(&self) -> bool {
        matches!(self.surface, Some(Surface::Window(_)))
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        match &self.surface {
            Some(Surface::Overlay(overlay)) => Some(overlay),
            _ => None,
        }
    }

    /// Close whatever is open, or open a window (overlay if that fails).
    pub fn toggle(&mut self, host: &mut dyn SurfaceHost, deck: &dyn Deck, now: Instant) {
        self.forget_closed_window();
        if self.is_open() {
            self.close();
            return;
        }

        match host.open_window(&self.window_spec) {
            Ok(window) => {
                tracing::info!("presenter window opened");
                self.surface = Some(Surface::Window(window));
                self.pending_push = Some(now + self.push_delay);
            }
            Err(e) => {
                tracing::info!("presenter window unavailable ({e}), using overlay");
                self.surface = Some(Surface::Overlay(Overlay::default()));
                self.send_state(deck);
            }
        }
    }

    /// Close the window and remove the overlay. Safe when nothing is open.
    pub fn close(&mut self) {
        match self.surface.take() {
            Some(Surface::Window(window)) => {
                window.close();
                tracing::info!("presenter window closed");
            }
            Some(Surface::Overlay(_)) => tracing::info!("presenter overlay removed"),
            None => {}
        }
        self.pending_push = None;
    }

    pub fn send_state(&mut self, deck: &dyn Deck) {
        let payload = SyncPayload::State {
            slides: deck::slide_summaries(deck.slides()),
            index: deck::resolve_current_index(deck),
        };
        self.deliver(&payload);
    }

    pub fn send_update(&mut self, deck: &dyn Deck, index: usize) {
        let payload = SyncPayload::Update {
            slides: deck::slide_summaries(deck.slides()),
            index,
        };
        self.deliver(&payload);
    }

    fn deliver(&mut self, payload: &SyncPayload) {
        match &mut self.surface {
            Some(Surface::Window(window)) if !window.is_closed() => window.post(payload),
            Some(Surface::Overlay(overlay)) => overlay.render(payload),
            _ => {}
        }
    }

    /// Handle one message from the presenter surface. Malformed or unknown
    /// messages are ignored.
    pub fn handle_message(&mut self, message: &str, deck: &mut dyn Deck) {
        match SyncPayload::from_message(message) {
            Some(SyncPayload::Nav { index }) => deck.go_to(index),
            Some(SyncPayload::Control { action }) => match action {
                ControlAction::Next => deck.next(),
                ControlAction::Prev => deck.prev(),
                ControlAction::Close => self.close(),
            },
            Some(SyncPayload::State { .. } | SyncPayload::Update { .. }) => {}
            None => tracing::debug!("ignored presenter message: {message}"),
        }
    }

    /// Apply a control pressed on the overlay.
    pub fn overlay_action(&mut self, action: OverlayAction, deck: &mut dyn Deck) {
        match action {
            OverlayAction::Prev => deck.prev(),
            OverlayAction::Next => deck.next(),
            OverlayAction::Close => self.exit_overlay(),
        }
    }

    pub fn exit_overlay(&mut self) {
        if matches!(self.surface, Some(Surface::Overlay(_))) {
            self.close();
        }
    }

    /// Per-tick work: inbound messages, the delayed initial push, and
    /// synchronization with the deck.
    pub fn poll(&mut self, deck: &mut dyn Deck, now: Instant) {
        let inbound = match &self.surface {
            Some(Surface::Window(window)) => window.drain(),
            _ => Vec::new(),
        };
        for message in inbound {
            self.handle_message(&message, deck);
        }
        self.forget_closed_window();

        if self.pending_push.is_some_and(|due| now >= due) {
            self.pending_push = None;
            self.send_state(deck);
        }

        self.sync(deck);
    }

    fn sync(&mut self, deck: &mut dyn Deck) {
        match deck.take_events() {
            Some(events) => {
                for event in events {
                    match event {
                        DeckEvent::Ready => self.send_state(deck),
                        DeckEvent::SlideChanged { .. } => {
                            let index = deck::resolve_current_index(deck);
                            self.send_update(deck, index);
                        }
                    }
                }
            }
            None => {
                // No deck events: watch the present marker instead.
                let index = deck::resolve_current_index(deck);
                if self.observed_index.replace(index) != Some(index) {
                    self.send_update(deck, index);
                }
            }
        }
    }

    fn forget_closed_window(&mut self) {
        if matches!(&self.surface, Some(Surface::Window(w)) if w.is_closed()) {
            tracing::debug!("presenter window closed by the presenter");
            self.surface = None;
            self.pending_push = None;
        }
    }
}
