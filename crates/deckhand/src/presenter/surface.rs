use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::deck::SlideSummary;

use super::payload::SyncPayload;
use super::window::PresenterWindow;

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("the display backend cannot open additional windows")]
    Unsupported,
    #[error("presenter window blocked: {0}")]
    Blocked(String),
}

/// Size and title of the presenter window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: "Presenter".to_string(),
            width: 900.0,
            height: 700.0,
        }
    }
}

/// One end of a bidirectional string message channel.
#[derive(Debug)]
pub struct Port {
    tx: Sender<String>,
    rx: Receiver<String>,
}

/// Two connected ports: what one posts, the other drains.
pub fn port_pair() -> (Port, Port) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (Port { tx: a_tx, rx: a_rx }, Port { tx: b_tx, rx: b_rx })
}

impl Port {
    /// Returns false once the other end is gone.
    pub fn post(&self, message: String) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }
}

/// Shared closed flag, set by whichever side closes the window first.
#[derive(Debug, Clone, Default)]
pub struct CloseFlag(Arc<AtomicBool>);

impl CloseFlag {
    pub fn close(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Something that can create presenter windows.
pub trait SurfaceHost {
    /// Open a window and hand back the main-display end of its channel.
    fn open_window(&mut self, spec: &WindowSpec) -> Result<WindowSurface, SurfaceError>;
}

/// Main-display handle on an open presenter window.
#[derive(Debug)]
pub struct WindowSurface {
    port: Port,
    closed: CloseFlag,
}

impl WindowSurface {
    /// Create a connected window surface and its presenter-side state.
    pub fn connect() -> (Self, PresenterWindow) {
        let (main, aux) = port_pair();
        let closed = CloseFlag::default();
        let window = PresenterWindow::new(aux, closed.clone());
        (Self::from_parts(main, closed), window)
    }

    pub(crate) fn from_parts(port: Port, closed: CloseFlag) -> Self {
        Self { port, closed }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_closed()
    }

    pub fn close(&self) {
        self.closed.close();
    }

    pub fn post(&self, payload: &SyncPayload) {
        match payload.to_message() {
            Ok(message) => {
                if !self.port.post(message) {
                    tracing::debug!("presenter window gone, message dropped");
                }
            }
            Err(e) => tracing::warn!("could not encode presenter payload: {e}"),
        }
    }

    pub fn drain(&self) -> Vec<String> {
        self.port.drain()
    }
}

/// In-window fallback surface showing current and next slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub current: SlideSummary,
    pub next: SlideSummary,
}

/// Control pressed on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Prev,
    Next,
    Close,
}

impl Overlay {
    /// Re-render from a `state`/`update` payload. Slots past the end are blank.
    pub fn render(&mut self, payload: &SyncPayload) {
        let Some((slides, index)) = payload.snapshot() else {
            return;
        };
        self.current = slides.get(index).cloned().unwrap_or_default();
        self.next = index
            .checked_add(1)
            .and_then(|i| slides.get(i))
            .cloned()
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(index: usize, title: &str) -> SlideSummary {
        SlideSummary {
            index,
            title: title.to_string(),
            notes: format!("notes {index}"),
        }
    }

    #[test]
    fn ports_are_crossed() {
        let (a, b) = port_pair();
        assert!(a.post("ping".into()));
        assert!(b.post("pong".into()));
        assert_eq!(b.drain(), vec!["ping"]);
        assert_eq!(a.drain(), vec!["pong"]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn post_fails_after_peer_dropped() {
        let (a, b) = port_pair();
        drop(b);
        assert!(!a.post("lost".into()));
    }

    #[test]
    fn close_flag_is_shared() {
        let (surface, window) = WindowSurface::connect();
        assert!(!surface.is_closed());
        window.close();
        assert!(surface.is_closed());
    }

    #[test]
    fn overlay_shows_current_and_next() {
        let mut overlay = Overlay::default();
        let slides = vec![summary(0, "A"), summary(1, "B"), summary(2, "C")];
        overlay.render(&SyncPayload::Update { slides, index: 1 });
        assert_eq!(overlay.current.title, "B");
        assert_eq!(overlay.next.title, "C");
        assert_eq!(overlay.next.notes, "notes 2");
    }

    #[test]
    fn overlay_blanks_past_the_end() {
        let mut overlay = Overlay::default();
        let slides = vec![summary(0, "A")];
        overlay.render(&SyncPayload::State { slides, index: 0 });
        assert_eq!(overlay.current.title, "A");
        assert_eq!(overlay.next, SlideSummary::default());

        overlay.render(&SyncPayload::State {
            slides: vec![],
            index: 4,
        });
        assert_eq!(overlay.current, SlideSummary::default());
    }

    #[test]
    fn overlay_ignores_commands() {
        let mut overlay = Overlay::default();
        overlay.render(&SyncPayload::Nav { index: 1 });
        assert_eq!(overlay, Overlay::default());
    }
}
