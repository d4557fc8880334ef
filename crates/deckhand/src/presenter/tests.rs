use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::PresenterChannel;
use super::payload::ControlAction;
use super::surface::{
    CloseFlag, OverlayAction, SurfaceError, SurfaceHost, WindowSpec, WindowSurface, port_pair,
};
use super::window::PresenterWindow;
use crate::deck::{Deck, DeckEvent, MarkdownDeck, SlideMarkup};

/// Host that either hands out connected windows or refuses.
struct FakeHost {
    allow: bool,
    attempts: usize,
    windows: Vec<PresenterWindow>,
}

impl FakeHost {
    fn allowing() -> Self {
        Self {
            allow: true,
            attempts: 0,
            windows: Vec::new(),
        }
    }

    fn blocking() -> Self {
        Self {
            allow: false,
            ..Self::allowing()
        }
    }

    fn window(&mut self) -> &mut PresenterWindow {
        self.windows.last_mut().expect("a window was opened")
    }
}

impl SurfaceHost for FakeHost {
    fn open_window(&mut self, _spec: &WindowSpec) -> Result<WindowSurface, SurfaceError> {
        self.attempts += 1;
        if !self.allow {
            return Err(SurfaceError::Unsupported);
        }
        let (surface, window) = WindowSurface::connect();
        self.windows.push(window);
        Ok(surface)
    }
}

fn five_slides() -> MarkdownDeck {
    let content = (1..=5)
        .map(|n| format!("# Slide {n}\nNote: notes {n}"))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    MarkdownDeck::parse(&content).unwrap()
}

fn channel() -> PresenterChannel {
    PresenterChannel::new(WindowSpec::default(), Duration::from_millis(300))
}

#[test]
fn toggle_opens_window_once() {
    let deck = five_slides();
    let mut host = FakeHost::allowing();
    let mut presenter = channel();
    presenter.toggle(&mut host, &deck, Instant::now());
    assert_eq!(host.attempts, 1);
    assert!(presenter.has_window());
    assert!(presenter.overlay().is_none());
}

#[test]
fn blocked_window_falls_back_to_overlay() {
    let deck = five_slides();
    let mut host = FakeHost::blocking();
    let mut presenter = channel();
    presenter.toggle(&mut host, &deck, Instant::now());
    assert_eq!(host.attempts, 1);
    assert!(!presenter.has_window());
    let overlay = presenter.overlay().expect("overlay fallback");
    assert_eq!(overlay.current.title, "Slide 1");
    assert_eq!(overlay.next.title, "Slide 2");
}

#[test]
fn toggling_twice_closes_everything() {
    let deck = five_slides();
    for mut host in [FakeHost::allowing(), FakeHost::blocking()] {
        let mut presenter = channel();
        let now = Instant::now();
        presenter.toggle(&mut host, &deck, now);
        presenter.toggle(&mut host, &deck, now);
        assert!(!presenter.is_open());
        assert!(presenter.overlay().is_none());
        assert_eq!(host.attempts, 1);
        if let Some(window) = host.windows.last() {
            assert!(window.is_closed());
        }
    }
}

#[test]
fn initial_state_is_pushed_after_delay() {
    let mut deck = five_slides();
    deck.take_events();
    let mut host = FakeHost::allowing();
    let mut presenter = channel();
    let opened = Instant::now();
    presenter.toggle(&mut host, &deck, opened);

    presenter.poll(&mut deck, opened + Duration::from_millis(100));
    assert_eq!(host.window().receive(), 0);

    presenter.poll(&mut deck, opened + Duration::from_millis(300));
    assert_eq!(host.window().receive(), 1);
    assert_eq!(host.window().slides.len(), 5);

    presenter.poll(&mut deck, opened + Duration::from_millis(900));
    assert_eq!(host.window().receive(), 0);
}

/// Host handing out one surface whose far end the test reads raw.
struct RawHost(Option<WindowSurface>);

impl SurfaceHost for RawHost {
    fn open_window(&mut self, _spec: &WindowSpec) -> Result<WindowSurface, SurfaceError> {
        self.0
            .take()
            .ok_or_else(|| SurfaceError::Blocked("already used".into()))
    }
}

#[test]
fn update_payload_for_current_slide() {
    let mut deck = five_slides();
    deck.go_to(2);
    deck.take_events();

    let (main, far) = port_pair();
    let mut host = RawHost(Some(WindowSurface::from_parts(main, CloseFlag::default())));
    let mut presenter = channel();
    presenter.toggle(&mut host, &deck, Instant::now());
    presenter.send_update(&deck, 2);

    let messages: Vec<Value> = far
        .drain()
        .iter()
        .map(|m| serde_json::from_str(m).unwrap())
        .collect();
    assert_eq!(messages.len(), 1);
    let payload = &messages[0];
    assert_eq!(payload["type"], json!("update"));
    assert_eq!(payload["index"], json!(2));
    assert_eq!(payload["slides"].as_array().map(Vec::len), Some(5));
    assert_eq!(
        payload["slides"][4],
        json!({"index": 4, "title": "Slide 5", "notes": "notes 5"})
    );
}

#[test]
fn nothing_is_sent_while_closed() {
    let deck = five_slides();
    let mut presenter = channel();
    presenter.send_state(&deck);
    presenter.send_update(&deck, 1);
    assert!(!presenter.is_open());
}

#[test]
fn nav_message_is_idempotent() {
    let mut deck = five_slides();
    deck.take_events();
    let mut presenter = channel();
    presenter.handle_message(r#"{"type":"nav","index":2}"#, &mut deck);
    presenter.handle_message(r#"{"type":"nav","index":2}"#, &mut deck);
    assert_eq!(deck.current(), 2);
    assert_eq!(
        deck.take_events(),
        Some(vec![DeckEvent::SlideChanged { index: 2 }])
    );
}

#[test]
fn control_messages_drive_the_deck() {
    let mut deck = five_slides();
    let mut presenter = channel();
    presenter.handle_message(r#"{"type":"control","action":"next"}"#, &mut deck);
    presenter.handle_message(r#"{"type":"control","action":"next"}"#, &mut deck);
    presenter.handle_message(r#"{"type":"control","action":"prev"}"#, &mut deck);
    assert_eq!(deck.current(), 1);
}

#[test]
fn close_control_without_surface_is_harmless() {
    let mut deck = five_slides();
    let mut presenter = channel();
    presenter.handle_message(r#"{"type":"control","action":"close"}"#, &mut deck);
    assert!(!presenter.is_open());
}

#[test]
fn close_control_closes_window_and_overlay() {
    let mut deck = five_slides();
    for mut host in [FakeHost::allowing(), FakeHost::blocking()] {
        let mut presenter = channel();
        presenter.toggle(&mut host, &deck, Instant::now());
        assert!(presenter.is_open());
        presenter.handle_message(r#"{"type":"control","action":"close"}"#, &mut deck);
        assert!(!presenter.is_open());
    }
}

#[test]
fn malformed_messages_are_ignored() {
    let mut deck = five_slides();
    let mut presenter = channel();
    for message in ["", "{}", r#"{"type":"nav"}"#, r#"{"type":"control"}"#, "[1,2]"] {
        presenter.handle_message(message, &mut deck);
    }
    assert_eq!(deck.current(), 0);
}

#[test]
fn window_commands_are_applied_on_poll() {
    let mut deck = five_slides();
    let mut host = FakeHost::allowing();
    let mut presenter = channel();
    let now = Instant::now();
    presenter.toggle(&mut host, &deck, now);

    host.window().navigate(3);
    presenter.poll(&mut deck, now);
    assert_eq!(deck.current(), 3);

    host.window().control(ControlAction::Prev);
    presenter.poll(&mut deck, now);
    assert_eq!(deck.current(), 2);
}

#[test]
fn native_window_close_releases_the_surface() {
    let mut deck = five_slides();
    let mut host = FakeHost::allowing();
    let mut presenter = channel();
    let now = Instant::now();
    presenter.toggle(&mut host, &deck, now);
    host.window().close();
    presenter.poll(&mut deck, now);
    assert!(!presenter.is_open());

    presenter.toggle(&mut host, &deck, now);
    assert!(presenter.has_window());
    assert_eq!(host.attempts, 2);
}

#[test]
fn slide_change_pushes_update() {
    let mut deck = five_slides();
    let mut host = FakeHost::allowing();
    let mut presenter = channel();
    let now = Instant::now();
    presenter.toggle(&mut host, &deck, now);
    presenter.poll(&mut deck, now);
    host.window().receive();

    deck.next();
    presenter.poll(&mut deck, now);
    assert_eq!(host.window().receive(), 1);
    assert_eq!(host.window().index, 1);
}

#[test]
fn overlay_follows_deck_and_its_controls() {
    let mut deck = five_slides();
    let mut host = FakeHost::blocking();
    let mut presenter = channel();
    let now = Instant::now();
    presenter.toggle(&mut host, &deck, now);

    presenter.overlay_action(OverlayAction::Next, &mut deck);
    presenter.poll(&mut deck, now);
    let overlay = presenter.overlay().unwrap();
    assert_eq!(overlay.current.title, "Slide 2");
    assert_eq!(overlay.next.title, "Slide 3");

    presenter.overlay_action(OverlayAction::Close, &mut deck);
    assert!(!presenter.is_open());
}

/// Deck without an event API or an index API.
struct MarkerDeck {
    slides: Vec<SlideMarkup>,
}

impl MarkerDeck {
    fn new(n: usize) -> Self {
        let mut slides: Vec<SlideMarkup> = (0..n)
            .map(|i| SlideMarkup::new(&format!("# M{i}")))
            .collect();
        slides[0].present = true;
        Self { slides }
    }

    fn set_present(&mut self, index: usize) {
        for (i, slide) in self.slides.iter_mut().enumerate() {
            slide.present = i == index;
        }
    }
}

impl Deck for MarkerDeck {
    fn slides(&self) -> &[SlideMarkup] {
        &self.slides
    }
    fn go_to(&mut self, index: usize) {
        self.set_present(index);
    }
    fn next(&mut self) {}
    fn prev(&mut self) {}
}

#[test]
fn present_marker_is_observed_without_deck_events() {
    let mut deck = MarkerDeck::new(4);
    let mut host = FakeHost::allowing();
    let mut presenter = channel();
    let now = Instant::now();
    presenter.toggle(&mut host, &deck, now);

    presenter.poll(&mut deck, now);
    assert_eq!(host.window().receive(), 1);

    presenter.poll(&mut deck, now);
    assert_eq!(host.window().receive(), 0);

    deck.set_present(3);
    presenter.poll(&mut deck, now);
    assert_eq!(host.window().receive(), 1);
    assert_eq!(host.window().index, 3);
    assert_eq!(host.window().current().map(|s| s.title.as_str()), Some("M3"));
}
