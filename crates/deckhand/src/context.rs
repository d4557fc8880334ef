use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::deck::{Deck, DeckError, MarkdownDeck, Widget};
use crate::papers::{PapersController, PapersKey};
use crate::presenter::PresenterChannel;
use crate::presenter::surface::SurfaceHost;
use crate::roadmap::{Jump, RoadmapController, RoadmapKey};

/// Keys the deck reacts to, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    TogglePresenter,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    PageUp,
    PageDown,
    Digit(u8),
}

/// Everything a running presentation owns, built once at startup and passed
/// explicitly to whoever needs it.
#[derive(Debug)]
pub struct DeckContext {
    pub deck: MarkdownDeck,
    pub presenter: PresenterChannel,
    pub roadmap: Option<RoadmapController>,
    pub papers: Option<PapersController>,
    fragment: Option<String>,
    base_dir: PathBuf,
    reduced_motion: bool,
    last_poll: Option<Instant>,
}

impl DeckContext {
    pub fn new(
        deck: MarkdownDeck,
        base_dir: &Path,
        presenter: PresenterChannel,
        fragment: Option<String>,
        reduced_motion: bool,
    ) -> Self {
        let mut context = Self {
            deck,
            presenter,
            roadmap: None,
            papers: None,
            fragment,
            base_dir: base_dir.to_path_buf(),
            reduced_motion,
            last_poll: None,
        };
        context.bind_widgets();
        let milestone = context
            .fragment
            .as_deref()
            .and_then(|f| f.strip_prefix('#'))
            .map(str::to_string);
        if let Some(id) = milestone {
            context.jump_to_milestone(&id);
        }
        context
    }

    /// Build the widget controllers the deck's frontmatter declares.
    pub fn bind_widgets(&mut self) {
        self.roadmap = self.deck.meta.roadmap.as_ref().and_then(|descriptor| {
            RoadmapController::initialize(descriptor, &self.base_dir, self.reduced_motion)
        });
        self.papers = PapersController::new(
            &self.deck.meta.papers,
            &self.base_dir,
            self.fragment.as_deref(),
        );
        tracing::debug!(
            "widgets bound: roadmap={} papers={}",
            self.roadmap.is_some(),
            self.papers.is_some()
        );
    }

    /// Replace the deck from new file contents and rebind the widgets.
    pub fn reload(&mut self, content: &str) -> Result<(), DeckError> {
        self.deck.reload(content)?;
        self.bind_widgets();
        Ok(())
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn set_fragment(&mut self, fragment: String) {
        tracing::debug!("location fragment: {fragment}");
        self.fragment = Some(fragment);
    }

    /// Pick up a fragment the papers controller wrote.
    pub fn sync_fragment(&mut self) {
        let written = self
            .papers
            .as_ref()
            .and_then(|p| p.fragment())
            .map(str::to_string);
        if let Some(fragment) = written {
            if self.fragment.as_deref() != Some(fragment.as_str()) {
                self.set_fragment(fragment);
            }
        }
    }

    /// Widget embedded in the current slide, if its controller exists.
    pub fn active_widget(&self) -> Option<Widget> {
        match self.deck.current_slide()?.widget? {
            Widget::Roadmap if self.roadmap.is_some() => Some(Widget::Roadmap),
            Widget::Papers if self.papers.is_some() => Some(Widget::Papers),
            _ => None,
        }
    }

    /// Select a roadmap milestone by id, falling back to the `#id` fragment.
    pub fn jump_to_milestone(&mut self, id: &str) {
        let jump = match self.roadmap.as_mut() {
            Some(roadmap) => roadmap.jump_to(id),
            None => Jump::Fragment(format!("#{id}")),
        };
        if let Jump::Fragment(fragment) = jump {
            self.set_fragment(fragment);
        }
    }

    pub fn handle_key(&mut self, key: InputKey, host: &mut dyn SurfaceHost, now: Instant) {
        if key == InputKey::TogglePresenter {
            self.presenter.toggle(host, &self.deck, now);
            return;
        }
        if self.widget_key(key, now) {
            return;
        }
        match key {
            InputKey::Right | InputKey::Space | InputKey::PageDown => self.deck.next(),
            InputKey::Left | InputKey::PageUp => self.deck.prev(),
            InputKey::Escape => self.presenter.exit_overlay(),
            _ => {}
        }
    }

    /// Offer a key to the widget on the current slide. Returns whether it
    /// was consumed.
    fn widget_key(&mut self, key: InputKey, now: Instant) -> bool {
        match self.active_widget() {
            Some(Widget::Roadmap) => {
                let Some(roadmap) = self.roadmap.as_mut() else {
                    return false;
                };
                let mapped = match key {
                    InputKey::Left => RoadmapKey::Left,
                    InputKey::Right => RoadmapKey::Right,
                    InputKey::Enter | InputKey::Space => RoadmapKey::Activate,
                    InputKey::Escape => RoadmapKey::Escape,
                    _ => return false,
                };
                roadmap.handle_key(mapped, now)
            }
            Some(Widget::Papers) => {
                let Some(papers) = self.papers.as_mut() else {
                    return false;
                };
                let mapped = match key {
                    InputKey::Left => PapersKey::Left,
                    InputKey::Right => PapersKey::Right,
                    InputKey::Digit(n) => PapersKey::Digit(n),
                    _ => return false,
                };
                let handled = papers.handle_key(mapped);
                self.sync_fragment();
                handled
            }
            None => false,
        }
    }

    /// Per-frame bookkeeping. Returns true while something needs another
    /// frame soon.
    pub fn poll(&mut self, now: Instant) -> bool {
        let dt = self
            .last_poll
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_poll = Some(now);
        self.presenter.poll(&mut self.deck, now);

        // The roadmap view steps its own reveal while on screen. Off screen
        // the path has to wind back so the next visit replays it.
        let mut rewinding = false;
        if self.active_widget() != Some(Widget::Roadmap) {
            if let Some(roadmap) = self.roadmap.as_mut() {
                roadmap.observe_visibility(0.0);
                rewinding = roadmap.tick(dt);
            }
        }
        let loading = self.papers.as_mut().is_some_and(|p| p.poll());
        loading || rewinding || self.presenter.has_window()
    }
}
