pub mod extract;
pub mod frontmatter;
pub mod splitter;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::papers::PaperDescriptor;
use crate::roadmap::descriptor::RoadmapDescriptor;

pub use extract::{SlideSummary, slide_summaries};

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),
}

/// Deck-level metadata from the YAML frontmatter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub roadmap: Option<RoadmapDescriptor>,
    #[serde(default)]
    pub papers: Vec<PaperDescriptor>,
}

/// Interactive widget a slide embeds via `@widget: <name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Roadmap,
    Papers,
}

impl Widget {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "roadmap" => Some(Self::Roadmap),
            "papers" => Some(Self::Papers),
            _ => None,
        }
    }
}

/// One slide as the deck holds it: source markup plus the present marker.
#[derive(Debug, Clone)]
pub struct SlideMarkup {
    pub source: String,
    pub widget: Option<Widget>,
    pub present: bool,
}

impl SlideMarkup {
    pub fn new(raw: &str) -> Self {
        let mut widget = None;
        let mut kept = Vec::new();
        for line in raw.lines() {
            match line.trim().strip_prefix("@widget:") {
                Some(name) => widget = widget.or(Widget::from_name(name.trim())),
                None => kept.push(line),
            }
        }
        Self {
            source: kept.join("\n").trim().to_string(),
            widget,
            present: false,
        }
    }

    /// Slide content without speaker notes.
    pub fn body(&self) -> String {
        extract::split_notes(&self.source).0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckEvent {
    Ready,
    SlideChanged { index: usize },
}

/// Capability interface over a slide-deck implementation.
///
/// `current_index` and `take_events` are optional capabilities: a deck that
/// returns `None` forces callers onto the present-marker fallbacks.
pub trait Deck {
    fn slides(&self) -> &[SlideMarkup];

    fn current_index(&self) -> Option<usize> {
        None
    }

    fn go_to(&mut self, index: usize);

    fn next(&mut self);

    fn prev(&mut self);

    /// Drain pending events. `None` means the deck does not publish events.
    fn take_events(&mut self) -> Option<Vec<DeckEvent>> {
        None
    }
}

/// Current slide index: the deck's own API first, then the slide carrying the
/// present marker, then 0.
pub fn resolve_current_index(deck: &dyn Deck) -> usize {
    if let Some(index) = deck.current_index() {
        return index;
    }
    deck.slides().iter().position(|s| s.present).unwrap_or(0)
}

/// A deck parsed from a markdown file.
#[derive(Debug, Clone)]
pub struct MarkdownDeck {
    pub meta: DeckMeta,
    slides: Vec<SlideMarkup>,
    current: usize,
    events: Vec<DeckEvent>,
}

impl MarkdownDeck {
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeckError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, DeckError> {
        let (meta, slides) = parse_parts(content)?;
        let mut deck = Self {
            meta,
            slides,
            current: 0,
            events: vec![DeckEvent::Ready],
        };
        deck.mark_present();
        Ok(deck)
    }

    /// Replace the deck contents, keeping the current slide where possible.
    pub fn reload(&mut self, content: &str) -> Result<(), DeckError> {
        let (meta, slides) = parse_parts(content)?;
        self.meta = meta;
        self.slides = slides;
        self.current = self.current.min(self.slides.len().saturating_sub(1));
        self.mark_present();
        self.events.push(DeckEvent::Ready);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&SlideMarkup> {
        self.slides.get(self.current)
    }

    fn mark_present(&mut self) {
        for (i, slide) in self.slides.iter_mut().enumerate() {
            slide.present = i == self.current;
        }
    }
}

fn parse_parts(content: &str) -> Result<(DeckMeta, Vec<SlideMarkup>), DeckError> {
    let (meta, body) = frontmatter::extract(content)?;
    let slides = splitter::split(&body)
        .iter()
        .map(|raw| SlideMarkup::new(raw))
        .collect();
    Ok((meta, slides))
}

impl Deck for MarkdownDeck {
    fn slides(&self) -> &[SlideMarkup] {
        &self.slides
    }

    fn current_index(&self) -> Option<usize> {
        Some(self.current)
    }

    fn go_to(&mut self, index: usize) {
        if self.slides.is_empty() {
            return;
        }
        let index = index.min(self.slides.len() - 1);
        if index == self.current {
            return;
        }
        self.current = index;
        self.mark_present();
        self.events.push(DeckEvent::SlideChanged { index });
    }

    fn next(&mut self) {
        self.go_to(self.current + 1);
    }

    fn prev(&mut self) {
        self.go_to(self.current.saturating_sub(1));
    }

    fn take_events(&mut self) -> Option<Vec<DeckEvent>> {
        Some(std::mem::take(&mut self.events))
    }
}
