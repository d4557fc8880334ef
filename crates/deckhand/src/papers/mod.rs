pub mod content;
pub mod view;

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use content::{BuiltinPlotter, ChartLoader, ChartMode, DemoChart, PdfViewer};

/// One entry of the `papers:` frontmatter list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperDescriptor {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub pdf: Option<PathBuf>,
    #[serde(default)]
    pub chart: Option<ChartDescriptor>,
    #[serde(default)]
    pub sections: Vec<SectionDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartDescriptor {
    #[serde(default)]
    pub demo: bool,
    #[serde(default)]
    pub mode: ChartMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionDescriptor {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
    pub hidden: bool,
}

/// Where keyboard focus goes after a section toggle: into the revealed
/// body, or back to the toggle of a hidden one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionFocus {
    Body(usize),
    Toggle(usize),
}

/// Selection attributes of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub selected: bool,
    /// 0 for the focusable (active) tab, -1 for the rest.
    pub tab_index: i8,
}

#[derive(Debug)]
pub struct PaperPage {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub sections: Vec<Section>,
    pdf: Option<PathBuf>,
    demo_chart: Option<ChartMode>,
    pub viewer: Option<PdfViewer>,
    pub chart: Option<DemoChart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PapersKey {
    Left,
    Right,
    /// Number key 1-9.
    Digit(u8),
}

static PAPERS_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"papers=([^&]+)").expect("fragment pattern is valid"));

/// Page id named by a `papers=<id>` fragment.
pub fn fragment_page(fragment: &str) -> Option<&str> {
    PAPERS_FRAGMENT
        .captures(fragment)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Tabbed paper pages with lazily created viewers and charts.
pub struct PapersController {
    pages: Vec<PaperPage>,
    tabs: Vec<Tab>,
    current: usize,
    fragment: Option<String>,
    announcement: Option<String>,
    section_focus: Option<SectionFocus>,
    chart_loader: Arc<dyn ChartLoader>,
}

impl std::fmt::Debug for PapersController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PapersController")
            .field("pages", &self.pages)
            .field("current", &self.current)
            .field("fragment", &self.fragment)
            .field("announcement", &self.announcement)
            .finish_non_exhaustive()
    }
}

impl PapersController {
    /// Bind the declared pages and select the initial one. `None` when no
    /// pages are declared.
    pub fn new(
        descriptors: &[PaperDescriptor],
        base_dir: &Path,
        fragment: Option<&str>,
    ) -> Option<Self> {
        Self::with_chart_loader(descriptors, base_dir, fragment, Arc::new(BuiltinPlotter))
    }

    pub fn with_chart_loader(
        descriptors: &[PaperDescriptor],
        base_dir: &Path,
        fragment: Option<&str>,
        chart_loader: Arc<dyn ChartLoader>,
    ) -> Option<Self> {
        if descriptors.is_empty() {
            return None;
        }
        let pages = descriptors
            .iter()
            .map(|d| PaperPage {
                id: d.id.clone(),
                title: d.title.clone(),
                active: false,
                sections: d
                    .sections
                    .iter()
                    .map(|s| Section {
                        title: s.title.clone(),
                        body: s.body.clone(),
                        hidden: s.collapsed,
                    })
                    .collect(),
                pdf: d.pdf.as_ref().map(|p| base_dir.join(p)),
                demo_chart: d.chart.as_ref().filter(|c| c.demo).map(|c| c.mode),
                viewer: None,
                chart: None,
            })
            .collect::<Vec<_>>();
        let tabs = vec![
            Tab {
                selected: false,
                tab_index: -1,
            };
            pages.len()
        ];

        let mut controller = Self {
            pages,
            tabs,
            current: 0,
            fragment: fragment.map(str::to_string),
            announcement: None,
            section_focus: None,
            chart_loader,
        };
        let initial = fragment
            .and_then(fragment_page)
            .and_then(|id| controller.pages.iter().position(|p| p.id == id))
            .unwrap_or(0);
        controller.show(initial as isize, false);
        Some(controller)
    }

    pub fn pages(&self) -> &[PaperPage] {
        &self.pages
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn active_page(&self) -> &PaperPage {
        &self.pages[self.current]
    }

    /// Live status line for the current page, e.g. "Method revealed.".
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    /// Focus move requested by the last section toggle. Taken once.
    pub fn take_section_focus(&mut self) -> Option<SectionFocus> {
        self.section_focus.take()
    }

    /// Location fragment as last written.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Activate the page at `index`, clamped into range.
    pub fn show(&mut self, index: isize, update_fragment: bool) {
        let last = self.pages.len() as isize - 1;
        let index = index.clamp(0, last) as usize;

        for (i, (page, tab)) in self.pages.iter_mut().zip(&mut self.tabs).enumerate() {
            let active = i == index;
            page.active = active;
            tab.selected = active;
            tab.tab_index = if active { 0 } else { -1 };
        }
        if self.current != index {
            self.announcement = None;
            self.section_focus = None;
        }
        self.current = index;

        let loader = &self.chart_loader;
        let page = &mut self.pages[index];
        if page.viewer.is_none() {
            if let Some(pdf) = &page.pdf {
                tracing::debug!("creating viewer for {}", pdf.display());
                page.viewer = Some(PdfViewer::open(pdf));
            }
        }
        if page.chart.is_none() {
            if let Some(mode) = page.demo_chart {
                page.chart = Some(DemoChart::start(Arc::clone(loader), mode));
            }
        }

        if update_fragment {
            let target = if page.id.is_empty() {
                index.to_string()
            } else {
                page.id.clone()
            };
            self.fragment = Some(format!("papers={target}"));
        }
    }

    pub fn handle_key(&mut self, key: PapersKey) -> bool {
        let current = self.current as isize;
        match key {
            PapersKey::Right => self.show(current + 1, true),
            PapersKey::Left => self.show(current - 1, true),
            PapersKey::Digit(n @ 1..=9) => {
                let index = usize::from(n - 1);
                if index >= self.tabs.len() {
                    return false;
                }
                self.show(index as isize, true);
            }
            PapersKey::Digit(_) => return false,
        }
        true
    }

    /// Flip a collapsible section of a page between hidden and visible.
    /// Revealing moves focus into the body; hiding returns it to the toggle.
    pub fn toggle_section(&mut self, page: usize, section: usize) {
        let Some(s) = self
            .pages
            .get_mut(page)
            .and_then(|p| p.sections.get_mut(section))
        else {
            return;
        };
        s.hidden = !s.hidden;
        let (state, focus) = if s.hidden {
            ("hidden", SectionFocus::Toggle(section))
        } else {
            ("revealed", SectionFocus::Body(section))
        };
        tracing::debug!("section {:?} {state}", s.title);
        self.announcement = Some(format!("{} {state}.", s.title));
        self.section_focus = Some(focus);
    }

    /// Collect finished background loads. Returns true while any loader is still running.
    pub fn poll(&mut self) -> bool {
        let mut pending = false;
        for page in &mut self.pages {
            if let Some(viewer) = &mut page.viewer {
                viewer.text.poll();
                pending |= viewer.text.is_waiting();
            }
            if let Some(chart) = &mut page.chart {
                chart.data.poll();
                pending |= chart.data.is_waiting();
            }
        }
        pending
    }
}
