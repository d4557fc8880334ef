pub mod descriptor;
pub mod details;
pub mod geometry;
pub mod reveal;
pub mod view;
pub mod zoom;


use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use descriptor::RoadmapDescriptor;
use details::{DetailTable, MilestoneDetail};
use geometry::{Connector, GeometryError, ReferencePath, ViewBox};
use reveal::Reveal;
use zoom::Zoom;

pub const CONTROL_SIZE: f32 = 44.0;
pub const POPOVER_OFFSET: f32 = 8.0;
pub const POPOVER_SIZE: Vec2 = vec2(280.0, 230.0);
pub const CONNECTOR_TIP_RADIUS: f32 = 5.0;
pub const STATUS_CLEAR_AFTER: Duration = Duration::from_millis(2200);

/// Where the roadmap is drawn this frame, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub stage: Rect,
    /// Displayed rect of the reference image, if there is one.
    pub image: Option<Rect>,
}

impl Layout {
    pub fn new(stage: Rect) -> Self {
        Self { stage, image: None }
    }

    /// Area the reference path's view box is stretched over.
    pub fn path_area(&self) -> Rect {
        self.image.unwrap_or(self.stage)
    }
}

#[derive(Debug, Clone)]
pub struct Milestone {
    pub id: String,
    pub control_id: String,
    pub label: String,
    pub detail: MilestoneDetail,
    pub preview: PathBuf,
    x: Option<f32>,
    y: Option<f32>,
    /// Center relative to the stage, once positioned.
    pub center: Option<Pos2>,
}

impl Milestone {
    pub fn control_rect(&self) -> Option<Rect> {
        self.center
            .map(|c| Rect::from_center_size(c, Vec2::splat(CONTROL_SIZE)))
    }
}

#[derive(Debug, Clone)]
pub enum Preview {
    Loaded(PreviewImage),
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub path: PathBuf,
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

impl Preview {
    fn load(path: &Path) -> Self {
        match image::open(path) {
            Ok(img) => {
                let img = img.into_rgba8();
                let (w, h) = img.dimensions();
                Self::Loaded(PreviewImage {
                    path: path.to_path_buf(),
                    size: [w as usize, h as usize],
                    rgba: img.into_raw(),
                })
            }
            Err(e) => {
                tracing::debug!("preview {} unavailable: {e}", path.display());
                Self::Unavailable
            }
        }
    }
}

/// The single open milestone popover.
#[derive(Debug, Clone)]
pub struct Popover {
    pub milestone: usize,
    pub id: String,
    pub labelled_by: String,
    pub title: String,
    /// Top-left corner relative to the stage.
    pub anchor: Pos2,
    pub preview: Preview,
    /// Target of the "Go to section" link.
    pub section_link: String,
}

impl Popover {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.anchor, POPOVER_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Elsewhere,
    Milestone(usize),
    /// First control inside the open popover.
    Popover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadmapKey {
    Left,
    Right,
    Activate,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jump {
    Selected(usize),
    /// No such milestone; navigate to this location fragment instead.
    Fragment(String),
}

/// Interactive roadmap: milestone controls, connectors, one popover at a
/// time and the path reveal.
#[derive(Debug)]
pub struct RoadmapController {
    milestones: Vec<Milestone>,
    image: Option<PathBuf>,
    path: Option<ReferencePath>,
    view_box: ViewBox,
    active: usize,
    popover: Option<Popover>,
    focus: Focus,
    last_focused: Option<Focus>,
    reveal: Reveal,
    zoom: Zoom,
    layout: Option<Layout>,
    connectors: Vec<Connector>,
    label_width: Option<f32>,
    status: Option<(String, Instant)>,
}

impl RoadmapController {
    /// Bind the declared milestones. `None` when there are none.
    pub fn initialize(
        descriptor: &RoadmapDescriptor,
        base_dir: &Path,
        reduced_motion: bool,
    ) -> Option<Self> {
        if descriptor.milestones.is_empty() {
            return None;
        }
        let table = DetailTable::with_overrides(&descriptor.details);
        let milestones = descriptor
            .milestones
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let n = i + 1;
                let label = m
                    .label
                    .clone()
                    .filter(|l| !l.trim().is_empty())
                    .or_else(|| table.get(&m.id).map(|d| d.title.clone()))
                    .unwrap_or_else(|| format!("Milestone {n}"));
                let preview = m
                    .preview
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(format!("previews/section-{n}.png")));
                Milestone {
                    id: m.id.clone(),
                    control_id: m
                        .element_id
                        .clone()
                        .unwrap_or_else(|| format!("milestone-{n}")),
                    label,
                    detail: table.lookup(&m.id),
                    preview: base_dir.join(preview),
                    x: m.x,
                    y: m.y,
                    center: None,
                }
            })
            .collect::<Vec<_>>();
        tracing::debug!("roadmap bound {} milestones", milestones.len());

        Some(Self {
            milestones,
            image: descriptor.image.as_ref().map(|p| base_dir.join(p)),
            path: (!descriptor.path.is_empty())
                .then(|| ReferencePath::new(descriptor.path.iter().copied())),
            view_box: descriptor
                .view_box
                .map(ViewBox::from_array)
                .unwrap_or_default(),
            active: 0,
            popover: None,
            focus: Focus::Elsewhere,
            last_focused: None,
            reveal: Reveal::new(reduced_motion),
            zoom: Zoom::new(reduced_motion),
            layout: None,
            connectors: Vec::new(),
            label_width: None,
            status: None,
        })
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn path(&self) -> Option<&ReferencePath> {
        self.path.as_ref()
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.popover.as_ref()
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Width cap for milestone labels, when a reference image sets one.
    pub fn label_width(&self) -> Option<f32> {
        self.label_width
    }

    pub fn reveal(&self) -> &Reveal {
        &self.reveal
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    /// Percent coordinates the stage camera centers on: the focused
    /// milestone, else the active one. `None` when it has no coordinates.
    pub fn zoom_focus(&self) -> Option<Pos2> {
        let index = match self.focus {
            Focus::Milestone(i) => i,
            Focus::Popover | Focus::Elsewhere => self.active,
        };
        let milestone = self.milestones.get(index)?;
        let (x, y) = (milestone.x?, milestone.y?);
        (x.is_finite() && y.is_finite()).then_some(pos2(x, y))
    }

    /// Detail of the active milestone, for the details panel.
    pub fn details(&self) -> &MilestoneDetail {
        &self.milestones[self.active].detail
    }

    /// Live-status announcement, cleared a little while after it was made.
    pub fn status_text(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < STATUS_CLEAR_AFTER)
            .map(|(text, _)| text.as_str())
    }

    /// Place every milestone for `layout`. Returns whether anything moved.
    ///
    /// A milestone whose position cannot be computed is skipped and keeps its
    /// previous position.
    pub fn position_all(&mut self, layout: Layout) -> bool {
        let mut moved = false;
        for i in 0..self.milestones.len() {
            match self.locate(i, &layout) {
                Ok(center) => {
                    if self.milestones[i].center != Some(center) {
                        self.milestones[i].center = Some(center);
                        moved = true;
                    }
                }
                Err(e) => tracing::debug!("skipping milestone {}: {e}", self.milestones[i].id),
            }
        }
        self.label_width = layout.image.map(|img| geometry::label_max_width(img.width()));

        let resized = self.layout.map(|l| l.stage.size()) != Some(layout.stage.size());
        self.layout = Some(layout);
        if moved || resized {
            self.draw_connectors();
        }
        moved
    }

    fn locate(&self, i: usize, layout: &Layout) -> Result<Pos2, GeometryError> {
        let milestone = &self.milestones[i];
        if let (Some(x), Some(y)) = (milestone.x, milestone.y) {
            return geometry::percent_to_stage(x, y, layout.image, layout.stage);
        }
        self.on_path(i, layout)
    }

    /// Stage-relative point at milestone `i`'s share of the reference path.
    fn on_path(&self, i: usize, layout: &Layout) -> Result<Pos2, GeometryError> {
        let path = self.path.as_ref().ok_or(GeometryError::NoPath)?;
        let t = geometry::path_fraction(i, self.milestones.len());
        let point = path.point_at_fraction(t)?;
        let screen = self.view_box.to_screen(point, layout.path_area())?;
        Ok((screen - layout.stage.min.to_vec2()).round())
    }

    /// Recompute connector lines for the positioned milestones.
    pub fn draw_connectors(&mut self) {
        let Some(layout) = self.layout else {
            return;
        };
        self.connectors = self
            .milestones
            .iter()
            .filter_map(|m| {
                let center = m.center?;
                geometry::connector(layout.stage, center)
                    .inspect_err(|e| tracing::debug!("no connector for {}: {e}", m.id))
                    .ok()
            })
            .collect();
    }

    /// Highlight dot position, stage-relative, along the reference path.
    pub fn highlight(&self) -> Option<Pos2> {
        let layout = self.layout?;
        self.on_path(self.active, &layout).ok()
    }

    pub fn set_active(&mut self, index: usize) {
        self.active = index.min(self.milestones.len() - 1);
    }

    /// Open the popover for milestone `index`, closing any other first.
    pub fn open_milestone(&mut self, index: usize, now: Instant) {
        self.close_popover();
        self.set_active(index);
        let i = self.active;
        let milestone = &self.milestones[i];

        let anchor = match milestone.control_rect() {
            Some(rect) => pos2(rect.left(), rect.bottom() + POPOVER_OFFSET),
            None => pos2(0.0, POPOVER_OFFSET),
        };
        let popover = Popover {
            milestone: i,
            id: format!("milestone-popover-{}", i + 1),
            labelled_by: milestone.control_id.clone(),
            title: milestone.label.clone(),
            anchor,
            preview: Preview::load(&milestone.preview),
            section_link: format!("#section-{}", i + 1),
        };
        tracing::debug!("opened {} for {}", popover.id, milestone.id);

        self.status = Some((format!("Preview: {}", popover.title), now));
        self.popover = Some(popover);
        self.last_focused = Some(self.focus);
        self.focus = Focus::Popover;
    }

    /// Close the open popover and restore focus. No-op when none is open.
    pub fn close_popover(&mut self) {
        if self.popover.take().is_none() {
            return;
        }
        self.focus = self.last_focused.take().unwrap_or(Focus::Elsewhere);
    }

    pub fn handle_key(&mut self, key: RoadmapKey, now: Instant) -> bool {
        match key {
            RoadmapKey::Right => {
                self.set_active(self.active + 1);
                self.focus = Focus::Milestone(self.active);
            }
            RoadmapKey::Left => {
                self.set_active(self.active.saturating_sub(1));
                self.focus = Focus::Milestone(self.active);
            }
            RoadmapKey::Activate => self.open_milestone(self.active, now),
            RoadmapKey::Escape => {
                if self.popover.is_none() {
                    return false;
                }
                self.close_popover();
            }
        }
        true
    }

    /// Handle a click at a stage-relative position. Returns whether the
    /// roadmap acted on it.
    pub fn handle_click(&mut self, pos: Pos2, now: Instant) -> bool {
        let hit = self
            .milestones
            .iter()
            .position(|m| m.control_rect().is_some_and(|r| r.contains(pos)));
        if let Some(i) = hit {
            self.close_popover();
            self.focus = Focus::Milestone(i);
            self.open_milestone(i, now);
            return true;
        }
        if self.popover.as_ref().is_some_and(|p| !p.rect().contains(pos)) {
            self.close_popover();
            return true;
        }
        false
    }

    /// Select a milestone by id.
    pub fn jump_to(&mut self, id: &str) -> Jump {
        match self.milestones.iter().position(|m| m.id == id) {
            Some(i) => {
                self.set_active(i);
                self.focus = Focus::Milestone(i);
                Jump::Selected(i)
            }
            None => Jump::Fragment(format!("#{id}")),
        }
    }

    /// Record how much of the roadmap is on screen (0..=1).
    pub fn observe_visibility(&mut self, visible_fraction: f32) {
        self.reveal.observe(visible_fraction);
        self.zoom.observe(visible_fraction);
    }

    /// Advance animations. Returns true while a repaint is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let revealing = self.reveal.advance(dt);
        let zooming = self.zoom.advance(dt);
        revealing || zooming
    }
}
