use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::details::MilestoneDetail;

/// The `roadmap:` block of a deck's frontmatter.
///
/// ```yaml
/// roadmap:
///   image: assets/roadmap.png
///   view_box: [0, 0, 1000, 400]
///   path: [[40, 320], [500, 200], [960, 80]]
///   milestones:
///     - id: foundations
///       x: 12
///       y: 70
///     - id: future
///       label: What comes next
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoadmapDescriptor {
    #[serde(default)]
    pub milestones: Vec<MilestoneDescriptor>,
    /// Reference path in view-box units.
    #[serde(default)]
    pub path: Vec<[f32; 2]>,
    #[serde(default)]
    pub view_box: Option<[f32; 4]>,
    /// Reference image drawn behind the milestones.
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Extra or overriding detail entries, keyed by milestone id.
    #[serde(default)]
    pub details: BTreeMap<String, MilestoneDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneDescriptor {
    pub id: String,
    /// Percent of the reference image (or stage) width.
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub preview: Option<PathBuf>,
    /// Control id; defaults to `milestone-{n}`.
    #[serde(default)]
    pub element_id: Option<String>,
}
