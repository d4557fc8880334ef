use eframe::egui::{Pos2, Rect, pos2};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{what} is not a finite number")]
    NonFinite { what: &'static str },
    #[error("reference path needs at least two distinct points")]
    DegeneratePath,
    #[error("view box has zero area")]
    EmptyViewBox,
    #[error("no reference path to place milestone on")]
    NoPath,
}

/// Polyline the milestones sit on, in view-box units.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePath {
    points: Vec<Pos2>,
}

impl ReferencePath {
    pub fn new(points: impl IntoIterator<Item = [f32; 2]>) -> Self {
        Self {
            points: points.into_iter().map(|[x, y]| pos2(x, y)).collect(),
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn total_length(&self) -> Result<f32, GeometryError> {
        if self.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFinite { what: "path point" });
        }
        let length: f32 = self
            .points
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum();
        if self.points.len() < 2 || length <= 0.0 {
            return Err(GeometryError::DegeneratePath);
        }
        Ok(length)
    }

    /// Point at `distance` along the path, clamped to its ends.
    pub fn point_at_length(&self, distance: f32) -> Result<Pos2, GeometryError> {
        let total = self.total_length()?;
        if !distance.is_finite() {
            return Err(GeometryError::NonFinite { what: "path distance" });
        }
        let mut remaining = distance.clamp(0.0, total);
        for w in self.points.windows(2) {
            let segment = w[0].distance(w[1]);
            if remaining <= segment && segment > 0.0 {
                return Ok(w[0].lerp(w[1], remaining / segment));
            }
            remaining -= segment;
        }
        Ok(self.points[self.points.len() - 1])
    }

    /// Point at fraction `t` (0..=1) of the total length.
    pub fn point_at_fraction(&self, t: f32) -> Result<Pos2, GeometryError> {
        let total = self.total_length()?;
        self.point_at_length(t * total)
    }

    /// Leading part of the path covering `fraction` of its length.
    pub fn prefix(&self, fraction: f32) -> Result<Vec<Pos2>, GeometryError> {
        let total = self.total_length()?;
        let mut remaining = fraction.clamp(0.0, 1.0) * total;
        let mut out = vec![self.points[0]];
        for w in self.points.windows(2) {
            let segment = w[0].distance(w[1]);
            if remaining >= segment {
                out.push(w[1]);
                remaining -= segment;
            } else {
                if segment > 0.0 {
                    out.push(w[0].lerp(w[1], remaining / segment));
                }
                break;
            }
        }
        Ok(out)
    }
}

/// Coordinate system of the reference path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        }
    }
}

impl ViewBox {
    pub fn from_array([x, y, width, height]: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a view-box point onto `target` (screen coordinates).
    pub fn to_screen(&self, point: Pos2, target: Rect) -> Result<Pos2, GeometryError> {
        if self.width == 0.0 || self.height == 0.0 {
            return Err(GeometryError::EmptyViewBox);
        }
        let x = target.left() + (point.x - self.x) * (target.width() / self.width);
        let y = target.top() + (point.y - self.y) * (target.height() / self.height);
        finite(pos2(x, y), "mapped point")
    }
}

/// Path parameter for milestone `i` of `n`: evenly spread, a lone one centered.
pub fn path_fraction(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.5
    } else {
        i as f32 / (n - 1) as f32
    }
}

/// Stage-relative pixel position of a percent coordinate.
///
/// With a reference image the percentages are of the image's displayed rect;
/// otherwise of the stage itself.
pub fn percent_to_stage(
    x: f32,
    y: f32,
    image: Option<Rect>,
    stage: Rect,
) -> Result<Pos2, GeometryError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(GeometryError::NonFinite {
            what: "milestone coordinate",
        });
    }
    let pos = match image {
        Some(img) => pos2(
            img.left() - stage.left() + x / 100.0 * img.width(),
            img.top() - stage.top() + y / 100.0 * img.height(),
        ),
        None => pos2(x / 100.0 * stage.width(), y / 100.0 * stage.height()),
    };
    finite(pos.round(), "milestone position")
}

/// Label width cap that scales with the reference image.
pub fn label_max_width(image_width: f32) -> f32 {
    (image_width.max(1.0) * 0.12).round().max(80.0)
}

/// Line from the left-hand anchor to a milestone center, stage-relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: Pos2,
    pub to: Pos2,
}

pub const CONNECTOR_ANCHOR_FRACTION: f32 = 0.08;

pub fn connector(stage: Rect, center: Pos2) -> Result<Connector, GeometryError> {
    let center = finite(center, "milestone center")?;
    let from = pos2(
        (stage.width() * CONNECTOR_ANCHOR_FRACTION).round(),
        center.y.round(),
    );
    Ok(Connector { from, to: center })
}

fn finite(p: Pos2, what: &'static str) -> Result<Pos2, GeometryError> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(GeometryError::NonFinite { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(x, y), eframe::egui::vec2(w, h))
    }

    #[test]
    fn polyline_length_and_points() {
        let path = ReferencePath::new([[0.0, 0.0], [30.0, 0.0], [30.0, 40.0]]);
        assert_eq!(path.total_length(), Ok(70.0));
        assert_eq!(path.point_at_length(15.0), Ok(pos2(15.0, 0.0)));
        assert_eq!(path.point_at_length(50.0), Ok(pos2(30.0, 20.0)));
        assert_eq!(path.point_at_length(500.0), Ok(pos2(30.0, 40.0)));
        assert_eq!(path.point_at_fraction(0.0), Ok(pos2(0.0, 0.0)));
    }

    #[test]
    fn prefix_stops_mid_segment() {
        let path = ReferencePath::new([[0.0, 0.0], [30.0, 0.0], [30.0, 40.0]]);
        assert_eq!(
            path.prefix(0.5),
            Ok(vec![pos2(0.0, 0.0), pos2(30.0, 0.0), pos2(30.0, 5.0)])
        );
        assert_eq!(path.prefix(0.0), Ok(vec![pos2(0.0, 0.0), pos2(0.0, 0.0)]));
    }

    #[test]
    fn degenerate_paths_fail() {
        assert_eq!(
            ReferencePath::new([[1.0, 1.0]]).total_length(),
            Err(GeometryError::DegeneratePath)
        );
        assert_eq!(
            ReferencePath::new([[1.0, 1.0], [1.0, 1.0]]).total_length(),
            Err(GeometryError::DegeneratePath)
        );
        assert!(
            ReferencePath::new([[0.0, 0.0], [f32::NAN, 1.0]])
                .total_length()
                .is_err()
        );
    }

    #[test]
    fn view_box_maps_to_screen() {
        let vb = ViewBox::from_array([0.0, 0.0, 200.0, 100.0]);
        let p = vb.to_screen(pos2(100.0, 50.0), rect(10.0, 20.0, 400.0, 200.0));
        assert_eq!(p, Ok(pos2(210.0, 120.0)));
        let empty = ViewBox::from_array([0.0, 0.0, 0.0, 10.0]);
        assert_eq!(
            empty.to_screen(pos2(1.0, 1.0), rect(0.0, 0.0, 1.0, 1.0)),
            Err(GeometryError::EmptyViewBox)
        );
    }

    #[test]
    fn fractions_spread_evenly() {
        assert_eq!(path_fraction(0, 1), 0.5);
        assert_eq!(path_fraction(0, 3), 0.0);
        assert_eq!(path_fraction(1, 3), 0.5);
        assert_eq!(path_fraction(2, 3), 1.0);
    }

    #[test]
    fn percent_relative_to_image() {
        let stage = rect(100.0, 100.0, 1000.0, 600.0);
        let image = rect(150.0, 120.0, 800.0, 400.0);
        let p = percent_to_stage(25.0, 50.0, Some(image), stage).unwrap();
        assert_eq!(p, pos2(250.0, 220.0));
    }

    #[test]
    fn percent_relative_to_stage_without_image() {
        let stage = rect(0.0, 0.0, 400.0, 200.0);
        assert_eq!(
            percent_to_stage(50.0, 25.0, None, stage),
            Ok(pos2(200.0, 50.0))
        );
    }

    #[test]
    fn non_finite_percent_is_rejected() {
        let stage = rect(0.0, 0.0, 400.0, 200.0);
        assert!(percent_to_stage(f32::NAN, 10.0, None, stage).is_err());
    }

    #[test]
    fn label_width_has_a_floor() {
        assert_eq!(label_max_width(300.0), 80.0);
        assert_eq!(label_max_width(1000.0), 120.0);
        assert_eq!(label_max_width(0.0), 80.0);
    }

    #[test]
    fn connector_starts_at_left_anchor() {
        let stage = rect(0.0, 0.0, 1000.0, 500.0);
        let c = connector(stage, pos2(400.0, 210.4)).unwrap();
        assert_eq!(c.from, pos2(80.0, 210.0));
        assert_eq!(c.to, pos2(400.0, 210.4));
    }
}
