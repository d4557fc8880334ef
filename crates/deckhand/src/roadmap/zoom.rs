use std::time::Duration;

use eframe::egui::emath::TSTransform;
use eframe::egui::{Pos2, Rect, Vec2};

/// Magnification once fully zoomed in.
pub const SCALE: f32 = 1.6;
/// Share of the stage that must be on screen before the camera moves in.
pub const VISIBLE_THRESHOLD: f32 = 0.45;
pub const DURATION: Duration = Duration::from_millis(600);

/// Camera move onto the focused milestone. Winds back out when the stage
/// leaves the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Zoom {
    reduced_motion: bool,
    visible: bool,
    progress: f32,
}

impl Zoom {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            visible: false,
            progress: 0.0,
        }
    }

    pub fn observe(&mut self, visible_fraction: f32) {
        self.visible = visible_fraction > VISIBLE_THRESHOLD;
    }

    /// Step toward zoomed in or out. Returns true while moving.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.reduced_motion {
            self.progress = 0.0;
            return false;
        }
        let target = if self.visible { 1.0 } else { 0.0 };
        let step = dt.as_secs_f32() / DURATION.as_secs_f32();
        self.progress = if target > self.progress {
            (self.progress + step).min(target)
        } else {
            (self.progress - step).max(target)
        };
        self.progress != target
    }

    /// How far in the camera is, 0 (reset) to 1 (fully zoomed).
    pub fn amount(&self) -> f32 {
        if self.reduced_motion {
            return 0.0;
        }
        let t = self.progress.clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// Stage transform that magnifies around `focus` (percent of the stage) and
/// slides that point toward the stage center. `amount` blends from the
/// identity at 0 to the full move at 1.
pub fn transform(stage: Rect, focus: Pos2, amount: f32) -> TSTransform {
    let amount = amount.clamp(0.0, 1.0);
    let origin = stage.min + Vec2::new(focus.x, focus.y) / 100.0 * stage.size();
    let scaling = 1.0 + (SCALE - 1.0) * amount;
    let shift = (stage.center() - origin) * amount;
    TSTransform::new(origin.to_vec2() * (1.0 - scaling) + shift, scaling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn stage() -> Rect {
        Rect::from_min_size(pos2(100.0, 50.0), Vec2::new(1000.0, 500.0))
    }

    fn close(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn zoomed_focus_lands_on_the_stage_center() {
        let t = transform(stage(), pos2(20.0, 80.0), 1.0);
        assert_eq!(t.scaling, SCALE);
        assert!(close(t * pos2(300.0, 450.0), stage().center()));
    }

    #[test]
    fn zero_amount_is_the_identity() {
        let t = transform(stage(), pos2(20.0, 80.0), 0.0);
        assert_eq!(t.scaling, 1.0);
        assert!(close(t * pos2(321.0, 77.0), pos2(321.0, 77.0)));
    }

    #[test]
    fn centered_focus_only_magnifies() {
        let t = transform(stage(), pos2(50.0, 50.0), 1.0);
        assert!(close(t * stage().center(), stage().center()));
        let corner = t * stage().min;
        assert!(corner.x < stage().min.x && corner.y < stage().min.y);
    }

    #[test]
    fn zooms_in_while_visible_and_resets_after() {
        let mut zoom = Zoom::new(false);
        zoom.observe(0.3);
        assert!(!zoom.advance(DURATION));
        assert_eq!(zoom.amount(), 0.0);

        zoom.observe(1.0);
        assert!(zoom.advance(DURATION / 2));
        assert!(!zoom.advance(DURATION));
        assert_eq!(zoom.amount(), 1.0);

        zoom.observe(0.0);
        assert!(!zoom.advance(DURATION));
        assert_eq!(zoom.amount(), 0.0);
    }

    #[test]
    fn reduced_motion_never_zooms() {
        let mut zoom = Zoom::new(true);
        zoom.observe(1.0);
        assert!(!zoom.advance(DURATION));
        assert_eq!(zoom.amount(), 0.0);
    }
}
