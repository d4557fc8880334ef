use std::time::Duration;

/// Share of the roadmap that must be on screen before the path draws in.
pub const VISIBLE_THRESHOLD: f32 = 0.15;
pub const DURATION: Duration = Duration::from_millis(900);

/// Draw-in animation of the reference path stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    reduced_motion: bool,
    visible: bool,
    progress: f32,
}

impl Reveal {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            visible: false,
            progress: if reduced_motion { 1.0 } else { 0.0 },
        }
    }

    /// Record how much of the roadmap is visible (0..=1).
    pub fn observe(&mut self, visible_fraction: f32) {
        self.visible = visible_fraction >= VISIBLE_THRESHOLD;
    }

    /// Step the animation. Returns true while it is still running.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.reduced_motion {
            self.progress = 1.0;
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

    /// Fraction of the path length currently drawn.
    pub fn drawn_fraction(&self) -> f32 {
        if self.reduced_motion {
            1.0
        } else {
            ease(self.progress)
        }
    }
}

fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_until_visible_enough() {
        let mut reveal = Reveal::new(false);
        reveal.observe(0.1);
        assert!(!reveal.advance(Duration::from_millis(100)));
        assert_eq!(reveal.drawn_fraction(), 0.0);
    }

    #[test]
    fn draws_in_over_the_duration() {
        let mut reveal = Reveal::new(false);
        reveal.observe(0.15);
        assert!(reveal.advance(Duration::from_millis(450)));
        assert!((reveal.drawn_fraction() - 0.5).abs() < 1e-3);
        assert!(!reveal.advance(DURATION));
        assert_eq!(reveal.drawn_fraction(), 1.0);
    }

    #[test]
    fn leaving_reverses() {
        let mut reveal = Reveal::new(false);
        reveal.observe(1.0);
        reveal.advance(DURATION);
        reveal.observe(0.0);
        assert!(reveal.advance(Duration::from_millis(300)));
        assert!(reveal.drawn_fraction() < 1.0);
        reveal.advance(DURATION);
        assert_eq!(reveal.drawn_fraction(), 0.0);
    }

    #[test]
    fn reduced_motion_stays_drawn() {
        let mut reveal = Reveal::new(true);
        assert_eq!(reveal.drawn_fraction(), 1.0);
        reveal.observe(0.0);
        assert!(!reveal.advance(Duration::from_millis(16)));
        assert_eq!(reveal.drawn_fraction(), 1.0);
    }
}
