//! A single element transition from one geometry to another.

use web_time::{Duration, Instant};

use crate::snapshot::Geometry;
use crate::util::easing::Easing;

/// What a tween is animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// A new child growing in from its enter style.
    Enter,
    /// A removed child shrinking out, held in place until it finishes.
    Exit,
    /// A surviving child sliding to its new slot.
    Move,
}

/// Interpolation state for one element.
#[derive(Debug, Clone)]
pub struct Tween {
    /// Transition kind.
    pub kind: AnimationKind,
    /// Geometry at `start`.
    pub from: Geometry,
    /// Geometry once complete.
    pub to: Geometry,
    /// When the transition began.
    pub start: Instant,
    /// Total length.
    pub duration: Duration,
    /// Timing curve applied to linear progress.
    pub easing: Easing,
}

impl Tween {
    /// Tween starting at `start`.
    #[must_use]
    pub fn new(
        kind: AnimationKind,
        from: Geometry,
        to: Geometry,
        start: Instant,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            kind,
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]`. Zero-length tweens are always complete.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Whether the tween has reached its target.
    pub fn is_complete(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Interpolated geometry at `now`. Exactly `to` once complete.
    pub fn sample(&self, now: Instant) -> Geometry {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, self.easing.evaluate(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Rect;

    fn tween(duration_ms: u64) -> (Tween, Instant) {
        let start = Instant::now();
        let from = Geometry::settled(Rect::new(0.0, 80.0, 100.0, 40.0), 1.0);
        let to = Geometry::settled(Rect::new(0.0, 40.0, 100.0, 40.0), 1.0);
        (
            Tween::new(
                AnimationKind::Move,
                from,
                to,
                start,
                Duration::from_millis(duration_ms),
                Easing::Linear,
            ),
            start,
        )
    }

    #[test]
    fn test_progress_bounds() {
        let (t, start) = tween(100);
        assert_eq!(t.progress(start), 0.0);
        assert!((t.progress(start + Duration::from_millis(50)) - 0.5).abs() < 1e-4);
        assert_eq!(t.progress(start + Duration::from_millis(500)), 1.0);
        assert!(t.is_complete(start + Duration::from_millis(100)));
    }

    #[test]
    fn test_sample_endpoints_and_midpoint() {
        let (t, start) = tween(100);
        assert_eq!(t.sample(start), t.from);
        assert_eq!(t.sample(start + Duration::from_millis(200)), t.to);
        let mid = t.sample(start + Duration::from_millis(50));
        assert!((mid.rect.y() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let (t, start) = tween(0);
        assert!(t.is_complete(start));
        assert_eq!(t.sample(start), t.to);
    }
}
