//! Transition player: owns every in-flight tween, keyed by element.

use rustc_hash::FxHashMap;
use web_time::{Duration, Instant};

use super::tween::{AnimationKind, Tween};
use crate::host::{ElementId, Frame};
use crate::snapshot::Geometry;
use crate::util::easing::Easing;

/// Result of one [`TransitionPlayer::advance`] step.
#[derive(Debug, Default)]
pub struct Advance {
    /// Frame to write for every tween still running, ordered by element.
    pub frames: Vec<(ElementId, Frame)>,
    /// Tweens that reached their target this step, ordered by element.
    pub finished: Vec<(ElementId, Tween)>,
}

/// Runs at most one tween per element.
///
/// Starting a tween for an element that already has one replaces it
/// (restart-from-current: callers pass the old tween's sample as `from`).
#[derive(Debug, Clone)]
pub struct TransitionPlayer {
    tweens: FxHashMap<ElementId, Tween>,
    duration: Duration,
    easing: Easing,
}

impl TransitionPlayer {
    /// Player whose tweens all use `duration` and `easing`.
    #[must_use]
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            tweens: FxHashMap::default(),
            duration,
            easing,
        }
    }

    /// Duration used for new tweens.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start a tween for `element`, returning the one it supersedes.
    pub fn play(
        &mut self,
        element: ElementId,
        kind: AnimationKind,
        from: Geometry,
        to: Geometry,
        now: Instant,
    ) -> Option<Tween> {
        let tween =
            Tween::new(kind, from, to, now, self.duration, self.easing.clone());
        self.tweens.insert(element, tween)
    }

    /// Interpolated geometry of `element` at `now`, if it is animating.
    pub fn sample(&self, element: ElementId, now: Instant) -> Option<Geometry> {
        self.tweens.get(&element).map(|t| t.sample(now))
    }

    /// Tween currently running for `element`.
    pub fn get(&self, element: ElementId) -> Option<&Tween> {
        self.tweens.get(&element)
    }

    /// Target geometry of `element`'s tween.
    pub fn target(&self, element: ElementId) -> Option<&Geometry> {
        self.tweens.get(&element).map(|t| &t.to)
    }

    /// Whether `element` has a tween in flight.
    pub fn is_active(&self, element: ElementId) -> bool {
        self.tweens.contains_key(&element)
    }

    /// Number of tweens in flight.
    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    /// Whether nothing is animating.
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Stop `element`'s tween without writing a final frame.
    pub fn cancel(&mut self, element: ElementId) -> Option<Tween> {
        self.tweens.remove(&element)
    }

    /// Stop every tween, returning them ordered by element.
    pub fn cancel_all(&mut self) -> Vec<(ElementId, Tween)> {
        let mut all: Vec<_> = self.tweens.drain().collect();
        all.sort_by_key(|(e, _)| *e);
        all
    }

    /// Step every tween to `now`.
    ///
    /// Running tweens yield the frame that makes the element, laid out at
    /// its target box, appear at the sampled geometry. Completed tweens
    /// are removed and returned; their frames are the caller's to clear.
    pub fn advance(&mut self, now: Instant) -> Advance {
        let mut advance = Advance::default();
        let mut done = Vec::new();
        for (&element, tween) in &self.tweens {
            if tween.is_complete(now) {
                done.push(element);
            } else {
                let frame = Frame::project(&tween.to.rect, &tween.sample(now));
                advance.frames.push((element, frame));
            }
        }
        for element in done {
            if let Some(tween) = self.tweens.remove(&element) {
                advance.finished.push((element, tween));
            }
        }
        advance.frames.sort_by_key(|(e, _)| *e);
        advance.finished.sort_by_key(|(e, _)| *e);
        advance
    }
}
