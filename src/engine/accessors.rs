//! Read-only query methods for [`Controller`].

use super::{ChildState, Controller, TrackedChild};
use crate::animation::TransitionPlayer;
use crate::host::ElementId;
use crate::options::AnimateOptions;

// ── Binding ──

impl Controller {
    /// Container this controller animates.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Options the controller was attached with.
    pub fn options(&self) -> &AnimateOptions {
        &self.options
    }

    /// Whether the controller is still observing its container.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

// ── Children ──

impl Controller {
    /// Live children as of the last processed batch, in document order.
    pub fn live_children(&self) -> &[ElementId] {
        &self.live
    }

    /// Bookkeeping for `element`, live or exiting.
    pub fn tracked(&self, element: ElementId) -> Option<&TrackedChild> {
        self.tracked.get(&element)
    }

    /// Lifecycle state of `element`.
    pub fn state_of(&self, element: ElementId) -> Option<ChildState> {
        self.tracked.get(&element).map(|c| c.state)
    }

    /// Removed children still animating out, ordered by id.
    pub fn exiting(&self) -> Vec<ElementId> {
        let mut ghosts: Vec<ElementId> = self
            .tracked
            .values()
            .filter(|c| c.is_exiting())
            .map(|c| c.element)
            .collect();
        ghosts.sort_unstable();
        ghosts
    }
}

// ── Animation ──

impl Controller {
    /// Number of transitions in flight.
    pub fn active_count(&self) -> usize {
        self.player.active_count()
    }

    /// Whether any transition is in flight.
    pub fn is_animating(&self) -> bool {
        !self.player.is_idle()
    }

    /// The transition player.
    pub fn player(&self) -> &TransitionPlayer {
        &self.player
    }
}
