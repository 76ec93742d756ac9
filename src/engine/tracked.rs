//! Per-child bookkeeping kept between batches.

use crate::animation::AnimationKind;
use crate::host::ElementId;
use crate::snapshot::Geometry;

/// Lifecycle of a tracked child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildState {
    /// Live child at rest.
    Settled,
    /// Live child growing in.
    Entering,
    /// Live child sliding to a new slot.
    Moving,
    /// Removed child held in place while it animates out.
    Exiting,
}

impl From<AnimationKind> for ChildState {
    fn from(kind: AnimationKind) -> Self {
        match kind {
            AnimationKind::Enter => ChildState::Entering,
            AnimationKind::Exit => ChildState::Exiting,
            AnimationKind::Move => ChildState::Moving,
        }
    }
}

/// What the controller remembers about one child.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedChild {
    /// The child.
    pub element: ElementId,
    /// Last settled (or targeted) geometry; `None` if the host never
    /// measured it.
    pub baseline: Option<Geometry>,
    /// Where the child is in its lifecycle.
    pub state: ChildState,
}

impl TrackedChild {
    /// Child at rest at `baseline`.
    #[must_use]
    pub fn settled(element: ElementId, baseline: Option<Geometry>) -> Self {
        Self {
            element,
            baseline,
            state: ChildState::Settled,
        }
    }

    /// Whether the child was removed and is animating out.
    #[inline]
    pub fn is_exiting(&self) -> bool {
        self.state == ChildState::Exiting
    }
}
