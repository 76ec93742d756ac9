//! Diff classifier: compares "from" and "to" snapshots over the old and new
//! child lists and labels every element.

use rustc_hash::FxHashSet;

use crate::host::ElementId;
use crate::options::{AnimateOptions, MovePolicy, PresenceStyle};
use crate::snapshot::{Geometry, Rect, Snapshot};
use crate::watch::MutationBatch;

/// Positions closer than this (per axis, in layout units) count as equal.
pub const POSITION_EPSILON: f32 = 0.01;

/// Label assigned to one element for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Present after the batch, absent before.
    Added,
    /// Present before the batch, absent after.
    Removed,
    /// Present in both with a different position.
    Moved,
    /// Present in both at the same position (size changes included).
    Unchanged,
}

/// One classified element with the endpoints of its transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    /// Element being labelled.
    pub element: ElementId,
    /// Its label.
    pub kind: ChangeKind,
    /// Geometry the transition starts from.
    pub from: Geometry,
    /// Geometry the transition ends at.
    pub to: Geometry,
}

/// Inputs to classification that come from options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyRules {
    /// Style entering elements start from.
    pub enter: PresenceStyle,
    /// Style exiting elements end at.
    pub exit: PresenceStyle,
    /// Which displaced elements count as moved.
    pub move_policy: MovePolicy,
    /// Position tolerance.
    pub epsilon: f32,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        Self {
            enter: PresenceStyle::default(),
            exit: PresenceStyle::default(),
            move_policy: MovePolicy::default(),
            epsilon: POSITION_EPSILON,
        }
    }
}

impl From<&AnimateOptions> for ClassifyRules {
    fn from(options: &AnimateOptions) -> Self {
        Self {
            enter: options.enter,
            exit: options.exit,
            move_policy: options.move_policy,
            epsilon: POSITION_EPSILON,
        }
    }
}

/// Every element labelled for one batch: live children in their new order,
/// then removed elements in their old order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    entries: Vec<Classified>,
}

impl Classification {
    /// All entries.
    pub fn entries(&self) -> &[Classified] {
        &self.entries
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = &Classified> {
        self.entries.iter()
    }

    /// Entry for `element`.
    pub fn get(&self, element: ElementId) -> Option<&Classified> {
        self.entries.iter().find(|c| c.element == element)
    }

    /// Label of `element`.
    pub fn kind_of(&self, element: ElementId) -> Option<ChangeKind> {
        self.get(element).map(|c| c.kind)
    }

    /// Elements with the given label, in classification order.
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = ElementId> + '_ {
        self.entries
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.element)
    }

    /// Number of elements with the given label.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.entries.iter().filter(|c| c.kind == kind).count()
    }

    /// Number of labelled elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was labelled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any element needs a transition.
    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|c| c.kind != ChangeKind::Unchanged)
    }
}

/// Label every element of `previous` ∪ `current`.
///
/// `from` must hold every element of `previous` (and may hold elements
/// still exiting, which are treated as re-added from their current look).
/// `to` holds whatever the host could measure after reflow. `batch`, when
/// given, is consulted by [`MovePolicy::ReorderedOnly`].
pub fn classify(
    previous: &[ElementId],
    current: &[ElementId],
    from: &Snapshot,
    to: &Snapshot,
    batch: Option<&MutationBatch>,
    rules: &ClassifyRules,
) -> Classification {
    let before: FxHashSet<ElementId> = previous.iter().copied().collect();
    let after: FxHashSet<ElementId> = current.iter().copied().collect();
    let mut entries = Vec::with_capacity(previous.len().max(current.len()));

    for &element in current {
        let Some(&measured) = to.get(element) else {
            // Not rendered: nothing to animate towards.
            log::debug!("{element} has no layout after reflow, leaving as is");
            let at = from
                .get(element)
                .copied()
                .unwrap_or_else(|| Geometry::settled(Rect::default(), 1.0));
            entries.push(Classified {
                element,
                kind: ChangeKind::Unchanged,
                from: at,
                to: at,
            });
            continue;
        };

        if !before.contains(&element) {
            let start = from
                .get(element)
                .copied()
                .unwrap_or_else(|| measured.with_presence(&rules.enter));
            entries.push(Classified {
                element,
                kind: ChangeKind::Added,
                from: start,
                to: measured,
            });
            continue;
        }

        let start = from.get(element).copied().unwrap_or(measured);
        let displaced = !start.rect.same_position(&measured.rect, rules.epsilon);
        let moved = displaced
            && match rules.move_policy {
                MovePolicy::AnyDisplacement => true,
                MovePolicy::ReorderedOnly => {
                    batch.is_some_and(|b| b.is_reordered(element))
                }
            };
        entries.push(Classified {
            element,
            kind: if moved {
                ChangeKind::Moved
            } else {
                ChangeKind::Unchanged
            },
            from: start,
            to: measured,
        });
    }

    for &element in previous {
        if after.contains(&element) {
            continue;
        }
        let Some(&start) = from.get(element) else {
            log::warn!("removed {element} has no recorded geometry");
            continue;
        };
        entries.push(Classified {
            element,
            kind: ChangeKind::Removed,
            from: start,
            to: start.with_presence(&rules.exit),
        });
    }

    Classification { entries }
}
