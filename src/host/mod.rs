//! The seam between the engine and a document.
//!
//! The engine never owns elements. It refers to them by [`ElementId`] and
//! asks a [`LayoutHost`] to measure them, report the child list and buffered
//! child-list mutations, and write transient visual styles (transform and
//! opacity frames, the absolute hold used while an element fades out).
//!
//! Two hosts ship with the crate:
//!
//! - [`VirtualDom`] - an in-memory document with a vertical stacking layout,
//!   used by tests, benchmarks and the demo binary.
//! - `web::WebHost` (feature `web`) - a real browser document through
//!   `web-sys`.

mod virtual_dom;
#[cfg(feature = "web")]
pub mod web;

use std::fmt;

use glam::Vec2;
pub use virtual_dom::VirtualDom;

use crate::snapshot::{Geometry, Rect};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identity of a host element.
///
/// Identity, not index, keys every tracked child, so it survives reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Mutation records
// ---------------------------------------------------------------------------

/// One raw child-list change, as a host observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRecord {
    /// `element` was inserted into the container.
    Added(ElementId),
    /// `element` was removed from the container.
    Removed(ElementId),
    /// `element` changed position among its siblings without leaving.
    Moved(ElementId),
}

impl MutationRecord {
    /// The element this record is about.
    #[inline]
    pub fn element(&self) -> ElementId {
        match *self {
            Self::Added(e) | Self::Removed(e) | Self::Moved(e) => e,
        }
    }
}

// ---------------------------------------------------------------------------
// Style writes
// ---------------------------------------------------------------------------

/// Element margins, used to keep a held element's border box over its slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    /// Top margin.
    pub top: f32,
    /// Right margin.
    pub right: f32,
    /// Bottom margin.
    pub bottom: f32,
    /// Left margin.
    pub left: f32,
}

impl Margins {
    /// No margins.
    pub const ZERO: Margins = Margins {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// Same margin on every side.
    #[must_use]
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Offset from the margin box corner to the border box corner.
    #[inline]
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }
}

/// Transform + opacity written to an element for one animation frame.
///
/// The transform origin is the element's top-left corner: the element
/// renders at `layout.origin + translate` with size `layout.size * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Offset from the layout position.
    pub translate: Vec2,
    /// Per-axis size factor.
    pub scale: Vec2,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Frame {
    /// No visual offset, full opacity.
    pub const IDENTITY: Frame = Frame {
        translate: Vec2::ZERO,
        scale: Vec2::ONE,
        opacity: 1.0,
    };

    /// FLIP projection: the frame that makes an element laid out at `layout`
    /// appear as `visual`.
    #[must_use]
    pub fn project(layout: &Rect, visual: &Geometry) -> Self {
        let target = visual.visual_rect();
        let ratio = |to: f32, from: f32| {
            if from.abs() > f32::EPSILON {
                to / from
            } else {
                visual.scale
            }
        };
        Self {
            translate: target.origin - layout.origin,
            scale: Vec2::new(
                ratio(target.size.x, layout.size.x),
                ratio(target.size.y, layout.size.y),
            ),
            opacity: visual.opacity,
        }
    }

    /// Where `layout` renders with this frame applied.
    #[must_use]
    pub fn apply_to(&self, layout: &Rect) -> Rect {
        Rect::from_origin_size(
            layout.origin + self.translate,
            layout.size * self.scale,
        )
    }

    /// CSS `transform` value for this frame.
    #[must_use]
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({}, {})",
            self.translate.x, self.translate.y, self.scale.x, self.scale.y
        )
    }
}

/// Absolute position for an element held in place while it exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Absolute offset of the element's margin box inside the document.
    pub offset: Vec2,
    /// Border box size to pin.
    pub size: Vec2,
}

// ---------------------------------------------------------------------------
// Host trait
// ---------------------------------------------------------------------------

/// Document operations the engine depends on.
///
/// Every read is synchronous and side-effect free. `layout_rect` must
/// ignore frames the engine applied, so baselines stay in layout space.
pub trait LayoutHost {
    /// Whether `container` is still attached to the document.
    fn is_connected(&self, container: ElementId) -> bool;

    /// Start buffering child-list mutations of `container`.
    fn observe(&mut self, container: ElementId);

    /// Stop buffering and drop anything buffered for `container`.
    fn disconnect(&mut self, container: ElementId);

    /// Drain the mutations buffered for `container` since the last call.
    fn take_records(&mut self, container: ElementId) -> Vec<MutationRecord>;

    /// Whether `element` is attached to the document under any parent.
    fn is_in_document(&self, element: ElementId) -> bool;

    /// Current live children of `container`, in document order.
    fn children(&self, container: ElementId) -> Vec<ElementId>;

    /// Layout box of `element`, ignoring engine-applied frames.
    fn layout_rect(&self, element: ElementId) -> Option<Rect>;

    /// Natural opacity of `element`, ignoring engine-applied frames.
    fn opacity(&self, _element: ElementId) -> f32 {
        1.0
    }

    /// Margins of `element`.
    fn margins(&self, _element: ElementId) -> Margins {
        Margins::ZERO
    }

    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    /// Write one animation frame to `element`.
    fn apply_frame(&mut self, element: ElementId, frame: &Frame);

    /// Remove any frame previously written to `element`.
    fn clear_frame(&mut self, element: ElementId);

    /// Re-attach a removed `element` to `container` out of layout flow,
    /// pinned at `placement`, so it can animate out.
    fn hold_in_place(
        &mut self,
        container: ElementId,
        element: ElementId,
        placement: Placement,
    );

    /// Undo [`hold_in_place`](Self::hold_in_place) styling for an element
    /// the host has inserted back into the container.
    fn release_hold(&mut self, element: ElementId);

    /// Detach a held element from the document for good.
    fn detach(&mut self, element: ElementId);

    /// The engine stopped tracking `element`; drop any state kept for it.
    fn forget(&mut self, _element: ElementId) {}
}
