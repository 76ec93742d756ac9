//! Geometry snapshots: per-element bounding boxes and opacity captured at a
//! point in time.
//!
//! Two snapshots drive every batch. The "from" snapshot is assembled by the
//! controller from tracked baselines (or exact tween samples for elements
//! still in flight); the "to" snapshot is measured from the host after the
//! document has reflowed. Capturing never writes to the document.

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::host::{ElementId, LayoutHost};
use crate::options::PresenceStyle;

/// Axis-aligned layout box in container-independent document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Rect from x, y, width, height.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rect from an origin and a size.
    #[must_use]
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Left edge.
    #[inline]
    pub fn x(&self) -> f32 {
        self.origin.x
    }

    /// Top edge.
    #[inline]
    pub fn y(&self) -> f32 {
        self.origin.y
    }

    /// Width.
    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    /// Height.
    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Whether the top-left corners coincide within `epsilon` on both axes.
    #[inline]
    pub fn same_position(&self, other: &Rect, epsilon: f32) -> bool {
        (other.origin - self.origin).abs().max_element() <= epsilon
    }

    /// Whether origin and size both coincide within `epsilon`.
    #[inline]
    pub fn approx_eq(&self, other: &Rect, epsilon: f32) -> bool {
        self.same_position(other, epsilon)
            && (other.size - self.size).abs().max_element() <= epsilon
    }

    /// Linear interpolation of origin and size.
    #[inline]
    pub fn lerp(&self, other: &Rect, t: f32) -> Rect {
        Rect {
            origin: self.origin.lerp(other.origin, t),
            size: self.size.lerp(other.size, t),
        }
    }

    /// This rect uniformly scaled about its center.
    #[inline]
    pub fn scaled_about_center(&self, scale: f32) -> Rect {
        let size = self.size * scale;
        Rect {
            origin: self.center() - size * 0.5,
            size,
        }
    }
}

/// Visual state of one element: its box, opacity, and a uniform presence
/// scale applied about the box center.
///
/// `rect` keeps the position an element occupies; `scale` only shrinks or
/// grows it visually, the way a CSS `scale()` transform leaves the layout
/// box untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Box the element occupies.
    pub rect: Rect,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Uniform scale about the rect center (1.0 = natural size).
    pub scale: f32,
}

impl Geometry {
    /// Geometry of an element at rest: natural size, given opacity.
    #[must_use]
    pub fn settled(rect: Rect, opacity: f32) -> Self {
        Self {
            rect,
            opacity,
            scale: 1.0,
        }
    }

    /// Same box with a presence style applied (used to synthesize the
    /// invisible end of enter/exit transitions).
    #[must_use]
    pub fn with_presence(&self, style: &PresenceStyle) -> Self {
        Self {
            rect: self.rect,
            opacity: self.opacity * style.opacity,
            scale: style.scale,
        }
    }

    /// Linear interpolation of every component.
    #[inline]
    pub fn lerp(&self, other: &Geometry, t: f32) -> Geometry {
        Geometry {
            rect: self.rect.lerp(&other.rect, t),
            opacity: self.opacity + (other.opacity - self.opacity) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }

    /// The box as it appears on screen once `scale` is applied.
    #[inline]
    pub fn visual_rect(&self) -> Rect {
        self.rect.scaled_about_center(self.scale)
    }
}

/// Element → geometry mapping captured at one instant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: FxHashMap<ElementId, Geometry>,
}

impl Snapshot {
    /// Empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure `elements` from the host right now.
    ///
    /// Elements the host cannot measure (not rendered, unknown) are left out.
    pub fn capture<H: LayoutHost + ?Sized>(
        host: &H,
        elements: &[ElementId],
    ) -> Self {
        let mut snapshot = Self::new();
        for &element in elements {
            match host.layout_rect(element) {
                Some(rect) => snapshot.insert(
                    element,
                    Geometry::settled(rect, host.opacity(element)),
                ),
                None => log::warn!("cannot measure {element}, skipping"),
            }
        }
        snapshot
    }

    /// Record (or overwrite) the geometry of one element.
    pub fn insert(&mut self, element: ElementId, geometry: Geometry) {
        let _ = self.entries.insert(element, geometry);
    }

    /// Geometry recorded for `element`.
    #[inline]
    pub fn get(&self, element: ElementId) -> Option<&Geometry> {
        self.entries.get(&element)
    }

    /// Whether `element` was captured.
    #[inline]
    pub fn contains(&self, element: ElementId) -> bool {
        self.entries.contains_key(&element)
    }

    /// Number of captured elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over captured elements (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Geometry)> {
        self.entries.iter().map(|(&id, g)| (id, g))
    }
}
