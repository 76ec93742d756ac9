//! In-memory document with a vertical stacking layout.
//!
//! Containers stack their in-flow children top to bottom starting at the
//! container origin; each child occupies its margin box. Held children are
//! out of flow and sit at their absolute placement. Mutations are buffered
//! per container while it is observed, the way a `MutationObserver` queues
//! records until its callback runs.

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{ElementId, Frame, LayoutHost, Margins, MutationRecord, Placement};
use crate::snapshot::Rect;

#[derive(Debug, Clone)]
struct ContainerNode {
    origin: Vec2,
    connected: bool,
    children: Vec<ElementId>,
    held: Vec<ElementId>,
    observed: bool,
    records: Vec<MutationRecord>,
}

impl ContainerNode {
    fn record(&mut self, record: MutationRecord) {
        if self.observed {
            self.records.push(record);
        }
    }
}

#[derive(Debug, Clone)]
struct ElementNode {
    size: Vec2,
    margins: Margins,
    opacity: f32,
    parent: Option<ElementId>,
    frame: Option<Frame>,
    placement: Option<Placement>,
}

/// In-memory [`LayoutHost`].
#[derive(Debug, Clone, Default)]
pub struct VirtualDom {
    containers: FxHashMap<ElementId, ContainerNode>,
    elements: FxHashMap<ElementId, ElementNode>,
    /// Elements an engine released since they were last inserted.
    forgotten: FxHashSet<ElementId>,
    next_id: u64,
    reduced_motion: bool,
}

impl VirtualDom {
    /// Empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }

    // -- Construction -------------------------------------------------------

    /// Create a connected, empty container whose first child starts at
    /// `origin`.
    pub fn create_container(&mut self, origin: Vec2) -> ElementId {
        let id = self.allocate();
        let _ = self.containers.insert(
            id,
            ContainerNode {
                origin,
                connected: true,
                children: Vec::new(),
                held: Vec::new(),
                observed: false,
                records: Vec::new(),
            },
        );
        id
    }

    /// Create a detached element with the given border box size.
    pub fn create_element(&mut self, size: Vec2) -> ElementId {
        let id = self.allocate();
        let _ = self.elements.insert(
            id,
            ElementNode {
                size,
                margins: Margins::ZERO,
                opacity: 1.0,
                parent: None,
                frame: None,
                placement: None,
            },
        );
        id
    }

    // -- Child-list mutations -----------------------------------------------

    /// Append `element` as the last child of `container`.
    pub fn append(&mut self, container: ElementId, element: ElementId) {
        let len = self
            .containers
            .get(&container)
            .map_or(0, |c| c.children.len());
        self.insert(container, len, element);
    }

    /// Insert `element` at `index` (clamped) among `container`'s children.
    ///
    /// An element that already lives in a container is moved, producing a
    /// removal record followed by an insertion record, as in the DOM.
    pub fn insert(
        &mut self,
        container: ElementId,
        index: usize,
        element: ElementId,
    ) {
        if !self.containers.contains_key(&container) {
            return;
        }
        let Some(node) = self.elements.get_mut(&element) else {
            return;
        };
        let previous = node.parent.replace(container);
        if let Some(prev) = previous {
            if let Some(old) = self.containers.get_mut(&prev) {
                if let Some(pos) = old.children.iter().position(|&c| c == element)
                {
                    let _ = old.children.remove(pos);
                    old.record(MutationRecord::Removed(element));
                }
                old.held.retain(|&h| h != element);
            }
        }
        let _ = self.forgotten.remove(&element);
        if let Some(target) = self.containers.get_mut(&container) {
            let index = index.min(target.children.len());
            target.children.insert(index, element);
            target.record(MutationRecord::Added(element));
        }
    }

    /// Remove `element` from `container`'s live children.
    ///
    /// Returns `false` if it was not a live child.
    pub fn remove(&mut self, container: ElementId, element: ElementId) -> bool {
        let Some(c) = self.containers.get_mut(&container) else {
            return false;
        };
        let Some(pos) = c.children.iter().position(|&e| e == element) else {
            return false;
        };
        let _ = c.children.remove(pos);
        c.record(MutationRecord::Removed(element));
        if let Some(node) = self.elements.get_mut(&element) {
            if node.placement.is_none() {
                node.parent = None;
            }
        }
        true
    }

    /// Move a live child to `index`.
    pub fn move_to(
        &mut self,
        container: ElementId,
        element: ElementId,
        index: usize,
    ) {
        if self.remove(container, element) {
            self.insert(container, index, element);
        }
    }

    /// Reorder `container`'s children to `order`, which must be a
    /// permutation of the current children. Returns `false` (and changes
    /// nothing) otherwise.
    pub fn set_order(&mut self, container: ElementId, order: &[ElementId]) -> bool {
        let Some(c) = self.containers.get_mut(&container) else {
            return false;
        };
        let mut current = c.children.clone();
        let mut wanted = order.to_vec();
        current.sort_unstable();
        wanted.sort_unstable();
        if current != wanted {
            return false;
        }
        for (i, &element) in order.iter().enumerate() {
            if c.children[i] != element {
                c.record(MutationRecord::Removed(element));
                c.record(MutationRecord::Added(element));
            }
        }
        c.children = order.to_vec();
        true
    }

    // -- Styling and document state -----------------------------------------

    /// Change an element's border box size.
    pub fn set_size(&mut self, element: ElementId, size: Vec2) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.size = size;
        }
    }

    /// Change an element's margins.
    pub fn set_margins(&mut self, element: ElementId, margins: Margins) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.margins = margins;
        }
    }

    /// Change an element's natural opacity.
    pub fn set_opacity(&mut self, element: ElementId, opacity: f32) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.opacity = opacity;
        }
    }

    /// Move a container (and so its whole list) to a new origin.
    pub fn set_container_origin(&mut self, container: ElementId, origin: Vec2) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.origin = origin;
        }
    }

    /// Attach or detach a container from the document.
    pub fn set_connected(&mut self, container: ElementId, connected: bool) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.connected = connected;
        }
    }

    /// Simulate the user's reduced-motion preference.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    // -- Queries ------------------------------------------------------------

    /// Elements currently held out of flow inside `container`.
    #[must_use]
    pub fn held(&self, container: ElementId) -> Vec<ElementId> {
        self.containers
            .get(&container)
            .map(|c| c.held.clone())
            .unwrap_or_default()
    }

    /// Whether `element` is currently held out of flow.
    #[must_use]
    pub fn is_held(&self, element: ElementId) -> bool {
        self.elements
            .get(&element)
            .is_some_and(|n| n.placement.is_some())
    }

    /// Whether `element` is in the document, in flow or held.
    #[must_use]
    pub fn contains(&self, element: ElementId) -> bool {
        let Some(parent) = self.elements.get(&element).and_then(|n| n.parent)
        else {
            return false;
        };
        self.containers.get(&parent).is_some_and(|c| {
            c.connected
                && (c.children.contains(&element) || c.held.contains(&element))
        })
    }

    /// Whether an engine released `element` since it was last inserted.
    #[must_use]
    pub fn is_forgotten(&self, element: ElementId) -> bool {
        self.forgotten.contains(&element)
    }

    /// Frame currently written to `element`, if any.
    #[must_use]
    pub fn frame(&self, element: ElementId) -> Option<Frame> {
        self.elements.get(&element).and_then(|n| n.frame)
    }

    /// Where `element` renders: its layout box with the current frame
    /// applied.
    #[must_use]
    pub fn visual_rect(&self, element: ElementId) -> Option<Rect> {
        let layout = self.layout_rect(element)?;
        Some(match self.frame(element) {
            Some(frame) => frame.apply_to(&layout),
            None => layout,
        })
    }

    /// Rendered opacity of `element`: the frame's when one is written.
    #[must_use]
    pub fn visual_opacity(&self, element: ElementId) -> Option<f32> {
        let node = self.elements.get(&element)?;
        Some(node.frame.map_or(node.opacity, |f| f.opacity))
    }

    fn margin_box_height(node: &ElementNode) -> f32 {
        node.margins.top + node.size.y + node.margins.bottom
    }

    fn flow_rect(&self, container: &ContainerNode, element: ElementId) -> Option<Rect> {
        let mut cursor = container.origin.y;
        for &child in &container.children {
            let Some(node) = self.elements.get(&child) else {
                continue;
            };
            if node.placement.is_some() {
                continue;
            }
            if child == element {
                return Some(Rect::from_origin_size(
                    Vec2::new(
                        container.origin.x + node.margins.left,
                        cursor + node.margins.top,
                    ),
                    node.size,
                ));
            }
            cursor += Self::margin_box_height(node);
        }
        None
    }

    fn container_rect(&self, container: &ContainerNode) -> Rect {
        let mut size = Vec2::ZERO;
        for child in &container.children {
            if let Some(node) = self.elements.get(child) {
                if node.placement.is_none() {
                    size.x = size
                        .x
                        .max(node.margins.left + node.size.x + node.margins.right);
                    size.y += Self::margin_box_height(node);
                }
            }
        }
        Rect::from_origin_size(container.origin, size)
    }
}

impl LayoutHost for VirtualDom {
    fn is_connected(&self, container: ElementId) -> bool {
        self.containers.get(&container).is_some_and(|c| c.connected)
    }

    fn observe(&mut self, container: ElementId) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.observed = true;
        }
    }

    fn disconnect(&mut self, container: ElementId) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.observed = false;
            c.records.clear();
        }
    }

    fn take_records(&mut self, container: ElementId) -> Vec<MutationRecord> {
        self.containers
            .get_mut(&container)
            .map(|c| std::mem::take(&mut c.records))
            .unwrap_or_default()
    }

    fn is_in_document(&self, element: ElementId) -> bool {
        self.contains(element)
    }

    fn children(&self, container: ElementId) -> Vec<ElementId> {
        self.containers
            .get(&container)
            .map(|c| c.children.clone())
            .unwrap_or_default()
    }

    fn layout_rect(&self, element: ElementId) -> Option<Rect> {
        if let Some(c) = self.containers.get(&element) {
            return c.connected.then(|| self.container_rect(c));
        }
        let node = self.elements.get(&element)?;
        let container = self.containers.get(&node.parent?)?;
        if !container.connected {
            return None;
        }
        if let Some(placement) = node.placement {
            return Some(Rect::from_origin_size(
                placement.offset + node.margins.top_left(),
                placement.size,
            ));
        }
        self.flow_rect(container, element)
    }

    fn opacity(&self, element: ElementId) -> f32 {
        self.elements.get(&element).map_or(1.0, |n| n.opacity)
    }

    fn margins(&self, element: ElementId) -> Margins {
        self.elements
            .get(&element)
            .map_or(Margins::ZERO, |n| n.margins)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn apply_frame(&mut self, element: ElementId, frame: &Frame) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.frame = Some(*frame);
        }
    }

    fn clear_frame(&mut self, element: ElementId) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.frame = None;
        }
    }

    fn hold_in_place(
        &mut self,
        container: ElementId,
        element: ElementId,
        placement: Placement,
    ) {
        let Some(c) = self.containers.get_mut(&container) else {
            return;
        };
        let Some(node) = self.elements.get_mut(&element) else {
            return;
        };
        node.placement = Some(placement);
        node.parent = Some(container);
        if !c.held.contains(&element) && !c.children.contains(&element) {
            c.held.push(element);
        }
    }

    fn release_hold(&mut self, element: ElementId) {
        let Some(node) = self.elements.get_mut(&element) else {
            return;
        };
        node.placement = None;
        if let Some(c) = node.parent.and_then(|p| self.containers.get_mut(&p)) {
            c.held.retain(|&h| h != element);
        }
    }

    fn detach(&mut self, element: ElementId) {
        let Some(node) = self.elements.get_mut(&element) else {
            return;
        };
        node.placement = None;
        node.frame = None;
        let parent = node.parent;
        if let Some(c) = parent.and_then(|p| self.containers.get_mut(&p)) {
            c.held.retain(|&h| h != element);
            if !c.children.contains(&element) {
                node.parent = None;
            }
        }
    }

    fn forget(&mut self, element: ElementId) {
        if self.elements.contains_key(&element) {
            let _ = self.forgotten.insert(element);
        }
    }
}
