//! Browser [`LayoutHost`] over `web-sys`.
//!
//! Elements get a stable [`ElementId`] stored in a `data-auto-animate-id`
//! attribute. Child-list changes come from a real `MutationObserver` whose
//! callback only buffers records; [`LayoutHost::take_records`] drains that
//! buffer plus anything the observer has queued but not yet delivered.
//!
//! Layout boxes are `offsetLeft/Top/Width/Height`, which ignore CSS
//! transforms, so frames written by the engine never leak into baselines.
//! Observed containers are made `position: relative` when static, so they
//! are the offset parent of their children and held elements can be pinned
//! with `position: absolute` in the same coordinates.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    CssStyleDeclaration, Element, HtmlElement, MutationObserver,
    MutationObserverInit, Node, NodeList, Window,
};

use super::{ElementId, Frame, LayoutHost, Margins, MutationRecord, Placement};
use crate::snapshot::Rect;

const ID_ATTRIBUTE: &str = "data-auto-animate-id";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const FRAME_PROPERTIES: [&str; 3] = ["transform", "transform-origin", "opacity"];
const HOLD_PROPERTIES: [&str; 5] = ["position", "left", "top", "width", "height"];

/// Route `log` output to the browser console and panics to `console.error`.
///
/// Safe to call more than once.
pub fn init_web_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("logger already initialized");
    }
}

type RecordSink = Rc<RefCell<Vec<web_sys::MutationRecord>>>;

struct Observation {
    observer: MutationObserver,
    delivered: RecordSink,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

/// [`LayoutHost`] backed by the live browser document.
pub struct WebHost {
    window: Window,
    elements: FxHashMap<ElementId, Element>,
    observations: FxHashMap<ElementId, Observation>,
    /// Ghost → container it is held in.
    held: FxHashMap<ElementId, ElementId>,
    /// Opacity an element had before the first frame was written to it.
    natural_opacity: FxHashMap<ElementId, f32>,
    next_id: u64,
}

impl WebHost {
    /// Host for the page's global `window`, if there is one.
    #[must_use]
    pub fn from_global() -> Option<Self> {
        web_sys::window().map(Self::new)
    }

    /// Host for `window`.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            elements: FxHashMap::default(),
            observations: FxHashMap::default(),
            held: FxHashMap::default(),
            natural_opacity: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Stable id for `element`, assigning one on first sight.
    pub fn register(&mut self, element: &Element) -> ElementId {
        if let Some(id) = element
            .get_attribute(ID_ATTRIBUTE)
            .and_then(|v| v.parse::<u64>().ok())
            .map(ElementId)
        {
            if self.elements.contains_key(&id) {
                return id;
            }
        }
        self.next_id += 1;
        let id = ElementId(self.next_id);
        if let Err(e) = element.set_attribute(ID_ATTRIBUTE, &id.0.to_string()) {
            log::warn!("cannot tag {id}: {e:?}");
        }
        let _ = self.elements.insert(id, element.clone());
        id
    }

    /// Element registered under `id`.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn html(&self, id: ElementId) -> Option<&HtmlElement> {
        self.elements.get(&id).and_then(|e| e.dyn_ref::<HtmlElement>())
    }

    fn style(&self, id: ElementId) -> Option<CssStyleDeclaration> {
        self.html(id).map(HtmlElement::style)
    }

    fn computed(&self, id: ElementId) -> Option<CssStyleDeclaration> {
        let element = self.elements.get(&id)?;
        self.window.get_computed_style(element).ok().flatten()
    }

    fn computed_px(style: &CssStyleDeclaration, property: &str) -> f32 {
        style
            .get_property_value(property)
            .ok()
            .and_then(|v| v.trim_end_matches("px").trim().parse::<f32>().ok())
            .unwrap_or(0.0)
    }

    fn set_properties(&self, id: ElementId, properties: &[(&str, String)]) {
        let Some(style) = self.style(id) else {
            return;
        };
        for (name, value) in properties {
            if let Err(e) = style.set_property(name, value) {
                log::warn!("cannot set {name} on {id}: {e:?}");
            }
        }
    }

    fn remove_properties(&self, id: ElementId, properties: &[&str]) {
        let Some(style) = self.style(id) else {
            return;
        };
        for name in properties {
            let _ = style.remove_property(name);
        }
    }

    /// Translate raw observer records into engine records, tracking ghosts
    /// the page put back.
    ///
    /// Elements first seen in this drain that already left the document
    /// again are unregistered; nothing will ever ask about them.
    fn translate(
        &mut self,
        container: ElementId,
        raw: Vec<web_sys::MutationRecord>,
    ) -> Vec<MutationRecord> {
        let mut records = Vec::new();
        let mut fresh = Vec::new();
        for record in raw {
            if record.type_() != "childList" {
                continue;
            }
            for element in self.elements_of(&record.removed_nodes()) {
                let id = self.register_noting(&element, &mut fresh);
                records.push(MutationRecord::Removed(id));
            }
            for element in self.elements_of(&record.added_nodes()) {
                let id = self.register_noting(&element, &mut fresh);
                if self.held.get(&id) == Some(&container) {
                    let _ = self.held.remove(&id);
                }
                records.push(MutationRecord::Added(id));
            }
        }
        for id in fresh {
            if !self.is_in_document(id) {
                let _ = self.elements.remove(&id);
            }
        }
        records
    }

    fn register_noting(
        &mut self,
        element: &Element,
        fresh: &mut Vec<ElementId>,
    ) -> ElementId {
        let known = self.elements.len();
        let id = self.register(element);
        if self.elements.len() > known {
            fresh.push(id);
        }
        id
    }

    fn elements_of(&self, nodes: &NodeList) -> Vec<Element> {
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    /// Drop the records our own write to `element` just produced, keeping
    /// anything else the observer had queued.
    fn discard_own_records(&self, container: ElementId, element: ElementId) {
        let Some(observation) = self.observations.get(&container) else {
            return;
        };
        let Some(node) = self.elements.get(&element).cloned().map(Node::from)
        else {
            return;
        };
        let own = |list: &NodeList| {
            (0..list.length())
                .filter_map(|i| list.item(i))
                .any(|n| n.is_same_node(Some(&node)))
        };
        let queued = observation.observer.take_records();
        let mut keep = observation.delivered.borrow_mut();
        for value in queued.iter() {
            let Ok(record) = value.dyn_into::<web_sys::MutationRecord>() else {
                continue;
            };
            if !own(&record.added_nodes()) && !own(&record.removed_nodes()) {
                keep.push(record);
            }
        }
    }
}

impl LayoutHost for WebHost {
    fn is_connected(&self, container: ElementId) -> bool {
        self.is_in_document(container)
    }

    fn observe(&mut self, container: ElementId) {
        let Some(target) = self.elements.get(&container).cloned() else {
            log::warn!("cannot observe unregistered {container}");
            return;
        };
        if self.observations.contains_key(&container) {
            return;
        }

        // Later children are registered as their records arrive
        let existing = target.children();
        for child in (0..existing.length()).filter_map(|i| existing.item(i)) {
            let _ = self.register(&child);
        }

        let static_position = self
            .computed(container)
            .and_then(|s| s.get_property_value("position").ok())
            .is_none_or(|p| p == "static");
        if static_position {
            self.set_properties(container, &[("position", "relative".into())]);
        }

        let delivered: RecordSink = Rc::default();
        let sink = Rc::clone(&delivered);
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                let mut sink = sink.borrow_mut();
                for value in records.iter() {
                    if let Ok(record) = value.dyn_into::<web_sys::MutationRecord>() {
                        sink.push(record);
                    }
                }
            },
        );
        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref())
        {
            Ok(observer) => observer,
            Err(e) => {
                log::warn!("cannot create MutationObserver: {e:?}");
                return;
            }
        };
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        let node: &Node = target.as_ref();
        if let Err(e) = observer.observe_with_options(node, &init) {
            log::warn!("cannot observe {container}: {e:?}");
            return;
        }
        let _ = self.observations.insert(
            container,
            Observation {
                observer,
                delivered,
                _callback: callback,
            },
        );
    }

    fn disconnect(&mut self, container: ElementId) {
        if let Some(observation) = self.observations.remove(&container) {
            observation.observer.disconnect();
        }
    }

    fn take_records(&mut self, container: ElementId) -> Vec<MutationRecord> {
        let Some(observation) = self.observations.get(&container) else {
            return Vec::new();
        };
        let mut raw = std::mem::take(&mut *observation.delivered.borrow_mut());
        let queued = observation.observer.take_records();
        raw.extend(
            queued
                .iter()
                .filter_map(|v| v.dyn_into::<web_sys::MutationRecord>().ok()),
        );
        self.translate(container, raw)
    }

    fn is_in_document(&self, element: ElementId) -> bool {
        self.elements
            .get(&element)
            .is_some_and(|e| AsRef::<Node>::as_ref(e).is_connected())
    }

    fn children(&self, container: ElementId) -> Vec<ElementId> {
        let Some(parent) = self.elements.get(&container) else {
            return Vec::new();
        };
        let list = parent.children();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|child| {
                child
                    .get_attribute(ID_ATTRIBUTE)
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(ElementId)
                    .filter(|id| self.elements.contains_key(id))
            })
            .filter(|id| !self.held.contains_key(id))
            .collect()
    }

    fn layout_rect(&self, element: ElementId) -> Option<Rect> {
        let html = self.html(element)?;
        if !AsRef::<Node>::as_ref(html).is_connected() {
            return None;
        }
        Some(Rect::new(
            html.offset_left() as f32,
            html.offset_top() as f32,
            html.offset_width() as f32,
            html.offset_height() as f32,
        ))
    }

    fn opacity(&self, element: ElementId) -> f32 {
        if let Some(&natural) = self.natural_opacity.get(&element) {
            return natural;
        }
        self.computed(element)
            .and_then(|s| s.get_property_value("opacity").ok())
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(1.0)
    }

    fn margins(&self, element: ElementId) -> Margins {
        let Some(style) = self.computed(element) else {
            return Margins::ZERO;
        };
        Margins {
            top: Self::computed_px(&style, "margin-top"),
            right: Self::computed_px(&style, "margin-right"),
            bottom: Self::computed_px(&style, "margin-bottom"),
            left: Self::computed_px(&style, "margin-left"),
        }
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|q| q.matches())
    }

    fn apply_frame(&mut self, element: ElementId, frame: &Frame) {
        if !self.natural_opacity.contains_key(&element) {
            let natural = self.opacity(element);
            let _ = self.natural_opacity.insert(element, natural);
        }
        self.set_properties(
            element,
            &[
                ("transform", frame.css_transform()),
                ("transform-origin", "0 0".into()),
                ("opacity", frame.opacity.to_string()),
            ],
        );
    }

    fn clear_frame(&mut self, element: ElementId) {
        self.remove_properties(element, &FRAME_PROPERTIES);
        let _ = self.natural_opacity.remove(&element);
    }

    fn hold_in_place(
        &mut self,
        container: ElementId,
        element: ElementId,
        placement: Placement,
    ) {
        let (Some(parent), Some(child)) =
            (self.elements.get(&container), self.elements.get(&element))
        else {
            return;
        };
        let child: &Node = child.as_ref();
        if let Err(e) = parent.append_child(child) {
            log::warn!("cannot hold {element} in {container}: {e:?}");
            return;
        }
        let _ = self.held.insert(element, container);
        self.discard_own_records(container, element);

        let Vec2 { x, y } = placement.offset;
        self.set_properties(
            element,
            &[
                ("position", "absolute".into()),
                ("left", format!("{x}px")),
                ("top", format!("{y}px")),
                ("width", format!("{}px", placement.size.x)),
                ("height", format!("{}px", placement.size.y)),
            ],
        );
    }

    fn release_hold(&mut self, element: ElementId) {
        let _ = self.held.remove(&element);
        self.remove_properties(element, &HOLD_PROPERTIES);
    }

    fn detach(&mut self, element: ElementId) {
        self.remove_properties(element, &FRAME_PROPERTIES);
        self.remove_properties(element, &HOLD_PROPERTIES);
        let _ = self.natural_opacity.remove(&element);
        let container = self.held.remove(&element);
        let Some(node) = self.elements.get(&element).cloned() else {
            return;
        };
        node.remove();
        if let Some(container) = container {
            self.discard_own_records(container, element);
        }
        let _ = self.elements.remove(&element);
    }

    fn forget(&mut self, element: ElementId) {
        if self.observations.contains_key(&element) {
            return;
        }
        let _ = self.natural_opacity.remove(&element);
        let _ = self.held.remove(&element);
        let _ = self.elements.remove(&element);
    }
}
