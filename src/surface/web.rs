//! DOM surface backed by `web-sys`.
//!
//! Elements carry a `data-dv-id` attribute so event targets can be mapped
//! back to [`ElementId`]s. Closures removed with [`Surface::off`] may still be
//! on the JS stack (a click handler that triggers a relayout removes its own
//! listener), so they are retired and only dropped on the next frame.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, Window};

use super::{
    BoxSize, ElementId, ElementKind, EventHandler, EventKind, EventTarget, Font, FrameCallback,
    FrameId, ListenerId, Rect, Surface, SurfaceEvent,
};

use crate::error::TableError;

const ID_ATTRIBUTE: &str = "data-dv-id";

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;
type FrameClosure = Closure<dyn FnMut()>;

fn px(value: f64) -> String {
    format!("{value}px")
}

fn warn_on_err<T>(result: Result<T, JsValue>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{what} failed: {e:?}");
            None
        }
    }
}

struct Node {
    element: HtmlElement,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

struct DomListener {
    target: web_sys::EventTarget,
    name: &'static str,
    closure: EventClosure,
}

#[derive(Default)]
struct Frames {
    pending: HashMap<FrameId, (i32, FrameClosure)>,
    /// Closures of frames that already ran, dropped on the next frame.
    fired: Vec<FrameClosure>,
}

/// [`Surface`] rendering into the browser DOM.
pub struct DomSurface {
    window: Window,
    document: Document,
    nodes: RefCell<HashMap<ElementId, Node>>,
    next_element: Cell<u32>,
    listeners: RefCell<HashMap<ListenerId, DomListener>>,
    retired: Rc<RefCell<Vec<EventClosure>>>,
    next_listener: Cell<u32>,
    frames: Rc<RefCell<Frames>>,
    next_frame: Cell<u32>,
    measure: RefCell<Option<CanvasRenderingContext2d>>,
    scrollbar_width: Cell<Option<f64>>,
}

impl DomSurface {
    pub fn new() -> crate::error::Result<Self> {
        let window = web_sys::window().ok_or_else(|| TableError::Surface("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| TableError::Surface("no document".into()))?;
        Ok(Self {
            window,
            document,
            nodes: RefCell::new(HashMap::new()),
            next_element: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
            retired: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
            frames: Rc::new(RefCell::new(Frames::default())),
            next_frame: Cell::new(0),
            measure: RefCell::new(None),
            scrollbar_width: Cell::new(None),
        })
    }

    /// Register a host element, typically the container a table mounts in.
    pub fn attach(&self, element: HtmlElement) -> ElementId {
        let id = self.allocate();
        warn_on_err(
            element.set_attribute(ID_ATTRIBUTE, &id.0.to_string()),
            "tagging container",
        );
        self.nodes.borrow_mut().insert(
            id,
            Node {
                element,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn allocate(&self) -> ElementId {
        let id = ElementId(self.next_element.get());
        self.next_element.set(id.0 + 1);
        id
    }

    fn element(&self, id: ElementId) -> Option<HtmlElement> {
        self.nodes.borrow().get(&id).map(|n| n.element.clone())
    }

    fn style(&self, id: ElementId, property: &str, value: &str) {
        if let Some(element) = self.element(id) {
            warn_on_err(
                element.style().set_property(property, value),
                "set_property",
            );
        }
    }

    /// Innermost tagged element at or above the event target.
    fn resolve_target(event: &web_sys::Event) -> Option<ElementId> {
        let element = event.target()?.dyn_into::<Element>().ok()?;
        let tagged = element
            .closest(&format!("[{ID_ATTRIBUTE}]"))
            .ok()
            .flatten()?;
        tagged
            .get_attribute(ID_ATTRIBUTE)?
            .parse()
            .ok()
            .map(ElementId)
    }

    fn canvas_context(&self) -> Option<CanvasRenderingContext2d> {
        if let Some(ctx) = self.measure.borrow().as_ref() {
            return Some(ctx.clone());
        }
        let canvas = self
            .document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        *self.measure.borrow_mut() = Some(ctx.clone());
        Some(ctx)
    }

    fn measure_scrollbar(&self) -> f64 {
        let gauge = self
            .document
            .create_element("div")
            .ok()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        let (Some(gauge), Some(body)) = (gauge, self.document.body()) else {
            return 0.0;
        };
        let style = gauge.style();
        warn_on_err(style.set_property("width", "100px"), "gauge width");
        warn_on_err(style.set_property("height", "100px"), "gauge height");
        warn_on_err(style.set_property("overflow", "scroll"), "gauge overflow");
        warn_on_err(style.set_property("position", "absolute"), "gauge position");
        warn_on_err(style.set_property("top", "-9999px"), "gauge top");
        if warn_on_err(body.append_child(&gauge), "gauge append").is_none() {
            return 0.0;
        }
        let width = f64::from(gauge.offset_width() - gauge.client_width());
        gauge.remove();
        width
    }
}

impl Surface for DomSurface {
    fn create_element(&self, parent: ElementId, kind: ElementKind, class: &str) -> ElementId {
        let id = self.allocate();
        let element = self
            .document
            .create_element(kind.tag())
            .ok()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        let Some(element) = element else {
            log::warn!("could not create <{}>", kind.tag());
            return id;
        };
        element.set_class_name(class);
        warn_on_err(
            element.set_attribute(ID_ATTRIBUTE, &id.0.to_string()),
            "tagging element",
        );
        if kind == ElementKind::Overlay {
            warn_on_err(
                element.style().set_property("position", "absolute"),
                "overlay position",
            );
        }

        let mut nodes = self.nodes.borrow_mut();
        if let Some(p) = nodes.get_mut(&parent) {
            warn_on_err(p.element.append_child(&element), "append_child");
            p.children.push(id);
        }
        nodes.insert(
            id,
            Node {
                element,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        id
    }

    fn remove_element(&self, element: ElementId) {
        let mut nodes = self.nodes.borrow_mut();
        let parent = nodes.get(&element).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| nodes.get_mut(&p)) {
            p.children.retain(|c| *c != element);
        }
        if let Some(node) = nodes.get(&element) {
            node.element.remove();
        }
        let mut stack = vec![element];
        while let Some(id) = stack.pop() {
            if let Some(node) = nodes.remove(&id) {
                stack.extend(node.children);
            }
        }
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut nodes = self.nodes.borrow_mut();
        let (Some(p), Some(c)) = (nodes.get(&parent), nodes.get(&child)) else {
            return;
        };
        warn_on_err(p.element.append_child(&c.element), "append_child");
        let old = c.parent;
        if let Some(o) = old.and_then(|o| nodes.get_mut(&o)) {
            o.children.retain(|id| *id != child);
        }
        if let Some(c) = nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = nodes.get_mut(&parent) {
            p.children.push(child);
        }
    }

    fn set_text(&self, element: ElementId, text: &str) {
        if let Some(element) = self.element(element) {
            element.set_text_content(Some(text));
        }
    }

    fn toggle_class(&self, element: ElementId, class: &str, on: bool) {
        if let Some(element) = self.element(element) {
            warn_on_err(
                element.class_list().toggle_with_force(class, on),
                "toggle class",
            );
        }
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        self.style(element, property, value);
    }

    fn set_size(&self, element: ElementId, size: BoxSize) {
        let entries = [
            ("width", size.width),
            ("max-width", size.max_width),
            ("min-height", size.min_height),
            ("max-height", size.max_height),
        ];
        for (property, value) in entries {
            if let Some(value) = value {
                self.style(element, property, &px(value));
            }
        }
    }

    fn set_visible(&self, element: ElementId, visible: bool) {
        if let Some(element) = self.element(element) {
            let style = element.style();
            if visible {
                warn_on_err(style.remove_property("display"), "show");
            } else {
                warn_on_err(style.set_property("display", "none"), "hide");
            }
        }
    }

    fn set_position(&self, element: ElementId, rect: Rect) {
        self.style(element, "left", &px(rect.x));
        self.style(element, "top", &px(rect.y));
        self.style(element, "width", &px(rect.width));
        self.style(element, "height", &px(rect.height));
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.element(element).map_or_else(Rect::default, |e| {
            let r = e.get_bounding_client_rect();
            Rect::new(r.x(), r.y(), r.width(), r.height())
        })
    }

    fn scroll_height(&self, element: ElementId) -> f64 {
        self.element(element)
            .map_or(0.0, |e| f64::from(e.scroll_height()))
    }

    fn scroll_offset(&self, element: ElementId) -> (f64, f64) {
        self.element(element).map_or((0.0, 0.0), |e| {
            (f64::from(e.scroll_left()), f64::from(e.scroll_top()))
        })
    }

    fn text_overflows(&self, element: ElementId) -> bool {
        self.element(element)
            .is_some_and(|e| e.scroll_height() > e.client_height())
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(a), Some(n)) => a.contains(Some(n.as_ref())),
            _ => false,
        }
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        let Some(ctx) = self.canvas_context() else {
            return 0.0;
        };
        ctx.set_font(&font.css());
        ctx.measure_text(text).map_or(0.0, |m| m.width())
    }

    fn scrollbar_width(&self) -> f64 {
        if let Some(width) = self.scrollbar_width.get() {
            return width;
        }
        let width = self.measure_scrollbar();
        self.scrollbar_width.set(Some(width));
        width
    }

    fn on(&self, target: EventTarget, kind: EventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);

        let js_target: Option<web_sys::EventTarget> = match target {
            EventTarget::Element(element) => self.element(element).map(Into::into),
            EventTarget::Document => Some(self.document.clone().into()),
        };
        let Some(js_target) = js_target else {
            log::warn!("listener on unknown element {target:?}");
            return id;
        };

        let mut handler = handler;
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let mut surface_event = SurfaceEvent::new(kind, Self::resolve_target(&event));
            handler(&mut surface_event);
            if surface_event.is_stopped() {
                event.stop_propagation();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        let name = kind.dom_name();
        warn_on_err(
            js_target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()),
            "add_event_listener",
        );
        self.listeners.borrow_mut().insert(
            id,
            DomListener {
                target: js_target,
                name,
                closure,
            },
        );
        id
    }

    fn off(&self, listener: ListenerId) {
        let Some(l) = self.listeners.borrow_mut().remove(&listener) else {
            return;
        };
        warn_on_err(
            l.target
                .remove_event_listener_with_callback(l.name, l.closure.as_ref().unchecked_ref()),
            "remove_event_listener",
        );
        self.retired.borrow_mut().push(l.closure);
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameId {
        let id = FrameId(self.next_frame.get());
        self.next_frame.set(id.0 + 1);

        let frames: Weak<RefCell<Frames>> = Rc::downgrade(&self.frames);
        let retired = Rc::downgrade(&self.retired);
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(frames) = frames.upgrade() {
                let mut frames = frames.borrow_mut();
                // Nothing from earlier frames is on the stack any more.
                let stale = std::mem::take(&mut frames.fired);
                if let Some((_, own)) = frames.pending.remove(&id) {
                    frames.fired.push(own);
                }
                drop(frames);
                drop(stale);
            }
            if let Some(retired) = retired.upgrade() {
                retired.borrow_mut().clear();
            }
            if let Some(callback) = callback.take() {
                callback();
            }
        }) as Box<dyn FnMut()>);

        let handle = warn_on_err(
            self.window
                .request_animation_frame(closure.as_ref().unchecked_ref()),
            "request_animation_frame",
        );
        if let Some(handle) = handle {
            self.frames
                .borrow_mut()
                .pending
                .insert(id, (handle, closure));
        }
        id
    }

    fn cancel_frame(&self, frame: FrameId) {
        let pending = self.frames.borrow_mut().pending.remove(&frame);
        if let Some((handle, _closure)) = pending {
            warn_on_err(
                self.window.cancel_animation_frame(handle),
                "cancel_animation_frame",
            );
        }
    }
}
