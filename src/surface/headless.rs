//! In-memory surface with a minimal flow layout.
//!
//! Blocks stack children vertically, rows lay them out horizontally, cells
//! take the size the engine gives them, and overlays sit outside the flow.
//! Hidden elements occupy no space and report an empty rectangle, like
//! `display: none` in a browser. Events are dispatched explicitly by the
//! caller; frame callbacks run when [`HeadlessSurface::run_frames`] is called.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use unicode_width::UnicodeWidthStr;

use super::{
    BoxSize, ElementId, ElementKind, EventHandler, EventKind, EventTarget, Font, FrameCallback,
    FrameId, ListenerId, Rect, Surface, SurfaceEvent,
};
use crate::layout::metrics::{BODY_FONT, CELL_PADDING_X, LINE_CLAMP};

/// Text measurement used by a headless surface.
pub type MeasureFn = Box<dyn Fn(&str, &Font) -> f64>;

/// Default scrollbar width, matching common desktop browsers.
const DEFAULT_SCROLLBAR_WIDTH: f64 = 15.0;

#[derive(Debug)]
struct Node {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: BTreeSet<String>,
    styles: BTreeMap<String, String>,
    text: String,
    size: BoxSize,
    visible: bool,
    position: Rect,
    scroll: (f64, f64),
}

impl Node {
    fn new(kind: ElementKind, parent: Option<ElementId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            classes: BTreeSet::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            size: BoxSize::default(),
            visible: true,
            position: Rect::default(),
            scroll: (0.0, 0.0),
        }
    }
}

struct Listener {
    target: EventTarget,
    kind: EventKind,
    handler: Rc<RefCell<EventHandler>>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Laid {
    rect: Rect,
    content_height: f64,
}

/// Headless [`Surface`] for native hosts and tests.
pub struct HeadlessSurface {
    nodes: RefCell<HashMap<ElementId, Node>>,
    root: ElementId,
    next_element: Cell<u32>,
    listeners: RefCell<BTreeMap<ListenerId, Listener>>,
    next_listener: Cell<u32>,
    frames: RefCell<BTreeMap<FrameId, FrameCallback>>,
    next_frame: Cell<u32>,
    measure: MeasureFn,
    scrollbar_width: f64,
    layout: RefCell<Option<HashMap<ElementId, Laid>>>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    /// Empty surface with a single root block.
    ///
    /// Text is measured at half an em per display column, so CJK glyphs
    /// count one em and Latin glyphs half of one.
    pub fn new() -> Self {
        let root = ElementId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(ElementKind::Block, None));
        Self {
            nodes: RefCell::new(nodes),
            root,
            next_element: Cell::new(1),
            listeners: RefCell::new(BTreeMap::new()),
            next_listener: Cell::new(0),
            frames: RefCell::new(BTreeMap::new()),
            next_frame: Cell::new(0),
            measure: Box::new(|text, font| text.width() as f64 * font.size * 0.5),
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
            layout: RefCell::new(None),
        }
    }

    /// Replace the text measurement function.
    #[must_use]
    pub fn with_measure(mut self, measure: impl Fn(&str, &Font) -> f64 + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    #[must_use]
    pub fn with_scrollbar_width(mut self, width: f64) -> Self {
        self.scrollbar_width = width;
        self
    }

    /// The root block hosts hand to tables as their container.
    pub fn root(&self) -> ElementId {
        self.root
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    /// Deliver a pointer event to `target`.
    ///
    /// Clicks bubble through the ancestors and then reach document listeners
    /// unless a handler stops propagation; enter/leave only reach `target`.
    pub fn dispatch(&self, target: ElementId, kind: EventKind) {
        let mut event = SurfaceEvent::new(kind, Some(target));
        let path = match kind {
            EventKind::Click => self.ancestors(target),
            EventKind::Enter | EventKind::Leave => vec![target],
        };
        for element in path {
            self.invoke(EventTarget::Element(element), &mut event);
            if event.is_stopped() {
                return;
            }
        }
        if kind == EventKind::Click {
            self.invoke(EventTarget::Document, &mut event);
        }
    }

    pub fn click(&self, target: ElementId) {
        self.dispatch(target, EventKind::Click);
    }

    pub fn hover(&self, target: ElementId) {
        self.dispatch(target, EventKind::Enter);
    }

    pub fn leave(&self, target: ElementId) {
        self.dispatch(target, EventKind::Leave);
    }

    /// A click that lands on no surface element.
    pub fn click_outside(&self) {
        let mut event = SurfaceEvent::new(EventKind::Click, None);
        self.invoke(EventTarget::Document, &mut event);
    }

    fn invoke(&self, target: EventTarget, event: &mut SurfaceEvent) {
        let handlers: Vec<(ListenerId, Rc<RefCell<EventHandler>>)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, l)| l.target == target && l.kind == event.kind)
            .map(|(id, l)| (*id, Rc::clone(&l.handler)))
            .collect();

        for (id, handler) in handlers {
            // An earlier handler may have torn this one down.
            if !self.listeners.borrow().contains_key(&id) {
                continue;
            }
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(event);
            }
            if event.is_stopped() {
                return;
            }
        }
    }

    /// Run every frame callback requested so far. Returns how many ran.
    ///
    /// Callbacks requested while running are queued for the next call.
    pub fn run_frames(&self) -> usize {
        let pending = std::mem::take(&mut *self.frames.borrow_mut());
        let count = pending.len();
        for (_, callback) in pending {
            callback();
        }
        count
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn document_listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|l| l.target == EventTarget::Document)
            .count()
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn exists(&self, element: ElementId) -> bool {
        self.nodes.borrow().contains_key(&element)
    }

    pub fn element_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .borrow()
            .get(&element)
            .is_some_and(|n| n.classes.contains(class))
    }

    pub fn text(&self, element: ElementId) -> String {
        self.nodes
            .borrow()
            .get(&element)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    pub fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(&element)
            .and_then(|n| n.styles.get(property).cloned())
    }

    pub fn size(&self, element: ElementId) -> BoxSize {
        self.nodes
            .borrow()
            .get(&element)
            .map(|n| n.size)
            .unwrap_or_default()
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.nodes
            .borrow()
            .get(&element)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.borrow().get(&element).and_then(|n| n.parent)
    }

    /// Whether the element and all of its ancestors are visible.
    pub fn is_displayed(&self, element: ElementId) -> bool {
        let nodes = self.nodes.borrow();
        self.ancestors(element)
            .iter()
            .all(|id| nodes.get(id).is_some_and(|n| n.visible))
    }

    /// Elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = nodes.get(&id) else {
                continue;
            };
            if node.classes.contains(class) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Scroll an element, as a user would.
    pub fn set_scroll(&self, element: ElementId, left: f64, top: f64) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&element) {
            node.scroll = (left, top);
        }
        self.invalidate();
    }

    /// `element` followed by its ancestors up to the root.
    fn ancestors(&self, element: ElementId) -> Vec<ElementId> {
        let nodes = self.nodes.borrow();
        let mut path = Vec::new();
        let mut current = Some(element);
        while let Some(id) = current {
            if path.contains(&id) {
                break;
            }
            let Some(node) = nodes.get(&id) else {
                break;
            };
            path.push(id);
            current = node.parent;
        }
        path
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    fn invalidate(&self) {
        self.layout.borrow_mut().take();
    }

    fn with_node(&self, element: ElementId, f: impl FnOnce(&mut Node)) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&element) {
            f(node);
        }
        self.invalidate();
    }

    fn laid(&self, element: ElementId) -> Laid {
        if self.layout.borrow().is_none() {
            let nodes = self.nodes.borrow();
            let mut out = HashMap::with_capacity(nodes.len());
            place(&nodes, self.root, 0.0, 0.0, &mut out);
            *self.layout.borrow_mut() = Some(out);
        }
        self.layout
            .borrow()
            .as_ref()
            .and_then(|l| l.get(&element).copied())
            .unwrap_or_default()
    }
}

/// Lay out `id` with its top-left corner at `(x, y)`.
fn place(
    nodes: &HashMap<ElementId, Node>,
    id: ElementId,
    x: f64,
    y: f64,
    out: &mut HashMap<ElementId, Laid>,
) -> Rect {
    let Some(node) = nodes.get(&id) else {
        return Rect::default();
    };
    if !node.visible {
        collapse(nodes, id, x, y, out);
        return Rect::new(x, y, 0.0, 0.0);
    }

    let (sx, sy) = node.scroll;
    let flow = node
        .children
        .iter()
        .copied()
        .filter(|c| nodes.get(c).is_some_and(|n| n.kind != ElementKind::Overlay));

    let (rect, content_height) = match node.kind {
        ElementKind::Block | ElementKind::Overlay => {
            let mut cy = y - sy;
            let mut widest: f64 = 0.0;
            for child in flow {
                let r = place(nodes, child, x - sx, cy, out);
                cy += r.height;
                widest = widest.max(r.width);
            }
            let content = cy - (y - sy);
            let mut height = content.max(node.size.min_height.unwrap_or(0.0));
            if let Some(max) = node.size.max_height {
                height = height.min(max);
            }
            let width = node.size.width.unwrap_or(widest);
            (Rect::new(x, y, width, height), content)
        }
        ElementKind::Row => {
            let mut cx = x;
            let mut tallest: f64 = 0.0;
            for child in flow {
                let r = place(nodes, child, cx, y, out);
                cx += r.width;
                tallest = tallest.max(r.height);
            }
            let height = tallest.max(node.size.min_height.unwrap_or(0.0));
            let width = node.size.width.unwrap_or(cx - x);
            (Rect::new(x, y, width, height), height)
        }
        ElementKind::Cell | ElementKind::Text | ElementKind::Icon | ElementKind::Button => {
            let width = node.size.width.or(node.size.max_width).unwrap_or(0.0);
            let height = node.size.min_height.unwrap_or(0.0);
            let rect = Rect::new(x, y, width, height);
            // Inline content shares the box of its cell.
            for child in flow {
                let laid = Laid {
                    rect,
                    content_height: height,
                };
                out.insert(child, laid);
                let grandchildren = nodes.get(&child).map(|n| n.children.clone());
                for grandchild in grandchildren.unwrap_or_default() {
                    out.insert(grandchild, laid);
                }
            }
            (rect, height)
        }
    };

    // Overlays are positioned against this element's content box.
    for child in &node.children {
        if let Some(overlay) = nodes.get(child).filter(|n| n.kind == ElementKind::Overlay) {
            let r = if overlay.visible {
                Rect::new(
                    rect.x + overlay.position.x - sx,
                    rect.y + overlay.position.y - sy,
                    overlay.position.width,
                    overlay.position.height,
                )
            } else {
                Rect::default()
            };
            out.insert(
                *child,
                Laid {
                    rect: r,
                    content_height: r.height,
                },
            );
        }
    }

    let laid = Laid {
        rect,
        content_height,
    };
    out.insert(id, laid);
    rect
}

/// Give a hidden subtree empty rectangles.
fn collapse(
    nodes: &HashMap<ElementId, Node>,
    id: ElementId,
    x: f64,
    y: f64,
    out: &mut HashMap<ElementId, Laid>,
) {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        out.insert(
            current,
            Laid {
                rect: Rect::new(x, y, 0.0, 0.0),
                content_height: 0.0,
            },
        );
        if let Some(node) = nodes.get(&current) {
            stack.extend(node.children.iter().copied());
        }
    }
}

impl Surface for HeadlessSurface {
    fn create_element(&self, parent: ElementId, kind: ElementKind, class: &str) -> ElementId {
        let id = ElementId(self.next_element.get());
        self.next_element.set(id.0 + 1);

        let mut node = Node::new(kind, Some(parent));
        node.classes
            .extend(class.split_whitespace().map(str::to_string));
        let mut nodes = self.nodes.borrow_mut();
        if let Some(p) = nodes.get_mut(&parent) {
            p.children.push(id);
        }
        nodes.insert(id, node);
        drop(nodes);
        self.invalidate();
        id
    }

    fn remove_element(&self, element: ElementId) {
        let mut removed = Vec::new();
        {
            let mut nodes = self.nodes.borrow_mut();
            let parent = nodes.get(&element).and_then(|n| n.parent);
            if let Some(p) = parent.and_then(|p| nodes.get_mut(&p)) {
                p.children.retain(|c| *c != element);
            }
            let mut stack = vec![element];
            while let Some(id) = stack.pop() {
                if let Some(node) = nodes.remove(&id) {
                    stack.extend(node.children);
                    removed.push(id);
                }
            }
        }
        // Listeners die with their elements, as they would once collected.
        self.listeners.borrow_mut().retain(|_, l| match l.target {
            EventTarget::Element(e) => !removed.contains(&e),
            EventTarget::Document => true,
        });
        self.invalidate();
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(&parent) || parent == child {
            return;
        }
        let old = nodes.get(&child).and_then(|n| n.parent);
        if let Some(o) = old.and_then(|o| nodes.get_mut(&o)) {
            o.children.retain(|c| *c != child);
        }
        if let Some(n) = nodes.get_mut(&child) {
            n.parent = Some(parent);
        }
        if let Some(p) = nodes.get_mut(&parent) {
            p.children.push(child);
        }
        drop(nodes);
        self.invalidate();
    }

    fn set_text(&self, element: ElementId, text: &str) {
        self.with_node(element, |n| n.text = text.to_string());
    }

    fn toggle_class(&self, element: ElementId, class: &str, on: bool) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&element) {
            if on {
                node.classes.insert(class.to_string());
            } else {
                node.classes.remove(class);
            }
        }
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&element) {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn set_size(&self, element: ElementId, size: BoxSize) {
        self.with_node(element, |n| n.size = size);
    }

    fn set_visible(&self, element: ElementId, visible: bool) {
        self.with_node(element, |n| n.visible = visible);
    }

    fn set_position(&self, element: ElementId, rect: Rect) {
        self.with_node(element, |n| n.position = rect);
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.laid(element).rect
    }

    fn scroll_height(&self, element: ElementId) -> f64 {
        self.laid(element).content_height
    }

    fn scroll_offset(&self, element: ElementId) -> (f64, f64) {
        self.nodes
            .borrow()
            .get(&element)
            .map_or((0.0, 0.0), |n| n.scroll)
    }

    fn text_overflows(&self, element: ElementId) -> bool {
        let (text, cell_width) = {
            let nodes = self.nodes.borrow();
            let Some(node) = nodes.get(&element) else {
                return false;
            };
            let width = node
                .parent
                .and_then(|p| nodes.get(&p))
                .and_then(|p| p.size.width)
                .unwrap_or(0.0);
            (node.text.clone(), width)
        };
        let available = cell_width - CELL_PADDING_X;
        if available <= 0.0 {
            return false;
        }
        let lines = ((self.measure)(&text, &BODY_FONT) / available).ceil();
        lines > f64::from(LINE_CLAMP)
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        (self.measure)(text, font)
    }

    fn scrollbar_width(&self) -> f64 {
        self.scrollbar_width
    }

    fn on(&self, target: EventTarget, kind: EventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(
            id,
            Listener {
                target,
                kind,
                handler: Rc::new(RefCell::new(handler)),
            },
        );
        id
    }

    fn off(&self, listener: ListenerId) {
        self.listeners.borrow_mut().remove(&listener);
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameId {
        let id = FrameId(self.next_frame.get());
        self.next_frame.set(id.0 + 1);
        self.frames.borrow_mut().insert(id, callback);
        id
    }

    fn cancel_frame(&self, frame: FrameId) {
        self.frames.borrow_mut().remove(&frame);
    }
}
