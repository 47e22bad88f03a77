//! Render surface abstraction.
//!
//! The table engine never touches a concrete UI toolkit. It creates elements,
//! toggles classes, binds pointer events and reads back geometry through the
//! [`Surface`] trait:
//!
//! - [`HeadlessSurface`]: in-memory element tree with a simple flow layout,
//!   used natively (tests, CLI, benches)
//! - `DomSurface` (wasm32 only): real DOM elements through `web-sys`

mod headless;
#[cfg(target_arch = "wasm32")]
mod web;

pub use headless::{HeadlessSurface, MeasureFn};
#[cfg(target_arch = "wasm32")]
pub use web::DomSurface;

use serde::Serialize;

/// Handle to an element owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub u32);

/// Handle to a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

/// Handle to a pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u32);

/// Structural role of an element, which drives how a surface lays it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Stacks children vertically.
    Block,
    /// Lays children out left to right.
    Row,
    /// Sized grid cell.
    Cell,
    /// Text inside a cell.
    Text,
    /// Clickable glyph inside a cell (sort, tree, expand).
    Icon,
    /// Pagination button.
    Button,
    /// Absolutely positioned box outside the flow.
    Overlay,
}

impl ElementKind {
    /// Tag used by DOM surfaces.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Text | Self::Icon => "span",
            Self::Button => "button",
            Self::Block | Self::Row | Self::Cell | Self::Overlay => "div",
        }
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Font parameters handed to text measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f64,
    pub weight: u16,
    pub family: &'static str,
}

impl Font {
    /// CSS shorthand, e.g. `400 12px PingFangSC-Regular`.
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size, self.family)
    }
}

/// Size constraints applied to an element. `None` leaves a dimension alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxSize {
    pub width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

/// Pointer events the engine listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Enter,
    Leave,
    Click,
}

impl EventKind {
    /// DOM event name.
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Enter => "mouseenter",
            Self::Leave => "mouseleave",
            Self::Click => "click",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Element(ElementId),
    /// Process-wide listener, used for outside clicks.
    Document,
}

/// Event delivered to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEvent {
    pub kind: EventKind,
    /// Innermost surface element under the pointer, if any.
    pub target: Option<ElementId>,
    stopped: bool,
}

impl SurfaceEvent {
    pub fn new(kind: EventKind, target: Option<ElementId>) -> Self {
        Self {
            kind,
            target,
            stopped: false,
        }
    }

    /// Keep the event from reaching outer elements and the document.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

pub type EventHandler = Box<dyn FnMut(&mut SurfaceEvent)>;
pub type FrameCallback = Box<dyn FnOnce()>;

/// Everything the engine needs from a UI toolkit.
///
/// All methods take `&self`: surfaces are shared between a table, its cells
/// and the selection overlay, and keep their own interior state.
pub trait Surface {
    /// Create an element as the last child of `parent`.
    fn create_element(&self, parent: ElementId, kind: ElementKind, class: &str) -> ElementId;

    /// Detach and drop an element and its subtree.
    fn remove_element(&self, element: ElementId);

    /// Move an element under a new parent (last child).
    fn append_child(&self, parent: ElementId, child: ElementId);

    fn set_text(&self, element: ElementId, text: &str);

    fn toggle_class(&self, element: ElementId, class: &str, on: bool);

    /// Set one inline style property, CSS custom properties included.
    fn set_style(&self, element: ElementId, property: &str, value: &str);

    fn set_size(&self, element: ElementId, size: BoxSize);

    fn set_visible(&self, element: ElementId, visible: bool);

    /// Position an overlay relative to its parent's content box.
    fn set_position(&self, element: ElementId, rect: Rect);

    /// Rendered rectangle in surface coordinates.
    fn bounding_rect(&self, element: ElementId) -> Rect;

    /// Full content height, including what scrolls out of view.
    fn scroll_height(&self, element: ElementId) -> f64;

    /// Current `(left, top)` scroll offset.
    fn scroll_offset(&self, element: ElementId) -> (f64, f64);

    /// Whether a text element is clipped by its line clamp.
    fn text_overflows(&self, element: ElementId) -> bool;

    /// Whether `node` is `ancestor` or inside it.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    /// Pixel width of `text` in `font`.
    fn measure_text(&self, text: &str, font: &Font) -> f64;

    /// Width taken by a vertical scrollbar on this device.
    fn scrollbar_width(&self) -> f64;

    fn on(&self, target: EventTarget, kind: EventKind, handler: EventHandler) -> ListenerId;

    fn off(&self, listener: ListenerId);

    /// Run `callback` once after the next layout/paint.
    fn request_frame(&self, callback: FrameCallback) -> FrameId;

    fn cancel_frame(&self, frame: FrameId);
}
