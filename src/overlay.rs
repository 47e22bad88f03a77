//! Selection overlay shared between tables.
//!
//! A header selection draws one box around every linked cell. Only one box
//! is visible across all tables built from the same [`TableContext`]: a
//! table showing it takes ownership, and the previous owner's box is hidden
//! first.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::Rc;

use crate::surface::{ElementId, ElementKind, Rect, Surface};

/// CSS class of the overlay element.
pub const SELECTED_BOX: &str = "selected-box";

/// Identity of a table within a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(u64);

/// Bounding box of `rects`, in surface coordinates.
///
/// When the first rect sits below the second, the first cell belongs to a
/// pinned header row that scrolled over the rest; the box is lifted by that
/// cell's height so it still starts at the header.
pub fn bounding_box(rects: &[Rect]) -> Option<Rect> {
    let (first, rest) = rects.split_first()?;
    let mut union = rest.iter().fold(*first, |acc, r| acc.union(r));
    if let Some(second) = rest.first() {
        if first.y > second.y {
            union.y -= first.height;
            union.height += first.height;
        }
    }
    Some(union)
}

/// Translate a surface rect into the content box of a scroll container.
pub fn relative_to(rect: Rect, container: Rect, scroll: (f64, f64)) -> Rect {
    Rect::new(
        rect.x - container.x + scroll.0,
        rect.y - container.y + scroll.1,
        rect.width,
        rect.height,
    )
}

/// The single overlay box.
#[derive(Debug, Default)]
pub struct SelectionOverlay {
    element: Option<ElementId>,
    /// Container the element currently lives in.
    host: Option<ElementId>,
    owner: Option<TableId>,
    rect: Rect,
}

impl SelectionOverlay {
    pub fn owner(&self) -> Option<TableId> {
        self.owner
    }

    pub fn is_visible(&self) -> bool {
        self.owner.is_some()
    }

    /// Last position, relative to the host container.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    /// Show the box at `rect` inside `host` on behalf of `owner`.
    pub fn show(&mut self, surface: &dyn Surface, owner: TableId, host: ElementId, rect: Rect) {
        self.hide(surface);
        let element = match self.element {
            Some(element) if self.host == Some(host) => element,
            Some(element) => {
                surface.append_child(host, element);
                element
            }
            None => surface.create_element(host, ElementKind::Overlay, SELECTED_BOX),
        };
        surface.set_position(element, rect);
        surface.set_visible(element, true);
        self.element = Some(element);
        self.host = Some(host);
        self.owner = Some(owner);
        self.rect = rect;
    }

    pub fn hide(&mut self, surface: &dyn Surface) {
        if let Some(element) = self.element {
            surface.set_visible(element, false);
        }
        self.owner = None;
    }

    /// Hide only if `owner` is showing the box. Returns whether it did.
    pub fn hide_for(&mut self, surface: &dyn Surface, owner: TableId) -> bool {
        if self.owner != Some(owner) {
            return false;
        }
        self.hide(surface);
        true
    }

    /// Forget the element if it lives in `host`, which is about to go away.
    pub fn release(&mut self, surface: &dyn Surface, owner: TableId, host: ElementId) {
        self.hide_for(surface, owner);
        if self.host == Some(host) {
            if let Some(element) = self.element.take() {
                surface.remove_element(element);
            }
            self.host = None;
        }
    }
}

struct ContextInner {
    overlay: RefCell<SelectionOverlay>,
    next_table: StdCell<u64>,
}

/// State shared by every table on one surface.
///
/// Cheap to clone; clones share the same overlay.
#[derive(Clone)]
pub struct TableContext {
    inner: Rc<ContextInner>,
}

impl Default for TableContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TableContext {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                overlay: RefCell::new(SelectionOverlay::default()),
                next_table: StdCell::new(0),
            }),
        }
    }

    /// Allocate an identity for a new table.
    pub fn register(&self) -> TableId {
        let id = self.inner.next_table.get();
        self.inner.next_table.set(id + 1);
        TableId(id)
    }

    /// Run `f` against the shared overlay.
    pub fn with_overlay<R>(&self, f: impl FnOnce(&mut SelectionOverlay) -> R) -> R {
        f(&mut self.inner.overlay.borrow_mut())
    }

    pub fn overlay_owner(&self) -> Option<TableId> {
        self.inner.overlay.borrow().owner()
    }

    pub fn overlay_rect(&self) -> Option<Rect> {
        let overlay = self.inner.overlay.borrow();
        overlay.is_visible().then(|| overlay.rect())
    }

    pub fn overlay_element(&self) -> Option<ElementId> {
        self.inner.overlay.borrow().element()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    #[test]
    fn test_bounding_box() {
        let rects = [
            Rect::new(0.0, 0.0, 50.0, 31.0),
            Rect::new(0.0, 31.0, 50.0, 31.0),
            Rect::new(0.0, 62.0, 50.0, 31.0),
        ];
        assert_eq!(bounding_box(&rects), Some(Rect::new(0.0, 0.0, 50.0, 93.0)));
        assert_eq!(bounding_box(&[]), None);
    }

    #[test]
    fn test_pinned_header_lifts_the_box() {
        // Header pinned at y=100 while the body scrolled up to y=40.
        let rects = [Rect::new(0.0, 100.0, 50.0, 31.0), Rect::new(0.0, 40.0, 50.0, 31.0)];
        let rect = bounding_box(&rects).unwrap();
        assert_eq!(rect.y, 9.0);
        assert_eq!(rect.bottom(), 131.0);
    }

    #[test]
    fn test_relative_to_adds_scroll() {
        let rect = relative_to(
            Rect::new(120.0, 80.0, 10.0, 10.0),
            Rect::new(100.0, 50.0, 300.0, 300.0),
            (5.0, 40.0),
        );
        assert_eq!(rect, Rect::new(25.0, 70.0, 10.0, 10.0));
    }

    #[test]
    fn test_one_owner_at_a_time() {
        let surface = HeadlessSurface::new();
        let a_host = surface.create_element(surface.root(), ElementKind::Block, "");
        let b_host = surface.create_element(surface.root(), ElementKind::Block, "");
        let context = TableContext::new();
        let (a, b) = (context.register(), context.register());

        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        context.with_overlay(|o| o.show(&surface, a, a_host, rect));
        assert_eq!(context.overlay_owner(), Some(a));
        let element = context.overlay_element().unwrap();
        assert_eq!(surface.parent(element), Some(a_host));

        context.with_overlay(|o| o.show(&surface, b, b_host, rect));
        assert_eq!(context.overlay_owner(), Some(b));
        assert_eq!(surface.parent(element), Some(b_host));

        // A no longer owns the box and cannot hide it.
        assert!(!context.with_overlay(|o| o.hide_for(&surface, a)));
        assert!(surface.is_displayed(element));
        assert!(context.with_overlay(|o| o.hide_for(&surface, b)));
        assert!(!surface.is_displayed(element));
        assert_eq!(context.overlay_rect(), None);
    }

    #[test]
    fn test_release_drops_element_with_host() {
        let surface = HeadlessSurface::new();
        let host = surface.create_element(surface.root(), ElementKind::Block, "");
        let context = TableContext::new();
        let id = context.register();
        context.with_overlay(|o| o.show(&surface, id, host, Rect::default()));
        let element = context.overlay_element().unwrap();

        context.with_overlay(|o| o.release(&surface, id, host));
        assert!(!surface.exists(element));
        assert_eq!(context.overlay_element(), None);
        assert_eq!(context.overlay_owner(), None);
    }
}
